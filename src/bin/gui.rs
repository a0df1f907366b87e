use eframe::egui;
use flow_builder::{init_logging, EditorConfig, FlowBuilderApp};
use tracing::error;

fn main() -> eframe::Result<()> {
    init_logging();

    let config = EditorConfig::load_or_default().unwrap_or_else(|e| {
        error!(error = %e, "Invalid config, falling back to defaults");
        EditorConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(format!("Flow Builder - {}", config.campaign_name)),
        ..Default::default()
    };

    eframe::run_native(
        "Flow Builder",
        options,
        Box::new(|_cc| Ok(Box::new(FlowBuilderApp::new(config)))),
    )
}
