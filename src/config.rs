use crate::error::{FlowError, Result};
use crate::node::{Point, Size};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "flow_builder.toml";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FLOW_BUILDER_CONFIG";

/// Dimensions used to lay out nodes and to anchor panels below them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub affordance_button_height: f64,
    pub connector_line_height: f64,
    pub anchor_padding: f64,
    /// Vertical distance between a parent and a child added from the panel
    pub child_vertical_offset: f64,
    pub viewport_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 70.0,
            affordance_button_height: 32.0,
            connector_line_height: 16.0,
            anchor_padding: 40.0,
            child_vertical_offset: 180.0,
            viewport_margin: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub add_node_width: f64,
    pub add_node_height: f64,
    pub config_width: f64,
    pub auto_writing_width: f64,
    pub message_preview_width: f64,
    pub context_menu_width: f64,
    pub context_menu_height: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            add_node_width: 400.0,
            add_node_height: 380.0,
            config_width: 480.0,
            auto_writing_width: 320.0,
            message_preview_width: 320.0,
            context_menu_width: 160.0,
            context_menu_height: 72.0,
        }
    }
}

impl PanelConfig {
    pub fn add_node_size(&self) -> Size {
        Size::new(self.add_node_width, self.add_node_height)
    }

    pub fn context_menu_size(&self) -> Size {
        Size::new(self.context_menu_width, self.context_menu_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Fraction of the viewport left empty around the graph on fit-view
    pub fit_padding: f64,
    pub show_grid: bool,
    pub show_minimap: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 4.0,
            zoom_step: 1.2,
            fit_padding: 0.1,
            show_grid: false,
            show_minimap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub icon: String,
    pub color: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 100.0,
            label: "Gatilho Inicial".to_string(),
            icon: "zap".to_string(),
            color: "yellow-500".to_string(),
        }
    }
}

impl TriggerConfig {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Top-level editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub theme: Theme,
    pub campaign_active: bool,
    pub campaign_name: String,
    pub layout: LayoutConfig,
    pub panels: PanelConfig,
    pub canvas: CanvasConfig,
    pub trigger: TriggerConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            campaign_active: true,
            campaign_name: "Novo Fluxo".to_string(),
            layout: LayoutConfig::default(),
            panels: PanelConfig::default(),
            canvas: CanvasConfig::default(),
            trigger: TriggerConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    /// Load from `$FLOW_BUILDER_CONFIG` or `./flow_builder.toml`, defaulting when absent
    pub fn load_or_default() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        if path.exists() {
            Self::load(&path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("layout.node_width", self.layout.node_width),
            ("layout.node_height", self.layout.node_height),
            ("panels.add_node_width", self.panels.add_node_width),
            ("panels.add_node_height", self.panels.add_node_height),
            ("panels.config_width", self.panels.config_width),
            ("panels.auto_writing_width", self.panels.auto_writing_width),
            ("panels.message_preview_width", self.panels.message_preview_width),
            ("canvas.min_zoom", self.canvas.min_zoom),
            ("canvas.zoom_step", self.canvas.zoom_step),
        ];
        for (name, value) in sizes {
            if !(value > 0.0) {
                return Err(FlowError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.layout.viewport_margin < 0.0 {
            return Err(FlowError::Config("layout.viewport_margin must not be negative".to_string()));
        }
        if self.canvas.min_zoom > self.canvas.max_zoom {
            return Err(FlowError::Config(format!(
                "canvas.min_zoom ({}) exceeds canvas.max_zoom ({})",
                self.canvas.min_zoom, self.canvas.max_zoom
            )));
        }
        Ok(())
    }
}
