use anyhow::{Context, Result};
use flow_builder::{
    init_logging, ClickTarget, DropTarget, EditorConfig, FlowEditor, InputEvent, Point, Size,
    TRIGGER_NODE_ID,
};

fn main() -> Result<()> {
    init_logging();

    let config = EditorConfig::load_or_default().context("Failed to load editor config")?;
    println!("Flow Builder - {}", config.campaign_name);
    println!("=============================\n");

    let mut editor = FlowEditor::new(config);
    editor.set_viewport_size(Size::new(1280.0, 800.0));
    let trigger = TRIGGER_NODE_ID.into();

    // Extend the flow from the trigger through the add-node panel
    editor.handle(InputEvent::PrimaryClick {
        target: ClickTarget::Affordance(trigger),
        position: Point::new(500.0, 200.0),
    })?;
    let anchor = editor.panels().add_node().anchor;
    println!("✓ Opened add-node panel at ({:.0}, {:.0})", anchor.x, anchor.y);

    let whatsapp = editor
        .catalog()
        .find("WhatsApp")
        .context("WhatsApp connector missing from catalog")?;
    let message_node = editor
        .select_connector(&whatsapp)?
        .context("Add-node panel was not open")?;
    println!("✓ Added WhatsApp node {}", message_node);

    // Write the message and personalize it with an auto-writing
    editor.handle(InputEvent::PrimaryClick {
        target: ClickTarget::Node(message_node.clone()),
        position: Point::new(500.0, 320.0),
    })?;
    editor.edit_configured_message(|message| {
        if let Some(block) = message.blocks.first_mut() {
            block.content.push_str("Olá ");
        }
    })?;
    editor.panels_mut().open_auto_writing();
    editor.apply_auto_writing(1)?;
    editor.panels_mut().open_message_preview();

    if let Some(message) = editor.configured_message() {
        for block in &message.blocks {
            let variables = flow_builder::template_variables(&block.content);
            println!("  └─ {:?}: {:?} uses {:?}", block.kind, block.content, variables);
        }
    }

    // Drop a timer onto the message node
    let timer = editor
        .catalog()
        .find("Timer")
        .context("Timer connector missing from catalog")?;
    editor.handle(InputEvent::Drop {
        payload: timer.to_drag_payload()?,
        position: Point::new(500.0, 600.0),
        onto: DropTarget::Node(message_node),
    })?;
    println!("✓ Dropped Timer below the message");

    editor.handle(InputEvent::SetCampaignActive(false))?;
    println!("✓ Paused campaign");

    println!("\n📊 Flow Structure:");
    for node in editor.graph().sorted_nodes() {
        println!(
            "  └─ {} [{}] at ({:.0}, {:.0})",
            node.label,
            node.kind.label(),
            node.position.x,
            node.position.y
        );
    }
    for edge in editor.graph().edges() {
        println!("  └─ {} ({:?}, animated: {})", edge.id, edge.style_state, edge.animated);
    }
    println!("  └─ Events logged: {}", editor.graph().events().len());

    Ok(())
}
