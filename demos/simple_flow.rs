/// Example: Building and pruning a small messaging flow
///
/// This example demonstrates:
/// - Extending the flow from the trigger's affordance
/// - Dropping connectors onto nodes and onto empty canvas
/// - Connecting nodes manually
/// - Selecting nodes, copying and deleting them
/// - Pausing the campaign

use anyhow::{Context, Result};
use flow_builder::*;

fn main() -> Result<()> {
    init_logging();
    println!("=== Flow Builder: Simple Flow Example ===\n");

    let mut editor = FlowEditor::default();
    editor.set_viewport_size(Size::new(1280.0, 800.0));
    let trigger = NodeId::new(TRIGGER_NODE_ID);

    // Step 1: Add an SMS node through the add-node panel
    println!("Step 1: Adding a node from the panel...");
    editor.handle(InputEvent::PrimaryClick {
        target: ClickTarget::Affordance(trigger.clone()),
        position: Point::new(500.0, 200.0),
    })?;
    editor.panels_mut().set_add_node_search("sms");
    let sms = editor
        .filtered_connectors()
        .into_iter()
        .next()
        .context("No connector matches 'sms'")?;
    let sms_node = editor.select_connector(&sms)?.context("Panel closed unexpectedly")?;
    println!("  ✓ Added '{}' below the trigger", sms.name);

    // Step 2: Drop connectors
    println!("\nStep 2: Dropping connectors...");
    let timer = editor.catalog().find("Timer").context("Timer missing")?;
    editor.handle(InputEvent::Drop {
        payload: timer.to_drag_payload()?,
        position: Point::new(500.0, 480.0),
        onto: DropTarget::Node(sms_node.clone()),
    })?;
    println!("  ✓ Dropped Timer onto the SMS node");

    let email = editor.catalog().find("Email").context("Email missing")?;
    editor.handle(InputEvent::Drop {
        payload: email.to_drag_payload()?,
        position: Point::new(900.0, 300.0),
        onto: DropTarget::Canvas,
    })?;
    let email_node = editor
        .graph()
        .nodes()
        .find(|n| n.label == "Email")
        .map(|n| n.id.clone())
        .context("Email node missing")?;
    println!("  ✓ Dropped a detached Email node");

    // Step 3: Connect the detached node
    println!("\nStep 3: Connecting manually...");
    editor.handle(InputEvent::Connect {
        source: sms_node.clone(),
        target: email_node.clone(),
    })?;
    println!("  ✓ SMS → Email ({} edges)", editor.graph().edge_count());

    // Step 4: Select, copy and delete
    println!("\nStep 4: Selecting nodes...");
    editor.handle(InputEvent::ToggleSelectMode)?;
    for id in [&sms_node, &email_node] {
        editor.handle(InputEvent::PrimaryClick {
            target: ClickTarget::Node(id.clone()),
            position: Point::ZERO,
        })?;
    }
    editor.handle(InputEvent::SecondaryClick {
        node: email_node.clone(),
        position: Point::new(1270.0, 790.0),
    })?;
    if let Some(menu) = editor.selection().context_menu() {
        println!("  ✓ Context menu at ({:.0}, {:.0})", menu.anchor.x, menu.anchor.y);
    }

    let copied = editor.copy_selection()?;
    println!("  ✓ Copied {} bytes of JSON", copied.len());

    let outcome = editor.delete_selection();
    println!(
        "  ✓ Deleted {} nodes and {} edges",
        outcome.removed_nodes.len(),
        outcome.removed_edges.len()
    );
    if editor.graph().node(&trigger).is_some_and(|n| n.has_open_affordance) {
        println!("  ✓ Trigger can be extended again");
    }

    // Step 5: Pause the campaign
    println!("\nStep 5: Pausing the campaign...");
    editor.handle(InputEvent::SetCampaignActive(false))?;
    for edge in editor.graph().edges() {
        let stroke = EdgeStroke::for_edge(edge);
        println!("  └─ {} dashed: {}", edge.id, stroke.dash.is_some());
    }

    println!("\n📊 Final flow: {} nodes, {} edges, {} events",
        editor.graph().node_count(),
        editor.graph().edge_count(),
        editor.graph().events().len()
    );
    Ok(())
}
