// Helper functions to build editors and graphs in known shapes

#![allow(dead_code)]

use flow_builder::{ConnectorCatalog, ConnectorDescriptor, FlowEditor, GraphStore, NodeId, Size};

pub fn connector(name: &str) -> ConnectorDescriptor {
    ConnectorCatalog::builtin()
        .find(name)
        .unwrap_or_else(|| panic!("connector {} missing from builtin catalog", name))
}

/// Graph with trigger -> WhatsApp -> Timer built through the panel path
pub fn linear_flow() -> (GraphStore, NodeId, NodeId, NodeId) {
    let mut graph = GraphStore::new();
    let trigger = graph.create_trigger_node();
    let whatsapp = graph.add_child_node(&trigger, &connector("WhatsApp"), None).unwrap();
    let timer = graph.add_child_node(&whatsapp, &connector("Timer"), None).unwrap();
    (graph, trigger, whatsapp, timer)
}

/// Trigger with `count` children, one per connector in catalog order
pub fn fan_out(count: usize) -> (GraphStore, NodeId, Vec<NodeId>) {
    let mut graph = GraphStore::new();
    let trigger = graph.create_trigger_node();
    let children = ConnectorCatalog::builtin()
        .all()
        .iter()
        .cycle()
        .take(count)
        .map(|c| graph.add_child_node(&trigger, c, None).unwrap())
        .collect();
    (graph, trigger, children)
}

/// Editor sized like the default desktop window
pub fn desktop_editor() -> FlowEditor {
    let mut editor = FlowEditor::default();
    editor.set_viewport_size(Size::new(1280.0, 800.0));
    editor
}
