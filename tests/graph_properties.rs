#[path = "fixtures/sample_flows.rs"]
mod sample_flows;

use flow_builder::{
    clamp_to_viewport, ConnectorCatalog, EdgeStyleState, GraphStore, NodeId, NodeKind, Point, Size,
    Viewport,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Op {
    CreateTrigger,
    AddChild { parent: usize, connector: usize },
    AddDetached { connector: usize, x: f64, y: f64 },
    Connect { source: usize, target: usize },
    Delete(Vec<usize>),
    SetCampaign(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::CreateTrigger),
        (0..32usize, 0..22usize).prop_map(|(parent, connector)| Op::AddChild { parent, connector }),
        (0..22usize, -500.0..500.0f64, -500.0..500.0f64)
            .prop_map(|(connector, x, y)| Op::AddDetached { connector, x, y }),
        (0..32usize, 0..32usize).prop_map(|(source, target)| Op::Connect { source, target }),
        prop::collection::vec(0..32usize, 0..4).prop_map(Op::Delete),
        any::<bool>().prop_map(Op::SetCampaign),
    ]
}

fn node_ids(graph: &GraphStore) -> Vec<NodeId> {
    graph.sorted_nodes().into_iter().map(|n| n.id.clone()).collect()
}

fn apply(graph: &mut GraphStore, op: &Op) {
    let catalog = ConnectorCatalog::builtin();
    let connectors = catalog.all();
    let ids = node_ids(graph);
    let pick = |i: usize| ids[i % ids.len()].clone();

    match op {
        Op::CreateTrigger => {
            graph.create_trigger_node();
        }
        Op::AddChild { parent, connector } => {
            let _ = graph.add_child_node(&pick(*parent), &connectors[*connector], None);
        }
        Op::AddDetached { connector, x, y } => {
            graph.add_detached_node(&connectors[*connector], Point::new(*x, *y));
        }
        Op::Connect { source, target } => {
            let _ = graph.connect_manually(&pick(*source), &pick(*target));
        }
        Op::Delete(indices) => {
            let doomed: BTreeSet<NodeId> = indices.iter().map(|i| pick(*i)).collect();
            graph.delete_nodes(&doomed);
        }
        Op::SetCampaign(active) => graph.set_campaign_mode(*active),
    }
}

proptest! {
    #[test]
    fn trigger_stays_unique(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut graph = GraphStore::new();
        graph.create_trigger_node();
        for op in &ops {
            apply(&mut graph, op);
            let triggers = graph.nodes().filter(|n| n.kind == NodeKind::Trigger).count();
            prop_assert_eq!(triggers, 1);
        }
    }

    #[test]
    fn edges_never_dangle(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut graph = GraphStore::new();
        graph.create_trigger_node();
        for op in &ops {
            apply(&mut graph, op);
            for edge in graph.edges() {
                prop_assert!(graph.contains(&edge.source));
                prop_assert!(graph.contains(&edge.target));
            }
        }
    }

    #[test]
    fn edge_style_follows_mode(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut graph = GraphStore::new();
        graph.create_trigger_node();
        for op in &ops {
            apply(&mut graph, op);
        }
        let active = graph.campaign_mode().is_active();
        for edge in graph.edges() {
            prop_assert_eq!(edge.animated, active);
            prop_assert_eq!(edge.style_state == EdgeStyleState::Active, active);
        }
    }

    #[test]
    fn transform_round_trips(
        pan_x in -10_000.0..10_000.0f64,
        pan_y in -10_000.0..10_000.0f64,
        zoom in 0.2..4.0f64,
        x in -10_000.0..10_000.0f64,
        y in -10_000.0..10_000.0f64,
    ) {
        let viewport = Viewport::with_transform(Point::new(pan_x, pan_y), zoom, Size::new(1280.0, 800.0));
        let point = Point::new(x, y);
        let back = viewport.screen_to_graph(viewport.graph_to_screen(point));
        prop_assert!((back.x - x).abs() < 1e-6);
        prop_assert!((back.y - y).abs() < 1e-6);
    }

    #[test]
    fn clamp_is_idempotent_and_contained(
        x in -3_000.0..5_000.0f64,
        y in -3_000.0..5_000.0f64,
        width in 50.0..3_000.0f64,
        height in 50.0..3_000.0f64,
    ) {
        let panel = Size::new(400.0, 380.0);
        let viewport = Size::new(width, height);
        let margin = 10.0;

        let once = clamp_to_viewport(Point::new(x, y), panel, viewport, margin);
        let twice = clamp_to_viewport(once, panel, viewport, margin);
        prop_assert_eq!(once, twice);

        if width >= panel.width + 2.0 * margin {
            prop_assert!(once.x >= margin);
            prop_assert!(once.x + panel.width <= width - margin + 1e-9);
        }
        if height >= panel.height + 2.0 * margin {
            prop_assert!(once.y >= margin);
            prop_assert!(once.y + panel.height <= height - margin + 1e-9);
        }
    }
}

#[test]
fn pausing_restyles_five_edges() {
    let (mut graph, _, children) = sample_flows::fan_out(5);
    assert_eq!(children.len(), 5);
    assert_eq!(graph.edge_count(), 5);
    assert!(graph.edges().all(|e| e.animated));

    graph.set_campaign_mode(false);
    let paused = graph
        .edges()
        .filter(|e| e.style_state == EdgeStyleState::Paused && !e.animated)
        .count();
    assert_eq!(paused, 5);
}

#[test]
fn cascade_from_middle_of_chain() {
    let (mut graph, trigger, whatsapp, timer) = sample_flows::linear_flow();
    let outcome = graph.delete_nodes(&[whatsapp.clone()].into_iter().collect());

    assert_eq!(outcome.removed_edges.len(), 2);
    assert!(graph.edges().all(|e| !e.involves(&whatsapp)));
    assert!(graph.contains(&trigger));
    assert!(graph.contains(&timer));
}
