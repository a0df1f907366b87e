use crate::config::EditorConfig;
use crate::node::{Node, Point, Size};
use crate::transform::Viewport;

/// Computes on-screen positions for panels anchored to graph elements
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementEngine {
    node_size: Size,
    /// Space below a node reserved for the affordance button, its connector line and padding
    anchor_offset: f64,
    margin: f64,
}

impl PlacementEngine {
    pub fn new(node_size: Size, anchor_offset: f64, margin: f64) -> Self {
        Self {
            node_size,
            anchor_offset,
            margin,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let layout = &config.layout;
        Self::new(
            layout.node_size(),
            layout.affordance_button_height + layout.connector_line_height + layout.anchor_padding,
            layout.viewport_margin,
        )
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn anchor_offset(&self) -> f64 {
        self.anchor_offset
    }

    /// Horizontal center of the node, below the space taken by its affordance
    pub fn anchor_in_graph(&self, node: &Node) -> Point {
        Point::new(
            node.position.x + self.node_size.width / 2.0,
            node.position.y + self.node_size.height + self.anchor_offset,
        )
    }

    /// Top-left screen position of a `panel` hanging below `node`, kept inside the viewport
    pub fn place_below(&self, node: &Node, panel: Size, viewport: &Viewport) -> Point {
        let screen = viewport.graph_to_screen(self.anchor_in_graph(node));
        let centered = Point::new(screen.x - panel.width / 2.0, screen.y);
        self.clamp(centered, panel, viewport.size)
    }

    pub fn clamp(&self, position: Point, panel: Size, viewport: Size) -> Point {
        clamp_to_viewport(position, panel, viewport, self.margin)
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Move `position` so a `panel` placed there stays `margin` away from every viewport edge.
///
/// When the viewport is narrower than `panel + 2 * margin` the far edge wins.
pub fn clamp_to_viewport(position: Point, panel: Size, viewport: Size, margin: f64) -> Point {
    Point::new(
        clamp_axis(position.x, panel.width, viewport.width, margin),
        clamp_axis(position.y, panel.height, viewport.height, margin),
    )
}

fn clamp_axis(start: f64, extent: f64, available: f64, margin: f64) -> f64 {
    let mut value = start;
    if value < margin {
        value = margin;
    }
    if value + extent > available - margin {
        value = available - margin - extent;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VisualTag;
    use crate::node::NodeId;

    fn node_at(x: f64, y: f64) -> Node {
        Node::trigger(NodeId::new("trigger-1"), Point::new(x, y), "Gatilho", VisualTag::new("zap", "yellow-500"))
    }

    #[test]
    fn test_anchor_offset_matches_affordance() {
        let engine = PlacementEngine::default();
        // 32 button + 16 line + 40 padding
        assert_eq!(engine.anchor_offset(), 88.0);
        assert_eq!(engine.anchor_in_graph(&node_at(400.0, 100.0)), Point::new(500.0, 258.0));
    }

    #[test]
    fn test_place_below_centers_panel() {
        let engine = PlacementEngine::default();
        let viewport = Viewport::new(Size::new(1280.0, 800.0));
        let position = engine.place_below(&node_at(400.0, 100.0), Size::new(400.0, 380.0), &viewport);
        assert_eq!(position, Point::new(300.0, 258.0));
    }

    #[test]
    fn test_place_below_follows_viewport() {
        let engine = PlacementEngine::default();
        let viewport = Viewport::with_transform(Point::new(-100.0, 20.0), 0.5, Size::new(1280.0, 800.0));
        let position = engine.place_below(&node_at(400.0, 100.0), Size::new(400.0, 380.0), &viewport);
        // anchor (500, 258) -> screen (150, 149)
        assert_eq!(position, Point::new(10.0, 149.0));
    }

    #[test]
    fn test_clamp_edges() {
        let panel = Size::new(400.0, 380.0);
        let viewport = Size::new(1000.0, 600.0);

        assert_eq!(clamp_to_viewport(Point::new(-50.0, -5.0), panel, viewport, 10.0), Point::new(10.0, 10.0));
        assert_eq!(clamp_to_viewport(Point::new(900.0, 500.0), panel, viewport, 10.0), Point::new(590.0, 210.0));
        assert_eq!(clamp_to_viewport(Point::new(100.0, 100.0), panel, viewport, 10.0), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let panel = Size::new(400.0, 380.0);
        let viewport = Size::new(300.0, 200.0);
        let once = clamp_to_viewport(Point::new(-80.0, 999.0), panel, viewport, 10.0);
        let twice = clamp_to_viewport(once, panel, viewport, 10.0);
        assert_eq!(once, twice);
    }
}
