use crate::catalog::{ConnectorDescriptor, VisualTag};
use crate::message::MessageConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ulid::Ulid;

/// Stable string identifier of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, unique node id
    pub fn generate() -> Self {
        Self(format!("node-{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A point, either in graph space or in screen space depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rectangle::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Node kind determines rendering and which panels a node can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Trigger,
    Action,
    Condition,
    Error,
    Placeholder,
    Terminal,
}

impl NodeKind {
    /// Caption shown under the node label
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Trigger => "Gatilho",
            NodeKind::Action => "Ação",
            NodeKind::Condition => "Condição",
            NodeKind::Error => "Tratamento de erro",
            NodeKind::Placeholder => "Nó",
            NodeKind::Terminal => "Fim",
        }
    }
}

/// Per-node configuration edited through the config panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum NodeConfig {
    #[default]
    None,
    Message(MessageConfig),
}

impl NodeConfig {
    /// Messaging connectors carry a message; everything else has no config
    pub fn for_connector(connector: &ConnectorDescriptor) -> Self {
        if connector.is_messaging() {
            NodeConfig::Message(MessageConfig::new(format!("Enviar mensagem {}", connector.name)))
        } else {
            NodeConfig::None
        }
    }

    pub fn as_message(&self) -> Option<&MessageConfig> {
        match self {
            NodeConfig::Message(message) => Some(message),
            NodeConfig::None => None,
        }
    }

    pub(crate) fn as_message_mut(&mut self) -> Option<&mut MessageConfig> {
        match self {
            NodeConfig::Message(message) => Some(message),
            NodeConfig::None => None,
        }
    }
}

/// A node in the flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    /// Top-left corner in graph space
    pub position: Point,

    pub kind: NodeKind,

    pub label: String,

    pub visual_tag: VisualTag,

    /// Whether the "add" affordance below the node is visible
    pub has_open_affordance: bool,

    pub config: NodeConfig,
}

impl Node {
    /// Create the flow's entry node
    pub fn trigger(id: NodeId, position: Point, label: impl Into<String>, visual_tag: VisualTag) -> Self {
        Self {
            id,
            position,
            kind: NodeKind::Trigger,
            label: label.into(),
            visual_tag,
            has_open_affordance: true,
            config: NodeConfig::None,
        }
    }

    /// Create an action node from a catalog connector
    pub fn action(connector: &ConnectorDescriptor, position: Point) -> Self {
        Self {
            id: NodeId::generate(),
            position,
            kind: NodeKind::Action,
            label: connector.name.clone(),
            visual_tag: connector.visual_tag.clone(),
            has_open_affordance: true,
            config: NodeConfig::for_connector(connector),
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.kind == NodeKind::Trigger
    }

    /// The trigger never receives edges
    pub fn accepts_incoming(&self) -> bool {
        !self.is_trigger()
    }

    /// Whether a click on this node should open the config panel
    pub fn opens_config(&self) -> bool {
        match self.kind {
            NodeKind::Action => matches!(self.config, NodeConfig::Message(_)),
            NodeKind::Trigger
            | NodeKind::Condition
            | NodeKind::Error
            | NodeKind::Placeholder
            | NodeKind::Terminal => false,
        }
    }

    /// Bounding box in graph space for a given rendered size
    pub fn bounds(&self, size: Size) -> Rectangle {
        Rectangle::from_origin(self.position, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whatsapp() -> ConnectorDescriptor {
        ConnectorDescriptor::new("WhatsApp", VisualTag::new("message-square", "green-500"), "Mensagens WhatsApp", "Canais")
    }

    fn timer() -> ConnectorDescriptor {
        ConnectorDescriptor::new("Timer", VisualTag::new("timer", "gray-600"), "Atrasos e agendamentos", "Controles")
    }

    #[test]
    fn test_node_id_generation() {
        let first = NodeId::generate();
        let second = NodeId::generate();
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("node-"));
    }

    #[test]
    fn test_action_node_from_connector() {
        let node = Node::action(&whatsapp(), Point::new(10.0, 20.0));
        assert_eq!(node.kind, NodeKind::Action);
        assert_eq!(node.label, "WhatsApp");
        assert!(node.has_open_affordance);
        assert!(node.opens_config());

        let node = Node::action(&timer(), Point::ZERO);
        assert_eq!(node.config, NodeConfig::None);
        assert!(!node.opens_config());
    }

    #[test]
    fn test_trigger_node() {
        let node = Node::trigger(
            NodeId::new("trigger-1"),
            Point::new(400.0, 100.0),
            "Gatilho Inicial",
            VisualTag::new("zap", "yellow-500"),
        );
        assert!(node.is_trigger());
        assert!(!node.accepts_incoming());
        assert!(!node.opens_config());
        assert_eq!(node.kind.label(), "Gatilho");
    }

    #[test]
    fn test_rectangle_operations() {
        let rect = Rectangle::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(rect.right(), 100.0);
        assert_eq!(rect.bottom(), 50.0);
        assert_eq!(rect.center(), Point::new(50.0, 25.0));
        assert!(rect.contains_point(Point::new(50.0, 25.0)));
        assert!(!rect.contains_point(Point::new(150.0, 25.0)));

        let other = Rectangle::new(200.0, 100.0, 10.0, 10.0);
        assert_eq!(rect.union(&other), Rectangle::new(0.0, 0.0, 210.0, 110.0));
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert_eq!(a + b, Point::new(4.0, 7.0));
        assert_eq!(b - a, Point::new(2.0, 3.0));
        assert_eq!(a.offset(1.0, -2.0), Point::new(2.0, 0.0));
        assert_eq!(Point::ZERO.distance(Point::new(3.0, 4.0)), 5.0);
    }
}
