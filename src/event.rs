use crate::edge::EdgeId;
use crate::node::{NodeId, NodeKind, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Types of events recorded by the graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    NodeCreated {
        id: NodeId,
        kind: NodeKind,
        position: Point,
        label: String,
    },

    NodeMoved {
        id: NodeId,
        position: Point,
    },

    EdgeCreated {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    },

    NodesDeleted {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },

    AffordanceChanged {
        id: NodeId,
        visible: bool,
    },

    CampaignModeChanged {
        active: bool,
        restyled_edges: usize,
    },

    MessageConfigChanged {
        id: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = GraphEvent::new(EventType::NodeCreated {
            id: NodeId::new("trigger-1"),
            kind: NodeKind::Trigger,
            position: Point::new(400.0, 100.0),
            label: "Gatilho Inicial".to_string(),
        });

        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization() {
        let event = GraphEvent::new(EventType::EdgeCreated {
            id: EdgeId::between(&NodeId::new("a"), &NodeId::new("b")),
            source: NodeId::new("a"),
            target: NodeId::new("b"),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GraphEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event, event.event);
    }
}
