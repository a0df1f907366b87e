use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Edge ids are derived from their endpoints
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e-{}-{}", source, target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyleState {
    Active,
    Paused,
}

/// Campaign-wide active/paused flag driving edge styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMode {
    active: bool,
}

impl CampaignMode {
    pub fn new(active: bool) -> Self {
        Self { active }
    }

    pub fn is_active(self) -> bool {
        self.active
    }

    pub fn animated(self) -> bool {
        self.active
    }

    pub fn style_state(self) -> EdgeStyleState {
        if self.active {
            EdgeStyleState::Active
        } else {
            EdgeStyleState::Paused
        }
    }
}

impl Default for CampaignMode {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,

    pub source: NodeId,

    pub target: NodeId,

    pub animated: bool,

    pub style_state: EdgeStyleState,
}

impl Edge {
    /// Create an edge styled for the given campaign mode
    pub(crate) fn new(source: NodeId, target: NodeId, mode: CampaignMode) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            animated: mode.animated(),
            style_state: mode.style_state(),
        }
    }

    /// Style is a pure function of the campaign mode
    pub(crate) fn restyle(&mut self, mode: CampaignMode) {
        self.animated = mode.animated();
        self.style_state = mode.style_state();
    }

    pub fn involves(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    pub fn starts_from(&self, node_id: &NodeId) -> bool {
        &self.source == node_id
    }

    pub fn ends_at(&self, node_id: &NodeId) -> bool {
        &self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_creation() {
        let edge = Edge::new(NodeId::new("a"), NodeId::new("b"), CampaignMode::default());
        assert_eq!(edge.id.as_str(), "e-a-b");
        assert!(edge.animated);
        assert_eq!(edge.style_state, EdgeStyleState::Active);
    }

    #[test]
    fn test_edge_involves() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let edge = Edge::new(a.clone(), b.clone(), CampaignMode::default());

        assert!(edge.involves(&a));
        assert!(edge.involves(&b));
        assert!(!edge.involves(&NodeId::new("c")));
        assert!(edge.starts_from(&a));
        assert!(!edge.starts_from(&b));
        assert!(edge.ends_at(&b));
    }

    #[test]
    fn test_restyle_follows_mode() {
        let mut edge = Edge::new(NodeId::new("a"), NodeId::new("b"), CampaignMode::new(false));
        assert!(!edge.animated);
        assert_eq!(edge.style_state, EdgeStyleState::Paused);

        edge.restyle(CampaignMode::new(true));
        assert!(edge.animated);
        assert_eq!(edge.style_state, EdgeStyleState::Active);
    }
}
