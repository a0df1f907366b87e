use crate::catalog::{ConnectorDescriptor, VisualTag};
use crate::config::{EditorConfig, TriggerConfig};
use crate::edge::{CampaignMode, Edge, EdgeId};
use crate::error::{FlowError, Result};
use crate::event::{EventType, GraphEvent};
use crate::message::MessageConfig;
use crate::node::{Node, NodeId, Point, Rectangle, Size};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Id of the flow's entry node
pub const TRIGGER_NODE_ID: &str = "trigger-1";

/// What a `delete_nodes` call actually removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed_nodes: Vec<NodeId>,
    pub removed_edges: Vec<EdgeId>,
    /// Set when the trigger was part of the request and was kept
    pub refused: Option<NodeId>,
}

impl DeleteOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed_nodes.is_empty() && self.removed_edges.is_empty()
    }
}

/// Owns every node and edge of the flow
#[derive(Debug, Clone)]
pub struct GraphStore {
    /// All nodes indexed by ID
    nodes: HashMap<NodeId, Node>,

    /// Edges keyed by (source, target)
    edges: HashMap<(NodeId, NodeId), Edge>,

    trigger: Option<NodeId>,

    campaign: CampaignMode,

    /// Event log for history tracking
    events: Vec<GraphEvent>,

    trigger_template: TriggerConfig,

    child_vertical_offset: f64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            trigger: None,
            campaign: CampaignMode::new(config.campaign_active),
            events: Vec::new(),
            trigger_template: config.trigger.clone(),
            child_vertical_offset: config.layout.child_vertical_offset,
        }
    }

    // ========== Node Operations ==========

    /// Create the entry node. A no-op returning the existing id when a trigger exists.
    pub fn create_trigger_node(&mut self) -> NodeId {
        if let Some(id) = &self.trigger {
            debug!(node = %id, "Trigger already exists");
            return id.clone();
        }

        let template = &self.trigger_template;
        let node = Node::trigger(
            NodeId::new(TRIGGER_NODE_ID),
            template.position(),
            template.label.clone(),
            VisualTag::new(template.icon.clone(), template.color.clone()),
        );
        let id = node.id.clone();
        info!(node = %id, "Created trigger node");
        self.insert_node(node);
        self.trigger = Some(id.clone());
        id
    }

    /// Add an action node below `parent` (or at `drop_position`) connected from it
    pub fn add_child_node(
        &mut self,
        parent_id: &NodeId,
        connector: &ConnectorDescriptor,
        drop_position: Option<Point>,
    ) -> Result<NodeId> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| FlowError::InvalidParent(parent_id.clone()))?;

        let position =
            drop_position.unwrap_or_else(|| parent.position.offset(0.0, self.child_vertical_offset));
        let node = Node::action(connector, position);
        let child_id = node.id.clone();
        self.insert_node(node);
        self.insert_edge(parent_id.clone(), child_id.clone());
        self.set_affordance(parent_id, false);

        info!(parent = %parent_id, node = %child_id, connector = %connector.name, "Added child node");
        Ok(child_id)
    }

    /// Add an unconnected action node, as produced by dropping on empty canvas
    pub fn add_detached_node(&mut self, connector: &ConnectorDescriptor, position: Point) -> NodeId {
        let node = Node::action(connector, position);
        let id = node.id.clone();
        self.insert_node(node);
        info!(node = %id, connector = %connector.name, "Added detached node");
        id
    }

    /// Move a node to a new graph-space position
    pub fn move_node(&mut self, id: &NodeId, position: Point) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FlowError::NodeNotFound(id.clone()))?;
        node.position = position;
        self.log_event(EventType::NodeMoved {
            id: id.clone(),
            position,
        });
        Ok(())
    }

    /// Fails with `ProtectedNodeDeletion` for the trigger
    pub fn check_deletable(&self, id: &NodeId) -> Result<()> {
        match self.nodes.get(id) {
            Some(node) if node.is_trigger() => Err(FlowError::ProtectedNodeDeletion(id.clone())),
            Some(_) => Ok(()),
            None => Err(FlowError::NodeNotFound(id.clone())),
        }
    }

    /// Remove nodes and every edge touching them. The trigger is silently kept.
    pub fn delete_nodes(&mut self, ids: &BTreeSet<NodeId>) -> DeleteOutcome {
        let mut outcome = DeleteOutcome::default();
        if ids.is_empty() {
            return outcome;
        }

        let mut doomed = BTreeSet::new();
        for id in ids {
            match self.check_deletable(id) {
                Ok(()) => {
                    doomed.insert(id.clone());
                }
                Err(FlowError::ProtectedNodeDeletion(id)) => {
                    debug!(node = %id, "Refused to delete trigger node");
                    outcome.refused = Some(id);
                }
                Err(_) => debug!(node = %id, "Skipping unknown node"),
            }
        }
        if doomed.is_empty() {
            return outcome;
        }

        let edge_keys: Vec<(NodeId, NodeId)> = self
            .edges
            .keys()
            .filter(|(source, target)| doomed.contains(source) || doomed.contains(target))
            .cloned()
            .collect();
        let mut orphaned_sources = BTreeSet::new();
        for key in edge_keys {
            if let Some(edge) = self.edges.remove(&key) {
                if !doomed.contains(&edge.source) {
                    orphaned_sources.insert(edge.source.clone());
                }
                outcome.removed_edges.push(edge.id);
            }
        }

        for id in &doomed {
            self.nodes.remove(id);
        }
        outcome.removed_nodes = doomed.into_iter().collect();
        outcome.removed_edges.sort();

        // Survivors left without any outgoing edge can be extended again
        for source in orphaned_sources {
            if self.outgoing_edges(&source).is_empty() {
                self.set_affordance(&source, true);
            }
        }

        info!(
            nodes = outcome.removed_nodes.len(),
            edges = outcome.removed_edges.len(),
            "Deleted nodes"
        );
        self.log_event(EventType::NodesDeleted {
            nodes: outcome.removed_nodes.clone(),
            edges: outcome.removed_edges.clone(),
        });
        outcome
    }

    /// Mutate the message of a messaging node. `Ok(None)` when the node has no message.
    pub fn update_message_config<R>(
        &mut self,
        id: &NodeId,
        update: impl FnOnce(&mut MessageConfig) -> R,
    ) -> Result<Option<R>> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FlowError::NodeNotFound(id.clone()))?;
        let Some(message) = node.config.as_message_mut() else {
            return Ok(None);
        };
        let result = update(message);
        self.log_event(EventType::MessageConfigChanged { id: id.clone() });
        Ok(Some(result))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes ordered by id, for stable output
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    pub fn trigger_id(&self) -> Option<&NodeId> {
        self.trigger.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Graph-space box around every node, if any
    pub fn bounds(&self, node_size: Size) -> Option<Rectangle> {
        self.nodes
            .values()
            .map(|n| n.bounds(node_size))
            .reduce(|acc, b| acc.union(&b))
    }

    // ========== Edge Operations ==========

    /// Connect two existing nodes. Connecting an already connected pair returns the existing edge.
    pub fn connect_manually(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId> {
        if !self.nodes.contains_key(source) {
            return Err(FlowError::InvalidEndpoint(source.clone()));
        }
        match self.nodes.get(target) {
            None => return Err(FlowError::InvalidEndpoint(target.clone())),
            Some(node) if !node.accepts_incoming() => {
                return Err(FlowError::InvalidEndpoint(target.clone()))
            }
            Some(_) => {}
        }
        if source == target {
            return Err(FlowError::SelfConnection(source.clone()));
        }

        if let Some(existing) = self.edges.get(&(source.clone(), target.clone())) {
            debug!(edge = %existing.id, "Nodes already connected");
            return Ok(existing.id.clone());
        }

        let id = self.insert_edge(source.clone(), target.clone());
        info!(edge = %id, "Connected nodes manually");
        Ok(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.values().find(|e| &e.id == id)
    }

    pub fn edge_between(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        self.edges.get(&(source.clone(), target.clone()))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn outgoing_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.starts_from(id)).collect()
    }

    pub fn incoming_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.ends_at(id)).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========== Campaign Mode ==========

    pub fn campaign_mode(&self) -> CampaignMode {
        self.campaign
    }

    /// Update the mode and restyle every edge right away
    pub fn set_campaign_mode(&mut self, active: bool) {
        self.campaign = CampaignMode::new(active);
        for edge in self.edges.values_mut() {
            edge.restyle(self.campaign);
        }
        info!(active, edges = self.edges.len(), "Campaign mode changed");
        self.log_event(EventType::CampaignModeChanged {
            active,
            restyled_edges: self.edges.len(),
        });
    }

    // ========== Event Logging ==========

    fn log_event(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }

    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Internal Helpers ==========

    fn insert_node(&mut self, node: Node) {
        self.log_event(EventType::NodeCreated {
            id: node.id.clone(),
            kind: node.kind,
            position: node.position,
            label: node.label.clone(),
        });
        self.nodes.insert(node.id.clone(), node);
    }

    fn insert_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let edge = Edge::new(source.clone(), target.clone(), self.campaign);
        let id = edge.id.clone();
        self.log_event(EventType::EdgeCreated {
            id: id.clone(),
            source: source.clone(),
            target: target.clone(),
        });
        self.edges.insert((source, target), edge);
        id
    }

    fn set_affordance(&mut self, id: &NodeId, visible: bool) {
        let changed = match self.nodes.get_mut(id) {
            Some(node) if node.has_open_affordance != visible => {
                node.has_open_affordance = visible;
                true
            }
            _ => false,
        };
        if changed {
            self.log_event(EventType::AffordanceChanged {
                id: id.clone(),
                visible,
            });
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
