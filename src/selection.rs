use crate::edge::Edge;
use crate::error::Result;
use crate::graph::{DeleteOutcome, GraphStore};
use crate::input::ClickTarget;
use crate::node::{Node, NodeId, Point};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Normal,
    Selecting,
}

/// Copy/delete menu opened by a secondary click on a selected node
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Screen position of the menu's top-left corner
    pub anchor: Point,
    pub node_id: NodeId,
}

/// Serialized form of a copied selection
#[derive(Debug, Serialize)]
struct SelectionSnapshot<'a> {
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
}

/// Multi-select state machine gating the contextual actions
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    mode: SelectionMode,
    selected: BTreeSet<NodeId>,
    menu: Option<ContextMenu>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    pub fn selection(&self) -> &BTreeSet<NodeId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.contains(id)
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            SelectionMode::Normal => SelectionMode::Selecting,
            SelectionMode::Selecting => SelectionMode::Normal,
        };
        self.set_mode(next);
    }

    /// Leaving selection mode always empties the set and closes the menu
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode == SelectionMode::Normal {
            self.selected.clear();
            self.menu = None;
        }
        if self.mode != mode {
            debug!(?mode, "Selection mode changed");
        }
        self.mode = mode;
    }

    /// Add or remove a node while selecting. Returns whether it is now selected.
    pub fn toggle_node(&mut self, id: &NodeId) -> bool {
        if !self.is_selecting() {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Returns true when the click was consumed as a selection toggle
    pub fn handle_primary_click(&mut self, target: &ClickTarget) -> bool {
        if self.menu.is_some() && *target != ClickTarget::ContextMenu {
            self.menu = None;
        }
        match target {
            ClickTarget::Node(id) if self.is_selecting() => {
                self.toggle_node(id);
                true
            }
            _ => false,
        }
    }

    /// Open the context menu at `anchor` if `id` is selected
    pub fn secondary_click(&mut self, id: &NodeId, anchor: Point) -> bool {
        if !self.is_selecting() || !self.selected.contains(id) {
            debug!(node = %id, "Context menu needs a selected node");
            return false;
        }
        self.menu = Some(ContextMenu {
            anchor,
            node_id: id.clone(),
        });
        true
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Serialize the selected nodes and the edges between them. Read-only.
    pub fn copy_selection(&mut self, graph: &GraphStore) -> Result<String> {
        let mut nodes: Vec<&Node> = self.selected.iter().filter_map(|id| graph.node(id)).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<&Edge> = graph
            .edges()
            .filter(|e| self.selected.contains(&e.source) && self.selected.contains(&e.target))
            .collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        let json = serde_json::to_string_pretty(&SelectionSnapshot { nodes, edges })?;
        info!(nodes = self.selected.len(), selection = %json, "Copied selection");
        self.menu = None;
        Ok(json)
    }

    /// Delete every selected node, then clear the set and close the menu
    pub fn delete_selection(&mut self, graph: &mut GraphStore) -> DeleteOutcome {
        let outcome = graph.delete_nodes(&self.selected);
        self.selected.clear();
        self.menu = None;
        outcome
    }

    /// Forget ids that no longer exist in the graph
    pub fn prune(&mut self, graph: &GraphStore) {
        self.selected.retain(|id| graph.contains(id));
        if let Some(menu) = &self.menu {
            if !graph.contains(&menu.node_id) {
                self.menu = None;
            }
        }
    }
}
