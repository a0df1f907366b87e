use crate::auto_writing::AutoWritingTab;
use crate::catalog::CatalogTab;
use crate::config::PanelConfig;
use crate::graph::GraphStore;
use crate::input::ClickTarget;
use crate::node::{Node, NodeId, Point};
use crate::placement::PlacementEngine;
use crate::transform::Viewport;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    AddNode,
    Config,
    AutoWriting,
    MessagePreview,
}

/// Connector picker hanging below a node's affordance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddNodePanelState {
    pub open: bool,
    /// Screen position of the top-left corner
    pub anchor: Point,
    pub parent_node_id: Option<NodeId>,
    pub search: String,
    pub tab: CatalogTab,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPanelState {
    /// Node being configured; the panel is open while this is set
    pub node_id: Option<NodeId>,
}

impl ConfigPanelState {
    pub fn is_open(&self) -> bool {
        self.node_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoWritingPanelState {
    pub open: bool,
    pub search: String,
    pub tab: AutoWritingTab,
    /// One-shot request for the renderer to focus the search input
    pub focus_requested: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePreviewState {
    pub open: bool,
}

/// Open/closed state and offsets of every overlay panel
#[derive(Debug, Clone)]
pub struct PanelCoordinator {
    add_node: AddNodePanelState,
    config: ConfigPanelState,
    auto_writing: AutoWritingPanelState,
    preview: MessagePreviewState,
    sizes: PanelConfig,
}

impl PanelCoordinator {
    pub fn new(sizes: PanelConfig) -> Self {
        Self {
            add_node: AddNodePanelState::default(),
            config: ConfigPanelState::default(),
            auto_writing: AutoWritingPanelState::default(),
            preview: MessagePreviewState::default(),
            sizes,
        }
    }

    pub fn add_node(&self) -> &AddNodePanelState {
        &self.add_node
    }

    pub fn config(&self) -> &ConfigPanelState {
        &self.config
    }

    pub fn auto_writing(&self) -> &AutoWritingPanelState {
        &self.auto_writing
    }

    pub fn message_preview(&self) -> &MessagePreviewState {
        &self.preview
    }

    pub fn sizes(&self) -> &PanelConfig {
        &self.sizes
    }

    pub fn is_open(&self, kind: PanelKind) -> bool {
        match kind {
            PanelKind::AddNode => self.add_node.open,
            PanelKind::Config => self.config.is_open(),
            PanelKind::AutoWriting => self.auto_writing.open,
            PanelKind::MessagePreview => self.preview.open,
        }
    }

    // ========== Dismissal ==========

    /// The add-node panel survives clicks inside itself and on its own affordance
    pub fn add_node_dismissed_by(&self, target: &ClickTarget) -> bool {
        if !self.add_node.open {
            return false;
        }
        match target {
            ClickTarget::AddNodePanel => false,
            ClickTarget::Affordance(id) => self.add_node.parent_node_id.as_ref() != Some(id),
            _ => true,
        }
    }

    pub fn auto_writing_dismissed_by(&self, target: &ClickTarget) -> bool {
        self.auto_writing.open && *target != ClickTarget::AutoWritingPanel
    }

    /// Apply every dismissal rule to one primary click. Returns the panels closed.
    pub fn handle_primary_click(&mut self, target: &ClickTarget) -> Vec<PanelKind> {
        let mut closed = Vec::new();
        if self.add_node_dismissed_by(target) {
            self.close_add_node();
            closed.push(PanelKind::AddNode);
        }
        if self.auto_writing_dismissed_by(target) {
            self.close_auto_writing();
            closed.push(PanelKind::AutoWriting);
        }
        closed
    }

    // ========== Add-node panel ==========

    /// Open the panel below `node`, or close it when it already belongs to `node`
    pub fn toggle_add_node(&mut self, node: &Node, placement: &PlacementEngine, viewport: &Viewport) -> bool {
        if self.add_node.open && self.add_node.parent_node_id.as_ref() == Some(&node.id) {
            self.close_add_node();
            return false;
        }
        if !node.has_open_affordance {
            debug!(node = %node.id, "Node has no open affordance");
            return false;
        }
        self.add_node = AddNodePanelState {
            open: true,
            anchor: placement.place_below(node, self.sizes.add_node_size(), viewport),
            parent_node_id: Some(node.id.clone()),
            search: String::new(),
            tab: CatalogTab::All,
        };
        debug!(node = %node.id, x = self.add_node.anchor.x, y = self.add_node.anchor.y, "Opened add-node panel");
        true
    }

    pub fn close_add_node(&mut self) {
        if self.add_node.open {
            debug!("Closed add-node panel");
        }
        self.add_node.open = false;
        self.add_node.parent_node_id = None;
    }

    pub fn set_add_node_search(&mut self, term: impl Into<String>) {
        self.add_node.search = term.into();
    }

    pub fn set_add_node_tab(&mut self, tab: CatalogTab) {
        self.add_node.tab = tab;
    }

    // ========== Config panel ==========

    /// Open the config panel for nodes that have something to configure
    pub fn open_config(&mut self, node: &Node) -> bool {
        if !node.opens_config() {
            debug!(node = %node.id, kind = ?node.kind, "Node has no config panel");
            return false;
        }
        self.config.node_id = Some(node.id.clone());
        debug!(node = %node.id, "Opened config panel");
        true
    }

    pub fn close_config(&mut self) {
        self.config.node_id = None;
    }

    // ========== Auto-writing panel ==========

    /// Opening always starts from an empty search and asks for input focus
    pub fn open_auto_writing(&mut self) {
        self.auto_writing.open = true;
        self.auto_writing.search.clear();
        self.auto_writing.focus_requested = true;
        debug!("Opened auto-writing panel");
    }

    pub fn close_auto_writing(&mut self) {
        self.auto_writing.open = false;
        self.auto_writing.focus_requested = false;
    }

    pub fn toggle_auto_writing(&mut self) {
        if self.auto_writing.open {
            self.close_auto_writing();
        } else {
            self.open_auto_writing();
        }
    }

    /// Consume the pending focus request, if any
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.auto_writing.focus_requested)
    }

    pub fn set_auto_writing_search(&mut self, term: impl Into<String>) {
        self.auto_writing.search = term.into();
    }

    pub fn set_auto_writing_tab(&mut self, tab: AutoWritingTab) {
        self.auto_writing.tab = tab;
    }

    // ========== Message preview ==========

    pub fn open_message_preview(&mut self) {
        self.preview.open = true;
    }

    pub fn close_message_preview(&mut self) {
        self.preview.open = false;
    }

    pub fn toggle_message_preview(&mut self) {
        self.preview.open = !self.preview.open;
    }

    // ========== Offsets ==========

    /// Distance of a docked panel from the right screen edge
    pub fn offset(&self, kind: PanelKind) -> f64 {
        match kind {
            PanelKind::AddNode | PanelKind::Config => 0.0,
            PanelKind::AutoWriting => self.auto_writing_offset(),
            PanelKind::MessagePreview => self.message_preview_offset(),
        }
    }

    pub fn auto_writing_offset(&self) -> f64 {
        if self.config.is_open() {
            self.sizes.config_width
        } else {
            0.0
        }
    }

    pub fn message_preview_offset(&self) -> f64 {
        if self.auto_writing.open {
            self.sizes.auto_writing_width
        } else if self.config.is_open() {
            self.sizes.config_width
        } else {
            0.0
        }
    }

    // ========== Reconciliation ==========

    /// Bring panel state back in line with the graph and viewport
    pub fn reconcile(&mut self, graph: &GraphStore, placement: &PlacementEngine, viewport: &Viewport) {
        if self.add_node.open {
            let parent = self.add_node.parent_node_id.as_ref().and_then(|id| graph.node(id));
            match parent {
                Some(node) if node.has_open_affordance => {
                    self.add_node.anchor = placement.place_below(node, self.sizes.add_node_size(), viewport);
                }
                _ => self.close_add_node(),
            }
        }

        let config_missing = self
            .config
            .node_id
            .as_ref()
            .is_some_and(|id| !graph.contains(id));
        if config_missing {
            debug!("Configured node is gone, closing dependent panels");
            self.close_config();
            self.close_auto_writing();
            self.close_message_preview();
        }
    }
}

impl Default for PanelCoordinator {
    fn default() -> Self {
        Self::new(PanelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConnectorCatalog;
    use crate::node::Size;

    fn setup() -> (GraphStore, NodeId, NodeId) {
        let catalog = ConnectorCatalog::builtin();
        let mut graph = GraphStore::new();
        let trigger = graph.create_trigger_node();
        let whatsapp = graph
            .add_detached_node(&catalog.find("WhatsApp").unwrap(), Point::new(100.0, 400.0));
        (graph, trigger, whatsapp)
    }

    fn viewport() -> Viewport {
        Viewport::new(Size::new(1280.0, 800.0))
    }

    #[test]
    fn test_add_node_toggle_on_same_affordance() {
        let (graph, trigger, _) = setup();
        let placement = PlacementEngine::default();
        let mut panels = PanelCoordinator::default();
        let node = graph.node(&trigger).unwrap();

        assert!(panels.toggle_add_node(node, &placement, &viewport()));
        assert_eq!(panels.add_node().anchor, Point::new(300.0, 258.0));
        assert!(!panels.add_node_dismissed_by(&ClickTarget::Affordance(trigger.clone())));
        assert!(!panels.add_node_dismissed_by(&ClickTarget::AddNodePanel));
        assert!(panels.add_node_dismissed_by(&ClickTarget::Canvas));

        assert!(!panels.toggle_add_node(node, &placement, &viewport()));
        assert!(!panels.is_open(PanelKind::AddNode));
    }

    #[test]
    fn test_add_node_search_reset_on_open() {
        let (graph, trigger, _) = setup();
        let placement = PlacementEngine::default();
        let mut panels = PanelCoordinator::default();
        let node = graph.node(&trigger).unwrap();

        panels.toggle_add_node(node, &placement, &viewport());
        panels.set_add_node_search("whats");
        panels.set_add_node_tab(CatalogTab::Category("Canais".to_string()));
        panels.close_add_node();

        panels.toggle_add_node(node, &placement, &viewport());
        assert!(panels.add_node().search.is_empty());
        assert_eq!(panels.add_node().tab, CatalogTab::All);
    }

    #[test]
    fn test_outside_click_dismisses() {
        let (graph, trigger, _) = setup();
        let mut panels = PanelCoordinator::default();
        panels.toggle_add_node(graph.node(&trigger).unwrap(), &PlacementEngine::default(), &viewport());
        panels.open_auto_writing();

        let closed = panels.handle_primary_click(&ClickTarget::AutoWritingPanel);
        assert_eq!(closed, vec![PanelKind::AddNode]);
        assert!(panels.is_open(PanelKind::AutoWriting));

        let closed = panels.handle_primary_click(&ClickTarget::Canvas);
        assert_eq!(closed, vec![PanelKind::AutoWriting]);
    }

    #[test]
    fn test_auto_writing_independent_of_add_node() {
        let (graph, trigger, _) = setup();
        let mut panels = PanelCoordinator::default();
        panels.toggle_add_node(graph.node(&trigger).unwrap(), &PlacementEngine::default(), &viewport());

        panels.open_auto_writing();
        assert!(panels.is_open(PanelKind::AddNode));
        assert!(panels.is_open(PanelKind::AutoWriting));
    }

    #[test]
    fn test_auto_writing_open_resets_search_and_focus() {
        let mut panels = PanelCoordinator::default();
        panels.open_auto_writing();
        panels.set_auto_writing_search("nome");
        assert!(panels.take_focus_request());
        assert!(!panels.take_focus_request());

        panels.close_auto_writing();
        panels.open_auto_writing();
        assert!(panels.auto_writing().search.is_empty());
        assert!(panels.take_focus_request());
    }

    #[test]
    fn test_config_only_for_messaging_nodes() {
        let (graph, trigger, whatsapp) = setup();
        let mut panels = PanelCoordinator::default();
        assert!(!panels.open_config(graph.node(&trigger).unwrap()));
        assert!(panels.open_config(graph.node(&whatsapp).unwrap()));
        assert_eq!(panels.config().node_id, Some(whatsapp));
    }

    #[test]
    fn test_preview_offset_stacking() {
        let (graph, _, whatsapp) = setup();
        let mut panels = PanelCoordinator::default();
        panels.open_message_preview();
        assert_eq!(panels.message_preview_offset(), 0.0);

        panels.open_config(graph.node(&whatsapp).unwrap());
        assert_eq!(panels.message_preview_offset(), 480.0);
        assert_eq!(panels.auto_writing_offset(), 480.0);

        panels.open_auto_writing();
        assert_eq!(panels.offset(PanelKind::MessagePreview), 320.0);

        panels.close_config();
        assert_eq!(panels.message_preview_offset(), 320.0);
        assert_eq!(panels.auto_writing_offset(), 0.0);

        panels.close_auto_writing();
        assert_eq!(panels.message_preview_offset(), 0.0);
    }

    #[test]
    fn test_reconcile_closes_orphaned_panels() {
        let (mut graph, trigger, whatsapp) = setup();
        let placement = PlacementEngine::default();
        let mut panels = PanelCoordinator::default();
        panels.toggle_add_node(graph.node(&whatsapp).unwrap(), &placement, &viewport());
        panels.open_config(graph.node(&whatsapp).unwrap());
        panels.open_auto_writing();
        panels.open_message_preview();

        graph.delete_nodes(&[whatsapp].into_iter().collect());
        panels.reconcile(&graph, &placement, &viewport());
        assert!(!panels.is_open(PanelKind::AddNode));
        assert!(!panels.is_open(PanelKind::Config));
        assert!(!panels.is_open(PanelKind::AutoWriting));
        assert!(!panels.is_open(PanelKind::MessagePreview));

        // Re-anchors when the viewport moves
        panels.toggle_add_node(graph.node(&trigger).unwrap(), &placement, &viewport());
        let panned = Viewport::with_transform(Point::new(50.0, 0.0), 1.0, Size::new(1280.0, 800.0));
        panels.reconcile(&graph, &placement, &panned);
        assert_eq!(panels.add_node().anchor, Point::new(350.0, 258.0));
    }
}
