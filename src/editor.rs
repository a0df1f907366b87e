use crate::auto_writing::{AutoWritingCatalog, AutoWritingEntry};
use crate::catalog::{ConnectorCatalog, ConnectorDescriptor};
use crate::config::EditorConfig;
use crate::error::{FlowError, Result};
use crate::graph::{DeleteOutcome, GraphStore};
use crate::input::{ClickTarget, DropTarget, InputEvent, InteractionMode};
use crate::message::{inject_snippet, MessageConfig};
use crate::node::{NodeId, Point, Size};
use crate::panels::PanelCoordinator;
use crate::placement::{clamp_to_viewport, PlacementEngine};
use crate::selection::SelectionController;
use crate::theme::Theme;
use crate::transform::{Viewport, ZoomLimits};
use tracing::{debug, info, warn};

/// Root context wiring the graph store, selection and panels to renderer input
#[derive(Debug, Clone)]
pub struct FlowEditor {
    config: EditorConfig,
    graph: GraphStore,
    selection: SelectionController,
    panels: PanelCoordinator,
    placement: PlacementEngine,
    viewport: Viewport,
    zoom_limits: ZoomLimits,
    catalog: ConnectorCatalog,
    auto_writings: AutoWritingCatalog,
    theme: Theme,
    interaction: InteractionMode,
}

impl FlowEditor {
    /// Editor over a fresh graph holding only the trigger
    pub fn new(config: EditorConfig) -> Self {
        Self::with_catalogs(config, ConnectorCatalog::builtin(), AutoWritingCatalog::builtin())
    }

    pub fn with_catalogs(
        config: EditorConfig,
        catalog: ConnectorCatalog,
        auto_writings: AutoWritingCatalog,
    ) -> Self {
        let mut editor = Self {
            graph: GraphStore::with_config(&config),
            selection: SelectionController::new(),
            panels: PanelCoordinator::new(config.panels.clone()),
            placement: PlacementEngine::from_config(&config),
            viewport: Viewport::default(),
            zoom_limits: ZoomLimits::from_config(&config.canvas),
            catalog,
            auto_writings,
            theme: config.theme,
            interaction: InteractionMode::default(),
            config,
        };
        editor.ensure_trigger();
        editor
    }

    /// Create the trigger if the graph is empty
    pub fn ensure_trigger(&mut self) -> Option<NodeId> {
        if self.graph.node_count() > 0 {
            return None;
        }
        Some(self.graph.create_trigger_node())
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn panels(&self) -> &PanelCoordinator {
        &self.panels
    }

    /// Direct access for search and tab fields edited by the renderer
    pub fn panels_mut(&mut self) -> &mut PanelCoordinator {
        &mut self.panels
    }

    pub fn placement(&self) -> &PlacementEngine {
        &self.placement
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn catalog(&self) -> &ConnectorCatalog {
        &self.catalog
    }

    pub fn auto_writing_catalog(&self) -> &AutoWritingCatalog {
        &self.auto_writings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        debug!(theme = ?self.theme, "Theme toggled");
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.interaction = mode;
    }

    pub fn campaign_name(&self) -> &str {
        &self.config.campaign_name
    }

    /// Blank names are rejected
    pub fn rename_campaign(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        info!(name = trimmed, "Campaign renamed");
        self.config.campaign_name = trimmed.to_string();
        true
    }

    pub fn is_campaign_active(&self) -> bool {
        self.graph.campaign_mode().is_active()
    }

    /// Connect gestures are ignored while moving nodes or selecting
    pub fn can_connect(&self) -> bool {
        self.interaction == InteractionMode::Select && !self.selection.is_selecting()
    }

    // ========== Input ==========

    /// Process one renderer event to completion
    pub fn handle(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PrimaryClick { target, position } => self.primary_click(target, position),
            InputEvent::SecondaryClick { node, position } => {
                let anchor = clamp_to_viewport(
                    position,
                    self.config.panels.context_menu_size(),
                    self.viewport.size,
                    self.placement.margin(),
                );
                self.selection.secondary_click(&node, anchor);
                Ok(())
            }
            InputEvent::Drop { payload, position, onto } => {
                self.drop_connector(&payload, position, onto).map(|_| ())
            }
            InputEvent::Connect { source, target } => {
                if !self.can_connect() {
                    debug!(source = %source, target = %target, "Connect gesture ignored");
                    return Ok(());
                }
                self.graph.connect_manually(&source, &target)?;
                Ok(())
            }
            InputEvent::DragNode { node, delta } => self.drag_node(&node, delta),
            InputEvent::ViewportChanged(viewport) => {
                if !viewport.is_usable() {
                    warn!(zoom = viewport.zoom, "Ignoring degenerate viewport");
                    return Ok(());
                }
                self.viewport = Viewport {
                    zoom: self.zoom_limits.clamp(viewport.zoom),
                    ..viewport
                };
                self.reconcile();
                Ok(())
            }
            InputEvent::ToggleSelectMode => {
                self.selection.toggle_mode();
                Ok(())
            }
            InputEvent::SetCampaignActive(active) => {
                self.graph.set_campaign_mode(active);
                Ok(())
            }
        }
    }

    fn primary_click(&mut self, target: ClickTarget, position: Point) -> Result<()> {
        let toggled = self.selection.handle_primary_click(&target);
        let closed = self.panels.handle_primary_click(&target);
        if !closed.is_empty() {
            debug!(?closed, x = position.x, y = position.y, "Dismissed panels");
        }
        if toggled {
            return Ok(());
        }

        match &target {
            ClickTarget::Affordance(id) => {
                let node = self
                    .graph
                    .node(id)
                    .ok_or_else(|| FlowError::NodeNotFound(id.clone()))?;
                self.panels.toggle_add_node(node, &self.placement, &self.viewport);
            }
            ClickTarget::Node(id) => {
                if let Some(node) = self.graph.node(id) {
                    self.panels.open_config(node);
                }
            }
            ClickTarget::Canvas
            | ClickTarget::AddNodePanel
            | ClickTarget::ConfigPanel
            | ClickTarget::AutoWritingPanel
            | ClickTarget::MessagePreviewPanel
            | ClickTarget::ContextMenu
            | ClickTarget::Toolbar => {}
        }
        Ok(())
    }

    fn drop_connector(&mut self, payload: &str, position: Point, onto: DropTarget) -> Result<NodeId> {
        let connector = ConnectorDescriptor::from_drag_payload(payload)?;
        let graph_position = self.viewport.screen_to_graph(position);
        let id = match onto {
            DropTarget::Node(parent) => {
                self.graph
                    .add_child_node(&parent, &connector, Some(graph_position))?
            }
            DropTarget::Canvas => self.graph.add_detached_node(&connector, graph_position),
        };
        self.reconcile();
        Ok(id)
    }

    fn drag_node(&mut self, id: &NodeId, delta: Point) -> Result<()> {
        if self.interaction != InteractionMode::Move {
            return Ok(());
        }
        let current = self
            .graph
            .node(id)
            .map(|n| n.position)
            .ok_or_else(|| FlowError::NodeNotFound(id.clone()))?;
        let moved = current.offset(delta.x / self.viewport.zoom, delta.y / self.viewport.zoom);
        self.graph.move_node(id, moved)?;
        self.reconcile();
        Ok(())
    }

    fn reconcile(&mut self) {
        self.panels.reconcile(&self.graph, &self.placement, &self.viewport);
        self.selection.prune(&self.graph);
    }

    // ========== Panel actions ==========

    /// Pick a connector in the add-node panel. `None` when the panel is closed.
    pub fn select_connector(&mut self, connector: &ConnectorDescriptor) -> Result<Option<NodeId>> {
        let Some(parent) = self.panels.add_node().parent_node_id.clone() else {
            debug!(connector = %connector.name, "No add-node panel open");
            return Ok(None);
        };
        let id = self.graph.add_child_node(&parent, connector, None)?;
        self.panels.close_add_node();
        self.reconcile();
        Ok(Some(id))
    }

    /// Connectors matching the add-node panel's search and tab
    pub fn filtered_connectors(&self) -> Vec<ConnectorDescriptor> {
        let panel = self.panels.add_node();
        self.catalog.filter_tab(&panel.tab, &panel.search)
    }

    pub fn filtered_auto_writings(&self) -> Vec<&AutoWritingEntry> {
        let panel = self.panels.auto_writing();
        self.auto_writings.filter(&panel.search, panel.tab)
    }

    /// Inject an auto-writing snippet into the configured message, then close the panel
    pub fn apply_auto_writing(&mut self, entry_id: u32) -> Result<bool> {
        let snippet = self
            .auto_writings
            .get(entry_id)
            .map(|e| e.text.clone())
            .ok_or(FlowError::UnknownAutoWriting(entry_id))?;

        let injected = match self.panels.config().node_id.clone() {
            Some(id) => self
                .graph
                .update_message_config(&id, |message| inject_snippet(&mut message.blocks, &snippet))?
                .unwrap_or(false),
            None => {
                warn!(entry = entry_id, "No configured node to receive auto-writing");
                false
            }
        };
        self.panels.close_auto_writing();
        info!(entry = entry_id, injected, "Applied auto-writing");
        Ok(injected)
    }

    pub fn configured_message(&self) -> Option<&MessageConfig> {
        let id = self.panels.config().node_id.as_ref()?;
        self.graph.node(id)?.config.as_message()
    }

    /// Edit the message of the node shown in the config panel
    pub fn edit_configured_message<R>(
        &mut self,
        update: impl FnOnce(&mut MessageConfig) -> R,
    ) -> Result<Option<R>> {
        match self.panels.config().node_id.clone() {
            Some(id) => self.graph.update_message_config(&id, update),
            None => Ok(None),
        }
    }

    // ========== Context menu actions ==========

    pub fn copy_selection(&mut self) -> Result<String> {
        self.selection.copy_selection(&self.graph)
    }

    pub fn delete_selection(&mut self) -> DeleteOutcome {
        let outcome = self.selection.delete_selection(&mut self.graph);
        self.reconcile();
        outcome
    }

    // ========== Viewport ==========

    pub fn set_viewport_size(&mut self, size: Size) {
        if self.viewport.size != size {
            self.viewport = self.viewport.resized(size);
            self.reconcile();
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
        self.reconcile();
    }

    pub fn zoom_at(&mut self, factor: f64, focus: Point) {
        self.viewport.zoom_by(factor, focus, self.zoom_limits);
        self.reconcile();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in(self.config.canvas.zoom_step, self.zoom_limits);
        self.reconcile();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out(self.config.canvas.zoom_step, self.zoom_limits);
        self.reconcile();
    }

    /// Fit every node into view
    pub fn fit_view(&mut self) {
        if let Some(bounds) = self.graph.bounds(self.config.layout.node_size()) {
            self.viewport.fit_to(&bounds, self.config.canvas.fit_padding, self.zoom_limits);
            self.reconcile();
        }
    }
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TRIGGER_NODE_ID;
    use crate::panels::PanelKind;

    fn trigger() -> NodeId {
        NodeId::new(TRIGGER_NODE_ID)
    }

    #[test]
    fn test_degenerate_viewport_keeps_positions_finite() {
        let mut editor = FlowEditor::default();
        let before = *editor.viewport();
        editor
            .handle(InputEvent::ViewportChanged(Viewport::with_transform(
                Point::ZERO,
                0.0,
                Size::new(800.0, 600.0),
            )))
            .unwrap();
        assert_eq!(*editor.viewport(), before);

        let payload = editor.catalog().find("SMS").unwrap().to_drag_payload().unwrap();
        editor
            .handle(InputEvent::Drop {
                payload,
                position: Point::new(300.0, 300.0),
                onto: DropTarget::Canvas,
            })
            .unwrap();
        assert!(editor.viewport().zoom > 0.0);
        assert!(editor
            .graph()
            .nodes()
            .all(|n| n.position.x.is_finite() && n.position.y.is_finite()));
    }

    #[test]
    fn test_viewport_zoom_is_clamped_to_limits() {
        let mut editor = FlowEditor::default();
        editor
            .handle(InputEvent::ViewportChanged(Viewport::with_transform(
                Point::new(10.0, 20.0),
                50.0,
                Size::new(800.0, 600.0),
            )))
            .unwrap();
        assert_eq!(editor.viewport().zoom, ZoomLimits::default().max);
        assert_eq!(editor.viewport().pan, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_new_editor_has_trigger() {
        let mut editor = FlowEditor::default();
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(editor.ensure_trigger(), None);
    }

    #[test]
    fn test_affordance_click_then_select_connector() {
        let mut editor = FlowEditor::default();
        editor
            .handle(InputEvent::PrimaryClick {
                target: ClickTarget::Affordance(trigger()),
                position: Point::new(500.0, 200.0),
            })
            .unwrap();
        assert!(editor.panels().is_open(PanelKind::AddNode));

        let sms = editor.catalog().find("SMS").unwrap();
        let id = editor.select_connector(&sms).unwrap().unwrap();
        assert!(!editor.panels().is_open(PanelKind::AddNode));
        assert!(editor.graph().edge_between(&trigger(), &id).is_some());

        // Nothing to attach to once the panel is closed
        assert_eq!(editor.select_connector(&sms).unwrap(), None);
    }

    #[test]
    fn test_connect_disabled_in_move_mode() {
        let mut editor = FlowEditor::default();
        let sms = editor.catalog().find("SMS").unwrap();
        let payload = sms.to_drag_payload().unwrap();
        editor
            .handle(InputEvent::Drop {
                payload,
                position: Point::new(100.0, 100.0),
                onto: DropTarget::Canvas,
            })
            .unwrap();
        let detached = editor
            .graph()
            .nodes()
            .find(|n| !n.is_trigger())
            .map(|n| n.id.clone())
            .unwrap();

        editor.set_interaction_mode(InteractionMode::Move);
        editor
            .handle(InputEvent::Connect {
                source: trigger(),
                target: detached.clone(),
            })
            .unwrap();
        assert_eq!(editor.graph().edge_count(), 0);

        editor
            .handle(InputEvent::DragNode {
                node: detached.clone(),
                delta: Point::new(20.0, -10.0),
            })
            .unwrap();
        assert_eq!(editor.graph().node(&detached).unwrap().position, Point::new(120.0, 90.0));
    }

    #[test]
    fn test_bad_drop_payload() {
        let mut editor = FlowEditor::default();
        let err = editor
            .handle(InputEvent::Drop {
                payload: "{".to_string(),
                position: Point::ZERO,
                onto: DropTarget::Canvas,
            })
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidDragPayload(_)));
        assert_eq!(editor.graph().node_count(), 1);
    }

    #[test]
    fn test_unknown_auto_writing() {
        let mut editor = FlowEditor::default();
        assert!(matches!(editor.apply_auto_writing(99), Err(FlowError::UnknownAutoWriting(99))));
        assert_eq!(editor.apply_auto_writing(1).unwrap(), false);
    }

    #[test]
    fn test_rename_campaign() {
        let mut editor = FlowEditor::default();
        assert_eq!(editor.campaign_name(), "Novo Fluxo");
        assert!(!editor.rename_campaign("   "));
        assert!(editor.rename_campaign(" Boas-vindas "));
        assert_eq!(editor.campaign_name(), "Boas-vindas");
    }

    #[test]
    fn test_fit_view_changes_zoom() {
        let mut editor = FlowEditor::default();
        editor.set_viewport_size(Size::new(1000.0, 1000.0));
        editor.fit_view();
        // A single 200x70 trigger fills the width: 1000 / (200 * 1.2), clamped to 4
        assert_eq!(editor.viewport().zoom, 4.0);
    }
}
