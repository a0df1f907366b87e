use crate::{
    AutoWritingTab, BlockKind, CatalogTab, ClickTarget, ConnectorDescriptor, DropTarget,
    EdgeStroke, EditorConfig, FlowEditor, InputEvent, InteractionMode, MessageConfig, Node,
    NodeId, PanelKind, Point, Size, Theme,
};
use crate::theme::ColorToken;
use egui::{pos2, vec2, Align2, Color32, FontId, Id, Order, Pos2, Rect, Sense, Shape, Stroke};
use tracing::warn;

/// Main application state
pub struct FlowBuilderApp {
    /// Graph, selection and panel state
    editor: FlowEditor,

    /// UI state
    ui_state: UiState,

    /// Status message
    status_message: String,
}

#[derive(Default)]
struct UiState {
    show_grid: bool,

    show_minimap: bool,

    /// Canvas area from the previous frame
    canvas_rect: Option<Rect>,

    /// Panel areas from the previous frame, used to resolve click targets
    regions: PanelRegions,

    /// Node a connect gesture started from
    connect_source: Option<NodeId>,

    /// Node being moved in move mode
    dragging_node: Option<NodeId>,

    /// Campaign name being edited in the header
    campaign_name_buffer: Option<String>,
}

#[derive(Default, Clone, Copy)]
struct PanelRegions {
    add_node: Option<Rect>,
    config: Option<Rect>,
    auto_writing: Option<Rect>,
    preview: Option<Rect>,
    context_menu: Option<Rect>,
}

impl Default for FlowBuilderApp {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl FlowBuilderApp {
    pub fn new(config: EditorConfig) -> Self {
        let ui_state = UiState {
            show_grid: config.canvas.show_grid,
            show_minimap: config.canvas.show_minimap,
            ..Default::default()
        };
        Self {
            editor: FlowEditor::new(config),
            ui_state,
            status_message: "Clique no + abaixo do gatilho para adicionar um nó".to_string(),
        }
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Err(e) = self.editor.handle(event) {
            warn!(error = %e, "Input rejected");
            self.status_message = format!("❌ {}", e);
        }
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        ctx.set_visuals(match self.editor.theme() {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        });

        self.route_primary_click(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.render_header(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });

        let mut regions = PanelRegions::default();
        if let Some(canvas_rect) = self.ui_state.canvas_rect {
            self.render_controls(ctx, canvas_rect);
            regions.add_node = self.render_add_node_panel(ctx, canvas_rect);
            regions.config = self.render_config_panel(ctx, canvas_rect);
            regions.auto_writing = self.render_auto_writing_panel(ctx, canvas_rect);
            regions.preview = self.render_preview_panel(ctx, canvas_rect);
            regions.context_menu = self.render_context_menu(ctx, canvas_rect);
        }
        self.ui_state.regions = regions;
    }

    /// Resolve every completed primary click to a target before widgets react to it
    fn route_primary_click(&mut self, ctx: &egui::Context) {
        let (clicked, pos) = ctx.input(|i| (i.pointer.primary_clicked(), i.pointer.interact_pos()));
        let (true, Some(pos), Some(canvas_rect)) = (clicked, pos, self.ui_state.canvas_rect) else {
            return;
        };
        let target = self.hit_test(pos, canvas_rect);
        let position = to_point(pos, canvas_rect);
        self.dispatch(InputEvent::PrimaryClick { target, position });
    }

    fn hit_test(&self, pos: Pos2, canvas_rect: Rect) -> ClickTarget {
        let regions = self.ui_state.regions;
        let panels = [
            (regions.context_menu, ClickTarget::ContextMenu),
            (regions.auto_writing, ClickTarget::AutoWritingPanel),
            (regions.preview, ClickTarget::MessagePreviewPanel),
            (regions.config, ClickTarget::ConfigPanel),
            (regions.add_node, ClickTarget::AddNodePanel),
        ];
        for (rect, target) in panels {
            if rect.is_some_and(|r| r.contains(pos)) {
                return target;
            }
        }
        if !canvas_rect.contains(pos) {
            return ClickTarget::Toolbar;
        }

        for node in self.editor.graph().nodes() {
            if node.has_open_affordance && self.affordance_rect(node, canvas_rect).contains(pos) {
                return ClickTarget::Affordance(node.id.clone());
            }
        }
        match self.node_at(pos, canvas_rect) {
            Some(id) => ClickTarget::Node(id),
            None => ClickTarget::Canvas,
        }
    }

    /// A drop on a node's open affordance attaches to that node
    fn drop_target_at(&self, pos: Pos2, canvas_rect: Rect) -> DropTarget {
        let on_affordance = self
            .editor
            .graph()
            .nodes()
            .find(|n| n.has_open_affordance && self.affordance_rect(n, canvas_rect).contains(pos))
            .map(|n| n.id.clone());
        match on_affordance.or_else(|| self.node_at(pos, canvas_rect)) {
            Some(id) => DropTarget::Node(id),
            None => DropTarget::Canvas,
        }
    }

    fn node_at(&self, pos: Pos2, canvas_rect: Rect) -> Option<NodeId> {
        self.editor
            .graph()
            .nodes()
            .find(|n| self.node_rect(n, canvas_rect).contains(pos))
            .map(|n| n.id.clone())
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.ui_state.campaign_name_buffer.as_mut() {
                Some(buffer) => {
                    let response = ui.text_edit_singleline(buffer);
                    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Salvar").clicked() || submitted {
                        let name = buffer.clone();
                        if self.editor.rename_campaign(&name) {
                            self.ui_state.campaign_name_buffer = None;
                        } else {
                            self.status_message = "❌ O nome da campanha não pode ficar vazio".to_string();
                        }
                    } else if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        self.ui_state.campaign_name_buffer = None;
                    }
                }
                None => {
                    let title = ui.add(
                        egui::Label::new(egui::RichText::new(self.editor.campaign_name()).heading())
                            .sense(Sense::click()),
                    );
                    if title.on_hover_text("Clique para renomear").clicked() {
                        self.ui_state.campaign_name_buffer = Some(self.editor.campaign_name().to_string());
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_label = if self.editor.theme().is_dark() { "☀ Claro" } else { "🌙 Escuro" };
                if ui.button(theme_label).clicked() {
                    self.editor.toggle_theme();
                }
                ui.label(format!("Eventos: {}", self.editor.graph().events().len()));
                ui.separator();

                let mut active = self.editor.is_campaign_active();
                let label = if active { "Ativo" } else { "Pausado" };
                if ui.checkbox(&mut active, label).changed() {
                    self.dispatch(InputEvent::SetCampaignActive(active));
                    self.status_message = format!("Campanha {}", if active { "ativa" } else { "pausada" });
                }
            });
        });
    }

    fn render_controls(&mut self, ctx: &egui::Context, canvas_rect: Rect) {
        egui::Area::new(Id::new("controls_bar"))
            .fixed_pos(pos2(canvas_rect.left() + 16.0, canvas_rect.bottom() - 300.0))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    let selecting = self.editor.selection().is_selecting();
                    if ui.selectable_label(selecting, "☝").on_hover_text("Modo Seleção").clicked() {
                        self.dispatch(InputEvent::ToggleSelectMode);
                    }
                    let moving = self.editor.interaction_mode() == InteractionMode::Move;
                    if ui.selectable_label(moving, "✋").on_hover_text("Mover nós").clicked() {
                        let next = if moving { InteractionMode::Select } else { InteractionMode::Move };
                        self.editor.set_interaction_mode(next);
                    }
                    ui.separator();
                    if ui.button("⟲").on_hover_text("Ajustar à Tela").clicked() {
                        self.editor.fit_view();
                    }
                    if ui.button("+").on_hover_text("Aproximar Zoom").clicked() {
                        self.editor.zoom_in();
                    }
                    if ui.button("−").on_hover_text("Afastar Zoom").clicked() {
                        self.editor.zoom_out();
                    }
                    ui.separator();
                    ui.toggle_value(&mut self.ui_state.show_minimap, "🗺").on_hover_text("Mini Mapa");
                    ui.toggle_value(&mut self.ui_state.show_grid, "#").on_hover_text("Grade");
                });
            });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.ui_state.canvas_rect = Some(canvas_rect);
        self.editor.set_viewport_size(Size::new(
            f64::from(canvas_rect.width()),
            f64::from(canvas_rect.height()),
        ));

        let theme = self.editor.theme();
        painter.rect_filled(canvas_rect, 0.0, token_color(ColorToken::Background, theme));

        // Zoom with scroll around the pointer
        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (f64::from(scroll) * 0.002).exp();
                self.editor.zoom_at(factor, to_point(hover, canvas_rect));
            }
        }

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                let under = self.node_at(pos, canvas_rect);
                match self.editor.interaction_mode() {
                    InteractionMode::Move => self.ui_state.dragging_node = under,
                    InteractionMode::Select if self.editor.can_connect() => {
                        self.ui_state.connect_source = under
                    }
                    InteractionMode::Select => {}
                }
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            if let Some(node) = self.ui_state.dragging_node.clone() {
                self.dispatch(InputEvent::DragNode {
                    node,
                    delta: Point::new(f64::from(delta.x), f64::from(delta.y)),
                });
            } else if self.ui_state.connect_source.is_none() {
                self.editor.pan_by(f64::from(delta.x), f64::from(delta.y));
            }
        }
        if response.drag_stopped() {
            self.ui_state.dragging_node = None;
            if let Some(source) = self.ui_state.connect_source.take() {
                let pos = ui.input(|i| i.pointer.latest_pos());
                if let Some(target) = pos.and_then(|p| self.node_at(p, canvas_rect)) {
                    if target != source {
                        self.dispatch(InputEvent::Connect { source, target });
                    }
                }
            }
        }

        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(node) = self.node_at(pos, canvas_rect) {
                    self.dispatch(InputEvent::SecondaryClick {
                        node,
                        position: to_point(pos, canvas_rect),
                    });
                }
            }
        }

        if let Some(payload) = response.dnd_release_payload::<String>() {
            if let Some(pos) = ui.input(|i| i.pointer.latest_pos()) {
                let onto = self.drop_target_at(pos, canvas_rect);
                self.dispatch(InputEvent::Drop {
                    payload: payload.as_ref().clone(),
                    position: to_point(pos, canvas_rect),
                    onto,
                });
            }
        }

        if self.ui_state.show_grid {
            self.draw_grid(&painter, canvas_rect);
        }

        for edge in self.editor.graph().edges() {
            let (Some(source), Some(target)) =
                (self.editor.graph().node(&edge.source), self.editor.graph().node(&edge.target))
            else {
                continue;
            };
            let from = self.node_rect(source, canvas_rect).center_bottom();
            let to = self.node_rect(target, canvas_rect).center_top();
            let stroke = EdgeStroke::for_edge(edge);
            let egui_stroke = Stroke::new(stroke.width, rgb(stroke.rgb(theme)));
            match stroke.dash {
                Some((dash, gap)) => painter.extend(Shape::dashed_line(&[from, to], egui_stroke, dash, gap)),
                None => {
                    painter.line_segment([from, to], egui_stroke);
                }
            }
            painter.arrow(to - vec2(0.0, 8.0), vec2(0.0, 6.0), egui_stroke);
        }

        let nodes: Vec<Node> = self.editor.graph().sorted_nodes().into_iter().cloned().collect();
        for node in &nodes {
            self.draw_node(&painter, canvas_rect, node);
        }

        if let Some(source) = &self.ui_state.connect_source {
            if let (Some(node), Some(pointer)) =
                (self.editor.graph().node(source), ui.input(|i| i.pointer.latest_pos()))
            {
                let from = self.node_rect(node, canvas_rect).center_bottom();
                painter.line_segment([from, pointer], Stroke::new(2.0, token_color(ColorToken::MutedForeground, theme)));
            }
        }

        if self.ui_state.show_minimap {
            self.draw_minimap(&painter, canvas_rect);
        }
    }

    fn draw_node(&self, painter: &egui::Painter, canvas_rect: Rect, node: &Node) {
        let theme = self.editor.theme();
        let rect = self.node_rect(node, canvas_rect);
        let zoom = self.editor.viewport().zoom as f32;
        let selected = self.editor.selection().is_selected(&node.id);

        painter.rect_filled(rect, 8.0 * zoom, token_color(ColorToken::Card, theme));
        let border = if selected {
            Stroke::new(2.5, Color32::from_rgb(59, 130, 246))
        } else {
            Stroke::new(1.0, token_color(ColorToken::Border, theme))
        };
        painter.rect_stroke(rect, 8.0 * zoom, border);

        // Icon swatch
        let swatch = Rect::from_min_size(rect.min + vec2(10.0, 10.0) * zoom, vec2(32.0, 32.0) * zoom);
        painter.rect_filled(swatch, 6.0 * zoom, tag_color(&node.visual_tag.color));

        let text_x = swatch.right() + 10.0 * zoom;
        painter.text(
            pos2(text_x, rect.top() + 14.0 * zoom),
            Align2::LEFT_TOP,
            &node.label,
            FontId::proportional(14.0 * zoom),
            token_color(ColorToken::Foreground, theme),
        );
        painter.text(
            pos2(text_x, rect.top() + 34.0 * zoom),
            Align2::LEFT_TOP,
            node.kind.label(),
            FontId::proportional(11.0 * zoom),
            token_color(ColorToken::MutedForeground, theme),
        );

        if node.has_open_affordance {
            let button = self.affordance_rect(node, canvas_rect);
            let muted = token_color(ColorToken::MutedForeground, theme);
            painter.line_segment([rect.center_bottom(), button.center_top()], Stroke::new(1.5, muted));
            painter.circle_filled(button.center(), button.width() / 2.0, token_color(ColorToken::Card, theme));
            painter.circle_stroke(button.center(), button.width() / 2.0, Stroke::new(1.0, muted));
            painter.text(
                button.center(),
                Align2::CENTER_CENTER,
                "+",
                FontId::proportional(16.0 * zoom),
                token_color(ColorToken::Foreground, theme),
            );
        }
    }

    fn draw_grid(&self, painter: &egui::Painter, canvas_rect: Rect) {
        let viewport = self.editor.viewport();
        let spacing = (20.0 * viewport.zoom) as f32;
        if spacing < 4.0 {
            return;
        }
        let color = token_color(ColorToken::Border, self.editor.theme());
        let offset = vec2(
            (viewport.pan.x as f32).rem_euclid(spacing),
            (viewport.pan.y as f32).rem_euclid(spacing),
        );
        let mut y = canvas_rect.top() + offset.y;
        while y < canvas_rect.bottom() {
            let mut x = canvas_rect.left() + offset.x;
            while x < canvas_rect.right() {
                painter.circle_filled(pos2(x, y), 1.0, color);
                x += spacing;
            }
            y += spacing;
        }
    }

    fn draw_minimap(&self, painter: &egui::Painter, canvas_rect: Rect) {
        let node_size = self.editor.config().layout.node_size();
        let Some(bounds) = self.editor.graph().bounds(node_size) else {
            return;
        };
        let theme = self.editor.theme();
        let map = Rect::from_min_size(canvas_rect.right_bottom() - vec2(216.0, 156.0), vec2(200.0, 140.0));
        painter.rect_filled(map, 6.0, token_color(ColorToken::Card, theme));
        painter.rect_stroke(map, 6.0, Stroke::new(1.0, token_color(ColorToken::Border, theme)));

        let scale = (190.0 / bounds.width.max(1.0)).min(130.0 / bounds.height.max(1.0)) as f32;
        let origin = map.min + vec2(5.0, 5.0);
        for node in self.editor.graph().nodes() {
            let min = origin
                + vec2(
                    (node.position.x - bounds.x) as f32 * scale,
                    (node.position.y - bounds.y) as f32 * scale,
                );
            let size = vec2(node_size.width as f32 * scale, node_size.height as f32 * scale);
            painter.rect_filled(Rect::from_min_size(min, size), 1.0, tag_color(&node.visual_tag.color));
        }
    }

    fn render_add_node_panel(&mut self, ctx: &egui::Context, canvas_rect: Rect) -> Option<Rect> {
        let panel = self.editor.panels().add_node().clone();
        if !panel.open {
            return None;
        }
        let size = self.editor.config().panels.add_node_size();
        let categories: Vec<String> = self
            .editor
            .catalog()
            .categories()
            .iter()
            .map(|c| c.category.clone())
            .collect();
        let connectors = self.editor.filtered_connectors();

        let mut search = panel.search.clone();
        let mut tab = panel.tab.clone();
        let mut chosen: Option<ConnectorDescriptor> = None;
        let mut close = false;

        let response = egui::Area::new(Id::new("add_node_panel"))
            .fixed_pos(to_pos(panel.anchor, canvas_rect))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(size.width as f32 - 16.0);
                    ui.set_height(size.height as f32 - 16.0);
                    ui.horizontal(|ui| {
                        ui.strong("Adicionar nó");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            close = ui.button("✕").clicked();
                        });
                    });
                    ui.add(egui::TextEdit::singleline(&mut search).hint_text("Buscar conectores..."));
                    ui.horizontal_wrapped(|ui| {
                        ui.selectable_value(&mut tab, CatalogTab::All, "Todos");
                        for category in &categories {
                            ui.selectable_value(&mut tab, CatalogTab::Category(category.clone()), category);
                        }
                    });
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        if connectors.is_empty() {
                            ui.label("Nenhum conector encontrado");
                        }
                        for connector in &connectors {
                            ui.horizontal(|ui| {
                                if let Ok(payload) = connector.to_drag_payload() {
                                    ui.dnd_drag_source(Id::new(("connector", &connector.name)), payload, |ui| {
                                        ui.label("⠿");
                                    });
                                }
                                let color = tag_color(&connector.visual_tag.color);
                                ui.colored_label(color, "■");
                                let text = format!("{}\n{}", connector.name, connector.description);
                                if ui.button(text).clicked() {
                                    chosen = Some(connector.clone());
                                }
                            });
                        }
                    });
                });
            });

        if search != panel.search {
            self.editor.panels_mut().set_add_node_search(search);
        }
        if tab != panel.tab {
            self.editor.panels_mut().set_add_node_tab(tab);
        }
        if let Some(connector) = chosen {
            match self.editor.select_connector(&connector) {
                Ok(Some(_)) => self.status_message = format!("✓ {} adicionado", connector.name),
                Ok(None) => {}
                Err(e) => self.status_message = format!("❌ {}", e),
            }
        } else if close {
            self.editor.panels_mut().close_add_node();
        }
        Some(response.response.rect)
    }

    /// Top-left corner of a panel docked to the canvas' right edge
    fn docked_pos(canvas_rect: Rect, offset: f64, width: f64) -> Pos2 {
        pos2(canvas_rect.right() - (offset + width) as f32, canvas_rect.top())
    }

    fn render_config_panel(&mut self, ctx: &egui::Context, canvas_rect: Rect) -> Option<Rect> {
        let node_id = self.editor.panels().config().node_id.clone()?;
        let original = self.editor.configured_message()?.clone();
        let width = self.editor.config().panels.config_width;
        let offset = self.editor.panels().offset(PanelKind::Config);
        let label = self
            .editor
            .graph()
            .node(&node_id)
            .map(|n| n.label.clone())
            .unwrap_or_default();

        let mut message = original.clone();
        let mut stage_name = message.stage_name.clone();
        let mut name_committed = false;
        let mut removed = None;
        let mut added = None;
        let mut open_auto_writing = false;
        let mut toggle_preview = false;
        let mut close = false;

        let response = egui::Area::new(Id::new("config_panel"))
            .fixed_pos(Self::docked_pos(canvas_rect, offset, width))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(width as f32 - 16.0);
                    ui.set_min_height(canvas_rect.height() - 16.0);
                    ui.horizontal(|ui| {
                        ui.strong(format!("Configurar {}", label));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            close = ui.button("✕").clicked();
                        });
                    });
                    ui.label("Nome da etapa");
                    name_committed = ui.text_edit_singleline(&mut stage_name).lost_focus();
                    ui.separator();

                    egui::ScrollArea::vertical().max_height(canvas_rect.height() * 0.5).show(ui, |ui| {
                        for block in message.blocks.iter_mut() {
                            ui.horizontal(|ui| {
                                match block.kind {
                                    BlockKind::Text => {
                                        ui.add(
                                            egui::TextEdit::multiline(&mut block.content)
                                                .hint_text(block.placeholder.as_str())
                                                .desired_rows(3),
                                        );
                                    }
                                    BlockKind::File => {
                                        ui.label(format!("📎 {}", block.placeholder));
                                    }
                                }
                                if ui.small_button("🗑").clicked() {
                                    removed = Some(block.id);
                                }
                            });
                        }
                    });

                    ui.horizontal(|ui| {
                        if ui.button("+ Texto").clicked() {
                            added = Some(BlockKind::Text);
                        }
                        if ui.button("+ Arquivo").clicked() {
                            added = Some(BlockKind::File);
                        }
                    });
                    ui.separator();
                    ui.checkbox(&mut message.schedule_date_limit, "Limitar data de envio");
                    ui.checkbox(&mut message.schedule_time_interval, "Intervalo de horário");
                    ui.separator();
                    ui.horizontal(|ui| {
                        open_auto_writing = ui.button("✍ Escrita automática").clicked();
                        toggle_preview = ui.button("👁 Pré-visualizar").clicked();
                    });
                });
            });

        if name_committed {
            message.rename_stage(&stage_name);
        } else if stage_name != message.stage_name {
            message.stage_name = stage_name;
        }
        if let Some(id) = removed {
            message.remove_block(id);
        }
        if let Some(kind) = added {
            message.add_block(kind);
        }
        if message != original {
            if let Err(e) = self.editor.edit_configured_message(|m| *m = message) {
                self.status_message = format!("❌ {}", e);
            }
        }
        if open_auto_writing {
            self.editor.panels_mut().open_auto_writing();
        }
        if toggle_preview {
            self.editor.panels_mut().toggle_message_preview();
        }
        if close {
            self.editor.panels_mut().close_config();
        }
        Some(response.response.rect)
    }

    fn render_auto_writing_panel(&mut self, ctx: &egui::Context, canvas_rect: Rect) -> Option<Rect> {
        let panel = self.editor.panels().auto_writing().clone();
        if !panel.open {
            return None;
        }
        let width = self.editor.config().panels.auto_writing_width;
        let offset = self.editor.panels().offset(PanelKind::AutoWriting);
        let focus = self.editor.panels_mut().take_focus_request();
        let entries: Vec<(u32, String, String)> = self
            .editor
            .filtered_auto_writings()
            .into_iter()
            .map(|e| (e.id, e.title.clone(), e.preview.clone()))
            .collect();

        let mut search = panel.search.clone();
        let mut tab = panel.tab;
        let mut chosen = None;
        let mut close = false;

        let response = egui::Area::new(Id::new("auto_writing_panel"))
            .fixed_pos(Self::docked_pos(canvas_rect, offset, width))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(width as f32 - 16.0);
                    ui.set_min_height(canvas_rect.height() - 16.0);
                    ui.horizontal(|ui| {
                        ui.strong("Escrita automática");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            close = ui.button("✕").clicked();
                        });
                    });
                    let field = ui.add(egui::TextEdit::singleline(&mut search).hint_text("Buscar..."));
                    if focus {
                        field.request_focus();
                    }
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut tab, AutoWritingTab::All, "Todos");
                        ui.selectable_value(&mut tab, AutoWritingTab::Standard, "Padrão");
                        ui.selectable_value(&mut tab, AutoWritingTab::Custom, "Personalizado");
                    });
                    ui.separator();
                    for (id, title, preview) in &entries {
                        if ui.button(title).on_hover_text(preview).clicked() {
                            chosen = Some(*id);
                        }
                    }
                });
            });

        if search != panel.search {
            self.editor.panels_mut().set_auto_writing_search(search);
        }
        if tab != panel.tab {
            self.editor.panels_mut().set_auto_writing_tab(tab);
        }
        if let Some(id) = chosen {
            match self.editor.apply_auto_writing(id) {
                Ok(true) => self.status_message = "✓ Texto inserido".to_string(),
                Ok(false) => self.status_message = "Nenhum bloco de texto para receber o texto".to_string(),
                Err(e) => self.status_message = format!("❌ {}", e),
            }
        } else if close {
            self.editor.panels_mut().close_auto_writing();
        }
        Some(response.response.rect)
    }

    fn render_preview_panel(&mut self, ctx: &egui::Context, canvas_rect: Rect) -> Option<Rect> {
        if !self.editor.panels().message_preview().open {
            return None;
        }
        let width = self.editor.config().panels.message_preview_width;
        let offset = self.editor.panels().offset(PanelKind::MessagePreview);
        let message: Option<MessageConfig> = self.editor.configured_message().cloned();
        let mut close = false;

        let response = egui::Area::new(Id::new("message_preview_panel"))
            .fixed_pos(Self::docked_pos(canvas_rect, offset, width))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(width as f32 - 16.0);
                    ui.horizontal(|ui| {
                        ui.strong("Pré-visualização");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            close = ui.button("✕").clicked();
                        });
                    });
                    let Some(message) = &message else {
                        ui.label("Selecione um nó de mensagem");
                        return;
                    };
                    ui.label(&message.stage_name);
                    ui.separator();
                    for block in &message.blocks {
                        match block.kind {
                            BlockKind::Text => {
                                ui.label(if block.content.is_empty() { "…" } else { block.content.as_str() });
                                let variables = crate::template_variables(&block.content);
                                if !variables.is_empty() {
                                    ui.small(format!("Variáveis: {}", variables.join(", ")));
                                }
                            }
                            BlockKind::File => {
                                ui.label("📎 Arquivo");
                            }
                        }
                    }
                });
            });

        if close {
            self.editor.panels_mut().close_message_preview();
        }
        Some(response.response.rect)
    }

    fn render_context_menu(&mut self, ctx: &egui::Context, canvas_rect: Rect) -> Option<Rect> {
        let anchor = self.editor.selection().context_menu()?.anchor;
        let mut copy = false;
        let mut delete = false;

        let response = egui::Area::new(Id::new("context_menu"))
            .fixed_pos(to_pos(anchor, canvas_rect))
            .order(Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    copy = ui.button("📋 Copiar").clicked();
                    delete = ui.button("🗑 Excluir").clicked();
                });
            });

        if copy {
            match self.editor.copy_selection() {
                Ok(_) => {
                    self.status_message =
                        format!("✓ {} nós copiados", self.editor.selection().selection().len())
                }
                Err(e) => self.status_message = format!("❌ {}", e),
            }
        }
        if delete {
            let outcome = self.editor.delete_selection();
            self.status_message = match outcome.refused {
                Some(_) => format!("✓ {} nós excluídos (gatilho mantido)", outcome.removed_nodes.len()),
                None => format!("✓ {} nós excluídos", outcome.removed_nodes.len()),
            };
        }
        Some(response.response.rect)
    }

    fn node_rect(&self, node: &Node, canvas_rect: Rect) -> Rect {
        let size = self.editor.config().layout.node_size();
        let screen = self.editor.viewport().graph_to_screen_rect(&node.bounds(size));
        Rect::from_min_size(
            canvas_rect.min + vec2(screen.x as f32, screen.y as f32),
            vec2(screen.width as f32, screen.height as f32),
        )
    }

    /// Round "add" button below a node, past its connector line
    fn affordance_rect(&self, node: &Node, canvas_rect: Rect) -> Rect {
        let layout = &self.editor.config().layout;
        let zoom = self.editor.viewport().zoom as f32;
        let bottom = self.node_rect(node, canvas_rect).center_bottom();
        let diameter = layout.affordance_button_height as f32 * zoom;
        let top = bottom.y + layout.connector_line_height as f32 * zoom;
        Rect::from_min_size(pos2(bottom.x - diameter / 2.0, top), vec2(diameter, diameter))
    }
}

fn to_point(pos: Pos2, canvas_rect: Rect) -> Point {
    Point::new(f64::from(pos.x - canvas_rect.min.x), f64::from(pos.y - canvas_rect.min.y))
}

fn to_pos(point: Point, canvas_rect: Rect) -> Pos2 {
    canvas_rect.min + vec2(point.x as f32, point.y as f32)
}

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

fn token_color(token: ColorToken, theme: Theme) -> Color32 {
    rgb(token.rgb(theme))
}

/// Approximate color for a "<hue>-<shade>" tag
fn tag_color(tag: &str) -> Color32 {
    let hue = tag.split('-').next().unwrap_or_default();
    match hue {
        "green" => Color32::from_rgb(34, 197, 94),
        "red" => Color32::from_rgb(239, 68, 68),
        "orange" => Color32::from_rgb(249, 115, 22),
        "purple" => Color32::from_rgb(168, 85, 247),
        "yellow" => Color32::from_rgb(234, 179, 8),
        "amber" => Color32::from_rgb(245, 158, 11),
        "pink" => Color32::from_rgb(236, 72, 153),
        "indigo" => Color32::from_rgb(99, 102, 241),
        _ => Color32::from_rgb(107, 114, 128),
    }
}

impl eframe::App for FlowBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_ui(ctx);
    }
}
