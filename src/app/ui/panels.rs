use eframe::egui::{self, Align, Context, Layout, Vec2};

use resistome_viz::Session;

use super::super::{ViewModel, ViewRequest};

impl ViewModel {
    pub(in crate::app) fn new() -> Self {
        Self {
            gene_query: String::new(),
            element_query: String::new(),
            show_labels: false,
            live_physics: true,
            physics_intensity: 1.0,
            physics_repulsion: 1.0,
            physics_link_length: 1.0,
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            dragging: None,
            graph_dirty: true,
            graph_cache: None,
            top_connected: Vec::new(),
            status: None,
            visible_node_count: 0,
            visible_link_count: 0,
        }
    }

    /// Called after the session switched to another dataset.
    pub(in crate::app) fn dataset_changed(&mut self) {
        self.gene_query.clear();
        self.element_query.clear();
        self.selected = None;
        self.dragging = None;
        self.status = None;
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.graph_cache = None;
        self.graph_dirty = true;
    }

    fn draw_top_bar(
        &mut self,
        ui: &mut egui::Ui,
        session: &Session,
        loading: Option<&str>,
    ) -> Option<ViewRequest> {
        let mut request = None;
        let active_key = session.active_key().unwrap_or_default().to_owned();
        let active_label = session
            .sources()
            .iter()
            .find(|source| source.key == active_key)
            .map_or_else(|| active_key.clone(), |source| source.display_label().to_owned());

        ui.horizontal(|ui| {
            ui.heading("resistome-viz");
            ui.separator();

            ui.add_enabled_ui(loading.is_none(), |ui| {
                egui::ComboBox::from_id_salt("dataset_selector")
                    .selected_text(active_label)
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for source in session.sources() {
                            let is_active = source.key == active_key;
                            if ui
                                .selectable_label(is_active, source.display_label())
                                .on_hover_text(source.path.display().to_string())
                                .clicked()
                                && !is_active
                            {
                                request = Some(ViewRequest::Open(source.key.clone()));
                            }
                        }
                    });

                if ui
                    .button("Reload")
                    .on_hover_text("Read the active dataset file again.")
                    .clicked()
                {
                    request = Some(ViewRequest::Reload);
                }
            });

            if let Some(active) = session.active() {
                ui.label(format!(
                    "dataset: {} nodes, {} links",
                    active.dataset.node_count(),
                    active.dataset.link_count()
                ));
            }

            if let Some(key) = loading {
                ui.spinner();
                ui.label(format!("loading {key}..."));
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(format!(
                    "visible: {} nodes, {} links",
                    self.visible_node_count, self.visible_link_count
                ));
                if let Some(status) = &self.status {
                    ui.colored_label(ui.visuals().error_fg_color, status);
                }
            });
        });

        request
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        session: &mut Session,
        loading: Option<&str>,
    ) -> Option<ViewRequest> {
        let mut request = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                request = self.draw_top_bar(ui, session, loading);
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_controls(ui, session));
            });

        // Filters may have changed above; rebuild before the side panel reads
        // the ranking.
        if self.graph_dirty {
            self.rebuild_render_graph(session);
        }

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui, session));

        request
    }
}
