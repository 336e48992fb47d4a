use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::{circle_visible, screen_to_world};
use super::super::{RenderGraph, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 8.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Secondary and middle drags always pan; a primary drag pans when it
    /// did not start on a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let primary_pan =
            self.dragging.is_none() && response.dragged_by(egui::PointerButton::Primary);
        if primary_pan
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Moves the node under a primary drag to the pointer. Returns the index
    /// being dragged, if any, so physics can leave it alone.
    pub(in crate::app) fn handle_node_drag(
        dragging: &mut Option<usize>,
        cache: &mut RenderGraph,
        response: &egui::Response,
        view: (Rect, Vec2, f32),
        hovered: Option<usize>,
    ) -> Option<usize> {
        if response.drag_started_by(egui::PointerButton::Primary) {
            *dragging = hovered;
        }
        if response.drag_stopped() || !response.dragged() {
            *dragging = None;
        }

        let index = (*dragging).filter(|&index| index < cache.nodes.len())?;
        if let Some(pointer) = response.interact_pointer_pos() {
            let (rect, pan, zoom) = view;
            let node = &mut cache.nodes[index];
            node.world_pos = screen_to_world(rect, pan, zoom, pointer);
            node.velocity = Vec2::ZERO;
        }
        Some(index)
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_indices: &mut Vec<usize>,
    ) {
        visible_indices.clear();
        visible_indices.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index] + 2.0).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }
}
