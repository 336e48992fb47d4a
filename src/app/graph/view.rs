use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2, vec2};

use resistome_viz::filter::LinkToggles;
use resistome_viz::{LinkCategory, Session};

use crate::util::truncate_label;

use super::super::physics::step_physics;
use super::super::render_utils::{
    arc_points, arrowhead, blend_color, dim_color, draw_background, draw_node, world_to_screen,
};
use super::super::{PhysicsConfig, RenderGraph, RenderLink, ViewModel};

const LABEL_CHARS: usize = 24;
const ARC_SPACING: f32 = 14.0;

/// Signed bend for a link among its parallel links, measured in the
/// lower-to-higher index direction.
fn arc_offset(link: &RenderLink) -> f32 {
    if link.arc.count <= 1 {
        return 0.0;
    }
    let centered = link.arc.index as f32 - (link.arc.count - 1) as f32 * 0.5;
    let offset = centered * ARC_SPACING;
    if link.source <= link.target { offset } else { -offset }
}

fn neighbors_of(cache: &RenderGraph, index: usize) -> HashSet<usize> {
    cache
        .links
        .iter()
        .filter_map(|link| {
            if link.source == index {
                Some(link.target)
            } else if link.target == index {
                Some(link.source)
            } else {
                None
            }
        })
        .collect()
}

fn draw_link(
    painter: &egui::Painter,
    link: &RenderLink,
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    stroke: Stroke,
) {
    let points = arc_points(start, end, arc_offset(link), 16);
    match link.category {
        LinkCategory::Colocalization => {
            painter.add(Shape::line(points, stroke));
        }
        LinkCategory::Temporal => {
            let dash = (6.0 * stroke.width.max(1.0)).clamp(4.0, 12.0);
            painter.extend(Shape::dashed_line(&points, stroke, dash, dash * 0.7));

            let Some(&before) = points.iter().rev().nth(1) else {
                return;
            };
            let direction = end - before;
            if direction.length_sq() <= f32::EPSILON {
                return;
            }
            let tip = end - direction.normalized() * (target_radius + 1.5);
            let size = (5.0 + stroke.width * 2.0).clamp(6.0, 14.0);
            painter.add(Shape::convex_polygon(
                arrowhead(tip, direction, size),
                stroke.color,
                Stroke::NONE,
            ));
        }
    }
}

impl ViewModel {
    fn update_screen_space(rect: egui::Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for render_node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, render_node.world_pos));
            scratch
                .screen_radii
                .push((render_node.base_radius * zoom.powf(0.5)).clamp(2.5, 40.0));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, session: &Session) {
        if self.graph_dirty {
            self.rebuild_render_graph(session);
        }
        let toggles = session.state().links;

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_graph_zoom(ui, rect, &response);

        let pan = self.pan;
        let zoom = self.zoom;
        let physics = PhysicsConfig {
            intensity: self.physics_intensity,
            repulsion_scale: self.physics_repulsion,
            link_length_scale: self.physics_link_length,
            delta_seconds: ui
                .ctx()
                .input(|input| input.stable_dt)
                .clamp(1.0 / 240.0, 1.0 / 20.0),
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            self.handle_graph_pan(&response);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the current filters.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        };

        Self::update_screen_space(rect, pan, zoom, cache);
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );
        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.visible_indices,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );

        let pinned = Self::handle_node_drag(
            &mut self.dragging,
            cache,
            &response,
            (rect, pan, zoom),
            hovered,
        );

        let physics_moving = self.live_physics && step_physics(cache, physics, pinned);
        if physics_moving || pinned.is_some() {
            Self::update_screen_space(rect, pan, zoom, cache);
            ui.ctx().request_repaint();
        }

        if hovered.is_some() || pinned.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if pinned.is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| cache.index_by_id.get(id).copied());
        let neighbors = selected_index
            .map(|index| neighbors_of(cache, index))
            .unwrap_or_default();
        let focus = |index: usize| {
            selected_index.is_none_or(|selected| selected == index || neighbors.contains(&index))
        };

        Self::draw_links(&painter, cache, toggles, zoom, selected_index, &focus);

        let selected_color = Color32::from_rgb(245, 206, 93);
        let outline = Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 200));
        for &index in &cache.view_scratch.visible_indices {
            let render_node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];
            let is_selected = selected_index == Some(index);
            let is_hovered = hovered == Some(index);

            let fill = if is_hovered {
                blend_color(render_node.fill, Color32::WHITE, 0.3)
            } else if focus(index) {
                render_node.fill
            } else {
                dim_color(render_node.fill, 0.35)
            };
            let stroke = if is_selected {
                Stroke::new(2.5, selected_color)
            } else {
                outline
            };
            draw_node(&painter, render_node.shape, position, radius, fill, stroke);

            if self.show_labels || is_hovered || is_selected {
                let color = if focus(index) {
                    Color32::from_gray(235)
                } else {
                    Color32::from_gray(120)
                };
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(render_node.node.display_name(), LABEL_CHARS),
                    FontId::proportional(11.5),
                    color,
                );
            }
        }

        if let Some(index) = hovered
            && pinned.is_none()
        {
            response.clone().on_hover_text_at_pointer(cache.nodes[index].node.tooltip());
        }

        let clicked = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered.map(|index| cache.nodes[index].node.id.to_string()));

        self.handle_graph_pan(&response);
        if let Some(selected) = clicked {
            self.set_selected(selected);
        }
    }

    fn draw_links(
        painter: &egui::Painter,
        cache: &RenderGraph,
        toggles: LinkToggles,
        zoom: f32,
        selected_index: Option<usize>,
        focus: &impl Fn(usize) -> bool,
    ) {
        let zoom_sqrt = zoom.sqrt();
        let positions = &cache.view_scratch.screen_positions;
        let radii = &cache.view_scratch.screen_radii;
        for link in &cache.links {
            if !toggles.shows_category(link.category) {
                continue;
            }

            let touches_selection =
                selected_index.is_some_and(|index| link.source == index || link.target == index);
            let color = if touches_selection || selected_index.is_none() {
                link.color
            } else if focus(link.source) && focus(link.target) {
                dim_color(link.color, 0.7)
            } else {
                dim_color(link.color, 0.3)
            };
            let width = (link.width * zoom_sqrt).clamp(0.5, 7.0)
                + if touches_selection { 0.8 } else { 0.0 };

            draw_link(
                painter,
                link,
                positions[link.source],
                positions[link.target],
                radii[link.target],
                Stroke::new(width, color),
            );
        }
    }
}
