use std::collections::HashMap;

use eframe::egui::vec2;
use log::debug;

use resistome_viz::export::most_connected;
use resistome_viz::filter::LinkToggles;
use resistome_viz::{Link, Node, Session};

use crate::util::stable_pair;

use super::super::render_utils::{
    ELEMENT_FILL, GENE_FILL, NodeShape, default_link_color, node_radius, parse_color,
};
use super::super::{
    ArcSlot, ConnectedEntry, PhysicsScratch, RenderGraph, RenderLink, RenderNode, ViewModel,
    ViewScratch,
};

const TOP_CONNECTED_ROWS: usize = 15;
const SEED_SPREAD: f32 = 260.0;

/// Numbers the links that join the same pair of nodes, in either direction.
fn arc_slots(pairs: &[(usize, usize)]) -> Vec<ArcSlot> {
    let mut counts = HashMap::<(usize, usize), usize>::new();
    let indices = pairs
        .iter()
        .map(|&(source, target)| {
            let count = counts.entry((source.min(target), source.max(target))).or_default();
            *count += 1;
            *count - 1
        })
        .collect::<Vec<_>>();

    pairs
        .iter()
        .zip(indices)
        .map(|(&(source, target), index)| ArcSlot {
            index,
            count: counts[&(source.min(target), source.max(target))],
        })
        .collect()
}

fn make_render_node(node: Node, index: usize) -> RenderNode {
    let (jx, jy) = stable_pair(node.id.as_str());
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    }

    let base_radius = node_radius(node.degree);
    let default_fill = if node.is_arg { GENE_FILL } else { ELEMENT_FILL };
    RenderNode {
        world_pos: direction * SEED_SPREAD,
        velocity: direction.normalized() * (1.15 + base_radius * 0.022),
        base_radius,
        fill: node.color.as_deref().and_then(parse_color).unwrap_or(default_fill),
        shape: NodeShape::parse(node.shape.as_deref()),
        node,
    }
}

/// Refreshes the styling of a node carried over from the previous build.
fn restyle(render: &mut RenderNode, node: Node) {
    let default_fill = if node.is_arg { GENE_FILL } else { ELEMENT_FILL };
    render.base_radius = node_radius(node.degree);
    render.fill = node.color.as_deref().and_then(parse_color).unwrap_or(default_fill);
    render.shape = NodeShape::parse(node.shape.as_deref());
    render.node = node;
}

fn make_render_link(link: &Link, source: usize, target: usize, arc: ArcSlot) -> RenderLink {
    let category = link.category();
    RenderLink {
        source,
        target,
        category,
        color: link
            .color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or_else(|| default_link_color(category)),
        width: link
            .penwidth
            .filter(|width| width.is_finite())
            .map_or(1.2, |width| (width as f32).clamp(0.6, 6.0)),
        arc,
    }
}

impl ViewModel {
    /// Reruns the filter and lays out the result, keeping the positions of
    /// nodes that stay visible.
    pub(in crate::app) fn rebuild_render_graph(&mut self, session: &Session) {
        self.graph_dirty = false;

        // Physics and the side panels see every endpoint-visible link; the
        // toggles only hide links at draw time.
        let graph = session
            .select_nodes()
            .map(|selection| selection.into_graph(LinkToggles::default()))
            .unwrap_or_default();

        self.top_connected = most_connected(&graph, TOP_CONNECTED_ROWS)
            .into_iter()
            .map(|(node, links)| ConnectedEntry {
                id: node.id.to_string(),
                name: node.display_name().to_owned(),
                links,
            })
            .collect();
        if let Some(selected) = &self.selected
            && !graph.nodes.iter().any(|node| node.id.as_str() == selected.as_str())
        {
            self.selected = None;
        }
        self.dragging = None;

        if graph.nodes.is_empty() {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_link_count = 0;
            return;
        }

        let index_by_id = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.to_string(), index))
            .collect::<HashMap<_, _>>();

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|render| (render.node.id.to_string(), render))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let mut carried = 0usize;
        let nodes = graph
            .nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| match prior_nodes.remove(node.id.as_str()) {
                Some(mut render) => {
                    carried += 1;
                    restyle(&mut render, node);
                    render
                }
                None => make_render_node(node, index),
            })
            .collect::<Vec<_>>();

        let endpoints = graph
            .links
            .iter()
            .filter_map(|link| {
                let source = *index_by_id.get(link.source.as_str())?;
                let target = *index_by_id.get(link.target.as_str())?;
                Some((link, source, target))
            })
            .collect::<Vec<_>>();
        let pairs = endpoints
            .iter()
            .map(|&(_, source, target)| (source, target))
            .collect::<Vec<_>>();
        let links = endpoints
            .iter()
            .zip(arc_slots(&pairs))
            .map(|(&(link, source, target), arc)| make_render_link(link, source, target, arc))
            .collect::<Vec<_>>();

        debug!(
            "render graph rebuilt: {} nodes, {} links, {} positions carried over",
            nodes.len(),
            links.len(),
            carried
        );

        self.visible_node_count = nodes.len();
        self.visible_link_count = links.len();
        self.graph_cache = Some(RenderGraph {
            nodes,
            links,
            index_by_id,
            physics_scratch: PhysicsScratch {
                forces: Vec::new(),
                positions: Vec::new(),
                radii: Vec::new(),
                stack: Vec::new(),
            },
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_links_share_a_slot_count() {
        let slots = arc_slots(&[(0, 1), (1, 2), (1, 0), (0, 1)]);
        assert_eq!(slots[0], ArcSlot { index: 0, count: 3 });
        assert_eq!(slots[1], ArcSlot { index: 0, count: 1 });
        assert_eq!(slots[2], ArcSlot { index: 1, count: 3 });
        assert_eq!(slots[3], ArcSlot { index: 2, count: 3 });
    }

    #[test]
    fn new_nodes_take_color_and_shape_from_attributes() {
        let mut gene = Node::new("g");
        gene.is_arg = true;
        let mut element = Node::new("e");
        element.color = Some("#00ff00".to_owned());
        element.shape = Some("symbolDiamond".to_owned());
        element.degree = Some(16.0);

        let gene = make_render_node(gene, 0);
        let element = make_render_node(element, 1);

        assert_eq!(gene.fill, GENE_FILL);
        assert_eq!(gene.shape, NodeShape::Circle);
        assert_eq!(element.fill, eframe::egui::Color32::from_rgb(0, 255, 0));
        assert_eq!(element.shape, NodeShape::Diamond);
        assert!(element.base_radius > gene.base_radius);
    }

    #[test]
    fn link_width_is_clamped() {
        let mut link = Link::new("a", "b", false);
        link.penwidth = Some(40.0);
        let slot = ArcSlot { index: 0, count: 1 };
        assert_eq!(make_render_link(&link, 0, 1, slot).width, 6.0);

        link.penwidth = None;
        assert_eq!(make_render_link(&link, 0, 1, slot).width, 1.2);
    }
}
