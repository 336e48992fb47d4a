mod barnes_hut;

use eframe::egui::Vec2;

use resistome_viz::LinkCategory;

use super::{PhysicsConfig, RenderGraph};
use barnes_hut::{BarnesHut, Repulsion};

const BARNES_HUT_THETA: f32 = 0.72;
const COLOCALIZATION_LENGTH: f32 = 60.0;
const TEMPORAL_LENGTH: f32 = 110.0;

fn preferred_length(category: LinkCategory) -> f32 {
    match category {
        LinkCategory::Colocalization => COLOCALIZATION_LENGTH,
        LinkCategory::Temporal => TEMPORAL_LENGTH,
    }
}

/// Advances the layout by one frame. `pinned` is held in place (it is being
/// dragged). Returns whether anything is still moving.
pub(super) fn step_physics(
    cache: &mut RenderGraph,
    config: PhysicsConfig,
    pinned: Option<usize>,
) -> bool {
    let node_count = cache.nodes.len();
    if node_count < 2 {
        return false;
    }
    let pinned = pinned.filter(|&index| index < node_count);

    let scratch = &mut cache.physics_scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.radii.clear();
    let mut max_radius = 0.0_f32;
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch.radii.push(node.base_radius);
        max_radius = max_radius.max(node.base_radius);
    }

    let intensity = config.intensity.clamp(0.2, 2.5);
    let repulsion = Repulsion {
        strength: 9_000.0 * intensity * config.repulsion_scale.clamp(0.25, 2.6),
        softening: 400.0,
        theta: BARNES_HUT_THETA,
    };
    let length_scale = config.link_length_scale.clamp(0.3, 3.0);
    let spring_strength = 0.04 * intensity;
    let spring_damping = 0.2;
    let collision_strength = 1.6 * intensity;
    let center_pull = 0.002 * intensity;
    let damping = (0.9 - (intensity * 0.015)).clamp(0.78, 0.95);
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = damping.powf(time_step_scale);

    if let Some(tree) = BarnesHut::build(&scratch.positions) {
        let reach = max_radius * 2.0 * 1.6;
        for index in 0..node_count {
            let mut force = tree.repulsion(
                index,
                &scratch.positions,
                repulsion,
                &mut scratch.stack,
            );
            force += tree.overlap(
                index,
                &scratch.positions,
                &scratch.radii,
                reach,
                1.35,
                &mut scratch.stack,
            ) * collision_strength;
            scratch.forces[index] += force;
        }
    }

    let forces = &mut scratch.forces;
    for link in &cache.links {
        // Parallel links share one spring.
        if link.arc.index != 0 || link.source == link.target {
            continue;
        }
        let (from, to) = (link.source, link.target);

        let delta = cache.nodes[from].world_pos - cache.nodes[to].world_pos;
        let distance = delta.length();
        if distance <= 1e-4 {
            continue;
        }
        let direction = delta / distance;

        let preferred = preferred_length(link.category) * length_scale
            + cache.nodes[from].base_radius
            + cache.nodes[to].base_radius;
        let spring = (distance - preferred) * spring_strength;
        let relative_velocity = cache.nodes[from].velocity - cache.nodes[to].velocity;
        let correction = direction * (spring + relative_velocity.dot(direction) * spring_damping);

        forces[from] -= correction;
        forces[to] += correction;
    }

    for (force, node) in forces.iter_mut().zip(&cache.nodes) {
        *force -= node.world_pos * center_pull;
    }

    let max_force = 150.0 + (intensity * 80.0);
    let max_speed = 10.0 + (intensity * 14.0);
    let mut any_motion = false;
    for (index, node) in cache.nodes.iter_mut().enumerate() {
        if Some(index) == pinned {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = forces[index];
        let force_length = force.length();
        if force_length > max_force {
            force *= max_force / force_length;
        }

        let mut velocity = (node.velocity + force * (0.055 * time_step_scale)) * damping_factor;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }
        if speed < 0.02 && force_length < 0.08 {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        any_motion |= velocity.length_sq() > 1e-6;
    }

    // No recentering while a node is pinned under the pointer.
    if pinned.is_none() {
        let centroid = cache
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.world_pos)
            / node_count as f32;
        if centroid.length_sq() > 1e-6 {
            for node in &mut cache.nodes {
                node.world_pos -= centroid;
            }
        }
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::{Color32, vec2};

    use resistome_viz::Node;

    use super::*;
    use crate::app::render_utils::NodeShape;
    use crate::app::{ArcSlot, PhysicsScratch, RenderLink, RenderNode, ViewScratch};

    fn render_graph(positions: &[Vec2], links: &[(usize, usize)]) -> RenderGraph {
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(index, position)| RenderNode {
                node: Node::new(format!("n{index}")),
                world_pos: *position,
                velocity: Vec2::ZERO,
                base_radius: 7.0,
                fill: Color32::WHITE,
                shape: NodeShape::Circle,
            })
            .collect::<Vec<_>>();
        let links = links
            .iter()
            .map(|&(source, target)| RenderLink {
                source,
                target,
                category: LinkCategory::Colocalization,
                color: Color32::GRAY,
                width: 1.0,
                arc: ArcSlot { index: 0, count: 1 },
            })
            .collect();
        RenderGraph {
            index_by_id: HashMap::new(),
            nodes,
            links,
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
        }
    }

    fn config() -> PhysicsConfig {
        PhysicsConfig {
            intensity: 1.0,
            repulsion_scale: 1.0,
            link_length_scale: 1.0,
            delta_seconds: 1.0 / 60.0,
        }
    }

    #[test]
    fn linked_nodes_far_apart_pull_together() {
        let mut graph = render_graph(&[vec2(-400.0, 0.0), vec2(400.0, 0.0)], &[(0, 1)]);
        for _ in 0..30 {
            step_physics(&mut graph, config(), None);
        }
        let distance = (graph.nodes[0].world_pos - graph.nodes[1].world_pos).length();
        assert!(distance < 800.0);
    }

    #[test]
    fn unlinked_nodes_push_apart() {
        let mut graph = render_graph(&[vec2(-5.0, 0.0), vec2(5.0, 0.0)], &[]);
        step_physics(&mut graph, config(), None);
        let distance = (graph.nodes[0].world_pos - graph.nodes[1].world_pos).length();
        assert!(distance > 10.0);
    }

    #[test]
    fn pinned_node_stays_put() {
        let mut graph = render_graph(
            &[vec2(-300.0, 20.0), vec2(300.0, 0.0), vec2(0.0, 250.0)],
            &[(0, 1), (1, 2)],
        );
        for _ in 0..10 {
            step_physics(&mut graph, config(), Some(0));
        }
        assert_eq!(graph.nodes[0].world_pos, vec2(-300.0, 20.0));
    }

    #[test]
    fn single_node_is_at_rest() {
        let mut graph = render_graph(&[vec2(3.0, 4.0)], &[]);
        assert!(!step_physics(&mut graph, config(), None));
    }
}
