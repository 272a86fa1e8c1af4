mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::{PhysicsConfig, RenderGraph};
use forces::{accumulate_collisions, accumulate_repulsion};
use quadtree::QuadNode;

pub(super) fn step_physics(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count < 2 {
        return false;
    }

    let scratch = &mut cache.physics_scratch;
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.forces.fill(Vec2::ZERO);
    scratch.positions.clear();
    scratch.radii.clear();

    let mut max_radius = 0.0_f32;
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch.radii.push(node.base_radius);
        max_radius = max_radius.max(node.base_radius);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let radii = &scratch.radii;

    let intensity = config.intensity.clamp(0.2, 2.5);
    let repulsion_strength = 52_000.0 * intensity * config.repulsion_scale.clamp(0.25, 2.6);
    let spring_strength = 0.021 * intensity * config.spring_scale.clamp(0.2, 2.2);
    let spring_damping = 0.20;
    let collision_strength = 2.1 * intensity * config.collision_scale.clamp(0.2, 2.0);
    let center_pull = 0.0012 * intensity;
    let damping = (config.velocity_damping - (intensity * 0.012)).clamp(0.75, 0.97);
    let softening = 480.0;
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = damping.powf(time_step_scale);

    if let Some(tree) = QuadNode::build(positions) {
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion(&tree, index, positions, repulsion_strength, softening, force);
        }
        accumulate_collisions(
            &tree,
            positions,
            radii,
            max_radius,
            collision_strength,
            forces,
            &mut scratch.hits,
        );
    }

    for &(from, to) in &cache.edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = cache.nodes[from].world_pos - cache.nodes[to].world_pos;
        let distance_sq = delta.length_sq();
        if distance_sq <= 0.0001 * 0.0001 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta / distance;

        let preferred =
            82.0 + (cache.nodes[from].base_radius + cache.nodes[to].base_radius) * 1.4;
        let spring = (distance - preferred) * spring_strength;
        let relative_velocity = cache.nodes[from].velocity - cache.nodes[to].velocity;
        let damping_force = relative_velocity.dot(direction) * spring_damping;
        let correction = direction * (spring + damping_force);

        forces[from] -= correction;
        forces[to] += correction;
    }

    for (index, force) in forces.iter_mut().enumerate().take(node_count) {
        *force -= cache.nodes[index].world_pos * center_pull;
    }

    let max_force = 150.0 + (intensity * 80.0);
    let max_force_sq = max_force * max_force;
    let max_speed = 10.0 + (intensity * 14.0);
    let max_speed_sq = max_speed * max_speed;
    let min_sleep_speed_sq = 0.02 * 0.02;
    let min_sleep_force_sq = 0.08 * 0.08;
    let mut any_motion = false;
    let mut any_pinned = false;

    for (index, force_value) in forces.iter().enumerate().take(node_count) {
        let node = &mut cache.nodes[index];
        if node.pinned {
            // A dragged node follows the pointer, not the integrator.
            node.velocity = Vec2::ZERO;
            any_pinned = true;
            continue;
        }

        let mut force = *force_value;
        let force_sq = force.length_sq();
        if force_sq > max_force_sq {
            force *= max_force / force_sq.sqrt();
        }

        let mut velocity = (node.velocity + (force * (0.055 * time_step_scale))) * damping_factor;
        let mut speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= max_speed / speed_sq.sqrt();
            speed_sq = max_speed_sq;
        }

        if speed_sq < min_sleep_speed_sq && force_sq < min_sleep_force_sq {
            velocity = Vec2::ZERO;
            speed_sq = 0.0;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        if speed_sq > 0.000_001 {
            any_motion = true;
        }
    }

    // Recentering would fight a pinned node, so skip it while dragging.
    if !any_pinned {
        let mut average_velocity = Vec2::ZERO;
        for node in &cache.nodes {
            average_velocity += node.velocity;
        }
        average_velocity /= node_count as f32;
        if average_velocity.length_sq() > 0.000_001 {
            for node in &mut cache.nodes {
                node.velocity -= average_velocity;
            }
        }

        let mut centroid = Vec2::ZERO;
        for node in &cache.nodes {
            centroid += node.world_pos;
        }
        centroid /= node_count as f32;
        if centroid.length_sq() > 0.000_001 {
            for node in &mut cache.nodes {
                node.world_pos -= centroid;
            }
        }
    }

    any_motion
}

// Wake the simulation after a rebuild or canvas resize without recomputing
// positions from scratch.
pub(super) fn kick(cache: &mut RenderGraph, scale: f32) {
    for (index, node) in cache.nodes.iter_mut().enumerate() {
        if node.pinned {
            continue;
        }

        let (jx, jy) = stable_pair(&node.id);
        let mut direction = vec2(jx, jy);
        if direction.length_sq() <= 0.0001 {
            let angle = ((index as f32) * 0.618_034 + 0.29) * std::f32::consts::TAU;
            direction = vec2(angle.cos(), angle.sin());
        } else {
            direction = direction.normalized();
        }

        node.velocity += direction * scale;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::super::{PhysicsScratch, RenderGraph, RenderNode, ViewScratch};
    use super::*;

    fn test_graph(positions: &[Vec2], edges: Vec<(usize, usize)>) -> RenderGraph {
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(index, &world_pos)| RenderNode {
                id: index.to_string(),
                world_pos,
                velocity: Vec2::ZERO,
                metric_value: 1,
                base_radius: 8.0,
                palette_slot: 0,
                pinned: false,
            })
            .collect::<Vec<_>>();

        let mut neighbors = vec![Vec::new(); nodes.len()];
        for &(a, b) in &edges {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        RenderGraph {
            nodes,
            edges,
            index_by_id,
            neighbors,
            physics_scratch: PhysicsScratch {
                forces: Vec::new(),
                positions: Vec::new(),
                radii: Vec::new(),
                hits: Vec::new(),
            },
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
                visible_mask: Vec::new(),
                draw_order: Vec::new(),
                draw_order_dirty: true,
            },
        }
    }

    fn config() -> PhysicsConfig {
        PhysicsConfig {
            intensity: 1.0,
            repulsion_scale: 1.0,
            spring_scale: 1.0,
            collision_scale: 1.0,
            velocity_damping: 0.88,
            delta_seconds: 1.0 / 60.0,
        }
    }

    #[test]
    fn springs_pull_linked_nodes_toward_preferred_length() {
        let mut cache = test_graph(&[vec2(-400.0, 0.0), vec2(400.0, 0.0)], vec![(0, 1)]);
        let start = (cache.nodes[0].world_pos - cache.nodes[1].world_pos).length();

        for _ in 0..400 {
            step_physics(&mut cache, config());
        }

        let end = (cache.nodes[0].world_pos - cache.nodes[1].world_pos).length();
        assert!(end < start, "linked nodes should move closer ({start} -> {end})");
    }

    #[test]
    fn unlinked_nodes_repel() {
        let mut cache = test_graph(&[vec2(-10.0, 0.0), vec2(10.0, 0.0)], Vec::new());

        for _ in 0..60 {
            step_physics(&mut cache, config());
        }

        let distance = (cache.nodes[0].world_pos - cache.nodes[1].world_pos).length();
        assert!(distance > 20.0);
    }

    #[test]
    fn pinned_nodes_do_not_move() {
        let mut cache = test_graph(&[vec2(-10.0, 0.0), vec2(10.0, 0.0)], vec![(0, 1)]);
        cache.nodes[0].pinned = true;
        let held = cache.nodes[0].world_pos;

        for _ in 0..120 {
            step_physics(&mut cache, config());
        }

        assert_eq!(cache.nodes[0].world_pos, held);
    }

    #[test]
    fn kick_wakes_unpinned_nodes() {
        let mut cache = test_graph(&[vec2(0.0, 0.0), vec2(50.0, 0.0)], Vec::new());
        cache.nodes[1].pinned = true;

        kick(&mut cache, 2.0);

        assert!(cache.nodes[0].velocity.length() > 0.0);
        assert_eq!(cache.nodes[1].velocity, Vec2::ZERO);
    }
}
