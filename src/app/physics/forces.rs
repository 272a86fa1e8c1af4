use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.70;
const COLLISION_SPACING: f32 = 1.25;
const COLLISION_SLACK: f32 = 4.0;

fn push_between(point_a: Vec2, point_b: Vec2, strength: f32, softening: f32) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 0.0001 {
        delta / distance_sq.sqrt()
    } else {
        vec2(1.0, 0.0)
    };
    direction * (strength / (distance_sq + softening))
}

pub(super) fn accumulate_repulsion(
    tree: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    softening: f32,
    force: &mut Vec2,
) {
    if tree.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if tree.is_leaf() {
        for &other in &tree.indices {
            if other != index {
                *force += push_between(point, positions[other], strength, softening);
            }
        }
        return;
    }

    let delta = point - tree.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let far_enough = !tree.bounds.contains(point)
        && (tree.bounds.side_length() / distance) < BARNES_HUT_THETA
        && tree.mass > 1.0;

    if far_enough {
        let direction = delta / distance;
        *force += direction * ((strength * tree.mass) / (distance_sq + softening));
        return;
    }

    for child in tree.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, strength, softening, force);
    }
}

// Pairwise overlap resolution through a circle query per node; each pair is
// handled once via the index ordering.
pub(super) fn accumulate_collisions(
    tree: &QuadNode,
    positions: &[Vec2],
    radii: &[f32],
    max_radius: f32,
    strength: f32,
    forces: &mut [Vec2],
    hits: &mut Vec<usize>,
) {
    for index in 0..positions.len() {
        let reach = (radii[index] + max_radius) * COLLISION_SPACING + COLLISION_SLACK;
        hits.clear();
        tree.query_circle(positions[index], reach, hits);

        for &other in hits.iter() {
            if other <= index {
                continue;
            }

            let min_distance = (radii[index] + radii[other]) * COLLISION_SPACING + COLLISION_SLACK;
            let delta = positions[index] - positions[other];
            let distance_sq = delta.length_sq();
            if distance_sq >= min_distance * min_distance {
                continue;
            }

            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                let angle = ((index as f32) * 0.618_034 + (other as f32) * 0.414_214)
                    * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin())
            };

            let push = direction * ((min_distance - distance) * strength);
            forces[index] += push;
            forces[other] -= push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_pushes_points_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, 1000.0, 1.0, &mut force);
        assert!(force.x < 0.0, "left point should be pushed further left");
    }

    #[test]
    fn collisions_separate_overlapping_circles() {
        let positions = vec![vec2(0.0, 0.0), vec2(4.0, 0.0), vec2(500.0, 500.0)];
        let radii = vec![8.0, 8.0, 8.0];
        let mut forces = vec![Vec2::ZERO; 3];
        let mut hits = Vec::new();

        let tree = QuadNode::build(&positions).unwrap();
        accumulate_collisions(&tree, &positions, &radii, 8.0, 1.0, &mut forces, &mut hits);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert_eq!(forces[2], Vec2::ZERO, "distant circle is untouched");
    }
}
