use std::collections::HashMap;

use eframe::egui::vec2;

use crate::util::stable_pair;

use super::super::render_utils::{node_radius, palette_slot};
use super::super::{PhysicsScratch, RenderGraph, RenderNode, ViewModel, ViewScratch};

impl ViewModel {
    fn sorted_node_ids(&self) -> Vec<String> {
        let mut ids = self.graph.nodes.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    fn make_render_node(
        id: String,
        index: usize,
        metric_value: u64,
        base_radius: f32,
        palette_slot: usize,
        node_count: usize,
    ) -> RenderNode {
        let (jx, jy) = stable_pair(&id);
        let mut direction = vec2(jx, jy);
        if direction.length_sq() <= 0.0001 {
            let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
            direction = vec2(angle.cos(), angle.sin());
        } else {
            direction = direction.normalized();
        }

        // Spawn on a jittered ring so the simulation starts untangled.
        let spawn_radius = (48.0 + (node_count as f32).sqrt() * 22.0) * (0.45 + (jy + 1.0) * 0.3);

        RenderNode {
            id,
            world_pos: direction * spawn_radius,
            velocity: direction * (0.8 + base_radius * 0.02),
            metric_value,
            base_radius,
            palette_slot,
            pinned: false,
        }
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        let ids = self.sorted_node_ids();
        if ids.is_empty() {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.graph_dirty = false;
            return;
        }

        let mut metrics = Vec::with_capacity(ids.len());
        let mut min_metric = u64::MAX;
        let mut max_metric = 0u64;
        for id in &ids {
            let metric = self
                .graph
                .nodes
                .get(id)
                .map(|node| node.metric(self.metric))
                .unwrap_or(0);
            metrics.push(metric);
            min_metric = min_metric.min(metric);
            max_metric = max_metric.max(metric);
        }
        if min_metric == u64::MAX {
            min_metric = 0;
        }
        if max_metric < min_metric {
            max_metric = min_metric;
        }

        let mut index_by_id = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            index_by_id.insert(id.clone(), index);
        }

        let mut edges = Vec::with_capacity(self.graph.links.len());
        for link in &self.graph.links {
            if let (Some(&a), Some(&b)) = (index_by_id.get(&link.a), index_by_id.get(&link.b))
                && a != b
            {
                edges.push((a, b));
            }
        }

        let mut neighbors = vec![Vec::new(); ids.len()];
        for &(a, b) in &edges {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        if let Some(mut cache) = self.graph_cache.take() {
            let mut prior_nodes = cache
                .nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect::<HashMap<_, _>>();

            let mut next_nodes = Vec::with_capacity(ids.len());
            for (index, (id, metric_value)) in ids.iter().zip(metrics.iter()).enumerate() {
                let base_radius = node_radius(*metric_value, min_metric, max_metric);
                let slot = palette_slot(*metric_value, min_metric, max_metric);
                if let Some(mut node) = prior_nodes.remove(id) {
                    node.metric_value = *metric_value;
                    node.base_radius = base_radius;
                    node.palette_slot = slot;
                    next_nodes.push(node);
                } else {
                    next_nodes.push(Self::make_render_node(
                        id.clone(),
                        index,
                        *metric_value,
                        base_radius,
                        slot,
                        ids.len(),
                    ));
                }
            }

            cache.nodes = next_nodes;
            cache.edges = edges;
            cache.index_by_id = index_by_id;
            cache.neighbors = neighbors;
            cache.view_scratch.draw_order_dirty = true;
            self.graph_cache = Some(cache);
        } else {
            let nodes = ids
                .iter()
                .zip(metrics.iter())
                .enumerate()
                .map(|(index, (id, metric_value))| {
                    Self::make_render_node(
                        id.clone(),
                        index,
                        *metric_value,
                        node_radius(*metric_value, min_metric, max_metric),
                        palette_slot(*metric_value, min_metric, max_metric),
                        ids.len(),
                    )
                })
                .collect::<Vec<_>>();

            self.graph_cache = Some(RenderGraph {
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
            });
        }

        if let Some(cache) = &self.graph_cache {
            self.visible_node_count = cache.nodes.len();
            self.visible_edge_count = cache.edges.len();
        }
        self.graph_dirty = false;
    }
}
