use std::collections::HashSet;

use crate::data::CollabGraph;

use super::RenderGraph;

pub(super) struct FrameHighlight {
    pub(super) members: HashSet<usize>,
    pub(super) edges: HashSet<usize>,
    pub(super) from_selection: bool,
}

// Sub-network focus: the selected producer's 1-hop neighborhood from the
// adjacency sets, plus every link that stays inside it.
pub(super) fn selection_highlight(
    graph: &CollabGraph,
    cache: &RenderGraph,
    selected_id: &str,
) -> Option<FrameHighlight> {
    let neighborhood = graph.neighbors(selected_id)?;
    cache.index_by_id.get(selected_id)?;

    let members = neighborhood
        .iter()
        .filter_map(|id| cache.index_by_id.get(id).copied())
        .collect::<HashSet<_>>();

    let edges = cache
        .edges
        .iter()
        .enumerate()
        .filter(|(_, (a, b))| members.contains(a) && members.contains(b))
        .map(|(index, _)| index)
        .collect();

    Some(FrameHighlight {
        members,
        edges,
        from_selection: true,
    })
}

// Hover: the node, its direct neighbors, and its incident links.
pub(super) fn hover_highlight(cache: &RenderGraph, hovered: usize) -> FrameHighlight {
    let mut members = HashSet::from([hovered]);
    if let Some(neighbors) = cache.neighbors.get(hovered) {
        members.extend(neighbors.iter().copied());
    }

    let edges = cache
        .edges
        .iter()
        .enumerate()
        .filter(|(_, (a, b))| *a == hovered || *b == hovered)
        .map(|(index, _)| index)
        .collect();

    FrameHighlight {
        members,
        edges,
        from_selection: false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::Vec2;

    use crate::data::{Link, ProducerNode};

    use super::super::{PhysicsScratch, RenderNode, ViewScratch};
    use super::*;

    fn producer(id: &str) -> ProducerNode {
        ProducerNode {
            id: id.to_string(),
            name: format!("Producer {id}"),
            url: None,
            songs: Vec::new(),
            song_count: 0,
            total_collaborations: 0,
            unique_collaborators: 0,
        }
    }

    // A - B - C in a chain, with D disconnected.
    fn chain_fixture() -> (CollabGraph, RenderGraph) {
        let ids = ["A", "B", "C", "D"];
        let links = vec![
            Link {
                a: "A".into(),
                b: "B".into(),
                songs: vec!["X".into()],
            },
            Link {
                a: "B".into(),
                b: "C".into(),
                songs: vec!["Y".into()],
            },
        ];

        let mut adjacency: HashMap<String, HashSet<String>> = ids
            .iter()
            .map(|id| (id.to_string(), HashSet::from([id.to_string()])))
            .collect();
        for link in &links {
            adjacency.get_mut(&link.a).unwrap().insert(link.b.clone());
            adjacency.get_mut(&link.b).unwrap().insert(link.a.clone());
        }

        let graph = CollabGraph {
            nodes: ids.iter().map(|id| (id.to_string(), producer(id))).collect(),
            links,
            adjacency,
            song_count: 2,
        };

        let nodes = ids
            .iter()
            .map(|id| RenderNode {
                id: id.to_string(),
                world_pos: Vec2::ZERO,
                velocity: Vec2::ZERO,
                metric_value: 1,
                base_radius: 8.0,
                palette_slot: 0,
                pinned: false,
            })
            .collect::<Vec<_>>();
        let edges = vec![(0usize, 1usize), (1, 2)];
        let mut neighbors = vec![Vec::new(); nodes.len()];
        for &(a, b) in &edges {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        let cache = RenderGraph {
            index_by_id: ids
                .iter()
                .enumerate()
                .map(|(index, id)| (id.to_string(), index))
                .collect(),
            nodes,
            edges,
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
        };

        (graph, cache)
    }

    #[test]
    fn selection_focus_covers_the_one_hop_neighborhood() {
        let (graph, cache) = chain_fixture();
        let highlight = selection_highlight(&graph, &cache, "B").unwrap();

        assert!(highlight.from_selection);
        assert_eq!(highlight.members, HashSet::from([0, 1, 2]));
        assert_eq!(highlight.edges, HashSet::from([0, 1]));
    }

    #[test]
    fn selection_focus_of_an_endpoint_excludes_far_links() {
        let (graph, cache) = chain_fixture();
        let highlight = selection_highlight(&graph, &cache, "A").unwrap();

        assert_eq!(highlight.members, HashSet::from([0, 1]));
        // B-C leaves the neighborhood even though B is a member.
        assert_eq!(highlight.edges, HashSet::from([0]));
    }

    #[test]
    fn selection_of_unknown_id_is_none() {
        let (graph, cache) = chain_fixture();
        assert!(selection_highlight(&graph, &cache, "nope").is_none());
    }

    #[test]
    fn hover_highlight_is_node_neighbors_and_incident_links() {
        let (_, cache) = chain_fixture();
        let highlight = hover_highlight(&cache, 0);

        assert!(!highlight.from_selection);
        assert_eq!(highlight.members, HashSet::from([0, 1]));
        assert_eq!(highlight.edges, HashSet::from([0]));

        let isolated = hover_highlight(&cache, 3);
        assert_eq!(isolated.members, HashSet::from([3]));
        assert!(isolated.edges.is_empty());
    }
}
