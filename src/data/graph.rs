use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeMetric {
    Songs,
    Collaborations,
}

impl SizeMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Songs => "songs",
            Self::Collaborations => "collaborations",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProducerNode {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub songs: Vec<String>,
    pub song_count: u64,
    pub total_collaborations: u64,
    pub unique_collaborators: u64,
}

impl ProducerNode {
    pub fn metric(&self, metric: SizeMetric) -> u64 {
        match metric {
            SizeMetric::Songs => self.song_count,
            SizeMetric::Collaborations => self.total_collaborations,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Link {
    pub a: String,
    pub b: String,
    pub songs: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct CollabGraph {
    pub nodes: HashMap<String, ProducerNode>,
    pub links: Vec<Link>,
    pub adjacency: HashMap<String, HashSet<String>>,
    pub song_count: usize,
}

impl CollabGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn neighbors(&self, id: &str) -> Option<&HashSet<String>> {
        self.adjacency.get(id)
    }

    // Song titles for the details panel: alphabetical, case-insensitive.
    pub fn sorted_songs(&self, id: &str) -> Vec<String> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut songs = node.songs.clone();
        songs.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        songs.dedup();
        songs
    }

    pub fn top_by_metric(&self, metric: SizeMetric, limit: usize) -> Vec<String> {
        let mut ranked = self
            .nodes
            .values()
            .map(|node| (node.metric(metric), node.name.as_str(), node.id.as_str()))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)).then_with(|| a.2.cmp(b.2)));
        ranked.truncate(limit);
        ranked.into_iter().map(|(_, _, id)| id.to_string()).collect()
    }

    pub fn top_by_unique_collaborators(&self, limit: usize) -> Vec<String> {
        let mut ranked = self
            .nodes
            .values()
            .map(|node| (node.unique_collaborators, node.name.as_str(), node.id.as_str()))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)).then_with(|| a.2.cmp(b.2)));
        ranked.truncate(limit);
        ranked.into_iter().map(|(_, _, id)| id.to_string()).collect()
    }

    pub fn most_collaborative(&self) -> Option<&ProducerNode> {
        self.nodes.values().max_by(|a, b| {
            a.unique_collaborators
                .cmp(&b.unique_collaborators)
                .then_with(|| b.name.cmp(&a.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, songs: &[&str], collabs: u64, unique: u64) -> ProducerNode {
        ProducerNode {
            id: id.to_string(),
            name: name.to_string(),
            url: None,
            songs: songs.iter().map(|s| s.to_string()).collect(),
            song_count: songs.len() as u64,
            total_collaborations: collabs,
            unique_collaborators: unique,
        }
    }

    fn graph_of(nodes: Vec<ProducerNode>) -> CollabGraph {
        let adjacency = nodes
            .iter()
            .map(|n| (n.id.clone(), HashSet::from([n.id.clone()])))
            .collect();
        let nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        CollabGraph {
            nodes,
            links: Vec::new(),
            adjacency,
            song_count: 0,
        }
    }

    #[test]
    fn sorted_songs_is_alphabetical_and_case_insensitive() {
        let graph = graph_of(vec![node(
            "1",
            "Teddy",
            &["zebra", "Apple", "mango", "apple pie"],
            0,
            0,
        )]);
        assert_eq!(
            graph.sorted_songs("1"),
            vec!["Apple", "apple pie", "mango", "zebra"]
        );
    }

    #[test]
    fn sorted_songs_for_unknown_id_is_empty() {
        let graph = graph_of(vec![]);
        assert!(graph.sorted_songs("missing").is_empty());
    }

    #[test]
    fn top_by_metric_orders_descending_with_name_tiebreak() {
        let graph = graph_of(vec![
            node("1", "Alpha", &["a"], 3, 1),
            node("2", "Beta", &["a", "b"], 9, 4),
            node("3", "Gamma", &["a"], 3, 2),
        ]);
        assert_eq!(
            graph.top_by_metric(SizeMetric::Collaborations, 3),
            vec!["2", "1", "3"]
        );
    }

    #[test]
    fn most_collaborative_picks_highest_unique_count() {
        let graph = graph_of(vec![
            node("1", "Alpha", &[], 2, 1),
            node("2", "Beta", &[], 8, 5),
        ]);
        assert_eq!(graph.most_collaborative().map(|n| n.id.as_str()), Some("2"));
    }
}
