use std::collections::{HashMap, HashSet};

use super::graph::{CollabGraph, Link, ProducerNode};
use super::parse::{RawDataset, RawEdge, RawProducer, RawSong};

pub(super) fn build_graph(dataset: RawDataset) -> CollabGraph {
    let entries = match dataset {
        RawDataset::Producers(entries) => entries,
        RawDataset::Songs(songs) => producers_from_songs(songs),
    };
    construct(entries)
}

// Derive the producer-keyed network from song-level records. A song with
// fewer than two producers carries no collaboration and contributes nothing.
fn producers_from_songs(songs: Vec<RawSong>) -> Vec<(String, RawProducer)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, RawProducer> = HashMap::new();

    for song in songs {
        let Some(song_name) = song.song_name.filter(|name| !name.is_empty()) else {
            continue;
        };

        let mut credited = Vec::new();
        let mut seen = HashSet::new();
        for producer in song.producers {
            let Some(id) = producer.id.filter(|id| !id.is_empty()) else {
                continue;
            };
            if seen.insert(id.clone()) {
                credited.push((id, producer.name, producer.url));
            }
        }

        if credited.len() < 2 {
            continue;
        }

        let ids: Vec<String> = credited.iter().map(|(id, _, _)| id.clone()).collect();
        for (id, name, url) in credited {
            let entry = by_id.entry(id.clone()).or_insert_with(|| {
                order.push(id.clone());
                RawProducer::default()
            });
            if entry.name.is_none() {
                entry.name = name;
            }
            if entry.url.is_none() {
                entry.url = url;
            }
            entry.edges.push(RawEdge {
                song_name: Some(song_name.clone()),
                collaborators: ids.iter().filter(|other| **other != id).cloned().collect(),
            });
        }
    }

    order
        .into_iter()
        .map(|id| {
            let producer = by_id.remove(&id).unwrap_or_default();
            (id, producer)
        })
        .collect()
}

fn construct(entries: Vec<(String, RawProducer)>) -> CollabGraph {
    let mut nodes = HashMap::with_capacity(entries.len());
    for (id, raw) in &entries {
        nodes.insert(id.clone(), make_node(id, raw));
    }

    let mut links: Vec<Link> = Vec::new();
    let mut link_index: HashMap<(String, String), usize> = HashMap::new();
    let mut link_songs_seen: Vec<HashSet<String>> = Vec::new();

    for (id, raw) in &entries {
        for edge in &raw.edges {
            let Some(song_name) = edge.song_name.as_deref().filter(|name| !name.is_empty())
            else {
                continue;
            };

            for collaborator in &edge.collaborators {
                if collaborator == id || !nodes.contains_key(collaborator) {
                    continue;
                }

                let key = unordered_pair(id, collaborator);
                let index = match link_index.get(&key) {
                    Some(&index) => index,
                    None => {
                        links.push(Link {
                            a: key.0.clone(),
                            b: key.1.clone(),
                            songs: Vec::new(),
                        });
                        link_songs_seen.push(HashSet::new());
                        link_index.insert(key, links.len() - 1);
                        links.len() - 1
                    }
                };

                if link_songs_seen[index].insert(song_name.to_string()) {
                    links[index].songs.push(song_name.to_string());
                }
            }
        }
    }

    let mut adjacency: HashMap<String, HashSet<String>> = nodes
        .keys()
        .map(|id| (id.clone(), HashSet::from([id.clone()])))
        .collect();
    for link in &links {
        if let Some(set) = adjacency.get_mut(&link.a) {
            set.insert(link.b.clone());
        }
        if let Some(set) = adjacency.get_mut(&link.b) {
            set.insert(link.a.clone());
        }
    }

    let mut all_songs = HashSet::new();
    for node in nodes.values() {
        for song in &node.songs {
            all_songs.insert(song.clone());
        }
    }

    CollabGraph {
        nodes,
        links,
        adjacency,
        song_count: all_songs.len(),
    }
}

fn make_node(id: &str, raw: &RawProducer) -> ProducerNode {
    let mut songs = Vec::new();
    let mut seen_songs = HashSet::new();
    let mut listed_collaborators = 0u64;
    let mut distinct_collaborators = HashSet::new();

    for edge in &raw.edges {
        if let Some(song_name) = edge.song_name.as_deref().filter(|name| !name.is_empty())
            && seen_songs.insert(song_name.to_string())
        {
            songs.push(song_name.to_string());
        }
        listed_collaborators += edge.collaborators.len() as u64;
        for collaborator in &edge.collaborators {
            if collaborator != id {
                distinct_collaborators.insert(collaborator.clone());
            }
        }
    }

    let name = raw
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Producer {id}"));

    ProducerNode {
        id: id.to_string(),
        name,
        url: raw.url.clone().filter(|url| !url.is_empty()),
        song_count: raw.total_songs.unwrap_or(raw.edges.len() as u64),
        total_collaborations: raw.total_collaborations.unwrap_or(listed_collaborators),
        unique_collaborators: raw
            .unique_collaborators
            .unwrap_or(distinct_collaborators.len() as u64),
        songs,
    }
}

fn unordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::parse_dataset;
    use super::*;

    fn graph_from(raw: &str) -> CollabGraph {
        build_graph(parse_dataset(raw).unwrap())
    }

    #[test]
    fn builds_nodes_links_and_drops_dangling_references() {
        // A lists B on "X"; B lists A and the unknown C on "Y".
        let raw = r#"{
            "A": {"name": "Teddy", "edges": [{"song_name": "X", "collaborators": ["B"]}]},
            "B": {"name": "R. Tee", "edges": [{"song_name": "Y", "collaborators": ["A", "C"]}]}
        }"#;
        let graph = graph_from(raw);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
        let link = &graph.links[0];
        assert_eq!((link.a.as_str(), link.b.as_str()), ("A", "B"));
        assert_eq!(link.songs, vec!["X", "Y"]);
        assert!(!graph.nodes.contains_key("C"));
        assert!(!graph.adjacency.contains_key("C"));
    }

    #[test]
    fn no_self_loops_or_duplicate_pairs() {
        let raw = r#"{
            "A": {"edges": [
                {"song_name": "Solo", "collaborators": ["A"]},
                {"song_name": "X", "collaborators": ["B", "B"]}
            ]},
            "B": {"edges": [{"song_name": "X", "collaborators": ["A"]}]}
        }"#;
        let graph = graph_from(raw);

        assert_eq!(graph.link_count(), 1);
        for link in &graph.links {
            assert_ne!(link.a, link.b);
            assert!(graph.nodes.contains_key(&link.a));
            assert!(graph.nodes.contains_key(&link.b));
        }
        assert_eq!(graph.links[0].songs, vec!["X"]);
    }

    #[test]
    fn adjacency_contains_self_and_link_endpoints() {
        let raw = r#"{
            "A": {"edges": [{"song_name": "X", "collaborators": ["B"]}]},
            "B": {"edges": []},
            "Z": {"edges": []}
        }"#;
        let graph = graph_from(raw);

        for id in ["A", "B", "Z"] {
            assert!(graph.adjacency[id].contains(id));
        }
        assert!(graph.adjacency["A"].contains("B"));
        assert!(graph.adjacency["B"].contains("A"));
        assert_eq!(graph.adjacency["Z"].len(), 1);
    }

    #[test]
    fn missing_name_falls_back_to_producer_id() {
        let graph = graph_from(r#"{"42": {"edges": []}}"#);
        assert_eq!(graph.nodes["42"].name, "Producer 42");
    }

    #[test]
    fn provided_aggregates_win_over_derived_ones() {
        let raw = r#"{
            "A": {
                "edges": [{"song_name": "X", "collaborators": ["B"]}],
                "total_songs": 9,
                "total_collaborations": 14,
                "unique_collaborators_count": 6
            },
            "B": {"edges": [{"song_name": "X", "collaborators": ["A"]}]}
        }"#;
        let graph = graph_from(raw);

        let a = &graph.nodes["A"];
        assert_eq!(a.song_count, 9);
        assert_eq!(a.total_collaborations, 14);
        assert_eq!(a.unique_collaborators, 6);

        let b = &graph.nodes["B"];
        assert_eq!(b.song_count, 1);
        assert_eq!(b.total_collaborations, 1);
        assert_eq!(b.unique_collaborators, 1);
    }

    #[test]
    fn malformed_records_still_become_nodes() {
        let raw = r#"{
            "A": {"name": "Teddy", "edges": 17},
            "B": {"name": "R. Tee", "edges": [{"collaborators": ["A"]}]}
        }"#;
        let graph = graph_from(raw);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.nodes["A"].song_count, 0);
    }

    #[test]
    fn builds_network_from_song_records() {
        let raw = r#"{"songs": [
            {"song_name": "FANCY", "producers": [
                {"id": 1, "name": "A"}, {"id": 2, "name": "B"}, {"id": 3, "name": "C"}
            ]},
            {"song_name": "Solo", "producers": [{"id": 1, "name": "A"}]},
            {"song_name": "DALLA", "producers": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]}
        ]}"#;
        let graph = graph_from(raw);

        // The solo song is skipped entirely.
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.song_count, 2);

        let one = &graph.nodes["1"];
        assert_eq!(one.song_count, 2);
        assert_eq!(one.total_collaborations, 3);
        assert_eq!(one.unique_collaborators, 2);

        assert_eq!(graph.link_count(), 3);
        let pair = graph
            .links
            .iter()
            .find(|link| link.a == "1" && link.b == "2")
            .unwrap();
        assert_eq!(pair.songs, vec!["FANCY", "DALLA"]);
    }

    #[test]
    fn empty_dataset_builds_empty_graph() {
        let graph = graph_from("{}");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.song_count, 0);
    }
}
