use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub(super) enum RawDataset {
    Producers(Vec<(String, RawProducer)>),
    Songs(Vec<RawSong>),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawProducer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) url: Option<String>,
    #[serde(default, deserialize_with = "lenient_edges")]
    pub(super) edges: Vec<RawEdge>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub(super) total_songs: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub(super) total_collaborations: Option<u64>,
    #[serde(
        default,
        rename = "unique_collaborators_count",
        deserialize_with = "lenient_u64"
    )]
    pub(super) unique_collaborators: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawEdge {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) song_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub(super) collaborators: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawSong {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) song_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_song_producers")]
    pub(super) producers: Vec<RawSongProducer>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawSongProducer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) url: Option<String>,
}

pub(super) fn parse_dataset(raw: &str) -> Result<RawDataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for dataset root"))?;

    if let Some(songs_value) = object.get("songs") {
        let entries = songs_value
            .as_array()
            .ok_or_else(|| anyhow!("invalid songs list in JSON"))?;
        let songs = entries
            .iter()
            .filter_map(|value| RawSong::deserialize(value).ok())
            .collect();
        return Ok(RawDataset::Songs(songs));
    }

    let producers = if let Some(network_value) = object.get("network") {
        let network = network_value
            .as_object()
            .ok_or_else(|| anyhow!("invalid network map in JSON"))?;
        producer_entries(network)
    } else {
        producer_entries(object)
    };

    Ok(RawDataset::Producers(producers))
}

fn producer_entries(map: &Map<String, Value>) -> Vec<(String, RawProducer)> {
    map.iter()
        .filter_map(|(key, value)| {
            if !value.is_object() {
                return None;
            }
            let producer = RawProducer::deserialize(value).ok()?;
            Some((key.clone(), producer))
        })
        .collect()
}

// Producer ids arrive as strings or bare numbers depending on the exporter.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_string(&value))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64())
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(entries) = value.as_array() else {
        return Ok(Vec::new());
    };
    Ok(entries.iter().filter_map(id_string).collect())
}

fn lenient_edges<'de, D>(deserializer: D) -> Result<Vec<RawEdge>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(entries) = value.as_array() else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter_map(|entry| RawEdge::deserialize(entry).ok())
        .collect())
}

fn lenient_song_producers<'de, D>(deserializer: D) -> Result<Vec<RawSongProducer>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(entries) = value.as_array() else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter_map(|entry| RawSongProducer::deserialize(entry).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producers(dataset: RawDataset) -> Vec<(String, RawProducer)> {
        match dataset {
            RawDataset::Producers(entries) => entries,
            RawDataset::Songs(_) => panic!("expected producer map"),
        }
    }

    #[test]
    fn parses_bare_producer_map() {
        let raw = r#"{"10": {"name": "Teddy", "edges": []}}"#;
        let entries = producers(parse_dataset(raw).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "10");
        assert_eq!(entries[0].1.name.as_deref(), Some("Teddy"));
    }

    #[test]
    fn parses_map_nested_under_network_key() {
        let raw = r#"{
            "success": true,
            "network": {"10": {"name": "Teddy"}},
            "stats": {"total_producers": 1}
        }"#;
        let entries = producers(parse_dataset(raw).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "10");
    }

    #[test]
    fn skips_non_object_entries_in_bare_map() {
        let raw = r#"{"success": true, "10": {"name": "Teddy"}}"#;
        let entries = producers(parse_dataset(raw).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "10");
    }

    #[test]
    fn numeric_ids_and_names_are_stringified() {
        let raw = r#"{"10": {
            "name": 77,
            "edges": [{"song_name": "FANCY", "collaborators": [12, "13"]}]
        }}"#;
        let entries = producers(parse_dataset(raw).unwrap());
        let producer = &entries[0].1;
        assert_eq!(producer.name.as_deref(), Some("77"));
        assert_eq!(producer.edges[0].collaborators, vec!["12", "13"]);
    }

    #[test]
    fn malformed_edges_degrade_to_empty() {
        let raw = r#"{
            "10": {"name": "Teddy", "edges": "not-a-list"},
            "11": {"name": "R. Tee", "edges": [{"song_name": "X", "collaborators": {"bad": 1}}]}
        }"#;
        let entries = producers(parse_dataset(raw).unwrap());
        assert!(entries[0].1.edges.is_empty());
        assert!(entries[1].1.edges[0].collaborators.is_empty());
    }

    #[test]
    fn detects_song_list_shape() {
        let raw = r#"{"songs": [
            {"song_name": "FANCY", "producers": [{"id": 1, "name": "A"}, {"id": 2}]}
        ]}"#;
        match parse_dataset(raw).unwrap() {
            RawDataset::Songs(songs) => {
                assert_eq!(songs.len(), 1);
                assert_eq!(songs[0].song_name.as_deref(), Some("FANCY"));
                assert_eq!(songs[0].producers[0].id.as_deref(), Some("1"));
            }
            RawDataset::Producers(_) => panic!("expected songs list"),
        }
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_dataset("{not json").is_err());
        assert!(parse_dataset("[1, 2, 3]").is_err());
        assert!(parse_dataset(r#"{"network": 5}"#).is_err());
    }
}
