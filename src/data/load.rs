use std::fs;

use anyhow::{Context, Result};

use super::build::build_graph;
use super::graph::CollabGraph;
use super::parse::parse_dataset;

pub fn load_network(path: &str) -> Result<CollabGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset from {path}"))?;
    let dataset =
        parse_dataset(&raw).with_context(|| format!("failed to parse dataset {path}"))?;
    Ok(build_graph(dataset))
}
