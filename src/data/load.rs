use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use super::model::Dataset;
use super::parse::parse_dataset;

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset =
        parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))?;

    let dangling = dataset.dangling_link_count();
    if dangling > 0 {
        warn!(
            "{}: {dangling} link(s) reference unknown nodes and will never be shown",
            path.display()
        );
    }

    info!(
        "loaded {} ({} nodes, {} links)",
        path.display(),
        dataset.node_count(),
        dataset.link_count()
    );
    Ok(dataset)
}
