use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::config::{Config, DatasetSource};
use crate::data::{Dataset, DatasetCache};
use crate::filter::{self, FilterOptions, FilterState, FilteredGraph, NodeSelection};
use crate::profile::DatasetProfile;

/// The dataset currently being filtered, with everything derived from it.
#[derive(Debug)]
pub struct ActiveDataset {
    pub key: String,
    pub dataset: Arc<Dataset>,
    pub profile: DatasetProfile,
    pub options: FilterOptions,
}

/// Explicit viewer/CLI context: configured sources, loaded datasets, the
/// active dataset and the current filter selection.
#[derive(Debug)]
pub struct Session {
    config: Config,
    cache: DatasetCache,
    active: Option<ActiveDataset>,
    state: FilterState,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: DatasetCache::default(),
            active: None,
            state: FilterState::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sources(&self) -> &[DatasetSource] {
        &self.config.datasets
    }

    /// Resolves a key or path without loading it.
    pub fn resolve(&mut self, key_or_path: &str) -> Result<DatasetSource> {
        self.config.resolve(key_or_path)
    }

    pub fn active(&self) -> Option<&ActiveDataset> {
        self.active.as_ref()
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.key.as_str())
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    /// Activates `key_or_path`, loading it on first use. On failure the
    /// previously active dataset stays active.
    pub fn open(&mut self, key_or_path: &str) -> Result<()> {
        let loaded = self.config.resolve(key_or_path).and_then(|source| {
            let dataset = self.cache.get_or_load(&source.key, &source.path)?;
            Ok((source.key, dataset))
        });

        match loaded {
            Ok((key, dataset)) => {
                self.activate(key, dataset);
                Ok(())
            }
            Err(error) => {
                warn!("failed to open dataset {key_or_path}: {error:#}");
                Err(error)
            }
        }
    }

    /// Installs a dataset loaded elsewhere, replacing any cached copy.
    pub fn adopt(&mut self, key: &str, dataset: Dataset) {
        let dataset = self.cache.insert(key, dataset);
        self.activate(key.to_owned(), dataset);
    }

    fn activate(&mut self, key: String, dataset: Arc<Dataset>) {
        let profile = self.config.profile_for(&key, &dataset);
        let options = FilterOptions::derive(&dataset, &profile);

        let links = self.state.links;
        self.state = FilterState::defaults_for(&options);
        self.state.links = links;

        info!(
            "active dataset {key}: {} diseases, {} groups, {} timepoint buckets",
            options.diseases.len(),
            options.groups.len(),
            options.timepoints.len()
        );
        self.active = Some(ActiveDataset {
            key,
            dataset,
            profile,
            options,
        });
    }

    pub fn options(&self) -> Option<&FilterOptions> {
        self.active.as_ref().map(|active| &active.options)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    /// Restores the defaults for the active dataset. Link toggles are reset
    /// too.
    pub fn reset_filters(&mut self) {
        self.state = match self.options() {
            Some(options) => FilterState::defaults_for(options),
            None => FilterState::default(),
        };
    }

    pub fn select_nodes(&self) -> Option<NodeSelection<'_>> {
        let active = self.active.as_ref()?;
        Some(filter::select_nodes(
            &active.dataset,
            &active.profile,
            &self.state,
        ))
    }

    /// Filtered copy of the active dataset; empty when nothing is active.
    pub fn recompute(&self) -> FilteredGraph {
        self.select_nodes()
            .map(|selection| selection.into_graph(self.state.links))
            .unwrap_or_default()
    }
}
