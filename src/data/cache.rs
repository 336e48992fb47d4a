use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use super::load::load_dataset;
use super::model::Dataset;

/// Datasets keyed by source key. Entries are loaded once and shared
/// read-only; nothing hands out mutable access to a cached dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn get(&self, key: &str) -> Option<Arc<Dataset>> {
        self.entries.get(key).map(Arc::clone)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        self.entries.insert(key.to_owned(), Arc::clone(&dataset));
        dataset
    }

    pub fn get_or_load(&mut self, key: &str, path: &Path) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.get(key) {
            debug!("dataset cache hit for {key}");
            return Ok(dataset);
        }

        let dataset = load_dataset(path)?;
        Ok(self.insert(key, dataset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn second_lookup_is_served_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, r#"{"nodes": [{"id": "a"}], "links": []}"#).unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load("graph", &path).unwrap();

        fs::remove_file(&path).unwrap();
        let second = cache.get_or_load("graph", &path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let mut cache = DatasetCache::default();
        assert!(
            cache
                .get_or_load("missing", Path::new("/no/such/graph.json"))
                .is_err()
        );
        assert!(!cache.contains("missing"));
    }
}
