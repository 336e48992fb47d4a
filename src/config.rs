use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::profile::{DatasetProfile, ProfileOverrides};
use crate::timepoint::TimepointBucket;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub path: PathBuf,
    #[serde(flatten)]
    pub profile: ProfileOverrides,
}

impl DatasetSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            key,
            label: None,
            path,
            profile: ProfileOverrides::default(),
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub datasets: Vec<DatasetSource>,
    /// Buckets shared by every dataset that does not configure its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timepoints: Option<Vec<TimepointBucket>>,
}

impl Config {
    /// Reads a configuration file. Relative dataset paths are resolved
    /// against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for source in &mut config.datasets {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self::default().with_dataset_paths(paths)
    }

    /// Appends ad-hoc sources for `paths`, skipping keys that are already
    /// configured for the same file.
    pub fn with_dataset_paths<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        for path in paths {
            self.add_path(path.as_ref());
        }
        self
    }

    fn add_path(&mut self, path: &Path) -> &DatasetSource {
        let mut source = DatasetSource::from_path(path);
        if let Some(position) = self.position(&source.key) {
            if self.datasets[position].path == source.path {
                return &self.datasets[position];
            }
            source.key = path.display().to_string();
        }
        self.datasets.push(source);
        &self.datasets[self.datasets.len() - 1]
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.datasets.iter().position(|source| source.key == key)
    }

    fn validate(&self) -> Result<()> {
        for (index, source) in self.datasets.iter().enumerate() {
            if source.key.trim().is_empty() {
                bail!("dataset #{} has an empty key", index + 1);
            }
            if self.datasets[..index]
                .iter()
                .any(|other| other.key == source.key)
            {
                bail!("dataset key {} is configured twice", source.key);
            }
        }
        Ok(())
    }

    pub fn source(&self, key: &str) -> Option<&DatasetSource> {
        self.datasets.iter().find(|source| source.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|source| source.key.as_str())
    }

    /// Looks `key_or_path` up as a configured key, then as a file on disk.
    /// Files are registered as new sources so later lookups hit by key.
    pub fn resolve(&mut self, key_or_path: &str) -> Result<DatasetSource> {
        if let Some(source) = self.source(key_or_path) {
            return Ok(source.clone());
        }

        let path = Path::new(key_or_path);
        if path.is_file() {
            return Ok(self.add_path(path).clone());
        }

        let known = self.keys().collect::<Vec<_>>();
        if known.is_empty() {
            bail!("unknown dataset {key_or_path}: not a configured key or a readable file");
        }
        bail!(
            "unknown dataset {key_or_path}; configured datasets: {}",
            known.join(", ")
        )
    }

    pub fn profile_for(&self, key: &str, dataset: &Dataset) -> DatasetProfile {
        let mut profile = DatasetProfile::detect(dataset);
        if let Some(timepoints) = &self.timepoints {
            profile.timepoints = timepoints.clone();
        }
        if let Some(source) = self.source(key) {
            source.profile.apply(&mut profile);
        }
        profile
    }
}
