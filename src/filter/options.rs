use std::collections::BTreeSet;

use crate::data::Dataset;
use crate::profile::{DatasetProfile, DiseaseScope};
use crate::timepoint::TimepointBucket;

/// Selector contents for one dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOptions {
    pub diseases: Vec<String>,
    pub groups: Vec<String>,
    pub timepoints: Vec<TimepointBucket>,
}

impl FilterOptions {
    pub fn derive(dataset: &Dataset, profile: &DatasetProfile) -> Self {
        let diseases = match profile.disease_scope {
            DiseaseScope::Nodes => dataset
                .nodes()
                .iter()
                .filter_map(|node| node.diseases.as_ref())
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>(),
            DiseaseScope::Links => dataset
                .links()
                .iter()
                .filter(|link| link.is_colo)
                .filter_map(|link| link.diseases.as_ref())
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>(),
        };

        let groups = dataset
            .nodes()
            .iter()
            .filter(|node| !(profile.group_elements_only && node.is_arg))
            .filter_map(|node| profile.group_field.value(node))
            .filter(|group| !group.is_empty())
            .map(str::to_owned)
            .collect::<BTreeSet<_>>();

        Self {
            diseases: diseases.into_iter().filter(|d| !d.is_empty()).collect(),
            groups: groups.into_iter().collect(),
            timepoints: profile.timepoints.clone(),
        }
    }

    pub fn has_disease(&self, disease: &str) -> bool {
        self.diseases.iter().any(|entry| entry == disease)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|entry| entry == group)
    }
}
