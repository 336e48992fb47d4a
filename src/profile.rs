use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Node};
use crate::timepoint::{TimepointBucket, default_buckets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseScope {
    Nodes,
    /// `diseases` on colocalization links, projected onto both endpoints.
    Links,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Group,
    #[serde(alias = "mgeGroup")]
    MgeGroup,
}

impl GroupField {
    pub fn value(self, node: &Node) -> Option<&str> {
        match self {
            Self::Group => node.group.as_deref(),
            Self::MgeGroup => node.mge_group.as_deref(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Label,
    NameOrLabel,
}

impl SearchField {
    pub fn text(self, node: &Node) -> Option<&str> {
        let label = Some(node.label.as_str()).filter(|label| !label.is_empty());
        match self {
            Self::Name => node.name.as_deref(),
            Self::Label => label,
            Self::NameOrLabel => node.name.as_deref().or(label),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatasetProfile {
    pub disease_scope: DiseaseScope,
    pub group_field: GroupField,
    pub group_elements_only: bool,
    pub search_field: SearchField,
    pub timepoints: Vec<TimepointBucket>,
}

impl DatasetProfile {
    pub fn detect(dataset: &Dataset) -> Self {
        let disease_scope = if dataset.links().iter().any(|link| link.diseases.is_some()) {
            DiseaseScope::Links
        } else {
            DiseaseScope::Nodes
        };

        let group_field = if dataset.nodes().iter().any(|node| node.mge_group.is_some()) {
            GroupField::MgeGroup
        } else {
            GroupField::Group
        };

        let search_field = if dataset.nodes().iter().any(|node| node.name.is_some()) {
            SearchField::NameOrLabel
        } else {
            SearchField::Label
        };

        Self {
            disease_scope,
            group_field,
            group_elements_only: group_field == GroupField::Group,
            search_field,
            timepoints: default_buckets(dataset),
        }
    }

    pub fn bucket(&self, key: &str) -> Option<&TimepointBucket> {
        self.timepoints.iter().find(|bucket| bucket.key == key)
    }
}

/// Optional per-dataset settings from the configuration file. Anything left
/// unset keeps the detected value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_scope: Option<DiseaseScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_field: Option<GroupField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_elements_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_field: Option<SearchField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timepoints: Option<Vec<TimepointBucket>>,
}

impl ProfileOverrides {
    pub fn apply(&self, profile: &mut DatasetProfile) {
        if let Some(scope) = self.disease_scope {
            profile.disease_scope = scope;
        }
        if let Some(field) = self.group_field {
            profile.group_field = field;
            if self.group_elements_only.is_none() {
                profile.group_elements_only = field == GroupField::Group;
            }
        }
        if let Some(elements_only) = self.group_elements_only {
            profile.group_elements_only = elements_only;
        }
        if let Some(field) = self.search_field {
            profile.search_field = field;
        }
        if let Some(timepoints) = &self.timepoints {
            profile.timepoints = timepoints.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_dataset;

    #[test]
    fn detects_link_scoped_diseases_and_plain_groups() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [
                    {"id": "a", "label": "x", "name": "tetM", "group": "tet", "isARG": true},
                    {"id": "b", "label": "y", "group": "Tn916"}
                ],
                "links": [{"source": "a", "target": "b", "isColo": true, "diseases": ["rCDI"]}]
            }"#,
        )
        .unwrap();

        let profile = DatasetProfile::detect(&dataset);
        assert_eq!(profile.disease_scope, DiseaseScope::Links);
        assert_eq!(profile.group_field, GroupField::Group);
        assert!(profile.group_elements_only);
        assert_eq!(profile.search_field, SearchField::NameOrLabel);
    }

    #[test]
    fn detects_node_scoped_diseases_and_mge_groups() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [
                    {"id": "a", "label": "x", "mgeGroup": "plasmid", "diseases": ["UC"]}
                ],
                "links": []
            }"#,
        )
        .unwrap();

        let profile = DatasetProfile::detect(&dataset);
        assert_eq!(profile.disease_scope, DiseaseScope::Nodes);
        assert_eq!(profile.group_field, GroupField::MgeGroup);
        assert!(!profile.group_elements_only);
        assert_eq!(profile.search_field, SearchField::Label);
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let dataset = parse_dataset(r#"{"nodes": [{"id": "a", "group": "g"}]}"#).unwrap();
        let mut profile = DatasetProfile::detect(&dataset);

        let overrides: ProfileOverrides = serde_json::from_str(
            r#"{"disease_scope": "links", "group_field": "mgeGroup", "search_field": "name"}"#,
        )
        .unwrap();
        overrides.apply(&mut profile);

        assert_eq!(profile.disease_scope, DiseaseScope::Links);
        assert_eq!(profile.group_field, GroupField::MgeGroup);
        assert!(!profile.group_elements_only);
        assert_eq!(profile.search_field, SearchField::Name);
        let keys = profile
            .timepoints
            .iter()
            .map(|bucket| bucket.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, ["untagged"]);
    }

    #[test]
    fn name_or_label_falls_back_to_label() {
        let mut node = Node::new("a");
        node.label = "Tn916\npost".to_owned();
        assert_eq!(SearchField::NameOrLabel.text(&node), Some("Tn916\npost"));
        assert_eq!(SearchField::Name.text(&node), None);

        node.name = Some("Tn916".to_owned());
        assert_eq!(SearchField::NameOrLabel.text(&node), Some("Tn916"));
    }
}
