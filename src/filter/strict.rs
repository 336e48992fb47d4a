use std::collections::{BTreeSet, HashSet};

use crate::data::Dataset;
use crate::profile::{DatasetProfile, DiseaseScope};

use super::state::FilterState;

/// Ids of nodes passing every hard constraint: an accepted timepoint bucket
/// and, when one is selected, the disease.
pub fn strict_node_ids<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    state: &FilterState,
) -> HashSet<&'a str> {
    let mut passing = timepoint_passing(dataset, profile, &state.timepoints);

    if let Some(disease) = state.disease.selected() {
        let members = disease_members(dataset, profile.disease_scope, disease);
        passing.retain(|id| members.contains(id));
    }

    passing
}

fn timepoint_passing<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    accepted: &BTreeSet<String>,
) -> HashSet<&'a str> {
    if accepted.is_empty() {
        return HashSet::new();
    }

    let buckets = profile
        .timepoints
        .iter()
        .filter(|bucket| accepted.contains(&bucket.key))
        .collect::<Vec<_>>();

    dataset
        .nodes()
        .iter()
        .filter(|node| {
            buckets
                .iter()
                .any(|bucket| bucket.matches(node, &profile.timepoints))
        })
        .map(|node| node.id.as_str())
        .collect()
}

/// Nodes belonging to `disease`. With link scope, membership comes from the
/// endpoints of colocalization links tagged with the disease.
pub fn disease_members<'a>(
    dataset: &'a Dataset,
    scope: DiseaseScope,
    disease: &str,
) -> HashSet<&'a str> {
    match scope {
        DiseaseScope::Nodes => dataset
            .nodes()
            .iter()
            .filter(|node| node.has_disease(disease))
            .map(|node| node.id.as_str())
            .collect(),
        DiseaseScope::Links => {
            let mut members = HashSet::new();
            for link in dataset.links() {
                if link.is_colo && link.has_disease(disease) {
                    members.insert(link.source.as_str());
                    members.insert(link.target.as_str());
                }
            }
            members
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Choice;
    use crate::filter::fixtures::{all_timepoints, colonization_dataset, sorted};

    #[test]
    fn empty_timepoint_selection_passes_nothing() {
        let (dataset, profile) = colonization_dataset();
        let state = FilterState::default();
        assert!(strict_node_ids(&dataset, &profile, &state).is_empty());

        let state = FilterState {
            disease: Choice::Only("rCDI".to_owned()),
            ..FilterState::default()
        };
        assert!(strict_node_ids(&dataset, &profile, &state).is_empty());
    }

    #[test]
    fn timepoint_buckets_select_by_category_and_day_window() {
        let (dataset, profile) = colonization_dataset();
        let mut state = FilterState::default();
        state.toggle_timepoint("post1", true);

        assert_eq!(sorted(strict_node_ids(&dataset, &profile, &state)), ["arg-post-10"]);

        state.toggle_timepoint("pre", true);
        assert_eq!(
            sorted(strict_node_ids(&dataset, &profile, &state)),
            ["arg-post-10", "arg-pre", "mge-pre"]
        );
    }

    #[test]
    fn link_scoped_disease_projects_onto_colocalization_endpoints() {
        let (dataset, profile) = colonization_dataset();
        let state = FilterState {
            disease: Choice::Only("rCDI".to_owned()),
            ..all_timepoints(&profile)
        };

        // The temporal link carries rCDI too but must not contribute.
        assert_eq!(
            sorted(strict_node_ids(&dataset, &profile, &state)),
            ["arg-pre", "mge-pre"]
        );
    }

    #[test]
    fn node_scoped_disease_reads_node_attribute() {
        let (dataset, mut profile) = colonization_dataset();
        profile.disease_scope = DiseaseScope::Nodes;

        let members = disease_members(&dataset, profile.disease_scope, "UC");
        assert_eq!(sorted(members), ["mge-post-45"]);
    }

    #[test]
    fn unknown_bucket_key_matches_nothing() {
        let (dataset, profile) = colonization_dataset();
        let mut state = FilterState::default();
        state.toggle_timepoint("no-such-bucket", true);
        assert!(strict_node_ids(&dataset, &profile, &state).is_empty());
    }
}
