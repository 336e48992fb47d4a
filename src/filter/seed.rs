use std::collections::HashSet;

use crate::data::Dataset;
use crate::profile::DatasetProfile;

use super::state::FilterState;

/// Nodes matched directly by the group and search filters, restricted to
/// `strict`. `None` means no soft filter is active.
pub fn seed_node_ids<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    state: &FilterState,
    strict: &HashSet<&'a str>,
) -> Option<HashSet<&'a str>> {
    let group_seeds = state
        .group
        .selected()
        .map(|group| group_matches(dataset, profile, group, strict));
    let search_seeds = search_matches(dataset, profile, state, strict);

    match (group_seeds, search_seeds) {
        (Some(group), Some(search)) => Some(group.intersection(&search).copied().collect()),
        (Some(group), None) => Some(group),
        (None, Some(search)) => Some(search),
        (None, None) => None,
    }
}

fn group_matches<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    group: &str,
    strict: &HashSet<&'a str>,
) -> HashSet<&'a str> {
    dataset
        .nodes()
        .iter()
        .filter(|node| strict.contains(node.id.as_str()))
        .filter(|node| profile.group_field.value(node) == Some(group))
        .map(|node| node.id.as_str())
        .collect()
}

/// Union of the matches of every non-blank search term.
fn search_matches<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    state: &FilterState,
    strict: &HashSet<&'a str>,
) -> Option<HashSet<&'a str>> {
    let needles = state
        .searches
        .iter()
        .filter_map(|term| term.needle().map(|needle| (term.scope, needle)))
        .collect::<Vec<_>>();
    if needles.is_empty() {
        return None;
    }

    let matches = dataset
        .nodes()
        .iter()
        .filter(|node| strict.contains(node.id.as_str()))
        .filter(|node| {
            let Some(text) = profile.search_field.text(node) else {
                return false;
            };
            let text = text.to_lowercase();
            needles
                .iter()
                .any(|(scope, needle)| scope.admits(node) && text.contains(needle.as_str()))
        })
        .map(|node| node.id.as_str())
        .collect();
    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fixtures::{all_timepoints, colonization_dataset, sorted};
    use crate::filter::strict::strict_node_ids;
    use crate::filter::{Choice, SearchScope};

    #[test]
    fn no_soft_filter_yields_no_seed_set() {
        let (dataset, profile) = colonization_dataset();
        let state = all_timepoints(&profile);
        let strict = strict_node_ids(&dataset, &profile, &state);
        assert!(seed_node_ids(&dataset, &profile, &state, &strict).is_none());
    }

    #[test]
    fn search_is_case_insensitive_and_scoped() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        let strict = strict_node_ids(&dataset, &profile, &state);

        state.set_search(SearchScope::Genes, "TET");
        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["arg-post-10", "arg-pre"]);

        // "tn" occurs in gene labels too, but the element scope ignores genes.
        state.set_search(SearchScope::Genes, "");
        state.set_search(SearchScope::Elements, "tn");
        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["mge-post-45", "mge-pre"]);
    }

    #[test]
    fn separate_search_scopes_unite() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        let strict = strict_node_ids(&dataset, &profile, &state);

        state.set_search(SearchScope::Genes, "erm");
        state.set_search(SearchScope::Elements, "916");
        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["arg-donor", "mge-pre"]);
    }

    #[test]
    fn group_and_search_intersect() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.group = Choice::Only("Tn916".to_owned());
        let strict = strict_node_ids(&dataset, &profile, &state);

        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["mge-post-45", "mge-pre"]);

        state.set_search(SearchScope::Any, "post");
        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["mge-post-45"]);
    }

    #[test]
    fn seeds_are_limited_to_the_strict_set() {
        let (dataset, profile) = colonization_dataset();
        let mut state = FilterState::default();
        state.toggle_timepoint("pre", true);
        state.group = Choice::Only("Tn916".to_owned());
        let strict = strict_node_ids(&dataset, &profile, &state);

        let seeds = seed_node_ids(&dataset, &profile, &state, &strict).unwrap();
        assert_eq!(sorted(seeds), ["mge-pre"]);
    }
}
