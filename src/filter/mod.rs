//! Node and link selection for a dataset under a [`FilterState`].
//!
//! The pipeline runs in four stages: the strict attribute filter, seed
//! selection from the soft (group and search) filters, one-hop neighbour
//! expansion clipped to the strict set, and link visibility. The cached
//! dataset is only ever borrowed; [`FilteredGraph`] holds owned copies.

mod expand;
mod links;
mod options;
mod seed;
mod state;
mod strict;

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Link, Node};
use crate::profile::DatasetProfile;

pub use expand::{expand_seeds, neighbor_ids};
pub use links::{displayed_links, endpoint_visible_links};
pub use options::FilterOptions;
pub use seed::seed_node_ids;
pub use state::{Choice, FilterState, LinkToggles, SearchScope, SearchTerm};
pub use strict::{disease_members, strict_node_ids};

/// Borrowed result of the node stages, before link toggles are applied.
#[derive(Debug)]
pub struct NodeSelection<'a> {
    dataset: &'a Dataset,
    pub strict: HashSet<&'a str>,
    pub seeds: Option<HashSet<&'a str>>,
    pub visible: HashSet<&'a str>,
}

impl<'a> NodeSelection<'a> {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// Visible nodes in dataset order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.dataset
            .nodes()
            .iter()
            .filter(|node| self.visible.contains(node.id.as_str()))
    }

    /// Links with both endpoints visible, ignoring the display toggles.
    pub fn visible_links(&self) -> Vec<&'a Link> {
        endpoint_visible_links(self.dataset, &self.visible)
    }

    pub fn into_graph(self, toggles: LinkToggles) -> FilteredGraph {
        let links = displayed_links(self.visible_links(), toggles)
            .into_iter()
            .cloned()
            .collect();
        FilteredGraph {
            nodes: self.visible_nodes().cloned().collect(),
            links,
        }
    }
}

/// Runs the node stages. Link toggles are not consulted.
pub fn select_nodes<'a>(
    dataset: &'a Dataset,
    profile: &DatasetProfile,
    state: &FilterState,
) -> NodeSelection<'a> {
    let strict = strict_node_ids(dataset, profile, state);
    let seeds = seed_node_ids(dataset, profile, state, &strict);

    let visible = match &seeds {
        Some(seeds) => expand_seeds(dataset, seeds, &strict),
        None => strict.clone(),
    };

    debug!(
        "filter: {} strict, {} seeds, {} visible of {} nodes",
        strict.len(),
        seeds.as_ref().map_or(0, HashSet::len),
        visible.len(),
        dataset.node_count()
    );

    NodeSelection {
        dataset,
        strict,
        seeds,
        visible,
    }
}

/// Owned output handed to renderers and exporters: visible nodes and
/// displayed links, both in dataset order with every attribute intact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl FilteredGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn apply(dataset: &Dataset, profile: &DatasetProfile, state: &FilterState) -> FilteredGraph {
    select_nodes(dataset, profile, state).into_graph(state.links)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{all_timepoints, colonization_dataset, node_ids, sorted};
    use super::*;
    use crate::data::parse_dataset;
    use crate::profile::{DiseaseScope, GroupField, SearchField};

    fn ids(graph: &FilteredGraph) -> Vec<&str> {
        sorted(node_ids(&graph.nodes))
    }

    fn link_pairs(graph: &FilteredGraph) -> Vec<(&str, &str)> {
        graph
            .links
            .iter()
            .map(|link| (link.source.as_str(), link.target.as_str()))
            .collect()
    }

    #[test]
    fn fixture_profile_is_detected() {
        let (_, profile) = colonization_dataset();
        assert_eq!(profile.disease_scope, DiseaseScope::Links);
        assert_eq!(profile.group_field, GroupField::Group);
        assert_eq!(profile.search_field, SearchField::Label);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.set_search(SearchScope::Genes, "tet");

        let first = apply(&dataset, &profile, &state);
        let second = apply(&dataset, &profile, &state);
        assert_eq!(first, second);
    }

    #[test]
    fn output_is_a_subset_with_closed_links() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.group = Choice::Only("Tn916".to_owned());

        let graph = apply(&dataset, &profile, &state);
        let visible = node_ids(&graph.nodes);
        assert!(visible.iter().all(|id| dataset.contains(id)));
        for link in &graph.links {
            assert!(dataset.links().contains(link));
            assert!(visible.contains(link.source.as_str()));
            assert!(visible.contains(link.target.as_str()));
        }
    }

    #[test]
    fn strict_constraints_are_conjunctive() {
        let (dataset, profile) = colonization_dataset();

        let mut timepoint_only = FilterState::default();
        timepoint_only.toggle_timepoint("pre", true);
        timepoint_only.toggle_timepoint("post1", true);
        let disease_only = FilterState {
            disease: Choice::Only("rCDI".to_owned()),
            ..all_timepoints(&profile)
        };
        let both = FilterState {
            disease: Choice::Only("rCDI".to_owned()),
            ..timepoint_only.clone()
        };

        let left = strict_node_ids(&dataset, &profile, &timepoint_only);
        let right = strict_node_ids(&dataset, &profile, &disease_only);
        let expected = left.intersection(&right).copied().collect::<HashSet<_>>();
        assert_eq!(strict_node_ids(&dataset, &profile, &both), expected);
    }

    #[test]
    fn without_soft_filters_the_strict_set_passes_through() {
        let (dataset, profile) = colonization_dataset();
        let mut state = FilterState::default();
        state.toggle_timepoint("pre", true);

        let selection = select_nodes(&dataset, &profile, &state);
        assert!(selection.seeds.is_none());
        assert_eq!(selection.visible, selection.strict);
        assert_eq!(sorted(selection.visible), ["arg-pre", "mge-pre"]);
    }

    #[test]
    fn empty_timepoint_selection_shows_nothing() {
        let (dataset, profile) = colonization_dataset();
        let mut state = FilterState::default();
        state.group = Choice::Only("Tn916".to_owned());
        state.set_search(SearchScope::Any, "tet");

        let graph = apply(&dataset, &profile, &state);
        assert!(graph.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn search_expands_one_hop_in_both_directions() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.set_search(SearchScope::Elements, "tn916");

        // mge-pre is reached from mge-donor by a temporal link and from
        // arg-pre by a colocalization link.
        let graph = apply(&dataset, &profile, &state);
        assert_eq!(ids(&graph), ["arg-pre", "mge-donor", "mge-pre"]);
        assert_eq!(
            link_pairs(&graph),
            [("arg-pre", "mge-pre"), ("mge-donor", "mge-pre")]
        );
    }

    #[test]
    fn neighbours_failing_strict_filters_are_dropped() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.toggle_timepoint("donor", false);
        state.set_search(SearchScope::Elements, "tn916");

        let graph = apply(&dataset, &profile, &state);
        assert_eq!(ids(&graph), ["arg-pre", "mge-pre"]);
    }

    #[test]
    fn search_matching_nothing_shows_nothing() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        state.set_search(SearchScope::Any, "vanA");

        let selection = select_nodes(&dataset, &profile, &state);
        assert_eq!(selection.seeds.as_ref().map(HashSet::len), Some(0));

        let graph = selection.into_graph(state.links);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn link_toggles_leave_nodes_alone() {
        let (dataset, profile) = colonization_dataset();
        let mut state = all_timepoints(&profile);
        let everything = apply(&dataset, &profile, &state);

        state.links.temporal = false;
        let colo_only = apply(&dataset, &profile, &state);
        assert_eq!(colo_only.nodes, everything.nodes);
        assert!(colo_only.links.iter().all(|link| link.is_colo));
        assert_eq!(colo_only.links.len(), 3);

        state.links = LinkToggles {
            colocalization: false,
            temporal: true,
        };
        let temporal_only = apply(&dataset, &profile, &state);
        assert_eq!(temporal_only.nodes, everything.nodes);
        assert!(temporal_only.links.iter().all(|link| !link.is_colo));
        assert_eq!(temporal_only.links.len(), 2);
    }

    #[test]
    fn dangling_links_are_never_rendered() {
        let (dataset, profile) = colonization_dataset();
        let graph = apply(&dataset, &profile, &all_timepoints(&profile));
        assert_eq!(graph.nodes.len(), dataset.node_count());
        assert_eq!(graph.links.len(), dataset.link_count() - 1);
        assert!(graph.links.iter().all(|link| !link.touches("ghost")));
    }

    fn three_node_scenario(b_category: &str) -> (Dataset, DatasetProfile) {
        let raw = format!(
            r#"{{
                "nodes": [
                    {{"id": "A", "label": "A", "group": "group1", "timepointCategory": "pre"}},
                    {{"id": "B", "label": "B", "group": "group2", "timepointCategory": "{b_category}"}},
                    {{"id": "C", "label": "C", "group": "group1", "timepointCategory": "post"}}
                ],
                "links": [{{"source": "A", "target": "B", "isColo": true}}]
            }}"#
        );
        let dataset = parse_dataset(&raw).unwrap();
        let profile = DatasetProfile::detect(&dataset);
        (dataset, profile)
    }

    // group1 seeds A; its neighbour B is dropped because post is not accepted.
    #[test]
    fn group1_scenario_with_b_at_post_yields_only_a() {
        let (dataset, profile) = three_node_scenario("post");
        let mut state = FilterState::default();
        state.toggle_timepoint("pre", true);
        state.group = Choice::Only("group1".to_owned());

        let selection = select_nodes(&dataset, &profile, &state);
        assert_eq!(sorted(selection.strict.iter().copied()), ["A"]);
        assert_eq!(sorted(selection.seeds.clone().unwrap()), ["A"]);
        assert_eq!(sorted(selection.visible.iter().copied()), ["A"]);
        assert!(selection.visible_links().is_empty());
    }

    // The same scenario with B at pre, as the dataset is usually written: B
    // passes the strict filter, so the one-hop neighbour stays.
    #[test]
    fn group1_scenario_with_b_at_pre_keeps_the_neighbour() {
        let (dataset, profile) = three_node_scenario("pre");
        let mut state = FilterState::default();
        state.toggle_timepoint("pre", true);
        state.group = Choice::Only("group1".to_owned());

        let graph = apply(&dataset, &profile, &state);
        assert_eq!(ids(&graph), ["A", "B"]);
        assert_eq!(link_pairs(&graph), [("A", "B")]);
    }
}
