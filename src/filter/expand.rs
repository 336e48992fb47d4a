use std::collections::HashSet;

use crate::data::Dataset;

/// One-hop neighbours of `seeds` over every dataset link, in both directions.
pub fn neighbor_ids<'a>(dataset: &'a Dataset, seeds: &HashSet<&'a str>) -> HashSet<&'a str> {
    let mut neighbors = HashSet::new();
    for link in dataset.links() {
        let source = link.source.as_str();
        let target = link.target.as_str();
        if seeds.contains(source) {
            neighbors.insert(target);
        }
        if seeds.contains(target) {
            neighbors.insert(source);
        }
    }
    neighbors
}

/// `(seeds ∪ neighbours) ∩ strict`. An empty seed set stays empty.
pub fn expand_seeds<'a>(
    dataset: &'a Dataset,
    seeds: &HashSet<&'a str>,
    strict: &HashSet<&'a str>,
) -> HashSet<&'a str> {
    if seeds.is_empty() {
        return HashSet::new();
    }

    let neighbors = neighbor_ids(dataset, seeds);
    seeds
        .iter()
        .chain(neighbors.iter())
        .filter(|id| strict.contains(*id))
        .copied()
        .collect()
}
