use std::collections::HashSet;

use crate::data::{Dataset, Link};

use super::state::LinkToggles;

/// Dataset links, in dataset order, whose endpoints are both visible.
pub fn endpoint_visible_links<'a>(dataset: &'a Dataset, visible: &HashSet<&str>) -> Vec<&'a Link> {
    dataset
        .links()
        .iter()
        .filter(|link| {
            visible.contains(link.source.as_str()) && visible.contains(link.target.as_str())
        })
        .collect()
}

/// Display pass over already endpoint-visible links. Never touches the node set.
pub fn displayed_links<'a, I>(links: I, toggles: LinkToggles) -> Vec<&'a Link>
where
    I: IntoIterator<Item = &'a Link>,
{
    links.into_iter().filter(|link| toggles.shows(link)).collect()
}
