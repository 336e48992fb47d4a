use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Node};

/// Day windows used to split a numeric `post` category when no buckets are
/// configured.
const POST_WINDOWS: [(&str, &str, Option<f64>, Option<f64>); 3] = [
    ("post1", "Post (1-30 d)", Some(1.0), Some(30.0)),
    ("post2", "Post (31-60 d)", Some(31.0), Some(60.0)),
    ("post3", "Post (61+ d)", Some(61.0), None),
];

const UNTAGGED_KEY: &str = "untagged";
const POST_REMAINDER_KEY: &str = "post-other";

/// A selectable timepoint: a category tag, optionally narrowed to an inclusive
/// range over the numeric `timepoint` attribute. A missing category matches
/// untagged nodes. A remainder bucket takes the nodes of its category that no
/// ranged bucket in the same list claims.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimepointBucket {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remainder: bool,
}

impl TimepointBucket {
    pub fn category(category: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            key: category.clone(),
            label: None,
            category: Some(category),
            min: None,
            max: None,
            remainder: false,
        }
    }

    pub fn untagged() -> Self {
        Self {
            key: UNTAGGED_KEY.to_owned(),
            label: None,
            category: None,
            min: None,
            max: None,
            remainder: false,
        }
    }

    pub fn remainder(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            remainder: true,
            key: key.into(),
            ..Self::category(category)
        }
    }

    pub fn window(
        key: impl Into<String>,
        category: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self {
            key: key.into(),
            label: None,
            category: Some(category.into()),
            min,
            max,
            remainder: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    pub fn is_ranged(&self) -> bool {
        !self.remainder && (self.min.is_some() || self.max.is_some())
    }

    fn same_category(&self, node: &Node) -> bool {
        node.timepoint_category.as_deref() == self.category.as_deref()
    }

    /// Whether `node` falls in this bucket. `siblings` is the full bucket list,
    /// consulted only by remainder buckets.
    pub fn matches(&self, node: &Node, siblings: &[TimepointBucket]) -> bool {
        if self.remainder {
            return self.same_category(node)
                && !siblings.iter().any(|other| {
                    other.is_ranged() && other.category == self.category && other.in_range(node)
                });
        }
        self.same_category(node) && self.in_range(node)
    }

    fn in_range(&self, node: &Node) -> bool {
        if !self.is_ranged() {
            return true;
        }

        let Some(timepoint) = node.timepoint else {
            return false;
        };
        self.min.is_none_or(|min| timepoint >= min) && self.max.is_none_or(|max| timepoint <= max)
    }
}

fn category_rank(category: &str) -> u8 {
    let lower = category.to_ascii_lowercase();
    if lower.starts_with("donor") {
        0
    } else if lower.starts_with("pre") {
        1
    } else if lower.starts_with("post") {
        2
    } else {
        3
    }
}

fn capitalized(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Buckets derived from the categories present in `dataset`, ordered donor,
/// pre, post, then alphabetically. A bare `post` category whose nodes carry
/// numeric timepoints is split into day windows, plus a remainder bucket when
/// some `post` nodes fall outside every window. Untagged nodes get a bucket of
/// their own, so the full list covers every node.
pub fn default_buckets(dataset: &Dataset) -> Vec<TimepointBucket> {
    let mut numeric_by_category: BTreeMap<&str, bool> = BTreeMap::new();
    let mut untagged = false;
    for node in dataset.nodes() {
        match node.timepoint_category.as_deref() {
            Some(category) => {
                let numeric = numeric_by_category.entry(category).or_insert(false);
                *numeric |= node.timepoint.is_some();
            }
            None => untagged = true,
        }
    }

    let mut categories = numeric_by_category.keys().copied().collect::<Vec<_>>();
    categories.sort_by(|a, b| category_rank(a).cmp(&category_rank(b)).then_with(|| a.cmp(b)));

    let mut buckets = Vec::new();
    for category in categories {
        if category == "post" && numeric_by_category.get(category).copied().unwrap_or(false) {
            let windows = POST_WINDOWS
                .iter()
                .map(|&(key, label, min, max)| {
                    TimepointBucket::window(key, category, min, max).with_label(label)
                })
                .collect::<Vec<_>>();
            let remainder = TimepointBucket::remainder(POST_REMAINDER_KEY, category)
                .with_label("Post (other days)");
            let uncovered = dataset
                .nodes()
                .iter()
                .any(|node| remainder.matches(node, &windows));
            buckets.extend(windows);
            if uncovered {
                buckets.push(remainder);
            }
        } else {
            buckets.push(TimepointBucket::category(category).with_label(capitalized(category)));
        }
    }
    if untagged {
        buckets.push(TimepointBucket::untagged().with_label("Untagged"));
    }
    buckets
}

pub fn bucket_keys(buckets: &[TimepointBucket]) -> BTreeSet<String> {
    buckets.iter().map(|bucket| bucket.key.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Link;

    fn node(id: &str, category: &str, timepoint: Option<f64>) -> Node {
        let mut node = Node::new(id);
        node.timepoint_category = Some(category.to_owned());
        node.timepoint = timepoint;
        node
    }

    #[test]
    fn ranged_bucket_requires_category_and_inclusive_range() {
        let bucket = TimepointBucket::window("post1", "post", Some(1.0), Some(30.0));

        assert!(bucket.matches(&node("a", "post", Some(1.0)), &[]));
        assert!(bucket.matches(&node("b", "post", Some(30.0)), &[]));
        assert!(!bucket.matches(&node("c", "post", Some(31.0)), &[]));
        assert!(!bucket.matches(&node("d", "post", None), &[]));
        assert!(!bucket.matches(&node("e", "pre", Some(10.0)), &[]));
    }

    #[test]
    fn open_ended_window_has_no_upper_bound() {
        let bucket = TimepointBucket::window("post3", "post", Some(61.0), None);
        assert!(bucket.matches(&node("a", "post", Some(400.0)), &[]));
        assert!(!bucket.matches(&node("b", "post", Some(60.0)), &[]));
    }

    #[test]
    fn plain_category_ignores_numeric_timepoint() {
        let bucket = TimepointBucket::category("donor");
        assert!(bucket.matches(&node("a", "donor", Some(1000.0)), &[]));
        assert!(bucket.matches(&node("b", "donor", None), &[]));
        assert!(!bucket.matches(&Node::new("c"), &[]));
    }

    #[test]
    fn remainder_takes_what_the_windows_leave() {
        let buckets = POST_WINDOWS
            .iter()
            .map(|&(key, _, min, max)| TimepointBucket::window(key, "post", min, max))
            .collect::<Vec<_>>();
        let rest = TimepointBucket::remainder("post-other", "post");

        assert!(rest.matches(&node("a", "post", None), &buckets));
        assert!(rest.matches(&node("b", "post", Some(0.0)), &buckets));
        assert!(rest.matches(&node("c", "post", Some(30.5)), &buckets));
        assert!(!rest.matches(&node("d", "post", Some(14.0)), &buckets));
        assert!(!rest.matches(&node("e", "pre", None), &buckets));
    }

    #[test]
    fn default_buckets_cover_every_node() {
        let dataset = Dataset::new(
            vec![
                node("a", "post", Some(14.0)),
                node("b", "post", Some(0.0)),
                node("c", "post", Some(30.5)),
                node("d", "post", None),
                node("e", "pre", None),
                Node::new("f"),
            ],
            Vec::new(),
        )
        .unwrap();

        let buckets = default_buckets(&dataset);
        let keys = buckets.iter().map(|bucket| bucket.key.as_str()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            ["pre", "post1", "post2", "post3", "post-other", "untagged"]
        );
        for node in dataset.nodes() {
            let holders = buckets
                .iter()
                .filter(|bucket| bucket.matches(node, &buckets))
                .count();
            assert_eq!(holders, 1, "{}", node.id);
        }
    }

    #[test]
    fn untagged_dataset_gets_a_single_bucket() {
        let dataset = Dataset::new(vec![Node::new("x"), Node::new("y")], Vec::new()).unwrap();
        assert_eq!(default_buckets(&dataset), [TimepointBucket::untagged().with_label("Untagged")]);
    }

    #[test]
    fn default_buckets_order_and_split_post() {
        let dataset = Dataset::new(
            vec![
                node("a", "post", Some(12.0)),
                node("b", "pre", None),
                node("c", "donor", None),
                node("d", "follow-up", None),
            ],
            vec![Link::new("a", "b", true)],
        )
        .unwrap();

        let keys = default_buckets(&dataset)
            .into_iter()
            .map(|bucket| bucket.key)
            .collect::<Vec<_>>();
        assert_eq!(keys, ["donor", "pre", "post1", "post2", "post3", "follow-up"]);
    }

    #[test]
    fn post_without_numbers_stays_a_single_bucket() {
        let dataset = Dataset::new(
            vec![node("a", "post", None), node("b", "post-late", None)],
            Vec::new(),
        )
        .unwrap();

        let buckets = default_buckets(&dataset);
        let keys = buckets.iter().map(|bucket| bucket.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, ["post", "post-late"]);
        assert_eq!(buckets[1].display_label(), "Post-late");
    }
}
