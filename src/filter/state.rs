use std::collections::BTreeSet;

use crate::data::{Link, LinkCategory, Node};
use crate::timepoint::bucket_keys;

use super::options::FilterOptions;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// Parses selector input; empty text and `all` (any case) mean no selection.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchScope {
    Any,
    Genes,
    Elements,
}

impl SearchScope {
    pub fn admits(self, node: &Node) -> bool {
        match self {
            Self::Any => true,
            Self::Genes => node.is_arg,
            Self::Elements => !node.is_arg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTerm {
    pub scope: SearchScope,
    pub query: String,
}

impl SearchTerm {
    pub fn new(scope: SearchScope, query: impl Into<String>) -> Self {
        Self {
            scope,
            query: query.into(),
        }
    }

    pub fn needle(&self) -> Option<String> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkToggles {
    pub colocalization: bool,
    pub temporal: bool,
}

impl Default for LinkToggles {
    fn default() -> Self {
        Self {
            colocalization: true,
            temporal: true,
        }
    }
}

impl LinkToggles {
    pub fn shows(self, link: &Link) -> bool {
        self.shows_category(link.category())
    }

    pub fn shows_category(self, category: LinkCategory) -> bool {
        match category {
            LinkCategory::Colocalization => self.colocalization,
            LinkCategory::Temporal => self.temporal,
        }
    }
}

/// Current selector values. The default accepts no timepoint, so it shows
/// nothing. [`FilterState::defaults_for`] accepts every bucket, which covers
/// every node when the buckets are the detected defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub disease: Choice,
    pub group: Choice,
    pub timepoints: BTreeSet<String>,
    pub searches: Vec<SearchTerm>,
    pub links: LinkToggles,
}

impl FilterState {
    pub fn defaults_for(options: &FilterOptions) -> Self {
        Self {
            timepoints: bucket_keys(&options.timepoints),
            ..Self::default()
        }
    }

    pub fn has_active_search(&self) -> bool {
        self.searches.iter().any(|term| term.needle().is_some())
    }

    pub fn has_soft_filter(&self) -> bool {
        !self.group.is_all() || self.has_active_search()
    }

    pub fn search_query(&self, scope: SearchScope) -> &str {
        self.searches
            .iter()
            .find(|term| term.scope == scope)
            .map(|term| term.query.as_str())
            .unwrap_or_default()
    }

    pub fn set_search(&mut self, scope: SearchScope, query: &str) {
        self.searches.retain(|term| term.scope != scope);
        if !query.trim().is_empty() {
            self.searches.push(SearchTerm::new(scope, query));
        }
    }

    pub fn toggle_timepoint(&mut self, key: &str, accepted: bool) {
        if accepted {
            self.timepoints.insert(key.to_owned());
        } else {
            self.timepoints.remove(key);
        }
    }
}
