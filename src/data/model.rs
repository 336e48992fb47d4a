use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Canonical node reference. Link endpoints written as ids, numbers or
/// dereferenced node objects all collapse into this form during parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeRef {
    Text(String),
    Number(serde_json::Number),
    Node { id: Box<RawNodeRef> },
}

impl RawNodeRef {
    fn into_id(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
            Self::Node { id } => id.into_id(),
        }
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawNodeRef::deserialize(deserializer).map(|raw| Self(raw.into_id()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, rename = "mgeGroup", skip_serializing_if = "Option::is_none")]
    pub mge_group: Option<String>,
    #[serde(default, rename = "isARG")]
    pub is_arg: bool,
    #[serde(
        default,
        rename = "timepointCategory",
        skip_serializing_if = "Option::is_none"
    )]
    pub timepoint_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timepoint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diseases: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            label: String::new(),
            name: None,
            shape: None,
            color: None,
            degree: None,
            group: None,
            mge_group: None,
            is_arg: false,
            timepoint_category: None,
            timepoint: None,
            diseases: None,
            extra: Map::new(),
        }
    }

    pub fn has_disease(&self, disease: &str) -> bool {
        self.diseases
            .as_ref()
            .is_some_and(|diseases| diseases.iter().any(|entry| entry == disease))
    }

    /// Short text for canvas labels: `name` when present, otherwise the first
    /// line of `label`.
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref()
            && !name.is_empty()
        {
            return name;
        }

        let first = self.label.split('\n').next().unwrap_or_default();
        let first = first.split("\\n").next().unwrap_or(first);
        if first.is_empty() { self.id.as_str() } else { first }
    }

    /// Full label with literal `\n` escapes expanded, for tooltips.
    pub fn tooltip(&self) -> String {
        if self.label.is_empty() {
            return self.id.to_string();
        }
        self.label.replace("\\n", "\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkCategory {
    Colocalization,
    Temporal,
}

impl LinkCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Colocalization => "colocalization",
            Self::Temporal => "temporal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, rename = "isColo")]
    pub is_colo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penwidth: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diseases: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, is_colo: bool) -> Self {
        Self {
            source: NodeId::new(source),
            target: NodeId::new(target),
            is_colo,
            color: None,
            penwidth: None,
            kind: None,
            style: None,
            diseases: None,
            extra: Map::new(),
        }
    }

    pub fn category(&self) -> LinkCategory {
        if self.is_colo {
            LinkCategory::Colocalization
        } else {
            LinkCategory::Temporal
        }
    }

    pub fn has_disease(&self, disease: &str) -> bool {
        self.diseases
            .as_ref()
            .is_some_and(|diseases| diseases.iter().any(|entry| entry == disease))
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source.as_str() == id || self.target.as_str() == id
    }
}

/// Immutable node/link collection. Construct through [`Dataset::new`] so the
/// id index and uniqueness check stay in sync with `nodes`.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    nodes: Vec<Node>,
    links: Vec<Link>,
    position_by_id: HashMap<NodeId, usize>,
}

impl Dataset {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
        let mut position_by_id = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if node.id.as_str().is_empty() {
                bail!("node at position {position} has an empty id");
            }
            if position_by_id.insert(node.id.clone(), position).is_some() {
                bail!("duplicate node id {}", node.id);
            }
        }

        Ok(Self {
            nodes,
            links,
            position_by_id,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.position_by_id
            .get(id)
            .and_then(|&position| self.nodes.get(position))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position_by_id.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links whose source or target is not a node of this dataset.
    pub fn dangling_link_count(&self) -> usize {
        self.links
            .iter()
            .filter(|link| !self.contains(link.source.as_str()) || !self.contains(link.target.as_str()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_normalize_from_ids_numbers_and_objects() {
        let links: Vec<Link> = serde_json::from_str(
            r#"[
                {"source": "a", "target": "b", "isColo": true},
                {"source": 7, "target": {"id": "b", "x": 1.5, "vx": 0.2}},
                {"source": {"id": 7}, "target": "a"}
            ]"#,
        )
        .unwrap();

        assert_eq!(links[0].source.as_str(), "a");
        assert_eq!(links[1].source.as_str(), "7");
        assert_eq!(links[1].target.as_str(), "b");
        assert_eq!(links[2].source.as_str(), "7");
        assert!(links[0].is_colo);
        assert!(!links[1].is_colo);
    }

    #[test]
    fn unknown_attributes_survive_a_round_trip() {
        let node: Node = serde_json::from_str(
            r#"{"id": "n1", "label": "tetM\npre", "isARG": true, "argId": 12, "timepoint": 14}"#,
        )
        .unwrap();
        assert_eq!(node.timepoint, Some(14.0));
        assert_eq!(node.extra.get("argId"), Some(&Value::from(12)));

        let written = serde_json::to_value(&node).unwrap();
        assert_eq!(written["argId"], Value::from(12));
        assert_eq!(written["isARG"], Value::Bool(true));
        assert!(written.get("name").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = Dataset::new(vec![Node::new("a"), Node::new("a")], Vec::new()).unwrap_err();
        assert!(error.to_string().contains("duplicate node id a"));
    }

    #[test]
    fn dangling_links_are_counted_not_rejected() {
        let dataset = Dataset::new(
            vec![Node::new("a"), Node::new("b")],
            vec![Link::new("a", "b", true), Link::new("a", "ghost", false)],
        )
        .unwrap();
        assert_eq!(dataset.dangling_link_count(), 1);
        assert!(dataset.node("b").is_some());
        assert!(dataset.node("ghost").is_none());
    }

    #[test]
    fn display_name_prefers_name_then_first_label_line() {
        let mut node = Node::new("N_3_ARG_0");
        node.label = "tetM\\nPreFMT".to_owned();
        assert_eq!(node.display_name(), "tetM");
        assert_eq!(node.tooltip(), "tetM\nPreFMT");

        node.name = Some("tet(M)".to_owned());
        assert_eq!(node.display_name(), "tet(M)");
    }
}
