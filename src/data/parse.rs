use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::model::{Dataset, Link, Node};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default, alias = "edges")]
    links: Vec<Link>,
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid dataset JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for dataset; expected an object"))?;

    if !object.contains_key("nodes") {
        return Err(anyhow!("dataset JSON has no \"nodes\" array"));
    }

    let raw_dataset = RawDataset::deserialize(&parsed).context("invalid node or link record")?;
    Dataset::new(raw_dataset.nodes, raw_dataset.links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_and_links() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [
                    {"id": "A", "label": "tetM", "isARG": true, "timepointCategory": "pre"},
                    {"id": "B", "label": "Tn916", "mgeGroup": "transposon", "timepointCategory": "pre"}
                ],
                "links": [{"source": "A", "target": "B", "isColo": true, "diseases": ["rCDI"]}]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.node_count(), 2);
        assert_eq!(dataset.link_count(), 1);
        assert!(dataset.links()[0].has_disease("rCDI"));
        assert_eq!(
            dataset.node("B").and_then(|node| node.mge_group.as_deref()),
            Some("transposon")
        );
    }

    #[test]
    fn accepts_edges_alias_and_missing_links() {
        let with_edges =
            parse_dataset(r#"{"nodes": [{"id": 1}, {"id": 2}], "edges": [{"source": 1, "target": 2}]}"#)
                .unwrap();
        assert_eq!(with_edges.link_count(), 1);
        assert!(with_edges.contains("1"));

        let without_links = parse_dataset(r#"{"nodes": []}"#).unwrap();
        assert_eq!(without_links.link_count(), 0);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(parse_dataset("[1, 2, 3]").is_err());
        assert!(parse_dataset(r#"{"links": []}"#).is_err());
        assert!(parse_dataset("{not json").is_err());
    }

    #[test]
    fn rejects_records_with_wrong_types() {
        let error = parse_dataset(r#"{"nodes": [{"id": "a", "isARG": "yes"}]}"#).unwrap_err();
        assert!(format!("{error:#}").contains("invalid node or link record"));
    }
}
