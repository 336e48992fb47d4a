use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};

use crate::data::{LinkCategory, Node};
use crate::filter::FilteredGraph;

pub fn write_json<W: Write>(graph: &FilteredGraph, writer: W, compact: bool) -> Result<()> {
    let written = if compact {
        serde_json::to_writer(writer, graph)
    } else {
        serde_json::to_writer_pretty(writer, graph)
    };
    written.context("failed to write filtered graph as JSON")
}

fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Graphviz rendering of `graph`. Colocalization links are drawn without
/// arrowheads; temporal links are dashed arrows.
pub fn to_dot(graph: &FilteredGraph) -> String {
    let mut out = String::from("digraph resistome {\n    node [style=filled];\n");

    for node in &graph.nodes {
        let label = node.label.replace("\\n", "\n");
        let label = if label.is_empty() { node.id.as_str() } else { &label };
        let mut attributes = vec![format!("label={}", quoted(label))];
        if let Some(shape) = node.shape.as_deref() {
            attributes.push(format!("shape={}", quoted(shape)));
        }
        if let Some(color) = node.color.as_deref() {
            attributes.push(format!("fillcolor={}", quoted(color)));
        }
        out.push_str(&format!(
            "    {} [{}];\n",
            quoted(node.id.as_str()),
            attributes.join(", ")
        ));
    }

    for link in &graph.links {
        let mut attributes = match link.category() {
            LinkCategory::Colocalization => vec!["dir=none".to_owned(), "style=solid".to_owned()],
            LinkCategory::Temporal => vec!["style=dashed".to_owned()],
        };
        if let Some(color) = link.color.as_deref() {
            attributes.push(format!("color={}", quoted(color)));
        }
        if let Some(width) = link.penwidth {
            attributes.push(format!("penwidth={width}"));
        }
        out.push_str(&format!(
            "    {} -> {} [{}];\n",
            quoted(link.source.as_str()),
            quoted(link.target.as_str()),
            attributes.join(", ")
        ));
    }

    out.push_str("}\n");
    out
}

/// Node and link counts of a filtered graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub args: usize,
    pub mges: usize,
    pub colocalization_edges: usize,
    pub temporal_edges: usize,
}

impl GraphSummary {
    pub const CSV_HEADER: &'static str =
        "TotalNodes,TotalEdges,ARGs,MGEs,ColocalizationEdges,TemporalEdges";

    pub fn of(graph: &FilteredGraph) -> Self {
        let args = graph.nodes.iter().filter(|node| node.is_arg).count();
        let colocalization_edges = graph.links.iter().filter(|link| link.is_colo).count();
        Self {
            total_nodes: graph.nodes.len(),
            total_edges: graph.links.len(),
            args,
            mges: graph.nodes.len() - args,
            colocalization_edges,
            temporal_edges: graph.links.len() - colocalization_edges,
        }
    }

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.total_nodes,
            self.total_edges,
            self.args,
            self.mges,
            self.colocalization_edges,
            self.temporal_edges
        )
    }
}

/// The `top` nodes with the most incident links, ties broken by id.
pub fn most_connected(graph: &FilteredGraph, top: usize) -> Vec<(&Node, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for link in &graph.links {
        *counts.entry(link.source.as_str()).or_default() += 1;
        if link.target != link.source {
            *counts.entry(link.target.as_str()).or_default() += 1;
        }
    }

    let mut ranked = graph
        .nodes
        .iter()
        .map(|node| (node, counts.get(node.id.as_str()).copied().unwrap_or(0)))
        .filter(|(_, count)| *count > 0)
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
    ranked.truncate(top);
    ranked
}
