use std::collections::BTreeMap;

use eframe::egui::{self, RichText, Ui};

use resistome_viz::Node;

use super::super::{RenderGraph, ViewModel};

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn attribute_rows(node: &Node) -> Vec<(&str, String)> {
    let mut rows = vec![
        ("id", node.id.to_string()),
        ("class", if node.is_arg { "ARG" } else { "MGE" }.to_owned()),
    ];
    if let Some(name) = &node.name {
        rows.push(("name", name.clone()));
    }
    if let Some(group) = &node.group {
        rows.push(("group", group.clone()));
    }
    if let Some(group) = &node.mge_group {
        rows.push(("element group", group.clone()));
    }
    if let Some(category) = &node.timepoint_category {
        let timepoint = match node.timepoint {
            Some(day) => format!("{category} (day {day})"),
            None => category.clone(),
        };
        rows.push(("timepoint", timepoint));
    }
    if let Some(diseases) = node.diseases.as_ref().filter(|diseases| !diseases.is_empty()) {
        rows.push(("diseases", diseases.join(", ")));
    }
    if let Some(degree) = node.degree {
        rows.push(("degree", degree.to_string()));
    }
    for (key, value) in &node.extra {
        rows.push((key.as_str(), format_value(value)));
    }
    rows
}

/// Neighbors of `index` in the current view, with the number of links to
/// each, sorted by name.
fn neighbors_in_view(cache: &RenderGraph, index: usize) -> Vec<(String, String, usize)> {
    let mut counts = BTreeMap::<usize, usize>::new();
    for link in &cache.links {
        let other = if link.source == index {
            link.target
        } else if link.target == index {
            link.source
        } else {
            continue;
        };
        if other != index {
            *counts.entry(other).or_default() += 1;
        }
    }

    let mut neighbors = counts
        .into_iter()
        .map(|(other, links)| {
            let node = &cache.nodes[other].node;
            (node.id.to_string(), node.display_name().to_owned(), links)
        })
        .collect::<Vec<_>>();
    neighbors.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    neighbors
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection");
        ui.add_space(6.0);

        let mut next_selection = None;
        match self.selected_entry() {
            None => {
                ui.label("Click a node to inspect it.");
            }
            Some((node, neighbors)) => {
                ui.label(RichText::new(node.display_name()).strong());
                let tooltip = node.tooltip();
                if tooltip != node.display_name() {
                    ui.small(tooltip);
                }
                ui.add_space(4.0);

                egui::Grid::new("node_attributes")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (key, value) in attribute_rows(&node) {
                            ui.label(key);
                            ui.label(value);
                            ui.end_row();
                        }
                    });

                ui.separator();
                ui.label(RichText::new(format!("Neighbors in view ({})", neighbors.len())).strong());
                if neighbors.is_empty() {
                    ui.label("No visible links.");
                }
                for (id, name, links) in neighbors {
                    let text = if links > 1 {
                        format!("{name}  (x{links})")
                    } else {
                        name
                    };
                    if ui.link(text).on_hover_text(id.as_str()).clicked() {
                        next_selection = Some(id);
                    }
                }
                if ui.button("Clear selection").clicked() {
                    self.set_selected(None);
                }
            }
        }

        ui.separator();
        ui.label(RichText::new("Most connected").strong());
        if self.top_connected.is_empty() {
            ui.label("Nothing visible.");
        }
        for entry in &self.top_connected {
            let is_selected = self.selected.as_deref() == Some(entry.id.as_str());
            if ui
                .selectable_label(is_selected, format!("{}  ({})", entry.name, entry.links))
                .on_hover_text(entry.id.as_str())
                .clicked()
            {
                next_selection = Some(entry.id.clone());
            }
        }

        if let Some(id) = next_selection {
            self.set_selected(Some(id));
        }
    }

    fn selected_entry(&self) -> Option<(Node, Vec<(String, String, usize)>)> {
        let cache = self.graph_cache.as_ref()?;
        let index = *cache.index_by_id.get(self.selected.as_deref()?)?;
        Some((cache.nodes[index].node.clone(), neighbors_in_view(cache, index)))
    }
}
