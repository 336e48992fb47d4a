use eframe::egui::{self, Key, Ui};

use resistome_viz::Session;
use resistome_viz::filter::{Choice, SearchScope};

use super::super::ViewModel;

/// Combo box over `values` plus an "All" entry. Returns whether the choice
/// changed.
fn choice_combo(ui: &mut Ui, id: &str, label: &str, choice: &mut Choice, values: &[String]) -> bool {
    let before = choice.clone();
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(choice.selected().unwrap_or("All"))
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(choice, Choice::All, "All");
            for value in values {
                ui.selectable_value(choice, Choice::Only(value.clone()), value.as_str());
            }
        });
    *choice != before
}

/// Single-line search box with a button. Returns true when the query should
/// be applied.
fn search_box(ui: &mut Ui, hint: &str, query: &mut String) -> bool {
    let mut submit = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(query)
                .hint_text(hint)
                .desired_width(ui.available_width() - 70.0),
        );
        submit |= response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        submit |= ui.button("Search").clicked();
    });
    submit
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, session: &mut Session) {
        ui.heading("Filters");
        ui.separator();

        let Some(options) = session.options().cloned() else {
            ui.label("No dataset loaded.");
            return;
        };

        let mut changed = false;
        let state = session.state_mut();

        ui.add_enabled_ui(!options.diseases.is_empty(), |ui| {
            changed |= choice_combo(
                ui,
                "disease_filter",
                "Disease",
                &mut state.disease,
                &options.diseases,
            );
        });
        ui.add_space(4.0);
        ui.add_enabled_ui(!options.groups.is_empty(), |ui| {
            changed |= choice_combo(ui, "group_filter", "Group", &mut state.group, &options.groups);
        });

        ui.add_space(6.0);
        ui.label("Timepoints");
        for bucket in &options.timepoints {
            let mut accepted = state.timepoints.contains(&bucket.key);
            if ui.checkbox(&mut accepted, bucket.display_label()).changed() {
                state.toggle_timepoint(&bucket.key, accepted);
                changed = true;
            }
        }

        ui.separator();
        ui.label("Gene search")
            .on_hover_text("Seeds the view with matching resistance genes and their neighbors.");
        if search_box(ui, "e.g. tetM", &mut self.gene_query) {
            state.set_search(SearchScope::Genes, &self.gene_query);
            changed = true;
        }
        ui.label("Element search")
            .on_hover_text("Seeds the view with matching mobile elements and their neighbors.");
        if search_box(ui, "e.g. Tn916", &mut self.element_query) {
            state.set_search(SearchScope::Elements, &self.element_query);
            changed = true;
        }

        ui.separator();
        ui.checkbox(&mut state.links.colocalization, "Colocalization links")
            .on_hover_text("Show links between genes and elements found together.");
        ui.checkbox(&mut state.links.temporal, "Temporal links")
            .on_hover_text("Show links following an element across timepoints.");
        ui.checkbox(&mut self.show_labels, "Node labels");

        ui.add_space(6.0);
        if ui
            .button("Reset filters")
            .on_hover_text("Restore every selector to its default.")
            .clicked()
        {
            session.reset_filters();
            self.gene_query.clear();
            self.element_query.clear();
            changed = true;
        }

        if changed {
            self.graph_dirty = true;
        }

        ui.separator();
        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Keep simulating layout forces while viewing the graph.");
        ui.collapsing("Physics tuning", |ui| {
            ui.add(
                egui::Slider::new(&mut self.physics_intensity, 0.2..=2.5)
                    .text("Intensity")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Overall strength applied to all physics forces.");
            ui.add(
                egui::Slider::new(&mut self.physics_repulsion, 0.25..=2.6)
                    .text("Repulsion")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly nodes push away from each other.");
            ui.add(
                egui::Slider::new(&mut self.physics_link_length, 0.3..=3.0)
                    .text("Link length")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Scales the rest length of every link.");
        });
    }
}
