use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Season;
use crate::data::report::Report;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Option lists come from the dataset; hold our own handle so the
    // selection can be edited while they are borrowed.
    let dataset = Arc::clone(&state.dataset);
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= filter_group(ui, "Year", &dataset.years, &mut state.selection.years, true, None);
            changed |= filter_group(
                ui,
                "Habitat",
                &dataset.habitats,
                &mut state.selection.habitats,
                true,
                None,
            );
            changed |= filter_group(ui, "Season", &Season::ALL, &mut state.selection.seasons, true, None);
            changed |= filter_group(
                ui,
                "Observer",
                &dataset.observers,
                &mut state.selection.observers,
                false,
                Some("(all observers)"),
            );

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    if changed {
        state.refilter();
    }
}

/// Collapsible checkbox list with All / None buttons.  Returns whether the
/// selection changed this frame.
fn filter_group<T: Clone + Ord + Display>(
    ui: &mut Ui,
    title: &str,
    options: &[T],
    selected: &mut BTreeSet<T>,
    default_open: bool,
    empty_hint: Option<&str>,
) -> bool {
    let mut changed = false;
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(default_open)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = options.iter().cloned().collect();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            if selected.is_empty() {
                if let Some(hint) = empty_hint {
                    ui.weak(hint);
                }
            }

            for val in options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} observations loaded, {} visible",
            state.dataset.len(),
            state.visible_count
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Header, key statistics, footer
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui) {
    ui.heading(RichText::new("Bird Species Observation Analysis").size(24.0));
    ui.label(
        "Explore bird species observations across different locations, habitats, \
         and environmental conditions.",
    );
}

/// The four headline numbers above the tabs.
pub fn key_metrics(ui: &mut Ui, report: &Report) {
    ui.strong("Key Statistics");
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Observations", report.total_observations);
        metric(&mut cols[1], "Unique Species", report.unique_species);
        metric(&mut cols[2], "Watchlist Species", report.watchlist_species);
        metric(&mut cols[3], "Unique Sites", report.unique_sites);
    });
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value.to_string()).size(28.0).strong());
    });
}

pub fn footer(ui: &mut Ui) {
    ui.horizontal_centered(|ui: &mut Ui| {
        ui.small("Developed with egui and egui_plot | Bird Monitoring Dataset");
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Let the user pick another table.  On failure the current dataset stays.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bird observations")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
