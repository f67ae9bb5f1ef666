use eframe::egui::{Color32, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::generate_palette;
use crate::data::report::Count;
use crate::state::{AppState, Tab};
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Tab strip and per-tab content (central panel)
// ---------------------------------------------------------------------------

pub fn tab_strip(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
}

pub fn tab_content(ui: &mut Ui, state: &AppState) {
    // One accent colour per chart, fixed across frames.
    let accents = generate_palette(8);
    let report = &state.report;

    match state.active_tab {
        Tab::SpeciesDistribution => {
            ui.strong(format!("Top {} Most Observed Bird Species", state.options.top_n));
            charts::category_bars(ui, "top_species", "Species", "Count", &report.top_species, accents[0]);
            ranking_table(ui, "top_species_table", "Species", "Count", &report.top_species);

            ui.add_space(12.0);
            ui.strong("Observation by Habitat");
            charts::pie(ui, "habitat_pie", &report.habitat_distribution, &state.habitat_colors);
        }
        Tab::TimeTrends => {
            ui.strong("Observations by Year");
            charts::category_bars(ui, "by_year", "Year", "Count", &report.by_year, accents[1]);
            ui.strong("Observations by Month");
            charts::category_bars(ui, "by_month", "Month", "Count", &report.by_month, accents[2]);
            ui.strong("Seasonal Observation Trend");
            charts::category_bars(ui, "by_season", "Season", "Count", &report.by_season, accents[3]);
        }
        Tab::EnvironmentalFactors => {
            ui.strong("Temperature and Humidity Distribution");
            ui.columns(2, |cols: &mut [Ui]| {
                charts::histogram(&mut cols[0], "temperature", "Temperature", &report.temperature, accents[4]);
                charts::histogram(&mut cols[1], "humidity", "Humidity", &report.humidity, accents[5]);
            });
            ui.strong("Sky and Wind Conditions");
            ui.columns(2, |cols: &mut [Ui]| {
                charts::category_bars(&mut cols[0], "sky", "Sky", "Count", &report.sky, accents[6]);
                charts::category_bars(&mut cols[1], "wind", "Wind", "Count", &report.wind, accents[7]);
            });
        }
        Tab::ObserverInsights => {
            ui.strong(format!("Top {} Observers", state.options.top_n));
            charts::category_bars(
                ui,
                "top_observers",
                "Observer",
                "Observations",
                &report.top_observers,
                accents[0],
            );
            ui.strong("Observers by Species Diversity");
            charts::category_bars(
                ui,
                "observer_diversity",
                "Observer",
                "Unique Species",
                &report.observer_diversity,
                accents[2],
            );
            ranking_table(
                ui,
                "observer_diversity_table",
                "Observer",
                "Unique Species",
                &report.observer_diversity,
            );
        }
    }
}

/// Two-column striped table under a ranking chart.
fn ranking_table(ui: &mut Ui, id: &str, key_header: &str, count_header: &str, rows: &[Count<String>]) {
    if rows.is_empty() {
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(160.0))
            .column(Column::remainder().at_least(80.0))
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(key_header);
                });
                header.col(|ui| {
                    ui.strong(count_header);
                });
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.label(&row.key);
                        });
                        table_row.col(|ui| {
                            ui.colored_label(Color32::LIGHT_GRAY, row.count.to_string());
                        });
                    });
                }
            });
    });
}
