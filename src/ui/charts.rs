use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Polygon};

use crate::color::ColorMap;
use crate::data::report::{Count, Histogram, Share};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bar chart with one bar per category.  Category names are drawn
/// on the x axis at integer positions.
pub fn category_bars<K: ToString>(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    counts: &[Count<K>],
    color: Color32,
) {
    if counts.is_empty() {
        no_data(ui);
        return;
    }

    let labels: Vec<String> = counts.iter().map(|c| c.key.to_string()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .zip(&labels)
        .enumerate()
        .map(|(i, (c, label))| {
            Bar::new(i as f64, c.count as f64)
                .name(label)
                .width(0.7)
                .fill(color)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

/// Bars centred on each bin, as wide as the bin.
pub fn histogram(ui: &mut Ui, id: &str, x_label: &str, hist: &Histogram, color: Color32) {
    if hist.is_empty() {
        no_data(ui);
        return;
    }

    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bins
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(width)
                .fill(color)
                .name(format!("{:.1} – {:.1}", b.lower, b.upper))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
    ui.weak(format!("{} readings, bin width {:.2}", hist.total(), width));
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Pie of proportions, starting at twelve o'clock and running clockwise.
pub fn pie(ui: &mut Ui, id: &str, shares: &[Share], colors: &ColorMap) {
    if shares.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for share in shares {
                let sweep = share.proportion * TAU;
                let name = format!("{} ({:.1}%)", share.label, share.proportion * 100.0);
                let fill = colors.color_for(&share.label);
                // Same name for every piece so the legend shows one entry.
                for piece in slice_polygons(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(&name)
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }
                start += sweep;
            }
        });
}

/// Outline of a unit-circle slice, split into convex pieces of at most a
/// quarter turn (egui only fills convex shapes).  Angles are measured
/// clockwise from twelve o'clock.
fn slice_polygons(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f64;

    (0..pieces)
        .map(|p| {
            let from = start + piece_sweep * p as f64;
            let steps = 32;
            let mut points = vec![[0.0, 0.0]];
            for i in 0..=steps {
                let angle = from + piece_sweep * i as f64 / steps as f64;
                let theta = FRAC_PI_2 - angle;
                points.push([theta.cos(), theta.sin()]);
            }
            points
        })
        .collect()
}

fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn no_data(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.weak("No observations match the current filters.");
    ui.add_space(8.0);
}
