use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::{self, FilterSelection};
use crate::data::model::Dataset;
use crate::data::report::{Report, ReportOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Report tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    SpeciesDistribution,
    TimeTrends,
    EnvironmentalFactors,
    ObserverInsights,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::SpeciesDistribution,
        Tab::TimeTrends,
        Tab::EnvironmentalFactors,
        Tab::ObserverInsights,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::SpeciesDistribution => "Species Distribution",
            Tab::TimeTrends => "Time Trends",
            Tab::EnvironmentalFactors => "Environmental Factors",
            Tab::ObserverInsights => "Observer Insights",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset, shared read-only.
    pub dataset: Arc<Dataset>,

    /// Current filter choices.
    pub selection: FilterSelection,

    /// Number of observations passing the current filters.
    pub visible_count: usize,

    /// Report for the current selection (recomputed on every change).
    pub report: Report,

    pub options: ReportOptions,

    pub active_tab: Tab,

    /// Habitat colours, stable across filter changes.
    pub habitat_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, options: ReportOptions) -> Self {
        let mut state = Self {
            selection: FilterSelection::all(&dataset),
            habitat_colors: ColorMap::new(dataset.habitats.iter()),
            dataset,
            visible_count: 0,
            report: Report::default(),
            options,
            active_tab: Tab::default(),
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Replace the dataset (File → Open) and reset the filters.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let options = self.options;
        let tab = self.active_tab;
        *self = Self::new(Arc::new(dataset), options);
        self.active_tab = tab;
    }

    /// Back to every year / habitat / season, no observer restriction.
    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::all(&self.dataset);
        self.refilter();
    }

    /// Recompute the report after a selection change.
    pub fn refilter(&mut self) {
        let view = filter::apply(&self.dataset, &self.selection);
        self.report = Report::compute(&view, &self.options);
        self.visible_count = view.len();
        log::debug!(
            "Filter applied: {} of {} observations visible",
            self.visible_count,
            self.dataset.len()
        );
    }
}
