/// Data layer: core types, loading, filtering and reporting.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (or LoadError)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Observation>, filter option lists
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  report   │  FilteredView → Report (counts, rankings, histograms)
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;

use self::filter::FilterSelection;
use self::model::Dataset;
use self::report::{Report, ReportOptions};

/// Filter then summarise in one pure step.
pub fn summarize(dataset: &Dataset, selection: &FilterSelection, options: &ReportOptions) -> Report {
    let view = filter::apply(dataset, selection);
    Report::compute(&view, options)
}
