//! Startup configuration: command line flags, each backed by an
//! environment variable.

use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::FilterSelection;
use crate::data::model::{Dataset, Season};
use crate::data::report::{ReportOptions, DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_N};

/// Dataset read when no path is given.
pub const DEFAULT_DATA_FILE: &str = "cleaned_bird_observation_data.csv";

#[derive(Debug, Clone, Parser)]
#[command(name = "rusty-heron", version, about = "Bird species observation dashboard")]
pub struct Cli {
    /// Observation table to load (.csv, .json or .parquet).
    #[arg(env = "RUSTY_HERON_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Length of the top-N rankings.
    #[arg(long, env = "RUSTY_HERON_TOP", default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Number of bins in the temperature / humidity histograms.
    #[arg(long, env = "RUSTY_HERON_BINS", default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,

    /// Print the report as JSON and exit instead of opening a window.
    #[arg(long)]
    pub json: bool,

    /// Restrict to a year (repeatable; default: all years).
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Restrict to a habitat (repeatable; default: all habitats).
    #[arg(long = "habitat", value_name = "HABITAT")]
    pub habitats: Vec<String>,

    /// Restrict to a season (repeatable; default: all seasons).
    #[arg(long = "season", value_name = "SEASON")]
    pub seasons: Vec<Season>,

    /// Restrict to an observer (repeatable; default: no restriction).
    #[arg(long = "observer", value_name = "NAME")]
    pub observers: Vec<String>,
}

impl Cli {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.top,
            histogram_bins: self.bins,
        }
    }

    /// Selection for headless runs.  Omitted flags select every value, so
    /// the command line cannot express the "nothing checked" state.
    pub fn selection(&self, dataset: &Dataset) -> FilterSelection {
        let mut selection = FilterSelection::all(dataset);
        if !self.years.is_empty() {
            selection.years = self.years.iter().copied().collect();
        }
        if !self.habitats.is_empty() {
            selection.habitats = self.habitats.iter().cloned().collect();
        }
        if !self.seasons.is_empty() {
            selection.seasons = self.seasons.iter().copied().collect();
        }
        selection.observers = self.observers.iter().cloned().collect();
        selection
    }
}
