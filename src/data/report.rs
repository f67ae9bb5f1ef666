use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::filter::FilteredView;
use super::model::{Observation, Season};

/// Length of every top-N ranking unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;
/// Bins per numeric histogram unless configured otherwise.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Tunables for [`Report::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count<K> {
    pub key: K,
    pub count: usize,
}

/// One slice of a proportional (pie) breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    /// `count / total`, in `0.0..=1.0`.
    pub proportion: f64,
}

/// One half-open bin `[lower, upper)`; the last bin of a histogram also
/// includes its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the min–max of the binned values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bin the finite values into `n_bins` equal-width bins.
    ///
    /// No finite values (or `n_bins == 0`) gives an empty histogram.  When
    /// every value is equal the range is widened to `[v - 0.5, v + 0.5]`.
    pub fn from_values(values: impl IntoIterator<Item = f64>, n_bins: usize) -> Self {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() || n_bins == 0 {
            return Self::default();
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (max - min).abs() < f64::EPSILON {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / n_bins as f64;

        let mut bins: Vec<Bin> = (0..n_bins)
            .map(|i| Bin {
                lower: min + width * i as f64,
                upper: if i + 1 == n_bins { max } else { min + width * (i + 1) as f64 },
                count: 0,
            })
            .collect();

        for v in values {
            let idx = (((v - min) / width) as usize).min(n_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of values binned.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn bin_width(&self) -> f64 {
        self.bins.first().map_or(0.0, |b| b.upper - b.lower)
    }
}

/// Every summary the dashboard shows, computed from one filtered view.
///
/// Field names are the stable contract for rendering layers and the JSON
/// output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_observations: usize,
    pub unique_species: usize,
    pub watchlist_species: usize,
    pub unique_sites: usize,
    pub top_species: Vec<Count<String>>,
    pub habitat_distribution: Vec<Share>,
    pub by_year: Vec<Count<i32>>,
    pub by_month: Vec<Count<u32>>,
    pub by_season: Vec<Count<Season>>,
    pub temperature: Histogram,
    pub humidity: Histogram,
    pub sky: Vec<Count<String>>,
    pub wind: Vec<Count<String>>,
    pub top_observers: Vec<Count<String>>,
    pub observer_diversity: Vec<Count<String>>,
}

impl Report {
    pub fn compute(view: &FilteredView<'_>, options: &ReportOptions) -> Self {
        let top_n = options.top_n;
        let bins = options.histogram_bins;

        Self {
            total_observations: view.len(),
            unique_species: distinct(view.iter().map(|o| o.scientific_name.as_str())),
            watchlist_species: distinct(
                view.iter()
                    .filter(|o| o.watchlist_status)
                    .map(|o| o.scientific_name.as_str()),
            ),
            unique_sites: distinct(view.iter().map(|o| o.site_name.as_str())),
            top_species: top(view.iter().map(|o| o.common_name.clone()), top_n),
            habitat_distribution: shares(view.iter().map(|o| o.habitat.as_str())),
            by_year: grouped_sorted(view.iter().filter_map(|o| o.year)),
            by_month: grouped_sorted(view.iter().filter_map(|o| o.month)),
            by_season: encounter_counts(view.iter().filter_map(|o| o.season)),
            temperature: Histogram::from_values(view.iter().filter_map(|o| o.temperature), bins),
            humidity: Histogram::from_values(view.iter().filter_map(|o| o.humidity), bins),
            sky: value_counts(view.iter().filter_map(|o| o.sky.clone())),
            wind: value_counts(view.iter().filter_map(|o| o.wind.clone())),
            top_observers: top(view.iter().map(|o| o.observer.clone()), top_n),
            observer_diversity: observer_diversity(view.iter(), top_n),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation helpers
// ---------------------------------------------------------------------------

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.collect::<HashSet<_>>().len()
}

/// Counts in order of first appearance.
fn encounter_counts<K: Eq + Hash + Clone>(values: impl Iterator<Item = K>) -> Vec<Count<K>> {
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<Count<K>> = Vec::new();
    for key in values {
        match position.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                position.insert(key.clone(), counts.len());
                counts.push(Count { key, count: 1 });
            }
        }
    }
    counts
}

/// Counts sorted by descending frequency; equal counts keep encounter order.
fn value_counts<K: Eq + Hash + Clone>(values: impl Iterator<Item = K>) -> Vec<Count<K>> {
    let mut counts = encounter_counts(values);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn top<K: Eq + Hash + Clone>(values: impl Iterator<Item = K>, n: usize) -> Vec<Count<K>> {
    let mut counts = value_counts(values);
    counts.truncate(n);
    counts
}

/// Counts keyed and sorted ascending by value; absent keys are omitted.
fn grouped_sorted<K: Ord>(values: impl Iterator<Item = K>) -> Vec<Count<K>> {
    let mut groups: BTreeMap<K, usize> = BTreeMap::new();
    for key in values {
        *groups.entry(key).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect()
}

fn shares<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Share> {
    let counts = encounter_counts(values);
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .into_iter()
        .map(|c| Share {
            label: c.key.to_string(),
            count: c.count,
            proportion: c.count as f64 / total as f64,
        })
        .collect()
}

/// Observers ranked by number of distinct species seen.  Equal counts are
/// ordered by observer name.
fn observer_diversity<'a>(rows: impl Iterator<Item = &'a Observation>, n: usize) -> Vec<Count<String>> {
    let mut species: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for obs in rows {
        species
            .entry(obs.observer.as_str())
            .or_default()
            .insert(obs.scientific_name.as_str());
    }

    // BTreeMap iteration is name-ascending; the stable sort keeps that for ties.
    let mut ranked: Vec<Count<String>> = species
        .into_iter()
        .map(|(observer, seen)| Count {
            key: observer.to_string(),
            count: seen.len(),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
