use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Dataset, Observation, Season};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per filter column
// ---------------------------------------------------------------------------

/// The user's current filter choices.
///
/// An empty `years`, `habitats` or `seasons` set matches nothing (unchecking
/// every option empties the view).  An empty `observers` set means "no
/// observer restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub habitats: BTreeSet<String>,
    pub seasons: BTreeSet<Season>,
    pub observers: BTreeSet<String>,
}

impl FilterSelection {
    /// Every year, habitat and season selected, no observer restriction.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            years: dataset.years.iter().copied().collect(),
            habitats: dataset.habitats.iter().cloned().collect(),
            seasons: Season::ALL.into_iter().collect(),
            observers: BTreeSet::new(),
        }
    }

    /// Whether a single observation passes every active predicate.  A row
    /// without a year or season never matches.
    pub fn matches(&self, obs: &Observation) -> bool {
        obs.year.is_some_and(|y| self.years.contains(&y))
            && self.habitats.contains(&obs.habitat)
            && obs.season.is_some_and(|s| self.seasons.contains(&s))
            && (self.observers.is_empty() || self.observers.contains(&obs.observer))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The rows of a [`Dataset`] that pass a [`FilterSelection`], in dataset order.
///
/// Borrowed from the dataset; recomputed from scratch on every selection
/// change rather than edited in place.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.observations[i])
    }
}

/// Return the view of observations that pass all active filters.
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| selection.matches(obs))
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}
