use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Column naming contract
// ---------------------------------------------------------------------------

/// Accepted header names per column. The first entry is the canonical name
/// written by the sample generator; the rest are aliases.
pub mod columns {
    pub const YEAR: &[&str] = &["Year", "year"];
    pub const MONTH: &[&str] = &["Month", "month"];
    pub const SEASON: &[&str] = &["Season", "season"];
    pub const HABITAT: &[&str] = &["Habitat", "habitat"];
    pub const SITE_NAME: &[&str] = &["Site_Name", "site_name"];
    pub const OBSERVER: &[&str] = &["Observer", "observer"];
    pub const COMMON_NAME: &[&str] = &["common_name", "Common_Name"];
    pub const SCIENTIFIC_NAME: &[&str] = &["scientific_name", "Scientific_Name"];
    pub const WATCHLIST_STATUS: &[&str] = &["watchlist_status", "Watchlist_Status"];
    pub const TEMPERATURE: &[&str] = &["Temperature", "temperature"];
    pub const HUMIDITY: &[&str] = &["Humidity", "humidity"];
    pub const SKY: &[&str] = &["Sky", "sky"];
    pub const WIND: &[&str] = &["Wind", "wind"];
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// Meteorological season of an observation. Ordering follows the calendar
/// starting at Winter, which is also the order the filter panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown season '{0}' (expected Winter, Spring, Summer or Fall)")]
pub struct ParseSeasonError(pub String);

impl FromStr for Season {
    type Err = ParseSeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            _ => Err(ParseSeasonError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Season {
    type Error = ParseSeasonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the dataset
// ---------------------------------------------------------------------------

/// A single bird observation (one row of the cleaned table).
///
/// A cell that is empty or cannot be read as its field type becomes `None`
/// (or an empty string for text); the row itself is always kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "Year", alias = "year", deserialize_with = "deserialize_opt_whole")]
    pub year: Option<i32>,
    /// Calendar month. Values outside 1–12 are kept as-is.
    #[serde(rename = "Month", alias = "month", deserialize_with = "deserialize_opt_whole")]
    pub month: Option<u32>,
    #[serde(rename = "Season", alias = "season", deserialize_with = "deserialize_opt_season")]
    pub season: Option<Season>,
    #[serde(rename = "Habitat", alias = "habitat", deserialize_with = "deserialize_text")]
    pub habitat: String,
    #[serde(rename = "Site_Name", alias = "site_name", deserialize_with = "deserialize_text")]
    pub site_name: String,
    #[serde(rename = "Observer", alias = "observer", deserialize_with = "deserialize_text")]
    pub observer: String,
    #[serde(alias = "Common_Name", deserialize_with = "deserialize_text")]
    pub common_name: String,
    #[serde(alias = "Scientific_Name", deserialize_with = "deserialize_text")]
    pub scientific_name: String,
    #[serde(alias = "Watchlist_Status", deserialize_with = "deserialize_flag")]
    pub watchlist_status: bool,
    #[serde(rename = "Temperature", alias = "temperature", default, deserialize_with = "deserialize_opt_number")]
    pub temperature: Option<f64>,
    #[serde(rename = "Humidity", alias = "humidity", default, deserialize_with = "deserialize_opt_number")]
    pub humidity: Option<f64>,
    #[serde(rename = "Sky", alias = "sky", default, deserialize_with = "deserialize_opt_text")]
    pub sky: Option<String>,
    #[serde(rename = "Wind", alias = "wind", default, deserialize_with = "deserialize_opt_text")]
    pub wind: Option<String>,
}

/// Parse the loose boolean spellings found in exported tables.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

/// Empty or whitespace-only text counts as missing.
pub fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Whole numbers only; `2020.0` reads as 2020, `4.5` or out-of-range as `None`.
pub fn whole<T: TryFrom<i64>>(v: f64) -> Option<T> {
    if !v.is_finite() || v.fract() != 0.0 || v.abs() > i64::MAX as f64 {
        return None;
    }
    T::try_from(v as i64).ok()
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl serde::de::Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean, 0/1, or a true/false/yes/no string")
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<bool, E> {
            Ok(v != 0.0)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<bool, E> {
            parse_flag(v).ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// A numeric cell: JSON numbers, or CSV text that parses as a number.
/// Anything else reads as `None`.
fn deserialize_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl<'de> serde::de::Visitor<'de> for NumberVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, numeric text, or an empty cell")
        }

        fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse().ok())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

fn deserialize_opt_whole<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(deserialize_opt_number(deserializer)?.and_then(whole))
}

fn deserialize_opt_season<'de, D>(deserializer: D) -> Result<Option<Season>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_text(deserializer)?.and_then(|s| s.parse().ok()))
}

fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| non_blank(&s)))
}

/// Null text reads as an empty string, like an empty CSV cell.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter options.
///
/// Never mutated after construction; sessions share it read-only.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All observations (rows), in file order.
    pub observations: Vec<Observation>,
    /// Distinct years, ascending. Rows without a year contribute nothing.
    pub years: Vec<i32>,
    /// Distinct non-empty habitats in order of first appearance.
    pub habitats: Vec<String>,
    /// Distinct non-empty observers in order of first appearance.
    pub observers: Vec<String>,
}

impl Dataset {
    /// Build the filter option lists from the loaded observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let years: BTreeSet<i32> = observations.iter().filter_map(|o| o.year).collect();
        let habitats = distinct_in_order(observations.iter().map(|o| o.habitat.as_str()));
        let observers = distinct_in_order(observations.iter().map(|o| o.observer.as_str()));

        Dataset {
            observations,
            years: years.into_iter().collect(),
            habitats,
            observers,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an observation with sensible defaults for the fields a test
    /// does not care about.
    pub(crate) fn obs(year: i32, habitat: &str, season: Season, observer: &str) -> Observation {
        Observation {
            year: Some(year),
            month: Some(1),
            season: Some(season),
            habitat: habitat.to_string(),
            site_name: "S1".to_string(),
            observer: observer.to_string(),
            common_name: "Robin".to_string(),
            scientific_name: "Turdus migratorius".to_string(),
            watchlist_status: false,
            temperature: None,
            humidity: None,
            sky: None,
            wind: None,
        }
    }

    #[test]
    fn season_parses_case_insensitively() {
        assert_eq!("winter".parse::<Season>(), Ok(Season::Winter));
        assert_eq!(" SUMMER ".parse::<Season>(), Ok(Season::Summer));
        assert_eq!("Autumn".parse::<Season>(), Ok(Season::Fall));
        assert!("Monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn season_order_starts_at_winter() {
        let mut seasons = vec![Season::Fall, Season::Spring, Season::Winter, Season::Summer];
        seasons.sort();
        assert_eq!(seasons, Season::ALL.to_vec());
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn dataset_options_are_sorted_and_deduplicated() {
        let ds = Dataset::from_observations(vec![
            obs(2021, "Wetland", Season::Fall, "B"),
            obs(2020, "Forest", Season::Spring, "A"),
            obs(2021, "Wetland", Season::Fall, "B"),
            obs(2019, "", Season::Winter, "C"),
            obs(2019, " ", Season::Winter, "C"),
        ]);
        assert_eq!(ds.years, vec![2019, 2020, 2021]);
        assert_eq!(ds.habitats, vec!["Wetland", "Forest", " "]);
        assert_eq!(ds.observers, vec!["B", "A", "C"]);
        assert_eq!(ds.len(), 5);
        assert!(!ds.is_empty());
    }

    #[test]
    fn rows_without_a_year_add_no_year_option() {
        let mut undated = obs(2020, "Forest", Season::Spring, "A");
        undated.year = None;
        let ds = Dataset::from_observations(vec![undated, obs(2021, "Forest", Season::Fall, "B")]);
        assert_eq!(ds.years, vec![2021]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn whole_numbers_only() {
        assert_eq!(whole::<i32>(2020.0), Some(2020));
        assert_eq!(whole::<i32>(4.5), None);
        assert_eq!(whole::<u32>(-1.0), None);
        assert_eq!(whole::<i32>(f64::NAN), None);
        assert_eq!(whole::<i32>(1e12), None);
    }

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" Clear "), Some("Clear".to_string()));
    }
}
