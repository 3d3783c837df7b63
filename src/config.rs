//! Pipeline configuration.
//!
//! Every knob the aggregation needs lives in [`PipelineConfig`] so several
//! configurations can run side by side. Values come from built-in defaults,
//! optionally overridden by a TOML file and then by CLI flags.

use crate::error::{Error, Result};
use crate::inflation::{CpiTable, InflationAdjuster, NoInflation, OutOfRangePolicy, LATEST_CPI_YEAR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CUTOFF_YEAR: i32 = 2008;
pub const DEFAULT_GENRE_COUNT: usize = 3;
pub const DEFAULT_MIN_PER_YEAR: usize = 8;
pub const DEFAULT_TOP_N: usize = 8;

/// How the final set of movies is chosen from the cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Keep the `genre_count` most frequent primary genres, ranked by |deviation|.
    TopGenres {
        #[serde(default = "default_genre_count")]
        genre_count: usize,
    },
    /// Per release year, keep the `top_n` highest grossing movies of every
    /// year with at least `min_per_year` movies.
    YearBuckets {
        #[serde(default = "default_min_per_year")]
        min_per_year: usize,
        #[serde(default = "default_top_n")]
        top_n: usize,
    },
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::TopGenres {
            genre_count: DEFAULT_GENRE_COUNT,
        }
    }
}

impl SelectionStrategy {
    pub fn year_buckets() -> Self {
        SelectionStrategy::YearBuckets {
            min_per_year: DEFAULT_MIN_PER_YEAR,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::TopGenres { .. } => "top_genres",
            SelectionStrategy::YearBuckets { .. } => "year_buckets",
        }
    }
}

fn default_genre_count() -> usize {
    DEFAULT_GENRE_COUNT
}

fn default_min_per_year() -> usize {
    DEFAULT_MIN_PER_YEAR
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_true() -> bool {
    true
}

fn default_reference_year() -> i32 {
    LATEST_CPI_YEAR
}

fn default_cutoff_year() -> Option<i32> {
    Some(DEFAULT_CUTOFF_YEAR)
}

/// TOML has no null, so `cutoff_year = "none"` disables the cutoff.
fn de_cutoff_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Year(i32),
        Keyword(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Year(year) => Ok(Some(year)),
        Repr::Keyword(k) if k.eq_ignore_ascii_case("none") => Ok(None),
        Repr::Keyword(k) => Err(serde::de::Error::custom(format!(
            "cutoff_year must be a year or \"none\", got \"{}\"",
            k
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
    /// Replaces the embedded CPI table when present. TOML keys are strings,
    /// so years are parsed when the adjuster is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpi: Option<BTreeMap<String, f64>>,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_year: LATEST_CPI_YEAR,
            out_of_range: OutOfRangePolicy::default(),
            cpi: None,
        }
    }
}

impl InflationConfig {
    /// Build the adjuster this config describes.
    pub fn adjuster(&self) -> Result<Box<dyn InflationAdjuster>> {
        if !self.enabled {
            return Ok(Box::new(NoInflation));
        }
        let table = match &self.cpi {
            None => CpiTable::us_cpi(self.reference_year, self.out_of_range),
            Some(raw) => {
                let mut index = BTreeMap::new();
                for (year, cpi) in raw {
                    let year: i32 = year.trim().parse().map_err(|_| {
                        Error::InvalidConfig(format!("CPI table key '{}' is not a year", year))
                    })?;
                    index.insert(year, *cpi);
                }
                CpiTable::from_index(index, self.reference_year, self.out_of_range)
            }
        };
        Ok(Box::new(table))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// One colour per top genre, cycled when there are more genres.
    pub genres: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            genres: vec![
                "#e683b4".to_string(),
                "#53c3ac".to_string(),
                "#8475e8".to_string(),
            ],
        }
    }
}

impl PaletteConfig {
    pub fn color_for(&self, rank: usize) -> String {
        if self.genres.is_empty() {
            return String::new();
        }
        self.genres[rank % self.genres.len()].clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum release year kept in the cohort; `None` keeps every year.
    #[serde(default = "default_cutoff_year", deserialize_with = "de_cutoff_year")]
    pub cutoff_year: Option<i32>,
    /// Drop movies whose release date could not be parsed. Off by default:
    /// undated movies still carry a box office and a year.
    #[serde(default)]
    pub require_release_date: bool,
    #[serde(default)]
    pub strategy: SelectionStrategy,
    #[serde(default)]
    pub inflation: InflationConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cutoff_year: Some(DEFAULT_CUTOFF_YEAR),
            require_release_date: false,
            strategy: SelectionStrategy::default(),
            inflation: InflationConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// The year-bucketed variant: no cutoff, top 8 of every year with 8+ movies.
    pub fn year_buckets() -> Self {
        Self {
            cutoff_year: None,
            strategy: SelectionStrategy::year_buckets(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading pipeline config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if let SelectionStrategy::YearBuckets { top_n, .. } = self.strategy {
            if top_n == 0 {
                return Err(Error::InvalidConfig(
                    "year_buckets strategy needs top_n > 0".to_string(),
                ));
            }
        }
        if self.palette.genres.is_empty() {
            return Err(Error::InvalidConfig(
                "palette.genres must list at least one colour".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_chart() {
        let config = PipelineConfig::default();
        assert_eq!(config.cutoff_year, Some(2008));
        assert!(!config.require_release_date);
        assert_eq!(config.strategy, SelectionStrategy::TopGenres { genre_count: 3 });
        assert_eq!(config.inflation.reference_year, LATEST_CPI_YEAR);
        assert_eq!(config.palette.genres.len(), 3);
    }

    #[test]
    fn palette_cycles() {
        let palette = PaletteConfig::default();
        assert_eq!(palette.color_for(0), "#e683b4");
        assert_eq!(palette.color_for(3), "#e683b4");
        assert_eq!(palette.color_for(4), "#53c3ac");
    }

    #[test]
    fn bad_cpi_key_is_a_config_error() {
        let config = InflationConfig {
            cpi: Some(BTreeMap::from([("two thousand".to_string(), 100.0)])),
            ..InflationConfig::default()
        };
        assert!(matches!(config.adjuster(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn disabled_inflation_is_identity() {
        let config = InflationConfig {
            enabled: false,
            ..InflationConfig::default()
        };
        let adjuster = config.adjuster().unwrap();
        assert_eq!(adjuster.adjust(1950, 42.0).unwrap(), 42.0);
    }
}
