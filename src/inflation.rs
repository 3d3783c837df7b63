//! Inflation adjustment of nominal box office amounts.
//!
//! The pipeline talks to this module only through [`InflationAdjuster`]. The
//! default implementation, [`CpiTable`], scales an amount by the ratio of the
//! annual-average US consumer price index (CPI-U) of the reference year to
//! that of the release year.

use crate::error::InflationError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annual-average CPI-U, 1982-84 = 100.
const CPI_U_ANNUAL: [(i32, f64); 111] = [
    (1913, 9.9), (1914, 10.0), (1915, 10.1), (1916, 10.9), (1917, 12.8),
    (1918, 15.1), (1919, 17.3), (1920, 20.0), (1921, 17.9), (1922, 16.8),
    (1923, 17.1), (1924, 17.1), (1925, 17.5), (1926, 17.7), (1927, 17.4),
    (1928, 17.1), (1929, 17.1), (1930, 16.7), (1931, 15.2), (1932, 13.7),
    (1933, 13.0), (1934, 13.4), (1935, 13.7), (1936, 13.9), (1937, 14.4),
    (1938, 14.1), (1939, 13.9), (1940, 14.0), (1941, 14.7), (1942, 16.3),
    (1943, 17.3), (1944, 17.6), (1945, 18.0), (1946, 19.5), (1947, 22.3),
    (1948, 24.1), (1949, 23.8), (1950, 24.1), (1951, 26.0), (1952, 26.5),
    (1953, 26.7), (1954, 26.9), (1955, 26.8), (1956, 27.2), (1957, 28.1),
    (1958, 28.9), (1959, 29.1), (1960, 29.6), (1961, 29.9), (1962, 30.2),
    (1963, 30.6), (1964, 31.0), (1965, 31.5), (1966, 32.4), (1967, 33.4),
    (1968, 34.8), (1969, 36.7), (1970, 38.8), (1971, 40.5), (1972, 41.8),
    (1973, 44.4), (1974, 49.3), (1975, 53.8), (1976, 56.9), (1977, 60.6),
    (1978, 65.2), (1979, 72.6), (1980, 82.4), (1981, 90.9), (1982, 96.5),
    (1983, 99.6), (1984, 103.9), (1985, 107.6), (1986, 109.6), (1987, 113.6),
    (1988, 118.3), (1989, 124.0), (1990, 130.7), (1991, 136.2), (1992, 140.3),
    (1993, 144.5), (1994, 148.2), (1995, 152.4), (1996, 156.9), (1997, 160.5),
    (1998, 163.0), (1999, 166.6), (2000, 172.2), (2001, 177.1), (2002, 179.9),
    (2003, 184.0), (2004, 188.9), (2005, 195.3), (2006, 201.6), (2007, 207.342),
    (2008, 215.303), (2009, 214.537), (2010, 218.056), (2011, 224.939), (2012, 229.594),
    (2013, 232.957), (2014, 236.736), (2015, 237.017), (2016, 240.007), (2017, 245.120),
    (2018, 251.107), (2019, 255.657), (2020, 258.811), (2021, 270.970), (2022, 292.655),
    (2023, 304.702),
];

static DEFAULT_CPI: Lazy<BTreeMap<i32, f64>> = Lazy::new(|| CPI_U_ANNUAL.iter().copied().collect());

/// Last year covered by the embedded CPI table.
pub const LATEST_CPI_YEAR: i32 = 2023;

/// Converts an amount from its nominal year into the reference year.
pub trait InflationAdjuster {
    fn adjust(&self, year: i32, amount: f64) -> Result<f64, InflationError>;
}

/// What to do when a year falls outside the CPI table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Use the nearest year the table knows.
    #[default]
    Clamp,
    /// Leave the amount unadjusted.
    Identity,
    /// Fail with [`InflationError::UnknownYear`].
    Reject,
}

#[derive(Debug, Clone)]
pub struct CpiTable {
    index: BTreeMap<i32, f64>,
    reference_year: i32,
    policy: OutOfRangePolicy,
}

impl CpiTable {
    /// Embedded CPI-U table.
    pub fn us_cpi(reference_year: i32, policy: OutOfRangePolicy) -> Self {
        Self {
            index: DEFAULT_CPI.clone(),
            reference_year,
            policy,
        }
    }

    /// Custom table, e.g. loaded from the config file. Non-positive entries
    /// are dropped since they cannot be divided by.
    pub fn from_index(index: BTreeMap<i32, f64>, reference_year: i32, policy: OutOfRangePolicy) -> Self {
        let index = index
            .into_iter()
            .filter(|(_, cpi)| cpi.is_finite() && *cpi > 0.0)
            .collect();
        Self {
            index,
            reference_year,
            policy,
        }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    fn cpi_for(&self, year: i32) -> Option<f64> {
        if let Some(cpi) = self.index.get(&year) {
            return Some(*cpi);
        }
        match self.policy {
            OutOfRangePolicy::Clamp => {
                let below = self.index.range(..year).next_back();
                let above = self.index.range(year..).next();
                match (below, above) {
                    (Some((by, bc)), Some((ay, ac))) => {
                        // Gap inside the table: take the closer neighbour, earlier on ties.
                        if year - by <= ay - year { Some(*bc) } else { Some(*ac) }
                    }
                    (Some((_, c)), None) | (None, Some((_, c))) => Some(*c),
                    (None, None) => None,
                }
            }
            OutOfRangePolicy::Identity | OutOfRangePolicy::Reject => None,
        }
    }

    /// Multiplier that converts `year` money into reference-year money.
    pub fn multiplier(&self, year: i32) -> Result<f64, InflationError> {
        match (self.cpi_for(year), self.cpi_for(self.reference_year)) {
            (Some(from), Some(to)) => Ok(to / from),
            (None, _) if self.policy == OutOfRangePolicy::Identity => Ok(1.0),
            (_, None) if self.policy == OutOfRangePolicy::Identity => Ok(1.0),
            (None, _) => Err(InflationError::UnknownYear(year)),
            (_, None) => Err(InflationError::UnknownYear(self.reference_year)),
        }
    }
}

impl InflationAdjuster for CpiTable {
    fn adjust(&self, year: i32, amount: f64) -> Result<f64, InflationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InflationError::InvalidAmount(amount));
        }
        Ok(amount * self.multiplier(year)?)
    }
}

/// Identity adjuster for runs that want nominal amounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInflation;

impl InflationAdjuster for NoInflation {
    fn adjust(&self, _year: i32, amount: f64) -> Result<f64, InflationError> {
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_year_is_identity() {
        let table = CpiTable::us_cpi(2010, OutOfRangePolicy::Clamp);
        assert!(approx(table.adjust(2010, 100.0).unwrap(), 100.0));
    }

    #[test]
    fn older_money_is_worth_more() {
        let table = CpiTable::us_cpi(2023, OutOfRangePolicy::Clamp);
        let adjusted = table.adjust(2008, 1_000.0).unwrap();
        assert!(approx(adjusted, 1_000.0 * 304.702 / 215.303));
    }

    #[test]
    fn clamp_uses_nearest_known_year() {
        let table = CpiTable::us_cpi(2023, OutOfRangePolicy::Clamp);
        assert!(approx(table.adjust(2030, 50.0).unwrap(), 50.0));
        assert!(approx(
            table.multiplier(1900).unwrap(),
            table.multiplier(1913).unwrap()
        ));
    }

    #[test]
    fn identity_policy_leaves_unknown_years_alone() {
        let table = CpiTable::us_cpi(2023, OutOfRangePolicy::Identity);
        assert!(approx(table.adjust(1850, 10.0).unwrap(), 10.0));
    }

    #[test]
    fn reject_policy_reports_unknown_year() {
        let table = CpiTable::us_cpi(2023, OutOfRangePolicy::Reject);
        assert_eq!(table.adjust(1850, 10.0), Err(InflationError::UnknownYear(1850)));

        let table = CpiTable::us_cpi(2099, OutOfRangePolicy::Reject);
        assert_eq!(table.adjust(2010, 10.0), Err(InflationError::UnknownYear(2099)));
    }

    #[test]
    fn custom_table_drops_unusable_entries() {
        let index = BTreeMap::from([(2000, 100.0), (2001, 0.0), (2002, 110.0)]);
        let table = CpiTable::from_index(index, 2002, OutOfRangePolicy::Clamp);
        // 2001 was dropped; 2000 and 2002 are equally close, the earlier wins.
        assert!(approx(table.adjust(2001, 100.0).unwrap(), 110.0));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let table = CpiTable::us_cpi(2023, OutOfRangePolicy::Clamp);
        assert_eq!(table.adjust(2010, -1.0), Err(InflationError::InvalidAmount(-1.0)));
    }
}
