//! # Price Indices & Escalation Formula
//!
//! Monthly price-index tables and the weighted polynomial formula that
//! turns index movement between two months into a scalar escalation
//! factor.
//!
//! Tables are plain values handed in with each request - never global
//! state - so several tariff/index versions can coexist and a calculation
//! stays internally consistent while an administrator edits the live
//! tables.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::indices::{IndexSeriesSet, PolynomialFormula, PriceIndexTable, YearMonth};
//!
//! let mut series = IndexSeriesSet::new();
//! series.insert(
//!     "cement".to_string(),
//!     PriceIndexTable::new()
//!         .with_entry(YearMonth::new(2024, 1), 100.0)
//!         .with_entry(YearMonth::new(2024, 6), 108.0),
//! );
//!
//! let formula = PolynomialFormula::single("cement");
//! let factor = formula
//!     .factor(&series, YearMonth::new(2024, 1), YearMonth::new(2024, 6))
//!     .unwrap();
//! assert!((factor - 1.08).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{QuoteError, QuoteResult};

/// Tolerance on the polynomial weight-sum invariant
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A calendar month, the key of every index table.
///
/// Ordered chronologically (year, then month). Serializes as `"YYYY-MM"`
/// so tables stay clean JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    /// Whether the month field is a real calendar month
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year = year.parse().map_err(|_| format!("bad year in '{s}'"))?;
        let month = month.parse().map_err(|_| format!("bad month in '{s}'"))?;
        Ok(YearMonth { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One monthly index series, e.g. the official cement or labor index.
///
/// The BTreeMap keeps entries chronologically ordered by construction,
/// which also keeps serialized output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceIndexTable {
    pub entries: BTreeMap<YearMonth, f64>,
}

impl PriceIndexTable {
    pub fn new() -> Self {
        PriceIndexTable::default()
    }

    /// Add an entry (builder pattern)
    pub fn with_entry(mut self, month: YearMonth, value: f64) -> Self {
        self.entries.insert(month, value);
        self
    }

    /// Index value for a month, if tabulated
    pub fn value_at(&self, month: YearMonth) -> Option<f64> {
        self.entries.get(&month).copied()
    }

    /// Escalation ratio index(target) / index(base).
    ///
    /// There is no silent default: a month absent from the table is a
    /// [`QuoteError::MissingPriceIndex`].
    pub fn escalation_ratio(
        &self,
        series: &str,
        base: YearMonth,
        target: YearMonth,
    ) -> QuoteResult<f64> {
        let base_value = self
            .value_at(base)
            .ok_or_else(|| QuoteError::missing_price_index(series, base.year, base.month))?;
        let target_value = self
            .value_at(target)
            .ok_or_else(|| QuoteError::missing_price_index(series, target.year, target.month))?;
        Ok(target_value / base_value)
    }

    /// Validate the table: real calendar months, strictly positive values.
    pub fn validate(&self, series: &str) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        for (month, value) in &self.entries {
            if !month.is_valid() {
                violations.push(QuoteError::configuration(
                    format!("price_indices.{series}"),
                    format!("'{month}' is not a calendar month"),
                ));
            }
            if *value <= 0.0 {
                violations.push(QuoteError::configuration(
                    format!("price_indices.{series}"),
                    format!("index value {value} at {month} must be positive"),
                ));
            }
        }
        violations
    }
}

/// Named set of index series a formula can draw from
pub type IndexSeriesSet = BTreeMap<String, PriceIndexTable>;

/// One weighted term of the escalation polynomial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialTerm {
    /// Key into the request's index series set
    pub series: String,
    /// Weight of this series; all weights sum to 1
    pub weight: f64,
}

/// Weighted multi-series escalation formula.
///
/// factor = sum over terms of weight x (index(target) / index(base)).
/// With positive index values and non-negative weights the factor is
/// always >= 0.
///
/// ## JSON Example
///
/// ```json
/// {
///   "terms": [
///     { "series": "cement", "weight": 0.4 },
///     { "series": "steel", "weight": 0.35 },
///     { "series": "labor", "weight": 0.25 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFormula {
    pub terms: Vec<PolynomialTerm>,
}

impl PolynomialFormula {
    /// Degenerate single-series formula with weight 1.0
    pub fn single(series: impl Into<String>) -> Self {
        PolynomialFormula {
            terms: vec![PolynomialTerm {
                series: series.into(),
                weight: 1.0,
            }],
        }
    }

    /// Add a term (builder pattern)
    pub fn with_term(mut self, series: impl Into<String>, weight: f64) -> Self {
        self.terms.push(PolynomialTerm {
            series: series.into(),
            weight,
        });
        self
    }

    /// Validate the formula: non-empty, non-negative weights summing to 1.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        if self.terms.is_empty() {
            violations.push(QuoteError::configuration(
                "polynomial.terms",
                "Formula must have at least one term",
            ));
            return violations;
        }
        for term in &self.terms {
            if term.weight < 0.0 {
                violations.push(QuoteError::configuration(
                    format!("polynomial.{}", term.series),
                    format!("weight {} must not be negative", term.weight),
                ));
            }
        }
        let sum: f64 = self.terms.iter().map(|t| t.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            violations.push(QuoteError::configuration(
                "polynomial.terms",
                format!("weights sum to {sum}, expected 1.0"),
            ));
        }
        violations
    }

    /// Evaluate the escalation factor between two months against a set of
    /// index series.
    ///
    /// A term naming an unknown series is a configuration error; a known
    /// series missing either month is a [`QuoteError::MissingPriceIndex`].
    pub fn factor(
        &self,
        series_set: &IndexSeriesSet,
        base: YearMonth,
        target: YearMonth,
    ) -> QuoteResult<f64> {
        let mut factor = 0.0;
        for term in &self.terms {
            let table = series_set.get(&term.series).ok_or_else(|| {
                QuoteError::configuration(
                    format!("polynomial.{}", term.series),
                    "Formula references a series the request does not carry",
                )
            })?;
            factor += term.weight * table.escalation_ratio(&term.series, base, target)?;
        }
        Ok(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_set() -> IndexSeriesSet {
        let mut set = IndexSeriesSet::new();
        set.insert(
            "cement".to_string(),
            PriceIndexTable::new()
                .with_entry(YearMonth::new(2024, 1), 100.0)
                .with_entry(YearMonth::new(2024, 6), 110.0),
        );
        set.insert(
            "steel".to_string(),
            PriceIndexTable::new()
                .with_entry(YearMonth::new(2024, 1), 200.0)
                .with_entry(YearMonth::new(2024, 6), 190.0),
        );
        set
    }

    #[test]
    fn test_year_month_ordering() {
        assert!(YearMonth::new(2023, 12) < YearMonth::new(2024, 1));
        assert!(YearMonth::new(2024, 1) < YearMonth::new(2024, 2));
    }

    #[test]
    fn test_year_month_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(YearMonth::from(date), YearMonth::new(2024, 7));
    }

    #[test]
    fn test_year_month_serde_as_string() {
        let json = serde_json::to_string(&YearMonth::new(2024, 3)).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: YearMonth = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(back, YearMonth::new(2024, 3));
    }

    #[test]
    fn test_escalation_ratio() {
        let set = series_set();
        let ratio = set["cement"]
            .escalation_ratio("cement", YearMonth::new(2024, 1), YearMonth::new(2024, 6))
            .unwrap();
        assert!((ratio - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_month_is_an_error() {
        let set = series_set();
        let err = set["cement"]
            .escalation_ratio("cement", YearMonth::new(2024, 1), YearMonth::new(2024, 9))
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PRICE_INDEX");
    }

    #[test]
    fn test_table_validation_rejects_nonpositive_values() {
        let table = PriceIndexTable::new().with_entry(YearMonth::new(2024, 2), 0.0);
        assert_eq!(table.validate("cement").len(), 1);
    }

    #[test]
    fn test_weighted_factor() {
        let set = series_set();
        let formula = PolynomialFormula {
            terms: vec![
                PolynomialTerm { series: "cement".to_string(), weight: 0.6 },
                PolynomialTerm { series: "steel".to_string(), weight: 0.4 },
            ],
        };
        assert!(formula.validate().is_empty());
        let factor = formula
            .factor(&set, YearMonth::new(2024, 1), YearMonth::new(2024, 6))
            .unwrap();
        // 0.6 * 1.10 + 0.4 * 0.95 = 1.04
        assert!((factor - 1.04).abs() < 1e-9);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let formula = PolynomialFormula::single("cement").with_term("steel", 0.2);
        let violations = formula.validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_unknown_series_is_configuration_error() {
        let set = series_set();
        let formula = PolynomialFormula::single("timber");
        let err = formula
            .factor(&set, YearMonth::new(2024, 1), YearMonth::new(2024, 6))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_single_formula_matches_raw_ratio() {
        let set = series_set();
        let formula = PolynomialFormula::single("cement");
        let factor = formula
            .factor(&set, YearMonth::new(2024, 1), YearMonth::new(2024, 6))
            .unwrap();
        assert!((factor - 1.1).abs() < 1e-9);
    }
}
