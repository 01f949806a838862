//! # Distance Billing & Transport Tariffs
//!
//! Carriers bill route distance rounded up to 50 km steps, then price a
//! trip from a (length category, distance bracket) tariff table. Both
//! rules live here; the freight optimizer and the aggregator share them.
//!
//! A built-in [`standard_rate_table`] is provided as reference data for
//! demos and tests. It is never consulted implicitly: callers pass the
//! table they want on every request, so several tariff versions can
//! coexist.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::pieces::LengthCategory;
//! use quote_core::transport::{billed_distance_km, standard_rate_table};
//!
//! assert_eq!(billed_distance_km(37.0), 50.0);
//! assert_eq!(billed_distance_km(0.0), 0.0);
//!
//! let rate = standard_rate_table()
//!     .rate_for(LengthCategory::Standard, 50.0)
//!     .unwrap();
//! assert!(rate > 0.0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};
use crate::pieces::LengthCategory;

/// Billing granularity of route distance (km)
pub const DISTANCE_BILLING_STEP_KM: f64 = 50.0;

/// Largest distance the standard reference schedule tabulates (km)
pub const STANDARD_MAX_BRACKET_KM: f64 = 500.0;

/// Convert a real route distance into the billed distance.
///
/// `billed = ceil(real / 50) * 50`, with the explicit no-charge case
/// `0 -> 0`. The result is never less than the input, and is a multiple
/// of 50 whenever the input is positive. Negative distances are rejected
/// upstream by parameter validation; callers only pass `d >= 0`.
pub fn billed_distance_km(real_distance_km: f64) -> f64 {
    if real_distance_km <= 0.0 {
        return 0.0;
    }
    (real_distance_km / DISTANCE_BILLING_STEP_KM).ceil() * DISTANCE_BILLING_STEP_KM
}

/// One tariff bracket: price per trip for loads of a length category up
/// to a billed distance.
///
/// ## JSON Example
///
/// ```json
/// { "length_category": "Long", "max_distance_km": 150.0, "price_per_trip": 910.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub length_category: LengthCategory,
    /// Upper bound of the distance bracket (km, billed)
    pub max_distance_km: f64,
    pub price_per_trip: f64,
}

/// Versioned, immutable-per-call transport rate schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportRateTable {
    pub entries: Vec<TariffEntry>,
}

impl TransportRateTable {
    pub fn new() -> Self {
        TransportRateTable::default()
    }

    /// Add an entry (builder pattern)
    pub fn with_entry(
        mut self,
        length_category: LengthCategory,
        max_distance_km: f64,
        price_per_trip: f64,
    ) -> Self {
        self.entries.push(TariffEntry {
            length_category,
            max_distance_km,
            price_per_trip,
        });
        self
    }

    /// Price per trip for a category at a billed distance.
    ///
    /// When no bracket matches exactly, the next-higher bracket applies.
    /// A distance beyond every tabulated bracket has no lawful
    /// extrapolation and fails with [`QuoteError::MissingTariff`].
    pub fn rate_for(&self, category: LengthCategory, billed_distance_km: f64) -> QuoteResult<f64> {
        self.entries
            .iter()
            .filter(|e| e.length_category == category && e.max_distance_km >= billed_distance_km)
            .min_by(|a, b| {
                a.max_distance_km
                    .partial_cmp(&b.max_distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.price_per_trip)
            .ok_or_else(|| QuoteError::missing_tariff(category.label(), billed_distance_km))
    }

    /// Validate the schedule, collecting every violation.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.max_distance_km <= 0.0 {
                violations.push(QuoteError::configuration(
                    format!("transport_rate_table[{i}].max_distance_km"),
                    format!("bracket {} must be positive", entry.max_distance_km),
                ));
            }
            if entry.price_per_trip <= 0.0 {
                violations.push(QuoteError::configuration(
                    format!("transport_rate_table[{i}].price_per_trip"),
                    format!("price {} must be positive", entry.price_per_trip),
                ));
            }
        }
        violations
    }
}

/// Reference schedule: 50 km brackets to 500 km, per-category pricing
/// with escort surcharges baked into the Long/ExtraLong rows.
static STANDARD_RATE_TABLE: Lazy<TransportRateTable> = Lazy::new(|| {
    // (base price per trip, price per billed km)
    let curves = [
        (LengthCategory::Standard, 250.0, 2.6),
        (LengthCategory::Long, 400.0, 3.4),
        (LengthCategory::ExtraLong, 650.0, 4.5),
    ];
    let mut table = TransportRateTable::new();
    for (category, base, per_km) in curves {
        let mut bracket = DISTANCE_BILLING_STEP_KM;
        while bracket <= STANDARD_MAX_BRACKET_KM {
            table = table.with_entry(category, bracket, base + per_km * bracket);
            bracket += DISTANCE_BILLING_STEP_KM;
        }
    }
    table
});

/// The built-in reference rate schedule.
///
/// Immutable; hand a clone (or a caller-owned table) into each request.
pub fn standard_rate_table() -> &'static TransportRateTable {
    &STANDARD_RATE_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_rounding_examples() {
        assert_eq!(billed_distance_km(37.0), 50.0);
        assert_eq!(billed_distance_km(0.0), 0.0);
        assert_eq!(billed_distance_km(101.0), 150.0);
        assert_eq!(billed_distance_km(50.0), 50.0);
        assert_eq!(billed_distance_km(50.1), 100.0);
    }

    #[test]
    fn test_billed_never_below_real() {
        for d in [0.0, 1.0, 49.9, 50.0, 75.0, 123.4, 499.0] {
            let billed = billed_distance_km(d);
            assert!(billed >= d);
            if d > 0.0 {
                let steps = billed / DISTANCE_BILLING_STEP_KM;
                assert!((steps - steps.round()).abs() < 1e-9, "{billed} not a 50 multiple");
            }
        }
    }

    #[test]
    fn test_next_higher_bracket() {
        let table = TransportRateTable::new()
            .with_entry(LengthCategory::Standard, 100.0, 500.0)
            .with_entry(LengthCategory::Standard, 200.0, 800.0);
        // 150 km has no exact bracket; the 200 km row applies
        assert_eq!(table.rate_for(LengthCategory::Standard, 150.0).unwrap(), 800.0);
        assert_eq!(table.rate_for(LengthCategory::Standard, 100.0).unwrap(), 500.0);
    }

    #[test]
    fn test_beyond_largest_bracket_fails() {
        let table = TransportRateTable::new().with_entry(LengthCategory::Standard, 200.0, 800.0);
        let err = table.rate_for(LengthCategory::Standard, 250.0).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_TARIFF");
    }

    #[test]
    fn test_missing_category_fails() {
        let table = TransportRateTable::new().with_entry(LengthCategory::Standard, 200.0, 800.0);
        let err = table.rate_for(LengthCategory::Long, 100.0).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_TARIFF");
    }

    #[test]
    fn test_standard_table_covers_all_categories() {
        let table = standard_rate_table();
        for category in [
            LengthCategory::Standard,
            LengthCategory::Long,
            LengthCategory::ExtraLong,
        ] {
            let near = table.rate_for(category, 50.0).unwrap();
            let far = table.rate_for(category, STANDARD_MAX_BRACKET_KM).unwrap();
            assert!(far > near);
        }
        // Escorted categories cost more at equal distance
        let std = table.rate_for(LengthCategory::Standard, 100.0).unwrap();
        let long = table.rate_for(LengthCategory::Long, 100.0).unwrap();
        assert!(long > std);
    }

    #[test]
    fn test_table_validation() {
        let table = TransportRateTable::new().with_entry(LengthCategory::Standard, -10.0, 0.0);
        assert_eq!(table.validate().len(), 2);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let table = standard_rate_table().clone();
        let json = serde_json::to_string(&table).unwrap();
        let roundtrip: TransportRateTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, roundtrip);
    }
}
