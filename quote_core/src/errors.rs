//! # Error Types
//!
//! Structured error types for quote_core. Each variant carries enough
//! context for the caller to surface the problem directly on the offending
//! quotation line or configuration table, without re-parsing message text.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{QuoteError, QuoteResult};
//!
//! fn validate_quantity(line: usize, quantity: u32) -> QuoteResult<()> {
//!     if quantity == 0 {
//!         return Err(QuoteError::invalid_line_item(
//!             line,
//!             "quantity",
//!             quantity.to_string(),
//!             "Quantity must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Structured error type for quotation calculations.
///
/// Validation runs eagerly over the whole request and collects every
/// violation into a single [`QuoteError::Validation`] before any pricing
/// or packing math executes. Errors discovered mid-computation (an
/// oversized piece found during packing, a missing tariff bracket) abort
/// the entire calculation; a partial quotation is never returned.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuoteError {
    /// A quotation line has a malformed or out-of-range field
    #[error("Invalid line item {line}, field '{field}': {value} - {reason}")]
    InvalidLineItem {
        line: usize,
        field: String,
        value: String,
        reason: String,
    },

    /// The price index table has no entry for the requested month
    #[error("Missing price index: series '{series}' has no entry for {year}-{month:02}")]
    MissingPriceIndex {
        series: String,
        year: i32,
        month: u32,
    },

    /// A single piece is heavier than the truck's rated capacity
    #[error("Oversized piece '{description}': {weight_tn} tn exceeds truck capacity {capacity_tn} tn")]
    OversizedPiece {
        description: String,
        weight_tn: f64,
        capacity_tn: f64,
    },

    /// No tariff bracket covers the billed distance for this length category
    #[error("Missing tariff: no {length_category} bracket at or above {billed_distance_km} km")]
    MissingTariff {
        length_category: String,
        billed_distance_km: f64,
    },

    /// A configuration table is internally inconsistent
    /// (polynomial weights not summing to 1, discount out of bounds, etc.)
    #[error("Configuration error in '{parameter}': {reason}")]
    Configuration { parameter: String, reason: String },

    /// Aggregate of every structural violation found during eager validation
    #[error("Validation failed with {} violation(s)", violations.len())]
    Validation { violations: Vec<QuoteError> },
}

impl QuoteError {
    /// Create an InvalidLineItem error
    pub fn invalid_line_item(
        line: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuoteError::InvalidLineItem {
            line,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingPriceIndex error
    pub fn missing_price_index(series: impl Into<String>, year: i32, month: u32) -> Self {
        QuoteError::MissingPriceIndex {
            series: series.into(),
            year,
            month,
        }
    }

    /// Create an OversizedPiece error
    pub fn oversized_piece(
        description: impl Into<String>,
        weight_tn: f64,
        capacity_tn: f64,
    ) -> Self {
        QuoteError::OversizedPiece {
            description: description.into(),
            weight_tn,
            capacity_tn,
        }
    }

    /// Create a MissingTariff error
    pub fn missing_tariff(length_category: impl Into<String>, billed_distance_km: f64) -> Self {
        QuoteError::MissingTariff {
            length_category: length_category.into(),
            billed_distance_km,
        }
    }

    /// Create a Configuration error
    pub fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a non-empty list of violations, or return Ok(()) when empty.
    ///
    /// This is the tail of every eager validation pass: collect everything,
    /// then fail once with the full list.
    pub fn from_violations(violations: Vec<QuoteError>) -> QuoteResult<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(QuoteError::Validation { violations })
        }
    }

    /// Check if this error was produced by eager input validation
    /// (as opposed to a failure discovered mid-computation)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuoteError::Validation { .. } | QuoteError::InvalidLineItem { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::InvalidLineItem { .. } => "INVALID_LINE_ITEM",
            QuoteError::MissingPriceIndex { .. } => "MISSING_PRICE_INDEX",
            QuoteError::OversizedPiece { .. } => "OVERSIZED_PIECE",
            QuoteError::MissingTariff { .. } => "MISSING_TARIFF",
            QuoteError::Configuration { .. } => "CONFIGURATION_ERROR",
            QuoteError::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = QuoteError::invalid_line_item(3, "unit_price", "-12.5", "Price must be positive");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: QuoteError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QuoteError::missing_price_index("general", 2024, 7).error_code(),
            "MISSING_PRICE_INDEX"
        );
        assert_eq!(
            QuoteError::oversized_piece("Girder V-80", 30.0, 26.0).error_code(),
            "OVERSIZED_PIECE"
        );
    }

    #[test]
    fn test_from_violations_empty_is_ok() {
        assert!(QuoteError::from_violations(Vec::new()).is_ok());
    }

    #[test]
    fn test_from_violations_collects_all() {
        let violations = vec![
            QuoteError::invalid_line_item(0, "quantity", "0", "Quantity must be positive"),
            QuoteError::invalid_line_item(2, "unit_price", "0", "Price must be positive"),
        ];
        let err = QuoteError::from_violations(violations).unwrap_err();
        match &err {
            QuoteError::Validation { violations } => assert_eq!(violations.len(), 2),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(err.is_validation());
    }

    #[test]
    fn test_display_messages() {
        let err = QuoteError::missing_tariff("Long", 250.0);
        assert!(err.to_string().contains("Long"));
        assert!(err.to_string().contains("250"));
    }
}
