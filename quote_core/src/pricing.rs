//! # Pricing Pipeline
//!
//! Per-line material pricing in three layers:
//!
//! 1. **Material cost** - billable quantity x base unit price, where the
//!    billable quantity may be geometry-derived (see
//!    [`crate::pieces::PricingBasis`]).
//! 2. **Adjustments** - category rule, then commercial discount, then
//!    global multiplier. The order is fixed; it changes the result and
//!    must be reproducible across quotations.
//! 3. **Escalation** - the polynomial formula evaluated between the base
//!    price month and the target month.
//!
//! Output per line: `unit_cost` (per billable unit) and
//! `total_cost = unit_cost x billable_quantity`.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::indices::{IndexSeriesSet, PolynomialFormula, PriceIndexTable, YearMonth};
//! use quote_core::pieces::{AdjustmentCategory, PieceLineItem};
//! use quote_core::pricing::{price_line_item, AdjustmentScale};
//!
//! let item = PieceLineItem {
//!     description: "Column 40x40".to_string(),
//!     unit: "ud".to_string(),
//!     quantity: 10,
//!     unit_price: 100.0,
//!     adjustment_category: AdjustmentCategory::Especial,
//!     ..PieceLineItem::default()
//! };
//!
//! let scale = AdjustmentScale::default().with_category_rule(AdjustmentCategory::Especial, -15.0);
//! let mut series = IndexSeriesSet::new();
//! series.insert(
//!     "general".to_string(),
//!     PriceIndexTable::new()
//!         .with_entry(YearMonth::new(2024, 1), 100.0)
//!         .with_entry(YearMonth::new(2024, 6), 300.0),
//! );
//! let formula = PolynomialFormula::single("general");
//!
//! let priced = price_line_item(
//!     &item, 0, &scale, &formula, &series,
//!     YearMonth::new(2024, 1), YearMonth::new(2024, 6),
//! ).unwrap();
//!
//! // 100 x 0.85 x 3.0 = 255 per unit, 2550 for the line
//! assert!((priced.unit_cost - 255.0).abs() < 1e-9);
//! assert!((priced.total_cost - 2550.0).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{QuoteError, QuoteResult};
use crate::indices::{IndexSeriesSet, PolynomialFormula, YearMonth};
use crate::pieces::{AdjustmentCategory, PieceLineItem};

/// Named percentage rules applied between raw cost and escalation.
///
/// `category_rules` holds per-category percentages (e.g. Especial ->
/// -15.0 for a fixed 15% reduction); `commercial_discount_pct` is the
/// negotiated discount of the quotation; `global_multiplier` is a plain
/// scale factor on top of both.
///
/// ## JSON Example
///
/// ```json
/// {
///   "category_rules": { "ESPECIAL": -15.0 },
///   "commercial_discount_pct": -5.0,
///   "global_multiplier": 1.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentScale {
    /// Percentage rule per piece category; absent category means 0%
    #[serde(default)]
    pub category_rules: BTreeMap<AdjustmentCategory, f64>,

    /// Commercial discount percentage (negative reduces the price)
    #[serde(default)]
    pub commercial_discount_pct: f64,

    /// Global multiplier applied after both discounts
    pub global_multiplier: f64,
}

impl Default for AdjustmentScale {
    fn default() -> Self {
        AdjustmentScale {
            category_rules: BTreeMap::new(),
            commercial_discount_pct: 0.0,
            global_multiplier: 1.0,
        }
    }
}

impl AdjustmentScale {
    /// Set a category rule (builder pattern)
    pub fn with_category_rule(mut self, category: AdjustmentCategory, pct: f64) -> Self {
        self.category_rules.insert(category, pct);
        self
    }

    /// Multiplicative factor for a category (1.0 when no rule exists)
    pub fn category_factor(&self, category: AdjustmentCategory) -> f64 {
        1.0 + self.category_rules.get(&category).copied().unwrap_or(0.0) / 100.0
    }

    /// Multiplicative factor of the commercial discount
    pub fn commercial_factor(&self) -> f64 {
        1.0 + self.commercial_discount_pct / 100.0
    }

    /// Validate percentages and the multiplier, collecting every violation.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        for (category, pct) in &self.category_rules {
            if *pct <= -100.0 || *pct > 100.0 {
                violations.push(QuoteError::configuration(
                    format!("adjustments.category_rules.{category:?}"),
                    format!("percentage {pct} outside (-100, 100]"),
                ));
            }
        }
        if self.commercial_discount_pct <= -100.0 || self.commercial_discount_pct > 100.0 {
            violations.push(QuoteError::configuration(
                "adjustments.commercial_discount_pct",
                format!(
                    "percentage {} outside (-100, 100]",
                    self.commercial_discount_pct
                ),
            ));
        }
        if self.global_multiplier <= 0.0 {
            violations.push(QuoteError::configuration(
                "adjustments.global_multiplier",
                format!("multiplier {} must be positive", self.global_multiplier),
            ));
        }
        violations
    }
}

/// Fully priced quotation line.
///
/// Intermediate layer outputs are kept so the breakdown can show how the
/// final figure was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Echo of the caller-supplied line id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Echo of the piece description
    pub description: String,

    /// Display unit of the line
    pub unit: String,

    /// Physical piece count
    pub quantity: u32,

    /// Billable quantity after the pricing basis (pieces, meters, ...)
    pub billable_quantity: f64,

    /// Base price per billable unit, before any adjustment
    pub base_unit_price: f64,

    /// Price per billable unit after category + commercial + multiplier
    pub adjusted_unit_price: f64,

    /// Escalation factor applied on top of the adjusted price
    pub escalation_factor: f64,

    /// Final price per billable unit
    pub unit_cost: f64,

    /// unit_cost x billable_quantity
    pub total_cost: f64,
}

/// Price one quotation line through all three layers.
///
/// This is a pure function: identical inputs and table snapshots produce
/// identical output.
///
/// # Errors
///
/// * [`QuoteError::InvalidLineItem`] - non-positive price/quantity, or a
///   pricing basis whose geometry the line does not carry
/// * [`QuoteError::MissingPriceIndex`] - base or target month absent from
///   a referenced index series
/// * [`QuoteError::Configuration`] - formula referencing an unknown series
pub fn price_line_item(
    item: &PieceLineItem,
    line: usize,
    scale: &AdjustmentScale,
    formula: &PolynomialFormula,
    series: &IndexSeriesSet,
    base: YearMonth,
    target: YearMonth,
) -> QuoteResult<PricedLine> {
    if item.quantity == 0 {
        return Err(QuoteError::invalid_line_item(
            line,
            "quantity",
            item.quantity.to_string(),
            "Quantity must be positive",
        ));
    }
    if item.unit_price <= 0.0 {
        return Err(QuoteError::invalid_line_item(
            line,
            "unit_price",
            item.unit_price.to_string(),
            "Price must be positive",
        ));
    }

    // === Layer 1: material cost ===
    let billable_quantity = item.billable_quantity(line)?;

    // === Layer 2: adjustments, in fixed order ===
    let adjusted_unit_price = item.unit_price
        * scale.category_factor(item.adjustment_category)
        * scale.commercial_factor()
        * scale.global_multiplier;

    // === Layer 3: escalation ===
    let escalation_factor = formula.factor(series, base, target)?;

    let unit_cost = adjusted_unit_price * escalation_factor;

    Ok(PricedLine {
        id: item.id,
        description: item.description.clone(),
        unit: item.unit.clone(),
        quantity: item.quantity,
        billable_quantity,
        base_unit_price: item.unit_price,
        adjusted_unit_price,
        escalation_factor,
        unit_cost,
        total_cost: unit_cost * billable_quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::PriceIndexTable;
    use crate::pieces::PricingBasis;

    fn flat_series(base_value: f64, target_value: f64) -> IndexSeriesSet {
        let mut set = IndexSeriesSet::new();
        set.insert(
            "general".to_string(),
            PriceIndexTable::new()
                .with_entry(YearMonth::new(2024, 1), base_value)
                .with_entry(YearMonth::new(2024, 6), target_value),
        );
        set
    }

    fn column() -> PieceLineItem {
        PieceLineItem {
            description: "Column 40x40".to_string(),
            unit: "ud".to_string(),
            quantity: 10,
            unit_price: 100.0,
            adjustment_category: AdjustmentCategory::Especial,
            ..PieceLineItem::default()
        }
    }

    #[test]
    fn test_worked_example() {
        // unit_price=100, qty=10, category -15%, commercial 0%, multiplier 1.0,
        // escalation x3 => unit_cost 255, total 2550
        let scale =
            AdjustmentScale::default().with_category_rule(AdjustmentCategory::Especial, -15.0);
        let priced = price_line_item(
            &column(),
            0,
            &scale,
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 300.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap();

        assert!((priced.unit_cost - 255.0).abs() < 1e-9);
        assert!((priced.total_cost - 2550.0).abs() < 1e-9);
        assert!((priced.escalation_factor - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_general_category_skips_rule() {
        let mut item = column();
        item.adjustment_category = AdjustmentCategory::General;
        let scale =
            AdjustmentScale::default().with_category_rule(AdjustmentCategory::Especial, -15.0);
        let priced = price_line_item(
            &item,
            0,
            &scale,
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 100.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap();
        assert!((priced.unit_cost - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjustment_order_is_multiplicative_chain() {
        // -10% category then -10% commercial is 0.81, not 0.80
        let mut item = column();
        item.adjustment_category = AdjustmentCategory::Especial;
        let scale = AdjustmentScale {
            commercial_discount_pct: -10.0,
            ..AdjustmentScale::default()
        }
        .with_category_rule(AdjustmentCategory::Especial, -10.0);
        let priced = price_line_item(
            &item,
            0,
            &scale,
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 100.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap();
        assert!((priced.adjusted_unit_price - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiplier_monotonicity() {
        let series = flat_series(100.0, 120.0);
        let formula = PolynomialFormula::single("general");
        let low = AdjustmentScale { global_multiplier: 1.0, ..AdjustmentScale::default() };
        let high = AdjustmentScale { global_multiplier: 1.2, ..AdjustmentScale::default() };

        let base = YearMonth::new(2024, 1);
        let target = YearMonth::new(2024, 6);
        let item = column();
        let a = price_line_item(&item, 0, &low, &formula, &series, base, target).unwrap();
        let b = price_line_item(&item, 0, &high, &formula, &series, base, target).unwrap();
        assert!(b.total_cost > a.total_cost);
    }

    #[test]
    fn test_geometry_scaled_quantity() {
        let item = PieceLineItem {
            description: "Wall panel".to_string(),
            unit: "m2".to_string(),
            quantity: 5,
            length_m: Some(6.0),
            width_m: Some(2.4),
            unit_price: 50.0,
            pricing_basis: PricingBasis::SquareMeters,
            ..PieceLineItem::default()
        };
        let priced = price_line_item(
            &item,
            0,
            &AdjustmentScale::default(),
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 100.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap();
        // 5 panels x 14.4 m2 = 72 m2 at 50/m2
        assert!((priced.billable_quantity - 72.0).abs() < 1e-9);
        assert!((priced.total_cost - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let mut item = column();
        item.unit_price = 0.0;
        let err = price_line_item(
            &item,
            7,
            &AdjustmentScale::default(),
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 100.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LINE_ITEM");
    }

    #[test]
    fn test_missing_target_month() {
        let err = price_line_item(
            &column(),
            0,
            &AdjustmentScale::default(),
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 100.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 9),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PRICE_INDEX");
    }

    #[test]
    fn test_scale_validation_bounds() {
        let scale = AdjustmentScale {
            commercial_discount_pct: -120.0,
            global_multiplier: 0.0,
            ..AdjustmentScale::default()
        };
        assert_eq!(scale.validate().len(), 2);
    }

    #[test]
    fn test_priced_line_serialization() {
        let priced = price_line_item(
            &column(),
            0,
            &AdjustmentScale::default(),
            &PolynomialFormula::single("general"),
            &flat_series(100.0, 110.0),
            YearMonth::new(2024, 1),
            YearMonth::new(2024, 6),
        )
        .unwrap();
        let json = serde_json::to_string_pretty(&priced).unwrap();
        assert!(json.contains("unit_cost"));
        let roundtrip: PricedLine = serde_json::from_str(&json).unwrap();
        assert!((priced.total_cost - roundtrip.total_cost).abs() < 1e-9);
    }
}
