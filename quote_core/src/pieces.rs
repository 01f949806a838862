//! # Piece Line Items
//!
//! Input types describing the precast pieces on a quotation: one
//! [`PieceLineItem`] per quotation line, plus the closed classification
//! enums that drive discount rules and truck compatibility.
//!
//! Classification is deliberately a set of tagged enums with exhaustive
//! matching — no string comparison anywhere downstream.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::pieces::{AdjustmentCategory, PieceLineItem, PricingBasis};
//!
//! let girder = PieceLineItem {
//!     description: "Girder I-100".to_string(),
//!     unit: "ud".to_string(),
//!     quantity: 4,
//!     length_m: Some(18.0),
//!     weight_per_unit_tn: Some(22.5),
//!     unit_price: 3_150.0,
//!     adjustment_category: AdjustmentCategory::Especial,
//!     ..PieceLineItem::default()
//! };
//!
//! assert!(girder.length_category().requires_escort());
//! assert!((girder.total_weight_tn() - 90.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{QuoteError, QuoteResult};
use crate::units::{Kilograms, Meters, Tonnes};

/// Pieces at or below this length travel as Standard cargo (m)
pub const STANDARD_MAX_LENGTH_M: f64 = 13.5;

/// Pieces at or below this length travel as Long cargo; beyond is ExtraLong (m)
pub const LONG_MAX_LENGTH_M: f64 = 21.0;

/// Tolerance for agreement between the two weight fields (tn = 0.5 kg)
const WEIGHT_AGREEMENT_TOLERANCE_TN: f64 = 0.0005;

/// Discount classification of a piece.
///
/// GENERAL pieces take only the commercial terms; ESPECIAL pieces
/// additionally take the category rule from the adjustment scale
/// (historically a fixed -15%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentCategory {
    #[default]
    General,
    Especial,
}

/// Transport length classification of a piece.
///
/// Carriers price and escort loads by the longest piece on the trailer,
/// so the category is a property of the whole truck, set by the pieces
/// it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum LengthCategory {
    /// Up to 13.5 m - ordinary trailer, no escort
    #[default]
    Standard,
    /// Over 13.5 m up to 21 m - extendable trailer, escort required
    Long,
    /// Over 21 m - special convoy, escort required
    ExtraLong,
}

impl LengthCategory {
    /// Classify a piece length.
    pub fn for_length(length: Meters) -> Self {
        if length.0 <= STANDARD_MAX_LENGTH_M {
            LengthCategory::Standard
        } else if length.0 <= LONG_MAX_LENGTH_M {
            LengthCategory::Long
        } else {
            LengthCategory::ExtraLong
        }
    }

    /// Whether loads of this category must travel with an escort vehicle
    pub fn requires_escort(&self) -> bool {
        !matches!(self, LengthCategory::Standard)
    }

    /// Whether pieces of this category may ride on the same truck as
    /// pieces of `other`.
    ///
    /// Standard pieces mix freely; escorted pieces only share a trailer
    /// with pieces of the same category.
    pub fn can_share_with(&self, other: LengthCategory) -> bool {
        *self == other
    }

    /// Display label, also used in error payloads
    pub fn label(&self) -> &'static str {
        match self {
            LengthCategory::Standard => "Standard",
            LengthCategory::Long => "Long",
            LengthCategory::ExtraLong => "ExtraLong",
        }
    }
}

/// How a line's unit price is quoted, i.e. what one billable unit is.
///
/// This is the bill-of-materials hook of the pricing layer: when a piece
/// is priced per meter, square meter or tonne, the billable quantity is
/// derived from the piece geometry instead of the raw piece count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PricingBasis {
    /// Price is per piece
    #[default]
    Unit,
    /// Price is per linear meter (requires `length_m`)
    LinearMeters,
    /// Price is per square meter (requires `length_m` and `width_m`)
    SquareMeters,
    /// Price is per tonne (requires a piece weight)
    Tonnes,
}

/// One line of a quotation: a piece type, its geometry and its base price.
///
/// Immutable input; the engine never mutates a line item.
///
/// ## JSON Example
///
/// ```json
/// {
///   "description": "Hollow-core slab 30",
///   "unit": "m2",
///   "quantity": 120,
///   "length_m": 8.0,
///   "width_m": 1.2,
///   "weight_per_piece_kg": 3400.0,
///   "unit_price": 41.5,
///   "adjustment_category": "GENERAL",
///   "pricing_basis": "SquareMeters"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieceLineItem {
    /// Caller-supplied id, echoed in the per-piece breakdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Piece description (e.g. "Delta beam 80", "Column 50x50")
    pub description: String,

    /// Display unit for the line (e.g. "ud", "m", "m2")
    pub unit: String,

    /// Number of physical pieces on this line
    pub quantity: u32,

    /// Piece length (m) - feeds both geometry pricing and truck packing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,

    /// Piece width (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_m: Option<f64>,

    /// Weight of one piece in tonnes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_per_unit_tn: Option<f64>,

    /// Weight of one piece in kilograms (alternative to the tonne field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_per_piece_kg: Option<f64>,

    /// Base price per billable unit, at the base price date
    pub unit_price: f64,

    /// Discount classification
    #[serde(default)]
    pub adjustment_category: AdjustmentCategory,

    /// What one billable unit is (piece, meter, square meter, tonne)
    #[serde(default)]
    pub pricing_basis: PricingBasis,

    /// Piece must travel alone on a dedicated truck
    #[serde(default)]
    pub individual_transport: bool,
}

impl PieceLineItem {
    /// Validate this line, collecting every violation.
    ///
    /// `line` is the zero-based position in the request, used to key the
    /// violation back to its source.
    pub fn validate(&self, line: usize) -> Vec<QuoteError> {
        let mut violations = Vec::new();

        if self.quantity == 0 {
            violations.push(QuoteError::invalid_line_item(
                line,
                "quantity",
                self.quantity.to_string(),
                "Quantity must be positive",
            ));
        }
        if self.unit_price <= 0.0 {
            violations.push(QuoteError::invalid_line_item(
                line,
                "unit_price",
                self.unit_price.to_string(),
                "Price must be positive",
            ));
        }
        if let Some(l) = self.length_m {
            if l <= 0.0 {
                violations.push(QuoteError::invalid_line_item(
                    line,
                    "length_m",
                    l.to_string(),
                    "Length must be positive",
                ));
            }
        }
        if let Some(w) = self.width_m {
            if w <= 0.0 {
                violations.push(QuoteError::invalid_line_item(
                    line,
                    "width_m",
                    w.to_string(),
                    "Width must be positive",
                ));
            }
        }
        if let Some(tn) = self.weight_per_unit_tn {
            if tn < 0.0 {
                violations.push(QuoteError::invalid_line_item(
                    line,
                    "weight_per_unit_tn",
                    tn.to_string(),
                    "Weight must not be negative",
                ));
            }
        }
        if let Some(kg) = self.weight_per_piece_kg {
            if kg < 0.0 {
                violations.push(QuoteError::invalid_line_item(
                    line,
                    "weight_per_piece_kg",
                    kg.to_string(),
                    "Weight must not be negative",
                ));
            }
        }
        if let (Some(tn), Some(kg)) = (self.weight_per_unit_tn, self.weight_per_piece_kg) {
            let from_kg: Tonnes = Kilograms(kg).into();
            if (from_kg.0 - tn).abs() > WEIGHT_AGREEMENT_TOLERANCE_TN {
                violations.push(QuoteError::invalid_line_item(
                    line,
                    "weight_per_piece_kg",
                    kg.to_string(),
                    "Disagrees with weight_per_unit_tn",
                ));
            }
        }
        if let Err(e) = self.billable_units_per_piece(line) {
            violations.push(e);
        }

        violations
    }

    /// Weight of one piece in tonnes.
    ///
    /// Resolves whichever weight field is present (tonnes wins when both
    /// are given, validation has already checked agreement). A piece with
    /// no weight data weighs zero for freight purposes but still prices.
    pub fn unit_weight_tn(&self) -> f64 {
        if let Some(tn) = self.weight_per_unit_tn {
            tn
        } else if let Some(kg) = self.weight_per_piece_kg {
            Tonnes::from(Kilograms(kg)).0
        } else {
            0.0
        }
    }

    /// Total weight of the line in tonnes
    pub fn total_weight_tn(&self) -> f64 {
        self.unit_weight_tn() * f64::from(self.quantity)
    }

    /// Transport length classification, derived from `length_m`.
    ///
    /// A line without a length is Standard cargo.
    pub fn length_category(&self) -> LengthCategory {
        match self.length_m {
            Some(l) => LengthCategory::for_length(Meters(l)),
            None => LengthCategory::Standard,
        }
    }

    /// Billable units contained in one physical piece, per the pricing
    /// basis (1 for Unit, the length for LinearMeters, and so on).
    ///
    /// Fails when the basis needs a geometry field the line does not carry.
    pub fn billable_units_per_piece(&self, line: usize) -> QuoteResult<f64> {
        match self.pricing_basis {
            PricingBasis::Unit => Ok(1.0),
            PricingBasis::LinearMeters => self.length_m.ok_or_else(|| {
                QuoteError::invalid_line_item(
                    line,
                    "length_m",
                    "null",
                    "Pricing per linear meter requires a piece length",
                )
            }),
            PricingBasis::SquareMeters => match (self.length_m, self.width_m) {
                (Some(l), Some(w)) => Ok(l * w),
                _ => Err(QuoteError::invalid_line_item(
                    line,
                    "length_m/width_m",
                    "null",
                    "Pricing per square meter requires piece length and width",
                )),
            },
            PricingBasis::Tonnes => {
                let w = self.unit_weight_tn();
                if w > 0.0 {
                    Ok(w)
                } else {
                    Err(QuoteError::invalid_line_item(
                        line,
                        "weight_per_unit_tn",
                        "null",
                        "Pricing per tonne requires a piece weight",
                    ))
                }
            }
        }
    }

    /// Total billable quantity of the line (pieces x units-per-piece)
    pub fn billable_quantity(&self, line: usize) -> QuoteResult<f64> {
        Ok(f64::from(self.quantity) * self.billable_units_per_piece(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab() -> PieceLineItem {
        PieceLineItem {
            description: "Hollow-core slab 30".to_string(),
            unit: "m2".to_string(),
            quantity: 10,
            length_m: Some(8.0),
            width_m: Some(1.2),
            weight_per_piece_kg: Some(3_400.0),
            unit_price: 41.5,
            pricing_basis: PricingBasis::SquareMeters,
            ..PieceLineItem::default()
        }
    }

    #[test]
    fn test_length_category_thresholds() {
        assert_eq!(LengthCategory::for_length(Meters(13.5)), LengthCategory::Standard);
        assert_eq!(LengthCategory::for_length(Meters(13.51)), LengthCategory::Long);
        assert_eq!(LengthCategory::for_length(Meters(21.0)), LengthCategory::Long);
        assert_eq!(LengthCategory::for_length(Meters(21.1)), LengthCategory::ExtraLong);
    }

    #[test]
    fn test_escort_flags() {
        assert!(!LengthCategory::Standard.requires_escort());
        assert!(LengthCategory::Long.requires_escort());
        assert!(LengthCategory::ExtraLong.requires_escort());
    }

    #[test]
    fn test_category_sharing() {
        assert!(LengthCategory::Standard.can_share_with(LengthCategory::Standard));
        assert!(LengthCategory::Long.can_share_with(LengthCategory::Long));
        assert!(!LengthCategory::Long.can_share_with(LengthCategory::ExtraLong));
        assert!(!LengthCategory::Standard.can_share_with(LengthCategory::Long));
    }

    #[test]
    fn test_weight_resolution_from_kg() {
        let item = slab();
        assert!((item.unit_weight_tn() - 3.4).abs() < 1e-9);
        assert!((item.total_weight_tn() - 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_billable_quantity_square_meters() {
        let item = slab();
        // 10 pieces x 8.0 m x 1.2 m = 96 m2
        let qty = item.billable_quantity(0).unwrap();
        assert!((qty - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_billable_quantity_unit_basis() {
        let mut item = slab();
        item.pricing_basis = PricingBasis::Unit;
        assert!((item.billable_quantity(0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_geometry_for_basis() {
        let mut item = slab();
        item.width_m = None;
        let violations = item.validate(4);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].error_code(), "INVALID_LINE_ITEM");
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let item = PieceLineItem {
            description: "Broken".to_string(),
            unit: "ud".to_string(),
            quantity: 0,
            unit_price: 0.0,
            ..PieceLineItem::default()
        };
        let violations = item.validate(1);
        // quantity and unit_price both flagged in one pass
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_disagreeing_weight_fields() {
        let mut item = slab();
        item.weight_per_unit_tn = Some(3.5); // kg says 3.4
        assert!(!item.validate(0).is_empty());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let item = slab();
        let json = serde_json::to_string_pretty(&item).unwrap();
        let roundtrip: PieceLineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item.quantity, roundtrip.quantity);
        assert_eq!(item.adjustment_category, roundtrip.adjustment_category);
        assert!(json.contains("GENERAL"));
    }
}
