//! # Freight Optimizer
//!
//! Bins the quotation's pieces into truck loads under weight, length and
//! escort constraints, and reports real vs. "false" billed tonnage per
//! truck (false tonnage is the shortfall a carrier bills when a load
//! comes in under its minimum billable weight).
//!
//! Packing is a deterministic first-fit-decreasing heuristic ordered by
//! descending piece weight with stable tie-breaking on input order, so
//! identical requests always produce identical plans.
//!
//! ## Rules
//!
//! - A piece flagged `individual_transport` occupies a dedicated truck.
//! - Escorted (Long/ExtraLong) pieces only share a truck with pieces of
//!   the same length category.
//! - A single piece heavier than the truck's rated capacity aborts the
//!   whole plan with [`QuoteError::OversizedPiece`]; pieces are never
//!   split automatically.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::freight::{pack, FreightInput, TruckProfile};
//! use quote_core::pieces::PieceLineItem;
//!
//! let items = vec![PieceLineItem {
//!     description: "Beam T-60".to_string(),
//!     unit: "ud".to_string(),
//!     quantity: 2,
//!     weight_per_unit_tn: Some(10.0),
//!     unit_price: 1_000.0,
//!     ..PieceLineItem::default()
//! }];
//!
//! let plan = pack(&FreightInput {
//!     items: &items,
//!     profile: TruckProfile { min_billable_weight_tn: 20.0, ..TruckProfile::default() },
//!     units_per_truck_override: None,
//!     length_category_override: None,
//! }).unwrap();
//!
//! assert_eq!(plan.loads.len(), 1);
//! assert_eq!(plan.loads[0].real_weight_tn, 20.0);
//! assert_eq!(plan.loads[0].false_weight_tn, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};
use crate::pieces::{LengthCategory, PieceLineItem};
use crate::transport::TransportRateTable;
use crate::units::Tonnes;

/// Default rated truck capacity ("aforo", tn)
pub const DEFAULT_TRUCK_CAPACITY_TN: f64 = 26.0;

/// Default minimum billable weight per truck (tn)
pub const DEFAULT_MIN_BILLABLE_TN: f64 = 20.0;

/// Carrier truck profile for one quotation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "max_weight_tn": 26.0,
///   "min_billable_weight_tn": 20.0,
///   "max_length_category": "ExtraLong",
///   "pieces_per_truck": 8
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckProfile {
    /// Rated maximum carrying weight (tn)
    pub max_weight_tn: f64,

    /// Minimum weight the carrier bills per truck (tn); a lighter load
    /// is billed the difference as false tonnage
    pub min_billable_weight_tn: f64,

    /// Longest cargo category the fleet can move at all
    #[serde(default = "TruckProfile::default_max_length_category")]
    pub max_length_category: LengthCategory,

    /// Hard cap on pieces per truck, when the carrier imposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pieces_per_truck: Option<u32>,
}

impl Default for TruckProfile {
    fn default() -> Self {
        TruckProfile {
            max_weight_tn: DEFAULT_TRUCK_CAPACITY_TN,
            min_billable_weight_tn: DEFAULT_MIN_BILLABLE_TN,
            max_length_category: LengthCategory::ExtraLong,
            pieces_per_truck: None,
        }
    }
}

impl TruckProfile {
    fn default_max_length_category() -> LengthCategory {
        LengthCategory::ExtraLong
    }

    /// Validate the profile, collecting every violation.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        if self.max_weight_tn <= 0.0 {
            violations.push(QuoteError::configuration(
                "truck_profile.max_weight_tn",
                format!("capacity {} must be positive", self.max_weight_tn),
            ));
        }
        if self.min_billable_weight_tn < 0.0 {
            violations.push(QuoteError::configuration(
                "truck_profile.min_billable_weight_tn",
                format!("minimum {} must not be negative", self.min_billable_weight_tn),
            ));
        }
        if self.min_billable_weight_tn > self.max_weight_tn && self.max_weight_tn > 0.0 {
            violations.push(QuoteError::configuration(
                "truck_profile.min_billable_weight_tn",
                "Minimum billable weight exceeds rated capacity",
            ));
        }
        if let Some(cap) = self.pieces_per_truck {
            if cap == 0 {
                violations.push(QuoteError::configuration(
                    "truck_profile.pieces_per_truck",
                    "Pieces-per-truck cap must be positive",
                ));
            }
        }
        violations
    }
}

/// One piece as assigned to a truck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedPiece {
    /// Zero-based index of the source quotation line
    pub line: usize,
    pub description: String,
    pub weight_tn: f64,
}

/// One packed truck. Built append-only during packing, frozen once the
/// plan is emitted; `cost` is filled by [`FreightPlan::priced`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckLoad {
    /// 1-based truck number, in packing order
    pub truck_number: u32,
    pub assigned_pieces: Vec<AssignedPiece>,
    /// Physical weight on the trailer (tn); never exceeds the rated capacity
    pub real_weight_tn: f64,
    /// Billed shortfall below the minimum billable weight (tn); present
    /// only when the real weight is under the minimum, never merged into it
    pub false_weight_tn: f64,
    pub length_category: LengthCategory,
    pub requires_escort: bool,
    /// Tariff cost of this trip; 0 until the plan is priced
    pub cost: f64,
}

impl TruckLoad {
    /// Weight the carrier bills for this truck (tn)
    pub fn billed_weight_tn(&self) -> f64 {
        self.real_weight_tn + self.false_weight_tn
    }

    pub fn piece_count(&self) -> usize {
        self.assigned_pieces.len()
    }
}

/// Freight optimizer input
#[derive(Debug, Clone)]
pub struct FreightInput<'a> {
    pub items: &'a [PieceLineItem],
    pub profile: TruckProfile,
    /// Per-piece truck-capacity override: at most this many pieces per
    /// truck, which also floors the required trip count
    pub units_per_truck_override: Option<u32>,
    /// Force every piece into one length category regardless of geometry
    pub length_category_override: Option<LengthCategory>,
}

/// The packed plan for one quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightPlan {
    pub loads: Vec<TruckLoad>,
    pub total_real_weight_tn: f64,
    pub total_false_weight_tn: f64,
    /// Trips actually packed (= loads.len())
    pub trip_count: u32,
    /// Lower bound from weight / unit-count / volume rules; the packed
    /// trip count never falls below it
    pub required_trip_floor: u32,
}

impl FreightPlan {
    /// Price every load against a rate table at a billed distance,
    /// consuming the unpriced plan.
    pub fn priced(
        mut self,
        table: &TransportRateTable,
        billed_distance_km: f64,
    ) -> QuoteResult<FreightPlan> {
        for load in &mut self.loads {
            load.cost = table.rate_for(load.length_category, billed_distance_km)?;
        }
        Ok(self)
    }

    /// Sum of per-truck trip costs
    pub fn transport_total(&self) -> f64 {
        self.loads.iter().map(|l| l.cost).sum()
    }

    /// Total pieces across all loads
    pub fn total_pieces(&self) -> usize {
        self.loads.iter().map(TruckLoad::piece_count).sum()
    }
}

/// One physical piece, expanded from its quotation line
struct PieceUnit {
    line: usize,
    description: String,
    weight_tn: f64,
    category: LengthCategory,
    individual: bool,
}

/// Open bin during packing
struct OpenTruck {
    pieces: Vec<AssignedPiece>,
    weight: Tonnes,
    category: LengthCategory,
    dedicated: bool,
}

/// Volume-derived trip count.
///
/// Volumetric packing is not yet supported; this branch exists so the
/// required-trip computation keeps the concept visible instead of
/// silently dropping it.
fn volume_trip_count(_units: &[PieceUnit]) -> u32 {
    0
}

/// Pack all pieces into truck loads.
///
/// Deterministic: first-fit-decreasing on piece weight, stable on input
/// order for equal weights.
///
/// # Errors
///
/// * [`QuoteError::OversizedPiece`] - a piece outweighs the rated capacity
/// * [`QuoteError::Validation`] - profile violations, or cargo longer
///   than the fleet can move
pub fn pack(input: &FreightInput<'_>) -> QuoteResult<FreightPlan> {
    let mut violations = input.profile.validate();

    // Expand lines into physical units, applying the category override
    let mut units = Vec::new();
    for (line, item) in input.items.iter().enumerate() {
        let category = input
            .length_category_override
            .unwrap_or_else(|| item.length_category());
        if category > input.profile.max_length_category {
            violations.push(QuoteError::invalid_line_item(
                line,
                "length_m",
                item.length_m.map_or_else(|| "null".to_string(), |l| l.to_string()),
                format!(
                    "{} cargo exceeds the fleet limit ({})",
                    category.label(),
                    input.profile.max_length_category.label()
                ),
            ));
            continue;
        }
        for _ in 0..item.quantity {
            units.push(PieceUnit {
                line,
                description: item.description.clone(),
                weight_tn: item.unit_weight_tn(),
                category,
                individual: item.individual_transport,
            });
        }
    }
    QuoteError::from_violations(violations)?;

    // A piece heavier than any truck aborts the plan; no automatic splitting
    for unit in &units {
        if unit.weight_tn > input.profile.max_weight_tn {
            return Err(QuoteError::oversized_piece(
                unit.description.clone(),
                unit.weight_tn,
                input.profile.max_weight_tn,
            ));
        }
    }

    // Required-trip floor: weight-derived, unit-count-derived (only when
    // an override exists), and the reserved volume-derived count
    let total_weight: f64 = units.iter().map(|u| u.weight_tn).sum();
    let weight_trips = (total_weight / input.profile.max_weight_tn).ceil() as u32;
    let unit_trips = input
        .units_per_truck_override
        .filter(|cap| *cap > 0)
        .map(|cap| (units.len() as u32).div_ceil(cap))
        .unwrap_or(0);
    let required_trip_floor = weight_trips.max(unit_trips).max(volume_trip_count(&units));

    // Effective per-truck piece cap keeps the packed count at or above
    // the floor without synthesizing empty trips
    let pieces_cap = match (input.profile.pieces_per_truck, input.units_per_truck_override) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };

    // First-fit-decreasing: sort_by is stable, so equal weights keep
    // their input order
    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by(|&a, &b| {
        units[b]
            .weight_tn
            .partial_cmp(&units[a].weight_tn)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut trucks: Vec<OpenTruck> = Vec::new();
    for &idx in &order {
        let unit = &units[idx];
        let assigned = AssignedPiece {
            line: unit.line,
            description: unit.description.clone(),
            weight_tn: unit.weight_tn,
        };

        let slot = if unit.individual {
            None
        } else {
            trucks.iter().position(|t| {
                !t.dedicated
                    && t.category.can_share_with(unit.category)
                    && t.weight.0 + unit.weight_tn <= input.profile.max_weight_tn
                    && pieces_cap.map_or(true, |cap| t.pieces.len() < cap as usize)
            })
        };

        match slot {
            Some(i) => {
                trucks[i].pieces.push(assigned);
                trucks[i].weight = trucks[i].weight + Tonnes(unit.weight_tn);
            }
            None => trucks.push(OpenTruck {
                pieces: vec![assigned],
                weight: Tonnes(unit.weight_tn),
                category: unit.category,
                dedicated: unit.individual,
            }),
        }
    }

    let mut loads = Vec::with_capacity(trucks.len());
    let mut total_real = 0.0;
    let mut total_false = 0.0;
    for (i, truck) in trucks.into_iter().enumerate() {
        let real = truck.weight.0;
        let false_weight = (input.profile.min_billable_weight_tn - real).max(0.0);
        total_real += real;
        total_false += false_weight;
        loads.push(TruckLoad {
            truck_number: (i + 1) as u32,
            assigned_pieces: truck.pieces,
            real_weight_tn: real,
            false_weight_tn: false_weight,
            length_category: truck.category,
            requires_escort: truck.category.requires_escort(),
            cost: 0.0,
        });
    }

    Ok(FreightPlan {
        trip_count: loads.len() as u32,
        loads,
        total_real_weight_tn: total_real,
        total_false_weight_tn: total_false,
        required_trip_floor,
    })
}
