//! # Quotation Aggregator
//!
//! The root of the engine: takes one [`QuotationRequest`] and runs the
//! whole pipeline in a single synchronous pass:
//!
//! 1. eager validation of every line and every table, collecting all
//!    violations before any math;
//! 2. the pricing pipeline per line, summed to the materials subtotal;
//! 3. the freight optimizer once over the whole piece list, then the
//!    tariff lookup (when transport is enabled);
//! 4. the assembly branch (when enabled) and the flat complementary
//!    buckets;
//! 5. general expenses on top of the sum.
//!
//! No step revisits an earlier one, nothing is cached or mutated across
//! calls, and all lookups resolve against the in-memory snapshots inside
//! the request - so arbitrarily many quotations can run in parallel.
//!
//! Margin, payment-term adjustment and tax are a separate caller-facing
//! stage (see [`crate::summary`]) layered on this engine's output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assembly::{assembly_cost, AssemblyCost, AssemblyRates};
use crate::errors::{QuoteError, QuoteResult};
use crate::freight::{pack, FreightInput, FreightPlan, TruckProfile};
use crate::indices::{IndexSeriesSet, PolynomialFormula, YearMonth};
use crate::pieces::{LengthCategory, PieceLineItem};
use crate::pricing::{price_line_item, AdjustmentScale, PricedLine};
use crate::transport::{billed_distance_km, TransportRateTable};

/// Commercial knobs of one quotation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "general_expenses_pct": 13.0,
///   "enable_transport": true,
///   "enable_assembly": true,
///   "distance_km": 140.0,
///   "assembly_days": 6,
///   "crane_extra_days": 2,
///   "uses_extra_crane": true,
///   "crane_relocation_km": 140.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialParameters {
    /// General expenses percentage applied to the summed cost
    #[serde(default)]
    pub general_expenses_pct: f64,

    /// Override of the truck's rated capacity for this job (tn)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_capacity_tn: Option<f64>,

    #[serde(default)]
    pub enable_transport: bool,

    #[serde(default)]
    pub enable_assembly: bool,

    /// Real route distance plant -> site (km)
    #[serde(default)]
    pub distance_km: f64,

    #[serde(default)]
    pub assembly_days: u32,

    #[serde(default)]
    pub crane_extra_days: u32,

    #[serde(default)]
    pub crane_relocation_km: f64,

    #[serde(default)]
    pub uses_extra_crane: bool,

    /// Force every piece into one length category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_category_override: Option<LengthCategory>,

    /// At most this many pieces per truck; also floors the trip count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_per_truck_override: Option<u32>,
}

impl Default for CommercialParameters {
    fn default() -> Self {
        CommercialParameters {
            general_expenses_pct: 0.0,
            truck_capacity_tn: None,
            enable_transport: false,
            enable_assembly: false,
            distance_km: 0.0,
            assembly_days: 0,
            crane_extra_days: 0,
            crane_relocation_km: 0.0,
            uses_extra_crane: false,
            length_category_override: None,
            units_per_truck_override: None,
        }
    }
}

impl CommercialParameters {
    /// Validate the parameters, collecting every violation.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        if self.general_expenses_pct <= -100.0 || self.general_expenses_pct > 100.0 {
            violations.push(QuoteError::configuration(
                "parameters.general_expenses_pct",
                format!("percentage {} outside (-100, 100]", self.general_expenses_pct),
            ));
        }
        if self.distance_km < 0.0 {
            violations.push(QuoteError::configuration(
                "parameters.distance_km",
                format!("distance {} must not be negative", self.distance_km),
            ));
        }
        if self.crane_relocation_km < 0.0 {
            violations.push(QuoteError::configuration(
                "parameters.crane_relocation_km",
                format!("distance {} must not be negative", self.crane_relocation_km),
            ));
        }
        if let Some(cap) = self.truck_capacity_tn {
            if cap <= 0.0 {
                violations.push(QuoteError::configuration(
                    "parameters.truck_capacity_tn",
                    format!("capacity {cap} must be positive"),
                ));
            }
        }
        if let Some(units) = self.units_per_truck_override {
            if units == 0 {
                violations.push(QuoteError::configuration(
                    "parameters.units_per_truck_override",
                    "Units per truck must be positive",
                ));
            }
        }
        violations
    }
}

/// One flat-cost entry of a complementary bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCostItem {
    pub description: String,
    pub amount: f64,
}

/// Two itemized flat-cost buckets, summed as-is into the quotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplementaryWorks {
    #[serde(default)]
    pub site_works: Vec<FlatCostItem>,
    #[serde(default)]
    pub auxiliary_works: Vec<FlatCostItem>,
}

impl ComplementaryWorks {
    pub fn total(&self) -> f64 {
        self.site_works
            .iter()
            .chain(self.auxiliary_works.iter())
            .map(|i| i.amount)
            .sum()
    }
}

/// Everything one quotation needs, snapshotted.
///
/// The caller hands in immutable copies of the index, tariff and
/// adjustment tables so one calculation stays internally consistent even
/// if an administrator updates the live tables mid-flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationRequest {
    pub items: Vec<PieceLineItem>,

    /// Date anchoring the escalation base month
    pub base_price_date: NaiveDate,

    /// Date whose month the escalation targets (usually the quotation date)
    pub target_price_date: NaiveDate,

    /// Named monthly index series the polynomial draws from
    pub price_indices: IndexSeriesSet,

    pub polynomial: PolynomialFormula,

    pub adjustments: AdjustmentScale,

    pub parameters: CommercialParameters,

    #[serde(default)]
    pub truck_profile: TruckProfile,

    #[serde(default)]
    pub transport_rate_table: TransportRateTable,

    pub assembly_rates: AssemblyRates,

    #[serde(default)]
    pub complementary_works: ComplementaryWorks,
}

impl QuotationRequest {
    /// Eager structural validation: walks every line item and every
    /// configuration table, collecting all violations into one
    /// [`QuoteError::Validation`] so the caller can surface every problem
    /// at once. Runs before any packing or escalation math.
    pub fn validate(&self) -> QuoteResult<()> {
        let mut violations = Vec::new();

        for (line, item) in self.items.iter().enumerate() {
            violations.extend(item.validate(line));
        }
        violations.extend(self.adjustments.validate());
        violations.extend(self.polynomial.validate());
        for (series, table) in &self.price_indices {
            violations.extend(table.validate(series));
        }
        violations.extend(self.parameters.validate());
        if self.parameters.enable_transport {
            violations.extend(self.truck_profile.validate());
            violations.extend(self.transport_rate_table.validate());
        }
        if self.parameters.enable_assembly {
            violations.extend(self.assembly_rates.validate());
        }

        QuoteError::from_violations(violations)
    }

    /// Truck profile with the per-job capacity override applied.
    ///
    /// The billable floor never exceeds the rated capacity, so a capacity
    /// override below the carrier minimum pulls the minimum down with it.
    fn effective_truck_profile(&self) -> TruckProfile {
        let mut profile = self.truck_profile.clone();
        if let Some(capacity) = self.parameters.truck_capacity_tn {
            profile.max_weight_tn = capacity;
            profile.min_billable_weight_tn = profile.min_billable_weight_tn.min(capacity);
        }
        profile
    }
}

/// Materials section of the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsSummary {
    pub subtotal_final: f64,
    pub per_piece_breakdown: Vec<PricedLine>,
}

/// Transport section of the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSummary {
    pub total: f64,
    pub real_distance_km: f64,
    pub billed_distance_km: f64,
    pub trip_count: u32,
    pub total_real_weight_tn: f64,
    pub total_false_weight_tn: f64,
    pub per_truck_breakdown: Vec<crate::freight::TruckLoad>,
}

impl TransportSummary {
    fn disabled() -> Self {
        TransportSummary {
            total: 0.0,
            real_distance_km: 0.0,
            billed_distance_km: 0.0,
            trip_count: 0,
            total_real_weight_tn: 0.0,
            total_false_weight_tn: 0.0,
            per_truck_breakdown: Vec::new(),
        }
    }

    fn from_plan(plan: FreightPlan, real_km: f64, billed_km: f64) -> Self {
        TransportSummary {
            total: plan.transport_total(),
            real_distance_km: real_km,
            billed_distance_km: billed_km,
            trip_count: plan.trip_count,
            total_real_weight_tn: plan.total_real_weight_tn,
            total_false_weight_tn: plan.total_false_weight_tn,
            per_truck_breakdown: plan.loads,
        }
    }
}

/// Assembly section of the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySummary {
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<AssemblyCost>,
}

/// Composed totals. Always recomputed from scratch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationTotals {
    pub materials_subtotal: f64,
    pub transport_total: f64,
    pub assembly_total: f64,
    pub complementary_total: f64,
    /// General expenses amount added on top of the four cost blocks
    pub general_expenses: f64,
    pub grand_total_before_tax: f64,
}

/// Engine output for one quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationResponse {
    pub materials: MaterialsSummary,
    pub transport: TransportSummary,
    pub assembly: AssemblySummary,
    pub totals: QuotationTotals,
}

/// Compute one full quotation.
///
/// Pure function of the request: identical inputs and identical table
/// snapshots produce byte-identical serialized output on repeated calls.
///
/// # Errors
///
/// * [`QuoteError::Validation`] - one or more structural violations,
///   all collected
/// * [`QuoteError::MissingPriceIndex`] / [`QuoteError::OversizedPiece`] /
///   [`QuoteError::MissingTariff`] - failures discovered mid-computation;
///   these abort the whole calculation rather than dropping the
///   offending piece
pub fn calculate(request: &QuotationRequest) -> QuoteResult<QuotationResponse> {
    request.validate()?;

    let base = YearMonth::from(request.base_price_date);
    let target = YearMonth::from(request.target_price_date);

    // === Materials: pricing pipeline per line ===
    let mut per_piece_breakdown = Vec::with_capacity(request.items.len());
    let mut materials_subtotal = 0.0;
    for (line, item) in request.items.iter().enumerate() {
        let priced = price_line_item(
            item,
            line,
            &request.adjustments,
            &request.polynomial,
            &request.price_indices,
            base,
            target,
        )?;
        materials_subtotal += priced.total_cost;
        per_piece_breakdown.push(priced);
    }

    // === Transport: pack once over the whole piece list, then price ===
    let transport = if request.parameters.enable_transport && !request.items.is_empty() {
        let plan = pack(&FreightInput {
            items: &request.items,
            profile: request.effective_truck_profile(),
            units_per_truck_override: request.parameters.units_per_truck_override,
            length_category_override: request.parameters.length_category_override,
        })?;
        let real_km = request.parameters.distance_km;
        let billed_km = billed_distance_km(real_km);
        if billed_km == 0.0 {
            // No-charge case: the plan exists but no distance is billed
            TransportSummary::from_plan(plan, real_km, billed_km)
        } else {
            let priced = plan.priced(&request.transport_rate_table, billed_km)?;
            TransportSummary::from_plan(priced, real_km, billed_km)
        }
    } else {
        TransportSummary::disabled()
    };

    // === Assembly ===
    let assembly = if request.parameters.enable_assembly {
        let detail = assembly_cost(
            &request.assembly_rates,
            request.parameters.assembly_days,
            request.parameters.crane_extra_days,
            request.parameters.uses_extra_crane,
            request.parameters.crane_relocation_km,
        );
        AssemblySummary {
            total: detail.total,
            detail: Some(detail),
        }
    } else {
        AssemblySummary {
            total: 0.0,
            detail: None,
        }
    };

    // === Totals ===
    let complementary_total = request.complementary_works.total();
    let cost_base = materials_subtotal + transport.total + assembly.total + complementary_total;
    let general_expenses = cost_base * request.parameters.general_expenses_pct / 100.0;

    Ok(QuotationResponse {
        totals: QuotationTotals {
            materials_subtotal,
            transport_total: transport.total,
            assembly_total: assembly.total,
            complementary_total,
            general_expenses,
            grand_total_before_tax: cost_base + general_expenses,
        },
        materials: MaterialsSummary {
            subtotal_final: materials_subtotal,
            per_piece_breakdown,
        },
        transport,
        assembly,
    })
}
