//! # Assembly Cost Calculator
//!
//! On-site assembly cost from crew days, crane days and crane relocation:
//!
//! ```text
//! crew     = crew_day_rate x assembly_days
//! crane    = crane_day_rate x (assembly_days + extra)   extra only with the second crane
//! relocate = crane_relocation_per_km x crane_relocation_km
//! ```
//!
//! The whole branch is gated by the quotation's `enable_assembly` flag in
//! the aggregator; this module just prices the terms it is given.

use serde::{Deserialize, Serialize};

use crate::errors::QuoteError;

/// Day/km rates for the assembly crew and crane
///
/// ## JSON Example
///
/// ```json
/// { "crew_day_rate": 1450.0, "crane_day_rate": 980.0, "crane_relocation_per_km": 6.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRates {
    /// Assembly crew cost per working day
    pub crew_day_rate: f64,
    /// Crane cost per working day
    pub crane_day_rate: f64,
    /// Crane relocation cost per kilometer
    pub crane_relocation_per_km: f64,
}

impl AssemblyRates {
    /// Validate the rates, collecting every violation.
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        for (name, value) in [
            ("assembly_rates.crew_day_rate", self.crew_day_rate),
            ("assembly_rates.crane_day_rate", self.crane_day_rate),
            ("assembly_rates.crane_relocation_per_km", self.crane_relocation_per_km),
        ] {
            if value < 0.0 {
                violations.push(QuoteError::configuration(
                    name,
                    format!("rate {value} must not be negative"),
                ));
            }
        }
        violations
    }
}

/// Itemized assembly cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyCost {
    pub crew_cost: f64,
    pub crane_cost: f64,
    pub relocation_cost: f64,
    pub total: f64,
}

/// Price the assembly of one quotation.
///
/// `crane_extra_days` only counts when `uses_extra_crane` is set; without
/// the second crane the crane works the same days as the crew.
pub fn assembly_cost(
    rates: &AssemblyRates,
    assembly_days: u32,
    crane_extra_days: u32,
    uses_extra_crane: bool,
    crane_relocation_km: f64,
) -> AssemblyCost {
    let extra_days = if uses_extra_crane { crane_extra_days } else { 0 };

    let crew_cost = rates.crew_day_rate * f64::from(assembly_days);
    let crane_cost = rates.crane_day_rate * f64::from(assembly_days + extra_days);
    let relocation_cost = rates.crane_relocation_per_km * crane_relocation_km.max(0.0);

    AssemblyCost {
        crew_cost,
        crane_cost,
        relocation_cost,
        total: crew_cost + crane_cost + relocation_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> AssemblyRates {
        AssemblyRates {
            crew_day_rate: 1_000.0,
            crane_day_rate: 500.0,
            crane_relocation_per_km: 10.0,
        }
    }

    #[test]
    fn test_basic_terms() {
        let cost = assembly_cost(&rates(), 5, 0, false, 0.0);
        assert_eq!(cost.crew_cost, 5_000.0);
        assert_eq!(cost.crane_cost, 2_500.0);
        assert_eq!(cost.relocation_cost, 0.0);
        assert_eq!(cost.total, 7_500.0);
    }

    #[test]
    fn test_extra_crane_days_gated() {
        let without = assembly_cost(&rates(), 5, 3, false, 0.0);
        let with = assembly_cost(&rates(), 5, 3, true, 0.0);
        assert_eq!(without.crane_cost, 2_500.0);
        assert_eq!(with.crane_cost, 4_000.0);
    }

    #[test]
    fn test_relocation_term() {
        let cost = assembly_cost(&rates(), 2, 0, false, 120.0);
        assert_eq!(cost.relocation_cost, 1_200.0);
        assert_eq!(cost.total, 2_000.0 + 1_000.0 + 1_200.0);
    }

    #[test]
    fn test_zero_days_prices_nothing_but_relocation() {
        let cost = assembly_cost(&rates(), 0, 2, true, 40.0);
        assert_eq!(cost.crew_cost, 0.0);
        assert_eq!(cost.crane_cost, 1_000.0);
        assert_eq!(cost.relocation_cost, 400.0);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let bad = AssemblyRates {
            crew_day_rate: -1.0,
            ..rates()
        };
        assert_eq!(bad.validate().len(), 1);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cost = assembly_cost(&rates(), 3, 1, true, 25.0);
        let json = serde_json::to_string(&cost).unwrap();
        let roundtrip: AssemblyCost = serde_json::from_str(&json).unwrap();
        assert_eq!(cost, roundtrip);
    }
}
