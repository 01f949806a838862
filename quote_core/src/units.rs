//! # Unit Types
//!
//! Type-safe wrappers for the units the engine traffics in. These provide
//! compile-time safety against unit confusion while remaining lightweight
//! (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - The quotation domain uses a small, fixed set of units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## Metric Units (Primary)
//!
//! The engine uses metric units throughout, matching carrier tariffs and
//! plant drawings:
//! - Mass: tonnes (tn), kilograms (kg)
//! - Length: meters (m), kilometers (km)
//!
//! ## Example
//!
//! ```rust
//! use quote_core::units::{Kilograms, Tonnes};
//!
//! let per_piece = Kilograms(8_400.0);
//! let tn: Tonnes = per_piece.into();
//! assert_eq!(tn.0, 8.4);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in tonnes (metric tons)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

impl From<Kilograms> for Tonnes {
    fn from(kg: Kilograms) -> Self {
        Tonnes(kg.0 / 1000.0)
    }
}

impl From<Tonnes> for Kilograms {
    fn from(tn: Tonnes) -> Self {
        Kilograms(tn.0 * 1000.0)
    }
}

impl Add for Tonnes {
    type Output = Tonnes;
    fn add(self, rhs: Tonnes) -> Tonnes {
        Tonnes(self.0 + rhs.0)
    }
}

impl Sub for Tonnes {
    type Output = Tonnes;
    fn sub(self, rhs: Tonnes) -> Tonnes {
        Tonnes(self.0 - rhs.0)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in kilometers
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilometers(pub f64);

impl From<Meters> for Kilometers {
    fn from(m: Meters) -> Self {
        Kilometers(m.0 / 1000.0)
    }
}

impl From<Kilometers> for Meters {
    fn from(km: Kilometers) -> Self {
        Meters(km.0 * 1000.0)
    }
}

impl Add for Kilometers {
    type Output = Kilometers;
    fn add(self, rhs: Kilometers) -> Kilometers {
        Kilometers(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kg_to_tonnes() {
        let tn: Tonnes = Kilograms(12_500.0).into();
        assert!((tn.0 - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_tonnes_arithmetic() {
        let total = Tonnes(8.0) + Tonnes(4.5);
        assert!((total.0 - 12.5).abs() < 1e-9);
        let gap = Tonnes(20.0) - total;
        assert!((gap.0 - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Tonnes(26.0)).unwrap();
        assert_eq!(json, "26.0");
        let back: Tonnes = serde_json::from_str("26.0").unwrap();
        assert_eq!(back, Tonnes(26.0));
    }
}
