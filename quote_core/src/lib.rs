//! # quote_core - Precast Quotation Engine
//!
//! `quote_core` is the computational heart of Prequote, turning a set of
//! selected precast-concrete pieces, commercial parameters, time-indexed
//! price tables and rate schedules into a fully priced, itemized
//! quotation (materials, transport, assembly).
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Snapshot Inputs**: Index/tariff/adjustment tables are handed in
//!   per call, never read from global state, so tariff versions coexist
//!   and concurrent quotations never interfere
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::transport::billed_distance_km;
//!
//! // Carriers bill distance rounded up to 50 km steps
//! assert_eq!(billed_distance_km(37.0), 50.0);
//! ```
//!
//! ## Modules
//!
//! - [`quotation`] - Request/response types and the aggregation pipeline
//! - [`pricing`] - Three-layer material pricing (raw cost, adjustments, escalation)
//! - [`freight`] - Truck-load optimizer with false-tonnage rules
//! - [`transport`] - Distance billing and tariff lookup
//! - [`assembly`] - Crew/crane/relocation assembly costing
//! - [`indices`] - Monthly price indices and the polynomial escalation formula
//! - [`pieces`] - Piece line items and classification enums
//! - [`summary`] - Caller-facing margin / payment-term / tax stage
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod assembly;
pub mod errors;
pub mod freight;
pub mod indices;
pub mod pieces;
pub mod pricing;
pub mod quotation;
pub mod summary;
pub mod transport;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{QuoteError, QuoteResult};
pub use quotation::{calculate, CommercialParameters, QuotationRequest, QuotationResponse};
