//! # Commercial Summary
//!
//! Caller-facing stage layered on the engine's output: margin, payment-term
//! adjustment (cash discount or deferred surcharge) and tax, producing the
//! customer-facing final price.
//!
//! Kept separate from [`crate::quotation`] on purpose: the engine's grand
//! total is the stable base the sales side negotiates on top of.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::summary::{summarize, CommercialTerms, PaymentTerm};
//!
//! let terms = CommercialTerms {
//!     margin_pct: 12.0,
//!     payment_term: PaymentTerm::Cash { discount_pct: 2.0 },
//!     tax_pct: 21.0,
//! };
//! let summary = summarize(10_000.0, &terms).unwrap();
//! // 10000 x 1.12 x 0.98 x 1.21
//! assert!((summary.final_total - 13_280.96).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};

/// Payment-term adjustment of the final price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentTerm {
    /// No adjustment
    Standard,
    /// Cash payment earns a discount
    Cash { discount_pct: f64 },
    /// Deferred payment carries a surcharge
    Deferred { surcharge_pct: f64 },
}

impl PaymentTerm {
    /// Multiplicative factor of this term
    pub fn factor(&self) -> f64 {
        match self {
            PaymentTerm::Standard => 1.0,
            PaymentTerm::Cash { discount_pct } => 1.0 - discount_pct / 100.0,
            PaymentTerm::Deferred { surcharge_pct } => 1.0 + surcharge_pct / 100.0,
        }
    }

    fn validate(&self) -> Vec<QuoteError> {
        let pct = match self {
            PaymentTerm::Standard => return Vec::new(),
            PaymentTerm::Cash { discount_pct } => *discount_pct,
            PaymentTerm::Deferred { surcharge_pct } => *surcharge_pct,
        };
        if !(0.0..100.0).contains(&pct) {
            vec![QuoteError::configuration(
                "terms.payment_term",
                format!("percentage {pct} outside [0, 100)"),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Sales-side knobs applied to the engine's grand total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialTerms {
    /// Margin percentage on the cost base
    pub margin_pct: f64,
    pub payment_term: PaymentTerm,
    /// Tax percentage (e.g. VAT)
    pub tax_pct: f64,
}

impl CommercialTerms {
    pub fn validate(&self) -> Vec<QuoteError> {
        let mut violations = Vec::new();
        if self.margin_pct <= -100.0 || self.margin_pct > 100.0 {
            violations.push(QuoteError::configuration(
                "terms.margin_pct",
                format!("percentage {} outside (-100, 100]", self.margin_pct),
            ));
        }
        if !(0.0..100.0).contains(&self.tax_pct) {
            violations.push(QuoteError::configuration(
                "terms.tax_pct",
                format!("percentage {} outside [0, 100)", self.tax_pct),
            ));
        }
        violations.extend(self.payment_term.validate());
        violations
    }
}

/// Customer-facing price buildup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    /// The engine's grand total before tax
    pub cost_base: f64,
    pub margin_amount: f64,
    /// Signed amount of the payment-term adjustment
    pub payment_adjustment: f64,
    /// Base the tax applies to
    pub taxable_base: f64,
    pub tax_amount: f64,
    pub final_total: f64,
}

/// Apply margin, payment term and tax to the engine's grand total.
pub fn summarize(grand_total_before_tax: f64, terms: &CommercialTerms) -> QuoteResult<CustomerSummary> {
    QuoteError::from_violations(terms.validate())?;

    let with_margin = grand_total_before_tax * (1.0 + terms.margin_pct / 100.0);
    let margin_amount = with_margin - grand_total_before_tax;

    let taxable_base = with_margin * terms.payment_term.factor();
    let payment_adjustment = taxable_base - with_margin;

    let tax_amount = taxable_base * terms.tax_pct / 100.0;

    Ok(CustomerSummary {
        cost_base: grand_total_before_tax,
        margin_amount,
        payment_adjustment,
        taxable_base,
        tax_amount,
        final_total: taxable_base + tax_amount,
    })
}
