//! # Prequote CLI Application
//!
//! Terminal front end for the quotation engine: builds a representative
//! request from a few prompts, runs the engine, and prints both a human
//! summary and the JSON payload an integration would consume.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use quote_core::assembly::AssemblyRates;
use quote_core::indices::{IndexSeriesSet, PolynomialFormula, PriceIndexTable, YearMonth};
use quote_core::pieces::{AdjustmentCategory, PieceLineItem};
use quote_core::pricing::AdjustmentScale;
use quote_core::quotation::{
    calculate, CommercialParameters, ComplementaryWorks, FlatCostItem, QuotationRequest,
};
use quote_core::freight::TruckProfile;
use quote_core::transport::standard_rate_table;

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn demo_request(distance_km: f64, assembly_days: u32) -> QuotationRequest {
    let mut price_indices = IndexSeriesSet::new();
    price_indices.insert(
        "general".to_string(),
        PriceIndexTable::new()
            .with_entry(YearMonth::new(2026, 1), 100.0)
            .with_entry(YearMonth::new(2026, 6), 104.5),
    );

    QuotationRequest {
        items: vec![
            PieceLineItem {
                description: "Delta beam 80".to_string(),
                unit: "ud".to_string(),
                quantity: 6,
                length_m: Some(16.0),
                weight_per_unit_tn: Some(14.2),
                unit_price: 4_850.0,
                adjustment_category: AdjustmentCategory::Especial,
                ..PieceLineItem::default()
            },
            PieceLineItem {
                description: "Column 50x50".to_string(),
                unit: "ud".to_string(),
                quantity: 12,
                length_m: Some(9.5),
                weight_per_unit_tn: Some(5.8),
                unit_price: 1_320.0,
                ..PieceLineItem::default()
            },
        ],
        base_price_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        target_price_date: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
        price_indices,
        polynomial: PolynomialFormula::single("general"),
        adjustments: AdjustmentScale::default()
            .with_category_rule(AdjustmentCategory::Especial, -15.0),
        parameters: CommercialParameters {
            general_expenses_pct: 13.0,
            enable_transport: true,
            enable_assembly: true,
            distance_km,
            assembly_days,
            crane_extra_days: 1,
            uses_extra_crane: true,
            crane_relocation_km: distance_km,
            ..CommercialParameters::default()
        },
        truck_profile: TruckProfile::default(),
        transport_rate_table: standard_rate_table().clone(),
        assembly_rates: AssemblyRates {
            crew_day_rate: 1_450.0,
            crane_day_rate: 980.0,
            crane_relocation_per_km: 6.5,
        },
        complementary_works: ComplementaryWorks {
            site_works: vec![FlatCostItem {
                description: "Joint sealing".to_string(),
                amount: 1_200.0,
            }],
            auxiliary_works: vec![FlatCostItem {
                description: "Bearing pads".to_string(),
                amount: 680.0,
            }],
        },
    }
}

fn main() {
    println!("Prequote CLI - Precast Quotation Engine");
    println!("=======================================");
    println!();
    println!("Running quotation demo (Delta beams + columns)...");
    println!();

    let distance_km = prompt_f64("Enter route distance (km) [120.0]: ", 120.0);
    let assembly_days = prompt_f64("Enter assembly days [5]: ", 5.0) as u32;

    let request = demo_request(distance_km, assembly_days);

    match calculate(&request) {
        Ok(response) => {
            println!("═══════════════════════════════════════");
            println!("  QUOTATION RESULTS");
            println!("═══════════════════════════════════════");
            println!();
            println!("Materials:");
            for line in &response.materials.per_piece_breakdown {
                println!(
                    "  {:<16} {:>3} {:<3} x {:>10.2} = {:>12.2}",
                    line.description, line.quantity, line.unit, line.unit_cost, line.total_cost
                );
            }
            println!("  Subtotal: {:.2}", response.materials.subtotal_final);
            println!();
            println!("Transport ({} km real, {} km billed):",
                response.transport.real_distance_km,
                response.transport.billed_distance_km
            );
            for load in &response.transport.per_truck_breakdown {
                println!(
                    "  Truck {:>2}: {:>2} pc, {:>5.1} tn real, {:>4.1} tn false, {:<9} {} {:>10.2}",
                    load.truck_number,
                    load.piece_count(),
                    load.real_weight_tn,
                    load.false_weight_tn,
                    load.length_category.label(),
                    if load.requires_escort { "[escort]" } else { "        " },
                    load.cost
                );
            }
            println!("  {} trips, total: {:.2}", response.transport.trip_count, response.transport.total);
            println!();
            println!("Assembly:  {:.2}", response.assembly.total);
            println!();
            println!("═══════════════════════════════════════");
            println!("  Materials:      {:>14.2}", response.totals.materials_subtotal);
            println!("  Transport:      {:>14.2}", response.totals.transport_total);
            println!("  Assembly:       {:>14.2}", response.totals.assembly_total);
            println!("  Complementary:  {:>14.2}", response.totals.complementary_total);
            println!("  Gen. expenses:  {:>14.2}", response.totals.general_expenses);
            println!("  GRAND TOTAL:    {:>14.2}  (before tax)", response.totals.grand_total_before_tax);
            println!("═══════════════════════════════════════");

            println!();
            println!("JSON Output (for integration use):");
            if let Ok(json) = serde_json::to_string_pretty(&response) {
                println!("{}", json);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
    }
}
