// Rust guideline compliant 2026-08-24

//! Dispute analytics entry point.
//!
//! Runs all four calculators (aggregation, risk scoring, forecasting, trend
//! detection) over a dispute portfolio and prints a text report plus the MID
//! risk table as CSV.
//!
//! # Usage
//!
//! ```text
//! # Demo portfolio (synthetic, OS-seeded)
//! RUST_LOG=info cargo run
//!
//! # Real records: JSON array of dispute records, optional MID volume map
//! RUST_LOG=info cargo run -- disputes.json [mid_volumes.json]
//! ```

mod generator;
mod report;

use aggregator::{Aggregator, AggregatorConfig};
use anyhow::Context as _;
use domain::DisputeRecord;
use forecaster::{Forecaster, ForecasterConfig};
use generator::PortfolioGenerator;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use trends::MidVolume;

/// Trailing window for all time-bucketed analytics.
const WINDOW_MONTHS: usize = 6;
/// Forecast horizon.
const HORIZON_MONTHS: usize = 3;
/// Demo portfolio size when no records file is given.
const DEMO_RECORDS: usize = 400;

fn load_records(path: &str) -> anyhow::Result<Vec<DisputeRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open records file {path}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse records file {path}"))
}

fn load_volumes(path: &str) -> anyhow::Result<HashMap<String, MidVolume>> {
    let file = File::open(path).with_context(|| format!("failed to open volumes file {path}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse volumes file {path}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    // The engine itself never reads the clock; "now" is pinned here once.
    let now = chrono::Local::now().date_naive();

    let mut args = std::env::args().skip(1);
    let (records, volumes) = match args.next() {
        Some(path) => {
            let records = load_records(&path)?;
            let volumes = match args.next() {
                Some(vpath) => load_volumes(&vpath)?,
                None => HashMap::new(),
            };
            log::info!("main.loaded: records={} volumes={}", records.len(), volumes.len());
            (records, volumes)
        }
        None => {
            let mut generator = PortfolioGenerator::new(None);
            let records = generator.generate(DEMO_RECORDS, now, WINDOW_MONTHS);
            log::info!("main.generated: records={}", records.len());
            (records, PortfolioGenerator::side_table())
        }
    };

    let aggregator = Aggregator::new(
        AggregatorConfig::builder(WINDOW_MONTHS)
            .build()
            .context("failed to build aggregator config")?,
    );
    let forecaster = Forecaster::new(
        ForecasterConfig::builder(HORIZON_MONTHS)
            .build()
            .context("failed to build forecaster config")?,
    );

    let buckets = aggregator.by_month(&records, now);
    let smoothed = Forecaster::smoothed_volume(&buckets);
    let by_reason = aggregator.by_category(
        &records,
        |r| r.reason_category.clone().unwrap_or_else(|| "Other".to_owned()),
        now,
    );

    let assessments = scorer::assess_portfolio(&records, now);
    let forecast = forecaster.scenarios(&buckets);
    let emerging = trends::detect_emerging_trends(&by_reason);
    let rollups = aggregator::aggregate_by_mid(&records);
    let mid_table = trends::build_mid_risk_table(&rollups, &volumes);

    print!(
        "{}",
        report::render(&buckets, &smoothed, &assessments, &forecast, &emerging, &mid_table)
    );
    println!("== MID risk table (CSV) ==");
    print!("{}", trends::mid_risk_csv(&mid_table));

    Ok(())
}
