// Rust guideline compliant 2026-08-18

//! Aggregator component -- groups dispute records into month buckets,
//! per-category time series, and per-MID rollups.
//!
//! Leaf calculator of the engine: the forecaster and trend detector both
//! consume its output. Entry points: [`Aggregator::by_month`],
//! [`Aggregator::by_category`], [`aggregate_by_mid`]. Configuration via
//! [`AggregatorConfig::builder`].
//!
//! All aggregation is pure and deterministic given the same records and
//! "now" anchor; nothing here reads the system clock or mutates its input.

use chrono::NaiveDate;
use domain::{CardNetwork, DisputeRecord, DisputeStatus, MonthBucket, MonthKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// AggregatorError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring aggregation.
///
/// Aggregation itself is total; only the config builder can fail.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    /// The supplied configuration is invalid.
    #[error("invalid aggregator configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// AggregatorConfig + builder
// ---------------------------------------------------------------------------

/// Upper bound on the trailing window, guarding against pathological input.
pub const MAX_WINDOW_MONTHS: usize = 120;

/// Upper bound on distinct category labels tracked per series map.
pub const MAX_CATEGORIES: usize = 256;

/// Runtime configuration for an [`Aggregator`].
///
/// Construct via [`AggregatorConfig::builder`].
#[derive(Debug)]
pub struct AggregatorConfig {
    /// Trailing window length in months (range: `[1, MAX_WINDOW_MONTHS]`).
    pub window_months: usize,
}

/// Builder for [`AggregatorConfig`].
///
/// Obtain via [`AggregatorConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct AggregatorConfigBuilder {
    window_months: usize,
}

impl AggregatorConfig {
    /// Create a builder. `window_months` is the only parameter.
    #[must_use]
    pub fn builder(window_months: usize) -> AggregatorConfigBuilder {
        AggregatorConfigBuilder { window_months }
    }
}

impl AggregatorConfigBuilder {
    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::InvalidConfig`] when `window_months` is zero
    /// or exceeds [`MAX_WINDOW_MONTHS`].
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<AggregatorConfig, AggregatorError> {
        if self.window_months == 0 {
            return Err(AggregatorError::InvalidConfig {
                reason: "window_months must be >= 1".to_owned(),
            });
        }
        if self.window_months > MAX_WINDOW_MONTHS {
            return Err(AggregatorError::InvalidConfig {
                reason: format!("window_months must be <= {MAX_WINDOW_MONTHS}"),
            });
        }
        Ok(AggregatorConfig { window_months: self.window_months })
    }
}

// ---------------------------------------------------------------------------
// CategoryTimeSeries
// ---------------------------------------------------------------------------

/// Per-category monthly counts over a fixed window.
///
/// Every series is exactly `window.len()` entries, aligned 1:1 to `window`
/// (oldest first). Consumers rely on that alignment and never re-check
/// lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTimeSeries {
    /// The months covered, oldest first.
    pub window: Vec<MonthKey>,
    /// Category label -> per-month counts, same length as `window`.
    ///
    /// `BTreeMap` keeps iteration order deterministic across runs.
    pub series: BTreeMap<String, Vec<u64>>,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Groups dispute records by month and by category over a trailing window.
#[derive(Debug)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create a new aggregator from `config`.
    #[must_use]
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate records into one bucket per month of the trailing window.
    ///
    /// Always returns exactly `config.window_months` buckets, oldest first,
    /// zero-filled where no record landed. A record buckets on its
    /// chargeback date, falling back to its created date; records with
    /// neither are silently excluded (they still count in [`aggregate_by_mid`]).
    #[must_use]
    pub fn by_month(&self, records: &[DisputeRecord], now: NaiveDate) -> Vec<MonthBucket> {
        let window = MonthKey::trailing_window(MonthKey::from_date(now), self.config.window_months);
        let index: HashMap<MonthKey, usize> =
            window.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        let mut buckets: Vec<MonthBucket> = window.into_iter().map(MonthBucket::empty).collect();

        let mut skipped = 0u64;
        for record in records {
            let Some(date) = record.bucket_date() else {
                skipped += 1;
                continue;
            };
            // Records outside the window are out of scope, not errors.
            let Some(&i) = index.get(&MonthKey::from_date(date)) else {
                continue;
            };
            let bucket = &mut buckets[i];
            bucket.count += 1;
            bucket.amount_sum += record.amount_usd();
            match record.status {
                DisputeStatus::Won => bucket.won += 1,
                DisputeStatus::Lost => bucket.lost += 1,
                _ => {}
            }
        }
        if skipped > 0 {
            log::debug!("aggregator.by_month: undated_records_skipped={skipped}");
        }
        buckets
    }

    /// Aggregate per-category monthly counts over the trailing window.
    ///
    /// `extractor` is a pure label function (e.g. reason category, network,
    /// or MID). Every returned series has exactly `config.window_months`
    /// entries. New labels beyond [`MAX_CATEGORIES`] are dropped with a
    /// warning rather than growing the map without bound.
    #[must_use]
    pub fn by_category<F>(
        &self,
        records: &[DisputeRecord],
        extractor: F,
        now: NaiveDate,
    ) -> CategoryTimeSeries
    where
        F: Fn(&DisputeRecord) -> String,
    {
        let window = MonthKey::trailing_window(MonthKey::from_date(now), self.config.window_months);
        let index: HashMap<MonthKey, usize> =
            window.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        let mut series: BTreeMap<String, Vec<u64>> = BTreeMap::new();

        for record in records {
            let Some(date) = record.bucket_date() else {
                continue;
            };
            let Some(&i) = index.get(&MonthKey::from_date(date)) else {
                continue;
            };
            let label = extractor(record);
            if !series.contains_key(&label) && series.len() >= MAX_CATEGORIES {
                log::warn!(
                    "aggregator.by_category: category_cap_reached max={MAX_CATEGORIES} dropped={label}"
                );
                continue;
            }
            let counts = series.entry(label).or_insert_with(|| vec![0; window.len()]);
            counts[i] += 1;
        }
        CategoryTimeSeries { window, series }
    }
}

// ---------------------------------------------------------------------------
// Per-MID rollups
// ---------------------------------------------------------------------------

/// Label under which records without a merchant id are rolled up.
pub const UNASSIGNED_MID: &str = "(unassigned)";

/// Aggregated chargeback activity for one merchant id.
///
/// Input half of the MID risk table; the trend crate joins it with the
/// externally supplied transaction-volume side-table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidRollup {
    /// Merchant identifier, or [`UNASSIGNED_MID`].
    pub mid: String,
    /// First merchant alias seen for this MID, if any.
    pub alias: Option<String>,
    /// First card network seen for this MID.
    pub network: CardNetwork,
    /// Total chargebacks filed against this MID.
    pub cb_count: u64,
    /// Sum of original-currency chargeback amounts.
    pub cb_amount: f64,
    /// Sum of USD chargeback amounts.
    pub cb_amount_usd: f64,
    /// Chargebacks whose reason category is fraud-coded.
    pub fraud_count: u64,
}

/// Roll up all records per merchant id.
///
/// Deliberately not date-filtered: a record with no parsable date still
/// belongs to its merchant's totals. Output is sorted by chargeback count
/// descending, then MID ascending, so reports are stable across runs.
#[must_use]
pub fn aggregate_by_mid(records: &[DisputeRecord]) -> Vec<MidRollup> {
    let mut rollups: BTreeMap<String, MidRollup> = BTreeMap::new();
    for record in records {
        let mid = record
            .merchant_id
            .clone()
            .unwrap_or_else(|| UNASSIGNED_MID.to_owned());
        let entry = rollups.entry(mid.clone()).or_insert_with(|| MidRollup {
            mid,
            alias: None,
            network: record.card_network,
            cb_count: 0,
            cb_amount: 0.0,
            cb_amount_usd: 0.0,
            fraud_count: 0,
        });
        if entry.alias.is_none() {
            entry.alias.clone_from(&record.merchant_alias);
        }
        entry.cb_count += 1;
        entry.cb_amount += record.chargeback_amount;
        entry.cb_amount_usd += record.amount_usd();
        if record.is_fraud_coded() {
            entry.fraud_count += 1;
        }
    }
    let mut rows: Vec<MidRollup> = rollups.into_values().collect();
    rows.sort_by(|a, b| b.cb_count.cmp(&a.cb_count).then_with(|| a.mid.cmp(&b.mid)));
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
