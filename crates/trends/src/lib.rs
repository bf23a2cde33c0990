// Rust guideline compliant 2026-08-24

//! Trend/anomaly detector component -- flags emerging dispute categories and
//! classifies per-MID chargeback ratios against card-network monitoring
//! thresholds (VAMP-style).
//!
//! Entry points: [`detect_emerging_trends`], [`classify_mid_risk`],
//! [`build_mid_risk_table`], [`mid_risk_csv`]. All functions are pure; the
//! narrative framing of rising vs. falling trends is a presentation concern
//! left to the caller.

use aggregator::{CategoryTimeSeries, MidRollup};
use domain::CardNetwork;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Detection constants
// ---------------------------------------------------------------------------

/// Months in the "recent" comparison window.
pub const RECENT_WINDOW: usize = 2;
/// Minimum series length a category needs to be trend-eligible.
pub const MIN_SERIES_LEN: usize = 4;
/// Absolute percent change at which a category counts as emerging.
pub const EMERGING_THRESHOLD_PCT: f64 = 15.0;
/// Maximum number of emerging categories reported.
pub const MAX_EMERGING: usize = 5;

/// Visa (and default) monitoring thresholds, as chargeback/transaction ratios.
pub const VISA_STANDARD_RATIO: f64 = 0.0090;
pub const VISA_EXCESSIVE_RATIO: f64 = 0.0180;
/// Mastercard monitoring thresholds.
pub const MASTERCARD_STANDARD_RATIO: f64 = 0.0100;
pub const MASTERCARD_EXCESSIVE_RATIO: f64 = 0.0150;

// ---------------------------------------------------------------------------
// Emerging-category detection
// ---------------------------------------------------------------------------

/// Direction of an emerging trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    /// Recent average above baseline (risk flag).
    Rising,
    /// Recent average below baseline (improvement note).
    Falling,
}

/// One emerging category, with the magnitudes behind the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    /// Category label (reason category, network, or MID).
    pub category: String,
    /// Mean of the last [`RECENT_WINDOW`] months.
    pub recent_avg: f64,
    /// Mean of all earlier months in the series.
    pub baseline_avg: f64,
    /// Percent change of recent vs. baseline (0 when the baseline is 0).
    pub pct_change: f64,
    /// Rising or falling.
    pub direction: TrendDirection,
}

/// Compare each category's recent window against its baseline and report the
/// strongest movers.
///
/// Categories with fewer than [`MIN_SERIES_LEN`] months are skipped entirely
/// (absence, not a zero-magnitude result). Only categories whose absolute
/// percent change reaches [`EMERGING_THRESHOLD_PCT`] are reported, sorted by
/// magnitude descending (category ascending on ties) and capped at
/// [`MAX_EMERGING`].
#[must_use]
pub fn detect_emerging_trends(series: &CategoryTimeSeries) -> Vec<TrendResult> {
    let mut results = Vec::new();
    for (category, counts) in &series.series {
        if counts.len() < MIN_SERIES_LEN {
            continue;
        }
        let split = counts.len() - RECENT_WINDOW;
        let recent_avg = mean(&counts[split..]);
        let baseline_avg = mean(&counts[..split]);
        // A zero baseline yields 0% rather than an infinite jump.
        let pct_change = if baseline_avg > 0.0 {
            (recent_avg - baseline_avg) / baseline_avg * 100.0
        } else {
            0.0
        };
        if pct_change.abs() < EMERGING_THRESHOLD_PCT {
            continue;
        }
        let direction = if pct_change > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        };
        results.push(TrendResult {
            category: category.clone(),
            recent_avg,
            baseline_avg,
            pct_change,
            direction,
        });
    }
    results.sort_by(|a, b| {
        b.pct_change
            .abs()
            .total_cmp(&a.pct_change.abs())
            .then_with(|| a.category.cmp(&b.category))
    });
    results.truncate(MAX_EMERGING);
    log::debug!(
        "trends.detect_emerging: categories={} emerging={}",
        series.series.len(),
        results.len()
    );
    results
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss, reason = "dispute counts are far below 2^52")]
    let sum = values.iter().sum::<u64>() as f64;
    #[expect(clippy::cast_precision_loss, reason = "window lengths are tiny")]
    let len = values.len() as f64;
    sum / len
}

// ---------------------------------------------------------------------------
// VAMP classification
// ---------------------------------------------------------------------------

/// Network monitoring tier for a MID's chargeback ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VampTier {
    /// No transaction volume supplied; the ratio is undefined, not zero.
    Unknown,
    /// Below the network's standard-program threshold.
    Healthy,
    /// At or above the standard threshold.
    Standard,
    /// At or above the excessive threshold.
    Excessive,
}

impl VampTier {
    /// Display label for this tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Standard => "standard",
            Self::Excessive => "excessive",
        }
    }
}

/// Standard/excessive ratio thresholds for one network.
///
/// Fixed program constants (Visa VAMP / Mastercard ECM rules); networks
/// without their own program classify under the Visa thresholds.
#[must_use]
pub fn vamp_thresholds(network: CardNetwork) -> (f64, f64) {
    match network {
        CardNetwork::Mastercard => (MASTERCARD_STANDARD_RATIO, MASTERCARD_EXCESSIVE_RATIO),
        _ => (VISA_STANDARD_RATIO, VISA_EXCESSIVE_RATIO),
    }
}

/// Chargeback ratio plus its monitoring tier for one MID.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MidRatio {
    /// `cb_count / txn_count`; `None` when transaction volume is unsupplied
    /// or zero (undefined, never coalesced to 0%).
    pub ratio: Option<f64>,
    /// Tier against the network's thresholds; `Unknown` when `ratio` is `None`.
    pub tier: VampTier,
}

/// Classify one MID's chargeback count ratio against its network's thresholds.
///
/// Threshold comparisons are boundary-inclusive: a ratio exactly at a
/// threshold lands in the higher tier.
#[must_use]
pub fn classify_mid_risk(
    network: CardNetwork,
    cb_count: u64,
    txn_count: Option<u64>,
) -> MidRatio {
    let ratio = txn_count.filter(|&t| t > 0).map(|t| {
        #[expect(clippy::cast_precision_loss, reason = "counts are far below 2^52")]
        let r = cb_count as f64 / t as f64;
        r
    });
    let tier = match ratio {
        None => VampTier::Unknown,
        Some(r) => {
            let (standard, excessive) = vamp_thresholds(network);
            if r >= excessive {
                VampTier::Excessive
            } else if r >= standard {
                VampTier::Standard
            } else {
                VampTier::Healthy
            }
        }
    };
    MidRatio { ratio, tier }
}

// ---------------------------------------------------------------------------
// MID risk table
// ---------------------------------------------------------------------------

/// Externally supplied transaction volume for one MID.
///
/// Entered by an operator per reporting period; an injected side-table, not a
/// field on the dispute record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidVolume {
    /// Settled transaction count for the period.
    pub transaction_count: u64,
    /// Settled transaction amount in USD for the period.
    pub transaction_amount_usd: f64,
    /// Acquiring processor name, when tracked.
    #[serde(default)]
    pub processor: Option<String>,
}

/// One row of the MID risk table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidRiskRow {
    pub mid: String,
    pub alias: Option<String>,
    pub processor: Option<String>,
    pub network: CardNetwork,
    /// Transaction count from the side-table; `None` when not supplied.
    pub txn_count: Option<u64>,
    /// Transaction USD amount from the side-table; `None` when not supplied.
    pub txn_amount_usd: Option<f64>,
    pub cb_count: u64,
    pub cb_amount: f64,
    pub cb_amount_usd: f64,
    pub fraud_count: u64,
    /// `cb_count / txn_count`; `None` without transaction volume.
    pub count_ratio: Option<f64>,
    /// `cb_amount_usd / txn_amount_usd`; `None` without a positive amount.
    pub amount_ratio: Option<f64>,
    pub tier: VampTier,
}

/// Join per-MID rollups with the transaction-volume side-table.
///
/// Rollup order (chargeback count descending) is preserved. MIDs missing from
/// the side-table get `None` ratios and an `Unknown` tier.
#[must_use]
pub fn build_mid_risk_table(
    rollups: &[MidRollup],
    volumes: &HashMap<String, MidVolume>,
) -> Vec<MidRiskRow> {
    rollups
        .iter()
        .map(|rollup| {
            let volume = volumes.get(&rollup.mid);
            let txn_count = volume.map(|v| v.transaction_count);
            let txn_amount_usd = volume.map(|v| v.transaction_amount_usd);
            let MidRatio { ratio: count_ratio, tier } =
                classify_mid_risk(rollup.network, rollup.cb_count, txn_count);
            let amount_ratio = txn_amount_usd
                .filter(|&a| a > 0.0)
                .map(|a| rollup.cb_amount_usd / a);
            MidRiskRow {
                mid: rollup.mid.clone(),
                alias: rollup.alias.clone(),
                processor: volume.and_then(|v| v.processor.clone()),
                network: rollup.network,
                txn_count,
                txn_amount_usd,
                cb_count: rollup.cb_count,
                cb_amount: rollup.cb_amount,
                cb_amount_usd: rollup.cb_amount_usd,
                fraud_count: rollup.fraud_count,
                count_ratio,
                amount_ratio,
                tier,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Header row of the MID risk CSV; column order is a contract.
pub const MID_RISK_CSV_HEADER: &str = "MID,Merchant Alias,Processor,Card Network,\
Transactions (Count),Transactions ($),Chargebacks (Count),Chargebacks ($),\
CB Count Ratio (%),CB Amount Ratio (%),Fraud CBs (Count),CB Amt USD,VAMP Risk Level";

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}

/// Percentage cell with 4 decimal places; empty when the ratio is undefined.
fn pct_cell(ratio: Option<f64>) -> String {
    ratio.map_or_else(String::new, |r| format!("{:.4}", r * 100.0))
}

/// Render the MID risk table as CSV (header + one row per MID).
///
/// Ratios are percentages with 4 decimal places; undefined ratios and
/// unsupplied volumes render as empty cells, never as `0`.
#[must_use]
pub fn mid_risk_csv(rows: &[MidRiskRow]) -> String {
    let mut out = String::from(MID_RISK_CSV_HEADER);
    out.push('\n');
    for row in rows {
        let cells = [
            csv_field(&row.mid),
            csv_field(row.alias.as_deref().unwrap_or("")),
            csv_field(row.processor.as_deref().unwrap_or("")),
            row.network.as_str().to_owned(),
            row.txn_count.map_or_else(String::new, |c| c.to_string()),
            row.txn_amount_usd.map_or_else(String::new, |a| format!("{a:.2}")),
            row.cb_count.to_string(),
            format!("{:.2}", row.cb_amount),
            pct_cell(row.count_ratio),
            pct_cell(row.amount_ratio),
            row.fraud_count.to_string(),
            format!("{:.2}", row.cb_amount_usd),
            row.tier.as_str().to_owned(),
        ];
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use domain::MonthKey;
    use std::collections::BTreeMap;

    fn series(entries: &[(&str, Vec<u64>)]) -> CategoryTimeSeries {
        let len = entries.first().map_or(0, |(_, v)| v.len());
        let window = MonthKey::trailing_window(MonthKey { year: 2026, month: 8 }, len);
        let series = entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect::<BTreeMap<_, _>>();
        CategoryTimeSeries { window, series }
    }

    // ------------------------------------------------------------------
    // Emerging trends
    // ------------------------------------------------------------------

    #[test]
    fn doubling_category_is_emerging_rising() {
        let ts = series(&[("Fraud", vec![10, 10, 10, 10, 20, 20])]);
        let out = detect_emerging_trends(&ts);
        assert_eq!(out.len(), 1);
        let t = &out[0];
        assert!((t.recent_avg - 20.0).abs() < 1e-9);
        assert!((t.baseline_avg - 10.0).abs() < 1e-9);
        assert!((t.pct_change - 100.0).abs() < 1e-9);
        assert_eq!(t.direction, TrendDirection::Rising);
    }

    #[test]
    fn flat_category_is_not_emerging() {
        let ts = series(&[("Flat", vec![10, 10, 10, 10, 11, 9])]);
        assert!(detect_emerging_trends(&ts).is_empty());
    }

    #[test]
    fn falling_category_reported_with_direction() {
        let ts = series(&[("Improving", vec![20, 20, 20, 20, 10, 10])]);
        let out = detect_emerging_trends(&ts);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].direction, TrendDirection::Falling);
        assert!((out[0].pct_change + 50.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_inclusive_at_15_pct() {
        // baseline 10, recent 11.5 -> exactly +15%.
        let ts = series(&[("Edge", vec![10, 10, 10, 10, 11, 12])]);
        let out = detect_emerging_trends(&ts);
        assert_eq!(out.len(), 1);
        assert!((out[0].pct_change - 15.0).abs() < 1e-9);
    }

    #[test]
    fn short_series_skipped_not_reported() {
        let ts = series(&[("Short", vec![0, 0, 40])]);
        assert!(detect_emerging_trends(&ts).is_empty());
    }

    #[test]
    fn zero_baseline_yields_zero_pct() {
        let ts = series(&[("NewCat", vec![0, 0, 0, 0, 5, 5])]);
        assert!(detect_emerging_trends(&ts).is_empty());
    }

    #[test]
    fn sorted_by_magnitude_and_capped_at_five() {
        let entries: Vec<(String, Vec<u64>)> = (0..8)
            .map(|i| {
                // Category i jumps from 10 to 10 + 2*(i+1): magnitudes 20%..160%.
                let jump = 10 + 2 * (i + 1);
                (format!("cat-{i}"), vec![10, 10, 10, 10, jump, jump])
            })
            .collect();
        let borrowed: Vec<(&str, Vec<u64>)> =
            entries.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        let out = detect_emerging_trends(&series(&borrowed));
        assert_eq!(out.len(), MAX_EMERGING);
        assert_eq!(out[0].category, "cat-7");
        for pair in out.windows(2) {
            assert!(pair[0].pct_change.abs() >= pair[1].pct_change.abs());
        }
    }

    // ------------------------------------------------------------------
    // VAMP classification
    // ------------------------------------------------------------------

    #[test]
    fn missing_volume_is_unknown_not_zero() {
        let r = classify_mid_risk(CardNetwork::Visa, 5, None);
        assert!(r.ratio.is_none());
        assert_eq!(r.tier, VampTier::Unknown);
        // Zero volume is just as undefined as absent volume.
        let r = classify_mid_risk(CardNetwork::Visa, 5, Some(0));
        assert!(r.ratio.is_none());
        assert_eq!(r.tier, VampTier::Unknown);
    }

    #[test]
    fn visa_standard_boundary_inclusive() {
        let r = classify_mid_risk(CardNetwork::Visa, 90, Some(10_000));
        assert!((r.ratio.unwrap() - 0.009).abs() < 1e-12);
        assert_eq!(r.tier, VampTier::Standard);
        let r = classify_mid_risk(CardNetwork::Visa, 89, Some(10_000));
        assert_eq!(r.tier, VampTier::Healthy);
        let r = classify_mid_risk(CardNetwork::Visa, 180, Some(10_000));
        assert_eq!(r.tier, VampTier::Excessive);
    }

    #[test]
    fn mastercard_excessive_boundary_inclusive() {
        let r = classify_mid_risk(CardNetwork::Mastercard, 150, Some(10_000));
        assert!((r.ratio.unwrap() - 0.015).abs() < 1e-12);
        assert_eq!(r.tier, VampTier::Excessive);
        let r = classify_mid_risk(CardNetwork::Mastercard, 100, Some(10_000));
        assert_eq!(r.tier, VampTier::Standard);
        let r = classify_mid_risk(CardNetwork::Mastercard, 99, Some(10_000));
        assert_eq!(r.tier, VampTier::Healthy);
    }

    #[test]
    fn unknown_network_uses_visa_thresholds() {
        let r = classify_mid_risk(CardNetwork::Other, 90, Some(10_000));
        assert_eq!(r.tier, VampTier::Standard);
        let r = classify_mid_risk(CardNetwork::Amex, 150, Some(10_000));
        assert_eq!(r.tier, VampTier::Standard); // below Visa excessive (1.8%)
    }

    // ------------------------------------------------------------------
    // MID risk table + CSV
    // ------------------------------------------------------------------

    fn rollup(mid: &str, network: CardNetwork, cb_count: u64) -> MidRollup {
        MidRollup {
            mid: mid.to_owned(),
            alias: Some("Acme, Inc".to_owned()),
            network,
            cb_count,
            cb_amount: 1_234.5,
            cb_amount_usd: 1_200.0,
            fraud_count: 2,
        }
    }

    #[test]
    fn table_joins_side_table_and_preserves_null_ratios() {
        let rollups = vec![
            rollup("MID-1", CardNetwork::Visa, 90),
            rollup("MID-2", CardNetwork::Visa, 10),
        ];
        let mut volumes = HashMap::new();
        volumes.insert(
            "MID-1".to_owned(),
            MidVolume {
                transaction_count: 10_000,
                transaction_amount_usd: 600_000.0,
                processor: Some("Stripe".to_owned()),
            },
        );
        let rows = build_mid_risk_table(&rollups, &volumes);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].tier, VampTier::Standard);
        assert!((rows[0].count_ratio.unwrap() - 0.009).abs() < 1e-12);
        assert!((rows[0].amount_ratio.unwrap() - 0.002).abs() < 1e-12);
        assert_eq!(rows[0].processor.as_deref(), Some("Stripe"));

        // No side-table entry: everything undefined, nothing coalesced to 0.
        assert!(rows[1].count_ratio.is_none());
        assert!(rows[1].amount_ratio.is_none());
        assert!(rows[1].txn_count.is_none());
        assert_eq!(rows[1].tier, VampTier::Unknown);
    }

    #[test]
    fn csv_header_matches_contract() {
        let csv = mid_risk_csv(&[]);
        assert_eq!(
            csv,
            "MID,Merchant Alias,Processor,Card Network,Transactions (Count),\
             Transactions ($),Chargebacks (Count),Chargebacks ($),CB Count Ratio (%),\
             CB Amount Ratio (%),Fraud CBs (Count),CB Amt USD,VAMP Risk Level\n"
        );
    }

    #[test]
    fn csv_row_formats_ratios_at_4_decimals_and_quotes_commas() {
        let rollups = vec![rollup("MID-1", CardNetwork::Visa, 90)];
        let mut volumes = HashMap::new();
        volumes.insert(
            "MID-1".to_owned(),
            MidVolume {
                transaction_count: 10_000,
                transaction_amount_usd: 600_000.0,
                processor: None,
            },
        );
        let rows = build_mid_risk_table(&rollups, &volumes);
        let csv = mid_risk_csv(&rows);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "MID-1,\"Acme, Inc\",,Visa,10000,600000.00,90,1234.50,0.9000,0.2000,2,1200.00,standard"
        );
    }

    #[test]
    fn csv_empty_cells_for_unknown_volume() {
        let rows = build_mid_risk_table(&[rollup("MID-9", CardNetwork::Mastercard, 3)], &HashMap::new());
        let csv = mid_risk_csv(&rows);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "MID-9,\"Acme, Inc\",,Mastercard,,,3,1234.50,,,2,1200.00,unknown");
    }
}
