// Rust guideline compliant 2026-08-24

//! Plain-text report rendering for the analytics run.
//!
//! Pure formatting over the calculators' outputs; nothing here computes.
//! The MID risk table is emitted separately as CSV by `main`.

use domain::MonthBucket;
use forecaster::ForecastPoint;
use scorer::RiskAssessment;
use std::fmt::Write as _;
use trends::{MidRiskRow, TrendDirection, TrendResult};

/// Risk assessments shown in the report; the full list can be long.
const TOP_ASSESSMENTS: usize = 10;

/// Render the full text report.
#[must_use]
pub fn render(
    buckets: &[MonthBucket],
    smoothed: &[f64],
    assessments: &[RiskAssessment],
    forecast: &[ForecastPoint],
    emerging: &[TrendResult],
    mid_table: &[MidRiskRow],
) -> String {
    let mut out = String::new();
    monthly_section(&mut out, buckets, smoothed);
    risk_section(&mut out, assessments);
    forecast_section(&mut out, forecast);
    trend_section(&mut out, emerging);
    mid_section(&mut out, mid_table);
    out
}

fn monthly_section(out: &mut String, buckets: &[MonthBucket], smoothed: &[f64]) {
    let _ = writeln!(out, "== Monthly dispute volume ==");
    for (i, b) in buckets.iter().enumerate() {
        let win = b
            .win_rate()
            .map_or_else(|| "   n/a".to_owned(), |w| format!("{w:5.1}%"));
        let trend = smoothed.get(i).copied().unwrap_or(0.0);
        let _ = writeln!(
            out,
            "{}  disputes={:<4} won={:<3} lost={:<3} win_rate={} amount=${:>10.2} smoothed={trend:.1}",
            b.key.label(),
            b.count,
            b.won,
            b.lost,
            win,
            b.amount_sum,
        );
    }
    out.push('\n');
}

fn risk_section(out: &mut String, assessments: &[RiskAssessment]) {
    let _ = writeln!(out, "== Highest-risk open disputes ==");
    if assessments.is_empty() {
        let _ = writeln!(out, "(no open disputes)");
    }
    for a in assessments.iter().take(TOP_ASSESSMENTS) {
        let factors: Vec<&str> = a.factors.iter().map(|f| f.label).collect();
        let _ = writeln!(
            out,
            "{:<42} score={:<3} [{}]  {}",
            a.case_id,
            a.score,
            a.tier().as_str(),
            factors.join(", "),
        );
    }
    out.push('\n');
}

fn forecast_section(out: &mut String, forecast: &[ForecastPoint]) {
    let _ = writeln!(out, "== Forecast (optimistic / base / pessimistic) ==");
    for p in forecast {
        let _ = writeln!(
            out,
            "{}  volume {} / {} / {}   win_rate {:.1}% / {:.1}% / {:.1}%",
            p.label,
            p.volume.optimistic,
            p.volume.base,
            p.volume.pessimistic,
            p.win_rate.optimistic,
            p.win_rate.base,
            p.win_rate.pessimistic,
        );
    }
    out.push('\n');
}

fn trend_section(out: &mut String, emerging: &[TrendResult]) {
    let _ = writeln!(out, "== Emerging categories ==");
    if emerging.is_empty() {
        let _ = writeln!(out, "(no category moved >= 15% against its baseline)");
    }
    for t in emerging {
        // Rising categories are risk flags; falling ones are improvements.
        let marker = match t.direction {
            TrendDirection::Rising => "RISING ",
            TrendDirection::Falling => "falling",
        };
        let _ = writeln!(
            out,
            "{marker}  {:<28} {:+6.1}%  (baseline {:.1}/mo -> recent {:.1}/mo)",
            t.category, t.pct_change, t.baseline_avg, t.recent_avg,
        );
    }
    out.push('\n');
}

fn mid_section(out: &mut String, mid_table: &[MidRiskRow]) {
    let _ = writeln!(out, "== MID chargeback ratios (VAMP) ==");
    for row in mid_table {
        let ratio = row
            .count_ratio
            .map_or_else(|| "n/a (no txn volume)".to_owned(), |r| format!("{:.4}%", r * 100.0));
        let _ = writeln!(
            out,
            "{:<10} {:<24} {:<10} cbs={:<4} ratio={:<20} tier={}",
            row.mid,
            row.alias.as_deref().unwrap_or("-"),
            row.network.as_str(),
            row.cb_count,
            ratio,
            row.tier.as_str(),
        );
    }
    out.push('\n');
}
