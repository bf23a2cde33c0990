// Rust guideline compliant 2026-08-18

//! Risk scorer component -- computes a bounded 0-100 risk score per open
//! dispute from weighted, independent factors.
//!
//! Entry points: [`score_dispute`] (one record) and [`assess_portfolio`]
//! (all open records, sorted by score). Scores are pure functions of the
//! record's fields and the injected "now" date; there is no hidden state.
//!
//! Factors are additive and deliberately overlap -- they are not normalized
//! to sum to 100. The final score is capped at 100 and mapped onto
//! `domain::RiskTier` for display.

use chrono::NaiveDate;
use domain::{DisputeRecord, RiskTier};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Factor constants
// ---------------------------------------------------------------------------

/// Amount above which a dispute is high-value (USD).
pub const AMOUNT_HIGH_USD: f64 = 5_000.0;
/// Amount above which a dispute is mid-value (USD).
pub const AMOUNT_MEDIUM_USD: f64 = 1_000.0;
/// Points for a high-value dispute.
pub const POINTS_AMOUNT_HIGH: u8 = 30;
/// Points for a mid-value dispute.
pub const POINTS_AMOUNT_MEDIUM: u8 = 15;

/// Points when the SLA deadline has already passed.
pub const POINTS_SLA_OVERDUE: u8 = 35;
/// Points when the SLA deadline is 0-3 days out.
pub const POINTS_SLA_IMMINENT: u8 = 25;
/// Points when the SLA deadline is 4-7 days out.
pub const POINTS_SLA_NEAR: u8 = 10;
/// Points when no SLA deadline is recorded (unknown deadline is a risk signal).
pub const POINTS_SLA_UNKNOWN: u8 = 10;

/// Points for a fraud-coded reason category.
pub const POINTS_FRAUD_CATEGORY: u8 = 15;
/// Points for an escalated case type (pre-arbitration, arbitration).
pub const POINTS_ESCALATED_CASE: u8 = 20;
/// Points when required evidence is missing.
pub const POINTS_MISSING_EVIDENCE: u8 = 15;

/// Upper bound of the score scale.
pub const MAX_SCORE: u8 = 100;

// ---------------------------------------------------------------------------
// RiskAssessment
// ---------------------------------------------------------------------------

/// One contributing factor of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreFactor {
    /// Short human-readable factor name.
    pub label: &'static str,
    /// Points this factor contributed (pre-cap).
    pub points: u8,
}

/// Risk assessment for one open dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    /// Case identifier of the scored dispute.
    pub case_id: String,
    /// Additive score, capped at [`MAX_SCORE`].
    pub score: u8,
    /// Non-zero contributing factors, in evaluation order.
    pub factors: Vec<ScoreFactor>,
}

impl RiskAssessment {
    /// Display tier for this assessment's score.
    #[must_use]
    pub fn tier(&self) -> RiskTier {
        RiskTier::from_score(self.score)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score one dispute as of `now`.
///
/// Total function: any well-formed record gets a well-formed assessment.
/// Intended for open disputes; closed/decided records score the same way but
/// are filtered out by [`assess_portfolio`].
#[must_use]
pub fn score_dispute(record: &DisputeRecord, now: NaiveDate) -> RiskAssessment {
    let mut factors = Vec::new();
    let mut push = |label: &'static str, points: u8| {
        if points > 0 {
            factors.push(ScoreFactor { label, points });
        }
    };

    // Amount factor: USD amount when converted, raw amount otherwise.
    let amount = record.amount_usd();
    if amount > AMOUNT_HIGH_USD {
        push("high amount", POINTS_AMOUNT_HIGH);
    } else if amount > AMOUNT_MEDIUM_USD {
        push("elevated amount", POINTS_AMOUNT_MEDIUM);
    }

    // SLA factor: proximity to the response deadline.
    match record.sla_deadline {
        Some(deadline) => {
            let days = deadline.signed_duration_since(now).num_days();
            if days < 0 {
                push("SLA overdue", POINTS_SLA_OVERDUE);
            } else if days <= 3 {
                push("SLA due within 3 days", POINTS_SLA_IMMINENT);
            } else if days <= 7 {
                push("SLA due within 7 days", POINTS_SLA_NEAR);
            }
        }
        None => push("no SLA deadline on file", POINTS_SLA_UNKNOWN),
    }

    // Category factor: fraud-coded chargebacks are harder to win.
    if record.is_fraud_coded() {
        push("fraud reason category", POINTS_FRAUD_CATEGORY);
    }

    // Case-type factor: escalated stages carry procedural risk.
    if record.case_type.is_escalated() {
        push("escalated case type", POINTS_ESCALATED_CASE);
    }

    // Evidence factor.
    if record.missing_evidence {
        push("missing evidence", POINTS_MISSING_EVIDENCE);
    }

    let total: u32 = factors.iter().map(|f| u32::from(f.points)).sum();
    let score = u8::try_from(total.min(u32::from(MAX_SCORE))).unwrap_or(MAX_SCORE);
    RiskAssessment { case_id: record.case_id.clone(), score, factors }
}

/// Score every open dispute in `records` as of `now`.
///
/// Closed disputes (won, lost, not fought) are not scored. Output is sorted
/// by score descending, case id ascending on ties, so report ordering is
/// stable across runs.
#[must_use]
pub fn assess_portfolio(records: &[DisputeRecord], now: NaiveDate) -> Vec<RiskAssessment> {
    let mut assessments: Vec<RiskAssessment> = records
        .iter()
        .filter(|r| r.is_open())
        .map(|r| score_dispute(r, now))
        .collect();
    assessments.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.case_id.cmp(&b.case_id)));
    log::debug!(
        "scorer.assess_portfolio: open={} total={}",
        assessments.len(),
        records.len()
    );
    assessments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
