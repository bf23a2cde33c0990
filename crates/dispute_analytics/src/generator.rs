// Rust guideline compliant 2026-08-24

//! Synthetic dispute-portfolio generator for demo runs.
//!
//! Produces a randomized but realistic record set: weighted statuses, reason
//! categories, networks, and MIDs; dates spread over the trailing window;
//! and a deliberate fraction of undated records and absent SLA deadlines so
//! the engine's leniency paths get exercised on every run.

use chrono::{Duration, NaiveDate};
use domain::{CardNetwork, CaseType, DisputeRecord, DisputeStatus};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use trends::MidVolume;

/// Reason-category pool; fraud first so it shows up in every demo portfolio.
const REASON_CATEGORIES: &[(&str, &str)] = &[
    ("Fraudulent Transaction", "10.4"),
    ("Product Not Received", "13.1"),
    ("Credit Not Processed", "13.6"),
    ("Duplicate Processing", "12.6"),
    ("Cancelled Recurring", "13.2"),
];

/// Demo merchant pool: `(mid, alias, network, monthly settled txns, settled $)`.
///
/// Volumes are tuned so the resulting VAMP tiers span healthy through
/// excessive; the last merchant has no side-table entry at all (tier unknown).
const MERCHANTS: &[(&str, &str, &str, Option<(u64, f64)>)] = &[
    ("MID-1001", "Acme Outdoors", "Visa", Some((60_000, 4_100_000.0))),
    ("MID-1002", "Blue Harbor Travel", "Mastercard", Some((9_000, 2_350_000.0))),
    ("MID-1003", "Cobalt Digital", "Visa", Some((3_500, 210_000.0))),
    ("MID-1004", "Delta Homewares", "Amex", Some((25_000, 1_100_000.0))),
    ("MID-1005", "Evergreen Subscriptions", "Discover", None),
];

const STATUSES: &[DisputeStatus] = &[
    DisputeStatus::New,
    DisputeStatus::InProgress,
    DisputeStatus::Submitted,
    DisputeStatus::AwaitingDecision,
    DisputeStatus::Won,
    DisputeStatus::Won,
    DisputeStatus::Lost,
    DisputeStatus::NotFought,
];

const CASE_TYPES: &[CaseType] = &[
    CaseType::FirstChargeback,
    CaseType::FirstChargeback,
    CaseType::FirstChargeback,
    CaseType::SecondChargeback,
    CaseType::PreArbitration,
    CaseType::Arbitration,
    CaseType::RetrievalRequest,
];

/// Generates a randomized dispute portfolio plus its transaction side-table.
#[derive(Debug)]
pub struct PortfolioGenerator {
    rng: StdRng,
}

impl PortfolioGenerator {
    /// Create a generator. `seed = Some(s)` reproduces the same portfolio;
    /// `None` seeds from the OS.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Generate `count` dispute records dated within the trailing
    /// `window_months` months ending at `now`.
    pub fn generate(
        &mut self,
        count: usize,
        now: NaiveDate,
        window_months: usize,
    ) -> Vec<DisputeRecord> {
        let span_days = i64::try_from(window_months).unwrap_or(6) * 30;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let mut bytes = [0u8; 16];
            self.rng.fill_bytes(&mut bytes);
            let case_id = format!("CB-{}", uuid::Builder::from_random_bytes(bytes).into_uuid());

            let (category, code) = REASON_CATEGORIES[self.rng.random_range(0..REASON_CATEGORIES.len())];
            let (mid, alias, network, _) = MERCHANTS[self.rng.random_range(0..MERCHANTS.len())];
            let status = STATUSES[self.rng.random_range(0..STATUSES.len())];
            let case_type = CASE_TYPES[self.rng.random_range(0..CASE_TYPES.len())];

            // Integer cents avoids float-rounding during generation.
            let amount = f64::from(self.rng.random_range(500u32..=800_000u32)) / 100.0;

            // ~4% of records arrive with no usable date at all.
            let chargeback_date = if self.rng.random_bool(0.96) {
                Some(now - Duration::days(self.rng.random_range(0..span_days)))
            } else {
                None
            };
            // Open cases usually carry an SLA deadline; ~25% do not.
            let sla_deadline = if status.is_closed() || self.rng.random_bool(0.25) {
                None
            } else {
                Some(now + Duration::days(self.rng.random_range(-5..21)))
            };

            records.push(DisputeRecord {
                case_id,
                status,
                fought_decision: None,
                chargeback_amount: amount,
                chargeback_amount_usd: None,
                chargeback_date,
                created_date: chargeback_date.map(|d| d + Duration::days(1)),
                sla_deadline,
                reason_code: Some(code.to_owned()),
                reason_category: Some(category.to_owned()),
                card_network: CardNetwork::parse(network),
                card_type: Some(if self.rng.random_bool(0.7) { "credit" } else { "debit" }.to_owned()),
                case_type,
                merchant_id: Some(mid.to_owned()),
                merchant_alias: Some(alias.to_owned()),
                missing_evidence: self.rng.random_bool(0.2),
            });
        }
        records
    }

    /// Side-table of settled transaction volume per demo merchant.
    ///
    /// In production this is operator-entered per reporting period; the demo
    /// uses the fixed volumes from the merchant pool. Merchants with no
    /// volume entry are deliberately absent so the unknown-tier path shows
    /// up in the report.
    #[must_use]
    pub fn side_table() -> HashMap<String, MidVolume> {
        MERCHANTS
            .iter()
            .filter_map(|&(mid, _, _, volume)| {
                volume.map(|(transaction_count, transaction_amount_usd)| {
                    (
                        mid.to_owned(),
                        MidVolume {
                            transaction_count,
                            transaction_amount_usd,
                            processor: Some("DemoPay".to_owned()),
                        },
                    )
                })
            })
            .collect()
    }
}
