// Rust guideline compliant 2026-08-18

//! Shared domain types for the dispute analytics engine.
//!
//! Defines `DisputeRecord` and its lenient enums (`DisputeStatus`,
//! `FoughtDecision`, `CaseType`, `CardNetwork`), the month-bucket types
//! (`MonthKey`, `MonthBucket`), the shared `RiskTier` ladder, and the
//! `ScenarioBand` wrapper used by forecast outputs. All calculator crates
//! depend on this crate; no other workspace crate is imported here.
//!
//! Upstream data quality cannot be guaranteed, so every enum parses leniently:
//! unrecognized strings map to an `Other` fallback instead of failing
//! deserialization.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Lenient enums
// ---------------------------------------------------------------------------

/// Lowercase a raw upstream label and collapse spaces/hyphens to underscores.
///
/// Shared normalization step for all lenient enum parsers.
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Lifecycle status of a dispute.
///
/// Parsed leniently: unrecognized upstream values become [`DisputeStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisputeStatus {
    /// Freshly ingested, not yet worked.
    New,
    /// Evidence collection in progress.
    InProgress,
    /// Response submitted to the network.
    Submitted,
    /// Submitted and awaiting the network's decision.
    AwaitingDecision,
    /// Decided in the merchant's favor.
    Won,
    /// Decided against the merchant.
    Lost,
    /// Merchant elected not to contest.
    NotFought,
    /// Any value not in the fixed enum (tolerated, never an error).
    Other,
}

impl DisputeStatus {
    /// Parse an upstream status string; never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "new" => Self::New,
            "in_progress" => Self::InProgress,
            "submitted" => Self::Submitted,
            "awaiting_decision" => Self::AwaitingDecision,
            "won" => Self::Won,
            "lost" => Self::Lost,
            "not_fought" => Self::NotFought,
            _ => Self::Other,
        }
    }

    /// Canonical wire string for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::AwaitingDecision => "awaiting_decision",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::NotFought => "not_fought",
            Self::Other => "other",
        }
    }

    /// `true` for decided or abandoned disputes (won, lost, not fought).
    ///
    /// Closed disputes are excluded from risk scoring.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::NotFought)
    }
}

impl Serialize for DisputeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DisputeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Whether the merchant elected to contest a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoughtDecision {
    /// Merchant is contesting the chargeback.
    Fought,
    /// Merchant accepted the chargeback.
    NotFought,
}

impl FoughtDecision {
    /// Parse an upstream decision string; `None` for anything unrecognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "fought" => Some(Self::Fought),
            "not_fought" => Some(Self::NotFought),
            _ => None,
        }
    }

    /// Canonical wire string for this decision.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fought => "fought",
            Self::NotFought => "not_fought",
        }
    }
}

impl Serialize for FoughtDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FoughtDecision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Unrecognized decisions degrade to NotFought rather than erroring;
        // the record-level field is Option so upstream blanks stay None.
        Ok(Self::parse(&raw).unwrap_or(Self::NotFought))
    }
}

/// Procedural stage of a dispute case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseType {
    /// Initial chargeback.
    FirstChargeback,
    /// Second presentment reversal.
    SecondChargeback,
    /// Pre-arbitration stage.
    PreArbitration,
    /// Network arbitration.
    Arbitration,
    /// Retrieval request (no financial movement yet).
    RetrievalRequest,
    /// Any value not in the fixed enum.
    Other,
}

impl CaseType {
    /// Parse an upstream case-type string; never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "first_chargeback" => Self::FirstChargeback,
            "second_chargeback" => Self::SecondChargeback,
            "pre_arbitration" => Self::PreArbitration,
            "arbitration" => Self::Arbitration,
            "retrieval_request" => Self::RetrievalRequest,
            _ => Self::Other,
        }
    }

    /// Display label for this case type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstChargeback => "First Chargeback",
            Self::SecondChargeback => "Second Chargeback",
            Self::PreArbitration => "Pre-Arbitration",
            Self::Arbitration => "Arbitration",
            Self::RetrievalRequest => "Retrieval Request",
            Self::Other => "Other",
        }
    }

    /// `true` for escalated stages (pre-arbitration, arbitration).
    ///
    /// Escalated cases carry more procedural risk and score higher.
    #[must_use]
    pub fn is_escalated(self) -> bool {
        matches!(self, Self::PreArbitration | Self::Arbitration)
    }
}

impl Serialize for CaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CaseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Card network that filed the chargeback.
///
/// Unknown networks classify under Visa-style monitoring thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
    /// Any value not in the fixed enum.
    Other,
}

impl CardNetwork {
    /// Parse an upstream network string; never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "visa" => Self::Visa,
            "mastercard" | "master_card" | "mc" => Self::Mastercard,
            "amex" | "american_express" => Self::Amex,
            "discover" => Self::Discover,
            _ => Self::Other,
        }
    }

    /// Display label for this network.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "Amex",
            Self::Discover => "Discover",
            Self::Other => "Other",
        }
    }
}

impl Serialize for CardNetwork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardNetwork {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

// ---------------------------------------------------------------------------
// DisputeRecord
// ---------------------------------------------------------------------------

/// Upstream tools export evidence completeness as "Yes"/"No" strings; some
/// feeds send plain booleans. Accept both.
fn de_yes_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Flag(bool),
        Text(String),
    }
    match YesNo::deserialize(deserializer)? {
        YesNo::Flag(b) => Ok(b),
        YesNo::Text(s) => Ok(matches!(normalize(&s).as_str(), "yes" | "y" | "true" | "1")),
    }
}

/// Reason category label that marks fraud-coded chargebacks.
///
/// Matched verbatim against `reason_category` by the scorer (category risk
/// factor) and the MID rollup (fraud chargeback counts).
pub const FRAUD_REASON_CATEGORY: &str = "Fraudulent Transaction";

/// A single chargeback dispute, read-only to the engine.
///
/// The engine never mutates records; every calculator takes them by reference
/// and derives fresh output. Amounts are non-negative by upstream contract,
/// dates are calendar dates when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeRecord {
    /// Upstream case identifier (opaque string).
    pub case_id: String,
    /// Lifecycle status; unrecognized values become `Other`.
    pub status: DisputeStatus,
    /// Whether the merchant elected to contest; unset when undecided.
    #[serde(default)]
    pub fought_decision: Option<FoughtDecision>,
    /// Chargeback amount in the original currency.
    #[serde(default)]
    pub chargeback_amount: f64,
    /// Chargeback amount converted to USD, when the upstream conversion ran.
    #[serde(default)]
    pub chargeback_amount_usd: Option<f64>,
    /// Date the chargeback was filed.
    #[serde(default)]
    pub chargeback_date: Option<NaiveDate>,
    /// Date the case record was created.
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    /// Date by which the merchant must respond.
    #[serde(default)]
    pub sla_deadline: Option<NaiveDate>,
    /// Network reason code (e.g. "10.4").
    #[serde(default)]
    pub reason_code: Option<String>,
    /// Human-readable reason category (e.g. "Fraudulent Transaction").
    #[serde(default)]
    pub reason_category: Option<String>,
    /// Card network that filed the chargeback.
    pub card_network: CardNetwork,
    /// Card product type (e.g. "credit", "debit").
    #[serde(default)]
    pub card_type: Option<String>,
    /// Procedural stage of the case.
    pub case_type: CaseType,
    /// Merchant identifier the chargeback was filed against.
    #[serde(default)]
    pub merchant_id: Option<String>,
    /// Human-readable merchant alias.
    #[serde(default)]
    pub merchant_alias: Option<String>,
    /// `true` when required evidence is known to be missing.
    #[serde(default, deserialize_with = "de_yes_no")]
    pub missing_evidence: bool,
}

impl DisputeRecord {
    /// USD amount for aggregation and scoring.
    ///
    /// Prefers the converted `chargeback_amount_usd`; falls back to the raw
    /// `chargeback_amount` when no conversion is present.
    #[must_use]
    pub fn amount_usd(&self) -> f64 {
        self.chargeback_amount_usd.unwrap_or(self.chargeback_amount)
    }

    /// Date used for month bucketing: chargeback date, else created date.
    ///
    /// `None` excludes the record from time-bucketed aggregates (it still
    /// counts in non-date-based rollups such as per-MID tables).
    #[must_use]
    pub fn bucket_date(&self) -> Option<NaiveDate> {
        self.chargeback_date.or(self.created_date)
    }

    /// `true` when the dispute is still in flight (eligible for risk scoring).
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.status.is_closed()
    }

    /// `true` when the reason category marks this as a fraud chargeback.
    #[must_use]
    pub fn is_fraud_coded(&self) -> bool {
        self.reason_category.as_deref() == Some(FRAUD_REASON_CATEGORY)
    }
}

// ---------------------------------------------------------------------------
// Month bucketing
// ---------------------------------------------------------------------------

/// Calendar month key `(year, month)`; ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month, always in `[1, 12]`.
    pub month: u32,
}

impl MonthKey {
    /// Month key for a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Chart/CSV label, `"YYYY-MM"`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The following calendar month.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The preceding calendar month.
    #[must_use]
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// The `n` months ending at `anchor` (inclusive), oldest first.
    ///
    /// Returns an empty vector when `n == 0`; downstream consumers rely on
    /// the result length being exactly `n` otherwise.
    #[must_use]
    pub fn trailing_window(anchor: Self, n: usize) -> Vec<Self> {
        let mut window = Vec::with_capacity(n);
        let mut key = anchor;
        for _ in 0..n {
            window.push(key);
            key = key.prev();
        }
        window.reverse();
        window
    }
}

/// Aggregated dispute activity for one calendar month.
///
/// Computed fresh on every aggregation call; never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// The month this bucket covers.
    pub key: MonthKey,
    /// Total disputes bucketed into this month.
    pub count: u64,
    /// Disputes decided in the merchant's favor.
    pub won: u64,
    /// Disputes decided against the merchant.
    pub lost: u64,
    /// Sum of USD amounts for all bucketed disputes.
    pub amount_sum: f64,
}

impl MonthBucket {
    /// Empty bucket for `key` (zero-filled months in a fixed window).
    #[must_use]
    pub fn empty(key: MonthKey) -> Self {
        Self { key, count: 0, won: 0, lost: 0, amount_sum: 0.0 }
    }

    /// Win rate in percent over decided disputes.
    ///
    /// `None` when no dispute was decided this month -- "no data" is distinct
    /// from a genuine 0% win rate and must never be coalesced.
    #[must_use]
    pub fn win_rate(&self) -> Option<f64> {
        let decided = self.won + self.lost;
        if decided == 0 {
            return None;
        }
        #[expect(clippy::cast_precision_loss, reason = "dispute counts are far below 2^52")]
        let rate = self.won as f64 / decided as f64 * 100.0;
        Some(rate)
    }
}

// ---------------------------------------------------------------------------
// Risk tiers & scenario bands
// ---------------------------------------------------------------------------

/// Display tier for a 0-100 risk score.
///
/// The boundary set (75/50/25) is a contract shared by badges and sort
/// orders in consumers; do not adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Map a 0-100 score onto its tier.
    ///
    /// Boundaries are inclusive: 75 is Critical, 50 is High, 25 is Medium.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => Self::Critical,
            50.. => Self::High,
            25.. => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Display label for this tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Pessimistic/base/optimistic values for one forecast quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioBand<T> {
    pub pessimistic: T,
    pub base: T,
    pub optimistic: T,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record() -> DisputeRecord {
        DisputeRecord {
            case_id: "CB-1".to_owned(),
            status: DisputeStatus::New,
            fought_decision: None,
            chargeback_amount: 120.0,
            chargeback_amount_usd: None,
            chargeback_date: Some(date(2026, 7, 14)),
            created_date: Some(date(2026, 7, 15)),
            sla_deadline: None,
            reason_code: Some("10.4".to_owned()),
            reason_category: Some("Fraudulent Transaction".to_owned()),
            card_network: CardNetwork::Visa,
            card_type: Some("credit".to_owned()),
            case_type: CaseType::FirstChargeback,
            merchant_id: Some("MID-001".to_owned()),
            merchant_alias: Some("Acme Store".to_owned()),
            missing_evidence: false,
        }
    }

    // ------------------------------------------------------------------
    // Lenient enum parsing
    // ------------------------------------------------------------------

    #[test]
    fn status_parse_known_values() {
        assert_eq!(DisputeStatus::parse("won"), DisputeStatus::Won);
        assert_eq!(DisputeStatus::parse("In Progress"), DisputeStatus::InProgress);
        assert_eq!(DisputeStatus::parse("awaiting_decision"), DisputeStatus::AwaitingDecision);
        assert_eq!(DisputeStatus::parse("NOT-FOUGHT"), DisputeStatus::NotFought);
    }

    #[test]
    fn status_parse_unknown_is_other_not_error() {
        assert_eq!(DisputeStatus::parse("chargeback_zombie"), DisputeStatus::Other);
        assert_eq!(DisputeStatus::parse(""), DisputeStatus::Other);
        assert!(!DisputeStatus::Other.is_closed());
    }

    #[test]
    fn status_closed_set() {
        assert!(DisputeStatus::Won.is_closed());
        assert!(DisputeStatus::Lost.is_closed());
        assert!(DisputeStatus::NotFought.is_closed());
        assert!(!DisputeStatus::Submitted.is_closed());
        assert!(!DisputeStatus::AwaitingDecision.is_closed());
    }

    #[test]
    fn case_type_escalation() {
        assert!(CaseType::parse("Pre-Arbitration").is_escalated());
        assert!(CaseType::parse("arbitration").is_escalated());
        assert!(!CaseType::parse("First Chargeback").is_escalated());
        assert_eq!(CaseType::parse("mystery"), CaseType::Other);
    }

    #[test]
    fn network_parse_aliases() {
        assert_eq!(CardNetwork::parse("MasterCard"), CardNetwork::Mastercard);
        assert_eq!(CardNetwork::parse("American Express"), CardNetwork::Amex);
        assert_eq!(CardNetwork::parse("UnionPay"), CardNetwork::Other);
    }

    // ------------------------------------------------------------------
    // Record helpers
    // ------------------------------------------------------------------

    #[test]
    fn amount_usd_prefers_converted() {
        let mut r = record();
        assert!((r.amount_usd() - 120.0).abs() < f64::EPSILON);
        r.chargeback_amount_usd = Some(98.5);
        assert!((r.amount_usd() - 98.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bucket_date_prefers_chargeback_date() {
        let mut r = record();
        assert_eq!(r.bucket_date(), Some(date(2026, 7, 14)));
        r.chargeback_date = None;
        assert_eq!(r.bucket_date(), Some(date(2026, 7, 15)));
        r.created_date = None;
        assert_eq!(r.bucket_date(), None);
    }

    #[test]
    fn open_excludes_decided() {
        let mut r = record();
        assert!(r.is_open());
        r.status = DisputeStatus::Won;
        assert!(!r.is_open());
        r.status = DisputeStatus::NotFought;
        assert!(!r.is_open());
    }

    // ------------------------------------------------------------------
    // Serde leniency
    // ------------------------------------------------------------------

    #[test]
    fn deserialize_tolerates_unknown_enums_and_yes_no() {
        let json = r#"{
            "case_id": "CB-77",
            "status": "weird_status",
            "chargeback_amount": 42.5,
            "card_network": "UnionPay",
            "case_type": "Pre-Arbitration",
            "missing_evidence": "Yes"
        }"#;
        let r: DisputeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.status, DisputeStatus::Other);
        assert_eq!(r.card_network, CardNetwork::Other);
        assert_eq!(r.case_type, CaseType::PreArbitration);
        assert!(r.missing_evidence);
        assert!(r.chargeback_amount_usd.is_none());
        assert!(r.sla_deadline.is_none());
    }

    #[test]
    fn deserialize_missing_evidence_accepts_bool_and_no() {
        let json = r#"{"case_id":"a","status":"new","chargeback_amount":1.0,
                       "card_network":"Visa","case_type":"Arbitration",
                       "missing_evidence":false}"#;
        let r: DisputeRecord = serde_json::from_str(json).unwrap();
        assert!(!r.missing_evidence);
        let json = r#"{"case_id":"a","status":"new","chargeback_amount":1.0,
                       "card_network":"Visa","case_type":"Arbitration",
                       "missing_evidence":"No"}"#;
        let r: DisputeRecord = serde_json::from_str(json).unwrap();
        assert!(!r.missing_evidence);
    }

    // ------------------------------------------------------------------
    // Month arithmetic
    // ------------------------------------------------------------------

    #[test]
    fn month_key_next_prev_wrap_year() {
        let dec = MonthKey { year: 2025, month: 12 };
        assert_eq!(dec.next(), MonthKey { year: 2026, month: 1 });
        assert_eq!(MonthKey { year: 2026, month: 1 }.prev(), dec);
    }

    #[test]
    fn trailing_window_is_oldest_first_and_exact_length() {
        let anchor = MonthKey { year: 2026, month: 2 };
        let window = MonthKey::trailing_window(anchor, 4);
        assert_eq!(window.len(), 4);
        assert_eq!(window[0], MonthKey { year: 2025, month: 11 });
        assert_eq!(window[3], anchor);
        assert!(MonthKey::trailing_window(anchor, 0).is_empty());
    }

    #[test]
    fn month_label_is_zero_padded() {
        assert_eq!(MonthKey { year: 2026, month: 3 }.label(), "2026-03");
    }

    // ------------------------------------------------------------------
    // Win rate & risk tiers
    // ------------------------------------------------------------------

    #[test]
    fn win_rate_none_when_no_decisions() {
        let bucket = MonthBucket::empty(MonthKey { year: 2026, month: 1 });
        assert!(bucket.win_rate().is_none());
    }

    #[test]
    fn win_rate_percent_over_decided() {
        let bucket = MonthBucket {
            key: MonthKey { year: 2026, month: 1 },
            count: 10,
            won: 3,
            lost: 1,
            amount_sum: 0.0,
        };
        assert!((bucket.win_rate().unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn tier_boundaries_exact() {
        assert_eq!(RiskTier::from_score(75), RiskTier::Critical);
        assert_eq!(RiskTier::from_score(74), RiskTier::High);
        assert_eq!(RiskTier::from_score(50), RiskTier::High);
        assert_eq!(RiskTier::from_score(49), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(25), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(24), RiskTier::Low);
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(100), RiskTier::Critical);
    }
}
