//! Canonical ledger entries produced by the normalizer.
//!
//! Every entry carries a deterministic `id` derived from the upstream record
//! identifier, so re-importing the same history is idempotent and downstream
//! consumers can de-duplicate across repeated syncs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit for ledger amounts. All LN Markets history is satoshi-denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AmountUnit {
    Sats,
}

/// Where an entry's calendar date came from.
///
/// `Fallback` marks entries whose upstream record carried no parseable
/// timestamp in any of its candidate fields; the import date was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    Field,
    Fallback,
}

/// Withdrawal settlement network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalKind {
    Lightning,
    Onchain,
}

impl std::fmt::Display for WithdrawalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalKind::Lightning => write!(f, "lightning"),
            WithdrawalKind::Onchain => write!(f, "onchain"),
        }
    }
}

/// Format a UTC instant as the ISO calendar day string used on all entries.
pub fn iso_day(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn entry_id(kind: &str, original_id: &str) -> String {
    format!("lnm_{}_{}", kind, original_id)
}

/// Realized profit or loss from a closed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRecord {
    /// Stable import id: `lnm_trade_<upstream id>`.
    pub id: String,
    pub original_id: String,
    /// ISO calendar day (UTC).
    pub date: String,
    /// Magnitude of the P/L in sats; sign is carried by `is_profit`.
    pub amount: u64,
    pub unit: AmountUnit,
    pub is_profit: bool,
    pub date_source: DateSource,
}

impl ProfitRecord {
    pub fn new(
        original_id: String,
        date: String,
        amount: u64,
        is_profit: bool,
        date_source: DateSource,
    ) -> Self {
        Self {
            id: entry_id("trade", &original_id),
            original_id,
            date,
            amount,
            unit: AmountUnit::Sats,
            is_profit,
            date_source,
        }
    }
}

/// Funds deposited into the venue, treated as an investment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    /// Stable import id: `lnm_deposit_<upstream id>`.
    pub id: String,
    pub original_id: String,
    pub date: String,
    pub amount: u64,
    pub unit: AmountUnit,
    pub date_source: DateSource,
}

impl InvestmentRecord {
    pub fn new(original_id: String, date: String, amount: u64, date_source: DateSource) -> Self {
        Self {
            id: entry_id("deposit", &original_id),
            original_id,
            date,
            amount,
            unit: AmountUnit::Sats,
            date_source,
        }
    }
}

/// Funds withdrawn from the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    /// Stable import id: `lnm_withdrawal_<upstream id>`.
    pub id: String,
    pub original_id: String,
    pub date: String,
    pub amount: u64,
    pub unit: AmountUnit,
    pub fee: u64,
    #[serde(rename = "type")]
    pub kind: WithdrawalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    pub date_source: DateSource,
}

impl WithdrawalRecord {
    pub fn new(
        original_id: String,
        date: String,
        amount: u64,
        fee: u64,
        kind: WithdrawalKind,
        txid: Option<String>,
        date_source: DateSource,
    ) -> Self {
        Self {
            id: entry_id("withdrawal", &original_id),
            original_id,
            date,
            amount,
            unit: AmountUnit::Sats,
            fee,
            kind,
            txid,
            date_source,
        }
    }
}
