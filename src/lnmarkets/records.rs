//! Raw record shapes as served by the LN Markets API.
//!
//! Upstream responses are inconsistent across API revisions: identifiers
//! arrive as numbers or strings, and each record may populate any subset of
//! `ts`, `created_at`, `updated_at`, and `closed_at`, in epoch seconds,
//! epoch milliseconds, or ISO text. These types keep every field optional
//! and structurally loose; the normalizer is the single place that resolves
//! the ambiguity into canonical ledger entries.

use serde::{Deserialize, Serialize};

/// Upstream record identifier: number or string depending on API revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(u64),
    Text(String),
}

impl RawId {
    /// Canonical string form used to build stable import ids.
    pub fn canonical(&self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }
}

/// A timestamp in whatever shape the API chose to serve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

/// A closed (or still open) futures position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Realized profit/loss in sats; negative for losses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<RawTimestamp>,
}

/// A deposit into the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeposit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Amount in sats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<RawTimestamp>,
}

/// A withdrawal from the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWithdrawal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Amount in sats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Fee in sats when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<i64>,
    /// Settlement hint, e.g. "lightning" or "on-chain".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<RawTimestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<RawTimestamp>,
}
