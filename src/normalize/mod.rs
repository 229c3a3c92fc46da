//! Conversion of raw LN Markets records into canonical ledger entries.
//!
//! Validation failures (missing id, missing or non-positive amount) are
//! per-record errors the caller surfaces without aborting the batch.
//! Missing or malformed timestamps are never errors: the entry gets the
//! import time and a `Fallback` date source.

pub mod timestamp;

use crate::domain::{iso_day, InvestmentRecord, ProfitRecord, WithdrawalKind, WithdrawalRecord};
use crate::lnmarkets::records::{RawDeposit, RawId, RawTrade, RawWithdrawal};
use self::timestamp::{pick_timestamp, Priority};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{kind} record is missing an id")]
    MissingId { kind: &'static str },
    #[error("{kind} record {id} is missing an amount")]
    MissingAmount { kind: &'static str, id: String },
    #[error("{kind} record {id} has a non-positive amount ({amount})")]
    NonPositiveAmount {
        kind: &'static str,
        id: String,
        amount: i64,
    },
}

// A closed trade's economically relevant date is its close date. An open
// trade has none yet, so the most precise available field wins instead.
const TRADE_CLOSED_PRIORITY: Priority<RawTrade> = &[
    ("closed_at", |t| t.closed_at.as_ref()),
    ("ts", |t| t.ts.as_ref()),
    ("updated_at", |t| t.updated_at.as_ref()),
    ("created_at", |t| t.created_at.as_ref()),
];

const TRADE_OPEN_PRIORITY: Priority<RawTrade> = &[
    ("ts", |t| t.ts.as_ref()),
    ("closed_at", |t| t.closed_at.as_ref()),
    ("updated_at", |t| t.updated_at.as_ref()),
    ("created_at", |t| t.created_at.as_ref()),
];

// `ts` is the newer high-precision field, `created_at` the traditional
// fallback, `updated_at` the weakest signal of "when it happened".
const DEPOSIT_PRIORITY: Priority<RawDeposit> = &[
    ("ts", |d| d.ts.as_ref()),
    ("created_at", |d| d.created_at.as_ref()),
    ("updated_at", |d| d.updated_at.as_ref()),
];

const WITHDRAWAL_PRIORITY: Priority<RawWithdrawal> = &[
    ("ts", |w| w.ts.as_ref()),
    ("created_at", |w| w.created_at.as_ref()),
    ("updated_at", |w| w.updated_at.as_ref()),
];

fn require_id(id: Option<&RawId>, kind: &'static str) -> Result<String, NormalizeError> {
    let canonical = id
        .map(RawId::canonical)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingId { kind })?;
    Ok(canonical)
}

fn require_positive(
    amount: Option<i64>,
    kind: &'static str,
    id: &str,
) -> Result<u64, NormalizeError> {
    let value = amount.ok_or_else(|| NormalizeError::MissingAmount {
        kind,
        id: id.to_string(),
    })?;
    if value <= 0 {
        return Err(NormalizeError::NonPositiveAmount {
            kind,
            id: id.to_string(),
            amount: value,
        });
    }
    Ok(value as u64)
}

/// Normalize a closed position into a profit/loss entry.
///
/// `pl` carries the sign: positive is profit, negative is loss. A zero or
/// absent P/L has no ledger meaning and is rejected.
pub fn normalize_trade(raw: &RawTrade) -> Result<ProfitRecord, NormalizeError> {
    let id = require_id(raw.id.as_ref(), "trade")?;
    let pl = raw.pl.ok_or_else(|| NormalizeError::MissingAmount {
        kind: "trade",
        id: id.clone(),
    })?;
    if pl == 0 {
        return Err(NormalizeError::NonPositiveAmount {
            kind: "trade",
            id,
            amount: 0,
        });
    }

    let priority = if raw.closed == Some(true) && raw.closed_at.is_some() {
        TRADE_CLOSED_PRIORITY
    } else {
        TRADE_OPEN_PRIORITY
    };
    let (at, date_source) = pick_timestamp(raw, priority);

    Ok(ProfitRecord::new(
        id,
        iso_day(at),
        pl.unsigned_abs(),
        pl > 0,
        date_source,
    ))
}

/// Normalize a deposit into an investment entry.
pub fn normalize_deposit(raw: &RawDeposit) -> Result<InvestmentRecord, NormalizeError> {
    let id = require_id(raw.id.as_ref(), "deposit")?;
    let amount = require_positive(raw.amount, "deposit", &id)?;
    let (at, date_source) = pick_timestamp(raw, DEPOSIT_PRIORITY);

    Ok(InvestmentRecord::new(id, iso_day(at), amount, date_source))
}

/// Normalize a withdrawal entry, classifying its settlement network.
pub fn normalize_withdrawal(raw: &RawWithdrawal) -> Result<WithdrawalRecord, NormalizeError> {
    let id = require_id(raw.id.as_ref(), "withdrawal")?;
    let amount = require_positive(raw.amount, "withdrawal", &id)?;
    let (at, date_source) = pick_timestamp(raw, WITHDRAWAL_PRIORITY);

    let txid = raw
        .txid
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let kind = classify_withdrawal(raw.kind.as_deref(), txid.as_deref());
    let fee = raw.fee.filter(|f| *f > 0).unwrap_or(0) as u64;

    Ok(WithdrawalRecord::new(
        id,
        iso_day(at),
        amount,
        fee,
        kind,
        txid,
        date_source,
    ))
}

/// Lightning only when the upstream says so; on-chain when indicated or a
/// transaction id exists; on-chain when ambiguous.
fn classify_withdrawal(kind: Option<&str>, txid: Option<&str>) -> WithdrawalKind {
    if let Some(k) = kind {
        let k = k.to_ascii_lowercase();
        if k.contains("lightning") || k == "ln" {
            return WithdrawalKind::Lightning;
        }
        if k.contains("chain") {
            return WithdrawalKind::Onchain;
        }
    }
    if txid.is_some() {
        return WithdrawalKind::Onchain;
    }
    WithdrawalKind::Onchain
}
