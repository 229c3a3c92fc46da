//! Domain types for the LN Markets ledger sync service.
//!
//! This module provides:
//! - Canonical ledger entry types (profit, investment, withdrawal) with
//!   deterministic import ids
//! - Credential types: per-set API credentials, named credential sets, and
//!   the per-user credential collection

pub mod credentials;
pub mod ledger;

pub use credentials::{ApiCredentials, CredentialCollection, CredentialSet, Network};
pub use ledger::{
    iso_day, AmountUnit, DateSource, InvestmentRecord, ProfitRecord, WithdrawalKind,
    WithdrawalRecord,
};
