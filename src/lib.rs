pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod lnmarkets;
pub mod normalize;
pub mod sync;
pub mod vault;

pub use config::Config;
pub use domain::{
    ApiCredentials, CredentialCollection, CredentialSet, InvestmentRecord, Network, ProfitRecord,
    WithdrawalKind, WithdrawalRecord,
};
pub use error::AppError;
pub use lnmarkets::{ApiError, LnMarketsApi, LnMarketsClient, MockLnMarketsApi};
pub use sync::{HistoryImporter, ImportReport};
pub use vault::{CredentialVault, VaultError};
