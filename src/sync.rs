//! One-shot import of LN Markets account history into canonical entries.
//!
//! Fetches are sequential — the upstream allows roughly one request per
//! second — and only retryable failures (rate limit, outage) are retried,
//! with bounded exponential backoff. Normalization failures are collected
//! per record; one malformed record never aborts the batch.

use crate::domain::{ApiCredentials, InvestmentRecord, ProfitRecord, WithdrawalRecord};
use crate::lnmarkets::{ApiError, LnMarketsApi};
use crate::normalize::{normalize_deposit, normalize_trade, normalize_withdrawal};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MAX_ATTEMPTS: u32 = 3;

/// Outcome of one import run: normalized entries plus per-record failures.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub profits: Vec<ProfitRecord>,
    pub investments: Vec<InvestmentRecord>,
    pub withdrawals: Vec<WithdrawalRecord>,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Fetch-and-normalize pipeline over an [`LnMarketsApi`].
#[derive(Clone)]
pub struct HistoryImporter {
    api: Arc<dyn LnMarketsApi>,
}

impl HistoryImporter {
    pub fn new(api: Arc<dyn LnMarketsApi>) -> Self {
        Self { api }
    }

    /// Import the full trade/deposit/withdrawal history for one account.
    ///
    /// Fetch-level failures abort the run; record-level failures land in
    /// the report's `errors`.
    pub async fn import(&self, creds: &ApiCredentials) -> Result<ImportReport, ApiError> {
        let trades = with_retries(|| self.api.closed_trades(creds)).await?;
        let deposits = with_retries(|| self.api.deposit_history(creds)).await?;
        let withdrawals = with_retries(|| self.api.withdrawal_history(creds)).await?;

        let mut report = ImportReport::default();

        for trade in &trades {
            match normalize_trade(trade) {
                Ok(record) => report.profits.push(record),
                Err(e) => {
                    warn!(error = %e, "skipping trade record");
                    report.errors.push(e.to_string());
                }
            }
        }
        for deposit in &deposits {
            match normalize_deposit(deposit) {
                Ok(record) => report.investments.push(record),
                Err(e) => {
                    warn!(error = %e, "skipping deposit record");
                    report.errors.push(e.to_string());
                }
            }
        }
        for withdrawal in &withdrawals {
            match normalize_withdrawal(withdrawal) {
                Ok(record) => report.withdrawals.push(record),
                Err(e) => {
                    warn!(error = %e, "skipping withdrawal record");
                    report.errors.push(e.to_string());
                }
            }
        }

        report.imported =
            report.profits.len() + report.investments.len() + report.withdrawals.len();
        report.failed = report.errors.len();
        info!(
            imported = report.imported,
            failed = report.failed,
            "history import complete"
        );
        Ok(report)
    }
}

async fn with_retries<T, F, Fut>(mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempts = 0u32;
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    };

    retry(policy, || {
        attempts += 1;
        let attempt = attempts;
        let fut = op();
        async move {
            fut.await.map_err(|e| {
                if e.is_retryable() && attempt < MAX_ATTEMPTS {
                    warn!(attempt, error = %e, "retryable API failure, backing off");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Network;
    use crate::lnmarkets::records::{RawDeposit, RawId, RawTimestamp, RawTrade, RawWithdrawal};
    use crate::lnmarkets::MockLnMarketsApi;

    fn creds() -> ApiCredentials {
        ApiCredentials::new("k", "s", "p", Network::Mainnet)
    }

    fn valid_trade(id: u64, pl: i64) -> RawTrade {
        RawTrade {
            id: Some(RawId::Int(id)),
            pl: Some(pl),
            closed: Some(true),
            closed_at: Some(RawTimestamp::Int(1_700_000_000)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn import_collects_successes_and_failures() {
        let bad_trade = RawTrade {
            pl: Some(10),
            ..Default::default()
        };
        let api = MockLnMarketsApi::new()
            .with_trade(valid_trade(1, 100))
            .with_trade(bad_trade)
            .with_trade(valid_trade(2, -50))
            .with_deposit(RawDeposit {
                id: Some(RawId::Int(7)),
                amount: Some(50_000),
                created_at: Some(RawTimestamp::Text("2024-01-05T10:00:00Z".to_string())),
                ..Default::default()
            })
            .with_withdrawal(RawWithdrawal {
                id: Some(RawId::Int(9)),
                amount: Some(1000),
                kind: Some("lightning".to_string()),
                ts: Some(RawTimestamp::Int(1_700_000_000)),
                ..Default::default()
            });

        let importer = HistoryImporter::new(Arc::new(api));
        let report = importer.import(&creds()).await.unwrap();

        assert_eq!(report.profits.len(), 2);
        assert_eq!(report.investments.len(), 1);
        assert_eq!(report.withdrawals.len(), 1);
        assert_eq!(report.imported, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("missing an id"));
    }

    #[tokio::test]
    async fn empty_history_imports_cleanly() {
        let importer = HistoryImporter::new(Arc::new(MockLnMarketsApi::new()));
        let report = importer.import(&creds()).await.unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn non_retryable_failure_aborts_immediately() {
        let importer =
            HistoryImporter::new(Arc::new(MockLnMarketsApi::failing(ApiError::InvalidCredentials)));
        let result = importer.import(&creds()).await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn rate_limit_is_retried_then_surfaced() {
        let importer =
            HistoryImporter::new(Arc::new(MockLnMarketsApi::failing(ApiError::RateLimited)));
        let result = importer.import(&creds()).await;
        assert!(matches!(result, Err(ApiError::RateLimited)));
    }
}
