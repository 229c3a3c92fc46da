//! Mock LN Markets API for testing without network calls.

use super::records::{RawDeposit, RawTrade, RawWithdrawal};
use super::{ApiError, LnMarketsApi};
use crate::domain::ApiCredentials;
use async_trait::async_trait;

/// Mock API that returns predefined data, or a fixed error for every call.
#[derive(Debug, Clone, Default)]
pub struct MockLnMarketsApi {
    trades: Vec<RawTrade>,
    deposits: Vec<RawDeposit>,
    withdrawals: Vec<RawWithdrawal>,
    fail_with: Option<ApiError>,
}

impl MockLnMarketsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose every call fails with the given error.
    pub fn failing(error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn with_trade(mut self, trade: RawTrade) -> Self {
        self.trades.push(trade);
        self
    }

    pub fn with_trades(mut self, trades: Vec<RawTrade>) -> Self {
        self.trades.extend(trades);
        self
    }

    pub fn with_deposit(mut self, deposit: RawDeposit) -> Self {
        self.deposits.push(deposit);
        self
    }

    pub fn with_withdrawal(mut self, withdrawal: RawWithdrawal) -> Self {
        self.withdrawals.push(withdrawal);
        self
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LnMarketsApi for MockLnMarketsApi {
    async fn closed_trades(&self, _creds: &ApiCredentials) -> Result<Vec<RawTrade>, ApiError> {
        self.check()?;
        Ok(self.trades.clone())
    }

    async fn deposit_history(&self, _creds: &ApiCredentials) -> Result<Vec<RawDeposit>, ApiError> {
        self.check()?;
        Ok(self.deposits.clone())
    }

    async fn withdrawal_history(
        &self,
        _creds: &ApiCredentials,
    ) -> Result<Vec<RawWithdrawal>, ApiError> {
        self.check()?;
        Ok(self.withdrawals.clone())
    }

    async fn test_connection(&self, _creds: &ApiCredentials) -> Result<(), ApiError> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Network;
    use crate::lnmarkets::records::RawId;

    fn creds() -> ApiCredentials {
        ApiCredentials::new("k", "s", "p", Network::Testnet)
    }

    #[tokio::test]
    async fn mock_returns_seeded_trades() {
        let trade = RawTrade {
            id: Some(RawId::Int(1)),
            pl: Some(100),
            ..Default::default()
        };
        let mock = MockLnMarketsApi::new().with_trade(trade.clone());
        let trades = mock.closed_trades(&creds()).await.unwrap();
        assert_eq!(trades, vec![trade]);
    }

    #[tokio::test]
    async fn failing_mock_fails_every_call() {
        let mock = MockLnMarketsApi::failing(ApiError::RateLimited);
        assert!(matches!(
            mock.test_connection(&creds()).await,
            Err(ApiError::RateLimited)
        ));
        assert!(mock.deposit_history(&creds()).await.is_err());
    }
}
