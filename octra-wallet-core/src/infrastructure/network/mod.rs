//! Remote query endpoint client
//!
//! This module contains the collaborator boundary for balance/nonce and
//! transaction history queries. The endpoint internals are external to this
//! core; only the interface and the wire decoding live here.

use crate::shared::constants::ENDPOINT_TIMEOUT_MS;
use crate::shared::error::WalletError;
use crate::shared::types::{BalanceSnapshot, WalletResult, WireTransaction};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Balance/nonce and history queries consumed by the account cache.
///
/// No ordering is assumed for the returned history; direction tagging is
/// applied later by the cache, not by the endpoint.
#[async_trait]
pub trait AccountEndpoint: Send + Sync {
    async fn fetch_balance(&self, address: &str) -> WalletResult<BalanceSnapshot>;

    async fn transaction_history(&self, address: &str) -> WalletResult<Vec<WireTransaction>>;
}

#[derive(Debug, Deserialize)]
struct WireBalance {
    balance: f64,
    nonce: u64,
}

fn balance_from_wire(wire: WireBalance) -> WalletResult<BalanceSnapshot> {
    if wire.balance < 0.0 || !wire.balance.is_finite() {
        return Err(WalletError::endpoint(format!(
            "Endpoint returned invalid balance: {}",
            wire.balance
        )));
    }
    Ok(BalanceSnapshot::new(wire.balance, wire.nonce))
}

/// Decode a history response, quarantining malformed records. Each element
/// is decoded independently; failures are logged and skipped instead of
/// failing the whole fetch or leaking undefined fields downstream.
fn decode_history(body: serde_json::Value) -> WalletResult<Vec<WireTransaction>> {
    let items = body
        .as_array()
        .ok_or_else(|| WalletError::endpoint("History response is not an array"))?;

    let mut transactions = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<WireTransaction>(item.clone()) {
            Ok(tx) => transactions.push(tx),
            Err(err) => {
                log::warn!("Quarantined malformed history record: {}", err);
            }
        }
    }
    Ok(transactions)
}

/// HTTP client for the chain query endpoint.
pub struct ChainClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChainClient {
    pub fn new(base_url: impl Into<String>) -> WalletResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(ENDPOINT_TIMEOUT_MS))
            .build()
            .map_err(|e| WalletError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AccountEndpoint for ChainClient {
    async fn fetch_balance(&self, address: &str) -> WalletResult<BalanceSnapshot> {
        let url = format!("{}/balance/{}", self.base_url, address);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WalletError::endpoint(format!("Failed to query balance: {}", e)))?
            .error_for_status()?;

        let wire: WireBalance = resp
            .json()
            .await
            .map_err(|e| WalletError::endpoint(format!("Invalid balance response: {}", e)))?;

        balance_from_wire(wire)
    }

    async fn transaction_history(&self, address: &str) -> WalletResult<Vec<WireTransaction>> {
        let url = format!("{}/tx_history/{}", self.base_url, address);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WalletError::endpoint(format!("Failed to query history: {}", e)))?
            .error_for_status()?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| WalletError::endpoint(format!("Invalid history response: {}", e)))?;

        decode_history(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::TransactionStatus;
    use serde_json::json;

    #[test]
    fn test_balance_decoding() {
        let snapshot = balance_from_wire(WireBalance {
            balance: 12.5,
            nonce: 7,
        })
        .expect("Failed to convert balance");

        assert_eq!(snapshot.balance, 12.5);
        assert_eq!(snapshot.nonce, 7);
    }

    #[test]
    fn test_balance_rejects_negative() {
        let result = balance_from_wire(WireBalance {
            balance: -1.0,
            nonce: 0,
        });
        assert!(matches!(result, Err(WalletError::Endpoint(_))));
    }

    #[test]
    fn test_history_decoding_quarantines_malformed_records() {
        let body = json!([
            {
                "hash": "aa11",
                "from": "oct1abc",
                "to": "oct1xyz",
                "amount": 1.0,
                "timestamp": 1700000000u64,
                "status": "confirmed"
            },
            { "hash": "bb22" },
            {
                "hash": "cc33",
                "from": "oct1xyz",
                "to": "oct1abc",
                "amount": 0.5,
                "timestamp": 1700000100u64,
                "status": "pending"
            }
        ]);

        let transactions = decode_history(body).expect("Failed to decode history");

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].hash, "aa11");
        assert_eq!(transactions[0].status, TransactionStatus::Confirmed);
        assert_eq!(transactions[1].hash, "cc33");
    }

    #[test]
    fn test_history_must_be_an_array() {
        let result = decode_history(json!({ "transactions": [] }));
        assert!(matches!(result, Err(WalletError::Endpoint(_))));
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let client = ChainClient::new("https://octra.network/")
            .expect("Failed to build client");
        assert_eq!(client.base_url, "https://octra.network");
    }
}
