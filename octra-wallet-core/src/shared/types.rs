use serde::{Deserialize, Serialize};

// Basic types for session state
pub type Address = String;
pub type TxHash = String;
pub type Nonce = u64;

/// Presentation surface the session is bound to. The popup binds the
/// extension-scoped storage backend, the expanded view binds browser-local
/// storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    Popup,
    Expanded,
}

impl SurfaceMode {
    pub fn parse(value: &str) -> Self {
        match value {
            "expanded" => SurfaceMode::Expanded,
            _ => SurfaceMode::Popup,
        }
    }
}

// Theme preference persisted alongside the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

// Transaction types - shape received from the query endpoint, plus the
// tagged record this core hands to the surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Sent,
    Received,
}

impl TxDirection {
    /// Tag a transaction relative to the owning wallet. The comparison is
    /// case-insensitive; the endpoint does not normalize address casing.
    pub fn classify(from: &str, owner: &str) -> Self {
        if crate::shared::utils::addresses_match(from, owner) {
            TxDirection::Sent
        } else {
            TxDirection::Received
        }
    }
}

/// Raw transaction as returned by the history endpoint. All fields are
/// required; records that fail to decode are quarantined by the cache.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTransaction {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub amount: f64,
    pub timestamp: u64,
    pub status: TransactionStatus,
}

/// Transaction record with the derived direction filled in.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub amount: f64,
    pub timestamp: u64,
    pub status: TransactionStatus,
    pub direction: TxDirection,
}

impl TransactionRecord {
    /// Build a tagged record from a wire transaction and the owning wallet
    /// address. Deterministic: same (from, owner) pair, same direction.
    pub fn tag(tx: WireTransaction, owner: &str) -> Self {
        let direction = TxDirection::classify(&tx.from, owner);
        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            amount: tx.amount,
            timestamp: tx.timestamp,
            status: tx.status,
            direction,
        }
    }
}

/// Balance and nonce for one wallet as of the last successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSnapshot {
    pub balance: f64,
    pub nonce: Nonce,
    pub fetched_at: u64,
}

impl BalanceSnapshot {
    pub fn new(balance: f64, nonce: Nonce) -> Self {
        Self {
            balance,
            nonce,
            fetched_at: crate::shared::utils::current_timestamp(),
        }
    }
}

/// Per-field fetch state machine: Empty -> Loading -> Ready | Failed.
/// Balance and history each run this machine independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Empty,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

// Result type for better error handling
pub type WalletResult<T> = Result<T, crate::shared::error::WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_classification() {
        assert_eq!(TxDirection::classify("oct1abc", "oct1abc"), TxDirection::Sent);
        assert_eq!(TxDirection::classify("oct1abc", "oct1xyz"), TxDirection::Received);
    }

    #[test]
    fn test_direction_classification_ignores_case() {
        assert_eq!(TxDirection::classify("OCT1ABC", "oct1abc"), TxDirection::Sent);
        assert_eq!(TxDirection::classify("oct1Abc", "OCT1abC"), TxDirection::Sent);
    }

    #[test]
    fn test_transaction_status_decoding() {
        let status: TransactionStatus = serde_json::from_str("\"pending\"")
            .expect("Failed to decode status");
        assert_eq!(status, TransactionStatus::Pending);
    }

    #[test]
    fn test_wire_transaction_requires_all_fields() {
        let missing_status = serde_json::json!({
            "hash": "deadbeef",
            "from": "oct1abc",
            "to": "oct1xyz",
            "amount": 1.5,
            "timestamp": 1700000000u64
        });
        assert!(serde_json::from_value::<WireTransaction>(missing_status).is_err());
    }

    #[test]
    fn test_tagging_preserves_fields() {
        let wire = WireTransaction {
            hash: "deadbeef".to_string(),
            from: "oct1abc".to_string(),
            to: "oct1xyz".to_string(),
            amount: 2.25,
            timestamp: 1700000000,
            status: TransactionStatus::Confirmed,
        };
        let record = TransactionRecord::tag(wire, "oct1xyz");

        assert_eq!(record.hash, "deadbeef");
        assert_eq!(record.amount, 2.25);
        assert_eq!(record.direction, TxDirection::Received);
    }

    #[test]
    fn test_fetch_state_accessors() {
        let state: FetchState<u64> = FetchState::Ready(7);
        assert!(state.is_ready());
        assert_eq!(state.as_ready(), Some(&7));

        let failed: FetchState<u64> = FetchState::Failed("boom".to_string());
        assert!(failed.is_failed());
        assert_eq!(failed.as_ready(), None);
    }

    #[test]
    fn test_theme_default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
    }
}
