//! Wallet entity and related value objects
//!
//! This module contains the wallet identity record held by the session
//! collection. Key derivation and import live in an external collaborator;
//! this core only carries the resulting address and its opaque credential.

use crate::shared::error::WalletError;
use crate::shared::types::Address;
use crate::shared::utils::validate_address;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Opaque credential blob (mnemonic or private key material).
///
/// The session core never interprets the contents; it only round-trips them
/// through the persistence record. Does not expose its contents through
/// Debug, and zeroizes on drop.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(material: impl Into<String>) -> Self {
        Self(material.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hand the raw material to a signing collaborator. Deliberately the
    /// only way to read the contents.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Zeroize for Credential {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Wallet identity record: the unique address plus the credential owned
/// exclusively by this record. The address is never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: Address,
    pub credential: Credential,
}

impl WalletRecord {
    pub fn new(address: impl Into<Address>, credential: Credential) -> Result<Self, WalletError> {
        let address = address.into();
        validate_address(&address)?;

        if credential.is_empty() {
            return Err(WalletError::invalid_credential(
                "Wallet credential cannot be empty",
            ));
        }

        Ok(Self { address, credential })
    }
}
