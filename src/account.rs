//! Account classification and beneficiary derivation seams
//!
//! Both collaborators the handler needs from the host chain are narrow
//! traits: a read-only world-state view that classifies addresses, and the
//! chain's canonical address-to-account-identifier transform. The handler
//! never touches the account model directly, so this core stays decoupled
//! from any specific EVM state implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Address;

/// Classification of an address against the current world-state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountClass {
    /// No account record at this address.
    Nonexistent,
    /// Account exists but carries no executable code.
    ExternallyOwned,
    /// Account exists and carries executable code.
    Contract,
}

impl AccountClass {
    /// An account record exists at the address, with or without code.
    pub fn exists(self) -> bool {
        !matches!(self, AccountClass::Nonexistent)
    }

    pub fn is_contract(self) -> bool {
        matches!(self, AccountClass::Contract)
    }
}

/// Read-only view of the world state for the transaction being processed.
///
/// `classify` must answer from the snapshot visible at the point of the
/// call: state as of this point in block execution, never a cached or
/// stale view.
pub trait StateReader {
    fn classify(&self, address: Address) -> AccountClass;
}

/// Chain-native identifier of the account entitled to a revenue share.
///
/// Opaque to this core: the registry stores it, the handler derives it
/// exactly once at registration, and nothing here interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Beneficiary(String);

impl Beneficiary {
    pub fn new(id: impl Into<String>) -> Self {
        Beneficiary(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Beneficiary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The chain's canonical address-to-account-identifier transform.
///
/// Must be deterministic and injective: two distinct receiver addresses
/// may never map to the same beneficiary, and every node must derive the
/// same beneficiary for the same receiver. The concrete encoding is
/// chain-specific and injected by the host.
pub trait AccountCodec {
    fn account_id(&self, address: Address) -> Beneficiary;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_class_exists() {
        assert!(!AccountClass::Nonexistent.exists());
        assert!(AccountClass::ExternallyOwned.exists());
        assert!(AccountClass::Contract.exists());
    }

    #[test]
    fn test_account_class_is_contract() {
        assert!(!AccountClass::Nonexistent.is_contract());
        assert!(!AccountClass::ExternallyOwned.is_contract());
        assert!(AccountClass::Contract.is_contract());
    }
}
