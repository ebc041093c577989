//! CSR registry keyed by program id, with a contract-ownership index
//!
//! Records are created by Register events and only ever extended by Attach
//! events; nothing here deletes. The registry also maintains a derived
//! index from contract address to owning id, because the global-uniqueness
//! check runs on every registration attempt and must not scan all records.
//!
//! Both maps are `BTreeMap` so iteration order is deterministic across
//! nodes. Serialization of records is delegated to the host's storage
//! layer; [`CsrRegistry::from_records`] rebuilds the index when records are
//! loaded back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::Beneficiary;
use crate::Address;

/// One revenue-share record
///
/// Invariants upheld by the handler and registry together:
/// - `beneficiary` is fixed at creation and never rewritten.
/// - `contracts` is append-only and order-preserving; the first element is
///   the contract supplied at registration.
/// - A contract address appears in at most one record across the entire
///   registry, for all time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csr {
    /// Program id, minted externally by the Turnstile. Never generated here.
    pub id: u64,
    pub beneficiary: Beneficiary,
    pub contracts: Vec<Address>,
}

impl Csr {
    /// A fresh record as minted by a Register event.
    pub fn new(id: u64, beneficiary: Beneficiary, contract: Address) -> Self {
        Csr {
            id,
            beneficiary,
            contracts: vec![contract],
        }
    }
}

/// Registry of CSR records for one transaction's execution context.
///
/// Owned by the execution layer; handed to the [`EventHandler`] by mutable
/// reference for the duration of a call. Transaction-level rollback is the
/// caller's snapshot mechanism, not this type's concern.
///
/// [`EventHandler`]: crate::handler::EventHandler
#[derive(Debug, Clone)]
pub struct CsrRegistry {
    /// The single trusted contract whose events this core acts on.
    turnstile: Address,
    csrs: BTreeMap<u64, Csr>,
    owner_by_contract: BTreeMap<Address, u64>,
}

impl CsrRegistry {
    pub fn new(turnstile: Address) -> Self {
        CsrRegistry {
            turnstile,
            csrs: BTreeMap::new(),
            owner_by_contract: BTreeMap::new(),
        }
    }

    /// Rebuild a registry from persisted records, restoring the derived
    /// contract-ownership index.
    pub fn from_records(turnstile: Address, records: impl IntoIterator<Item = Csr>) -> Self {
        let mut registry = Self::new(turnstile);
        for csr in records {
            registry.set(csr);
        }
        registry
    }

    /// The configured trusted Turnstile address.
    pub fn turnstile_address(&self) -> Address {
        self.turnstile
    }

    pub fn get(&self, id: u64) -> Option<&Csr> {
        self.csrs.get(&id)
    }

    /// Insert or overwrite the record at `csr.id`.
    ///
    /// Used both for creation and for persisting an appended-contract
    /// mutation. Overwrite is unconditional; when a record is replaced its
    /// old contracts are unindexed first so the ownership index never holds
    /// stale entries.
    pub fn set(&mut self, csr: Csr) {
        if let Some(prev) = self.csrs.get(&csr.id) {
            for contract in &prev.contracts {
                self.owner_by_contract.remove(contract);
            }
        }
        for contract in &csr.contracts {
            self.owner_by_contract.insert(*contract, csr.id);
        }
        self.csrs.insert(csr.id, csr);
    }

    /// Whether `address` appears in any record's contract list, under any
    /// id. Index lookup; never a scan.
    pub fn is_contract_registered(&self, address: Address) -> bool {
        self.owner_by_contract.contains_key(&address)
    }

    /// The id owning `address`, if it is registered.
    pub fn owner_of(&self, address: Address) -> Option<u64> {
        self.owner_by_contract.get(&address).copied()
    }

    /// All records, ordered by id.
    pub fn csrs(&self) -> impl Iterator<Item = &Csr> {
        self.csrs.values()
    }

    pub fn len(&self) -> usize {
        self.csrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csrs.is_empty()
    }
}
