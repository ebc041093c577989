//! Register/Attach event handling
//!
//! The only component with side effects on the registry. Each operation is
//! decode → validate → mutate, with every check running before the single
//! `set` so a failure leaves the registry byte-for-byte unchanged.
//!
//! Validation order is part of the contract, not an implementation detail:
//! contract-validity before uniqueness, uniqueness before receiver or
//! record existence. Every node must classify the same malformed input
//! with the same error, and tests assert specific failure reasons.

use crate::account::{AccountCodec, StateReader};
use crate::decoder::TurnstileDecoder;
use crate::error::{CsrError, CsrResult};
use crate::storage::{Csr, CsrRegistry};
use crate::Address;

/// Handles the two Turnstile event kinds for one transaction.
///
/// Holds explicit per-transaction handles: the world-state snapshot, the
/// chain's account codec, and the registry. No ambient singletons; the
/// execution layer constructs one of these per transaction and drops it
/// when the transaction's effects are processed.
pub struct EventHandler<'a, S, C> {
    state: &'a S,
    codec: &'a C,
    registry: &'a mut CsrRegistry,
    decoder: TurnstileDecoder,
}

impl<'a, S: StateReader, C: AccountCodec> EventHandler<'a, S, C> {
    pub fn new(state: &'a S, codec: &'a C, registry: &'a mut CsrRegistry) -> Self {
        EventHandler {
            state,
            codec,
            registry,
            decoder: TurnstileDecoder::new(),
        }
    }

    /// Process a `Register(contract, receiver, id)` payload.
    ///
    /// Creates the CSR record for `id` with `contract` as its only member
    /// and the beneficiary derived from `receiver`. Fails without mutation
    /// when `contract` is not a smart contract, when `contract` is already
    /// registered under any id, or when `receiver` has no account.
    pub fn register_event(&mut self, data: &[u8]) -> CsrResult<()> {
        let event = self.decoder.decode_register(data)?;

        if !self.state.classify(event.contract).is_contract() {
            tracing::debug!(
                target: "turnstile_csr::handler",
                contract = %addr_hex(event.contract),
                nft_id = event.id,
                "Register rejected: address is not a smart contract"
            );
            return Err(CsrError::NotAContract {
                address: event.contract,
            });
        }

        if self.registry.is_contract_registered(event.contract) {
            tracing::debug!(
                target: "turnstile_csr::handler",
                contract = %addr_hex(event.contract),
                nft_id = event.id,
                "Register rejected: contract already registered"
            );
            return Err(CsrError::AlreadyRegistered {
                address: event.contract,
            });
        }

        // Receiver may be an EOA or a contract; only nonexistence fails.
        if !self.state.classify(event.receiver).exists() {
            tracing::debug!(
                target: "turnstile_csr::handler",
                receiver = %addr_hex(event.receiver),
                nft_id = event.id,
                "Register rejected: receiver account does not exist"
            );
            return Err(CsrError::InvalidReceiver {
                address: event.receiver,
            });
        }

        let beneficiary = self.codec.account_id(event.receiver);
        self.registry
            .set(Csr::new(event.id, beneficiary, event.contract));

        tracing::debug!(
            target: "turnstile_csr::handler",
            contract = %addr_hex(event.contract),
            nft_id = event.id,
            "Registered CSR"
        );
        Ok(())
    }

    /// Process an `Attach(contract, id)` payload.
    ///
    /// Appends `contract` to the existing record for `id`, preserving all
    /// prior contracts and their order. Fails without mutation when
    /// `contract` is not a smart contract, when it is already registered
    /// under any id, or when no record exists for `id`.
    pub fn update_event(&mut self, data: &[u8]) -> CsrResult<()> {
        let event = self.decoder.decode_attach(data)?;

        if !self.state.classify(event.contract).is_contract() {
            tracing::debug!(
                target: "turnstile_csr::handler",
                contract = %addr_hex(event.contract),
                nft_id = event.id,
                "Attach rejected: address is not a smart contract"
            );
            return Err(CsrError::NotAContract {
                address: event.contract,
            });
        }

        if self.registry.is_contract_registered(event.contract) {
            tracing::debug!(
                target: "turnstile_csr::handler",
                contract = %addr_hex(event.contract),
                nft_id = event.id,
                "Attach rejected: contract already registered"
            );
            return Err(CsrError::AlreadyRegistered {
                address: event.contract,
            });
        }

        let Some(csr) = self.registry.get(event.id) else {
            tracing::debug!(
                target: "turnstile_csr::handler",
                nft_id = event.id,
                "Attach rejected: no CSR at this nft id"
            );
            return Err(CsrError::RecordNotFound { id: event.id });
        };

        let mut csr = csr.clone();
        csr.contracts.push(event.contract);
        self.registry.set(csr);

        tracing::debug!(
            target: "turnstile_csr::handler",
            contract = %addr_hex(event.contract),
            nft_id = event.id,
            "Attached contract to CSR"
        );
        Ok(())
    }
}

fn addr_hex(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountClass, Beneficiary};
    use crate::decoder::{AttachEvent, RegisterEvent};
    use std::collections::HashMap;

    struct MockState {
        accounts: HashMap<Address, AccountClass>,
    }

    impl MockState {
        fn new() -> Self {
            MockState {
                accounts: HashMap::new(),
            }
        }

        fn set(&mut self, address: Address, class: AccountClass) {
            self.accounts.insert(address, class);
        }
    }

    impl StateReader for MockState {
        fn classify(&self, address: Address) -> AccountClass {
            self.accounts
                .get(&address)
                .copied()
                .unwrap_or(AccountClass::Nonexistent)
        }
    }

    struct HexCodec;

    impl AccountCodec for HexCodec {
        fn account_id(&self, address: Address) -> Beneficiary {
            Beneficiary::new(addr_hex(address))
        }
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn register(contract: Address, receiver: Address, id: u64) -> Vec<u8> {
        RegisterEvent {
            contract,
            receiver,
            id,
        }
        .encode()
    }

    fn attach(contract: Address, id: u64) -> Vec<u8> {
        AttachEvent { contract, id }.encode()
    }

    // Contract-validity is checked before uniqueness: a registered EOA
    // (possible only through state corruption, but the order must still
    // hold) reports NotAContract, not AlreadyRegistered.
    #[test]
    fn test_register_checks_contract_before_uniqueness() {
        let contract = addr(0x01);
        let mut state = MockState::new();
        state.set(contract, AccountClass::ExternallyOwned);
        let mut registry = CsrRegistry::new(addr(0xaa));
        registry.set(Csr::new(1, Beneficiary::new("b"), contract));

        let err = EventHandler::new(&state, &HexCodec, &mut registry)
            .register_event(&register(contract, addr(0x02), 2))
            .unwrap_err();
        assert_eq!(err, CsrError::NotAContract { address: contract });
    }

    // Uniqueness is checked before receiver existence.
    #[test]
    fn test_register_checks_uniqueness_before_receiver() {
        let contract = addr(0x01);
        let mut state = MockState::new();
        state.set(contract, AccountClass::Contract);
        let mut registry = CsrRegistry::new(addr(0xaa));
        registry.set(Csr::new(1, Beneficiary::new("b"), contract));

        let err = EventHandler::new(&state, &HexCodec, &mut registry)
            .register_event(&register(contract, addr(0x02), 2))
            .unwrap_err();
        assert_eq!(err, CsrError::AlreadyRegistered { address: contract });
    }

    #[test]
    fn test_update_checks_uniqueness_before_record_presence() {
        let contract = addr(0x01);
        let mut state = MockState::new();
        state.set(contract, AccountClass::Contract);
        let mut registry = CsrRegistry::new(addr(0xaa));
        registry.set(Csr::new(1, Beneficiary::new("b"), contract));

        // Id 2 has no record, but the uniqueness failure wins.
        let err = EventHandler::new(&state, &HexCodec, &mut registry)
            .update_event(&attach(contract, 2))
            .unwrap_err();
        assert_eq!(err, CsrError::AlreadyRegistered { address: contract });
    }

    #[test]
    fn test_decode_failure_leaves_registry_untouched() {
        let state = MockState::new();
        let mut registry = CsrRegistry::new(addr(0xaa));

        let err = EventHandler::new(&state, &HexCodec, &mut registry)
            .register_event(&[0u8; 95])
            .unwrap_err();
        assert!(matches!(err, CsrError::Decode(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_beneficiary_derived_from_receiver() {
        let contract = addr(0x01);
        let receiver = addr(0x02);
        let mut state = MockState::new();
        state.set(contract, AccountClass::Contract);
        state.set(receiver, AccountClass::ExternallyOwned);
        let mut registry = CsrRegistry::new(addr(0xaa));

        EventHandler::new(&state, &HexCodec, &mut registry)
            .register_event(&register(contract, receiver, 1))
            .unwrap();

        let csr = registry.get(1).unwrap();
        assert_eq!(csr.beneficiary, HexCodec.account_id(receiver));
        assert_eq!(csr.contracts, vec![contract]);
    }
}
