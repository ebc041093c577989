//! Contract-secured-revenue (CSR) registration core
//!
//! This library implements the validation and state-transition logic that
//! registers smart contracts into a revenue-sharing program keyed by a
//! numeric program id (an NFT id). Registrations are driven by events
//! emitted from a single trusted contract, the Turnstile; the execution
//! layer verifies event provenance and hands this crate the raw encoded
//! payload for each one.
//!
//! # Components
//!
//! - [`TurnstileDecoder`]: Decodes Register and Attach event payloads
//! - [`StateReader`] / [`AccountClass`]: Classifies addresses against the
//!   current world-state snapshot
//! - [`CsrRegistry`]: Keyed store of CSR records with a contract-ownership
//!   index
//! - [`EventHandler`]: Orchestrates decode, validation, and the
//!   exactly-once registry mutation
//!
//! Both handler operations are total functions of (payload, world-state
//! snapshot, registry state): no clocks, no randomness, no ambient state.
//! Every validating node processing the same transaction must reach the
//! same result, which is a consensus requirement rather than a convenience.
//!
//! # Example
//!
//! ```rust,ignore
//! use turnstile_csr::{CsrRegistry, EventHandler};
//!
//! // Per-transaction handles supplied by the execution layer.
//! let mut registry = CsrRegistry::new(turnstile_address);
//! let mut handler = EventHandler::new(&state, &codec, &mut registry);
//!
//! handler.register_event(&payload)?;
//! ```

pub mod account;
pub mod decoder;
pub mod error;
pub mod handler;
pub mod storage;

/// 20-byte EVM-style account address.
pub type Address = primitive_types::H160;

// Re-export main types for convenience
pub use account::{AccountClass, AccountCodec, Beneficiary, StateReader};
pub use decoder::{AttachEvent, DecodeError, RegisterEvent, TurnstileDecoder, TurnstileEvent};
pub use error::{CsrError, CsrResult};
pub use handler::EventHandler;
pub use storage::{Csr, CsrRegistry};
