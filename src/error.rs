//! Error taxonomy for CSR event handling
//!
//! Every variant is detected before any registry mutation and returned to
//! the execution layer as a recoverable error; the enclosing transaction
//! is then treated as failed with this reason. Nothing here panics and
//! nothing retries: re-running a deterministic validation against
//! unchanged state would reproduce the same failure.

use crate::decoder::DecodeError;
use crate::Address;

pub type CsrResult<T> = Result<T, CsrError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("address {address:#x} is not a smart contract")]
    NotAContract { address: Address },
    #[error("contract {address:#x} is already registered to a CSR")]
    AlreadyRegistered { address: Address },
    #[error("receiver {address:#x} does not exist")]
    InvalidReceiver { address: Address },
    #[error("no CSR found for nft id {id}")]
    RecordNotFound { id: u64 },
}
