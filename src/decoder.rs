//! Turnstile event decoder (Register, Attach)

use crate::Address;

/// Width of one ABI-encoded word.
const WORD: usize = 32;

/// Errors produced while decoding a Turnstile event payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown Turnstile event: {name}")]
    UnknownEvent { name: String },
    #[error("{event} payload must be {expected} bytes, got {actual}")]
    InvalidLength {
        event: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{event} payload word {word} carries nonzero padding")]
    MalformedPadding { event: &'static str, word: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Register event from the Turnstile
///
/// `Register(address contract, address receiver, uint64 id)` — mints a new
/// CSR record for `id` with `contract` as its first member and `receiver`
/// as the account the revenue share is paid to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEvent {
    pub contract: Address,
    pub receiver: Address,
    pub id: u64,
}

/// Attach event from the Turnstile
///
/// `Attach(address contract, uint64 id)` — appends `contract` to the
/// existing CSR record for `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachEvent {
    pub contract: Address,
    pub id: u64,
}

/// Closed set of events this core acts on. The interface is fixed; new
/// event shapes are a chain upgrade, not a runtime extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnstileEvent {
    Register(RegisterEvent),
    Attach(AttachEvent),
}

/// Turnstile event decoder
///
/// Decodes the two Turnstile event shapes:
/// - `Register(address contract, address receiver, uint64 id)`
/// - `Attach(address contract, uint64 id)`
///
/// Payloads use the ABI non-indexed-data convention: a flat sequence of
/// 32-byte words, with an `address` right-aligned in the low 20 bytes of
/// its word and a `uint64` right-aligned in the low 8 bytes. Padding bytes
/// must be zero; a payload with nonzero padding is rejected rather than
/// truncated, so that two nodes can never disagree on what was decoded.
///
/// Decoding is pure: no state access, no side effects.
pub struct TurnstileDecoder;

impl TurnstileDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a payload for the event `name`, producing the typed variant.
    ///
    /// Unknown names are a [`DecodeError::UnknownEvent`]; the two known
    /// names defer to [`decode_register`](Self::decode_register) and
    /// [`decode_attach`](Self::decode_attach).
    pub fn decode_event(&self, name: &str, data: &[u8]) -> DecodeResult<TurnstileEvent> {
        match name {
            "Register" => Ok(TurnstileEvent::Register(self.decode_register(data)?)),
            "Attach" => Ok(TurnstileEvent::Attach(self.decode_attach(data)?)),
            other => Err(DecodeError::UnknownEvent {
                name: other.to_string(),
            }),
        }
    }

    /// Decode a `Register(address, address, uint64)` payload (96 bytes).
    pub fn decode_register(&self, data: &[u8]) -> DecodeResult<RegisterEvent> {
        check_len("Register", 3, data)?;
        Ok(RegisterEvent {
            contract: word_address("Register", data, 0)?,
            receiver: word_address("Register", data, 1)?,
            id: word_u64("Register", data, 2)?,
        })
    }

    /// Decode an `Attach(address, uint64)` payload (64 bytes).
    pub fn decode_attach(&self, data: &[u8]) -> DecodeResult<AttachEvent> {
        check_len("Attach", 2, data)?;
        Ok(AttachEvent {
            contract: word_address("Attach", data, 0)?,
            id: word_u64("Attach", data, 1)?,
        })
    }
}

impl Default for TurnstileDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterEvent {
    /// ABI-encode this event's payload, the counterpart of
    /// [`TurnstileDecoder::decode_register`]. Used by emitters and tests.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(3 * WORD);
        push_address(&mut data, self.contract);
        push_address(&mut data, self.receiver);
        push_u64(&mut data, self.id);
        data
    }
}

impl AttachEvent {
    /// ABI-encode this event's payload, the counterpart of
    /// [`TurnstileDecoder::decode_attach`].
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(2 * WORD);
        push_address(&mut data, self.contract);
        push_u64(&mut data, self.id);
        data
    }
}

fn check_len(event: &'static str, words: usize, data: &[u8]) -> DecodeResult<()> {
    let expected = words * WORD;
    if data.len() != expected {
        return Err(DecodeError::InvalidLength {
            event,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Slice out word `index`. Callers have already validated the length.
fn word(data: &[u8], index: usize) -> &[u8] {
    &data[index * WORD..(index + 1) * WORD]
}

fn word_address(event: &'static str, data: &[u8], index: usize) -> DecodeResult<Address> {
    let w = word(data, index);
    if w[..12].iter().any(|b| *b != 0) {
        return Err(DecodeError::MalformedPadding { event, word: index });
    }
    Ok(Address::from_slice(&w[12..]))
}

fn word_u64(event: &'static str, data: &[u8], index: usize) -> DecodeResult<u64> {
    let w = word(data, index);
    if w[..24].iter().any(|b| *b != 0) {
        return Err(DecodeError::MalformedPadding { event, word: index });
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&w[24..]);
    Ok(u64::from_be_bytes(raw))
}

fn push_address(data: &mut Vec<u8>, address: Address) {
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(address.as_bytes());
}

fn push_u64(data: &mut Vec<u8>, value: u64) {
    data.extend_from_slice(&[0u8; 24]);
    data.extend_from_slice(&value.to_be_bytes());
}
