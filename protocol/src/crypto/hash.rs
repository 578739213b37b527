//! # Keyed Hashing
//!
//! The ledger hashes everything with 32-byte BLAKE2b, domain-separated by
//! putting an ASCII tag in the **key** slot of the primitive (not the
//! personalization slot). Getting this wrong produces digests that look
//! plausible and never validate on-chain.
//!
//! [`KeyedHasher`] also carries the little-endian field writers the sighash
//! preimage is built from, so callers feed typed fields instead of
//! hand-assembling byte buffers.

use blake2b_simd::{Params, State};

/// 32-byte digest.
pub type Hash32 = [u8; 32];

/// All-zero digest, used as the payload hash of native transactions without payload.
pub const ZERO_HASH: Hash32 = [0u8; 32];

/// Domain key of the per-input signing digest and all of its sub-hashes.
pub const TRANSACTION_SIGNING_HASH_KEY: &[u8] = b"TransactionSigningHash";

/// Domain key of the transaction identifier.
pub const TRANSACTION_ID_KEY: &[u8] = b"TransactionID";

/// Incremental 32-byte BLAKE2b keyed with a domain tag.
#[derive(Clone)]
pub struct KeyedHasher {
    state: State,
}

impl KeyedHasher {
    /// Creates a hasher keyed with `key`. Keys longer than 64 bytes are
    /// rejected by BLAKE2b; all domain tags in this crate are well below that.
    pub fn new(key: &[u8]) -> Self {
        let state = Params::new().hash_length(32).key(key).to_state();
        Self { state }
    }

    /// Hasher for the signing digest domain.
    pub fn signing() -> Self {
        Self::new(TRANSACTION_SIGNING_HASH_KEY)
    }

    /// Hasher for the transaction identifier domain.
    pub fn transaction_id() -> Self {
        Self::new(TRANSACTION_ID_KEY)
    }

    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.state.update(data.as_ref());
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.update([value])
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.update(value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.update(value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.update(value.to_le_bytes())
    }

    /// Writes a `u64` little-endian length prefix followed by the bytes.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_u64(bytes.len() as u64).update(bytes)
    }

    pub fn finalize(&self) -> Hash32 {
        let digest = self.state.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(digest.as_bytes());
        out
    }
}

/// One-shot keyed hash of `data`.
pub fn keyed_hash(key: &[u8], data: &[u8]) -> Hash32 {
    KeyedHasher::new(key).update(data).finalize()
}
