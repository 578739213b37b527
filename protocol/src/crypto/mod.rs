//! # Cryptographic Primitives
//!
//! Everything the engine signs or hashes goes through here:
//!
//! - **BLAKE2b-256, keyed** for transaction ids and signing digests. The
//!   domain tag goes into the key slot.
//! - **Schnorr over secp256k1** (BIP-340, x-only keys) for input signatures.
//! - A **cipher seam** for message bodies. Encryption itself is a collaborator
//!   supplied by the caller.
//!
//! All of it is a thin typed wrapper around `blake2b_simd` and `secp256k1`.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use encryption::{EncryptedMessage, MessageCipher};
pub use hash::{keyed_hash, Hash32, KeyedHasher, ZERO_HASH};
pub use keys::{parse_x_only_public_key, SigningKey};
pub use signatures::{parse_signature_script, sign_digest, signature_script, verify_digest};
