//! # Signing Keys
//!
//! Private keys enter the engine as caller-owned bytes and live here only for
//! the duration of one build call. [`SigningKey`] is the scoped holder: the
//! secret is copied into zeroizing scratch storage only long enough to derive
//! the secp256k1 keypair, and the keypair is wiped when the holder goes out of
//! scope, on every return path including early `?` exits.
//!
//! Key bytes are never logged and `SigningKey` deliberately has no `Debug`
//! output beyond its public half.

use std::fmt;

use secp256k1::{Keypair, XOnlyPublicKey, SECP256K1};
use zeroize::Zeroizing;

use crate::error::{EngineError, Result};

/// Length of a secp256k1 secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of an x-only (BIP-340) public key.
pub const X_ONLY_PUBLIC_KEY_LENGTH: usize = 32;

/// A transient secp256k1 signing key that erases itself on drop.
pub struct SigningKey {
    keypair: Keypair,
}

impl SigningKey {
    /// Copies `bytes` into zeroizing storage and derives the keypair.
    ///
    /// The caller remains responsible for its own copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(EngineError::InvalidPrivateKey);
        }
        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        secret.copy_from_slice(bytes);
        let keypair =
            Keypair::from_seckey_slice(SECP256K1, &secret[..]).map_err(|_| EngineError::InvalidPrivateKey)?;
        Ok(Self { keypair })
    }

    /// The x-only public key matching this secret.
    pub fn x_only_public_key(&self) -> XOnlyPublicKey {
        self.keypair.x_only_public_key().0
    }

    /// Serialized x-only public key.
    pub fn x_only_public_key_bytes(&self) -> [u8; X_ONLY_PUBLIC_KEY_LENGTH] {
        self.x_only_public_key().serialize()
    }

    pub(crate) fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.keypair.non_secure_erase();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("public_key", &hex::encode(self.x_only_public_key_bytes()))
            .finish_non_exhaustive()
    }
}

/// Parses a 32-byte x-only public key.
pub fn parse_x_only_public_key(bytes: &[u8]) -> Option<XOnlyPublicKey> {
    XOnlyPublicKey::from_slice(bytes).ok()
}
