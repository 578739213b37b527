//! # Encryption Seam
//!
//! The engine never encrypts anything itself. Message bodies are handed to a
//! [`MessageCipher`] supplied by the caller, and what comes back is treated as
//! opaque bytes: the engine frames them into a payload and never looks inside.
//!
//! Cipher failures are passed through unchanged as
//! [`EngineError::EncryptionError`](crate::error::EngineError::EncryptionError).

use std::fmt;

use secp256k1::XOnlyPublicKey;

use crate::error::{CipherError, EngineError, Result};

/// Ciphertext produced by the external cipher.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncryptedMessage(Vec<u8>);

impl EncryptedMessage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for EncryptedMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EncryptedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedMessage({} bytes)", self.0.len())
    }
}

/// Encrypts message bodies for a recipient identified by x-only public key.
pub trait MessageCipher {
    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient_public_key: &XOnlyPublicKey,
    ) -> std::result::Result<EncryptedMessage, CipherError>;
}

impl<C: MessageCipher + ?Sized> MessageCipher for &C {
    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient_public_key: &XOnlyPublicKey,
    ) -> std::result::Result<EncryptedMessage, CipherError> {
        (**self).encrypt(plaintext, recipient_public_key)
    }
}

/// Runs the cipher and maps its failure into [`EngineError::EncryptionError`].
pub(crate) fn encrypt_with<C: MessageCipher + ?Sized>(
    cipher: &C,
    plaintext: &[u8],
    recipient_public_key: &XOnlyPublicKey,
) -> Result<EncryptedMessage> {
    cipher
        .encrypt(plaintext, recipient_public_key)
        .map_err(EngineError::EncryptionError)
}
