//! Error types for the transaction engine.
//!
//! Every construction, signing, and codec operation that can fail returns an
//! [`EngineError`]. Verification of externally reported transactions does not
//! use this type: it reports a [`crate::transaction::VerificationOutcome`]
//! instead, because "cannot verify" is not a failure there.

use thiserror::Error;

/// Boxed error produced by the external encryption collaborator.
pub type CipherError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors that can occur while building or signing a transaction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The address is malformed, has a bad checksum, or cannot be turned
    /// into a locking script.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress {
        /// The offending address string, as supplied by the caller.
        address: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No split of the available outputs covers amount plus fee.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount plus the smallest fee estimate seen during selection.
        required: u64,
        /// Sum of the spendable (non-coinbase) outputs considered.
        available: u64,
    },

    /// An unsigned accumulation would have wrapped.
    #[error("amount overflow while summing unsigned values")]
    AmountOverflow,

    /// A payment was requested for zero units.
    #[error("payment amount must be greater than zero")]
    InvalidAmount,

    /// The encryption collaborator failed. The cause is passed through as-is.
    #[error("encryption failed")]
    EncryptionError(#[source] CipherError),

    /// The private key bytes do not form a valid secp256k1 secret key.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// A protocol payload could not be framed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A sighash was requested for an input the transaction does not have.
    #[error("input index {index} out of range (transaction has {count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// Signing needs exactly one spent output per input.
    #[error("expected {inputs} spent outputs, got {spent}")]
    UtxoCountMismatch { inputs: usize, spent: usize },

    /// Storage mass exceeds the standard limit and enforcement is enabled.
    #[error("storage mass {mass} exceeds limit {limit}")]
    StorageMassExceeded { mass: u64, limit: u64 },

    /// The engine configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub(crate) fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}
