//! # Transaction Module
//!
//! Construction, sizing, signing and verification of ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Value types (Transaction, inputs, outputs, outpoints, ids)
//! amount.rs       Overflow-checked sums over untrusted amounts
//! encoding.rs     Canonical byte encoding and transaction id
//! mass.rs         Compute mass, fee, storage mass
//! selection.rs    Spend-all and largest-first selection, fee/change state machine
//! builder.rs      Fluent TransactionBuilder for unsigned transactions
//! sighash.rs      Per-input signing digest
//! signing.rs      Schnorr signing of every input
//! verification.rs Fail-open verification of reported transactions
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Select** inputs with [`select_all`] or [`select_for_payment`].
//! 2. **Size** the fee with [`MassCalculator::required_fee`] against a
//!    candidate built by [`TransactionBuilder`].
//! 3. **Sign** with [`sign_transaction`].
//! 4. **Identify** with [`compute_transaction_id`].
//!
//! Reported transactions from other clients go through
//! [`verify_reported_transaction`] instead.

pub mod amount;
pub mod builder;
pub mod encoding;
pub mod mass;
pub mod selection;
pub mod sighash;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::TransactionBuilder;
pub use encoding::{compute_transaction_id, encode_transaction, transaction_id};
pub use mass::MassCalculator;
pub use selection::{select_all, select_for_payment, PaymentSelection, SelectionState};
pub use sighash::{calc_schnorr_signature_hash, SigHashReusedValues};
pub use signing::sign_transaction;
pub use types::{
    Outpoint, ScriptPublicKey, SpentOutput, SubnetworkId, Transaction, TransactionId, TransactionInput,
    TransactionOutput, UnspentOutput,
};
pub use verification::{
    verify_reported_transaction, verify_transaction_signatures, ReportedInput, ReportedTransaction,
    VerificationOutcome,
};
