// Copyright (c) 2026 The Ciph Developers. MIT License.
// See LICENSE for details.

//! # Ciph Protocol: Transaction Engine
//!
//! Ciph is an encrypted messaging protocol that lives on a UTXO ledger. Every
//! message is a transaction: it moves value (or returns it to the sender) and
//! carries an encrypted body in the transaction's payload field.
//!
//! This crate is the part that has to be exactly right. It selects inputs,
//! sizes fees by consensus mass, encodes transactions canonically, computes
//! the per-input signing digest, signs with schnorr, and frames payloads. A
//! single byte of divergence from the network's own rules produces a
//! transaction the network rejects.
//!
//! ## Architecture
//!
//! - **config**: Network constants and the immutable [`EngineConfig`].
//! - **crypto**: Keyed BLAKE2b, schnorr keys and signatures, the cipher seam.
//! - **address**: Address codec and the address-to-script [`ScriptResolver`].
//! - **transaction**: Types, encoding, mass, selection, sighash, signing,
//!   verification.
//! - **messaging**: Payload framing, message bodies, and the
//!   [`MessagingEngine`] that builds all four transaction kinds.
//!
//! ## Design Philosophy
//!
//! 1. Stateless: every call gets its own outputs and keys, nothing persists.
//! 2. Every sum over untrusted amounts is overflow-checked.
//! 3. Key material is wiped when the signing scope ends, on every path.
//! 4. Verification of other clients' transactions fails open; only a
//!    definite signature mismatch rejects.

pub mod address;
pub mod config;
pub mod crypto;
pub mod error;
pub mod messaging;
pub mod transaction;

pub use address::{Address, KaspaScriptResolver, ScriptResolver};
pub use config::{EngineConfig, MassParams, NetworkType};
pub use crypto::{EncryptedMessage, MessageCipher, SigningKey};
pub use error::{EngineError, Result};
pub use messaging::{MessagingEngine, ProtocolPayload, SignedTransaction};
pub use transaction::{compute_transaction_id, verify_transaction_signatures, Transaction, VerificationOutcome};
