//! Core type definitions for ledger transactions.
//!
//! These are value objects: built per call, never persisted, and compared by
//! content. Byte fields serialize as lowercase hex so JSON fixtures stay
//! readable.
//!
//! Input and output order is positional. Input `i` signs against spent output
//! `i`, so nothing in this module ever reorders a vector it was given.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::{
    DEFAULT_SEQUENCE, DEFAULT_SIG_OP_COUNT, SCRIPT_PUBLIC_KEY_VERSION, SUBNETWORK_ID_LENGTH, TX_VERSION,
};
use crate::crypto::hash::Hash32;
use crate::crypto::signatures::placeholder_signature_script;

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// 32-byte transaction identifier.
///
/// Stored in hash order. Displayed, parsed and serialized byte-reversed, the
/// way block explorers and nodes print ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TransactionId(pub Hash32);

impl TransactionId {
    pub const fn from_bytes(bytes: Hash32) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash32 {
        &self.0
    }

    /// Byte-reversed lowercase hex.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Parses the display form produced by [`TransactionId::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

impl FromStr for TransactionId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Outpoint
// ---------------------------------------------------------------------------

/// Reference to one output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl Outpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}

// ---------------------------------------------------------------------------
// ScriptPublicKey
// ---------------------------------------------------------------------------

/// Versioned locking script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPublicKey {
    pub version: u16,
    #[serde(with = "hex")]
    pub script: Vec<u8>,
}

impl ScriptPublicKey {
    pub fn new(version: u16, script: Vec<u8>) -> Self {
        Self { version, script }
    }

    /// A version-0 script, the only version this engine produces.
    pub fn from_script(script: Vec<u8>) -> Self {
        Self::new(SCRIPT_PUBLIC_KEY_VERSION, script)
    }
}

// ---------------------------------------------------------------------------
// SubnetworkId
// ---------------------------------------------------------------------------

/// 20-byte subnetwork identifier. All zeros is the native subnetwork.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubnetworkId(pub [u8; SUBNETWORK_ID_LENGTH]);

impl SubnetworkId {
    pub const NATIVE: Self = Self([0u8; SUBNETWORK_ID_LENGTH]);

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn as_bytes(&self) -> &[u8; SUBNETWORK_ID_LENGTH] {
        &self.0
    }

    /// Accepts exactly [`SUBNETWORK_ID_LENGTH`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; SUBNETWORK_ID_LENGTH]>::try_from(bytes).ok().map(Self)
    }
}

impl fmt::Debug for SubnetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubnetworkId({})", hex::encode(self.0))
    }
}

impl Serialize for SubnetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for SubnetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; SUBNETWORK_ID_LENGTH];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// Unspent / spent outputs
// ---------------------------------------------------------------------------

/// A spendable output as reported by the caller's UTXO source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentOutput {
    pub outpoint: Outpoint,
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
    #[serde(default)]
    pub is_coinbase: bool,
}

impl UnspentOutput {
    /// The parts of this output a signature commits to.
    pub fn spent_output(&self) -> SpentOutput {
        SpentOutput {
            amount: self.amount,
            script_public_key: self.script_public_key.clone(),
        }
    }
}

/// Amount and locking script of the output an input consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpentOutput {
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
}

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub previous_outpoint: Outpoint,
    /// Empty until the input is signed.
    #[serde(with = "hex")]
    pub signature_script: Vec<u8>,
    pub sequence: u64,
    pub sig_op_count: u8,
}

impl TransactionInput {
    /// An unsigned pay-to-public-key input spending `outpoint`.
    pub fn unsigned(outpoint: Outpoint) -> Self {
        Self {
            previous_outpoint: outpoint,
            signature_script: Vec::new(),
            sequence: DEFAULT_SEQUENCE,
            sig_op_count: DEFAULT_SIG_OP_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub value: u64,
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { value, script_public_key }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: SubnetworkId,
    pub gas: u64,
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
}

impl Transaction {
    /// An empty version-0 native transaction.
    pub fn new() -> Self {
        Self {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            subnetwork_id: SubnetworkId::NATIVE,
            gas: 0,
            payload: Vec::new(),
        }
    }

    /// Copy of this transaction with every signature script replaced by a
    /// zero-filled script of the real signed length, for fee sizing.
    pub fn with_placeholder_signatures(&self) -> Self {
        let mut sized = self.clone();
        let placeholder = placeholder_signature_script();
        for input in &mut sized.inputs {
            input.signature_script = placeholder.clone();
        }
        sized
    }

    /// Copy of this transaction with every signature script cleared.
    pub fn without_signatures(&self) -> Self {
        let mut unsigned = self.clone();
        for input in &mut unsigned.inputs {
            input.signature_script.clear();
        }
        unsigned
    }

    pub fn is_fully_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(|i| !i.signature_script.is_empty())
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
