//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] assembles an unsigned [`Transaction`] from the
//! outputs chosen by selection: one input per spent output, in the order
//! given, each with sequence 0, one signature operation and an empty
//! signature script.
//!
//! The builder does not size fees or sign. Fees come from
//! [`super::mass`], signatures from [`super::signing`]. That keeps
//! construction testable without key material.

use crate::config::TX_VERSION;

use super::types::{
    ScriptPublicKey, SubnetworkId, Transaction, TransactionInput, TransactionOutput, UnspentOutput,
};

/// Fluent builder for unsigned [`Transaction`] values.
///
/// ```rust
/// use ciph_protocol::transaction::TransactionBuilder;
/// use ciph_protocol::transaction::types::ScriptPublicKey;
///
/// let tx = TransactionBuilder::new()
///     .output(20_000_000, ScriptPublicKey::from_script(vec![0x51]))
///     .payload(b"ciph_msg:1:handshake:".to_vec())
///     .build();
///
/// assert_eq!(tx.outputs.len(), 1);
/// assert!(tx.inputs.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    version: u16,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    lock_time: u64,
    subnetwork_id: SubnetworkId,
    gas: u64,
    payload: Vec<u8>,
}

impl TransactionBuilder {
    /// Defaults: version 0, native subnetwork, no lock time, no gas, empty payload.
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

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Adds an unsigned input spending `utxo`.
    pub fn input(mut self, utxo: &UnspentOutput) -> Self {
        self.inputs.push(TransactionInput::unsigned(utxo.outpoint));
        self
    }

    /// Adds one unsigned input per entry of `utxos`, preserving order.
    pub fn inputs<'a>(mut self, utxos: impl IntoIterator<Item = &'a UnspentOutput>) -> Self {
        self.inputs
            .extend(utxos.into_iter().map(|u| TransactionInput::unsigned(u.outpoint)));
        self
    }

    pub fn output(mut self, value: u64, script_public_key: ScriptPublicKey) -> Self {
        self.outputs.push(TransactionOutput::new(value, script_public_key));
        self
    }

    pub fn lock_time(mut self, lock_time: u64) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn subnetwork_id(mut self, subnetwork_id: SubnetworkId) -> Self {
        self.subnetwork_id = subnetwork_id;
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Consumes the builder and produces the unsigned transaction.
    pub fn build(self) -> Transaction {
        Transaction {
            version: self.version,
            inputs: self.inputs,
            outputs: self.outputs,
            lock_time: self.lock_time,
            subnetwork_id: self.subnetwork_id,
            gas: self.gas,
            payload: self.payload,
        }
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
