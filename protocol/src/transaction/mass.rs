//! Mass and fee calculation.
//!
//! **Compute mass** is what the fee pays for:
//!
//! ```text
//! mass = encoded_len * 1
//!      + Σ_outputs (2 + script_len) * 10
//!      + Σ_inputs sig_op_count * 1000
//! ```
//!
//! The fee is compute mass (1 sompi per unit) plus a small safety buffer,
//! measured on a copy carrying placeholder signature scripts of the real
//! signed length.
//!
//! **Storage mass** (harmonic formula) is a validity check, not a charge:
//!
//! ```text
//! storage = max(0, C·Σ 1/out − C·Σ 1/in)
//! ```
//!
//! When either side has at most two entries both sides use the harmonic sum.
//! Otherwise the input side uses the arithmetic-mean form `C·n²/Σin`.
//! Zero values are dropped from both sides before summing.

use crate::config::MassParams;
use crate::error::{EngineError, Result};

use super::encoding::encoded_len;
use super::types::{SpentOutput, Transaction};

/// Mass calculator bound to one set of network parameters.
#[derive(Debug, Clone, Copy)]
pub struct MassCalculator {
    params: MassParams,
}

impl MassCalculator {
    pub fn new(params: MassParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MassParams {
        &self.params
    }

    /// Compute mass of `tx` exactly as encoded, signature scripts included.
    pub fn compute_mass(&self, tx: &Transaction) -> Result<u64> {
        let size = mul(encoded_len(tx) as u64, self.params.mass_per_tx_byte)?;

        let mut script_bytes = 0u64;
        for output in &tx.outputs {
            let len = 2 + output.script_public_key.script.len() as u64;
            script_bytes = add(script_bytes, len)?;
        }
        let script_mass = mul(script_bytes, self.params.mass_per_script_pub_key_byte)?;

        let sig_ops = tx.inputs.iter().map(|i| u64::from(i.sig_op_count)).sum::<u64>();
        let sig_op_mass = mul(sig_ops, self.params.mass_per_sig_op)?;

        add(add(size, script_mass)?, sig_op_mass)
    }

    /// Compute mass of `tx` once every input carries a signature.
    pub fn signed_compute_mass(&self, tx: &Transaction) -> Result<u64> {
        self.compute_mass(&tx.with_placeholder_signatures())
    }

    /// Fee that pays for [`MassCalculator::signed_compute_mass`] plus the buffer.
    pub fn required_fee(&self, tx: &Transaction) -> Result<u64> {
        add(self.signed_compute_mass(tx)?, self.params.fee_safety_buffer)
    }

    /// Storage mass for the given input and output values.
    pub fn storage_mass(&self, input_amounts: &[u64], output_amounts: &[u64]) -> u64 {
        storage_mass(self.params.storage_mass_parameter, input_amounts, output_amounts)
    }

    /// Storage mass of `tx` spending `spent`.
    pub fn transaction_storage_mass(&self, tx: &Transaction, spent: &[SpentOutput]) -> u64 {
        let inputs: Vec<u64> = spent.iter().map(|s| s.amount).collect();
        let outputs: Vec<u64> = tx.outputs.iter().map(|o| o.value).collect();
        self.storage_mass(&inputs, &outputs)
    }
}

impl Default for MassCalculator {
    fn default() -> Self {
        Self::new(MassParams::default())
    }
}

fn add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(EngineError::AmountOverflow)
}

fn mul(a: u64, b: u64) -> Result<u64> {
    a.checked_mul(b).ok_or(EngineError::AmountOverflow)
}

/// Harmonic storage mass with parameter `c`. Saturates at `u64::MAX`.
pub fn storage_mass(c: u64, input_amounts: &[u64], output_amounts: &[u64]) -> u64 {
    let c = u128::from(c);
    let inputs: Vec<u128> = input_amounts.iter().filter(|&&v| v > 0).map(|&v| u128::from(v)).collect();
    let outputs: Vec<u128> = output_amounts.iter().filter(|&&v| v > 0).map(|&v| u128::from(v)).collect();

    let harmonic_outputs = outputs.iter().fold(0u128, |acc, v| acc.saturating_add(c / v));

    let relaxed = inputs.len() <= 2 || outputs.len() <= 2;
    let input_side = if relaxed {
        inputs.iter().fold(0u128, |acc, v| acc.saturating_add(c / v))
    } else {
        let n = inputs.len() as u128;
        let total: u128 = inputs.iter().sum();
        c.saturating_mul(n).saturating_mul(n) / total
    };

    u64::try_from(harmonic_outputs.saturating_sub(input_side)).unwrap_or(u64::MAX)
}
