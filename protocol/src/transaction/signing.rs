//! Transaction signing with schnorr keys.
//!
//! Signing is a separate step from building so construction and fee sizing
//! stay testable without key material. Input `i` is signed against
//! `spent[i]`; the digest is computed with one shared
//! [`SigHashReusedValues`] for the whole transaction.

use tracing::debug;

use super::sighash::{calc_schnorr_signature_hash, SigHashReusedValues};
use super::types::{Transaction, UnspentOutput};
use crate::crypto::keys::SigningKey;
use crate::crypto::signatures::{sign_digest, signature_script};
use crate::error::{EngineError, Result};

/// Signs every input of `tx` in place.
///
/// `spent` must hold exactly one entry per input, in input order. Existing
/// signature scripts are overwritten.
///
/// ```rust
/// use ciph_protocol::crypto::keys::SigningKey;
/// use ciph_protocol::transaction::{sign_transaction, TransactionBuilder};
/// use ciph_protocol::transaction::types::{Outpoint, ScriptPublicKey, TransactionId, UnspentOutput};
///
/// let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
/// let utxo = UnspentOutput {
///     outpoint: Outpoint::new(TransactionId::default(), 0),
///     amount: 100_000,
///     script_public_key: ScriptPublicKey::from_script(vec![0x51]),
///     is_coinbase: false,
/// };
/// let mut tx = TransactionBuilder::new().input(&utxo).build();
///
/// sign_transaction(&mut tx, &[utxo], &key).unwrap();
/// assert!(tx.is_fully_signed());
/// ```
pub fn sign_transaction(tx: &mut Transaction, spent: &[UnspentOutput], key: &SigningKey) -> Result<()> {
    if spent.len() != tx.inputs.len() {
        return Err(EngineError::UtxoCountMismatch {
            inputs: tx.inputs.len(),
            spent: spent.len(),
        });
    }

    let reused = SigHashReusedValues::new(tx);
    let mut scripts = Vec::with_capacity(spent.len());
    for (index, utxo) in spent.iter().enumerate() {
        let digest = calc_schnorr_signature_hash(tx, index, &utxo.spent_output(), &reused)?;
        scripts.push(signature_script(&sign_digest(key, &digest)));
    }

    for (input, script) in tx.inputs.iter_mut().zip(scripts) {
        input.signature_script = script;
    }
    debug!(inputs = tx.inputs.len(), "signed transaction");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
