//! The messaging transaction engine.
//!
//! [`MessagingEngine`] turns "send this to that address" into a fully signed
//! transaction. It is stateless between calls: each build receives its own
//! unspent outputs and private key bytes, and returns a [`SignedTransaction`].
//!
//! | build                               | selection        | outputs                    |
//! |-------------------------------------|------------------|----------------------------|
//! | [`build_handshake_tx`]              | spend-all        | recipient, optional change |
//! | [`build_payment_tx`]                | largest-first    | recipient, optional change |
//! | [`build_contextual_message_tx`]     | spend-all        | sender only                |
//! | [`build_handshake_self_stash_tx`]   | spend-all        | sender only                |
//!
//! The private key is parsed into a [`SigningKey`] at the top of each build,
//! and is wiped when that value drops, on every return path.
//!
//! [`build_handshake_tx`]: MessagingEngine::build_handshake_tx
//! [`build_payment_tx`]: MessagingEngine::build_payment_tx
//! [`build_contextual_message_tx`]: MessagingEngine::build_contextual_message_tx
//! [`build_handshake_self_stash_tx`]: MessagingEngine::build_handshake_self_stash_tx

use chrono::Utc;
use secp256k1::XOnlyPublicKey;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::address::{KaspaScriptResolver, ScriptResolver};
use crate::config::EngineConfig;
use crate::crypto::encryption::{encrypt_with, EncryptedMessage, MessageCipher};
use crate::crypto::keys::SigningKey;
use crate::error::{EngineError, Result};
use crate::transaction::amount::{checked_add, checked_sum};
use crate::transaction::selection::{select_all, select_all_for_amount, select_for_payment, PaymentSelection};
use crate::transaction::verification::{verify_reported_transaction, ReportedInput, ReportedTransaction};
use crate::transaction::{
    sign_transaction, transaction_id, MassCalculator, ScriptPublicKey, SubnetworkId, Transaction,
    TransactionBuilder, TransactionId, TransactionOutput, UnspentOutput, VerificationOutcome,
};

use super::handshake::{HandshakeBackup, HandshakeMessage};
use super::payload::{PayloadKind, ProtocolPayload, SAVED_HANDSHAKE_SCOPE};
use super::payment::PaymentNote;

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A fully signed transaction, ready for submission.
///
/// `fee == Σ spent.amount − Σ transaction.outputs.value` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub transaction_id: TransactionId,
    pub fee: u64,
    pub compute_mass: u64,
    pub storage_mass: u64,
    /// The outputs consumed, one per input, in input order.
    pub spent: Vec<UnspentOutput>,
}

impl SignedTransaction {
    /// The decoded protocol payload carried by this transaction.
    pub fn payload(&self) -> Option<ProtocolPayload> {
        ProtocolPayload::decode(&self.transaction.payload)
    }

    pub fn input_total(&self) -> Result<u64> {
        checked_sum(self.spent.iter().map(|u| u.amount))
    }

    pub fn output_total(&self) -> Result<u64> {
        checked_sum(self.transaction.outputs.iter().map(|o| o.value))
    }
}

// ---------------------------------------------------------------------------
// MessagingEngine
// ---------------------------------------------------------------------------

/// Builds and signs protocol transactions.
///
/// Generic over the encryption collaborator `C` and the address resolver `R`.
#[derive(Debug, Clone)]
pub struct MessagingEngine<C, R = KaspaScriptResolver> {
    config: EngineConfig,
    cipher: C,
    resolver: R,
    mass: MassCalculator,
}

impl<C: MessageCipher> MessagingEngine<C, KaspaScriptResolver> {
    /// Engine resolving addresses of the configured network.
    pub fn new(config: EngineConfig, cipher: C) -> Result<Self> {
        let resolver = KaspaScriptResolver::new(config.network);
        Self::with_resolver(config, cipher, resolver)
    }
}

impl<C: MessageCipher, R: ScriptResolver> MessagingEngine<C, R> {
    pub fn with_resolver(config: EngineConfig, cipher: C, resolver: R) -> Result<Self> {
        config.validate()?;
        let mass = MassCalculator::new(config.mass);
        Ok(Self {
            config,
            cipher,
            resolver,
            mass,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mass_calculator(&self) -> &MassCalculator {
        &self.mass
    }

    // -- builds -------------------------------------------------------------

    /// Opens a conversation: pays the handshake amount to the recipient with
    /// an encrypted [`HandshakeMessage`]. Change, if above dust, returns to
    /// the sender.
    #[allow(clippy::too_many_arguments)]
    pub fn build_handshake_tx(
        &self,
        sender_address: &str,
        recipient_address: &str,
        alias: &str,
        conversation_id: Option<&str>,
        is_response: bool,
        sender_private_key: &[u8],
        recipient_public_key: &XOnlyPublicKey,
        utxos: &[UnspentOutput],
    ) -> Result<SignedTransaction> {
        let key = SigningKey::from_slice(sender_private_key)?;
        let sender_script = self.resolver.script_for_address(sender_address)?;
        let recipient_script = self.resolver.script_for_address(recipient_address)?;

        let body = HandshakeMessage::new(alias, recipient_address, conversation_id, is_response, Utc::now());
        let ciphertext = encrypt_with(&self.cipher, &body.to_json()?, recipient_public_key)?;
        let payload = ProtocolPayload::Handshake {
            ciphertext: ciphertext.into_bytes(),
        }
        .encode()?;

        let amount = self.config.handshake_amount;
        let primary = vec![TransactionOutput::new(amount, recipient_script)];
        let selection = select_all_for_amount(
            utxos,
            amount,
            self.config.dust_threshold,
            self.fee_estimator(&primary, &sender_script, &payload),
        )?;

        self.finish(PayloadKind::Handshake, selection, primary, sender_script, payload, &key)
    }

    /// Pays `amount` to the recipient with an encrypted [`PaymentNote`].
    #[allow(clippy::too_many_arguments)]
    pub fn build_payment_tx(
        &self,
        sender_address: &str,
        recipient_address: &str,
        amount: u64,
        note: &str,
        sender_private_key: &[u8],
        recipient_public_key: &XOnlyPublicKey,
        utxos: &[UnspentOutput],
    ) -> Result<SignedTransaction> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        let key = SigningKey::from_slice(sender_private_key)?;
        let sender_script = self.resolver.script_for_address(sender_address)?;
        let recipient_script = self.resolver.script_for_address(recipient_address)?;

        let body = PaymentNote::new(note, amount, Utc::now());
        let ciphertext = encrypt_with(&self.cipher, &body.to_json()?, recipient_public_key)?;
        let payload = ProtocolPayload::Payment {
            ciphertext: ciphertext.into_bytes(),
        }
        .encode()?;

        let primary = vec![TransactionOutput::new(amount, recipient_script)];
        let selection = select_for_payment(
            utxos,
            amount,
            self.config.dust_threshold,
            self.fee_estimator(&primary, &sender_script, &payload),
        )?;

        self.finish(PayloadKind::Pay, selection, primary, sender_script, payload, &key)
    }

    /// Carries an already-encrypted message in a self-spend.
    pub fn build_contextual_message_tx(
        &self,
        sender_address: &str,
        alias: &str,
        message: &EncryptedMessage,
        sender_private_key: &[u8],
        utxos: &[UnspentOutput],
    ) -> Result<SignedTransaction> {
        let key = SigningKey::from_slice(sender_private_key)?;
        let sender_script = self.resolver.script_for_address(sender_address)?;
        let payload = ProtocolPayload::Contextual {
            alias: alias.to_string(),
            ciphertext: message.as_bytes().to_vec(),
        }
        .encode()?;

        self.build_self_spend(PayloadKind::Comm, sender_script, payload, &key, utxos)
    }

    /// Stashes the handshake metadata for the sender, encrypted to the
    /// sender's own key.
    #[allow(clippy::too_many_arguments)]
    pub fn build_handshake_self_stash_tx(
        &self,
        sender_address: &str,
        partner_address: &str,
        alias: &str,
        conversation_id: &str,
        is_response: bool,
        sender_private_key: &[u8],
        utxos: &[UnspentOutput],
    ) -> Result<SignedTransaction> {
        let key = SigningKey::from_slice(sender_private_key)?;
        let sender_script = self.resolver.script_for_address(sender_address)?;

        let backup = HandshakeBackup::new(partner_address, alias, conversation_id, is_response, Utc::now());
        let ciphertext = encrypt_with(&self.cipher, &backup.to_json()?, &key.x_only_public_key())?;
        let payload = ProtocolPayload::SelfStash {
            scope: SAVED_HANDSHAKE_SCOPE.to_string(),
            ciphertext: ciphertext.into_bytes(),
        }
        .encode()?;

        self.build_self_spend(PayloadKind::SelfStash, sender_script, payload, &key, utxos)
    }

    // -- verification -------------------------------------------------------

    /// Fail-open check of a reported transaction, resolving spender
    /// addresses with this engine's resolver.
    pub fn verify_reported(&self, reported: &ReportedTransaction) -> VerificationOutcome {
        verify_reported_transaction(&self.resolver, reported)
    }

    /// `false` only when a signature definitely does not match.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_transaction_signatures(
        &self,
        inputs: &[ReportedInput],
        outputs: &[TransactionOutput],
        version: u16,
        lock_time: u64,
        subnetwork_id: SubnetworkId,
        gas: u64,
        payload: &[u8],
    ) -> bool {
        crate::transaction::verify_transaction_signatures(
            &self.resolver,
            inputs,
            outputs,
            version,
            lock_time,
            subnetwork_id,
            gas,
            payload,
        )
    }

    // -- internals ----------------------------------------------------------

    /// Fee of a candidate spending `selected` to `primary`, plus a change
    /// output when asked.
    fn fee_estimator<'a>(
        &'a self,
        primary: &'a [TransactionOutput],
        change_script: &'a ScriptPublicKey,
        payload: &'a [u8],
    ) -> impl FnMut(&[UnspentOutput], bool) -> Result<u64> + 'a {
        move |selected, with_change| {
            let mut builder = TransactionBuilder::new().inputs(selected).payload(payload.to_vec());
            for output in primary {
                builder = builder.output(output.value, output.script_public_key.clone());
            }
            if with_change {
                builder = builder.output(0, change_script.clone());
            }
            self.mass.required_fee(&builder.build())
        }
    }

    /// Spends everything back to the sender minus the fee.
    fn build_self_spend(
        &self,
        kind: PayloadKind,
        sender_script: ScriptPublicKey,
        payload: Vec<u8>,
        key: &SigningKey,
        utxos: &[UnspentOutput],
    ) -> Result<SignedTransaction> {
        let all = select_all(utxos, 1)?;
        let candidate = TransactionBuilder::new()
            .inputs(&all.utxos)
            .output(0, sender_script.clone())
            .payload(payload.clone())
            .build();
        let fee = self.mass.required_fee(&candidate)?;

        let value = all.total.saturating_sub(fee);
        if value <= self.config.dust_threshold {
            let required = checked_add(checked_add(fee, self.config.dust_threshold)?, 1)?;
            return Err(EngineError::InsufficientFunds {
                required,
                available: all.total,
            });
        }
        debug!(%kind, total = all.total, fee, value, "self-spend settled");

        let selection = PaymentSelection {
            utxos: all.utxos,
            total: all.total,
            fee,
            change: 0,
        };
        let primary = vec![TransactionOutput::new(value, sender_script.clone())];
        self.finish(kind, selection, primary, sender_script, payload, key)
    }

    /// Assembles, checks, signs and identifies the transaction.
    fn finish(
        &self,
        kind: PayloadKind,
        selection: PaymentSelection,
        primary: Vec<TransactionOutput>,
        change_script: ScriptPublicKey,
        payload: Vec<u8>,
        key: &SigningKey,
    ) -> Result<SignedTransaction> {
        let mut builder = TransactionBuilder::new().inputs(&selection.utxos).payload(payload);
        for output in primary {
            builder = builder.output(output.value, output.script_public_key);
        }
        if selection.has_change() {
            builder = builder.output(selection.change, change_script);
        }
        let mut tx = builder.build();

        let output_total = checked_sum(tx.outputs.iter().map(|o| o.value))?;
        debug_assert_eq!(checked_add(output_total, selection.fee).ok(), Some(selection.total));

        let spent: Vec<_> = selection.utxos.iter().map(UnspentOutput::spent_output).collect();
        let storage_mass = self.mass.transaction_storage_mass(&tx, &spent);
        let limit = self.mass.params().max_standard_mass;
        if storage_mass > limit {
            warn!(%kind, storage_mass, limit, "storage mass above standard limit");
            if self.config.enforce_storage_mass {
                return Err(EngineError::StorageMassExceeded {
                    mass: storage_mass,
                    limit,
                });
            }
        }

        sign_transaction(&mut tx, &selection.utxos, key)?;
        let compute_mass = self.mass.compute_mass(&tx)?;
        let id = transaction_id(&tx);

        info!(
            %kind,
            tx_id = %id,
            fee = selection.fee,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            compute_mass,
            "built transaction"
        );

        Ok(SignedTransaction {
            transaction: tx,
            transaction_id: id,
            fee: selection.fee,
            compute_mass,
            storage_mass,
            spent: selection.utxos,
        })
    }
}
