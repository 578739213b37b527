//! End-to-end integration tests for the Ciph transaction engine.
//!
//! These tests drive [`MessagingEngine`] the way a wallet would: real keys,
//! real addresses, a caller-supplied cipher, and a bag of unspent outputs.
//! Every built transaction is then checked the way another client would check
//! it, by re-deriving the signing digests from reported fields.
//!
//! The cipher here is deterministic and trivially reversible. The engine never
//! looks inside ciphertext, so nothing more is needed.

use secp256k1::XOnlyPublicKey;

use ciph_protocol::address::Address;
use ciph_protocol::config::{EngineConfig, NetworkType};
use ciph_protocol::crypto::encryption::{EncryptedMessage, MessageCipher};
use ciph_protocol::crypto::keys::SigningKey;
use ciph_protocol::error::{CipherError, EngineError};
use ciph_protocol::messaging::payload::{PayloadKind, ProtocolPayload};
use ciph_protocol::messaging::{MessagingEngine, SignedTransaction};
use ciph_protocol::transaction::types::{Outpoint, TransactionId, UnspentOutput};
use ciph_protocol::transaction::verification::ReportedInput;
use ciph_protocol::transaction::{compute_transaction_id, transaction_id};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const SENDER_SECRET: [u8; 32] = [0x11; 32];
const RECIPIENT_SECRET: [u8; 32] = [0x22; 32];

/// Tags the ciphertext with the first four bytes of the recipient key, then
/// masks the body.
struct MaskCipher;

impl MessageCipher for MaskCipher {
    fn encrypt(&self, plaintext: &[u8], recipient: &XOnlyPublicKey) -> Result<EncryptedMessage, CipherError> {
        let mut out = recipient.serialize()[..4].to_vec();
        out.extend(plaintext.iter().map(|b| b ^ 0x5a));
        Ok(out.into())
    }
}

fn unmask(ciphertext: &[u8]) -> Vec<u8> {
    ciphertext[4..].iter().map(|b| b ^ 0x5a).collect()
}

struct BrokenCipher;

impl MessageCipher for BrokenCipher {
    fn encrypt(&self, _: &[u8], _: &XOnlyPublicKey) -> Result<EncryptedMessage, CipherError> {
        Err("key agreement failed".into())
    }
}

struct Party {
    key: SigningKey,
    address: Address,
}

impl Party {
    fn new(secret: [u8; 32]) -> Self {
        let key = SigningKey::from_slice(&secret).unwrap();
        let address = Address::from_x_only_public_key(NetworkType::Mainnet, &key.x_only_public_key());
        Self { key, address }
    }

    fn addr(&self) -> String {
        self.address.to_string()
    }

    fn public_key(&self) -> XOnlyPublicKey {
        self.key.x_only_public_key()
    }

    /// Outputs owned by this party, one per amount.
    fn utxos(&self, amounts: &[u64]) -> Vec<UnspentOutput> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| UnspentOutput {
                outpoint: Outpoint::new(TransactionId([i as u8 + 1; 32]), i as u32),
                amount,
                script_public_key: self.address.script_public_key(),
                is_coinbase: false,
            })
            .collect()
    }
}

fn engine() -> MessagingEngine<MaskCipher> {
    MessagingEngine::new(EngineConfig::mainnet(), MaskCipher).unwrap()
}

/// What an indexer would report for `signed`, spender fields included.
fn reported_inputs(signed: &SignedTransaction, spender: &str) -> Vec<ReportedInput> {
    signed
        .transaction
        .inputs
        .iter()
        .zip(&signed.spent)
        .map(|(input, utxo)| ReportedInput {
            previous_outpoint: input.previous_outpoint,
            signature_script: input.signature_script.clone(),
            sequence: input.sequence,
            sig_op_count: input.sig_op_count,
            spender_address: Some(spender.to_string()),
            spent_amount: Some(utxo.amount),
        })
        .collect()
}

fn verify(engine: &MessagingEngine<MaskCipher>, signed: &SignedTransaction, inputs: &[ReportedInput]) -> bool {
    let tx = &signed.transaction;
    engine.verify_transaction_signatures(
        inputs,
        &tx.outputs,
        tx.version,
        tx.lock_time,
        tx.subnetwork_id,
        tx.gas,
        &tx.payload,
    )
}

fn assert_balanced(signed: &SignedTransaction) {
    let inputs = signed.input_total().unwrap();
    let outputs = signed.output_total().unwrap();
    assert_eq!(outputs + signed.fee, inputs, "outputs + fee must equal inputs");
    assert!(signed.fee >= signed.compute_mass, "fee below compute mass");
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[test]
fn payment_picks_largest_output_and_returns_change() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let utxos = alice.utxos(&[5_000_000, 3_000_000, 50_000_000]);

    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 2_000_000, "lunch", &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();

    assert_eq!(signed.transaction.inputs.len(), 1);
    assert_eq!(signed.spent[0].amount, 50_000_000);
    assert_eq!(signed.transaction.outputs.len(), 2);
    assert_eq!(signed.transaction.outputs[0].value, 2_000_000);
    assert_eq!(signed.transaction.outputs[0].script_public_key, bob.address.script_public_key());
    assert_eq!(signed.transaction.outputs[1].script_public_key, alice.address.script_public_key());
    assert!(signed.transaction.is_fully_signed());
    assert_balanced(&signed);
}

#[test]
fn payment_signatures_verify_and_detect_tampering() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let utxos = alice.utxos(&[1_500_000, 1_200_000, 900_000]);

    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 3_000_000, "rent", &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();
    assert_eq!(signed.transaction.inputs.len(), 3);

    let inputs = reported_inputs(&signed, &alice.addr());
    assert!(verify(&engine, &signed, &inputs));

    let mut tampered = signed.clone();
    tampered.transaction.outputs[0].value += 1;
    assert!(!verify(&engine, &tampered, &inputs));
}

#[test]
fn payment_note_is_framed_and_encrypted_for_recipient() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let utxos = alice.utxos(&[10_000_000]);

    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 1_000_000, "thanks!", &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();

    assert!(signed.transaction.payload.starts_with(b"ciph_msg:1:pay:"));
    let payload = signed.payload().unwrap();
    assert_eq!(payload.kind(), PayloadKind::Pay);
    assert_eq!(&payload.ciphertext()[..4], &bob.public_key().serialize()[..4]);

    let body: serde_json::Value = serde_json::from_slice(&unmask(payload.ciphertext())).unwrap();
    assert_eq!(body["type"], "payment");
    assert_eq!(body["message"], "thanks!");
    assert_eq!(body["amount"], 1_000_000);
}

#[test]
fn payment_rejects_zero_amount() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let err = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 0, "", &SENDER_SECRET, &bob.public_key(), &alice.utxos(&[1_000_000]))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount));
}

#[test]
fn payment_insufficient_funds() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let err = engine
        .build_payment_tx(
            &alice.addr(),
            &bob.addr(),
            2_000_000,
            "",
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[600_000, 400_000]),
        )
        .unwrap_err();
    match err {
        EngineError::InsufficientFunds { required, available } => {
            assert_eq!(available, 1_000_000);
            assert!(required > 2_000_000);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn coinbase_outputs_are_never_spent() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let mut utxos = alice.utxos(&[90_000_000, 5_000_000]);
    utxos[0].is_coinbase = true;

    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 1_000_000, "", &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();
    assert_eq!(signed.spent.len(), 1);
    assert_eq!(signed.spent[0].amount, 5_000_000);
    assert!(signed.spent.iter().all(|u| !u.is_coinbase));
}

// ---------------------------------------------------------------------------
// Handshakes
// ---------------------------------------------------------------------------

#[test]
fn handshake_pays_fixed_amount_with_change() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let utxos = alice.utxos(&[15_000_000, 15_000_000]);

    let signed = engine
        .build_handshake_tx(&alice.addr(), &bob.addr(), "alice", None, false, &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();

    assert_eq!(signed.transaction.inputs.len(), 2);
    assert_eq!(signed.transaction.outputs.len(), 2);
    assert_eq!(signed.transaction.outputs[0].value, engine.config().handshake_amount);
    assert_balanced(&signed);

    let payload = signed.payload().unwrap();
    assert_eq!(payload.kind(), PayloadKind::Handshake);
    let body: serde_json::Value = serde_json::from_slice(&unmask(payload.ciphertext())).unwrap();
    assert_eq!(body["type"], "handshake");
    assert_eq!(body["alias"], "alice");
    assert_eq!(body["recipientAddress"], bob.addr());
    assert_eq!(body["isResponse"], false);
    assert!(body["conversationId"].as_str().is_some_and(|id| !id.is_empty()));

    let inputs = reported_inputs(&signed, &alice.addr());
    assert!(verify(&engine, &signed, &inputs));
}

#[test]
fn handshake_response_keeps_conversation_id() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let signed = engine
        .build_handshake_tx(
            &bob.addr(),
            &alice.addr(),
            "bob",
            Some("conv-42"),
            true,
            &RECIPIENT_SECRET,
            &alice.public_key(),
            &bob.utxos(&[100_000_000]),
        )
        .unwrap();

    let payload = signed.payload().unwrap();
    let body: serde_json::Value = serde_json::from_slice(&unmask(payload.ciphertext())).unwrap();
    assert_eq!(body["conversationId"], "conv-42");
    assert_eq!(body["isResponse"], true);
}

#[test]
fn handshake_folds_dust_change_into_fee() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let amount = engine.config().handshake_amount;
    let utxos = alice.utxos(&[amount + 5_000]);

    let signed = engine
        .build_handshake_tx(&alice.addr(), &bob.addr(), "alice", None, false, &SENDER_SECRET, &bob.public_key(), &utxos)
        .unwrap();

    assert_eq!(signed.transaction.outputs.len(), 1);
    assert_eq!(signed.transaction.outputs[0].value, amount);
    assert_eq!(signed.fee, 5_000);
    assert_balanced(&signed);
}

#[test]
fn handshake_below_amount_is_insufficient() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let err = engine
        .build_handshake_tx(
            &alice.addr(),
            &bob.addr(),
            "alice",
            None,
            false,
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[engine.config().handshake_amount]),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
}

#[test]
fn handshake_funded_with_exactly_amount_plus_fee() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let amount = engine.config().handshake_amount;
    let build = |funding: u64| {
        engine.build_handshake_tx(
            &alice.addr(),
            &bob.addr(),
            "alice",
            Some("conv-edge"),
            false,
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[funding]),
        )
    };

    // Fee of the single-output shape, read off a build whose change is folded.
    let folded = build(amount + 5_000).unwrap();
    assert_eq!(folded.transaction.outputs.len(), 1);
    let fee = engine.mass_calculator().required_fee(&folded.transaction).unwrap();
    assert!(fee < 5_000);

    let exact = build(amount + fee).unwrap();
    assert_eq!(exact.transaction.outputs.len(), 1);
    assert_eq!(exact.transaction.outputs[0].value, amount);
    assert_eq!(exact.fee, fee);
    assert_eq!(engine.mass_calculator().required_fee(&exact.transaction).unwrap(), fee);
    assert_balanced(&exact);

    let err = build(amount + fee - 1).unwrap_err();
    match err {
        EngineError::InsufficientFunds { available, .. } => assert_eq!(available, amount + fee - 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn handshake_surfaces_cipher_failure() {
    let engine = MessagingEngine::new(EngineConfig::mainnet(), BrokenCipher).unwrap();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let err = engine
        .build_handshake_tx(
            &alice.addr(),
            &bob.addr(),
            "alice",
            None,
            false,
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[100_000_000]),
        )
        .unwrap_err();
    match err {
        EngineError::EncryptionError(source) => assert_eq!(source.to_string(), "key agreement failed"),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Self-spends
// ---------------------------------------------------------------------------

#[test]
fn contextual_message_returns_everything_to_sender() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let utxos = alice.utxos(&[400_000, 300_000]);
    let message = EncryptedMessage::new(b"opaque-bytes".to_vec());

    let signed = engine
        .build_contextual_message_tx(&alice.addr(), "bob", &message, &SENDER_SECRET, &utxos)
        .unwrap();

    assert_eq!(signed.transaction.inputs.len(), 2);
    assert_eq!(signed.transaction.outputs.len(), 1);
    assert_eq!(signed.transaction.outputs[0].script_public_key, alice.address.script_public_key());
    assert_balanced(&signed);

    assert_eq!(
        signed.payload(),
        Some(ProtocolPayload::Contextual {
            alias: "bob".to_string(),
            ciphertext: b"opaque-bytes".to_vec(),
        })
    );
    assert!(signed.transaction.payload.starts_with(b"ciph_msg:1:comm:bob:"));
}

#[test]
fn self_stash_is_encrypted_to_sender() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let signed = engine
        .build_handshake_self_stash_tx(
            &alice.addr(),
            &bob.addr(),
            "bob",
            "conv-7",
            false,
            &SENDER_SECRET,
            &alice.utxos(&[1_000_000]),
        )
        .unwrap();

    assert_eq!(signed.transaction.outputs.len(), 1);
    assert_balanced(&signed);

    let payload = signed.payload().unwrap();
    assert_eq!(payload.kind(), PayloadKind::SelfStash);
    assert!(signed.transaction.payload.starts_with(b"ciph_msg:1:self_stash:saved_handshake:"));
    assert_eq!(&payload.ciphertext()[..4], &alice.public_key().serialize()[..4]);

    let body: serde_json::Value = serde_json::from_slice(&unmask(payload.ciphertext())).unwrap();
    assert_eq!(body["type"], "saved_handshake");
    assert_eq!(body["partnerAddress"], bob.addr());
    assert_eq!(body["conversationId"], "conv-7");
    assert_eq!(body["alias"], "bob");
    assert_eq!(body["isResponse"], false);
    assert_eq!(body["timestamp"].as_str().map(str::len), Some("2026-03-01T12:00:00.000Z".len()));
}

#[test]
fn self_spend_leaving_dust_is_insufficient() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let message = EncryptedMessage::new(vec![1, 2, 3]);

    let err = engine
        .build_contextual_message_tx(&alice.addr(), "bob", &message, &SENDER_SECRET, &alice.utxos(&[5_000]))
        .unwrap_err();
    match err {
        EngineError::InsufficientFunds { required, available } => {
            assert_eq!(available, 5_000);
            assert!(required > engine.config().dust_threshold);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn self_spend_with_no_outputs_is_insufficient() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let message = EncryptedMessage::new(vec![1]);

    let err = engine
        .build_contextual_message_tx(&alice.addr(), "bob", &message, &SENDER_SECRET, &[])
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { available: 0, .. }));
}

// ---------------------------------------------------------------------------
// Inputs the engine refuses
// ---------------------------------------------------------------------------

#[test]
fn malformed_address_is_rejected() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);

    let err = engine
        .build_payment_tx(
            &alice.addr(),
            "kaspa:notanaddress",
            1_000,
            "",
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[1_000_000]),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAddress { .. }));
}

#[test]
fn address_from_other_network_is_rejected() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let testnet_bob = Address::from_x_only_public_key(NetworkType::Testnet, &bob.public_key()).to_string();

    let err = engine
        .build_payment_tx(
            &alice.addr(),
            &testnet_bob,
            1_000,
            "",
            &SENDER_SECRET,
            &bob.public_key(),
            &alice.utxos(&[1_000_000]),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAddress { .. }));
}

#[test]
fn bad_private_key_is_rejected() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let utxos = alice.utxos(&[1_000_000]);

    for secret in [&[0u8; 32][..], &[0xff; 32][..], &[7u8; 31][..]] {
        let err = engine
            .build_payment_tx(&alice.addr(), &bob.addr(), 1_000, "", secret, &bob.public_key(), &utxos)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPrivateKey), "secret of len {}", secret.len());
    }
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = EngineConfig::mainnet();
    config.handshake_amount = config.dust_threshold;
    assert!(matches!(
        MessagingEngine::new(config, MaskCipher),
        Err(EngineError::InvalidConfig(_))
    ));
}

// ---------------------------------------------------------------------------
// Verification of other clients' transactions
// ---------------------------------------------------------------------------

#[test]
fn unverifiable_inputs_are_accepted() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 1_000_000, "", &SENDER_SECRET, &bob.public_key(), &alice.utxos(&[9_000_000]))
        .unwrap();

    let mut inputs = reported_inputs(&signed, &alice.addr());
    inputs[0].spender_address = None;
    let mut tampered = signed.clone();
    tampered.transaction.outputs[0].value += 1;

    // Nothing can be checked, so even a tampered body passes.
    assert!(verify(&engine, &tampered, &inputs));
}

#[test]
fn wrong_spender_is_a_mismatch() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 1_000_000, "", &SENDER_SECRET, &bob.public_key(), &alice.utxos(&[9_000_000]))
        .unwrap();

    let inputs = reported_inputs(&signed, &bob.addr());
    assert!(!verify(&engine, &signed, &inputs));
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn transaction_id_matches_signed_transaction() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let bob = Party::new(RECIPIENT_SECRET);
    let signed = engine
        .build_payment_tx(&alice.addr(), &bob.addr(), 1_000_000, "", &SENDER_SECRET, &bob.public_key(), &alice.utxos(&[9_000_000]))
        .unwrap();

    assert_eq!(transaction_id(&signed.transaction), signed.transaction_id);
    let hex = compute_transaction_id(&signed.transaction);
    assert_eq!(hex.len(), 64);
    assert_eq!(hex, signed.transaction_id.to_hex());

    // Signatures do not feed the id.
    assert_eq!(compute_transaction_id(&signed.transaction.without_signatures()), hex);
}

#[test]
fn signed_transaction_serializes_for_submission() {
    let engine = engine();
    let alice = Party::new(SENDER_SECRET);
    let message = EncryptedMessage::new(vec![0xab; 8]);
    let signed = engine
        .build_contextual_message_tx(&alice.addr(), "carol", &message, &SENDER_SECRET, &alice.utxos(&[2_000_000]))
        .unwrap();

    let json = serde_json::to_value(&signed).unwrap();
    assert_eq!(json["transactionId"], signed.transaction_id.to_hex());
    assert_eq!(json["fee"], signed.fee);
    assert_eq!(json["transaction"]["payload"], hex::encode(&signed.transaction.payload));
}
