//! # Schnorr Signatures
//!
//! BIP-340 schnorr over secp256k1, signing the 32-byte sighash directly (no
//! second hash) and without auxiliary randomness. The resulting 64 bytes are
//! wrapped into the one signature-script shape this engine produces and
//! accepts:
//!
//! ```text
//! 0x41 (push 65) || signature (64) || 0x01 (sighash all)
//! ```

use kaspa_txscript::opcodes::codes::OpData65;
use secp256k1::{schnorr, Message, XOnlyPublicKey, SECP256K1};

use super::hash::Hash32;
use super::keys::SigningKey;
use crate::config::SIGNATURE_SCRIPT_LENGTH;

/// Schnorr signature length.
pub const SCHNORR_SIGNATURE_LENGTH: usize = 64;

/// Sighash type committing to every input and output.
pub const SIG_HASH_ALL: u8 = 0x01;

/// Signs a 32-byte digest.
pub fn sign_digest(key: &SigningKey, digest: &Hash32) -> [u8; SCHNORR_SIGNATURE_LENGTH] {
    let message = Message::from_digest(*digest);
    let signature = SECP256K1.sign_schnorr_no_aux_rand(&message, key.keypair());
    let mut out = [0u8; SCHNORR_SIGNATURE_LENGTH];
    out.copy_from_slice(signature.as_ref());
    out
}

/// Verifies `signature` over `digest` against an x-only public key.
pub fn verify_digest(public_key: &XOnlyPublicKey, digest: &Hash32, signature: &[u8; SCHNORR_SIGNATURE_LENGTH]) -> bool {
    let Ok(signature) = schnorr::Signature::from_slice(signature) else {
        return false;
    };
    let message = Message::from_digest(*digest);
    SECP256K1.verify_schnorr(&signature, &message, public_key).is_ok()
}

/// Wraps a signature into the 66-byte signature script.
pub fn signature_script(signature: &[u8; SCHNORR_SIGNATURE_LENGTH]) -> Vec<u8> {
    let mut script = Vec::with_capacity(SIGNATURE_SCRIPT_LENGTH);
    script.push(OpData65);
    script.extend_from_slice(signature);
    script.push(SIG_HASH_ALL);
    script
}

/// The all-zero script of the same shape, used to size transactions before signing.
pub fn placeholder_signature_script() -> Vec<u8> {
    signature_script(&[0u8; SCHNORR_SIGNATURE_LENGTH])
}

/// Extracts the signature from a script of exactly the shape above.
/// Anything else yields `None`.
pub fn parse_signature_script(script: &[u8]) -> Option<[u8; SCHNORR_SIGNATURE_LENGTH]> {
    if script.len() != SIGNATURE_SCRIPT_LENGTH
        || script[0] != OpData65
        || script[SIGNATURE_SCRIPT_LENGTH - 1] != SIG_HASH_ALL
    {
        return None;
    }
    let mut signature = [0u8; SCHNORR_SIGNATURE_LENGTH];
    signature.copy_from_slice(&script[1..1 + SCHNORR_SIGNATURE_LENGTH]);
    Some(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SigningKey {
        SigningKey::from_slice(&[0x42; 32]).unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let key = key();
        let digest = [7u8; 32];
        let signature = sign_digest(&key, &digest);
        assert!(verify_digest(&key.x_only_public_key(), &digest, &signature));
    }

    #[test]
    fn signing_without_aux_rand_is_deterministic() {
        let key = key();
        let digest = [9u8; 32];
        assert_eq!(sign_digest(&key, &digest), sign_digest(&key, &digest));
    }

    #[test]
    fn wrong_digest_fails() {
        let key = key();
        let signature = sign_digest(&key, &[1u8; 32]);
        assert!(!verify_digest(&key.x_only_public_key(), &[2u8; 32], &signature));
    }

    #[test]
    fn wrong_key_fails() {
        let signer = key();
        let other = SigningKey::from_slice(&[0x43; 32]).unwrap();
        let digest = [3u8; 32];
        let signature = sign_digest(&signer, &digest);
        assert!(!verify_digest(&other.x_only_public_key(), &digest, &signature));
    }

    #[test]
    fn signature_script_shape() {
        let script = signature_script(&[0xAB; 64]);
        assert_eq!(script.len(), SIGNATURE_SCRIPT_LENGTH);
        assert_eq!(script[0], OpData65);
        assert_eq!(script[65], SIG_HASH_ALL);
        assert_eq!(parse_signature_script(&script), Some([0xAB; 64]));
    }

    #[test]
    fn placeholder_matches_real_length() {
        let key = key();
        let real = signature_script(&sign_digest(&key, &[5u8; 32]));
        assert_eq!(placeholder_signature_script().len(), real.len());
    }

    #[test]
    fn parse_rejects_other_shapes() {
        let good = signature_script(&[1u8; 64]);

        assert_eq!(parse_signature_script(&[]), None);
        assert_eq!(parse_signature_script(&good[..65]), None);

        let mut wrong_push = good.clone();
        wrong_push[0] = 0x40;
        assert_eq!(parse_signature_script(&wrong_push), None);

        let mut wrong_type = good.clone();
        wrong_type[65] = 0x02;
        assert_eq!(parse_signature_script(&wrong_type), None);

        let mut longer = good;
        longer.push(0);
        assert_eq!(parse_signature_script(&longer), None);
    }
}
