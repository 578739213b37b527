//! The `ciph_msg` payload framing.
//!
//! Every protocol transaction carries its message in the native payload
//! field, tagged with the message type:
//!
//! | kind       | frame                                                  |
//! |------------|--------------------------------------------------------|
//! | handshake  | `ciph_msg:1:handshake:` ‖ raw ciphertext               |
//! | comm       | `ciph_msg:1:comm:` ‖ alias ‖ `:` ‖ base64(ciphertext)   |
//! | pay        | `ciph_msg:1:pay:` ‖ hex(ciphertext)                    |
//! | self_stash | `ciph_msg:1:self_stash:` ‖ scope ‖ `:` ‖ hex(ciphertext) |
//!
//! The payload field may hold data from other clients, so decoding anything
//! unrecognized yields `None` rather than an error.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const PROTOCOL_PREFIX: &str = "ciph_msg:1:";
pub const HANDSHAKE_PREFIX: &str = "ciph_msg:1:handshake:";
pub const COMM_PREFIX: &str = "ciph_msg:1:comm:";
pub const PAYMENT_PREFIX: &str = "ciph_msg:1:pay:";
pub const SELF_STASH_PREFIX: &str = "ciph_msg:1:self_stash:";

/// Scope of a self-stashed handshake backup.
pub const SAVED_HANDSHAKE_SCOPE: &str = "saved_handshake";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Handshake,
    Comm,
    Pay,
    SelfStash,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake => write!(f, "handshake"),
            Self::Comm => write!(f, "comm"),
            Self::Pay => write!(f, "pay"),
            Self::SelfStash => write!(f, "self_stash"),
        }
    }
}

/// A decoded protocol payload. Ciphertext is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolPayload {
    Handshake { ciphertext: Vec<u8> },
    Contextual { alias: String, ciphertext: Vec<u8> },
    Payment { ciphertext: Vec<u8> },
    SelfStash { scope: String, ciphertext: Vec<u8> },
}

impl ProtocolPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Handshake { .. } => PayloadKind::Handshake,
            Self::Contextual { .. } => PayloadKind::Comm,
            Self::Payment { .. } => PayloadKind::Pay,
            Self::SelfStash { .. } => PayloadKind::SelfStash,
        }
    }

    pub fn ciphertext(&self) -> &[u8] {
        match self {
            Self::Handshake { ciphertext }
            | Self::Contextual { ciphertext, .. }
            | Self::Payment { ciphertext }
            | Self::SelfStash { ciphertext, .. } => ciphertext,
        }
    }

    /// Frames the payload. Ciphertext must be non-empty; aliases and scopes
    /// must be non-empty and free of `:`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.ciphertext().is_empty() {
            return Err(EngineError::InvalidPayload("empty ciphertext".to_string()));
        }
        let framed = match self {
            Self::Handshake { ciphertext } => {
                let mut out = Vec::with_capacity(HANDSHAKE_PREFIX.len() + ciphertext.len());
                out.extend_from_slice(HANDSHAKE_PREFIX.as_bytes());
                out.extend_from_slice(ciphertext);
                out
            }
            Self::Contextual { alias, ciphertext } => {
                check_label("alias", alias)?;
                format!("{COMM_PREFIX}{alias}:{}", BASE64.encode(ciphertext)).into_bytes()
            }
            Self::Payment { ciphertext } => format!("{PAYMENT_PREFIX}{}", hex::encode(ciphertext)).into_bytes(),
            Self::SelfStash { scope, ciphertext } => {
                check_label("scope", scope)?;
                format!("{SELF_STASH_PREFIX}{scope}:{}", hex::encode(ciphertext)).into_bytes()
            }
        };
        Ok(framed)
    }

    /// Parses a payload field. Unknown or malformed frames yield `None`.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if let Some(ciphertext) = payload.strip_prefix(HANDSHAKE_PREFIX.as_bytes()) {
            return non_empty(ciphertext.to_vec()).map(|ciphertext| Self::Handshake { ciphertext });
        }

        let text = std::str::from_utf8(payload).ok()?;
        if let Some(rest) = text.strip_prefix(COMM_PREFIX) {
            let (alias, encoded) = split_label(rest)?;
            let ciphertext = non_empty(BASE64.decode(encoded).ok()?)?;
            return Some(Self::Contextual { alias, ciphertext });
        }
        if let Some(rest) = text.strip_prefix(PAYMENT_PREFIX) {
            let ciphertext = non_empty(hex::decode(rest).ok()?)?;
            return Some(Self::Payment { ciphertext });
        }
        if let Some(rest) = text.strip_prefix(SELF_STASH_PREFIX) {
            let (scope, encoded) = split_label(rest)?;
            let ciphertext = non_empty(hex::decode(encoded).ok()?)?;
            return Some(Self::SelfStash { scope, ciphertext });
        }
        None
    }
}

/// Whether `payload` starts with the protocol tag, recognized kind or not.
pub fn is_protocol_payload(payload: &[u8]) -> bool {
    payload.starts_with(PROTOCOL_PREFIX.as_bytes())
}

fn check_label(what: &str, label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(EngineError::InvalidPayload(format!("{what} is empty")));
    }
    if label.contains(':') {
        return Err(EngineError::InvalidPayload(format!("{what} contains ':'")));
    }
    Ok(())
}

fn split_label(rest: &str) -> Option<(String, &str)> {
    let (label, encoded) = rest.split_once(':')?;
    if label.is_empty() {
        return None;
    }
    Some((label.to_string(), encoded))
}

fn non_empty(bytes: Vec<u8>) -> Option<Vec<u8>> {
    (!bytes.is_empty()).then_some(bytes)
}
