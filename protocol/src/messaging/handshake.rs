//! Handshake bodies.
//!
//! A handshake opens a conversation: the sender pays the recipient a fixed
//! amount and attaches an encrypted [`HandshakeMessage`]. A copy of the
//! metadata is stashed for the sender as a [`HandshakeBackup`], encrypted to
//! the sender's own key, so a restored wallet can rebuild its conversations.
//!
//! Both bodies are camelCase JSON. The engine serializes them and hands the
//! bytes to the cipher; it never reads them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};

pub const HANDSHAKE_MESSAGE_TYPE: &str = "handshake";
pub const SAVED_HANDSHAKE_TYPE: &str = "saved_handshake";
pub const HANDSHAKE_BODY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub alias: String,
    #[serde(with = "super::millis_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    pub version: u32,
    pub recipient_address: String,
    pub send_to_recipient: bool,
    pub is_response: bool,
}

impl HandshakeMessage {
    /// A fresh handshake body. A random v4 conversation id is generated when
    /// none is given.
    pub fn new(
        alias: &str,
        recipient_address: &str,
        conversation_id: Option<&str>,
        is_response: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let conversation_id = conversation_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            message_type: HANDSHAKE_MESSAGE_TYPE.to_string(),
            alias: alias.to_string(),
            timestamp,
            conversation_id,
            version: HANDSHAKE_BODY_VERSION,
            recipient_address: recipient_address.to_string(),
            send_to_recipient: true,
            is_response,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EngineError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeBackup {
    #[serde(rename = "type")]
    pub message_type: String,
    pub partner_address: String,
    pub alias: String,
    pub conversation_id: String,
    pub is_response: bool,
    #[serde(with = "super::millis_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl HandshakeBackup {
    pub fn new(
        partner_address: &str,
        alias: &str,
        conversation_id: &str,
        is_response: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message_type: SAVED_HANDSHAKE_TYPE.to_string(),
            partner_address: partner_address.to_string(),
            alias: alias.to_string(),
            conversation_id: conversation_id.to_string(),
            is_response,
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EngineError::InvalidPayload(e.to_string()))
    }
}
