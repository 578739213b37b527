//! Payment memo body, encrypted to the recipient and carried in a `pay` frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const PAYMENT_MESSAGE_TYPE: &str = "payment";
pub const PAYMENT_BODY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNote {
    #[serde(rename = "type")]
    pub message_type: String,
    pub message: String,
    /// Amount in sompi.
    pub amount: u64,
    #[serde(with = "super::millis_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub version: u32,
}

impl PaymentNote {
    pub fn new(message: &str, amount: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            message_type: PAYMENT_MESSAGE_TYPE.to_string(),
            message: message.to_string(),
            amount,
            timestamp,
            version: PAYMENT_BODY_VERSION,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EngineError::InvalidPayload(e.to_string()))
    }
}
