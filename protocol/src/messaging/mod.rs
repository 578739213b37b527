//! # Messaging Protocol
//!
//! Every message in the protocol is a ledger transaction. The transaction
//! moves value (a payment, the handshake amount, or just the fee back to the
//! sender) and carries an encrypted body in its payload field:
//!
//! ```text
//!   Sender                                        Recipient
//!     │  handshake  (pays handshake amount)          │
//!     ├─────────────────────────────────────────────►│
//!     │  self_stash (backup, to self)                │
//!     ├──┐                                           │
//!     │◄─┘                                           │
//!     │  comm       (self-spend, alias-tagged)       │
//!     ├──┐                                           │
//!     │◄─┘                                           │
//!     │  pay        (pays amount, encrypted memo)    │
//!     ├─────────────────────────────────────────────►│
//! ```
//!
//! - `payload.rs`   frames and parses `ciph_msg:1:<kind>:...`
//! - `handshake.rs` handshake body and its self-stashed backup
//! - `payment.rs`   payment memo body
//! - `engine.rs`    [`MessagingEngine`], which builds and signs all four

pub mod engine;
pub mod handshake;
pub mod payload;
pub mod payment;

pub use engine::{MessagingEngine, SignedTransaction};
pub use handshake::{HandshakeBackup, HandshakeMessage};
pub use payload::{PayloadKind, ProtocolPayload};
pub use payment::PaymentNote;

// ---------------------------------------------------------------------------
// Serde helper: fixed-width timestamps
// ---------------------------------------------------------------------------

/// Serde helper for body timestamps: RFC 3339 UTC with exactly three
/// fractional digits (`2026-03-01T12:00:00.000Z`).
///
/// The default `DateTime` encoding drops trailing zero digits, so the body
/// length (and with it the payload mass and fee) would depend on the clock.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Body {
///     #[serde(with = "crate::messaging::millis_timestamp")]
///     timestamp: DateTime<Utc>,
/// }
/// ```
pub mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

}
