//! # Engine Configuration & Constants
//!
//! Network-wide literals live here as constants. Everything that can vary
//! between networks (or between a test and production) lives in
//! [`EngineConfig`], which is passed into the engine explicitly rather than
//! read from globals.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Smallest units (sompi) per whole coin.
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Value sent to the recipient with every handshake: 0.2 coin.
pub const HANDSHAKE_AMOUNT_SOMPI: u64 = 20_000_000;

/// Outputs at or below this value are folded into the fee instead of emitted.
pub const DEFAULT_DUST_THRESHOLD: u64 = 10_000;

// ---------------------------------------------------------------------------
// Transaction Shape
// ---------------------------------------------------------------------------

/// Transaction version produced by this engine.
pub const TX_VERSION: u16 = 0;

/// Sequence number stamped on every input we build.
pub const DEFAULT_SEQUENCE: u64 = 0;

/// Signature operations per pay-to-public-key input.
pub const DEFAULT_SIG_OP_COUNT: u8 = 1;

/// Script version of every locking script we produce or hash.
pub const SCRIPT_PUBLIC_KEY_VERSION: u16 = 0;

/// Length of a schnorr signature script: push opcode, 64-byte signature,
/// sighash-type byte. Used both for real signatures and for fee sizing.
pub const SIGNATURE_SCRIPT_LENGTH: usize = 66;

/// Length of the native subnetwork identifier.
pub const SUBNETWORK_ID_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Mass Parameters
// ---------------------------------------------------------------------------

/// Mass charged per byte of canonical encoding.
pub const MASS_PER_TX_BYTE: u64 = 1;

/// Mass charged per byte of every output's locking script (plus its 2-byte version).
pub const MASS_PER_SCRIPT_PUB_KEY_BYTE: u64 = 10;

/// Mass charged per signature operation.
pub const MASS_PER_SIG_OP: u64 = 1_000;

/// Added on top of the compute mass when deriving the fee.
pub const FEE_SAFETY_BUFFER: u64 = 3;

/// The `C` constant of the harmonic storage-mass formula.
pub const STORAGE_MASS_PARAMETER: u64 = SOMPI_PER_KASPA * 10_000;

/// Largest mass a standard transaction may carry.
pub const MAXIMUM_STANDARD_TRANSACTION_MASS: u64 = 100_000;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Which ledger network the engine is producing transactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Devnet,
    Simnet,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Devnet => write!(f, "devnet"),
            Self::Simnet => write!(f, "simnet"),
        }
    }
}

impl std::str::FromStr for NetworkType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "simnet" => Ok(Self::Simnet),
            other => Err(EngineError::InvalidConfig(format!("unknown network {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MassParams
// ---------------------------------------------------------------------------

/// Consensus mass weights plus the client-side fee buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassParams {
    pub mass_per_tx_byte: u64,
    pub mass_per_script_pub_key_byte: u64,
    pub mass_per_sig_op: u64,
    /// Extra fee units on top of compute mass.
    pub fee_safety_buffer: u64,
    pub storage_mass_parameter: u64,
    pub max_standard_mass: u64,
}

impl Default for MassParams {
    fn default() -> Self {
        Self {
            mass_per_tx_byte: MASS_PER_TX_BYTE,
            mass_per_script_pub_key_byte: MASS_PER_SCRIPT_PUB_KEY_BYTE,
            mass_per_sig_op: MASS_PER_SIG_OP,
            fee_safety_buffer: FEE_SAFETY_BUFFER,
            storage_mass_parameter: STORAGE_MASS_PARAMETER,
            max_standard_mass: MAXIMUM_STANDARD_TRANSACTION_MASS,
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Immutable parameters for one engine instance.
///
/// Construct with [`EngineConfig::mainnet`] / [`EngineConfig::testnet`], or
/// deserialize from JSON and call [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub network: NetworkType,
    pub dust_threshold: u64,
    pub handshake_amount: u64,
    #[serde(default)]
    pub mass: MassParams,
    /// Reject transactions whose storage mass exceeds `mass.max_standard_mass`
    /// instead of leaving that check to the network.
    #[serde(default)]
    pub enforce_storage_mass: bool,
}

impl EngineConfig {
    pub fn mainnet() -> Self {
        Self::for_network(NetworkType::Mainnet)
    }

    pub fn testnet() -> Self {
        Self::for_network(NetworkType::Testnet)
    }

    /// Default parameters for `network`. Only the address prefix differs
    /// between networks today.
    pub fn for_network(network: NetworkType) -> Self {
        Self {
            network,
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            handshake_amount: HANDSHAKE_AMOUNT_SOMPI,
            mass: MassParams::default(),
            enforce_storage_mass: false,
        }
    }

    /// Checks the parameters for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let mass = &self.mass;
        if mass.mass_per_tx_byte == 0 || mass.mass_per_script_pub_key_byte == 0 || mass.mass_per_sig_op == 0 {
            return Err(EngineError::InvalidConfig("mass weights must be non-zero".to_string()));
        }
        if mass.storage_mass_parameter == 0 {
            return Err(EngineError::InvalidConfig("storage mass parameter must be non-zero".to_string()));
        }
        if self.handshake_amount <= self.dust_threshold {
            return Err(EngineError::InvalidConfig(format!(
                "handshake amount {} must exceed dust threshold {}",
                self.handshake_amount, self.dust_threshold
            )));
        }
        Ok(())
    }

    /// Parses a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
