//! Ledger addresses and their locking scripts.
//!
//! Addresses are `prefix:payload` strings handled by `kaspa-addresses`; the
//! prefix names the network and the checksummed payload carries a version
//! byte and the key or script hash. Locking scripts come from
//! `kaspa-txscript`:
//!
//! | version       | data                   | locking script                  |
//! |---------------|------------------------|---------------------------------|
//! | `PubKey`      | 32-byte x-only key     | `0x20 ‖ key ‖ 0xAC` (checksig)  |
//! | `PubKeyECDSA` | 33-byte ECDSA key      | `0x21 ‖ key ‖ 0xAB`             |
//! | `ScriptHash`  | 32-byte script hash    | `0xAA 0x20 ‖ hash ‖ 0x87`       |
//!
//! The engine only ever turns addresses into scripts through the
//! [`ScriptResolver`] seam, so callers can substitute their own resolver.

use std::fmt;
use std::str::FromStr;

use kaspa_addresses::{Address as KaspaAddress, Prefix};
use kaspa_txscript::opcodes::codes::{OpCheckSig, OpData32};
use kaspa_txscript::pay_to_address_script;
use secp256k1::XOnlyPublicKey;

pub use kaspa_addresses::Version as AddressVersion;

use crate::config::NetworkType;
use crate::crypto::keys::X_ONLY_PUBLIC_KEY_LENGTH;
use crate::error::{EngineError, Result};
use crate::transaction::types::ScriptPublicKey;

/// `0x20 ‖ key ‖ 0xAC`.
pub fn pay_to_public_key_script(x_only_key: &[u8; X_ONLY_PUBLIC_KEY_LENGTH]) -> ScriptPublicKey {
    let mut script = Vec::with_capacity(X_ONLY_PUBLIC_KEY_LENGTH + 2);
    script.push(OpData32);
    script.extend_from_slice(x_only_key);
    script.push(OpCheckSig);
    ScriptPublicKey::from_script(script)
}

/// Returns the key of a `0x20 ‖ key ‖ 0xAC` script, or `None` for any other shape.
pub fn extract_x_only_public_key(script: &[u8]) -> Option<[u8; X_ONLY_PUBLIC_KEY_LENGTH]> {
    match script {
        [OpData32, key @ .., OpCheckSig] if key.len() == X_ONLY_PUBLIC_KEY_LENGTH => {
            let mut out = [0u8; X_ONLY_PUBLIC_KEY_LENGTH];
            out.copy_from_slice(key);
            Some(out)
        }
        _ => None,
    }
}

/// Shortest encoded payload: a version byte and 32 bytes in base32, plus the
/// 8-character checksum.
const MIN_ENCODED_LEN: usize = 53 + 8;

/// Payload length an address version carries.
fn payload_len(version: AddressVersion) -> usize {
    match version {
        AddressVersion::PubKey | AddressVersion::ScriptHash => 32,
        AddressVersion::PubKeyECDSA => 33,
    }
}

// ---------------------------------------------------------------------------
// Network prefixes
// ---------------------------------------------------------------------------

impl From<NetworkType> for Prefix {
    fn from(network: NetworkType) -> Self {
        match network {
            NetworkType::Mainnet => Prefix::Mainnet,
            NetworkType::Testnet => Prefix::Testnet,
            NetworkType::Devnet => Prefix::Devnet,
            NetworkType::Simnet => Prefix::Simnet,
        }
    }
}

fn network_of(prefix: Prefix) -> NetworkType {
    match prefix {
        Prefix::Mainnet => NetworkType::Mainnet,
        Prefix::Testnet => NetworkType::Testnet,
        Prefix::Devnet => NetworkType::Devnet,
        Prefix::Simnet => NetworkType::Simnet,
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A parsed address whose payload length matches its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    inner: KaspaAddress,
}

impl Address {
    pub fn new(network: NetworkType, version: AddressVersion, payload: Vec<u8>) -> Result<Self> {
        if payload.len() != payload_len(version) {
            return Err(EngineError::invalid_address(
                &hex::encode(&payload),
                format!("{version:?} payload must be {} bytes", payload_len(version)),
            ));
        }
        Ok(Self {
            inner: KaspaAddress::new(network.into(), version, &payload),
        })
    }

    /// Pay-to-public-key address of an x-only key.
    pub fn from_x_only_public_key(network: NetworkType, key: &XOnlyPublicKey) -> Self {
        Self {
            inner: KaspaAddress::new(network.into(), AddressVersion::PubKey, &key.serialize()),
        }
    }

    pub fn network(&self) -> NetworkType {
        network_of(self.inner.prefix)
    }

    pub fn version(&self) -> AddressVersion {
        self.inner.version
    }

    pub fn payload(&self) -> &[u8] {
        &self.inner.payload
    }

    /// The x-only key of a pay-to-public-key address.
    pub fn x_only_public_key(&self) -> Option<XOnlyPublicKey> {
        match self.inner.version {
            AddressVersion::PubKey => XOnlyPublicKey::from_slice(self.payload()).ok(),
            _ => None,
        }
    }

    /// The locking script paying to this address.
    pub fn script_public_key(&self) -> ScriptPublicKey {
        let script = pay_to_address_script(&self.inner);
        ScriptPublicKey::new(script.version(), script.script().to_vec())
    }

    /// Parses `prefix:payload`. Uppercase input is accepted, mixed case is not.
    pub fn parse(address: &str) -> Result<Self> {
        let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
        if has_upper && address.bytes().any(|b| b.is_ascii_lowercase()) {
            return Err(EngineError::invalid_address(address, "mixed case"));
        }
        let lowered = address.to_ascii_lowercase();
        let (_, encoded) = lowered
            .split_once(':')
            .ok_or_else(|| EngineError::invalid_address(address, "missing prefix separator"))?;
        if encoded.len() < MIN_ENCODED_LEN {
            return Err(EngineError::invalid_address(address, "too short"));
        }

        let inner = KaspaAddress::try_from(lowered.as_str())
            .map_err(|err| EngineError::invalid_address(address, err.to_string()))?;
        if inner.payload.len() != payload_len(inner.version) {
            return Err(EngineError::invalid_address(
                address,
                format!("payload is {} bytes, expected {}", inner.payload.len(), payload_len(inner.version)),
            ));
        }
        Ok(Self { inner })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for Address {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// ScriptResolver
// ---------------------------------------------------------------------------

/// Turns an address string into the locking script that pays it.
pub trait ScriptResolver {
    fn script_for_address(&self, address: &str) -> Result<ScriptPublicKey>;
}

/// Resolver over this ledger's address format, bound to one network.
#[derive(Debug, Clone, Copy)]
pub struct KaspaScriptResolver {
    network: NetworkType,
}

impl KaspaScriptResolver {
    pub fn new(network: NetworkType) -> Self {
        Self { network }
    }

    /// Parses `address` and checks it belongs to this resolver's network.
    pub fn parse(&self, address: &str) -> Result<Address> {
        let parsed = Address::parse(address)?;
        if parsed.network() != self.network {
            return Err(EngineError::invalid_address(
                address,
                format!("address is for {}, engine is on {}", parsed.network(), self.network),
            ));
        }
        Ok(parsed)
    }
}

impl ScriptResolver for KaspaScriptResolver {
    fn script_for_address(&self, address: &str) -> Result<ScriptPublicKey> {
        Ok(self.parse(address)?.script_public_key())
    }
}

impl<R: ScriptResolver + ?Sized> ScriptResolver for &R {
    fn script_for_address(&self, address: &str) -> Result<ScriptPublicKey> {
        (**self).script_for_address(address)
    }
}
