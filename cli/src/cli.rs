//! # CLI Interface
//!
//! Defines the command-line argument structure for `ciph` using `clap`
//! derive. Every subcommand works offline over JSON documents: nothing is
//! fetched from or submitted to a node.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ciph_protocol::config::NetworkType;

/// Offline operator tool for the ciph_msg transaction engine.
///
/// Inspects transactions and payloads produced by ciph clients: computes
/// transaction ids, reports mass and fees, decodes payload frames, and runs
/// the fail-open signature check over reported transactions.
#[derive(Parser, Debug)]
#[command(
    name = "ciph",
    about = "ciph_msg transaction engine tool",
    version,
    propagate_version = true
)]
pub struct CiphCli {
    /// Network whose address prefix and defaults apply.
    #[arg(long, short = 'n', env = "CIPH_NETWORK", value_enum, default_value_t = Network::Mainnet, global = true)]
    pub network: Network,

    /// Engine configuration file (JSON). Overrides `--network` defaults.
    #[arg(long, short = 'c', env = "CIPH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, env = "CIPH_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    /// More diagnostics on stderr: `-v` info, `-vv` debug, `-vvv` trace.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `ciph` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the id of a transaction document.
    Txid(TxArgs),
    /// Report compute mass, required fee and, when spent outputs are given,
    /// storage mass of a transaction.
    Mass(MassArgs),
    /// Decode a hex payload field into its protocol frame.
    DecodePayload(DecodePayloadArgs),
    /// Check the signatures of a reported transaction. Unverifiable inputs
    /// are accepted.
    Verify(TxArgs),
    /// Derive the pay-to-public-key address of an x-only public key.
    Address(AddressArgs),
    /// Print the effective engine configuration.
    Config,
    /// Print version information and exit.
    Version,
}

/// A transaction document, read from a file or `-` for stdin.
#[derive(Parser, Debug)]
pub struct TxArgs {
    /// Path to the JSON document, or `-` for stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Arguments for the `mass` subcommand.
#[derive(Parser, Debug)]
pub struct MassArgs {
    /// Path to the transaction JSON, or `-` for stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// JSON array of the spent outputs, one per input, in input order.
    #[arg(long, short = 's')]
    pub spent: Option<PathBuf>,
}

/// Arguments for the `decode-payload` subcommand.
#[derive(Parser, Debug)]
pub struct DecodePayloadArgs {
    /// Hex-encoded payload field.
    pub payload: String,
}

/// Arguments for the `address` subcommand.
#[derive(Parser, Debug)]
pub struct AddressArgs {
    /// Hex-encoded 32-byte x-only public key.
    pub public_key: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Simnet,
}

impl From<Network> for NetworkType {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => NetworkType::Mainnet,
            Network::Testnet => NetworkType::Testnet,
            Network::Devnet => NetworkType::Devnet,
            Network::Simnet => NetworkType::Simnet,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
}
