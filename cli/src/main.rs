// Copyright (c) 2026 The Ciph Developers. MIT License.
// See LICENSE for details.

//! # Ciph Operator Tool
//!
//! Entry point for the `ciph` binary. Parses CLI arguments, initializes
//! logging, resolves the engine configuration, and runs one offline command
//! over the `ciph-protocol` library.
//!
//! - `txid`           transaction id of a transaction document
//! - `mass`           compute mass, required fee, storage mass
//! - `decode-payload` protocol frame of a payload field
//! - `verify`         fail-open signature check of a reported transaction
//! - `address`        address of an x-only public key
//! - `config`         effective engine configuration
//! - `version`        build version information
//!
//! Results go to stdout as JSON (except `txid` and `address`, which print a
//! single line). Diagnostics go to stderr; `-v` raises their level.

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use ciph_protocol::address::{Address, KaspaScriptResolver};
use ciph_protocol::config::{EngineConfig, NetworkType};
use ciph_protocol::crypto::keys::parse_x_only_public_key;
use ciph_protocol::messaging::payload::{is_protocol_payload, ProtocolPayload};
use ciph_protocol::transaction::amount::{checked_sum, format_sompi};
use ciph_protocol::transaction::verification::{verify_reported_transaction, ReportedTransaction};
use ciph_protocol::transaction::{compute_transaction_id, MassCalculator, SpentOutput, Transaction};

use cli::{CiphCli, Commands};

fn main() -> Result<()> {
    let cli = CiphCli::parse();
    logging::init(cli.log_format, cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.network.into())?;
    tracing::debug!(network = %config.network, "configuration resolved");

    match cli.command {
        Commands::Txid(args) => txid(&args.input),
        Commands::Mass(args) => mass(&config, &args.input, args.spent.as_deref()),
        Commands::DecodePayload(args) => decode_payload(&args.payload),
        Commands::Verify(args) => verify(&config, &args.input),
        Commands::Address(args) => address(&config, &args.public_key),
        Commands::Config => print_json(&config),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// The configuration file when given, otherwise the network preset.
fn load_config(path: Option<&Path>, network: NetworkType) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            EngineConfig::from_json(&raw).with_context(|| format!("invalid config file {}", path.display()))
        }
        None => Ok(EngineConfig::for_network(network)),
    }
}

/// Reads a document from `path`, or stdin when `path` is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid {what}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn txid(input: &Path) -> Result<()> {
    let tx: Transaction = parse_json(input, "transaction")?;
    println!("{}", compute_transaction_id(&tx));
    Ok(())
}

fn mass(config: &EngineConfig, input: &Path, spent: Option<&Path>) -> Result<()> {
    let tx: Transaction = parse_json(input, "transaction")?;
    let calc = MassCalculator::new(config.mass);

    let mut report = json!({
        "computeMass": calc.compute_mass(&tx)?,
        "signedComputeMass": calc.signed_compute_mass(&tx)?,
        "requiredFee": calc.required_fee(&tx)?,
    });

    if let Some(path) = spent {
        let spent: Vec<SpentOutput> = parse_json(path, "spent output list")?;
        if spent.len() != tx.inputs.len() {
            bail!("{} spent outputs given for {} inputs", spent.len(), tx.inputs.len());
        }
        let input_total = checked_sum(spent.iter().map(|s| s.amount))?;
        let output_total = checked_sum(tx.outputs.iter().map(|o| o.value))?;
        let storage_mass = calc.transaction_storage_mass(&tx, &spent);
        report["storageMass"] = json!(storage_mass);
        report["withinStandardMass"] = json!(storage_mass <= config.mass.max_standard_mass);
        match input_total.checked_sub(output_total) {
            Some(fee) => report["fee"] = json!(format_sompi(fee)),
            None => tracing::warn!(input_total, output_total, "outputs exceed inputs"),
        }
    }

    print_json(&report)
}

fn decode_payload(payload_hex: &str) -> Result<()> {
    let payload = hex::decode(payload_hex.trim()).context("payload is not valid hex")?;

    let Some(decoded) = ProtocolPayload::decode(&payload) else {
        return print_json(&json!({
            "recognized": false,
            "protocolTagged": is_protocol_payload(&payload),
        }));
    };

    let mut report = json!({
        "recognized": true,
        "kind": decoded.kind(),
        "ciphertext": hex::encode(decoded.ciphertext()),
    });
    match &decoded {
        ProtocolPayload::Contextual { alias, .. } => report["alias"] = json!(alias),
        ProtocolPayload::SelfStash { scope, .. } => report["scope"] = json!(scope),
        ProtocolPayload::Handshake { .. } | ProtocolPayload::Payment { .. } => {}
    }
    print_json(&report)
}

fn verify(config: &EngineConfig, input: &Path) -> Result<()> {
    let reported: ReportedTransaction = parse_json(input, "reported transaction")?;
    let resolver = KaspaScriptResolver::new(config.network);
    let outcome = verify_reported_transaction(&resolver, &reported);
    tracing::info!(?outcome, inputs = reported.inputs.len(), "verification finished");
    print_json(&outcome)
}

fn address(config: &EngineConfig, public_key_hex: &str) -> Result<()> {
    let bytes = hex::decode(public_key_hex.trim()).context("public key is not valid hex")?;
    let Some(key) = parse_x_only_public_key(&bytes) else {
        bail!("not a 32-byte x-only public key");
    };
    println!("{}", Address::from_x_only_public_key(config.network, &key));
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ciph          {}", env!("CARGO_PKG_VERSION"));
    println!("payload frame {}", ciph_protocol::messaging::payload::PROTOCOL_PREFIX);
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
