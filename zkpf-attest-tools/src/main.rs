use std::{fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::OsRng;
use serde::Serialize;
use tracing::{error, info};
use zkpf_attest_tools::{
    claim_request, config::AttestConfig, export_pubkey, fetch_command, sign_command,
    verify_command, VerifySummary,
};
use zkpf_attestation::{AttestError, SystemClock};
use zkpf_evm_rpc::EvmRpcClient;

#[derive(Parser)]
#[command(
    name = "zkpf-attest",
    about = "Build balance-threshold inputs for the zk proof-of-funds circuit"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a balance and write an unsigned Prover.toml (balance, threshold, nonce).
    Fetch(ClaimArgs),
    /// Fetch chain state, sign a balance-at-block attestation and write Prover.toml.
    Sign(SignArgs),
    /// Print the oracle public key derived from ORACLE_PRIVATE_KEY.
    ExportPubkey(JsonArgs),
    /// Re-derive the hash of a signed Prover.toml and check its signature.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct ClaimArgs {
    /// Account address (0x-prefixed, 40 hex characters).
    address: String,
    /// Threshold in ether.
    threshold: Option<String>,
    /// Explicit nonce; 0 or absent derives one.
    nonce: Option<String>,
    /// JSON-RPC endpoint (overrides RPC_URL).
    #[arg(long)]
    rpc_url: Option<String>,
    /// Output path (overrides ZKPF_PROVER_TOML).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SignArgs {
    #[command(flatten)]
    claim: ClaimArgs,
    /// Attest the balance at this block instead of the latest one.
    #[arg(long)]
    block_number: Option<u64>,
}

#[derive(Args)]
struct JsonArgs {
    /// Print the key as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct VerifyArgs {
    /// Signed Prover.toml to check.
    #[arg(long, default_value = "Prover.toml")]
    input: PathBuf,
    /// Print the verified attestation as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "zkpf_attest=info,zkpf_attest_tools=info,zkpf_attestation=info,zkpf_evm_rpc=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let config = AttestConfig::from_env();

    let cli = Cli::parse();
    let result = run(&config, cli.command).await;
    if let Err(err) = &result {
        if let Some(code) = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<AttestError>())
            .map(AttestError::error_code)
        {
            error!(code, "command failed");
        }
    }
    result
}

async fn run(config: &AttestConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Fetch(args) => fetch(config, args).await,
        Commands::Sign(args) => sign(config, args).await,
        Commands::ExportPubkey(args) => {
            let key = config.oracle_key()?;
            output_summary(&export_pubkey(&key)?, args.json)
        }
        Commands::Verify(args) => {
            let attestation = verify_command(&args.input)?;
            let summary = VerifySummary {
                input: args.input,
                attestation,
            };
            output_summary(&summary, args.json)
        }
    }
}

async fn fetch(config: &AttestConfig, args: ClaimArgs) -> Result<()> {
    let request = claim_request(
        &args.address,
        args.threshold.as_deref(),
        args.nonce.as_deref(),
        None,
    )?;
    let rpc_url = config.rpc_url_or_default(args.rpc_url.as_deref());
    let client = EvmRpcClient::new(&rpc_url)?;
    info!(rpc = %client.url(), "fetching balance");

    let output = args.output.unwrap_or_else(|| config.prover_toml.clone());
    let summary = fetch_command(&client, &request, &output, SystemClock, OsRng)
        .await
        .context("unsigned claim failed")?;
    output_summary(&summary, args.json)
}

async fn sign(config: &AttestConfig, args: SignArgs) -> Result<()> {
    let SignArgs {
        claim: args,
        block_number,
    } = args;
    let request = claim_request(
        &args.address,
        args.threshold.as_deref(),
        args.nonce.as_deref(),
        block_number,
    )?;
    let rpc_url = config.require_rpc_url(args.rpc_url.as_deref())?;
    let key = config.oracle_key()?;
    let client = EvmRpcClient::new(&rpc_url)?;
    info!(rpc = %client.url(), "fetching chain state");

    let output = args.output.unwrap_or_else(|| config.prover_toml.clone());
    let summary = sign_command(&client, &key, &request, &output, SystemClock, OsRng)
        .await
        .context("signed claim failed")?;
    output_summary(&summary, args.json)
}

fn output_summary<T>(summary: &T, json: bool) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}
