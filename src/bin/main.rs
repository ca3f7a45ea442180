//! Check a peer certificate against a required identity

use anyhow::{bail, Context, Result};
use clap::Parser;
use peer_identity::matcher::common_names;
use peer_identity::pem::decode_certificate;
use peer_identity::subject::extract_subject;
use peer_identity::{PeerVerifier, VerifierConfig};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PEM file with the peer certificate
    cert: PathBuf,

    /// Required identity (Common Name)
    #[arg(short, long, conflicts_with = "config")]
    identity: Option<String>,

    /// JSON verifier configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn build_verifier(args: &Args) -> Result<PeerVerifier> {
    match (&args.identity, &args.config) {
        (Some(identity), None) => Ok(VerifierConfig::new(identity.as_str()).verifier()?),
        (None, Some(path)) => Ok(VerifierConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?
            .verifier()?),
        _ => bail!("Either --identity or --config is required"),
    }
}

fn run(args: &Args) -> Result<bool> {
    let verifier = build_verifier(args)?;
    let pem = fs::read_to_string(&args.cert)
        .with_context(|| format!("Failed to read {}", args.cert.display()))?;

    // Show the subject when it parses; the verdict below never depends on it
    match decode_certificate(&pem).and_then(|der| extract_subject(&der)) {
        Ok(subject) => {
            println!("Subject: {}", subject);
            println!(
                "Common Names: {:?}",
                common_names(&subject).collect::<Vec<_>>()
            );
        }
        Err(e) => println!("Certificate unreadable: {}", e),
    }

    let accepted = verifier.verify(&pem);
    info!(
        identity = verifier.required_identity(),
        accepted, "Verification finished"
    );
    println!(
        "{}: {}",
        verifier.required_identity(),
        if accepted { "ACCEPT" } else { "REJECT" }
    );

    Ok(accepted)
}
