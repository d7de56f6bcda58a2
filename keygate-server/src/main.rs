//! Keygate activation service.
//!
//! Validates caller-supplied activation keys against a usage-limited ledger
//! and returns the activation script on success. A companion administrative
//! route mints new keys.
//!
//! Usage:
//!   keygate-server --port 8000 --db activation.db --script activation_script.ps1

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use keygate_core::ActivationGate;
use keygate_server::{build_router, ScriptFile};
use keygate_store::SqliteLedger;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "keygate-server")]
#[command(about = "License-key activation gate")]
struct Args {
    /// Port to listen on (HTTP)
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Path to the SQLite key ledger
    #[arg(long, default_value = "activation.db")]
    db: PathBuf,

    /// Path to the activation script served on successful validation
    #[arg(long, default_value = "activation_script.ps1")]
    script: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Keygate starting...");
    let ledger = SqliteLedger::new(&args.db)
        .with_context(|| format!("failed to open key ledger at {}", args.db.display()))?;

    let gate = Arc::new(ActivationGate::new(
        Arc::new(ledger),
        Arc::new(ScriptFile::new(args.script.clone())),
    ));

    let app = build_router(gate);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;

    println!("\n========================================");
    println!("  Keygate Activation Service");
    println!("========================================");
    println!("  HTTP Port: {}", args.port);
    println!("  Ledger:    {}", args.db.display());
    println!("  Script:    {}", args.script.display());
    println!("========================================\n");

    info!("Listening on 0.0.0.0:{}", args.port);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
