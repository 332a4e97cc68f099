// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AEGIS MPC CLI
//!
//! Thin demo driver over the orchestrator core: stands up a manager with
//! simulated parties, runs a secure computation end to end, and prints the
//! plain-data results as JSON.
//!
//! ## Commands
//!
//! - `aegis-mpc run` - execute a computation across one or more servers
//! - `aegis-mpc keys` - generate a simulated keypair
//! - `aegis-mpc compliance` - print a canned compliance report

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aegis_mpc_core::application::manager::OrchestrationManager;
use aegis_mpc_core::config::OrchestratorConfig;
use aegis_mpc_core::domain::party::Party;

/// AEGIS MPC - secure multi-party computation orchestrator demo
#[derive(Parser)]
#[command(name = "aegis-mpc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AEGIS_MPC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a secure computation across simulated servers
    Run {
        /// Number of computation servers to stand up
        #[arg(long, default_value_t = 1)]
        servers: usize,

        /// Number of authenticated parties per server
        #[arg(long, default_value_t = 3)]
        parties: usize,

        /// Task label for the computation
        #[arg(long, default_value = "demo-aggregation")]
        task: String,

        /// Declared data-sensitivity level
        #[arg(long, default_value = "medium")]
        sensitivity: String,

        /// Also print the security report after the run
        #[arg(long)]
        report: bool,
    },

    /// Generate a simulated keypair
    Keys {
        /// Algorithm family: rsa or ec
        #[arg(long, default_value = "rsa")]
        key_type: String,

        /// Key size (modulus bits for rsa, curve size for ec)
        #[arg(long, default_value_t = 2048)]
        size: u32,
    },

    /// Check compliance against a recognized standard
    Compliance {
        /// One of: gdpr, hipaa, soc2, iso27001
        standard: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let manager = OrchestrationManager::with_config(OrchestratorConfig::default());

    match cli.command {
        Commands::Run {
            servers,
            parties,
            task,
            sensitivity,
            report,
        } => {
            for index in 0..servers {
                let roster = (0..parties)
                    .map(|i| Party::authenticated(format!("party-{index}-{i}")))
                    .collect();
                manager.create_server(&format!("server-{index}"), roster, false);
            }
            info!(servers, parties, "servers registered");

            let input = json!({ "source": "cli-demo" });
            let records = manager.execute_all(&task, &input, &sensitivity).await;
            println!("{}", serde_json::to_string_pretty(&records)?);

            if report {
                let security_report = manager.security_report();
                println!("{}", serde_json::to_string_pretty(&security_report)?);
            }
        }

        Commands::Keys { key_type, size } => {
            let keys = manager
                .generate_secure_keys(&key_type, size)
                .context("key generation failed")?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }

        Commands::Compliance { standard } => {
            let report = manager
                .check_compliance(&standard)
                .context("compliance check failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
