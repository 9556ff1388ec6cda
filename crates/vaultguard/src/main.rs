// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! VaultGuard - a password vault over a content-addressed store and an
//! on-chain pointer registry.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod bootstrap;
mod commands;
mod doctor;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vaultguard_config::VaultGuardConfig;
use vaultguard_core::VaultError;
use vaultguard_vault::VaultOrchestrator;

/// VaultGuard - encrypted credentials behind a single registry pointer.
#[derive(Parser, Debug)]
#[command(name = "vaultguard", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Print a random password.
    Generate {
        #[arg(long)]
        length: Option<usize>,
    },
    /// Encrypt and publish a credential under a new label.
    Store {
        label: String,
        /// Generate the secret instead of reading it.
        #[arg(long)]
        generate: bool,
        #[arg(long, requires = "generate")]
        length: Option<usize>,
    },
    /// Publish a new secret for an existing label.
    Replace {
        label: String,
        #[arg(long)]
        generate: bool,
        #[arg(long, requires = "generate")]
        length: Option<usize>,
    },
    /// Decrypt the credential stored under a label.
    Retrieve { label: String },
    /// Decrypt the record the registry currently points at.
    Latest,
    /// Forget a label locally. The published record is not erased.
    Delete { label: String },
    /// List indexed labels.
    List,
    /// Reconcile the local index with the registry.
    Sync,
    /// Check configuration and connectivity.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vaultguard_config::load_and_validate_path(path),
        None => vaultguard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vaultguard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.vault.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("vaultguard: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &VaultGuardConfig) -> Result<(), VaultError> {
    let mut out = std::io::stdout();

    match command {
        Commands::Generate { length } => {
            commands::generate(&mut out, length.unwrap_or(config.generator.default_length))
        }
        Commands::Doctor => doctor::run_doctor(config).await,
        Commands::Store {
            label,
            generate,
            length,
        } => {
            let vault = bootstrap::build_vault(config).await?;
            let secret = commands::obtain_secret(&vault, &label, generate, length)?;
            commands::store(&mut out, &cancellable(&vault), &label, &secret, generate).await
        }
        Commands::Replace {
            label,
            generate,
            length,
        } => {
            let vault = bootstrap::build_vault(config).await?;
            let secret = commands::obtain_secret(&vault, &label, generate, length)?;
            commands::replace(&mut out, &cancellable(&vault), &label, &secret, generate).await
        }
        Commands::Retrieve { label } => {
            commands::retrieve(&mut out, &open_vault(config).await?, &label).await
        }
        Commands::Latest => commands::latest(&mut out, &open_vault(config).await?).await,
        Commands::Delete { label } => {
            commands::delete(&mut out, &open_vault(config).await?, &label).await
        }
        Commands::List => commands::list(&mut out, &open_vault(config).await?).await,
        Commands::Sync => commands::sync(&mut out, &open_vault(config).await?).await,
    }
}

/// Build the vault (prompting for the passphrase) and bind it to signals.
async fn open_vault(config: &VaultGuardConfig) -> Result<VaultOrchestrator, VaultError> {
    Ok(cancellable(&bootstrap::build_vault(config).await?))
}

/// Signals are only hooked once every prompt has been answered, so Ctrl+C at
/// a prompt still terminates the process.
fn cancellable(vault: &VaultOrchestrator) -> VaultOrchestrator {
    vault.with_cancellation(shutdown::install_signal_handler())
}

/// Log to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vaultguard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
