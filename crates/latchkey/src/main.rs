// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Latchkey operator CLI.
//!
//! Produces and checks encrypted credential blobs offline, using the same
//! vault parameters as a deployed service reading the same configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod encrypt;
mod verify;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use latchkey_config::LatchkeyConfig;

/// Latchkey - passphrase-locked credential storage.
#[derive(Parser, Debug)]
#[command(name = "latchkey", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a credential read from stdin and print the blob.
    Encrypt {
        /// Third-party account id to bundle with the blob (prints a JSON record).
        #[arg(long)]
        secondary_id: Option<u64>,
    },
    /// Check that a blob decrypts with a passphrase.
    Verify {
        /// Base64 blob as stored in the profile store.
        blob: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match latchkey_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            latchkey_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Encrypt { secondary_id } => encrypt::run(&config, secondary_id).await,
        Commands::Verify { blob } => verify::run(&config, blob).await,
        Commands::Config => print_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("latchkey: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_config(config: &LatchkeyConfig) -> Result<(), String> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| format!("failed to render configuration: {e}"))?;
    print!("{rendered}");
    Ok(())
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("latchkey={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encrypt_with_secondary_id() {
        let cli = Cli::try_parse_from(["latchkey", "encrypt", "--secondary-id", "8001"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Encrypt {
                secondary_id: Some(8001)
            }
        ));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&LatchkeyConfig::default()).unwrap();
        assert!(rendered.contains("kdf_iterations = 150000"));
        assert!(rendered.contains("[rate_limit]"));
    }
}
