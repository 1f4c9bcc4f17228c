//! # STH - Namespace Naming Tool
//!
//! The command-line front end of the STH naming engine.
//!
//! This application provides:
//! - Name encoding and decoding under both storage rules
//! - Database and collection names for every data model
//! - Namespace size checks
//! - Renaming of existing names through the name mapping
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/sth (THE BINARY)            │
//! │                                               │
//! │  ┌─────────────┐        ┌─────────────────┐   │
//! │  │    CLI      │        │  Configuration  │   │
//! │  │   (clap)    │        │  (TOML + env)   │   │
//! │  └──────┬──────┘        └────────┬────────┘   │
//! │         └────────────┬───────────┘            │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │   sth-core    │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! sth database-name my\$service
//! sth collection-name --service myservice --service-path / --entity-id room1 --aggregated
//! STH_NAME_ENCODING=true sth encode --rule collection 'system.users'
//! ```

use clap::Parser;
use sth::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - STH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "sth=debug,sth_core=debug"
    } else if cli.quiet {
        "sth=warn,sth_core=warn"
    } else {
        "sth=info,sth_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout only carries command output
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    match cli::execute(&cli, |key| std::env::var(key).ok()) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
