//! # STH CLI Module
//!
//! This module implements the CLI interface for the naming engine.
//!
//! ## Available Commands
//!
//! - `encode` / `decode` - Apply one level of name escaping
//! - `database-name` - Database name of a service
//! - `service` - Service behind a database name
//! - `collection-name` - Raw or aggregated collection name
//! - `size` - Namespace size of a candidate name
//! - `map-database` / `map-collection` - Rename existing names through the mapping
//! - `config` - Show the effective configuration

mod commands;

use crate::config::{CliError, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sth_core::{CollectionParams, EncodingRule};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// STH namespace naming tool
///
/// Computes the database and collection names the historic store uses for
/// services, service paths, entities and attributes.
#[derive(Parser, Debug)]
#[command(name = "sth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file [default: sth.toml, if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a name segment
    Encode {
        /// Encoding rule (database, collection)
        #[arg(short, long, default_value = "database")]
        rule: EncodingRule,

        /// Name to encode
        name: String,
    },

    /// Decode a name segment
    Decode {
        /// Encoding rule (database, collection)
        #[arg(short, long, default_value = "database")]
        rule: EncodingRule,

        /// Name to decode
        name: String,
    },

    /// Show the database name of a service
    DatabaseName {
        /// The service (tenant)
        service: String,
    },

    /// Show the service behind a database name
    Service {
        /// The database name
        database: String,
    },

    /// Show the collection name for an entity or attribute
    CollectionName {
        /// The service (tenant)
        #[arg(long)]
        service: String,

        /// The service path
        #[arg(long)]
        service_path: String,

        /// The entity id
        #[arg(long)]
        entity_id: String,

        /// The entity type
        #[arg(long)]
        entity_type: Option<String>,

        /// The attribute name
        #[arg(long)]
        attr_name: Option<String>,

        /// Show the aggregated data collection
        #[arg(short, long)]
        aggregated: bool,
    },

    /// Show the namespace size of a database or collection
    Size {
        /// The database name
        database: String,

        /// Collection body (without the collection prefix)
        #[arg(long)]
        collection: Option<String>,
    },

    /// Rename a database name through the name mapping
    MapDatabase {
        /// The database name
        database: String,

        /// Map back from new names to original names
        #[arg(short, long)]
        reverse: bool,
    },

    /// Rename a collection name through the name mapping
    MapCollection {
        /// The service owning the collection
        #[arg(long)]
        service: String,

        /// The collection name
        collection: String,

        /// Map back from new names to original names
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show the effective configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments, returning the text to print.
///
/// `env` looks up `STH_*` overrides by name.
pub fn execute(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<String, CliError> {
    let settings = Settings::load(cli.config.as_deref(), env)?;
    let json_mode = cli.json_mode;

    match &cli.command {
        Some(Commands::Encode { rule, name }) => cmd_encode(&settings, json_mode, *rule, name),
        Some(Commands::Decode { rule, name }) => cmd_decode(&settings, json_mode, *rule, name),
        Some(Commands::DatabaseName { service }) => {
            cmd_database_name(&settings, json_mode, service)
        }
        Some(Commands::Service { database }) => cmd_service(&settings, json_mode, database),
        Some(Commands::CollectionName {
            service,
            service_path,
            entity_id,
            entity_type,
            attr_name,
            aggregated,
        }) => {
            let params = CollectionParams {
                service: service.clone(),
                service_path: service_path.clone(),
                entity_id: entity_id.clone(),
                entity_type: entity_type.clone(),
                attr_name: attr_name.clone(),
            };
            cmd_collection_name(&settings, json_mode, &params, *aggregated)
        }
        Some(Commands::Size {
            database,
            collection,
        }) => cmd_size(&settings, json_mode, database, collection.as_deref()),
        Some(Commands::MapDatabase { database, reverse }) => {
            cmd_map_database(&settings, json_mode, database, *reverse)
        }
        Some(Commands::MapCollection {
            service,
            collection,
            reverse,
        }) => cmd_map_collection(&settings, json_mode, service, collection, *reverse),
        Some(Commands::Config) | None => {
            // No subcommand - show configuration by default
            cmd_config(&settings, json_mode)
        }
    }
}
