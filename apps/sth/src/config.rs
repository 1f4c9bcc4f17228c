//! # Application Configuration
//!
//! Loads the naming configuration the CLI runs with.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. The TOML file (`sth.toml` unless `--config` says otherwise)
//! 3. `STH_*` environment variables
//!
//! ```toml
//! [naming]
//! db_prefix = "sth_"
//! collection_prefix = "sth_"
//! data_model = "collection-per-entity"
//! name_encoding = true
//!
//! [naming.mapping]
//! config_file = "name-mapping.json"
//! ```
//!
//! A relative `config_file` is resolved against the directory of the TOML
//! file. Setting a mapping file enables name mapping.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sth_core::primitives::STARTUP_LOG_CONTEXT;
use sth_core::{DataModel, NameMapper, NameMapping, Naming, NamingConfig, NamingError, NoMapping};
use thiserror::Error;

/// Config file used when `--config` is not given. It may be missing.
pub const DEFAULT_CONFIG_FILE: &str = "sth.toml";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// A naming operation failed.
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// A file could not be read.
    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML configuration file is malformed.
    #[error("Invalid configuration file '{}': {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An `STH_*` variable holds an unusable value.
    #[error("Invalid value for {name}: {reason}")]
    Env { name: String, reason: String },

    /// JSON output could not be rendered.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// FILE FORMAT
// =============================================================================

/// Top-level layout of the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    naming: NamingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct NamingSection {
    #[serde(flatten)]
    settings: NamingConfig,
    mapping: MappingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct MappingSection {
    config_file: Option<PathBuf>,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Effective, validated configuration.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Naming configuration passed to every resolution call.
    pub naming: NamingConfig,
    /// Parsed mapping document, when one is configured.
    pub mapping: Option<NameMapping>,
    /// Where the mapping document was read from.
    pub mapping_file: Option<PathBuf>,
}

impl Settings {
    /// Load from `path` (or the optional default file), then apply `env`.
    ///
    /// `env` looks up an environment variable by name, which keeps the
    /// process environment out of tests.
    pub fn load(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CliError> {
        let (file, base_dir) = match path {
            Some(path) => (read_config_file(path)?, path.parent().map(Path::to_path_buf)),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    (read_config_file(default)?, None)
                } else {
                    tracing::debug!(
                        context = STARTUP_LOG_CONTEXT,
                        "No {} found, using defaults",
                        DEFAULT_CONFIG_FILE
                    );
                    (ConfigFile::default(), None)
                }
            }
        };

        let mut naming = file.naming.settings;
        let mut mapping_file = file.naming.mapping.config_file.map(|file| match &base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file,
        });

        apply_env_overrides(&mut naming, &mut mapping_file, env)?;

        let mapping = match &mapping_file {
            Some(file) => {
                naming.name_mapping = true;
                Some(read_mapping_file(file)?)
            }
            None => None,
        };

        naming.validate()?;

        tracing::info!(
            context = STARTUP_LOG_CONTEXT,
            data_model = %naming.data_model,
            name_encoding = naming.name_encoding,
            name_mapping = naming.name_mapping,
            should_hash = naming.should_hash,
            "Configuration loaded"
        );

        Ok(Self {
            naming,
            mapping,
            mapping_file,
        })
    }

    /// A resolver over this configuration.
    #[must_use]
    pub fn resolver(&self) -> Naming<'_> {
        Naming::with_mapper(&self.naming, self.mapper())
    }

    /// The aliasing collaborator in use.
    #[must_use]
    pub fn mapper(&self) -> &dyn NameMapper {
        match &self.mapping {
            Some(mapping) => mapping,
            None => &NoMapping,
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| CliError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn read_mapping_file(path: &Path) -> Result<NameMapping, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(NameMapping::from_json_str(&content)?)
}

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

fn apply_env_overrides(
    naming: &mut NamingConfig,
    mapping_file: &mut Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), CliError> {
    if let Some(value) = env("STH_DB_PREFIX") {
        naming.db_prefix = value;
    }
    if let Some(value) = env("STH_COLLECTION_PREFIX") {
        naming.collection_prefix = value;
    }
    if let Some(value) = env("STH_DATA_MODEL") {
        naming.data_model = value.parse::<DataModel>()?;
    }
    if let Some(value) = env("STH_NAME_ENCODING") {
        naming.name_encoding = parse_bool("STH_NAME_ENCODING", &value)?;
    }
    if let Some(value) = env("STH_NAME_SEPARATOR") {
        naming.name_separator = Some(value);
    }
    if let Some(value) = env("STH_SHOULD_HASH") {
        naming.should_hash = parse_bool("STH_SHOULD_HASH", &value)?;
    }
    if let Some(value) = env("STH_NAME_MAPPING") {
        *mapping_file = Some(PathBuf::from(value));
    }
    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, CliError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CliError::Env {
            name: name.to_string(),
            reason: format!("expected 'true' or 'false', got '{}'", value),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
