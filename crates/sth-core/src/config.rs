//! # Naming Configuration
//!
//! Read-only settings consumed by every naming call.
//!
//! The configuration is an explicit value handed to [`crate::Naming`]; there
//! is no process-wide state. Reconfiguring means building a new value.

use crate::codec::{EncodingRule, NameCodec, is_escape_sequence};
use crate::primitives::{
    DEFAULT_COLLECTION_PREFIX, DEFAULT_DB_PREFIX, ENCODED_NAME_SEPARATOR, PLAIN_NAME_SEPARATOR,
    RESERVED_COLLECTION_PREFIX, STARTUP_LOG_CONTEXT,
};
use crate::types::{DataModel, NamingError};
use serde::{Deserialize, Serialize};

/// Settings that shape database and collection names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix prepended to the service to form the database name.
    pub db_prefix: String,
    /// Prefix prepended to every collection name.
    pub collection_prefix: String,
    /// Active data model.
    pub data_model: DataModel,
    /// Escape names so any identifier is storage-legal.
    pub name_encoding: bool,
    /// Separator override. Derived from `name_encoding` when unset.
    pub name_separator: Option<String>,
    /// Consult the aliasing collaborator for every field.
    pub name_mapping: bool,
    /// Replace collection bodies by a truncated SHA-512 hash.
    pub should_hash: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            db_prefix: DEFAULT_DB_PREFIX.to_string(),
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
            data_model: DataModel::default(),
            name_encoding: false,
            name_separator: None,
            name_mapping: false,
            should_hash: false,
        }
    }
}

impl NamingConfig {
    /// The separator joining collection name segments.
    #[must_use]
    pub fn separator(&self) -> &str {
        match &self.name_separator {
            Some(separator) => separator,
            None if self.name_encoding => ENCODED_NAME_SEPARATOR,
            None => PLAIN_NAME_SEPARATOR,
        }
    }

    /// A codec that leaves this configuration's separator alone.
    #[must_use]
    pub fn codec(&self) -> NameCodec {
        NameCodec::new(self.separator())
    }

    /// Check the configuration before it is used for any naming call.
    pub fn validate(&self) -> Result<(), NamingError> {
        let separator = self.separator();

        if separator.is_empty() {
            return Err(NamingError::InvalidConfig(
                "name separator must not be empty".to_string(),
            ));
        }

        if self.name_encoding {
            if !is_escape_sequence(separator) {
                return Err(NamingError::InvalidConfig(format!(
                    "with name encoding enabled the separator must be an escape sequence like '{}', got '{}'",
                    ENCODED_NAME_SEPARATOR, separator
                )));
            }
            let collides = u32::from_str_radix(&separator[1..], 16)
                .ok()
                .and_then(char::from_u32)
                .is_some_and(|c| {
                    EncodingRule::Database.escapes(c)
                        || EncodingRule::Collection.escapes(c)
                        || c == 'x'
                });
            if collides {
                return Err(NamingError::InvalidConfig(format!(
                    "separator '{}' is also the escape of an ordinary character",
                    separator
                )));
            }
        } else if self.collection_prefix.starts_with(RESERVED_COLLECTION_PREFIX) {
            return Err(NamingError::InvalidConfig(format!(
                "collection prefix '{}' uses the reserved '{}' prefix",
                self.collection_prefix, RESERVED_COLLECTION_PREFIX
            )));
        }

        tracing::debug!(
            context = STARTUP_LOG_CONTEXT,
            db_prefix = %self.db_prefix,
            collection_prefix = %self.collection_prefix,
            data_model = %self.data_model,
            name_encoding = self.name_encoding,
            separator = %separator,
            "Naming configuration validated"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NamingConfig::default();
        assert_eq!(config.db_prefix, "sth_");
        assert_eq!(config.collection_prefix, "sth_");
        assert_eq!(config.data_model, DataModel::CollectionPerEntity);
        assert!(!config.name_encoding);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn separator_follows_encoding() {
        let mut config = NamingConfig::default();
        assert_eq!(config.separator(), "_");
        config.name_encoding = true;
        assert_eq!(config.separator(), "xffff");
        config.name_separator = Some("xfffe".to_string());
        assert_eq!(config.separator(), "xfffe");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn encoded_separator_must_be_an_escape() {
        let config = NamingConfig {
            name_encoding: true,
            name_separator: Some("__".to_string()),
            ..NamingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NamingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn encoded_separator_must_not_shadow_an_escape() {
        // x0024 is what `$` encodes to
        let config = NamingConfig {
            name_encoding: true,
            name_separator: Some("x0024".to_string()),
            ..NamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_separator_rejected() {
        let config = NamingConfig {
            name_separator: Some(String::new()),
            ..NamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reserved_collection_prefix_rejected_without_encoding() {
        let mut config = NamingConfig {
            collection_prefix: "system.sth_".to_string(),
            ..NamingConfig::default()
        };
        assert!(config.validate().is_err());
        config.name_encoding = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: NamingConfig =
            serde_json::from_str(r#"{"data_model": "collection-per-attribute"}"#)
                .expect("deserialize");
        assert_eq!(config.data_model, DataModel::CollectionPerAttribute);
        assert_eq!(config.db_prefix, "sth_");
    }

    #[test]
    fn unknown_data_model_fails_deserialization() {
        let result: Result<NamingConfig, _> =
            serde_json::from_str(r#"{"data_model": "collection-per-tenant"}"#);
        assert!(result.is_err());
    }
}
