//! # Core Type Definitions
//!
//! This module contains the value types shared by every naming component:
//! - Data-model variants (`DataModel`)
//! - Collection naming input (`CollectionParams`)
//! - Error types (`NamingError`)
//!
//! All of them exist only for the duration of one naming call. Nothing here
//! is persisted by this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// DATA MODEL
// =============================================================================

/// Granularity at which historic data is split into collections.
///
/// Selects which identity fields take part in a collection name, and in
/// which order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum DataModel {
    /// One collection per service path.
    CollectionPerServicePath,
    /// One collection per entity (service path + entity id [+ type]).
    #[default]
    CollectionPerEntity,
    /// One collection per attribute (entity + attribute name).
    CollectionPerAttribute,
}

impl DataModel {
    /// All variants, in configuration order.
    pub const ALL: [DataModel; 3] = [
        DataModel::CollectionPerServicePath,
        DataModel::CollectionPerEntity,
        DataModel::CollectionPerAttribute,
    ];

    /// Configuration name of the variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DataModel::CollectionPerServicePath => "collection-per-service-path",
            DataModel::CollectionPerEntity => "collection-per-entity",
            DataModel::CollectionPerAttribute => "collection-per-attribute",
        }
    }

    /// Name suffix of the compound index the store creates on raw collections.
    ///
    /// The fields not already fixed by the collection name are indexed, so
    /// coarser models carry longer index names.
    #[must_use]
    pub fn compound_index_suffix(&self) -> &'static str {
        match self {
            DataModel::CollectionPerServicePath => {
                ".$recvTime_1_entityId_1_entityType_1_attrName_1_attrType_1_attrValue_1"
            }
            DataModel::CollectionPerEntity => ".$recvTime_1_attrName_1_attrType_1_attrValue_1",
            DataModel::CollectionPerAttribute => ".$recvTime_1_attrType_1_attrValue_1",
        }
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataModel {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| {
                NamingError::InvalidConfig(format!(
                    "unknown data model '{}' (expected one of: {})",
                    s,
                    DataModel::ALL.map(|m| m.as_str()).join(", ")
                ))
            })
    }
}

// =============================================================================
// COLLECTION PARAMS
// =============================================================================

/// Identity of the data a collection name is built for.
///
/// `entity_type` is optional in every model. `attr_name` only matters for
/// [`DataModel::CollectionPerAttribute`] and is treated as empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionParams {
    /// The tenant.
    pub service: String,
    /// The sub-tenant path.
    pub service_path: String,
    /// The entity id.
    pub entity_id: String,
    /// The entity type.
    pub entity_type: Option<String>,
    /// The attribute name.
    pub attr_name: Option<String>,
}

impl CollectionParams {
    /// Create params for an entity, without type or attribute.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        service_path: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            service_path: service_path.into(),
            entity_id: entity_id.into(),
            entity_type: None,
            attr_name: None,
        }
    }

    /// Set the entity type.
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the attribute name.
    #[must_use]
    pub fn with_attr_name(mut self, attr_name: impl Into<String>) -> Self {
        self.attr_name = Some(attr_name.into());
        self
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced while computing names.
///
/// A name that does not fit the storage engine's budget is an error, never a
/// truncated or partial name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The database name for a service exceeds the database-name budget.
    #[error("database name for service '{service}' is {size} bytes (limit {limit})")]
    DatabaseNameTooLong {
        service: String,
        size: usize,
        limit: usize,
    },

    /// The aggregated-data namespace for a collection exceeds the budget.
    #[error(
        "namespace '{database}' + '{collection}' is {size} bytes including the aggregated suffix (limit {limit})"
    )]
    NamespaceTooLong {
        database: String,
        collection: String,
        size: usize,
        limit: usize,
    },

    /// Not enough bytes left in the namespace for a hashed collection name.
    #[error(
        "only {available} bytes available for the collection hash of database '{database}' (at least {required} needed)"
    )]
    HashSpaceExhausted {
        database: String,
        available: i64,
        required: usize,
    },

    /// The naming configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The name-mapping document could not be parsed.
    #[error("Invalid name mapping: {0}")]
    InvalidMapping(String),

    /// A collection name could not be split into its fields.
    #[error("Unparsable collection name: {0}")]
    UnparsableCollectionName(String),
}

impl NamingError {
    /// Whether this error is a namespace budget violation.
    #[must_use]
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(
            self,
            NamingError::DatabaseNameTooLong { .. }
                | NamingError::NamespaceTooLong { .. }
                | NamingError::HashSpaceExhausted { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_model_round_trips_through_its_name() {
        for model in DataModel::ALL {
            assert_eq!(model.as_str().parse::<DataModel>(), Ok(model));
        }
    }

    #[test]
    fn unknown_data_model_rejected() {
        let result = "collection-per-tenant".parse::<DataModel>();
        assert!(matches!(result, Err(NamingError::InvalidConfig(_))));
    }

    #[test]
    fn default_data_model_is_per_entity() {
        assert_eq!(DataModel::default(), DataModel::CollectionPerEntity);
    }

    #[test]
    fn data_model_serde_uses_kebab_case() {
        let json = serde_json::to_string(&DataModel::CollectionPerAttribute).expect("serialize");
        assert_eq!(json, "\"collection-per-attribute\"");
    }

    #[test]
    fn params_builder() {
        let params = CollectionParams::new("svc", "/", "room1")
            .with_entity_type("Room")
            .with_attr_name("temperature");
        assert_eq!(params.entity_type.as_deref(), Some("Room"));
        assert_eq!(params.attr_name.as_deref(), Some("temperature"));
    }

    #[test]
    fn budget_errors_classified() {
        let err = NamingError::DatabaseNameTooLong {
            service: "s".into(),
            size: 70,
            limit: 64,
        };
        assert!(err.is_budget_exceeded());
        assert!(!NamingError::InvalidConfig("x".into()).is_budget_exceeded());
    }
}
