//! # Naming Engine
//!
//! Database and collection names for historic data.
//!
//! [`Naming`] ties a [`NamingConfig`] to an optional [`NameMapper`] and
//! exposes the four name functions the rest of the service relies on:
//!
//! - [`Naming::database_name`] / [`Naming::service`]
//! - [`Naming::raw_collection_name`] / [`Naming::aggregated_collection_name`]
//!
//! Every function is pure over its inputs. A name that does not fit the
//! storage engine's namespace budget is reported as an error after a single
//! warning; no truncated name is ever returned.

use crate::codec::NameCodec;
use crate::config::NamingConfig;
use crate::hashing::generate_hash;
use crate::mapping::{NameMapper, NoMapping};
use crate::primitives::{
    AGGREGATED_SUFFIX, DB_LOG_CONTEXT, MAX_DATABASE_NAME_SIZE_IN_BYTES,
    MAX_NAMESPACE_SIZE_IN_BYTES, MIN_HASH_SIZE_IN_BYTES,
};
use crate::size::{hash_size_in_bytes, namespace_size_in_bytes};
use crate::types::{CollectionParams, DataModel, NamingError};

/// Name resolver over one configuration snapshot.
pub struct Naming<'a> {
    config: &'a NamingConfig,
    mapper: &'a dyn NameMapper,
    codec: NameCodec,
}

impl<'a> Naming<'a> {
    /// Resolver without an aliasing collaborator.
    #[must_use]
    pub fn new(config: &'a NamingConfig) -> Self {
        Self::with_mapper(config, &NoMapping)
    }

    /// Resolver consulting `mapper` when name mapping is enabled.
    #[must_use]
    pub fn with_mapper(config: &'a NamingConfig, mapper: &'a dyn NameMapper) -> Self {
        Self {
            config,
            mapper,
            codec: config.codec(),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &NamingConfig {
        self.config
    }

    /// The codec bound to the configured separator.
    #[must_use]
    pub fn codec(&self) -> &NameCodec {
        &self.codec
    }

    // =========================================================================
    // DATABASE NAMES
    // =========================================================================

    /// Database holding the data of `service`.
    pub fn database_name(&self, service: &str) -> Result<String, NamingError> {
        let service_name = self
            .mapped(|mapper| mapper.map_service(service))
            .unwrap_or_else(|| service.to_string());

        let candidate = format!("{}{}", self.config.db_prefix, service_name);
        let candidate = if self.config.name_encoding {
            self.codec.encode_database_name(&candidate)
        } else {
            candidate
        };

        let size = namespace_size_in_bytes(&candidate, &self.config.collection_prefix, None);
        if size > MAX_DATABASE_NAME_SIZE_IN_BYTES {
            tracing::warn!(
                context = DB_LOG_CONTEXT,
                service = %service,
                database = %candidate,
                size,
                limit = MAX_DATABASE_NAME_SIZE_IN_BYTES,
                "Database name exceeds the maximum size, reduce the DB_PREFIX or the service"
            );
            return Err(NamingError::DatabaseNameTooLong {
                service: service.to_string(),
                size,
                limit: MAX_DATABASE_NAME_SIZE_IN_BYTES,
            });
        }

        Ok(candidate)
    }

    /// Service behind a database name produced by [`Self::database_name`].
    #[must_use]
    pub fn service(&self, database: &str) -> String {
        let decoded = if self.config.name_encoding {
            self.codec.decode_database_name(database)
        } else {
            database.to_string()
        };

        let stripped = decoded
            .strip_prefix(self.config.db_prefix.as_str())
            .unwrap_or(&decoded);

        self.mapped(|mapper| mapper.unmap_service(stripped))
            .unwrap_or_else(|| stripped.to_string())
    }

    // =========================================================================
    // COLLECTION NAMES
    // =========================================================================

    /// Collection holding the raw data described by `params`.
    pub fn raw_collection_name(&self, params: &CollectionParams) -> Result<String, NamingError> {
        let database = self.database_name(&params.service)?;
        let body = self.collection_body(params);
        let prefix = self.collection_prefix();

        if self.config.should_hash {
            let available = hash_size_in_bytes(
                &database,
                &self.config.collection_prefix,
                self.config.data_model,
            );
            if available < MIN_HASH_SIZE_IN_BYTES as i64 {
                tracing::warn!(
                    context = DB_LOG_CONTEXT,
                    database = %database,
                    available,
                    required = MIN_HASH_SIZE_IN_BYTES,
                    "Not enough bytes for the collection name hash, reduce the DB_PREFIX, the service or the COLLECTION_PREFIX"
                );
                return Err(NamingError::HashSpaceExhausted {
                    database,
                    available,
                    required: MIN_HASH_SIZE_IN_BYTES,
                });
            }
            return Ok(format!(
                "{}{}",
                prefix,
                generate_hash(&body, Some(available as usize))
            ));
        }

        let size = namespace_size_in_bytes(&database, &self.config.collection_prefix, Some(&body));
        if size > MAX_NAMESPACE_SIZE_IN_BYTES {
            tracing::warn!(
                context = DB_LOG_CONTEXT,
                database = %database,
                collection = %format!("{}{}{}", self.config.collection_prefix, body, AGGREGATED_SUFFIX),
                size,
                limit = MAX_NAMESPACE_SIZE_IN_BYTES,
                "Aggregated data namespace exceeds the maximum size"
            );
            return Err(NamingError::NamespaceTooLong {
                database,
                collection: format!("{}{}", self.config.collection_prefix, body),
                size,
                limit: MAX_NAMESPACE_SIZE_IN_BYTES,
            });
        }

        Ok(format!("{}{}", prefix, body))
    }

    /// Collection holding the aggregated data described by `params`.
    pub fn aggregated_collection_name(
        &self,
        params: &CollectionParams,
    ) -> Result<String, NamingError> {
        let mut name = self.raw_collection_name(params)?;
        if self.config.name_encoding {
            name.push_str(&self.codec.encode_collection_name(AGGREGATED_SUFFIX));
        } else {
            name.push_str(AGGREGATED_SUFFIX);
        }
        Ok(name)
    }

    /// Collection body (without prefix) for the active data model.
    fn collection_body(&self, params: &CollectionParams) -> String {
        let service = params.service.as_str();
        let service_path = params.service_path.as_str();
        let entity_id = params.entity_id.as_str();

        let mut segments = vec![self.storage_form(
            service_path,
            self.mapped(|mapper| mapper.map_service_path(service, service_path)),
        )];

        if self.config.data_model != DataModel::CollectionPerServicePath {
            segments.push(self.storage_form(
                entity_id,
                self.mapped(|mapper| mapper.map_entity_name(service, service_path, entity_id)),
            ));

            if let Some(entity_type) = params.entity_type.as_deref().filter(|t| !t.is_empty()) {
                segments.push(self.storage_form(
                    entity_type,
                    self.mapped(|mapper| {
                        mapper.map_entity_type(service, service_path, entity_type)
                    }),
                ));
            }
        }

        if self.config.data_model == DataModel::CollectionPerAttribute {
            let attr_name = params.attr_name.as_deref().unwrap_or_default();
            segments.push(self.storage_form(
                attr_name,
                self.mapped(|mapper| {
                    mapper.map_attribute_name(service, service_path, entity_id, attr_name)
                }),
            ));
        }

        segments.join(self.config.separator())
    }

    fn collection_prefix(&self) -> String {
        if self.config.name_encoding {
            self.codec.encode_collection_name(&self.config.collection_prefix)
        } else {
            self.config.collection_prefix.clone()
        }
    }

    /// Mapped and encoded, mapped, encoded, or raw; in that order.
    fn storage_form(&self, raw: &str, mapped: Option<String>) -> String {
        let value = mapped.as_deref().unwrap_or(raw);
        if self.config.name_encoding {
            self.codec.encode_collection_name(value)
        } else {
            value.to_string()
        }
    }

    fn mapped(&self, lookup: impl FnOnce(&dyn NameMapper) -> Option<String>) -> Option<String> {
        if self.config.name_mapping {
            lookup(self.mapper)
        } else {
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(data_model: DataModel) -> NamingConfig {
        NamingConfig {
            data_model,
            name_encoding: true,
            ..NamingConfig::default()
        }
    }

    fn plain(data_model: DataModel) -> NamingConfig {
        NamingConfig {
            data_model,
            ..NamingConfig::default()
        }
    }

    fn room() -> CollectionParams {
        CollectionParams::new("myservice", "/", "room1")
            .with_entity_type("Room")
            .with_attr_name("temperature")
    }

    /// Maps only entity ids.
    struct EntityAlias;

    impl NameMapper for EntityAlias {
        fn map_entity_name(&self, _: &str, _: &str, entity_id: &str) -> Option<String> {
            (entity_id == "room1").then(|| "Room$1".to_string())
        }
    }

    #[test]
    fn database_name_prefixes_service() {
        let config = plain(DataModel::CollectionPerEntity);
        let naming = Naming::new(&config);
        assert_eq!(naming.database_name("myservice").expect("fits"), "sth_myservice");
    }

    #[test]
    fn database_name_encodes_forbidden_characters() {
        let config = encoded(DataModel::CollectionPerEntity);
        let naming = Naming::new(&config);
        assert_eq!(
            naming.database_name("my$service").expect("fits"),
            "sth_myx0024service"
        );
    }

    #[test]
    fn database_name_over_budget_rejected() {
        let config = plain(DataModel::CollectionPerEntity);
        let naming = Naming::new(&config);
        // 4 + 60 bytes
        assert!(naming.database_name(&"s".repeat(60)).is_ok());
        assert_eq!(
            naming.database_name(&"s".repeat(61)),
            Err(NamingError::DatabaseNameTooLong {
                service: "s".repeat(61),
                size: 65,
                limit: 64,
            })
        );
    }

    #[test]
    fn service_inverts_database_name() {
        let config = encoded(DataModel::CollectionPerEntity);
        let naming = Naming::new(&config);
        for service in ["myservice", "MyService", "my$service", "x0024"] {
            let database = naming.database_name(service).expect("fits");
            assert_eq!(naming.service(&database), service);
        }
    }

    #[test]
    fn service_without_prefix_is_returned_whole() {
        let config = plain(DataModel::CollectionPerEntity);
        assert_eq!(Naming::new(&config).service("other"), "other");
    }

    #[test]
    fn per_attribute_scenario() {
        let config = encoded(DataModel::CollectionPerAttribute);
        let naming = Naming::new(&config);
        assert_eq!(
            naming.raw_collection_name(&room()).expect("fits"),
            "sth_x002fxffffroom1xffffRoomxfffftemperature"
        );
        assert_eq!(
            naming.aggregated_collection_name(&room()).expect("fits"),
            "sth_x002fxffffroom1xffffRoomxfffftemperature.aggr"
        );
    }

    #[test]
    fn variants_include_documented_fields() {
        let names: Vec<String> = DataModel::ALL
            .into_iter()
            .map(|model| {
                let config = plain(model);
                Naming::new(&config)
                    .raw_collection_name(&room())
                    .expect("fits")
            })
            .collect();
        assert_eq!(
            names,
            ["sth_/", "sth_/_room1_Room", "sth_/_room1_Room_temperature"]
        );
    }

    #[test]
    fn entity_type_is_optional() {
        let config = plain(DataModel::CollectionPerAttribute);
        let params = CollectionParams::new("myservice", "/", "room1").with_attr_name("temperature");
        assert_eq!(
            Naming::new(&config).raw_collection_name(&params).expect("fits"),
            "sth_/_room1_temperature"
        );
    }

    #[test]
    fn empty_entity_type_is_omitted() {
        let config = plain(DataModel::CollectionPerEntity);
        let params = CollectionParams::new("myservice", "/", "room1").with_entity_type("");
        assert_eq!(
            Naming::new(&config).raw_collection_name(&params).expect("fits"),
            "sth_/_room1"
        );
    }

    #[test]
    fn long_service_path_fails_closed() {
        let config = plain(DataModel::CollectionPerServicePath);
        let naming = Naming::new(&config);
        let params = CollectionParams::new("myservice", format!("/{}", "a".repeat(120)), "e");
        let raw = naming.raw_collection_name(&params);
        assert!(matches!(raw, Err(NamingError::NamespaceTooLong { .. })));
        assert_eq!(naming.aggregated_collection_name(&params), raw);
    }

    #[test]
    fn budget_counts_aggregated_suffix() {
        let config = plain(DataModel::CollectionPerServicePath);
        let naming = Naming::new(&config);
        // 13 + 4 + body + 5 <= 120
        let fits = CollectionParams::new("myservice", "a".repeat(98), "e");
        let overflows = CollectionParams::new("myservice", "a".repeat(99), "e");
        assert!(naming.raw_collection_name(&fits).is_ok());
        assert!(naming.raw_collection_name(&overflows).is_err());
    }

    #[test]
    fn database_failure_propagates_to_collections() {
        let config = plain(DataModel::CollectionPerEntity);
        let params = CollectionParams::new("s".repeat(61), "/", "e");
        assert!(matches!(
            Naming::new(&config).raw_collection_name(&params),
            Err(NamingError::DatabaseNameTooLong { .. })
        ));
    }

    #[test]
    fn mapped_value_is_encoded() {
        let config = NamingConfig {
            name_mapping: true,
            ..encoded(DataModel::CollectionPerEntity)
        };
        let naming = Naming::with_mapper(&config, &EntityAlias);
        assert_eq!(
            naming.raw_collection_name(&room()).expect("fits"),
            "sth_x002fxffffRoomx00241xffffRoom"
        );
    }

    #[test]
    fn mapped_value_used_raw_without_encoding() {
        let config = NamingConfig {
            name_mapping: true,
            ..plain(DataModel::CollectionPerEntity)
        };
        let naming = Naming::with_mapper(&config, &EntityAlias);
        assert_eq!(
            naming.raw_collection_name(&room()).expect("fits"),
            "sth_/_Room$1_Room"
        );
    }

    #[test]
    fn mapper_ignored_when_mapping_disabled() {
        let config = plain(DataModel::CollectionPerEntity);
        let naming = Naming::with_mapper(&config, &EntityAlias);
        assert_eq!(
            naming.raw_collection_name(&room()).expect("fits"),
            "sth_/_room1_Room"
        );
    }

    #[test]
    fn hashed_collection_name() {
        let config = NamingConfig {
            should_hash: true,
            ..plain(DataModel::CollectionPerEntity)
        };
        let name = Naming::new(&config)
            .raw_collection_name(&room())
            .expect("fits");
        assert_eq!(name, format!("sth_{}", generate_hash("/_room1_Room", Some(63))));
    }

    #[test]
    fn hash_space_exhausted() {
        let config = NamingConfig {
            should_hash: true,
            collection_prefix: "p".repeat(60),
            ..plain(DataModel::CollectionPerEntity)
        };
        assert!(matches!(
            Naming::new(&config).raw_collection_name(&room()),
            Err(NamingError::HashSpaceExhausted { required: 20, .. })
        ));
    }

    #[test]
    fn safe_to_share_across_threads() {
        let config = encoded(DataModel::CollectionPerAttribute);
        let naming = Naming::new(&config);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(
                        naming.database_name("myservice").expect("fits"),
                        "sth_myservice"
                    );
                });
            }
        });
    }
}
