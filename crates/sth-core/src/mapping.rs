//! # Name Mapping
//!
//! Aliasing of services, service paths, entities and attributes.
//!
//! [`NameMapper`] is the seam the naming engine consults. Every query may
//! answer `None` ("no mapping"), which makes the caller fall through to the
//! unmapped value. [`NameMapping`] is the implementation backed by the JSON
//! mapping document; [`NoMapping`] answers `None` to everything.
//!
//! Lookups are scoped: a service-path mapping only applies inside its
//! service, an entity mapping inside its service path, and an attribute
//! mapping inside its entity. Two entities may therefore alias the same
//! attribute name to different targets.

use crate::config::NamingConfig;
use crate::primitives::AGGREGATED_SUFFIX;
use crate::types::{DataModel, NamingError};
use serde::{Deserialize, Serialize};

// =============================================================================
// NAME MAPPER TRAIT
// =============================================================================

/// Aliasing collaborator consulted while building names.
///
/// Every method defaults to `None`, so implementors only provide the
/// capabilities they have. `unmap_*` lookups are keyed by the mapped names.
pub trait NameMapper: Send + Sync {
    /// Alias of a service.
    fn map_service(&self, _service: &str) -> Option<String> {
        None
    }

    /// Original service behind an alias.
    fn unmap_service(&self, _service: &str) -> Option<String> {
        None
    }

    /// Alias of a service path within a service.
    fn map_service_path(&self, _service: &str, _service_path: &str) -> Option<String> {
        None
    }

    /// Original service path behind an alias.
    fn unmap_service_path(&self, _service: &str, _service_path: &str) -> Option<String> {
        None
    }

    /// Alias of an entity id within a service path.
    fn map_entity_name(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
    ) -> Option<String> {
        None
    }

    /// Original entity id behind an alias.
    fn unmap_entity_name(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
    ) -> Option<String> {
        None
    }

    /// Alias of an entity type within a service path.
    fn map_entity_type(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_type: &str,
    ) -> Option<String> {
        None
    }

    /// Original entity type behind an alias.
    fn unmap_entity_type(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_type: &str,
    ) -> Option<String> {
        None
    }

    /// Alias of an attribute name within an entity.
    fn map_attribute_name(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
        _attr_name: &str,
    ) -> Option<String> {
        None
    }

    /// Original attribute name behind an alias.
    fn unmap_attribute_name(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
        _attr_name: &str,
    ) -> Option<String> {
        None
    }

    /// Alias of an attribute type within an entity.
    fn map_attribute_type(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
        _attr_type: &str,
    ) -> Option<String> {
        None
    }

    /// Original attribute type behind an alias.
    fn unmap_attribute_type(
        &self,
        _service: &str,
        _service_path: &str,
        _entity_id: &str,
        _attr_type: &str,
    ) -> Option<String> {
        None
    }
}

/// Mapper without any mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMapping;

impl NameMapper for NoMapping {}

// =============================================================================
// MAPPING DOCUMENT
// =============================================================================

/// The JSON name-mapping document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMapping {
    #[serde(default)]
    pub service_mappings: Vec<ServiceMapping>,
}

/// Mapping of one service and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceMapping {
    pub original_service: Option<String>,
    pub new_service: Option<String>,
    pub service_path_mappings: Vec<ServicePathMapping>,
}

/// Mapping of one service path within a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePathMapping {
    pub original_service_path: Option<String>,
    pub new_service_path: Option<String>,
    pub entity_mappings: Vec<EntityMapping>,
}

/// Mapping of an entity id and/or type within a service path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityMapping {
    pub original_entity_id: Option<String>,
    pub new_entity_id: Option<String>,
    pub original_entity_type: Option<String>,
    pub new_entity_type: Option<String>,
    pub attribute_mappings: Vec<AttributeMapping>,
}

/// Mapping of an attribute name and/or type within an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeMapping {
    pub original_attribute_name: Option<String>,
    pub new_attribute_name: Option<String>,
    pub original_attribute_type: Option<String>,
    pub new_attribute_type: Option<String>,
}

/// Which side of a mapping a lookup is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Keyed by original names, yields new names.
    Map,
    /// Keyed by new names, yields original names.
    Unmap,
}

impl Direction {
    /// `(key, target)` for a pair of optional names.
    fn pick_opt<'a>(
        self,
        original: &'a Option<String>,
        new: &'a Option<String>,
    ) -> (Option<&'a str>, Option<&'a str>) {
        match self {
            Direction::Map => (original.as_deref(), new.as_deref()),
            Direction::Unmap => (new.as_deref(), original.as_deref()),
        }
    }
}

impl NameMapping {
    /// Parse a mapping document.
    pub fn from_json_str(json: &str) -> Result<Self, NamingError> {
        serde_json::from_str(json).map_err(|e| NamingError::InvalidMapping(e.to_string()))
    }

    fn service(&self, direction: Direction, service: &str) -> Option<&ServiceMapping> {
        self.service_mappings
            .iter()
            .find(|m| {
                direction
                    .pick_opt(&m.original_service, &m.new_service)
                    .0
                    == Some(service)
            })
    }

    fn service_path(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
    ) -> Option<&ServicePathMapping> {
        self.service(direction, service)?
            .service_path_mappings
            .iter()
            .find(|m| {
                direction
                    .pick_opt(&m.original_service_path, &m.new_service_path)
                    .0
                    == Some(service_path)
            })
    }

    fn entity(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
        entity_id: &str,
    ) -> Option<&EntityMapping> {
        self.service_path(direction, service, service_path)?
            .entity_mappings
            .iter()
            .find(|m| {
                direction
                    .pick_opt(&m.original_entity_id, &m.new_entity_id)
                    .0
                    == Some(entity_id)
            })
    }

    fn lookup_service(&self, direction: Direction, service: &str) -> Option<String> {
        let mapping = self.service(direction, service)?;
        direction
            .pick_opt(&mapping.original_service, &mapping.new_service)
            .1
            .map(str::to_string)
    }

    fn lookup_service_path(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
    ) -> Option<String> {
        let mapping = self.service_path(direction, service, service_path)?;
        direction
            .pick_opt(&mapping.original_service_path, &mapping.new_service_path)
            .1
            .map(str::to_string)
    }

    fn lookup_entity_name(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
        entity_id: &str,
    ) -> Option<String> {
        let entity = self.entity(direction, service, service_path, entity_id)?;
        direction
            .pick_opt(&entity.original_entity_id, &entity.new_entity_id)
            .1
            .map(str::to_string)
    }

    fn lookup_entity_type(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
        entity_type: &str,
    ) -> Option<String> {
        self.service_path(direction, service, service_path)?
            .entity_mappings
            .iter()
            .map(|m| direction.pick_opt(&m.original_entity_type, &m.new_entity_type))
            .find(|(key, _)| *key == Some(entity_type))
            .and_then(|(_, target)| target.map(str::to_string))
    }

    fn lookup_attribute(
        &self,
        direction: Direction,
        service: &str,
        service_path: &str,
        entity_id: &str,
        select: impl Fn(&AttributeMapping) -> (Option<&str>, Option<&str>),
        key: &str,
    ) -> Option<String> {
        self.entity(direction, service, service_path, entity_id)?
            .attribute_mappings
            .iter()
            .map(select)
            .find(|(candidate, _)| *candidate == Some(key))
            .and_then(|(_, target)| target.map(str::to_string))
    }
}

impl NameMapper for NameMapping {
    fn map_service(&self, service: &str) -> Option<String> {
        self.lookup_service(Direction::Map, service)
    }

    fn unmap_service(&self, service: &str) -> Option<String> {
        self.lookup_service(Direction::Unmap, service)
    }

    fn map_service_path(&self, service: &str, service_path: &str) -> Option<String> {
        self.lookup_service_path(Direction::Map, service, service_path)
    }

    fn unmap_service_path(&self, service: &str, service_path: &str) -> Option<String> {
        self.lookup_service_path(Direction::Unmap, service, service_path)
    }

    fn map_entity_name(&self, service: &str, service_path: &str, entity_id: &str) -> Option<String> {
        self.lookup_entity_name(Direction::Map, service, service_path, entity_id)
    }

    fn unmap_entity_name(
        &self,
        service: &str,
        service_path: &str,
        entity_id: &str,
    ) -> Option<String> {
        self.lookup_entity_name(Direction::Unmap, service, service_path, entity_id)
    }

    fn map_entity_type(
        &self,
        service: &str,
        service_path: &str,
        entity_type: &str,
    ) -> Option<String> {
        self.lookup_entity_type(Direction::Map, service, service_path, entity_type)
    }

    fn unmap_entity_type(
        &self,
        service: &str,
        service_path: &str,
        entity_type: &str,
    ) -> Option<String> {
        self.lookup_entity_type(Direction::Unmap, service, service_path, entity_type)
    }

    fn map_attribute_name(
        &self,
        service: &str,
        service_path: &str,
        entity_id: &str,
        attr_name: &str,
    ) -> Option<String> {
        let direction = Direction::Map;
        self.lookup_attribute(
            direction,
            service,
            service_path,
            entity_id,
            |m| direction.pick_opt(&m.original_attribute_name, &m.new_attribute_name),
            attr_name,
        )
    }

    fn unmap_attribute_name(
        &self,
        service: &str,
        service_path: &str,
        entity_id: &str,
        attr_name: &str,
    ) -> Option<String> {
        let direction = Direction::Unmap;
        self.lookup_attribute(
            direction,
            service,
            service_path,
            entity_id,
            |m| direction.pick_opt(&m.original_attribute_name, &m.new_attribute_name),
            attr_name,
        )
    }

    fn map_attribute_type(
        &self,
        service: &str,
        service_path: &str,
        entity_id: &str,
        attr_type: &str,
    ) -> Option<String> {
        let direction = Direction::Map;
        self.lookup_attribute(
            direction,
            service,
            service_path,
            entity_id,
            |m| direction.pick_opt(&m.original_attribute_type, &m.new_attribute_type),
            attr_type,
        )
    }

    fn unmap_attribute_type(
        &self,
        service: &str,
        service_path: &str,
        entity_id: &str,
        attr_type: &str,
    ) -> Option<String> {
        let direction = Direction::Unmap;
        self.lookup_attribute(
            direction,
            service,
            service_path,
            entity_id,
            |m| direction.pick_opt(&m.original_attribute_type, &m.new_attribute_type),
            attr_type,
        )
    }
}

// =============================================================================
// WHOLE-NAME REMAPPING
// =============================================================================

/// Whether a collection holds aggregated data.
#[must_use]
pub fn is_aggregated(collection: &str) -> bool {
    collection.ends_with(AGGREGATED_SUFFIX)
}

/// Rename an existing unencoded database name to its mapped service.
///
/// Names without the database prefix or without a mapping come back as is.
#[must_use]
pub fn map_database_name(config: &NamingConfig, mapper: &dyn NameMapper, database: &str) -> String {
    remap_database_name(config, database, |service| mapper.map_service(service))
}

/// Rename a mapped database name back to its original service.
#[must_use]
pub fn unmap_database_name(
    config: &NamingConfig,
    mapper: &dyn NameMapper,
    database: &str,
) -> String {
    remap_database_name(config, database, |service| mapper.unmap_service(service))
}

fn remap_database_name(
    config: &NamingConfig,
    database: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    database
        .strip_prefix(config.db_prefix.as_str())
        .and_then(lookup)
        .map(|service| format!("{}{}", config.db_prefix, service))
        .unwrap_or_else(|| database.to_string())
}

/// Rename an existing unencoded collection of `service` to its mapped fields.
pub fn map_collection_name(
    config: &NamingConfig,
    mapper: &dyn NameMapper,
    service: &str,
    collection: &str,
) -> Result<String, NamingError> {
    remap_collection_name(config, mapper, Direction::Map, service, collection)
}

/// Rename a mapped collection of the mapped `service` back to its original fields.
pub fn unmap_collection_name(
    config: &NamingConfig,
    mapper: &dyn NameMapper,
    service: &str,
    collection: &str,
) -> Result<String, NamingError> {
    remap_collection_name(config, mapper, Direction::Unmap, service, collection)
}

/// The identity fields carried by a collection body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CollectionFields<'a> {
    service_path: &'a str,
    entity_id: Option<&'a str>,
    entity_type: Option<&'a str>,
    attr_name: Option<&'a str>,
}

impl<'a> CollectionFields<'a> {
    fn parse(
        data_model: DataModel,
        body: &'a str,
        separator: &str,
    ) -> Result<Self, NamingError> {
        let missing = || {
            NamingError::UnparsableCollectionName(format!(
                "'{}' has fewer fields than the {} data model requires",
                body, data_model
            ))
        };

        match data_model {
            DataModel::CollectionPerServicePath => Ok(Self {
                service_path: body,
                entity_id: None,
                entity_type: None,
                attr_name: None,
            }),
            DataModel::CollectionPerEntity => {
                let (service_path, rest) = body.split_once(separator).ok_or_else(missing)?;
                let (entity_id, entity_type) = match rest.split_once(separator) {
                    Some((id, entity_type)) => (id, Some(entity_type)),
                    None => (rest, None),
                };
                Ok(Self {
                    service_path,
                    entity_id: Some(entity_id),
                    entity_type,
                    attr_name: None,
                })
            }
            DataModel::CollectionPerAttribute => {
                let (service_path, rest) = body.split_once(separator).ok_or_else(missing)?;
                let (entity_id, rest) = rest.split_once(separator).ok_or_else(missing)?;
                let (entity_type, attr_name) = match rest.split_once(separator) {
                    Some((entity_type, attr_name)) => (Some(entity_type), attr_name),
                    None => (None, rest),
                };
                Ok(Self {
                    service_path,
                    entity_id: Some(entity_id),
                    entity_type,
                    attr_name: Some(attr_name),
                })
            }
        }
    }
}

fn remap_collection_name(
    config: &NamingConfig,
    mapper: &dyn NameMapper,
    direction: Direction,
    service: &str,
    collection: &str,
) -> Result<String, NamingError> {
    let separator = config.separator();

    let body = collection
        .strip_prefix(config.collection_prefix.as_str())
        .ok_or_else(|| {
            NamingError::UnparsableCollectionName(format!(
                "'{}' does not start with the collection prefix '{}'",
                collection, config.collection_prefix
            ))
        })?;
    let (body, aggregated) = match body.strip_suffix(AGGREGATED_SUFFIX) {
        Some(raw) => (raw, true),
        None => (body, false),
    };

    let fields = CollectionFields::parse(config.data_model, body, separator)?;
    let path = fields.service_path;

    let remap = |value: &str, found: Option<String>| found.unwrap_or_else(|| value.to_string());

    let mut segments = vec![remap(
        path,
        match direction {
            Direction::Map => mapper.map_service_path(service, path),
            Direction::Unmap => mapper.unmap_service_path(service, path),
        },
    )];

    if let Some(entity_id) = fields.entity_id {
        segments.push(remap(
            entity_id,
            match direction {
                Direction::Map => mapper.map_entity_name(service, path, entity_id),
                Direction::Unmap => mapper.unmap_entity_name(service, path, entity_id),
            },
        ));
    }

    if let Some(entity_type) = fields.entity_type {
        segments.push(remap(
            entity_type,
            match direction {
                Direction::Map => mapper.map_entity_type(service, path, entity_type),
                Direction::Unmap => mapper.unmap_entity_type(service, path, entity_type),
            },
        ));
    }

    if let (Some(entity_id), Some(attr_name)) = (fields.entity_id, fields.attr_name) {
        segments.push(remap(
            attr_name,
            match direction {
                Direction::Map => mapper.map_attribute_name(service, path, entity_id, attr_name),
                Direction::Unmap => {
                    mapper.unmap_attribute_name(service, path, entity_id, attr_name)
                }
            },
        ));
    }

    Ok(format!(
        "{}{}{}",
        config.collection_prefix,
        segments.join(separator),
        if aggregated { AGGREGATED_SUFFIX } else { "" }
    ))
}

// =============================================================================
// TESTS
// =============================================================================
