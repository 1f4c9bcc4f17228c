//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Each command returns the text to print; `main` does the printing.

use crate::config::{CliError, Settings};
use sth_core::primitives::{MAX_DATABASE_NAME_SIZE_IN_BYTES, MAX_NAMESPACE_SIZE_IN_BYTES};
use sth_core::{
    CollectionParams, EncodingRule, map_collection_name, map_database_name,
    namespace_size_in_bytes, unmap_collection_name, unmap_database_name,
};

/// Render `value` in JSON mode, `text` otherwise.
fn render(json_mode: bool, value: serde_json::Value, text: String) -> Result<String, CliError> {
    if json_mode {
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(text)
    }
}

// =============================================================================
// CODEC COMMANDS
// =============================================================================

/// Encode one name segment.
pub fn cmd_encode(
    settings: &Settings,
    json_mode: bool,
    rule: EncodingRule,
    name: &str,
) -> Result<String, CliError> {
    let encoded = settings.naming.codec().encode(name, rule);
    render(
        json_mode,
        serde_json::json!({ "rule": rule.as_str(), "input": name, "encoded": encoded }),
        encoded,
    )
}

/// Decode one level of escaping.
pub fn cmd_decode(
    settings: &Settings,
    json_mode: bool,
    rule: EncodingRule,
    name: &str,
) -> Result<String, CliError> {
    let decoded = settings.naming.codec().decode(name, rule);
    render(
        json_mode,
        serde_json::json!({ "rule": rule.as_str(), "input": name, "decoded": decoded }),
        decoded,
    )
}

// =============================================================================
// NAME COMMANDS
// =============================================================================

/// Database name of a service.
pub fn cmd_database_name(
    settings: &Settings,
    json_mode: bool,
    service: &str,
) -> Result<String, CliError> {
    let database = settings.resolver().database_name(service)?;
    render(
        json_mode,
        serde_json::json!({ "service": service, "database": database }),
        database,
    )
}

/// Service behind a database name.
pub fn cmd_service(
    settings: &Settings,
    json_mode: bool,
    database: &str,
) -> Result<String, CliError> {
    let service = settings.resolver().service(database);
    render(
        json_mode,
        serde_json::json!({ "database": database, "service": service }),
        service,
    )
}

/// Raw or aggregated collection name.
pub fn cmd_collection_name(
    settings: &Settings,
    json_mode: bool,
    params: &CollectionParams,
    aggregated: bool,
) -> Result<String, CliError> {
    let naming = settings.resolver();
    let database = naming.database_name(&params.service)?;
    let collection = if aggregated {
        naming.aggregated_collection_name(params)?
    } else {
        naming.raw_collection_name(params)?
    };

    tracing::debug!(
        database = %database,
        collection = %collection,
        data_model = %settings.naming.data_model,
        "Collection name resolved"
    );

    render(
        json_mode,
        serde_json::json!({
            "database": database,
            "collection": collection,
            "data_model": settings.naming.data_model.as_str(),
            "aggregated": aggregated
        }),
        format!("{}.{}", database, collection),
    )
}

/// Namespace size of a database or database + collection body.
pub fn cmd_size(
    settings: &Settings,
    json_mode: bool,
    database: &str,
    collection: Option<&str>,
) -> Result<String, CliError> {
    let size = namespace_size_in_bytes(database, &settings.naming.collection_prefix, collection);
    let limit = if collection.is_some() {
        MAX_NAMESPACE_SIZE_IN_BYTES
    } else {
        MAX_DATABASE_NAME_SIZE_IN_BYTES
    };
    let fits = size <= limit;

    render(
        json_mode,
        serde_json::json!({
            "database": database,
            "collection": collection,
            "size": size,
            "limit": limit,
            "fits": fits
        }),
        format!(
            "{} bytes (limit {}, {})",
            size,
            limit,
            if fits { "fits" } else { "exceeds" }
        ),
    )
}

// =============================================================================
// MAPPING COMMANDS
// =============================================================================

/// Rename a database name through the mapping.
pub fn cmd_map_database(
    settings: &Settings,
    json_mode: bool,
    database: &str,
    reverse: bool,
) -> Result<String, CliError> {
    let mapped = if reverse {
        unmap_database_name(&settings.naming, settings.mapper(), database)
    } else {
        map_database_name(&settings.naming, settings.mapper(), database)
    };
    render(
        json_mode,
        serde_json::json!({ "input": database, "output": mapped, "reverse": reverse }),
        mapped,
    )
}

/// Rename a collection name through the mapping.
pub fn cmd_map_collection(
    settings: &Settings,
    json_mode: bool,
    service: &str,
    collection: &str,
    reverse: bool,
) -> Result<String, CliError> {
    let mapped = if reverse {
        unmap_collection_name(&settings.naming, settings.mapper(), service, collection)?
    } else {
        map_collection_name(&settings.naming, settings.mapper(), service, collection)?
    };
    render(
        json_mode,
        serde_json::json!({
            "service": service,
            "input": collection,
            "output": mapped,
            "reverse": reverse
        }),
        mapped,
    )
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// The effective configuration.
pub fn cmd_config(settings: &Settings, json_mode: bool) -> Result<String, CliError> {
    let naming = &settings.naming;
    let mapping_file = settings
        .mapping_file
        .as_ref()
        .map(|path| path.display().to_string());

    if json_mode {
        let mut output = serde_json::to_value(naming)?;
        output["separator"] = serde_json::json!(naming.separator());
        output["mapping_file"] = serde_json::json!(mapping_file);
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut text = String::new();
    text.push_str(&format!("db_prefix:         {}\n", naming.db_prefix));
    text.push_str(&format!("collection_prefix: {}\n", naming.collection_prefix));
    text.push_str(&format!("data_model:        {}\n", naming.data_model));
    text.push_str(&format!("name_encoding:     {}\n", naming.name_encoding));
    text.push_str(&format!("separator:         {}\n", naming.separator()));
    text.push_str(&format!("name_mapping:      {}\n", naming.name_mapping));
    text.push_str(&format!("should_hash:       {}\n", naming.should_hash));
    text.push_str(&format!(
        "mapping_file:      {}",
        mapping_file.as_deref().unwrap_or("-")
    ));
    Ok(text)
}
