//! # Storage Engine Primitives
//!
//! Hardcoded constants imposed by the document store on database and
//! collection names.
//!
//! These are not policy: they follow the storage engine's own limits and
//! only change if the target engine changes. All sizes are UTF-8 bytes.

/// Maximum size of a database name.
pub const MAX_DATABASE_NAME_SIZE_IN_BYTES: usize = 64;

/// Maximum size of a full namespace (database + collection).
pub const MAX_NAMESPACE_SIZE_IN_BYTES: usize = 120;

/// Maximum size of an index namespace.
///
/// Only relevant when collection names are hashed.
pub const MAX_INDEX_NAMESPACE_SIZE_IN_BYTES: usize = 127;

/// Minimum number of hash characters a hashed collection name must carry.
pub const MIN_HASH_SIZE_IN_BYTES: usize = 20;

/// Suffix of the sibling collection holding aggregated data.
pub const AGGREGATED_SUFFIX: &str = ".aggr";

/// Separator between database and collection inside a namespace.
pub const NAMESPACE_DOT: &str = ".";

/// Prefix the storage engine reserves for its internal collections.
pub const RESERVED_COLLECTION_PREFIX: &str = "system.";

// =============================================================================
// ESCAPING
// =============================================================================

/// Marker that opens every escape sequence.
pub const ESCAPE_MARKER: char = 'x';

/// Number of hex digits following the escape marker.
pub const ESCAPE_HEX_DIGITS: usize = 4;

/// Separator joining name segments when encoding is enabled.
///
/// It is syntactically an escape sequence, so decoding must leave it alone.
pub const ENCODED_NAME_SEPARATOR: &str = "xffff";

/// Separator joining name segments when encoding is disabled.
pub const PLAIN_NAME_SEPARATOR: &str = "_";

// =============================================================================
// CONFIGURATION DEFAULTS
// =============================================================================

/// Default prefix for database names.
pub const DEFAULT_DB_PREFIX: &str = "sth_";

/// Default prefix for collection names.
pub const DEFAULT_COLLECTION_PREFIX: &str = "sth_";

// =============================================================================
// LOGGING CONTEXTS
// =============================================================================

/// Context tag attached to naming diagnostics.
pub const DB_LOG_CONTEXT: &str = "OPER_STH_DB_LOG";

/// Context tag attached to configuration diagnostics.
pub const STARTUP_LOG_CONTEXT: &str = "OPER_STH_STARTUP";
