//! # sth-core
//!
//! The namespace naming engine for the STH historic store - THE LOGIC.
//!
//! Tenants, service paths, entities and attributes arrive as arbitrary
//! strings. The document store only accepts names from a restricted
//! alphabet, folds database names to one case, reserves the `system.`
//! prefix and caps every namespace at a fixed number of bytes. This crate
//! turns identities into names that satisfy all of that, and back.
//!
//! ## Components
//!
//! - `codec` → reversible escaping of name segments
//! - `size` → byte budgets of candidate names
//! - `naming` → database and collection names per data model
//! - `mapping` → optional aliasing of every identity field
//!
//! ## Architectural Constraints
//!
//! - No I/O: configuration and mapping documents are handed in by the caller
//! - No global state: every call reads an explicit [`NamingConfig`]
//! - Fail closed: a name over budget is a [`NamingError`], never truncated

// =============================================================================
// MODULES
// =============================================================================

pub mod codec;
pub mod config;
pub mod hashing;
pub mod mapping;
pub mod naming;
pub mod primitives;
pub mod size;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CollectionParams, DataModel, NamingError};

// =============================================================================
// RE-EXPORTS: Naming Engine
// =============================================================================

pub use codec::{EncodingRule, NameCodec, is_escape_sequence};
pub use config::NamingConfig;
pub use hashing::generate_hash;
pub use naming::Naming;
pub use size::{hash_size_in_bytes, namespace_size_in_bytes};

// =============================================================================
// RE-EXPORTS: Name Mapping (from mapping module)
// =============================================================================

pub use mapping::{
    AttributeMapping, EntityMapping, NameMapper, NameMapping, NoMapping, ServiceMapping,
    ServicePathMapping, is_aggregated, map_collection_name, map_database_name,
    unmap_collection_name, unmap_database_name,
};
