//! # Namespace Size Calculator
//!
//! Byte budgets of candidate names, measured in UTF-8 bytes.
//!
//! Collection namespaces are always sized with the `.aggr` suffix, so a raw
//! collection name that fits guarantees its aggregated sibling fits too.

use crate::primitives::{
    AGGREGATED_SUFFIX, MAX_INDEX_NAMESPACE_SIZE_IN_BYTES, MAX_NAMESPACE_SIZE_IN_BYTES,
    NAMESPACE_DOT,
};
use crate::types::DataModel;

/// Size of a database name, or of the aggregated namespace of a collection.
///
/// With `collection` set the result is
/// `database + collection_prefix + collection + ".aggr"`.
#[must_use]
pub fn namespace_size_in_bytes(
    database: &str,
    collection_prefix: &str,
    collection: Option<&str>,
) -> usize {
    match collection {
        None => database.len(),
        Some(body) => {
            database.len() + collection_prefix.len() + body.len() + AGGREGATED_SUFFIX.len()
        }
    }
}

/// Bytes left for a hashed collection body.
///
/// The tighter of the index-namespace and the aggregated-namespace budgets.
/// Negative when the prefixes alone already overflow.
#[must_use]
pub fn hash_size_in_bytes(database: &str, collection_prefix: &str, data_model: DataModel) -> i64 {
    let fixed = (database.len() + NAMESPACE_DOT.len() + collection_prefix.len()) as i64;
    let index_budget = MAX_INDEX_NAMESPACE_SIZE_IN_BYTES as i64
        - fixed
        - data_model.compound_index_suffix().len() as i64;
    let namespace_budget =
        MAX_NAMESPACE_SIZE_IN_BYTES as i64 - fixed - AGGREGATED_SUFFIX.len() as i64;
    index_budget.min(namespace_budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_only() {
        assert_eq!(namespace_size_in_bytes("sth_myservice", "sth_", None), 13);
    }

    #[test]
    fn collection_includes_prefix_and_aggregated_suffix() {
        // 13 + 4 + 5 + 5
        assert_eq!(
            namespace_size_in_bytes("sth_myservice", "sth_", Some("x002f")),
            27
        );
    }

    #[test]
    fn sizes_are_utf8_bytes() {
        assert_eq!(namespace_size_in_bytes("ñ", "", None), 2);
        assert_eq!(namespace_size_in_bytes("", "", Some("€")), 3 + 5);
    }

    #[test]
    fn hash_size_picks_tighter_budget() {
        // fixed = 13 + 1 + 4 = 18
        // per-entity index: 127 - 18 - 46 = 63, namespace: 120 - 18 - 5 = 97
        assert_eq!(
            hash_size_in_bytes("sth_myservice", "sth_", DataModel::CollectionPerEntity),
            63
        );
        // per-attribute index: 127 - 18 - 35 = 74
        assert_eq!(
            hash_size_in_bytes("sth_myservice", "sth_", DataModel::CollectionPerAttribute),
            74
        );
    }

    #[test]
    fn hash_size_can_go_negative() {
        let database = "d".repeat(64);
        let prefix = "p".repeat(60);
        assert!(hash_size_in_bytes(&database, &prefix, DataModel::CollectionPerServicePath) < 0);
    }
}
