//! Document, filter, and result types shared by every store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// A stored JSON document (always a top-level object).
pub type Document = Map<String, Value>;

/// Store-assigned document identifier, increasing in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    /// Number of documents matching the filter across all pages.
    pub total_count: u64,
    /// Documents on the requested page.
    pub items: Vec<Document>,
}

/// Conjunction of top-level field equality conditions.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Creates a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the condition `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Returns the conditions in the order they were added.
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Returns true if the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Checks whether `document` satisfies every condition.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Rejects field names that cannot be addressed safely by every backend.
    pub fn validate(&self) -> Result<(), StorageError> {
        for (field, _) in &self.conditions {
            if field.is_empty() {
                return Err(StorageError::InvalidInput(
                    "filter field cannot be empty".into(),
                ));
            }
            if field.contains('"') || field.contains('\\') {
                return Err(StorageError::InvalidInput(format!(
                    "filter field contains a quote or backslash: {field}"
                )));
            }
        }
        Ok(())
    }
}

/// Validates a collection name.
///
/// Only allows: ASCII letters, digits, underscore, hyphen, dot.
pub fn validate_collection_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidInput(
            "collection name cannot be empty".into(),
        ));
    }

    if name.len() > 128 {
        return Err(StorageError::InvalidInput(
            "collection name too long".into(),
        ));
    }

    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');

    if !valid {
        return Err(StorageError::InvalidInput(
            "collection name must match [A-Za-z0-9_.-]+".into(),
        ));
    }

    Ok(())
}

/// Converts a 1-based page request into a row offset.
pub(crate) fn page_offset(page: u32, page_size: u32) -> Result<u64, StorageError> {
    if page == 0 {
        return Err(StorageError::InvalidInput("page numbers start at 1".into()));
    }
    if page_size == 0 {
        return Err(StorageError::InvalidInput(
            "page size must be at least 1".into(),
        ));
    }
    Ok(u64::from(page - 1) * u64::from(page_size))
}

/// Validates a query request and returns its row offset.
///
/// Shared by store implementations so they reject the same inputs.
pub fn check_query(
    collection: &str,
    filter: &Filter,
    page: u32,
    page_size: u32,
) -> Result<u64, StorageError> {
    validate_collection_name(collection)?;
    filter.validate()?;
    page_offset(page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&doc(json!({"a": 1}))));
        assert!(Filter::new().matches(&Document::new()));
    }

    #[test]
    fn test_filter_requires_all_conditions() {
        let filter = Filter::new().eq("plugin_name", "core").eq("enabled", true);

        assert!(filter.matches(&doc(json!({"plugin_name": "core", "enabled": true}))));
        assert!(!filter.matches(&doc(json!({"plugin_name": "core", "enabled": false}))));
        assert!(!filter.matches(&doc(json!({"plugin_name": "core"}))));
    }

    #[test]
    fn test_filter_compares_types_strictly() {
        let filter = Filter::new().eq("n", 1);
        assert!(!filter.matches(&doc(json!({"n": "1"}))));
    }

    #[test]
    fn test_collection_name_validation() {
        for name in ["_configuration", "_schema", "posts", "a.b-c_1"] {
            assert!(validate_collection_name(name).is_ok(), "should accept {name}");
        }
        for name in ["", "with space", "semi;colon", "quote\"d"] {
            assert!(
                matches!(validate_collection_name(name), Err(StorageError::InvalidInput(_))),
                "should reject {name:?}"
            );
        }
    }

    #[test]
    fn test_filter_field_validation() {
        assert!(Filter::new().eq("plugin_name", "x").validate().is_ok());
        assert!(Filter::new().eq("", "x").validate().is_err());
        assert!(Filter::new().eq("a\"b", "x").validate().is_err());
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10).unwrap(), 0);
        assert_eq!(page_offset(3, 10).unwrap(), 20);
        assert!(page_offset(0, 10).is_err());
        assert!(page_offset(1, 0).is_err());
    }
}
