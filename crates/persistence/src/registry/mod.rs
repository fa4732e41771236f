//! Collection schema registry.
//!
//! Collections must be registered before the store will touch them. The
//! registry maps each collection name to the column layout search operations
//! rely on: which document fields carry free text, which field holds the tag
//! array, and which fields hold the category and status values. Operations
//! against an unregistered collection fail with
//! [`QueryError::UnknownCollection`](crate::error::QueryError::UnknownCollection).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, StoreResult};

fn default_text_columns() -> Vec<String> {
    vec![
        "title".to_string(),
        "description".to_string(),
        "content".to_string(),
    ]
}

fn default_tag_column() -> String {
    "tags".to_string()
}

fn default_category_column() -> String {
    "category".to_string()
}

fn default_status_column() -> String {
    "status".to_string()
}

/// Search-relevant column layout of one collection.
///
/// # Examples
///
/// ```
/// use meridian_persistence::registry::CollectionSchema;
///
/// let schema = CollectionSchema::new("compliance_reports")
///     .with_text_columns(["title", "summary", "body"])
///     .with_category_column("framework");
/// assert_eq!(schema.name(), "compliance_reports");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// The collection name.
    name: String,

    /// Document fields searched by the free-text query.
    #[serde(default = "default_text_columns")]
    text_columns: Vec<String>,

    /// Document field holding the record's tag array.
    #[serde(default = "default_tag_column")]
    tag_column: String,

    /// Document field holding the record's category.
    #[serde(default = "default_category_column")]
    category_column: String,

    /// Document field holding the record's status.
    #[serde(default = "default_status_column")]
    status_column: String,
}

impl CollectionSchema {
    /// Creates a schema with the default column layout
    /// (`title`/`description`/`content` text columns, `tags`, `category`,
    /// `status`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text_columns: default_text_columns(),
            tag_column: default_tag_column(),
            category_column: default_category_column(),
            status_column: default_status_column(),
        }
    }

    /// Overrides the text-search columns.
    pub fn with_text_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.text_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the tag column.
    pub fn with_tag_column(mut self, column: impl Into<String>) -> Self {
        self.tag_column = column.into();
        self
    }

    /// Overrides the category column.
    pub fn with_category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = column.into();
        self
    }

    /// Overrides the status column.
    pub fn with_status_column(mut self, column: impl Into<String>) -> Self {
        self.status_column = column.into();
        self
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the text-search columns.
    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    /// Returns the tag column.
    pub fn tag_column(&self) -> &str {
        &self.tag_column
    }

    /// Returns the category column.
    pub fn category_column(&self) -> &str {
        &self.category_column
    }

    /// Returns the status column.
    pub fn status_column(&self) -> &str {
        &self.status_column
    }
}

/// Registry of known collections.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    collections: HashMap<String, CollectionSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the given schemas.
    ///
    /// # Errors
    ///
    /// Fails on duplicate collection names.
    pub fn with_collections(
        schemas: impl IntoIterator<Item = CollectionSchema>,
    ) -> StoreResult<Self> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Registers a collection schema.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::DuplicateCollection`] when the name is taken.
    pub fn register(&mut self, schema: CollectionSchema) -> StoreResult<()> {
        if self.collections.contains_key(schema.name()) {
            return Err(QueryError::DuplicateCollection {
                collection: schema.name().to_string(),
            }
            .into());
        }
        self.collections.insert(schema.name().to_string(), schema);
        Ok(())
    }

    /// Looks up a collection schema by name.
    pub fn get(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.get(name)
    }

    /// Returns `true` if the collection is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Returns the number of registered collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns `true` if no collections are registered.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Returns an iterator over registered collection names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}
