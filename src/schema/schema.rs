//! Schema: the set of searchable fields and their definitions.

use std::collections::HashMap;

use crate::error::{KopisError, Result};
use crate::schema::field::FieldDefinition;

/// A schema maps absolute, dot-separated field paths to their
/// definitions.
///
/// Paths are unique and definitions immutable once added. Sub-fields of
/// object fields are declared with their full path (`"author.name"`);
/// the object field itself is declared separately when its metadata
/// (nested status) matters to queries.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Map of field paths to their definitions
    fields: HashMap<String, FieldDefinition>,
    /// Ordered list of field paths (for consistent iteration)
    field_paths: Vec<String>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Schema {
            fields: HashMap::new(),
            field_paths: Vec::new(),
        }
    }

    /// Add a field to the schema.
    pub fn add_field<S: Into<String>>(
        &mut self,
        path: S,
        definition: FieldDefinition,
    ) -> Result<()> {
        let path = path.into();

        if path.is_empty() {
            return Err(KopisError::schema("Field path cannot be empty"));
        }
        if self.fields.contains_key(&path) {
            return Err(KopisError::schema(format!(
                "Field '{path}' already exists"
            )));
        }

        self.field_paths.push(path.clone());
        self.fields.insert(path, definition);
        Ok(())
    }

    /// Get the definition for a field path.
    ///
    /// Fails with [`KopisError::UnknownFieldPath`] if the path is not
    /// declared.
    pub fn field(&self, path: &str) -> Result<&FieldDefinition> {
        self.fields
            .get(path)
            .ok_or_else(|| KopisError::unknown_field_path(path))
    }

    /// Check whether a field path is declared.
    pub fn has_field(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Get all field paths in declaration order.
    pub fn field_paths(&self) -> &[String] {
        &self.field_paths
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.field_paths
            .iter()
            .map(|path| (path.as_str(), &self.fields[path]))
    }

    /// Get the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldKind;

    #[test]
    fn test_add_and_resolve_fields() {
        let mut schema = Schema::new();
        schema.add_field("title", FieldDefinition::text()).unwrap();
        schema
            .add_field("author.name", FieldDefinition::text())
            .unwrap();
        schema.add_field("price", FieldDefinition::float()).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.field("price").unwrap().kind(), FieldKind::Float);
        assert_eq!(
            schema.field_paths(),
            &["title", "author.name", "price"]
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut schema = Schema::new();
        schema.add_field("title", FieldDefinition::text()).unwrap();
        let result = schema.add_field("title", FieldDefinition::text());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut schema = Schema::new();
        assert!(schema.add_field("", FieldDefinition::text()).is_err());
    }

    #[test]
    fn test_unknown_path_error() {
        let schema = Schema::new();
        let err = schema.field("missing").unwrap_err();
        assert!(matches!(err, KopisError::UnknownFieldPath(path) if path == "missing"));
    }
}
