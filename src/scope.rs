//! Search scope: the frozen per-field capability registry.
//!
//! A [`SearchScope`] is built once from a schema and a backend. For
//! every declared field it asks the backend which query elements the
//! field supports, recording the factories in a per-field
//! [`QueryElementRegistry`]. After construction the scope is immutable;
//! predicate factories borrow it and concurrent readers need no
//! locking.

use std::sync::Arc;

use ahash::AHashMap;

use crate::backend::SearchBackend;
use crate::error::{KopisError, Result};
use crate::predicate::element::{
    QueryElementFactory, QueryElementKey, QueryElementKind, QueryElementRegistry,
};
use crate::predicate::factory::SearchPredicateFactory;
use crate::schema::field::{FieldDefinition, FieldKind};
use crate::schema::schema::Schema;

/// Per-field search metadata: the field's definition plus the query
/// elements its backend registered for it.
#[derive(Debug)]
pub struct FieldContext {
    path: String,
    definition: FieldDefinition,
    elements: QueryElementRegistry,
}

impl FieldContext {
    pub(crate) fn new(
        path: String,
        definition: FieldDefinition,
        elements: QueryElementRegistry,
    ) -> Self {
        FieldContext {
            path,
            definition,
            elements,
        }
    }

    /// Get the absolute path of this field.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the field definition.
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// Get the field kind.
    pub fn kind(&self) -> FieldKind {
        self.definition.kind()
    }

    /// Check whether this field is a nested object.
    pub fn is_nested(&self) -> bool {
        self.definition.is_nested()
    }

    /// Check whether this field supports the given element kind.
    pub fn supports(&self, kind: QueryElementKind) -> bool {
        self.elements.supports(kind)
    }

    /// Look up the factory for the given typed element key.
    ///
    /// Fails with [`KopisError::UnsupportedFieldType`] when the field's
    /// declared type has no factory under that key; the message names
    /// the field path, the requested element kind, and the actual field
    /// kind.
    pub fn query_element_factory<T: ?Sized + 'static>(
        &self,
        key: QueryElementKey<T>,
    ) -> Result<Arc<dyn QueryElementFactory<T>>> {
        self.elements.resolve(key).ok_or_else(|| {
            KopisError::unsupported_field_type(
                self.path.clone(),
                key.kind(),
                self.definition.kind(),
            )
        })
    }

    /// Resolve the factory for the given key and create a fresh builder.
    pub fn create_element<T: ?Sized + 'static>(&self, key: QueryElementKey<T>) -> Result<Box<T>> {
        self.query_element_factory(key)?.create(self)
    }
}

/// A search scope over one schema and one backend.
pub struct SearchScope<B: SearchBackend> {
    backend: B,
    fields: AHashMap<String, FieldContext>,
}

impl<B: SearchBackend> SearchScope<B> {
    /// Build a scope, letting the backend register query elements for
    /// every field in the schema.
    pub fn new(schema: &Schema, backend: B) -> Result<Self> {
        let mut fields = AHashMap::with_capacity(schema.len());
        for (path, definition) in schema.fields() {
            let mut registry = QueryElementRegistry::new();
            backend.register_field_elements(definition, &mut registry)?;
            fields.insert(
                path.to_string(),
                FieldContext::new(path.to_string(), definition.clone(), registry),
            );
        }
        Ok(SearchScope { backend, fields })
    }

    /// Get the backend this scope compiles for.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve a field context by path.
    ///
    /// Fails with [`KopisError::UnknownFieldPath`] for undeclared paths.
    pub fn field(&self, path: &str) -> Result<&FieldContext> {
        self.fields
            .get(path)
            .ok_or_else(|| KopisError::unknown_field_path(path))
    }

    /// Check whether a field path is declared.
    pub fn has_field(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Start building predicates against this scope.
    pub fn predicate(&self) -> SearchPredicateFactory<'_, B> {
        SearchPredicateFactory::new(self)
    }
}

impl<B: SearchBackend> std::fmt::Debug for SearchScope<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchScope")
            .field("backend", &self.backend.name())
            .field("fields", &self.fields.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeBackend;
    use crate::predicate::spi::keys;
    use crate::schema::field::FieldDefinition;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_field("title", FieldDefinition::text()).unwrap();
        schema.add_field("price", FieldDefinition::float()).unwrap();
        schema
            .add_field("location", FieldDefinition::geo_point())
            .unwrap();
        schema
    }

    #[test]
    fn test_scope_resolves_fields() {
        let scope = SearchScope::new(&schema(), NativeBackend::new()).unwrap();
        assert!(scope.has_field("title"));
        assert_eq!(scope.field("price").unwrap().kind(), FieldKind::Float);
    }

    #[test]
    fn test_unknown_path_propagates() {
        let scope = SearchScope::new(&schema(), NativeBackend::new()).unwrap();
        let err = scope.field("authors").unwrap_err();
        assert!(matches!(err, KopisError::UnknownFieldPath(path) if path == "authors"));
    }

    #[test]
    fn test_unsupported_element_error_names_field_and_kinds() {
        let scope = SearchScope::new(&schema(), NativeBackend::new()).unwrap();
        let field = scope.field("price").unwrap();
        let err = field
            .query_element_factory(keys::wildcard::<crate::backend::native::NativeQuery>())
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("price"));
        assert!(message.contains("wildcard"));
        assert!(message.contains("float"));
    }

    #[test]
    fn test_factories_yield_independent_builders() {
        let scope = SearchScope::new(&schema(), NativeBackend::new()).unwrap();
        let field = scope.field("title").unwrap();
        let factory = field
            .query_element_factory(keys::wildcard::<crate::backend::native::NativeQuery>())
            .unwrap();

        let mut first = factory.create(field).unwrap();
        let mut second = factory.create(field).unwrap();
        first.pattern("a*").unwrap();
        second.pattern("b*").unwrap();

        let first = first.build().unwrap();
        let second = second.build().unwrap();
        assert_ne!(format!("{first:?}"), format!("{second:?}"));
    }
}
