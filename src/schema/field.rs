//! Field definitions for schema declaration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::Normalizer;

/// The semantic kind of a field.
///
/// The kind decides which query elements a backend registers for the
/// field: a wildcard factory is only ever registered for text fields, a
/// spatial factory only for geo-point fields, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Full-text or keyword content.
    Text,
    /// i64 integer values.
    Integer,
    /// f64 floating-point values.
    Float,
    /// UTC timestamp values.
    Date,
    /// Geographical coordinates.
    GeoPoint,
    /// A container for sub-fields; matches no leaf predicate itself.
    Object,
}

impl FieldKind {
    /// Get the name of this field kind.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Date => "date",
            FieldKind::GeoPoint => "geo_point",
            FieldKind::Object => "object",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The per-field type descriptor: kind, normalization capability, and
/// object/nested status.
///
/// Immutable once added to a [`Schema`](crate::schema::Schema).
#[derive(Clone)]
pub struct FieldDefinition {
    kind: FieldKind,
    normalizer: Option<Arc<dyn Normalizer>>,
    nested: bool,
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("kind", &self.kind)
            .field(
                "normalizer",
                &self.normalizer.as_ref().map(|n| n.name()),
            )
            .field("nested", &self.nested)
            .finish()
    }
}

impl FieldDefinition {
    fn new(kind: FieldKind) -> Self {
        FieldDefinition {
            kind,
            normalizer: None,
            nested: false,
        }
    }

    /// Create a text field definition.
    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    /// Create an integer field definition.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Create a floating-point field definition.
    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    /// Create a date field definition.
    pub fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    /// Create a geo-point field definition.
    pub fn geo_point() -> Self {
        Self::new(FieldKind::GeoPoint)
    }

    /// Create an object field definition.
    pub fn object() -> Self {
        Self::new(FieldKind::Object)
    }

    /// Attach a normalization capability to this field.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Mark this object field as nested.
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Get the field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Get the normalization capability, if any.
    pub fn normalizer(&self) -> Option<&Arc<dyn Normalizer>> {
        self.normalizer.as_ref()
    }

    /// Check whether this field is a nested object.
    pub fn is_nested(&self) -> bool {
        self.nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::LowercaseNormalizer;

    #[test]
    fn test_field_kind_names() {
        assert_eq!(FieldKind::Text.name(), "text");
        assert_eq!(FieldKind::GeoPoint.name(), "geo_point");
        assert_eq!(format!("{}", FieldKind::Float), "float");
    }

    #[test]
    fn test_field_definition_construction() {
        let definition =
            FieldDefinition::text().with_normalizer(Arc::new(LowercaseNormalizer::new()));
        assert_eq!(definition.kind(), FieldKind::Text);
        assert!(definition.normalizer().is_some());
        assert!(!definition.is_nested());

        let definition = FieldDefinition::object().nested(true);
        assert_eq!(definition.kind(), FieldKind::Object);
        assert!(definition.is_nested());
    }
}
