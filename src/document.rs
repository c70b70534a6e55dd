//! Document values for in-memory predicate evaluation.
//!
//! The native backend compiles predicates into query trees that can be
//! evaluated directly against a [`Document`]: a flexible, multi-valued
//! collection of field values keyed by absolute field path. Mapping
//! domain entities onto documents (and normalizing text values at
//! ingestion) is the job of an external collaborator; this module only
//! defines the value model the evaluator reads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value, stored in index (normalized) form.
    Text(String),
    /// i64 integer value.
    Integer(i64),
    /// f64 floating-point value.
    Float(f64),
    /// UTC timestamp value.
    Date(DateTime<Utc>),
    /// Geographical coordinates.
    Geo(GeoPoint),
}

/// A document: field paths mapped to one or more values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: HashMap<String, Vec<FieldValue>>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document {
            fields: HashMap::new(),
        }
    }

    /// Start building a document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Append a value to the given field path.
    pub fn add_value<S: Into<String>>(&mut self, path: S, value: FieldValue) {
        self.fields.entry(path.into()).or_default().push(value);
    }

    /// Get all values for the given field path.
    pub fn values(&self, path: &str) -> &[FieldValue] {
        self.fields.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether the document has any value for the given field path.
    pub fn has_field(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Get the number of fields with at least one value.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Add a text value.
    pub fn add_text<S: Into<String>, V: Into<String>>(mut self, path: S, value: V) -> Self {
        self.document.add_value(path, FieldValue::Text(value.into()));
        self
    }

    /// Add an integer value.
    pub fn add_integer<S: Into<String>>(mut self, path: S, value: i64) -> Self {
        self.document.add_value(path, FieldValue::Integer(value));
        self
    }

    /// Add a floating-point value.
    pub fn add_float<S: Into<String>>(mut self, path: S, value: f64) -> Self {
        self.document.add_value(path, FieldValue::Float(value));
        self
    }

    /// Add a timestamp value.
    pub fn add_date<S: Into<String>>(mut self, path: S, value: DateTime<Utc>) -> Self {
        self.document.add_value(path, FieldValue::Date(value));
        self
    }

    /// Add a geographical point value.
    pub fn add_geo<S: Into<String>>(mut self, path: S, value: GeoPoint) -> Self {
        self.document.add_value(path, FieldValue::Geo(value));
        self
    }

    /// Finish building the document.
    pub fn build(self) -> Document {
        self.document
    }
}
