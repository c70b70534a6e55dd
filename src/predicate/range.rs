//! Range bounds and scalar values for term and range predicates.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::SearchBackend;
use crate::document::FieldValue;
use crate::error::Result;
use crate::predicate::spi::RangeBuilder;
use crate::predicate::BuilderState;
use crate::schema::field::FieldKind;

/// A scalar query value for term and range predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeValue {
    /// i64 integer value.
    Integer(i64),
    /// f64 floating-point value.
    Float(f64),
    /// Text value (compared lexicographically).
    Text(String),
    /// UTC timestamp value.
    Date(DateTime<Utc>),
}

impl RangeValue {
    /// Check whether this value can target a field of the given kind.
    ///
    /// Integer and float values are interchangeable across numeric
    /// fields; text and date values only target their own kind.
    pub fn compatible_with(&self, kind: FieldKind) -> bool {
        match self {
            RangeValue::Integer(_) | RangeValue::Float(_) => {
                matches!(kind, FieldKind::Integer | FieldKind::Float)
            }
            RangeValue::Text(_) => kind == FieldKind::Text,
            RangeValue::Date(_) => kind == FieldKind::Date,
        }
    }

    /// Get the name of this value's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RangeValue::Integer(_) => "integer",
            RangeValue::Float(_) => "float",
            RangeValue::Text(_) => "text",
            RangeValue::Date(_) => "date",
        }
    }

    /// Compare a document value against this query value.
    ///
    /// Numeric values compare across integer/float representations.
    /// Returns `None` for incomparable kinds.
    pub fn compare_document_value(&self, value: &FieldValue) -> Option<Ordering> {
        match (value, self) {
            (FieldValue::Integer(a), RangeValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), RangeValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), RangeValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::Float(a), RangeValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Text(a), RangeValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (FieldValue::Date(a), RangeValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Bound type for range predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bound<T> {
    /// Inclusive bound.
    Included(T),
    /// Exclusive bound.
    Excluded(T),
    /// Unbounded (no limit).
    Unbounded,
}

impl<T> Bound<T> {
    /// Get the bound value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Bound::Included(value) | Bound::Excluded(value) => Some(value),
            Bound::Unbounded => None,
        }
    }
}

impl Bound<RangeValue> {
    /// Check if a document value satisfies this bound as a lower bound.
    pub fn contains_lower(&self, value: &FieldValue) -> bool {
        match self {
            Bound::Included(bound) => matches!(
                bound.compare_document_value(value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Bound::Excluded(bound) => matches!(
                bound.compare_document_value(value),
                Some(Ordering::Greater)
            ),
            Bound::Unbounded => true,
        }
    }

    /// Check if a document value satisfies this bound as an upper bound.
    pub fn contains_upper(&self, value: &FieldValue) -> bool {
        match self {
            Bound::Included(bound) => matches!(
                bound.compare_document_value(value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Bound::Excluded(bound) => {
                matches!(bound.compare_document_value(value), Some(Ordering::Less))
            }
            Bound::Unbounded => true,
        }
    }
}

/// Builder for range predicates.
///
/// Bounds are checked against the field's kind as they are set, so a
/// text bound on a numeric field fails at the call site rather than at
/// build time.
pub struct RangePredicateBuilder<B: SearchBackend> {
    inner: Box<dyn RangeBuilder<B::Fragment>>,
    state: BuilderState,
}

impl<B: SearchBackend> RangePredicateBuilder<B> {
    pub(crate) fn new(inner: Box<dyn RangeBuilder<B::Fragment>>) -> Self {
        RangePredicateBuilder {
            inner,
            state: BuilderState::Accumulating,
        }
    }

    /// Require values greater than or equal to the given value.
    pub fn at_least(&mut self, value: RangeValue) -> Result<&mut Self> {
        self.state.ensure_accumulating("range")?;
        self.inner.lower(Bound::Included(value))?;
        Ok(self)
    }

    /// Require values strictly greater than the given value.
    pub fn greater_than(&mut self, value: RangeValue) -> Result<&mut Self> {
        self.state.ensure_accumulating("range")?;
        self.inner.lower(Bound::Excluded(value))?;
        Ok(self)
    }

    /// Require values less than or equal to the given value.
    pub fn at_most(&mut self, value: RangeValue) -> Result<&mut Self> {
        self.state.ensure_accumulating("range")?;
        self.inner.upper(Bound::Included(value))?;
        Ok(self)
    }

    /// Require values strictly less than the given value.
    pub fn less_than(&mut self, value: RangeValue) -> Result<&mut Self> {
        self.state.ensure_accumulating("range")?;
        self.inner.upper(Bound::Excluded(value))?;
        Ok(self)
    }

    /// Require values between the two given values, both inclusive.
    pub fn between(
        &mut self,
        lower: RangeValue,
        upper: RangeValue,
    ) -> Result<&mut Self> {
        self.at_least(lower)?.at_most(upper)
    }

    /// Set the boost factor.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("range")?;
        self.inner.boost(boost);
        Ok(self)
    }

    /// Compile into a backend fragment. Single-use.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("range")?;
        self.inner.build()
    }
}


impl<B: SearchBackend> std::fmt::Debug for RangePredicateBuilder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangePredicateBuilder")
            .field("state", &self.state)
            .finish()
    }
}
