//! The native backend and its query element factories.

use std::sync::Arc;

use crate::analysis::normalizer::Normalizer;
use crate::analysis::wildcard::normalize_wildcard_pattern;
use crate::backend::SearchBackend;
use crate::backend::native::query::{
    BooleanQuery, NativeQuery, RangeQuery, SpatialWithinQuery, TermQuery, WildcardQuery,
};
use crate::error::{KopisError, Result};
use crate::geo::GeoShape;
use crate::predicate::element::{QueryElementFactory, QueryElementRegistry};
use crate::predicate::minimum_should_match::MinimumShouldMatch;
use crate::predicate::range::{Bound, RangeValue};
use crate::predicate::spi::{
    keys, BooleanBuilder, ClauseAccumulator, RangeBuilder, SpatialWithinBuilder, TermBuilder,
    WildcardBuilder,
};
use crate::schema::field::{FieldDefinition, FieldKind};
use crate::scope::FieldContext;

/// The native query-tree compilation target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    /// Create a new native backend.
    pub fn new() -> Self {
        NativeBackend
    }
}

impl SearchBackend for NativeBackend {
    type Fragment = NativeQuery;

    fn name(&self) -> &'static str {
        "native"
    }

    fn register_field_elements(
        &self,
        field: &FieldDefinition,
        registry: &mut QueryElementRegistry,
    ) -> Result<()> {
        match field.kind() {
            FieldKind::Text => {
                registry.register(keys::term::<NativeQuery>(), Arc::new(NativeTermFactory))?;
                registry.register(
                    keys::wildcard::<NativeQuery>(),
                    Arc::new(NativeWildcardFactory),
                )?;
                registry.register(keys::range::<NativeQuery>(), Arc::new(NativeRangeFactory))?;
            }
            FieldKind::Integer | FieldKind::Float | FieldKind::Date => {
                registry.register(keys::term::<NativeQuery>(), Arc::new(NativeTermFactory))?;
                registry.register(keys::range::<NativeQuery>(), Arc::new(NativeRangeFactory))?;
            }
            FieldKind::GeoPoint => {
                registry.register(
                    keys::spatial_within::<NativeQuery>(),
                    Arc::new(NativeSpatialWithinFactory),
                )?;
            }
            FieldKind::Object => {}
        }
        Ok(())
    }

    fn boolean_builder(&self) -> Box<dyn BooleanBuilder<NativeQuery>> {
        Box::new(NativeBooleanBuilder::new())
    }

    fn match_all(&self, boost: f32) -> NativeQuery {
        NativeQuery::MatchAll { boost }
    }
}

/// Per-field construction state shared by the leaf builders.
struct FieldState {
    path: String,
    kind: FieldKind,
    normalizer: Option<Arc<dyn Normalizer>>,
}

impl FieldState {
    fn of(field: &FieldContext) -> Self {
        FieldState {
            path: field.path().to_string(),
            kind: field.kind(),
            normalizer: field.definition().normalizer().cloned(),
        }
    }

    fn check_value(&self, value: &RangeValue) -> Result<()> {
        if !value.compatible_with(self.kind) {
            return Err(KopisError::query(format!(
                "{} value is not valid for field '{}' of type '{}'",
                value.kind_name(),
                self.path,
                self.kind
            )));
        }
        Ok(())
    }

    /// Run text values through the field's normalizer; other values
    /// pass through unchanged.
    fn normalize_value(&self, value: RangeValue) -> Result<RangeValue> {
        match (value, &self.normalizer) {
            (RangeValue::Text(text), Some(normalizer)) => Ok(RangeValue::Text(
                normalizer.normalize(&self.path, &text)?,
            )),
            (value, _) => Ok(value),
        }
    }
}

struct NativeTermFactory;

impl QueryElementFactory<dyn TermBuilder<NativeQuery>> for NativeTermFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn TermBuilder<NativeQuery>>> {
        Ok(Box::new(NativeTermBuilder {
            field: FieldState::of(field),
            value: None,
            boost: 1.0,
        }))
    }
}

struct NativeTermBuilder {
    field: FieldState,
    value: Option<RangeValue>,
    boost: f32,
}

impl TermBuilder<NativeQuery> for NativeTermBuilder {
    fn value(&mut self, value: RangeValue) -> Result<()> {
        self.field.check_value(&value)?;
        self.value = Some(value);
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<NativeQuery> {
        let value = self.value.take().ok_or_else(|| {
            KopisError::query(format!(
                "term predicate on field '{}' requires a value",
                self.field.path
            ))
        })?;
        let value = self.field.normalize_value(value)?;
        Ok(NativeQuery::Term(TermQuery {
            field: self.field.path.clone(),
            value,
            boost: self.boost,
        }))
    }
}

struct NativeWildcardFactory;

impl QueryElementFactory<dyn WildcardBuilder<NativeQuery>> for NativeWildcardFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn WildcardBuilder<NativeQuery>>> {
        Ok(Box::new(NativeWildcardBuilder {
            field: FieldState::of(field),
            pattern: None,
            boost: 1.0,
        }))
    }
}

struct NativeWildcardBuilder {
    field: FieldState,
    pattern: Option<String>,
    boost: f32,
}

impl WildcardBuilder<NativeQuery> for NativeWildcardBuilder {
    fn pattern(&mut self, pattern: &str) -> Result<()> {
        self.pattern = Some(pattern.to_string());
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<NativeQuery> {
        let pattern = self.pattern.take().ok_or_else(|| {
            KopisError::query(format!(
                "wildcard predicate on field '{}' requires a pattern",
                self.field.path
            ))
        })?;
        let normalized = normalize_wildcard_pattern(
            self.field.normalizer.as_deref(),
            &self.field.path,
            &pattern,
        )?;
        Ok(NativeQuery::Wildcard(WildcardQuery::new(
            self.field.path.clone(),
            normalized,
            self.boost,
        )?))
    }
}

struct NativeRangeFactory;

impl QueryElementFactory<dyn RangeBuilder<NativeQuery>> for NativeRangeFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn RangeBuilder<NativeQuery>>> {
        Ok(Box::new(NativeRangeBuilder {
            field: FieldState::of(field),
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            boost: 1.0,
        }))
    }
}

struct NativeRangeBuilder {
    field: FieldState,
    lower: Bound<RangeValue>,
    upper: Bound<RangeValue>,
    boost: f32,
}

impl NativeRangeBuilder {
    fn check_bound(&self, bound: &Bound<RangeValue>) -> Result<()> {
        if let Some(value) = bound.value() {
            self.field.check_value(value)?;
        }
        Ok(())
    }

    fn normalize_bound(&self, bound: Bound<RangeValue>) -> Result<Bound<RangeValue>> {
        Ok(match bound {
            Bound::Included(value) => Bound::Included(self.field.normalize_value(value)?),
            Bound::Excluded(value) => Bound::Excluded(self.field.normalize_value(value)?),
            Bound::Unbounded => Bound::Unbounded,
        })
    }
}

impl RangeBuilder<NativeQuery> for NativeRangeBuilder {
    fn lower(&mut self, bound: Bound<RangeValue>) -> Result<()> {
        self.check_bound(&bound)?;
        self.lower = bound;
        Ok(())
    }

    fn upper(&mut self, bound: Bound<RangeValue>) -> Result<()> {
        self.check_bound(&bound)?;
        self.upper = bound;
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<NativeQuery> {
        let lower_taken = std::mem::replace(&mut self.lower, Bound::Unbounded);
        let upper_taken = std::mem::replace(&mut self.upper, Bound::Unbounded);
        let lower = self.normalize_bound(lower_taken)?;
        let upper = self.normalize_bound(upper_taken)?;
        Ok(NativeQuery::Range(RangeQuery {
            field: self.field.path.clone(),
            lower,
            upper,
            boost: self.boost,
        }))
    }
}

struct NativeSpatialWithinFactory;

impl QueryElementFactory<dyn SpatialWithinBuilder<NativeQuery>> for NativeSpatialWithinFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn SpatialWithinBuilder<NativeQuery>>> {
        Ok(Box::new(NativeSpatialWithinBuilder {
            field: field.path().to_string(),
            shape: None,
            boost: 1.0,
        }))
    }
}

struct NativeSpatialWithinBuilder {
    field: String,
    shape: Option<GeoShape>,
    boost: f32,
}

impl SpatialWithinBuilder<NativeQuery> for NativeSpatialWithinBuilder {
    fn shape(&mut self, shape: GeoShape) -> Result<()> {
        self.shape = Some(shape);
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<NativeQuery> {
        let shape = self.shape.take().ok_or_else(|| {
            KopisError::query(format!(
                "spatial_within predicate on field '{}' requires a shape",
                self.field
            ))
        })?;
        Ok(NativeQuery::SpatialWithin(SpatialWithinQuery {
            field: self.field.clone(),
            shape,
            boost: self.boost,
        }))
    }
}

/// Native boolean combiner over the shared clause accumulator.
struct NativeBooleanBuilder {
    accumulator: ClauseAccumulator<NativeQuery>,
    built: bool,
}

impl NativeBooleanBuilder {
    fn new() -> Self {
        NativeBooleanBuilder {
            accumulator: ClauseAccumulator::new(),
            built: false,
        }
    }
}

impl BooleanBuilder<NativeQuery> for NativeBooleanBuilder {
    fn must(&mut self, clause: NativeQuery) {
        self.accumulator.must.push(clause);
    }

    fn must_not(&mut self, clause: NativeQuery) {
        self.accumulator.must_not.push(clause);
    }

    fn should(&mut self, clause: NativeQuery) {
        self.accumulator.should.push(clause);
    }

    fn filter(&mut self, clause: NativeQuery) {
        self.accumulator.filter.push(clause);
    }

    fn minimum_should_match(&mut self, constraints: MinimumShouldMatch) {
        self.accumulator.minimum_should_match = constraints;
    }

    fn boost(&mut self, boost: f32) {
        self.accumulator.boost = boost;
    }

    fn build(&mut self) -> Result<NativeQuery> {
        if self.built {
            return Err(KopisError::illegal_reuse("boolean"));
        }
        self.built = true;

        let accumulator = std::mem::take(&mut self.accumulator);
        let minimum_should_match = accumulator.resolve_minimum_should_match()?;

        if accumulator.is_empty() {
            return Ok(NativeQuery::MatchAll {
                boost: accumulator.boost,
            });
        }

        Ok(NativeQuery::Bool(Box::new(BooleanQuery {
            must: accumulator.must,
            must_not: accumulator.must_not,
            should: accumulator.should,
            filter: accumulator.filter,
            minimum_should_match,
            boost: accumulator.boost,
        })))
    }
}
