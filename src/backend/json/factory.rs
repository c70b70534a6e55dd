//! The JSON backend and its query element factories.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::analysis::normalizer::Normalizer;
use crate::analysis::wildcard::normalize_wildcard_pattern;
use crate::backend::SearchBackend;
use crate::error::{KopisError, Result};
use crate::geo::{GeoPoint, GeoShape};
use crate::predicate::element::{QueryElementFactory, QueryElementRegistry};
use crate::predicate::minimum_should_match::{MinimumShouldMatch, MinimumShouldMatchRule};
use crate::predicate::range::{Bound, RangeValue};
use crate::predicate::spi::{
    keys, BooleanBuilder, ClauseAccumulator, RangeBuilder, SpatialWithinBuilder, TermBuilder,
    WildcardBuilder,
};
use crate::schema::field::{FieldDefinition, FieldKind};
use crate::scope::FieldContext;

/// The JSON query-tree compilation target.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBackend;

impl JsonBackend {
    /// Create a new JSON backend.
    pub fn new() -> Self {
        JsonBackend
    }
}

impl SearchBackend for JsonBackend {
    type Fragment = Value;

    fn name(&self) -> &'static str {
        "json"
    }

    fn register_field_elements(
        &self,
        field: &FieldDefinition,
        registry: &mut QueryElementRegistry,
    ) -> Result<()> {
        match field.kind() {
            FieldKind::Text => {
                registry.register(keys::term::<Value>(), Arc::new(JsonTermFactory))?;
                registry.register(keys::wildcard::<Value>(), Arc::new(JsonWildcardFactory))?;
                registry.register(keys::range::<Value>(), Arc::new(JsonRangeFactory))?;
            }
            FieldKind::Integer | FieldKind::Float | FieldKind::Date => {
                registry.register(keys::term::<Value>(), Arc::new(JsonTermFactory))?;
                registry.register(keys::range::<Value>(), Arc::new(JsonRangeFactory))?;
            }
            FieldKind::GeoPoint => {
                registry.register(
                    keys::spatial_within::<Value>(),
                    Arc::new(JsonSpatialWithinFactory),
                )?;
            }
            FieldKind::Object => {}
        }
        Ok(())
    }

    fn boolean_builder(&self) -> Box<dyn BooleanBuilder<Value>> {
        Box::new(JsonBooleanBuilder::new())
    }

    fn match_all(&self, boost: f32) -> Value {
        match_all_fragment(boost)
    }
}

fn match_all_fragment(boost: f32) -> Value {
    if boost == 1.0 {
        json!({ "match_all": {} })
    } else {
        json!({ "match_all": { "boost": boost } })
    }
}

/// Wrap an inner object under a single query-kind key.
fn wrap(kind: &str, inner: Value) -> Value {
    let mut outer = Map::new();
    outer.insert(kind.to_string(), inner);
    Value::Object(outer)
}

/// Wrap a per-field body under the field's path key.
fn field_object(field: &str, body: Map<String, Value>) -> Value {
    let mut object = Map::new();
    object.insert(field.to_string(), Value::Object(body));
    Value::Object(object)
}

fn scalar_to_json(value: &RangeValue) -> Value {
    match value {
        RangeValue::Integer(i) => json!(i),
        RangeValue::Float(f) => json!(f),
        RangeValue::Text(s) => json!(s),
        RangeValue::Date(d) => json!(d.to_rfc3339()),
    }
}

fn point_to_json(point: &GeoPoint) -> Value {
    json!({ "lat": point.lat, "lon": point.lon })
}

/// Render constraints into the engine's combined string form.
///
/// A single threshold-0 constraint renders as its bare value (`"2"`,
/// `"75%"`); anything else as space-joined `threshold<value` entries
/// (`"3<90%"`).
fn format_minimum_should_match(constraints: &MinimumShouldMatch) -> String {
    let entries: Vec<_> = constraints.constraints().collect();
    if let [(0, rule)] = entries.as_slice() {
        return format_rule(*rule);
    }
    entries
        .iter()
        .map(|(threshold, rule)| format!("{threshold}<{}", format_rule(*rule)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_rule(rule: MinimumShouldMatchRule) -> String {
    match rule {
        MinimumShouldMatchRule::Number(number) => number.to_string(),
        MinimumShouldMatchRule::Percent(percent) => format!("{percent}%"),
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

    fn normalize_value(&self, value: RangeValue) -> Result<RangeValue> {
        match (value, &self.normalizer) {
            (RangeValue::Text(text), Some(normalizer)) => Ok(RangeValue::Text(
                normalizer.normalize(&self.path, &text)?,
            )),
            (value, _) => Ok(value),
        }
    }
}

struct JsonTermFactory;

impl QueryElementFactory<dyn TermBuilder<Value>> for JsonTermFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn TermBuilder<Value>>> {
        Ok(Box::new(JsonTermBuilder {
            field: FieldState::of(field),
            value: None,
            boost: 1.0,
        }))
    }
}

struct JsonTermBuilder {
    field: FieldState,
    value: Option<RangeValue>,
    boost: f32,
}

impl TermBuilder<Value> for JsonTermBuilder {
    fn value(&mut self, value: RangeValue) -> Result<()> {
        self.field.check_value(&value)?;
        self.value = Some(value);
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<Value> {
        let value = self.value.take().ok_or_else(|| {
            KopisError::query(format!(
                "term predicate on field '{}' requires a value",
                self.field.path
            ))
        })?;
        let value = self.field.normalize_value(value)?;

        let mut body = Map::new();
        body.insert("value".to_string(), scalar_to_json(&value));
        if self.boost != 1.0 {
            body.insert("boost".to_string(), json!(self.boost));
        }
        Ok(wrap("term", field_object(&self.field.path, body)))
    }
}

struct JsonWildcardFactory;

impl QueryElementFactory<dyn WildcardBuilder<Value>> for JsonWildcardFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn WildcardBuilder<Value>>> {
        Ok(Box::new(JsonWildcardBuilder {
            field: FieldState::of(field),
            pattern: None,
            boost: 1.0,
        }))
    }
}

struct JsonWildcardBuilder {
    field: FieldState,
    pattern: Option<String>,
    boost: f32,
}

impl WildcardBuilder<Value> for JsonWildcardBuilder {
    fn pattern(&mut self, pattern: &str) -> Result<()> {
        self.pattern = Some(pattern.to_string());
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<Value> {
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

        let mut body = Map::new();
        body.insert("value".to_string(), json!(normalized));
        if self.boost != 1.0 {
            body.insert("boost".to_string(), json!(self.boost));
        }
        Ok(wrap("wildcard", field_object(&self.field.path, body)))
    }
}

struct JsonRangeFactory;

impl QueryElementFactory<dyn RangeBuilder<Value>> for JsonRangeFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn RangeBuilder<Value>>> {
        Ok(Box::new(JsonRangeBuilder {
            field: FieldState::of(field),
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            boost: 1.0,
        }))
    }
}

struct JsonRangeBuilder {
    field: FieldState,
    lower: Bound<RangeValue>,
    upper: Bound<RangeValue>,
    boost: f32,
}

impl JsonRangeBuilder {
    fn check_bound(&self, bound: &Bound<RangeValue>) -> Result<()> {
        if let Some(value) = bound.value() {
            self.field.check_value(value)?;
        }
        Ok(())
    }
}

impl RangeBuilder<Value> for JsonRangeBuilder {
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

    fn build(&mut self) -> Result<Value> {
        let mut body = Map::new();
        match std::mem::replace(&mut self.lower, Bound::Unbounded) {
            Bound::Included(value) => {
                let value = self.field.normalize_value(value)?;
                body.insert("gte".to_string(), scalar_to_json(&value));
            }
            Bound::Excluded(value) => {
                let value = self.field.normalize_value(value)?;
                body.insert("gt".to_string(), scalar_to_json(&value));
            }
            Bound::Unbounded => {}
        }
        match std::mem::replace(&mut self.upper, Bound::Unbounded) {
            Bound::Included(value) => {
                let value = self.field.normalize_value(value)?;
                body.insert("lte".to_string(), scalar_to_json(&value));
            }
            Bound::Excluded(value) => {
                let value = self.field.normalize_value(value)?;
                body.insert("lt".to_string(), scalar_to_json(&value));
            }
            Bound::Unbounded => {}
        }
        if self.boost != 1.0 {
            body.insert("boost".to_string(), json!(self.boost));
        }
        Ok(wrap("range", field_object(&self.field.path, body)))
    }
}

struct JsonSpatialWithinFactory;

impl QueryElementFactory<dyn SpatialWithinBuilder<Value>> for JsonSpatialWithinFactory {
    fn create(&self, field: &FieldContext) -> Result<Box<dyn SpatialWithinBuilder<Value>>> {
        Ok(Box::new(JsonSpatialWithinBuilder {
            field: field.path().to_string(),
            shape: None,
            boost: 1.0,
        }))
    }
}

struct JsonSpatialWithinBuilder {
    field: String,
    shape: Option<GeoShape>,
    boost: f32,
}

impl SpatialWithinBuilder<Value> for JsonSpatialWithinBuilder {
    fn shape(&mut self, shape: GeoShape) -> Result<()> {
        self.shape = Some(shape);
        Ok(())
    }

    fn boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn build(&mut self) -> Result<Value> {
        let shape = self.shape.take().ok_or_else(|| {
            KopisError::query(format!(
                "spatial_within predicate on field '{}' requires a shape",
                self.field
            ))
        })?;

        let (kind, mut body) = match shape {
            GeoShape::BoundingBox(bounding_box) => {
                let mut body = Map::new();
                body.insert(
                    self.field.clone(),
                    json!({
                        "top_left": point_to_json(&bounding_box.top_left),
                        "bottom_right": point_to_json(&bounding_box.bottom_right),
                    }),
                );
                ("geo_bounding_box", body)
            }
            GeoShape::Circle(circle) => {
                let mut body = Map::new();
                body.insert(
                    "distance".to_string(),
                    json!(format!("{}m", circle.radius_meters)),
                );
                body.insert(self.field.clone(), point_to_json(&circle.center));
                ("geo_distance", body)
            }
            GeoShape::Polygon(polygon) => {
                let points: Vec<Value> = polygon.points.iter().map(point_to_json).collect();
                let mut body = Map::new();
                body.insert(self.field.clone(), json!({ "points": points }));
                ("geo_polygon", body)
            }
        };
        if self.boost != 1.0 {
            body.insert("boost".to_string(), json!(self.boost));
        }
        Ok(wrap(kind, Value::Object(body)))
    }
}

/// JSON boolean combiner over the shared clause accumulator.
struct JsonBooleanBuilder {
    accumulator: ClauseAccumulator<Value>,
    built: bool,
}

impl JsonBooleanBuilder {
    fn new() -> Self {
        JsonBooleanBuilder {
            accumulator: ClauseAccumulator::new(),
            built: false,
        }
    }
}

impl BooleanBuilder<Value> for JsonBooleanBuilder {
    fn must(&mut self, clause: Value) {
        self.accumulator.must.push(clause);
    }

    fn must_not(&mut self, clause: Value) {
        self.accumulator.must_not.push(clause);
    }

    fn should(&mut self, clause: Value) {
        self.accumulator.should.push(clause);
    }

    fn filter(&mut self, clause: Value) {
        self.accumulator.filter.push(clause);
    }

    fn minimum_should_match(&mut self, constraints: MinimumShouldMatch) {
        self.accumulator.minimum_should_match = constraints;
    }

    fn boost(&mut self, boost: f32) {
        self.accumulator.boost = boost;
    }

    fn build(&mut self) -> Result<Value> {
        if self.built {
            return Err(KopisError::illegal_reuse("boolean"));
        }
        self.built = true;

        let accumulator = std::mem::take(&mut self.accumulator);

        // Validate the constraints against the actual clause count now;
        // the engine-side string below carries the same semantics.
        accumulator
            .minimum_should_match
            .resolve(accumulator.should.len())?;

        if accumulator.is_empty() {
            return Ok(match_all_fragment(accumulator.boost));
        }

        let mut body = Map::new();
        if !accumulator.must.is_empty() {
            body.insert("must".to_string(), Value::Array(accumulator.must));
        }
        if !accumulator.filter.is_empty() {
            body.insert("filter".to_string(), Value::Array(accumulator.filter));
        }
        if !accumulator.should.is_empty() {
            body.insert("should".to_string(), Value::Array(accumulator.should));
        }
        if !accumulator.must_not.is_empty() {
            body.insert("must_not".to_string(), Value::Array(accumulator.must_not));
        }
        if !accumulator.minimum_should_match.is_empty() {
            body.insert(
                "minimum_should_match".to_string(),
                json!(format_minimum_should_match(
                    &accumulator.minimum_should_match
                )),
            );
        }
        if accumulator.boost != 1.0 {
            body.insert("boost".to_string(), json!(accumulator.boost));
        }
        Ok(wrap("bool", Value::Object(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::LowercaseNormalizer;
    use crate::schema::field::FieldDefinition;
    use crate::schema::schema::Schema;
    use crate::scope::SearchScope;

    fn scope() -> SearchScope<JsonBackend> {
        let mut schema = Schema::new();
        schema
            .add_field(
                "title",
                FieldDefinition::text().with_normalizer(Arc::new(LowercaseNormalizer::new())),
            )
            .unwrap();
        schema.add_field("price", FieldDefinition::float()).unwrap();
        schema
            .add_field("location", FieldDefinition::geo_point())
            .unwrap();
        SearchScope::new(&schema, JsonBackend::new()).unwrap()
    }

    #[test]
    fn test_wildcard_fragment_shape() {
        let scope = scope();
        let mut builder = scope.predicate().wildcard("title").unwrap();
        builder.pattern("Wor*").unwrap().boost(2.0).unwrap();
        let fragment = builder.build().unwrap();

        assert_eq!(
            fragment,
            json!({ "wildcard": { "title": { "value": "wor*", "boost": 2.0 } } })
        );
    }

    #[test]
    fn test_range_fragment_shape() {
        let scope = scope();
        let mut builder = scope.predicate().range("price").unwrap();
        builder
            .at_least(RangeValue::Float(10.0))
            .unwrap()
            .less_than(RangeValue::Float(20.0))
            .unwrap();
        let fragment = builder.build().unwrap();

        assert_eq!(
            fragment,
            json!({ "range": { "price": { "gte": 10.0, "lt": 20.0 } } })
        );
    }

    #[test]
    fn test_bool_fragment_shape_and_msm_string() {
        let scope = scope();
        let factory = scope.predicate();

        let mut first = factory.term("title").unwrap();
        first.text("rust").unwrap();
        let first = first.build().unwrap();

        let mut second = factory.term("title").unwrap();
        second.text("search").unwrap();
        let second = second.build().unwrap();

        let mut builder = factory.boolean();
        builder.should(first).unwrap().should(second).unwrap();
        builder.minimum_should_match_number(2).unwrap();
        let fragment = builder.build().unwrap();

        assert_eq!(fragment["bool"]["minimum_should_match"], json!("2"));
        assert_eq!(fragment["bool"]["should"].as_array().unwrap().len(), 2);
        assert!(fragment["bool"].get("must").is_none());
    }

    #[test]
    fn test_msm_string_forms() {
        let mut single_percent = MinimumShouldMatch::new();
        single_percent
            .add(0, MinimumShouldMatchRule::Percent(75))
            .unwrap();
        assert_eq!(format_minimum_should_match(&single_percent), "75%");

        let mut conditional = MinimumShouldMatch::new();
        conditional
            .add(3, MinimumShouldMatchRule::Percent(90))
            .unwrap();
        assert_eq!(format_minimum_should_match(&conditional), "3<90%");

        let mut multiple = MinimumShouldMatch::new();
        multiple.add(0, MinimumShouldMatchRule::Number(1)).unwrap();
        multiple
            .add(5, MinimumShouldMatchRule::Percent(50))
            .unwrap();
        assert_eq!(format_minimum_should_match(&multiple), "0<1 5<50%");
    }

    #[test]
    fn test_geo_distance_fragment_shape() {
        let scope = scope();
        let mut builder = scope.predicate().spatial_within(["location"]).unwrap();
        builder
            .circle(GeoPoint::new(35.0, 139.0).unwrap(), 1500.0)
            .unwrap();
        let fragment = builder.build().unwrap();

        assert_eq!(
            fragment,
            json!({
                "geo_distance": {
                    "distance": "1500m",
                    "location": { "lat": 35.0, "lon": 139.0 }
                }
            })
        );
    }

    #[test]
    fn test_empty_boolean_is_match_all() {
        let scope = scope();
        let fragment = scope.predicate().boolean().build().unwrap();
        assert_eq!(fragment, json!({ "match_all": {} }));
    }
}
