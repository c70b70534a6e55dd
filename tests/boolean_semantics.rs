//! Integration tests for boolean clause algebra on the native backend.

use std::sync::Arc;

use kopis::backend::native::NativeQuery;
use kopis::prelude::*;

fn scope() -> SearchScope<NativeBackend> {
    let mut schema = Schema::new();
    schema
        .add_field(
            "title",
            FieldDefinition::text().with_normalizer(Arc::new(LowercaseNormalizer::new())),
        )
        .unwrap();
    schema.add_field("body", FieldDefinition::text()).unwrap();
    schema.add_field("tags", FieldDefinition::text()).unwrap();
    schema.add_field("year", FieldDefinition::integer()).unwrap();
    schema.add_field("price", FieldDefinition::float()).unwrap();
    schema
        .add_field("location", FieldDefinition::geo_point())
        .unwrap();
    schema
        .add_field("office", FieldDefinition::geo_point())
        .unwrap();
    SearchScope::new(&schema, NativeBackend::new()).unwrap()
}

fn term(
    scope: &SearchScope<NativeBackend>,
    field: &str,
    value: &str,
) -> NativeQuery {
    let mut builder = scope.predicate().term(field).unwrap();
    builder.text(value).unwrap();
    builder.build().unwrap()
}

fn doc_with_tags(tags: &[&str]) -> Document {
    let mut builder = Document::builder();
    for tag in tags {
        builder = builder.add_text("tags", *tag);
    }
    builder.build()
}

#[test]
fn test_pure_should_requires_at_least_one_match() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder
        .should(term(&scope, "tags", "rust"))?
        .should(term(&scope, "tags", "search"))?
        .should(term(&scope, "tags", "engine"))?;
    let query = builder.build()?;

    assert!(query.matches(&doc_with_tags(&["rust"])));
    assert!(query.matches(&doc_with_tags(&["search", "other"])));
    assert!(!query.matches(&doc_with_tags(&["unrelated"])));
    Ok(())
}

#[test]
fn test_should_is_optional_next_to_must() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder
        .must(term(&scope, "title", "rust"))?
        .should(term(&scope, "tags", "systems"))?
        .should(term(&scope, "tags", "performance"))?;
    let query = builder.build()?;

    // No should clause matches, but the must clause anchors the match.
    let document = Document::builder().add_text("title", "rust").build();
    assert!(query.matches(&document));

    // The must clause still gates matching.
    assert!(!query.matches(&doc_with_tags(&["systems"])));
    Ok(())
}

#[test]
fn test_should_is_optional_next_to_filter() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder
        .filter(term(&scope, "title", "rust"))?
        .should(term(&scope, "tags", "systems"))?;
    let query = builder.build()?;

    let document = Document::builder().add_text("title", "rust").build();
    assert!(query.matches(&document));
    Ok(())
}

#[test]
fn test_explicit_constraint_overrides_optional_should() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder
        .must(term(&scope, "title", "rust"))?
        .should(term(&scope, "tags", "systems"))?
        .should(term(&scope, "tags", "performance"))?;
    builder.minimum_should_match_number(1)?;
    let query = builder.build()?;

    let title_only = Document::builder().add_text("title", "rust").build();
    assert!(!query.matches(&title_only));

    let with_tag = Document::builder()
        .add_text("title", "rust")
        .add_text("tags", "systems")
        .build();
    assert!(query.matches(&with_tag));
    Ok(())
}

#[test]
fn test_must_not_excludes_matches() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder
        .must(term(&scope, "title", "rust"))?
        .must_not(term(&scope, "tags", "deprecated"))?;
    let query = builder.build()?;

    let clean = Document::builder().add_text("title", "rust").build();
    assert!(query.matches(&clean));

    let flagged = Document::builder()
        .add_text("title", "rust")
        .add_text("tags", "deprecated")
        .build();
    assert!(!query.matches(&flagged));
    Ok(())
}

#[test]
fn test_filter_is_scoring_neutral_even_when_nested() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let document = Document::builder()
        .add_text("title", "rust")
        .add_text("tags", "systems")
        .add_text("body", "fast")
        .build();

    // Baseline: a single scored must clause.
    let mut baseline = factory.boolean();
    baseline.must(term(&scope, "title", "rust"))?;
    let baseline = baseline.build()?;

    // Same must clause plus a filter whose nested boolean contains
    // must/should clauses that all match the document.
    let mut nested = factory.boolean();
    nested
        .must(term(&scope, "tags", "systems"))?
        .should(term(&scope, "body", "fast"))?;
    let nested = nested.build()?;

    let mut filtered = factory.boolean();
    filtered
        .must(term(&scope, "title", "rust"))?
        .filter(nested)?;
    let filtered = filtered.build()?;

    assert!(filtered.matches(&document));
    assert_eq!(baseline.score(&document), filtered.score(&document));
    Ok(())
}

#[test]
fn test_must_and_should_both_contribute_to_score() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let document = Document::builder()
        .add_text("title", "rust")
        .add_text("tags", "systems")
        .build();

    let mut must_only = factory.boolean();
    must_only.must(term(&scope, "title", "rust"))?;
    let must_only = must_only.build()?;

    let mut with_should = factory.boolean();
    with_should
        .must(term(&scope, "title", "rust"))?
        .should(term(&scope, "tags", "systems"))?;
    let with_should = with_should.build()?;

    let base = must_only.score(&document).unwrap();
    let raised = with_should.score(&document).unwrap();
    assert!(raised > base, "{raised} should exceed {base}");
    Ok(())
}

#[test]
fn test_minimum_should_match_thresholds_against_clause_count() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();
    let tags = ["t0", "t1", "t2", "t3", "t4", "t5"];

    // Three should clauses: the threshold-0 rule applies, requiring 1.
    let mut builder = factory.boolean();
    for tag in &tags[..3] {
        builder.should(term(&scope, "tags", tag))?;
    }
    builder
        .minimum_should_match()
        .if_more_than(0)
        .then_require_number(1)?
        .if_more_than(5)
        .then_require_percent(50)?;
    let query = builder.build()?;

    assert!(query.matches(&doc_with_tags(&["t0"])));

    // Six should clauses: the threshold-5 rule applies, requiring
    // ceil(6 * 50 / 100) = 3.
    let mut builder = factory.boolean();
    for tag in &tags {
        builder.should(term(&scope, "tags", tag))?;
    }
    builder
        .minimum_should_match()
        .if_more_than(0)
        .then_require_number(1)?
        .if_more_than(5)
        .then_require_percent(50)?;
    let query = builder.build()?;

    assert!(!query.matches(&doc_with_tags(&["t0", "t1"])));
    assert!(query.matches(&doc_with_tags(&["t0", "t1", "t2"])));
    Ok(())
}

#[test]
fn test_builder_is_not_reusable_after_build() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder.must(term(&scope, "title", "rust"))?;
    builder.build()?;

    let clause = term(&scope, "title", "other");
    let err = builder.must(clause).unwrap_err();
    assert!(matches!(err, KopisError::IllegalBuilderReuse { .. }));

    let err = builder.build().unwrap_err();
    assert!(matches!(err, KopisError::IllegalBuilderReuse { .. }));

    // Leaf builders behave the same way.
    let mut wildcard = factory.wildcard("title")?;
    wildcard.pattern("ru*")?;
    wildcard.build()?;
    let err = wildcard.pattern("other*").unwrap_err();
    assert!(matches!(err, KopisError::IllegalBuilderReuse { .. }));
    Ok(())
}

#[test]
fn test_wildcard_normalizes_literals_and_keeps_metas() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.wildcard("title")?;
    builder.pattern("Wor*")?;
    let query = builder.build()?;

    // Decompiling the fragment recovers the literal/meta boundaries.
    match &query {
        NativeQuery::Wildcard(wildcard) => {
            assert_eq!(wildcard.pattern(), "wor*");
        }
        other => panic!("unexpected query: {other:?}"),
    }

    let document = Document::builder().add_text("title", "world").build();
    assert!(query.matches(&document));
    Ok(())
}

#[test]
fn test_wildcard_on_numeric_field_is_unsupported() {
    let scope = scope();
    let factory = scope.predicate();

    let err = factory.wildcard("year").unwrap_err();
    match &err {
        KopisError::UnsupportedFieldType {
            field,
            element,
            field_kind,
        } => {
            assert_eq!(field, "year");
            assert_eq!(*element, QueryElementKind::Wildcard);
            assert_eq!(*field_kind, FieldKind::Integer);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_multi_field_spatial_matches_on_any_field() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.spatial_within(["location", "office"])?;
    builder.bounding_box(GeoBoundingBox::new(
        GeoPoint::new(10.0, -10.0)?,
        GeoPoint::new(-10.0, 10.0)?,
    )?)?;
    let query = builder.build()?;

    // Only the second targeted field satisfies the bound.
    let document = Document::builder()
        .add_geo("location", GeoPoint::new(50.0, 50.0)?)
        .add_geo("office", GeoPoint::new(0.0, 0.0)?)
        .build();
    assert!(query.matches(&document));

    let outside = Document::builder()
        .add_geo("location", GeoPoint::new(50.0, 50.0)?)
        .add_geo("office", GeoPoint::new(-50.0, 50.0)?)
        .build();
    assert!(!query.matches(&outside));
    Ok(())
}

#[test]
fn test_range_and_boost_evaluation() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.range("price")?;
    builder
        .at_least(RangeValue::Float(10.0))?
        .less_than(RangeValue::Float(20.0))?
        .boost(2.0)?;
    let query = builder.build()?;

    let document = Document::builder().add_float("price", 15.0).build();
    assert!(query.matches(&document));
    assert_eq!(query.score(&document), Some(2.0));
    assert!(!query.matches(&Document::builder().add_float("price", 25.0).build()));
    Ok(())
}

#[test]
fn test_contributor_functions_attach_synchronously() -> Result<()> {
    let scope = scope();
    let factory = scope.predicate();

    let mut builder = factory.boolean();
    builder.must_with(|f| {
        let mut term = f.term("title")?;
        term.text("Rust")?;
        term.build()
    })?;
    builder.should_with(|f| {
        let mut wildcard = f.wildcard("body")?;
        wildcard.pattern("fast*")?;
        wildcard.build()
    })?;
    let query = builder.build()?;

    let document = Document::builder().add_text("title", "rust").build();
    assert!(query.matches(&document));
    Ok(())
}

#[test]
fn test_zero_clause_boolean_matches_everything() -> Result<()> {
    let scope = scope();
    let query = scope.predicate().boolean().build()?;

    assert!(query.matches(&Document::new()));
    assert!(query.matches(&doc_with_tags(&["anything"])));
    Ok(())
}
