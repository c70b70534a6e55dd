//! Native query tree and its evaluation.

use std::sync::Arc;

use regex::Regex;

use crate::document::{Document, FieldValue};
use crate::error::{KopisError, Result};
use crate::geo::GeoShape;
use crate::predicate::range::{Bound, RangeValue};

/// A compiled native query.
///
/// The tree is immutable once built and safe to share across threads.
/// Evaluation is purely structural: a leaf matches when any of the
/// document's values for its field satisfies the leaf's condition, and
/// boolean nodes combine their clauses according to the clause algebra.
#[derive(Debug, Clone)]
pub enum NativeQuery {
    /// Matches every document.
    MatchAll {
        /// The boost factor.
        boost: f32,
    },
    /// Value equality on one field.
    Term(TermQuery),
    /// Pattern matching on one field.
    Wildcard(WildcardQuery),
    /// Bounded value range on one field.
    Range(RangeQuery),
    /// Spatial containment on one field.
    SpatialWithin(SpatialWithinQuery),
    /// Boolean combination of sub-queries.
    Bool(Box<BooleanQuery>),
}

impl NativeQuery {
    /// Check whether the document matches this query.
    pub fn matches(&self, document: &Document) -> bool {
        self.eval(document, false).is_some()
    }

    /// Evaluate the document, returning its score when it matches.
    ///
    /// Scores are structural: a matching leaf contributes its boost,
    /// boolean nodes sum the contributions of their `must` and matching
    /// `should` clauses and multiply by their own boost. `must_not` and
    /// `filter` clauses contribute nothing, and neither does anything
    /// nested inside a `filter` clause.
    pub fn score(&self, document: &Document) -> Option<f32> {
        self.eval(document, true)
    }

    /// Get a human-readable description of this query.
    pub fn description(&self) -> String {
        match self {
            NativeQuery::MatchAll { .. } => "*:*".to_string(),
            NativeQuery::Term(q) => format!("{}:{:?}", q.field, q.value),
            NativeQuery::Wildcard(q) => format!("{}:{}", q.field, q.pattern),
            NativeQuery::Range(q) => format!("{}:[{:?} TO {:?}]", q.field, q.lower, q.upper),
            NativeQuery::SpatialWithin(q) => format!("{}:within(..)", q.field),
            NativeQuery::Bool(q) => {
                let mut parts = Vec::new();
                for clause in &q.must {
                    parts.push(format!("+{}", clause.description()));
                }
                for clause in &q.filter {
                    parts.push(format!("#{}", clause.description()));
                }
                for clause in &q.should {
                    parts.push(clause.description());
                }
                for clause in &q.must_not {
                    parts.push(format!("-{}", clause.description()));
                }
                format!("({})", parts.join(" "))
            }
        }
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        match self {
            NativeQuery::MatchAll { boost } => Some(if scoring { *boost } else { 0.0 }),
            NativeQuery::Term(q) => q.eval(document, scoring),
            NativeQuery::Wildcard(q) => q.eval(document, scoring),
            NativeQuery::Range(q) => q.eval(document, scoring),
            NativeQuery::SpatialWithin(q) => q.eval(document, scoring),
            NativeQuery::Bool(q) => q.eval(document, scoring),
        }
    }
}

/// A query matching documents whose field holds an equal value.
#[derive(Debug, Clone)]
pub struct TermQuery {
    pub(crate) field: String,
    pub(crate) value: RangeValue,
    pub(crate) boost: f32,
}

impl TermQuery {
    /// Get the field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the (normalized) value.
    pub fn value(&self) -> &RangeValue {
        &self.value
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        let matched = document.values(&self.field).iter().any(|value| {
            self.value.compare_document_value(value) == Some(std::cmp::Ordering::Equal)
        });
        leaf_score(matched, scoring, self.boost)
    }
}

/// A query matching documents whose field holds a term matching a
/// wildcard pattern.
///
/// Supports `*` (zero or more characters), `?` (exactly one character),
/// and `\*`, `\?`, `\\` for literal occurrences. The pattern stored
/// here is already normalized; its literal/meta-character boundaries
/// are recoverable through [`WildcardQuery::pattern`].
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    pub(crate) field: String,
    pub(crate) pattern: String,
    pub(crate) regex: Arc<Regex>,
    pub(crate) boost: f32,
}

impl WildcardQuery {
    pub(crate) fn new(field: String, pattern: String, boost: f32) -> Result<Self> {
        let regex = compile_pattern(&pattern)?;
        Ok(WildcardQuery {
            field,
            pattern,
            regex: Arc::new(regex),
            boost,
        })
    }

    /// Get the field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the normalized wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    /// Check if a term matches the wildcard pattern.
    pub fn term_matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        let matched = document.values(&self.field).iter().any(|value| match value {
            FieldValue::Text(text) => self.regex.is_match(text),
            _ => false,
        });
        leaf_score(matched, scoring, self.boost)
    }
}

/// Compile a wildcard pattern into a regex.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut regex_pattern = String::new();
    regex_pattern.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                if i + 1 < chars.len() {
                    match chars[i + 1] {
                        '*' => {
                            regex_pattern.push_str("\\*");
                            i += 1;
                        }
                        '?' => {
                            regex_pattern.push_str("\\?");
                            i += 1;
                        }
                        c => {
                            regex_pattern.push('\\');
                            regex_pattern.push(c);
                            i += 1;
                        }
                    }
                } else {
                    regex_pattern.push('\\');
                }
            }
            '*' => {
                regex_pattern.push_str(".*");
            }
            '?' => {
                regex_pattern.push('.');
            }
            // Regex special characters that need escaping
            '^' | '$' | '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '|' => {
                regex_pattern.push('\\');
                regex_pattern.push(chars[i]);
            }
            c => {
                regex_pattern.push(c);
            }
        }
        i += 1;
    }

    regex_pattern.push('$');

    Regex::new(&regex_pattern)
        .map_err(|e| KopisError::analysis(format!("Invalid wildcard pattern: {e}")))
}

/// A query matching documents whose field value falls within a range.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    pub(crate) field: String,
    pub(crate) lower: Bound<RangeValue>,
    pub(crate) upper: Bound<RangeValue>,
    pub(crate) boost: f32,
}

impl RangeQuery {
    /// Get the field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the lower bound.
    pub fn lower_bound(&self) -> &Bound<RangeValue> {
        &self.lower
    }

    /// Get the upper bound.
    pub fn upper_bound(&self) -> &Bound<RangeValue> {
        &self.upper
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        let matched = document
            .values(&self.field)
            .iter()
            .any(|value| self.lower.contains_lower(value) && self.upper.contains_upper(value));
        leaf_score(matched, scoring, self.boost)
    }
}

/// A query matching documents whose field holds a point inside a shape.
#[derive(Debug, Clone)]
pub struct SpatialWithinQuery {
    pub(crate) field: String,
    pub(crate) shape: GeoShape,
    pub(crate) boost: f32,
}

impl SpatialWithinQuery {
    /// Get the field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the containment shape.
    pub fn shape(&self) -> &GeoShape {
        &self.shape
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        let matched = document.values(&self.field).iter().any(|value| match value {
            FieldValue::Geo(point) => self.shape.contains(point),
            _ => false,
        });
        leaf_score(matched, scoring, self.boost)
    }
}

/// A boolean combination of sub-queries.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    pub(crate) must: Vec<NativeQuery>,
    pub(crate) must_not: Vec<NativeQuery>,
    pub(crate) should: Vec<NativeQuery>,
    pub(crate) filter: Vec<NativeQuery>,
    /// Number of `should` clauses required to match, resolved at build
    /// time from the minimum-should-match constraints (or the default
    /// rule) against the actual clause count.
    pub(crate) minimum_should_match: usize,
    pub(crate) boost: f32,
}

impl BooleanQuery {
    /// Get the "must" clauses.
    pub fn must(&self) -> &[NativeQuery] {
        &self.must
    }

    /// Get the "must not" clauses.
    pub fn must_not(&self) -> &[NativeQuery] {
        &self.must_not
    }

    /// Get the "should" clauses.
    pub fn should(&self) -> &[NativeQuery] {
        &self.should
    }

    /// Get the "filter" clauses.
    pub fn filter(&self) -> &[NativeQuery] {
        &self.filter
    }

    /// Get the resolved number of required "should" clauses.
    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    /// Get the boost factor.
    pub fn boost(&self) -> f32 {
        self.boost
    }

    fn eval(&self, document: &Document, scoring: bool) -> Option<f32> {
        let mut score = 0.0;

        for clause in &self.must {
            score += clause.eval(document, scoring)?;
        }

        // Filter context is infectious: sub-queries are evaluated with
        // scoring off no matter what they contain.
        for clause in &self.filter {
            clause.eval(document, false)?;
        }

        for clause in &self.must_not {
            if clause.eval(document, false).is_some() {
                return None;
            }
        }

        let mut matching_should = 0;
        for clause in &self.should {
            if let Some(should_score) = clause.eval(document, scoring) {
                matching_should += 1;
                score += should_score;
            }
        }
        if matching_should < self.minimum_should_match {
            return None;
        }

        Some(if scoring { score * self.boost } else { 0.0 })
    }
}

fn leaf_score(matched: bool, scoring: bool, boost: f32) -> Option<f32> {
    if matched {
        Some(if scoring { boost } else { 0.0 })
    } else {
        None
    }
}
