//! Term predicate: value equality on a single field.

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::predicate::range::RangeValue;
use crate::predicate::spi::TermBuilder;
use crate::predicate::BuilderState;

/// Builder for term predicates.
///
/// Matches documents where the field holds a value equal to the given
/// one. Text values pass through the field's normalizer at build time,
/// so a lowercase-normalized field matches case-insensitively.
pub struct TermPredicateBuilder<B: SearchBackend> {
    inner: Box<dyn TermBuilder<B::Fragment>>,
    state: BuilderState,
}

impl<B: SearchBackend> TermPredicateBuilder<B> {
    pub(crate) fn new(inner: Box<dyn TermBuilder<B::Fragment>>) -> Self {
        TermPredicateBuilder {
            inner,
            state: BuilderState::Accumulating,
        }
    }

    /// Set the value to match.
    pub fn value(&mut self, value: RangeValue) -> Result<&mut Self> {
        self.state.ensure_accumulating("term")?;
        self.inner.value(value)?;
        Ok(self)
    }

    /// Set the value to match from text.
    pub fn text<S: Into<String>>(&mut self, value: S) -> Result<&mut Self> {
        self.value(RangeValue::Text(value.into()))
    }

    /// Set the boost factor.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("term")?;
        self.inner.boost(boost);
        Ok(self)
    }

    /// Compile into a backend fragment. Single-use.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("term")?;
        self.inner.build()
    }
}

impl<B: SearchBackend> std::fmt::Debug for TermPredicateBuilder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermPredicateBuilder")
            .field("state", &self.state)
            .finish()
    }
}
