//! Wildcard predicate: pattern matching with `*` and `?`.

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::predicate::spi::WildcardBuilder;
use crate::predicate::BuilderState;

/// Builder for wildcard predicates.
///
/// The pattern's literal segments are normalized through the field's
/// normalization capability when the predicate is built; `*` and `?`
/// keep their pattern meaning, `\*`, `\?` and `\\` escape literals.
pub struct WildcardPredicateBuilder<B: SearchBackend> {
    inner: Box<dyn WildcardBuilder<B::Fragment>>,
    state: BuilderState,
}

impl<B: SearchBackend> WildcardPredicateBuilder<B> {
    pub(crate) fn new(inner: Box<dyn WildcardBuilder<B::Fragment>>) -> Self {
        WildcardPredicateBuilder {
            inner,
            state: BuilderState::Accumulating,
        }
    }

    /// Set the wildcard pattern.
    pub fn pattern(&mut self, pattern: &str) -> Result<&mut Self> {
        self.state.ensure_accumulating("wildcard")?;
        self.inner.pattern(pattern)?;
        Ok(self)
    }

    /// Set the boost factor.
    pub fn boost(&mut self, boost: f32) -> Result<&mut Self> {
        self.state.ensure_accumulating("wildcard")?;
        self.inner.boost(boost);
        Ok(self)
    }

    /// Compile into a backend fragment. Single-use.
    ///
    /// Pattern normalization runs here; it fails with
    /// `InvalidWildcardPattern` if the normalizer corrupts a
    /// meta-character region.
    pub fn build(&mut self) -> Result<B::Fragment> {
        self.state.mark_built("wildcard")?;
        self.inner.build()
    }
}

impl<B: SearchBackend> std::fmt::Debug for WildcardPredicateBuilder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WildcardPredicateBuilder")
            .field("state", &self.state)
            .finish()
    }
}
