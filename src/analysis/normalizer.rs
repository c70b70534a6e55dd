//! Normalizer implementations for query-side text.

use std::sync::Arc;

use crate::error::Result;

/// Trait for normalizers that transform query-side text into index form.
///
/// A normalizer is attached to a field through its
/// [`FieldDefinition`](crate::schema::field::FieldDefinition) and is
/// applied to term values and to the literal segments of wildcard
/// patterns at build time. Implementations must be deterministic: the
/// same input always yields the same output for a given field.
pub trait Normalizer: Send + Sync {
    /// Normalize the given text for the given field.
    fn normalize(&self, field: &str, text: &str) -> Result<String>;

    /// Get the name of this normalizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A normalizer that lowercases text using Unicode case mapping.
#[derive(Debug, Clone, Default)]
pub struct LowercaseNormalizer;

impl LowercaseNormalizer {
    /// Create a new lowercase normalizer.
    pub fn new() -> Self {
        LowercaseNormalizer
    }
}

impl Normalizer for LowercaseNormalizer {
    fn normalize(&self, _field: &str, text: &str) -> Result<String> {
        Ok(text.to_lowercase())
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// A normalizer that applies a chain of normalizers in order.
///
/// This is the composition point for custom normalization: build a
/// pipeline out of the steps the index-side analysis chain applies.
#[derive(Clone)]
pub struct NormalizerPipeline {
    steps: Vec<Arc<dyn Normalizer>>,
    name: String,
}

impl NormalizerPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        NormalizerPipeline {
            steps: Vec::new(),
            name: "pipeline".to_string(),
        }
    }

    /// Add a normalization step to the pipeline.
    pub fn add_step(mut self, step: Arc<dyn Normalizer>) -> Self {
        self.name = format!("{}_{}", self.name, step.name());
        self.steps.push(step);
        self
    }

    /// Set a custom name for this pipeline.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the steps in this pipeline.
    pub fn steps(&self) -> &[Arc<dyn Normalizer>] {
        &self.steps
    }
}

impl Default for NormalizerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for NormalizerPipeline {
    fn normalize(&self, field: &str, text: &str) -> Result<String> {
        let mut current = text.to_string();
        for step in &self.steps {
            current = step.normalize(field, &current)?;
        }
        Ok(current)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl std::fmt::Debug for NormalizerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizerPipeline")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}
