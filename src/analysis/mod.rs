//! Text normalization for pattern and value matching.
//!
//! This module hosts the text-normalization capability consumed by
//! predicate builders: a [`Normalizer`](normalizer::Normalizer) turns raw
//! query-side text into the form the index stores, and the wildcard
//! helper applies a normalizer to a pattern without disturbing its
//! meta-characters. Tokenizing analyzers live in the external analysis
//! subsystem; this crate only consumes the normalization contract.

pub mod normalizer;
pub mod wildcard;

pub use self::normalizer::{LowercaseNormalizer, Normalizer, NormalizerPipeline};
pub use self::wildcard::normalize_wildcard_pattern;
