//! Wildcard-aware normalization.
//!
//! A wildcard pattern mixes literal text with the meta-characters `*`
//! (zero or more characters) and `?` (exactly one character); `\*`, `\?`
//! and `\\` escape a literal occurrence. Normalization must only be
//! applied to the literal segments between meta-characters — the
//! meta-characters themselves carry pattern structure and must survive
//! unchanged.

use crate::analysis::normalizer::Normalizer;
use crate::error::{KopisError, Result};

/// One structural segment of a wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// A run of literal text, with escapes already resolved.
    Literal(String),
    /// The `*` meta-character.
    Many,
    /// The `?` meta-character.
    Single,
}

/// Normalize a wildcard pattern for the given field.
///
/// Literal segments are passed through the field's normalizer; `*` and
/// `?` meta-characters are preserved literally. Fails with
/// [`KopisError::InvalidWildcardPattern`] when the pattern ends in a
/// dangling escape or when normalization corrupts a meta-character
/// region (the normalized literal no longer contains the same
/// meta-characters as the raw literal did).
pub fn normalize_wildcard_pattern(
    normalizer: Option<&dyn Normalizer>,
    field: &str,
    pattern: &str,
) -> Result<String> {
    let segments = parse_segments(field, pattern)?;

    let mut result = String::with_capacity(pattern.len());
    for segment in segments {
        match segment {
            Segment::Many => result.push('*'),
            Segment::Single => result.push('?'),
            Segment::Literal(raw) => {
                let normalized = match normalizer {
                    Some(normalizer) => normalizer.normalize(field, &raw)?,
                    None => raw.clone(),
                };
                if meta_char_counts(&normalized) != meta_char_counts(&raw) {
                    return Err(KopisError::invalid_wildcard_pattern(
                        field,
                        pattern,
                        format!(
                            "normalization altered wildcard meta-characters in literal segment '{raw}'"
                        ),
                    ));
                }
                push_escaped(&mut result, &normalized);
            }
        }
    }

    Ok(result)
}

/// Split a pattern into literal and meta segments, resolving escapes.
fn parse_segments(field: &str, pattern: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => literal.push(escaped),
                None => {
                    return Err(KopisError::invalid_wildcard_pattern(
                        field,
                        pattern,
                        "pattern ends with a dangling escape character",
                    ));
                }
            },
            '*' | '?' => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(if c == '*' {
                    Segment::Many
                } else {
                    Segment::Single
                });
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Count occurrences of characters that carry pattern structure.
fn meta_char_counts(text: &str) -> (usize, usize, usize) {
    let mut stars = 0;
    let mut questions = 0;
    let mut backslashes = 0;
    for c in text.chars() {
        match c {
            '*' => stars += 1,
            '?' => questions += 1,
            '\\' => backslashes += 1,
            _ => {}
        }
    }
    (stars, questions, backslashes)
}

/// Append literal text, escaping characters that would read as pattern structure.
fn push_escaped(result: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '*' | '?' | '\\') {
            result.push('\\');
        }
        result.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::LowercaseNormalizer;

    struct Injecting;
    impl Normalizer for Injecting {
        fn normalize(&self, _field: &str, text: &str) -> Result<String> {
            Ok(text.replace('o', "*"))
        }
        fn name(&self) -> &'static str {
            "injecting"
        }
    }

    #[test]
    fn test_literal_segments_are_normalized_and_metas_kept() {
        let normalizer = LowercaseNormalizer::new();
        let result = normalize_wildcard_pattern(Some(&normalizer), "title", "Wor*").unwrap();
        assert_eq!(result, "wor*");

        let result = normalize_wildcard_pattern(Some(&normalizer), "title", "H?LLO*X").unwrap();
        assert_eq!(result, "h?llo*x");
    }

    #[test]
    fn test_no_normalizer_leaves_pattern_unchanged() {
        let result = normalize_wildcard_pattern(None, "title", "Wor*d?").unwrap();
        assert_eq!(result, "Wor*d?");
    }

    #[test]
    fn test_escaped_metas_survive_normalization() {
        let normalizer = LowercaseNormalizer::new();
        let result = normalize_wildcard_pattern(Some(&normalizer), "title", "A\\*B*").unwrap();
        assert_eq!(result, "a\\*b*");
    }

    #[test]
    fn test_injected_meta_characters_are_rejected() {
        let err = normalize_wildcard_pattern(Some(&Injecting), "title", "Word*").unwrap_err();
        match err {
            KopisError::InvalidWildcardPattern { field, pattern, .. } => {
                assert_eq!(field, "title");
                assert_eq!(pattern, "Word*");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_escape_is_rejected() {
        let err = normalize_wildcard_pattern(None, "title", "abc\\").unwrap_err();
        assert!(matches!(err, KopisError::InvalidWildcardPattern { .. }));
    }
}
