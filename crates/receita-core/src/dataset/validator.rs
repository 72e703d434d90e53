//! # Span Validation
//!
//! Filters raw annotations against their source text. Malformed spans are
//! expected noise in a hand-labeled corpus, so they are dropped, never raised.

use std::fmt;

use tracing::debug;

use crate::types::{char_len, char_slice, RawEntity, Span};

/// Why a raw annotation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// `start < 0`.
    NegativeStart,
    /// `end` runs past the end of the text.
    EndOutOfBounds,
    /// `start >= end`.
    EmptyRange,
    /// The covered text is whitespace only.
    Blank,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NegativeStart => write!(f, "negative start"),
            Rejection::EndOutOfBounds => write!(f, "end past text length"),
            Rejection::EmptyRange => write!(f, "start not before end"),
            Rejection::Blank => write!(f, "whitespace-only span"),
        }
    }
}

/// Checks a single annotation against `text`.
///
/// `text_len` is the character length of `text`, passed in so callers
/// validating many spans count it once.
pub fn check(text: &str, text_len: usize, raw: &RawEntity) -> Result<Span, Rejection> {
    if raw.start < 0 {
        return Err(Rejection::NegativeStart);
    }
    // Negative `end` with a valid `start` is an empty range, not an overflow.
    if raw.end > 0 && raw.end as u64 > text_len as u64 {
        return Err(Rejection::EndOutOfBounds);
    }
    if raw.start >= raw.end {
        return Err(Rejection::EmptyRange);
    }

    let (start, end) = (raw.start as usize, raw.end as usize);
    match char_slice(text, start, end) {
        Some(surface) if !surface.trim().is_empty() => Ok(Span::new(start, end, raw.label.clone())),
        Some(_) => Err(Rejection::Blank),
        None => Err(Rejection::EndOutOfBounds),
    }
}

/// Returns the valid spans of `raw`, in input order.
pub fn validate(text: &str, raw: &[RawEntity]) -> Vec<Span> {
    let text_len = char_len(text);
    raw.iter()
        .filter_map(|entity| match check(text, text_len, entity) {
            Ok(span) => Some(span),
            Err(reason) => {
                debug!(
                    start = entity.start,
                    end = entity.end,
                    label = %entity.label,
                    %reason,
                    "dropping annotation"
                );
                None
            }
        })
        .collect()
}
