use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

use super::entity::Label;

/// An entity annotation exactly as it appears in the corpus.
///
/// Offsets are signed because hand-labeled data may contain negative values;
/// nothing checks them until [`crate::dataset::validate`] runs. Integers
/// outside the `i64` range saturate, so they are rejected as out of bounds
/// instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(deserialize_with = "saturating_offset")]
    pub start: i64,
    #[serde(deserialize_with = "saturating_offset")]
    pub end: i64,
    pub label: Label,
}

fn saturating_offset<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct OffsetVisitor;

    impl Visitor<'_> for OffsetVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer character offset")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<i64, E> {
            Ok(v.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }

        // Integer literals too large for u64 arrive as floats.
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_i64(OffsetVisitor)
}

impl RawEntity {
    pub fn new(start: i64, end: i64, label: impl Into<Label>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// A validated, half-open character span `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: Label,
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<Label>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// The `(start, end)` key used for exact boundary matching.
    #[must_use]
    pub fn key(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Surface text of this span inside `text`, if the offsets fit.
    #[must_use]
    pub fn surface<'a>(&self, text: &'a str) -> Option<&'a str> {
        char_slice(text, self.start, self.end)
    }
}

/// One annotated text with its validated gold spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub entities: Vec<Span>,
}

impl Example {
    pub fn new(text: impl Into<String>, entities: Vec<Span>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }
}

/// One entity produced by a prediction backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedEntity {
    pub text: String,
    pub label: Label,
    pub start: usize,
    pub end: usize,
}

impl PredictedEntity {
    /// Builds a prediction, copying the surface text out of `source`.
    ///
    /// Offsets are trusted; the surface is empty when they fall outside `source`.
    pub fn from_source(source: &str, start: usize, end: usize, label: impl Into<Label>) -> Self {
        Self {
            text: char_slice(source, start, end).unwrap_or_default().to_string(),
            label: label.into(),
            start,
            end,
        }
    }

    #[must_use]
    pub fn to_span(&self) -> Span {
        Span::new(self.start, self.end, self.label.clone())
    }
}

/// Length of `text` in characters.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slices `text` by character offsets `[start, end)`.
///
/// Returns `None` when the range is inverted or runs past the end of `text`.
#[must_use]
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let byte_at = |idx: usize| -> Option<usize> {
        if idx == 0 {
            return Some(0);
        }
        match text.char_indices().nth(idx) {
            Some((byte, _)) => Some(byte),
            None if char_len(text) == idx => Some(text.len()),
            None => None,
        }
    };
    let from = byte_at(start)?;
    let to = byte_at(end)?;
    text.get(from..to)
}
