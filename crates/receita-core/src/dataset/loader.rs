//! # Corpus Loading
//!
//! Reads an annotated corpus of the form
//!
//! ```json
//! { "annotations": [ { "text": "...", "entities": [ { "start": 0, "end": 3, "label": "QUANTIDADE" } ] } ] }
//! ```
//!
//! validates every span and keeps only records with at least one surviving
//! entity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::dataset::validator::validate;
use crate::error::{ReceitaError, Result};
use crate::types::{Example, RawEntity};

/// Validated examples plus the processing report.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub examples: Vec<Example>,
    pub stats: DatasetStats,
}

impl Dataset {
    /// The last `n` examples (or all of them if there are fewer).
    #[must_use]
    pub fn tail(&self, n: usize) -> &[Example] {
        let skip = self.examples.len().saturating_sub(n);
        &self.examples[skip..]
    }
}

/// Aggregate statistics gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Records present in the source.
    pub total_records: usize,
    /// Records with at least one valid entity.
    pub valid_records: usize,
    /// Annotations rejected by span validation.
    pub dropped_spans: usize,
    /// Validated entity count per label, across kept records.
    pub label_counts: BTreeMap<String, usize>,
}

impl DatasetStats {
    /// Total validated entities across all labels.
    #[must_use]
    pub fn total_entities(&self) -> usize {
        self.label_counts.values().sum()
    }

    /// `(label, count, share)` triples, `share` in `[0.0, 1.0]`.
    #[must_use]
    pub fn label_distribution(&self) -> Vec<(&str, usize, f64)> {
        let total = self.total_entities();
        self.label_counts
            .iter()
            .map(|(label, &count)| {
                let share = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (label.as_str(), count, share)
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct RawRecord {
    text: String,
    entities: Vec<RawEntity>,
}

/// Loads and validates a corpus file.
///
/// # Errors
///
/// Returns `ReceitaError::Io` if the file cannot be read and
/// `ReceitaError::DataFormat` if its contents are not a valid corpus.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    info!(path = %path.display(), "loading corpus");
    parse_corpus(&contents)
}

/// Parses and validates a corpus held in memory.
///
/// # Errors
///
/// Returns `ReceitaError::DataFormat` if the input is not JSON, has no
/// top-level `annotations` array, or a record is missing `text`/`entities`.
pub fn parse_corpus(input: &str) -> Result<Dataset> {
    let mut root: Value = serde_json::from_str(input)
        .map_err(|e| ReceitaError::data_format("<root>", e.to_string()))?;

    let annotations = match root.get_mut("annotations") {
        Some(Value::Array(records)) => std::mem::take(records),
        Some(_) => {
            return Err(ReceitaError::data_format(
                "annotations",
                "expected an array of records",
            ));
        }
        None => {
            return Err(ReceitaError::data_format(
                "annotations",
                "missing top-level field",
            ));
        }
    };

    let mut examples = Vec::new();
    let mut stats = DatasetStats {
        total_records: annotations.len(),
        ..DatasetStats::default()
    };

    for (idx, value) in annotations.into_iter().enumerate() {
        let record = RawRecord::deserialize(value)
            .map_err(|e| ReceitaError::data_format(format!("annotations[{idx}]"), e.to_string()))?;

        let entities = validate(&record.text, &record.entities);
        stats.dropped_spans += record.entities.len() - entities.len();
        if entities.is_empty() {
            continue;
        }

        for span in &entities {
            *stats.label_counts.entry(span.label.to_string()).or_insert(0) += 1;
        }
        examples.push(Example::new(record.text, entities));
    }
    stats.valid_records = examples.len();

    log_stats(&stats);
    Ok(Dataset { examples, stats })
}

fn log_stats(stats: &DatasetStats) {
    info!(
        total = stats.total_records,
        valid = stats.valid_records,
        dropped_spans = stats.dropped_spans,
        "corpus processed"
    );
    for (label, count, share) in stats.label_distribution() {
        info!(label, count, "entity distribution: {:.1}%", share * 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityType, Span};
    use std::io::Write;

    const CORPUS: &str = r#"{
        "annotations": [
            {
                "text": "2 xícaras de farinha",
                "entities": [
                    {"start": 0, "end": 9, "label": "QUANTIDADE"},
                    {"start": 13, "end": 20, "label": "INGREDIENTE"}
                ]
            },
            {
                "text": "sal a gosto",
                "entities": [
                    {"start": 8, "end": 40, "label": "QUANTIDADE"}
                ]
            },
            {
                "text": "3 ovos",
                "entities": [
                    {"start": 2, "end": 6, "label": "INGREDIENTE"},
                    {"start": -1, "end": 1, "label": "QUANTIDADE"}
                ]
            },
            {
                "text": "sem anotação",
                "entities": []
            }
        ]
    }"#;

    #[test]
    fn test_parse_corpus_filters_records() {
        let dataset = parse_corpus(CORPUS).unwrap();
        assert_eq!(dataset.stats.total_records, 4);
        assert_eq!(dataset.stats.valid_records, 2);
        assert_eq!(dataset.stats.dropped_spans, 2);
        assert_eq!(dataset.examples.len(), 2);

        assert_eq!(dataset.examples[0].text, "2 xícaras de farinha");
        assert_eq!(
            dataset.examples[1].entities,
            vec![Span::new(2, 6, EntityType::Ingrediente)]
        );
    }

    #[test]
    fn test_label_distribution() {
        let dataset = parse_corpus(CORPUS).unwrap();
        let stats = &dataset.stats;
        assert_eq!(stats.total_entities(), 3);
        assert_eq!(stats.label_counts["INGREDIENTE"], 2);
        assert_eq!(stats.label_counts["QUANTIDADE"], 1);

        let total_share: f64 = stats.label_distribution().iter().map(|(_, _, s)| s).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_annotations_field() {
        let err = parse_corpus(r#"{"records": []}"#).unwrap_err();
        match err {
            ReceitaError::DataFormat { field, .. } => assert_eq!(field, "annotations"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_annotations_not_an_array() {
        let err = parse_corpus(r#"{"annotations": {"text": "x"}}"#).unwrap_err();
        assert!(err.to_string().contains("annotations"));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_corpus("{ not json").unwrap_err();
        assert!(matches!(err, ReceitaError::DataFormat { .. }));
    }

    #[test]
    fn test_record_missing_text() {
        let err = parse_corpus(r#"{"annotations": [{"entities": []}]}"#).unwrap_err();
        match err {
            ReceitaError::DataFormat { field, reason } => {
                assert_eq!(field, "annotations[0]");
                assert!(reason.contains("text"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_offsets_dropped_not_fatal() {
        let input = r#"{"annotations": [
            {"text": "sal grosso", "entities": [
                {"start": 0, "end": 3, "label": "INGREDIENTE"},
                {"start": 0, "end": 18446744073709551615, "label": "QUANTIDADE"},
                {"start": 4, "end": 100000000000000000000000, "label": "QUANTIDADE"}
            ]}
        ]}"#;

        let dataset = parse_corpus(input).unwrap();
        assert_eq!(dataset.examples.len(), 1);
        assert_eq!(
            dataset.examples[0].entities,
            vec![Span::new(0, 3, EntityType::Ingrediente)]
        );
        assert_eq!(dataset.stats.dropped_spans, 2);
        assert!(!dataset.stats.label_counts.contains_key("QUANTIDADE"));
    }

    #[test]
    fn test_stats_serialize() {
        let dataset = parse_corpus(CORPUS).unwrap();
        let json = serde_json::to_value(&dataset.stats).unwrap();
        assert_eq!(json["total_records"], 4);
        assert_eq!(json["valid_records"], 2);
        assert_eq!(json["dropped_spans"], 2);
        assert_eq!(json["label_counts"]["INGREDIENTE"], 2);
    }

    #[test]
    fn test_empty_corpus() {
        let dataset = parse_corpus(r#"{"annotations": []}"#).unwrap();
        assert!(dataset.examples.is_empty());
        assert_eq!(dataset.stats, DatasetStats::default());
        assert!(dataset.stats.label_distribution().is_empty());
    }

    #[test]
    fn test_tail() {
        let dataset = parse_corpus(CORPUS).unwrap();
        assert_eq!(dataset.tail(1).len(), 1);
        assert_eq!(dataset.tail(1)[0].text, "3 ovos");
        assert_eq!(dataset.tail(49).len(), 2);
    }

    #[test]
    fn test_load_corpus_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CORPUS.as_bytes()).unwrap();

        let dataset = load_corpus(file.path()).unwrap();
        assert_eq!(dataset.examples.len(), 2);
    }

    #[test]
    fn test_load_corpus_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReceitaError::Io(_)));
    }
}
