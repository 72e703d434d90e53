//! # Receita Core
//!
//! Data and correctness contracts for food-text named-entity recognition
//! (`QUANTIDADE` and `INGREDIENTE` spans): span validation, corpus loading,
//! exact-match span scoring and micro-averaged metrics.
//!
//! ## Quick Start
//!
//! ```rust
//! use receita_core::dataset::parse_corpus;
//! use receita_core::eval::{EvalConfig, EvaluationRunner};
//! use receita_core::tagger::{EntityTrainer, LexiconTrainer};
//!
//! let corpus = r#"{"annotations": [
//!     {"text": "2 xícaras de farinha", "entities": [
//!         {"start": 0, "end": 9, "label": "QUANTIDADE"},
//!         {"start": 13, "end": 20, "label": "INGREDIENTE"}
//!     ]}
//! ]}"#;
//!
//! let dataset = parse_corpus(corpus).unwrap();
//! let tagger = LexiconTrainer::default().train(&dataset.examples).unwrap();
//!
//! let outcome = EvaluationRunner::new(EvalConfig::default()).run(&tagger, &dataset.examples);
//! assert_eq!(outcome.report.overall.f1, 1.0);
//! ```
pub mod dataset;
pub mod error;
pub mod eval;
pub mod tagger;
pub mod types;

// Re-export primary API
pub use dataset::{load_corpus, parse_corpus, Dataset, DatasetStats};
pub use error::{ReceitaError, Result};
pub use eval::{
    match_spans, EvalConfig, EvaluationObserver, EvaluationOutcome, EvaluationRunner,
    MetricsAggregator, PredictionFailure, SpanIndex, TracingObserver,
};
pub use tagger::{EntityPredictor, EntityTrainer, LexiconConfig, LexiconTagger, LexiconTrainer};
pub use types::{
    ConfusionCounts, EntityType, Example, Label, Metrics, MetricsReport, PredictedEntity,
    RawEntity, Span,
};
