//! # Evaluation Runner
//!
//! Drives a predictor over a validated corpus, one example at a time, and
//! folds exact-match counts into a [`MetricsAggregator`].
//!
//! A prediction failure for one example is recorded and skipped; the run
//! always completes with metrics over the examples that succeeded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::eval::aggregator::MetricsAggregator;
use crate::eval::matcher::{match_spans_detailed, MatchResult, SpanIndex};
use crate::tagger::EntityPredictor;
use crate::types::{char_slice, EntityType, Example, MetricsReport};

/// Configuration for an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Entity types to score.
    pub labels: Vec<EntityType>,
    /// How many characters of a failing text to keep in its diagnostic.
    pub snippet_chars: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            labels: EntityType::all().to_vec(),
            snippet_chars: 50,
        }
    }
}

impl EvalConfig {
    /// Create a new evaluation configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict scoring to `labels`. Repeats are ignored.
    pub fn with_labels(mut self, labels: &[EntityType]) -> Self {
        self.labels.clear();
        for ty in labels {
            if !self.labels.contains(ty) {
                self.labels.push(*ty);
            }
        }
        self
    }

    /// Set the diagnostic snippet length.
    pub fn with_snippet_chars(mut self, chars: usize) -> Self {
        self.snippet_chars = chars;
        self
    }
}

/// An example whose prediction call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionFailure {
    /// Position of the example in the evaluated sequence.
    pub index: usize,
    /// Leading characters of the example text.
    pub snippet: String,
    pub error: String,
}

/// A true positive, with its surface text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Per-label debug totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDiagnostics {
    pub total_predicted: usize,
    pub total_gold: usize,
    pub matched: Vec<MatchedSpan>,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub report: MetricsReport,
    pub diagnostics: BTreeMap<EntityType, LabelDiagnostics>,
    pub failures: Vec<PredictionFailure>,
    /// Examples that contributed to the metrics.
    pub evaluated: usize,
    /// `(start, end)` keys overwritten by a later duplicate, gold and predicted.
    pub duplicate_keys: usize,
}

/// Receives run events. Injected into the runner instead of logging directly.
pub trait EvaluationObserver {
    fn on_prediction_failed(&mut self, failure: &PredictionFailure);

    fn on_empty_corpus(&mut self) {}

    fn on_finished(&mut self, _outcome: &EvaluationOutcome) {}
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn on_prediction_failed(&mut self, failure: &PredictionFailure) {
        warn!(
            index = failure.index,
            snippet = %failure.snippet,
            error = %failure.error,
            "failed to evaluate example"
        );
    }

    fn on_empty_corpus(&mut self) {
        warn!("no examples to evaluate; reporting zero metrics");
    }

    fn on_finished(&mut self, outcome: &EvaluationOutcome) {
        for (ty, metrics) in &outcome.report.per_label {
            let counts = outcome.report.counts.get(ty).copied().unwrap_or_default();
            info!(
                label = %ty,
                tp = counts.true_positives,
                fp = counts.false_positives,
                fn_ = counts.false_negatives,
                "{metrics}"
            );
        }
        info!(
            evaluated = outcome.evaluated,
            failed = outcome.failures.len(),
            "overall {}",
            outcome.report.overall
        );
    }
}

struct ExampleResult {
    matches: Vec<(EntityType, MatchResult)>,
    predicted: SpanIndex,
    gold: SpanIndex,
}

/// Runs a predictor over examples and scores it.
pub struct EvaluationRunner<O = TracingObserver> {
    config: EvalConfig,
    observer: O,
}

impl EvaluationRunner<TracingObserver> {
    /// Create a runner that logs through `tracing`.
    pub fn new(config: EvalConfig) -> Self {
        Self::with_observer(config, TracingObserver)
    }
}

impl<O: EvaluationObserver> EvaluationRunner<O> {
    pub fn with_observer(config: EvalConfig, observer: O) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Evaluates `model` on `examples` in order.
    ///
    /// Never fails: per-example errors end up in
    /// [`EvaluationOutcome::failures`].
    pub fn run<P>(&mut self, model: &P, examples: &[Example]) -> EvaluationOutcome
    where
        P: EntityPredictor + ?Sized,
    {
        if examples.is_empty() {
            self.observer.on_empty_corpus();
        }

        // Each label is scored once even if `config.labels` repeats it.
        let mut aggregator = MetricsAggregator::with_labels(&self.config.labels);
        let labels: Vec<EntityType> = aggregator.labels().collect();
        let mut diagnostics: BTreeMap<EntityType, LabelDiagnostics> = labels
            .iter()
            .map(|ty| (*ty, LabelDiagnostics::default()))
            .collect();
        let mut failures = Vec::new();
        let mut evaluated = 0;
        let mut duplicate_keys = 0;

        for (index, example) in examples.iter().enumerate() {
            let result = match evaluate_example(model, example, &labels) {
                Ok(result) => result,
                Err(e) => {
                    let failure = PredictionFailure {
                        index,
                        snippet: snippet(&example.text, self.config.snippet_chars),
                        error: e.to_string(),
                    };
                    self.observer.on_prediction_failed(&failure);
                    failures.push(failure);
                    continue;
                }
            };

            evaluated += 1;
            duplicate_keys += result.predicted.overwritten() + result.gold.overwritten();

            for (ty, matched) in result.matches {
                aggregator.accumulate(ty, matched.counts);

                let diag = diagnostics.entry(ty).or_default();
                diag.total_predicted += result.predicted.count_label(ty);
                diag.total_gold += result.gold.count_label(ty);
                diag.matched.extend(matched.matched.into_iter().map(|(start, end)| MatchedSpan {
                    text: char_slice(&example.text, start, end)
                        .unwrap_or_default()
                        .to_string(),
                    start,
                    end,
                }));
            }
        }

        let outcome = EvaluationOutcome {
            report: aggregator.report(),
            diagnostics,
            failures,
            evaluated,
            duplicate_keys,
        };
        self.observer.on_finished(&outcome);
        outcome
    }
}

fn evaluate_example<P>(model: &P, example: &Example, labels: &[EntityType]) -> Result<ExampleResult>
where
    P: EntityPredictor + ?Sized,
{
    let predictions = model.predict(&example.text)?;

    let mut predicted = SpanIndex::new();
    for entity in &predictions {
        predicted.insert(entity.start, entity.end, entity.label.clone());
    }
    let gold = SpanIndex::from_spans(&example.entities);

    let matches = labels
        .iter()
        .map(|ty| (*ty, match_spans_detailed(&predicted, &gold, *ty)))
        .collect();

    debug!(
        predicted = predicted.len(),
        gold = gold.len(),
        "example evaluated"
    );

    Ok(ExampleResult {
        matches,
        predicted,
        gold,
    })
}

fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
