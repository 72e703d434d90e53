pub mod aggregator;
pub mod matcher;
pub mod runner;

pub use aggregator::MetricsAggregator;
pub use matcher::{match_spans, match_spans_detailed, MatchResult, SpanIndex};
pub use runner::{
    EvalConfig, EvaluationObserver, EvaluationOutcome, EvaluationRunner, LabelDiagnostics,
    MatchedSpan, PredictionFailure, TracingObserver,
};
