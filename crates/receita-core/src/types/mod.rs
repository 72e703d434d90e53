pub mod entity;
pub mod report;
pub mod span;

pub use entity::{EntityType, Label};
pub use report::{ConfusionCounts, Metrics, MetricsReport};
pub use span::{char_len, char_slice, Example, PredictedEntity, RawEntity, Span};
