//! # Receita Trainer
//!
//! Training workflow for receita taggers: load a validated corpus, hold out
//! its tail for evaluation, fit a lexicon tagger on the rest and persist it.

pub mod trainer;

pub use trainer::{
    order_for_split, run_training, shuffle, split_holdout, Trainer, TrainingConfig, TrainingSummary,
    DEFAULT_HOLDOUT,
};
