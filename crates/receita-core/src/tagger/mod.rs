//! # Tagger Interface
//!
//! Capability traits for the sequence-tagging backend. The evaluation engine
//! only ever sees a [`EntityPredictor`]; how spans are produced is up to the
//! implementation.

pub mod lexicon;

pub use lexicon::{LexiconConfig, LexiconModel, LexiconTagger, LexiconTrainer};

use crate::error::Result;
use crate::types::{Example, PredictedEntity};

/// Produces labeled character spans for a raw text.
pub trait EntityPredictor {
    /// Predicts entities in `text`. Offsets index characters of `text`.
    ///
    /// # Errors
    ///
    /// Implementations return `ReceitaError::Prediction` (or any other
    /// variant) when `text` cannot be processed.
    fn predict(&self, text: &str) -> Result<Vec<PredictedEntity>>;
}

impl<P: EntityPredictor + ?Sized> EntityPredictor for &P {
    fn predict(&self, text: &str) -> Result<Vec<PredictedEntity>> {
        (**self).predict(text)
    }
}

impl<P: EntityPredictor + ?Sized> EntityPredictor for Box<P> {
    fn predict(&self, text: &str) -> Result<Vec<PredictedEntity>> {
        (**self).predict(text)
    }
}

/// Builds a predictor from validated examples.
pub trait EntityTrainer {
    type Model: EntityPredictor;

    /// # Errors
    ///
    /// Returns an error if a model cannot be built from `examples`.
    fn train(&self, examples: &[Example]) -> Result<Self::Model>;
}
