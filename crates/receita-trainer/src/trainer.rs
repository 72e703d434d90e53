//! Training loop: split a corpus, fit a lexicon tagger, score the holdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use receita_core::dataset::load_corpus;
use receita_core::eval::{EvalConfig, EvaluationOutcome, EvaluationRunner};
use receita_core::tagger::{EntityTrainer, LexiconConfig, LexiconTagger, LexiconTrainer};
use receita_core::Example;
use serde::Serialize;
use tracing::info;

/// Examples held out for evaluation by default.
pub const DEFAULT_HOLDOUT: usize = 49;

/// Configuration for a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    /// Number of trailing examples reserved for evaluation.
    pub holdout: usize,
    /// Shuffle before splitting, with this seed.
    pub shuffle_seed: Option<u64>,
    pub lexicon: LexiconConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/dataset.json"),
            output_path: PathBuf::from("models/food_item_ner.json"),
            holdout: DEFAULT_HOLDOUT,
            shuffle_seed: None,
            lexicon: LexiconConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new(data_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    pub fn with_holdout(mut self, holdout: usize) -> Self {
        self.holdout = holdout;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    pub fn with_lexicon(mut self, lexicon: LexiconConfig) -> Self {
        self.lexicon = lexicon;
        self
    }
}

/// What a training run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub train_examples: usize,
    pub holdout_examples: usize,
    pub lexicon_entries: usize,
    pub model_path: PathBuf,
    /// `None` when no examples were held out.
    pub holdout: Option<EvaluationOutcome>,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Loads the corpus, trains, evaluates the holdout and saves the model.
    pub fn run(&self) -> Result<TrainingSummary> {
        let dataset = load_corpus(&self.config.data_path).with_context(|| {
            format!("Failed to load corpus {}", self.config.data_path.display())
        })?;
        info!("Loaded {} training examples", dataset.examples.len());

        let mut examples = dataset.examples;
        order_for_split(&mut examples, self.config.shuffle_seed);
        let (train, holdout) = split_holdout(&examples, self.config.holdout);
        if train.is_empty() {
            anyhow::bail!(
                "No examples left for training: {} valid examples, holdout {}",
                examples.len(),
                self.config.holdout
            );
        }

        let tagger = LexiconTrainer::new(self.config.lexicon.clone())
            .train(train)?
            .with_shuffle_seed(self.config.shuffle_seed);

        let holdout_outcome = if holdout.is_empty() {
            None
        } else {
            info!("Evaluating on {} held-out examples", holdout.len());
            Some(EvaluationRunner::new(EvalConfig::default()).run(&tagger, holdout))
        };

        self.save_model(&tagger, &self.config.output_path)?;

        Ok(TrainingSummary {
            train_examples: train.len(),
            holdout_examples: holdout.len(),
            lexicon_entries: tagger.len(),
            model_path: self.config.output_path.clone(),
            holdout: holdout_outcome,
        })
    }

    pub fn save_model(&self, tagger: &LexiconTagger, path: &Path) -> Result<()> {
        tagger
            .save(path)
            .with_context(|| format!("Failed to save model to {}", path.display()))?;
        info!("Model saved to {:?}", path);
        Ok(())
    }
}

/// Splits off the last `holdout` examples.
pub fn split_holdout(examples: &[Example], holdout: usize) -> (&[Example], &[Example]) {
    let cut = examples.len().saturating_sub(holdout);
    examples.split_at(cut)
}

/// Puts examples in the order the holdout split is taken from: shuffled
/// with `seed` if one was given, corpus order otherwise.
pub fn order_for_split(examples: &mut [Example], seed: Option<u64>) {
    if let Some(seed) = seed {
        shuffle(examples, seed);
    }
}

/// Seeded Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    for i in (1..items.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

pub fn run_training(config: TrainingConfig) -> Result<TrainingSummary> {
    let data_path = config.data_path.clone();
    if !data_path.exists() {
        anyhow::bail!("Training data not found: {}", data_path.display());
    }

    info!("Starting lexicon training...");
    Trainer::new(config).run()
}
