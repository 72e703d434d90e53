//! # Lexicon Tagger
//!
//! Baseline tagger built from annotated examples: every gold surface form
//! becomes a lexicon entry, and prediction looks those entries up again at
//! word boundaries (longest match first). An optional regex rule adds numeric
//! quantities such as "200 g" or "2 colheres de sopa" that the lexicon missed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReceitaError, Result};
use crate::tagger::{EntityPredictor, EntityTrainer};
use crate::types::{EntityType, Example, Label, PredictedEntity};

const QUANTITY_PATTERN: &str = r"(?i)\b\d+(?:[.,/]\d+)?(?:\s*(?:kg|mg|g|ml|l|litros?|gramas?|quilos?|x[íi]caras?(?:\s+de\s+ch[áa])?|colher(?:es)?(?:\s+de\s+(?:sopa|ch[áa]|caf[ée]))?|copos?|pitadas?|dentes?|unidades?|latas?|pacotes?|fatias?))?\b";

/// Training options for [`LexiconTrainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconConfig {
    /// Also tag numeric quantities with a regex rule.
    pub quantity_pattern: bool,
    /// Surfaces shorter than this (in characters) are not learned.
    pub min_surface_chars: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            quantity_pattern: true,
            min_surface_chars: 2,
        }
    }
}

impl LexiconConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantity_pattern(mut self, enabled: bool) -> Self {
        self.quantity_pattern = enabled;
        self
    }

    pub fn with_min_surface_chars(mut self, chars: usize) -> Self {
        self.min_surface_chars = chars;
        self
    }
}

/// Serializable lexicon: lowercased surface form to label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconModel {
    pub entries: BTreeMap<String, Label>,
    pub quantity_pattern: bool,
    /// Seed the training corpus was shuffled with before its holdout was
    /// split off. Evaluation replays it to score the same holdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

/// Learns a [`LexiconTagger`] from gold spans.
#[derive(Debug, Clone, Default)]
pub struct LexiconTrainer {
    config: LexiconConfig,
}

impl LexiconTrainer {
    pub fn new(config: LexiconConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LexiconConfig {
        &self.config
    }
}

impl EntityTrainer for LexiconTrainer {
    type Model = LexiconTagger;

    fn train(&self, examples: &[Example]) -> Result<LexiconTagger> {
        let mut votes: BTreeMap<String, BTreeMap<Label, usize>> = BTreeMap::new();

        for example in examples {
            for span in &example.entities {
                let Some(surface) = span.surface(&example.text) else {
                    continue;
                };
                let key = normalize(surface);
                if key.chars().count() < self.config.min_surface_chars {
                    continue;
                }
                *votes
                    .entry(key)
                    .or_default()
                    .entry(span.label.clone())
                    .or_insert(0) += 1;
            }
        }

        // Most frequent label wins; ties go to the smallest label.
        let entries: BTreeMap<String, Label> = votes
            .into_iter()
            .filter_map(|(surface, labels)| {
                let mut best: Option<(Label, usize)> = None;
                for (label, count) in labels {
                    if best.as_ref().is_none_or(|(_, top)| count > *top) {
                        best = Some((label, count));
                    }
                }
                best.map(|(label, _)| (surface, label))
            })
            .collect();

        info!(
            examples = examples.len(),
            entries = entries.len(),
            "lexicon trained"
        );

        LexiconTagger::from_model(LexiconModel {
            entries,
            quantity_pattern: self.config.quantity_pattern,
            shuffle_seed: None,
        })
    }
}

/// Dictionary-lookup predictor.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    model: LexiconModel,
    /// Entries as lowercased char vectors, longest first.
    patterns: Vec<(Vec<char>, Label)>,
    quantity_re: Option<Regex>,
}

impl LexiconTagger {
    /// Builds a tagger from a lexicon.
    ///
    /// # Errors
    ///
    /// Returns `ReceitaError::RegexError` if the quantity rule fails to compile.
    pub fn from_model(model: LexiconModel) -> Result<Self> {
        let mut patterns: Vec<(Vec<char>, Label)> = model
            .entries
            .iter()
            .map(|(surface, label)| (surface.chars().collect(), label.clone()))
            .filter(|(chars, _): &(Vec<char>, Label)| !chars.is_empty())
            .collect();
        patterns.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let quantity_re = if model.quantity_pattern {
            Some(Regex::new(QUANTITY_PATTERN)?)
        } else {
            None
        };

        Ok(Self {
            model,
            patterns,
            quantity_re,
        })
    }

    /// Loads a tagger saved with [`LexiconTagger::save`].
    ///
    /// # Errors
    ///
    /// Returns `ReceitaError::Io` if the file cannot be read and
    /// `ReceitaError::ModelLoad` if it is not a lexicon model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReceitaError::ModelLoad(format!(
                "model not found at {}",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let model: LexiconModel = serde_json::from_str(&contents)
            .map_err(|e| ReceitaError::ModelLoad(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), entries = model.entries.len(), "lexicon loaded");
        Self::from_model(model)
    }

    /// Writes the lexicon as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ReceitaError::Io` on write failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.model)
            .map_err(|e| ReceitaError::ModelLoad(e.to_string()))?;
        fs::write(path, json)?;
        info!(path = %path.display(), "lexicon saved");
        Ok(())
    }

    pub fn model(&self) -> &LexiconModel {
        &self.model
    }

    /// Records the shuffle seed used when the training split was made.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.model.shuffle_seed = seed;
        self
    }

    pub fn shuffle_seed(&self) -> Option<u64> {
        self.model.shuffle_seed
    }

    /// Number of learned surface forms.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn lookup(&self, lowered: &[char]) -> Vec<(usize, usize, Label)> {
        let mut found = Vec::new();
        let mut i = 0;
        while i < lowered.len() {
            let at_boundary = i == 0 || !lowered[i - 1].is_alphanumeric();
            let hit = if at_boundary {
                self.patterns.iter().find(|(pattern, _)| {
                    let end = i + pattern.len();
                    end <= lowered.len()
                        && lowered[i..end] == pattern[..]
                        && (end == lowered.len() || !lowered[end].is_alphanumeric())
                })
            } else {
                None
            };

            match hit {
                Some((pattern, label)) => {
                    found.push((i, i + pattern.len(), label.clone()));
                    i += pattern.len();
                }
                None => i += 1,
            }
        }
        found
    }

    fn quantities(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(re) = &self.quantity_re else {
            return Vec::new();
        };
        re.find_iter(text)
            .map(|m| {
                let start = text[..m.start()].chars().count();
                let end = start + m.as_str().chars().count();
                (start, end)
            })
            .collect()
    }
}

impl EntityPredictor for LexiconTagger {
    fn predict(&self, text: &str) -> Result<Vec<PredictedEntity>> {
        let lowered: Vec<char> = text.chars().map(lower_char).collect();
        let mut spans = self.lookup(&lowered);

        for (start, end) in self.quantities(text) {
            let overlaps = spans.iter().any(|(s, e, _)| start < *e && *s < end);
            if !overlaps {
                spans.push((start, end, Label::Known(EntityType::Quantidade)));
            }
        }
        spans.sort_by_key(|(start, end, _)| (*start, *end));

        debug!(entities = spans.len(), "lexicon prediction");
        Ok(spans
            .into_iter()
            .map(|(start, end, label)| PredictedEntity::from_source(text, start, end, label))
            .collect())
    }
}

fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn normalize(surface: &str) -> String {
    surface.trim().chars().map(lower_char).collect()
}
