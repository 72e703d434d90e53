//! Receita NER command line
//!
//! Corpus statistics, training, holdout evaluation and single-text
//! prediction for food-text entity taggers.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use receita_core::eval::{EvalConfig, EvaluationRunner};
use receita_core::tagger::{EntityPredictor, LexiconConfig, LexiconTagger};
use receita_core::{load_corpus, Example};
use receita_trainer::{order_for_split, run_training, TrainingConfig, DEFAULT_HOLDOUT};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default model location
fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("receita")
        .join("models")
        .join("food_item_ner.json")
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "receita-ner")]
#[command(about = "Train, evaluate and run food-text entity taggers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model file (defaults to the user data directory)
    #[arg(short, long, global = true, env = "RECEITA_MODEL")]
    model: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a corpus and print its processing report
    Stats {
        /// Annotated corpus
        #[arg(short, long, env = "RECEITA_DATA", default_value = "data/dataset.json")]
        data: PathBuf,
    },
    /// Train a lexicon tagger and save it to the model path
    Train {
        /// Annotated corpus
        #[arg(short, long, env = "RECEITA_DATA", default_value = "data/dataset.json")]
        data: PathBuf,
        /// Trailing examples reserved for evaluation
        #[arg(long, default_value_t = DEFAULT_HOLDOUT)]
        holdout: usize,
        /// Shuffle before splitting, with this seed (saved with the model and
        /// replayed by `evaluate`)
        #[arg(long)]
        seed: Option<u64>,
        /// Disable the numeric quantity rule
        #[arg(long)]
        no_quantity_pattern: bool,
    },
    /// Evaluate a saved model on the tail of a corpus
    Evaluate {
        /// Annotated corpus
        #[arg(short, long, env = "RECEITA_DATA", default_value = "data/dataset.json")]
        data: PathBuf,
        /// Number of trailing examples to evaluate, after replaying the
        /// model's training shuffle
        #[arg(short, long, default_value_t = DEFAULT_HOLDOUT)]
        last: usize,
    },
    /// Tag a single text
    Predict {
        /// Text to analyze
        #[arg(short, long)]
        text: String,
    },
}

/// The last `last` examples in the order the model's training split used.
fn evaluation_slice(mut examples: Vec<Example>, seed: Option<u64>, last: usize) -> Vec<Example> {
    if let Some(seed) = seed {
        info!(seed, "replaying training shuffle");
    }
    order_for_split(&mut examples, seed);
    let cut = examples.len().saturating_sub(last);
    examples.split_off(cut)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let model_path = cli.model.unwrap_or_else(default_model_path);

    match cli.command {
        Commands::Stats { data } => {
            let dataset = load_corpus(&data)
                .with_context(|| format!("Failed to load corpus {}", data.display()))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&dataset.stats)?);
            } else {
                print!("{}", render::StatsView(&dataset.stats));
            }
        }
        Commands::Train {
            data,
            holdout,
            seed,
            no_quantity_pattern,
        } => {
            let config = TrainingConfig::new(data, &model_path)
                .with_holdout(holdout)
                .with_shuffle_seed(seed)
                .with_lexicon(LexiconConfig::new().with_quantity_pattern(!no_quantity_pattern));
            let summary = run_training(config)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Trained on {} examples ({} lexicon entries), model saved to {}",
                    summary.train_examples,
                    summary.lexicon_entries,
                    summary.model_path.display()
                );
                if let Some(outcome) = &summary.holdout {
                    print!("{}", render::OutcomeView(outcome));
                }
            }
        }
        Commands::Evaluate { data, last } => {
            info!("Loading trained model...");
            let tagger = LexiconTagger::load(&model_path)
                .with_context(|| format!("Failed to load model {}", model_path.display()))?;

            info!("Loading test data...");
            let dataset = load_corpus(&data)
                .with_context(|| format!("Failed to load corpus {}", data.display()))?;

            let examples = evaluation_slice(dataset.examples, tagger.shuffle_seed(), last);
            let outcome = EvaluationRunner::new(EvalConfig::default()).run(&tagger, &examples);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render::OutcomeView(&outcome));
            }
        }
        Commands::Predict { text } => {
            let tagger = LexiconTagger::load(&model_path)
                .with_context(|| format!("Failed to load model {}", model_path.display()))?;
            let entities = tagger.predict(&text).context("Inference failed")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entities)?);
            } else {
                print!(
                    "{}",
                    render::PredictionsView {
                        text: &text,
                        entities: &entities,
                    }
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use receita_core::{EntityType, Span};

    #[test]
    fn test_default_model_path() {
        let path = default_model_path();
        assert!(path.to_string_lossy().contains("receita"));
        assert!(path.ends_with("food_item_ner.json"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    fn examples(n: usize) -> Vec<Example> {
        (0..n)
            .map(|i| Example::new(format!("{i} ovos"), vec![Span::new(0, 1, EntityType::Quantidade)]))
            .collect()
    }

    #[test]
    fn test_evaluation_slice_is_tail_without_seed() {
        let slice = evaluation_slice(examples(5), None, 2);
        let texts: Vec<&str> = slice.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["3 ovos", "4 ovos"]);
    }

    #[test]
    fn test_evaluation_slice_replays_seed() {
        let mut expected = examples(10);
        receita_trainer::shuffle(&mut expected, 9);
        let (_, holdout) = receita_trainer::split_holdout(&expected, 3);

        let slice = evaluation_slice(examples(10), Some(9), 3);
        assert_eq!(slice, holdout);
    }

    #[test]
    fn test_evaluation_slice_larger_than_corpus() {
        assert_eq!(evaluation_slice(examples(2), Some(1), 49).len(), 2);
    }

    #[test]
    fn test_parse_evaluate_args() {
        let cli = Cli::try_parse_from([
            "receita-ner",
            "evaluate",
            "--data",
            "corpus.json",
            "--last",
            "10",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Evaluate { data, last } => {
                assert_eq!(data, PathBuf::from("corpus.json"));
                assert_eq!(last, 10);
            }
            _ => panic!("expected evaluate"),
        }
    }
}
