use std::path::PathBuf;

use clap::Parser;
use receita_core::LexiconConfig;
use receita_trainer::{run_training, TrainingConfig, DEFAULT_HOLDOUT};
use tracing_subscriber::EnvFilter;

/// Train a lexicon tagger on an annotated corpus.
#[derive(Parser)]
#[command(name = "train")]
#[command(version)]
struct Cli {
    /// Annotated corpus (JSON with a top-level `annotations` array)
    #[arg(short, long, env = "RECEITA_DATA", default_value = "data/dataset.json")]
    data: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, env = "RECEITA_MODEL", default_value = "models/food_item_ner.json")]
    output: PathBuf,

    /// Trailing examples reserved for evaluation
    #[arg(long, default_value_t = DEFAULT_HOLDOUT)]
    holdout: usize,

    /// Shuffle before splitting, with this seed
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the numeric quantity rule
    #[arg(long)]
    no_quantity_pattern: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = TrainingConfig::new(cli.data, cli.output)
        .with_holdout(cli.holdout)
        .with_shuffle_seed(cli.seed)
        .with_lexicon(LexiconConfig::new().with_quantity_pattern(!cli.no_quantity_pattern));

    match run_training(config) {
        Ok(summary) => {
            println!(
                "Trained on {} examples ({} lexicon entries), model saved to {}",
                summary.train_examples,
                summary.lexicon_entries,
                summary.model_path.display()
            );
            if let Some(outcome) = summary.holdout {
                println!(
                    "Holdout ({} examples): {}",
                    summary.holdout_examples, outcome.report.overall
                );
            }
        }
        Err(e) => {
            eprintln!("Training failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
