//! Plain-text rendering of evaluation outcomes, dataset statistics and
//! predictions.

use std::fmt;

use receita_core::eval::EvaluationOutcome;
use receita_core::{DatasetStats, Metrics, PredictedEntity};

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Processing report for a loaded corpus.
pub struct StatsView<'a>(pub &'a DatasetStats);

impl fmt::Display for StatsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Processing report:")?;
        writeln!(f, "Total records: {}", stats.total_records)?;
        writeln!(f, "Valid records: {}", stats.valid_records)?;
        writeln!(f, "Dropped spans: {}", stats.dropped_spans)?;

        let distribution = stats.label_distribution();
        if !distribution.is_empty() {
            writeln!(f, "\nEntity distribution:")?;
            for (label, count, share) in distribution {
                writeln!(f, "{label}: {count} entities ({:.1}%)", share * 100.0)?;
            }
        }
        Ok(())
    }
}

/// Debug totals, counters and metric tables of a run.
pub struct OutcomeView<'a>(pub &'a EvaluationOutcome);

impl fmt::Display for OutcomeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;

        writeln!(f, "Debug info")?;
        for (ty, diag) in &outcome.diagnostics {
            writeln!(f, "\n{ty}")?;
            writeln!(f, "Total predicted: {}", diag.total_predicted)?;
            writeln!(f, "Total gold: {}", diag.total_gold)?;
            writeln!(f, "Matches found: {}", diag.matched.len())?;
        }

        for (ty, counts) in &outcome.report.counts {
            writeln!(f, "\n{ty} - counters:")?;
            writeln!(f, "True Positives (TP): {}", counts.true_positives)?;
            writeln!(f, "False Positives (FP): {}", counts.false_positives)?;
            writeln!(f, "False Negatives (FN): {}", counts.false_negatives)?;
        }

        writeln!(f, "\nMetrics per entity type")?;
        writeln!(
            f,
            "{:<12} {:>10} {:>10} {:>10}",
            "Entity", "Precision", "Recall", "F1-Score"
        )?;
        for (ty, metrics) in &outcome.report.per_label {
            write_metrics_row(f, ty.as_str(), metrics)?;
        }

        writeln!(f, "\nOverall metrics")?;
        let overall = &outcome.report.overall;
        writeln!(f, "{:<12} {:>10}", "Metric", "Value")?;
        writeln!(f, "{:<12} {:>10}", "Precision", pct(overall.precision))?;
        writeln!(f, "{:<12} {:>10}", "Recall", pct(overall.recall))?;
        writeln!(f, "{:<12} {:>10}", "F1-Score", pct(overall.f1))?;

        writeln!(
            f,
            "\nEvaluated {} examples, {} failed",
            outcome.evaluated,
            outcome.failures.len()
        )?;
        if outcome.duplicate_keys > 0 {
            writeln!(f, "Overwritten duplicate span keys: {}", outcome.duplicate_keys)?;
        }
        Ok(())
    }
}

fn write_metrics_row(f: &mut fmt::Formatter<'_>, label: &str, metrics: &Metrics) -> fmt::Result {
    writeln!(
        f,
        "{:<12} {:>10} {:>10} {:>10}",
        label,
        pct(metrics.precision),
        pct(metrics.recall),
        pct(metrics.f1)
    )
}

/// Entities of one text, sorted by `(label, start)`.
pub struct PredictionsView<'a> {
    pub text: &'a str,
    pub entities: &'a [PredictedEntity],
}

impl fmt::Display for PredictionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entities.is_empty() {
            return writeln!(f, "No entities found");
        }

        let mut sorted: Vec<&PredictedEntity> = self.entities.iter().collect();
        sorted.sort_by(|a, b| {
            a.label
                .as_str()
                .cmp(b.label.as_str())
                .then(a.start.cmp(&b.start))
        });

        writeln!(f, "Text: {}\n", self.text)?;
        writeln!(f, "{:<12} {}", "Type", "Entity")?;
        for entity in sorted {
            writeln!(f, "{:<12} {}", entity.label.as_str(), entity.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receita_core::eval::{EvalConfig, EvaluationRunner};
    use receita_core::tagger::{EntityPredictor, EntityTrainer, LexiconTrainer};
    use receita_core::{parse_corpus, EntityType};

    const CORPUS: &str = r#"{"annotations": [
        {"text": "2 xícaras de farinha", "entities": [
            {"start": 0, "end": 9, "label": "QUANTIDADE"},
            {"start": 13, "end": 20, "label": "INGREDIENTE"}
        ]}
    ]}"#;

    #[test]
    fn test_render_stats() {
        let dataset = parse_corpus(CORPUS).unwrap();
        let text = StatsView(&dataset.stats).to_string();
        assert!(text.contains("Valid records: 1"));
        assert!(text.contains("QUANTIDADE: 1 entities (50.0%)"));
    }

    #[test]
    fn test_render_outcome() {
        let dataset = parse_corpus(CORPUS).unwrap();
        let tagger = LexiconTrainer::default().train(&dataset.examples).unwrap();
        let result = EvaluationRunner::new(EvalConfig::default()).run(&tagger, &dataset.examples);

        let text = OutcomeView(&result).to_string();
        assert!(text.contains("True Positives (TP): 1"));
        assert!(text.contains("100.00%"));
        assert!(text.contains("Evaluated 1 examples, 0 failed"));
    }

    #[test]
    fn test_render_predictions_sorted_by_label() {
        let text = "2 xícaras de farinha";
        let entities = vec![
            PredictedEntity::from_source(text, 13, 20, EntityType::Ingrediente),
            PredictedEntity::from_source(text, 0, 9, EntityType::Quantidade),
        ];
        let rendered = PredictionsView { text, entities: &entities }.to_string();
        let ing = rendered.find("INGREDIENTE").unwrap();
        let qtd = rendered.find("QUANTIDADE").unwrap();
        assert!(ing < qtd);
        assert!(rendered.contains("QUANTIDADE   2 xícaras\n"));
    }

    #[test]
    fn test_render_no_predictions() {
        let tagger = LexiconTrainer::default().train(&[]).unwrap();
        let entities = tagger.predict("sal a gosto").unwrap();
        let rendered = PredictionsView {
            text: "sal a gosto",
            entities: &entities,
        }
        .to_string();
        assert_eq!(rendered, "No entities found\n");
    }
}
