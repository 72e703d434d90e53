use criterion::{black_box, criterion_group, criterion_main, Criterion};
use receita_core::eval::{match_spans, EvalConfig, EvaluationObserver, EvaluationRunner, SpanIndex};
use receita_core::tagger::{EntityPredictor, EntityTrainer, LexiconTrainer};
use receita_core::{EntityType, Example, PredictionFailure, Span};

struct Silent;

impl EvaluationObserver for Silent {
    fn on_prediction_failed(&mut self, _failure: &PredictionFailure) {}
}

fn corpus() -> Vec<Example> {
    let texts = [
        ("2 xícaras de farinha de trigo", vec![(0, 9, EntityType::Quantidade), (13, 29, EntityType::Ingrediente)]),
        ("200 g de manteiga sem sal", vec![(0, 5, EntityType::Quantidade), (9, 17, EntityType::Ingrediente)]),
        ("3 ovos", vec![(0, 1, EntityType::Quantidade), (2, 6, EntityType::Ingrediente)]),
        ("1 colher de sopa de fermento", vec![(0, 16, EntityType::Quantidade), (20, 28, EntityType::Ingrediente)]),
    ];
    texts
        .iter()
        .cycle()
        .take(200)
        .map(|(text, spans)| {
            Example::new(
                *text,
                spans.iter().map(|&(s, e, ty)| Span::new(s, e, ty)).collect(),
            )
        })
        .collect()
}

fn bench_matcher(c: &mut Criterion) {
    let examples = corpus();
    let gold = SpanIndex::from_spans(&examples[0].entities);
    let predicted = SpanIndex::from_spans(&examples[1].entities);

    c.bench_function("match_spans_single", |b| {
        b.iter(|| match_spans(black_box(&predicted), black_box(&gold), EntityType::Ingrediente));
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let examples = corpus();
    let tagger = LexiconTrainer::default().train(&examples[..2]).unwrap();

    c.bench_function("lexicon_predict_single", |b| {
        b.iter(|| tagger.predict(black_box(&examples[3].text)).unwrap());
    });

    c.bench_function("evaluate_corpus_200", |b| {
        b.iter(|| {
            let mut runner = EvaluationRunner::with_observer(EvalConfig::default(), Silent);
            runner.run(&tagger, black_box(&examples))
        });
    });
}

criterion_group!(benches, bench_matcher, bench_evaluation);
criterion_main!(benches);
