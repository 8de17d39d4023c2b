//! Benchmarks for pipeline definition and prompt rendering.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pitchflow::context::SharedContext;
use pitchflow::pipeline::PromptTemplate;
use pitchflow::strategist::{canonical_stages, startup_strategist, CANONICAL_OUTPUT_KEYS};

fn define_benchmark(c: &mut Criterion) {
    c.bench_function("define_startup_strategist", |b| {
        b.iter(|| black_box(startup_strategist()))
    });

    c.bench_function("parse_canonical_templates", |b| {
        let sources: Vec<String> = canonical_stages()
            .iter()
            .map(|s| s.template.source().to_string())
            .collect();
        b.iter(|| {
            for source in &sources {
                black_box(PromptTemplate::parse(source.as_str()));
            }
        });
    });
}

fn render_benchmark(c: &mut Criterion) {
    let mut context = SharedContext::seeded("An app that matches dog walkers with busy pet owners");
    for key in CANONICAL_OUTPUT_KEYS {
        let _ = context.insert(key, "x".repeat(2_000));
    }
    let pipeline = startup_strategist().ok();

    c.bench_function("render_pitch_deck_prompt", |b| {
        let Some(stage) = pipeline.as_ref().and_then(|p| p.stage("pitch_deck")) else {
            return;
        };
        b.iter(|| black_box(stage.template.render(&context)));
    });
}

criterion_group!(benches, define_benchmark, render_benchmark);
criterion_main!(benches);
