//! PHOENIX Performance Benchmarks
//!
//! Hot paths of a generation:
//! - Pattern scoring of agent outputs
//! - Genetic material extraction
//! - One evolution step (selection, breeding, mutation)
//! - Statistical report over a run history

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use phoenix_common::{FitnessSource, PhoenixConfig, PhoenixEvolutionState};
use phoenix_darwinian::{evolve, synthesize_population, PhoenixEngine, SimulatedOutputGenerator};
use phoenix_distill::{ExtractionOptions, KnowledgeDistillationEngine, PerformanceAnalyzer, TaskInput};
use phoenix_stats::StatisticalValidator;

fn outputs(count: usize) -> Vec<String> {
    let generator = SimulatedOutputGenerator::new();
    synthesize_population(count)
        .unwrap()
        .iter()
        .map(|agent| generator.compose(agent, "Explain how the system adapts under load."))
        .collect()
}

// ============ DISTILLATION BENCHMARKS ============

fn bench_performance_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("performance");
    let analyzer = PerformanceAnalyzer::new(0.05).unwrap();
    let agents = synthesize_population(8).unwrap();
    let texts = outputs(8);

    for repeat in [1usize, 4, 16] {
        let output = texts[0].repeat(repeat);
        group.throughput(Throughput::Bytes(output.len() as u64));
        group.bench_with_input(BenchmarkId::new("analyze", repeat), &output, |b, output| {
            b.iter(|| analyzer.analyze(black_box(&agents[0]), black_box(output), FitnessSource::TextAnalysis))
        });
    }
    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let engine = KnowledgeDistillationEngine::new().unwrap();
    let agents = synthesize_population(4).unwrap();
    let texts = outputs(4);
    let task = TaskInput {
        task: "distill",
        input: "Explain how the system adapts under load.",
    };

    c.bench_function("distill/extract_genetic_material", |b| {
        b.iter(|| {
            for (agent, text) in agents.iter().zip(&texts) {
                let material = engine
                    .extract_genetic_material(agent, black_box(text), 1, task, ExtractionOptions::default())
                    .unwrap();
                black_box(material);
            }
        })
    });
}

// ============ EVOLUTION BENCHMARKS ============

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    group.measurement_time(Duration::from_secs(5));

    for size in [20usize, 50, 100] {
        let config = PhoenixConfig {
            population_size: size,
            ..PhoenixConfig::default()
        };
        let state = PhoenixEvolutionState::new(synthesize_population(size).unwrap());

        group.bench_with_input(BenchmarkId::new("population", size), &state, |b, state| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| evolve(black_box(state.clone()), &config, &mut rng).unwrap())
        });
    }
    group.finish();
}

// ============ STATISTICS BENCHMARKS ============

fn bench_statistical_report(c: &mut Criterion) {
    let config = PhoenixConfig {
        population_size: 20,
        max_generations: 10,
        convergence_threshold: 0.0,
        ..PhoenixConfig::default()
    };
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let state = runtime.block_on(async {
        let engine = PhoenixEngine::new(config.clone(), Arc::new(SimulatedOutputGenerator::new())).unwrap();
        let state = engine.initialize_population(None).await.unwrap();
        engine.run_evolution(state).await.unwrap()
    });
    let validator = StatisticalValidator::from_config(&config).unwrap();

    c.bench_function("stats/report", |b| {
        b.iter(|| validator.report(black_box(&state.history)).unwrap())
    });
}

criterion_group!(distill, bench_performance_analysis, bench_extraction);
criterion_group!(evolution, bench_evolve);
criterion_group!(statistics, bench_statistical_report);

criterion_main!(distill, evolution, statistics);
