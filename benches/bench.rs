// Criterion benchmarks for promatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use promatch::core::{
    cosine_similarity, haversine_distance, EmbeddingBackend, EmbeddingProvider, HashingEmbedder,
    MatchingEngine, TextEmbedder,
};
use promatch::models::{Job, Professional};
use std::sync::Arc;

const SKILLS: [&str; 8] = [
    "plumbing",
    "pipe repair",
    "wiring",
    "drain cleaning",
    "tiling",
    "roofing",
    "heating",
    "carpentry",
];

fn create_candidate(id: usize, lat: f64, lon: f64) -> Professional {
    Professional {
        id: id as i64,
        full_name: format!("Professional {}", id),
        profession: if id % 2 == 0 { "Plumber" } else { "Electrician" }.to_string(),
        skills: vec![
            SKILLS[id % SKILLS.len()].to_string(),
            SKILLS[(id / 3) % SKILLS.len()].to_string(),
        ],
        years_experience: (id % 20) as u32,
        rating: 3.0 + (id % 20) as f64 / 10.0,
        hourly_rate: Some(30.0 + (id % 40) as f64),
        latitude: Some(lat),
        longitude: Some(lon),
        is_available: true,
    }
}

fn create_job() -> Job {
    Job {
        id: 1,
        title: "Leaking kitchen pipe".to_string(),
        description: "need a plumber for pipe repair under the sink".to_string(),
        profession: "Plumber".to_string(),
        latitude: Some(40.7128),
        longitude: Some(-74.0060),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(40.7128),
                black_box(-74.0060),
                black_box(40.72),
                black_box(-74.01),
            )
        });
    });
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let a = embedder.encode("need a plumber for pipe repair").unwrap_or_default();
    let b = embedder.encode("plumbing pipe repair drain cleaning").unwrap_or_default();

    c.bench_function("cosine_similarity_512", |bench| {
        bench.iter(|| cosine_similarity(black_box(&a), black_box(&b)))
    });
}

fn bench_hashing_embedding(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();

    c.bench_function("hashing_embed_sentence", |b| {
        b.iter(|| embedder.encode(black_box("Leaking kitchen pipe need a plumber for pipe repair Plumber")))
    });
}

fn bench_matching(c: &mut Criterion) {
    let provider = EmbeddingProvider::new(EmbeddingBackend::Hashing { dimension: 512 });
    let engine = match MatchingEngine::with_default_weights(Arc::new(provider)) {
        Ok(engine) => engine,
        Err(e) => panic!("default weights rejected: {}", e),
    };
    let job = create_job();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<Professional> = (0..*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.5;
                let lon_offset = (i as f64 * 0.001) % 0.5;
                create_candidate(i, 40.7128 + lat_offset, -74.0060 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    engine.find_matches(
                        black_box(&job),
                        black_box(&candidates),
                        black_box(20),
                        black_box(0.3),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_cosine_similarity,
    bench_hashing_embedding,
    bench_matching
);

criterion_main!(benches);
