// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Performance Benchmarks
//!
//! Compares the two processing policies on real model files:
//! - isolated: one forward pass per text (reproducibility baseline)
//! - batched: one padded forward pass per request (throughput variant)
//!
//! Requires the BGE-M3 ONNX export on disk at the paths below.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use embed_node::config::{DeterminismConfig, ProcessingPolicy, ServiceConfig};
use embed_node::embeddings::EmbeddingService;
use std::path::PathBuf;

const MODEL_PATH: &str = "./models/bge-m3-onnx/model.onnx";
const TOKENIZER_PATH: &str = "./models/bge-m3-onnx/tokenizer.json";

fn setup_service(policy: ProcessingPolicy) -> EmbeddingService {
    let config = ServiceConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        model_name: "bge-m3".to_string(),
        model_path: PathBuf::from(MODEL_PATH),
        tokenizer_path: PathBuf::from(TOKENIZER_PATH),
        dimension: 1024,
        max_length: 8192,
        policy,
        determinism: DeterminismConfig::default(),
    };
    EmbeddingService::load(&config).expect("Failed to load embedding service for benchmarks")
}

/// Generate sample texts of various lengths
fn generate_sample_texts(count: usize, words_per_text: usize) -> Vec<String> {
    let words = [
        "machine", "learning", "embedding", "vector", "semantic", "search", "deterministic",
        "inference", "token", "sequence",
    ];

    (0..count)
        .map(|i| {
            (0..words_per_text)
                .map(|j| words[(i + j) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_single_text(c: &mut Criterion) {
    let service = setup_service(ProcessingPolicy::Isolated);
    let texts = generate_sample_texts(1, 12);

    c.bench_function("embed_single_isolated", |b| {
        b.iter(|| {
            let outcome = service.embed_texts(black_box(&texts)).unwrap();
            black_box(outcome)
        })
    });
}

fn bench_policies(c: &mut Criterion) {
    let isolated = setup_service(ProcessingPolicy::Isolated);
    let batched = setup_service(ProcessingPolicy::Batched);

    let mut group = c.benchmark_group("embed_policies");
    for batch_size in [4usize, 10] {
        let texts = generate_sample_texts(batch_size, 12);

        group.bench_with_input(
            BenchmarkId::new("isolated", batch_size),
            &texts,
            |b, texts| b.iter(|| black_box(isolated.embed_texts(texts).unwrap())),
        );
        group.bench_with_input(
            BenchmarkId::new("batched", batch_size),
            &texts,
            |b, texts| b.iter(|| black_box(batched.embed_texts(texts).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_single_text, bench_policies);
criterion_main!(benches);
