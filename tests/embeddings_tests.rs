// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding pipeline tests against the real model.
//!
//! These tests need the ONNX model files on disk (see the paths below)
//! and are `#[ignore]`d so the default test run stays model-free. Run
//! them with `cargo test -- --ignored` after downloading the model.

use embed_node::config::{DeterminismConfig, ProcessingPolicy, ServiceConfig};
use embed_node::embeddings::{EmbeddingError, EmbeddingService};
use std::path::PathBuf;

const MODEL_PATH: &str = "./models/bge-m3-onnx/model.onnx";
const TOKENIZER_PATH: &str = "./models/bge-m3-onnx/tokenizer.json";

fn test_config(policy: ProcessingPolicy) -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        model_name: "bge-m3".to_string(),
        model_path: PathBuf::from(MODEL_PATH),
        tokenizer_path: PathBuf::from(TOKENIZER_PATH),
        dimension: 1024,
        max_length: 8192,
        policy,
        determinism: DeterminismConfig::default(),
    }
}

fn load_service(policy: ProcessingPolicy) -> EmbeddingService {
    EmbeddingService::load(&test_config(policy)).expect("Failed to load embedding service")
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_one_vector_per_input_in_order() {
    let service = load_service(ProcessingPolicy::Isolated);

    let texts = vec![
        "the quick brown fox".to_string(),
        "jumps over the lazy dog".to_string(),
        "an unrelated sentence".to_string(),
    ];
    let outcome = service.embed_texts(&texts).unwrap();

    assert_eq!(outcome.embeddings.len(), 3);
    for embedding in &outcome.embeddings {
        assert_eq!(embedding.len(), 1024);
    }

    // Order is tied to input order: re-embedding each text alone must
    // reproduce the vector at its position
    for (i, text) in texts.iter().enumerate() {
        let single = service.embed_texts(&[text.clone()]).unwrap();
        assert_eq!(single.embeddings[0], outcome.embeddings[i]);
    }
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_vectors_are_unit_norm() {
    let service = load_service(ProcessingPolicy::Isolated);

    let texts = vec!["hello world".to_string(), "a much longer sentence with more tokens in it".to_string()];
    let outcome = service.embed_texts(&texts).unwrap();

    for embedding in &outcome.embeddings {
        let norm = l2_norm(embedding);
        assert!(
            (norm - 1.0).abs() < 1e-5,
            "expected unit norm, got {}",
            norm
        );
    }
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_idempotence_across_requests() {
    let service = load_service(ProcessingPolicy::Isolated);

    let text = vec!["determinism check".to_string()];
    let first = service.embed_texts(&text).unwrap();
    let second = service.embed_texts(&text).unwrap();

    // Bit-identical, not approximately equal
    assert_eq!(first.embeddings, second.embeddings);
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_isolated_mode_ignores_co_batched_texts() {
    let service = load_service(ProcessingPolicy::Isolated);

    let alone = service
        .embed_texts(&["target text".to_string()])
        .unwrap();
    let with_others = service
        .embed_texts(&[
            "target text".to_string(),
            "a considerably longer neighbor that would change padding in a batched pass".to_string(),
            "x".to_string(),
        ])
        .unwrap();

    assert_eq!(alone.embeddings[0], with_others.embeddings[0]);
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_prompt_eval_count_sums_per_text_counts() {
    let service = load_service(ProcessingPolicy::Isolated);

    let a = service.embed_texts(&["hello world".to_string()]).unwrap();
    let b = service.embed_texts(&["another input".to_string()]).unwrap();
    let both = service
        .embed_texts(&["hello world".to_string(), "another input".to_string()])
        .unwrap();

    assert!(a.prompt_eval_count > 0);
    assert_eq!(
        both.prompt_eval_count,
        a.prompt_eval_count + b.prompt_eval_count
    );
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_batched_mode_returns_all_vectors() {
    let service = load_service(ProcessingPolicy::Batched);

    let texts = vec![
        "short".to_string(),
        "a noticeably longer input that forces padding of the short one".to_string(),
    ];
    let outcome = service.embed_texts(&texts).unwrap();

    assert_eq!(outcome.embeddings.len(), 2);
    for embedding in &outcome.embeddings {
        assert_eq!(embedding.len(), 1024);
        assert!((l2_norm(embedding) - 1.0).abs() < 1e-5);
    }
    // Padding tokens must not count
    assert!(outcome.prompt_eval_count > 0);
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_empty_input_is_a_client_error() {
    let service = load_service(ProcessingPolicy::Isolated);

    let err = service.embed_texts(&[]).unwrap_err();
    assert!(matches!(err, EmbeddingError::EmptyInput));
}
