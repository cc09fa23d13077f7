// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Deterministic text-embedding pipeline.
//!
//! Tokenization, encoder forward pass, masked mean pooling, and L2
//! normalization. The pipeline runs under one of two policies: isolated
//! (one forward pass per text, bit-stable results) or batched (one padded
//! forward pass per request, faster but sensitive to batch composition).

pub mod onnx_model;
pub mod pooling;
pub mod service;
pub mod tokenizer;

pub use onnx_model::OnnxEmbeddingModel;
pub use service::{EmbeddingOutcome, EmbeddingService};
pub use tokenizer::{TokenizedBatch, TokenizerAdapter};

use thiserror::Error;

/// Failure classes of the embedding pipeline.
///
/// `EmptyInput` is a client-input error and is reported before any
/// computation starts. The remaining variants abort the whole request;
/// no partial vectors are ever returned.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("input list is empty")]
    EmptyInput,

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected embedding dimension: got {got}, expected {expected}")]
    DimensionMismatch { got: usize, expected: usize },
}
