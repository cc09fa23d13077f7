// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod version;

// Re-export main types
pub use api::{ApiError, ErrorResponse};
pub use config::{DeterminismConfig, ProcessingPolicy, ServiceConfig};
pub use embeddings::{
    EmbeddingError, EmbeddingOutcome, EmbeddingService, OnnxEmbeddingModel, TokenizedBatch,
    TokenizerAdapter,
};
