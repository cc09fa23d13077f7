// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embeddings API Module
//!
//! This module provides the POST /v1/embeddings endpoint: request
//! normalization and validation, the handler, and the response schema.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embeddings_handler;
pub use request::{EmbeddingInput, EmbeddingsRequest};
pub use response::EmbeddingsResponse;
