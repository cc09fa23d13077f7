// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings HTTP handler
//!
//! Validates the request, offloads the synchronous embedding computation
//! to a blocking worker, and assembles the response with timing and
//! token-count metadata.

use axum::extract::State;
use axum::Json;
use std::time::Instant;

use crate::api::embeddings::{EmbeddingsRequest, EmbeddingsResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;

/// POST /v1/embeddings handler
///
/// Returns one L2-normalized vector per input text, in input order.
/// Validation failures report 400 before any computation; tokenizer or
/// runtime failures report 500 with no partial results.
pub async fn embeddings_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>, ApiError> {
    let start = Instant::now();

    request.validate()?;
    let texts = request.input.into_texts();

    // The forward pass is CPU-bound with no suspension points; run it on
    // the blocking pool so runtime workers stay responsive
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.embed_texts(&texts))
        .await
        .map_err(|e| ApiError::InternalError(format!("Embedding failed: {}", e)))??;

    let response = EmbeddingsResponse {
        model: state.service.model_name().to_string(),
        embeddings: outcome.embeddings,
        total_duration: start.elapsed().as_nanos() as u64,
        load_duration: state.service.load_duration().as_nanos() as u64,
        prompt_eval_count: outcome.prompt_eval_count as u64,
    };

    Ok(Json(response))
}
