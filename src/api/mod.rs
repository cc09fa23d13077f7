// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embeddings;
pub mod errors;
pub mod http_server;

pub use embeddings::{embeddings_handler, EmbeddingInput, EmbeddingsRequest, EmbeddingsResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{router, start_server, AppState};
