// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::embeddings::EmbeddingError;

/// Error body returned to clients. A single detail string, matching the
/// wire shape existing clients of this endpoint already parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

/// HTTP-boundary error kinds.
///
/// The embedding pipeline reports failures as [`EmbeddingError`]; only
/// this layer turns error kinds into status codes.
#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::InternalError(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) | ApiError::InternalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::EmptyInput => {
                ApiError::InvalidRequest("Input list is empty".to_string())
            }
            other => ApiError::InternalError(format!("Embedding failed: {}", other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
