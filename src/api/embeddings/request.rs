// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingsRequest type for POST /v1/embeddings.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for POST /v1/embeddings
///
/// # Example
/// ```json
/// {
///   "input": ["Hello world", "Another text"],
///   "encoding_format": "float"
/// }
/// ```
///
/// `input` also accepts a bare string, which normalizes to a one-element
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    /// Text(s) to embed
    pub input: EmbeddingInput,

    /// Only "float" is supported; the field is kept for wire
    /// compatibility
    #[serde(default = "default_encoding_format")]
    pub encoding_format: String,
}

/// One text or an ordered list of texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

fn default_encoding_format() -> String {
    "float".to_string()
}

impl EmbeddingInput {
    /// Normalizes to an ordered list of texts.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            EmbeddingInput::Single(text) => vec![text],
            EmbeddingInput::Batch(texts) => texts,
        }
    }
}

impl EmbeddingsRequest {
    /// Validates the request before any computation is attempted.
    ///
    /// # Validation Rules
    /// 1. The normalized input list must be non-empty
    /// 2. `encoding_format` must be "float"
    pub fn validate(&self) -> Result<(), ApiError> {
        if let EmbeddingInput::Batch(texts) = &self.input {
            if texts.is_empty() {
                return Err(ApiError::InvalidRequest("Input list is empty".to_string()));
            }
        }

        if self.encoding_format != "float" {
            return Err(ApiError::InvalidRequest(format!(
                "Unsupported encoding_format: '{}' (only \"float\" is supported)",
                self.encoding_format
            )));
        }

        Ok(())
    }
}
