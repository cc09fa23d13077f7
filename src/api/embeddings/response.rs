// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingsResponse type for POST /v1/embeddings.

use serde::{Deserialize, Serialize};

/// Response body for POST /v1/embeddings
///
/// # Example
/// ```json
/// {
///   "model": "bge-m3",
///   "embeddings": [[0.1, 0.2, ...]],
///   "total_duration": 5043500,
///   "load_duration": 2109000000,
///   "prompt_eval_count": 4
/// }
/// ```
///
/// `embeddings` has the same order and count as the input texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsResponse {
    /// Model that produced the vectors
    pub model: String,

    /// One L2-normalized vector per input text, in input order
    pub embeddings: Vec<Vec<f32>>,

    /// Nanoseconds spent computing this response
    pub total_duration: u64,

    /// Nanoseconds the model took to load at startup, measured once
    pub load_duration: u64,

    /// Non-padding tokens consumed across all inputs
    pub prompt_eval_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_field_names() {
        let response = EmbeddingsResponse {
            model: "bge-m3".to_string(),
            embeddings: vec![vec![0.6, 0.8]],
            total_duration: 1_000_000,
            load_duration: 2_000_000_000,
            prompt_eval_count: 4,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""model":"bge-m3""#));
        assert!(json.contains(r#""embeddings":[[0.6,0.8]]"#));
        assert!(json.contains(r#""total_duration":1000000"#));
        assert!(json.contains(r#""load_duration":2000000000"#));
        assert!(json.contains(r#""prompt_eval_count":4"#));
    }

    #[test]
    fn test_response_round_trips() {
        let json = r#"{
            "model": "bge-m3",
            "embeddings": [[1.0, 0.0], [0.0, 1.0]],
            "total_duration": 42,
            "load_duration": 7,
            "prompt_eval_count": 2
        }"#;

        let response: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.prompt_eval_count, 2);
    }
}
