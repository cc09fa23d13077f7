// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration sourced from environment variables.
//!
//! Everything the process needs is decided here at startup: where the
//! model artifacts live, how requests are grouped into forward passes,
//! and which determinism options are applied when the ONNX session is
//! built. Request handlers receive the resulting state explicitly and
//! never read the environment themselves.

use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// How a request's texts are grouped into forward passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingPolicy {
    /// One forward pass per text (batch size 1). Output for a text is
    /// bit-stable no matter what else is in the request, at the cost of
    /// batching throughput.
    Isolated,
    /// One padded forward pass for the whole request. Faster, but pooled
    /// results for a text can differ minutely between calls depending on
    /// co-batched texts' lengths and padding.
    Batched,
}

impl ProcessingPolicy {
    /// Parses a policy name; unknown values fall back to `Isolated`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "isolated" => ProcessingPolicy::Isolated,
            "batched" => ProcessingPolicy::Batched,
            other => {
                warn!(
                    "Unknown EMBED_POLICY '{}', falling back to 'isolated'",
                    other
                );
                ProcessingPolicy::Isolated
            }
        }
    }
}

impl fmt::Display for ProcessingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingPolicy::Isolated => write!(f, "isolated"),
            ProcessingPolicy::Batched => write!(f, "batched"),
        }
    }
}

/// Determinism options applied when the inference session is built.
#[derive(Debug, Clone)]
pub struct DeterminismConfig {
    /// Seed recorded for pseudo-random generators. The CPU inference path
    /// contains no stochastic ops; the value is logged so runs can be
    /// correlated with their configuration.
    pub seed: u64,

    /// Run intra-op and inter-op execution single-threaded so
    /// floating-point reductions keep a fixed evaluation order.
    pub deterministic_kernels: bool,

    /// Cap graph optimization at the basic level; extended levels may
    /// apply precision-changing fusions.
    pub disable_mixed_precision: bool,
}

impl Default for DeterminismConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            deterministic_kernels: true,
            disable_mixed_precision: true,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,

    /// Model name reported in responses (e.g., "bge-m3").
    pub model_name: String,

    /// Path to the ONNX model file.
    pub model_path: PathBuf,

    /// Path to the tokenizer JSON file.
    pub tokenizer_path: PathBuf,

    /// Expected embedding dimension, validated at load time.
    pub dimension: usize,

    /// Maximum token sequence length; longer inputs are truncated.
    pub max_length: usize,

    /// Forward-pass grouping policy.
    pub policy: ProcessingPolicy,

    /// Determinism options for session construction.
    pub determinism: DeterminismConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let api_port = env::var("API_PORT").unwrap_or_else(|_| "8080".to_string());

        Self {
            listen_addr: format!("0.0.0.0:{}", api_port),
            model_name: env::var("EMBED_MODEL_NAME").unwrap_or_else(|_| "bge-m3".to_string()),
            model_path: PathBuf::from(
                env::var("MODEL_PATH")
                    .unwrap_or_else(|_| "./models/bge-m3-onnx/model.onnx".to_string()),
            ),
            tokenizer_path: PathBuf::from(
                env::var("TOKENIZER_PATH")
                    .unwrap_or_else(|_| "./models/bge-m3-onnx/tokenizer.json".to_string()),
            ),
            dimension: env::var("EMBED_DIMENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            max_length: env::var("MAX_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8192),
            policy: ProcessingPolicy::parse(
                &env::var("EMBED_POLICY").unwrap_or_else(|_| "isolated".to_string()),
            ),
            determinism: DeterminismConfig {
                seed: env::var("EMBED_SEED")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(42),
                // Determinism on by default; set DETERMINISTIC_KERNELS=false
                // to trade bit-stability for multi-threaded kernels
                deterministic_kernels: env::var("DETERMINISTIC_KERNELS")
                    .map(|v| v.to_lowercase() != "false")
                    .unwrap_or(true),
                disable_mixed_precision: env::var("DISABLE_MIXED_PRECISION")
                    .map(|v| v.to_lowercase() != "false")
                    .unwrap_or(true),
            },
        }
    }
}
