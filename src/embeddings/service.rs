// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide embedding state.
//!
//! Built once during startup and handed to request handlers by value
//! (behind `Arc`); nothing here is looked up ambiently. The load
//! duration is measured exactly once and reused in every response.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{ProcessingPolicy, ServiceConfig};
use crate::embeddings::{EmbeddingError, OnnxEmbeddingModel};

/// Vectors for one request, in input order, plus the token count
/// consumed producing them.
#[derive(Debug, Clone)]
pub struct EmbeddingOutcome {
    pub embeddings: Vec<Vec<f32>>,
    pub prompt_eval_count: usize,
}

/// Immutable per-process embedding service.
pub struct EmbeddingService {
    model: OnnxEmbeddingModel,
    policy: ProcessingPolicy,
    load_duration: Duration,
}

impl EmbeddingService {
    /// Loads model and tokenizer, timing the load once for the process
    /// lifetime.
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        let load_start = Instant::now();
        let model = OnnxEmbeddingModel::new(config)?;
        let load_duration = load_start.elapsed();

        info!(
            "Embedding service ready: model={} policy={} load_duration={:.2}s",
            config.model_name,
            config.policy,
            load_duration.as_secs_f64()
        );

        Ok(Self {
            model,
            policy: config.policy,
            load_duration,
        })
    }

    /// Embeds `texts` under the configured processing policy.
    ///
    /// All-or-nothing: any tokenizer or runtime failure aborts the whole
    /// request and no partial vectors are returned.
    pub fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingOutcome, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let (embeddings, prompt_eval_count) = match self.policy {
            ProcessingPolicy::Isolated => self.model.embed_isolated(texts)?,
            ProcessingPolicy::Batched => self.model.embed_batched(texts)?,
        };

        Ok(EmbeddingOutcome {
            embeddings,
            prompt_eval_count,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn policy(&self) -> ProcessingPolicy {
        self.policy
    }

    /// Model-load wall time, measured once at startup.
    pub fn load_duration(&self) -> Duration {
        self.load_duration
    }
}
