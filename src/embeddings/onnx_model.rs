// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module wraps ONNX Runtime for running a pretrained sentence
//! encoder (BGE-M3 class). The encoder produces per-token hidden states;
//! masked mean pooling and L2 normalization turn them into one unit
//! vector per input text.
//!
//! Two forward-pass shapes are supported:
//! - isolated: one pass per text, bit-stable output
//! - batched: one padded pass per group, faster
//!
//! Determinism options from the service configuration are applied when
//! the session is built (thread counts, graph-optimization level).

use anyhow::{Context, Result};
use ndarray::{Array2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::info;

use crate::config::ServiceConfig;
use crate::embeddings::pooling;
use crate::embeddings::{EmbeddingError, TokenizedBatch, TokenizerAdapter};

/// ONNX-based embedding model.
///
/// # Thread Safety
/// The session sits behind a `Mutex`, serializing forward passes; safe
/// concurrent use of the runtime's internal scratch buffers is not
/// assumed. Model weights and tokenizer are immutable shared state.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,

    tokenizer: Arc<TokenizerAdapter>,

    /// Model name reported in responses (e.g., "bge-m3")
    model_name: String,

    /// Output dimension, validated at load time
    dimension: usize,

    /// Whether the exported graph declares a token_type_ids input
    /// (BERT-style exports do, XLM-R/BGE-M3 exports don't)
    needs_token_type_ids: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("needs_token_type_ids", &self.needs_token_type_ids)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the encoder and tokenizer described by `config` and
    /// validates the output dimension with a probe inference.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The probe output is not `[batch, seq_len, dimension]`
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        if !config.model_path.exists() {
            anyhow::bail!(
                "ONNX model file not found: {}",
                config.model_path.display()
            );
        }
        if !config.tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}",
                config.tokenizer_path.display()
            );
        }

        let determinism = &config.determinism;
        info!(
            "Initializing ONNX session (seed={}, deterministic_kernels={}, disable_mixed_precision={})",
            determinism.seed, determinism.deterministic_kernels, determinism.disable_mixed_precision
        );

        // Single-threaded execution keeps floating-point reductions in a
        // fixed evaluation order
        let (intra_threads, inter_threads) = if determinism.deterministic_kernels {
            (1, 1)
        } else {
            let threads = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4);
            (threads, 1)
        };

        // Extended optimization levels can apply precision-changing
        // fusions; cap at the basic level when they must be avoided
        let optimization_level = if determinism.disable_mixed_precision {
            GraphOptimizationLevel::Level1
        } else {
            GraphOptimizationLevel::Level3
        };

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(optimization_level)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .with_inter_threads(inter_threads)
            .context("Failed to set inter threads")?
            .commit_from_file(&config.model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                config.model_path.display()
            ))?;

        let needs_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        let tokenizer = TokenizerAdapter::new(tokenizer, config.max_length);

        // Probe inference: the model must output token-level hidden
        // states [batch, seq_len, dimension]
        {
            let probe = tokenizer
                .encode_batch(&["validation probe".to_string()])
                .map_err(|e| anyhow::anyhow!("Tokenizer validation failed: {}", e))?;

            let outputs = run_session(&mut session, &probe, needs_token_type_ids)
                .map_err(|e| anyhow::anyhow!("Probe inference failed: {}", e))?;

            let shape = outputs.shape().to_vec();
            if shape.len() != 3 || shape[2] != config.dimension {
                anyhow::bail!(
                    "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, {}])",
                    shape,
                    config.dimension
                );
            }
        }

        info!(
            "ONNX embedding model loaded: {} ({} dimensions, max_length {})",
            config.model_name, config.dimension, config.max_length
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name: config.model_name.clone(),
            dimension: config.dimension,
            needs_token_type_ids,
        })
    }

    /// Embeds each text with its own forward pass (batch size 1).
    ///
    /// No cross-text padding or batched-kernel interaction can perturb
    /// the numeric result: embedding a text here is bit-identical no
    /// matter what else is in the request.
    ///
    /// Returns the vectors in input order plus the number of non-padding
    /// tokens consumed.
    pub fn embed_isolated(
        &self,
        texts: &[String],
    ) -> Result<(Vec<Vec<f32>>, usize), EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        let mut prompt_tokens = 0usize;

        for text in texts {
            let batch = self.tokenizer.encode_batch(std::slice::from_ref(text))?;
            prompt_tokens += batch.prompt_tokens();

            let mut vectors = self.forward_pooled(&batch)?;
            // batch size 1 in, 1 vector out
            embeddings.push(vectors.remove(0));
        }

        Ok((embeddings, prompt_tokens))
    }

    /// Embeds the whole group with one padded forward pass.
    ///
    /// Faster than isolated processing, but pooled results for a text
    /// can differ minutely between calls depending on co-batched texts'
    /// lengths and padding.
    pub fn embed_batched(
        &self,
        texts: &[String],
    ) -> Result<(Vec<Vec<f32>>, usize), EmbeddingError> {
        let batch = self.tokenizer.encode_batch(texts)?;
        let prompt_tokens = batch.prompt_tokens();

        let embeddings = self.forward_pooled(&batch)?;
        Ok((embeddings, prompt_tokens))
    }

    /// Runs the encoder on a tokenized batch, then pools and normalizes
    /// each sequence independently.
    fn forward_pooled(&self, batch: &TokenizedBatch) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let rows = batch.len();

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::Inference("model session lock poisoned".to_string()))?;

        let outputs = run_session(&mut session, batch, self.needs_token_type_ids)?;

        let shape = outputs.shape();
        if shape.len() != 3 || shape[2] != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                got: shape.last().copied().unwrap_or(0),
                expected: self.dimension,
            });
        }

        let mut embeddings = Vec::with_capacity(rows);
        for row in 0..rows {
            let hidden = outputs
                .index_axis(Axis(0), row)
                .into_dimensionality::<Ix2>()
                .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
            let mask = batch.attention_mask.row(row).to_vec();

            let mut pooled = pooling::masked_mean_pool(hidden, &mask);
            pooling::l2_normalize(&mut pooled);
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn max_length(&self) -> usize {
        self.tokenizer.max_length()
    }
}

/// Runs one forward pass and extracts the hidden-state tensor as an
/// owned array, so the session borrow ends here.
fn run_session(
    session: &mut Session,
    batch: &TokenizedBatch,
    needs_token_type_ids: bool,
) -> Result<ndarray::ArrayD<f32>, EmbeddingError> {
    let input_ids = Value::from_array(batch.input_ids.clone())
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
    let attention_mask = Value::from_array(batch.attention_mask.clone())
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

    let outputs = if needs_token_type_ids {
        let token_type_ids = Value::from_array(Array2::<i64>::zeros(batch.input_ids.raw_dim()))
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
            "token_type_ids" => token_type_ids
        ])
    } else {
        session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask
        ])
    }
    .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

    // Index [0] instead of name; different exports name the hidden-state
    // output differently
    let hidden = outputs[0]
        .try_extract_array::<f32>()
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

    Ok(hidden.to_owned())
}
