// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tokenizer adapter over HuggingFace `tokenizers`.
//!
//! Converts raw text into padded, truncated token-id sequences plus an
//! attention mask. Padding is to the longest sequence in the processed
//! group, not the global maximum; truncation silently drops tokens past
//! the configured bound.

use ndarray::Array2;
use std::path::Path;
use tokenizers::Tokenizer;

use super::EmbeddingError;

/// Token ids and attention mask for one processed group of texts.
///
/// Both arrays are `[group_len, padded_len]`; mask value 1 marks a real
/// token, 0 marks padding.
#[derive(Debug, Clone)]
pub struct TokenizedBatch {
    pub input_ids: Array2<i64>,
    pub attention_mask: Array2<i64>,
}

impl TokenizedBatch {
    /// Number of sequences in the batch.
    pub fn len(&self) -> usize {
        self.input_ids.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of non-padding tokens across all sequences.
    pub fn prompt_tokens(&self) -> usize {
        self.attention_mask.iter().map(|&m| m as usize).sum()
    }
}

/// Wraps a `tokenizers::Tokenizer` with the service's length bound.
pub struct TokenizerAdapter {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl TokenizerAdapter {
    /// Loads a tokenizer from a `tokenizer.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P, max_length: usize) -> Result<Self, EmbeddingError> {
        let tokenizer = Tokenizer::from_file(path.as_ref()).map_err(|e| {
            EmbeddingError::Tokenization(format!(
                "failed to load tokenizer from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(Self::new(tokenizer, max_length))
    }

    /// Wraps an already-constructed tokenizer.
    pub fn new(tokenizer: Tokenizer, max_length: usize) -> Self {
        Self {
            tokenizer,
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Encodes a group of texts, padding every sequence to the longest
    /// one in the group.
    pub fn encode_batch(&self, texts: &[String]) -> Result<TokenizedBatch, EmbeddingError> {
        let mut encoded: Vec<(Vec<i64>, Vec<i64>)> = Vec::with_capacity(texts.len());
        let mut max_len = 0usize;

        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

            let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let mut mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();

            // Over-length input truncates silently, no error
            if ids.len() > self.max_length {
                ids.truncate(self.max_length);
                mask.truncate(self.max_length);
            }

            max_len = max_len.max(ids.len());
            encoded.push((ids, mask));
        }

        let mut input_ids = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask = Vec::with_capacity(texts.len() * max_len);

        for (ids, mask) in &encoded {
            input_ids.extend_from_slice(ids);
            attention_mask.extend_from_slice(mask);

            // Pad to the longest sequence in this group
            let padding_needed = max_len - ids.len();
            input_ids.extend(std::iter::repeat(0i64).take(padding_needed));
            attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let shape = (texts.len(), max_len);
        let input_ids = Array2::from_shape_vec(shape, input_ids)
            .map_err(|e| EmbeddingError::Tokenization(format!("bad batch shape: {}", e)))?;
        let attention_mask = Array2::from_shape_vec(shape, attention_mask)
            .map_err(|e| EmbeddingError::Tokenization(format!("bad batch shape: {}", e)))?;

        Ok(TokenizedBatch {
            input_ids,
            attention_mask,
        })
    }
}
