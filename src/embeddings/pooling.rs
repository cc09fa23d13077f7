// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pooling and normalization of encoder hidden states.
//!
//! Both operations run per sequence, so their results are independent of
//! how texts were grouped into forward passes.

use ndarray::ArrayView2;

/// Floor for the attention-mask sum; keeps a degenerate all-padding
/// sequence from dividing by zero.
pub const MASK_SUM_FLOOR: f32 = 1e-9;

/// Floor for the Euclidean norm when normalizing.
pub const NORM_FLOOR: f32 = 1e-12;

/// Masked mean pooling over one sequence's hidden states.
///
/// `hidden` is `[seq_len, hidden_dim]`; `mask` is that sequence's
/// attention-mask row (1 = real token, 0 = padding). Each position's
/// hidden vector is weighted by its mask value, summed, and divided by
/// the mask sum.
pub fn masked_mean_pool(hidden: ArrayView2<f32>, mask: &[i64]) -> Vec<f32> {
    let seq_len = hidden.shape()[0];
    let hidden_dim = hidden.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = mask[i] as f32;
        sum_mask += mask_value;
        for j in 0..hidden_dim {
            pooled[j] += hidden[[i, j]] * mask_value;
        }
    }

    let denom = sum_mask.max(MASK_SUM_FLOOR);
    for val in &mut pooled {
        *val /= denom;
    }

    pooled
}

/// Scales `v` to unit Euclidean length in place.
///
/// The norm is floored at [`NORM_FLOOR`], so a zero vector stays zero
/// instead of becoming NaN.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm.max(NORM_FLOOR);
    for val in v.iter_mut() {
        *val /= denom;
    }
}
