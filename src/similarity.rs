//! Similarity kernels.
//!
//! Three kernels cover the three signature tiers: Jaccard over MinHash lanes
//! and Hamming over packed sign bits both work from the header alone, while
//! cosine needs the full float matrices and aggregates the pairwise grid
//! with [`CosineMode`].

use strum::{Display, EnumString};

use crate::error::{RagError, Result};

/// Aggregation over the pairwise cosine grid of two multi-vector files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CosineMode {
    /// Highest pairwise cosine (the default).
    Max,
    /// Arithmetic mean over all pairs.
    Avg,
}

/// Estimated Jaccard similarity: the fraction of lanes where both signatures
/// hold the same minimum.
///
/// # Errors
///
/// `Incompatible` when the widths differ; callers must ensure compatibility
/// before invoking.
pub fn jaccard(a: &[u32], b: &[u32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::Incompatible(format!(
            "minhash widths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(RagError::Incompatible("minhash signatures are empty".into()));
    }

    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    Ok(matches as f32 / a.len() as f32)
}

/// Hamming similarity over packed bit vectors: `1 - distance / total_bits`.
///
/// # Errors
///
/// `Incompatible` when the byte lengths differ.
pub fn hamming(a: &[u8], b: &[u8]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::Incompatible(format!(
            "binary embedding lengths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(RagError::Incompatible("binary embeddings are empty".into()));
    }

    let distance: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    let total_bits = (a.len() * 8) as f32;
    Ok(1.0 - distance as f32 / total_bits)
}

/// Cosine similarity of one vector pair, 0 when either norm is zero.
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    norm_a = norm_a.sqrt();
    norm_b = norm_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Aggregated cosine over every pair drawn from two row-major matrices of
/// identical dimensionality.
///
/// # Errors
///
/// `InvalidArgument` when `embedding_dim` is zero or either matrix is empty
/// or not a whole number of rows.
pub fn cosine_aggregate(a: &[f32], b: &[f32], embedding_dim: usize, mode: CosineMode) -> Result<f32> {
    if embedding_dim == 0 {
        return Err(RagError::invalid_argument("embedding dimension must be nonzero"));
    }
    if a.is_empty() || b.is_empty() {
        return Err(RagError::invalid_argument("embedding matrices must be non-empty"));
    }
    if a.len() % embedding_dim != 0 || b.len() % embedding_dim != 0 {
        return Err(RagError::invalid_argument(format!(
            "matrix lengths {} and {} are not multiples of dimension {}",
            a.len(),
            b.len(),
            embedding_dim
        )));
    }

    let mut max = -1.0f32;
    let mut total = 0.0f32;
    let mut count = 0usize;

    for row_a in a.chunks_exact(embedding_dim) {
        for row_b in b.chunks_exact(embedding_dim) {
            let similarity = cosine(row_a, row_b);
            max = max.max(similarity);
            total += similarity;
            count += 1;
        }
    }

    Ok(match mode {
        CosineMode::Max => max,
        CosineMode::Avg => total / count as f32,
    })
}
