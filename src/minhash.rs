//! MinHash signature engine.
//!
//! A signature is `width` 32-bit lanes; lane `j` holds the minimum of
//! `murmur3_32(shingle, seed + j)` over every contiguous shingle of the token
//! sequence. A shingle is viewed as the packed little-endian bytes of its
//! token ids, so identical token runs hash identically on every platform.

use crate::config::{BIGRAM_SHINGLE, MINHASH_HALF_SIZE, MINHASH_SEED, MINHASH_SIZE, TRIGRAM_SHINGLE};
use crate::error::{RagError, Result};
use crate::hash::murmur3_32;

/// A fixed-width MinHash signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHash {
    signature: Vec<u32>,
    seed: u32,
}

impl MinHash {
    /// Builds a signature of `width` lanes over `shingle_size`-token shingles.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `width` or `shingle_size` is zero, or when the
    /// token sequence is shorter than one shingle.
    pub fn from_tokens(tokens: &[u32], shingle_size: usize, width: usize, seed: u32) -> Result<Self> {
        if width == 0 {
            return Err(RagError::invalid_argument("minhash width must be nonzero"));
        }
        if shingle_size == 0 {
            return Err(RagError::invalid_argument("shingle size must be nonzero"));
        }
        if tokens.len() < shingle_size {
            return Err(RagError::invalid_argument(format!(
                "token count {} is below shingle size {}",
                tokens.len(),
                shingle_size
            )));
        }

        let mut signature = vec![u32::MAX; width];
        let mut shingle_bytes = vec![0u8; shingle_size * 4];

        for shingle in tokens.windows(shingle_size) {
            for (chunk, token) in shingle_bytes.chunks_exact_mut(4).zip(shingle) {
                chunk.copy_from_slice(&token.to_le_bytes());
            }
            for (j, lane) in signature.iter_mut().enumerate() {
                let hash = murmur3_32(&shingle_bytes, seed.wrapping_add(j as u32));
                if hash < *lane {
                    *lane = hash;
                }
            }
        }

        Ok(Self { signature, seed })
    }

    /// The signature lanes.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &[u32] {
        &self.signature
    }

    /// Number of lanes.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.signature.len()
    }

    /// The base seed the lanes were hashed with.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Folds `other` into `self`, keeping the lane-wise minimum.
    ///
    /// Equivalent to having hashed the union of both shingle sets, which
    /// makes incremental signature building possible.
    ///
    /// # Errors
    ///
    /// `Incompatible` when the widths differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.width() != other.width() {
            return Err(RagError::Incompatible(format!(
                "cannot merge minhash widths {} and {}",
                self.width(),
                other.width()
            )));
        }

        for (lane, &theirs) in self.signature.iter_mut().zip(&other.signature) {
            if theirs < *lane {
                *lane = theirs;
            }
        }

        Ok(())
    }
}

/// Builds the combined header signature: a bigram half followed by a trigram
/// half, both seeded with [`MINHASH_SEED`].
///
/// The positional split is part of the format contract; rebuilding from the
/// same tokens must reproduce the same bytes.
///
/// # Errors
///
/// `InvalidArgument` when the token sequence is shorter than the larger
/// shingle size.
pub fn combined_signature(tokens: &[u32]) -> Result<[u32; MINHASH_SIZE]> {
    let bigrams = MinHash::from_tokens(tokens, BIGRAM_SHINGLE, MINHASH_HALF_SIZE, MINHASH_SEED)?;
    let trigrams = MinHash::from_tokens(tokens, TRIGRAM_SHINGLE, MINHASH_HALF_SIZE, MINHASH_SEED)?;

    let mut combined = [0u32; MINHASH_SIZE];
    combined[..MINHASH_HALF_SIZE].copy_from_slice(bigrams.signature());
    combined[MINHASH_HALF_SIZE..].copy_from_slice(trigrams.signature());
    Ok(combined)
}
