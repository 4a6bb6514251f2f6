//! Sign quantization of dense embeddings.
//!
//! The header's binary embedding is the sign pattern of the centroid of all
//! stored vectors, packed LSB-first. It is deliberately lossy: Hamming
//! distance over the packed bytes costs a handful of XOR+popcount
//! instructions and needs only the header.

use crate::config::{BINARY_EMBEDDING_BYTES, BINARY_EMBEDDING_DIM};
use crate::error::{RagError, Result};

/// Componentwise mean over the first `take_dims` dimensions of a row-major
/// `(num_embeddings, embedding_dim)` matrix.
fn average_embedding(flat: &[f32], num_embeddings: usize, embedding_dim: usize, take_dims: usize) -> Vec<f32> {
    let mut average = vec![0.0f32; take_dims];

    for row in flat.chunks_exact(embedding_dim) {
        for (sum, &component) in average.iter_mut().zip(row) {
            *sum += component;
        }
    }
    for sum in &mut average {
        *sum /= num_embeddings as f32;
    }

    average
}

/// Packs the sign pattern of `average` into `packed`, one bit per dimension.
///
/// Bit `d` is set iff `average[d]` is strictly positive and lives at byte
/// `d / 8`, bit `d % 8` counted from the LSB. Dimensions beyond the end of
/// `average` stay clear.
fn pack_sign_bits(average: &[f32], packed: &mut [u8]) {
    packed.fill(0);
    for (d, &component) in average.iter().enumerate() {
        if component > 0.0 {
            packed[d / 8] |= 1 << (d % 8);
        }
    }
}

/// Derives the header's packed binary embedding from a flat row-major matrix.
///
/// Only the first `min(BINARY_EMBEDDING_DIM, embedding_dim)` components
/// contribute; truncation of wider embeddings is intentional.
///
/// # Errors
///
/// `InvalidArgument` when the matrix is empty or its length is not
/// `num_embeddings * embedding_dim`.
pub fn binary_embedding(flat: &[f32], num_embeddings: usize, embedding_dim: usize) -> Result<[u8; BINARY_EMBEDDING_BYTES]> {
    const { assert!(BINARY_EMBEDDING_DIM % 8 == 0) };

    if num_embeddings == 0 || embedding_dim == 0 {
        return Err(RagError::invalid_argument("embedding matrix must be non-empty"));
    }
    if flat.len() != num_embeddings * embedding_dim {
        return Err(RagError::invalid_argument(format!(
            "embedding matrix length {} does not match {} x {}",
            flat.len(),
            num_embeddings,
            embedding_dim
        )));
    }

    let take_dims = BINARY_EMBEDDING_DIM.min(embedding_dim);
    let average = average_embedding(flat, num_embeddings, embedding_dim, take_dims);

    let mut packed = [0u8; BINARY_EMBEDDING_BYTES];
    pack_sign_bits(&average, &mut packed);
    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_vector_fixture() {
        // Centroid is {-0.11, -0.40, 0.56, -0.40, 0.50, -0.60, 0.70, -0.57,
        // 0.73, -1.00, 1.10, -1.20, 1.30, -1.40, 1.50, -1.60}; its sign
        // pattern packs to {0x54, 0x55}.
        #[rustfmt::skip]
        let embeddings: [[f32; 16]; 7] = [
            [-0.7, -0.1, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8, 0.9, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [-0.6, -0.2, 0.9, -0.4, 0.5, -0.6, 0.7, -0.4, 0.6, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [-0.5, -0.3, 0.3, -0.4, 0.5, -0.6, 0.7, -0.4, 0.6, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [ 0.4, -0.4, 0.9, -0.4, 0.5, -0.6, 0.7, -0.4, 0.9, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [ 0.3, -0.5, 0.3, -0.4, 0.5, -0.6, 0.7, -0.4, 0.6, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [ 0.2, -0.6, 0.9, -0.4, 0.5, -0.6, 0.7, -0.8, 0.6, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
            [ 0.1, -0.7, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8, 0.9, -1.0, 1.1, -1.2, 1.3, -1.4, 1.5, -1.6],
        ];
        let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();

        let average = average_embedding(&flat, 7, 16, 16);
        let expected_average = [
            -0.11, -0.40, 0.56, -0.40, 0.50, -0.60, 0.70, -0.57, 0.73, -1.00, 1.10, -1.20, 1.30, -1.40, 1.50, -1.60,
        ];
        for (got, want) in average.iter().zip(expected_average) {
            assert!((got - want).abs() < 0.01, "average {got} vs {want}");
        }

        let mut packed = [0u8; 2];
        pack_sign_bits(&average, &mut packed);
        assert_eq!(packed, [0x54, 0x55]);
    }

    #[test]
    fn test_strictly_positive_rule() {
        // A zero mean component must not set its bit.
        let average = [0.0, 1.0, -1.0, f32::MIN_POSITIVE, 0.0, 0.0, 0.0, 0.0];
        let mut packed = [0u8; 1];
        pack_sign_bits(&average, &mut packed);
        assert_eq!(packed, [0b0000_1010]);
    }

    #[test]
    fn test_narrow_embedding_leaves_high_bits_clear() {
        // Eight positive dimensions against a 128-bit signature: only the
        // first byte can carry set bits.
        let flat = [0.1f32, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let packed = binary_embedding(&flat, 1, 8).unwrap();
        assert_eq!(packed[0], 0xFF);
        assert!(packed[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let flat = [0.1f32; 10];
        assert!(matches!(binary_embedding(&flat, 3, 4), Err(RagError::InvalidArgument(_))));
        assert!(binary_embedding(&flat, 0, 4).is_err());
    }
}
