//! Format constants.
//!
//! This module defines the on-disk contract of the ragfile format. Every
//! constant here is part of the format: changing any of them changes the
//! serialized header layout or the signature bytes and therefore requires a
//! version bump.

/// Magic tag identifying a ragfile.
///
/// The four bytes `R A G F` read as a little-endian 32-bit word. Written as
/// the first header field of every file; readers reject anything else.
pub const RAGFILE_MAGIC: u32 = 0x4647_4152;

/// Current format version.
///
/// Bumped whenever any header field's size, semantics, or order changes, or
/// when [`MINHASH_SIZE`] or [`BINARY_EMBEDDING_DIM`] change.
pub const RAGFILE_VERSION: u16 = 1;

/// Total MinHash signature width in 32-bit lanes.
///
/// The signature is split positionally: the first half holds the MinHash over
/// token 2-grams, the second half over 3-grams. Files produced with a
/// different width belong to a different format version and cannot be
/// compared by Jaccard.
pub const MINHASH_SIZE: usize = 256;

/// Width of one half of the combined MinHash signature.
pub const MINHASH_HALF_SIZE: usize = MINHASH_SIZE / 2;

/// Binary embedding width in bits.
///
/// Must stay a multiple of 8. When the dense embedding has fewer dimensions
/// than this, only the leading dimensions contribute and the remaining bits
/// stay clear.
pub const BINARY_EMBEDDING_DIM: usize = 128;

/// Binary embedding width in bytes as stored in the header.
pub const BINARY_EMBEDDING_BYTES: usize = BINARY_EMBEDDING_DIM / 8;

/// Size of the fixed identifier regions (tokenizer id, embedding model id)
/// in bytes, including the mandatory zero terminator.
pub const MODEL_ID_SIZE: usize = 64;

/// Seed for both MinHash halves of the header signature.
///
/// Lane `j` hashes with `MINHASH_SEED + j`; the two halves hash disjoint
/// shingle sets with the same seed.
pub const MINHASH_SEED: u32 = 0;

/// Shingle size feeding the first signature half.
pub const BIGRAM_SHINGLE: usize = 2;

/// Shingle size feeding the second signature half.
pub const TRIGRAM_SHINGLE: usize = 3;

/// Serialized header size in bytes for [`RAGFILE_VERSION`].
///
/// Fixed per version so a scanner can read exactly this many bytes to obtain
/// both signatures without touching payload.
pub const HEADER_SIZE: usize = 4  // magic
    + 2                           // version
    + 8                           // flags
    + 2                           // tokenizer fingerprint
    + 2                           // embedding model fingerprint
    + BINARY_EMBEDDING_BYTES
    + MINHASH_SIZE * 4
    + 2                           // text hash
    + 4                           // text size
    + 2                           // metadata version
    + 4                           // metadata size
    + 2                           // num embeddings
    + 2                           // embedding dim
    + 4                           // embedding size
    + MODEL_ID_SIZE * 2;

/// File extension produced and discovered by the scanner helpers.
pub const FILE_EXTENSION: &str = ".rag";
