//! Fixed-size file header.
//!
//! The header is the scan-time face of a ragfile: both compact signatures,
//! the identifier fingerprints, and every payload length live here, so a
//! reader that consumes exactly [`HEADER_SIZE`](crate::config::HEADER_SIZE)
//! bytes can score a candidate without touching payload.
//!
//! Serialization is field-by-field in declared order, little-endian, never a
//! struct copy: the on-disk layout must not depend on native padding or byte
//! order.

use std::io::Read;

use crate::config::{BINARY_EMBEDDING_BYTES, HEADER_SIZE, MINHASH_SIZE, MODEL_ID_SIZE, RAGFILE_MAGIC, RAGFILE_VERSION};
use crate::error::{RagError, Result};

pub mod deserializer;
pub mod serializer;

/// Parsed ragfile header.
///
/// Construction goes through [`Header::new`] (assembly) or
/// [`Header::read_from`] (deserialization); both paths validate the same
/// invariants, so a `Header` in hand is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    magic: u32,
    version: u16,
    /// Reserved. Written as zero; nonzero values from future writers are
    /// preserved, not rejected.
    flags: u64,
    tokenizer_fingerprint: u16,
    embedding_model_fingerprint: u16,
    binary_embedding: [u8; BINARY_EMBEDDING_BYTES],
    minhash: [u32; MINHASH_SIZE],
    text_hash: u16,
    text_size: u32,
    metadata_version: u16,
    metadata_size: u32,
    num_embeddings: u16,
    embedding_dim: u16,
    embedding_size: u32,
    tokenizer_id: [u8; MODEL_ID_SIZE],
    embedding_id: [u8; MODEL_ID_SIZE],
}

/// Field bundle for [`Header::new`]; the signatures and fingerprints are
/// computed by the assembler before the header exists.
pub(crate) struct HeaderFields {
    pub tokenizer_fingerprint: u16,
    pub embedding_model_fingerprint: u16,
    pub binary_embedding: [u8; BINARY_EMBEDDING_BYTES],
    pub minhash: [u32; MINHASH_SIZE],
    pub text_hash: u16,
    pub text_size: u32,
    pub metadata_version: u16,
    pub metadata_size: u32,
    pub num_embeddings: u16,
    pub embedding_dim: u16,
    pub tokenizer_id: [u8; MODEL_ID_SIZE],
    pub embedding_id: [u8; MODEL_ID_SIZE],
}

impl Header {
    /// Assembles a header for the current format version.
    pub(crate) fn new(fields: HeaderFields) -> Result<Self> {
        let header = Self {
            magic: RAGFILE_MAGIC,
            version: RAGFILE_VERSION,
            flags: 0,
            tokenizer_fingerprint: fields.tokenizer_fingerprint,
            embedding_model_fingerprint: fields.embedding_model_fingerprint,
            binary_embedding: fields.binary_embedding,
            minhash: fields.minhash,
            text_hash: fields.text_hash,
            text_size: fields.text_size,
            metadata_version: fields.metadata_version,
            metadata_size: fields.metadata_size,
            num_embeddings: fields.num_embeddings,
            embedding_dim: fields.embedding_dim,
            embedding_size: u32::from(fields.num_embeddings) * u32::from(fields.embedding_dim),
            tokenizer_id: fields.tokenizer_id,
            embedding_id: fields.embedding_id,
        };
        header.validate()?;
        Ok(header)
    }

    /// Reads exactly the header block from `source` and parses it.
    ///
    /// This is the header-only read the scanner depends on: payload is never
    /// touched and nothing beyond the fixed block is consumed.
    ///
    /// # Errors
    ///
    /// `Io` on a short read, `InvalidFormat` on a magic or structural
    /// mismatch, `UnsupportedVersion` when the magic matches but the version
    /// is unknown.
    pub fn read_from<R: Read>(source: &mut R) -> Result<Self> {
        let mut block = [0u8; HEADER_SIZE];
        source.read_exact(&mut block)?;
        deserializer::decode(&block)
    }

    /// Serializes the header into its fixed-size block.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        serializer::encode(self)
    }

    /// Checks the invariants shared by the assembly and parse paths.
    fn validate(&self) -> Result<()> {
        if self.magic != RAGFILE_MAGIC {
            return Err(RagError::invalid_format(format!(
                "bad magic {:#010x} (expected {RAGFILE_MAGIC:#010x})",
                self.magic
            )));
        }
        if self.version != RAGFILE_VERSION {
            return Err(RagError::unsupported_version(self.version));
        }
        if self.embedding_size != u32::from(self.num_embeddings) * u32::from(self.embedding_dim) {
            return Err(RagError::invalid_format(format!(
                "embedding size {} does not equal {} x {}",
                self.embedding_size, self.num_embeddings, self.embedding_dim
            )));
        }
        if !self.tokenizer_id.contains(&0) || !self.embedding_id.contains(&0) {
            return Err(RagError::invalid_format("identifier region is missing its zero terminator"));
        }
        Ok(())
    }

    /// Format version the file was written with.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Reserved flags word as stored on disk.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> u64 {
        self.flags
    }

    /// CRC16 fingerprint of the tokenizer identifier.
    #[inline]
    #[must_use]
    pub const fn tokenizer_fingerprint(&self) -> u16 {
        self.tokenizer_fingerprint
    }

    /// CRC16 fingerprint of the embedding model identifier.
    #[inline]
    #[must_use]
    pub const fn embedding_model_fingerprint(&self) -> u16 {
        self.embedding_model_fingerprint
    }

    /// Packed sign-quantized centroid of the stored embeddings.
    #[inline]
    #[must_use]
    pub const fn binary_embedding(&self) -> &[u8; BINARY_EMBEDDING_BYTES] {
        &self.binary_embedding
    }

    /// Combined MinHash signature (bigram half, then trigram half).
    #[inline]
    #[must_use]
    pub const fn minhash(&self) -> &[u32; MINHASH_SIZE] {
        &self.minhash
    }

    /// CRC16 fingerprint of the text payload.
    #[inline]
    #[must_use]
    pub const fn text_hash(&self) -> u16 {
        self.text_hash
    }

    /// Byte length of the text payload.
    #[inline]
    #[must_use]
    pub const fn text_size(&self) -> u32 {
        self.text_size
    }

    /// Caller-defined schema tag of the extended metadata.
    #[inline]
    #[must_use]
    pub const fn metadata_version(&self) -> u16 {
        self.metadata_version
    }

    /// Byte length of the extended metadata, zero when absent.
    #[inline]
    #[must_use]
    pub const fn metadata_size(&self) -> u32 {
        self.metadata_size
    }

    /// Number of stored embedding vectors.
    #[inline]
    #[must_use]
    pub const fn num_embeddings(&self) -> u16 {
        self.num_embeddings
    }

    /// Dimensionality of each embedding vector.
    #[inline]
    #[must_use]
    pub const fn embedding_dim(&self) -> u16 {
        self.embedding_dim
    }

    /// Total float count of the embedding matrix.
    #[inline]
    #[must_use]
    pub const fn embedding_size(&self) -> u32 {
        self.embedding_size
    }

    /// Tokenizer identifier string (the zero-padded region up to its
    /// terminator).
    #[must_use]
    pub fn tokenizer_id(&self) -> &str {
        id_region_str(&self.tokenizer_id)
    }

    /// Embedding model identifier string.
    #[must_use]
    pub fn embedding_id(&self) -> &str {
        id_region_str(&self.embedding_id)
    }
}

/// Decodes a fixed identifier region up to its zero terminator.
///
/// Regions are validated on both construction paths, so the terminator is
/// present and the bytes below it are the UTF-8 the writer stored.
fn id_region_str(region: &[u8; MODEL_ID_SIZE]) -> &str {
    let end = region.iter().position(|&b| b == 0).unwrap_or(MODEL_ID_SIZE);
    std::str::from_utf8(&region[..end]).unwrap_or("")
}
