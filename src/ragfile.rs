//! Ragfile assembly, persistence, and loading.
//!
//! A [`Ragfile`] is produced once from in-memory inputs and treated as
//! read-only afterwards. The value exclusively owns its text, extended
//! metadata, and embedding matrix; dropping it releases everything, and any
//! error on the create or load path drops whatever was partially built, so
//! both operations are atomic.

use std::io::{Read, Write};

use tracing::trace;

use crate::config::{MODEL_ID_SIZE, TRIGRAM_SHINGLE};
use crate::error::{RagError, Result};
use crate::hash::crc16;
use crate::header::{Header, HeaderFields};
use crate::minhash::combined_signature;
use crate::quantize::binary_embedding;
use crate::similarity::{self, CosineMode};

/// Inputs for [`Ragfile::create`].
///
/// The embedding matrix is flat and row-major (vector-major); tokens are the
/// pre-computed integer token sequence of the text. None of the borrowed
/// buffers are retained.
pub struct RagfileInput<'a> {
    pub text: &'a str,
    pub tokens: &'a [u32],
    pub embeddings: &'a [f32],
    pub num_embeddings: u16,
    pub embedding_dim: u16,
    pub extended_metadata: Option<&'a str>,
    pub tokenizer_id: &'a str,
    pub embedding_id: &'a str,
    pub metadata_version: u16,
}

/// An in-memory ragfile: header plus owned payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Ragfile {
    header: Header,
    text: String,
    extended_metadata: Option<String>,
    embeddings: Vec<f32>,
}

impl Ragfile {
    /// Creates a ragfile from raw inputs: computes both header signatures
    /// and the identifier fingerprints, then copies text, metadata, and the
    /// embedding matrix into owned storage.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the token sequence is shorter than the larger
    /// shingle size, the embedding matrix does not match its declared shape,
    /// or the text length overflows the 32-bit size field.
    pub fn create(input: &RagfileInput<'_>) -> Result<Self> {
        if input.tokens.len() < TRIGRAM_SHINGLE {
            return Err(RagError::invalid_argument(format!(
                "token count {} is below the trigram shingle size",
                input.tokens.len()
            )));
        }

        let text_size = u32::try_from(input.text.len())
            .map_err(|_| RagError::invalid_argument("text exceeds the 32-bit size field"))?;
        let metadata = input.extended_metadata.filter(|m| !m.is_empty());
        let metadata_size = u32::try_from(metadata.map_or(0, str::len))
            .map_err(|_| RagError::invalid_argument("extended metadata exceeds the 32-bit size field"))?;

        let packed = binary_embedding(
            input.embeddings,
            usize::from(input.num_embeddings),
            usize::from(input.embedding_dim),
        )?;
        let minhash = combined_signature(input.tokens)?;

        let header = Header::new(HeaderFields {
            tokenizer_fingerprint: crc16(input.tokenizer_id.as_bytes()),
            embedding_model_fingerprint: crc16(input.embedding_id.as_bytes()),
            binary_embedding: packed,
            minhash,
            text_hash: crc16(input.text.as_bytes()),
            text_size,
            metadata_version: input.metadata_version,
            metadata_size,
            num_embeddings: input.num_embeddings,
            embedding_dim: input.embedding_dim,
            tokenizer_id: id_region(input.tokenizer_id),
            embedding_id: id_region(input.embedding_id),
        })?;

        Ok(Self {
            header,
            text: input.text.to_owned(),
            extended_metadata: metadata.map(str::to_owned),
            embeddings: input.embeddings.to_vec(),
        })
    }

    /// Serializes the full file to `sink`: header block, text bytes,
    /// little-endian floats, then extended metadata.
    ///
    /// # Errors
    ///
    /// `Io` on any write failure; a short write surfaces immediately.
    pub fn save<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(&self.header.to_bytes())?;
        sink.write_all(self.text.as_bytes())?;

        let mut floats = Vec::with_capacity(self.embeddings.len() * 4);
        for value in &self.embeddings {
            floats.extend_from_slice(&value.to_le_bytes());
        }
        sink.write_all(&floats)?;

        if let Some(metadata) = &self.extended_metadata {
            sink.write_all(metadata.as_bytes())?;
        }
        sink.flush()?;

        trace!(text_size = self.header.text_size(), embedding_size = self.header.embedding_size(), "ragfile saved");
        Ok(())
    }

    /// Loads a full ragfile from `source`. All-or-nothing: no partially
    /// loaded value is ever returned.
    ///
    /// # Errors
    ///
    /// Header reject rules per [`Header::read_from`]; `Io` on any short
    /// read; `InvalidFormat` when the text or metadata region is not valid
    /// UTF-8.
    pub fn load<R: Read>(source: &mut R) -> Result<Self> {
        let header = Header::read_from(source)?;

        let mut text_bytes = vec![0u8; header.text_size() as usize];
        source.read_exact(&mut text_bytes)?;
        let text = String::from_utf8(text_bytes)
            .map_err(|_| RagError::invalid_format("text region is not valid UTF-8"))?;

        let mut float_bytes = vec![0u8; header.embedding_size() as usize * 4];
        source.read_exact(&mut float_bytes)?;
        let embeddings: Vec<f32> = float_bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let extended_metadata = if header.metadata_size() > 0 {
            let mut metadata_bytes = vec![0u8; header.metadata_size() as usize];
            source.read_exact(&mut metadata_bytes)?;
            let metadata = String::from_utf8(metadata_bytes)
                .map_err(|_| RagError::invalid_format("metadata region is not valid UTF-8"))?;
            Some(metadata)
        } else {
            None
        };

        trace!(text_size = header.text_size(), embedding_size = header.embedding_size(), "ragfile loaded");
        Ok(Self { header, text, extended_metadata, embeddings })
    }

    /// The fixed-size header.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The text chunk.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Extended metadata, when present.
    #[inline]
    #[must_use]
    pub fn extended_metadata(&self) -> Option<&str> {
        self.extended_metadata.as_deref()
    }

    /// The flat row-major embedding matrix.
    #[inline]
    #[must_use]
    pub fn embeddings(&self) -> &[f32] {
        &self.embeddings
    }

    /// Jaccard similarity of the two MinHash signatures.
    ///
    /// # Errors
    ///
    /// `Incompatible` when the widths differ (files of different format
    /// versions).
    pub fn jaccard(&self, other: &Self) -> Result<f32> {
        similarity::jaccard(self.header.minhash(), other.header.minhash())
    }

    /// Hamming similarity of the two binary embeddings.
    ///
    /// # Errors
    ///
    /// `Incompatible` when the byte lengths differ.
    pub fn hamming(&self, other: &Self) -> Result<f32> {
        similarity::hamming(self.header.binary_embedding(), other.header.binary_embedding())
    }

    /// Aggregated cosine over the full embedding matrices.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the dimensionalities differ.
    pub fn cosine(&self, other: &Self, mode: CosineMode) -> Result<f32> {
        if self.header.embedding_dim() != other.header.embedding_dim() {
            return Err(RagError::invalid_argument(format!(
                "embedding dimensionalities differ: {} vs {}",
                self.header.embedding_dim(),
                other.header.embedding_dim()
            )));
        }
        similarity::cosine_aggregate(
            &self.embeddings,
            &other.embeddings,
            usize::from(self.header.embedding_dim()),
            mode,
        )
    }
}

/// Builds a fixed identifier region: zeroed, then at most
/// `MODEL_ID_SIZE - 1` bytes of the identifier, leaving the terminator.
///
/// Over-long identifiers are truncated at a character boundary so the region
/// always decodes as the UTF-8 prefix the writer stored.
fn id_region(id: &str) -> [u8; MODEL_ID_SIZE] {
    let mut end = id.len().min(MODEL_ID_SIZE - 1);
    while !id.is_char_boundary(end) {
        end -= 1;
    }

    let mut region = [0u8; MODEL_ID_SIZE];
    region[..end].copy_from_slice(&id.as_bytes()[..end]);
    region
}
