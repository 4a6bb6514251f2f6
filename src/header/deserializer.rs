//! Header deserialization.
//!
//! Parses the fixed block field-by-field in declared order and applies the
//! reject rules: magic first, then version, then structural consistency.
//! The flags word is carried through untouched so files from future writers
//! that only set flags still load.

use crate::config::{BINARY_EMBEDDING_BYTES, HEADER_SIZE, MINHASH_SIZE, MODEL_ID_SIZE, RAGFILE_MAGIC, RAGFILE_VERSION};
use crate::error::{RagError, Result};
use crate::header::Header;

/// Cursor over the fixed header block.
struct FieldReader<'a> {
    block: &'a [u8; HEADER_SIZE],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    const fn new(block: &'a [u8; HEADER_SIZE]) -> Self {
        Self { block, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.block[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn get_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn get_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn get_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }
}

/// Parses and validates one header block.
pub(crate) fn decode(block: &[u8; HEADER_SIZE]) -> Result<Header> {
    let mut r = FieldReader::new(block);

    let magic = r.get_u32();
    if magic != RAGFILE_MAGIC {
        return Err(RagError::invalid_format(format!(
            "bad magic {magic:#010x} (expected {RAGFILE_MAGIC:#010x})"
        )));
    }

    let version = r.get_u16();
    if version != RAGFILE_VERSION {
        return Err(RagError::unsupported_version(version));
    }

    let flags = r.get_u64();
    let tokenizer_fingerprint = r.get_u16();
    let embedding_model_fingerprint = r.get_u16();
    let binary_embedding: [u8; BINARY_EMBEDDING_BYTES] = r.take();

    let mut minhash = [0u32; MINHASH_SIZE];
    for lane in &mut minhash {
        *lane = r.get_u32();
    }

    let text_hash = r.get_u16();
    let text_size = r.get_u32();
    let metadata_version = r.get_u16();
    let metadata_size = r.get_u32();
    let num_embeddings = r.get_u16();
    let embedding_dim = r.get_u16();
    let embedding_size = r.get_u32();

    if embedding_size != u32::from(num_embeddings) * u32::from(embedding_dim) {
        return Err(RagError::invalid_format(format!(
            "embedding size {embedding_size} does not equal {num_embeddings} x {embedding_dim}"
        )));
    }

    let tokenizer_id: [u8; MODEL_ID_SIZE] = r.take();
    let embedding_id: [u8; MODEL_ID_SIZE] = r.take();
    if !tokenizer_id.contains(&0) || !embedding_id.contains(&0) {
        return Err(RagError::invalid_format("identifier region is missing its zero terminator"));
    }
    if std::str::from_utf8(id_region(&tokenizer_id)).is_err() || std::str::from_utf8(id_region(&embedding_id)).is_err() {
        return Err(RagError::invalid_format("identifier region is not valid UTF-8"));
    }

    Ok(Header {
        magic,
        version,
        flags,
        tokenizer_fingerprint,
        embedding_model_fingerprint,
        binary_embedding,
        minhash,
        text_hash,
        text_size,
        metadata_version,
        metadata_size,
        num_embeddings,
        embedding_dim,
        embedding_size,
        tokenizer_id,
        embedding_id,
    })
}

fn id_region(region: &[u8; MODEL_ID_SIZE]) -> &[u8] {
    let end = region.iter().position(|&b| b == 0).unwrap_or(MODEL_ID_SIZE);
    &region[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::sample_header;

    #[test]
    fn test_bad_magic_rejected() {
        let mut block = sample_header().to_bytes();
        block[0] ^= 0xFF;
        assert!(matches!(decode(&block), Err(RagError::InvalidFormat(_))));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut block = sample_header().to_bytes();
        block[4..6].copy_from_slice(&99u16.to_le_bytes());
        assert!(matches!(
            decode(&block),
            Err(RagError::UnsupportedVersion { found: 99, expected: RAGFILE_VERSION })
        ));
    }

    #[test]
    fn test_nonzero_flags_accepted() {
        let mut block = sample_header().to_bytes();
        block[6..14].copy_from_slice(&u64::MAX.to_le_bytes());
        let header = decode(&block).unwrap();
        assert_eq!(header.flags(), u64::MAX);
    }

    #[test]
    fn test_inconsistent_embedding_size_rejected() {
        let mut block = sample_header().to_bytes();
        // embedding_size sits right before the two id regions.
        let offset = HEADER_SIZE - 2 * MODEL_ID_SIZE - 4;
        block[offset..offset + 4].copy_from_slice(&1234u32.to_le_bytes());
        assert!(matches!(decode(&block), Err(RagError::InvalidFormat(_))));
    }

    #[test]
    fn test_unterminated_id_region_rejected() {
        let mut block = sample_header().to_bytes();
        let offset = HEADER_SIZE - 2 * MODEL_ID_SIZE;
        block[offset..offset + MODEL_ID_SIZE].fill(b'x');
        assert!(matches!(decode(&block), Err(RagError::InvalidFormat(_))));
    }
}
