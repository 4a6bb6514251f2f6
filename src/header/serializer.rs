//! Header serialization.
//!
//! Emits every field in declared order as little-endian bytes. The block is
//! assembled in memory so a writer performs exactly one header write and the
//! emitted length is [`HEADER_SIZE`] for every file of this version.

use crate::config::HEADER_SIZE;
use crate::header::Header;

/// Cursor over the fixed header block.
struct FieldWriter {
    block: [u8; HEADER_SIZE],
    pos: usize,
}

impl FieldWriter {
    const fn new() -> Self {
        Self { block: [0u8; HEADER_SIZE], pos: 0 }
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.block[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u16(&mut self, value: u16) {
        self.put_bytes(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    fn put_u64(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    fn finish(self) -> [u8; HEADER_SIZE] {
        debug_assert_eq!(self.pos, HEADER_SIZE);
        self.block
    }
}

/// Encodes `header` into its on-disk block.
pub(crate) fn encode(header: &Header) -> [u8; HEADER_SIZE] {
    let mut w = FieldWriter::new();

    w.put_u32(header.magic);
    w.put_u16(header.version);
    w.put_u64(header.flags);
    w.put_u16(header.tokenizer_fingerprint);
    w.put_u16(header.embedding_model_fingerprint);
    w.put_bytes(&header.binary_embedding);
    for lane in &header.minhash {
        w.put_u32(*lane);
    }
    w.put_u16(header.text_hash);
    w.put_u32(header.text_size);
    w.put_u16(header.metadata_version);
    w.put_u32(header.metadata_size);
    w.put_u16(header.num_embeddings);
    w.put_u16(header.embedding_dim);
    w.put_u32(header.embedding_size);
    w.put_bytes(&header.tokenizer_id);
    w.put_bytes(&header.embedding_id);

    w.finish()
}
