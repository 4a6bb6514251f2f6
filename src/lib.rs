//! ragfile - compact binary containers for retrieval-augmented generation.
//!
//! Each file bundles a text chunk, its dense embedding matrix, extended
//! metadata, and two pre-computed compact signatures in a fixed-size header:
//! - a MinHash signature over token n-gram shingles (Jaccard)
//! - a sign-quantized binary embedding (Hamming)
//!
//! Because both signatures live in the header, large collections are
//! searchable by reading [`HEADER_SIZE`](config::HEADER_SIZE) bytes per
//! candidate: the scan engine streams paths, scores header against header,
//! and keeps the top-k in a bounded min-heap. Full cosine similarity over
//! the float matrices is available once files are loaded.

pub mod config;
pub mod error;
pub mod hash;
pub mod header;
pub mod minhash;
pub mod quantize;
pub mod ragfile;
pub mod search;
pub mod similarity;

pub use error::{RagError, Result};
pub use header::Header;
pub use minhash::MinHash;
pub use ragfile::{Ragfile, RagfileInput};
pub use search::{BoundedMinHeap, ScanMethod, ScoredPath, find_ragfiles, match_files};
pub use similarity::{CosineMode, cosine, cosine_aggregate, hamming, jaccard};
