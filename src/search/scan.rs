//! Top-k scan over a candidate path stream.
//!
//! The engine opens each candidate, reads exactly the header block, scores
//! it against the query's corresponding signature, and offers the result to
//! a bounded min-heap. Candidate-side failures (unopenable, malformed,
//! foreign version, incompatible widths) are skips, never fatal; only
//! query-side errors propagate. Each file is opened, read, and closed within
//! its own iteration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use strum::{Display, EnumString};
use tracing::debug;

use crate::error::{RagError, Result};
use crate::header::Header;
use crate::ragfile::Ragfile;
use crate::search::heap::{BoundedMinHeap, ScoredPath};
use crate::similarity;

/// Header signature a scan scores with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ScanMethod {
    /// MinHash lane agreement.
    Jaccard,
    /// Binary embedding bit agreement.
    Hamming,
}

/// Scans `paths` and returns at most `top_k` candidates in descending score
/// order.
///
/// Results are deterministic for a given query, stream order, and file
/// contents: scoring is pure and the heap's tie-break is strict.
///
/// # Errors
///
/// `InvalidArgument` when `top_k` is zero. Per-candidate failures are
/// skipped, not surfaced.
pub fn match_files<I, P>(query: &Ragfile, paths: I, top_k: usize, method: ScanMethod) -> Result<Vec<ScoredPath>>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    if top_k == 0 {
        return Err(RagError::invalid_argument("top_k must be greater than zero"));
    }

    let mut heap = BoundedMinHeap::new(top_k);

    for path in paths {
        let path: PathBuf = path.into();
        match score_candidate(query, &path, method) {
            Ok(score) => heap.push(ScoredPath { path, score }),
            Err(err) if err.is_candidate_failure() => {
                debug!(path = %path.display(), %err, "skipping candidate");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(heap.into_sorted_desc())
}

/// Header-only read and score of one candidate.
fn score_candidate(query: &Ragfile, path: &Path, method: ScanMethod) -> Result<f32> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let header = Header::read_from(&mut reader)?;

    match method {
        ScanMethod::Jaccard => similarity::jaccard(query.header().minhash(), header.minhash()),
        ScanMethod::Hamming => similarity::hamming(query.header().binary_embedding(), header.binary_embedding()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;

    use tempfile::TempDir;

    use crate::ragfile::RagfileInput;

    fn make_ragfile(tokens: &[u32]) -> Ragfile {
        Ragfile::create(&RagfileInput {
            text: "scan fixture",
            tokens,
            embeddings: &[0.5, -0.5, 0.25, -0.25],
            num_embeddings: 1,
            embedding_dim: 4,
            extended_metadata: None,
            tokenizer_id: "scan_tokenizer",
            embedding_id: "scan_embedding",
            metadata_version: 1,
        })
        .unwrap()
    }

    fn write_ragfile(dir: &Path, name: &str, rf: &Ragfile) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        rf.save(&mut file).unwrap();
        path
    }

    /// Brute-force reference: score every readable candidate, sort
    /// descending, truncate.
    fn expected_top_k(query: &Ragfile, paths: &[PathBuf], k: usize) -> Vec<(PathBuf, f32)> {
        let mut scored: Vec<(PathBuf, f32)> = paths
            .iter()
            .filter_map(|p| {
                let mut reader = BufReader::new(File::open(p).ok()?);
                let header = Header::read_from(&mut reader).ok()?;
                let score = similarity::jaccard(query.header().minhash(), header.minhash()).ok()?;
                Some((p.clone(), score))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored.truncate(k);
        scored
    }

    #[test]
    fn test_top_k_matches_brute_force() {
        let dir = TempDir::new().unwrap();
        let query = make_ragfile(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let candidates: Vec<&[u32]> = vec![
            &[1, 2, 3, 4, 5, 6, 7, 8],
            &[1, 2, 3, 4, 9, 10, 11, 12],
            &[20, 21, 22, 23, 24, 25],
            &[1, 2, 3, 4, 5, 6],
            &[30, 31, 32],
        ];
        let paths: Vec<PathBuf> = candidates
            .iter()
            .enumerate()
            .map(|(i, tokens)| write_ragfile(dir.path(), &format!("candidate{i}.rag"), &make_ragfile(tokens)))
            .collect();

        let results = match_files(&query, paths.clone(), 3, ScanMethod::Jaccard).unwrap();
        let expected = expected_top_k(&query, &paths, 3);

        assert_eq!(results.len(), 3);
        for (got, (path, score)) in results.iter().zip(&expected) {
            assert_eq!(&got.path, path);
            assert!((got.score - score).abs() < f32::EPSILON);
        }

        // Scores are descending and the identical candidate tops the list.
        assert!((results[0].score - 1.0).abs() < f32::EPSILON);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_hamming_scan_self_match() {
        let dir = TempDir::new().unwrap();
        let query = make_ragfile(&[1, 2, 3, 4, 5]);
        let path = write_ragfile(dir.path(), "self.rag", &query);

        let results = match_files(&query, vec![path], 1, ScanMethod::Hamming).unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_malformed_and_missing_candidates_are_skipped() {
        let dir = TempDir::new().unwrap();
        let query = make_ragfile(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let good = write_ragfile(dir.path(), "good.rag", &make_ragfile(&[1, 2, 3, 4, 5, 6, 7, 8]));
        let junk = dir.path().join("junk.rag");
        File::create(&junk).unwrap().write_all(b"not a ragfile").unwrap();
        let missing = dir.path().join("missing.rag");

        let results = match_files(&query, vec![junk, missing, good.clone()], 5, ScanMethod::Jaccard).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, good);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let query = make_ragfile(&[1, 2, 3, 4]);
        let result = match_files(&query, Vec::<PathBuf>::new(), 0, ScanMethod::Jaccard);
        assert!(matches!(result, Err(RagError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_stream_returns_empty() {
        let query = make_ragfile(&[1, 2, 3, 4]);
        let results = match_files(&query, Vec::<PathBuf>::new(), 3, ScanMethod::Jaccard).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(ScanMethod::from_str("jaccard").unwrap(), ScanMethod::Jaccard);
        assert_eq!(ScanMethod::from_str("hamming").unwrap(), ScanMethod::Hamming);
        assert!(ScanMethod::from_str("cosine").is_err());
        assert_eq!(ScanMethod::Hamming.to_string(), "hamming");
    }
}
