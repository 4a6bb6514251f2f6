//! Error taxonomy.
//!
//! One sum type covers every failure the crate can surface. The scan engine
//! relies on the variants being matchable: candidate-side [`RagError::Io`],
//! [`RagError::InvalidFormat`], [`RagError::UnsupportedVersion`], and
//! [`RagError::Incompatible`] are converted to skips, everything else
//! propagates.

use thiserror::Error;

use crate::config::RAGFILE_VERSION;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    /// An input violated a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// On-disk structure is not a ragfile or is internally inconsistent.
    #[error("invalid ragfile format: {0}")]
    InvalidFormat(String),

    /// Magic matched but the version is unknown to this reader.
    #[error("unsupported ragfile version {found} (this build reads version {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    /// Underlying stream failure, including short reads and writes.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Similarity precondition failure (signature widths differ).
    #[error("incompatible signatures: {0}")]
    Incompatible(String),
}

impl RagError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub(crate) fn unsupported_version(found: u16) -> Self {
        Self::UnsupportedVersion { found, expected: RAGFILE_VERSION }
    }

    /// True for failures the scanner treats as "skip this candidate".
    #[must_use]
    pub fn is_candidate_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::InvalidFormat(_) | Self::UnsupportedVersion { .. } | Self::Incompatible(_)
        )
    }
}
