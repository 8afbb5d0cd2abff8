//! Error types for commitment and proof operations

use thiserror::Error;

use crate::Fr;

/// Result alias used across the crate.
pub type Result<T, E = MerkleError> = std::result::Result<T, E>;

/// Errors raised by the commitment engine.
///
/// None of these are retried internally. [`MerkleError::VerificationFailed`]
/// in particular must reach the caller: it is the rejection of a proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// A count, depth or layout parameter is outside the supported range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A record does not match its layout: wrong field width or field count.
    #[error("encoding error in {field}: expected {expected}, got {actual}")]
    Encoding {
        /// Name of the offending field, or `"field count"`.
        field: String,
        /// Declared width or count.
        expected: usize,
        /// Supplied width or count.
        actual: usize,
    },

    /// A value that should be a field element is not below the modulus.
    #[error("non-canonical field element 0x{}", hex::encode(.0))]
    NonCanonical([u8; 32]),

    /// A leaf index lies outside the committed range.
    #[error("index {index} out of range for {count} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of addressable leaves.
        count: u64,
    },

    /// A proof does not reconstruct the committed root.
    #[error("verification failed: expected root {expected}, computed {computed}")]
    VerificationFailed {
        /// Committed root.
        expected: Fr,
        /// Root recomputed from the proof.
        computed: Fr,
    },
}

impl MerkleError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn width(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Encoding { field: field.into(), expected, actual }
    }
}
