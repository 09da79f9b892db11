//! Error types for frame reconciliation.
//!
//! Every variant is non-recoverable within the core: no retries, no silent
//! defaults. Guessing a frame correspondence would corrupt scientific data
//! alignment, so the core fails closed and leaves recovery to the caller.
//! A failed rebuild never disturbs the previously published index.

use thiserror::Error;

use crate::models::StreamKind;

/// Errors produced by the alignment core.
#[derive(Error, Debug)]
pub enum AlignmentError {
    /// A stream's count is strictly between 1 and the master count, or
    /// strictly above it, and no explicit frame lookup was supplied. The
    /// caller must provide a mapping or accept a master-only view.
    #[error(
        "ambiguous frame mapping: {other_count} frames against {master_count} master frames \
         requires an explicit frame lookup"
    )]
    AmbiguousMapping {
        master_count: usize,
        other_count: usize,
    },

    /// A supplied frame lookup failed validation.
    #[error("invalid frame override: {reason}")]
    InvalidOverride { reason: String },

    /// A virtual frame index outside `[0, frame_count)`.
    #[error("virtual frame {frame} out of range (frame count {frame_count})")]
    OutOfRange { frame: usize, frame_count: usize },

    /// Queried a stream never registered in the index.
    #[error("stream '{kind}' is not registered in the virtual frame index")]
    UnknownStream { kind: StreamKind },

    /// Derived data bound against a stream it does not derive from.
    #[error("derived data sourced from '{expected}' cannot be bound to '{actual}'")]
    SourceMismatch {
        expected: StreamKind,
        actual: StreamKind,
    },
}

impl AlignmentError {
    /// Create an ambiguous mapping error.
    pub fn ambiguous(master_count: usize, other_count: usize) -> Self {
        Self::AmbiguousMapping {
            master_count,
            other_count,
        }
    }

    /// Create an invalid override error.
    pub fn invalid_override(reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            reason: reason.into(),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(frame: usize, frame_count: usize) -> Self {
        Self::OutOfRange { frame, frame_count }
    }

    /// Create an unknown stream error.
    pub fn unknown_stream(kind: StreamKind) -> Self {
        Self::UnknownStream { kind }
    }

    /// Create a source mismatch error.
    pub fn source_mismatch(expected: StreamKind, actual: StreamKind) -> Self {
        Self::SourceMismatch { expected, actual }
    }
}

/// Result type for alignment operations.
pub type AlignmentResult<T> = Result<T, AlignmentError>;
