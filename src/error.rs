use thiserror::Error;

use crate::types::FormatId;

/// Configuration errors surfaced to the caller.
///
/// Data anomalies (missing trailers, implausible lengths, bad checksums)
/// are never errors; they are encoded in the verdict of the result they
/// belong to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarveError {
    #[error("format {0} is not present in the signature registry")]
    UnsupportedFormat(FormatId),

    #[error("invalid signature descriptor for {format}: {reason}")]
    InvalidDescriptor {
        format: FormatId,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, CarveError>;
