//! Signature-based carving of embedded image files from raw binary blobs.
//!
//! Give [`scan`] a byte buffer (a disk image, a memory dump, a corrupted
//! archive) and it returns every embedded JPEG, PNG, GIF, WebP or TIFF it
//! can carve out as an independently valid file, each with a structural
//! verdict and a confidence score. The buffer is never mutated; truncated
//! or damaged candidates are reported with downgraded verdicts, never
//! repaired.

pub mod boundary;
pub mod entropy;
mod error;
pub mod formats;
pub mod scanner;
pub mod signatures;
pub mod types;
pub mod validator;

pub use error::{CarveError, Result};
pub use scanner::Scanner;
pub use signatures::{BoundaryRule, Endianness, SignatureDescriptor, SignatureRegistry};
pub use types::{
    scan_summary, Candidate, ExtractionResult, FormatId, ScanOptions, Verdict, VerdictStatus,
};

/// Scans `buffer` with default options.
pub fn scan(buffer: &[u8]) -> Result<Vec<ExtractionResult>> {
    Scanner::new(ScanOptions::default()).scan(buffer)
}

/// Scans `buffer` with explicit options.
pub fn scan_with_options(buffer: &[u8], options: &ScanOptions) -> Result<Vec<ExtractionResult>> {
    Scanner::new(options.clone()).scan(buffer)
}

/// Scans `buffer` in parallel, partitioning the start-offset search space
/// into `partition_size` ranges across the rayon thread pool. Produces the
/// same result set as [`scan_with_options`].
pub fn scan_partitioned(
    buffer: &[u8],
    options: &ScanOptions,
    partition_size: usize,
) -> Result<Vec<ExtractionResult>> {
    Scanner::new(options.clone()).scan_partitioned(buffer, partition_size)
}
