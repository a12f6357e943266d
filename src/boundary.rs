//! Per-format end-offset resolution.
//!
//! All data-driven anomalies (missing trailer, implausible length, chunk
//! overrun) are encoded as outcome flags so the caller always gets a
//! best-effort span to validate; `Err` is reserved for descriptors that
//! violate their own configuration invariants.

use memchr::memmem::Finder;

use crate::error::{CarveError, Result};
use crate::formats::{png, tiff};
use crate::signatures::{BoundaryRule, Endianness, SignatureDescriptor};

/// Best-effort end offset for a candidate, plus the anomaly flags the
/// validator folds into its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOutcome {
    pub end: usize,
    /// The span had to be clamped to the buffer end.
    pub truncated: bool,
    /// A declared size or structure contradicted the buffer bounds.
    pub violated: bool,
}

/// Computes the candidate end offset for a signature match at `start`.
pub fn resolve_end(
    buffer: &[u8],
    start: usize,
    descriptor: &SignatureDescriptor,
) -> Result<BoundaryOutcome> {
    let n = buffer.len();
    debug_assert!(start < n, "candidate start outside buffer");

    match descriptor.boundary {
        BoundaryRule::Trailer(trailer) => {
            if trailer.is_empty() {
                return Err(CarveError::InvalidDescriptor {
                    format: descriptor.format,
                    reason: "trailer rule without trailer bytes",
                });
            }

            // Search from the earliest position where a minimally-sized
            // file could place its trailer.
            let from = (start + descriptor.min_length.saturating_sub(trailer.len()))
                .max(start + descriptor.magic.len());
            let found = buffer
                .get(from..)
                .and_then(|haystack| Finder::new(trailer).find(haystack));

            Ok(match found {
                Some(pos) => BoundaryOutcome {
                    end: from + pos + trailer.len(),
                    truncated: false,
                    violated: false,
                },
                None => BoundaryOutcome {
                    end: n,
                    truncated: true,
                    violated: false,
                },
            })
        }

        BoundaryRule::LengthField {
            offset,
            size,
            endian,
            overhead,
        } => {
            if !matches!(size, 1 | 2 | 4 | 8) {
                return Err(CarveError::InvalidDescriptor {
                    format: descriptor.format,
                    reason: "unsupported length field width",
                });
            }
            if offset + size > descriptor.min_length {
                return Err(CarveError::InvalidDescriptor {
                    format: descriptor.format,
                    reason: "length field outside minimal header",
                });
            }

            let field_start = start + offset;
            if field_start + size > n {
                return Ok(BoundaryOutcome {
                    end: n,
                    truncated: true,
                    violated: false,
                });
            }

            let declared = read_uint(&buffer[field_start..field_start + size], endian) as usize;
            let declared_end = start.saturating_add(overhead).saturating_add(declared);

            Ok(if declared_end > n {
                BoundaryOutcome {
                    end: n,
                    truncated: true,
                    violated: false,
                }
            } else {
                BoundaryOutcome {
                    end: declared_end.max(start + descriptor.magic.len()),
                    truncated: false,
                    violated: false,
                }
            })
        }

        BoundaryRule::Chunked => Ok(png::resolve_end(buffer, start)),
        BoundaryRule::IfdChain => Ok(tiff::resolve_end(buffer, start)),
    }
}

fn read_uint(bytes: &[u8], endian: Endianness) -> u64 {
    match endian {
        Endianness::Little => bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        Endianness::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
    }
}
