//! Structural validation of carved candidates.

use crate::formats::{self, Integrity, Structure};
use crate::signatures::SignatureDescriptor;
use crate::types::{Candidate, FormatId, Verdict, VerdictStatus};

/// Confidence penalties. Informational weights for downstream ranking;
/// the exact values are not load-bearing.
pub const TRUNCATION_PENALTY: f64 = 0.3;
pub const UNKNOWN_TAG_PENALTY: f64 = 0.1;
pub const VIOLATION_PENALTY: f64 = 0.5;
pub const UNDERSIZE_PENALTY: f64 = 0.2;

/// Reason attached to the one verdict the scanner may suppress: a carve
/// whose leading bytes no longer match the magic that produced it.
pub const REASON_MAGIC_MISMATCH: &str = "magic bytes absent at carve start";

const REASON_INCOMPLETE: &str = "container structure ends before it closes";
const REASON_BUFFER_OVERRUN: &str = "declared size runs past the buffer";

/// Validates a carved candidate and produces its verdict.
///
/// The truncation flag set by the boundary resolver is advisory: a span
/// that nonetheless passes full structural validation stays `Valid`.
#[must_use]
pub fn validate(buffer: &[u8], candidate: &Candidate, descriptor: &SignatureDescriptor) -> Verdict {
    if !descriptor.matches_at(buffer, candidate.start) {
        return Verdict::new(VerdictStatus::Malformed, 0.0, Some(REASON_MAGIC_MISMATCH));
    }

    let span = candidate.span(buffer);
    let structure = check_span(candidate.format, span);

    let mut penalty = f64::from(structure.advisory_tags) * UNKNOWN_TAG_PENALTY;
    if span.len() < descriptor.min_length {
        penalty += UNDERSIZE_PENALTY;
    }

    match structure.integrity {
        Integrity::Intact if candidate.violated => Verdict::new(
            VerdictStatus::Malformed,
            1.0 - VIOLATION_PENALTY - penalty,
            Some(REASON_BUFFER_OVERRUN),
        ),
        Integrity::Intact => Verdict::new(VerdictStatus::Valid, 1.0 - penalty, None),
        Integrity::Incomplete => {
            let (status, extra) = if candidate.violated {
                (VerdictStatus::Malformed, VIOLATION_PENALTY)
            } else {
                (VerdictStatus::Truncated, 0.0)
            };
            Verdict::new(
                status,
                1.0 - TRUNCATION_PENALTY - extra - penalty,
                Some(REASON_INCOMPLETE),
            )
        }
        Integrity::Violated(reason) => Verdict::new(
            VerdictStatus::Malformed,
            1.0 - VIOLATION_PENALTY - penalty,
            Some(reason),
        ),
    }
}

fn check_span(format: FormatId, span: &[u8]) -> Structure {
    match format {
        FormatId::Jpeg => formats::jpeg::check_structure(span),
        FormatId::Png => formats::png::check_structure(span),
        FormatId::Gif => formats::gif::check_structure(span),
        FormatId::Webp => formats::webp::check_structure(span),
        FormatId::Tiff => formats::tiff::check_structure(span),
    }
}

/// Only a hard structural contradiction at zero confidence may be dropped
/// from the result list.
pub(crate) fn is_suppressible(verdict: &Verdict) -> bool {
    verdict.status == VerdictStatus::Malformed
        && verdict.confidence == 0.0
        && verdict.reason == Some(REASON_MAGIC_MISMATCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::SignatureRegistry;

    fn jpeg_descriptor() -> SignatureDescriptor {
        *SignatureRegistry::builtin()
            .descriptors()
            .iter()
            .find(|d| d.format == FormatId::Jpeg)
            .unwrap()
    }

    fn candidate(start: usize, end: usize) -> Candidate {
        Candidate {
            format: FormatId::Jpeg,
            start,
            end,
            truncated: false,
            violated: false,
        }
    }

    #[test]
    fn magic_mismatch_is_suppressible_malformed() {
        let buffer = vec![0x00u8; 64];
        let verdict = validate(&buffer, &candidate(0, 64), &jpeg_descriptor());

        assert_eq!(verdict.status, VerdictStatus::Malformed);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.reason, Some(REASON_MAGIC_MISMATCH));
        assert!(is_suppressible(&verdict));
    }

    #[test]
    fn truncated_verdict_is_not_suppressible() {
        let mut buffer = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        buffer.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00");
        let len = buffer.len();

        let verdict = validate(&buffer, &candidate(0, len), &jpeg_descriptor());
        assert_eq!(verdict.status, VerdictStatus::Truncated);
        assert!(verdict.confidence < 1.0);
        assert!(!is_suppressible(&verdict));
    }

    #[test]
    fn advisory_tags_shave_confidence() {
        use crate::formats::jpeg::{JPEG_EOI, JPEG_SOI};

        let mut buffer = Vec::new();
        buffer.extend_from_slice(&JPEG_SOI);
        buffer.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x06, b'n', b'o', b't', b'e']);
        buffer.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x04, 0x01, 0x00]);
        buffer.extend_from_slice(&[0x12; 96]);
        buffer.extend_from_slice(&JPEG_EOI);
        let len = buffer.len();

        let verdict = validate(&buffer, &candidate(0, len), &jpeg_descriptor());
        assert_eq!(verdict.status, VerdictStatus::Valid);
        assert!((verdict.confidence - (1.0 - UNKNOWN_TAG_PENALTY)).abs() < 1e-9);
    }

    #[test]
    fn undersized_span_keeps_valid_status_with_penalty() {
        use crate::formats::jpeg::{JPEG_EOI, JPEG_SOI};

        let mut buffer = Vec::new();
        buffer.extend_from_slice(&JPEG_SOI);
        buffer.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x04, 0x01, 0x00]);
        buffer.extend_from_slice(&[0x12; 16]);
        buffer.extend_from_slice(&JPEG_EOI);
        let len = buffer.len();

        let verdict = validate(&buffer, &candidate(0, len), &jpeg_descriptor());
        assert_eq!(verdict.status, VerdictStatus::Valid);
        assert!((verdict.confidence - (1.0 - UNDERSIZE_PENALTY)).abs() < 1e-9);
    }
}
