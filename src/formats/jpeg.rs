//! JPEG marker-segment walk.
//!
//! A carved span is intact when its segment chain parses from SOI through
//! a scan to an EOI that closes the span exactly.

use memchr::memchr;

use super::Structure;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

#[inline]
#[must_use]
pub fn is_valid_marker(marker: u8) -> bool {
    matches!(
        marker,
        0xC0..=0xCF |
        0xD0..=0xD9 |
        0xDA |
        0xDB |
        0xDC..=0xDF |
        0xE0..=0xEF |
        0xFE
    )
}

/// Markers that are legal but carry no structural weight here. APP3..APP15
/// and comments count as advisory tags.
#[inline]
fn is_advisory_marker(marker: u8) -> bool {
    matches!(marker, 0xE3..=0xEF | 0xFE)
}

#[must_use]
pub fn check_structure(span: &[u8]) -> Structure {
    if span.len() < 4 || span[0..2] != JPEG_SOI {
        return Structure::violated("missing SOI marker", 0);
    }

    let mut pos = 2;
    let mut advisory = 0u32;
    let mut saw_sos = false;

    while pos + 1 < span.len() {
        if span[pos] != 0xFF {
            return Structure::violated("marker expected between segments", advisory);
        }

        let marker = span[pos + 1];

        // Fill bytes before a marker are permitted.
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        if marker == 0x00 || !is_valid_marker(marker) {
            return Structure::violated("invalid marker", advisory);
        }

        if marker == 0xD8 {
            return Structure::violated("nested SOI marker", advisory);
        }

        if matches!(marker, 0xD0..=0xD7) {
            return Structure::violated("restart marker outside scan data", advisory);
        }

        if marker == 0xD9 {
            if !saw_sos {
                return Structure::violated("EOI before any scan data", advisory);
            }
            if pos + 2 != span.len() {
                return Structure::violated("data past EOI marker", advisory);
            }
            return Structure::intact(advisory);
        }

        if is_advisory_marker(marker) {
            advisory += 1;
        }

        if pos + 3 >= span.len() {
            return Structure::incomplete(advisory);
        }

        let seg_len = u16::from_be_bytes([span[pos + 2], span[pos + 3]]) as usize;
        if seg_len < 2 {
            return Structure::violated("segment length underflow", advisory);
        }

        let seg_end = pos + 2 + seg_len;
        if seg_end > span.len() {
            return Structure::incomplete(advisory);
        }

        if marker == 0xDA {
            saw_sos = true;
            match skip_entropy_coded(span, seg_end) {
                Some(marker_pos) => pos = marker_pos,
                None => return Structure::incomplete(advisory),
            }
        } else {
            pos = seg_end;
        }
    }

    Structure::incomplete(advisory)
}

/// Advances past entropy-coded scan data, honoring byte stuffing (`FF 00`)
/// and restart markers, and returns the position of the first real marker.
fn skip_entropy_coded(span: &[u8], scan_start: usize) -> Option<usize> {
    let mut pos = scan_start;
    while pos < span.len() {
        let ff = memchr(0xFF, &span[pos..])?;
        let marker_pos = pos + ff;
        let Some(&next) = span.get(marker_pos + 1) else {
            return None;
        };
        match next {
            0x00 | 0xD0..=0xD7 => pos = marker_pos + 2,
            0xFF => pos = marker_pos + 1,
            _ => return Some(marker_pos),
        }
    }
    None
}
