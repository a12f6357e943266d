//! WebP RIFF container walk. The end offset itself comes from the RIFF
//! length field; this module checks the chunk layout inside the span.

use super::Structure;

pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WEBP_FOURCC: &[u8; 4] = b"WEBP";

/// RIFF header: magic + file size field.
pub const RIFF_HEADER_LEN: usize = 8;

const KNOWN_CHUNKS: [&[u8; 4]; 9] = [
    b"VP8 ", b"VP8L", b"VP8X", b"ALPH", b"ANIM", b"ANMF", b"ICCP", b"EXIF", b"XMP ",
];

fn fourcc_plausible(fourcc: &[u8]) -> bool {
    fourcc
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b' ')
}

#[must_use]
pub fn check_structure(span: &[u8]) -> Structure {
    if span.len() < RIFF_HEADER_LEN + 4 {
        return Structure::incomplete(0);
    }

    let riff_size =
        u32::from_le_bytes([span[4], span[5], span[6], span[7]]) as usize;
    let declared_end = RIFF_HEADER_LEN + riff_size;
    if declared_end > span.len() {
        return Structure::incomplete(0);
    }

    let mut pos = RIFF_HEADER_LEN + 4;
    let mut advisory = 0u32;
    let mut saw_chunk = false;

    while pos < declared_end {
        if pos + 8 > declared_end {
            return Structure::violated("chunk header past RIFF size", advisory);
        }

        let fourcc = &span[pos..pos + 4];
        if !fourcc_plausible(fourcc) {
            return Structure::violated("corrupt chunk tag", advisory);
        }

        let size = u32::from_le_bytes([span[pos + 4], span[pos + 5], span[pos + 6], span[pos + 7]])
            as usize;
        let data_end = pos + 8 + size;
        if data_end > declared_end {
            return Structure::violated("chunk overruns container", advisory);
        }

        if !KNOWN_CHUNKS.iter().any(|known| *known == fourcc) {
            advisory += 1;
        }
        saw_chunk = true;

        // Chunk payloads are padded to even length; the final pad byte may
        // fall on the container boundary.
        pos = (data_end + (size & 1)).min(declared_end);
    }

    if !saw_chunk {
        return Structure::violated("empty RIFF container", advisory);
    }
    Structure::intact(advisory)
}
