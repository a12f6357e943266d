//! PNG chunk walk and CRC validation.

use crate::boundary::BoundaryOutcome;

use super::Structure;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const IHDR: [u8; 4] = *b"IHDR";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";
pub const PLTE: [u8; 4] = *b"PLTE";

/// Chunk length + type + CRC bytes around the chunk payload.
const CHUNK_OVERHEAD: usize = 12;
const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

const KNOWN_CHUNKS: [[u8; 4]; 20] = [
    IHDR, IDAT, IEND, PLTE, *b"tRNS", *b"gAMA", *b"cHRM", *b"sRGB", *b"iCCP", *b"tEXt",
    *b"zTXt", *b"iTXt", *b"bKGD", *b"pHYs", *b"sBIT", *b"sPLT", *b"hIST", *b"tIME", *b"acTL",
    *b"fcTL",
];

/// CRC32 over chunk type + payload, as stored in the chunk trailer.
#[must_use]
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

fn chunk_type_plausible(chunk_type: &[u8]) -> bool {
    chunk_type.iter().all(u8::is_ascii_alphabetic)
}

/// Walks chunks from the signature until IEND to fix the candidate's end
/// offset. A chunk whose declared size runs past the buffer stops the walk
/// and marks the candidate; garbage where a chunk tag should be stops it at
/// the corruption point.
pub(crate) fn resolve_end(buffer: &[u8], start: usize) -> BoundaryOutcome {
    let n = buffer.len();
    let mut pos = start + PNG_SIGNATURE.len();

    loop {
        if pos + 8 > n {
            return BoundaryOutcome {
                end: n,
                truncated: true,
                violated: false,
            };
        }

        let length = u32::from_be_bytes([buffer[pos], buffer[pos + 1], buffer[pos + 2], buffer[pos + 3]]);
        let chunk_type = &buffer[pos + 4..pos + 8];

        if length > MAX_CHUNK_LENGTH || !chunk_type_plausible(chunk_type) {
            return BoundaryOutcome {
                end: pos,
                truncated: false,
                violated: true,
            };
        }

        let chunk_end = pos + CHUNK_OVERHEAD + length as usize;
        if chunk_end > n {
            return BoundaryOutcome {
                end: n,
                truncated: true,
                violated: true,
            };
        }

        if chunk_type == IEND {
            return BoundaryOutcome {
                end: chunk_end,
                truncated: false,
                violated: false,
            };
        }

        pos = chunk_end;
    }
}

#[must_use]
pub fn check_structure(span: &[u8]) -> Structure {
    let mut pos = PNG_SIGNATURE.len();
    let mut advisory = 0u32;
    let mut first_chunk = true;

    loop {
        if pos + 8 > span.len() {
            return Structure::incomplete(advisory);
        }

        let length =
            u32::from_be_bytes([span[pos], span[pos + 1], span[pos + 2], span[pos + 3]]) as usize;
        let chunk_type: [u8; 4] = span[pos + 4..pos + 8].try_into().unwrap();

        if !chunk_type_plausible(&chunk_type) {
            return Structure::violated("corrupt chunk tag", advisory);
        }

        if first_chunk {
            if chunk_type != IHDR || length != 13 {
                return Structure::violated("IHDR chunk missing or malformed", advisory);
            }
            first_chunk = false;
        }

        let chunk_end = pos + CHUNK_OVERHEAD + length;
        if chunk_end > span.len() {
            return Structure::incomplete(advisory);
        }

        let data = &span[pos + 8..pos + 8 + length];
        let stored_crc = u32::from_be_bytes([
            span[chunk_end - 4],
            span[chunk_end - 3],
            span[chunk_end - 2],
            span[chunk_end - 1],
        ]);
        if chunk_crc(&chunk_type, data) != stored_crc {
            return Structure::violated("chunk crc mismatch", advisory);
        }

        if !KNOWN_CHUNKS.contains(&chunk_type) {
            advisory += 1;
        }

        if chunk_type == IEND {
            if chunk_end == span.len() {
                return Structure::intact(advisory);
            }
            return Structure::violated("data past IEND chunk", advisory);
        }

        pos = chunk_end;
    }
}

#[cfg(test)]
mod tests {
    use super::super::Integrity;
    use super::*;

    fn push_chunk(data: &mut Vec<u8>, chunk_type: [u8; 4], payload: &[u8]) {
        data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        data.extend_from_slice(&chunk_type);
        data.extend_from_slice(payload);
        data.extend_from_slice(&chunk_crc(&chunk_type, payload).to_be_bytes());
    }

    fn minimal_png() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&PNG_SIGNATURE);
        push_chunk(
            &mut data,
            IHDR,
            &[0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0x08, 0x02, 0x00, 0x00, 0x00],
        );
        push_chunk(
            &mut data,
            IDAT,
            &[0x08, 0xD7, 0x63, 0x60, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01],
        );
        push_chunk(&mut data, IEND, &[]);
        data
    }

    #[test]
    fn resolve_end_stops_at_iend() {
        let mut data = minimal_png();
        let png_len = data.len();
        data.extend_from_slice(&[0xAA; 16]);

        let outcome = resolve_end(&data, 0);
        assert_eq!(outcome.end, png_len);
        assert!(!outcome.truncated);
        assert!(!outcome.violated);
    }

    #[test]
    fn resolve_end_flags_overrunning_chunk() {
        let mut data = minimal_png();
        // Inflate the IDAT declared length far past the buffer.
        data[34] = 0xFF;
        let outcome = resolve_end(&data, 0);
        assert_eq!(outcome.end, data.len());
        assert!(outcome.violated);
    }

    #[test]
    fn valid_png_is_intact() {
        let data = minimal_png();
        let structure = check_structure(&data);
        assert_eq!(structure.integrity, Integrity::Intact);
        assert_eq!(structure.advisory_tags, 0);
    }

    #[test]
    fn crc_corruption_is_violation() {
        let mut data = minimal_png();
        data[16] ^= 0xFF;
        assert_eq!(
            check_structure(&data).integrity,
            Integrity::Violated("chunk crc mismatch")
        );
    }

    #[test]
    fn truncated_png_is_incomplete() {
        let mut data = minimal_png();
        data.truncate(data.len() - 5);
        assert_eq!(check_structure(&data).integrity, Integrity::Incomplete);
    }

    #[test]
    fn unknown_ancillary_chunk_is_advisory() {
        let mut data = Vec::new();
        data.extend_from_slice(&PNG_SIGNATURE);
        push_chunk(
            &mut data,
            IHDR,
            &[0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0x08, 0x02, 0x00, 0x00, 0x00],
        );
        push_chunk(&mut data, *b"eXIf", &[0x01, 0x02]);
        push_chunk(&mut data, IEND, &[]);

        let structure = check_structure(&data);
        assert_eq!(structure.integrity, Integrity::Intact);
        assert_eq!(structure.advisory_tags, 1);
    }
}
