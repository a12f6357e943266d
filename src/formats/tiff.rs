//! TIFF IFD-chain walk.
//!
//! TIFF has no trailer and no total-length field, so the carve boundary is
//! the furthest extent reachable from the IFD chain: the directory tables
//! themselves, out-of-line entry values, and strip data referenced by
//! inline StripOffsets/StripByteCounts pairs. The resulting end offset is
//! conservative by nature.

use crate::boundary::BoundaryOutcome;
use crate::signatures::Endianness;

use super::Structure;

pub const TIFF_LITTLE: &[u8; 4] = b"II\x2A\x00";
pub const TIFF_BIG: &[u8; 4] = b"MM\x00\x2A";

const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 12;
const MAX_IFDS: usize = 32;
const MAX_ENTRIES: u16 = 4096;

const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_TILE_OFFSETS: u16 = 324;
const TAG_TILE_BYTE_COUNTS: u16 = 325;

/// Byte width of each TIFF field type, indexed by type id (1..=12).
const TYPE_SIZES: [usize; 13] = [0, 1, 1, 2, 4, 8, 1, 1, 2, 4, 8, 4, 8];

fn detect_endian(data: &[u8]) -> Option<Endianness> {
    match data.get(0..2)? {
        b"II" => Some(Endianness::Little),
        b"MM" => Some(Endianness::Big),
        _ => None,
    }
}

fn read_u16(data: &[u8], at: usize, endian: Endianness) -> Option<u16> {
    let bytes: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
    Some(match endian {
        Endianness::Little => u16::from_le_bytes(bytes),
        Endianness::Big => u16::from_be_bytes(bytes),
    })
}

fn read_u32(data: &[u8], at: usize, endian: Endianness) -> Option<u32> {
    let bytes: [u8; 4] = data.get(at..at + 4)?.try_into().ok()?;
    Some(match endian {
        Endianness::Little => u32::from_le_bytes(bytes),
        Endianness::Big => u32::from_be_bytes(bytes),
    })
}

/// Reads an inline entry value as an offset/count scalar, honoring the
/// entry's declared type width.
fn read_inline_scalar(data: &[u8], value_at: usize, type_id: u16, endian: Endianness) -> Option<u64> {
    match type_id {
        3 => read_u16(data, value_at, endian).map(u64::from),
        4 => read_u32(data, value_at, endian).map(u64::from),
        _ => None,
    }
}

pub(crate) fn resolve_end(buffer: &[u8], start: usize) -> BoundaryOutcome {
    let n = buffer.len();
    let truncated_at_end = BoundaryOutcome {
        end: n,
        truncated: true,
        violated: false,
    };

    let Some(endian) = detect_endian(&buffer[start..]) else {
        return BoundaryOutcome {
            end: n,
            truncated: false,
            violated: true,
        };
    };
    if start + HEADER_LEN > n {
        return truncated_at_end;
    }

    let first_ifd = read_u32(buffer, start + 4, endian).unwrap_or(0) as usize;
    if first_ifd < HEADER_LEN {
        return BoundaryOutcome {
            end: (start + HEADER_LEN).min(n),
            truncated: false,
            violated: true,
        };
    }

    let mut extent = start + HEADER_LEN;
    let mut ifd_offset = first_ifd;
    let mut truncated = false;
    let mut violated = false;

    for _ in 0..MAX_IFDS {
        let Some(pos) = start.checked_add(ifd_offset) else {
            violated = true;
            break;
        };
        let Some(count) = read_u16(buffer, pos, endian) else {
            truncated = true;
            break;
        };
        if count == 0 || count > MAX_ENTRIES {
            violated = true;
            break;
        }

        let table_end = pos + 2 + count as usize * ENTRY_LEN + 4;
        if table_end > n {
            truncated = true;
            break;
        }
        extent = extent.max(table_end);

        let mut strip_offset: Option<u64> = None;
        let mut strip_bytes: Option<u64> = None;

        for i in 0..count as usize {
            let entry = pos + 2 + i * ENTRY_LEN;
            let tag = read_u16(buffer, entry, endian).unwrap_or(0);
            let type_id = read_u16(buffer, entry + 2, endian).unwrap_or(0);
            let value_count = read_u32(buffer, entry + 4, endian).unwrap_or(0) as usize;

            let type_size = TYPE_SIZES.get(type_id as usize).copied().unwrap_or(0);
            let payload = type_size.saturating_mul(value_count);

            if payload > 4 {
                // Value stored out of line; the value slot holds its offset.
                if let Some(value_offset) = read_u32(buffer, entry + 8, endian) {
                    let value_end = start
                        .saturating_add(value_offset as usize)
                        .saturating_add(payload);
                    extent = extent.max(value_end);
                }
            } else if value_count == 1 {
                match tag {
                    TAG_STRIP_OFFSETS | TAG_TILE_OFFSETS => {
                        strip_offset = read_inline_scalar(buffer, entry + 8, type_id, endian);
                    }
                    TAG_STRIP_BYTE_COUNTS | TAG_TILE_BYTE_COUNTS => {
                        strip_bytes = read_inline_scalar(buffer, entry + 8, type_id, endian);
                    }
                    _ => {}
                }
            }
        }

        if let (Some(offset), Some(bytes)) = (strip_offset, strip_bytes) {
            let data_end = start
                .saturating_add(offset as usize)
                .saturating_add(bytes as usize);
            extent = extent.max(data_end);
        }

        let next = read_u32(buffer, table_end - 4, endian).unwrap_or(0) as usize;
        if next == 0 || next == ifd_offset {
            break;
        }
        ifd_offset = next;
    }

    if extent > n {
        truncated = true;
        extent = n;
    }

    BoundaryOutcome {
        end: extent.max((start + HEADER_LEN).min(n)),
        truncated,
        violated,
    }
}

#[must_use]
pub fn check_structure(span: &[u8]) -> Structure {
    let Some(endian) = detect_endian(span) else {
        return Structure::violated("unknown byte order mark", 0);
    };
    if span.len() < HEADER_LEN {
        return Structure::incomplete(0);
    }
    if read_u16(span, 2, endian) != Some(42) {
        return Structure::violated("bad TIFF magic number", 0);
    }

    let first_ifd = read_u32(span, 4, endian).unwrap_or(0) as usize;
    if first_ifd < HEADER_LEN {
        return Structure::violated("IFD offset inside header", 0);
    }

    let mut advisory = 0u32;
    let mut ifd_offset = first_ifd;

    for _ in 0..MAX_IFDS {
        let Some(count) = read_u16(span, ifd_offset, endian) else {
            return Structure::incomplete(advisory);
        };
        if count == 0 {
            return Structure::violated("empty IFD", advisory);
        }
        if count > MAX_ENTRIES {
            return Structure::violated("implausible IFD entry count", advisory);
        }

        let table_end = ifd_offset + 2 + count as usize * ENTRY_LEN + 4;
        if table_end > span.len() {
            return Structure::incomplete(advisory);
        }

        let mut previous_tag = 0u16;
        let mut unordered = false;
        for i in 0..count as usize {
            let entry = ifd_offset + 2 + i * ENTRY_LEN;
            let tag = read_u16(span, entry, endian).unwrap_or(0);
            let type_id = read_u16(span, entry + 2, endian).unwrap_or(0);

            if type_id == 0 || type_id as usize >= TYPE_SIZES.len() {
                advisory += 1;
            }
            if tag < previous_tag {
                unordered = true;
            }
            previous_tag = tag;
        }
        if unordered {
            // Readers tolerate unordered directories; the spec does not.
            advisory += 1;
        }

        let next = read_u32(span, table_end - 4, endian).unwrap_or(0) as usize;
        if next == 0 || next == ifd_offset {
            return Structure::intact(advisory);
        }
        ifd_offset = next;
    }

    Structure::violated("IFD chain does not terminate", advisory)
}
