//! GIF block walk: header, logical screen descriptor, color tables, then
//! image/extension blocks up to the trailer.

use super::Structure;

pub const GIF87A: &[u8; 6] = b"GIF87a";
pub const GIF89A: &[u8; 6] = b"GIF89a";

pub const TRAILER: u8 = 0x3B;
const IMAGE_SEPARATOR: u8 = 0x2C;
const EXTENSION_INTRODUCER: u8 = 0x21;

/// Extension labels defined by the GIF89a specification.
const KNOWN_EXTENSION_LABELS: [u8; 4] = [0xF9, 0xFE, 0x01, 0xFF];

const HEADER_LEN: usize = 6;
const SCREEN_DESCRIPTOR_LEN: usize = 7;

fn color_table_len(flags: u8) -> usize {
    if flags & 0x80 != 0 {
        3 << ((flags & 0x07) as usize + 1)
    } else {
        0
    }
}

/// Walks data sub-blocks (size-prefixed, zero-terminated) and returns the
/// position after the terminator.
fn skip_sub_blocks(span: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let &size = span.get(pos)?;
        pos += 1;
        if size == 0 {
            return Some(pos);
        }
        pos += size as usize;
        if pos > span.len() {
            return None;
        }
    }
}

#[must_use]
pub fn check_structure(span: &[u8]) -> Structure {
    if span.len() < HEADER_LEN + SCREEN_DESCRIPTOR_LEN {
        return Structure::incomplete(0);
    }
    if &span[0..HEADER_LEN] != GIF87A && &span[0..HEADER_LEN] != GIF89A {
        return Structure::violated("unknown GIF version", 0);
    }

    let screen_flags = span[HEADER_LEN + 4];
    let mut pos = HEADER_LEN + SCREEN_DESCRIPTOR_LEN + color_table_len(screen_flags);
    let mut advisory = 0u32;
    let mut saw_image = false;

    loop {
        let Some(&introducer) = span.get(pos) else {
            return Structure::incomplete(advisory);
        };

        match introducer {
            TRAILER => {
                if !saw_image {
                    return Structure::violated("trailer before any image block", advisory);
                }
                if pos + 1 != span.len() {
                    return Structure::violated("data past GIF trailer", advisory);
                }
                return Structure::intact(advisory);
            }
            IMAGE_SEPARATOR => {
                // Descriptor: position + size (8 bytes) + local flags.
                if pos + 10 > span.len() {
                    return Structure::incomplete(advisory);
                }
                let local_flags = span[pos + 9];
                pos += 10 + color_table_len(local_flags);

                // LZW minimum code size byte precedes the data sub-blocks.
                if pos >= span.len() {
                    return Structure::incomplete(advisory);
                }
                pos += 1;

                match skip_sub_blocks(span, pos) {
                    Some(next) => pos = next,
                    None => return Structure::incomplete(advisory),
                }
                saw_image = true;
            }
            EXTENSION_INTRODUCER => {
                let Some(&label) = span.get(pos + 1) else {
                    return Structure::incomplete(advisory);
                };
                if !KNOWN_EXTENSION_LABELS.contains(&label) {
                    advisory += 1;
                }
                match skip_sub_blocks(span, pos + 2) {
                    Some(next) => pos = next,
                    None => return Structure::incomplete(advisory),
                }
            }
            _ => return Structure::violated("unknown block introducer", advisory),
        }
    }
}
