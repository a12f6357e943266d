//! Static table of known format signatures and per-format carve metadata.
//!
//! This is the only place new formats are added: each descriptor couples a
//! magic sequence with the boundary rule the resolver dispatches on.

use std::sync::LazyLock;

use crate::types::FormatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// How the end offset of a candidate is derived for a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRule {
    /// Container ends with a fixed byte sequence.
    Trailer(&'static [u8]),
    /// Total size is declared in a header field at `offset` from the start.
    /// `overhead` is added to the declared value to reach the full span.
    LengthField {
        offset: usize,
        size: usize,
        endian: Endianness,
        overhead: usize,
    },
    /// Sequential tagged chunks, each with its own length, up to an
    /// end-marker chunk (PNG).
    Chunked,
    /// Linked IFD tables referencing data extents (TIFF).
    IfdChain,
}

/// Static signature entry for one recognizable container layout.
///
/// A format may carry several descriptors (both TIFF byte orders, both GIF
/// versions); `qualifier` pins additional bytes at a fixed offset when the
/// magic alone is ambiguous, e.g. WebP's `WEBP` fourcc inside a generic
/// RIFF header.
#[derive(Debug, Clone, Copy)]
pub struct SignatureDescriptor {
    pub format: FormatId,
    pub magic: &'static [u8],
    pub qualifier: Option<(usize, &'static [u8])>,
    pub min_length: usize,
    pub boundary: BoundaryRule,
}

impl SignatureDescriptor {
    /// Bound-checked exact match of magic (and qualifier) at `offset`.
    #[must_use]
    pub fn matches_at(&self, buffer: &[u8], offset: usize) -> bool {
        let Some(window) = buffer.get(offset..offset + self.magic.len()) else {
            return false;
        };
        if window != self.magic {
            return false;
        }
        match self.qualifier {
            None => true,
            Some((at, bytes)) => buffer
                .get(offset + at..offset + at + bytes.len())
                .is_some_and(|w| w == bytes),
        }
    }

    #[must_use]
    pub fn trailer(&self) -> Option<&'static [u8]> {
        match self.boundary {
            BoundaryRule::Trailer(bytes) => Some(bytes),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SignatureRegistry {
    descriptors: Vec<SignatureDescriptor>,
    magic_lead_bytes: [bool; 256],
    max_magic_len: usize,
}

static BUILTIN: LazyLock<SignatureRegistry> = LazyLock::new(SignatureRegistry::default_images);

impl SignatureRegistry {
    pub fn new(descriptors: Vec<SignatureDescriptor>) -> Self {
        let mut magic_lead_bytes = [false; 256];
        let mut max_magic_len = 0;
        for descriptor in &descriptors {
            if let Some(&lead) = descriptor.magic.first() {
                magic_lead_bytes[lead as usize] = true;
            }
            max_magic_len = max_magic_len.max(descriptor.magic.len());
        }
        Self {
            descriptors,
            magic_lead_bytes,
            max_magic_len,
        }
    }

    /// The built-in image registry, shared for the process lifetime.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// All supported image container signatures.
    #[must_use]
    pub fn default_images() -> Self {
        Self::new(vec![
            SignatureDescriptor {
                format: FormatId::Jpeg,
                magic: &[0xFF, 0xD8, 0xFF],
                qualifier: None,
                min_length: 100,
                boundary: BoundaryRule::Trailer(&[0xFF, 0xD9]),
            },
            SignatureDescriptor {
                format: FormatId::Png,
                magic: &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
                qualifier: None,
                min_length: 50,
                boundary: BoundaryRule::Chunked,
            },
            SignatureDescriptor {
                format: FormatId::Gif,
                magic: b"GIF87a",
                qualifier: None,
                min_length: 35,
                boundary: BoundaryRule::Trailer(&[0x00, 0x3B]),
            },
            SignatureDescriptor {
                format: FormatId::Gif,
                magic: b"GIF89a",
                qualifier: None,
                min_length: 35,
                boundary: BoundaryRule::Trailer(&[0x00, 0x3B]),
            },
            SignatureDescriptor {
                format: FormatId::Webp,
                magic: b"RIFF",
                qualifier: Some((8, b"WEBP")),
                min_length: 20,
                boundary: BoundaryRule::LengthField {
                    offset: 4,
                    size: 4,
                    endian: Endianness::Little,
                    overhead: 8,
                },
            },
            SignatureDescriptor {
                format: FormatId::Tiff,
                magic: b"II\x2A\x00",
                qualifier: None,
                min_length: 26,
                boundary: BoundaryRule::IfdChain,
            },
            SignatureDescriptor {
                format: FormatId::Tiff,
                magic: b"MM\x00\x2A",
                qualifier: None,
                min_length: 26,
                boundary: BoundaryRule::IfdChain,
            },
        ])
    }

    /// The descriptor matching at `offset`, longest magic first so a format
    /// whose signature is a prefix of another's cannot shadow the more
    /// specific one. Pure and bound-checked; out-of-range offsets near the
    /// buffer end simply return no match.
    #[must_use]
    pub fn lookup(&self, buffer: &[u8], offset: usize) -> Option<&SignatureDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.matches_at(buffer, offset))
            .max_by_key(|d| d.magic.len())
    }

    /// Every descriptor matching at `offset`, longest magic first. Used by
    /// the scanner to break same-offset ties between formats.
    #[must_use]
    pub fn lookup_matches(&self, buffer: &[u8], offset: usize) -> Vec<&SignatureDescriptor> {
        let mut matches: Vec<&SignatureDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| d.matches_at(buffer, offset))
            .collect();
        matches.sort_by_key(|d| std::cmp::Reverse(d.magic.len()));
        matches
    }

    #[must_use]
    pub fn contains_format(&self, format: FormatId) -> bool {
        self.descriptors.iter().any(|d| d.format == format)
    }

    #[must_use]
    pub fn descriptors(&self) -> &[SignatureDescriptor] {
        &self.descriptors
    }

    /// Possible first bytes of any registered magic, indexed by byte value.
    #[must_use]
    pub fn magic_lead_bytes(&self) -> &[bool; 256] {
        &self.magic_lead_bytes
    }

    /// Length of the longest registered magic.
    #[must_use]
    pub fn max_magic_len(&self) -> usize {
        self.max_magic_len
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::default_images()
    }
}
