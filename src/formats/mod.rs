//! Format-specific layout rules: small pure functions dispatched by format,
//! one module per supported container.

pub mod gif;
pub mod jpeg;
pub mod png;
pub mod tiff;
pub mod webp;

/// How far a structural walk got through a carved span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Every block parsed and the container closed exactly at the span end.
    Intact,
    /// The span ended mid-structure; consistent with truncation.
    Incomplete,
    /// A block contradicts the format's layout rules.
    Violated(&'static str),
}

/// Result of walking a carved span against its format's layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    pub integrity: Integrity,
    /// Count of unrecognized but ignorable chunk/segment tags encountered.
    pub advisory_tags: u32,
}

impl Structure {
    pub(crate) fn intact(advisory_tags: u32) -> Self {
        Self {
            integrity: Integrity::Intact,
            advisory_tags,
        }
    }

    pub(crate) fn incomplete(advisory_tags: u32) -> Self {
        Self {
            integrity: Integrity::Incomplete,
            advisory_tags,
        }
    }

    pub(crate) fn violated(reason: &'static str, advisory_tags: u32) -> Self {
        Self {
            integrity: Integrity::Violated(reason),
            advisory_tags,
        }
    }
}
