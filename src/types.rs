use crate::entropy::{DEFAULT_ENTROPY_THRESHOLD, DEFAULT_ENTROPY_WINDOW};

/// Image container formats the carver knows how to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Jpeg,
    Png,
    Gif,
    Webp,
    Tiff,
}

impl FormatId {
    pub const ALL: [FormatId; 5] = [
        FormatId::Jpeg,
        FormatId::Png,
        FormatId::Gif,
        FormatId::Webp,
        FormatId::Tiff,
    ];

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Webp => "WebP",
            Self::Tiff => "TIFF",
        }
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Jpeg => 0,
            Self::Png => 1,
            Self::Gif => 2,
            Self::Webp => 3,
            Self::Tiff => 4,
        }
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome class of structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Valid,
    Truncated,
    Malformed,
}

/// Validation verdict attached to a carved candidate.
///
/// `confidence` is informational for downstream ranking and never gates
/// whether a result is emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub confidence: f64,
    pub reason: Option<&'static str>,
}

impl Verdict {
    #[must_use]
    pub fn new(status: VerdictStatus, confidence: f64, reason: Option<&'static str>) -> Self {
        Self {
            status,
            confidence: confidence.clamp(0.0, 1.0),
            reason,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.status, VerdictStatus::Valid)
    }
}

/// A tentatively detected, not-yet-reported file span.
///
/// Invariant: `start < end <= buffer.len()`, upheld by the boundary
/// resolver before a candidate reaches validation.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub format: FormatId,
    pub start: usize,
    pub end: usize,
    /// Set by the boundary resolver when the span had to be clamped to the
    /// end of the buffer. Advisory: full structural validation overrides it.
    pub truncated: bool,
    /// Set by the boundary resolver when a declared length ran past the
    /// buffer. Caps the verdict at `Malformed`.
    pub violated: bool,
}

impl Candidate {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[must_use]
    pub fn span<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.start..self.end]
    }
}

/// Terminal artifact of a scan: one independently carved file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub format: FormatId,
    pub start_offset: usize,
    pub length: usize,
    pub verdict: Verdict,
    pub bytes: Vec<u8>,
}

impl ExtractionResult {
    pub(crate) fn from_candidate(buffer: &[u8], candidate: &Candidate, verdict: Verdict) -> Self {
        Self {
            format: candidate.format,
            start_offset: candidate.start,
            length: candidate.len(),
            verdict,
            bytes: candidate.span(buffer).to_vec(),
        }
    }

    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }
}

/// Per-scan configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub enable_entropy_skip: bool,
    pub entropy_threshold: f64,
    pub entropy_window: usize,
    /// Restrict scanning to these formats. `None` scans all registered.
    pub formats: Option<Vec<FormatId>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            enable_entropy_skip: true,
            entropy_threshold: DEFAULT_ENTROPY_THRESHOLD,
            entropy_window: DEFAULT_ENTROPY_WINDOW,
            formats: None,
        }
    }
}

impl ScanOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entropy_skip(mut self, enabled: bool) -> Self {
        self.enable_entropy_skip = enabled;
        self
    }

    #[must_use]
    pub fn with_entropy_threshold(mut self, bits_per_byte: f64) -> Self {
        self.entropy_threshold = bits_per_byte;
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: Vec<FormatId>) -> Self {
        self.formats = Some(formats);
        self
    }
}

/// Per-format result counts, in [`FormatId::ALL`] order, zero counts elided.
#[must_use]
pub fn scan_summary(results: &[ExtractionResult]) -> Vec<(FormatId, usize)> {
    let mut counts = [0usize; FormatId::ALL.len()];
    for result in results {
        counts[result.format.index()] += 1;
    }
    FormatId::ALL
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(f, n)| (*f, n))
        .collect()
}
