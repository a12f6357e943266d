//! Scan orchestration: cursor walk, candidate resolution, dedup, and the
//! optional partitioned parallel pass.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::boundary::resolve_end;
use crate::entropy::profile_window;
use crate::error::Result;
use crate::signatures::{SignatureDescriptor, SignatureRegistry};
use crate::types::{Candidate, ExtractionResult, FormatId, ScanOptions, Verdict};
use crate::validator::{self, validate};
use crate::CarveError;

/// A signature-carving pass over one buffer.
///
/// Scanners hold only configuration; all cursor and result state is local
/// to a single `scan` call, so one scanner may be reused or shared freely.
#[derive(Debug)]
pub struct Scanner<'r> {
    registry: &'r SignatureRegistry,
    options: ScanOptions,
}

impl<'r> Scanner<'r> {
    #[must_use]
    pub fn new(options: ScanOptions) -> Scanner<'static> {
        Scanner {
            registry: SignatureRegistry::builtin(),
            options,
        }
    }

    #[must_use]
    pub fn with_registry(registry: &'r SignatureRegistry, options: ScanOptions) -> Self {
        Self { registry, options }
    }

    /// Scans the whole buffer in one linear pass.
    ///
    /// Results are ordered by ascending start offset. An empty buffer is
    /// not an error and yields an empty list.
    pub fn scan(&self, buffer: &[u8]) -> Result<Vec<ExtractionResult>> {
        let enabled = self.enabled_formats()?;
        if buffer.is_empty() {
            return Ok(Vec::new());
        }

        debug!(len = buffer.len(), "scan started");
        let accepted = self.scan_range(buffer, 0, buffer.len(), &enabled, true)?;
        debug!(results = accepted.len(), "scan finished");

        Ok(accepted
            .iter()
            .map(|(candidate, verdict)| {
                ExtractionResult::from_candidate(buffer, candidate, verdict.clone())
            })
            .collect())
    }

    /// Scans with start offsets statically partitioned across worker
    /// threads. Workers evaluate every position in their range against the
    /// full buffer (so spans may extend past a partition and a magic may
    /// straddle a boundary); the merge then replays the sequential cursor
    /// policy over the combined candidates, making the result set identical
    /// to [`Scanner::scan`].
    pub fn scan_partitioned(
        &self,
        buffer: &[u8],
        partition_size: usize,
    ) -> Result<Vec<ExtractionResult>> {
        let enabled = self.enabled_formats()?;
        if buffer.is_empty() {
            return Ok(Vec::new());
        }
        let partition_size = partition_size.max(1);

        let ranges: Vec<(usize, usize)> = (0..buffer.len())
            .step_by(partition_size)
            .map(|start| (start, (start + partition_size).min(buffer.len())))
            .collect();

        debug!(
            len = buffer.len(),
            partitions = ranges.len(),
            "partitioned scan started"
        );

        let found: Vec<Vec<(Candidate, Verdict)>> = ranges
            .into_par_iter()
            .map(|(start, end)| self.scan_range(buffer, start, end, &enabled, false))
            .collect::<Result<_>>()?;

        let merged = merge_accepted(found.into_iter().flatten().collect());
        debug!(results = merged.len(), "partitioned scan finished");

        Ok(merged
            .iter()
            .map(|(candidate, verdict)| {
                ExtractionResult::from_candidate(buffer, candidate, verdict.clone())
            })
            .collect())
    }

    /// Walks `[from, to)` looking for candidate starts, resolving each
    /// against the full buffer. With `greedy` set the cursor jumps past
    /// each accepted span, so positions inside it are never evaluated; the
    /// partitioned workers pass `false` and evaluate every position, and
    /// [`merge_accepted`] replays the jump policy over the combined set.
    fn scan_range(
        &self,
        buffer: &[u8],
        from: usize,
        to: usize,
        enabled: &[bool; FormatId::ALL.len()],
        greedy: bool,
    ) -> Result<Vec<(Candidate, Verdict)>> {
        let mut accepted: Vec<(Candidate, Verdict)> = Vec::new();
        let mut cursor = from;
        let mut next_probe = from;
        let window = self.options.entropy_window.max(1);
        let leads = self.registry.magic_lead_bytes();

        while cursor < to {
            if self.options.enable_entropy_skip
                && cursor >= next_probe
                && cursor + window <= buffer.len()
            {
                let profile = profile_window(buffer, cursor, window, leads);
                if profile.entropy_bits < self.options.entropy_threshold
                    && !profile.holds_magic_start
                {
                    trace!(
                        offset = cursor,
                        entropy = profile.entropy_bits,
                        "low-entropy window skipped"
                    );
                    cursor += window;
                    next_probe = cursor;
                    continue;
                }
                next_probe = cursor + window;
            }

            let Some((candidate, verdict)) = self.evaluate_position(buffer, cursor, enabled)?
            else {
                cursor += 1;
                continue;
            };

            if validator::is_suppressible(&verdict) {
                trace!(offset = cursor, "hard contradiction suppressed");
                cursor += 1;
                continue;
            }

            debug!(
                offset = candidate.start,
                end = candidate.end,
                format = %candidate.format,
                status = ?verdict.status,
                confidence = verdict.confidence,
                "candidate accepted"
            );
            cursor = if greedy {
                candidate.end.max(cursor + 1)
            } else {
                cursor + 1
            };
            accepted.push((candidate, verdict));
        }

        Ok(accepted)
    }

    /// Resolves and validates every signature match at `offset`, returning
    /// the winning candidate. Ties between formats matching at the same
    /// offset go to the longer magic, then to the higher confidence.
    fn evaluate_position(
        &self,
        buffer: &[u8],
        offset: usize,
        enabled: &[bool; FormatId::ALL.len()],
    ) -> Result<Option<(Candidate, Verdict)>> {
        let matches = self.registry.lookup_matches(buffer, offset);
        let Some(longest) = matches
            .iter()
            .find(|d| enabled[d.format.index()])
            .map(|d| d.magic.len())
        else {
            return Ok(None);
        };

        let mut best: Option<(Candidate, Verdict)> = None;
        for descriptor in matches
            .iter()
            .filter(|d| enabled[d.format.index()] && d.magic.len() == longest)
        {
            let (candidate, verdict) = self.carve(buffer, offset, descriptor)?;
            let better = match &best {
                None => true,
                Some((_, current)) => verdict.confidence > current.confidence,
            };
            if better {
                best = Some((candidate, verdict));
            }
        }
        Ok(best)
    }

    /// Resolves and validates one descriptor match. An inconsistent
    /// descriptor is a configuration error and propagates to the caller.
    fn carve(
        &self,
        buffer: &[u8],
        offset: usize,
        descriptor: &SignatureDescriptor,
    ) -> Result<(Candidate, Verdict)> {
        let outcome = resolve_end(buffer, offset, descriptor)?;

        let candidate = Candidate {
            format: descriptor.format,
            start: offset,
            end: outcome.end.max(offset + 1).min(buffer.len()),
            truncated: outcome.truncated,
            violated: outcome.violated,
        };
        debug_assert!(candidate.start < candidate.end && candidate.end <= buffer.len());

        let verdict = validate(buffer, &candidate, descriptor);
        Ok((candidate, verdict))
    }

    fn enabled_formats(&self) -> Result<[bool; FormatId::ALL.len()]> {
        match &self.options.formats {
            None => Ok([true; FormatId::ALL.len()]),
            Some(requested) => {
                let mut enabled = [false; FormatId::ALL.len()];
                for &format in requested {
                    if !self.registry.contains_format(format) {
                        return Err(CarveError::UnsupportedFormat(format));
                    }
                    enabled[format.index()] = true;
                }
                Ok(enabled)
            }
        }
    }
}

/// Replays the sequential cursor policy over the combined per-partition
/// candidates: sorted by span, any candidate starting inside an already-kept
/// span is one the sequential cursor would have jumped over, so it is
/// discarded. Duplicates found by neighboring partitions collapse the same
/// way. Workers evaluate a superset of the positions the sequential pass
/// evaluates, so the replay reconstructs its result set exactly.
fn merge_accepted(mut found: Vec<(Candidate, Verdict)>) -> Vec<(Candidate, Verdict)> {
    found.sort_by_key(|(c, _)| (c.start, c.end));

    let mut merged: Vec<(Candidate, Verdict)> = Vec::with_capacity(found.len());
    let mut resume = 0usize;
    for (candidate, verdict) in found {
        if candidate.start < resume {
            debug!(
                offset = candidate.start,
                format = %candidate.format,
                "candidate inside accepted span discarded at merge"
            );
            continue;
        }
        resume = candidate.end;
        merged.push((candidate, verdict));
    }
    merged
}
