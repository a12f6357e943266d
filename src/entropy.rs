//! Shannon entropy over sliding windows, used to deprioritize padding
//! regions during scanning.

pub const DEFAULT_ENTROPY_WINDOW: usize = 4096;
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 1.0;

/// Entropy measurement of one buffer window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntropyWindow {
    pub offset: usize,
    pub window_size: usize,
    pub entropy_bits: f64,
}

impl EntropyWindow {
    #[must_use]
    pub fn measure(buffer: &[u8], offset: usize, window_size: usize) -> Self {
        Self {
            offset,
            window_size,
            entropy_bits: window_entropy(buffer, offset, window_size),
        }
    }
}

/// Shannon entropy in bits per byte (0.0..=8.0) over the window
/// `[offset, offset + window_size)`, clipped to the buffer bounds.
///
/// Deterministic given identical byte content; an empty or out-of-range
/// window measures 0.0.
#[must_use]
pub fn window_entropy(buffer: &[u8], offset: usize, window_size: usize) -> f64 {
    let window = clip_window(buffer, offset, window_size);
    histogram_entropy(&byte_histogram(window), window.len())
}

pub(crate) fn clip_window(buffer: &[u8], offset: usize, window_size: usize) -> &[u8] {
    if offset >= buffer.len() {
        return &[];
    }
    let end = offset.saturating_add(window_size).min(buffer.len());
    &buffer[offset..end]
}

pub(crate) fn byte_histogram(data: &[u8]) -> [u32; 256] {
    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }
    freq
}

fn histogram_entropy(freq: &[u32; 256], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = f64::from(count) / n;
            -p * p.log2()
        })
        .sum()
}

/// One probed window: its entropy plus whether any byte in it could begin
/// a registered magic sequence.
///
/// The scanner may only skip a window when `holds_magic_start` is false;
/// that keeps the heuristic transparent with respect to results, since no
/// candidate can start inside a window that contains no magic lead byte.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowProfile {
    pub entropy_bits: f64,
    pub holds_magic_start: bool,
}

pub(crate) fn profile_window(
    buffer: &[u8],
    offset: usize,
    window_size: usize,
    magic_lead_bytes: &[bool; 256],
) -> WindowProfile {
    let window = clip_window(buffer, offset, window_size);
    let freq = byte_histogram(window);
    let holds_magic_start = freq
        .iter()
        .zip(magic_lead_bytes)
        .any(|(&count, &is_lead)| is_lead && count > 0);
    WindowProfile {
        entropy_bits: histogram_entropy(&freq, window.len()),
        holds_magic_start,
    }
}
