//! Property checks over arbitrary buffers.

mod common;

use proptest::prelude::*;

use imgcarve::{scan_partitioned, scan_with_options, ScanOptions};

fn skip_options(enabled: bool) -> ScanOptions {
    // A small window so the skip heuristic actually fires on short inputs.
    let mut options = ScanOptions::new().with_entropy_skip(enabled);
    options.entropy_window = 256;
    options
}

proptest! {
    #[test]
    fn scanning_is_deterministic(buffer in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let options = ScanOptions::default();
        let first = scan_with_options(&buffer, &options).unwrap();
        let second = scan_with_options(&buffer, &options).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn entropy_skip_never_changes_results(
        padding in 0usize..1024,
        buffer in proptest::collection::vec(any::<u8>(), 0..1024),
    ) {
        // Leading zero padding gives the heuristic low-entropy windows to
        // skip over; the result set must not depend on the toggle.
        let mut padded = vec![0u8; padding];
        padded.extend_from_slice(&buffer);

        let with_skip = scan_with_options(&padded, &skip_options(true)).unwrap();
        let without_skip = scan_with_options(&padded, &skip_options(false)).unwrap();
        prop_assert_eq!(with_skip, without_skip);
    }

    #[test]
    fn partitioned_scan_agrees_with_sequential(
        buffer in proptest::collection::vec(any::<u8>(), 0..2048),
        partition_size in 16usize..512,
    ) {
        let options = ScanOptions::default();
        let sequential = scan_with_options(&buffer, &options).unwrap();
        let partitioned = scan_partitioned(&buffer, &options, partition_size).unwrap();
        prop_assert_eq!(partitioned, sequential);
    }

    #[test]
    fn sample_survives_random_surroundings(
        prefix in proptest::collection::vec(0u8..0x20, 0..256),
        suffix in proptest::collection::vec(0u8..0x20, 0..256),
    ) {
        // Bytes below 0x20 cannot start any registered signature, so the
        // planted JPEG must be found exactly once at its offset.
        let jpeg = common::jpeg_sample();
        let mut buffer = prefix.clone();
        buffer.extend_from_slice(&jpeg);
        buffer.extend_from_slice(&suffix);

        let results = scan_with_options(&buffer, &ScanOptions::default()).unwrap();
        prop_assert_eq!(results.len(), 1);
        prop_assert_eq!(results[0].start_offset, prefix.len());
        prop_assert_eq!(results[0].length, jpeg.len());
    }
}
