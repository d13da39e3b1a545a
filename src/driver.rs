//! Multi-frame rfraw driver.
//!
//! An rfraw string may hold several frames back to back, usually joined with
//! `+` or line breaks. [`parse`] clears the sink once, then alternates between
//! skipping [`FRAME_SEPARATORS`] and calling
//! [`decode_frame`] until the input is exhausted or a frame fails. Every
//! frame appends to the same sink, so the result is the concatenation of all
//! frames that decoded.
//!
//! ## Example
//!
//! ```rust
//! use rfraw::PulseData;
//!
//! let mut data = PulseData::new();
//! assert!(rfraw::parse(&mut data, "AAB102095C5D9C8155 + AAB102095C5D9C8155"));
//! assert_eq!(data.pulses(), &[2396, 2396]);
//! assert_eq!(data.gaps(), &[23964, 23964]);
//! ```
//!
//! ## Failure behaviour
//!
//! There is no rollback. A malformed header stops the run with whatever the
//! earlier frames produced; a foreign character mid-body keeps the pairs
//! decoded so far. [`parse`] only reports whether there was any input at all;
//! use [`try_parse`] to learn why a run stopped.

use crate::consts::{FRAME_SEPARATORS, MAX_PULSES};
use crate::error::RfrawError;
use crate::frame::{FrameEnd, decode_frame};
use crate::hex::HexCursor;
use crate::pulse::PulseData;

/// Decodes every frame in `input` into `sink`.
///
/// # Returns
/// - `false` if `input` is empty; the sink is left untouched
/// - `true` otherwise, even if no frame decoded. Check
///   [`PulseData::count`] to see whether anything was recovered.
pub fn parse(sink: &mut PulseData, input: &str) -> bool {
    match try_parse(sink, input) {
        Err(RfrawError::EmptyInput) => false,
        _ => true,
    }
}

/// Decodes every frame in `input` into `sink`, reporting why the run stopped.
///
/// # Returns
/// The number of pairs in the sink when every frame decoded cleanly.
///
/// # Errors
/// - [`RfrawError::EmptyInput`] if `input` is empty (the sink is untouched)
/// - [`RfrawError::Overflow`] if the sink filled up
/// - the first frame error otherwise. Pairs decoded before it stay in the sink.
pub fn try_parse(sink: &mut PulseData, input: &str) -> Result<usize, RfrawError> {
    if input.is_empty() {
        return Err(RfrawError::EmptyInput);
    }

    // Zeroes the sample rate too; the first accepted frame header stamps it.
    sink.clear();

    let mut cursor = HexCursor::new(input.as_bytes());
    let mut frames = 0usize;
    loop {
        cursor.skip(FRAME_SEPARATORS);
        if cursor.is_empty() {
            break;
        }
        let summary = decode_frame(&mut cursor, sink)?;
        frames += 1;
        if summary.end == FrameEnd::Overflow {
            return Err(RfrawError::Overflow {
                capacity: MAX_PULSES,
            });
        }
    }
    debug!("rfraw: decoded {} frames, {} pairs", frames, sink.count());
    Ok(sink.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SAMPLE_RATE_US;

    #[test]
    fn test_parse_minimal_frame() {
        let mut data = PulseData::new();
        assert!(parse(&mut data, "AAB102095C5D9C8155"));
        assert_eq!(data.count(), 1);
        assert_eq!(data.pulses(), &[2396]);
        assert_eq!(data.gaps(), &[23964]);
        assert_eq!(data.sample_rate(), SAMPLE_RATE_US);
    }

    #[test]
    fn test_parse_ook_frame() {
        let mut data = PulseData::new();
        assert!(parse(&mut data, "AAB1050068000000F80088001C82839455"));
        assert_eq!(data.pulses(), &[104, 104, 0]);
        assert_eq!(data.gaps(), &[248, 136, 28]);
    }

    #[test]
    fn test_parse_empty_input() {
        let mut data = PulseData::from_pairs([(1, 2)], 250_000).unwrap();
        assert!(!parse(&mut data, ""));
        // untouched
        assert_eq!(data.count(), 1);
        assert_eq!(data.sample_rate(), 250_000);
        assert_eq!(try_parse(&mut data, ""), Err(RfrawError::EmptyInput));
    }

    #[test]
    fn test_parse_bad_header_clears_sink() {
        let mut data = PulseData::from_pairs([(1, 2)], 250_000).unwrap();
        assert!(parse(&mut data, "BBB102095C5D9C8155"));
        assert_eq!(data.count(), 0);
        assert_eq!(data.sample_rate(), 0);
        assert_eq!(
            try_parse(&mut data, "BBB102095C5D9C8155"),
            Err(RfrawError::BadHeader { found: 0xbb })
        );
    }

    #[test]
    fn test_parse_concatenated_frames() {
        let mut data = PulseData::new();
        assert!(parse(&mut data, "AAB102095C5D9C8155 + AAB102095C5D9C8155"));
        assert_eq!(data.count(), 2);
        assert_eq!(data.pulses(), &[2396, 2396]);
        assert_eq!(data.gaps(), &[23964, 23964]);
    }

    #[test]
    fn test_parse_frames_on_separate_lines() {
        let mut data = PulseData::new();
        let input = "AAB102095C5D9C8155\r\nAAB103000100020003011055\n";
        assert_eq!(try_parse(&mut data, input), Ok(3));
        assert_eq!(data.pulses(), &[2396, 1, 2]);
        assert_eq!(data.gaps(), &[23964, 2, 1]);
    }

    #[test]
    fn test_parse_trailing_pulse_does_not_leak_into_next_frame() {
        let mut data = PulseData::new();
        assert_eq!(try_parse(&mut data, "AAB102000100021855"), Ok(1));
        assert_eq!(data.pulses(), &[0]);
        assert_eq!(data.gaps(), &[2]);

        let input = "AAB102000100021855+AAB102000100029155";
        assert_eq!(try_parse(&mut data, input), Ok(2));
        assert_eq!(data.pulses(), &[0, 2]);
        assert_eq!(data.gaps(), &[2, 2]);
    }

    #[test]
    fn test_parse_rate_stamped_only_by_accepted_frame() {
        let mut data = PulseData::new();
        assert_eq!(
            try_parse(&mut data, "AAB102095C5D9C8155+BB"),
            Err(RfrawError::BadHeader { found: 0xbb })
        );
        assert_eq!(data.sample_rate(), SAMPLE_RATE_US);

        assert_eq!(try_parse(&mut data, " + "), Ok(0));
        assert_eq!(data.sample_rate(), 0);
    }

    #[test]
    fn test_parse_bin_count_overflow() {
        let mut data = PulseData::new();
        assert!(parse(&mut data, "AAB109095C5D9C8155"));
        assert_eq!(data.count(), 0);
    }

    #[test]
    fn test_parse_stops_at_first_bad_frame() {
        let mut data = PulseData::new();
        let input = "AAB102095C5D9C8155+AAB209+AAB102095C5D9C8155";
        assert_eq!(
            try_parse(&mut data, input),
            Err(RfrawError::UnknownFormat { found: 0xb2 })
        );
        assert_eq!(data.count(), 1);
    }

    #[test]
    fn test_parse_separators_only() {
        let mut data = PulseData::new();
        assert_eq!(try_parse(&mut data, " +\r\n- "), Ok(0));
        assert!(data.is_empty());
    }

    #[test]
    fn test_parse_truncates_at_capacity() {
        let mut input: heapless::String<4096> = heapless::String::new();
        input.push_str("AAB1 02 0064 00C8 ").unwrap();
        for _ in 0..(MAX_PULSES + 10) {
            input.push_str("81").unwrap();
        }
        input.push_str("55 AAB102095C5D9C8155").unwrap();

        let mut data = PulseData::new();
        assert!(parse(&mut data, &input));
        assert_eq!(data.count(), MAX_PULSES);
        assert!(data.pairs().all(|pair| pair == (100, 200)));
        assert_eq!(
            try_parse(&mut data, &input),
            Err(RfrawError::Overflow {
                capacity: MAX_PULSES
            })
        );
    }
}
