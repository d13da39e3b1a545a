//! Error types for the rfraw codec.
//!
//! The boolean [`parse`](crate::driver::parse) contract hides these from
//! callers that only care about the decoded pairs; [`try_parse`](crate::driver::try_parse),
//! [`decode_frame`](crate::frame::decode_frame) and the encoder surface them directly.

use core::fmt;
use thiserror::Error;

/// Everything that can stop a decode or encode run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RfrawError {
    /// The input held no characters at all.
    #[error("empty input")]
    EmptyInput,

    /// The first byte of a frame was not `0xAA`.
    #[error("bad frame header: expected 0xaa, found {found:#04x}")]
    BadHeader {
        /// Byte found in place of the header
        found: u8,
    },

    /// The format byte was neither `0xB0` nor `0xB1`.
    #[error("unknown frame format {found:#04x}")]
    UnknownFormat {
        /// Byte found in place of the format tag
        found: u8,
    },

    /// The frame announced more timing bins than a table can hold.
    #[error("bin count {count} out of range (max 8)")]
    BinCountOutOfRange {
        /// Announced bin count
        count: u8,
    },

    /// Input ended before the frame header and bin table were complete.
    #[error("input ended inside the frame header")]
    Truncated,

    /// A character that is neither a hex digit nor a separator was found.
    #[error("invalid hex digit at offset {offset}")]
    InvalidDigit {
        /// Byte offset of the offending character in the input
        offset: usize,
    },

    /// The sink filled up; decoding stopped after `capacity` pairs.
    #[error("pulse capacity of {capacity} pairs exceeded")]
    Overflow {
        /// Number of pairs the sink holds
        capacity: usize,
    },

    /// The encoder was handed a sink with no pairs.
    #[error("no pulses to encode")]
    NoPulses,

    /// The widths of the sink cluster into zero or more than eight bins.
    #[error("{count} timing bins cannot be encoded (need 1..=8)")]
    TooManyBins {
        /// Number of clusters found
        count: usize,
    },

    /// The output writer refused the encoded text.
    #[error("output writer failed")]
    Write,
}

impl From<fmt::Error> for RfrawError {
    fn from(_: fmt::Error) -> Self {
        RfrawError::Write
    }
}
