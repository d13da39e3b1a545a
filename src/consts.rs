//! Constants used across the rfraw codec.
//!
//! This module defines the wire-level markers of an rfraw frame, the
//! separator sets accepted by the lexer and the frame driver, and the
//! bounds that keep every buffer in the crate at a fixed size.
//!
//! ## Frame layout
//!
//! ```text
//! AA B0 LL NN RR (W1 W1 ... Wk Wk)  (nibbles ...)  55
//! AA B1       NN    (W1 W1 ... Wk Wk)  (nibbles ...)  55
//! ```
//!
//! - **Header**: always [`RFRAW_HEADER`].
//! - **Format**: [`RFRAW_FORMAT_B0`] (multi-code, carries length and repeats)
//!   or [`RFRAW_FORMAT_B1`] (single code).
//! - **Bins**: `NN` big-endian 16-bit widths in microseconds, at most [`MAX_BINS`].
//! - **Terminator**: [`RFRAW_TERMINATOR`], only recognised on a byte boundary.

/// First byte of every rfraw frame.
pub const RFRAW_HEADER: u8 = 0xaa;

/// Format tag for the multi-code dialect with legacy length and repeat bytes.
pub const RFRAW_FORMAT_B0: u8 = 0xb0;

/// Format tag for the single-code dialect.
pub const RFRAW_FORMAT_B1: u8 = 0xb1;

/// Byte that ends a frame when it sits on a byte boundary.
pub const RFRAW_TERMINATOR: u8 = 0x55;

/// Mask selecting the high bit of both nibbles of a body byte.
///
/// Any body byte with one of these bits set marks the frame as new-format.
pub const RFRAW_PULSE_MASK: u8 = 0x88;

/// Smallest nibble value that is always a pulse token.
pub const RFRAW_PULSE_NIBBLE: u8 = 0x08;

/// Maximum number of entries in a frame's timing-bin table.
pub const MAX_BINS: usize = 8;

/// Maximum number of (pulse, gap) pairs a [`PulseData`](crate::pulse::PulseData) holds.
///
/// Tokens decoded past this bound are dropped and the run stops.
pub const MAX_PULSES: usize = 1024;

/// Nominal sample rate stamped on every decoded sink; widths are microseconds.
pub const SAMPLE_RATE_US: u32 = 1_000_000;

/// Largest width representable in a bin table entry.
pub const MAX_BIN_WIDTH: u32 = u16::MAX as u32;

/// Characters skipped by the lexer before every nibble.
pub const HEX_SEPARATORS: &[u8] = b" \t-:";

/// Characters skipped by the driver between frames.
pub const FRAME_SEPARATORS: &[u8] = b" \t\r\n+-";

/// Maximum number of distinct codes the encoder emits in one B0 string.
pub const MAX_CODES: usize = 32;

/// Maximum number of raw bytes in a single encoded code (before hex expansion).
pub const HEXSTR_MAX_BYTES: usize = 1024;

/// Maximum number of clusters kept while building a width histogram.
pub const MAX_HIST_BINS: usize = 16;

/// Prefix of a triq.org pulse-data viewer link.
pub const TRIQ_URL_PREFIX: &str = "https://triq.org/pdv/#";
