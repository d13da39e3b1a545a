//! Single-frame rfraw decoder.
//!
//! A frame is a header, a table of up to eight timing bins, and a body of
//! nibbles that index into that table:
//!
//! ```text
//! AA B0 LL NN RR (W1 W1 ... Wk Wk)  (nibbles ...)  55
//! AA B1       NN    (W1 W1 ... Wk Wk)  (nibbles ...)  55
//! ```
//!
//! The body is read one nibble at a time. Each nibble is either a pulse token
//! or a gap token; pulses wait for the following gap and the completed pair is
//! pushed into the [`PulseData`] sink.
//!
//! ## Dialects
//!
//! Two encodings share the same framing. Before the body is consumed the
//! decoder scans ahead up to the terminator:
//!
//! - **New**: some body byte has a nibble high bit set (`byte & 0x88`).
//!   Nibbles `>= 8` are pulses (bin `n & 7`), the rest are gaps.
//! - **Legacy**: no such byte. Additionally the first nibble of every byte is
//!   a pulse, so each byte carries one pulse/gap pair.
//!
//! The terminator `55` is only recognised on a byte boundary. Within a frame
//! the decoder never looks back; the only lookahead is the dialect scan and a
//! one-byte terminator peek, both on copies of the cursor.

use crate::consts::{
    MAX_BINS, RFRAW_FORMAT_B0, RFRAW_FORMAT_B1, RFRAW_HEADER, RFRAW_PULSE_MASK,
    RFRAW_PULSE_NIBBLE, RFRAW_TERMINATOR, SAMPLE_RATE_US,
};
use crate::error::RfrawError;
use crate::hex::HexCursor;
use crate::pulse::PulseData;

/// Frame format tag following the `AA` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Format {
    /// `B0`: carries a legacy length byte and a repeat count.
    B0,
    /// `B1`: bin count follows the tag directly.
    B1,
}

impl Format {
    /// Maps a wire tag to its format.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            RFRAW_FORMAT_B0 => Some(Format::B0),
            RFRAW_FORMAT_B1 => Some(Format::B1),
            _ => None,
        }
    }

    /// The wire tag of this format.
    pub fn tag(self) -> u8 {
        match self {
            Format::B0 => RFRAW_FORMAT_B0,
            Format::B1 => RFRAW_FORMAT_B1,
        }
    }
}

/// Body token encoding, chosen once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Dialect {
    /// Odd-position nibbles below 8 are pulses too.
    Legacy,
    /// Pulses and gaps are told apart by the nibble high bit only.
    New,
}

impl Dialect {
    /// Scans the body ahead of `cursor` without consuming it.
    ///
    /// Stops at the terminator, at the end of input or at the first byte that
    /// cannot be lexed.
    pub fn detect(cursor: &HexCursor<'_>) -> Self {
        let mut ahead = *cursor;
        while let Some(byte) = ahead.next_byte() {
            if byte == RFRAW_TERMINATOR {
                break;
            }
            if byte & RFRAW_PULSE_MASK != 0 {
                return Dialect::New;
            }
        }
        Dialect::Legacy
    }
}

/// The fixed part of a frame, up to and including the bin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FrameHeader {
    /// Frame format
    pub format: Format,
    /// Legacy total-length byte, only present in `B0` frames. Not used for decoding.
    pub legacy_len: Option<u8>,
    /// Number of valid entries in `bins`
    pub bins_len: u8,
    /// Repeat count from `B0` frames (`1` for `B1`). Read, never expanded.
    pub repeats: u8,
    /// Timing bins in microseconds; entries past `bins_len` are zero
    pub bins: [u16; MAX_BINS],
}

impl FrameHeader {
    /// Reads the header and bin table, leaving `cursor` on the first body nibble.
    ///
    /// # Errors
    /// - [`RfrawError::BadHeader`] if the first byte is not `0xAA`
    /// - [`RfrawError::UnknownFormat`] if the format tag is not `B0`/`B1`
    /// - [`RfrawError::BinCountOutOfRange`] if more than [`MAX_BINS`] bins are announced
    /// - [`RfrawError::Truncated`] or [`RfrawError::InvalidDigit`] if the lexer fails
    pub fn read(cursor: &mut HexCursor<'_>) -> Result<Self, RfrawError> {
        let header = read_byte(cursor)?;
        if header != RFRAW_HEADER {
            return Err(RfrawError::BadHeader { found: header });
        }

        let tag = read_byte(cursor)?;
        let format = Format::from_tag(tag).ok_or(RfrawError::UnknownFormat { found: tag })?;

        let legacy_len = match format {
            Format::B0 => Some(read_byte(cursor)?),
            Format::B1 => None,
        };

        let bins_len = read_byte(cursor)?;
        if usize::from(bins_len) > MAX_BINS {
            return Err(RfrawError::BinCountOutOfRange { count: bins_len });
        }

        let repeats = match format {
            Format::B0 => read_byte(cursor)?,
            Format::B1 => 1,
        };

        let mut bins = [0u16; MAX_BINS];
        for bin in bins.iter_mut().take(usize::from(bins_len)) {
            *bin = read_word(cursor)?;
        }

        Ok(Self {
            format,
            legacy_len,
            bins_len,
            repeats,
            bins,
        })
    }

    /// The valid part of the bin table.
    pub fn bins(&self) -> &[u16] {
        &self.bins[..usize::from(self.bins_len)]
    }
}

/// Why the body of a frame stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameEnd {
    /// A `55` terminator on a byte boundary was consumed.
    Terminator,
    /// The input ran out.
    EndOfInput,
    /// The sink filled up; remaining tokens were not decoded.
    Overflow,
}

/// Outcome of a successfully started frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FrameSummary {
    /// Header and bin table
    pub header: FrameHeader,
    /// Detected body dialect
    pub dialect: Dialect,
    /// How the body ended
    pub end: FrameEnd,
    /// Pairs this frame appended to the sink
    pub pairs: usize,
}

/// Body state machine: the pulse/gap pairing and the nibble alignment.
#[derive(Debug)]
struct BodyDecoder {
    bins: [u16; MAX_BINS],
    dialect: Dialect,
    /// True when the next nibble starts a byte
    aligned: bool,
    /// Pulse width waiting for its gap
    pending: Option<u32>,
    pairs: usize,
}

impl BodyDecoder {
    fn new(header: &FrameHeader, dialect: Dialect) -> Self {
        Self {
            bins: header.bins,
            dialect,
            aligned: true,
            pending: None,
            pairs: 0,
        }
    }

    fn width(&self, nibble: u8) -> u32 {
        u32::from(self.bins[usize::from(nibble & 0x07)])
    }

    /// Classifies one nibble and emits a pair when a gap completes it.
    fn feed(&mut self, nibble: u8, sink: &mut PulseData) -> Result<(), RfrawError> {
        self.aligned = !self.aligned;
        let pulse = nibble >= RFRAW_PULSE_NIBBLE || (self.dialect == Dialect::Legacy && !self.aligned);
        if pulse {
            if let Some(width) = self.pending.take() {
                self.emit(sink, width, 0)?;
            }
            self.pending = Some(self.width(nibble));
        } else {
            let width = self.pending.take().unwrap_or(0);
            self.emit(sink, width, self.width(nibble))?;
        }
        Ok(())
    }

    fn emit(&mut self, sink: &mut PulseData, pulse: u32, gap: u32) -> Result<(), RfrawError> {
        sink.push_pair(pulse, gap)?;
        self.pairs += 1;
        Ok(())
    }
}

/// Decodes one frame from `cursor` into `sink`.
///
/// On success the cursor sits just past the terminator (or at the end of
/// input, or wherever decoding stopped on overflow). Pairs are appended; the
/// sink is never cleared here and its sample rate is stamped to
/// [`SAMPLE_RATE_US`] once the bin table has been read. A pulse that is
/// still waiting for its gap when the frame ends is not emitted.
///
/// # Errors
/// Any header error from [`FrameHeader::read`], in which case nothing is
/// emitted, or [`RfrawError::InvalidDigit`] if a foreign character appears in
/// the body. The pairs decoded before that character are kept.
pub fn decode_frame(
    cursor: &mut HexCursor<'_>,
    sink: &mut PulseData,
) -> Result<FrameSummary, RfrawError> {
    let header = match FrameHeader::read(cursor) {
        Ok(header) => header,
        Err(err) => {
            debug!("rfraw: frame rejected at offset {}", cursor.position());
            return Err(err);
        }
    };
    let dialect = Dialect::detect(cursor);
    debug!(
        "rfraw: frame format {:#x}, {} bins, repeats {}, legacy dialect {}",
        header.format.tag(),
        header.bins_len,
        header.repeats,
        dialect == Dialect::Legacy
    );
    sink.set_sample_rate(SAMPLE_RATE_US);

    let mut body = BodyDecoder::new(&header, dialect);
    let end = loop {
        if body.aligned && cursor.peek_byte() == Some(RFRAW_TERMINATOR) {
            let _ = cursor.next_byte();
            break FrameEnd::Terminator;
        }
        if cursor.is_empty() {
            break FrameEnd::EndOfInput;
        }
        match cursor.next_nibble() {
            Some(nibble) => {
                if body.feed(nibble, sink).is_err() {
                    break FrameEnd::Overflow;
                }
            }
            None if cursor.is_empty() => break FrameEnd::EndOfInput,
            None => {
                return Err(RfrawError::InvalidDigit {
                    offset: cursor.position(),
                });
            }
        }
    };
    // A pulse still waiting for its gap is not a pair.
    if body.pending.is_some() {
        trace!("rfraw: unpaired trailing pulse dropped");
    }
    if end == FrameEnd::Overflow {
        warn!("rfraw: sink full, frame truncated after {} pairs", body.pairs);
    }
    trace!("rfraw: frame emitted {} pairs", body.pairs);

    Ok(FrameSummary {
        header,
        dialect,
        end,
        pairs: body.pairs,
    })
}

fn lex_error(cursor: &HexCursor<'_>) -> RfrawError {
    if cursor.is_empty() {
        RfrawError::Truncated
    } else {
        RfrawError::InvalidDigit {
            offset: cursor.position(),
        }
    }
}

fn read_byte(cursor: &mut HexCursor<'_>) -> Result<u8, RfrawError> {
    match cursor.next_byte() {
        Some(byte) => Ok(byte),
        None => Err(lex_error(cursor)),
    }
}

fn read_word(cursor: &mut HexCursor<'_>) -> Result<u16, RfrawError> {
    match cursor.next_word() {
        Some(word) => Ok(word),
        None => Err(lex_error(cursor)),
    }
}
