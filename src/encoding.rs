//! rfraw encoding: from a pulse sequence back to hex text.
//!
//! This is the inverse of [`parse`](crate::driver::parse). Widths are
//! clustered into at most eight timing bins, and every (pulse, gap) pair
//! becomes one body byte `0x80 | pulse_bin << 4 | gap_bin`. Output is always
//! new-format and upper-case with no separators.
//!
//! ## Format selection
//!
//! - **B1** when the gaps fall into at most two classes: the whole sequence is
//!   one code, `AA B1 NN (bins) (pairs) 55`.
//! - **B0** otherwise: the sequence is cut after every gap at least as long as
//!   the shortest member of the fourth gap class (or the longest class when
//!   there are fewer). Each piece becomes `AA B0 LL NN RR (bins) (pairs) 55`.
//!   Identical consecutive pieces are folded into one code by bumping `RR`,
//!   and codes are joined with `+`.
//!
//! Pairs whose pulse or gap falls into no bin (a zero-width gap, for
//! example) are left out. Decoding the output gives the bin means, not the
//! original widths.
//!
//! ## Usage
//!
//! ```rust
//! use rfraw::{PulseData, encoding::encode};
//!
//! let data = PulseData::from_pairs([(2396, 23964)], 1_000_000).unwrap();
//! let mut text: heapless::String<64> = heapless::String::new();
//! encode(&data, &mut text).unwrap();
//! assert_eq!(text.as_str(), "AAB102095C5D9C8155");
//! ```
//!
//! ## Limitations
//!
//! - At most [`MAX_CODES`] distinct codes are written; the rest of the sequence is dropped.
//! - Each code holds at most [`HEXSTR_MAX_BYTES`] raw bytes; excess pairs are dropped.

use core::fmt::Write;

use heapless::Vec;

use crate::consts::{
    HEXSTR_MAX_BYTES, MAX_BIN_WIDTH, MAX_BINS, MAX_CODES, RFRAW_HEADER, RFRAW_TERMINATOR,
    SAMPLE_RATE_US, TRIQ_URL_PREFIX,
};
use crate::error::RfrawError;
use crate::frame::Format;
use crate::histogram::Histogram;
use crate::pulse::PulseData;

/// Offset of the repeat byte in a B0 code.
const B0_REPEATS_OFFSET: usize = 4;
/// Offset of the legacy length byte in a B0 code.
const B0_LEN_OFFSET: usize = 2;
/// First byte compared when folding repeated B0 codes.
const B0_BODY_OFFSET: usize = 5;

/// One code under construction, as raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Code {
    bytes: Vec<u8, HEXSTR_MAX_BYTES>,
}

impl Code {
    fn push_byte(&mut self, byte: u8) {
        // Full code: the byte is dropped.
        let _ = self.bytes.push(byte);
    }

    fn push_word(&mut self, word: u16) {
        if self.bytes.len() + 2 <= HEXSTR_MAX_BYTES {
            let [hi, lo] = word.to_be_bytes();
            self.push_byte(hi);
            self.push_byte(lo);
        }
    }

    fn same_body(&self, other: &Code) -> bool {
        self.bytes.len() == other.bytes.len()
            && self.bytes.get(B0_BODY_OFFSET..) == other.bytes.get(B0_BODY_OFFSET..)
    }

    fn write_hex<W: Write>(&self, out: &mut W) -> Result<(), RfrawError> {
        for byte in &self.bytes {
            write!(out, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Writes codes to the output, folding consecutive duplicates.
#[derive(Debug)]
struct CodeWriter<'w, W: Write> {
    out: &'w mut W,
    pending: Option<Code>,
    written: usize,
    distinct: usize,
}

impl<'w, W: Write> CodeWriter<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self {
            out,
            pending: None,
            written: 0,
            distinct: 0,
        }
    }

    fn push(&mut self, code: Code) -> Result<(), RfrawError> {
        if let Some(prev) = self.pending.as_mut() {
            if prev.same_body(&code) {
                let repeats = &mut prev.bytes[B0_REPEATS_OFFSET];
                *repeats = repeats.saturating_add(1);
                return Ok(());
            }
        }
        self.flush()?;
        self.pending = Some(code);
        self.distinct += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RfrawError> {
        if let Some(code) = self.pending.take() {
            if self.written > 0 {
                self.out.write_char('+')?;
            }
            code.write_hex(self.out)?;
            self.written += 1;
        }
        Ok(())
    }
}

/// Converts a width in samples at `sample_rate` Hz to microseconds, clamped to a bin entry.
fn to_us(width: u32, sample_rate: u32) -> u16 {
    let rate = if sample_rate == 0 {
        SAMPLE_RATE_US
    } else {
        sample_rate
    };
    let us = u64::from(width) * u64::from(SAMPLE_RATE_US) / u64::from(rate);
    u16::try_from(us.min(u64::from(MAX_BIN_WIDTH))).unwrap_or(u16::MAX)
}

/// A pulse sequence analysed and ready to be written as rfraw text.
#[derive(Debug)]
pub struct Encoder<'a> {
    data: &'a PulseData,
    timings: Histogram,
    gaps: Histogram,
    bins: [u16; MAX_BINS],
}

impl<'a> Encoder<'a> {
    /// Clusters the widths of `data` into timing bins.
    ///
    /// # Errors
    /// - [`RfrawError::NoPulses`] if `data` holds no pairs
    /// - [`RfrawError::TooManyBins`] if the widths form no cluster or more than [`MAX_BINS`]
    pub fn new(data: &'a PulseData) -> Result<Self, RfrawError> {
        if data.is_empty() {
            return Err(RfrawError::NoPulses);
        }

        let timings = Histogram::from_widths(data.pairs().flat_map(|(p, g)| [p, g]));
        let mut gaps = Histogram::from_widths(data.gaps().iter().copied());
        gaps.sort_by_mean();

        if timings.len() == 0 || timings.len() > MAX_BINS {
            return Err(RfrawError::TooManyBins {
                count: timings.len(),
            });
        }

        let mut bins = [0u16; MAX_BINS];
        for (bin, hist) in bins.iter_mut().zip(timings.bins()) {
            *bin = to_us(hist.mean, data.sample_rate());
        }

        Ok(Self {
            data,
            timings,
            gaps,
            bins,
        })
    }

    /// The format [`write`](Encoder::write) will produce.
    pub fn format(&self) -> Format {
        if self.gaps.len() <= 2 {
            Format::B1
        } else {
            Format::B0
        }
    }

    /// Timing bins in microseconds, in table order.
    pub fn bins(&self) -> &[u16] {
        &self.bins[..self.timings.len()]
    }

    /// Writes the rfraw text to `out`.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), RfrawError> {
        match self.format() {
            Format::B1 => self.write_b1(out),
            Format::B0 => self.write_b0(out),
        }
    }

    fn header(&self, format: Format) -> Code {
        let mut code = Code::default();
        code.push_byte(RFRAW_HEADER);
        code.push_byte(format.tag());
        if format == Format::B0 {
            // Length, patched once the code is complete.
            code.push_byte(0);
        }
        // At most MAX_BINS, checked in `new`.
        code.push_byte(self.bins().len() as u8);
        if format == Format::B0 {
            code.push_byte(1);
        }
        for &bin in self.bins() {
            code.push_word(bin);
        }
        code
    }

    /// Body byte for one pair, if both widths fall into a bin.
    fn pair_byte(&self, pulse: u32, gap: u32) -> Option<u8> {
        let p = self.timings.find(pulse)?;
        let g = self.timings.find(gap)?;
        // Both indices are below MAX_BINS.
        Some(0x80 | ((p as u8) << 4) | g as u8)
    }

    fn write_b1<W: Write>(&self, out: &mut W) -> Result<(), RfrawError> {
        let mut code = self.header(Format::B1);
        for (pulse, gap) in self.data.pairs() {
            if let Some(byte) = self.pair_byte(pulse, gap) {
                code.push_byte(byte);
            }
        }
        code.push_byte(RFRAW_TERMINATOR);
        code.write_hex(out)
    }

    fn write_b0<W: Write>(&self, out: &mut W) -> Result<(), RfrawError> {
        let limit_class = (self.gaps.len() - 1).min(3);
        let limit = self.gaps.bins()[limit_class].min;

        let mut writer = CodeWriter::new(out);
        let mut pairs = self.data.pairs().peekable();
        while pairs.peek().is_some() && writer.distinct < MAX_CODES {
            let mut code = self.header(Format::B0);
            for (pulse, gap) in pairs.by_ref() {
                if let Some(byte) = self.pair_byte(pulse, gap) {
                    code.push_byte(byte);
                    if gap >= limit {
                        break;
                    }
                }
            }
            code.push_byte(RFRAW_TERMINATOR);
            let len = code.bytes.len() - 4;
            code.bytes[B0_LEN_OFFSET] = u8::try_from(len).unwrap_or(0);
            writer.push(code)?;
        }
        writer.flush()
    }
}

/// Encodes `data` as rfraw text into `out`.
///
/// # Errors
/// See [`Encoder::new`]; [`RfrawError::Write`] if `out` fails.
pub fn encode<W: Write>(data: &PulseData, out: &mut W) -> Result<(), RfrawError> {
    Encoder::new(data)?.write(out)
}

/// Writes a triq.org pulse viewer link for `data` into `out`.
///
/// Nothing is written if `data` cannot be encoded.
pub fn write_triq_url<W: Write>(data: &PulseData, out: &mut W) -> Result<(), RfrawError> {
    let encoder = Encoder::new(data)?;
    out.write_str(TRIQ_URL_PREFIX)?;
    encoder.write(out)
}

/// Encodes `data` into a new `String`.
#[cfg(feature = "std")]
pub fn to_hex_string(data: &PulseData) -> Result<String, RfrawError> {
    let mut text = String::new();
    encode(data, &mut text)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::parse;

    type Text = heapless::String<512>;

    fn encoded(data: &PulseData) -> Text {
        let mut text = Text::new();
        encode(data, &mut text).unwrap();
        text
    }

    fn ook_code() -> [(u32, u32); 3] {
        [(500, 1000), (1000, 500), (500, 10000)]
    }

    #[test]
    fn test_encode_single_pair_as_b1() {
        let data = PulseData::from_pairs([(2396, 23964)], SAMPLE_RATE_US).unwrap();
        assert_eq!(Encoder::new(&data).unwrap().format(), Format::B1);
        assert_eq!(encoded(&data).as_str(), "AAB102095C5D9C8155");
    }

    #[test]
    fn test_encode_scales_to_microseconds() {
        let data = PulseData::from_pairs([(599, 5991)], 250_000).unwrap();
        assert_eq!(encoded(&data).as_str(), "AAB102095C5D9C8155");
    }

    #[test]
    fn test_encode_clusters_and_skips_unbinned_pairs() {
        let data =
            PulseData::from_pairs([(100, 200), (110, 190), (300, 200), (290, 0)], SAMPLE_RATE_US)
                .unwrap();
        let encoder = Encoder::new(&data).unwrap();
        assert_eq!(encoder.bins(), &[105, 196, 295]);
        assert_eq!(encoded(&data).as_str(), "AAB103006900C401278181A155");
    }

    #[test]
    fn test_encode_folds_repeated_codes() {
        let mut pairs: [(u32, u32); 9] = [(0, 0); 9];
        for (slot, pair) in pairs.iter_mut().zip(ook_code().iter().cycle()) {
            *slot = *pair;
        }
        let data = PulseData::from_pairs(pairs, SAMPLE_RATE_US).unwrap();
        assert_eq!(Encoder::new(&data).unwrap().format(), Format::B0);
        assert_eq!(encoded(&data).as_str(), "AAB00B030301F403E8271081908255");
    }

    #[test]
    fn test_encode_joins_distinct_codes() {
        let data = PulseData::from_pairs(
            ook_code()
                .into_iter()
                .chain(ook_code())
                .chain(ook_code())
                .chain([(1000, 1000), (500, 10000)]),
            SAMPLE_RATE_US,
        )
        .unwrap();
        assert_eq!(
            encoded(&data).as_str(),
            "AAB00B030301F403E8271081908255+AAB00A030101F403E82710918255"
        );
    }

    #[test]
    fn test_encoded_text_decodes_to_bin_means() {
        let data =
            PulseData::from_pairs([(100, 200), (110, 190), (300, 200)], SAMPLE_RATE_US).unwrap();
        let text = encoded(&data);
        let mut decoded = PulseData::new();
        assert!(parse(&mut decoded, &text));
        assert_eq!(decoded.pulses(), &[105, 105, 300]);
        assert_eq!(decoded.gaps(), &[196, 196, 196]);
    }

    #[test]
    fn test_encode_empty_fails() {
        let mut text = Text::new();
        assert_eq!(encode(&PulseData::new(), &mut text), Err(RfrawError::NoPulses));
        assert!(text.is_empty());
    }

    #[test]
    fn test_encode_too_many_bins() {
        let data = PulseData::from_pairs(
            [(1, 2), (4, 8), (16, 32), (64, 128), (256, 512)],
            SAMPLE_RATE_US,
        )
        .unwrap();
        assert_eq!(
            Encoder::new(&data).unwrap_err(),
            RfrawError::TooManyBins { count: 10 }
        );
    }

    #[test]
    fn test_encode_only_zero_widths() {
        let data = PulseData::from_pairs([(0, 0)], SAMPLE_RATE_US).unwrap();
        assert_eq!(
            Encoder::new(&data).unwrap_err(),
            RfrawError::TooManyBins { count: 0 }
        );
    }

    #[test]
    fn test_encode_reports_writer_failure() {
        let data = PulseData::from_pairs([(2396, 23964)], SAMPLE_RATE_US).unwrap();
        let mut tiny: heapless::String<8> = heapless::String::new();
        assert_eq!(encode(&data, &mut tiny), Err(RfrawError::Write));
    }

    #[test]
    fn test_triq_url() {
        let data = PulseData::from_pairs([(2396, 23964)], SAMPLE_RATE_US).unwrap();
        let mut url = Text::new();
        write_triq_url(&data, &mut url).unwrap();
        assert_eq!(url.as_str(), "https://triq.org/pdv/#AAB102095C5D9C8155");
    }

    #[test]
    fn test_wide_bins_are_clamped() {
        assert_eq!(to_us(70_000, SAMPLE_RATE_US), u16::MAX);
        assert_eq!(to_us(100, 0), 100);
        assert_eq!(to_us(100, 250_000), 400);
    }
}
