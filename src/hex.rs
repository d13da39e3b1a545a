//! Hex lexer for rfraw text.
//!
//! [`HexCursor`] walks an ASCII byte slice strictly left to right and yields
//! nibbles, bytes and big-endian 16-bit words. Before every nibble it skips
//! any run of [`HEX_SEPARATORS`] (space, tab, hyphen, colon), so a frame
//! survives being wrapped, grouped or sprinkled with separators by hand.
//!
//! Every read returns `None` on end of input or on a character that is not a
//! hex digit. The cursor is then left on the offending byte (or at the end),
//! which lets callers tell the two apart with [`HexCursor::is_empty`].

use crate::consts::HEX_SEPARATORS;

/// A forward-only position over rfraw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexCursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> HexCursor<'a> {
    /// Creates a cursor at the start of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor in the original input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` once every byte of the input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The unconsumed tail of the input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Skips every leading byte contained in `set`.
    pub fn skip(&mut self, set: &[u8]) {
        while let Some(c) = self.input.get(self.pos) {
            if !set.contains(c) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Reads one hex digit, skipping separators first.
    ///
    /// Accepts `0-9`, `A-F` and `a-f`. On failure the cursor stays on the
    /// rejected byte.
    pub fn next_nibble(&mut self) -> Option<u8> {
        self.skip(HEX_SEPARATORS);
        let c = *self.input.get(self.pos)?;
        let nibble = match c {
            b'0'..=b'9' => c - b'0',
            b'A'..=b'F' => c - b'A' + 10,
            b'a'..=b'f' => c - b'a' + 10,
            _ => return None,
        };
        self.pos += 1;
        Some(nibble)
    }

    /// Reads two nibbles, high nibble first.
    pub fn next_byte(&mut self) -> Option<u8> {
        let hi = self.next_nibble()?;
        let lo = self.next_nibble()?;
        Some((hi << 4) | lo)
    }

    /// Reads two bytes as a big-endian word.
    pub fn next_word(&mut self) -> Option<u16> {
        let hi = self.next_byte()?;
        let lo = self.next_byte()?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Reads the next byte without moving this cursor.
    pub fn peek_byte(&self) -> Option<u8> {
        let mut ahead = *self;
        ahead.next_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles_are_case_insensitive() {
        let mut cur = HexCursor::new(b"09aFAf");
        assert_eq!(cur.next_nibble(), Some(0x0));
        assert_eq!(cur.next_nibble(), Some(0x9));
        assert_eq!(cur.next_nibble(), Some(0xa));
        assert_eq!(cur.next_nibble(), Some(0xf));
        assert_eq!(cur.next_nibble(), Some(0xa));
        assert_eq!(cur.next_nibble(), Some(0xf));
        assert_eq!(cur.next_nibble(), None);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_separators_are_skipped_inside_bytes() {
        let mut cur = HexCursor::new(b"A -:\tA b\t1");
        assert_eq!(cur.next_byte(), Some(0xaa));
        assert_eq!(cur.next_byte(), Some(0xb1));
        assert!(cur.is_empty());
    }

    #[test]
    fn test_invalid_digit_leaves_cursor_on_it() {
        let mut cur = HexCursor::new(b"  g1");
        assert_eq!(cur.next_nibble(), None);
        assert_eq!(cur.position(), 2);
        assert_eq!(cur.remaining(), b"g1");
        assert!(!cur.is_empty());
    }

    #[test]
    fn test_newline_is_not_an_intra_frame_separator() {
        let mut cur = HexCursor::new(b"A\nA");
        assert_eq!(cur.next_byte(), None);
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn test_word_is_big_endian() {
        let mut cur = HexCursor::new(b"095C 5d9c");
        assert_eq!(cur.next_word(), Some(2396));
        assert_eq!(cur.next_word(), Some(23964));
        assert_eq!(cur.next_word(), None);
    }

    #[test]
    fn test_short_byte_fails() {
        let mut cur = HexCursor::new(b"5");
        assert_eq!(cur.next_byte(), None);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let cur = HexCursor::new(b"55 81");
        assert_eq!(cur.peek_byte(), Some(0x55));
        assert_eq!(cur.peek_byte(), Some(0x55));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_skip_stops_at_first_foreign_byte() {
        let mut cur = HexCursor::new(b" +\r\nAA");
        cur.skip(b" \r\n+");
        assert_eq!(cur.remaining(), b"AA");
    }
}
