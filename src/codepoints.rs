//! Code point decoding for validated UTF-8 text.
//!
//! Text enters the library as `&str`, so validation has already happened.
//! The iterator here decodes one Unicode scalar value at a time and reports
//! how many bytes it consumed, which is what the metrics code needs to walk
//! adjacent code point pairs for kerning.

const TWOBYTE_HEADER_MASK: u8 = 0b1110_0000;
const TWOBYTE_HEADER_VALUE: u8 = 0b1100_0000;
const THREEBYTE_HEADER_MASK: u8 = 0b1111_0000;
const THREEBYTE_HEADER_VALUE: u8 = 0b1110_0000;
const FOURBYTE_HEADER_MASK: u8 = 0b1111_1000;
const FOURBYTE_HEADER_VALUE: u8 = 0b1111_0000;

const SUBSEQUENT_DATA_MASK: u32 = 0b11_1111;
const SUBSEQUENT_DATA_BITS: u32 = 6;

/// Iterator over the code points of a validated UTF-8 string.
///
/// Yields `(code_point, bytes_consumed)` pairs. The consumed lengths over a
/// whole string always sum to `text.len()`.
#[derive(Debug, Clone)]
pub struct CodepointIter<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CodepointIter<'a> {
    /// Create an iterator over the code points of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }
}

impl Iterator for CodepointIter<'_> {
    type Item = (u32, usize);

    fn next(&mut self) -> Option<(u32, usize)> {
        let lead = *self.bytes.get(self.pos)?;
        let (data_mask, subsequent) = if lead < 0x80 {
            self.pos += 1;
            return Some((u32::from(lead), 1));
        } else if lead & TWOBYTE_HEADER_MASK == TWOBYTE_HEADER_VALUE {
            (0b1_1111u32, 1usize)
        } else if lead & THREEBYTE_HEADER_MASK == THREEBYTE_HEADER_VALUE {
            (0b1111, 2)
        } else if lead & FOURBYTE_HEADER_MASK == FOURBYTE_HEADER_VALUE {
            (0b111, 3)
        } else {
            // The input came from &str, so a continuation or invalid lead
            // byte in lead position indicates iterator state corruption.
            unreachable!("invalid UTF-8 lead byte 0x{lead:02X} in validated text");
        };

        let mut unpacked = u32::from(lead) & data_mask;
        for i in 0..subsequent {
            unpacked <<= SUBSEQUENT_DATA_BITS;
            unpacked |= u32::from(self.bytes[self.pos + 1 + i]) & SUBSEQUENT_DATA_MASK;
        }
        let len = 1 + subsequent;
        self.pos += len;
        Some((unpacked, len))
    }
}
