//! Fragment datagram layout.
//!
//! ## Wire format
//!
//! Every datagram is exactly `HEADER_LEN + payload_size` bytes. Multi-byte
//! fields are big-endian (fixed by the sending encoder, not renegotiable).
//!
//! | offset | bytes | field |
//! |--------|-------|-------------------------------------------------|
//! | 0      | 2     | `payload_len`: valid payload bytes that follow  |
//! | 2      | 2     | `frame_id`: frame this fragment belongs to      |
//! | 4      | 2     | `index`: 0-based position within the frame      |
//! | 6      | 1     | last-fragment flag (non-zero = last)            |
//! | 7      | ..    | payload; bytes past `payload_len` are padding   |

use thiserror::Error;

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 7;

/// Default fragment payload capacity.
pub const DEFAULT_PAYLOAD_SIZE: usize = 1300;

/// Wire geometry shared by the parser and the reassembler.
///
/// `payload_size` is the fragment payload capacity; the total datagram size
/// is derived from it. Both ends of the stream must agree on these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConfig {
    pub payload_size: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl WireConfig {
    /// Exact on-the-wire datagram size.
    #[must_use]
    pub const fn packet_size(&self) -> usize {
        HEADER_LEN + self.payload_size
    }
}

/// Errors from [`FragmentHeader::parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("datagram is {got} bytes, expected exactly {expected}")]
    BadLength { got: usize, expected: usize },
    #[error("payload length {len} exceeds fragment capacity {cap}")]
    PayloadOverflow { len: usize, cap: usize },
}

impl ParseError {
    #[must_use]
    pub fn reason(&self) -> super::DropReason {
        match self {
            ParseError::BadLength { .. } => super::DropReason::BadLength,
            ParseError::PayloadOverflow { .. } => super::DropReason::PayloadOverflow,
        }
    }
}

/// Decoded fragment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    pub payload_len: u16,
    pub frame_id: u16,
    pub index: u16,
    pub last: bool,
}

/// A parsed fragment borrowing its payload from the receive buffer.
#[derive(Debug)]
pub struct ParsedFragment<'a> {
    pub header: FragmentHeader,
    pub payload: &'a [u8],
}

impl FragmentHeader {
    /// Parses one datagram.
    ///
    /// The length check runs first, so the fixed-offset reads below cannot
    /// go out of bounds. The returned payload slice covers only the
    /// `payload_len` valid bytes, never the padding.
    ///
    /// # Errors
    ///
    /// - [`ParseError::BadLength`] if `buf` is not exactly one packet
    /// - [`ParseError::PayloadOverflow`] if the declared payload length
    ///   exceeds the fragment capacity
    pub fn parse<'a>(buf: &'a [u8], wire: &WireConfig) -> Result<ParsedFragment<'a>, ParseError> {
        let expected = wire.packet_size();
        if buf.len() != expected {
            return Err(ParseError::BadLength {
                got: buf.len(),
                expected,
            });
        }

        let payload_len = u16::from_be_bytes(buf[0..2].try_into().unwrap());
        let frame_id = u16::from_be_bytes(buf[2..4].try_into().unwrap());
        let index = u16::from_be_bytes(buf[4..6].try_into().unwrap());
        let last = buf[6] != 0;

        let len = payload_len as usize;
        if len > wire.payload_size {
            return Err(ParseError::PayloadOverflow {
                len,
                cap: wire.payload_size,
            });
        }

        let header = FragmentHeader {
            payload_len,
            frame_id,
            index,
            last,
        };

        Ok(ParsedFragment {
            header,
            payload: &buf[HEADER_LEN..HEADER_LEN + len],
        })
    }
}
