//! Fragment wire format and frame reassembly.
//!
//! The sending encoder splits each JPEG frame into fixed-size datagrams
//! (see [`datagram`]); [`assembler`] folds them back into complete frames.
//! The protocol is receive-only and best-effort: anything malformed, late,
//! or incomplete is counted and dropped, never retransmitted.

pub mod assembler;
pub mod datagram;

pub use assembler::{AssemblerConfig, FrameAssembler, Ingest};
pub use datagram::{FragmentHeader, ParseError, ParsedFragment, WireConfig, HEADER_LEN};

/// Why a datagram was rejected or an in-flight frame discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Datagram length does not match the fixed packet size.
    BadLength,
    /// Declared payload length exceeds the fragment payload capacity.
    PayloadOverflow,
    /// Fragment belongs to a frame other than the one being assembled.
    ForeignFragment,
    /// Last fragment arrived but earlier fragments are missing.
    MissingFragments,
    /// Reassembled bytes do not end in the JPEG end-of-image marker.
    BadTrailer,
    /// Buffer growth failed; the in-flight frame was abandoned.
    AllocFailure,
    /// Completed frame evicted from a full handoff queue.
    QueueEvicted,
}

impl DropReason {
    pub const ALL: [DropReason; 7] = [
        DropReason::BadLength,
        DropReason::PayloadOverflow,
        DropReason::ForeignFragment,
        DropReason::MissingFragments,
        DropReason::BadTrailer,
        DropReason::AllocFailure,
        DropReason::QueueEvicted,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::BadLength => "bad_length",
            DropReason::PayloadOverflow => "payload_overflow",
            DropReason::ForeignFragment => "foreign_fragment",
            DropReason::MissingFragments => "missing_fragments",
            DropReason::BadTrailer => "bad_trailer",
            DropReason::AllocFailure => "alloc_failure",
            DropReason::QueueEvicted => "queue_evicted",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            DropReason::BadLength => 0,
            DropReason::PayloadOverflow => 1,
            DropReason::ForeignFragment => 2,
            DropReason::MissingFragments => 3,
            DropReason::BadTrailer => 4,
            DropReason::AllocFailure => 5,
            DropReason::QueueEvicted => 6,
        }
    }
}
