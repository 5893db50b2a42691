//! Network receive primitives.
//!
//! The protocol is receive-only, so the socket surface is too: a thin
//! non-blocking wrapper over mio's UDP socket that the receive thread
//! drives with a poll-with-timeout loop.

pub mod socket;

pub use socket::UdpSocket;
