//! Motion-JPEG over UDP stream receiver.
//!
//! A sender fragments each JPEG frame into fixed-size datagrams; this crate
//! reassembles them back into complete frames and hands them to a display
//! consumer through a small drop-oldest queue. See [`runtime`] for the
//! thread architecture.

pub mod config;
pub mod frame;
pub mod net;
pub mod protocol;
pub mod queue;
pub mod runtime;
pub mod sink;
pub mod stats;
pub mod trace;

pub use config::PlayerConfig;
pub use frame::Frame;
pub use protocol::{DropReason, FrameAssembler, Ingest};
pub use queue::FrameQueue;
pub use runtime::{Player, PlayerError, StreamContext};
pub use sink::FrameSink;
pub use stats::{StatsSnapshot, StreamStats};
pub use trace::init_tracing;
