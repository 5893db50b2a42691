//! Player configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::protocol::assembler::{AssemblerConfig, DEFAULT_INITIAL_BUFFER};
use crate::protocol::datagram::WireConfig;
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Default UDP port the sending encoder targets.
pub const DEFAULT_PORT: u16 = 57956;

/// Default render cadence cap in frames per second.
pub const DEFAULT_MAX_FPS: u32 = 60;

/// Everything tunable about a [`Player`](crate::runtime::Player).
///
/// The defaults mirror the sending encoder's fixed constants; only
/// `listen` usually needs changing.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Address to bind the receive socket to.
    pub listen: SocketAddr,
    /// Wire geometry (fragment payload capacity; packet size derives from it).
    pub wire: WireConfig,
    /// Initial in-flight buffer size; grows per frame on demand.
    pub initial_buffer_bytes: usize,
    /// Handoff queue capacity in frames.
    pub queue_capacity: usize,
    /// Upper bound on frames handed to the sink per second.
    pub max_fps: u32,
    /// Kernel receive buffer size, if it should be raised from the default.
    pub recv_buffer_bytes: Option<usize>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            wire: WireConfig::default(),
            initial_buffer_bytes: DEFAULT_INITIAL_BUFFER,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_fps: DEFAULT_MAX_FPS,
            recv_buffer_bytes: None,
        }
    }
}

impl PlayerConfig {
    /// Render tick interval implied by `max_fps`.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.max_fps.max(1)
    }

    #[must_use]
    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            wire: self.wire,
            initial_buffer_bytes: self.initial_buffer_bytes,
        }
    }
}
