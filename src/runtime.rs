//! Player runtime: two threads around one bounded queue.
//!
//! # Architecture
//!
//! ```text
//! UDP socket ──▶ rx thread ──▶ FrameQueue ──▶ render thread ──▶ FrameSink
//!               (reassembly)   (drop-oldest)   (rate-capped)
//! ```
//!
//! - **rx thread**: drains datagrams from the socket, feeds the
//!   reassembler, pushes completed frames. Parks in `Poll::poll` with a
//!   short timeout so the shutdown flag is checked even when the stream
//!   goes quiet.
//! - **render thread**: on a fixed cadence (`1/max_fps`), pops the oldest
//!   not-yet-evicted frame and hands it to the sink.
//!
//! The threads share exactly one object: the [`StreamContext`], which owns
//! the queue, the counters, and the shutdown flag. There is no other
//! shared mutable state.

pub mod render_thread;
pub mod rx_thread;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::net::UdpSocket;
use crate::queue::FrameQueue;
use crate::sink::FrameSink;
use crate::stats::StreamStats;

use render_thread::RenderThread;
use rx_thread::RxThread;

/// Shared state for one running stream: the handoff queue, the counters,
/// and the cancellation flag. Passed by `Arc` to both threads, never
/// ambient.
#[derive(Debug)]
pub struct StreamContext {
    pub queue: FrameQueue,
    pub stats: StreamStats,
    shutdown: AtomicBool,
}

impl StreamContext {
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue: FrameQueue::with_capacity(queue_capacity),
            stats: StreamStats::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Asks both threads to wind down at their next loop iteration.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Error starting the player.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Failed to bind or configure the receive socket.
    #[error("failed to bind socket: {0}")]
    Bind(std::io::Error),
    /// Failed to set up the poll loop.
    #[error("failed to set up polling: {0}")]
    Poll(std::io::Error),
}

/// Handle to a running player.
///
/// Dropping the handle signals shutdown but does not wait for the threads;
/// use [`Player::shutdown`] for a graceful join.
pub struct Player {
    ctx: Arc<StreamContext>,
    local_addr: std::net::SocketAddr,
    rx_handle: Option<JoinHandle<()>>,
    render_handle: Option<JoinHandle<()>>,
}

impl Player {
    /// Binds the socket and spawns the rx and render threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound or registered with
    /// the poll.
    ///
    /// # Panics
    ///
    /// Panics if thread spawning fails.
    pub fn spawn(config: PlayerConfig, sink: Box<dyn FrameSink>) -> Result<Self, PlayerError> {
        let socket = UdpSocket::bind(config.listen).map_err(PlayerError::Bind)?;
        if let Some(size) = config.recv_buffer_bytes {
            socket.set_recv_buffer_size(size).map_err(PlayerError::Bind)?;
        }
        let local_addr = socket.local_addr().map_err(PlayerError::Bind)?;

        let ctx = Arc::new(StreamContext::new(config.queue_capacity));
        info!(
            listen = %local_addr,
            payload_size = config.wire.payload_size,
            queue = config.queue_capacity,
            max_fps = config.max_fps,
            "player starting"
        );

        let mut rx = RxThread::new(socket, config.assembler_config(), Arc::clone(&ctx))
            .map_err(PlayerError::Poll)?;
        debug!("spawning rx thread");
        let rx_handle = thread::Builder::new()
            .name("mjrx-rx".into())
            .spawn(move || {
                info!("rx thread started");
                rx.run();
                info!("rx thread exiting");
            })
            .expect("failed to spawn rx thread");

        let mut render = RenderThread::new(Arc::clone(&ctx), config.frame_interval(), sink);
        debug!("spawning render thread");
        let render_handle = thread::Builder::new()
            .name("mjrx-render".into())
            .spawn(move || {
                info!("render thread started");
                render.run();
                info!("render thread exiting");
            })
            .expect("failed to spawn render thread");

        Ok(Self {
            ctx,
            local_addr,
            rx_handle: Some(rx_handle),
            render_handle: Some(render_handle),
        })
    }

    /// Address the receive socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Shared queue, counters, and cancellation flag.
    #[must_use]
    pub fn context(&self) -> &Arc<StreamContext> {
        &self.ctx
    }

    /// Signals shutdown and waits for both threads to exit.
    pub fn shutdown(mut self) {
        info!("player shutdown initiated");
        self.ctx.request_shutdown();

        if let Some(handle) = self.rx_handle.take() {
            debug!("waiting for rx thread");
            let _ = handle.join();
        }
        if let Some(handle) = self.render_handle.take() {
            debug!("waiting for render thread");
            let _ = handle.join();
        }

        info!("player shutdown complete");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // Best-effort: threads observe the flag within one loop iteration.
        self.ctx.request_shutdown();
    }
}
