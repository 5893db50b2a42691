//! Receive thread: datagram ingestion and reassembly.
//!
//! Responsibilities:
//! - Drain datagrams from the socket and feed them to the reassembler.
//! - Push completed frames into the handoff queue, counting evictions.
//! - Keep the per-datagram counters current.
//!
//! The loop parks in `Poll::poll` with a short timeout rather than a
//! blocking receive, so the shutdown flag is observed within one interval
//! even on a silent stream, with no side-channel socket close required.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use mio::{Events, Interest, Poll, Token};
use tracing::{trace, warn};

use crate::net::UdpSocket;
use crate::protocol::{AssemblerConfig, FrameAssembler, Ingest};
use crate::runtime::StreamContext;

const RX_TOKEN: Token = Token(0);

/// Upper bound on one park in the poll; also the shutdown-detection latency.
const POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// Receive-loop state.
pub struct RxThread {
    socket: UdpSocket,
    poll: Poll,
    events: Events,
    assembler: FrameAssembler,
    ctx: Arc<StreamContext>,
    /// Reusable receive buffer, one datagram larger than the packet size so
    /// oversized datagrams still read fully and fail the length check.
    recv_buf: Vec<u8>,
}

impl RxThread {
    /// Registers the socket with a fresh poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll cannot be created or the socket cannot
    /// be registered.
    pub fn new(
        mut socket: UdpSocket,
        config: AssemblerConfig,
        ctx: Arc<StreamContext>,
    ) -> std::io::Result<Self> {
        let poll = Poll::new()?;
        poll.registry()
            .register(&mut socket, RX_TOKEN, Interest::READABLE)?;
        let recv_buf = vec![0u8; config.wire.packet_size() + 1];

        Ok(Self {
            socket,
            poll,
            events: Events::with_capacity(8),
            assembler: FrameAssembler::new(config),
            ctx,
            recv_buf,
        })
    }

    /// Runs the receive loop until shutdown is requested.
    pub fn run(&mut self) {
        while !self.ctx.is_shutdown() {
            match self.poll.poll(&mut self.events, Some(POLL_TIMEOUT)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "poll failed, stopping receive loop");
                    break;
                }
            }
            self.drain_socket();
        }
    }

    /// Receives until the socket would block.
    fn drain_socket(&mut self) {
        loop {
            match self.socket.try_recv_from(&mut self.recv_buf) {
                Ok(Some((len, _from))) => self.on_datagram(len),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "receive failed, stopping receive loop");
                    self.ctx.request_shutdown();
                    break;
                }
            }
        }
    }

    fn on_datagram(&mut self, len: usize) {
        let ctx = &self.ctx;
        ctx.stats.record_datagram();

        match self.assembler.ingest(&self.recv_buf[..len]) {
            Ingest::Accepted => ctx.stats.record_fragment(),
            Ingest::Complete(frame) => {
                ctx.stats.record_fragment();
                trace!(frame = frame.id(), bytes = frame.len(), "frame complete");
                if let Some(evicted) = ctx.queue.push(frame) {
                    ctx.stats.record_evicted();
                    trace!(frame = evicted.id(), "queue full, evicted oldest");
                }
                ctx.stats.record_completed();
            }
            Ingest::Rejected(reason) => {
                // Counted, not logged: a lossy stream would turn every
                // stray fragment into an I/O-bound log line.
                ctx.stats.record_reject(reason);
            }
            Ingest::Discarded(reason) => {
                ctx.stats.record_discard(reason);
                trace!(reason = reason.as_str(), "in-flight frame discarded");
            }
        }
    }
}
