//! Render thread: rate-capped dequeue and handoff to the display sink.
//!
//! Each tick pops at most one frame (the oldest not yet evicted) and
//! gives it to the sink, then sleeps out the remainder of the tick. The
//! cadence is a rate cap, not backpressure: when the queue is empty the
//! thread just sleeps, and when the producer outruns the consumer the
//! queue's drop-oldest policy keeps the picture near the live edge.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::runtime::StreamContext;
use crate::sink::FrameSink;

/// Render-loop state.
pub struct RenderThread {
    ctx: Arc<StreamContext>,
    interval: Duration,
    sink: Box<dyn FrameSink>,
}

impl RenderThread {
    pub fn new(ctx: Arc<StreamContext>, interval: Duration, sink: Box<dyn FrameSink>) -> Self {
        Self {
            ctx,
            interval,
            sink,
        }
    }

    /// Runs the render loop until shutdown is requested or the sink quits.
    pub fn run(&mut self) {
        let mut next_tick = Instant::now() + self.interval;

        loop {
            if self.ctx.is_shutdown() {
                break;
            }
            if self.sink.should_quit() {
                debug!("sink requested quit");
                self.ctx.request_shutdown();
                break;
            }

            if let Some(frame) = self.ctx.queue.pop() {
                trace!(frame = frame.id(), bytes = frame.len(), "presenting frame");
                self.ctx.stats.record_presented();
                self.sink.present(frame);
            }

            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            }
            next_tick += self.interval;
            // A slow sink can fall multiple ticks behind; realign instead
            // of bursting to catch up.
            if next_tick < Instant::now() {
                next_tick = Instant::now() + self.interval;
            }
        }
    }
}
