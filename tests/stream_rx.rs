//! End-to-end tests for the receive pipeline.
//!
//! These drive the complete flow over real loopback UDP:
//! 1. A player binds an ephemeral port and spawns its rx/render threads.
//! 2. A plain `std::net::UdpSocket` plays the sending encoder, fragmenting
//!    JPEG bodies into wire datagrams.
//! 3. The collecting sink and the stream counters are polled with a
//!    deadline until the expected frames surface.
//!
//! Run with `RUST_LOG=mjrx=trace cargo test -- --nocapture` for full
//! per-fragment output.

use std::net::UdpSocket;
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use mjrx::config::PlayerConfig;
use mjrx::frame::Frame;
use mjrx::protocol::datagram::{WireConfig, HEADER_LEN};
use mjrx::runtime::Player;
use mjrx::sink::FrameSink;

static INIT_TRACING: Once = Once::new();

fn init_test_tracing() {
    INIT_TRACING.call_once(mjrx::init_tracing);
}

/// Sink that stores every presented frame for later assertions.
#[derive(Clone, Default)]
struct CollectingSink {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl FrameSink for CollectingSink {
    fn present(&mut self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }
}

impl CollectingSink {
    fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

/// A JPEG-shaped body of `len` bytes: SOI at the front, EOI at the back.
fn fake_jpeg(len: usize) -> Vec<u8> {
    assert!(len >= 4);
    let mut body: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    body[0] = 0xFF;
    body[1] = 0xD8;
    body[len - 2] = 0xFF;
    body[len - 1] = 0xD9;
    body
}

/// Fragments `body` into wire datagrams for `frame_id`.
fn fragment(wire: WireConfig, frame_id: u16, body: &[u8]) -> Vec<Vec<u8>> {
    let chunks: Vec<&[u8]> = body.chunks(wire.payload_size).collect();
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut buf = vec![0u8; wire.packet_size()];
            buf[0..2].copy_from_slice(&(chunk.len() as u16).to_be_bytes());
            buf[2..4].copy_from_slice(&frame_id.to_be_bytes());
            buf[4..6].copy_from_slice(&(index as u16).to_be_bytes());
            buf[6] = u8::from(index == chunks.len() - 1);
            buf[HEADER_LEN..HEADER_LEN + chunk.len()].copy_from_slice(chunk);
            buf
        })
        .collect()
}

/// Polls `done` every few milliseconds until it returns true or the
/// deadline passes.
fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

fn test_config() -> PlayerConfig {
    let mut config = PlayerConfig::default();
    config.listen = "127.0.0.1:0".parse().unwrap();
    config.queue_capacity = 8;
    config.max_fps = 500; // drain fast so the tests don't dawdle
    config
}

#[test]
fn reassembles_a_fragmented_stream_end_to_end() {
    init_test_tracing();
    let config = test_config();
    let wire = config.wire;

    let sink = CollectingSink::default();
    let frames = Arc::clone(&sink.frames);
    let player = Player::spawn(config, Box::new(sink)).expect("spawn player");
    let dest = player.local_addr();

    let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");
    let first = fake_jpeg(3200); // 3 fragments: 1300, 1300, 600
    let second = fake_jpeg(20_000); // forces in-flight buffer growth
    for (frame_id, body) in [(1u16, &first), (2u16, &second)] {
        for dgram in fragment(wire, frame_id, body) {
            sender.send_to(&dgram, dest).expect("send fragment");
        }
    }

    assert!(
        wait_until(Duration::from_secs(5), || frames.lock().unwrap().len() == 2),
        "expected 2 presented frames"
    );

    let presented = frames.lock().unwrap();
    assert_eq!(presented[0].id(), 1);
    assert_eq!(presented[0].as_bytes(), &first[..]);
    assert_eq!(presented[1].id(), 2);
    assert_eq!(presented[1].as_bytes(), &second[..]);
    drop(presented);

    let snap = player.context().stats.snapshot();
    assert_eq!(snap.frames_completed, 2);
    assert_eq!(snap.datagrams_rejected, 0);
    assert_eq!(snap.fragments_accepted, snap.datagrams_total);

    player.shutdown();
}

#[test]
fn lossy_and_malformed_input_is_counted_not_fatal() {
    init_test_tracing();
    let config = test_config();
    let wire = config.wire;

    let sink = CollectingSink::default();
    let counter = sink.clone();
    let player = Player::spawn(config, Box::new(sink)).expect("spawn player");
    let dest = player.local_addr();
    let ctx = Arc::clone(player.context());

    let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");

    // A runt datagram: wrong size, rejected outright.
    sender.send_to(b"not a packet", dest).expect("send runt");

    // Frame 1 loses its middle fragment; no frame may surface for it.
    let lossy = fake_jpeg(3200);
    let lossy_frags = fragment(wire, 1, &lossy);
    sender.send_to(&lossy_frags[0], dest).expect("send");
    sender.send_to(&lossy_frags[2], dest).expect("send");

    // Frame 2 is clean and must be unaffected by the preceding discard.
    let clean = fake_jpeg(2000); // 2 fragments: 1300, 700
    for dgram in fragment(wire, 2, &clean) {
        sender.send_to(&dgram, dest).expect("send");
    }

    assert!(
        wait_until(Duration::from_secs(5), || counter.count() == 1),
        "expected exactly the clean frame"
    );
    let presented = counter.frames.lock().unwrap();
    assert_eq!(presented[0].id(), 2);
    assert_eq!(presented[0].as_bytes(), &clean[..]);
    drop(presented);

    assert!(wait_until(Duration::from_secs(2), || {
        let snap = ctx.stats.snapshot();
        snap.datagrams_total == 5 && snap.frames_discarded == 1
    }));
    let snap = ctx.stats.snapshot();
    assert_eq!(snap.datagrams_rejected, 1);
    assert_eq!(snap.frames_completed, 1);

    let drops = ctx.stats.drops_snapshot();
    let count = |key: &str| {
        drops
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    };
    assert_eq!(count("bad_length"), 1);
    assert_eq!(count("missing_fragments"), 1);

    player.shutdown();
}

#[test]
fn slow_consumer_drops_oldest_frames_not_the_producer() {
    init_test_tracing();
    let mut config = test_config();
    config.queue_capacity = 3;
    config.max_fps = 1; // first render tick is a full second away
    let wire = config.wire;

    let player =
        Player::spawn(config, Box::new(CollectingSink::default())).expect("spawn player");
    let dest = player.local_addr();
    let ctx = Arc::clone(player.context());

    let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");
    let body = fake_jpeg(600);
    for id in 0..10u16 {
        for dgram in fragment(wire, id, &body) {
            sender.send_to(&dgram, dest).expect("send");
        }
    }

    // Every completed frame ends up in exactly one place: still queued,
    // already presented, or evicted under pressure.
    assert!(
        wait_until(Duration::from_secs(5), || {
            let snap = ctx.stats.snapshot();
            snap.frames_completed == 10
                && snap.frames_presented + snap.frames_evicted + ctx.queue.len() as u64 == 10
        }),
        "burst never settled: {:?}",
        ctx.stats.snapshot()
    );
    let snap = ctx.stats.snapshot();
    assert!(snap.frames_evicted >= 6, "evictions: {}", snap.frames_evicted);
    assert_eq!(snap.datagrams_rejected, 0);

    player.shutdown();
}

#[test]
fn shutdown_joins_promptly_on_a_silent_stream() {
    init_test_tracing();
    let player = Player::spawn(test_config(), Box::new(CollectingSink::default()))
        .expect("spawn player");

    // No traffic at all: the poll timeout must still let both threads
    // observe the flag.
    let started = Instant::now();
    player.shutdown();
    assert!(started.elapsed() < Duration::from_secs(2));
}
