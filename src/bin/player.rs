//! Headless MJPEG stream player.
//!
//! Binds a UDP socket, reassembles the incoming fragment stream, and hands
//! frames to a sink at a capped rate. Without `--dump` the frames are
//! discarded after accounting, which makes the binary a receive-path soak
//! tool; with `--dump DIR` every presented frame lands in DIR as a JPEG.
//!
//! # Usage
//!
//! ```sh
//! mjrx-player --listen 0.0.0.0:57956 --fps 60 --dump /tmp/frames
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use tracing::info;

use mjrx::config::PlayerConfig;
use mjrx::runtime::{Player, PlayerError};
use mjrx::sink::{DirSink, FrameSink, NullSink};

/// Interval between stats lines (the on-screen overlay's stand-in).
const STATS_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    mjrx::init_tracing();
    if let Err(e) = run() {
        eprintln!("mjrx-player: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PlayerError> {
    let args: Vec<String> = std::env::args().collect();
    let (config, dump_dir) = parse_args(&args)?;

    let sink: Box<dyn FrameSink> = match dump_dir {
        Some(dir) => Box::new(DirSink::new(dir).map_err(PlayerError::Bind)?),
        None => Box::new(NullSink),
    };

    let player = Player::spawn(config, sink)?;
    info!(listen = %player.local_addr(), "ready");

    let ctx = std::sync::Arc::clone(player.context());
    while !ctx.is_shutdown() {
        std::thread::sleep(STATS_INTERVAL);
        let snap = ctx.stats.snapshot();
        info!(
            datagrams = snap.datagrams_total,
            rejected = snap.datagrams_rejected,
            fragments = snap.fragments_accepted,
            completed = snap.frames_completed,
            discarded = snap.frames_discarded,
            evicted = snap.frames_evicted,
            presented = snap.frames_presented,
            queued = ctx.queue.len(),
            "stream stats"
        );
    }

    player.shutdown();
    Ok(())
}

fn invalid(msg: impl Into<String>) -> PlayerError {
    PlayerError::Bind(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        msg.into(),
    ))
}

fn parse_args(args: &[String]) -> Result<(PlayerConfig, Option<String>), PlayerError> {
    let mut config = PlayerConfig::default();
    let mut dump_dir: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--listen" | "-l" => {
                let value = take_value(args, &mut i)?;
                let addr: SocketAddr = value
                    .parse()
                    .map_err(|e| invalid(format!("bad --listen address: {e}")))?;
                config.listen = addr;
            }
            "--fps" => {
                config.max_fps = take_value(args, &mut i)?
                    .parse()
                    .map_err(|e| invalid(format!("bad --fps value: {e}")))?;
            }
            "--queue" => {
                config.queue_capacity = take_value(args, &mut i)?
                    .parse()
                    .map_err(|e| invalid(format!("bad --queue value: {e}")))?;
            }
            "--payload" => {
                config.wire.payload_size = take_value(args, &mut i)?
                    .parse()
                    .map_err(|e| invalid(format!("bad --payload value: {e}")))?;
            }
            "--buffer" => {
                config.initial_buffer_bytes = take_value(args, &mut i)?
                    .parse()
                    .map_err(|e| invalid(format!("bad --buffer value: {e}")))?;
            }
            "--recv-buffer" => {
                let size = take_value(args, &mut i)?
                    .parse()
                    .map_err(|e| invalid(format!("bad --recv-buffer value: {e}")))?;
                config.recv_buffer_bytes = Some(size);
            }
            "--dump" | "-d" => {
                dump_dir = Some(take_value(args, &mut i)?.to_string());
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            arg => return Err(invalid(format!("unknown argument: {arg}"))),
        }
        i += 1;
    }

    Ok((config, dump_dir))
}

fn take_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, PlayerError> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| invalid(format!("missing value for {flag}")))
}

fn print_usage() {
    eprintln!(
        r#"mjrx-player - headless Motion-JPEG stream receiver

USAGE:
    mjrx-player [OPTIONS]

OPTIONS:
    -l, --listen <ADDR>      Bind address (default: 0.0.0.0:57956)
        --fps <N>            Presentation rate cap (default: 60)
        --queue <N>          Frame queue capacity (default: 5)
        --payload <BYTES>    Fragment payload size (default: 1300)
        --buffer <BYTES>     Initial reassembly buffer (default: 10000)
        --recv-buffer <B>    Kernel socket receive buffer size
    -d, --dump <DIR>         Write presented frames to DIR as JPEGs
    -h, --help               Print this help message

Counters are logged once per second; set RUST_LOG=mjrx=trace for
per-frame detail.

EXAMPLE:
    mjrx-player --listen 0.0.0.0:57956 --dump /tmp/frames
"#
    );
}
