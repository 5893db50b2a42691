//! Tracing subscriber setup.

/// Initializes the tracing subscriber for the player binary and tests.
///
/// The filter defaults to `mjrx=info` and can be overridden via `RUST_LOG`.
/// Thread names are included so the rx and render loops are easy to tell
/// apart in interleaved output.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mjrx=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .init();
}
