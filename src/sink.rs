//! Display-consumer seam.
//!
//! The render thread hands each popped frame to a [`FrameSink`]; whatever
//! decodes, displays, or stores the JPEG lives behind this trait. A sink
//! that fails on one frame should log and move on: a best-effort stream
//! shows up as a frozen picture, not a dead process.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use crate::frame::Frame;

/// Consumes completed frames at the render cadence.
pub trait FrameSink: Send {
    /// Takes ownership of one frame.
    fn present(&mut self, frame: Frame);

    /// Polled once per render tick; returning `true` requests a global
    /// shutdown (the window's quit button, an escape key, ...).
    fn should_quit(&mut self) -> bool {
        false
    }
}

/// Discards every frame. Useful for soak-testing the receive path.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: Frame) {}
}

/// Writes each frame to `dir` as `frame-NNNNNN.jpg`.
///
/// The headless stand-in for a real display: point an image viewer at the
/// directory, or feed it to ffmpeg.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    written: u64,
}

impl DirSink {
    /// Creates the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for DirSink {
    fn present(&mut self, frame: Frame) {
        let path = self.dir.join(format!("frame-{:06}.jpg", self.written));
        let result = fs::File::create(&path).and_then(|mut f| f.write_all(frame.as_bytes()));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to write frame");
            }
        }
    }
}
