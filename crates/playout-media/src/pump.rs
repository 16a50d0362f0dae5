// crates/playout-media/src/pump.rs
//
// Process supervisor: one long-lived encoder subprocess fed, clip by clip,
// from a short-lived decoder subprocess's stdout. Mirrors the original
// engine's main loop — a single `Popen` encoder, a `Popen` decoder per
// clip, and a raw byte copy between the two — reshaped into the teacher's
// thread/channel idiom: a shutdown flag checked between chunks rather than
// a bare `while True`, and pump lifecycle events reported over a channel
// instead of printed inline.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use playout_core::error::PlayoutError;

/// Matches the original's `decoder.stdout.read(65424)` chunk size exactly —
/// not rounded to a power of two, since that was the original's own
/// deliberate figure and there's no benefit to changing it here.
pub const CHUNK_SIZE: usize = 65_424;

#[derive(Debug, Clone)]
pub enum PumpEvent {
    EncoderStarted,
    ClipStarted(String),
    ClipFinished(String),
    BrokenPipe,
    DecoderFailed { source: String, reason: String },
    EncoderExited(Option<i32>),
}

pub struct Pump {
    encoder: Child,
    shutdown: Arc<AtomicBool>,
    events: Sender<PumpEvent>,
}

impl Pump {
    pub fn spawn_encoder(argv: &[String], shutdown: Arc<AtomicBool>, events: Sender<PumpEvent>) -> std::io::Result<Self> {
        let encoder = Command::new("ffmpeg").args(argv).stdin(Stdio::piped()).spawn()?;
        let _ = events.send(PumpEvent::EncoderStarted);
        Ok(Self { encoder, shutdown, events })
    }

    /// Runs one clip: spawns the decoder with `decoder_argv`, copies its
    /// stdout into the encoder's stdin in `CHUNK_SIZE` chunks, and returns
    /// once the decoder exits or the shutdown flag is observed.
    pub fn run_clip(&mut self, label: &str, decoder_argv: &[String]) -> Result<(), PlayoutError> {
        let _ = self.events.send(PumpEvent::ClipStarted(label.to_string()));

        let mut decoder = match Command::new("ffmpeg").args(decoder_argv).stdout(Stdio::piped()).spawn() {
            Ok(c) => c,
            Err(e) => {
                let _ = self.events.send(PumpEvent::DecoderFailed { source: label.to_string(), reason: e.to_string() });
                return Ok(());
            }
        };

        let mut stdout = decoder.stdout.take().expect("decoder stdout was piped");
        let stdin = self.encoder.stdin.as_mut().expect("encoder stdin was piped");

        let result = copy_loop(&mut stdout, stdin, self.shutdown.as_ref());
        let _ = decoder.wait();
        let _ = self.events.send(PumpEvent::ClipFinished(label.to_string()));
        result
    }

    /// Closes the encoder's stdin and waits for it to exit, reporting the
    /// exit code.
    pub fn finish(mut self) -> Option<i32> {
        drop(self.encoder.stdin.take());
        let status = self.encoder.wait().ok();
        let code = status.and_then(|s| s.code());
        let _ = self.events.send(PumpEvent::EncoderExited(code));
        code
    }

}

fn copy_loop(src: &mut impl Read, dst: &mut impl Write, shutdown: &AtomicBool) -> Result<(), PlayoutError> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Err(PlayoutError::SignalTermination);
        }
        let n = match src.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(_) => return Ok(()),
        };
        if let Err(e) = dst.write_all(&buf[..n]) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Err(PlayoutError::BrokenPipe);
            }
            return Err(PlayoutError::BrokenPipe);
        }
    }
}
