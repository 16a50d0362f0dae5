// crates/playout-media/src/log_sink.rs
//
// Forwards messenger traffic into the `log` facade — one line per call,
// matching the original engine's `logger.debug/info/warning/error` calls.
// The actual subscriber (file vs. stderr, rotation, level filter) is wired
// up in playout-cli; this sink only needs to know which macro to call.

use playout_core::messenger::{Severity, Sink};

pub struct LogSink;

impl Sink for LogSink {
    fn send(&self, severity: Severity, msg: &str) {
        match severity {
            Severity::Debug => log::debug!("{msg}"),
            Severity::Info => log::info!("{msg}"),
            Severity::Warning => log::warn!("{msg}"),
            Severity::Error => log::error!("{msg}"),
        }
    }
}
