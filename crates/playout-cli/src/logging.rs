// crates/playout-cli/src/logging.rs
//
// Wires up a `tracing` subscriber: a daily-rotating non-blocking file
// writer when `LOGGING.log_to_file` is set, stderr otherwise, with the
// level taken from `LOGGING.log_level`. `log` macros used by
// `playout_media::log_sink::LogSink` are bridged in through `tracing_log`
// so the two logging surfaces the workspace carries end up on one
// subscriber.

use playout_core::config::Logging;
use tracing_subscriber::EnvFilter;

pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

pub fn init(cfg: &Logging) -> LoggingGuard {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_new(cfg.log_level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"));

    if cfg.log_to_file {
        let appender = tracing_appender::rolling::daily(&cfg.log_path, "playout.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
        LoggingGuard { _file_guard: Some(guard) }
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        LoggingGuard { _file_guard: None }
    }
}
