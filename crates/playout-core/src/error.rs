// crates/playout-core/src/error.rs
//
// Typed error taxonomy for the playout engine. Each variant corresponds to a
// condition the engine must react to differently (log-and-continue vs.
// terminate), so callers match on the variant rather than inspecting strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayoutError {
    #[error("config error: {0}")]
    Config(String),

    #[error("probe failed for {src}: {reason}")]
    ProbeFailure { src: String, reason: String },

    #[error("source missing: {0}")]
    SourceMissing(String),

    #[error("playlist absent: {0}")]
    PlaylistAbsent(String),

    #[error("playlist invalid: {0}")]
    PlaylistInvalid(String),

    #[error("playlist too short: needs {needed:.1}s more to reach target length")]
    PlaylistTooShort { needed: f64 },

    #[error("drift exceeded threshold: {delta:.3}s")]
    Drift { delta: f64 },

    #[error("broken pipe writing to encoder")]
    BrokenPipe,

    #[error("terminated by signal")]
    SignalTermination,
}

pub type Result<T> = std::result::Result<T, PlayoutError>;
