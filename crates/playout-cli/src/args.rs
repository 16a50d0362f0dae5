// crates/playout-cli/src/args.rs
//
// CLI flags, matching the engine's external interface: configuration file,
// an optional desktop/preview output mode, folder-source override, log
// options, loop mode, an explicit playlist path, and a start-at time.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "playout", about = "Continuous linear playout engine")]
pub struct Args {
    /// Path to the INI configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: String,

    /// Preview output on the desktop instead of streaming, for local testing.
    #[arg(short = 'd', long = "desktop")]
    pub desktop: bool,

    /// Override the configured storage path with a folder-mode source.
    #[arg(short = 'f', long = "folder")]
    pub folder: Option<String>,

    /// Write logs to the configured log file instead of stderr.
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    /// Loop the folder source instead of walking a JSON playlist.
    #[arg(long = "loop")]
    pub loop_mode: bool,

    /// Explicit playlist JSON path, overriding the date-derived path.
    #[arg(short = 'p', long = "playlist")]
    pub playlist: Option<String>,

    /// Start the broadcast day at this time of day ("HH:MM:SS") instead of
    /// the configured `day_start`.
    #[arg(short = 's', long = "start")]
    pub start: Option<String>,
}
