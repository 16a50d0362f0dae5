// crates/playout-media/src/lib.rs
//
// I/O and process edges: everything playout-core's traits need a real
// implementation of — ffprobe, file/HTTP playlist loading, folder
// watching, the decoder→encoder pipe pump, SMTP/log sinks, and signal
// wiring.

pub mod ffprobe;
pub mod file_lister;
pub mod log_sink;
pub mod mail;
pub mod playlist_source;
pub mod pump;
pub mod signals;
pub mod watcher;

pub use ffprobe::CommandProber;
pub use file_lister::WalkDirLister;
pub use pump::{Pump, PumpEvent};
