// crates/playout-core/src/config.rs
//
// Typed configuration model. Mirrors the INI sections loaded by
// playout-cli::settings; derived fields (bitrate/bufsize) are computed once
// in `Config::finalize` rather than recomputed on every access.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
    /// When true, a fatal pump error (drift, broken pipe, missing source)
    /// terminates the process instead of logging and retrying.
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_stop_threshold() -> f64 {
    30.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mail {
    pub subject: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub recipient: String,
    pub mail_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub log_to_file: bool,
    pub backup_count: u32,
    pub log_path: String,
    pub log_level: String,
    pub ffmpeg_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreCompress {
    pub width: u32,
    pub height: u32,
    pub aspect: f64,
    pub fps: f64,
    pub a_bitrate: u32,
    pub a_sample_rate: u32,
    #[serde(default)]
    pub v_bitrate: u32,
    #[serde(default)]
    pub v_bufsize: u32,

    /// Logo overlay (spec §4.3 "Logo overlay").
    #[serde(default)]
    pub add_logo: bool,
    #[serde(default)]
    pub logo: String,
    #[serde(default = "default_logo_opacity")]
    pub logo_opacity: f64,
    /// Extra filter expression appended after the logo is scaled/positioned
    /// (e.g. a fixed `overlay=W-w-10:10` placement), kept as a raw string
    /// since its shape is entirely site-specific.
    #[serde(default)]
    pub logo_filter: String,

    /// Loudness normalisation (spec §4.3 rule, `add_loudnorm`).
    #[serde(default)]
    pub add_loudnorm: bool,
    #[serde(default = "default_loud_i")]
    pub loud_i: f64,
    #[serde(default = "default_loud_tp")]
    pub loud_tp: f64,
    #[serde(default = "default_loud_lra")]
    pub loud_lra: f64,

    /// URL schemes treated as live/unseekable sources.
    #[serde(default = "default_live_protocols")]
    pub live_protocols: Vec<String>,
}

fn default_logo_opacity() -> f64 {
    1.0
}
fn default_loud_i() -> f64 {
    -23.0
}
fn default_loud_tp() -> f64 {
    -1.0
}
fn default_loud_lra() -> f64 {
    11.0
}
fn default_live_protocols() -> Vec<String> {
    vec!["rtmp".into(), "rtsp".into(), "udp".into(), "http".into(), "https".into(), "srt".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub day_start: String,
    pub length: String,
    pub filler_clip_path: String,
    /// When true, a missing/invalid playlist falls back to folder mode
    /// instead of stalling on a dummy source.
    #[serde(default)]
    pub playlist_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub path: String,
    pub filler: String,
    pub extensions: Vec<String>,
    pub shuffle: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Text {
    pub add_text: bool,
    pub font: String,
    pub fontsize: u32,
    #[serde(default = "default_fontcolor")]
    pub fontcolor: String,
    #[serde(default)]
    pub fontfile: String,
    #[serde(default)]
    pub r#box: bool,
    #[serde(default = "default_boxcolor")]
    pub boxcolor: String,
    #[serde(default)]
    pub boxborderw: u32,
    #[serde(default = "default_text_x")]
    pub x: String,
    #[serde(default = "default_text_y")]
    pub y: String,
}

fn default_fontcolor() -> String {
    "white".to_string()
}
fn default_boxcolor() -> String {
    "black@0.4".to_string()
}
fn default_text_x() -> String {
    "(w-text_w)/2".to_string()
}
fn default_text_y() -> String {
    "h-(text_h*2)".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Out {
    pub mode: String,
    pub ffmpeg_params: Vec<String>,

    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_provider")]
    pub service_provider: String,
    /// Final output destination (stream URL or file path), distinct from
    /// the intermediate mpeg-ts transport the pump builds internally.
    #[serde(default)]
    pub out_addr: String,

    /// Post-compression (final output) encode settings, separate from the
    /// intermediate per-clip transport built in `playout-media::pump`.
    #[serde(default = "default_post_comp_video")]
    pub post_comp_video: Vec<String>,
    #[serde(default = "default_post_comp_audio")]
    pub post_comp_audio: Vec<String>,
    #[serde(default)]
    pub post_comp_extra: Vec<String>,
}

fn default_service_name() -> String {
    "playout".to_string()
}
fn default_service_provider() -> String {
    "playout".to_string()
}
fn default_post_comp_video() -> Vec<String> {
    vec!["-c:v".into(), "libx264".into(), "-preset".into(), "veryfast".into()]
}
fn default_post_comp_audio() -> Vec<String> {
    vec!["-c:a".into(), "aac".into(), "-b:a".into(), "128k".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "GENERAL")]
    pub general: General,
    #[serde(rename = "MAIL")]
    pub mail: Mail,
    #[serde(rename = "LOGGING")]
    pub logging: Logging,
    #[serde(rename = "PRE_COMPRESS")]
    pub pre_compress: PreCompress,
    #[serde(rename = "PLAYLIST")]
    pub playlist: Playlist,
    #[serde(rename = "STORAGE")]
    pub storage: Storage,
    #[serde(rename = "TEXT")]
    pub text: Text,
    #[serde(rename = "OUT")]
    pub out: Out,
}

impl Config {
    /// Parses `day_start`/`length` ("HH:MM:SS") into seconds and derives
    /// bitrate/bufsize, matching `load_config()`'s post-processing.
    pub fn finalize(mut self) -> Self {
        self.pre_compress.v_bitrate = self.pre_compress.width * 50;
        self.pre_compress.v_bufsize = self.pre_compress.v_bitrate / 2;
        self
    }

    pub fn day_start_secs(&self) -> f64 {
        parse_hms(&self.playlist.day_start).unwrap_or(0.0)
    }

    pub fn target_length_secs(&self) -> Option<f64> {
        parse_hms(&self.playlist.length)
    }
}

/// Parses `"HH:MM:SS"` (or `"HH:MM:SS.fff"`) into seconds past midnight.
pub fn parse_hms(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h: f64 = parts[0].parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let sec: f64 = parts[2].parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + sec)
}
