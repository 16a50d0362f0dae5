// crates/playout-media/src/ffprobe.rs
//
// `Prober` backed by an external `ffprobe` subprocess. A failed spawn or a
// non-zero exit yields `ProbedSource::none()` — probe failure is reported
// upstream by the caller, never turned into a panic here.

use std::process::Command;

use playout_core::probe::{AudioStream, FieldOrder, Format, Prober, ProbedSource, VideoStream};
use serde::Deserialize;

pub struct CommandProber {
    pub ffprobe_bin: String,
}

impl Default for CommandProber {
    fn default() -> Self {
        Self { ffprobe_bin: "ffprobe".to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    /// The real/container frame rate, as opposed to `avg_frame_rate`'s
    /// encoder-reported average — spec's fps derivation reads this field.
    #[serde(default)]
    r_frame_rate: Option<String>,
    #[serde(default)]
    field_order: Option<String>,
    #[serde(default)]
    channels: Option<u32>,
    #[serde(default)]
    sample_rate: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default)]
    format: Option<RawFormat>,
    #[serde(default)]
    streams: Vec<RawStream>,
}

fn parse_frame_rate(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().unwrap_or(0.0);
        let den: f64 = den.parse().unwrap_or(1.0);
        if den != 0.0 {
            return num / den;
        }
    }
    s.parse().unwrap_or(0.0)
}

fn parse_field_order(s: Option<&str>) -> FieldOrder {
    match s {
        Some("tt") | Some("tb") => FieldOrder::Tff,
        Some("bb") | Some("bt") => FieldOrder::Bff,
        Some("progressive") => FieldOrder::Progressive,
        _ => FieldOrder::Unknown,
    }
}

impl CommandProber {
    fn run(&self, args: &[&str]) -> Option<String> {
        let output = Command::new(&self.ffprobe_bin).args(args).output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok()
    }
}

impl Prober for CommandProber {
    fn probe(&self, src: &str) -> ProbedSource {
        let stdout = match self.run(&[
            "-v", "quiet",
            "-print_format", "json",
            "-show_format", "-show_streams",
            src,
        ]) {
            Some(s) => s,
            None => return ProbedSource::none(),
        };

        let raw: RawProbe = match serde_json::from_str(&stdout) {
            Ok(r) => r,
            Err(_) => return ProbedSource::none(),
        };

        let duration = raw
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let video = raw.streams.iter().find(|s| s.codec_type == "video").and_then(|s| {
            let width = s.width?;
            let height = s.height?;
            let fps = s.r_frame_rate.as_deref().map(parse_frame_rate).unwrap_or(0.0);
            let stream_duration = s.duration.as_ref().and_then(|d| d.parse::<f64>().ok()).unwrap_or(duration);
            Some(VideoStream {
                width,
                height,
                fps,
                field_order: parse_field_order(s.field_order.as_deref()),
                duration: stream_duration,
            })
        });

        let audio = raw.streams.iter().find(|s| s.codec_type == "audio").and_then(|s| {
            let sample_rate = s.sample_rate.as_ref().and_then(|r| r.parse::<u32>().ok())?;
            Some(AudioStream { channels: s.channels.unwrap_or(2), sample_rate })
        });

        let aspect = video.as_ref().map(|v| v.width as f64 / v.height.max(1) as f64);

        ProbedSource { format: Some(Format { duration }), video, audio, aspect }
    }

    fn probe_duration_only(&self, src: &str) -> Option<f64> {
        let stdout = self.run(&[
            "-v", "quiet",
            "-show_entries", "format=duration",
            "-of", "default=noprint_wrappers=1:nokey=1",
            src,
        ])?;
        stdout.trim().parse::<f64>().ok()
    }
}
