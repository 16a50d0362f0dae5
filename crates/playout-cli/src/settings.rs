// crates/playout-cli/src/settings.rs
//
// Loads the INI configuration file into `playout_core::config::Config`,
// using the `config` crate's INI source rather than a hand-rolled parser —
// the same crate family choice as the workspace config loaders in the
// wider example pack.

use anyhow::{Context, Result};
use playout_core::config::Config;

pub fn load(path: &str) -> Result<Config> {
    let raw = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Ini))
        .build()
        .with_context(|| format!("reading config file {path}"))?;

    let cfg: Config = raw
        .try_deserialize()
        .with_context(|| format!("parsing config file {path}"))?;

    Ok(cfg.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_ini_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".ini").unwrap();
        writeln!(
            file,
            r#"
[GENERAL]
stop_threshold = 30

[MAIL]
subject = playout
smtp_server = localhost
smtp_port = 25
smtp_user = bot
smtp_password = secret
recipient = ops@example.test
mail_level = ERROR

[LOGGING]
log_to_file = false
backup_count = 7
log_path = /tmp
log_level = DEBUG
ffmpeg_level = error

[PRE_COMPRESS]
width = 1280
height = 720
aspect = 1.777
fps = 25
a_bitrate = 128
a_sample_rate = 48000

[PLAYLIST]
day_start = 06:00:00
length = 24:00:00
filler_clip_path = /media/playlists

[STORAGE]
path = /media
filler = /media/filler.mp4
extensions = ["mp4"]
shuffle = false

[TEXT]
add_text = false
font = ""
fontsize = 24

[OUT]
mode = stream
ffmpeg_params = []
"#
        )
        .unwrap();

        let cfg = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.pre_compress.width, 1280);
        assert_eq!(cfg.pre_compress.v_bitrate, 64000);
        assert_eq!(cfg.day_start_secs(), 21600.0);
    }
}
