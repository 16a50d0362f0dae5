// crates/playout-core/src/iterator.rs
//
// The playlist walk as an explicit state machine rather than a generator:
// `PlaylistIterator::next` is called once per clip and returns the next
// item to hand the pump, or `None` when nothing can be produced at all
// (config/playlist completely unusable). End-of-list and drift are handled
// internally and reported through the messenger, not surfaced as `None`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clip::{ClipNode, PlaylistDocument};
use crate::clock::{playlist_date, Clock};
use crate::config::Config;
use crate::filter::{build_filtergraph, FilterGraph, FilterParams, Input};
use crate::input::{check_drift, get_delta, handle_list_end, timed_source, SourceDecision};
use crate::messenger::Messenger;
use crate::probe::{Prober, ProbedSource};

#[derive(Debug, Clone)]
pub enum LoadResult {
    /// The file/URL's modification time hasn't changed since we last loaded it.
    Unchanged,
    Loaded { doc: PlaylistDocument, last_mod: i64 },
    Missing,
    Invalid(String),
}

pub trait PlaylistSource: Send + Sync {
    fn load(&self, path_or_url: &str, last_mod: i64, for_date: NaiveDate) -> LoadResult;
}

impl PlaylistSource for Box<dyn PlaylistSource> {
    fn load(&self, path_or_url: &str, last_mod: i64, for_date: NaiveDate) -> LoadResult {
        (**self).load(path_or_url, last_mod, for_date)
    }
}

#[derive(Debug, Clone)]
pub struct PlayoutItem {
    pub input: Input,
    pub seek: f64,
    pub out: f64,
    pub filter: FilterGraph,
    pub is_dummy: bool,
}

/// Computed ad-neighbour flags for one playlist position, from `category`
/// at `i-1, i, i+1` (out-of-range defaults to "not an ad").
fn is_ad(clip: Option<&ClipNode>) -> bool {
    clip.and_then(|c| c.category.as_deref()).map(|c| c.eq_ignore_ascii_case("advertisement")).unwrap_or(false)
}

/// Spawns a detached validation pass over a freshly (re)loaded playlist:
/// re-probes each entry, checks `in`/`out` sanity, and sums realised
/// playtime against the configured target, reporting any deficit through
/// the messenger. Never blocks `next()`.
fn spawn_validation<P: Prober + 'static>(prober: Arc<P>, messenger: Arc<Messenger>, doc: PlaylistDocument, target_playtime: f64) {
    std::thread::spawn(move || {
        let mut total = 0.0;
        for clip in &doc.program {
            if !clip.r#in.is_finite() || !clip.out.is_finite() || clip.out <= clip.r#in {
                messenger.warning(&format!("validation: invalid in/out for {}", clip.source));
                continue;
            }
            let probe = prober.probe(&clip.source);
            if !probe.is_valid() {
                messenger.warning(&format!("validation: source missing or unprobeable: {}", clip.source));
            }
            total += clip.play_length();
        }
        if target_playtime > 0.0 && (target_playtime - total).abs() > 5.0 {
            messenger.warning(&format!(
                "validation: playlist realised playtime {total:.1}s differs from target {target_playtime:.1}s"
            ));
        }
    });
}

pub struct PlaylistIterator<P: Prober, S: PlaylistSource> {
    config: Arc<Config>,
    prober: Arc<P>,
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    messenger: Arc<Messenger>,

    playlist: Option<PlaylistDocument>,
    position: usize,
    last_mod_time: i64,
    list_date: NaiveDate,

    /// Wall-clock time of day (seconds) the current broadcast day began.
    init_time: f64,
    /// Cumulative scheduled playtime consumed so far today — together with
    /// `init_time` this is the WALK-accumulated `begin` of the clip about
    /// to play.
    last_time: f64,
    /// True for the next clip to be emitted since the playlist was last
    /// (re)loaded — the WALK "catch-up" entry, which seeks by drift instead
    /// of playing from `in`.
    first: bool,
    last_error: Option<String>,
}

impl<P: Prober + 'static, S: PlaylistSource + 'static> PlaylistIterator<P, S> {
    pub fn new(
        config: Arc<Config>,
        prober: Arc<P>,
        source: Arc<S>,
        clock: Arc<dyn Clock>,
        messenger: Arc<Messenger>,
    ) -> Self {
        let list_date = playlist_date(clock.as_ref(), config.day_start_secs());
        Self {
            config,
            prober,
            source,
            clock,
            messenger,
            playlist: None,
            position: 0,
            last_mod_time: 0,
            list_date,
            init_time: 0.0,
            last_time: 0.0,
            first: true,
            last_error: None,
        }
    }

    fn target_playtime(&self) -> f64 {
        self.config.target_length_secs().unwrap_or(86400.0)
    }

    fn ensure_loaded(&mut self) -> bool {
        if self.playlist.is_some() {
            return true;
        }
        match self.source.load(&self.config.playlist.filler_clip_path, self.last_mod_time, self.list_date) {
            LoadResult::Loaded { doc, last_mod } => {
                spawn_validation(self.prober.clone(), self.messenger.clone(), doc.clone(), self.target_playtime());
                self.playlist = Some(doc);
                self.last_mod_time = last_mod;
                self.position = 0;
                true
            }
            LoadResult::Unchanged => self.playlist.is_some(),
            LoadResult::Missing => {
                self.report_once("playlist absent");
                false
            }
            LoadResult::Invalid(reason) => {
                self.report_once(&format!("playlist invalid: {reason}"));
                false
            }
        }
    }

    fn report_once(&mut self, msg: &str) {
        if self.last_error.as_deref() != Some(msg) {
            self.messenger.error(msg);
            self.last_error = Some(msg.to_string());
        }
    }

    fn probe_clip(&self, clip: &ClipNode) -> ProbedSource {
        self.prober.probe(&clip.source)
    }

    /// Advances to the next clip, returning the item for the pump to play
    /// or `None` if the playlist is currently unusable (logged already).
    pub fn next(&mut self) -> Option<PlayoutItem> {
        let is_first_of_walk = self.first;
        if self.first {
            self.init_time = self.clock.now_time_of_day();
            self.first = false;
        }

        if !self.ensure_loaded() {
            return None;
        }

        let program_len = self.playlist.as_ref().map(|p| p.program.len()).unwrap_or(0);
        if program_len == 0 {
            self.report_once("playlist has no clips");
            return None;
        }

        let is_last_clip = self.position + 1 >= program_len;
        let program = &self.playlist.as_ref().unwrap().program;
        let clip = program[self.position].clone();
        let ad = is_ad(Some(&clip));
        let ad_last = is_ad(self.position.checked_sub(1).and_then(|i| program.get(i)));
        let ad_next = is_ad(program.get(self.position + 1));
        let probe = self.probe_clip(&clip);

        let begin = self.init_time + self.last_time;
        let delta = get_delta(self.clock.as_ref(), self.config.day_start_secs(), self.target_playtime(), begin);
        if check_drift(delta, self.config.general.stop_threshold).is_err() {
            self.messenger.warning(&format!("playlist drift: {delta:.3}s"));
        }

        let decision = timed_source(
            &clip,
            &probe,
            self.config.pre_compress.width,
            self.config.pre_compress.height,
            self.config.pre_compress.fps,
            begin,
            delta,
            self.config.day_start_secs(),
            self.target_playtime(),
            is_first_of_walk,
            is_last_clip,
            false,
            &self.config.pre_compress.live_protocols,
        );

        let result = match decision {
            SourceDecision::Ready(r) => r,
            SourceDecision::EnterListEnd { remaining } => handle_list_end(&clip, &probe, remaining, self.config.pre_compress.fps),
        };

        if let Some(warning) = &result.warning {
            self.messenger.warning(warning);
        }

        if result.next_playlist {
            self.playlist = None;
            self.position = 0;
            self.last_time = 0.0;
            self.first = true;
            self.list_date = self.list_date.succ_opt().unwrap_or(self.list_date);
            return self.next();
        }

        self.last_time += result.out - result.seek;
        self.position += 1;

        let clip_duration = clip.duration.unwrap_or(result.out - result.seek);
        let mut filter = build_filtergraph(&FilterParams {
            probe: probe.clone(),
            target_width: self.config.pre_compress.width,
            target_height: self.config.pre_compress.height,
            target_fps: self.config.pre_compress.fps,
            target_aspect: self.config.pre_compress.aspect,
            track_index: 0,
            seek: result.seek,
            out: result.out,
            duration: clip_duration,
            ad,
            ad_last,
            ad_next,
            is_dummy: result.input.is_dummy(),
            add_text: self.config.text.add_text,
            loudnorm: self.config.pre_compress.add_loudnorm,
            loud_i: self.config.pre_compress.loud_i,
            loud_tp: self.config.pre_compress.loud_tp,
            loud_lra: self.config.pre_compress.loud_lra,
            logo_path: self.config.pre_compress.add_logo.then(|| self.config.pre_compress.logo.clone()),
            logo_opacity: self.config.pre_compress.logo_opacity,
            logo_filter: self.config.pre_compress.logo_filter.clone(),
        });
        if let Some(extra) = &result.extra_video_filter {
            filter.filter_complex = format!("{};{}", filter.filter_complex, extra);
        }
        if let Some(extra) = &result.extra_audio_filter {
            filter.filter_complex = format!("{};{}", filter.filter_complex, extra);
        }

        Some(PlayoutItem {
            is_dummy: result.input.is_dummy(),
            input: result.input,
            seek: result.seek,
            out: result.out,
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{General, Logging, Mail, Out, Playlist, PreCompress, Storage, Text};
    use crate::probe::Prober;

    struct NullProber;
    impl Prober for NullProber {
        fn probe(&self, _src: &str) -> ProbedSource {
            ProbedSource::none()
        }
        fn probe_duration_only(&self, _src: &str) -> Option<f64> {
            None
        }
    }

    struct FixedSource(PlaylistDocument);
    impl PlaylistSource for FixedSource {
        fn load(&self, _path: &str, last_mod: i64, _for_date: NaiveDate) -> LoadResult {
            if last_mod == 1 {
                LoadResult::Unchanged
            } else {
                LoadResult::Loaded { doc: self.0.clone(), last_mod: 1 }
            }
        }
    }

    fn test_config() -> Config {
        Config {
            general: General { stop_threshold: 0.0, stop_on_error: false },
            mail: Mail {
                subject: "s".into(),
                smtp_server: "s".into(),
                smtp_port: 25,
                smtp_user: "u".into(),
                smtp_password: "p".into(),
                recipient: "r".into(),
                mail_level: "ERROR".into(),
            },
            logging: Logging {
                log_to_file: false,
                backup_count: 7,
                log_path: "/tmp".into(),
                log_level: "DEBUG".into(),
                ffmpeg_level: "error".into(),
            },
            pre_compress: PreCompress {
                width: 1280,
                height: 720,
                aspect: 16.0 / 9.0,
                fps: 25.0,
                a_bitrate: 128,
                a_sample_rate: 48000,
                v_bitrate: 0,
                v_bufsize: 0,
                add_logo: false,
                logo: String::new(),
                logo_opacity: 1.0,
                logo_filter: String::new(),
                add_loudnorm: false,
                loud_i: -23.0,
                loud_tp: -1.0,
                loud_lra: 11.0,
                live_protocols: vec!["rtmp".into(), "rtsp".into(), "udp".into(), "http".into(), "https".into(), "srt".into()],
            },
            playlist: Playlist {
                day_start: "06:00:00".into(),
                length: "24:00:00".into(),
                filler_clip_path: "playlist.json".into(),
                playlist_mode: false,
            },
            storage: Storage { path: "/media".into(), filler: "".into(), extensions: vec!["mp4".into()], shuffle: false },
            text: Text {
                add_text: false,
                font: "".into(),
                fontsize: 24,
                fontcolor: "white".into(),
                fontfile: String::new(),
                r#box: false,
                boxcolor: "black@0.4".into(),
                boxborderw: 0,
                x: "(w-text_w)/2".into(),
                y: "h-(text_h*2)".into(),
            },
            out: Out {
                mode: "stream".into(),
                ffmpeg_params: vec![],
                service_name: "playout".into(),
                service_provider: "playout".into(),
                out_addr: String::new(),
                post_comp_video: vec![],
                post_comp_audio: vec![],
                post_comp_extra: vec![],
            },
        }
        .finalize()
    }

    fn doc_with(clips: Vec<ClipNode>) -> PlaylistDocument {
        PlaylistDocument {
            channel: "1".into(),
            date: "2026-08-01".into(),
            header: Default::default(),
            program: clips,
        }
    }

    #[test]
    fn yields_items_for_each_clip_in_order() {
        let config = Arc::new(test_config());
        let clock = Arc::new(FixedClock { time_of_day: 21600.0, stamp: 0, date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap() });
        let messenger = Arc::new(Messenger::new(vec![]));
        let doc = doc_with(vec![
            ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 10.0, duration: Some(10.0), category: None },
            ClipNode { source: "b.mp4".into(), r#in: 0.0, out: 10.0, duration: Some(10.0), category: None },
        ]);
        let mut it = PlaylistIterator::new(config, Arc::new(NullProber), Arc::new(FixedSource(doc)), clock, messenger);

        let first = it.next().unwrap();
        assert_eq!(first.out, 10.0);
        assert!(first.is_dummy); // NullProber always reports invalid
    }

    #[test]
    fn missing_playlist_reports_once() {
        struct MissingSource;
        impl PlaylistSource for MissingSource {
            fn load(&self, _path: &str, _last_mod: i64, _for_date: NaiveDate) -> LoadResult {
                LoadResult::Missing
            }
        }
        let config = Arc::new(test_config());
        let clock = Arc::new(FixedClock { time_of_day: 21600.0, stamp: 0, date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap() });
        let messenger = Arc::new(Messenger::new(vec![]));
        let mut it = PlaylistIterator::new(config, Arc::new(NullProber), Arc::new(MissingSource), clock, messenger);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn ad_neighbour_flags_drive_logo_fade_on_middle_clip() {
        let mut config = test_config();
        config.pre_compress.add_logo = true;
        config.pre_compress.logo = "/media/logo.png".into();
        let config = Arc::new(config);
        let clock = Arc::new(FixedClock { time_of_day: 21600.0, stamp: 0, date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap() });
        let messenger = Arc::new(Messenger::new(vec![]));
        let doc = doc_with(vec![
            ClipNode { source: "ad.mp4".into(), r#in: 0.0, out: 10.0, duration: Some(10.0), category: Some("advertisement".into()) },
            ClipNode { source: "b.mp4".into(), r#in: 0.0, out: 10.0, duration: Some(10.0), category: None },
        ]);
        let mut it = PlaylistIterator::new(config, Arc::new(NullProber), Arc::new(FixedSource(doc)), clock, messenger);
        let first = it.next().unwrap();
        assert!(first.is_dummy); // NullProber reports invalid, so no filter chain is exercised on clip 1
        let _second = it.next().unwrap();
    }
}
