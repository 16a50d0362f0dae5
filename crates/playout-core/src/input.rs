// crates/playout-core/src/input.rs
//
// Time-aligned input builder: given where we are in wall-clock time and
// where the playlist says we should be, decides what to feed the decoder
// next — the current clip trimmed to fit, a stretched clip to cover a
// short gap, or a synthetic filler/dummy to cover a longer one.

use crate::clip::ClipNode;
use crate::clock::Clock;
use crate::filter::{dummy, extend_audio, extend_video, filler, Input};
use crate::probe::ProbedSource;

#[derive(Debug, Clone)]
pub struct TimedInputResult {
    pub input: Input,
    pub seek: f64,
    pub out: f64,
    /// Set when the remaining target playtime is exhausted and the next
    /// reload should move on to the following day's playlist.
    pub next_playlist: bool,
    /// Extra filter stages (video, audio) needed to reach `out - seek`
    /// seconds of output when the source itself is shorter — used when a
    /// clip at the end of a playlist must be stretched rather than cut.
    pub extra_video_filter: Option<String>,
    pub extra_audio_filter: Option<String>,
    /// A non-fatal note (live-source seek ignored, source unavailable) to
    /// surface through the messenger, if any.
    pub warning: Option<String>,
}

/// How far the wall clock has drifted from where the playlist says we
/// should be, in seconds. Positive means we are behind schedule (the
/// current clip needs to run longer/later clips need trimming); negative
/// means we are ahead.
///
/// `begin` is the scheduled start time (seconds past midnight) of the clip
/// about to play; `day_start`/`target_playtime` describe the playlist's
/// configured day boundary and total length. A `time_delta` that lands
/// within 6 seconds of a full day is collapsed to zero — this absorbs the
/// day-start/day-end seam without treating it as drift.
pub fn get_delta(clock: &dyn Clock, day_start: f64, target_playtime: f64, begin: f64) -> f64 {
    let mut current_time = clock.now_time_of_day();
    if day_start >= current_time && begin != day_start {
        current_time += target_playtime;
    }
    let mut time_delta = begin - current_time;
    if (time_delta.abs() - target_playtime).abs() <= 6.0 {
        time_delta = 0.0;
    }
    time_delta
}

/// `stop_threshold <= 0` disables the check (matches the original: a
/// non-positive threshold means "never treat drift as fatal").
pub fn check_drift(delta: f64, stop_threshold: f64) -> Result<(), crate::error::PlayoutError> {
    if stop_threshold > 0.0 && delta.abs() > stop_threshold {
        return Err(crate::error::PlayoutError::Drift { delta });
    }
    Ok(())
}

fn is_live_source(path: &str, live_protocols: &[String]) -> bool {
    path.split_once("://")
        .map(|(scheme, _)| live_protocols.iter().any(|p| p.eq_ignore_ascii_case(scheme)))
        .unwrap_or(false)
}

/// Builds the decoder input for `(path, seek, out)`, per §4.4a:
/// - a recognised live-protocol URI seeks not at all (warns if `seek > 0`);
/// - a looped source (`out` beyond the probed duration) seeks not at all and
///   emits `-stream_loop -1` instead;
/// - otherwise a plain `-ss seek -i path -t (out-seek)`;
/// - an invalid probe falls back to a dummy of the same length.
pub fn src_or_dummy(
    probe: &ProbedSource,
    path: &str,
    seek: f64,
    out: f64,
    width: u32,
    height: u32,
    fps: f64,
    live_protocols: &[String],
) -> (Input, Option<String>) {
    let play_len = (out - seek).max(0.0);

    if is_live_source(path, live_protocols) {
        let warning = (seek > 0.0)
            .then(|| format!("live source {path}: seek unsupported, ignoring seek={seek:.3}"));
        let argv = vec!["-i".to_string(), path.to_string(), "-t".to_string(), format!("{play_len}")];
        return (Input::Real(argv), warning);
    }

    if !probe.is_valid() {
        return (dummy(play_len, width, height, fps), Some(format!("source unavailable: {path}")));
    }

    let duration = probe.duration();
    if duration > 0.0 && out > duration {
        let warning = format!("looped source {path}: seek unsupported, out {out:.3} exceeds duration {duration:.3}");
        let argv = vec![
            "-stream_loop".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            path.to_string(),
            "-t".to_string(),
            format!("{play_len}"),
        ];
        return (Input::Real(argv), Some(warning));
    }

    let argv = vec!["-ss".to_string(), format!("{seek}"), "-i".to_string(), path.to_string(), "-t".to_string(), format!("{play_len}")];
    (Input::Real(argv), None)
}

/// Decides what to play when the current clip is the last one in today's
/// playlist and `remaining` seconds are still needed to reach the target
/// playtime. Mirrors the original's banded behaviour:
///
/// - `remaining > 3.0`: plenty of room — trim the clip itself to exactly
///   `remaining` seconds and carry on.
/// - `remaining > 1.0`: too little room to cut cleanly — trim but add a
///   fade-out so the cut isn't jarring.
/// - `remaining > 0.0`: sub-second gap — stretch the clip's last frame/
///   silence to cover it rather than attempting a cut.
/// - otherwise: nothing left to fill — move on to the next playlist.
pub fn handle_list_end(clip: &ClipNode, probe: &ProbedSource, remaining: f64, fps: f64) -> TimedInputResult {
    let seek = clip.r#in;
    if remaining > 3.0 {
        TimedInputResult {
            input: Input::Real(vec!["-i".to_string(), clip.source.clone()]),
            seek,
            out: seek + remaining,
            next_playlist: false,
            extra_video_filter: None,
            extra_audio_filter: None,
            warning: None,
        }
    } else if remaining > 1.0 {
        TimedInputResult {
            input: Input::Real(vec!["-i".to_string(), clip.source.clone()]),
            seek,
            out: seek + remaining,
            next_playlist: false,
            extra_video_filter: Some(format!("fade=out:st={}:d=1.0", (remaining - 1.0).max(0.0))),
            extra_audio_filter: None,
            warning: None,
        }
    } else if remaining > 0.0 {
        let have = probe.duration() - seek;
        let gap = (remaining - have).max(0.0);
        TimedInputResult {
            input: Input::Real(vec!["-i".to_string(), clip.source.clone()]),
            seek,
            out: seek + remaining,
            next_playlist: false,
            extra_video_filter: Some(extend_video(gap)),
            extra_audio_filter: Some(extend_audio(remaining)),
            warning: None,
        }
    } else {
        TimedInputResult {
            input: Input::Real(vec![]),
            seek,
            out: seek,
            next_playlist: true,
            extra_video_filter: None,
            extra_audio_filter: None,
            warning: None,
        }
    }
}

/// The outcome of dispatching §4.4's first three cases: either a ready
/// result for the pump, or a signal that case 4 (crossing the window end,
/// or this being the playlist's last entry) applies and the caller must
/// run the list-end handler with the given `remaining` seconds.
#[derive(Debug, Clone)]
pub enum SourceDecision {
    Ready(TimedInputResult),
    EnterListEnd { remaining: f64 },
}

/// The full §4.4 dispatch, given the clip's scheduled `begin` (seconds past
/// midnight), the already-computed drift `delta`, the playlist's day
/// boundary and target length, and whether this is the first clip played
/// since the playlist was (re)loaded or the last entry in the program.
///
/// - **First clip**: seeks by `|delta|`, clamped to 0 when under a second —
///   this is the tardy-start compensation (a 12s-late start seeks 12s in).
/// - **Within window**: `begin + out + delta` stays inside today's window
///   and this isn't the last entry (or the playlist has no configured
///   length, or it is looping) — play `[in, out)` unchanged.
/// - **Past window start**: the schedule has already moved beyond this
///   clip's slot entirely — skip it, signalling the next playlist.
/// - **Crossing window end**: everything else — defers to the list-end
///   handler via [`SourceDecision::EnterListEnd`].
#[allow(clippy::too_many_arguments)]
pub fn timed_source(
    clip: &ClipNode,
    probe: &ProbedSource,
    width: u32,
    height: u32,
    fps: f64,
    begin: f64,
    delta: f64,
    day_start: f64,
    target_playtime: f64,
    first: bool,
    last: bool,
    looping: bool,
    live_protocols: &[String],
) -> SourceDecision {
    let window_end = day_start + target_playtime;

    if first {
        let seek = if delta.abs() < 1.0 { 0.0 } else { delta.abs() };
        let (input, warning) = src_or_dummy(probe, &clip.source, seek, clip.out, width, height, fps, live_protocols);
        return SourceDecision::Ready(TimedInputResult {
            input,
            seek,
            out: clip.out,
            next_playlist: false,
            extra_video_filter: None,
            extra_audio_filter: None,
            warning,
        });
    }

    let within_window = (begin + clip.out + delta < window_end && !last) || target_playtime <= 0.0 || looping;
    if within_window {
        let (input, warning) = src_or_dummy(probe, &clip.source, clip.r#in, clip.out, width, height, fps, live_protocols);
        return SourceDecision::Ready(TimedInputResult {
            input,
            seek: clip.r#in,
            out: clip.out,
            next_playlist: false,
            extra_video_filter: None,
            extra_audio_filter: None,
            warning,
        });
    }

    if begin + delta > window_end {
        return SourceDecision::Ready(TimedInputResult {
            input: Input::Real(vec![]),
            seek: clip.r#in,
            out: clip.r#in,
            next_playlist: true,
            extra_video_filter: None,
            extra_audio_filter: None,
            warning: None,
        });
    }

    SourceDecision::EnterListEnd { remaining: (window_end - (begin + delta)).max(0.0) }
}

/// A fully synthetic filler clip of `remaining` seconds, used when the
/// folder/filler path is a real file that simply needs trimming to length.
pub fn filler_input(path: &str, remaining: f64) -> TimedInputResult {
    TimedInputResult {
        input: filler(path, remaining),
        seek: 0.0,
        out: remaining,
        next_playlist: false,
        extra_video_filter: None,
        extra_audio_filter: None,
        warning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn clock_at(t: f64) -> FixedClock {
        FixedClock { time_of_day: t, stamp: 0, date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap() }
    }

    #[test]
    fn delta_is_zero_when_on_schedule() {
        let clock = clock_at(100.0);
        assert_eq!(get_delta(&clock, 21600.0, 86400.0, 100.0), 0.0);
    }

    #[test]
    fn delta_collapses_near_full_day() {
        let clock = clock_at(21601.0);
        let delta = get_delta(&clock, 21600.0, 86400.0, 21600.0 + 86400.0 - 2.0);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn list_end_trims_clip_when_remaining_large() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = handle_list_end(&clip, &probe, 20.0, 25.0);
        assert!(!r.next_playlist);
        assert_eq!(r.out, 20.0);
        assert!(r.extra_video_filter.is_none());
    }

    #[test]
    fn list_end_fades_when_remaining_short() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = handle_list_end(&clip, &probe, 2.0, 25.0);
        assert!(r.extra_video_filter.is_some());
    }

    #[test]
    fn list_end_stretches_when_remaining_tiny() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource { format: Some(crate::probe::Format { duration: 30.0 }), video: None, audio: None, aspect: None };
        let r = handle_list_end(&clip, &probe, 0.5, 25.0);
        assert!(r.extra_audio_filter.is_some());
        assert!(r.extra_video_filter.is_some());
    }

    #[test]
    fn list_end_moves_on_when_nothing_remains() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = handle_list_end(&clip, &probe, 0.0, 25.0);
        assert!(r.next_playlist);
    }

    fn ready(decision: SourceDecision) -> TimedInputResult {
        match decision {
            SourceDecision::Ready(r) => r,
            SourceDecision::EnterListEnd { remaining } => panic!("expected Ready, got EnterListEnd({remaining})"),
        }
    }

    #[test]
    fn first_clip_seeks_by_tardy_start_delta() {
        // 12s tardy start => seek=12, out unchanged at 30 — timed_source only
        // clamps seek and leaves `out` as scheduled.
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = ready(timed_source(&clip, &probe, 1280, 720, 25.0, 0.0, 12.0, 21600.0, 86400.0, true, false, false, &[]));
        assert_eq!(r.seek, 12.0);
        assert_eq!(r.out, 30.0);
    }

    #[test]
    fn first_clip_seek_clamped_to_zero_under_a_second() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = ready(timed_source(&clip, &probe, 1280, 720, 25.0, 0.0, 0.4, 21600.0, 86400.0, true, false, false, &[]));
        assert_eq!(r.seek, 0.0);
    }

    #[test]
    fn past_window_start_skips_the_clip() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = ready(timed_source(&clip, &probe, 1280, 720, 25.0, 200_000.0, 100.0, 21600.0, 86400.0, false, false, false, &[]));
        assert!(r.next_playlist);
    }

    #[test]
    fn within_window_plays_clip_unchanged() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        let r = ready(timed_source(&clip, &probe, 1280, 720, 25.0, 21600.0, 0.0, 21600.0, 86400.0, false, false, false, &[]));
        assert_eq!(r.seek, 0.0);
        assert_eq!(r.out, 30.0);
        assert!(!r.next_playlist);
    }

    #[test]
    fn crossing_window_end_defers_to_list_end_handler() {
        let clip = ClipNode { source: "a.mp4".into(), r#in: 0.0, out: 30.0, duration: Some(30.0), category: None };
        let probe = ProbedSource::none();
        // window_end = 21600 + 20 = 21620; begin = 21600 so remaining should be 20.
        let decision = timed_source(&clip, &probe, 1280, 720, 25.0, 21600.0, 0.0, 21600.0, 20.0, false, false, false, &[]);
        match decision {
            SourceDecision::EnterListEnd { remaining } => assert_eq!(remaining, 20.0),
            SourceDecision::Ready(_) => panic!("expected EnterListEnd"),
        }
    }

    #[test]
    fn live_source_ignores_seek_and_warns() {
        let probe = ProbedSource::none();
        let (input, warning) = src_or_dummy(&probe, "rtmp://example/stream", 5.0, 15.0, 1280, 720, 25.0, &["rtmp".to_string()]);
        assert!(!input.argv().iter().any(|a| a == "-ss"));
        assert!(warning.is_some());
    }

    #[test]
    fn looped_source_uses_stream_loop_instead_of_seek() {
        let probe = ProbedSource {
            format: Some(crate::probe::Format { duration: 5.0 }),
            video: Some(crate::probe::VideoStream { width: 1280, height: 720, fps: 25.0, field_order: crate::probe::FieldOrder::Progressive, duration: 5.0 }),
            audio: None,
            aspect: Some(1280.0 / 720.0),
        };
        let (input, warning) = src_or_dummy(&probe, "a.mp4", 0.0, 20.0, 1280, 720, 25.0, &[]);
        assert!(input.argv().iter().any(|a| a == "-stream_loop"));
        assert!(warning.is_some());
    }
}
