mod args;
mod logging;
mod settings;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::unbounded;

use playout_core::clock::SystemClock;
use playout_core::iterator::PlaylistIterator;
use playout_core::messenger::{Messenger, Severity, Sink};
use playout_core::transport::intermediate_transport_args;
use playout_media::ffprobe::CommandProber;
use playout_media::log_sink::LogSink;
use playout_media::mail::SmtpMailSink;
use playout_media::playlist_source::source_for;
use playout_media::pump::{Pump, PumpEvent};
use playout_media::signals::{self, SignalEvent};

/// `FilterGraph::video_map`/`audio_map` hold either a raw stream specifier
/// (`0:v`) or a filter-graph output label (`vchain`, `voverlay`) — only the
/// latter needs bracket-wrapping for `-map`.
fn map_arg(label: &str) -> String {
    if label.contains(':') {
        label.to_string()
    } else {
        format!("[{label}]")
    }
}

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();
    let mut config = settings::load(&args.config)?;
    if let Some(start) = &args.start {
        config.playlist.day_start = start.clone();
    }
    if let Some(folder) = &args.folder {
        config.storage.path = folder.clone();
    }

    let _logging_guard = logging::init(&config.logging);

    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(LogSink)];
    if let Ok(mail) = SmtpMailSink::new(
        &config.mail.smtp_server,
        config.mail.smtp_port,
        &config.mail.smtp_user,
        &config.mail.smtp_password,
        &config.mail.recipient,
        &config.mail.subject,
        Severity::parse(&config.mail.mail_level),
    ) {
        sinks.push(Box::new(mail));
    }
    let messenger = Arc::new(Messenger::new(sinks));

    let config = Arc::new(config);
    let prober = Arc::new(CommandProber::default());
    let source: Arc<Box<dyn playout_core::iterator::PlaylistSource>> =
        Arc::new(source_for(&config.playlist.filler_clip_path));
    let clock = Arc::new(SystemClock);

    let mut iterator = PlaylistIterator::new(config.clone(), prober, source, clock, messenger.clone());

    let shutdown = Arc::new(AtomicBool::new(false));
    let (sig_tx, sig_rx) = unbounded();
    signals::install(sig_tx)?;
    {
        let shutdown = shutdown.clone();
        std::thread::spawn(move || {
            while let Ok(event) = sig_rx.recv() {
                if event == SignalEvent::Terminate {
                    shutdown.store(true, Ordering::Relaxed);
                    break;
                }
            }
        });
    }

    let (event_tx, event_rx) = unbounded();
    {
        let messenger = messenger.clone();
        std::thread::spawn(move || {
            while let Ok(event) = event_rx.recv() {
                match event {
                    PumpEvent::EncoderStarted => messenger.info("encoder started"),
                    PumpEvent::ClipStarted(label) => messenger.debug(&format!("playing {label}")),
                    PumpEvent::ClipFinished(label) => messenger.debug(&format!("finished {label}")),
                    PumpEvent::BrokenPipe => messenger.error("broken pipe to encoder"),
                    PumpEvent::DecoderFailed { source, reason } => {
                        messenger.error(&format!("decoder failed for {source}: {reason}"))
                    }
                    PumpEvent::EncoderExited(code) => messenger.info(&format!("encoder exited: {code:?}")),
                }
            }
        });
    }

    let mut pump = Pump::spawn_encoder(&config.out.ffmpeg_params, shutdown.clone(), event_tx)?;

    while !shutdown.load(Ordering::Relaxed) {
        let Some(item) = iterator.next() else {
            messenger.error("no playable item, retrying");
            std::thread::sleep(std::time::Duration::from_secs(1));
            continue;
        };
        let mut decoder_argv = item.input.argv().to_vec();
        if !item.filter.filter_complex.is_empty() {
            decoder_argv.push("-filter_complex".to_string());
            decoder_argv.push(item.filter.filter_complex.clone());
        }
        decoder_argv.push("-map".to_string());
        decoder_argv.push(map_arg(&item.filter.video_map));
        decoder_argv.push("-map".to_string());
        decoder_argv.push(map_arg(&item.filter.audio_map));
        decoder_argv.extend(intermediate_transport_args(&config.pre_compress));
        let label = format!("seek={:.2} out={:.2}", item.seek, item.out);
        if let Err(e) = pump.run_clip(&label, &decoder_argv) {
            messenger.error(&format!("pump error: {e}"));
            break;
        }
    }

    pump.finish();
    Ok(())
}
