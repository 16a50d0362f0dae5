// crates/playout-media/src/signals.rs
//
// Converts SIGTERM/SIGHUP into messages on a channel the pump's main loop
// already polls, rather than raising anything exception-like — the
// original engine's `handle_sigterm`/`handle_sighub` set a module-level
// flag a running loop checks; here that flag is a channel send.

use crossbeam_channel::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Terminate,
    ReloadConfig,
}

/// Registers handlers for SIGTERM (all platforms) and, on Unix, SIGHUP.
/// Must be called once at startup, before the pump's main loop begins.
pub fn install(events: Sender<SignalEvent>) -> Result<(), std::io::Error> {
    let term_tx = events.clone();
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, move || {
            let _ = term_tx.send(SignalEvent::Terminate);
        })?;
    }

    #[cfg(unix)]
    {
        let hup_tx = events;
        unsafe {
            signal_hook::low_level::register(signal_hook::consts::SIGHUP, move || {
                let _ = hup_tx.send(SignalEvent::ReloadConfig);
            })?;
        }
    }

    Ok(())
}
