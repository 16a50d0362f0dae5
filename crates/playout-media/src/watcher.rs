// crates/playout-media/src/watcher.rs
//
// Folder-mode hot directory: a `notify` watcher feeds create/remove events
// into the shared store through a mutex, so the emitter thread reading the
// store never contends with the watcher's own debounce logic. A freshly
// created file is polled for a stable size before being added — a file
// mid-copy has a size that's still growing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use playout_core::folder::FolderStore;

const SIZE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const SIZE_POLL_ATTEMPTS: u32 = 10;

/// Polls a file's size until two consecutive reads agree, or gives up.
/// Returns `true` once the file looks like it has finished being written.
fn wait_until_stable(path: &Path) -> bool {
    let mut last: Option<u64> = None;
    for _ in 0..SIZE_POLL_ATTEMPTS {
        let Ok(meta) = std::fs::metadata(path) else { return false };
        let size = meta.len();
        if last == Some(size) {
            return true;
        }
        last = Some(size);
        thread::sleep(SIZE_POLL_INTERVAL);
    }
    false
}

pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
}

impl FolderWatcher {
    /// Starts watching `root` recursively for files matching `extensions`,
    /// keeping `store` up to date as files appear, move, or disappear.
    pub fn spawn(root: PathBuf, extensions: Vec<String>, store: Arc<Mutex<FolderStore>>) -> notify::Result<Self> {
        let matches_ext = {
            let extensions = extensions.clone();
            move |p: &Path| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
                    .unwrap_or(false)
            }
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            match event.kind {
                EventKind::Create(_) => {
                    for path in event.paths {
                        if !matches_ext(&path) {
                            continue;
                        }
                        let store = store.clone();
                        thread::spawn(move || {
                            if wait_until_stable(&path) {
                                store.lock().unwrap().insert(path);
                            }
                        });
                    }
                }
                EventKind::Remove(_) => {
                    for path in &event.paths {
                        store.lock().unwrap().remove(path);
                    }
                }
                _ => {}
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        Ok(Self { _watcher: watcher })
    }
}
