// crates/playout-media/src/playlist_source.rs
//
// `PlaylistSource` backed by the local filesystem or, when the configured
// path is a URL, an HTTP GET — a HEAD request's `Last-Modified` is checked
// first so an unchanged remote playlist doesn't get re-downloaded every
// reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{Datelike, NaiveDate};
use playout_core::clip::PlaylistDocument;
use playout_core::iterator::{LoadResult, PlaylistSource};

pub struct FilePlaylistSource {
    pub root: PathBuf,
}

impl FilePlaylistSource {
    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{date}.json"))
    }
}

impl PlaylistSource for FilePlaylistSource {
    fn load(&self, _path_or_url: &str, last_mod: i64, for_date: NaiveDate) -> LoadResult {
        let path = self.path_for(for_date);
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) => return LoadResult::Missing,
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        if mtime == last_mod {
            return LoadResult::Unchanged;
        }
        let body = match fs::read_to_string(&path) {
            Ok(b) => b,
            Err(e) => return LoadResult::Invalid(e.to_string()),
        };
        parse_document(&body, mtime)
    }
}

/// `last_mod` for HTTP sources is a hash of the `Last-Modified` header
/// rather than a filesystem mtime — there is no inode to ask.
fn hash_header(s: &str) -> i64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish() as i64
}

pub struct HttpPlaylistSource {
    pub url: String,
    pub timeout_secs: u64,
}

impl PlaylistSource for HttpPlaylistSource {
    fn load(&self, _path_or_url: &str, last_mod: i64, _for_date: NaiveDate) -> LoadResult {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build();

        let head_mod = agent
            .head(&self.url)
            .call()
            .ok()
            .and_then(|resp| resp.header("Last-Modified").map(hash_header));

        if let Some(h) = head_mod {
            if h == last_mod {
                return LoadResult::Unchanged;
            }
        }

        let resp = match agent.get(&self.url).call() {
            Ok(r) => r,
            Err(_) => return LoadResult::Missing,
        };
        let body = match resp.into_string() {
            Ok(b) => b,
            Err(e) => return LoadResult::Invalid(e.to_string()),
        };
        parse_document(&body, head_mod.unwrap_or(last_mod + 1))
    }
}

fn parse_document(body: &str, last_mod: i64) -> LoadResult {
    match serde_json::from_str::<PlaylistDocument>(body) {
        Ok(doc) if !doc.program.is_empty() => LoadResult::Loaded { doc, last_mod },
        Ok(_) => LoadResult::Invalid("playlist has no clips".to_string()),
        Err(e) => LoadResult::Invalid(e.to_string()),
    }
}

/// Picks a file- or HTTP-backed source depending on whether `path_or_url`
/// looks like a URL, matching the branching the original engine does in
/// its playlist loader.
pub fn source_for(path_or_url: &str) -> Box<dyn PlaylistSource> {
    if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        Box::new(HttpPlaylistSource { url: path_or_url.to_string(), timeout_secs: 1 })
    } else {
        Box::new(FilePlaylistSource { root: Path::new(path_or_url).to_path_buf() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_missing() {
        let src = FilePlaylistSource { root: PathBuf::from("/nonexistent-root-xyz") };
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(matches!(src.load("", 0, date), LoadResult::Missing));
    }

    #[test]
    fn loads_and_then_reports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let sub = dir.path().join("2026").join("08");
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join("2026-08-01.json"),
            r#"{"channel":"1","date":"2026-08-01","program":[{"source":"a.mp4","in":0.0,"out":10.0}]}"#,
        )
        .unwrap();

        let src = FilePlaylistSource { root: dir.path().to_path_buf() };
        let first = src.load("", 0, date);
        let mtime = match first {
            LoadResult::Loaded { last_mod, .. } => last_mod,
            _ => panic!("expected Loaded"),
        };
        let second = src.load("", mtime, date);
        assert!(matches!(second, LoadResult::Unchanged));
    }

    #[test]
    fn picks_http_source_for_url() {
        let src = source_for("https://example.test/playlist.json");
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        // Exercises the dispatch only; no network call is made for a URL
        // comparison of the picking logic.
        let _ = (src, date);
    }
}
