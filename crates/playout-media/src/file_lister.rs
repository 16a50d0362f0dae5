// crates/playout-media/src/file_lister.rs
//
// Recursive directory walk feeding `FolderStore::fill`.

use std::path::{Path, PathBuf};

use playout_core::folder::FileLister;

pub struct WalkDirLister;

impl WalkDirLister {
    fn walk(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, extensions, out);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
            {
                out.push(path);
            }
        }
    }
}

impl FileLister for WalkDirLister {
    fn list(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        Self::walk(root, extensions, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_files_by_extension_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();
        std::fs::write(dir.path().join("sub/c.mp4"), b"").unwrap();

        let lister = WalkDirLister;
        let mut found = lister.list(dir.path(), &["mp4".to_string()]);
        found.sort();
        assert_eq!(found.len(), 2);
    }
}
