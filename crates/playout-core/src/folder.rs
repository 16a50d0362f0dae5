// crates/playout-core/src/folder.rs
//
// Folder-mode source store: a sorted (or shuffled) multiset of clip paths.
// The directory walk itself is behind `FileLister` so ordering/anti-repeat
// logic can be tested without touching a real filesystem.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub trait FileLister: Send + Sync {
    fn list(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf>;
}

pub struct FolderStore {
    items: Vec<PathBuf>,
    shuffle: bool,
    history: VecDeque<PathBuf>,
    history_cap: usize,
    cursor: usize,
}

impl FolderStore {
    pub fn new(shuffle: bool) -> Self {
        Self { items: Vec::new(), shuffle, history: VecDeque::new(), history_cap: 0, cursor: 0 }
    }

    pub fn fill(&mut self, lister: &dyn FileLister, root: &Path, extensions: &[String]) {
        let mut items = lister.list(root, extensions);
        items.sort();
        self.history_cap = items.len() / 2;
        self.items = items;
        self.cursor = 0;
    }

    pub fn insert(&mut self, path: PathBuf) {
        match self.items.binary_search(&path) {
            Ok(_) => {}
            Err(idx) => self.items.insert(idx, path),
        }
        self.history_cap = self.items.len() / 2;
    }

    pub fn remove(&mut self, path: &Path) {
        self.items.retain(|p| p != path);
        self.history_cap = self.items.len() / 2;
        if self.cursor > self.items.len() {
            self.cursor = 0;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the next item using a caller-supplied source of randomness
    /// when shuffling, so the pick is deterministic under test. `pick_index`
    /// is only consulted in shuffle mode and must be in `0..len`.
    pub fn next_with(&mut self, pick_index: impl Fn(usize) -> usize) -> Option<PathBuf> {
        if self.items.is_empty() {
            return None;
        }
        if !self.shuffle {
            let item = self.items[self.cursor % self.items.len()].clone();
            self.cursor = (self.cursor + 1) % self.items.len();
            return Some(item);
        }

        let available: Vec<&PathBuf> = self.items.iter().filter(|p| !self.history.contains(p)).collect();
        let pool: &[&PathBuf] = if available.is_empty() { &[] } else { &available };
        let chosen = if pool.is_empty() {
            self.items[pick_index(self.items.len()) % self.items.len()].clone()
        } else {
            pool[pick_index(pool.len()) % pool.len()].clone()
        };

        self.history.push_back(chosen.clone());
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLister(Vec<PathBuf>);
    impl FileLister for FakeLister {
        fn list(&self, _root: &Path, _extensions: &[String]) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn fill_sorts_lexicographically() {
        let mut store = FolderStore::new(false);
        let lister = FakeLister(paths(&["b.mp4", "a.mp4", "c.mp4"]));
        store.fill(&lister, Path::new("/media"), &["mp4".into()]);
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("a.mp4")));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("b.mp4")));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("c.mp4")));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("a.mp4")));
    }

    #[test]
    fn shuffle_avoids_recent_history() {
        let mut store = FolderStore::new(true);
        let lister = FakeLister(paths(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]));
        store.fill(&lister, Path::new("/media"), &["mp4".into()]);
        // history_cap = 4/2 = 2
        let first = store.next_with(|_| 0).unwrap();
        let second = store.next_with(|_| 0).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn insert_keeps_sort_order() {
        let mut store = FolderStore::new(false);
        let lister = FakeLister(paths(&["a.mp4", "c.mp4"]));
        store.fill(&lister, Path::new("/media"), &["mp4".into()]);
        store.insert(PathBuf::from("b.mp4"));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("a.mp4")));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("b.mp4")));
        assert_eq!(store.next_with(|_| 0), Some(PathBuf::from("c.mp4")));
    }

    #[test]
    fn remove_drops_item() {
        let mut store = FolderStore::new(false);
        let lister = FakeLister(paths(&["a.mp4", "b.mp4"]));
        store.fill(&lister, Path::new("/media"), &["mp4".into()]);
        store.remove(Path::new("a.mp4"));
        assert_eq!(store.len(), 1);
    }
}
