// crates/playout-core/src/clip.rs
//
// Playlist document types: one JSON document per broadcast day, a flat list
// of clip nodes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipNode {
    pub source: String,
    #[serde(default)]
    pub r#in: f64,
    pub out: f64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ClipNode {
    pub fn play_length(&self) -> f64 {
        self.out - self.r#in
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlaylistHeader {
    #[serde(default)]
    pub length: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDocument {
    pub channel: String,
    pub date: String,
    #[serde(default)]
    pub header: PlaylistHeader,
    pub program: Vec<ClipNode>,
}

impl PlaylistDocument {
    pub fn total_play_length(&self) -> f64 {
        self.program.iter().map(ClipNode::play_length).sum()
    }
}
