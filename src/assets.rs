//! Read-only view of the host's asset library.
//!
//! The host hands over two tables of the same shape: `assets` and the
//! lower-priority `node_assets`. Lookups consult `assets` first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Media kind of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Image,
    Video,
    #[serde(other)]
    Other,
}

/// Host-supplied metadata. Only `duration` is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Playback length in seconds, for videos.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub filetype: FileType,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub uploaded: Option<f64>,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

impl Asset {
    pub fn is_video(&self) -> bool {
        self.filetype == FileType::Video
    }

    /// Duration of a video asset, `None` for images or unknown lengths.
    pub fn video_duration(&self) -> Option<f64> {
        if self.is_video() {
            self.metadata.duration.filter(|d| *d > 0.0)
        } else {
            None
        }
    }

    /// Thumbnail URL with a size hint appended.
    pub fn thumb_url(&self, size: u32) -> String {
        format!("{}?size={}", self.thumb, size)
    }
}

/// Merged `assets ∪ node_assets` lookup table.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, Asset>,
    node_assets: HashMap<String, Asset>,
}

impl AssetCatalog {
    pub fn new(assets: HashMap<String, Asset>, node_assets: HashMap<String, Asset>) -> Self {
        Self { assets, node_assets }
    }

    /// Look up an asset by id; `assets` shadow `node_assets` on collision.
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id).or_else(|| self.node_assets.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
            + self
                .node_assets
                .keys()
                .filter(|k| !self.assets.contains_key(*k))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.node_assets.is_empty()
    }
}
