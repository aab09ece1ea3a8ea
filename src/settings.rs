//! Editor tunables.
//!
//! Every field has a default, so a host can pass a partial JSON object (or
//! nothing at all) and only override what it cares about.

use crate::model::Transition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Bounding box the screen preview is scaled into.
    pub preview_max_width: f32,
    pub preview_max_height: f32,
    /// Screen-space movement that turns a tap into a drawn area.
    pub gesture_threshold: f32,
    /// Transition given to every newly authored link.
    pub default_transition: Transition,
    /// Timeout (seconds) for new timeout links and for pages whose asset has no duration.
    pub fallback_timeout: f64,
    /// Asset id new pages start with.
    pub placeholder_asset: String,
    /// Stored page duration for new pages.
    pub page_duration: f64,
    pub new_page_name: String,
    /// Name of the page synthesized when the host has none.
    pub index_page_name: String,
    pub default_gpio_pin: u8,
    pub default_gpio_active_high: bool,
    pub default_key: String,
    /// Thumbnail size hint for page rows.
    pub thumb_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            preview_max_width: 736.0,
            preview_max_height: 800.0,
            gesture_threshold: crate::geometry::DEFAULT_GESTURE_THRESHOLD,
            default_transition: Transition::ZoomIn,
            fallback_timeout: 10.0,
            placeholder_asset: "loading.jpg".to_string(),
            page_duration: 5.0,
            new_page_name: "New page".to_string(),
            index_page_name: "Index".to_string(),
            default_gpio_pin: 23,
            default_gpio_active_high: true,
            default_key: "enter".to_string(),
            thumb_size: 40,
        }
    }
}

impl EditorSettings {
    /// Parse settings from a host-provided JSON value, filling in defaults.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }
}
