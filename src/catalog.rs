//! Fixed option lists offered by the link and settings editors.

use crate::assets::Asset;
use crate::graph::GraphStore;
use crate::model::{Resolution, Rotation, Target, Transition};

/// Format a number of seconds the way the editor shows timeouts.
///
/// Anything over two minutes is shown in whole minutes.
pub fn human_duration(seconds: f64) -> String {
    if seconds > 120.0 {
        format!("{} minutes", (seconds / 60.0).round())
    } else {
        format!("{} seconds", seconds.round())
    }
}

/// Transitions with their labels, in menu order.
pub fn transition_choices() -> impl Iterator<Item = (Transition, &'static str)> {
    Transition::ALL.into_iter().map(|t| (t, t.label()))
}

// ============================================================================
// Timeouts
// ============================================================================

/// Preset timeouts in seconds.
pub const TIMEOUT_PRESETS: [f64; 10] = [2.0, 5.0, 10.0, 15.0, 30.0, 45.0, 60.0, 300.0, 600.0, 900.0];

/// Entry in the timeout menu.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeoutChoice {
    /// Non-selectable group title.
    Heading(&'static str),
    Preset(f64),
    /// Whole loops of the page's video.
    Loops { count: u32, seconds: f64 },
}

impl TimeoutChoice {
    pub fn label(&self) -> String {
        match self {
            TimeoutChoice::Heading(title) => title.to_string(),
            TimeoutChoice::Preset(seconds) => human_duration(*seconds),
            TimeoutChoice::Loops { count: 1, .. } => "one loop".to_string(),
            TimeoutChoice::Loops { count, .. } => format!("{count} loops"),
        }
    }

    /// Seconds this entry selects; `None` for headings.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            TimeoutChoice::Heading(_) => None,
            TimeoutChoice::Preset(seconds) | TimeoutChoice::Loops { seconds, .. } => Some(*seconds),
        }
    }
}

/// Timeout menu for a page showing `asset`.
///
/// Videos with a known duration get one to four loop lengths after the presets.
pub fn timeout_choices(asset: Option<&Asset>) -> Vec<TimeoutChoice> {
    let mut choices = vec![TimeoutChoice::Heading("Defaults")];
    choices.extend(TIMEOUT_PRESETS.iter().map(|s| TimeoutChoice::Preset(*s)));
    if let Some(duration) = asset.and_then(Asset::video_duration) {
        choices.push(TimeoutChoice::Heading("Video Asset"));
        choices.extend((1..=4).map(|count| TimeoutChoice::Loops {
            count,
            seconds: duration * f64::from(count),
        }));
    }
    choices
}

// ============================================================================
// GPIO
// ============================================================================

/// Header pins usable as inputs.
pub const GPIO_PINS: [u8; 10] = [5, 6, 16, 17, 22, 23, 24, 25, 26, 27];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioChoice {
    pub pin: u8,
    pub active_high: bool,
}

impl GpioChoice {
    pub fn label(&self) -> String {
        let level = if self.active_high { "high" } else { "low" };
        format!("{} (active {})", self.pin, level)
    }
}

/// Every pin, active high before active low.
pub fn gpio_choices() -> Vec<GpioChoice> {
    GPIO_PINS
        .iter()
        .flat_map(|&pin| {
            [true, false]
                .into_iter()
                .map(move |active_high| GpioChoice { pin, active_high })
        })
        .collect()
}

// ============================================================================
// Keys
// ============================================================================

/// Key codes understood by the player, with their labels.
pub const KEY_CODES: &[(&str, &str)] = &[
    ("space", "Space Key"),
    ("a", "Key 'A'"), ("b", "Key 'B'"), ("c", "Key 'C'"), ("d", "Key 'D'"),
    ("e", "Key 'E'"), ("f", "Key 'F'"), ("g", "Key 'G'"), ("h", "Key 'H'"),
    ("i", "Key 'I'"), ("j", "Key 'J'"), ("k", "Key 'K'"), ("l", "Key 'L'"),
    ("m", "Key 'M'"), ("n", "Key 'N'"), ("o", "Key 'O'"), ("p", "Key 'P'"),
    ("q", "Key 'Q'"), ("r", "Key 'R'"), ("s", "Key 'S'"), ("t", "Key 'T'"),
    ("u", "Key 'U'"), ("v", "Key 'V'"), ("w", "Key 'W'"), ("x", "Key 'X'"),
    ("y", "Key 'Y'"), ("z", "Key 'Z'"),
    ("0", "Key '0'"), ("1", "Key '1'"), ("2", "Key '2'"), ("3", "Key '3'"),
    ("4", "Key '4'"), ("5", "Key '5'"), ("6", "Key '6'"), ("7", "Key '7'"),
    ("8", "Key '8'"), ("9", "Key '9'"),
    ("kp0", "Numpad 0"), ("kp1", "Numpad 1"), ("kp2", "Numpad 2"), ("kp3", "Numpad 3"),
    ("kp4", "Numpad 4"), ("kp5", "Numpad 5"), ("kp6", "Numpad 6"), ("kp7", "Numpad 7"),
    ("kp8", "Numpad 8"), ("kp9", "Numpad 9"),
    ("kpdot", "Numpad ,"),
    ("kpslash", "Numpad /"),
    ("kpplus", "Numpad +"),
    ("kpminus", "Numpad -"),
    ("kpasterisk", "Numpad *"),
    ("kpenter", "Numpad Enter"),
    ("numlock", "Num Lock"),
    ("f1", "F1"), ("f2", "F2"), ("f3", "F3"), ("f4", "F4"), ("f5", "F5"), ("f6", "F6"),
    ("f7", "F7"), ("f8", "F8"), ("f9", "F9"), ("f10", "F10"), ("f11", "F11"), ("f12", "F12"),
    ("left", "Cursor Left"),
    ("right", "Cursor Right"),
    ("up", "Cursor Up"),
    ("down", "Cursor Down"),
    ("leftshift", "Left Shift"),
    ("leftctrl", "Left Ctrl"),
    ("leftalt", "Left Alt"),
    ("leftmeta", "Left Meta"),
    ("rightshift", "Right Shift"),
    ("rightctrl", "Right Ctrl"),
    ("rightalt", "Right Alt"),
    ("rightmeta", "Right Meta"),
    ("backspace", "Backspace"),
    ("compose", "Compose"),
    ("capslock", "Capslock"),
    ("esc", "Escape"),
    ("enter", "Enter"),
    ("tab", "Tab"),
];

pub fn key_label(code: &str) -> Option<&'static str> {
    KEY_CODES.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
}

// ============================================================================
// Screen settings
// ============================================================================

pub const RESOLUTIONS: [(Resolution, &str); 4] = [
    (Resolution::new(800, 480), "800x480"),
    (Resolution::new(1280, 720), "1280x720 HD"),
    (Resolution::new(1280, 1024), "1280x1024 5:4"),
    (Resolution::new(1920, 1080), "1920x1080 FullHD"),
];

pub const ROTATIONS: [(Rotation, &str); 4] = [
    (Rotation::None, "No rotation"),
    (Rotation::Cw90, "90° clockwise"),
    (Rotation::Cw180, "180°"),
    (Rotation::Cw270, "270°"),
];

pub const AUDIO_OPTIONS: [(bool, &str); 2] = [(false, "No audio"), (true, "For all videos")];

pub const SCALE_OPTIONS: [(bool, &str); 2] = [(false, "Force fullscreen"), (true, "Preserve aspect ratio")];

// ============================================================================
// Link targets
// ============================================================================

/// Entry in the link target menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    Heading(&'static str),
    Page { uuid: String, name: String },
    /// Return to the previous page.
    Back,
    /// Create a fresh page and link to it.
    NewPage,
}

impl TargetChoice {
    pub fn label(&self) -> &str {
        match self {
            TargetChoice::Heading(title) => *title,
            TargetChoice::Page { name, .. } => name.as_str(),
            TargetChoice::Back => "Previous page",
            TargetChoice::NewPage => "Create new page..",
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, TargetChoice::Heading(_))
    }

    /// Whether this entry is the current value for a link pointing at `target`.
    pub fn matches(&self, target: &Target) -> bool {
        match (self, target) {
            (TargetChoice::Page { uuid, .. }, Target::Page(t)) => uuid == t,
            (TargetChoice::Back, Target::Back) => true,
            _ => false,
        }
    }
}

/// Sorted pages, then the special targets.
pub fn target_choices(store: &GraphStore) -> Vec<TargetChoice> {
    let mut choices = vec![TargetChoice::Heading("☰ Your Pages")];
    choices.extend(store.sorted_pages().into_iter().map(|p| TargetChoice::Page {
        uuid: p.uuid.clone(),
        name: p.name.clone(),
    }));
    choices.push(TargetChoice::Heading("☰ Special targets"));
    choices.push(TargetChoice::Back);
    choices.push(TargetChoice::NewPage);
    choices
}
