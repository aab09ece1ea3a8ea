//! Screen configuration, pages and links, with their host wire format.
//!
//! The wire format is a plain keyed structure:
//!
//! ```json
//! {
//!   "resolution": [1920, 1080], "rotation": 0, "audio": false, "scale": false,
//!   "pages": [{
//!     "uuid": "…", "name": "Index", "asset": "…", "duration": 5,
//!     "links": [{
//!       "target_uuid": "back", "type": "touch", "transition": "zoom_in",
//!       "options": {"x1": 0, "y1": 0, "x2": 100, "y2": 100}
//!     }]
//!   }]
//! }
//! ```
//!
//! Keys the editor does not know about are kept in `extra` and written back
//! untouched.

use crate::geometry::{Screen, TouchArea};
use crate::graph::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Sentinel target meaning "return to the previously shown page".
pub const BACK_TARGET: &str = "back";

/// Fresh globally unique page id.
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Screen configuration
// ============================================================================

/// Physical output resolution, `[width, height]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl From<[u32; 2]> for Resolution {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for [u32; 2] {
    fn from(r: Resolution) -> Self {
        [r.width, r.height]
    }
}

/// Clockwise display rotation, degrees on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270];

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// 90 and 270 degrees turn a landscape panel into a portrait screen.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Rotation outside `{0, 90, 180, 270}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported rotation {0} (expected 0, 90, 180 or 270)")]
pub struct InvalidRotation(pub u16);

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Cw180),
            270 => Ok(Rotation::Cw270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

/// Global player configuration, the payload pushed to the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenConfig {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub audio: bool,
    /// `true` preserves the asset aspect ratio, `false` stretches to fullscreen.
    #[serde(default)]
    pub scale: bool,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScreenConfig {
    /// Effective screen after rotation. Computed on every call.
    pub fn screen(&self) -> Screen {
        Screen::rotated(
            self.resolution.width,
            self.resolution.height,
            self.rotation.is_quarter_turn(),
        )
    }
}

// ============================================================================
// Pages
// ============================================================================

fn default_page_duration() -> f64 {
    5.0
}

/// One full-screen slide and its outgoing links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asset: String,
    #[serde(default = "default_page_duration")]
    pub duration: f64,
    /// Ordered: later links win overlapping touch hits.
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            asset: asset.into(),
            duration: default_page_duration(),
            links: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Position of the link with `id`, recomputed from the current order.
    pub fn link_index(&self, id: LinkId) -> Option<usize> {
        self.links.iter().position(|l| l.id() == id)
    }

    pub fn has_link_type(&self, kind: LinkType) -> bool {
        self.links.iter().any(|l| l.kind() == kind)
    }
}

// ============================================================================
// Links
// ============================================================================

/// Where a link goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Target {
    /// Pop the play history.
    Back,
    Page(String),
}

impl Target {
    pub fn page(uuid: impl Into<String>) -> Self {
        Target::Page(uuid.into())
    }

    pub fn page_uuid(&self) -> Option<&str> {
        match self {
            Target::Back => None,
            Target::Page(uuid) => Some(uuid),
        }
    }

    pub fn is_back(&self) -> bool {
        matches!(self, Target::Back)
    }

    pub fn points_to(&self, uuid: &str) -> bool {
        self.page_uuid() == Some(uuid)
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        if s == BACK_TARGET {
            Target::Back
        } else {
            Target::Page(s)
        }
    }
}

impl From<Target> for String {
    fn from(t: Target) -> Self {
        match t {
            Target::Back => BACK_TARGET.to_string(),
            Target::Page(uuid) => uuid,
        }
    }
}

/// Animation played when a link fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Transition {
    #[serde(rename = "l2r")]
    LeftToRight,
    #[serde(rename = "r2l")]
    RightToLeft,
    #[serde(rename = "t2b")]
    TopToBottom,
    #[serde(rename = "b2t")]
    BottomToTop,
    #[default]
    #[serde(rename = "zoom_in")]
    ZoomIn,
    #[serde(rename = "zoom_out")]
    ZoomOut,
    #[serde(rename = "fade")]
    Fade,
    #[serde(rename = "none")]
    None,
}

impl Transition {
    pub const ALL: [Transition; 8] = [
        Transition::LeftToRight,
        Transition::RightToLeft,
        Transition::TopToBottom,
        Transition::BottomToTop,
        Transition::ZoomIn,
        Transition::ZoomOut,
        Transition::Fade,
        Transition::None,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::LeftToRight => "l2r",
            Transition::RightToLeft => "r2l",
            Transition::TopToBottom => "t2b",
            Transition::BottomToTop => "b2t",
            Transition::ZoomIn => "zoom_in",
            Transition::ZoomOut => "zoom_out",
            Transition::Fade => "fade",
            Transition::None => "none",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Transition::LeftToRight => "Slide left",
            Transition::RightToLeft => "Slide right",
            Transition::TopToBottom => "Slide up",
            Transition::BottomToTop => "Slide down",
            Transition::ZoomIn => "Zoom in",
            Transition::ZoomOut => "Zoom out",
            Transition::Fade => "Fade",
            Transition::None => "Instant switch",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`Trigger`], the `type` key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Touch,
    Timeout,
    Gpio,
    Key,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkType::Touch => "touch",
            LinkType::Timeout => "timeout",
            LinkType::Gpio => "gpio",
            LinkType::Key => "key",
        })
    }
}

/// What makes a link fire, with its type-specific options.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Touch(TouchArea),
    Timeout { seconds: f64 },
    Gpio { pin: u8, active_high: bool },
    Key { code: String },
}

impl Trigger {
    pub fn kind(&self) -> LinkType {
        match self {
            Trigger::Touch(_) => LinkType::Touch,
            Trigger::Timeout { .. } => LinkType::Timeout,
            Trigger::Gpio { .. } => LinkType::Gpio,
            Trigger::Key { .. } => LinkType::Key,
        }
    }

    pub fn touch_area(&self) -> Option<TouchArea> {
        match self {
            Trigger::Touch(area) => Some(*area),
            _ => None,
        }
    }

    /// Merge `patch` into these options, replacing only the keys it carries.
    ///
    /// Fails without modifying `self` when the patch is for another link type.
    pub fn merge(&mut self, patch: OptionsPatch) -> Result<(), ValidationError> {
        match (self, patch) {
            (Trigger::Touch(area), OptionsPatch::Touch(p)) => {
                area.x1 = p.x1.unwrap_or(area.x1);
                area.y1 = p.y1.unwrap_or(area.y1);
                area.x2 = p.x2.unwrap_or(area.x2);
                area.y2 = p.y2.unwrap_or(area.y2);
            }
            (Trigger::Timeout { seconds }, OptionsPatch::Timeout { seconds: s }) => *seconds = s,
            (Trigger::Gpio { pin, active_high }, OptionsPatch::Gpio { pin: p, active_high: a }) => {
                *pin = p.unwrap_or(*pin);
                *active_high = a.unwrap_or(*active_high);
            }
            (Trigger::Key { code }, OptionsPatch::Key { code: c }) => *code = c,
            (this, patch) => {
                return Err(ValidationError::OptionsMismatch {
                    expected: this.kind(),
                    found: patch.kind(),
                })
            }
        }
        Ok(())
    }

    fn options_value(&self) -> Value {
        match self {
            Trigger::Touch(a) => json!({"x1": a.x1, "y1": a.y1, "x2": a.x2, "y2": a.y2}),
            Trigger::Timeout { seconds } => json!({ "timeout": seconds }),
            Trigger::Gpio { pin, active_high } => json!({"pin": pin, "active_high": active_high}),
            Trigger::Key { code } => json!({ "key": code }),
        }
    }

    /// Option keys this link type owns on the wire.
    fn option_keys(kind: LinkType) -> &'static [&'static str] {
        match kind {
            LinkType::Touch => &["x1", "y1", "x2", "y2"],
            LinkType::Timeout => &["timeout"],
            LinkType::Gpio => &["pin", "active_high"],
            LinkType::Key => &["key"],
        }
    }

    /// Parse the options of a stored link.
    ///
    /// A timeout that is missing or not a number loads as `0.0`, which the
    /// store replaces with its fallback timeout at init.
    fn from_options(kind: LinkType, options: Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct TimeoutOptions {
            #[serde(default)]
            timeout: Value,
        }
        #[derive(Deserialize)]
        struct GpioOptions {
            pin: u8,
            active_high: bool,
        }
        #[derive(Deserialize)]
        struct KeyOptions {
            key: String,
        }

        Ok(match kind {
            LinkType::Touch => Trigger::Touch(serde_json::from_value(options)?),
            LinkType::Timeout => {
                let o: TimeoutOptions = match options {
                    Value::Null => TimeoutOptions { timeout: Value::Null },
                    options => serde_json::from_value(options)?,
                };
                let seconds = o
                    .timeout
                    .as_f64()
                    .or_else(|| o.timeout.as_str().and_then(|s| s.trim().parse().ok()))
                    .unwrap_or(0.0);
                Trigger::Timeout { seconds }
            }
            LinkType::Gpio => {
                let o: GpioOptions = serde_json::from_value(options)?;
                Trigger::Gpio { pin: o.pin, active_high: o.active_high }
            }
            LinkType::Key => {
                let o: KeyOptions = serde_json::from_value(options)?;
                Trigger::Key { code: o.key }
            }
        })
    }
}

/// Partial touch rectangle; `None` keeps the current edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPatch {
    pub x1: Option<i32>,
    pub y1: Option<i32>,
    pub x2: Option<i32>,
    pub y2: Option<i32>,
}

impl From<TouchArea> for TouchPatch {
    fn from(a: TouchArea) -> Self {
        Self {
            x1: Some(a.x1),
            y1: Some(a.y1),
            x2: Some(a.x2),
            y2: Some(a.y2),
        }
    }
}

/// Shallow update of a link's options.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsPatch {
    Touch(TouchPatch),
    Timeout { seconds: f64 },
    Gpio { pin: Option<u8>, active_high: Option<bool> },
    Key { code: String },
}

impl OptionsPatch {
    pub fn kind(&self) -> LinkType {
        match self {
            OptionsPatch::Touch(_) => LinkType::Touch,
            OptionsPatch::Timeout { .. } => LinkType::Timeout,
            OptionsPatch::Gpio { .. } => LinkType::Gpio,
            OptionsPatch::Key { .. } => LinkType::Key,
        }
    }
}

/// Identity of a link that survives reordering and deletion of its siblings.
///
/// Generated when a link is created or loaded; never written to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(Uuid);

impl LinkId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One exit edge of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawLink", into = "RawLink")]
pub struct Link {
    id: LinkId,
    pub target: Target,
    pub transition: Transition,
    pub trigger: Trigger,
    /// Unknown link-level keys, written back untouched.
    pub extra: Map<String, Value>,
    /// Unknown keys inside `options`, written back next to the known ones.
    options_extra: Map<String, Value>,
}

impl Link {
    pub fn new(target: Target, transition: Transition, trigger: Trigger) -> Self {
        Self {
            id: LinkId::generate(),
            target,
            transition,
            trigger,
            extra: Map::new(),
            options_extra: Map::new(),
        }
    }

    pub fn touch(target: Target, transition: Transition, area: TouchArea) -> Self {
        Self::new(target, transition, Trigger::Touch(area))
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn kind(&self) -> LinkType {
        self.trigger.kind()
    }
}

/// Links compare by value; the in-memory id is not part of it.
impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.transition == other.transition
            && self.trigger == other.trigger
            && self.extra == other.extra
            && self.options_extra == other.options_extra
    }
}

#[derive(Serialize, Deserialize)]
struct RawLink {
    target_uuid: Target,
    #[serde(rename = "type")]
    kind: LinkType,
    #[serde(default)]
    transition: Transition,
    #[serde(default)]
    options: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawLink> for Link {
    type Error = serde_json::Error;

    fn try_from(raw: RawLink) -> Result<Self, Self::Error> {
        let known = Trigger::option_keys(raw.kind);
        let options_extra: Map<String, Value> = match &raw.options {
            Value::Object(map) => map
                .iter()
                .filter(|(k, _)| !known.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Map::new(),
        };
        let trigger = Trigger::from_options(raw.kind, raw.options)?;
        let mut link = Link::new(raw.target_uuid, raw.transition, trigger);
        link.extra = raw.extra;
        link.options_extra = options_extra;
        Ok(link)
    }
}

impl From<Link> for RawLink {
    fn from(link: Link) -> Self {
        let mut options = link.options_extra;
        if let Value::Object(known) = link.trigger.options_value() {
            options.extend(known);
        }
        RawLink {
            kind: link.trigger.kind(),
            options: Value::Object(options),
            target_uuid: link.target,
            transition: link.transition,
            extra: link.extra,
        }
    }
}
