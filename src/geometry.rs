//! Conversion between preview (viewport) coordinates and screen-space.
//!
//! Screen-space is the player's native pixel grid after rotation. Every touch
//! area is stored in screen-space, so authored regions stay valid whatever
//! size the preview is drawn at.

use serde::{Deserialize, Serialize};

/// Movement (in screen-space units, on either axis) that turns a tap into a drag.
pub const DEFAULT_GESTURE_THRESHOLD: f32 = 50.0;

/// Effective screen dimensions after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub w: u32,
    pub h: u32,
    pub is_portrait: bool,
}

impl Screen {
    /// Screen for a physical resolution, swapping axes for 90/270 degree rotation.
    pub fn rotated(width: u32, height: u32, quarter_turn: bool) -> Self {
        if quarter_turn {
            Self { w: height, h: width, is_portrait: true }
        } else {
            Self { w: width, h: height, is_portrait: false }
        }
    }
}

/// A pointer position, either in viewport pixels or in screen-space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Uniform factor that fits the whole screen inside a `max_w` x `max_h` box.
pub fn scale(screen: Screen, max_w: f32, max_h: f32) -> f32 {
    if screen.w == 0 || screen.h == 0 {
        return 1.0;
    }
    (max_w / screen.w as f32).min(max_h / screen.h as f32)
}

/// Convert a viewport position into screen-space.
pub fn to_screen_space(pointer: Point, factor: f32) -> Point {
    let z = if factor > 0.0 { factor } else { 1.0 };
    Point {
        x: pointer.x / z,
        y: pointer.y / z,
    }
}

/// Size of the preview viewport for a screen drawn at `factor`.
pub fn preview_size(screen: Screen, factor: f32) -> (f32, f32) {
    (screen.w as f32 * factor, screen.h as f32 * factor)
}

/// Axis-aligned touch rectangle in screen-space, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchArea {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TouchArea {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smallest integer rectangle containing both corners.
    ///
    /// Lower bounds round down and upper bounds round up so every pixel the
    /// drag passed over ends up inside the area.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x).floor() as i32,
            y1: a.y.min(b.y).floor() as i32,
            x2: a.x.max(b.x).ceil() as i32,
            y2: a.y.max(b.y).ceil() as i32,
        }
    }

    /// Area covering the whole screen.
    pub fn fullscreen(screen: Screen) -> Self {
        Self::new(0, 0, screen.w as i32, screen.h as i32)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }

    /// Whether the area has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Horizontal extent, clamped to the `i32` range.
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }
}
