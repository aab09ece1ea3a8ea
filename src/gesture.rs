//! Pointer gesture disambiguation for the screen preview.
//!
//! A press that stays within the threshold is a tap and yields
//! [`GestureEvent::Click`]. Once the pointer travels further than the threshold
//! on either axis the gesture becomes a rubber-band drag and yields
//! [`GestureEvent::Area`] on release.
//!
//! Pointer-leave finalizes exactly like pointer-up, so the tracker never stays
//! stuck in the middle of a gesture.

use crate::geometry::{to_screen_space, Point, TouchArea, DEFAULT_GESTURE_THRESHOLD};

/// Gesture progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed, threshold not crossed yet.
    Start,
    /// Drawing a rectangle.
    Draw,
}

/// Result of a finished gesture, in screen-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Click { x: i32, y: i32 },
    Area(TouchArea),
}

/// Turns pointer down/move/up sequences into clicks and areas.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    start: Point,
    current: Point,
    threshold: f32,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GESTURE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            state: GestureState::Idle,
            start: Point::default(),
            current: Point::default(),
            threshold,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Begin a gesture. `pointer` is in viewport pixels, `factor` the preview scale.
    pub fn pointer_down(&mut self, pointer: Point, factor: f32) {
        self.start = to_screen_space(pointer, factor);
        self.current = self.start;
        self.state = GestureState::Start;
    }

    pub fn pointer_move(&mut self, pointer: Point, factor: f32) {
        match self.state {
            GestureState::Idle => {}
            GestureState::Start => {
                self.current = to_screen_space(pointer, factor);
                let dx = (self.current.x - self.start.x).abs();
                let dy = (self.current.y - self.start.y).abs();
                if dx > self.threshold || dy > self.threshold {
                    self.state = GestureState::Draw;
                }
            }
            GestureState::Draw => {
                self.current = to_screen_space(pointer, factor);
            }
        }
    }

    /// Finish the gesture, returning what it amounted to.
    ///
    /// The release position only extends an area that is already being
    /// drawn; a tap always reports where it started.
    pub fn pointer_up(&mut self, pointer: Point, factor: f32) -> Option<GestureEvent> {
        let event = match self.state {
            GestureState::Idle => None,
            GestureState::Start => Some(GestureEvent::Click {
                x: self.start.x.floor() as i32,
                y: self.start.y.floor() as i32,
            }),
            GestureState::Draw => {
                self.current = to_screen_space(pointer, factor);
                Some(GestureEvent::Area(TouchArea::from_corners(self.start, self.current)))
            }
        };
        self.state = GestureState::Idle;
        event
    }

    pub fn pointer_leave(&mut self, pointer: Point, factor: f32) -> Option<GestureEvent> {
        self.pointer_up(pointer, factor)
    }

    /// Rubber-band rectangle while drawing.
    pub fn preview(&self) -> Option<TouchArea> {
        match self.state {
            GestureState::Draw => Some(TouchArea::from_corners(self.start, self.current)),
            _ => None,
        }
    }
}
