//! Transient status message
//!
//! Holds at most one line of text that disappears after a fixed time.
//! Showing a new message replaces the old one outright.

/// Per-tick delta for hosts that have no clock (60 fps)
pub const FRAME_DELTA_SECONDS: f32 = 0.01667;

/// A message that decays as the host ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedMessage {
    text: String,
    remaining_seconds: f32,
}

impl TimedMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` for `duration_seconds`.
    ///
    /// Empty text or a non-positive duration clears the message instead.
    pub fn show(&mut self, text: impl Into<String>, duration_seconds: f32) {
        let text = text.into();
        if text.is_empty() || duration_seconds <= 0.0 || duration_seconds.is_nan() {
            self.clear();
            return;
        }
        self.text = text;
        self.remaining_seconds = duration_seconds;
    }

    /// Advance by the elapsed time since the last tick
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.is_active() {
            return;
        }
        self.remaining_seconds -= delta_seconds.max(0.0);
        if self.remaining_seconds <= 0.0 {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.remaining_seconds = 0.0;
    }

    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    /// Current text, or `None` when inactive
    pub fn text(&self) -> Option<&str> {
        if self.is_active() {
            Some(&self.text)
        } else {
            None
        }
    }

    pub fn remaining_seconds(&self) -> f32 {
        self.remaining_seconds
    }
}
