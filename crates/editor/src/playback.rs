//! Playback head and editor mode.
//!
//! The playhead is transient UI state: nothing here is recorded in history.

use serde::{Deserialize, Serialize};
use tz_common::TimeCode;

/// Whether the canvas is editable or showing a preview.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Edit,
    Preview,
}

/// Playhead position and transport state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Always within `[0, total duration]` of the edited template.
    pub current_time: TimeCode,
    pub playing: bool,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the playhead, clamped to `[0, total]`.
    pub fn seek(&mut self, secs: f64, total: f64) -> TimeCode {
        self.current_time = TimeCode::from_secs(secs).clamp(TimeCode::ZERO, TimeCode::from_secs(total));
        tracing::debug!(time = %self.current_time, "Seeked");
        self.current_time
    }

    /// Re-clamp after the total duration changed. Returns whether the playhead moved.
    pub fn clamp_to(&mut self, total: f64) -> bool {
        let clamped = self
            .current_time
            .clamp(TimeCode::ZERO, TimeCode::from_secs(total));
        if clamped != self.current_time {
            self.current_time = clamped;
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self, total: f64) -> bool {
        self.current_time.as_secs() >= total
    }

    /// Flip between playing and paused. Starting from the end rewinds to 0.
    /// Returns the new playing flag.
    pub fn toggle(&mut self, total: f64) -> bool {
        if self.playing {
            self.playing = false;
            tracing::debug!(time = %self.current_time, "Playback paused");
        } else {
            if self.is_at_end(total) {
                self.current_time = TimeCode::ZERO;
            }
            self.playing = true;
            tracing::debug!(time = %self.current_time, "Playback started");
        }
        self.playing
    }

    /// Advance a playing head by `dt` seconds. Reaching the end stops playback
    /// there. Returns whether the end was reached.
    pub fn advance(&mut self, dt: f64, total: f64) -> bool {
        if !self.playing {
            return false;
        }
        let next = self.current_time.as_secs() + dt;
        if next >= total {
            self.current_time = TimeCode::from_secs(total.max(0.0));
            self.playing = false;
            tracing::debug!(time = %self.current_time, "Playback reached the end");
            true
        } else {
            self.current_time = TimeCode::from_secs(next);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_paused_at_zero() {
        let p = PlaybackState::new();
        assert!(!p.playing);
        assert_eq!(p.current_time, TimeCode::ZERO);
    }

    #[test]
    fn seek_clamps() {
        let mut p = PlaybackState::new();
        assert_eq!(p.seek(4.0, 10.0).as_secs(), 4.0);
        assert_eq!(p.seek(-3.0, 10.0).as_secs(), 0.0);
        assert_eq!(p.seek(25.0, 10.0).as_secs(), 10.0);
    }

    #[test]
    fn clamp_to_shrinking_duration() {
        let mut p = PlaybackState::new();
        p.seek(8.0, 10.0);
        assert!(p.clamp_to(5.0));
        assert_eq!(p.current_time.as_secs(), 5.0);
        assert!(!p.clamp_to(5.0));
    }

    #[test]
    fn toggle_rewinds_from_end() {
        let mut p = PlaybackState::new();
        p.seek(10.0, 10.0);
        assert!(p.toggle(10.0));
        assert_eq!(p.current_time, TimeCode::ZERO);
        assert!(!p.toggle(10.0));
    }

    #[test]
    fn toggle_mid_timeline_keeps_position() {
        let mut p = PlaybackState::new();
        p.seek(3.0, 10.0);
        p.toggle(10.0);
        assert_eq!(p.current_time.as_secs(), 3.0);
    }

    #[test]
    fn advance_moves_and_stops_at_end() {
        let mut p = PlaybackState::new();
        assert!(!p.advance(1.0, 10.0));
        assert_eq!(p.current_time, TimeCode::ZERO);

        p.toggle(10.0);
        assert!(!p.advance(4.0, 10.0));
        assert_eq!(p.current_time.as_secs(), 4.0);

        assert!(p.advance(7.0, 10.0));
        assert_eq!(p.current_time.as_secs(), 10.0);
        assert!(!p.playing);
    }
}
