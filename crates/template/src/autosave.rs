//! Autosave timing. `AutosaveTimer` owns no thread; the host polls
//! [`AutosaveTimer::is_due`] from its tick and saves when it returns `true`.

use std::time::{Duration, Instant};

use tracing::debug;

/// Tracks unsaved changes and when the last save happened.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    /// Time of the first change since the last save.
    pending_since: Option<Instant>,
    last_saved: Instant,
    enabled: bool,
}

impl AutosaveTimer {
    /// An interval of zero disables autosave.
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            pending_since: None,
            last_saved: Instant::now(),
            enabled: interval_secs > 0,
        }
    }

    /// Record an edit at `now`.
    pub fn note_change_at(&mut self, now: Instant) {
        if self.pending_since.is_none() {
            debug!("Autosave: changes pending");
            self.pending_since = Some(now);
        }
    }

    pub fn note_change(&mut self) {
        self.note_change_at(Instant::now());
    }

    pub fn note_saved_at(&mut self, now: Instant) {
        self.pending_since = None;
        self.last_saved = now;
    }

    pub fn note_saved(&mut self) {
        self.note_saved_at(Instant::now());
    }

    /// Forget pending changes without counting a save (e.g. a fresh load).
    pub fn reset(&mut self) {
        self.pending_since = None;
        self.last_saved = Instant::now();
    }

    pub fn has_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Due when enabled, changes are pending, and a full interval has passed
    /// since both the last save and the first pending change.
    pub fn is_due_at(&self, now: Instant) -> bool {
        let Some(since) = self.pending_since else {
            return false;
        };
        if !self.enabled {
            return false;
        }
        let anchor = since.max(self.last_saved);
        now.saturating_duration_since(anchor) >= self.interval
    }

    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, secs: u64) {
        self.interval = Duration::from_secs(secs);
        debug!(interval_secs = secs, "Autosave interval updated");
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
