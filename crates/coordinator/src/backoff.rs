//! Playback failure backoff.

/// Consecutive decode-failure counter for the active video segment.
///
/// A segment that fails to decode a few times in a row is usually still
/// being flushed by the backend; abandoning it and forcing a fresh cycle
/// is cheaper than waiting on a file that may never become playable.
#[derive(Debug)]
pub struct PlaybackBackoff {
    failures: u32,
    threshold: u32,
}

impl PlaybackBackoff {
    /// Counter that abandons the artifact after `threshold` consecutive
    /// failures.
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: 0,
            threshold: threshold.max(1),
        }
    }

    /// Record one decode failure. Returns true when the threshold is
    /// reached and the artifact should be abandoned; the counter resets
    /// so a replacement artifact starts with a clean slate.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        if self.failures >= self.threshold {
            self.failures = 0;
            true
        } else {
            false
        }
    }

    /// A successful frame decode resets the streak.
    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    /// Reset the counter (e.g. when a new artifact replaces the old one).
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
