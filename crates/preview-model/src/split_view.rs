//! Split-view clip geometry.
//!
//! Maps the draggable divider position to a CSS-like clip region that
//! exposes the processed frame over the original background, from the
//! divider rightward. Pure geometry; the UI owns the drag interaction.

/// Lowest divider position the drag can reach (percent).
pub const DIVIDER_MIN_PERCENT: f64 = 10.0;

/// Highest divider position the drag can reach (percent).
pub const DIVIDER_MAX_PERCENT: f64 = 90.0;

/// Clip region for the processed overlay at a given divider position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitClip {
    /// Divider position, clamped to [10, 90] percent.
    pub divider_percent: f64,
}

impl SplitClip {
    /// Clamp a raw divider position into the allowed range.
    pub fn at(divider_percent: f64) -> Self {
        Self {
            divider_percent: divider_percent.clamp(DIVIDER_MIN_PERCENT, DIVIDER_MAX_PERCENT),
        }
    }

    /// CSS `clip-path` exposing the overlay from the divider rightward.
    pub fn css_clip_path(&self) -> String {
        format!("inset(0 0 0 {:.2}%)", self.divider_percent)
    }

    /// Fraction of the frame width showing the processed overlay.
    pub fn processed_fraction(&self) -> f64 {
        (100.0 - self.divider_percent) / 100.0
    }
}
