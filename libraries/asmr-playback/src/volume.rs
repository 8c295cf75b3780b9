//! Volume and mute state
//!
//! Volume is linear in [0, 1], set from a 0-100 slider. A volume of zero is
//! muted. Unmuting restores the last non-zero volume.

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f64,

    muted: bool,

    /// Restored on unmute
    last_audible: f64,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume (0.0-1.0)
    /// * `fallback` - Restored on unmute when no audible level was seen
    pub fn new(level: f64, fallback: f64) -> Self {
        let level = sanitize(level);
        let fallback = sanitize(fallback);
        Self {
            level,
            muted: level == 0.0,
            last_audible: if level > 0.0 { level } else { fallback },
        }
    }

    /// Set volume from a slider percentage (0-100)
    ///
    /// Returns false when `percent` is not a number.
    pub fn set_percent(&mut self, percent: f64) -> bool {
        if percent.is_nan() {
            return false;
        }
        self.level = percent.clamp(0.0, 100.0) / 100.0;
        self.muted = self.level == 0.0;
        if self.level > 0.0 {
            self.last_audible = self.level;
        }
        true
    }

    /// Flip mute; unmuting restores the last audible level
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.level = self.last_audible;
        } else {
            if self.level > 0.0 {
                self.last_audible = self.level;
            }
            self.muted = true;
            self.level = 0.0;
        }
    }

    /// Current level (0.0 while muted)
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level that unmute would restore
    pub fn last_audible(&self) -> f64 {
        self.last_audible
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.7, 0.7)
    }
}

fn sanitize(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
