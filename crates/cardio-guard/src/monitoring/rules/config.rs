use serde::{Deserialize, Serialize};

/// Thresholds for the emergency rules, in beats per minute and m/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Bradycardia fires at or below this rate.
    pub bradycardia_max_bpm: f64,
    /// Tachycardia fires at or above this rate.
    pub tachycardia_min_bpm: f64,
    /// Fall fires when the acceleration magnitude is strictly above this value.
    pub fall_magnitude: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            bradycardia_max_bpm: 40.0,
            tachycardia_min_bpm: 180.0,
            fall_magnitude: 18.0,
        }
    }
}
