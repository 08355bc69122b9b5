// Progress tracking for the calibration warm-up window

/// Progress information for the calibration window
///
/// Lets a display show a countdown while the user holds a relaxed face.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationProgress {
    /// Seconds accumulated so far
    pub elapsed_secs: f32,
    /// Configured warm-up duration
    pub duration_secs: f32,
    /// Frames averaged into the baseline so far
    pub frames_collected: u32,
}

impl CalibrationProgress {
    pub fn new(elapsed_secs: f32, duration_secs: f32, frames_collected: u32) -> Self {
        Self {
            elapsed_secs,
            duration_secs,
            frames_collected,
        }
    }

    /// Completed fraction in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
    }

    /// Seconds left before the baseline is captured
    pub fn remaining_secs(&self) -> f32 {
        (self.duration_secs - self.elapsed_secs).max(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_secs >= self.duration_secs
    }

    /// Get progress percentage (0-100)
    pub fn percentage(&self) -> u8 {
        (self.fraction() * 100.0) as u8
    }
}
