// CalibrationProcedure - relaxed-face warm-up window
//
// While the classifier reports Calibrating, every smoothed frame is summed
// per channel. Once the accumulated frame time reaches the configured
// duration the sums are averaged into a Baseline.

use crate::calibration::progress::CalibrationProgress;
use crate::calibration::state::Baseline;
use crate::channel::ChannelFrame;

/// Accumulates smoothed frames over the warm-up window
#[derive(Debug, Clone)]
pub struct CalibrationProcedure {
    /// Configured warm-up duration in seconds
    duration_secs: f32,
    /// Frame time accumulated so far
    elapsed_secs: f32,
    /// Frames summed so far
    frame_count: u32,
    /// Running per-channel sums of smoothed values
    sums: ChannelFrame,
    /// Set once the baseline has been produced
    complete: bool,
}

impl CalibrationProcedure {
    /// Create a new calibration procedure
    ///
    /// # Arguments
    /// * `duration_secs` - Warm-up duration (default: 2.0)
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            elapsed_secs: 0.0,
            frame_count: 0,
            sums: ChannelFrame::zeros(),
            complete: false,
        }
    }

    /// Create with default configuration (2 second window)
    pub fn new_default() -> Self {
        Self::new(2.0)
    }

    /// Add one smoothed frame
    ///
    /// # Arguments
    /// * `smoothed` - Smoothed channel values for this frame
    /// * `dt_secs` - Frame time; negative or non-finite values count as 0
    ///
    /// # Returns
    /// * `Some(Baseline)` - on the frame that completes the window
    /// * `None` - still calibrating, or already complete
    pub fn accumulate(&mut self, smoothed: &ChannelFrame, dt_secs: f32) -> Option<Baseline> {
        if self.complete {
            return None;
        }

        if dt_secs.is_finite() && dt_secs > 0.0 {
            self.elapsed_secs += dt_secs;
        }
        for (channel, value) in smoothed.iter() {
            self.sums[channel] += value;
        }
        self.frame_count = self.frame_count.saturating_add(1);

        if self.elapsed_secs >= self.duration_secs {
            self.complete = true;
            let baseline = self.finalize();
            log::info!(
                "[Calibration] Baseline captured from {} frames over {:.2}s",
                self.frame_count,
                self.elapsed_secs
            );
            Some(baseline)
        } else {
            None
        }
    }

    /// Average the sums collected so far into a Baseline
    ///
    /// Zero collected frames yields the all-zero baseline.
    pub fn finalize(&self) -> Baseline {
        Baseline::from_sums(&self.sums, self.frame_count)
    }

    /// Reset sums, timer, frame count and completion flag
    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
        self.frame_count = 0;
        self.sums = ChannelFrame::zeros();
        self.complete = false;
    }

    /// Get current calibration progress
    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress::new(self.elapsed_secs, self.duration_secs, self.frame_count)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}
