// ChannelSmoother - per-channel exponential moving average
//
// Runs on every frame, including calibration and gated frames; every later
// stage reads its output.

use crate::channel::ChannelFrame;

/// EMA accumulator for all channels
#[derive(Debug, Clone)]
pub struct ChannelSmoother {
    factor: f32,
    smoothed: ChannelFrame,
}

impl ChannelSmoother {
    /// Create a smoother starting from all-zero state
    ///
    /// # Arguments
    /// * `factor` - Fraction of the gap to the raw value closed per frame, in (0, 1]
    pub fn new(factor: f32) -> Self {
        Self {
            factor,
            smoothed: ChannelFrame::zeros(),
        }
    }

    /// Move every channel `factor` of the way toward `raw`
    pub fn update(&mut self, raw: &ChannelFrame) -> &ChannelFrame {
        for (channel, value) in raw.iter() {
            let s = &mut self.smoothed[channel];
            *s += self.factor * (value - *s);
        }
        &self.smoothed
    }

    pub fn current(&self) -> &ChannelFrame {
        &self.smoothed
    }
}
