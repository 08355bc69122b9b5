// Baseline - the per-channel zero point of the relaxed face
//
// Created by averaging smoothed values over the calibration window. After
// that it only moves through `drift`, a bounded exponential step taken on
// idle frames, so a single frame can never relocate it.

use crate::analysis::features::{FeatureNormalizer, Features};
use crate::channel::{Channel, ChannelFrame};

/// Per-channel relaxed-face values
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    values: ChannelFrame,
}

impl Baseline {
    pub fn new(values: ChannelFrame) -> Self {
        Self { values }
    }

    /// Average per-channel sums over `frames`, flooring the divisor at 1
    ///
    /// A zero-frame window yields the all-zero baseline.
    pub fn from_sums(sums: &ChannelFrame, frames: u32) -> Self {
        let inv = 1.0 / frames.max(1) as f32;
        let mut values = ChannelFrame::zeros();
        for (channel, sum) in sums.iter() {
            values[channel] = sum * inv;
        }
        Self { values }
    }

    pub fn values(&self) -> &ChannelFrame {
        &self.values
    }

    pub fn get(&self, channel: Channel) -> f32 {
        self.values[channel]
    }

    /// Amount each smoothed channel sits above or below the baseline
    pub fn offsets(&self, smoothed: &ChannelFrame) -> ChannelFrame {
        let mut out = ChannelFrame::zeros();
        for (channel, value) in smoothed.iter() {
            out[channel] = value - self.values[channel];
        }
        out
    }

    /// Normalize this frame's smoothed values against the baseline
    pub fn apply(&self, smoothed: &ChannelFrame, normalizer: &FeatureNormalizer) -> Features {
        normalizer.normalize(&self.offsets(smoothed))
    }

    /// Move every channel `rate` of the way toward `smoothed`
    pub fn drift(&mut self, smoothed: &ChannelFrame, rate: f32) {
        for (channel, value) in smoothed.iter() {
            let b = &mut self.values[channel];
            *b += rate * (value - *b);
        }
    }
}
