// Feature normalization - smoothed signal relative to the relaxed face
//
// feature[c] = max(0, (smoothed[c] - baseline[c]) * sensitivity)
//
// The lid tightener additionally loses a share of the eye-closed feature
// before flooring: closing the eyes tightens the lids as a side effect, and
// that part must not read as a squint.

use crate::channel::{Channel, ChannelFrame};
use crate::config::FeatureConfig;

/// Normalized per-channel features for one frame, all >= 0
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Features {
    values: ChannelFrame,
}

impl Features {
    /// Build features directly from values, flooring each at zero
    pub fn from_frame(frame: ChannelFrame) -> Self {
        let mut values = frame;
        for (channel, v) in frame.iter() {
            values[channel] = floor_zero(v);
        }
        Self { values }
    }

    pub fn get(&self, channel: Channel) -> f32 {
        self.values[channel]
    }

    pub fn values(&self) -> &ChannelFrame {
        &self.values
    }

    /// Strongest expression signal, ignoring the eye-closed channel
    pub fn activity(&self) -> f32 {
        self.values
            .iter()
            .filter(|(channel, _)| *channel != Channel::EyeClosed)
            .map(|(_, v)| v)
            .fold(0.0, f32::max)
    }

    /// Eye-widening signal: max(upper lid, outer brow, inner brow)
    pub fn eye_surprise(&self) -> f32 {
        self.get(Channel::UpperLidRaise)
            .max(self.get(Channel::OuterBrowRaise))
            .max(self.get(Channel::InnerBrowRaise))
    }
}

/// Converts baseline offsets into non-negative features
#[derive(Debug, Clone)]
pub struct FeatureNormalizer {
    sensitivity: f32,
    blink_lid_overlap: f32,
}

impl FeatureNormalizer {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            blink_lid_overlap: config.blink_lid_overlap,
        }
    }

    /// Normalize offsets (smoothed - baseline) into features
    pub fn normalize(&self, offsets: &ChannelFrame) -> Features {
        let mut values = ChannelFrame::zeros();
        for (channel, offset) in offsets.iter() {
            values[channel] = floor_zero(offset * self.sensitivity);
        }

        let lid = offsets[Channel::LidTightener] * self.sensitivity
            - values[Channel::EyeClosed] * self.blink_lid_overlap;
        values[Channel::LidTightener] = floor_zero(lid);

        Features { values }
    }
}

/// max(0, v) that also maps NaN to 0
fn floor_zero(v: f32) -> f32 {
    if v > 0.0 {
        v
    } else {
        0.0
    }
}
