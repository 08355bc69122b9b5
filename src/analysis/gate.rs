// Gate - early exits evaluated before scoring
//
// Checked in order:
// 1. Blink: eye-closed feature at or above the blink threshold. The frame is
//    ignored entirely; the stable state is reported unchanged.
// 2. Idle: activity below the activity threshold. The face reads Neutral and
//    the baseline may drift toward it.
// 3. Otherwise the frame is scored. Speech suppression is computed here too:
//    jaw motion without eye-widening or brow-lowering is presumed to be talking.

use crate::analysis::features::Features;
use crate::channel::Channel;
use crate::config::GateConfig;

/// What the gate decided for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Blink,
    Idle,
    Active { likely_talking: bool },
}

/// Evaluates the blink, activity and speech rules
#[derive(Debug, Clone)]
pub struct Gate {
    config: GateConfig,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, features: &Features) -> GateDecision {
        if features.get(Channel::EyeClosed) >= self.config.blink_threshold {
            return GateDecision::Blink;
        }
        if features.activity() < self.config.activity_threshold {
            return GateDecision::Idle;
        }
        GateDecision::Active {
            likely_talking: self.is_likely_talking(features),
        }
    }

    /// Jaw open, eyes not widened, brow not lowered
    pub fn is_likely_talking(&self, features: &Features) -> bool {
        let eye_widened = features.eye_surprise() >= self.config.surprise_eye_min;
        features.get(Channel::JawDrop) >= self.config.talk_jaw_threshold
            && !eye_widened
            && features.get(Channel::BrowLower) < self.config.talk_brow_lower_max
    }
}
