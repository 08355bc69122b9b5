// EmotionState - the single public output of the classifier

use std::fmt;

/// Discrete emotional state reported once per frame
///
/// `Calibrating` is only reported before the baseline exists; the
/// hysteresis stage works on the remaining five states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum EmotionState {
    #[default]
    Calibrating,
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
}

impl EmotionState {
    /// The four scored classes, in tie-break order
    pub const SCORED: [EmotionState; 4] = [
        EmotionState::Happy,
        EmotionState::Sad,
        EmotionState::Angry,
        EmotionState::Surprised,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            EmotionState::Calibrating => "Calibrating",
            EmotionState::Neutral => "Neutral",
            EmotionState::Happy => "Happy",
            EmotionState::Sad => "Sad",
            EmotionState::Angry => "Angry",
            EmotionState::Surprised => "Surprised",
        }
    }
}

impl fmt::Display for EmotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
