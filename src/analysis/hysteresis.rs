// Hysteresis - debounce plus cooldown for the reported state
//
// A class must be the best class for `switch_hold_frames` consecutive
// evaluated frames before it becomes stable. After a switch, no switch is
// considered for `switch_cooldown_frames` frames.
//
// During cooldown the candidate accumulator is frozen rather than advanced,
// so the hold count for the next switch only starts once the cooldown has
// run out.

use crate::analysis::emotion::EmotionState;
use crate::analysis::scoring::EmotionScores;
use crate::config::HysteresisConfig;

/// Persistent switching state of the classifier
#[derive(Debug, Clone)]
pub struct HysteresisState {
    config: HysteresisConfig,
    stable: EmotionState,
    candidate: EmotionState,
    candidate_count: u32,
    cooldown_remaining: u32,
}

impl HysteresisState {
    /// Fresh state: Neutral, no candidate progress, no cooldown
    pub fn new(config: HysteresisConfig) -> Self {
        Self {
            config,
            stable: EmotionState::Neutral,
            candidate: EmotionState::Neutral,
            candidate_count: 0,
            cooldown_remaining: 0,
        }
    }

    /// Run one active frame through the state machine
    ///
    /// # Returns
    /// The stable state after this frame
    pub fn update(&mut self, scores: &EmotionScores) -> EmotionState {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }

        let best = scores.best(self.config.score_floor);

        if self.cooldown_remaining > 0 {
            return self.stable;
        }

        if best == self.candidate {
            self.candidate_count = self.candidate_count.saturating_add(1);
        } else {
            self.candidate = best;
            self.candidate_count = 1;
        }

        if self.candidate_count >= self.config.switch_hold_frames {
            if self.stable != self.candidate {
                log::debug!(
                    "[Hysteresis] Stable state {} -> {}",
                    self.stable,
                    self.candidate
                );
            }
            self.stable = self.candidate;
            self.cooldown_remaining = self.config.switch_cooldown_frames;
            self.candidate_count = 0;
        }

        self.stable
    }

    /// Idle face: report Neutral without touching the debounce counters
    pub fn force_neutral(&mut self) {
        self.stable = EmotionState::Neutral;
    }

    pub fn stable(&self) -> EmotionState {
        self.stable
    }

    /// Current candidate and how many consecutive frames it has won
    pub fn candidate(&self) -> (EmotionState, u32) {
        (self.candidate, self.candidate_count)
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }
}
