// Scoring engine - one continuous score per target emotion
//
// Each class starts from a weighted-threshold average of its features:
// a feature below its noise floor contributes 0 instead of its value, and
// the weighted mean is clamped to [0, 1]. Hand-tuned cross-class penalties
// and bonuses are then added on top without re-clamping, so scores may go
// negative; they are only ever compared, never displayed as probabilities.

use crate::analysis::emotion::EmotionState;
use crate::analysis::features::Features;
use crate::channel::Channel;
use crate::config::{PenaltyConfig, ScoringConfig, TermConfig};

/// One (value, weight, threshold) record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedTerm {
    pub value: f32,
    pub weight: f32,
    pub threshold: f32,
}

impl WeightedTerm {
    pub const fn new(value: f32, weight: f32, threshold: f32) -> Self {
        Self {
            value,
            weight,
            threshold,
        }
    }

    fn from_config(value: f32, term: TermConfig) -> Self {
        Self::new(value, term.weight, term.threshold)
    }
}

/// Weighted average of terms, counting sub-threshold values as 0
///
/// Returns a value in [0, 1]; a (near) zero total weight yields 0.
pub fn weighted_score(terms: &[WeightedTerm]) -> f32 {
    let (total, weight) = terms.iter().fold((0.0f32, 0.0f32), |(total, weight), t| {
        let effective = if t.value < t.threshold { 0.0 } else { t.value };
        (total + effective * t.weight, weight + t.weight)
    });

    if weight <= 1e-4 {
        return 0.0;
    }
    (total / weight).clamp(0.0, 1.0)
}

/// Scores of the four target classes from the latest scoring pass
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct EmotionScores {
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub surprise: f32,
}

impl EmotionScores {
    /// Scores paired with their class, in tie-break order
    pub fn ranked(&self) -> [(EmotionState, f32); 4] {
        [
            (EmotionState::Happy, self.happy),
            (EmotionState::Sad, self.sad),
            (EmotionState::Angry, self.angry),
            (EmotionState::Surprised, self.surprise),
        ]
    }

    /// Highest-scoring class, or Neutral when nothing reaches `floor`
    ///
    /// Exact ties go to the class seen first (Happy, Sad, Angry, Surprised).
    pub fn best(&self, floor: f32) -> EmotionState {
        let mut best = EmotionState::Neutral;
        let mut best_score = f32::NEG_INFINITY;
        for (state, score) in self.ranked() {
            if score > best_score {
                best = state;
                best_score = score;
            }
        }

        if best_score < floor {
            EmotionState::Neutral
        } else {
            best
        }
    }
}

/// Computes class scores from normalized features
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score all four classes for one active frame
    ///
    /// # Arguments
    /// * `features` - Normalized features of this frame
    /// * `likely_talking` - Speech-suppression flag from the gate
    pub fn score(&self, features: &Features, likely_talking: bool) -> EmotionScores {
        let f = |c: Channel| features.get(c);
        let eye_surprise = features.eye_surprise();
        let strong_surprise = f(Channel::JawDrop) > self.config.strong_surprise.jaw_above
            && eye_surprise > self.config.strong_surprise.eye_above;

        let mut scores = EmotionScores {
            happy: self.score_happy(features),
            sad: self.score_sad(features),
            angry: self.score_angry(features, strong_surprise),
            surprise: self.score_surprise(features, eye_surprise, strong_surprise),
        };

        if likely_talking {
            scores.sad -= self.config.talking.sad;
            scores.surprise -= self.config.talking.surprise;
        }

        tracing::trace!(
            happy = scores.happy,
            sad = scores.sad,
            angry = scores.angry,
            surprise = scores.surprise,
            likely_talking,
            strong_surprise,
            "[Scoring] class scores"
        );

        scores
    }

    fn score_happy(&self, features: &Features) -> f32 {
        let cfg = &self.config.happy;
        let mut score = weighted_score(&[
            WeightedTerm::from_config(features.get(Channel::CheekRaise), cfg.cheek),
            WeightedTerm::from_config(features.get(Channel::Smile), cfg.smile),
            WeightedTerm::from_config(features.get(Channel::LidTightener), cfg.lid_tightener),
        ]);

        score -= penalty(features.get(Channel::JawDrop), cfg.jaw);
        let cry_signal = features
            .get(Channel::Frown)
            .max(features.get(Channel::InnerBrowRaise));
        score -= penalty(cry_signal, cfg.cry);
        score
    }

    fn score_sad(&self, features: &Features) -> f32 {
        let cfg = &self.config.sad;
        let mut score = weighted_score(&[
            WeightedTerm::from_config(features.get(Channel::Frown), cfg.frown),
            WeightedTerm::from_config(features.get(Channel::InnerBrowRaise), cfg.inner_brow),
        ]);

        score -= penalty(features.get(Channel::BrowLower), cfg.brow_lower);
        score
    }

    fn score_angry(&self, features: &Features, strong_surprise: bool) -> f32 {
        let cfg = &self.config.angry;
        let mut score = weighted_score(&[
            WeightedTerm::from_config(features.get(Channel::BrowLower), cfg.brow_lower),
            WeightedTerm::from_config(features.get(Channel::LipPressor), cfg.lip_pressor),
            WeightedTerm::from_config(features.get(Channel::LidTightener), cfg.lid_tightener),
        ]);

        let happy_signal = features
            .get(Channel::CheekRaise)
            .max(features.get(Channel::Smile));
        score -= penalty(happy_signal, cfg.happy_override);
        if strong_surprise {
            score -= cfg.strong_surprise_penalty;
        }
        score -= penalty(features.get(Channel::InnerBrowRaise), cfg.inner_brow);
        score
    }

    fn score_surprise(&self, features: &Features, eye_surprise: f32, strong_surprise: bool) -> f32 {
        let cfg = &self.config.surprise;
        let mut score = weighted_score(&[
            WeightedTerm::from_config(features.get(Channel::JawDrop), cfg.jaw),
            WeightedTerm::from_config(eye_surprise, cfg.eye),
        ]);

        if strong_surprise {
            score += cfg.strong_surprise_bonus;
        }
        if eye_surprise < cfg.eye_missing_below {
            score -= cfg.eye_missing_penalty;
        }
        score
    }
}

/// `rule.penalty` when `signal` strictly exceeds `rule.above`, else 0
fn penalty(signal: f32, rule: PenaltyConfig) -> f32 {
    if signal > rule.above {
        rule.penalty
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod tests;
