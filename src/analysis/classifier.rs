// EmotionClassifier - per-frame orchestration of the pipeline
//
// Snapshot -> Smoothing -> (Calibration until the baseline exists)
//          -> Normalization -> Gate -> Scoring -> Hysteresis -> stable state
//
// One instance owns all persistent state (smoothed channels, baseline,
// hysteresis counters) and is driven by exactly one caller, once per frame.
// Nothing here blocks or allocates per frame.

use crate::analysis::emotion::EmotionState;
use crate::analysis::features::{FeatureNormalizer, Features};
use crate::analysis::gate::{Gate, GateDecision};
use crate::analysis::hysteresis::HysteresisState;
use crate::analysis::scoring::{EmotionScores, ScoringEngine};
use crate::analysis::smoothing::ChannelSmoother;
use crate::calibration::{Baseline, CalibrationProcedure, CalibrationProgress};
use crate::channel::ChannelFrame;
use crate::config::ClassifierConfig;
use crate::error::ConfigError;

/// Why a frame produced the state it did
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Still collecting the relaxed-face baseline
    Calibrating { progress: CalibrationProgress },
    /// This frame completed calibration; the classifier now reports Neutral
    CalibrationComplete,
    /// Eyes closed; nothing was updated
    Blink,
    /// Below the activity threshold; Neutral forced and baseline drifted
    Idle,
    /// Scored and passed through hysteresis
    Classified {
        best: EmotionState,
        likely_talking: bool,
    },
}

/// A change of the reported state
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateSwitch {
    pub from: EmotionState,
    pub to: EmotionState,
}

/// Everything observable about one processed frame
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameResult {
    /// Zero-based index of the frame since construction
    pub frame_index: u64,
    /// Reported state after this frame
    pub emotion: EmotionState,
    pub outcome: FrameOutcome,
    /// Scores from the most recent scoring pass (not necessarily this frame)
    pub scores: EmotionScores,
    /// Set when the reported state differs from the previous frame
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub switched: Option<StateSwitch>,
}

#[derive(Debug, Clone)]
enum Phase {
    Calibrating(CalibrationProcedure),
    Operating {
        baseline: Baseline,
        hysteresis: HysteresisState,
    },
}

/// Real-time facial emotion classifier
///
/// Starts in `Calibrating`. After the configured warm-up window it reports one
/// of Neutral, Happy, Sad, Angry or Surprised per frame.
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    config: ClassifierConfig,
    smoother: ChannelSmoother,
    normalizer: FeatureNormalizer,
    gate: Gate,
    scoring: ScoringEngine,
    phase: Phase,
    scores: EmotionScores,
    features: Option<Features>,
    frames_processed: u64,
}

impl EmotionClassifier {
    /// Create a classifier from a validated configuration
    ///
    /// # Returns
    /// * `Ok(EmotionClassifier)` - in the Calibrating phase
    /// * `Err(ConfigError)` - if any tunable is out of range
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ClassifierConfig) -> Self {
        log::info!(
            "[EmotionClassifier] Calibrating for {:.2}s",
            config.calibration.duration_secs
        );
        Self {
            smoother: ChannelSmoother::new(config.features.smoothing_factor),
            normalizer: FeatureNormalizer::new(&config.features),
            gate: Gate::new(config.gate.clone()),
            scoring: ScoringEngine::new(config.scoring.clone()),
            phase: Phase::Calibrating(CalibrationProcedure::new(
                config.calibration.duration_secs,
            )),
            scores: EmotionScores::default(),
            features: None,
            frames_processed: 0,
            config,
        }
    }

    /// Run one frame through the pipeline
    ///
    /// # Arguments
    /// * `raw` - Raw channel snapshot; values are clamped to [0, 1]
    /// * `dt_secs` - Time since the previous frame; only advances calibration
    pub fn process_frame(&mut self, raw: &ChannelFrame, dt_secs: f32) -> FrameResult {
        let frame_index = self.frames_processed;
        self.frames_processed = self.frames_processed.saturating_add(1);

        let before = self.emotion();
        let smoothed = *self.smoother.update(&raw.clamped());

        let mut completed = None;
        let outcome = match &mut self.phase {
            Phase::Calibrating(procedure) => match procedure.accumulate(&smoothed, dt_secs) {
                Some(baseline) => {
                    completed = Some(baseline);
                    FrameOutcome::CalibrationComplete
                }
                None => FrameOutcome::Calibrating {
                    progress: procedure.progress(),
                },
            },
            Phase::Operating {
                baseline,
                hysteresis,
            } => {
                let features = baseline.apply(&smoothed, &self.normalizer);
                self.features = Some(features);

                match self.gate.evaluate(&features) {
                    GateDecision::Blink => FrameOutcome::Blink,
                    GateDecision::Idle => {
                        hysteresis.force_neutral();
                        baseline.drift(&smoothed, self.config.calibration.drift_rate);
                        FrameOutcome::Idle
                    }
                    GateDecision::Active { likely_talking } => {
                        let scores = self.scoring.score(&features, likely_talking);
                        self.scores = scores;
                        hysteresis.update(&scores);
                        FrameOutcome::Classified {
                            best: scores.best(self.config.hysteresis.score_floor),
                            likely_talking,
                        }
                    }
                }
            }
        };

        if let Some(baseline) = completed {
            self.phase = Phase::Operating {
                baseline,
                hysteresis: HysteresisState::new(self.config.hysteresis.clone()),
            };
        }

        let emotion = self.emotion();
        let switched = (emotion != before).then_some(StateSwitch {
            from: before,
            to: emotion,
        });
        if let Some(switch) = switched {
            log::info!(
                "[EmotionClassifier] Frame {}: {} -> {}",
                frame_index,
                switch.from,
                switch.to
            );
        }

        tracing::debug!(
            frame = frame_index,
            emotion = %emotion,
            outcome = ?outcome,
            "[EmotionClassifier] frame processed"
        );

        FrameResult {
            frame_index,
            emotion,
            outcome,
            scores: self.scores,
            switched,
        }
    }

    /// Re-enter the Calibrating phase
    ///
    /// Discards the baseline and hysteresis state. The smoothed channels are
    /// kept so the new baseline starts from the current face.
    pub fn reset_calibration(&mut self) {
        log::info!("[EmotionClassifier] Calibration reset");
        self.phase = Phase::Calibrating(CalibrationProcedure::new(
            self.config.calibration.duration_secs,
        ));
        self.scores = EmotionScores::default();
        self.features = None;
    }

    /// Currently reported state
    pub fn emotion(&self) -> EmotionState {
        match &self.phase {
            Phase::Calibrating(_) => EmotionState::Calibrating,
            Phase::Operating { hysteresis, .. } => hysteresis.stable(),
        }
    }

    /// Scores from the most recent scoring pass
    pub fn scores(&self) -> EmotionScores {
        self.scores
    }

    /// Normalized features of the most recent operating frame
    pub fn features(&self) -> Option<&Features> {
        self.features.as_ref()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        match &self.phase {
            Phase::Calibrating(_) => None,
            Phase::Operating { baseline, .. } => Some(baseline),
        }
    }

    pub fn hysteresis(&self) -> Option<&HysteresisState> {
        match &self.phase {
            Phase::Calibrating(_) => None,
            Phase::Operating { hysteresis, .. } => Some(hysteresis),
        }
    }

    /// Progress through the warm-up window, `None` once calibrated
    pub fn calibration_progress(&self) -> Option<CalibrationProgress> {
        match &self.phase {
            Phase::Calibrating(procedure) => Some(procedure.progress()),
            Phase::Operating { .. } => None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.phase, Phase::Operating { .. })
    }

    pub fn smoothed(&self) -> &ChannelFrame {
        self.smoother.current()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::build(ClassifierConfig::default())
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
