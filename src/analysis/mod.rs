// Analysis module - per-frame emotion classification pipeline
//
// This module holds every stage that runs once per frame:
// - ChannelSmoother: EMA per channel, always on
// - FeatureNormalizer: baseline-relative, sensitivity-scaled features
// - Gate: blink and idle early exits, speech suppression flag
// - ScoringEngine: weighted-threshold score per target class
// - HysteresisState: debounce plus cooldown on the reported state
//
// EmotionClassifier wires them together with the calibration module and is
// the only type most hosts need.

pub mod classifier;
pub mod emotion;
pub mod features;
pub mod gate;
pub mod hysteresis;
pub mod scoring;
pub mod smoothing;

pub use classifier::{EmotionClassifier, FrameOutcome, FrameResult, StateSwitch};
pub use emotion::EmotionState;
pub use features::{FeatureNormalizer, Features};
pub use gate::{Gate, GateDecision};
pub use hysteresis::HysteresisState;
pub use scoring::{weighted_score, EmotionScores, ScoringEngine, WeightedTerm};
pub use smoothing::ChannelSmoother;
