// Emotion Sense Core - real-time facial emotion classification
// Per-frame pipeline from tracker channel weights to a debounced emotional state

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod channel;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod handoff;

// Re-exports for convenience
pub use analysis::{EmotionClassifier, EmotionScores, EmotionState, FrameOutcome, FrameResult};
pub use calibration::{Baseline, CalibrationProgress};
pub use channel::{Channel, ChannelFrame, ExpressionWeights, FaceExpression, SnapshotSource};
pub use config::ClassifierConfig;
pub use error::{ConfigError, ErrorCode};
pub use handoff::{SnapshotConsumer, SnapshotHandoff, SnapshotProducer};
