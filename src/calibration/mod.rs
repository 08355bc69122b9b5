// Calibration module - relaxed-face baseline capture and drift correction
//
// This module provides three components:
// 1. CalibrationProcedure: accumulates smoothed values over a warm-up window
// 2. Baseline: per-channel zero point, applied every active frame and slowly
//    drifted toward the current face on idle frames
// 3. CalibrationProgress: observable progress through the warm-up window
//
// The calibration workflow:
// 1. Create CalibrationProcedure (or reset an existing one)
// 2. Feed one smoothed frame plus elapsed time per tick
// 3. When the configured duration has elapsed, the averaged Baseline is returned

pub mod procedure;
pub mod progress;
pub mod state;

pub use procedure::CalibrationProcedure;
pub use progress::CalibrationProgress;
pub use state::Baseline;
