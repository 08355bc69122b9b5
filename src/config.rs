//! Configuration management for classifier tuning
//!
//! Every tunable of the pipeline lives here with its tuned default.
//! Configuration can be loaded from JSON files, enabling fast iteration
//! without recompilation. Each section is `#[serde(default)]`, so a file
//! only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{log_config_error, ConfigError};

/// Complete classifier configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub features: FeatureConfig,
    pub calibration: CalibrationConfig,
    pub gate: GateConfig,
    pub hysteresis: HysteresisConfig,
    pub scoring: ScoringConfig,
}

/// Smoothing and normalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// EMA factor in (0, 1]; fraction of the gap to the raw value closed per frame
    pub smoothing_factor: f32,
    /// Gain applied to (smoothed - baseline)
    pub sensitivity: f32,
    /// Fraction of the eye-closed feature removed from the lid tightener
    pub blink_lid_overlap: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.15,
            sensitivity: 2.4,
            blink_lid_overlap: 0.9,
        }
    }
}

/// Calibration and baseline drift parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Warm-up duration spent averaging the relaxed face
    pub duration_secs: f32,
    /// Per-frame drift of the baseline toward smoothed values on idle frames
    pub drift_rate: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 2.0,
            drift_rate: 0.002,
        }
    }
}

/// Early-exit gate thresholds (all on normalized features)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Eye-closed feature at or above this is a blink
    pub blink_threshold: f32,
    /// Max non-eye feature below this is an idle face
    pub activity_threshold: f32,
    /// Jaw feature at or above this may be speech
    pub talk_jaw_threshold: f32,
    /// Eye-widening at or above this rules speech out
    pub surprise_eye_min: f32,
    /// Brow lowering at or above this rules speech out
    pub talk_brow_lower_max: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            blink_threshold: 0.55,
            activity_threshold: 0.35,
            talk_jaw_threshold: 0.55,
            surprise_eye_min: 0.25,
            talk_brow_lower_max: 0.60,
        }
    }
}

/// Debounce and cooldown for stable-state switching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    /// Consecutive winning frames before a class becomes stable
    pub switch_hold_frames: u32,
    /// Frames after a switch during which no switch is considered
    pub switch_cooldown_frames: u32,
    /// Best score below this reads as Neutral
    pub score_floor: f32,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            switch_hold_frames: 6,
            switch_cooldown_frames: 10,
            score_floor: 0.1,
        }
    }
}

/// Weight and noise floor of one feature inside a class score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermConfig {
    pub weight: f32,
    pub threshold: f32,
}

impl TermConfig {
    pub const fn new(weight: f32, threshold: f32) -> Self {
        Self { weight, threshold }
    }
}

/// Penalty applied when a feature exceeds a limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Feature value the signal must exceed (strictly)
    pub above: f32,
    pub penalty: f32,
}

impl PenaltyConfig {
    pub const fn new(above: f32, penalty: f32) -> Self {
        Self { above, penalty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HappyScoring {
    pub cheek: TermConfig,
    pub smile: TermConfig,
    pub lid_tightener: TermConfig,
    /// Open jaw distorts cheek and mouth shape
    pub jaw: PenaltyConfig,
    /// max(frown, inner brow): crying contamination
    pub cry: PenaltyConfig,
}

impl Default for HappyScoring {
    fn default() -> Self {
        Self {
            cheek: TermConfig::new(1.0, 0.20),
            smile: TermConfig::new(0.8, 0.20),
            lid_tightener: TermConfig::new(0.4, 0.15),
            jaw: PenaltyConfig::new(0.60, 0.30),
            cry: PenaltyConfig::new(0.35, 0.40),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SadScoring {
    pub frown: TermConfig,
    pub inner_brow: TermConfig,
    /// Lowered brow reads as anger
    pub brow_lower: PenaltyConfig,
}

impl Default for SadScoring {
    fn default() -> Self {
        Self {
            frown: TermConfig::new(1.0, 0.20),
            inner_brow: TermConfig::new(0.8, 0.15),
            brow_lower: PenaltyConfig::new(0.45, 0.30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngryScoring {
    pub brow_lower: TermConfig,
    pub lip_pressor: TermConfig,
    pub lid_tightener: TermConfig,
    /// max(cheek, smile): a smiling face is not angry
    pub happy_override: PenaltyConfig,
    /// Subtracted when the strong-surprise pattern holds
    pub strong_surprise_penalty: f32,
    /// Raised inner brow weakens the anger reading
    pub inner_brow: PenaltyConfig,
}

impl Default for AngryScoring {
    fn default() -> Self {
        Self {
            brow_lower: TermConfig::new(1.0, 0.20),
            lip_pressor: TermConfig::new(0.6, 0.10),
            lid_tightener: TermConfig::new(0.4, 0.10),
            happy_override: PenaltyConfig::new(0.45, 0.60),
            strong_surprise_penalty: 0.60,
            inner_brow: PenaltyConfig::new(0.35, 0.20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurpriseScoring {
    pub jaw: TermConfig,
    pub eye: TermConfig,
    /// Added when the strong-surprise pattern holds
    pub strong_surprise_bonus: f32,
    /// Eye-widening below this means an open mouth alone
    pub eye_missing_below: f32,
    pub eye_missing_penalty: f32,
}

impl Default for SurpriseScoring {
    fn default() -> Self {
        Self {
            jaw: TermConfig::new(1.0, 0.25),
            eye: TermConfig::new(0.8, 0.15),
            strong_surprise_bonus: 0.20,
            eye_missing_below: 0.18,
            eye_missing_penalty: 0.40,
        }
    }
}

/// Jaw and eye levels that together read as a strong surprise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrongSurpriseConfig {
    pub jaw_above: f32,
    pub eye_above: f32,
}

impl Default for StrongSurpriseConfig {
    fn default() -> Self {
        Self {
            jaw_above: 0.65,
            eye_above: 0.22,
        }
    }
}

/// Penalties applied while the face is likely talking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkingPenalties {
    pub sad: f32,
    pub surprise: f32,
}

impl Default for TalkingPenalties {
    fn default() -> Self {
        Self {
            sad: 0.30,
            surprise: 0.40,
        }
    }
}

/// Per-class weights, thresholds and adjustments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub happy: HappyScoring,
    pub sad: SadScoring,
    pub angry: AngryScoring,
    pub surprise: SurpriseScoring,
    pub strong_surprise: StrongSurpriseConfig,
    pub talking: TalkingPenalties,
}

impl ClassifierConfig {
    /// Load configuration from JSON file
    ///
    /// Never fails: a missing, unreadable or invalid file logs a warning and
    /// yields the default configuration.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log::warn!(
                    "[Config] Failed to load {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load and validate configuration from JSON file
    pub fn try_load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path).map_err(|err| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable against its accepted range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(err) = &result {
            log_config_error(err, "validate");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        let f = &self.features;
        if !(f.smoothing_factor > 0.0 && f.smoothing_factor <= 1.0) {
            return Err(ConfigError::invalid(
                "features.smoothing_factor",
                f.smoothing_factor,
                "must be in (0, 1]",
            ));
        }
        if !(f.sensitivity > 0.0 && f.sensitivity.is_finite()) {
            return Err(ConfigError::invalid(
                "features.sensitivity",
                f.sensitivity,
                "must be a positive finite gain",
            ));
        }
        require_finite("features.blink_lid_overlap", f.blink_lid_overlap)?;

        let c = &self.calibration;
        if !(c.duration_secs >= 0.0 && c.duration_secs.is_finite()) {
            return Err(ConfigError::invalid(
                "calibration.duration_secs",
                c.duration_secs,
                "must be a non-negative number of seconds",
            ));
        }
        if !(0.0..=1.0).contains(&c.drift_rate) {
            return Err(ConfigError::invalid(
                "calibration.drift_rate",
                c.drift_rate,
                "must be in [0, 1]",
            ));
        }

        let g = &self.gate;
        require_finite("gate.blink_threshold", g.blink_threshold)?;
        require_finite("gate.activity_threshold", g.activity_threshold)?;
        require_finite("gate.talk_jaw_threshold", g.talk_jaw_threshold)?;
        require_finite("gate.surprise_eye_min", g.surprise_eye_min)?;
        require_finite("gate.talk_brow_lower_max", g.talk_brow_lower_max)?;

        let h = &self.hysteresis;
        if h.switch_hold_frames == 0 {
            return Err(ConfigError::invalid(
                "hysteresis.switch_hold_frames",
                h.switch_hold_frames,
                "must be >= 1",
            ));
        }
        require_finite("hysteresis.score_floor", h.score_floor)?;

        let s = &self.scoring;
        require_weights(
            "scoring.happy",
            &[s.happy.cheek, s.happy.smile, s.happy.lid_tightener],
        )?;
        require_weights("scoring.sad", &[s.sad.frown, s.sad.inner_brow])?;
        require_weights(
            "scoring.angry",
            &[s.angry.brow_lower, s.angry.lip_pressor, s.angry.lid_tightener],
        )?;
        require_weights("scoring.surprise", &[s.surprise.jaw, s.surprise.eye])?;
        Ok(())
    }
}

fn require_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, value, "must be finite"))
    }
}

fn require_weights(name: &'static str, terms: &[TermConfig]) -> Result<(), ConfigError> {
    if let Some(bad) = terms
        .iter()
        .find(|t| !(t.weight >= 0.0 && t.weight.is_finite() && t.threshold.is_finite()))
    {
        return Err(ConfigError::invalid(
            name,
            bad.weight,
            "term weights must be non-negative and finite",
        ));
    }
    let total: f32 = terms.iter().map(|t| t.weight).sum();
    if total <= 0.0 {
        return Err(ConfigError::invalid(
            name,
            total,
            "term weights must sum to a positive value",
        ));
    }
    Ok(())
}
