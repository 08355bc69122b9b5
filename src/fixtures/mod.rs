//! Fixture utilities for the deterministic CLI harness.
//!
//! A fixture is a JSON frame script: a list of segments, each holding a set
//! of channel values for a number of frames, optionally with seeded jitter.
//! This module discovers scripts, renders them into frames, parses optional
//! expectation JSON, and replays the frames through an `EmotionClassifier`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::{EmotionClassifier, EmotionState, FrameResult};
use crate::channel::{Channel, ChannelFrame};
use crate::config::ClassifierConfig;

/// Default location for fixture JSON assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

const SCRIPT_EXTENSION: &str = "json";
const EXPECT_SUFFIX: &str = ".expect.json";

/// Metadata describing an available fixture.
#[derive(Clone, Debug)]
pub struct FixtureMetadata {
    pub name: String,
    pub script_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Frame script as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureScript {
    /// Seconds per frame
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    /// Seed for segment jitter
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub segments: Vec<FixtureSegment>,
}

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

/// A run of frames sharing the same channel values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSegment {
    pub frames: usize,
    /// Omitted channels are relaxed (0.0)
    #[serde(default)]
    pub channels: ChannelFrame,
    /// Half-width of uniform noise added to every channel
    #[serde(default)]
    pub jitter: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FixtureScript {
    pub fn total_frames(&self) -> usize {
        self.segments.iter().map(|s| s.frames).sum()
    }

    /// Expand segments into per-frame snapshots
    ///
    /// Jitter draws from one `StdRng` seeded by `seed`, so a script always
    /// renders to the same frames.
    pub fn render(&self) -> Vec<ChannelFrame> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut frames = Vec::with_capacity(self.total_frames());

        for segment in &self.segments {
            let jitter = segment.jitter.abs();
            for _ in 0..segment.frames {
                let mut frame = segment.channels;
                if jitter > 0.0 {
                    for channel in Channel::ALL {
                        frame[channel] += rng.gen_range(-jitter..=jitter);
                    }
                }
                frames.push(frame.clamped());
            }
        }

        frames
    }
}

/// Loaded fixture script plus optional expectations.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub script: FixtureScript,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureExpectations {
    #[serde(default)]
    pub fixture: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Reported state required at specific frames
    #[serde(default)]
    pub states: Vec<ExpectedState>,
    /// States that must never be reported
    #[serde(default)]
    pub never: Vec<EmotionState>,
}

/// Expected reported state at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedState {
    pub frame: u64,
    pub emotion: EmotionState,
}

impl FixtureExpectations {
    pub fn verify(&self, actual: &[FrameResult]) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        for (index, expected) in self.states.iter().enumerate() {
            let found = usize::try_from(expected.frame)
                .ok()
                .and_then(|frame| actual.get(frame));
            match found {
                Some(result) if result.emotion == expected.emotion => {}
                other => failures.push(ExpectationFailure::State {
                    index,
                    expected: *expected,
                    actual: other.map(|result| result.emotion),
                }),
            }
        }

        for &forbidden in &self.never {
            if let Some(result) = actual.iter().find(|r| r.emotion == forbidden) {
                failures.push(ExpectationFailure::Forbidden {
                    emotion: forbidden,
                    first_frame: result.frame_index,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing actual results with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failure_count": self.failures.len(),
            "failures": self.failures,
        })
    }
}

/// Detailed diff entry for a single failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectationFailure {
    /// Reported state at a frame differs; `actual` is None past the last frame
    State {
        index: usize,
        expected: ExpectedState,
        actual: Option<EmotionState>,
    },
    /// A forbidden state was reported
    Forbidden {
        emotion: EmotionState,
        first_frame: u64,
    },
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("listing {}", self.root.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_script(&path) {
                fixtures.push(self.metadata_for_path(&path)?);
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture script + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>) -> Result<FixtureData> {
        let script_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&script_path)?;

        let json = fs::read_to_string(&script_path)
            .with_context(|| format!("reading fixture {}", script_path.display()))?;
        let script: FixtureScript = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", script_path.display()))?;

        let expectation_path = override_expect.or_else(|| metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading expectation {}", path.display()))?;
                Some(
                    serde_json::from_str(&json)
                        .with_context(|| format!("parsing {}", path.display()))?,
                )
            }
            None => None,
        };

        Ok(FixtureData {
            metadata,
            script,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{fixture}.{SCRIPT_EXTENSION}"));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(anyhow!(
                "Fixture '{fixture}' not found in {}",
                self.root.display()
            ))
        }
    }

    fn metadata_for_path(&self, script_path: &Path) -> Result<FixtureMetadata> {
        let name = script_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", script_path.display()))?
            .to_string();
        let expect_path = script_path.with_file_name(format!("{name}{EXPECT_SUFFIX}"));
        Ok(FixtureMetadata {
            name,
            script_path: script_path.to_path_buf(),
            expect_path: expect_path.is_file().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// `*.json` but not `*.expect.json`
fn is_script(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().and_then(|ext| ext.to_str()) == Some(SCRIPT_EXTENSION)
        && !file_name.ends_with(EXPECT_SUFFIX)
}

/// Replays rendered fixture frames through a fresh classifier.
pub struct FixtureProcessor {
    config: ClassifierConfig,
}

impl FixtureProcessor {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, data: &FixtureData) -> Result<Vec<FrameResult>> {
        let mut classifier = EmotionClassifier::new(self.config.clone())
            .context("building classifier from configuration")?;
        let dt = data.script.frame_dt;

        Ok(data
            .script
            .render()
            .iter()
            .map(|frame| classifier.process_frame(frame, dt))
            .collect())
    }
}

/// Per-run summary written by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureSummary {
    pub frame_count: usize,
    pub calibrated_at: Option<u64>,
    pub final_emotion: Option<EmotionState>,
    pub switches: Vec<SwitchRecord>,
}

/// One reported-state change.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SwitchRecord {
    pub frame: u64,
    pub from: EmotionState,
    pub to: EmotionState,
}

impl FixtureSummary {
    pub fn from_results(results: &[FrameResult]) -> Self {
        let switches = results
            .iter()
            .filter_map(|r| {
                r.switched.map(|s| SwitchRecord {
                    frame: r.frame_index,
                    from: s.from,
                    to: s.to,
                })
            })
            .collect::<Vec<_>>();
        let calibrated_at = switches
            .iter()
            .find(|s| s.from == EmotionState::Calibrating)
            .map(|s| s.frame);

        Self {
            frame_count: results.len(),
            calibrated_at,
            final_emotion: results.last().map(|r| r.emotion),
            switches,
        }
    }
}
