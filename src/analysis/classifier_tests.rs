use super::*;
use crate::channel::Channel;

/// 1/64 s is exact in binary, so 128 frames reach the 2.0s window exactly
const DT: f32 = 1.0 / 64.0;
const CALIBRATION_FRAMES: usize = 128;

fn happy_frame() -> ChannelFrame {
    ChannelFrame::zeros()
        .with(Channel::CheekRaise, 0.8)
        .with(Channel::Smile, 0.7)
}

/// Feed `raw` until calibration completes, returning the completing frame
fn calibrate(classifier: &mut EmotionClassifier, raw: ChannelFrame) -> FrameResult {
    for i in 0..CALIBRATION_FRAMES - 1 {
        let result = classifier.process_frame(&raw, DT);
        assert_eq!(
            result.emotion,
            EmotionState::Calibrating,
            "calibration finished early at frame {}",
            i
        );
    }
    classifier.process_frame(&raw, DT)
}

/// Zero-calibrated classifier that has just committed Happy
///
/// Returns the classifier and the number of post-calibration frames fed.
fn classifier_in_happy() -> (EmotionClassifier, usize) {
    let mut classifier = EmotionClassifier::default();
    calibrate(&mut classifier, ChannelFrame::zeros());
    for frame in 1..=7 {
        let result = classifier.process_frame(&happy_frame(), DT);
        if result.emotion == EmotionState::Happy {
            return (classifier, frame);
        }
    }
    panic!("Happy never committed");
}

#[test]
fn test_starts_calibrating() {
    let classifier = EmotionClassifier::default();
    assert_eq!(classifier.emotion(), EmotionState::Calibrating);
    assert!(!classifier.is_calibrated());
    assert!(classifier.baseline().is_none());
    assert!(classifier.hysteresis().is_none());
    assert_eq!(classifier.scores(), EmotionScores::default());
}

#[test]
fn test_zero_calibration_yields_zero_baseline_and_neutral() {
    let mut classifier = EmotionClassifier::default();
    let result = calibrate(&mut classifier, ChannelFrame::zeros());

    assert_eq!(result.frame_index, 127);
    assert_eq!(result.outcome, FrameOutcome::CalibrationComplete);
    assert_eq!(result.emotion, EmotionState::Neutral);
    assert_eq!(
        result.switched,
        Some(StateSwitch {
            from: EmotionState::Calibrating,
            to: EmotionState::Neutral,
        })
    );

    let baseline = classifier.baseline().expect("calibrated");
    for (channel, v) in baseline.values().iter() {
        assert_eq!(v, 0.0, "{} baseline should be zero", channel.name());
    }
}

#[test]
fn test_calibration_progress_is_reported() {
    let mut classifier = EmotionClassifier::default();
    let mut halfway = None;
    for _ in 0..64 {
        halfway = Some(classifier.process_frame(&ChannelFrame::zeros(), DT));
    }

    match halfway.map(|r| r.outcome) {
        Some(FrameOutcome::Calibrating { progress }) => {
            assert_eq!(progress.frames_collected, 64);
            assert_eq!(progress.fraction(), 0.5);
            assert_eq!(progress.percentage(), 50);
        }
        other => panic!("expected calibrating outcome, got {:?}", other),
    }
    assert!(classifier.calibration_progress().is_some());
}

#[test]
fn test_constant_input_calibrates_to_that_value() {
    let mut classifier = EmotionClassifier::default();
    let raw = ChannelFrame::splat(0.3);
    let result = calibrate(&mut classifier, raw);
    assert_eq!(result.emotion, EmotionState::Neutral);

    // the baseline averages the EMA ramp-up, so it sits slightly below 0.3
    let baseline = *classifier.baseline().expect("calibrated");
    for (channel, v) in baseline.values().iter() {
        assert!(
            (v - 0.3).abs() < 0.02,
            "{} baseline {} not near 0.3",
            channel.name(),
            v
        );
    }

    for _ in 0..200 {
        let result = classifier.process_frame(&raw, DT);
        assert_eq!(result.emotion, EmotionState::Neutral);
        assert_eq!(result.outcome, FrameOutcome::Idle);
    }
}

#[test]
fn test_happy_commits_after_hold_frames() {
    let mut classifier = EmotionClassifier::default();
    calibrate(&mut classifier, ChannelFrame::zeros());

    // first frame: smoothed cheek 0.12 -> feature 0.288, below activity
    let first = classifier.process_frame(&happy_frame(), DT);
    assert_eq!(first.outcome, FrameOutcome::Idle);
    assert_eq!(first.emotion, EmotionState::Neutral);

    // frames 2..6: Happy leads but has not held for 6 frames yet
    for frame in 2..=6 {
        let result = classifier.process_frame(&happy_frame(), DT);
        assert_eq!(
            result.outcome,
            FrameOutcome::Classified {
                best: EmotionState::Happy,
                likely_talking: false,
            },
            "frame {}",
            frame
        );
        assert_eq!(result.emotion, EmotionState::Neutral, "frame {}", frame);
        assert!(result.switched.is_none());
    }

    // sixth consecutive Happy-leading frame commits
    let result = classifier.process_frame(&happy_frame(), DT);
    assert_eq!(result.emotion, EmotionState::Happy);
    assert_eq!(
        result.switched,
        Some(StateSwitch {
            from: EmotionState::Neutral,
            to: EmotionState::Happy,
        })
    );
    assert!(result.scores.happy > result.scores.sad);
    assert!(result.scores.happy > result.scores.angry);
    assert!(result.scores.happy > result.scores.surprise);

    let hysteresis = classifier.hysteresis().expect("calibrated");
    assert_eq!(hysteresis.cooldown_remaining(), 10);
}

#[test]
fn test_blink_keeps_stable_state() {
    let (mut classifier, _) = classifier_in_happy();
    for _ in 0..30 {
        classifier.process_frame(&happy_frame(), DT);
    }
    assert_eq!(classifier.emotion(), EmotionState::Happy);

    let blink = happy_frame()
        .with(Channel::EyeClosed, 0.9)
        .with(Channel::BrowLower, 0.9)
        .with(Channel::Frown, 0.9)
        .with(Channel::LipPressor, 0.9);

    // the EMA needs one frame before the eye-closed feature crosses 0.55
    let first = classifier.process_frame(&blink, DT);
    assert_eq!(first.emotion, EmotionState::Happy);

    for frame in 2..=5 {
        let scores_before = classifier.scores();
        let cooldown_before = classifier.hysteresis().map(|h| h.cooldown_remaining());
        let candidate_before = classifier.hysteresis().map(|h| h.candidate());

        let result = classifier.process_frame(&blink, DT);
        assert_eq!(result.outcome, FrameOutcome::Blink, "frame {}", frame);
        assert_eq!(result.emotion, EmotionState::Happy, "frame {}", frame);
        assert!(result.switched.is_none());
        assert_eq!(result.scores, scores_before);
        assert_eq!(
            classifier.hysteresis().map(|h| h.cooldown_remaining()),
            cooldown_before
        );
        assert_eq!(classifier.hysteresis().map(|h| h.candidate()), candidate_before);
    }
}

#[test]
fn test_blink_does_not_drift_baseline() {
    let mut classifier = EmotionClassifier::default();
    calibrate(&mut classifier, ChannelFrame::zeros());
    let blink = ChannelFrame::zeros().with(Channel::EyeClosed, 1.0);

    for _ in 0..3 {
        classifier.process_frame(&blink, DT);
    }
    let baseline = *classifier.baseline().expect("calibrated");
    for _ in 0..50 {
        let result = classifier.process_frame(&blink, DT);
        assert_eq!(result.outcome, FrameOutcome::Blink);
        assert_eq!(result.emotion, EmotionState::Neutral);
    }
    assert_eq!(*classifier.baseline().expect("calibrated"), baseline);
}

#[test]
fn test_cooldown_holds_after_switch() {
    let (mut classifier, _) = classifier_in_happy();
    let angry = ChannelFrame::zeros()
        .with(Channel::BrowLower, 0.6)
        .with(Channel::LipPressor, 0.5);

    // nine locked frames, then six frames for Angry to hold
    for frame in 1..=14 {
        let result = classifier.process_frame(&angry, DT);
        assert_eq!(result.emotion, EmotionState::Happy, "frame {}", frame);
        assert!(matches!(result.outcome, FrameOutcome::Classified { .. }));
    }

    let result = classifier.process_frame(&angry, DT);
    assert_eq!(result.emotion, EmotionState::Angry);
    assert_eq!(
        result.switched,
        Some(StateSwitch {
            from: EmotionState::Happy,
            to: EmotionState::Angry,
        })
    );
}

#[test]
fn test_idle_drift_keeps_neutral() {
    let mut classifier = EmotionClassifier::default();
    calibrate(&mut classifier, ChannelFrame::zeros());
    let raw = ChannelFrame::splat(0.1);

    let mut previous = *classifier.baseline().expect("calibrated");
    for _ in 0..3000 {
        let result = classifier.process_frame(&raw, DT);
        assert_eq!(result.outcome, FrameOutcome::Idle);
        assert_eq!(result.emotion, EmotionState::Neutral);

        let current = *classifier.baseline().expect("calibrated");
        for channel in Channel::ALL {
            let step = (current.get(channel) - previous.get(channel)).abs();
            assert!(step <= 0.002, "baseline jumped by {}", step);
        }
        previous = current;
    }

    for (channel, v) in previous.values().iter() {
        assert!(
            (v - 0.1).abs() < 0.005,
            "{} baseline {} did not converge",
            channel.name(),
            v
        );
    }
}

#[test]
fn test_idle_forces_neutral_and_keeps_scores() {
    let (mut classifier, _) = classifier_in_happy();
    let mut last_scores = classifier.scores();

    for _ in 0..60 {
        let result = classifier.process_frame(&ChannelFrame::zeros(), DT);
        if result.outcome == FrameOutcome::Idle {
            assert_eq!(result.emotion, EmotionState::Neutral);
            assert_eq!(result.scores, last_scores);
            return;
        }
        last_scores = result.scores;
    }
    panic!("relaxed face never went idle");
}

#[test]
fn test_jaw_only_talking_stays_neutral() {
    let mut classifier = EmotionClassifier::default();
    calibrate(&mut classifier, ChannelFrame::zeros());

    // raw jaw 1/3 settles at a jaw feature of 0.8
    let talking = ChannelFrame::zeros().with(Channel::JawDrop, 1.0 / 3.0);
    let mut last = None;
    for _ in 0..120 {
        let result = classifier.process_frame(&talking, DT);
        assert_eq!(result.emotion, EmotionState::Neutral);
        last = Some(result);
    }

    let last = last.expect("frames processed");
    assert_eq!(
        last.outcome,
        FrameOutcome::Classified {
            best: EmotionState::Neutral,
            likely_talking: true,
        }
    );
    assert!(last.scores.sad < 0.0);
    assert!(last.scores.surprise < 0.1);
}

#[test]
fn test_reset_calibration_restarts_warm_up() {
    let (mut classifier, _) = classifier_in_happy();
    for _ in 0..60 {
        classifier.process_frame(&happy_frame(), DT);
    }
    let smoothed = *classifier.smoothed();

    classifier.reset_calibration();
    assert_eq!(classifier.emotion(), EmotionState::Calibrating);
    assert!(classifier.baseline().is_none());
    assert_eq!(*classifier.smoothed(), smoothed);

    let first = classifier.process_frame(&happy_frame(), DT);
    assert!(matches!(first.outcome, FrameOutcome::Calibrating { .. }));
    assert_eq!(first.scores, EmotionScores::default());

    for _ in 0..CALIBRATION_FRAMES - 2 {
        classifier.process_frame(&happy_frame(), DT);
    }
    let done = classifier.process_frame(&happy_frame(), DT);
    assert_eq!(done.outcome, FrameOutcome::CalibrationComplete);
    assert_eq!(done.emotion, EmotionState::Neutral);

    // the smile is now the relaxed face
    let baseline = classifier.baseline().expect("calibrated");
    assert!((baseline.get(Channel::CheekRaise) - 0.8).abs() < 0.01);
    let next = classifier.process_frame(&happy_frame(), DT);
    assert_eq!(next.outcome, FrameOutcome::Idle);
    assert_eq!(next.emotion, EmotionState::Neutral);
}

#[test]
fn test_out_of_range_input_is_clamped() {
    let mut a = EmotionClassifier::default();
    let mut b = EmotionClassifier::default();
    let wild = ChannelFrame::splat(-3.0).with(Channel::CheekRaise, 7.0);
    let sane = ChannelFrame::zeros().with(Channel::CheekRaise, 1.0);

    for _ in 0..10 {
        a.process_frame(&wild, DT);
        b.process_frame(&sane, DT);
    }
    assert_eq!(a.smoothed(), b.smoothed());
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = ClassifierConfig::default();
    config.features.smoothing_factor = 0.0;

    match EmotionClassifier::new(config) {
        Err(ConfigError::InvalidParameter { name, .. }) => {
            assert_eq!(name, "features.smoothing_factor");
        }
        other => panic!("expected invalid parameter, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_frame_result_serializes_outcome_kind() {
    let mut classifier = EmotionClassifier::default();
    let result = classifier.process_frame(&ChannelFrame::zeros(), DT);
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["emotion"], "Calibrating");
    assert_eq!(json["outcome"]["kind"], "calibrating");
    assert!(json.get("switched").is_none());
}
