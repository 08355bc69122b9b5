// Channels - the named continuous signals consumed once per frame
//
// A face tracker reports muscle-activation weights in [0, 1]. The classifier
// works on 11 channels; trackers that report left/right sides separately are
// folded into channels by averaging both sides.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Number of channels in a frame
pub const CHANNEL_COUNT: usize = 11;

/// One continuous input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Smile,
    CheekRaise,
    Frown,
    BrowLower,
    JawDrop,
    UpperLidRaise,
    LidTightener,
    OuterBrowRaise,
    InnerBrowRaise,
    LipPressor,
    EyeClosed,
}

impl Channel {
    /// All channels in storage order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Smile,
        Channel::CheekRaise,
        Channel::Frown,
        Channel::BrowLower,
        Channel::JawDrop,
        Channel::UpperLidRaise,
        Channel::LidTightener,
        Channel::OuterBrowRaise,
        Channel::InnerBrowRaise,
        Channel::LipPressor,
        Channel::EyeClosed,
    ];

    /// Position of this channel inside a `ChannelFrame`
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Smile => "smile",
            Channel::CheekRaise => "cheek_raise",
            Channel::Frown => "frown",
            Channel::BrowLower => "brow_lower",
            Channel::JawDrop => "jaw_drop",
            Channel::UpperLidRaise => "upper_lid_raise",
            Channel::LidTightener => "lid_tightener",
            Channel::OuterBrowRaise => "outer_brow_raise",
            Channel::InnerBrowRaise => "inner_brow_raise",
            Channel::LipPressor => "lip_pressor",
            Channel::EyeClosed => "eye_closed",
        }
    }
}

/// One value per channel
///
/// Used for raw snapshots, smoothed accumulators, baselines and normalized
/// features alike. Serializes as an object keyed by channel name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "NamedChannels", into = "NamedChannels")]
pub struct ChannelFrame {
    values: [f32; CHANNEL_COUNT],
}

impl ChannelFrame {
    pub const fn zeros() -> Self {
        Self {
            values: [0.0; CHANNEL_COUNT],
        }
    }

    /// Frame with every channel set to `value`
    pub const fn splat(value: f32) -> Self {
        Self {
            values: [value; CHANNEL_COUNT],
        }
    }

    pub const fn from_array(values: [f32; CHANNEL_COUNT]) -> Self {
        Self { values }
    }

    /// Builder-style setter, mostly for hosts and tests
    pub fn with(mut self, channel: Channel, value: f32) -> Self {
        self[channel] = value;
        self
    }

    pub fn as_array(&self) -> &[f32; CHANNEL_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        Channel::ALL.iter().map(move |&c| (c, self.values[c.index()]))
    }

    /// Copy with every value clamped to [0, 1]; NaN becomes 0
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for v in out.values.iter_mut() {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        out
    }

    /// Fold bilateral tracker weights into channels
    ///
    /// Every channel is the mean of its left and right expressions, except the
    /// jaw which the tracker reports as a single expression.
    pub fn from_expressions<W: ExpressionWeights + ?Sized>(weights: &W) -> Self {
        use FaceExpression::*;
        let pair = |l: FaceExpression, r: FaceExpression| (weights.weight(l) + weights.weight(r)) * 0.5;

        let mut frame = Self::zeros();
        frame[Channel::Smile] = pair(LipCornerPullerL, LipCornerPullerR);
        frame[Channel::CheekRaise] = pair(CheekRaiserL, CheekRaiserR);
        frame[Channel::Frown] = pair(LipCornerDepressorL, LipCornerDepressorR);
        frame[Channel::BrowLower] = pair(BrowLowererL, BrowLowererR);
        frame[Channel::JawDrop] = weights.weight(JawDrop);
        frame[Channel::UpperLidRaise] = pair(UpperLidRaiserL, UpperLidRaiserR);
        frame[Channel::LidTightener] = pair(LidTightenerL, LidTightenerR);
        frame[Channel::OuterBrowRaise] = pair(OuterBrowRaiserL, OuterBrowRaiserR);
        frame[Channel::InnerBrowRaise] = pair(InnerBrowRaiserL, InnerBrowRaiserR);
        frame[Channel::LipPressor] = pair(LipPressorL, LipPressorR);
        frame[Channel::EyeClosed] = pair(EyesClosedL, EyesClosedR);
        frame
    }
}

impl Index<Channel> for ChannelFrame {
    type Output = f32;

    fn index(&self, channel: Channel) -> &f32 {
        &self.values[channel.index()]
    }
}

impl IndexMut<Channel> for ChannelFrame {
    fn index_mut(&mut self, channel: Channel) -> &mut f32 {
        &mut self.values[channel.index()]
    }
}

/// Wire form of a `ChannelFrame`. Omitted channels read as relaxed (0.0).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct NamedChannels {
    smile: f32,
    cheek_raise: f32,
    frown: f32,
    brow_lower: f32,
    jaw_drop: f32,
    upper_lid_raise: f32,
    lid_tightener: f32,
    outer_brow_raise: f32,
    inner_brow_raise: f32,
    lip_pressor: f32,
    eye_closed: f32,
}

impl From<NamedChannels> for ChannelFrame {
    fn from(n: NamedChannels) -> Self {
        Self::from_array([
            n.smile,
            n.cheek_raise,
            n.frown,
            n.brow_lower,
            n.jaw_drop,
            n.upper_lid_raise,
            n.lid_tightener,
            n.outer_brow_raise,
            n.inner_brow_raise,
            n.lip_pressor,
            n.eye_closed,
        ])
    }
}

impl From<ChannelFrame> for NamedChannels {
    fn from(f: ChannelFrame) -> Self {
        Self {
            smile: f[Channel::Smile],
            cheek_raise: f[Channel::CheekRaise],
            frown: f[Channel::Frown],
            brow_lower: f[Channel::BrowLower],
            jaw_drop: f[Channel::JawDrop],
            upper_lid_raise: f[Channel::UpperLidRaise],
            lid_tightener: f[Channel::LidTightener],
            outer_brow_raise: f[Channel::OuterBrowRaise],
            inner_brow_raise: f[Channel::InnerBrowRaise],
            lip_pressor: f[Channel::LipPressor],
            eye_closed: f[Channel::EyeClosed],
        }
    }
}

/// Per-side expressions reported by bilateral face trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceExpression {
    LipCornerPullerL,
    LipCornerPullerR,
    CheekRaiserL,
    CheekRaiserR,
    LipCornerDepressorL,
    LipCornerDepressorR,
    BrowLowererL,
    BrowLowererR,
    JawDrop,
    UpperLidRaiserL,
    UpperLidRaiserR,
    LidTightenerL,
    LidTightenerR,
    OuterBrowRaiserL,
    OuterBrowRaiserR,
    InnerBrowRaiserL,
    InnerBrowRaiserR,
    LipPressorL,
    LipPressorR,
    EyesClosedL,
    EyesClosedR,
}

/// Anything that can report the weight of a single tracker expression
pub trait ExpressionWeights {
    fn weight(&self, expression: FaceExpression) -> f32;
}

impl ExpressionWeights for std::collections::HashMap<FaceExpression, f32> {
    fn weight(&self, expression: FaceExpression) -> f32 {
        self.get(&expression).copied().unwrap_or(0.0)
    }
}

impl<F> ExpressionWeights for F
where
    F: Fn(FaceExpression) -> f32,
{
    fn weight(&self, expression: FaceExpression) -> f32 {
        self(expression)
    }
}

/// External producer of per-frame channel snapshots
///
/// `None` means no snapshot is available for this tick (source exhausted, or
/// nothing received yet); the host skips classification for that tick.
pub trait SnapshotSource {
    fn next_snapshot(&mut self) -> Option<ChannelFrame>;
}

impl<I> SnapshotSource for I
where
    I: Iterator<Item = ChannelFrame>,
{
    fn next_snapshot(&mut self) -> Option<ChannelFrame> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_channel_indices_match_storage_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn test_clamped_handles_out_of_range_and_nan() {
        let frame = ChannelFrame::zeros()
            .with(Channel::Smile, 1.4)
            .with(Channel::Frown, -0.2)
            .with(Channel::JawDrop, f32::NAN)
            .with(Channel::EyeClosed, 0.5);
        let clamped = frame.clamped();
        assert_eq!(clamped[Channel::Smile], 1.0);
        assert_eq!(clamped[Channel::Frown], 0.0);
        assert_eq!(clamped[Channel::JawDrop], 0.0);
        assert_eq!(clamped[Channel::EyeClosed], 0.5);
    }

    #[test]
    fn test_from_expressions_averages_sides() {
        let mut weights = HashMap::new();
        weights.insert(FaceExpression::CheekRaiserL, 0.6);
        weights.insert(FaceExpression::CheekRaiserR, 0.2);
        weights.insert(FaceExpression::JawDrop, 0.7);
        weights.insert(FaceExpression::EyesClosedL, 1.0);

        let frame = ChannelFrame::from_expressions(&weights);
        assert!((frame[Channel::CheekRaise] - 0.4).abs() < 1e-6);
        assert!((frame[Channel::JawDrop] - 0.7).abs() < 1e-6);
        assert!((frame[Channel::EyeClosed] - 0.5).abs() < 1e-6);
        assert_eq!(frame[Channel::Smile], 0.0);
    }

    #[test]
    fn test_from_expressions_accepts_closure() {
        let frame = ChannelFrame::from_expressions(&|_: FaceExpression| 0.25);
        assert_eq!(frame, ChannelFrame::splat(0.25));
    }

    #[test]
    fn test_json_uses_channel_names_and_defaults_missing() {
        let frame: ChannelFrame =
            serde_json::from_str(r#"{"cheek_raise": 0.8, "smile": 0.7}"#).unwrap();
        assert_eq!(frame[Channel::CheekRaise], 0.8);
        assert_eq!(frame[Channel::Smile], 0.7);
        assert_eq!(frame[Channel::LipPressor], 0.0);

        let json = serde_json::to_value(frame).unwrap();
        assert_eq!(json["cheek_raise"], serde_json::json!(0.8f32));
        assert!(json.get("eye_closed").is_some());
    }

    #[test]
    fn test_iterator_is_a_snapshot_source() {
        let mut source = vec![ChannelFrame::zeros(), ChannelFrame::splat(0.5)].into_iter();
        assert_eq!(source.next_snapshot(), Some(ChannelFrame::zeros()));
        assert_eq!(source.next_snapshot(), Some(ChannelFrame::splat(0.5)));
        assert_eq!(source.next_snapshot(), None);
    }
}
