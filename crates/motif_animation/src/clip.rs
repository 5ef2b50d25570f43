//! Keyframe clips
//!
//! A [`Clip`] is an authored, reusable animation: keyframes on named channels,
//! grouped into per-channel tracks, plus looping, delay, stagger and
//! lifecycle callbacks. Clips are built with [`ClipBuilder`] and played through
//! [`ClipSystem`](crate::ClipSystem) instances.

use crate::channel::{Tweenable, ValueKind};
use crate::curve::CurveEvaluator;
use crate::easing::Easing;
use crate::spring::SpringParams;
use motif_core::{Vec2, Vec4};
use smallvec::SmallVec;
use std::fmt;

/// Identifier of an authored clip
pub type ClipId = u32;

/// Identifier of a playing clip instance
pub type InstanceId = u32;

/// Lifecycle callback invoked with the instance it fired for
pub type ClipCallback = Box<dyn FnMut(InstanceId)>;

/// Playback direction for clips
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayDirection {
    /// Play forward (0 -> duration)
    #[default]
    Forward,
    /// Play in reverse (duration -> 0)
    Reverse,
    /// Alternate between forward and reverse each iteration
    Alternate,
}

/// A keyframe value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyValue {
    Float(f32),
    Vec2(Vec2),
    Vec4(Vec4),
    Int(i32),
}

impl KeyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            KeyValue::Float(_) => ValueKind::Float,
            KeyValue::Vec2(_) => ValueKind::Vec2,
            KeyValue::Vec4(_) => ValueKind::Vec4,
            KeyValue::Int(_) => ValueKind::Int,
        }
    }

    /// Interpolate toward `other` by eased weight `w`.
    ///
    /// Mismatched kinds cannot occur within a track; `self` is returned.
    pub fn lerp(self, other: KeyValue, w: f32) -> KeyValue {
        match (self, other) {
            (KeyValue::Float(a), KeyValue::Float(b)) => KeyValue::Float(f32::interpolate(a, b, w, ())),
            (KeyValue::Vec2(a), KeyValue::Vec2(b)) => KeyValue::Vec2(Vec2::interpolate(a, b, w, ())),
            (KeyValue::Vec4(a), KeyValue::Vec4(b)) => KeyValue::Vec4(Vec4::interpolate(a, b, w, ())),
            (KeyValue::Int(a), KeyValue::Int(b)) => KeyValue::Int(i32::interpolate(a, b, w, ())),
            _ => self,
        }
    }

    /// Components as a 4-vector (unused lanes are zero)
    pub(crate) fn to_lanes(self) -> [f32; 4] {
        match self {
            KeyValue::Float(v) => [v, 0.0, 0.0, 0.0],
            KeyValue::Vec2(v) => [v.x, v.y, 0.0, 0.0],
            KeyValue::Vec4(v) => v.to_array(),
            KeyValue::Int(v) => [v as f32, 0.0, 0.0, 0.0],
        }
    }

    pub(crate) fn from_lanes(kind: ValueKind, l: [f32; 4]) -> Option<KeyValue> {
        match kind {
            ValueKind::Float => Some(KeyValue::Float(l[0])),
            ValueKind::Vec2 => Some(KeyValue::Vec2(Vec2::new(l[0], l[1]))),
            ValueKind::Vec4 => Some(KeyValue::Vec4(Vec4::from_array(l))),
            ValueKind::Int => Some(KeyValue::Int((l[0] + 0.5).floor() as i32)),
            ValueKind::Color => None,
        }
    }
}

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub channel: u32,
    /// Time position in seconds from clip start
    pub time: f32,
    pub value: KeyValue,
    /// Easing used when leaving this keyframe toward the next one
    pub easing: Easing,
}

/// Track identity within a clip or instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey {
    pub channel: u32,
    pub kind: ValueKind,
}

/// Time-sorted keyframes of one channel
#[derive(Clone, Debug)]
pub struct Track {
    key: TrackKey,
    keys: SmallVec<[Keyframe; 4]>,
}

impl Track {
    pub fn key(&self) -> TrackKey {
        self.key
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Value at `time`, easing with the outgoing keyframe's curve
    pub fn sample(&self, time: f32, curves: &mut CurveEvaluator) -> Option<KeyValue> {
        let (first, last) = (self.keys.first()?, self.keys.last()?);
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }
        let (k0, k1) = self
            .keys
            .windows(2)
            .map(|w| (&w[0], &w[1]))
            .find(|(a, b)| time >= a.time && time <= b.time)?;
        let span = k1.time - k0.time;
        let u = if span > 0.0 { (time - k0.time) / span } else { 1.0 };
        let w = curves.evaluate(&k0.easing, u);
        Some(k0.value.lerp(k1.value, w))
    }
}

/// Per-index start offsets for a group of instances
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stagger {
    pub count: u32,
    /// Seconds between consecutive instances
    pub each_delay: f32,
    /// 0 staggers from the first index, 1 radiates out from the center
    pub from_center_bias: f32,
}

impl Stagger {
    /// Extra delay for the instance at `index`
    pub fn delay(&self, index: u32) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let index = index.min(self.count - 1) as f32;
        let center = (self.count - 1) as f32 * 0.5;
        let bias = self.from_center_bias.clamp(0.0, 1.0);
        let steps = index + ((index - center).abs() - index) * bias;
        self.each_delay * steps
    }
}

/// A finalized keyframe clip
pub struct Clip {
    id: ClipId,
    tracks: Vec<Track>,
    duration: f32,
    delay: f32,
    loop_count: i32,
    direction: PlayDirection,
    stagger: Stagger,
    pub(crate) on_begin: Option<ClipCallback>,
    pub(crate) on_update: Option<ClipCallback>,
    pub(crate) on_complete: Option<ClipCallback>,
}

impl Clip {
    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// -1 loops forever, 0 plays once, n repeats n extra times
    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn stagger(&self) -> Stagger {
        self.stagger
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("loop_count", &self.loop_count)
            .field("direction", &self.direction)
            .field("stagger", &self.stagger)
            .finish()
    }
}

/// Fluent clip authoring
///
/// ```rust
/// use motif_animation::{ClipBuilder, Easing, PlayDirection};
///
/// let clip = ClipBuilder::new(7)
///     .key_float(1, 0.0, 0.0, Easing::OutCubic)
///     .key_float(1, 0.5, 1.0, Easing::Linear)
///     .looping(PlayDirection::Alternate, -1)
///     .build();
/// assert_eq!(clip.duration(), 0.5);
/// ```
pub struct ClipBuilder {
    id: ClipId,
    keys: Vec<Keyframe>,
    delay: f32,
    loop_count: i32,
    direction: PlayDirection,
    stagger: Stagger,
    on_begin: Option<ClipCallback>,
    on_update: Option<ClipCallback>,
    on_complete: Option<ClipCallback>,
}

impl ClipBuilder {
    pub fn new(id: ClipId) -> Self {
        Self {
            id,
            keys: Vec::new(),
            delay: 0.0,
            loop_count: 0,
            direction: PlayDirection::Forward,
            stagger: Stagger::default(),
            on_begin: None,
            on_update: None,
            on_complete: None,
        }
    }

    fn key(mut self, channel: u32, time: f32, value: KeyValue, easing: Easing) -> Self {
        self.keys.push(Keyframe {
            channel,
            time: time.max(0.0),
            value,
            easing,
        });
        self
    }

    pub fn key_float(self, channel: u32, time: f32, value: f32, easing: Easing) -> Self {
        self.key(channel, time, KeyValue::Float(value), easing)
    }

    pub fn key_vec2(self, channel: u32, time: f32, value: Vec2, easing: Easing) -> Self {
        self.key(channel, time, KeyValue::Vec2(value), easing)
    }

    pub fn key_vec4(self, channel: u32, time: f32, value: Vec4, easing: Easing) -> Self {
        self.key(channel, time, KeyValue::Vec4(value), easing)
    }

    pub fn key_int(self, channel: u32, time: f32, value: i32, easing: Easing) -> Self {
        self.key(channel, time, KeyValue::Int(value), easing)
    }

    /// Float keyframe that springs toward the next keyframe
    pub fn key_float_spring(self, channel: u32, time: f32, target: f32, spring: SpringParams) -> Self {
        self.key(channel, time, KeyValue::Float(target), Easing::Spring(spring))
    }

    /// Set direction and repeat count (-1 forever, 0 once, n extra repeats)
    pub fn looping(mut self, direction: PlayDirection, loop_count: i32) -> Self {
        self.direction = direction;
        self.loop_count = loop_count.max(-1);
        self
    }

    /// Delay before the first frame, in seconds
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn stagger(mut self, count: u32, each_delay: f32, from_center_bias: f32) -> Self {
        self.stagger = Stagger {
            count,
            each_delay: each_delay.max(0.0),
            from_center_bias,
        };
        self
    }

    pub fn on_begin(mut self, f: impl FnMut(InstanceId) + 'static) -> Self {
        self.on_begin = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(InstanceId) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(InstanceId) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Sort keyframes and group them into tracks
    pub fn build(mut self) -> Clip {
        // Stable, so keys at equal times keep authoring order
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut tracks: Vec<Track> = Vec::new();
        let mut duration = 0.0f32;
        for k in self.keys {
            duration = duration.max(k.time);
            let key = TrackKey {
                channel: k.channel,
                kind: k.value.kind(),
            };
            match tracks.iter_mut().find(|t| t.key == key) {
                Some(track) => track.keys.push(k),
                None => tracks.push(Track {
                    key,
                    keys: SmallVec::from_elem(k, 1),
                }),
            }
        }

        Clip {
            id: self.id,
            tracks,
            duration,
            delay: self.delay,
            loop_count: self.loop_count,
            direction: self.direction,
            stagger: self.stagger,
            on_begin: self.on_begin,
            on_update: self.on_update,
            on_complete: self.on_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_groups_and_sorts() {
        let clip = ClipBuilder::new(1)
            .key_float(1, 1.0, 10.0, Easing::Linear)
            .key_float(1, 0.0, 0.0, Easing::Linear)
            .key_vec2(1, 0.5, Vec2::ONE, Easing::Linear)
            .key_int(2, 2.0, 5, Easing::Linear)
            .build();

        assert_eq!(clip.duration(), 2.0);
        assert_eq!(clip.tracks().len(), 3);
        let float_track = &clip.tracks()[0];
        assert_eq!(float_track.key().kind, ValueKind::Float);
        let times: Vec<f32> = float_track.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0]);
    }

    #[test]
    fn test_track_sampling() {
        let mut curves = CurveEvaluator::default();
        let clip = ClipBuilder::new(1)
            .key_float(1, 1.0, 0.0, Easing::Linear)
            .key_float(1, 3.0, 10.0, Easing::Linear)
            .build();
        let track = &clip.tracks()[0];
        assert_eq!(track.sample(0.0, &mut curves), Some(KeyValue::Float(0.0)));
        assert_eq!(track.sample(2.0, &mut curves), Some(KeyValue::Float(5.0)));
        assert_eq!(track.sample(9.0, &mut curves), Some(KeyValue::Float(10.0)));
    }

    #[test]
    fn test_outgoing_easing_is_used() {
        let mut curves = CurveEvaluator::default();
        let clip = ClipBuilder::new(1)
            .key_float(1, 0.0, 0.0, Easing::InQuad)
            .key_float(1, 1.0, 1.0, Easing::Linear)
            .build();
        assert_eq!(clip.tracks()[0].sample(0.5, &mut curves), Some(KeyValue::Float(0.25)));
    }

    #[test]
    fn test_int_track_rounds() {
        let mut curves = CurveEvaluator::default();
        let clip = ClipBuilder::new(1)
            .key_int(1, 0.0, 0, Easing::Linear)
            .key_int(1, 1.0, 3, Easing::Linear)
            .build();
        assert_eq!(clip.tracks()[0].sample(0.5, &mut curves), Some(KeyValue::Int(2)));
    }

    #[test]
    fn test_int_track_full_range() {
        let mut curves = CurveEvaluator::default();
        let clip = ClipBuilder::new(1)
            .key_int(1, 0.0, -2_000_000_000, Easing::Linear)
            .key_int(1, 1.0, 2_000_000_000, Easing::Linear)
            .build();
        assert_eq!(clip.tracks()[0].sample(0.5, &mut curves), Some(KeyValue::Int(0)));
    }

    #[test]
    fn test_stagger_delay() {
        let linear = Stagger {
            count: 5,
            each_delay: 0.1,
            from_center_bias: 0.0,
        };
        assert_eq!(linear.delay(0), 0.0);
        assert!((linear.delay(4) - 0.4).abs() < 1e-6);
        // Out-of-range indices clamp to the last slot
        assert!((linear.delay(9) - 0.4).abs() < 1e-6);

        let centered = Stagger {
            from_center_bias: 1.0,
            ..linear
        };
        assert_eq!(centered.delay(2), 0.0);
        assert!((centered.delay(0) - 0.2).abs() < 1e-6);
        assert!((centered.delay(4) - 0.2).abs() < 1e-6);

        assert_eq!(Stagger::default().delay(3), 0.0);
    }

    #[test]
    fn test_builder_sanitizes() {
        let clip = ClipBuilder::new(3)
            .key_float(1, -1.0, 0.0, Easing::Linear)
            .delay(-2.0)
            .looping(PlayDirection::Reverse, -7)
            .build();
        assert_eq!(clip.tracks()[0].keyframes()[0].time, 0.0);
        assert_eq!(clip.delay(), 0.0);
        assert_eq!(clip.loop_count(), -1);
        assert_eq!(clip.direction(), PlayDirection::Reverse);
        assert!(!clip.is_empty());
        assert!(ClipBuilder::new(4).build().is_empty());
    }
}
