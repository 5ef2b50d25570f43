//! Per-key tween state
//!
//! A [`Channel`] holds one animated value and the leg it is currently
//! travelling: `start`, `target`, normalized progress `t`, duration and
//! easing. [`Channel::update`] is the state machine behind every tween call:
//! it decides whether the request is a retarget, resolves it through the
//! requested [`Policy`], and advances time.

use crate::curve::CurveEvaluator;
use crate::easing::Easing;
use motif_core::{blend, Color, ColorSpace, Vec2, Vec4};
use std::fmt::Debug;

/// Floor applied to every duration
pub const DURATION_EPSILON: f32 = 1e-6;

/// Summed per-component distance below which two targets are equal
pub const TARGET_EPSILON: f32 = 1e-6;

/// How a channel reacts to a new target while animating
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Restart from the current value toward the new target
    #[default]
    Crossfade,
    /// Jump straight to the new target
    Cut,
    /// Finish the current leg, then start toward the new target
    Queue,
}

/// Value types a channel or clip track can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Float,
    Vec2,
    Vec4,
    Int,
    Color,
}

/// Timing and curve of a tween request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Seconds; non-positive values become [`DURATION_EPSILON`]
    pub duration: f32,
    pub easing: Easing,
    pub policy: Policy,
    /// Blend space, used by color channels only
    pub space: ColorSpace,
}

impl Motion {
    pub const fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            policy: Policy::Crossfade,
            space: ColorSpace::Srgb,
        }
    }

    pub const fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn with_space(mut self, space: ColorSpace) -> Self {
        self.space = space;
        self
    }

    /// Instantaneous change
    pub const fn cut() -> Self {
        Self::new(0.0, Easing::Linear).with_policy(Policy::Cut)
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new(0.3, Easing::OutCubic)
    }
}

/// A value type that channels can animate
pub trait Tweenable: Copy + Debug + 'static {
    /// Extra interpolation parameter carried by the channel
    type Space: Copy + Debug + Default + PartialEq;

    /// Value of a channel that has never been set
    fn identity() -> Self;

    fn space(motion: &Motion) -> Self::Space;

    /// Value at eased progress `k` between `start` and `target`
    fn interpolate(start: Self, target: Self, k: f32, space: Self::Space) -> Self;

    /// Summed per-component distance
    fn distance(a: Self, b: Self) -> f32;
}

impl Tweenable for f32 {
    type Space = ();

    fn identity() -> Self {
        0.0
    }

    fn space(_: &Motion) -> Self::Space {}

    fn interpolate(start: Self, target: Self, k: f32, _: ()) -> Self {
        start + (target - start) * k
    }

    fn distance(a: Self, b: Self) -> f32 {
        (a - b).abs()
    }
}

impl Tweenable for Vec2 {
    type Space = ();

    fn identity() -> Self {
        Vec2::ZERO
    }

    fn space(_: &Motion) -> Self::Space {}

    fn interpolate(start: Self, target: Self, k: f32, _: ()) -> Self {
        start.lerp(target, k)
    }

    fn distance(a: Self, b: Self) -> f32 {
        a.manhattan(b)
    }
}

impl Tweenable for Vec4 {
    type Space = ();

    fn identity() -> Self {
        Vec4::ZERO
    }

    fn space(_: &Motion) -> Self::Space {}

    fn interpolate(start: Self, target: Self, k: f32, _: ()) -> Self {
        start.lerp(target, k)
    }

    fn distance(a: Self, b: Self) -> f32 {
        a.manhattan(b)
    }
}

impl Tweenable for i32 {
    type Space = ();

    fn identity() -> Self {
        0
    }

    fn space(_: &Motion) -> Self::Space {}

    /// Rounds half-up; computed in f64 so endpoints may span the full range
    fn interpolate(start: Self, target: Self, k: f32, _: ()) -> Self {
        let (a, b) = (f64::from(start), f64::from(target));
        let v = a + (b - a) * f64::from(k);
        (v + 0.5).floor() as i32
    }

    fn distance(a: Self, b: Self) -> f32 {
        (a as f32 - b as f32).abs()
    }
}

impl Tweenable for Color {
    type Space = ColorSpace;

    fn identity() -> Self {
        Color::WHITE
    }

    fn space(motion: &Motion) -> Self::Space {
        motion.space
    }

    fn interpolate(start: Self, target: Self, k: f32, space: ColorSpace) -> Self {
        blend(start, target, k, space)
    }

    fn distance(a: Self, b: Self) -> f32 {
        a.manhattan(b)
    }
}

/// Animated value state for one key
#[derive(Clone, Debug)]
pub struct Channel<T: Tweenable> {
    current: T,
    start: T,
    target: T,
    duration: f32,
    t: f32,
    easing: Easing,
    policy: Policy,
    space: T::Space,
    pending: Option<T>,
}

impl<T: Tweenable> Default for Channel<T> {
    fn default() -> Self {
        Self {
            current: T::identity(),
            start: T::identity(),
            target: T::identity(),
            duration: DURATION_EPSILON,
            t: 1.0,
            easing: Easing::OutCubic,
            policy: Policy::Crossfade,
            space: T::Space::default(),
            pending: None,
        }
    }
}

impl<T: Tweenable> Channel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tween request and return the current value
    pub fn update(&mut self, target: T, motion: &Motion, dt: f32, curves: &mut CurveEvaluator) -> T {
        let space = T::space(motion);
        let retarget = self.policy != motion.policy
            || self.space != space
            || !self.easing.same_descriptor(&motion.easing)
            || T::distance(self.target, target) > TARGET_EPSILON;

        if retarget {
            match motion.policy {
                Policy::Queue if self.is_animating() => {
                    // Only the first queued target is kept
                    if self.pending.is_none() {
                        self.pending = Some(target);
                    }
                    self.tick(dt, curves);
                }
                Policy::Cut => self.snap(target, motion),
                _ => {
                    if self.is_animating() && dt > 0.0 {
                        self.tick(dt, curves);
                    }
                    self.set(target, motion);
                    self.tick(dt, curves);
                }
            }
        } else {
            self.tick(dt, curves);
        }

        if !self.is_animating() {
            if let Some(next) = self.pending.take() {
                self.set(next, motion);
            }
        }
        self.current
    }

    /// Start a new leg from the current value
    pub fn set(&mut self, target: T, motion: &Motion) {
        self.start = self.current;
        self.target = target;
        self.duration = motion.duration.max(DURATION_EPSILON);
        self.t = 0.0;
        self.easing = motion.easing;
        self.policy = motion.policy;
        self.space = T::space(motion);
    }

    /// Jump to `target` with no animation
    pub fn snap(&mut self, target: T, motion: &Motion) {
        self.current = target;
        self.start = target;
        self.target = target;
        self.t = 1.0;
        self.duration = DURATION_EPSILON;
        self.easing = motion.easing;
        self.policy = motion.policy;
        self.space = T::space(motion);
        self.pending = None;
    }

    /// Advance the current leg by `dt` seconds
    pub fn tick(&mut self, dt: f32, curves: &mut CurveEvaluator) {
        if self.t >= 1.0 {
            self.current = self.target;
            return;
        }
        if dt > 0.0 {
            self.t += dt / self.duration;
        }
        if self.t >= 1.0 {
            self.t = 1.0;
            self.current = self.target;
            return;
        }
        let k = curves.evaluate(&self.easing, self.t);
        self.current = T::interpolate(self.start, self.target, k, self.space);
    }

    /// Redirect the current leg to `target`, keeping the remaining time.
    ///
    /// The channel is first advanced by `dt` if it is animating; the current
    /// value then becomes the new start so nothing jumps.
    pub fn rebase(&mut self, target: T, dt: f32, curves: &mut CurveEvaluator) {
        if self.is_animating() && dt > 0.0 {
            self.tick(dt, curves);
        }
        let remain = (1.0 - self.t.min(1.0)) * self.duration;
        self.start = self.current;
        self.target = target;
        self.t = 0.0;
        self.duration = remain.max(DURATION_EPSILON);
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn target(&self) -> T {
        self.target
    }

    /// Normalized progress of the current leg
    pub fn progress(&self) -> f32 {
        self.t
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn space(&self) -> T::Space {
        self.space
    }

    pub fn pending(&self) -> Option<T> {
        self.pending
    }

    pub fn is_animating(&self) -> bool {
        self.t < 1.0
    }
}
