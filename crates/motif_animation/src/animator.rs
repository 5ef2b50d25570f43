//! The animation context
//!
//! [`Animator`] owns every channel pool, the curve evaluator and the clip
//! system. A host keeps one per UI context and drives it from its frame loop:
//!
//! ```rust
//! use motif_animation::{Animator, ChannelId, Easing, Motion};
//!
//! let mut anim = Animator::new();
//! let fade = Motion::new(1.0, Easing::Linear);
//!
//! anim.begin_frame();
//! let alpha = anim.tween_float(ChannelId::new(1, 1), 10.0, &fade, 0.5);
//! assert_eq!(alpha, 5.0);
//! ```

use crate::anchor::{AnchorSource, Axis, Relative};
use crate::channel::{Channel, Motion, Tweenable, ValueKind};
use crate::config::{AnimationConfig, PoolCapacity};
use crate::curve::{CurveEvaluator, CustomEasing};
use crate::easing::Easing;
use crate::playback::ClipSystem;
use crate::pool::{ChannelId, StampedPool};
use motif_core::{Color, Vec2, Vec4};

type Pool<T> = StampedPool<ChannelId, Channel<T>>;

fn tween<T: Tweenable>(
    pool: &mut Pool<T>,
    curves: &mut CurveEvaluator,
    id: ChannelId,
    target: T,
    motion: &Motion,
    dt: f32,
) -> T {
    pool.get(id).update(target, motion, dt, curves)
}

fn rebase<T: Tweenable>(pool: &mut Pool<T>, curves: &mut CurveEvaluator, id: ChannelId, target: T, dt: f32) {
    // Existing channels only, and without stamping
    if let Some(ch) = pool.peek_mut(&id) {
        ch.rebase(target, dt, curves);
    }
}

/// Keyed tweens, curve cache and clips for one UI context
#[derive(Debug)]
pub struct Animator {
    config: AnimationConfig,
    floats: Pool<f32>,
    vec2s: Pool<Vec2>,
    vec4s: Pool<Vec4>,
    ints: Pool<i32>,
    colors: Pool<Color>,
    curves: CurveEvaluator,
    clips: ClipSystem,
    time_scale: f32,
}

impl Animator {
    pub fn new() -> Self {
        Self::with_config(AnimationConfig::default())
    }

    pub fn with_config(config: AnimationConfig) -> Self {
        let mut anim = Self {
            config,
            floats: StampedPool::new("float"),
            vec2s: StampedPool::new("vec2"),
            vec4s: StampedPool::new("vec4"),
            ints: StampedPool::new("int"),
            colors: StampedPool::new("color"),
            curves: CurveEvaluator::new(config.effective_lut_samples(), config.clamp_lut_output),
            clips: ClipSystem::new(),
            time_scale: config.time_scale,
        };
        anim.reserve(config.capacity);
        anim
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance the generation counter; call once per frame before any tweens
    pub fn begin_frame(&mut self) {
        self.floats.begin_frame();
        self.vec2s.begin_frame();
        self.vec4s.begin_frame();
        self.ints.begin_frame();
        self.colors.begin_frame();
        self.curves.begin_frame();
    }

    /// Current generation
    pub fn frame(&self) -> u32 {
        self.floats.generation()
    }

    /// Drop channels and curve tables untouched for more than `max_age` frames.
    ///
    /// Returns the number of channels removed.
    pub fn gc(&mut self, max_age: u32) -> usize {
        self.curves.gc(max_age);
        self.floats.gc(max_age)
            + self.vec2s.gc(max_age)
            + self.vec4s.gc(max_age)
            + self.ints.gc(max_age)
            + self.colors.gc(max_age)
    }

    /// [`gc`](Self::gc) with the configured default age
    pub fn gc_default(&mut self) -> usize {
        self.gc(self.config.default_gc_age)
    }

    /// Pre-size channel storage
    pub fn reserve(&mut self, capacity: PoolCapacity) {
        self.floats.reserve(capacity.float);
        self.vec2s.reserve(capacity.vec2);
        self.vec4s.reserve(capacity.vec4);
        self.ints.reserve(capacity.int);
        self.colors.reserve(capacity.color);
    }

    pub fn channel_count(&self, kind: ValueKind) -> usize {
        match kind {
            ValueKind::Float => self.floats.len(),
            ValueKind::Vec2 => self.vec2s.len(),
            ValueKind::Vec4 => self.vec4s.len(),
            ValueKind::Int => self.ints.len(),
            ValueKind::Color => self.colors.len(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Curves
    // ─────────────────────────────────────────────────────────────────────────

    /// Change the curve table resolution; cached tables are rebuilt lazily
    pub fn set_lut_samples(&mut self, samples: usize) {
        self.curves.set_lut_samples(samples);
        self.config.lut_samples = self.curves.lut_samples();
    }

    pub fn lut_samples(&self) -> usize {
        self.curves.lut_samples()
    }

    /// Global speed multiplier. Not applied by the engine; hosts multiply
    /// their delta time by it.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn register_custom_easing<F>(&mut self, slot: u32, f: F) -> Option<CustomEasing>
    where
        F: Fn(f32) -> f32 + 'static,
    {
        self.curves.register_custom(slot, f)
    }

    pub fn unregister_custom_easing(&mut self, slot: u32) -> Option<CustomEasing> {
        self.curves.unregister_custom(slot)
    }

    pub fn custom_easing(&self, slot: u32) -> Option<&dyn Fn(f32) -> f32> {
        self.curves.custom(slot)
    }

    /// Evaluate a curve through the shared cache
    pub fn evaluate(&mut self, easing: &Easing, t: f32) -> f32 {
        self.curves.evaluate(easing, t)
    }

    pub fn curves(&self) -> &CurveEvaluator {
        &self.curves
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tweens
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tween_float(&mut self, id: ChannelId, target: f32, motion: &Motion, dt: f32) -> f32 {
        tween(&mut self.floats, &mut self.curves, id, target, motion, dt)
    }

    pub fn tween_vec2(&mut self, id: ChannelId, target: Vec2, motion: &Motion, dt: f32) -> Vec2 {
        tween(&mut self.vec2s, &mut self.curves, id, target, motion, dt)
    }

    pub fn tween_vec4(&mut self, id: ChannelId, target: Vec4, motion: &Motion, dt: f32) -> Vec4 {
        tween(&mut self.vec4s, &mut self.curves, id, target, motion, dt)
    }

    pub fn tween_int(&mut self, id: ChannelId, target: i32, motion: &Motion, dt: f32) -> i32 {
        tween(&mut self.ints, &mut self.curves, id, target, motion, dt)
    }

    /// Color tween blended in `motion.space`
    pub fn tween_color(&mut self, id: ChannelId, target: Color, motion: &Motion, dt: f32) -> Color {
        tween(&mut self.colors, &mut self.curves, id, target, motion, dt)
    }

    // Anchor-relative targets, re-resolved on every call

    pub fn tween_float_rel(
        &mut self,
        id: ChannelId,
        target: Relative<f32>,
        axis: Axis,
        anchors: &dyn AnchorSource,
        motion: &Motion,
        dt: f32,
    ) -> f32 {
        let target = target.resolve(anchors, axis);
        self.tween_float(id, target, motion, dt)
    }

    pub fn tween_vec2_rel(
        &mut self,
        id: ChannelId,
        target: Relative<Vec2>,
        anchors: &dyn AnchorSource,
        motion: &Motion,
        dt: f32,
    ) -> Vec2 {
        let target = target.resolve(anchors);
        self.tween_vec2(id, target, motion, dt)
    }

    pub fn tween_vec4_rel(
        &mut self,
        id: ChannelId,
        target: Relative<Vec4>,
        anchors: &dyn AnchorSource,
        motion: &Motion,
        dt: f32,
    ) -> Vec4 {
        let target = target.resolve(anchors);
        self.tween_vec4(id, target, motion, dt)
    }

    /// Color components as `percent + bias`; the anchor is not consulted
    pub fn tween_color_rel(&mut self, id: ChannelId, target: Relative<Vec4>, motion: &Motion, dt: f32) -> Color {
        let target = Color::from(target.offset());
        self.tween_color(id, target, motion, dt)
    }

    // Callback-computed targets; a missing resolver targets the identity value

    pub fn tween_float_resolved(
        &mut self,
        id: ChannelId,
        resolver: Option<&dyn Fn() -> f32>,
        motion: &Motion,
        dt: f32,
    ) -> f32 {
        let target = resolver.map_or(0.0, |f| f());
        self.tween_float(id, target, motion, dt)
    }

    pub fn tween_vec2_resolved(
        &mut self,
        id: ChannelId,
        resolver: Option<&dyn Fn() -> Vec2>,
        motion: &Motion,
        dt: f32,
    ) -> Vec2 {
        let target = resolver.map_or(Vec2::ZERO, |f| f());
        self.tween_vec2(id, target, motion, dt)
    }

    pub fn tween_vec4_resolved(
        &mut self,
        id: ChannelId,
        resolver: Option<&dyn Fn() -> Vec4>,
        motion: &Motion,
        dt: f32,
    ) -> Vec4 {
        let target = resolver.map_or(Vec4::ZERO, |f| f());
        self.tween_vec4(id, target, motion, dt)
    }

    pub fn tween_int_resolved(
        &mut self,
        id: ChannelId,
        resolver: Option<&dyn Fn() -> i32>,
        motion: &Motion,
        dt: f32,
    ) -> i32 {
        let target = resolver.map_or(0, |f| f());
        self.tween_int(id, target, motion, dt)
    }

    pub fn tween_color_resolved(
        &mut self,
        id: ChannelId,
        resolver: Option<&dyn Fn() -> Color>,
        motion: &Motion,
        dt: f32,
    ) -> Color {
        let target = resolver.map_or(Color::WHITE, |f| f());
        self.tween_color(id, target, motion, dt)
    }

    // Mid-flight retargets; no-ops for channels that do not exist yet

    pub fn rebase_float(&mut self, id: ChannelId, target: f32, dt: f32) {
        rebase(&mut self.floats, &mut self.curves, id, target, dt);
    }

    pub fn rebase_vec2(&mut self, id: ChannelId, target: Vec2, dt: f32) {
        rebase(&mut self.vec2s, &mut self.curves, id, target, dt);
    }

    pub fn rebase_vec4(&mut self, id: ChannelId, target: Vec4, dt: f32) {
        rebase(&mut self.vec4s, &mut self.curves, id, target, dt);
    }

    pub fn rebase_int(&mut self, id: ChannelId, target: i32, dt: f32) {
        rebase(&mut self.ints, &mut self.curves, id, target, dt);
    }

    pub fn rebase_color(&mut self, id: ChannelId, target: Color, dt: f32) {
        rebase(&mut self.colors, &mut self.curves, id, target, dt);
    }

    // Read-only inspection; does not stamp or advance

    pub fn peek_float(&self, id: ChannelId) -> Option<f32> {
        self.floats.peek(&id).map(Channel::current)
    }

    pub fn peek_vec2(&self, id: ChannelId) -> Option<Vec2> {
        self.vec2s.peek(&id).map(Channel::current)
    }

    pub fn peek_vec4(&self, id: ChannelId) -> Option<Vec4> {
        self.vec4s.peek(&id).map(Channel::current)
    }

    pub fn peek_int(&self, id: ChannelId) -> Option<i32> {
        self.ints.peek(&id).map(Channel::current)
    }

    pub fn peek_color(&self, id: ChannelId) -> Option<Color> {
        self.colors.peek(&id).map(Channel::current)
    }

    pub fn float_channel(&self, id: ChannelId) -> Option<&Channel<f32>> {
        self.floats.peek(&id)
    }

    pub fn color_channel(&self, id: ChannelId) -> Option<&Channel<Color>> {
        self.colors.peek(&id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clips
    // ─────────────────────────────────────────────────────────────────────────

    pub fn clips(&self) -> &ClipSystem {
        &self.clips
    }

    pub fn clips_mut(&mut self) -> &mut ClipSystem {
        &mut self.clips
    }

    /// Advance clip instances, sharing this animator's curve cache
    pub fn update_clips(&mut self, dt: f32) {
        self.clips.update(dt, &mut self.curves);
    }

    /// Remove clip instances not advanced for more than `max_age` clip updates
    pub fn clip_gc(&mut self, max_age: u32) -> usize {
        self.clips.gc(max_age)
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}
