//! Integration tests for keyed tweens driven through the Animator
//!
//! These tests verify that:
//! - Scalar and color tweens produce the expected values frame by frame
//! - Queue, cut and crossfade policies resolve conflicting targets correctly
//! - Rebase redirects an in-flight animation without a visible jump
//! - Cached curve evaluation is deterministic and keyed by parameters

use motif_animation::easing::BACK_OVERSHOOT;
use motif_animation::{
    evaluate_preset, AnimationConfig, Animator, ChannelId, Easing, Motion, Policy, StepMode,
    ValueKind,
};
use motif_core::{Color, ColorSpace, Vec2};

fn linear(duration: f32) -> Motion {
    Motion::new(duration, Easing::Linear)
}

/// Scalar tween reaches the halfway value after half its duration
#[test]
fn test_scalar_tween_end_to_end() {
    let mut anim = Animator::new();
    anim.begin_frame();
    let v = anim.tween_float(ChannelId::new(1, 1), 10.0, &linear(1.0), 0.5);
    assert_eq!(v, 5.0);
}

/// A channel runs to completion and then holds its target exactly
#[test]
fn test_tween_settles_on_target() {
    let mut anim = Animator::new();
    let id = ChannelId::new(7, 3);
    let motion = Motion::new(0.3, Easing::back(BACK_OVERSHOOT));
    let mut last = 0.0;
    for _ in 0..30 {
        anim.begin_frame();
        last = anim.tween_float(id, 42.0, &motion, 1.0 / 60.0);
    }
    assert_eq!(last, 42.0);
}

/// White to black in OKLab at the midpoint is a perceptual gray, not the sRGB average
#[test]
fn test_oklab_color_midpoint() {
    let mut anim = Animator::new();
    let id = ChannelId::new(2, 1);
    let motion = linear(1.0).with_space(ColorSpace::Oklab);

    // New color channels start at opaque white
    anim.tween_color(id, Color::WHITE, &Motion::cut(), 0.0);
    let mid = anim.tween_color(id, Color::BLACK, &motion, 0.5);

    let naive = Color::WHITE.lerp(Color::BLACK, 0.5);
    assert!((mid.r - mid.g).abs() < 1e-3 && (mid.g - mid.b).abs() < 1e-3);
    assert!((mid.r - naive.r).abs() > 0.05);
    assert_eq!(mid.a, 1.0);
}

/// A queued target never disturbs the in-flight leg
#[test]
fn test_queue_preserves_trajectory() {
    let mut anim = Animator::new();
    let queued = ChannelId::new(1, 1);
    let reference = ChannelId::new(1, 2);
    let to_a = linear(1.0);
    let to_b = linear(1.0).with_policy(Policy::Queue);

    anim.tween_float(queued, 100.0, &to_a, 0.1);
    anim.tween_float(reference, 100.0, &to_a, 0.1);
    for _ in 0..8 {
        let q = anim.tween_float(queued, -100.0, &to_b, 0.1);
        let r = anim.tween_float(reference, 100.0, &to_a, 0.1);
        assert!((q - r).abs() < 1e-4, "queued {q} vs reference {r}");
    }

    // Leg toward A completes, B takes over afterwards
    let at_a = anim.tween_float(queued, -100.0, &to_b, 0.2);
    assert_eq!(at_a, 100.0);
    let next = anim.tween_float(queued, -100.0, &to_b, 0.5);
    assert!((next - 0.0).abs() < 1e-3);
}

/// Rebase keeps the current value and swaps only the destination
#[test]
fn test_rebase_is_continuous() {
    let mut anim = Animator::new();
    let id = ChannelId::new(3, 3);
    let motion = Motion::new(1.0, Easing::InOutCubic);
    anim.tween_vec2(id, Vec2::new(100.0, 0.0), &motion, 0.4);
    let before = anim.peek_vec2(id);

    anim.rebase_vec2(id, Vec2::new(0.0, 100.0), 0.0);
    assert_eq!(anim.peek_vec2(id), before);

    let next = anim.tween_vec2(id, Vec2::new(0.0, 100.0), &motion, 0.01);
    let before = before.unwrap_or_default();
    assert!((next - before).length() < 5.0);
}

/// Cut lands on the target in the same call
#[test]
fn test_cut_same_call() {
    let mut anim = Animator::new();
    let id = ChannelId::new(4, 4);
    anim.tween_int(id, 100, &linear(2.0), 0.5);
    assert_eq!(anim.tween_int(id, -3, &Motion::cut(), 0.016), -3);
}

/// Cached curves are bit-identical across calls and keyed by parameters
#[test]
fn test_lut_determinism() {
    let mut anim = Animator::new();
    let a = Easing::bezier(0.42, 0.0, 0.58, 1.0);
    let b = Easing::bezier(0.42, 0.0, 0.58, 0.9);
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        assert_eq!(anim.evaluate(&a, t).to_bits(), anim.evaluate(&a, t).to_bits());
    }
    assert_ne!(anim.evaluate(&a, 0.8), anim.evaluate(&b, 0.8));
    assert_eq!(anim.curves().cached_tables(), 2);
}

/// Analytic presets hit 0 and 1 exactly; LUT-backed ones within a sample
#[test]
fn test_preset_endpoints() {
    for e in [Easing::InOutQuint, Easing::OutExpo, Easing::InCirc, Easing::InOutSine] {
        assert_eq!(evaluate_preset(e, 0.0), 0.0);
        assert_eq!(evaluate_preset(e, 1.0), 1.0);
    }
    let mut anim = Animator::new();
    for e in [
        Easing::OutBounce,
        Easing::steps(3, StepMode::End),
        Easing::elastic(1.0, 0.3),
        Easing::bezier(0.25, 0.1, 0.25, 1.0),
    ] {
        assert!(anim.evaluate(&e, 0.0).abs() < 1e-5, "{e:?}");
        assert!((anim.evaluate(&e, 1.0) - 1.0).abs() < 1e-5, "{e:?}");
    }
}

/// Turning off LUT clamping keeps overshoot through the cache
#[test]
fn test_unclamped_lut_overshoots() {
    let mut clamped = Animator::new();
    let mut free = Animator::with_config(AnimationConfig::default().with_clamped_lut(false));
    let back = Easing::back(BACK_OVERSHOOT);
    let peak = |anim: &mut Animator| {
        (0..=100)
            .map(|i| anim.evaluate(&back, i as f32 / 100.0))
            .fold(f32::MIN, f32::max)
    };
    assert!(peak(&mut clamped) <= 1.0);
    assert!(peak(&mut free) > 1.0);
}

/// Stale channels are reclaimed by age, live ones survive
#[test]
fn test_frame_lifecycle_gc() {
    let mut anim = Animator::new();
    let live = ChannelId::new(10, 1);
    let stale = ChannelId::new(10, 2);
    anim.begin_frame();
    anim.tween_color(stale, Color::RED, &linear(0.2), 0.016);
    for _ in 0..700 {
        anim.begin_frame();
        anim.tween_color(live, Color::BLUE, &linear(0.2), 0.016);
    }
    assert_eq!(anim.gc_default(), 1);
    assert_eq!(anim.channel_count(ValueKind::Color), 1);
    assert_eq!(anim.peek_color(live), Some(Color::BLUE));
}
