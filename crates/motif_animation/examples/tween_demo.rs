//! Headless Tween Demo
//!
//! Simulates a few seconds of 60 fps frames and prints animated values:
//! - A button offset crossfading between two targets
//! - A hover color blended in OKLCH
//! - A ping-pong keyframe clip
//!
//! Run with: RUST_LOG=motif_animation=debug cargo run -p motif_animation --example tween_demo

use motif_animation::easing::BACK_OVERSHOOT;
use motif_animation::{
    Animator, ChannelId, ClipBuilder, Easing, Motion, PlayDirection, Policy, Result,
};
use motif_core::{Color, ColorSpace};
use tracing_subscriber::EnvFilter;

const BUTTON: u32 = 1;
const OFFSET: u32 = 1;
const HOVER: u32 = 2;
const PULSE_CLIP: u32 = 10;
const PULSE: u32 = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut anim = Animator::new();
    anim.clips_mut().insert(
        ClipBuilder::new(PULSE_CLIP)
            .key_float(0, 0.0, 1.0, Easing::InOutSine)
            .key_float(0, 0.6, 1.2, Easing::InOutSine)
            .looping(PlayDirection::Alternate, -1)
            .build(),
    );
    anim.clips_mut().play(PULSE_CLIP, PULSE)?;

    let slide = Motion::new(0.4, Easing::back(BACK_OVERSHOOT))
        .with_policy(Policy::Crossfade);
    let hover = Motion::new(0.25, Easing::OutCubic).with_space(ColorSpace::Oklch);
    let dt = 1.0 / 60.0;

    for frame in 0..180 {
        anim.begin_frame();
        let hovered = (frame / 60) % 2 == 1;
        let x = anim.tween_float(
            ChannelId::new(BUTTON, OFFSET),
            if hovered { 24.0 } else { 0.0 },
            &slide,
            dt,
        );
        let color = anim.tween_color(
            ChannelId::new(BUTTON, HOVER),
            if hovered { Color::from_hex(0x7C3AED) } else { Color::from_hex(0x0EA5E9) },
            &hover,
            dt,
        );
        anim.update_clips(dt);
        let scale = anim.clips().get_float(PULSE, 0).unwrap_or(1.0);

        if frame % 15 == 0 {
            tracing::info!(
                frame,
                x,
                scale,
                r = color.r,
                g = color.g,
                b = color.b,
                "frame"
            );
        }
    }

    let collected = anim.gc_default();
    tracing::info!(collected, "done");
    Ok(())
}
