//! Motif Animation Engine
//!
//! Keyed tweens for immediate-mode UIs, plus authored keyframe clips.
//!
//! # Features
//!
//! - **Keyed Channels**: values identified by `(owner, channel)` pairs, created on
//!   first use and collected when they stop being requested
//! - **Easing**: power, sine, expo and circular curves evaluated in closed form;
//!   back, elastic, bounce, steps, cubic bezier and spring curves cached as tables
//! - **Retarget Policies**: crossfade, cut and queue, plus rebase for continuous
//!   mid-flight redirects
//! - **Color Spaces**: blending in sRGB, linear RGB, HSV, OKLab and OKLCH
//! - **Clips**: keyframe tracks with delay, looping, stagger, callbacks and layering
//!
//! Everything is owned by an [`Animator`]; there is no global state.

pub mod anchor;
pub mod animator;
pub mod channel;
pub mod clip;
pub mod config;
pub mod curve;
pub mod easing;
pub mod error;
pub mod lut;
pub mod playback;
pub mod pool;
pub mod spring;

pub use anchor::{AnchorSource, AnchorSpace, Axis, FixedAnchors, Relative};
pub use animator::Animator;
pub use channel::{Channel, Motion, Policy, Tweenable, ValueKind, DURATION_EPSILON, TARGET_EPSILON};
pub use clip::{Clip, ClipBuilder, ClipId, InstanceId, KeyValue, Keyframe, PlayDirection, Stagger};
pub use config::{AnimationConfig, PoolCapacity, DEFAULT_LUT_SAMPLES, MIN_LUT_SAMPLES};
pub use curve::{CurveEvaluator, CustomEasing};
pub use easing::{evaluate_preset, Easing, StepMode};
pub use error::{AnimationError, Result};
pub use playback::ClipSystem;
pub use pool::{ChannelId, StampedPool};
pub use spring::SpringParams;
