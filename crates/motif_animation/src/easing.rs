//! Easing curves
//!
//! An [`Easing`] describes a curve `[0, 1] -> R`. Simple families (power, sine,
//! exponential, circular) are closed-form and cheap; the parametric families
//! (back, elastic, bounce, steps, cubic bezier, spring) are sampled once into a
//! lookup table by [`CurveEvaluator`](crate::CurveEvaluator) and interpolated
//! from there.
//!
//! [`Easing::apply`] always evaluates the exact formula without caching.

use crate::spring::SpringParams;
use rustc_hash::FxHasher;
use std::f32::consts::PI;
use std::hash::Hasher;

/// Default overshoot of the back family
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Where a stepped curve jumps within each interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepMode {
    /// Jump at the end of each interval (CSS `jump-end`)
    #[default]
    End,
    /// Jump at the start of each interval
    Start,
    /// Half-interval offset, jumping at both ends
    Both,
}

/// Easing function type
///
/// Parametric variants treat a zero or negative parameter as "use the
/// family default" (overshoot 1.70158, amplitude 1, period 0.3 / 0.45).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    /// Overshoot factor
    InBack(f32),
    OutBack(f32),
    InOutBack(f32),
    InElastic {
        amplitude: f32,
        period: f32,
    },
    OutElastic {
        amplitude: f32,
        period: f32,
    },
    InOutElastic {
        amplitude: f32,
        period: f32,
    },
    InBounce,
    OutBounce,
    InOutBounce,
    Steps {
        count: u32,
        mode: StepMode,
    },
    /// CSS-style timing curve with control points (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    Spring(SpringParams),
    /// A curve registered on the evaluator under this slot
    Custom(u32),
}

impl Easing {
    /// Cubic bezier timing curve
    pub const fn bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Easing::CubicBezier(x1, y1, x2, y2)
    }

    /// Stepped curve with `count` steps (at least one)
    pub const fn steps(count: u32, mode: StepMode) -> Self {
        Easing::Steps { count, mode }
    }

    /// Ease-out back with the given overshoot
    pub const fn back(overshoot: f32) -> Self {
        Easing::OutBack(overshoot)
    }

    /// Ease-out elastic with amplitude and period
    pub const fn elastic(amplitude: f32, period: f32) -> Self {
        Easing::OutElastic { amplitude, period }
    }

    /// Physical spring response
    pub const fn spring(mass: f32, stiffness: f32, damping: f32, initial_velocity: f32) -> Self {
        Easing::Spring(SpringParams::new(mass, stiffness, damping, initial_velocity))
    }

    /// Curve registered under `slot`
    pub const fn custom(slot: u32) -> Self {
        Easing::Custom(slot)
    }

    /// True for closed-form families that are evaluated directly
    pub fn is_analytic(&self) -> bool {
        matches!(
            self,
            Easing::Linear
                | Easing::InQuad
                | Easing::OutQuad
                | Easing::InOutQuad
                | Easing::InCubic
                | Easing::OutCubic
                | Easing::InOutCubic
                | Easing::InQuart
                | Easing::OutQuart
                | Easing::InOutQuart
                | Easing::InQuint
                | Easing::OutQuint
                | Easing::InOutQuint
                | Easing::InSine
                | Easing::OutSine
                | Easing::InOutSine
                | Easing::InExpo
                | Easing::OutExpo
                | Easing::InOutExpo
                | Easing::InCirc
                | Easing::OutCirc
                | Easing::InOutCirc
        )
    }

    /// Short family name, used in logs
    pub fn family(&self) -> &'static str {
        match self {
            Easing::InBack(_) | Easing::OutBack(_) | Easing::InOutBack(_) => "back",
            Easing::InElastic { .. } | Easing::OutElastic { .. } | Easing::InOutElastic { .. } => {
                "elastic"
            }
            Easing::InBounce | Easing::OutBounce | Easing::InOutBounce => "bounce",
            Easing::Steps { .. } => "steps",
            Easing::CubicBezier(..) => "cubic-bezier",
            Easing::Spring(_) => "spring",
            Easing::Custom(_) => "custom",
            _ => "analytic",
        }
    }

    /// Bitwise descriptor equality (NaN parameters compare equal to themselves)
    pub fn same_descriptor(&self, other: &Easing) -> bool {
        self.tag() == other.tag() && self.param_bits() == other.param_bits()
    }

    /// Content hash of the descriptor, used to key cached curve tables
    pub fn cache_key(&self) -> u64 {
        let mut h = FxHasher::default();
        h.write_u8(self.tag());
        for bits in self.param_bits() {
            h.write_u32(bits);
        }
        h.finish()
    }

    /// Apply the easing function to a progress value (clamped to 0.0..=1.0)
    ///
    /// Exact and uncached. Custom slots cannot be resolved here and behave as
    /// linear.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::InQuart => t * t * t * t,
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::InQuint => t * t * t * t * t,
            Easing::OutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::InOutQuint => {
                if t < 0.5 {
                    16.0 * t * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::InSine => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (t * PI / 2.0).cos()
                }
            }
            Easing::OutSine => {
                if t >= 1.0 {
                    1.0
                } else {
                    (t * PI / 2.0).sin()
                }
            }
            Easing::InOutSine => {
                if t >= 1.0 {
                    1.0
                } else {
                    -((PI * t).cos() - 1.0) / 2.0
                }
            }
            Easing::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Easing::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - 4.0 * t * t).sqrt()) / 2.0
                } else {
                    ((1.0 - (2.0 * t - 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Easing::InBack(s) => back_core(t, overshoot_or(s, BACK_OVERSHOOT)),
            Easing::OutBack(s) => 1.0 - back_core(1.0 - t, overshoot_or(s, BACK_OVERSHOOT)),
            Easing::InOutBack(s) => {
                let s = overshoot_or(s, BACK_OVERSHOOT * 1.525);
                if t < 0.5 {
                    0.5 * back_core(2.0 * t, s)
                } else {
                    1.0 - 0.5 * back_core(2.0 * (1.0 - t), s)
                }
            }
            Easing::InElastic { amplitude, period } => {
                elastic_core(t, amplitude, period_or(period, 0.3))
            }
            Easing::OutElastic { amplitude, period } => {
                1.0 - elastic_core(1.0 - t, amplitude, period_or(period, 0.3))
            }
            Easing::InOutElastic { amplitude, period } => {
                let p = period_or(period, 0.45);
                if t < 0.5 {
                    0.5 * elastic_core(2.0 * t, amplitude, p)
                } else {
                    1.0 - 0.5 * elastic_core(2.0 - 2.0 * t, amplitude, p)
                }
            }
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - 2.0 * t))
                } else {
                    0.5 * bounce_out(2.0 * t - 1.0) + 0.5
                }
            }
            Easing::Steps { count, mode } => steps(t, count, mode),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
            Easing::Spring(params) => params.response(t),
            Easing::Custom(_) => t,
        }
    }

    pub(crate) fn tag(&self) -> u8 {
        match self {
            Easing::Linear => 0,
            Easing::InQuad => 1,
            Easing::OutQuad => 2,
            Easing::InOutQuad => 3,
            Easing::InCubic => 4,
            Easing::OutCubic => 5,
            Easing::InOutCubic => 6,
            Easing::InQuart => 7,
            Easing::OutQuart => 8,
            Easing::InOutQuart => 9,
            Easing::InQuint => 10,
            Easing::OutQuint => 11,
            Easing::InOutQuint => 12,
            Easing::InSine => 13,
            Easing::OutSine => 14,
            Easing::InOutSine => 15,
            Easing::InExpo => 16,
            Easing::OutExpo => 17,
            Easing::InOutExpo => 18,
            Easing::InCirc => 19,
            Easing::OutCirc => 20,
            Easing::InOutCirc => 21,
            Easing::InBack(_) => 22,
            Easing::OutBack(_) => 23,
            Easing::InOutBack(_) => 24,
            Easing::InElastic { .. } => 25,
            Easing::OutElastic { .. } => 26,
            Easing::InOutElastic { .. } => 27,
            Easing::InBounce => 28,
            Easing::OutBounce => 29,
            Easing::InOutBounce => 30,
            Easing::Steps { .. } => 31,
            Easing::CubicBezier(..) => 32,
            Easing::Spring(_) => 33,
            Easing::Custom(_) => 34,
        }
    }

    /// Bit patterns of the descriptor's parameters
    pub(crate) fn param_bits(&self) -> [u32; 4] {
        match *self {
            Easing::InBack(s) | Easing::OutBack(s) | Easing::InOutBack(s) => [s.to_bits(), 0, 0, 0],
            Easing::InElastic { amplitude, period }
            | Easing::OutElastic { amplitude, period }
            | Easing::InOutElastic { amplitude, period } => {
                [amplitude.to_bits(), period.to_bits(), 0, 0]
            }
            Easing::Steps { count, mode } => [count, mode as u32, 0, 0],
            Easing::CubicBezier(x1, y1, x2, y2) => {
                [x1.to_bits(), y1.to_bits(), x2.to_bits(), y2.to_bits()]
            }
            Easing::Spring(p) => [
                p.mass.to_bits(),
                p.stiffness.to_bits(),
                p.damping.to_bits(),
                p.initial_velocity.to_bits(),
            ],
            Easing::Custom(slot) => [slot, 0, 0, 0],
            _ => [0; 4],
        }
    }
}

/// Evaluate an easing without a channel or cache
pub fn evaluate_preset(easing: Easing, t: f32) -> f32 {
    easing.apply(t)
}

#[inline]
fn overshoot_or(s: f32, default: f32) -> f32 {
    if s == 0.0 {
        default
    } else {
        s
    }
}

#[inline]
fn period_or(p: f32, default: f32) -> f32 {
    if p <= 0.0 {
        default
    } else {
        p
    }
}

#[inline]
fn back_core(t: f32, s: f32) -> f32 {
    t * t * ((s + 1.0) * t - s)
}

/// Ease-in elastic curve; 0 at 0 and 1 at 1
fn elastic_core(t: f32, amplitude: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    // Amplitudes below 1 would leave a gap at the endpoint
    let a = amplitude.max(1.0);
    let s = period / (2.0 * PI) * (1.0 / a).asin();
    -(a * 2f32.powf(10.0 * (t - 1.0)) * ((t - 1.0 - s) * (2.0 * PI) / period).sin())
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

fn steps(t: f32, count: u32, mode: StepMode) -> f32 {
    let n = count.max(1) as f32;
    match mode {
        StepMode::Start => ((t * n + 1e-6).floor() + 1.0).min(n) / n,
        StepMode::End => (t * n + 1e-6).floor() / n,
        StepMode::Both => (((t * n - 0.5 + 1e-6).floor() + 0.5) / n).clamp(0.0, 1.0),
    }
}

/// Newton-Raphson iterations used to invert the bezier x polynomial
const BEZIER_NEWTON_ITERATIONS: usize = 5;

/// Cubic bezier easing calculation as used by CSS timing functions.
///
/// Solves `x(s) = t` with a fixed number of Newton-Raphson steps, clamping the
/// parameter to `[0, 1]` after each step, then samples `y(s)`. Computes in f64
/// internally.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x; // initial guess
    for _ in 0..BEZIER_NEWTON_ITERATIONS {
        let err = bezier_sample(p, x1, x2) - x;
        let slope = bezier_slope(p, x1, x2);
        if slope != 0.0 {
            p -= err / slope;
        }
        p = p.clamp(0.0, 1.0);
    }

    bezier_sample(p, y1, y2) as f32
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    // Horner form: ((1-3p2+3p1)t + 3p2-6p1)t + 3p1) * t
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
