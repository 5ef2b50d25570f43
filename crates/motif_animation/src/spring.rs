//! Damped spring response curve
//!
//! Closed-form unit step response of a mass-spring-damper system, used as an
//! easing family. Progress starts at 0 and settles at 1; the elapsed time is the
//! curve parameter `t` itself (one second spans the whole curve).

/// Parameters of a spring easing curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParams {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Initial progress velocity; positive values move toward the target,
    /// so the response slope at `t = 0` equals this value
    pub initial_velocity: f32,
}

impl SpringParams {
    /// Create a new spring configuration
    pub const fn new(mass: f32, stiffness: f32, damping: f32, initial_velocity: f32) -> Self {
        Self {
            mass,
            stiffness,
            damping,
            initial_velocity,
        }
    }

    /// A gentle, slow spring (good for page transitions)
    pub const fn gentle() -> Self {
        Self::new(1.0, 120.0, 14.0, 0.0)
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub const fn wobbly() -> Self {
        Self::new(1.0, 180.0, 12.0, 0.0)
    }

    /// A stiff, snappy spring (good for buttons)
    pub const fn stiff() -> Self {
        Self::new(1.0, 400.0, 30.0, 0.0)
    }

    /// A heavily damped spring that never overshoots
    pub const fn molasses() -> Self {
        Self::new(1.0, 100.0, 20.0, 0.0)
    }

    /// Replace non-positive parameters with usable defaults
    pub fn sanitized(self) -> Self {
        Self {
            mass: if self.mass <= 0.0 { 1.0 } else { self.mass },
            stiffness: if self.stiffness <= 0.0 {
                120.0
            } else {
                self.stiffness
            },
            damping: if self.damping <= 0.0 {
                20.0
            } else {
                self.damping
            },
            initial_velocity: self.initial_velocity,
        }
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Damping ratio (zeta); 1.0 is critical
    pub fn damping_ratio(&self) -> f32 {
        self.damping / self.critical_damping()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio() < 1.0 - CRITICAL_BAND
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping_ratio() - 1.0).abs() <= CRITICAL_BAND
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping_ratio() > 1.0 + CRITICAL_BAND
    }

    /// Progress at time `t` seconds after release, starting from 0 toward 1
    pub fn response(&self, t: f32) -> f32 {
        let p = self.sanitized();
        let wn = (p.stiffness / p.mass).sqrt();
        let zeta = p.damping_ratio();
        let v0 = p.initial_velocity;

        // Displacement from the target: x(0) = 1, x'(0) = -v0
        let x = if p.is_underdamped() {
            let wd = wn * (1.0 - zeta * zeta).sqrt();
            let b = (zeta * wn - v0) / wd;
            (-zeta * wn * t).exp() * ((wd * t).cos() + b * (wd * t).sin())
        } else if p.is_critically_damped() {
            (1.0 + (wn - v0) * t) * (-wn * t).exp()
        } else {
            let wd = wn * (zeta * zeta - 1.0).sqrt();
            let r1 = -zeta * wn + wd;
            let r2 = -zeta * wn - wd;
            let c1 = (-v0 - r2) / (r1 - r2);
            let c2 = 1.0 - c1;
            c1 * (r1 * t).exp() + c2 * (r2 * t).exp()
        };

        1.0 - x
    }
}

/// Damping ratios this close to 1.0 use the critically damped solution
const CRITICAL_BAND: f32 = 1e-4;

impl Default for SpringParams {
    fn default() -> Self {
        Self::new(1.0, 120.0, 20.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_starts_at_zero() {
        for p in [
            SpringParams::gentle(),
            SpringParams::wobbly(),
            SpringParams::stiff(),
            SpringParams::molasses(),
            SpringParams::new(1.0, 100.0, 60.0, 0.0),
        ] {
            assert!(p.response(0.0).abs() < 1e-6, "{p:?}");
        }
    }

    #[test]
    fn test_spring_settles() {
        for p in [SpringParams::stiff(), SpringParams::molasses()] {
            assert!((p.response(1.0) - 1.0).abs() < 1e-3, "{p:?}");
        }
    }

    #[test]
    fn test_damping_regimes() {
        assert!(SpringParams::wobbly().is_underdamped());
        assert!(SpringParams::gentle().is_underdamped());
        assert!(SpringParams::molasses().is_critically_damped());
        assert!(SpringParams::new(1.0, 100.0, 60.0, 0.0).is_overdamped());
    }

    #[test]
    fn test_underdamped_overshoots() {
        let p = SpringParams::wobbly();
        let peak = (0..=100)
            .map(|i| p.response(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_overdamped_is_monotonic() {
        let p = SpringParams::new(1.0, 100.0, 60.0, 0.0);
        let mut prev = p.response(0.0);
        for i in 1..=100 {
            let y = p.response(i as f32 / 100.0);
            assert!(y >= prev - 1e-6);
            prev = y;
        }
    }

    #[test]
    fn test_initial_velocity_speeds_up_start() {
        let rest = SpringParams::molasses();
        let pushed = SpringParams {
            initial_velocity: 10.0,
            ..rest
        };
        assert!(pushed.response(0.05) > rest.response(0.05));
    }

    #[test]
    fn test_initial_velocity_sets_start_slope() {
        let h = 1e-4;
        for v0 in [10.0, -10.0] {
            let p = SpringParams::new(1.0, 100.0, 5.0, v0);
            let slope = (p.response(h) - p.response(0.0)) / h;
            assert!((slope - v0).abs() < 0.1, "v0 {v0} slope {slope}");
        }
        let at_rest = SpringParams::new(1.0, 100.0, 5.0, 0.0);
        assert!(at_rest.response(1e-4).abs() < 1e-4);
    }

    #[test]
    fn test_sanitized_defaults() {
        let p = SpringParams::new(0.0, -1.0, 0.0, 2.0).sanitized();
        assert_eq!(p, SpringParams::new(1.0, 120.0, 20.0, 2.0));
    }
}
