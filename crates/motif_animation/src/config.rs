//! Engine configuration

/// Smallest LUT resolution accepted for parametric curves
pub const MIN_LUT_SAMPLES: usize = 9;

/// Default LUT resolution for parametric curves
pub const DEFAULT_LUT_SAMPLES: usize = 129;

/// Initial channel capacity per value type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolCapacity {
    pub float: usize,
    pub vec2: usize,
    pub vec4: usize,
    pub int: usize,
    pub color: usize,
}

impl PoolCapacity {
    /// Same capacity for every value type
    pub const fn uniform(n: usize) -> Self {
        Self {
            float: n,
            vec2: n,
            vec4: n,
            int: n,
            color: n,
        }
    }
}

/// Configuration for an [`Animator`](crate::Animator)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Samples per cached curve table (floored to [`MIN_LUT_SAMPLES`])
    pub lut_samples: usize,
    /// Clamp cached curve samples to `[0, 1]`.
    ///
    /// Back, elastic and spring curves lose their overshoot through the cache
    /// while this is set.
    pub clamp_lut_output: bool,
    /// Process-wide time multiplier; callers fold it into their delta time
    pub time_scale: f32,
    /// Age threshold used by `Animator::gc_default`, in frames
    pub default_gc_age: u32,
    /// Channels reserved up front
    pub capacity: PoolCapacity,
}

impl AnimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coarse curve tables and small pools
    pub fn low_memory() -> Self {
        Self {
            lut_samples: 33,
            capacity: PoolCapacity::uniform(16),
            ..Self::default()
        }
    }

    /// Dense curve tables for large on-screen travel
    pub fn high_fidelity() -> Self {
        Self {
            lut_samples: 513,
            capacity: PoolCapacity::uniform(256),
            ..Self::default()
        }
    }

    /// Builder: set the LUT resolution
    pub fn with_lut_samples(mut self, samples: usize) -> Self {
        self.lut_samples = samples;
        self
    }

    /// Builder: keep or drop LUT overshoot
    pub fn with_clamped_lut(mut self, clamp: bool) -> Self {
        self.clamp_lut_output = clamp;
        self
    }

    /// Builder: set the global time scale
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Builder: set the default gc age
    pub fn with_gc_age(mut self, frames: u32) -> Self {
        self.default_gc_age = frames;
        self
    }

    /// Builder: set initial pool capacity
    pub fn with_capacity(mut self, capacity: PoolCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// LUT resolution after applying the floor
    pub fn effective_lut_samples(&self) -> usize {
        self.lut_samples.max(MIN_LUT_SAMPLES)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            lut_samples: DEFAULT_LUT_SAMPLES,
            clamp_lut_output: true,
            time_scale: 1.0,
            default_gc_age: 600,
            capacity: PoolCapacity::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AnimationConfig::default();
        assert_eq!(cfg.lut_samples, 129);
        assert!(cfg.clamp_lut_output);
        assert_eq!(cfg.time_scale, 1.0);
        assert_eq!(cfg.default_gc_age, 600);
    }

    #[test]
    fn test_lut_floor() {
        let cfg = AnimationConfig::new().with_lut_samples(2);
        assert_eq!(cfg.effective_lut_samples(), MIN_LUT_SAMPLES);
        assert_eq!(AnimationConfig::high_fidelity().effective_lut_samples(), 513);
    }
}
