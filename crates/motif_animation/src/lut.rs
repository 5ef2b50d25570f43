//! Sampled curve tables for parametric easings

use crate::config::{DEFAULT_LUT_SAMPLES, MIN_LUT_SAMPLES};
use crate::easing::Easing;
use crate::pool::StampedPool;

/// A curve sampled at evenly spaced points over `[0, 1]`
#[derive(Clone, Debug)]
pub struct EaseLut {
    easing: Easing,
    samples: Vec<f32>,
}

impl EaseLut {
    /// Sample `easing` at `count` points (floored to [`MIN_LUT_SAMPLES`])
    pub fn build(easing: Easing, count: usize, clamp: bool) -> Self {
        let count = count.max(MIN_LUT_SAMPLES);
        let last = (count - 1) as f32;
        let samples = (0..count)
            .map(|i| {
                let y = easing.apply(i as f32 / last);
                if clamp {
                    y.clamp(0.0, 1.0)
                } else {
                    y
                }
            })
            .collect();
        tracing::trace!(family = easing.family(), count, "built easing table");
        Self { easing, samples }
    }

    /// Linearly interpolate between the two samples nearest to `t`
    pub fn sample(&self, t: f32) -> f32 {
        let last = self.samples.len() - 1;
        let x = t.clamp(0.0, 1.0) * last as f32;
        let i = (x as usize).min(last);
        if i == last {
            return self.samples[last];
        }
        let frac = x - i as f32;
        let a = self.samples[i];
        let b = self.samples[i + 1];
        a + (b - a) * frac
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Tables keyed by descriptor hash, evicted by age like channels
#[derive(Debug)]
pub struct LutCache {
    tables: StampedPool<u64, EaseLut>,
    sample_count: usize,
    clamp: bool,
}

impl LutCache {
    pub fn new(sample_count: usize, clamp: bool) -> Self {
        Self {
            tables: StampedPool::new("lut"),
            sample_count: sample_count.max(MIN_LUT_SAMPLES),
            clamp,
        }
    }

    /// Sample the cached table for `easing`, building it on first use
    pub fn sample(&mut self, easing: &Easing, t: f32) -> f32 {
        let count = self.sample_count;
        let clamp = self.clamp;
        let lut = self
            .tables
            .get_or_insert_with(easing.cache_key(), || EaseLut::build(*easing, count, clamp));
        if !lut.easing.same_descriptor(easing) {
            tracing::debug!(
                cached = lut.easing.family(),
                requested = easing.family(),
                "easing table key collision, rebuilding"
            );
            *lut = EaseLut::build(*easing, count, clamp);
        }
        lut.sample(t)
    }

    /// Change the table resolution, dropping every cached table
    pub fn set_sample_count(&mut self, count: usize) {
        let count = count.max(MIN_LUT_SAMPLES);
        if count == self.sample_count {
            return;
        }
        let dropped = self.tables.len();
        self.tables.clear();
        self.sample_count = count;
        tracing::debug!(count, dropped, "easing table resolution changed");
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn clamps_output(&self) -> bool {
        self.clamp
    }

    pub fn begin_frame(&mut self) {
        self.tables.begin_frame();
    }

    pub fn gc(&mut self, max_age: u32) -> usize {
        self.tables.gc(max_age)
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for LutCache {
    fn default() -> Self {
        Self::new(DEFAULT_LUT_SAMPLES, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::StepMode;

    #[test]
    fn test_table_endpoints() {
        let lut = EaseLut::build(Easing::OutBounce, 129, true);
        assert_eq!(lut.len(), 129);
        assert!(lut.sample(0.0).abs() < 1e-6);
        assert!((lut.sample(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_resolution() {
        let lut = EaseLut::build(Easing::bezier(0.4, 0.0, 0.2, 1.0), 2, true);
        assert_eq!(lut.len(), MIN_LUT_SAMPLES);
    }

    #[test]
    fn test_interpolates_between_samples() {
        let lut = EaseLut::build(Easing::bezier(0.0, 0.0, 1.0, 1.0), 9, true);
        // Linear bezier reproduces t between sample points
        assert!((lut.sample(0.0625) - 0.0625).abs() < 1e-4);
        assert!((lut.sample(0.7) - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_removes_overshoot() {
        let e = Easing::back(0.0);
        let clamped = EaseLut::build(e, 129, true);
        let free = EaseLut::build(e, 129, false);
        let peak = |l: &EaseLut| (0..=100).map(|i| l.sample(i as f32 / 100.0)).fold(f32::MIN, f32::max);
        assert!(peak(&clamped) <= 1.0);
        assert!(peak(&free) > 1.0);
    }

    #[test]
    fn test_cache_reuses_and_distinguishes() {
        let mut cache = LutCache::default();
        let a = Easing::steps(4, StepMode::End);
        let b = Easing::steps(5, StepMode::End);
        let first = cache.sample(&a, 0.3);
        assert_eq!(cache.sample(&a, 0.3).to_bits(), first.to_bits());
        assert_eq!(cache.len(), 1);
        cache.sample(&b, 0.3);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_resolution_change_clears() {
        let mut cache = LutCache::default();
        cache.sample(&Easing::OutBounce, 0.5);
        cache.set_sample_count(33);
        assert!(cache.is_empty());
        assert_eq!(cache.sample_count(), 33);
        cache.sample(&Easing::OutBounce, 0.5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_gc_evicts_unused_tables() {
        let mut cache = LutCache::default();
        cache.sample(&Easing::OutBounce, 0.5);
        cache.begin_frame();
        cache.begin_frame();
        assert_eq!(cache.gc(1), 1);
    }
}
