//! Cached curve evaluation
//!
//! [`CurveEvaluator`] is the single entry point channels and clips use to turn
//! normalized progress into eased progress. Analytic families are computed in
//! place, parametric families go through the [`LutCache`], and custom slots
//! dispatch to closures registered by the host.

use crate::config::DEFAULT_LUT_SAMPLES;
use crate::easing::Easing;
use crate::lut::LutCache;
use rustc_hash::FxHashMap;
use std::fmt;

/// A host-supplied easing curve
pub type CustomEasing = Box<dyn Fn(f32) -> f32>;

/// Evaluates easing descriptors with table caching and custom slots
pub struct CurveEvaluator {
    luts: LutCache,
    custom: FxHashMap<u32, CustomEasing>,
}

impl CurveEvaluator {
    pub fn new(lut_samples: usize, clamp_lut_output: bool) -> Self {
        Self {
            luts: LutCache::new(lut_samples, clamp_lut_output),
            custom: FxHashMap::default(),
        }
    }

    /// Eased progress for `t`, clamped to `[0, 1]` first
    pub fn evaluate(&mut self, easing: &Easing, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match easing {
            Easing::Custom(slot) => match self.custom.get(slot) {
                Some(f) => f(t),
                None => {
                    tracing::debug!(slot, "unregistered custom easing, using linear");
                    t
                }
            },
            e if e.is_analytic() => e.apply(t),
            e => self.luts.sample(e, t),
        }
    }

    /// Register a curve under `slot`, returning the one it replaces
    pub fn register_custom<F>(&mut self, slot: u32, f: F) -> Option<CustomEasing>
    where
        F: Fn(f32) -> f32 + 'static,
    {
        let previous = self.custom.insert(slot, Box::new(f));
        tracing::debug!(slot, replaced = previous.is_some(), "registered custom easing");
        previous
    }

    pub fn unregister_custom(&mut self, slot: u32) -> Option<CustomEasing> {
        self.custom.remove(&slot)
    }

    pub fn custom(&self, slot: u32) -> Option<&dyn Fn(f32) -> f32> {
        self.custom.get(&slot).map(|f| f.as_ref())
    }

    /// Change the table resolution; cached tables are dropped
    pub fn set_lut_samples(&mut self, count: usize) {
        self.luts.set_sample_count(count);
    }

    pub fn lut_samples(&self) -> usize {
        self.luts.sample_count()
    }

    pub fn cached_tables(&self) -> usize {
        self.luts.len()
    }

    pub fn begin_frame(&mut self) {
        self.luts.begin_frame();
    }

    /// Evict tables unused for more than `max_age` frames
    pub fn gc(&mut self, max_age: u32) -> usize {
        self.luts.gc(max_age)
    }
}

impl Default for CurveEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_LUT_SAMPLES, true)
    }
}

impl fmt::Debug for CurveEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<_> = self.custom.keys().copied().collect();
        slots.sort_unstable();
        f.debug_struct("CurveEvaluator")
            .field("luts", &self.luts)
            .field("custom_slots", &slots)
            .finish()
    }
}
