//! Clip playback
//!
//! [`ClipSystem`] owns registered clips and the instances playing them.
//! Instances are addressed by caller-chosen ids; playing an id that already
//! exists restarts it. Each [`ClipSystem::update`] is one clip frame: it
//! advances delays, time, looping and direction for every running instance and
//! caches the sampled channel values, which are then read back with the
//! `get_*` accessors or mixed together with the layering calls.

use crate::channel::ValueKind;
use crate::clip::{Clip, ClipId, InstanceId, KeyValue, PlayDirection, TrackKey};
use crate::curve::CurveEvaluator;
use crate::error::{AnimationError, Result};
use crate::pool::StampedPool;
use motif_core::{Vec2, Vec4};
use rustc_hash::FxHashMap;

/// Upper bound on loop wraps processed in one update
const MAX_WRAPS: u32 = 1000;

/// Playback state of one clip instance
#[derive(Clone, Debug)]
pub struct Instance {
    clip: ClipId,
    time: f32,
    time_scale: f32,
    weight: f32,
    delay_left: f32,
    playing: bool,
    paused: bool,
    begun: bool,
    dir_sign: f32,
    loops_left: i32,
    values: FxHashMap<TrackKey, KeyValue>,
}

impl Instance {
    fn new(clip: ClipId) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            delay_left: 0.0,
            playing: false,
            paused: false,
            begun: false,
            dir_sign: 1.0,
            loops_left: 0,
            values: FxHashMap::default(),
        }
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn value(&self, channel: u32, kind: ValueKind) -> Option<KeyValue> {
        self.values.get(&TrackKey { channel, kind }).copied()
    }

    fn evaluate(&mut self, clip: &Clip, curves: &mut CurveEvaluator) {
        for track in clip.tracks() {
            if let Some(v) = track.sample(self.time, curves) {
                self.values.insert(track.key(), v);
            }
        }
    }

    /// Advance by `dt` seconds. Returns true if the instance was running.
    fn advance(&mut self, id: InstanceId, clip: &mut Clip, dt: f32, curves: &mut CurveEvaluator) -> bool {
        if !self.playing || self.paused {
            return false;
        }

        let mut dt = dt;
        if self.delay_left > 0.0 {
            self.delay_left -= dt;
            if self.delay_left > 0.0 {
                return true;
            }
            // Carry the unused part of the frame into playback
            dt = -self.delay_left;
            self.delay_left = 0.0;
        }

        if !self.begun {
            self.begun = true;
            tracing::trace!(clip = clip.id(), instance = id, "clip instance started");
            if let Some(cb) = clip.on_begin.as_mut() {
                cb(id);
            }
        }

        let duration = clip.duration();
        let scale = if self.time_scale > 0.0 { self.time_scale } else { 1.0 };
        let mut t = self.time + dt * scale * self.dir_sign;

        let done = duration <= 0.0 || self.wrap(&mut t, duration, clip.direction());
        if done {
            self.playing = false;
            self.time = if self.dir_sign > 0.0 { duration.max(0.0) } else { 0.0 };
            self.evaluate(clip, curves);
            tracing::trace!(clip = clip.id(), instance = id, "clip instance completed");
            if let Some(cb) = clip.on_complete.as_mut() {
                cb(id);
            }
            return true;
        }

        self.time = t.clamp(0.0, duration);
        self.evaluate(clip, curves);
        if let Some(cb) = clip.on_update.as_mut() {
            cb(id);
        }
        true
    }

    /// Fold `t` back into `[0, duration]`, consuming loops. Returns true when
    /// the instance ran out of loops.
    fn wrap(&mut self, t: &mut f32, duration: f32, direction: PlayDirection) -> bool {
        let mut wraps = 0;
        while (*t < 0.0 || *t > duration) && wraps < MAX_WRAPS {
            if self.loops_left == 0 {
                return true;
            }
            if self.loops_left > 0 {
                self.loops_left -= 1;
            }
            match direction {
                PlayDirection::Alternate => {
                    self.dir_sign = -self.dir_sign;
                    if *t < 0.0 {
                        *t = -*t;
                    } else {
                        *t = 2.0 * duration - *t;
                    }
                }
                PlayDirection::Forward | PlayDirection::Reverse => {
                    if *t < 0.0 {
                        *t += duration;
                    } else {
                        *t -= duration;
                    }
                }
            }
            wraps += 1;
        }
        false
    }
}

/// Weighted sum being accumulated for one blended channel
#[derive(Clone, Copy, Debug, Default)]
struct LayerSum {
    lanes: [f32; 4],
    weight: f32,
}

/// Registered clips, their instances and blended layers
#[derive(Debug)]
pub struct ClipSystem {
    clips: FxHashMap<ClipId, Clip>,
    instances: StampedPool<InstanceId, Instance>,
    layer: Option<(InstanceId, Vec<(InstanceId, f32)>)>,
    blended: FxHashMap<InstanceId, FxHashMap<TrackKey, KeyValue>>,
}

impl ClipSystem {
    pub fn new() -> Self {
        Self {
            clips: FxHashMap::default(),
            instances: StampedPool::new("clip-instances"),
            layer: None,
            blended: FxHashMap::default(),
        }
    }

    /// Register a clip, replacing any clip with the same id
    pub fn insert(&mut self, clip: Clip) -> Option<Clip> {
        self.clips.insert(clip.id(), clip)
    }

    /// Drop a clip; instances playing it stop advancing
    pub fn remove(&mut self, clip: ClipId) -> Option<Clip> {
        self.clips.remove(&clip)
    }

    pub fn clip(&self, clip: ClipId) -> Option<&Clip> {
        self.clips.get(&clip)
    }

    pub fn clip_exists(&self, clip: ClipId) -> bool {
        self.clips.contains_key(&clip)
    }

    pub fn clip_duration(&self, clip: ClipId) -> Result<f32> {
        self.clips
            .get(&clip)
            .map(Clip::duration)
            .ok_or(AnimationError::ClipNotFound(clip))
    }

    /// Extra start delay of stagger slot `index` for `clip`
    pub fn stagger_delay(&self, clip: ClipId, index: u32) -> Result<f32> {
        self.clips
            .get(&clip)
            .map(|c| c.stagger().delay(index))
            .ok_or(AnimationError::ClipNotFound(clip))
    }

    /// Start (or restart) `instance` playing `clip` from the beginning
    pub fn play(&mut self, clip: ClipId, instance: InstanceId) -> Result<()> {
        let c = self.clips.get(&clip).ok_or(AnimationError::ClipNotFound(clip))?;
        if c.is_empty() {
            return Err(AnimationError::EmptyClip(clip));
        }
        let reverse = c.direction() == PlayDirection::Reverse;
        let (duration, delay, loops) = (c.duration(), c.delay(), c.loop_count());

        let inst = self.instances.get_or_insert_with(instance, || Instance::new(clip));
        if inst.clip != clip {
            inst.values.clear();
        }
        inst.clip = clip;
        inst.time = if reverse { duration } else { 0.0 };
        inst.time_scale = 1.0;
        inst.weight = 1.0;
        inst.delay_left = delay;
        inst.playing = true;
        inst.paused = false;
        inst.begun = false;
        inst.dir_sign = if reverse { -1.0 } else { 1.0 };
        inst.loops_left = loops;
        Ok(())
    }

    /// Play with the clip's stagger delay for slot `index` added
    pub fn play_stagger(&mut self, clip: ClipId, instance: InstanceId, index: u32) -> Result<()> {
        let extra = self.stagger_delay(clip, index)?;
        self.play(clip, instance)?;
        self.instance_mut(instance)?.delay_left += extra;
        Ok(())
    }

    fn instance_mut(&mut self, instance: InstanceId) -> Result<&mut Instance> {
        self.instances
            .peek_mut(&instance)
            .ok_or(AnimationError::InstanceNotFound(instance))
    }

    pub fn instance(&self, instance: InstanceId) -> Option<&Instance> {
        self.instances.peek(&instance)
    }

    pub fn pause(&mut self, instance: InstanceId) -> Result<()> {
        self.instance_mut(instance)?.paused = true;
        Ok(())
    }

    pub fn resume(&mut self, instance: InstanceId) -> Result<()> {
        self.instance_mut(instance)?.paused = false;
        Ok(())
    }

    /// Stop playback and rewind to the start
    pub fn stop(&mut self, instance: InstanceId) -> Result<()> {
        let inst = self.instance_mut(instance)?;
        inst.playing = false;
        inst.time = 0.0;
        Ok(())
    }

    /// Remove an instance and its blended layer
    pub fn destroy(&mut self, instance: InstanceId) -> Result<()> {
        self.blended.remove(&instance);
        self.instances
            .remove(&instance)
            .map(|_| ())
            .ok_or(AnimationError::InstanceNotFound(instance))
    }

    /// Jump to `time`, clamped to the clip's duration
    pub fn seek(&mut self, instance: InstanceId, time: f32) -> Result<()> {
        if !time.is_finite() {
            return Err(AnimationError::InvalidArgument(format!("seek time {time}")));
        }
        let clip_id = self.instance_mut(instance)?.clip;
        let duration = self.clip_duration(clip_id)?;
        self.instance_mut(instance)?.time = time.clamp(0.0, duration);
        Ok(())
    }

    /// Playback speed multiplier; non-positive values play at normal speed
    pub fn set_time_scale(&mut self, instance: InstanceId, scale: f32) -> Result<()> {
        if scale.is_nan() {
            return Err(AnimationError::InvalidArgument("time scale is NaN".into()));
        }
        self.instance_mut(instance)?.time_scale = scale;
        Ok(())
    }

    /// Layer weight used when this instance is blended
    pub fn set_weight(&mut self, instance: InstanceId, weight: f32) -> Result<()> {
        if !weight.is_finite() {
            return Err(AnimationError::InvalidArgument(format!("weight {weight}")));
        }
        self.instance_mut(instance)?.weight = weight.max(0.0);
        Ok(())
    }

    pub fn instance_valid(&self, instance: InstanceId) -> bool {
        self.instances.contains(&instance)
    }

    pub fn time(&self, instance: InstanceId) -> Option<f32> {
        self.instance(instance).map(Instance::time)
    }

    /// Duration of the clip an instance is playing
    pub fn duration(&self, instance: InstanceId) -> Option<f32> {
        let inst = self.instance(instance)?;
        self.clips.get(&inst.clip).map(Clip::duration)
    }

    pub fn is_playing(&self, instance: InstanceId) -> bool {
        self.instance(instance).is_some_and(Instance::is_playing)
    }

    pub fn is_paused(&self, instance: InstanceId) -> bool {
        self.instance(instance).is_some_and(Instance::is_paused)
    }

    /// Advance every running instance by `dt` seconds (clamped to `[0, 1]`)
    pub fn update(&mut self, dt: f32, curves: &mut CurveEvaluator) {
        self.instances.begin_frame();
        let dt = if dt.is_finite() { dt.clamp(0.0, 1.0) } else { 0.0 };
        let clips = &mut self.clips;
        self.instances.update_each(|&id, inst| match clips.get_mut(&inst.clip) {
            Some(clip) => inst.advance(id, clip, dt, curves),
            None => false,
        });
    }

    /// Remove instances not advanced within the last `max_age` updates
    pub fn gc(&mut self, max_age: u32) -> usize {
        let removed = self.instances.gc(max_age);
        if removed > 0 {
            let instances = &self.instances;
            self.blended.retain(|id, _| instances.contains(id));
        }
        removed
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn get_float(&self, instance: InstanceId, channel: u32) -> Option<f32> {
        match self.instance(instance)?.value(channel, ValueKind::Float)? {
            KeyValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_vec2(&self, instance: InstanceId, channel: u32) -> Option<Vec2> {
        match self.instance(instance)?.value(channel, ValueKind::Vec2)? {
            KeyValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_vec4(&self, instance: InstanceId, channel: u32) -> Option<Vec4> {
        match self.instance(instance)?.value(channel, ValueKind::Vec4)? {
            KeyValue::Vec4(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_int(&self, instance: InstanceId, channel: u32) -> Option<i32> {
        match self.instance(instance)?.value(channel, ValueKind::Int)? {
            KeyValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Start collecting instances to blend into `target`
    pub fn layer_begin(&mut self, target: InstanceId) {
        self.layer = Some((target, Vec::new()));
    }

    /// Add an instance to the open layer with `weight` (scaled by its own weight)
    pub fn layer_add(&mut self, instance: InstanceId, weight: f32) -> Result<()> {
        let inst_weight = self
            .instance(instance)
            .map(Instance::weight)
            .ok_or(AnimationError::InstanceNotFound(instance))?;
        let (_, entries) = self
            .layer
            .as_mut()
            .ok_or_else(|| AnimationError::InvalidArgument("layer_add without layer_begin".into()))?;
        entries.push((instance, weight.max(0.0) * inst_weight));
        Ok(())
    }

    /// Close the open layer and store the weighted average under `target`.
    ///
    /// Each channel is normalized by the total weight of the instances that
    /// carry it; channels with zero total weight are left out.
    pub fn layer_end(&mut self, target: InstanceId) -> Result<()> {
        let (open, entries) = self
            .layer
            .take()
            .ok_or_else(|| AnimationError::InvalidArgument("layer_end without layer_begin".into()))?;
        if open != target {
            return Err(AnimationError::InvalidArgument(format!(
                "layer_end for {target} but {open} is open"
            )));
        }

        let mut sums: FxHashMap<TrackKey, LayerSum> = FxHashMap::default();
        for (id, weight) in entries {
            let Some(inst) = self.instances.peek(&id) else {
                continue;
            };
            for (key, value) in &inst.values {
                let sum = sums.entry(*key).or_default();
                for (acc, v) in sum.lanes.iter_mut().zip(value.to_lanes()) {
                    *acc += v * weight;
                }
                sum.weight += weight;
            }
        }

        let blended = sums
            .into_iter()
            .filter(|(_, s)| s.weight > 0.0)
            .filter_map(|(key, s)| {
                let lanes = s.lanes.map(|l| l / s.weight);
                KeyValue::from_lanes(key.kind, lanes).map(|v| (key, v))
            })
            .collect();
        self.blended.insert(target, blended);
        Ok(())
    }

    fn blended_value(&self, target: InstanceId, channel: u32, kind: ValueKind) -> Option<KeyValue> {
        self.blended.get(&target)?.get(&TrackKey { channel, kind }).copied()
    }

    pub fn get_blended_float(&self, target: InstanceId, channel: u32) -> Option<f32> {
        match self.blended_value(target, channel, ValueKind::Float)? {
            KeyValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_blended_vec2(&self, target: InstanceId, channel: u32) -> Option<Vec2> {
        match self.blended_value(target, channel, ValueKind::Vec2)? {
            KeyValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_blended_vec4(&self, target: InstanceId, channel: u32) -> Option<Vec4> {
        match self.blended_value(target, channel, ValueKind::Vec4)? {
            KeyValue::Vec4(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_blended_int(&self, target: InstanceId, channel: u32) -> Option<i32> {
        match self.blended_value(target, channel, ValueKind::Int)? {
            KeyValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for ClipSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipBuilder;
    use crate::easing::Easing;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ramp(id: ClipId) -> ClipBuilder {
        ClipBuilder::new(id)
            .key_float(1, 0.0, 0.0, Easing::Linear)
            .key_float(1, 1.0, 10.0, Easing::Linear)
    }

    #[test]
    fn test_play_unknown_and_empty() {
        let mut clips = ClipSystem::new();
        assert_eq!(clips.play(9, 1), Err(AnimationError::ClipNotFound(9)));
        clips.insert(ClipBuilder::new(2).build());
        assert_eq!(clips.play(2, 1), Err(AnimationError::EmptyClip(2)));
        assert_eq!(clips.pause(5), Err(AnimationError::InstanceNotFound(5)));
    }

    #[test]
    fn test_forward_playback_holds_end() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).build());
        clips.play(1, 100).unwrap();

        assert_eq!(clips.get_float(100, 1), None);
        clips.update(0.25, &mut curves);
        assert_eq!(clips.get_float(100, 1), Some(2.5));
        assert!(clips.is_playing(100));

        clips.update(1.0, &mut curves);
        assert_eq!(clips.get_float(100, 1), Some(10.0));
        assert_eq!(clips.time(100), Some(1.0));
        assert!(!clips.is_playing(100));
    }

    #[test]
    fn test_delay_carries_over() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).delay(0.5).build());
        clips.play(1, 1).unwrap();
        clips.update(0.25, &mut curves);
        assert_eq!(clips.get_float(1, 1), None);
        clips.update(0.5, &mut curves);
        assert_eq!(clips.time(1), Some(0.25));
    }

    #[test]
    fn test_reverse_plays_from_end() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).looping(PlayDirection::Reverse, 0).build());
        clips.play(1, 1).unwrap();
        clips.update(0.25, &mut curves);
        assert_eq!(clips.get_float(1, 1), Some(7.5));
        clips.update(1.0, &mut curves);
        assert_eq!(clips.get_float(1, 1), Some(0.0));
        assert!(!clips.is_playing(1));
    }

    #[test]
    fn test_alternate_bounces() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).looping(PlayDirection::Alternate, 1).build());
        clips.play(1, 1).unwrap();
        clips.update(0.75, &mut curves);
        clips.update(0.5, &mut curves);
        // Reflected at 1.0 and now heading back
        assert_eq!(clips.time(1), Some(0.75));
        clips.update(1.0, &mut curves);
        assert!(!clips.is_playing(1));
        assert_eq!(clips.time(1), Some(0.0));
    }

    #[test]
    fn test_finite_loops_terminate() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).looping(PlayDirection::Forward, 2).build());
        clips.play(1, 1).unwrap();
        for _ in 0..2 {
            clips.update(1.0, &mut curves);
            assert!(clips.is_playing(1));
        }
        clips.update(0.5, &mut curves);
        assert!(clips.is_playing(1));
        clips.update(1.0, &mut curves);
        assert!(!clips.is_playing(1));
        assert_eq!(clips.get_float(1, 1), Some(10.0));
    }

    #[test]
    fn test_infinite_loop_keeps_playing() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).looping(PlayDirection::Forward, -1).build());
        clips.play(1, 1).unwrap();
        for _ in 0..50 {
            clips.update(0.7, &mut curves);
        }
        assert!(clips.is_playing(1));
    }

    #[test]
    fn test_callbacks_fire() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (b, u, c) = (log.clone(), log.clone(), log.clone());
        clips.insert(
            ramp(1)
                .on_begin(move |id| b.borrow_mut().push(("begin", id)))
                .on_update(move |id| u.borrow_mut().push(("update", id)))
                .on_complete(move |id| c.borrow_mut().push(("complete", id)))
                .build(),
        );
        clips.play(1, 4).unwrap();
        clips.update(0.5, &mut curves);
        clips.update(0.6, &mut curves);
        clips.update(0.6, &mut curves);
        assert_eq!(
            *log.borrow(),
            vec![("begin", 4), ("update", 4), ("complete", 4)]
        );
    }

    #[test]
    fn test_pause_seek_scale() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).build());
        clips.play(1, 1).unwrap();

        clips.pause(1).unwrap();
        clips.update(0.5, &mut curves);
        assert_eq!(clips.time(1), Some(0.0));
        assert!(clips.is_paused(1));

        clips.resume(1).unwrap();
        clips.seek(1, 5.0).unwrap();
        assert_eq!(clips.time(1), Some(1.0));
        clips.seek(1, 0.0).unwrap();

        clips.set_time_scale(1, 2.0).unwrap();
        clips.update(0.25, &mut curves);
        assert_eq!(clips.time(1), Some(0.5));

        // Non-positive scale means normal speed
        clips.set_time_scale(1, 0.0).unwrap();
        clips.update(0.25, &mut curves);
        assert_eq!(clips.time(1), Some(0.75));

        assert!(clips.seek(1, f32::NAN).is_err());
        clips.stop(1).unwrap();
        assert!(!clips.is_playing(1));
        assert_eq!(clips.time(1), Some(0.0));
    }

    #[test]
    fn test_stagger() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).stagger(3, 0.25, 0.0).build());
        for i in 0..3 {
            clips.play_stagger(1, 10 + i, i).unwrap();
        }
        clips.update(0.5, &mut curves);
        assert_eq!(clips.time(10), Some(0.5));
        assert_eq!(clips.time(11), Some(0.25));
        assert_eq!(clips.time(12), Some(0.0));
    }

    #[test]
    fn test_layering() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).build());
        clips.insert(
            ClipBuilder::new(2)
                .key_float(1, 0.0, 20.0, Easing::Linear)
                .key_float(1, 1.0, 20.0, Easing::Linear)
                .build(),
        );
        clips.play(1, 1).unwrap();
        clips.play(2, 2).unwrap();
        clips.update(0.5, &mut curves);

        clips.layer_begin(99);
        clips.layer_add(1, 3.0).unwrap();
        clips.layer_add(2, 1.0).unwrap();
        clips.layer_end(99).unwrap();
        // (5 * 3 + 20 * 1) / 4
        assert_eq!(clips.get_blended_float(99, 1), Some(8.75));

        clips.layer_begin(98);
        clips.layer_add(1, 0.0).unwrap();
        clips.layer_end(98).unwrap();
        assert_eq!(clips.get_blended_float(98, 1), None);

        assert!(clips.layer_end(97).is_err());
    }

    #[test]
    fn test_gc_removes_idle_instances() {
        let mut curves = CurveEvaluator::default();
        let mut clips = ClipSystem::new();
        clips.insert(ramp(1).build());
        clips.play(1, 1).unwrap();
        clips.play(1, 2).unwrap();
        clips.stop(2).unwrap();
        for _ in 0..3 {
            clips.update(0.1, &mut curves);
        }
        assert_eq!(clips.gc(2), 1);
        assert!(clips.instance_valid(1));
        assert!(!clips.instance_valid(2));
        clips.destroy(1).unwrap();
        assert_eq!(clips.instance_count(), 0);
    }
}
