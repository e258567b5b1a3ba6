//! Time-based property interpolation.
//!
//! Every animated value in the page is a `Vec3` (camera position, camera
//! Euler rotation, segment scale), so a tween is a `from -> to` pair of
//! vectors, a duration and an easing curve. At most one tween runs per
//! [`Property`]; starting another on the same property replaces it.
//! Completion is reported by id from [`TweenScheduler::update`] rather than
//! through callbacks.

use crate::segment::SegmentId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    QuadraticOut,
    QuadraticInOut,
}

impl Easing {
    /// Map linear progress `k` in [0, 1] to eased progress.
    #[inline]
    pub fn apply(self, k: f32) -> f32 {
        let k = k.clamp(0.0, 1.0);
        match self {
            Easing::Linear => k,
            Easing::QuadraticOut => k * (2.0 - k),
            Easing::QuadraticInOut => {
                if k < 0.5 {
                    2.0 * k * k
                } else {
                    -1.0 + (4.0 - 2.0 * k) * k
                }
            }
        }
    }
}

/// Animatable target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    CameraPosition,
    CameraRotation,
    SegmentScale(SegmentId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Clone, Debug)]
struct Tween {
    id: TweenId,
    property: Property,
    from: Vec3,
    to: Vec3,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn sample(&self) -> Vec3 {
        if self.finished() {
            // exact landing, no float drift from the lerp
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(self.progress()))
    }
}

#[derive(Debug, Default)]
pub struct TweenScheduler {
    tweens: Vec<Tween>,
    next_id: u64,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start interpolating `property` from `from` to `to`. Any tween already
    /// running on the same property is dropped without completing.
    pub fn start(
        &mut self,
        property: Property,
        from: Vec3,
        to: Vec3,
        duration: Duration,
        easing: Easing,
    ) -> TweenId {
        self.tweens.retain(|t| t.property != property);
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(Tween {
            id,
            property,
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        });
        id
    }

    /// Drop the tween on `property`, if any. The property keeps whatever value
    /// the last update wrote.
    pub fn cancel(&mut self, property: &Property) -> Option<TweenId> {
        let pos = self.tweens.iter().position(|t| &t.property == property)?;
        Some(self.tweens.remove(pos).id)
    }

    /// Drop every tween whose property matches `pred` and return those properties.
    pub fn cancel_matching(
        &mut self,
        mut pred: impl FnMut(&Property) -> bool,
    ) -> SmallVec<[Property; 4]> {
        let mut cancelled = SmallVec::new();
        self.tweens.retain(|t| {
            if pred(&t.property) {
                cancelled.push(t.property.clone());
                false
            } else {
                true
            }
        });
        cancelled
    }

    pub fn is_active(&self, property: &Property) -> bool {
        self.tweens.iter().any(|t| &t.property == property)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance all tweens by `dt`, hand each sampled value to `apply`, and
    /// return the ids of tweens that finished during this step, in start order.
    pub fn update(
        &mut self,
        dt: Duration,
        mut apply: impl FnMut(&Property, Vec3),
    ) -> SmallVec<[TweenId; 4]> {
        let mut completed = SmallVec::new();
        for t in &mut self.tweens {
            t.elapsed = (t.elapsed + dt).min(t.duration);
            apply(&t.property, t.sample());
            if t.finished() {
                completed.push(t.id);
            }
        }
        self.tweens.retain(|t| !t.finished());
        completed
    }
}
