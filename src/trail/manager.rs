use bevy::color::Color;
use bevy::log::debug;
use bevy::math::Vec2;
use bevy::prelude::{Message, Resource};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

use super::particle::{Particle, ParticleId, ParticlePhase};
use super::registry::{ParticleRegistry, Removal};
use super::scheduler::{Scheduler, TaskHandle};
use crate::config::TrailConfig;

/// Deferred lifecycle steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseTask {
    BeginFade(ParticleId),
    Destroy(ParticleId),
}

/// Display operation for the host to apply
#[derive(Message, Debug, Clone, PartialEq)]
pub enum TrailOp {
    /// Create a marker with its top-left corner at `position`
    Attach {
        id: ParticleId,
        position: Vec2,
        color: Color,
        size: f32,
        opacity: f32,
    },
    /// Start fading the marker out while it drifts by `drift`
    Fade { id: ParticleId, drift: Vec2 },
    /// Remove the marker from the display
    Detach { id: ParticleId },
}

/// Owns the live trail: registry, lifecycle timers and palette
///
/// All mutations queue [`TrailOp`]s; call [`TrailManager::drain_ops`] to apply them.
#[derive(Resource, Debug)]
pub struct TrailManager {
    config: TrailConfig,
    registry: ParticleRegistry,
    scheduler: Scheduler<PhaseTask>,
    /// Pending timer handles per live particle
    timers: HashMap<ParticleId, Vec<TaskHandle>>,
    next_id: u64,
    paused: bool,
    ops: Vec<TrailOp>,
}

impl TrailManager {
    pub fn new(config: TrailConfig) -> Self {
        TrailManager {
            config,
            registry: ParticleRegistry::new(),
            scheduler: Scheduler::new(),
            timers: HashMap::new(),
            next_id: 0,
            paused: false,
            ops: Vec::new(),
        }
    }

    // === Queries ===

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[allow(dead_code)]
    pub fn is_live(&self, id: ParticleId) -> bool {
        self.registry.contains(id)
    }

    /// Live particle ids, oldest first
    #[allow(dead_code)]
    pub fn live_ids(&self) -> Vec<ParticleId> {
        self.registry.ids().collect()
    }

    /// Phase of a live particle; `None` once it has been removed
    #[allow(dead_code)]
    pub fn phase(&self, id: ParticleId) -> Option<ParticlePhase> {
        self.registry.get(id).map(|p| p.phase)
    }

    #[cfg(test)]
    fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.registry.get(id)
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // === Mutations ===

    /// Pause or resume spawning. Live particles keep running their lifecycle.
    #[allow(dead_code)]
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Sample a pointer move; spawns a particle with a random palette color
    /// for roughly `spawn_probability` of calls.
    pub fn on_pointer_move(&mut self, position: Vec2, rng: &mut impl Rng) -> Option<ParticleId> {
        let probability = self.config.spawn_probability.clamp(0.0, 1.0);
        if self.paused || self.config.palette.is_empty() || !rng.random_bool(probability) {
            return None;
        }

        let color = self.config.palette[rng.random_range(0..self.config.palette.len())];
        Some(self.spawn(position, color))
    }

    /// Attach a new particle and schedule its fade and removal.
    /// Evicts the oldest particle if the trail is over capacity.
    pub fn spawn(&mut self, position: Vec2, color: Color) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;

        self.ops.push(TrailOp::Attach {
            id,
            position,
            color,
            size: self.config.marker_size,
            opacity: self.config.opacity,
        });
        self.registry.push(Particle::new(id, position, color));

        let fade = self
            .scheduler
            .schedule(self.config.fade_delay, PhaseTask::BeginFade(id));
        let destroy = self
            .scheduler
            .schedule(self.config.lifetime, PhaseTask::Destroy(id));
        self.timers.insert(id, vec![fade, destroy]);

        if self.registry.len() > self.config.capacity {
            self.evict_oldest();
        }

        id
    }

    /// Run every lifecycle step that is due after `elapsed` more time
    pub fn advance(&mut self, elapsed: Duration, rng: &mut impl Rng) {
        for task in self.scheduler.advance(elapsed) {
            match task {
                PhaseTask::BeginFade(id) => self.begin_fade(id, rng),
                PhaseTask::Destroy(id) => {
                    self.destroy(id);
                }
            }
        }
    }

    /// Remove a particle through its natural end of life. No-op if already gone.
    pub fn destroy(&mut self, id: ParticleId) -> Removal {
        self.remove(id, ParticlePhase::Destroyed)
    }

    /// Force out the oldest live particle
    pub fn evict_oldest(&mut self) -> Option<ParticleId> {
        let Removal::Removed(particle) = self.registry.pop_oldest(ParticlePhase::Evicted) else {
            return None;
        };
        self.retire(particle.id);
        debug!("Evicted particle {}", particle.id);
        Some(particle.id)
    }

    /// Evict every live particle. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        while self.evict_oldest().is_some() {
            removed += 1;
        }
        // Cancelled entries would otherwise sit in the queue until they come due
        self.scheduler.clear();
        removed
    }

    /// Take the display operations queued since the last drain
    pub fn drain_ops(&mut self) -> Vec<TrailOp> {
        std::mem::take(&mut self.ops)
    }

    fn begin_fade(&mut self, id: ParticleId, rng: &mut impl Rng) {
        let range = self.config.drift_range;
        let Some(particle) = self.registry.get_mut(id) else {
            return;
        };

        let drift = if range > 0.0 {
            Vec2::new(rng.random_range(-range..range), rng.random_range(-range..range))
        } else {
            Vec2::ZERO
        };

        if particle.begin_fade(drift) {
            self.ops.push(TrailOp::Fade { id, drift });
        }
    }

    fn remove(&mut self, id: ParticleId, phase: ParticlePhase) -> Removal {
        let removal = self.registry.remove(id, phase);
        if removal.was_removed() {
            self.retire(id);
        }
        removal
    }

    /// Cancel the timers of a particle that just left the registry and detach it
    fn retire(&mut self, id: ParticleId) {
        for handle in self.timers.remove(&id).unwrap_or_default() {
            self.scheduler.cancel(handle);
        }
        self.ops.push(TrailOp::Detach { id });
    }
}
