use super::particle::{Particle, ParticleId, ParticlePhase};
use std::collections::{HashMap, VecDeque};

/// Outcome of removing a particle by id
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// The particle was live and is now gone; carries its final record
    Removed(Particle),
    /// Nothing to do: the id was never live or was already removed
    AlreadyGone,
}

impl Removal {
    pub fn was_removed(&self) -> bool {
        matches!(self, Removal::Removed(_))
    }
}

/// Ordered collection of live particles, oldest first
///
/// `order` and `particles` always hold the same set of ids.
#[derive(Debug, Clone, Default)]
pub struct ParticleRegistry {
    order: VecDeque<ParticleId>,
    particles: HashMap<ParticleId, Particle>,
}

impl ParticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains_key(&id)
    }

    #[allow(dead_code)]
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(&id)
    }

    /// Oldest live particle
    pub fn oldest(&self) -> Option<ParticleId> {
        self.order.front().copied()
    }

    /// Live ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.order.iter().copied()
    }

    /// Append a particle at the back (newest position)
    pub fn push(&mut self, particle: Particle) {
        let id = particle.id;
        if self.particles.insert(id, particle).is_none() {
            self.order.push_back(id);
        }
    }

    /// Remove a particle by identity, marking it with the given terminal phase.
    /// Removing an id that is not live is a no-op.
    pub fn remove(&mut self, id: ParticleId, phase: ParticlePhase) -> Removal {
        debug_assert!(phase.is_terminal(), "removal needs a terminal phase, got {:?}", phase);
        let Some(mut particle) = self.particles.remove(&id) else {
            return Removal::AlreadyGone;
        };

        // Natural removal is almost always at the front
        if self.order.front() == Some(&id) {
            self.order.pop_front();
        } else {
            self.order.retain(|&other| other != id);
        }

        particle.phase = phase;
        Removal::Removed(particle)
    }

    /// Remove the oldest particle, if any
    pub fn pop_oldest(&mut self, phase: ParticlePhase) -> Removal {
        match self.oldest() {
            Some(id) => self.remove(id, phase),
            None => Removal::AlreadyGone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::color::Color;
    use bevy::math::Vec2;

    fn particle(id: u64) -> Particle {
        Particle::new(ParticleId(id), Vec2::splat(id as f32), Color::WHITE)
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = ParticleRegistry::new();
        for id in 0..4 {
            registry.push(particle(id));
        }

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.oldest(), Some(ParticleId(0)));
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec![ParticleId(0), ParticleId(1), ParticleId(2), ParticleId(3)]);
    }

    #[test]
    fn test_remove_by_identity_from_middle() {
        let mut registry = ParticleRegistry::new();
        for id in 0..3 {
            registry.push(particle(id));
        }

        let removal = registry.remove(ParticleId(1), ParticlePhase::Destroyed);
        match removal {
            Removal::Removed(p) => {
                assert_eq!(p.id, ParticleId(1));
                assert_eq!(p.phase, ParticlePhase::Destroyed);
            }
            Removal::AlreadyGone => panic!("particle 1 should have been live"),
        }

        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec![ParticleId(0), ParticleId(2)]);
        assert!(!registry.contains(ParticleId(1)));
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut registry = ParticleRegistry::new();
        registry.push(particle(7));

        assert!(registry.remove(ParticleId(7), ParticlePhase::Evicted).was_removed());
        assert_eq!(registry.remove(ParticleId(7), ParticlePhase::Destroyed), Removal::AlreadyGone);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pop_oldest() {
        let mut registry = ParticleRegistry::new();
        assert_eq!(registry.pop_oldest(ParticlePhase::Evicted), Removal::AlreadyGone);

        registry.push(particle(4));
        registry.push(particle(5));
        let Removal::Removed(popped) = registry.pop_oldest(ParticlePhase::Evicted) else {
            panic!("registry should not be empty");
        };
        assert_eq!(popped.id, ParticleId(4));
        assert_eq!(popped.phase, ParticlePhase::Evicted);
        assert_eq!(registry.oldest(), Some(ParticleId(5)));
    }

    #[test]
    fn test_duplicate_push_keeps_single_entry() {
        let mut registry = ParticleRegistry::new();
        registry.push(particle(3));
        registry.push(particle(3));

        assert_eq!(registry.len(), 1);
    }
}
