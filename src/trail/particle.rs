use bevy::color::Color;
use bevy::math::Vec2;
use std::fmt;

/// Particle identifier, unique for the lifetime of a trail manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle stage of a particle
///
/// `Spawned -> Fading -> Destroyed`, or `Evicted` from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticlePhase {
    /// Attached to the display, fade not started yet
    Spawned,
    /// Drifting outward and fading
    Fading,
    /// Removed by its own lifetime timer
    Destroyed,
    /// Removed early to keep the trail within capacity
    Evicted,
}

impl ParticlePhase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ParticlePhase::Destroyed | ParticlePhase::Evicted)
    }
}

/// A single trail marker tracked by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    /// Where the marker's top-left corner was placed
    pub position: Vec2,
    pub color: Color,
    /// Offset the marker drifts to while fading (set when the fade starts)
    pub drift: Vec2,
    pub phase: ParticlePhase,
}

impl Particle {
    pub fn new(id: ParticleId, position: Vec2, color: Color) -> Self {
        Particle {
            id,
            position,
            color,
            drift: Vec2::ZERO,
            phase: ParticlePhase::Spawned,
        }
    }

    /// Move into the fading phase. Returns false if the particle is not fresh.
    pub fn begin_fade(&mut self, drift: Vec2) -> bool {
        if self.phase != ParticlePhase::Spawned {
            return false;
        }
        self.drift = drift;
        self.phase = ParticlePhase::Fading;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_only_from_spawned() {
        let mut particle = Particle::new(ParticleId(1), Vec2::new(3.0, 4.0), Color::WHITE);

        assert!(particle.begin_fade(Vec2::new(10.0, -5.0)));
        assert_eq!(particle.phase, ParticlePhase::Fading);
        assert_eq!(particle.drift, Vec2::new(10.0, -5.0));

        // Second fade keeps the first drift
        assert!(!particle.begin_fade(Vec2::ZERO));
        assert_eq!(particle.drift, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(!ParticlePhase::Spawned.is_terminal());
        assert!(!ParticlePhase::Fading.is_terminal());
        assert!(ParticlePhase::Destroyed.is_terminal());
        assert!(ParticlePhase::Evicted.is_terminal());
    }
}
