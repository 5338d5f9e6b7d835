mod manager;
mod particle;
mod registry;
mod scheduler;

pub use manager::{TrailManager, TrailOp};
pub use particle::ParticleId;
