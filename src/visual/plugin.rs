use crate::config::TrailConfig;
use crate::trail::{TrailManager, TrailOp};
use crate::visual::markers::{
    MarkerEntities, advance_trail_timers, animate_fading_markers, apply_trail_ops,
    publish_trail_ops, sample_pointer_moves, setup_marker_mesh,
};
use bevy::prelude::*;

pub struct TrailPlugin;

impl Plugin for TrailPlugin {
    fn build(&self, app: &mut App) {
        let config = match TrailConfig::load() {
            Ok(config) => {
                info!(
                    "Trail config loaded: capacity={}, spawn_probability={}, lifetime={:?}",
                    config.capacity, config.spawn_probability, config.lifetime
                );
                config
            }
            Err(e) => {
                error!("Failed to load trail config: {}", e);
                warn!("Falling back to built-in trail defaults");
                TrailConfig::default()
            }
        };

        app.insert_resource(TrailManager::new(config))
            .init_resource::<MarkerEntities>()
            .add_message::<TrailOp>()
            .add_systems(Startup, setup_marker_mesh)
            .add_systems(
                Update,
                (
                    // Timers first so a new particle never fades in its spawn frame
                    advance_trail_timers,
                    sample_pointer_moves,
                    publish_trail_ops,
                    // Display updates
                    apply_trail_ops,
                    animate_fading_markers,
                )
                    .chain(),
            );
    }
}
