use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::camera::MainCamera;
use crate::input::PointerMoved;
use crate::trail::{ParticleId, TrailManager, TrailOp};
use crate::visual::utils::ease;

/// Display-side marker for one live particle
#[derive(Component, Debug)]
pub struct TrailMarker {
    pub id: ParticleId,
    /// Translation at attach time; the fade drifts away from here
    pub origin: Vec3,
    /// Opacity at attach time
    pub opacity: f32,
}

/// Fade/drift/shrink transition, started by [`TrailOp::Fade`]
#[derive(Component, Debug)]
pub struct FadeAnimation {
    /// World-space offset reached at the end of the transition
    pub drift: Vec2,
    pub elapsed: Duration,
    pub duration: Duration,
}

impl FadeAnimation {
    pub fn new(drift: Vec2, duration: Duration) -> Self {
        FadeAnimation {
            drift,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Entity for each particle that is still on screen
#[derive(Resource, Default, Debug)]
pub struct MarkerEntities(pub HashMap<ParticleId, Entity>);

/// Circle mesh shared by every marker
#[derive(Resource)]
pub struct MarkerMesh(pub Handle<Mesh>);

pub fn setup_marker_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    manager: Res<TrailManager>,
) {
    let radius = manager.config().marker_size * 0.5;
    commands.insert_resource(MarkerMesh(meshes.add(Circle::new(radius))));
}

/// Center of a marker whose top-left corner sits at `corner` (world space, Y-up)
pub fn marker_center(corner: Vec2, size: f32) -> Vec2 {
    corner + Vec2::new(size * 0.5, -size * 0.5)
}

/// Drift offsets are sampled in screen orientation (Y-down)
pub fn drift_to_world(drift: Vec2) -> Vec2 {
    Vec2::new(drift.x, -drift.y)
}

/// System: Run lifecycle timers that came due since the last frame
///
/// Runs before pointer sampling so a particle's fade never starts in the
/// frame that attached it.
pub fn advance_trail_timers(time: Res<Time>, mut manager: ResMut<TrailManager>) {
    manager.advance(time.delta(), &mut rand::rng());
}

/// System: Feed pointer moves to the trail manager
pub fn sample_pointer_moves(
    mut pointer_events: MessageReader<PointerMoved>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut manager: ResMut<TrailManager>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let mut rng = rand::rng();
    for event in pointer_events.read() {
        let Some(world_pos) = event.to_world_position(camera, camera_transform) else {
            continue;
        };
        if let Some(id) = manager.on_pointer_move(world_pos, &mut rng) {
            trace!("Spawned particle {} at {:?}", id, world_pos);
        }
    }
}

/// System: Forward queued display operations as messages
pub fn publish_trail_ops(mut manager: ResMut<TrailManager>, mut out: MessageWriter<TrailOp>) {
    out.write_batch(manager.drain_ops());
}

/// System: Create, restyle and remove marker entities
pub fn apply_trail_ops(
    mut commands: Commands,
    mut ops: MessageReader<TrailOp>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    marker_mesh: Res<MarkerMesh>,
    manager: Res<TrailManager>,
    mut entities: ResMut<MarkerEntities>,
) {
    let config = manager.config();

    for op in ops.read() {
        match *op {
            TrailOp::Attach {
                id,
                position,
                color,
                size,
                opacity,
            } => {
                let origin = marker_center(position, size).extend(config.layer);
                let entity = commands
                    .spawn((
                        TrailMarker { id, origin, opacity },
                        Mesh2d(marker_mesh.0.clone()),
                        MeshMaterial2d(materials.add(ColorMaterial {
                            color: color.with_alpha(opacity),
                            ..default()
                        })),
                        Transform::from_translation(origin),
                    ))
                    .id();
                entities.0.insert(id, entity);
            }
            TrailOp::Fade { id, drift } => {
                // The entity may have been despawned elsewhere since it attached
                if let Some(&entity) = entities.0.get(&id) {
                    commands.entity(entity).try_insert(FadeAnimation::new(
                        drift_to_world(drift),
                        config.transition,
                    ));
                }
            }
            TrailOp::Detach { id } => {
                // Detaching twice (or after an out-of-band despawn) does nothing
                if let Some(entity) = entities.0.remove(&id) {
                    commands.entity(entity).try_despawn();
                }
            }
        }
    }
}

/// System: Ease fading markers toward transparent, drifted and shrunk
pub fn animate_fading_markers(
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut markers: Query<(
        &TrailMarker,
        &mut FadeAnimation,
        &mut Transform,
        &MeshMaterial2d<ColorMaterial>,
    )>,
) {
    for (marker, mut fade, mut transform, material_handle) in &mut markers {
        fade.elapsed += time.delta();
        let eased = ease(fade.progress());

        transform.translation = marker.origin + (fade.drift * eased).extend(0.0);
        transform.scale = Vec3::splat(1.0 - eased);

        if let Some(material) = materials.get_mut(&material_handle.0) {
            material.color.set_alpha(marker.opacity * (1.0 - eased));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrailConfig;

    #[test]
    fn test_marker_center_hangs_below_right_of_pointer() {
        let center = marker_center(Vec2::new(100.0, 50.0), 8.0);
        assert_eq!(center, Vec2::new(104.0, 46.0));
    }

    #[test]
    fn test_drift_flips_vertical_axis() {
        assert_eq!(drift_to_world(Vec2::new(12.0, 30.0)), Vec2::new(12.0, -30.0));
    }

    #[test]
    fn test_fade_progress_clamps() {
        let mut fade = FadeAnimation::new(Vec2::ZERO, Duration::from_millis(1000));
        assert_eq!(fade.progress(), 0.0);

        fade.elapsed = Duration::from_millis(250);
        assert!((fade.progress() - 0.25).abs() < 1e-6);

        fade.elapsed = Duration::from_millis(4000);
        assert_eq!(fade.progress(), 1.0);
    }

    #[test]
    fn test_zero_length_fade_is_instant() {
        let fade = FadeAnimation::new(Vec2::ONE, Duration::ZERO);
        assert_eq!(fade.progress(), 1.0);
    }

    fn trail_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<ColorMaterial>>()
            .init_resource::<MarkerEntities>()
            .insert_resource(MarkerMesh(Handle::default()))
            .insert_resource(TrailManager::new(TrailConfig::default()))
            .add_message::<TrailOp>()
            .add_systems(Update, (publish_trail_ops, apply_trail_ops).chain());
        app
    }

    fn marker_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&TrailMarker>().iter(world).count()
    }

    #[test]
    fn test_markers_follow_capacity_and_clear() {
        let mut app = trail_app();
        let ids: Vec<_> = {
            let mut manager = app.world_mut().resource_mut::<TrailManager>();
            (0..35)
                .map(|i| manager.spawn(Vec2::new(i as f32, 0.0), Color::WHITE))
                .collect()
        };
        app.update();

        assert_eq!(marker_count(&mut app), 30);
        let entities = app.world().resource::<MarkerEntities>();
        assert_eq!(entities.0.len(), 30);
        assert!(ids[..5].iter().all(|id| !entities.0.contains_key(id)));

        // Clearing twice and repeating a detach leaves nothing behind
        app.world_mut().resource_mut::<TrailManager>().clear();
        app.world_mut().resource_mut::<TrailManager>().clear();
        app.world_mut().write_message(TrailOp::Detach { id: ids[10] });
        app.update();

        assert_eq!(marker_count(&mut app), 0);
        assert!(app.world().resource::<MarkerEntities>().0.is_empty());
    }

    #[test]
    fn test_fade_after_external_despawn_is_ignored() {
        let mut app = trail_app();
        let id = app
            .world_mut()
            .resource_mut::<TrailManager>()
            .spawn(Vec2::ZERO, Color::WHITE);
        app.update();

        let entity = app.world().resource::<MarkerEntities>().0[&id];
        app.world_mut().despawn(entity);
        app.world_mut().write_message(TrailOp::Fade {
            id,
            drift: Vec2::new(20.0, -20.0),
        });
        app.update();

        assert_eq!(marker_count(&mut app), 0);

        // The id is still known, so the later detach just drops the stale entry
        app.world_mut().resource_mut::<TrailManager>().destroy(id);
        app.update();
        assert!(app.world().resource::<MarkerEntities>().0.is_empty());
    }
}
