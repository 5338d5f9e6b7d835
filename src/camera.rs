use bevy::prelude::*;

/// Deep violet backdrop the trail colors are tuned against
const BACKGROUND: Color = Color::srgb(0.06, 0.02, 0.1);

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_camera);
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Setup a 2D orthographic camera where one world unit is one logical pixel
///
/// World space is Y-up with the origin at the window center, so window
/// coordinates go through [`Camera::viewport_to_world_2d`] before use.
fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}
