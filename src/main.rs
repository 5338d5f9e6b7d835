use bevy::prelude::*;

mod camera;
mod config;
mod input;
mod shortcuts;
mod trail;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;
use shortcuts::ShortcutsPlugin;

use crate::visual::plugin::TrailPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Cursor Trail".into(),
            resolution: WindowResolution::new(1280, 800),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(TrailPlugin)
    .add_plugins(ShortcutsPlugin);

    app.run();
}
