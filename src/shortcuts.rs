use std::collections::HashMap;
use std::time::Duration;

use bevy::app::AppExit;
use bevy::input::ButtonInput;
use bevy::prelude::*;

use crate::trail::TrailManager;
use crate::visual::markers::publish_trail_ops;

pub struct ShortcutsPlugin;

impl Plugin for ShortcutsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(KeyboardCommands::create())
            .add_systems(Update, handle_keypress.before(publish_trail_ops));
    }
}

/// The function that invokes the keyboard action. Returns a status line to log.
type KeyboardAction = fn(manager: &mut TrailManager) -> String;

/// Defines a keyboard command to associate with a keypress.
/// Each command can have a different repeat rate.
pub struct KeyboardCommand {
    pub description: String,
    /// App time of the last run; `None` until the first press
    pub last_action_time: Option<Duration>,
    pub interval: Duration,
    pub action: KeyboardAction,
}

/// Contains the collection of keyboard commands.
#[derive(Resource)]
pub struct KeyboardCommands {
    pub commands: HashMap<KeyCode, KeyboardCommand>,
}

impl KeyboardCommands {
    pub fn create() -> Self {
        let mut kb_cmds = KeyboardCommands {
            commands: HashMap::new(),
        };

        // Esc: wipe the trail
        kb_cmds.add_command(KeyCode::Escape, "Clear trail", 250, clear_trail);
        // P: stop / resume spawning
        kb_cmds.add_command(KeyCode::KeyP, "Pause trail (toggle)", 500, toggle_pause);

        kb_cmds
    }

    pub fn add_command(&mut self, key: KeyCode, description: &str, interval_millis: u64, action: KeyboardAction) {
        self.commands.insert(
            key,
            KeyboardCommand {
                description: description.into(),
                last_action_time: None,
                interval: Duration::from_millis(interval_millis),
                action,
            },
        );
    }

    /// Run the command bound to `key` unless it ran less than its interval ago
    pub fn trigger(&mut self, key: KeyCode, now: Duration, manager: &mut TrailManager) -> Option<String> {
        let command = self.commands.get_mut(&key)?;
        if let Some(last) = command.last_action_time {
            if now.saturating_sub(last) < command.interval {
                return None;
            }
        }
        command.last_action_time = Some(now);
        Some((command.action)(manager))
    }

    pub fn help_text(&self) -> String {
        let mut entries: Vec<_> = self
            .commands
            .iter()
            .map(|(key, cmd)| format!("{key:?} - {}", cmd.description))
            .collect();
        entries.sort();

        let mut kb_help: String = "Keyboard commands:".into();
        for entry in entries {
            kb_help.push('\n');
            kb_help.push_str(&entry);
        }
        kb_help.push_str("\nQ - Quit");
        kb_help
    }
}

fn clear_trail(manager: &mut TrailManager) -> String {
    let removed = manager.clear();
    format!("Cleared {} particles", removed)
}

fn toggle_pause(manager: &mut TrailManager) -> String {
    if manager.toggle_paused() {
        "Trail paused".into()
    } else {
        "Trail resumed".into()
    }
}

pub fn handle_keypress(
    kb: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut app_exit: MessageWriter<AppExit>,
    mut kb_cmds: ResMut<KeyboardCommands>,
    mut manager: ResMut<TrailManager>,
) {
    // Q: quit the app
    if kb.just_pressed(KeyCode::KeyQ) {
        app_exit.write(AppExit::Success);
    }

    // ?: display help
    if kb.just_pressed(KeyCode::Slash) && (kb.pressed(KeyCode::ShiftLeft) || kb.pressed(KeyCode::ShiftRight)) {
        info!("{}", kb_cmds.help_text());
    }

    let now = time.elapsed();
    let pressed: Vec<KeyCode> = kb.get_pressed().copied().collect();
    for key in pressed {
        if let Some(status) = kb_cmds.trigger(key, now, &mut manager) {
            info!("{}", status);
        }
    }
}
