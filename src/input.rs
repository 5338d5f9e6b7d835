use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::CursorMoved;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PointerMoved>()
            .add_systems(PreUpdate, collect_pointer_moves);
    }
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct PointerMoved {
    /// Window (logical) coordinates: pixels from the top-left corner
    pub position: Vec2,
    /// 0 = mouse, otherwise the touch id
    pub id: u64,
}

impl PointerMoved {
    /// Convert window coords to world space using a 2D camera
    pub fn to_world_position(
        &self,
        camera: &Camera,
        camera_transform: &GlobalTransform,
    ) -> Option<Vec2> {
        camera
            .viewport_to_world_2d(camera_transform, self.position)
            .ok()
    }
}

/// Touch phases that count as the pointer moving over the window
fn is_touch_move(phase: TouchPhase) -> bool {
    matches!(phase, TouchPhase::Started | TouchPhase::Moved)
}

fn collect_pointer_moves(
    mut ev_cursor: MessageReader<CursorMoved>,
    mut touch_events: MessageReader<TouchInput>,
    mut out: MessageWriter<PointerMoved>,
) {
    // Every cursor move counts, no button needs to be held
    for e in ev_cursor.read() {
        out.write(PointerMoved {
            position: e.position,
            id: 0,
        });
    }

    for ev in touch_events.read() {
        if is_touch_move(ev.phase) {
            out.write(PointerMoved {
                position: ev.position,
                id: ev.id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_move_phases() {
        assert!(is_touch_move(TouchPhase::Started));
        assert!(is_touch_move(TouchPhase::Moved));
        assert!(!is_touch_move(TouchPhase::Ended));
        assert!(!is_touch_move(TouchPhase::Canceled));
    }
}
