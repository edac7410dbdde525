//! What the camera reads from the user, decoupled from bevy's input resources
//! so the controller can be driven by hand in tests.

use bevy::{
    ecs::system::Resource,
    input::{keyboard::KeyCode, mouse::MouseButton},
    math::Vec2,
};
use hashbrown::HashSet;

/// Read-only view of the held keys and the pointer for the current frame
pub trait InputState {
    /// Whether `key` is down
    fn key_held(&self, key: KeyCode) -> bool;
    /// Whether `button` is down
    fn button_held(&self, button: MouseButton) -> bool;
    /// Cursor position in window pixels, origin top-left
    fn pointer_position(&self) -> Option<Vec2>;
    /// Pointer motion accumulated since the previous frame, in pixels
    fn pointer_delta(&self) -> Vec2;
    /// Wheel motion accumulated since the previous frame, in lines
    fn scroll_delta(&self) -> f32;
}

/// Captured once per frame before any logic step runs
#[derive(Resource, Debug, Default, Clone)]
pub struct InputSnapshot {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    pointer: Option<Vec2>,
    delta: Vec2,
    scroll: f32,
}

impl InputSnapshot {
    /// Nothing held, no pointer
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds `key`
    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.keys.insert(key);
        self
    }

    /// Holds `button`
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.buttons.insert(button);
        self
    }

    /// Places the pointer at `position` in window pixels
    pub fn with_pointer(mut self, position: Vec2) -> Self {
        self.set_pointer(Some(position));
        self
    }

    /// Moves the pointer by `delta` pixels this frame
    pub fn with_pointer_delta(mut self, delta: Vec2) -> Self {
        self.delta = delta;
        self
    }

    /// Scrolls the wheel by `scroll` lines this frame
    pub fn with_scroll(mut self, scroll: f32) -> Self {
        self.scroll = scroll;
        self
    }

    /// Replaces the held keys and buttons
    pub fn set_held(
        &mut self,
        keys: impl IntoIterator<Item = KeyCode>,
        buttons: impl IntoIterator<Item = MouseButton>,
    ) {
        self.keys = keys.into_iter().collect();
        self.buttons = buttons.into_iter().collect();
    }

    /// Moves the cursor. `None` when it is outside the window.
    pub fn set_pointer(&mut self, position: Option<Vec2>) {
        self.pointer = position;
    }

    /// Replaces this frame's pointer and wheel motion
    pub fn set_motion(&mut self, delta: Vec2, scroll: f32) {
        self.delta = delta;
        self.scroll = scroll;
    }

    /// Drops everything the pointer reported this frame
    pub fn clear_pointer(&mut self) {
        self.buttons.clear();
        self.pointer = None;
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

impl InputState for InputSnapshot {
    fn key_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn button_held(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    fn pointer_position(&self) -> Option<Vec2> {
        self.pointer
    }

    fn pointer_delta(&self) -> Vec2 {
        self.delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_held() {
        let snapshot = InputSnapshot::new()
            .with_key(KeyCode::W)
            .with_button(MouseButton::Left)
            .with_scroll(2.0);
        assert!(snapshot.key_held(KeyCode::W));
        assert!(!snapshot.key_held(KeyCode::S));
        assert!(snapshot.button_held(MouseButton::Left));
        assert_eq!(snapshot.scroll_delta(), 2.0);
        assert_eq!(snapshot.pointer_position(), None);
    }

    #[test]
    fn test_clear_pointer_keeps_keys() {
        let mut snapshot = InputSnapshot::new()
            .with_key(KeyCode::A)
            .with_button(MouseButton::Right)
            .with_pointer(Vec2::new(10.0, 10.0))
            .with_pointer_delta(Vec2::ONE);
        snapshot.clear_pointer();
        assert!(snapshot.key_held(KeyCode::A));
        assert!(!snapshot.button_held(MouseButton::Right));
        assert_eq!(snapshot.pointer_position(), None);
        assert_eq!(snapshot.pointer_delta(), Vec2::ZERO);
    }
}
