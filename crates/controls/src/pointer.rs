/// Pointer input the orbit controls understand.
///
/// Coordinates are logical pixels relative to the top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Primary button pressed; starts a rotate drag.
    Down { x: f32, y: f32 },
    /// Cursor moved.
    Move { x: f32, y: f32 },
    /// Primary button released.
    Up,
    /// Scroll wheel, positive away from the user.
    Wheel { delta: f32 },
}

impl PointerInput {
    pub fn is_drag_event(&self) -> bool {
        !matches!(self, PointerInput::Wheel { .. })
    }
}
