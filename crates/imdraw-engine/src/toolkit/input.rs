/// Pointer button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel delta; lines for notched wheels, logical pixels for touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Lines { x: f32, y: f32 },
    Pixels { x: f32, y: f32 },
}

/// Platform-neutral input event forwarded to the toolkit.
///
/// Positions are in toolkit space (logical pixels).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    PointerButton { button: PointerButton, state: ButtonState },
    Wheel(WheelDelta),
    Text(String),
    ModifiersChanged(Modifiers),
    Focused(bool),
}
