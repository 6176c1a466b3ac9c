use imdraw_engine::toolkit::{ButtonState, InputEvent, Modifiers, PointerButton, WheelDelta};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

/// Maps a winit window event onto the toolkit's input model.
///
/// Positions are converted to logical pixels with `scale_factor`.
pub fn translate_input_event(scale_factor: f64, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::ModifiersChanged(m) => Some(InputEvent::ModifiersChanged(map_modifiers(m.state()))),

        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(scale_factor, *position);
            Some(InputEvent::PointerMoved { x, y })
        }

        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::PointerButton {
            button: map_mouse_button(*button),
            state: match state {
                ElementState::Pressed => ButtonState::Pressed,
                ElementState::Released => ButtonState::Released,
            },
        }),

        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel(match delta {
            MouseScrollDelta::LineDelta(x, y) => WheelDelta::Lines { x: *x, y: *y },
            MouseScrollDelta::PixelDelta(p) => {
                let (x, y) = to_logical_f32(scale_factor, *p);
                WheelDelta::Pixels { x, y }
            }
        })),

        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => {
            Some(InputEvent::Text(text.clone()))
        }

        _ => None,
    }
}

fn to_logical_f32(scale_factor: f64, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale_factor);
    (logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: MouseButton) -> PointerButton {
    match b {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(v) => PointerButton::Other(v),
    }
}
