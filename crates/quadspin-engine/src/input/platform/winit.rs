use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::window::Window;

use crate::input::{PointerEvent, PointerId, PointerPhase};

/// Translates a winit `WindowEvent` into a pointer event.
///
/// winit reports mouse buttons without a position, so the last cursor position
/// is tracked in `cursor`. Returns `None` for events that are not pointer
/// input, and for mouse buttons other than the primary one.
pub(crate) fn translate_window_event(
    window: &Window,
    cursor: &mut Option<(f32, f32)>,
    event: &WindowEvent,
) -> Option<PointerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            *cursor = Some((x, y));
            Some(PointerEvent {
                pointer: PointerId::Mouse,
                phase: PointerPhase::Moved,
                x,
                y,
            })
        }

        WindowEvent::CursorLeft { .. } => {
            let (x, y) = cursor.take().unwrap_or((0.0, 0.0));
            Some(PointerEvent {
                pointer: PointerId::Mouse,
                phase: PointerPhase::Cancelled,
                x,
                y,
            })
        }

        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => {
            let (x, y) = cursor.unwrap_or((0.0, 0.0));
            let phase = match state {
                ElementState::Pressed => PointerPhase::Pressed,
                ElementState::Released => PointerPhase::Released,
            };
            Some(PointerEvent {
                pointer: PointerId::Mouse,
                phase,
                x,
                y,
            })
        }

        WindowEvent::Touch(Touch {
            phase,
            location,
            id,
            ..
        }) => {
            let (x, y) = to_logical_f32(window, *location);
            let phase = match phase {
                TouchPhase::Started => PointerPhase::Pressed,
                TouchPhase::Moved => PointerPhase::Moved,
                TouchPhase::Ended => PointerPhase::Released,
                TouchPhase::Cancelled => PointerPhase::Cancelled,
            };
            Some(PointerEvent {
                pointer: PointerId::Touch(*id),
                phase,
                x,
                y,
            })
        }

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}
