/// Identifies the finger or mouse producing pointer events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerPhase {
    Pressed,
    Moved,
    Released,
    Cancelled,
}

/// Platform-agnostic pointer event in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

/// Recognizes taps: press and release of the same pointer without moving more
/// than `slop` logical pixels in between.
///
/// Only one pointer is tracked at a time; a second finger landing cancels the
/// pending tap.
#[derive(Debug, Clone)]
pub struct TapDetector {
    slop: f32,
    pending: Option<(PointerId, f32, f32)>,
}

impl Default for TapDetector {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl TapDetector {
    pub fn new(slop: f32) -> Self {
        Self { slop, pending: None }
    }

    /// Feeds one event; returns `true` when it completes a tap.
    pub fn feed(&mut self, ev: PointerEvent) -> bool {
        match ev.phase {
            PointerPhase::Pressed => {
                self.pending = match self.pending {
                    None => Some((ev.pointer, ev.x, ev.y)),
                    Some(_) => None,
                };
                false
            }
            PointerPhase::Moved => {
                if let Some((id, x0, y0)) = self.pending {
                    if id == ev.pointer && !self.within_slop(x0, y0, ev.x, ev.y) {
                        self.pending = None;
                    }
                }
                false
            }
            PointerPhase::Released => match self.pending {
                Some((id, x0, y0)) if id == ev.pointer => {
                    self.pending = None;
                    self.within_slop(x0, y0, ev.x, ev.y)
                }
                _ => false,
            },
            PointerPhase::Cancelled => {
                if self.pending.is_some_and(|(id, _, _)| id == ev.pointer) {
                    self.pending = None;
                }
                false
            }
        }
    }

    fn within_slop(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> bool {
        let (dx, dy) = (x1 - x0, y1 - y0);
        dx * dx + dy * dy <= self.slop * self.slop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(pointer: PointerId, phase: PointerPhase, x: f32, y: f32) -> PointerEvent {
        PointerEvent { pointer, phase, x, y }
    }

    #[test]
    fn click_is_a_tap() {
        let mut t = TapDetector::default();
        assert!(!t.feed(ev(PointerId::Mouse, PointerPhase::Pressed, 5.0, 5.0)));
        assert!(t.feed(ev(PointerId::Mouse, PointerPhase::Released, 7.0, 6.0)));
    }

    #[test]
    fn drag_is_not_a_tap() {
        let mut t = TapDetector::default();
        t.feed(ev(PointerId::Touch(1), PointerPhase::Pressed, 0.0, 0.0));
        t.feed(ev(PointerId::Touch(1), PointerPhase::Moved, 40.0, 0.0));
        assert!(!t.feed(ev(PointerId::Touch(1), PointerPhase::Released, 0.0, 0.0)));
    }

    #[test]
    fn second_finger_cancels() {
        let mut t = TapDetector::default();
        t.feed(ev(PointerId::Touch(1), PointerPhase::Pressed, 0.0, 0.0));
        t.feed(ev(PointerId::Touch(2), PointerPhase::Pressed, 50.0, 0.0));
        assert!(!t.feed(ev(PointerId::Touch(1), PointerPhase::Released, 0.0, 0.0)));
        assert!(!t.feed(ev(PointerId::Touch(2), PointerPhase::Released, 50.0, 0.0)));
    }

    #[test]
    fn cancelled_touch_is_not_a_tap() {
        let mut t = TapDetector::default();
        t.feed(ev(PointerId::Touch(3), PointerPhase::Pressed, 0.0, 0.0));
        t.feed(ev(PointerId::Touch(3), PointerPhase::Cancelled, 0.0, 0.0));
        assert!(!t.feed(ev(PointerId::Touch(3), PointerPhase::Released, 0.0, 0.0)));
    }
}
