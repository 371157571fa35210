//! Events fired through the actor hierarchy.
//!
//! An [`Event`] travels in two phases: capture (root down to the target) and
//! bubble (target up to the root). Stopping halts further propagation in both
//! phases; cancelling is an independent signal returned to the firing caller.

#![allow(missing_docs)] // key variants are self-describing

use crate::actor::ActorId;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    Shift,
    Control,
    Alt,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// Device-level input payload. Coordinates are stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A pointer went down.
    TouchDown {
        x: f32,
        y: f32,
        pointer: u32,
        button: MouseButton,
    },
    /// A pointer went up.
    TouchUp {
        x: f32,
        y: f32,
        pointer: u32,
        button: MouseButton,
    },
    /// A pointer moved while down.
    TouchDragged { x: f32, y: f32, pointer: u32 },
    /// The mouse moved with no button down.
    MouseMoved { x: f32, y: f32 },
    /// The scroll wheel turned.
    Scrolled { amount_x: f32, amount_y: f32 },
    /// A key went down.
    KeyDown { key: Key },
    /// A key went up.
    KeyUp { key: Key },
    /// A character was typed.
    KeyTyped { ch: char },
}

impl InputEvent {
    /// Returns the stage-coordinate location, if the event has one.
    #[must_use]
    pub const fn location(&self) -> Option<(f32, f32)> {
        match *self {
            Self::TouchDown { x, y, .. }
            | Self::TouchUp { x, y, .. }
            | Self::TouchDragged { x, y, .. }
            | Self::MouseMoved { x, y } => Some((x, y)),
            _ => None,
        }
    }
}

/// What an event carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// Device input routed through hit testing and focus.
    Input(InputEvent),
    /// A widget's value changed (selection, check state, scroll target).
    Change,
}

/// An event travelling through the hierarchy.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: Option<ActorId>,
    current: Option<ActorId>,
    bubbles: bool,
    capture: bool,
    handled: bool,
    stopped: bool,
    cancelled: bool,
}

impl Event {
    /// Creates a new event. `bubbles` defaults to true.
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            current: None,
            bubbles: true,
            capture: false,
            handled: false,
            stopped: false,
            cancelled: false,
        }
    }

    /// Creates an input event.
    #[must_use]
    pub const fn input(input: InputEvent) -> Self {
        Self::new(EventKind::Input(input))
    }

    /// Creates a change notification event.
    #[must_use]
    pub const fn change() -> Self {
        Self::new(EventKind::Change)
    }

    /// Returns the payload.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// The actor the event was fired on. Set once by the firing stage.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub(crate) fn set_target(&mut self, target: ActorId) {
        self.target = Some(target);
    }

    /// The actor currently being notified; changes as propagation proceeds.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<ActorId> {
        self.current
    }

    pub(crate) fn set_current(&mut self, current: ActorId) {
        self.current = Some(current);
    }

    /// True while the capture phase is active.
    #[inline]
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.capture
    }

    pub(crate) fn set_capture(&mut self, capture: bool) {
        self.capture = capture;
    }

    /// Whether the event ascends past the target after the capture phase.
    #[inline]
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Disables (or re-enables) the bubble phase.
    pub fn set_bubbles(&mut self, bubbles: bool) {
        self.bubbles = bubbles;
    }

    /// Halts propagation: no further actor in the current walk is notified.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// True once a listener stopped propagation.
    #[inline]
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Sets the cancelled signal. Does not by itself stop propagation.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// The cancelled signal; returned by the firing call.
    #[inline]
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Marks the event as claimed by a listener. Non-exclusive.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// True once any listener claimed the event.
    #[inline]
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        self.handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_and_cancel_are_independent() {
        let mut e = Event::change();
        e.cancel();
        assert!(e.is_cancelled());
        assert!(!e.is_stopped());

        e.stop();
        assert!(e.is_stopped());
        assert!(e.is_cancelled());
    }

    #[test]
    fn test_defaults() {
        let e = Event::input(InputEvent::MouseMoved { x: 1.0, y: 2.0 });
        assert!(e.bubbles());
        assert!(!e.is_handled());
        assert!(e.target().is_none());
    }

    #[test]
    fn test_location() {
        let e = InputEvent::TouchDown {
            x: 3.0,
            y: 4.0,
            pointer: 0,
            button: MouseButton::Left,
        };
        assert_eq!(e.location(), Some((3.0, 4.0)));
        assert_eq!(InputEvent::KeyDown { key: Key::A }.location(), None);
    }
}
