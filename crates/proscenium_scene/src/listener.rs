//! Listener vocabulary: raw event listeners plus the input-method adapters.
//!
//! Listener lists tolerate add/remove from inside a callback: the stage
//! iterates a copy of the list taken when notification starts, so structural
//! mutation never corrupts a walk in progress.

use crate::error::SceneResult;
use crate::event::{Event, EventKind, InputEvent, Key, MouseButton};
use crate::geom::Vec2;
use crate::stage::Stage;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A listener attached to an actor's capture or normal list.
///
/// Returns true to claim the event; claiming is non-exclusive and sets the
/// event's handled flag. Errors are wrapped with the actor's identity by the
/// notifying stage before propagating.
pub trait EventListener {
    /// Reacts to an event reaching the actor this listener is attached to.
    fn handle(&mut self, stage: &mut Stage, event: &mut Event) -> SceneResult<bool>;
}

/// Adapts a closure to [`EventListener`].
pub struct FnListener<F>(pub F);

impl<F> EventListener for FnListener<F>
where
    F: FnMut(&mut Stage, &mut Event) -> SceneResult<bool>,
{
    fn handle(&mut self, stage: &mut Stage, event: &mut Event) -> SceneResult<bool> {
        (self.0)(stage, event)
    }
}

/// Input-method vocabulary with per-event hooks.
///
/// Pointer coordinates arrive in the notified actor's local space. Wrap an
/// implementor in [`InputAdapter`] (or use
/// [`Stage::add_input_listener`]) to attach it.
#[allow(unused_variables)]
pub trait InputHandler {
    /// A pointer went down. Return true to claim the touch.
    fn touch_down(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
        button: MouseButton,
    ) -> SceneResult<bool> {
        Ok(false)
    }

    /// A pointer went up.
    fn touch_up(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
        button: MouseButton,
    ) -> SceneResult<()> {
        Ok(())
    }

    /// A pointer moved while down.
    fn touch_dragged(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
    ) -> SceneResult<()> {
        Ok(())
    }

    /// The mouse moved with no button down.
    fn mouse_moved(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
    ) -> SceneResult<bool> {
        Ok(false)
    }

    /// The scroll wheel turned.
    fn scrolled(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        amount_x: f32,
        amount_y: f32,
    ) -> SceneResult<bool> {
        Ok(false)
    }

    /// A key went down.
    fn key_down(&mut self, stage: &mut Stage, event: &mut Event, key: Key) -> SceneResult<bool> {
        Ok(false)
    }

    /// A key went up.
    fn key_up(&mut self, stage: &mut Stage, event: &mut Event, key: Key) -> SceneResult<bool> {
        Ok(false)
    }

    /// A character was typed.
    fn key_typed(&mut self, stage: &mut Stage, event: &mut Event, ch: char) -> SceneResult<bool> {
        Ok(false)
    }
}

fn to_local(stage: &Stage, event: &Event, x: f32, y: f32) -> Vec2 {
    event
        .current()
        .map_or(Vec2::new(x, y), |id| stage.stage_to_local(id, Vec2::new(x, y)))
}

/// Adapts an [`InputHandler`] to [`EventListener`], converting pointer
/// coordinates from stage space to the notified actor's local space.
pub struct InputAdapter<H>(pub H);

impl<H: InputHandler> EventListener for InputAdapter<H> {
    fn handle(&mut self, stage: &mut Stage, event: &mut Event) -> SceneResult<bool> {
        let EventKind::Input(input) = event.kind() else {
            return Ok(false);
        };
        match input {
            InputEvent::TouchDown {
                x,
                y,
                pointer,
                button,
            } => {
                let p = to_local(stage, event, x, y);
                self.0.touch_down(stage, event, p.x, p.y, pointer, button)
            }
            InputEvent::TouchUp {
                x,
                y,
                pointer,
                button,
            } => {
                let p = to_local(stage, event, x, y);
                self.0.touch_up(stage, event, p.x, p.y, pointer, button)?;
                Ok(true)
            }
            InputEvent::TouchDragged { x, y, pointer } => {
                let p = to_local(stage, event, x, y);
                self.0.touch_dragged(stage, event, p.x, p.y, pointer)?;
                Ok(true)
            }
            InputEvent::MouseMoved { x, y } => {
                let p = to_local(stage, event, x, y);
                self.0.mouse_moved(stage, event, p.x, p.y)
            }
            InputEvent::Scrolled { amount_x, amount_y } => {
                self.0.scrolled(stage, event, amount_x, amount_y)
            }
            InputEvent::KeyDown { key } => self.0.key_down(stage, event, key),
            InputEvent::KeyUp { key } => self.0.key_up(stage, event, key),
            InputEvent::KeyTyped { ch } => self.0.key_typed(stage, event, ch),
        }
    }
}

/// Callback invoked when a click completes over the listening actor.
pub type ClickFn = Box<dyn FnMut(&mut Stage, &mut Event) -> SceneResult<()>>;

/// Detects press-then-release-over-the-actor clicks.
pub struct ClickListener {
    on_click: ClickFn,
    button: Option<MouseButton>,
    press_pointer: Option<u32>,
}

impl ClickListener {
    /// Creates a click listener reacting to any button.
    #[must_use]
    pub fn new(on_click: ClickFn) -> Self {
        Self {
            on_click,
            button: None,
            press_pointer: None,
        }
    }

    /// Restricts the listener to one button.
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    /// True while a press started on the actor is still down.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.press_pointer.is_some()
    }
}

impl InputHandler for ClickListener {
    fn touch_down(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        _x: f32,
        _y: f32,
        pointer: u32,
        button: MouseButton,
    ) -> SceneResult<bool> {
        if self.press_pointer.is_some() {
            return Ok(false);
        }
        if let Some(want) = self.button {
            if want != button {
                return Ok(false);
            }
        }
        self.press_pointer = Some(pointer);
        Ok(true)
    }

    fn touch_up(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<()> {
        if self.press_pointer != Some(pointer) {
            return Ok(());
        }
        self.press_pointer = None;
        let over = event
            .current()
            .and_then(|id| stage.actor(id).ok())
            .is_some_and(|a| a.bounds_contain(x, y));
        if over {
            (self.on_click)(stage, event)?;
        }
        Ok(())
    }
}

const VELOCITY_SAMPLES: usize = 8;

/// Tracks pointer velocity over recent samples, in units per second.
#[derive(Debug, Default)]
pub struct VelocityTracker {
    last: Vec2,
    last_time: f32,
    vel_x: [f32; VELOCITY_SAMPLES],
    vel_y: [f32; VELOCITY_SAMPLES],
    count: usize,
    index: usize,
}

impl VelocityTracker {
    /// Begins tracking from a point at the given time (seconds).
    pub fn start(&mut self, point: Vec2, time: f32) {
        self.last = point;
        self.last_time = time;
        self.count = 0;
        self.index = 0;
    }

    /// Records a movement sample.
    pub fn update(&mut self, point: Vec2, time: f32) {
        let dt = time - self.last_time;
        if dt > 0.0 {
            self.vel_x[self.index] = (point.x - self.last.x) / dt;
            self.vel_y[self.index] = (point.y - self.last.y) / dt;
            self.index = (self.index + 1) % VELOCITY_SAMPLES;
            self.count = (self.count + 1).min(VELOCITY_SAMPLES);
        }
        self.last = point;
        self.last_time = time;
    }

    /// Mean velocity over the recorded samples.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        if self.count == 0 {
            return Vec2::ZERO;
        }
        #[allow(clippy::cast_precision_loss)]
        let inv = 1.0 / self.count as f32;
        let vx: f32 = self.vel_x[..self.count].iter().sum();
        let vy: f32 = self.vel_y[..self.count].iter().sum();
        Vec2::new(vx * inv, vy * inv)
    }
}

/// Pan callback: local position and delta since the last drag.
pub type PanFn = Box<dyn FnMut(&mut Stage, &mut Event, Vec2, Vec2) -> SceneResult<()>>;
/// Fling callback: release velocity in local units per second.
pub type FlingFn = Box<dyn FnMut(&mut Stage, &mut Event, Vec2) -> SceneResult<()>>;

/// Detects pan drags and the fling velocity at release.
pub struct GestureListener {
    tracker: VelocityTracker,
    pan_pointer: Option<u32>,
    last: Vec2,
    on_pan: PanFn,
    on_fling: FlingFn,
}

impl GestureListener {
    /// Creates a gesture listener with pan and fling callbacks.
    #[must_use]
    pub fn new(on_pan: PanFn, on_fling: FlingFn) -> Self {
        Self {
            tracker: VelocityTracker::default(),
            pan_pointer: None,
            last: Vec2::ZERO,
            on_pan,
            on_fling,
        }
    }
}

impl InputHandler for GestureListener {
    fn touch_down(
        &mut self,
        stage: &mut Stage,
        _event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<bool> {
        if self.pan_pointer.is_some() {
            return Ok(false);
        }
        self.pan_pointer = Some(pointer);
        self.last = Vec2::new(x, y);
        self.tracker.start(self.last, stage.time());
        Ok(true)
    }

    fn touch_dragged(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
    ) -> SceneResult<()> {
        if self.pan_pointer != Some(pointer) {
            return Ok(());
        }
        let point = Vec2::new(x, y);
        let delta = Vec2::new(point.x - self.last.x, point.y - self.last.y);
        self.last = point;
        self.tracker.update(point, stage.time());
        (self.on_pan)(stage, event, point, delta)
    }

    fn touch_up(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<()> {
        if self.pan_pointer != Some(pointer) {
            return Ok(());
        }
        self.pan_pointer = None;
        self.tracker.update(Vec2::new(x, y), stage.time());
        let velocity = self.tracker.velocity();
        (self.on_fling)(stage, event, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_tracker_mean() {
        let mut tracker = VelocityTracker::default();
        tracker.start(Vec2::ZERO, 0.0);
        // 100 units over 0.1s, twice: 1000 units/sec.
        tracker.update(Vec2::new(100.0, 0.0), 0.1);
        tracker.update(Vec2::new(200.0, 0.0), 0.2);

        let v = tracker.velocity();
        assert!((v.x - 1000.0).abs() < 1.0);
        assert!(v.y.abs() < 1e-3);
    }

    #[test]
    fn test_velocity_tracker_ignores_zero_dt() {
        let mut tracker = VelocityTracker::default();
        tracker.start(Vec2::ZERO, 0.0);
        tracker.update(Vec2::new(50.0, 50.0), 0.0);
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }
}
