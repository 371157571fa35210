//! Two-pane divider.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, Color, Event, InputHandler, MouseButton, Rect, SceneResult, Stage, Vec2,
    Widget,
};

use crate::style::SplitPaneStyle;

/// Splits its bounds between two widgets with a draggable divider.
///
/// `split` in `[min, max] ⊆ [0, 1]` is the fraction given to the first
/// widget: the left pane horizontally, the top pane vertically (the amount
/// is measured from the top). At layout time the range is tightened so
/// neither pane shrinks below its own minimum size; if the tightened range
/// inverts (the minimums together exceed the available space) the divider
/// locks at the midpoint of the inverted range.
pub struct SplitPane {
    actor: ActorId,
    first: Option<ActorId>,
    second: Option<ActorId>,
    vertical: bool,
    style: SplitPaneStyle,
    split: f32,
    min: f32,
    max: f32,
    handle_bounds: Rect,
    first_bounds: Rect,
    second_bounds: Rect,
    dragging: bool,
    grab: f32,
}

impl SplitPane {
    /// Creates a split pane actor with its divider drag listener.
    pub fn create(
        stage: &mut Stage,
        first: Option<ActorId>,
        second: Option<ActorId>,
        vertical: bool,
        style: SplitPaneStyle,
    ) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let pane = Rc::new(RefCell::new(Self {
            actor,
            first: None,
            second: None,
            vertical,
            style,
            split: 0.5,
            min: 0.0,
            max: 1.0,
            handle_bounds: Rect::ZERO,
            first_bounds: Rect::ZERO,
            second_bounds: Rect::ZERO,
            dragging: false,
            grab: 0.0,
        }));
        stage.set_behavior(actor, pane.clone())?;
        stage.add_input_listener(actor, HandleDrag { pane: pane.clone() })?;
        {
            let mut p = pane.borrow_mut();
            p.set_first(stage, first)?;
            p.set_second(stage, second)?;
        }
        Ok((actor, pane))
    }

    /// The pane's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Sets the first (left/top) widget.
    pub fn set_first(&mut self, stage: &mut Stage, widget: Option<ActorId>) -> SceneResult<()> {
        if let Some(old) = self.first.take() {
            if stage.contains(old) {
                stage.remove_from_parent(old)?;
            }
        }
        if let Some(new) = widget {
            stage.add_child(self.actor, new)?;
        }
        self.first = widget;
        Ok(())
    }

    /// Sets the second (right/bottom) widget.
    pub fn set_second(&mut self, stage: &mut Stage, widget: Option<ActorId>) -> SceneResult<()> {
        if let Some(old) = self.second.take() {
            if stage.contains(old) {
                stage.remove_from_parent(old)?;
            }
        }
        if let Some(new) = widget {
            stage.add_child(self.actor, new)?;
        }
        self.second = widget;
        Ok(())
    }

    /// The current split fraction.
    #[must_use]
    pub const fn split_amount(&self) -> f32 {
        self.split
    }

    /// Sets the split fraction, clamped to the configured range.
    pub fn set_split_amount(&mut self, amount: f32) {
        self.split = amount.clamp(self.min, self.max);
    }

    /// Sets the configured split range; both ends are clamped to `[0, 1]`.
    pub fn set_split_range(&mut self, min: f32, max: f32) {
        self.min = min.clamp(0.0, 1.0);
        self.max = max.clamp(0.0, 1.0);
    }

    /// The divider bounds, as of the last layout.
    #[must_use]
    pub const fn handle_bounds(&self) -> Rect {
        self.handle_bounds
    }

    fn handle_size(&self) -> f32 {
        if self.vertical {
            self.style.handle.min_height
        } else {
            self.style.handle.min_width
        }
    }

    fn clamp_split(&mut self, stage: &mut Stage, width: f32, height: f32) -> SceneResult<()> {
        let mut effective_min = self.min;
        let mut effective_max = self.max;
        let available = if self.vertical {
            height - self.handle_size()
        } else {
            width - self.handle_size()
        };
        if available > 0.0 {
            if let Some(first) = self.first {
                let first_min = stage.min_size(first)?;
                let needed = if self.vertical { first_min.y } else { first_min.x };
                effective_min = effective_min.max((needed / available).min(1.0));
            }
            if let Some(second) = self.second {
                let second_min = stage.min_size(second)?;
                let needed = if self.vertical { second_min.y } else { second_min.x };
                effective_max = effective_max.min(1.0 - (needed / available).min(1.0));
            }
        }
        if effective_min > effective_max {
            // Overconstrained: lock at the midpoint of the inverted range.
            self.split = 0.5 * (effective_min + effective_max);
        } else {
            self.split = self.split.clamp(effective_min, effective_max);
        }
        Ok(())
    }

    fn drag_to(&mut self, stage: &mut Stage, x: f32, y: f32) -> SceneResult<()> {
        let (width, height) = {
            let actor = stage.actor(self.actor)?;
            (actor.width(), actor.height())
        };
        let handle = self.handle_size();
        if self.vertical {
            let track = height - handle;
            if track <= 0.0 {
                return Ok(());
            }
            let handle_y = (y - self.grab).clamp(0.0, track);
            // Measured from the top: a lower handle means a larger first pane.
            self.split = (1.0 - handle_y / track).clamp(self.min, self.max);
        } else {
            let track = width - handle;
            if track <= 0.0 {
                return Ok(());
            }
            let handle_x = (x - self.grab).clamp(0.0, track);
            self.split = (handle_x / track).clamp(self.min, self.max);
        }
        stage.invalidate(self.actor)?;
        Ok(())
    }
}

impl Widget for SplitPane {
    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        let (width, height) = {
            let actor = stage.actor(id)?;
            (actor.width(), actor.height())
        };
        self.clamp_split(stage, width, height)?;
        let handle = self.handle_size();

        if self.vertical {
            let available = (height - handle).max(0.0);
            let first_h = available * self.split;
            let second_h = available - first_h;
            self.first_bounds = Rect::new(0.0, height - first_h, width, first_h);
            self.handle_bounds = Rect::new(0.0, second_h, width, handle);
            self.second_bounds = Rect::new(0.0, 0.0, width, second_h);
        } else {
            let available = (width - handle).max(0.0);
            let first_w = available * self.split;
            let second_w = available - first_w;
            self.first_bounds = Rect::new(0.0, 0.0, first_w, height);
            self.handle_bounds = Rect::new(first_w, 0.0, handle, height);
            self.second_bounds = Rect::new(first_w + handle, 0.0, second_w, height);
        }

        if let Some(first) = self.first {
            let b = self.first_bounds;
            stage.actor_mut(first)?.set_bounds(b.x, b.y, b.width, b.height);
            stage.validate(first)?;
        }
        if let Some(second) = self.second {
            let b = self.second_bounds;
            stage.actor_mut(second)?.set_bounds(b.x, b.y, b.width, b.height);
            stage.validate(second)?;
        }
        Ok(())
    }

    fn pref_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let first = match self.first {
            Some(f) => stage.pref_size(f)?,
            None => Vec2::ZERO,
        };
        let second = match self.second {
            Some(s) => stage.pref_size(s)?,
            None => Vec2::ZERO,
        };
        let handle = self.handle_size();
        Ok(if self.vertical {
            Vec2::new(first.x.max(second.x), first.y + second.y + handle)
        } else {
            Vec2::new(first.x + second.x + handle, first.y.max(second.y))
        })
    }

    fn min_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let first = match self.first {
            Some(f) => stage.min_size(f)?,
            None => Vec2::ZERO,
        };
        let second = match self.second {
            Some(s) => stage.min_size(s)?,
            None => Vec2::ZERO,
        };
        let handle = self.handle_size();
        Ok(if self.vertical {
            Vec2::new(first.x.max(second.x), first.y + second.y + handle)
        } else {
            Vec2::new(first.x + second.x + handle, first.y.max(second.y))
        })
    }

    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        stage.draw_children(id, batch, parent_alpha)?;
        let tint = {
            let c = stage.actor(id)?.color();
            Color::rgba(c.r, c.g, c.b, parent_alpha)
        };
        self.style.handle.draw(batch, self.handle_bounds, tint);
        Ok(())
    }
}

struct HandleDrag {
    pane: Rc<RefCell<SplitPane>>,
}

impl InputHandler for HandleDrag {
    fn touch_down(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        x: f32,
        y: f32,
        _pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<bool> {
        let Ok(mut pane) = self.pane.try_borrow_mut() else {
            return Ok(false);
        };
        if pane.handle_bounds.contains(x, y) {
            pane.dragging = true;
            pane.grab = if pane.vertical {
                y - pane.handle_bounds.y
            } else {
                x - pane.handle_bounds.x
            };
            return Ok(true);
        }
        Ok(false)
    }

    fn touch_dragged(
        &mut self,
        stage: &mut Stage,
        _event: &mut Event,
        x: f32,
        y: f32,
        _pointer: u32,
    ) -> SceneResult<()> {
        let Ok(mut pane) = self.pane.try_borrow_mut() else {
            return Ok(());
        };
        if pane.dragging {
            pane.drag_to(stage, x, y)?;
        }
        Ok(())
    }

    fn touch_up(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        _x: f32,
        _y: f32,
        _pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<()> {
        if let Ok(mut pane) = self.pane.try_borrow_mut() {
            pane.dragging = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinSized(Vec2);
    impl Widget for MinSized {
        fn pref_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
            Ok(self.0)
        }
        fn min_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
            Ok(self.0)
        }
    }

    fn min_widget(stage: &mut Stage, w: f32, h: f32) -> ActorId {
        let id = stage.new_actor();
        stage
            .set_behavior(id, Rc::new(RefCell::new(MinSized(Vec2::new(w, h)))))
            .unwrap();
        id
    }

    #[test]
    fn test_overconstrained_locks_at_midpoint() {
        let mut stage = Stage::new(400.0, 400.0);
        let first = min_widget(&mut stage, 10.0, 40.0);
        let second = min_widget(&mut stage, 10.0, 40.0);
        let (id, pane) =
            SplitPane::create(&mut stage, Some(first), Some(second), true, SplitPaneStyle::default())
                .unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        // Handle min height 10, total height 60: available 50 < 40 + 40.
        stage.actor_mut(id).unwrap().set_bounds(0.0, 0.0, 100.0, 60.0);
        pane.borrow_mut().set_split_amount(0.9);
        stage.validate(id).unwrap();

        let p = pane.borrow();
        // effective_min = 40/50 = 0.8, effective_max = 1 - 40/50 = 0.2.
        assert!((p.split_amount() - 0.5).abs() < 1e-6, "midpoint of the inverted range");
    }

    #[test]
    fn test_minimums_tighten_range() {
        let mut stage = Stage::new(400.0, 400.0);
        let first = min_widget(&mut stage, 30.0, 10.0);
        let second = min_widget(&mut stage, 20.0, 10.0);
        let (id, pane) = SplitPane::create(
            &mut stage,
            Some(first),
            Some(second),
            false,
            SplitPaneStyle::default(),
        )
        .unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        // Available = 100 - 10 = 90. effective range [30/90, 1 - 20/90].
        stage.actor_mut(id).unwrap().set_bounds(0.0, 0.0, 100.0, 50.0);

        pane.borrow_mut().set_split_amount(0.0);
        stage.validate(id).unwrap();
        assert!((pane.borrow().split_amount() - 30.0 / 90.0).abs() < 1e-5);

        pane.borrow_mut().set_split_amount(1.0);
        stage.invalidate(id).unwrap();
        stage.validate(id).unwrap();
        assert!((pane.borrow().split_amount() - (1.0 - 20.0 / 90.0)).abs() < 1e-5);

        // A pane is never shrunk below its minimum.
        let first_w = stage.actor(first).unwrap().width();
        assert!(first_w >= 30.0 - 1e-3);
    }

    #[test]
    fn test_horizontal_drag_moves_divider() {
        let mut stage = Stage::new(400.0, 400.0);
        let first = min_widget(&mut stage, 0.0, 0.0);
        let second = min_widget(&mut stage, 0.0, 0.0);
        let (id, pane) = SplitPane::create(
            &mut stage,
            Some(first),
            Some(second),
            false,
            SplitPaneStyle::default(),
        )
        .unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        stage.actor_mut(id).unwrap().set_bounds(0.0, 0.0, 100.0, 50.0);
        stage.validate(id).unwrap();

        let handle = pane.borrow().handle_bounds();
        assert_eq!(handle.x, 45.0, "split 0.5 over a 90-unit track");

        let to_screen = |p: Vec2| Vec2::new(p.x, 400.0 - p.y);
        let press = Vec2::new(handle.x + 5.0, 25.0);
        stage.touch_down(to_screen(press), 0, MouseButton::Left).unwrap();
        assert!(pane.borrow().dragging);

        // Drag 27 units right: the handle origin lands at 72 of a 90 track.
        stage
            .touch_dragged(to_screen(Vec2::new(press.x + 27.0, 25.0)), 0)
            .unwrap();
        stage.touch_up(to_screen(Vec2::new(press.x + 27.0, 25.0)), 0, MouseButton::Left).unwrap();
        assert!((pane.borrow().split_amount() - 0.8).abs() < 1e-5);

        stage.validate(id).unwrap();
        let first_actor = stage.actor(first).unwrap();
        assert!((first_actor.width() - 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_vertical_drag_inverts_sense() {
        let mut stage = Stage::new(400.0, 400.0);
        let first = min_widget(&mut stage, 0.0, 0.0);
        let second = min_widget(&mut stage, 0.0, 0.0);
        let (id, pane) = SplitPane::create(
            &mut stage,
            Some(first),
            Some(second),
            true,
            SplitPaneStyle::default(),
        )
        .unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        stage.actor_mut(id).unwrap().set_bounds(0.0, 0.0, 50.0, 100.0);
        stage.validate(id).unwrap();

        let handle = pane.borrow().handle_bounds();
        let to_screen = |p: Vec2| Vec2::new(p.x, 400.0 - p.y);
        let press = Vec2::new(25.0, handle.y + 5.0);
        stage.touch_down(to_screen(press), 0, MouseButton::Left).unwrap();

        // Dragging the handle down grows the first (top) pane.
        stage
            .touch_dragged(to_screen(Vec2::new(25.0, press.y - 20.0)), 0)
            .unwrap();
        assert!(pane.borrow().split_amount() > 0.5);
    }

    #[test]
    fn test_pref_size_sums_main_axis() {
        let mut stage = Stage::new(400.0, 400.0);
        let first = min_widget(&mut stage, 30.0, 15.0);
        let second = min_widget(&mut stage, 50.0, 25.0);
        let (id, _pane) = SplitPane::create(
            &mut stage,
            Some(first),
            Some(second),
            false,
            SplitPaneStyle::default(),
        )
        .unwrap();
        let pref = stage.pref_size(id).unwrap();
        assert_eq!(pref, Vec2::new(30.0 + 50.0 + 10.0, 25.0));
    }
}
