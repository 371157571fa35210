//! Checkable button and the group exclusivity policy.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use proscenium_scene::{
    ActorId, Batch, Color, Event, InputHandler, MouseButton, Rect, SceneResult, Stage, Vec2,
    Widget,
};

use crate::drawable::Drawable;
use crate::style::ButtonStyle;

/// Picks a button background by explicit state.
#[must_use]
pub fn button_background(style: &ButtonStyle, pressed: bool, checked: bool) -> Option<&Drawable> {
    if pressed {
        style.down.as_ref().or(style.up.as_ref())
    } else if checked {
        style.checked.as_ref().or(style.up.as_ref())
    } else {
        style.up.as_ref()
    }
}

/// A checkable button. Clicking toggles the check state, subject to the
/// owning [`ButtonGroup`]'s policy.
pub struct Button {
    actor: ActorId,
    style: ButtonStyle,
    checked: bool,
    pressed: bool,
    group: Option<Weak<RefCell<ButtonGroup>>>,
}

impl Button {
    /// Creates a button actor with press/click handling.
    pub fn create(stage: &mut Stage, style: ButtonStyle) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let button = Rc::new(RefCell::new(Self {
            actor,
            style,
            checked: false,
            pressed: false,
            group: None,
        }));
        stage.set_behavior(actor, button.clone())?;
        stage.add_input_listener(actor, ButtonInput { button: button.clone() })?;
        Ok((actor, button))
    }

    /// The button's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// The check state.
    #[must_use]
    pub const fn is_checked(&self) -> bool {
        self.checked
    }

    /// True while a press is in progress over the button.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Sets the check state, consulting the group policy first.
    ///
    /// Returns whether this button changed, plus every actor whose state
    /// changed (the group may have unchecked another button). No events are
    /// fired; interaction paths fire a Change for each returned actor.
    pub fn set_checked(&mut self, checked: bool) -> (bool, Vec<ActorId>) {
        if self.checked == checked {
            return (false, Vec::new());
        }
        let mut changed = Vec::new();
        if let Some(group) = self.group.as_ref().and_then(Weak::upgrade) {
            let allowed = match group.try_borrow_mut() {
                Ok(mut group) => group.can_check(self.actor, self.checked, checked, &mut changed),
                Err(_) => false,
            };
            if !allowed {
                return (false, changed);
            }
        }
        self.checked = checked;
        changed.push(self.actor);
        (true, changed)
    }
}

impl Widget for Button {
    fn pref_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let bg = button_background(&self.style, false, false);
        Ok(bg.map_or(Vec2::ZERO, |d| Vec2::new(d.min_width, d.min_height)))
    }

    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        let (bounds, tint) = {
            let actor = stage.actor(id)?;
            let c = actor.color();
            (
                Rect::new(0.0, 0.0, actor.width(), actor.height()),
                Color::rgba(c.r, c.g, c.b, parent_alpha),
            )
        };
        if let Some(bg) = button_background(&self.style, self.pressed, self.checked) {
            bg.draw(batch, bounds, tint);
        }
        stage.draw_children(id, batch, parent_alpha)
    }
}

struct ButtonInput {
    button: Rc<RefCell<Button>>,
}

impl InputHandler for ButtonInput {
    fn touch_down(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        _x: f32,
        _y: f32,
        _pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<bool> {
        let Ok(mut button) = self.button.try_borrow_mut() else {
            return Ok(false);
        };
        button.pressed = true;
        Ok(true)
    }

    fn touch_up(
        &mut self,
        stage: &mut Stage,
        event: &mut Event,
        x: f32,
        y: f32,
        _pointer: u32,
        _button: MouseButton,
    ) -> SceneResult<()> {
        // Toggle inside the borrow, fire after releasing it.
        let changed = {
            let Ok(mut button) = self.button.try_borrow_mut() else {
                return Ok(());
            };
            if !button.pressed {
                return Ok(());
            }
            button.pressed = false;
            let over = event
                .current()
                .and_then(|id| stage.actor(id).ok())
                .is_some_and(|a| a.bounds_contain(x, y));
            if !over {
                return Ok(());
            }
            let target = !button.checked;
            button.set_checked(target).1
        };
        for id in changed {
            let mut change = Event::change();
            stage.fire(id, &mut change)?;
        }
        Ok(())
    }
}

/// Enforces min/max checked counts across a set of buttons.
///
/// [`ButtonGroup::can_check`] is the single authority consulted before any
/// check-state toggle takes effect.
pub struct ButtonGroup {
    buttons: Vec<Rc<RefCell<Button>>>,
    min_checked: usize,
    max_checked: usize,
    uncheck_last: bool,
    last_checked: Option<Weak<RefCell<Button>>>,
}

impl ButtonGroup {
    /// Creates a group with the radio-button policy: exactly one checked,
    /// overflow unchecks the most recently checked.
    #[must_use]
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            buttons: Vec::new(),
            min_checked: 1,
            max_checked: 1,
            uncheck_last: true,
            last_checked: None,
        }))
    }

    /// Minimum buttons that must stay checked.
    pub fn set_min_check_count(&mut self, min: usize) {
        self.min_checked = min;
    }

    /// Maximum buttons that may be checked (0 = unlimited).
    pub fn set_max_check_count(&mut self, max: usize) {
        self.max_checked = max;
    }

    /// On overflow, uncheck the most recently checked button instead of
    /// rejecting the new check.
    pub fn set_uncheck_last(&mut self, uncheck_last: bool) {
        self.uncheck_last = uncheck_last;
    }

    /// Adds a button to the group. If the group is under its minimum checked
    /// count, the new button is checked immediately.
    pub fn add(group: &Rc<RefCell<Self>>, button: &Rc<RefCell<Button>>) {
        button.borrow_mut().group = Some(Rc::downgrade(group));
        let mut g = group.borrow_mut();
        g.buttons.push(button.clone());
        if g.checked_actors().len() < g.min_checked {
            button.borrow_mut().checked = true;
            g.last_checked = Some(Rc::downgrade(button));
        }
    }

    /// The actors of the currently checked buttons, in add order.
    #[must_use]
    pub fn checked_actors(&self) -> Vec<ActorId> {
        self.buttons
            .iter()
            .filter_map(|b| b.try_borrow().ok())
            .filter(|b| b.checked)
            .map(|b| b.actor)
            .collect()
    }

    fn checked_count(&self, caller: ActorId, caller_checked: bool) -> usize {
        let mut count = usize::from(caller_checked);
        for button in &self.buttons {
            if let Ok(button) = button.try_borrow() {
                if button.actor != caller && button.checked {
                    count += 1;
                }
            }
        }
        count
    }

    /// Decides whether `caller` may change its check state to `new_checked`.
    ///
    /// May uncheck the most recently checked button to make room (the
    /// uncheck-last policy); any such side change is appended to `changed`.
    pub fn can_check(
        &mut self,
        caller: ActorId,
        caller_checked: bool,
        new_checked: bool,
        changed: &mut Vec<ActorId>,
    ) -> bool {
        if caller_checked == new_checked {
            return true;
        }
        let count = self.checked_count(caller, caller_checked);
        if !new_checked {
            // Unchecking may not drop the group below its minimum.
            return count > self.min_checked;
        }
        if self.max_checked > 0 && count + 1 > self.max_checked {
            if !self.uncheck_last {
                return false;
            }
            if let Some(target) = self.overflow_target(caller) {
                if let Ok(mut button) = target.try_borrow_mut() {
                    button.checked = false;
                    changed.push(button.actor);
                }
            } else {
                return false;
            }
        }
        self.last_checked = self
            .buttons
            .iter()
            .find(|b| b.try_borrow().is_ok_and(|b| b.actor == caller))
            .map(Rc::downgrade);
        true
    }

    /// The button to uncheck on overflow: the last-checked one if it still
    /// exists and is checked, else any other checked button.
    fn overflow_target(&self, caller: ActorId) -> Option<Rc<RefCell<Button>>> {
        if let Some(last) = self.last_checked.as_ref().and_then(Weak::upgrade) {
            let usable = last
                .try_borrow()
                .is_ok_and(|b| b.checked && b.actor != caller);
            if usable {
                return Some(last);
            }
        }
        self.buttons
            .iter()
            .find(|b| b.try_borrow().is_ok_and(|b| b.checked && b.actor != caller))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_buttons(
        stage: &mut Stage,
    ) -> (Rc<RefCell<ButtonGroup>>, Vec<(ActorId, Rc<RefCell<Button>>)>) {
        let group = ButtonGroup::new();
        let mut buttons = Vec::new();
        let root = stage.root();
        for i in 0..3 {
            let (id, button) = Button::create(stage, ButtonStyle::default()).unwrap();
            stage.add_child(root, id).unwrap();
            #[allow(clippy::cast_precision_loss)]
            stage
                .actor_mut(id)
                .unwrap()
                .set_bounds(i as f32 * 30.0, 0.0, 20.0, 20.0);
            ButtonGroup::add(&group, &button);
            buttons.push((id, button));
        }
        (group, buttons)
    }

    #[test]
    fn test_radio_exclusivity() {
        let mut stage = Stage::new(400.0, 400.0);
        let (group, buttons) = three_buttons(&mut stage);
        let (a_id, a) = &buttons[0];
        let (b_id, b) = &buttons[1];

        // Adding under the minimum auto-checked the first button.
        assert_eq!(group.borrow().checked_actors(), vec![*a_id]);

        let (toggled, changed) = b.borrow_mut().set_checked(true);
        assert!(toggled);
        assert_eq!(changed, vec![*a_id, *b_id], "A unchecked, then B checked");
        assert!(!a.borrow().is_checked());
        assert!(b.borrow().is_checked());
        assert_eq!(group.borrow().checked_actors(), vec![*b_id]);
    }

    #[test]
    fn test_unchecking_sole_button_rejected() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_group, buttons) = three_buttons(&mut stage);
        let (_a_id, a) = &buttons[0];

        let (toggled, changed) = a.borrow_mut().set_checked(false);
        assert!(!toggled, "can_check refused the uncheck");
        assert!(changed.is_empty());
        assert!(a.borrow().is_checked(), "still checked");
    }

    #[test]
    fn test_reject_policy_refuses_overflow() {
        let mut stage = Stage::new(400.0, 400.0);
        let (group, buttons) = three_buttons(&mut stage);
        group.borrow_mut().set_uncheck_last(false);

        let (_b_id, b) = &buttons[1];
        let (toggled, changed) = b.borrow_mut().set_checked(true);
        assert!(!toggled, "overflow rejected instead of unchecking");
        assert!(changed.is_empty());
        assert!(!b.borrow().is_checked());
        assert!(buttons[0].1.borrow().is_checked());
    }

    #[test]
    fn test_overflow_unchecks_most_recently_checked() {
        let mut stage = Stage::new(400.0, 400.0);
        let (group, buttons) = three_buttons(&mut stage);
        group.borrow_mut().set_max_check_count(2);
        group.borrow_mut().set_min_check_count(0);

        buttons[1].1.borrow_mut().set_checked(true); // checked: a, b (b last)
        let (toggled, changed) = buttons[2].1.borrow_mut().set_checked(true);
        assert!(toggled);
        assert_eq!(
            changed,
            vec![buttons[1].0, buttons[2].0],
            "the most recently checked button made room"
        );
        assert!(buttons[0].1.borrow().is_checked());
        assert!(!buttons[1].1.borrow().is_checked());
        assert!(buttons[2].1.borrow().is_checked());
    }

    #[test]
    fn test_click_toggles_and_fires_changes() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_group, buttons) = three_buttons(&mut stage);
        let changes: Rc<RefCell<Vec<ActorId>>> = Rc::default();
        for (id, _) in &buttons {
            let changes = changes.clone();
            stage
                .add_listener(
                    *id,
                    proscenium_scene::FnListener(move |_: &mut Stage, event: &mut Event| {
                        if let Some(target) = event.target() {
                            changes.borrow_mut().push(target);
                        }
                        Ok(false)
                    }),
                )
                .unwrap();
        }

        // Click button B (center at stage (40, 10) → screen (40, 390)).
        let screen = Vec2::new(40.0, 390.0);
        stage.touch_down(screen, 0, MouseButton::Left).unwrap();
        stage.touch_up(screen, 0, MouseButton::Left).unwrap();

        assert!(buttons[1].1.borrow().is_checked());
        assert!(!buttons[0].1.borrow().is_checked());
        assert_eq!(
            *changes.borrow(),
            vec![buttons[0].0, buttons[1].0],
            "both affected buttons fired a change"
        );
    }

    #[test]
    fn test_background_by_state() {
        let style = ButtonStyle::default();
        assert_eq!(button_background(&style, true, false), style.down.as_ref());
        assert_eq!(button_background(&style, false, true), style.checked.as_ref());
        assert_eq!(button_background(&style, false, false), style.up.as_ref());
    }
}
