//! Scroll pane: viewport, scrollbars, fling/overscroll state machine.
//!
//! Scroll amounts are logical offsets in `[0, max_scroll]` (or the
//! overscroll-extended range while panning/flinging); `amount_y` measures
//! from the top of the content. The visual amounts are the smoothed offsets
//! actually used to place the child and the knobs.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, Color, Event, GestureListener, InputHandler, MouseButton, Rect, SceneResult,
    Stage, Touchable, Vec2, Widget,
};

use crate::config::ScrollTuning;
use crate::style::ScrollPaneStyle;

/// Scrolls a single child widget inside a clipped viewport.
pub struct ScrollPane {
    actor: ActorId,
    child: Option<ActorId>,
    style: ScrollPaneStyle,
    tuning: ScrollTuning,

    amount_x: f32,
    amount_y: f32,
    visual_x: f32,
    visual_y: f32,
    max_x: f32,
    max_y: f32,
    velocity_x: f32,
    velocity_y: f32,
    fling_timer: f32,

    force_x: bool,
    force_y: bool,
    disable_x: bool,
    disable_y: bool,
    overscroll_x: bool,
    overscroll_y: bool,
    smooth_scrolling: bool,
    variable_knobs: bool,
    fade_scrollbars: bool,
    scrollbars_on_top: bool,
    touch_scroll: bool,
    scrollbar_touch: bool,

    scroll_x_on: bool,
    scroll_y_on: bool,
    widget_area: Rect,
    h_scroll_bounds: Rect,
    v_scroll_bounds: Rect,
    h_knob_bounds: Rect,
    v_knob_bounds: Rect,

    dragging_h: bool,
    dragging_v: bool,
    knob_grab: f32,
    panning: bool,
    fade_alpha: f32,
    fade_delay: f32,
}

impl ScrollPane {
    /// Creates a scroll pane actor around an optional child, wiring the knob,
    /// pan, and wheel listeners.
    pub fn create(
        stage: &mut Stage,
        child: Option<ActorId>,
        style: ScrollPaneStyle,
        tuning: ScrollTuning,
    ) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let fade_alpha = tuning.fade_alpha_seconds;
        let fade_delay = tuning.fade_delay_seconds;
        let pane = Rc::new(RefCell::new(Self {
            actor,
            child: None,
            style,
            tuning,
            amount_x: 0.0,
            amount_y: 0.0,
            visual_x: 0.0,
            visual_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            fling_timer: 0.0,
            force_x: false,
            force_y: false,
            disable_x: false,
            disable_y: false,
            overscroll_x: true,
            overscroll_y: true,
            smooth_scrolling: true,
            variable_knobs: true,
            fade_scrollbars: true,
            scrollbars_on_top: false,
            touch_scroll: true,
            scrollbar_touch: true,
            scroll_x_on: false,
            scroll_y_on: false,
            widget_area: Rect::ZERO,
            h_scroll_bounds: Rect::ZERO,
            v_scroll_bounds: Rect::ZERO,
            h_knob_bounds: Rect::ZERO,
            v_knob_bounds: Rect::ZERO,
            dragging_h: false,
            dragging_v: false,
            knob_grab: 0.0,
            panning: false,
            fade_alpha,
            fade_delay,
        }));
        stage.set_behavior(actor, pane.clone())?;
        stage.add_input_listener(actor, ScrollInput { pane: pane.clone() })?;

        let pan_pane = pane.clone();
        let fling_pane = pane.clone();
        stage.add_input_listener(
            actor,
            GestureListener::new(
                Box::new(move |_stage: &mut Stage, _event: &mut Event, _pos, delta| {
                    if let Ok(mut pane) = pan_pane.try_borrow_mut() {
                        pane.pan(delta);
                    }
                    Ok(())
                }),
                Box::new(move |_stage: &mut Stage, _event: &mut Event, velocity| {
                    if let Ok(mut pane) = fling_pane.try_borrow_mut() {
                        pane.finish_pan(velocity);
                    }
                    Ok(())
                }),
            ),
        )?;

        if let Some(child_id) = child {
            stage.add_child(actor, child_id)?;
            pane.borrow_mut().child = Some(child_id);
        }
        Ok((actor, pane))
    }

    /// The pane's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Replaces the scrolled child.
    pub fn set_child(&mut self, stage: &mut Stage, child: Option<ActorId>) -> SceneResult<()> {
        if let Some(old) = self.child.take() {
            if stage.contains(old) {
                stage.remove_from_parent(old)?;
            }
        }
        if let Some(new) = child {
            stage.add_child(self.actor, new)?;
        }
        self.child = child;
        Ok(())
    }

    /// Forces a scrollbar on per axis regardless of content overflow.
    pub fn set_force_scroll(&mut self, x: bool, y: bool) {
        self.force_x = x;
        self.force_y = y;
    }

    /// Disables scrolling per axis.
    pub fn set_scroll_disabled(&mut self, x: bool, y: bool) {
        self.disable_x = x;
        self.disable_y = y;
    }

    /// Enables overscroll per axis.
    pub fn set_overscroll(&mut self, x: bool, y: bool) {
        self.overscroll_x = x;
        self.overscroll_y = y;
    }

    /// Enables the eased visual catch-up; when off, the visual amount snaps.
    pub fn set_smooth_scrolling(&mut self, smooth: bool) {
        self.smooth_scrolling = smooth;
    }

    /// Toggles proportional knob sizing vs the drawable's minimum size.
    pub fn set_variable_knobs(&mut self, variable: bool) {
        self.variable_knobs = variable;
    }

    /// Toggles auto-hiding scrollbars. Faded scrollbars overlay the viewport
    /// instead of shrinking it.
    pub fn set_fade_scrollbars(&mut self, fade: bool) {
        if self.fade_scrollbars == fade {
            return;
        }
        self.fade_scrollbars = fade;
        self.reset_fade();
    }

    /// Draws scrollbars over the viewport without shrinking it.
    pub fn set_scrollbars_on_top(&mut self, on_top: bool) {
        self.scrollbars_on_top = on_top;
    }

    /// Enables pan/fling touch scrolling.
    pub fn set_touch_scroll(&mut self, enabled: bool) {
        self.touch_scroll = enabled;
    }

    /// Enables touch interaction with the scrollbars themselves.
    pub fn set_scrollbar_touch(&mut self, enabled: bool) {
        self.scrollbar_touch = enabled;
    }

    /// The logical horizontal offset.
    #[must_use]
    pub const fn scroll_x(&self) -> f32 {
        self.amount_x
    }

    /// The logical vertical offset (measured from the top).
    #[must_use]
    pub const fn scroll_y(&self) -> f32 {
        self.amount_y
    }

    /// The smoothed horizontal offset used for placement.
    #[must_use]
    pub const fn visual_scroll_x(&self) -> f32 {
        self.visual_x
    }

    /// The smoothed vertical offset used for placement.
    #[must_use]
    pub const fn visual_scroll_y(&self) -> f32 {
        self.visual_y
    }

    /// Content width minus viewport width, never negative.
    #[must_use]
    pub const fn max_scroll_x(&self) -> f32 {
        self.max_x
    }

    /// Content height minus viewport height, never negative.
    #[must_use]
    pub const fn max_scroll_y(&self) -> f32 {
        self.max_y
    }

    /// True while the horizontal scrollbar is active.
    #[must_use]
    pub const fn is_scroll_x(&self) -> bool {
        self.scroll_x_on
    }

    /// True while the vertical scrollbar is active.
    #[must_use]
    pub const fn is_scroll_y(&self) -> bool {
        self.scroll_y_on
    }

    /// True while a pan drag is in progress.
    #[must_use]
    pub const fn is_panning(&self) -> bool {
        self.panning
    }

    /// The viewport rect in local coordinates, as of the last layout.
    #[must_use]
    pub const fn widget_area(&self) -> Rect {
        self.widget_area
    }

    /// Current scrollbar alpha in 0..=1.
    #[must_use]
    pub fn scrollbar_alpha(&self) -> f32 {
        if self.fade_scrollbars {
            self.fade_alpha / self.tuning.fade_alpha_seconds
        } else {
            1.0
        }
    }

    fn scroll_bounds_x(&self) -> (f32, f32) {
        if self.overscroll_x && self.scroll_x_on {
            (
                -self.tuning.overscroll_distance,
                self.max_x + self.tuning.overscroll_distance,
            )
        } else {
            (0.0, self.max_x)
        }
    }

    fn scroll_bounds_y(&self) -> (f32, f32) {
        if self.overscroll_y && self.scroll_y_on {
            (
                -self.tuning.overscroll_distance,
                self.max_y + self.tuning.overscroll_distance,
            )
        } else {
            (0.0, self.max_y)
        }
    }

    fn clamp(&mut self) {
        let (lo, hi) = self.scroll_bounds_x();
        self.amount_x = self.amount_x.clamp(lo, hi.max(lo));
        let (lo, hi) = self.scroll_bounds_y();
        self.amount_y = self.amount_y.clamp(lo, hi.max(lo));
    }

    /// Sets the horizontal offset, clamped by the overscroll rule.
    pub fn set_scroll_x(&mut self, amount: f32) {
        self.amount_x = amount;
        let (lo, hi) = self.scroll_bounds_x();
        self.amount_x = self.amount_x.clamp(lo, hi.max(lo));
    }

    /// Sets the vertical offset, clamped by the overscroll rule.
    pub fn set_scroll_y(&mut self, amount: f32) {
        self.amount_y = amount;
        let (lo, hi) = self.scroll_bounds_y();
        self.amount_y = self.amount_y.clamp(lo, hi.max(lo));
    }

    fn reset_fade(&mut self) {
        self.fade_alpha = self.tuning.fade_alpha_seconds;
        self.fade_delay = self.tuning.fade_delay_seconds;
    }

    fn stop_fling(&mut self) {
        self.fling_timer = 0.0;
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
    }

    /// Clears all drag/pan state and releases the touch focus.
    pub fn cancel_touch(&mut self, stage: &mut Stage) {
        self.panning = false;
        self.dragging_h = false;
        self.dragging_v = false;
        self.stop_fling();
        stage.cancel_touch_focus(self.actor);
    }

    fn pan(&mut self, delta: Vec2) {
        if !self.touch_scroll || self.dragging_h || self.dragging_v {
            return;
        }
        self.panning = true;
        self.reset_fade();
        if self.scroll_x_on {
            self.amount_x -= delta.x;
        }
        if self.scroll_y_on {
            self.amount_y += delta.y;
        }
        self.clamp();
    }

    fn finish_pan(&mut self, velocity: Vec2) {
        if !self.panning {
            return;
        }
        self.panning = false;
        if self.scroll_x_on && velocity.x.abs() > self.tuning.fling_velocity_min {
            self.fling_timer = self.tuning.fling_time;
            self.velocity_x = velocity.x;
        }
        if self.scroll_y_on && velocity.y.abs() > self.tuning.fling_velocity_min {
            self.fling_timer = self.tuning.fling_time;
            self.velocity_y = velocity.y;
        }
    }

    fn start_knob_drag(&mut self, x: f32, y: f32) -> bool {
        if !self.scrollbar_touch {
            return false;
        }
        if self.scroll_x_on && self.h_scroll_bounds.contains(x, y) {
            self.reset_fade();
            if self.h_knob_bounds.contains(x, y) {
                self.dragging_h = true;
                self.knob_grab = x - self.h_knob_bounds.x;
            } else {
                // Track click: page toward the click.
                let direction = if x < self.h_knob_bounds.x { -1.0 } else { 1.0 };
                self.set_scroll_x(self.amount_x + direction * self.widget_area.width * 0.9);
            }
            return true;
        }
        if self.scroll_y_on && self.v_scroll_bounds.contains(x, y) {
            self.reset_fade();
            if self.v_knob_bounds.contains(x, y) {
                self.dragging_v = true;
                self.knob_grab = y - self.v_knob_bounds.y;
            } else {
                // Above the knob scrolls toward the top.
                let direction = if y > self.v_knob_bounds.top() { -1.0 } else { 1.0 };
                self.set_scroll_y(self.amount_y + direction * self.widget_area.height * 0.9);
            }
            return true;
        }
        false
    }

    fn drag_knob(&mut self, x: f32, y: f32) {
        if self.dragging_h {
            let track = self.h_scroll_bounds;
            let usable = track.width - self.h_knob_bounds.width;
            // A zero-length track cannot map a drag to an offset.
            if usable > 0.0 && self.max_x > 0.0 {
                let knob_x = (x - self.knob_grab - track.x).clamp(0.0, usable);
                self.amount_x = knob_x / usable * self.max_x;
            }
        }
        if self.dragging_v {
            let track = self.v_scroll_bounds;
            let usable = track.height - self.v_knob_bounds.height;
            if usable > 0.0 && self.max_y > 0.0 {
                let knob_y = (y - self.knob_grab - track.y).clamp(0.0, usable);
                self.amount_y = (1.0 - knob_y / usable) * self.max_y;
            }
        }
    }

    fn end_knob_drag(&mut self) {
        self.dragging_h = false;
        self.dragging_v = false;
    }

    fn apply_wheel(&mut self, amount_x: f32, amount_y: f32) -> bool {
        let mut handled = false;
        if self.scroll_y_on && amount_y != 0.0 {
            self.set_scroll_y(self.amount_y + amount_y * self.tuning.wheel_step);
            handled = true;
        }
        if self.scroll_x_on && amount_x != 0.0 {
            self.set_scroll_x(self.amount_x + amount_x * self.tuning.wheel_step);
            handled = true;
        }
        if handled {
            self.reset_fade();
        }
        handled
    }

    fn bar_sizes(&self) -> (f32, f32) {
        let h = self
            .style
            .h_scroll
            .map_or(0.0, |d| d.min_height)
            .max(self.style.h_scroll_knob.map_or(0.0, |d| d.min_height));
        let v = self
            .style
            .v_scroll
            .map_or(0.0, |d| d.min_width)
            .max(self.style.v_scroll_knob.map_or(0.0, |d| d.min_width));
        (h, v)
    }

    fn update_knob_positions(&mut self) {
        if self.scroll_x_on {
            let usable = self.h_scroll_bounds.width - self.h_knob_bounds.width;
            let percent = if self.max_x > 0.0 {
                (self.visual_x / self.max_x).clamp(0.0, 1.0)
            } else {
                0.0
            };
            self.h_knob_bounds.x = self.h_scroll_bounds.x + usable * percent;
            self.h_knob_bounds.y = self.h_scroll_bounds.y;
        }
        if self.scroll_y_on {
            let usable = self.v_scroll_bounds.height - self.v_knob_bounds.height;
            let percent = if self.max_y > 0.0 {
                (self.visual_y / self.max_y).clamp(0.0, 1.0)
            } else {
                0.0
            };
            self.v_knob_bounds.x = self.v_scroll_bounds.x;
            self.v_knob_bounds.y = self.v_scroll_bounds.y + usable * (1.0 - percent);
        }
    }
}

impl Widget for ScrollPane {
    fn act(&mut self, stage: &mut Stage, _id: ActorId, delta: f32) -> SceneResult<()> {
        let mut animating = false;
        let dragging = self.dragging_h || self.dragging_v;

        // 1. Scrollbar fade.
        if self.fade_scrollbars && !self.panning && !dragging && self.fade_alpha > 0.0 {
            if self.fade_delay > 0.0 {
                self.fade_delay -= delta;
            } else {
                self.fade_alpha = (self.fade_alpha - delta).max(0.0);
                animating = true;
            }
        }

        // 2. Fling decay.
        if self.fling_timer > 0.0 {
            self.reset_fade();
            let alpha = self.fling_timer / self.tuning.fling_time;
            self.amount_x -= self.velocity_x * alpha * delta;
            self.amount_y += self.velocity_y * alpha * delta;
            self.clamp();

            // Stop dead the instant the clamp lands on a boundary.
            let (lo, hi) = self.scroll_bounds_x();
            if self.amount_x == lo || self.amount_x == hi {
                self.velocity_x = 0.0;
            }
            let (lo, hi) = self.scroll_bounds_y();
            if self.amount_y == lo || self.amount_y == hi {
                self.velocity_y = 0.0;
            }

            self.fling_timer -= delta;
            if self.fling_timer <= 0.0 {
                self.velocity_x = 0.0;
                self.velocity_y = 0.0;
            }
            animating = true;
        }

        // 3. Smooth visual catch-up.
        if self.smooth_scrolling && self.fling_timer <= 0.0 && !self.panning && !dragging {
            if self.visual_x != self.amount_x {
                let gap = self.amount_x - self.visual_x;
                let step = (self.tuning.visual_speed_floor * delta)
                    .max(gap.abs() * self.tuning.smooth_catchup_factor * delta);
                self.visual_x = if gap > 0.0 {
                    (self.visual_x + step).min(self.amount_x)
                } else {
                    (self.visual_x - step).max(self.amount_x)
                };
                animating = true;
            }
            if self.visual_y != self.amount_y {
                let gap = self.amount_y - self.visual_y;
                let step = (self.tuning.visual_speed_floor * delta)
                    .max(gap.abs() * self.tuning.smooth_catchup_factor * delta);
                self.visual_y = if gap > 0.0 {
                    (self.visual_y + step).min(self.amount_y)
                } else {
                    (self.visual_y - step).max(self.amount_y)
                };
                animating = true;
            }
        } else {
            self.visual_x = self.amount_x;
            self.visual_y = self.amount_y;
        }

        // 4. Overscroll spring-back, clamped at the bound.
        if !self.panning {
            let distance = self.tuning.overscroll_distance;
            let speed_min = self.tuning.overscroll_speed_min;
            let speed_span = self.tuning.overscroll_speed_max - speed_min;
            if self.overscroll_x && self.scroll_x_on {
                if self.amount_x < 0.0 {
                    self.reset_fade();
                    self.amount_x += (speed_min + speed_span * -self.amount_x / distance) * delta;
                    if self.amount_x > 0.0 {
                        self.amount_x = 0.0;
                    }
                    animating = true;
                } else if self.amount_x > self.max_x {
                    self.reset_fade();
                    self.amount_x -=
                        (speed_min + speed_span * (self.amount_x - self.max_x) / distance) * delta;
                    if self.amount_x < self.max_x {
                        self.amount_x = self.max_x;
                    }
                    animating = true;
                }
            }
            if self.overscroll_y && self.scroll_y_on {
                if self.amount_y < 0.0 {
                    self.reset_fade();
                    self.amount_y += (speed_min + speed_span * -self.amount_y / distance) * delta;
                    if self.amount_y > 0.0 {
                        self.amount_y = 0.0;
                    }
                    animating = true;
                } else if self.amount_y > self.max_y {
                    self.reset_fade();
                    self.amount_y -=
                        (speed_min + speed_span * (self.amount_y - self.max_y) / distance) * delta;
                    if self.amount_y < self.max_y {
                        self.amount_y = self.max_y;
                    }
                    animating = true;
                }
            }
        }

        if animating {
            stage.request_render();
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        let (width, height) = {
            let actor = stage.actor(id)?;
            (actor.width(), actor.height())
        };
        let bg = self.style.background;
        let (bg_l, bg_r, bg_t, bg_b) = bg.map_or((0.0, 0.0, 0.0, 0.0), |d| {
            (d.pad_left, d.pad_right, d.pad_top, d.pad_bottom)
        });
        let (bar_h, bar_w) = self.bar_sizes();
        let overlay = self.scrollbars_on_top || self.fade_scrollbars;

        let mut area_w = width - bg_l - bg_r;
        let mut area_h = height - bg_t - bg_b;

        let (pref_w, pref_h) = match self.child {
            Some(child) => {
                let pref = stage.pref_size(child)?;
                (pref.x, pref.y)
            }
            None => (0.0, 0.0),
        };

        // First pass, then a single corrective pass for the cross-axis
        // dependency: a scrollbar shrinks the viewport, which can newly
        // overflow the other axis. Not iterated to a fixed point.
        self.scroll_x_on = self.force_x || (pref_w > area_w && !self.disable_x);
        self.scroll_y_on = self.force_y || (pref_h > area_h && !self.disable_y);
        if !overlay {
            if self.scroll_y_on {
                area_w -= bar_w;
                if !self.scroll_x_on && pref_w > area_w && !self.disable_x {
                    self.scroll_x_on = true;
                }
            }
            if self.scroll_x_on {
                area_h -= bar_h;
                if !self.scroll_y_on && pref_h > area_h && !self.disable_y {
                    self.scroll_y_on = true;
                    area_w -= bar_w;
                }
            }
        }

        let area_y = if self.scroll_x_on && !overlay {
            bg_b + bar_h
        } else {
            bg_b
        };
        self.widget_area = Rect::new(bg_l, area_y, area_w, area_h);
        self.h_scroll_bounds = Rect::new(bg_l, bg_b, area_w, bar_h);
        self.v_scroll_bounds = Rect::new(width - bg_r - bar_w, area_y, bar_w, area_h);

        // Content size: preferred on a scrollable axis, viewport-fitted
        // otherwise.
        let child_w = if self.disable_x { area_w } else { pref_w.max(area_w) };
        let child_h = if self.disable_y { area_h } else { pref_h.max(area_h) };
        self.max_x = (child_w - area_w).max(0.0);
        self.max_y = (child_h - area_h).max(0.0);
        self.clamp();

        if let Some(child) = self.child {
            let x = self.widget_area.x - self.visual_x;
            let y = self.widget_area.y + self.widget_area.height - child_h + self.visual_y;
            stage.actor_mut(child)?.set_bounds(x, y, child_w, child_h);
            stage.validate(child)?;
        }

        // Knob sizing: proportional to the visible/total ratio, or fixed to
        // the drawable minimum.
        if self.scroll_x_on {
            let knob_min = self.style.h_scroll_knob.map_or(0.0, |d| d.min_width);
            let knob_w = if self.max_x <= 0.0 {
                self.h_scroll_bounds.width
            } else if self.variable_knobs {
                (self.h_scroll_bounds.width * (area_w / child_w).min(1.0)).max(knob_min)
            } else {
                knob_min
            }
            .min(self.h_scroll_bounds.width);
            self.h_knob_bounds = Rect::new(
                self.h_scroll_bounds.x,
                self.h_scroll_bounds.y,
                knob_w,
                bar_h,
            );
        } else {
            self.h_knob_bounds = Rect::ZERO;
        }
        if self.scroll_y_on {
            let knob_min = self.style.v_scroll_knob.map_or(0.0, |d| d.min_height);
            let knob_h = if self.max_y <= 0.0 {
                self.v_scroll_bounds.height
            } else if self.variable_knobs {
                (self.v_scroll_bounds.height * (area_h / child_h).min(1.0)).max(knob_min)
            } else {
                knob_min
            }
            .min(self.v_scroll_bounds.height);
            self.v_knob_bounds = Rect::new(
                self.v_scroll_bounds.x,
                self.v_scroll_bounds.y + self.v_scroll_bounds.height - knob_h,
                bar_w,
                knob_h,
            );
        } else {
            self.v_knob_bounds = Rect::ZERO;
        }
        self.update_knob_positions();
        Ok(())
    }

    fn pref_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let (bg_l, bg_r, bg_t, bg_b) = self.style.background.map_or((0.0, 0.0, 0.0, 0.0), |d| {
            (d.pad_left, d.pad_right, d.pad_top, d.pad_bottom)
        });
        let child = match self.child {
            Some(child) => stage.pref_size(child)?,
            None => Vec2::ZERO,
        };
        let (bar_h, bar_w) = self.bar_sizes();
        let overlay = self.scrollbars_on_top || self.fade_scrollbars;
        let mut pref = Vec2::new(child.x + bg_l + bg_r, child.y + bg_t + bg_b);
        if self.force_y && !overlay {
            pref.x += bar_w;
        }
        if self.force_x && !overlay {
            pref.y += bar_h;
        }
        Ok(pref)
    }

    fn min_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        Ok(Vec2::ZERO)
    }

    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        self.update_knob_positions();

        // Place the child from the visual amounts before drawing it.
        if let Some(child) = self.child {
            let child_h = stage.actor(child)?.height();
            let x = self.widget_area.x - self.visual_x;
            let y = self.widget_area.y + self.widget_area.height - child_h + self.visual_y;
            stage.actor_mut(child)?.set_position(x, y);
        }

        let (bounds, tint) = {
            let actor = stage.actor(id)?;
            let c = actor.color();
            (
                Rect::new(0.0, 0.0, actor.width(), actor.height()),
                Color::rgba(c.r, c.g, c.b, parent_alpha),
            )
        };
        if let Some(bg) = &self.style.background {
            bg.draw(batch, bounds, tint);
        }

        let area = self.widget_area;
        batch.clipped(area, |b| stage.draw_children(id, b, parent_alpha))?;

        let alpha = self.scrollbar_alpha() * parent_alpha;
        if alpha > 0.0 {
            let bar_tint = tint.with_alpha(alpha);
            if self.scroll_x_on {
                if let Some(track) = &self.style.h_scroll {
                    track.draw(batch, self.h_scroll_bounds, bar_tint);
                }
                if self.max_x > 0.0 {
                    if let Some(knob) = &self.style.h_scroll_knob {
                        knob.draw(batch, self.h_knob_bounds, bar_tint);
                    }
                }
            }
            if self.scroll_y_on {
                if let Some(track) = &self.style.v_scroll {
                    track.draw(batch, self.v_scroll_bounds, bar_tint);
                }
                if self.max_y > 0.0 {
                    if let Some(knob) = &self.style.v_scroll_knob {
                        knob.draw(batch, self.v_knob_bounds, bar_tint);
                    }
                }
            }
        }
        Ok(())
    }

    fn hit(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        x: f32,
        y: f32,
        touchable: bool,
    ) -> Option<ActorId> {
        {
            let actor = stage.actor(id).ok()?;
            // The viewport clips: nothing outside the pane is hittable.
            if !actor.bounds_contain(x, y) {
                return None;
            }
            // Scrollbars take priority over same-shaped content beneath them.
            if touchable && actor.touchable() == Touchable::Enabled && actor.is_visible() {
                let bars_touchable = self.scrollbar_touch;
                if bars_touchable && self.scroll_x_on && self.h_scroll_bounds.contains(x, y) {
                    return Some(id);
                }
                if bars_touchable && self.scroll_y_on && self.v_scroll_bounds.contains(x, y) {
                    return Some(id);
                }
            }
        }
        stage.default_hit(id, x, y, touchable)
    }
}

struct ScrollInput {
    pane: Rc<RefCell<ScrollPane>>,
}

impl InputHandler for ScrollInput {
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
        pane.stop_fling();
        pane.reset_fade();
        if pane.start_knob_drag(x, y) {
            return Ok(true);
        }
        Ok(pane.touch_scroll && (pane.scroll_x_on || pane.scroll_y_on))
    }

    fn touch_dragged(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        x: f32,
        y: f32,
        _pointer: u32,
    ) -> SceneResult<()> {
        if let Ok(mut pane) = self.pane.try_borrow_mut() {
            pane.drag_knob(x, y);
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
            pane.end_knob_drag();
        }
        Ok(())
    }

    fn scrolled(
        &mut self,
        _stage: &mut Stage,
        _event: &mut Event,
        amount_x: f32,
        amount_y: f32,
    ) -> SceneResult<bool> {
        let Ok(mut pane) = self.pane.try_borrow_mut() else {
            return Ok(false);
        };
        Ok(pane.apply_wheel(amount_x, amount_y))
    }
}
