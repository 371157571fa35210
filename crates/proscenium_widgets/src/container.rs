//! Single-child sizing box.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, Color, Rect, SceneResult, Stage, Vec2, Widget,
};

use crate::align::Align;
use crate::drawable::Drawable;
use crate::value::Value;

/// Positions and sizes exactly one child inside its own bounds.
///
/// Sizing: with a fill fraction of 0 the child gets its preferred size
/// clamped to the available (padded) space; a positive fraction gets that
/// fraction of the available space. Either way the result is clamped to the
/// child's own min/max sizes. The final child rect is rounded to integers
/// unless rounding is disabled, to avoid sub-pixel seams.
pub struct Container {
    actor: ActorId,
    child: Option<ActorId>,
    background: Option<Drawable>,
    pad_left: Value,
    pad_right: Value,
    pad_top: Value,
    pad_bottom: Value,
    fill_x: f32,
    fill_y: f32,
    align: Align,
    clip: bool,
    round: bool,
}

impl Container {
    /// Creates a container actor. The returned handle configures it.
    pub fn create(stage: &mut Stage) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let container = Rc::new(RefCell::new(Self {
            actor,
            child: None,
            background: None,
            pad_left: Value::ZERO,
            pad_right: Value::ZERO,
            pad_top: Value::ZERO,
            pad_bottom: Value::ZERO,
            fill_x: 0.0,
            fill_y: 0.0,
            align: Align::CENTER,
            clip: false,
            round: true,
        }));
        stage.set_behavior(actor, container.clone())?;
        Ok((actor, container))
    }

    /// The container's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Sets (or clears) the single child.
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

    /// The current child.
    #[must_use]
    pub const fn child(&self) -> Option<ActorId> {
        self.child
    }

    /// Sets the background. With `adopt_insets`, padding is derived from the
    /// drawable's edge insets.
    pub fn set_background(&mut self, background: Option<Drawable>, adopt_insets: bool) {
        if adopt_insets {
            if let Some(bg) = &background {
                self.pad_left = Value::Fixed(bg.pad_left);
                self.pad_right = Value::Fixed(bg.pad_right);
                self.pad_top = Value::Fixed(bg.pad_top);
                self.pad_bottom = Value::Fixed(bg.pad_bottom);
            }
        }
        self.background = background;
    }

    /// Sets all four pads.
    pub fn set_pad(&mut self, top: Value, left: Value, bottom: Value, right: Value) {
        self.pad_top = top;
        self.pad_left = left;
        self.pad_bottom = bottom;
        self.pad_right = right;
    }

    /// Sets the fill fractions (0 = use the child's preferred size).
    pub fn set_fill(&mut self, fill_x: f32, fill_y: f32) {
        self.fill_x = fill_x;
        self.fill_y = fill_y;
    }

    /// Sets the child alignment within the padded area.
    pub fn set_align(&mut self, align: Align) {
        self.align = align;
    }

    /// Enables scissor-clipping of the child to the padded content rect.
    pub fn set_clip(&mut self, clip: bool) {
        self.clip = clip;
    }

    /// Disables integer rounding of the final child rect.
    pub fn set_round(&mut self, round: bool) {
        self.round = round;
    }

    fn pads(&self, stage: &mut Stage) -> SceneResult<(f32, f32, f32, f32)> {
        Ok((
            self.pad_left.get(stage)?,
            self.pad_right.get(stage)?,
            self.pad_top.get(stage)?,
            self.pad_bottom.get(stage)?,
        ))
    }

    fn content_rect(&self, stage: &mut Stage, id: ActorId) -> SceneResult<Rect> {
        let (left, right, top, bottom) = self.pads(stage)?;
        let actor = stage.actor(id)?;
        Ok(Rect::new(
            left,
            bottom,
            actor.width() - left - right,
            actor.height() - top - bottom,
        ))
    }
}

impl Widget for Container {
    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        let content = self.content_rect(stage, id)?;
        let Some(child) = self.child else {
            return Ok(());
        };

        let pref = stage.pref_size(child)?;
        let min = stage.min_size(child)?;
        let max = stage.max_size(child)?;

        let mut width = if self.fill_x > 0.0 {
            content.width * self.fill_x
        } else {
            pref.x.min(content.width)
        };
        width = width.max(min.x);
        if max.x > 0.0 {
            width = width.min(max.x);
        }

        let mut height = if self.fill_y > 0.0 {
            content.height * self.fill_y
        } else {
            pref.y.min(content.height)
        };
        height = height.max(min.y);
        if max.y > 0.0 {
            height = height.min(max.y);
        }

        let mut x = content.x + self.align.x_offset(content.width, width);
        let mut y = content.y + self.align.y_offset(content.height, height);
        if self.round {
            x = x.round();
            y = y.round();
            width = width.round();
            height = height.round();
        }

        stage.actor_mut(child)?.set_bounds(x, y, width, height);
        stage.validate(child)?;
        Ok(())
    }

    fn pref_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let (left, right, top, bottom) = self.pads(stage)?;
        let child = match self.child {
            Some(child) => stage.pref_size(child)?,
            None => Vec2::ZERO,
        };
        let mut size = Vec2::new(child.x + left + right, child.y + top + bottom);
        if let Some(bg) = &self.background {
            size.x = size.x.max(bg.min_width);
            size.y = size.y.max(bg.min_height);
        }
        Ok(size)
    }

    fn min_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let (left, right, top, bottom) = self.pads(stage)?;
        let child = match self.child {
            Some(child) => stage.min_size(child)?,
            None => Vec2::ZERO,
        };
        Ok(Vec2::new(child.x + left + right, child.y + top + bottom))
    }

    fn max_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let (left, right, top, bottom) = self.pads(stage)?;
        let child = match self.child {
            Some(child) => stage.max_size(child)?,
            None => Vec2::ZERO,
        };
        // A child without a maximum leaves the container unbounded too.
        Ok(Vec2::new(
            if child.x > 0.0 { child.x + left + right } else { 0.0 },
            if child.y > 0.0 { child.y + top + bottom } else { 0.0 },
        ))
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
        if let Some(bg) = &self.background {
            bg.draw(batch, bounds, tint);
        }
        if self.clip {
            let content = self.content_rect(stage, id)?;
            batch.clipped(content, |b| stage.draw_children(id, b, parent_alpha))
        } else {
            stage.draw_children(id, batch, parent_alpha)
        }
    }
}
