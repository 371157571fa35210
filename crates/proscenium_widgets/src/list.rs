//! Vertical list of text rows with selection.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, ClickListener, Color, Event, InputHandler, Rect, SceneResult, Stage, Vec2,
    Widget,
};

use crate::selection::Selection;
use crate::style::ListStyle;

const ROW_PAD: f32 = 2.0;

/// A selectable list of display-formatted items. Rows run top-down.
pub struct List<T> {
    actor: ActorId,
    items: Vec<T>,
    style: ListStyle,
    selection: Selection<usize>,
    over: Option<usize>,
}

impl<T: Display + 'static> List<T> {
    /// Creates a list actor with click selection and hover tracking.
    pub fn create(
        stage: &mut Stage,
        items: Vec<T>,
        style: ListStyle,
    ) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let mut selection = Selection::new();
        selection.set_required(true);
        if !items.is_empty() {
            selection.set(0);
        }
        let list = Rc::new(RefCell::new(Self {
            actor,
            items,
            style,
            selection,
            over: None,
        }));
        stage.set_behavior(actor, list.clone())?;

        let click_list = list.clone();
        stage.add_input_listener(
            actor,
            ClickListener::new(Box::new(move |stage: &mut Stage, _event: &mut Event| {
                // Select inside the borrow, fire after releasing it so Change
                // listeners can read the list.
                let changed = {
                    let Ok(mut list) = click_list.try_borrow_mut() else {
                        return Ok(());
                    };
                    let local = stage.stage_to_local(list.actor, stage.pointer_position());
                    list.click_select(stage, local.y)
                };
                if changed {
                    let mut event = Event::change();
                    stage.fire(actor, &mut event)?;
                }
                Ok(())
            })),
        )?;
        let over_list = list.clone();
        stage.add_input_listener(actor, HoverTracker { list: over_list })?;
        Ok((actor, list))
    }

    /// The list's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// The items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replaces the items, resetting selection and hover.
    pub fn set_items(&mut self, stage: &mut Stage, items: Vec<T>) -> SceneResult<()> {
        self.items = items;
        self.over = None;
        self.selection.clear();
        if !self.items.is_empty() {
            self.selection.set(0);
        }
        stage.invalidate_hierarchy(self.actor)
    }

    /// The selection over item indices.
    #[must_use]
    pub const fn selection(&self) -> &Selection<usize> {
        &self.selection
    }

    /// Mutable access to the selection.
    pub fn selection_mut(&mut self) -> &mut Selection<usize> {
        &mut self.selection
    }

    /// The first selected item, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        self.selection.first().and_then(|&i| self.items.get(i))
    }

    /// The hovered row index, if any.
    #[must_use]
    pub const fn over_index(&self) -> Option<usize> {
        self.over
    }

    /// Height of one row.
    #[must_use]
    pub fn item_height(&self) -> f32 {
        self.style.text.line_height() + ROW_PAD * 2.0
    }

    /// The row index whose span contains `y` (local coordinates), using the
    /// same top-down order the rows are drawn in.
    #[must_use]
    pub fn item_at_y(&self, stage: &Stage, y: f32) -> Option<usize> {
        let height = stage.actor(self.actor).ok()?.height();
        let ih = self.item_height();
        if ih <= 0.0 || y > height || y < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((height - y) / ih).floor() as usize;
        (index < self.items.len()).then_some(index)
    }

    fn click_select(&mut self, stage: &Stage, y: f32) -> bool {
        let Some(index) = self.item_at_y(stage, y) else {
            return false;
        };
        self.selection.choose(index)
    }
}

impl<T: Display + 'static> Widget for List<T> {
    fn pref_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let mut width = 0.0_f32;
        for item in &self.items {
            width = width.max(self.style.text.width(&item.to_string()));
        }
        #[allow(clippy::cast_precision_loss)]
        let height = self.items.len() as f32 * self.item_height();
        Ok(Vec2::new(width + ROW_PAD * 2.0, height))
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
        let (width, height, tint) = {
            let actor = stage.actor(id)?;
            let c = actor.color();
            (
                actor.width(),
                actor.height(),
                Color::rgba(c.r, c.g, c.b, parent_alpha),
            )
        };
        if let Some(bg) = &self.style.background {
            bg.draw(batch, Rect::new(0.0, 0.0, width, height), tint);
        }
        let ih = self.item_height();
        for (index, item) in self.items.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let row_y = height - (index + 1) as f32 * ih;
            let row = Rect::new(0.0, row_y, width, ih);
            let selected = self.selection.contains(&index);
            if selected {
                self.style.selection.draw(batch, row, tint);
            } else if self.over == Some(index) {
                if let Some(over) = &self.style.over {
                    over.draw(batch, row, tint);
                }
            }
            let color = if selected {
                self.style.selected_text_color
            } else {
                self.style.text_color
            };
            batch.text(
                item.to_string(),
                ROW_PAD,
                row_y + ROW_PAD,
                color.mul_alpha(parent_alpha),
                self.style.text.font_size,
            );
        }
        Ok(())
    }
}

struct HoverTracker<T> {
    list: Rc<RefCell<List<T>>>,
}

impl<T: Display + 'static> InputHandler for HoverTracker<T> {
    fn mouse_moved(
        &mut self,
        stage: &mut Stage,
        _event: &mut Event,
        _x: f32,
        y: f32,
    ) -> SceneResult<bool> {
        if let Ok(mut list) = self.list.try_borrow_mut() {
            list.over = list.item_at_y(stage, y);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_fixture(stage: &mut Stage) -> (ActorId, Rc<RefCell<List<&'static str>>>) {
        let (id, list) =
            List::create(stage, vec!["alpha", "beta", "gamma"], ListStyle::default()).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        let pref = stage.pref_size(id).unwrap();
        stage.actor_mut(id).unwrap().set_bounds(0.0, 0.0, pref.x, pref.y);
        stage.validate(id).unwrap();
        (id, list)
    }

    #[test]
    fn test_rows_map_top_down() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, list) = list_fixture(&mut stage);
        let l = list.borrow();
        let height = stage.actor(id).unwrap().height();
        let ih = l.item_height();

        assert_eq!(l.item_at_y(&stage, height - ih / 2.0), Some(0), "top row first");
        assert_eq!(l.item_at_y(&stage, height - ih * 1.5), Some(1));
        assert_eq!(l.item_at_y(&stage, height - ih * 2.5), Some(2));
        assert_eq!(l.item_at_y(&stage, -1.0), None);
    }

    #[test]
    fn test_click_selects_and_fires_change() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, list) = list_fixture(&mut stage);
        let changes = Rc::new(RefCell::new(0));
        {
            let changes = changes.clone();
            stage
                .add_listener(
                    id,
                    proscenium_scene::FnListener(move |_: &mut Stage, _: &mut Event| {
                        *changes.borrow_mut() += 1;
                        Ok(false)
                    }),
                )
                .unwrap();
        }

        let (height, ih) = {
            let l = list.borrow();
            (stage.actor(id).unwrap().height(), l.item_height())
        };
        // Click the middle row (stage coordinates flip against the screen).
        let point = Vec2::new(5.0, height - ih * 1.5);
        let screen = Vec2::new(point.x, 400.0 - point.y);
        stage.touch_down(screen, 0, proscenium_scene::MouseButton::Left).unwrap();
        stage.touch_up(screen, 0, proscenium_scene::MouseButton::Left).unwrap();

        assert_eq!(list.borrow().selected(), Some(&"beta"));
        assert_eq!(*changes.borrow(), 1, "selection change fired one event");

        // Choosing the same row again changes nothing and fires nothing.
        stage.touch_down(screen, 0, proscenium_scene::MouseButton::Left).unwrap();
        stage.touch_up(screen, 0, proscenium_scene::MouseButton::Left).unwrap();
        assert_eq!(*changes.borrow(), 1);
    }

    #[test]
    fn test_required_selection_defaults_to_first() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_id, list) = list_fixture(&mut stage);
        assert_eq!(list.borrow().selected(), Some(&"alpha"));
    }

    #[test]
    fn test_hover_tracking() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, list) = list_fixture(&mut stage);
        let height = stage.actor(id).unwrap().height();
        let ih = list.borrow().item_height();

        stage
            .mouse_moved(Vec2::new(5.0, 400.0 - (height - ih * 2.5)))
            .unwrap();
        assert_eq!(list.borrow().over_index(), Some(2));
    }
}
