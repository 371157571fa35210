//! Select box: a drop-down over a stage-level popup overlay.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, ClickListener, Color, Event, EventKind, FnListener, InputEvent, Key,
    ListenerId, Rect, SceneResult, Stage, Vec2, Widget,
};

use crate::config::ScrollTuning;
use crate::list::List;
use crate::scroll::ScrollPane;
use crate::style::SelectBoxStyle;

struct Popup {
    scroll_actor: ActorId,
    list: Rc<RefCell<List<String>>>,
    hide_listener: ListenerId,
    box_stage_pos: Vec2,
}

/// A closed box showing the selected item; clicking opens a scrollable list
/// overlay above or below the box, whichever side has room.
///
/// The popup closes on an outside click, Escape/Enter, a new selection, or
/// the box moving out from under it (its stage position is re-checked every
/// draw).
pub struct SelectBox {
    actor: ActorId,
    items: Vec<String>,
    selected: usize,
    style: SelectBoxStyle,
    max_list_count: usize,
    popup: Option<Popup>,
}

fn is_descendant(stage: &Stage, mut actor: ActorId, ancestor: ActorId) -> bool {
    loop {
        if actor == ancestor {
            return true;
        }
        match stage.actor(actor).ok().and_then(|a| a.parent()) {
            Some(parent) => actor = parent,
            None => return false,
        }
    }
}

impl SelectBox {
    /// Creates a select box actor over the given items.
    pub fn create(
        stage: &mut Stage,
        items: Vec<String>,
        style: SelectBoxStyle,
    ) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let select = Rc::new(RefCell::new(Self {
            actor,
            items,
            selected: 0,
            style,
            max_list_count: 8,
            popup: None,
        }));
        stage.set_behavior(actor, select.clone())?;

        let click_select = select.clone();
        stage.add_input_listener(
            actor,
            ClickListener::new(Box::new(move |stage: &mut Stage, _event: &mut Event| {
                let Ok(mut select) = click_select.try_borrow_mut() else {
                    return Ok(());
                };
                if select.is_open() {
                    select.close(stage)
                } else {
                    let rc = click_select.clone();
                    select.open(stage, &rc)
                }
            })),
        )?;
        Ok((actor, select))
    }

    /// The box's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// The items.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Replaces the items; the selection resets to the first item.
    pub fn set_items(&mut self, stage: &mut Stage, items: Vec<String>) -> SceneResult<()> {
        self.items = items;
        self.selected = 0;
        if self.is_open() {
            self.close(stage)?;
        }
        stage.invalidate_hierarchy(self.actor)
    }

    /// The selected index.
    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected item, if the box is non-empty.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Selects an index directly (out-of-range is ignored).
    pub fn set_selected_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    /// Caps how many rows the popup shows before scrolling (0 = no cap).
    pub fn set_max_list_count(&mut self, max: usize) {
        self.max_list_count = max;
    }

    /// True while the popup overlay is up.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.popup.is_some()
    }

    /// The popup's scroll pane actor, while open.
    #[must_use]
    pub fn popup_actor(&self) -> Option<ActorId> {
        self.popup.as_ref().map(|p| p.scroll_actor)
    }

    fn open(&mut self, stage: &mut Stage, self_rc: &Rc<RefCell<Self>>) -> SceneResult<()> {
        if self.popup.is_some() || self.items.is_empty() {
            return Ok(());
        }

        let (list_actor, list) = List::create(
            stage,
            self.items.clone(),
            self.style.list_style.clone(),
        )?;
        list.borrow_mut().selection_mut().set(self.selected);

        let (scroll_actor, scroll) = ScrollPane::create(
            stage,
            Some(list_actor),
            self.style.scroll_style.clone(),
            ScrollTuning::default(),
        )?;
        {
            let mut scroll = scroll.borrow_mut();
            scroll.set_scroll_disabled(true, false);
            scroll.set_overscroll(false, false);
            scroll.set_fade_scrollbars(false);
        }

        // Sized to content up to the visible-row cap.
        let list_pref = stage.pref_size(list_actor)?;
        let item_height = list.borrow().item_height();
        let visible = if self.max_list_count > 0 {
            self.items.len().min(self.max_list_count)
        } else {
            self.items.len()
        };
        #[allow(clippy::cast_precision_loss)]
        let height = (visible as f32 * item_height).min(list_pref.y);
        let (box_w, box_h) = {
            let actor = stage.actor(self.actor)?;
            (actor.width(), actor.height())
        };
        let width = box_w.max(list_pref.x);

        // Above or below, by available space.
        let box_pos = stage.local_to_stage(self.actor, Vec2::ZERO);
        let stage_height = stage.actor(stage.root())?.height();
        let below_space = box_pos.y;
        let above_space = stage_height - box_pos.y - box_h;
        let below = below_space >= height || below_space >= above_space;
        let y = if below {
            box_pos.y - height
        } else {
            box_pos.y + box_h
        };

        let root = stage.root();
        stage.add_child(root, scroll_actor)?;
        stage.to_front(scroll_actor)?;
        stage
            .actor_mut(scroll_actor)?
            .set_bounds(box_pos.x, y, width, height);
        stage.validate(scroll_actor)?;

        // New selection in the list: adopt it, close, and re-fire from the box.
        let change_select = self_rc.clone();
        stage.add_listener(
            list_actor,
            FnListener(move |stage: &mut Stage, event: &mut Event| {
                if !matches!(event.kind(), EventKind::Change) {
                    return Ok(false);
                }
                let box_actor = {
                    let Ok(mut select) = change_select.try_borrow_mut() else {
                        return Ok(false);
                    };
                    let new_index = select.popup.as_ref().and_then(|popup| {
                        popup
                            .list
                            .try_borrow()
                            .ok()
                            .and_then(|list| list.selection().first().copied())
                    });
                    if let Some(index) = new_index {
                        select.selected = index;
                    }
                    select.close(stage)?;
                    select.actor
                };
                let mut change = Event::change();
                stage.fire(box_actor, &mut change)?;
                Ok(true)
            }),
        )?;

        // Escape/Enter close the popup; keys route to the focused list.
        let key_select = self_rc.clone();
        stage.add_listener(
            list_actor,
            FnListener(move |stage: &mut Stage, event: &mut Event| {
                let EventKind::Input(InputEvent::KeyDown { key }) = event.kind() else {
                    return Ok(false);
                };
                if matches!(key, Key::Escape | Key::Enter) {
                    if let Ok(mut select) = key_select.try_borrow_mut() {
                        select.close(stage)?;
                    }
                    return Ok(true);
                }
                Ok(false)
            }),
        )?;
        stage.set_key_focus(Some(list_actor));

        // Any press outside the popup and the box closes the overlay.
        let hide_select = self_rc.clone();
        let box_actor = self.actor;
        let hide_listener = stage.add_capture_listener(
            root,
            FnListener(move |stage: &mut Stage, event: &mut Event| {
                if !matches!(event.kind(), EventKind::Input(InputEvent::TouchDown { .. })) {
                    return Ok(false);
                }
                let Ok(mut select) = hide_select.try_borrow_mut() else {
                    return Ok(false);
                };
                let Some(popup) = &select.popup else {
                    return Ok(false);
                };
                let inside = event.target().is_some_and(|target| {
                    is_descendant(stage, target, popup.scroll_actor)
                        || is_descendant(stage, target, box_actor)
                });
                if !inside {
                    select.close(stage)?;
                }
                Ok(false)
            }),
        )?;

        self.popup = Some(Popup {
            scroll_actor,
            list,
            hide_listener,
            box_stage_pos: box_pos,
        });
        tracing::debug!(items = self.items.len(), below, "select box opened");
        Ok(())
    }

    /// Closes the popup overlay if open.
    pub fn close(&mut self, stage: &mut Stage) -> SceneResult<()> {
        let Some(popup) = self.popup.take() else {
            return Ok(());
        };
        let root = stage.root();
        stage.remove_listener(root, popup.hide_listener)?;
        if stage.contains(popup.scroll_actor) {
            stage.destroy(popup.scroll_actor)?;
        }
        stage.set_key_focus(None);
        tracing::debug!("select box closed");
        Ok(())
    }
}

impl Widget for SelectBox {
    fn pref_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        let mut width = 0.0_f32;
        for item in &self.items {
            width = width.max(self.style.text.width(item));
        }
        let (pad_w, pad_h) = self.style.background.map_or((0.0, 0.0), |bg| {
            (bg.pad_left + bg.pad_right, bg.pad_top + bg.pad_bottom)
        });
        Ok(Vec2::new(
            width + pad_w,
            self.style.text.line_height() + pad_h,
        ))
    }

    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        // The box slid out from under its overlay: close it.
        if let Some(popup) = &self.popup {
            let now = stage.local_to_stage(id, Vec2::ZERO);
            if now != popup.box_stage_pos {
                self.close(stage)?;
            }
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
        if let Some(text) = self.selected() {
            let pad = self.style.background.map_or(0.0, |bg| bg.pad_left);
            batch.text(
                text,
                pad,
                (bounds.height - self.style.text.line_height()) / 2.0,
                self.style.text_color.mul_alpha(parent_alpha),
                self.style.text.font_size,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proscenium_scene::MouseButton;

    fn fixture(stage: &mut Stage) -> (ActorId, Rc<RefCell<SelectBox>>) {
        let items = vec!["one".to_owned(), "two".to_owned(), "three".to_owned()];
        let (id, select) = SelectBox::create(stage, items, SelectBoxStyle::default()).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        stage.actor_mut(id).unwrap().set_bounds(50.0, 200.0, 80.0, 20.0);
        stage.validate(id).unwrap();
        (id, select)
    }

    fn click(stage: &mut Stage, stage_point: Vec2) {
        let screen = Vec2::new(stage_point.x, 400.0 - stage_point.y);
        stage.touch_down(screen, 0, MouseButton::Left).unwrap();
        stage.touch_up(screen, 0, MouseButton::Left).unwrap();
    }

    #[test]
    fn test_click_opens_below_when_room() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, select) = fixture(&mut stage);

        click(&mut stage, Vec2::new(60.0, 210.0));
        let popup = {
            let s = select.borrow();
            assert!(s.is_open());
            s.popup_actor().unwrap()
        };
        let actor = stage.actor(popup).unwrap();
        assert!(
            actor.y() + actor.height() <= 200.0 + 1e-3,
            "popup sits below the box"
        );
        assert_eq!(stage.actor(popup).unwrap().parent(), Some(stage.root()));
        let _ = id;
    }

    #[test]
    fn test_opens_above_when_no_room_below() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, select) = fixture(&mut stage);
        stage.actor_mut(id).unwrap().set_position(50.0, 5.0);

        click(&mut stage, Vec2::new(60.0, 15.0));
        let popup = select.borrow().popup_actor().unwrap();
        let actor = stage.actor(popup).unwrap();
        assert!(actor.y() >= 25.0 - 1e-3, "popup sits above the box");
    }

    #[test]
    fn test_outside_click_closes() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_id, select) = fixture(&mut stage);

        click(&mut stage, Vec2::new(60.0, 210.0));
        assert!(select.borrow().is_open());

        click(&mut stage, Vec2::new(300.0, 300.0));
        assert!(!select.borrow().is_open(), "outside click closed the popup");
    }

    #[test]
    fn test_escape_closes() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_id, select) = fixture(&mut stage);

        click(&mut stage, Vec2::new(60.0, 210.0));
        assert!(select.borrow().is_open());
        stage.key_down(Key::Escape).unwrap();
        assert!(!select.borrow().is_open());
    }

    #[test]
    fn test_choosing_row_updates_selection_and_fires_change() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, select) = fixture(&mut stage);
        let changes = Rc::new(RefCell::new(0));
        {
            let changes = changes.clone();
            stage
                .add_listener(
                    id,
                    FnListener(move |_: &mut Stage, event: &mut Event| {
                        if matches!(event.kind(), EventKind::Change) {
                            *changes.borrow_mut() += 1;
                        }
                        Ok(false)
                    }),
                )
                .unwrap();
        }

        click(&mut stage, Vec2::new(60.0, 210.0));
        let (popup, item_height) = {
            let s = select.borrow();
            let popup = s.popup_actor().unwrap();
            let item_height = s.popup.as_ref().unwrap().list.borrow().item_height();
            (popup, item_height)
        };
        let popup_actor = stage.actor(popup).unwrap();
        // Second row from the top of the popup.
        let point = Vec2::new(
            popup_actor.x() + 10.0,
            popup_actor.y() + popup_actor.height() - item_height * 1.5,
        );
        click(&mut stage, point);

        let s = select.borrow();
        assert!(!s.is_open(), "selection closes the popup");
        assert_eq!(s.selected(), Some("two"));
        assert_eq!(*changes.borrow(), 1, "the box re-fired the change");
    }

    #[test]
    fn test_box_moving_closes_on_draw() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, select) = fixture(&mut stage);

        click(&mut stage, Vec2::new(60.0, 210.0));
        assert!(select.borrow().is_open());

        stage.actor_mut(id).unwrap().set_position(10.0, 10.0);
        let mut batch = Batch::new();
        stage.draw(&mut batch).unwrap();
        assert!(!select.borrow().is_open(), "position re-check closed it");
    }
}
