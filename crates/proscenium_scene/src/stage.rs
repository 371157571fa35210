//! The actor arena and frame driver.
//!
//! A [`Stage`] owns every actor in an id-keyed map; hierarchy is a child-id
//! vector per slot plus a parent back-id, and both directions are mutated
//! only through the stage so they can never disagree. Per frame the host
//! calls, in order: the input entry points, [`Stage::act`], then
//! [`Stage::draw`] (which validates stale layouts top-down on the way).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::action::Action;
use crate::actor::{Actor, ActorFlags, ActorId, Touchable};
use crate::batch::Batch;
use crate::error::{SceneError, SceneResult};
use crate::event::{Event, InputEvent, Key, MouseButton};
use crate::geom::Vec2;
use crate::listener::{EventListener, InputAdapter, InputHandler, ListenerId};
use crate::services::{ScreenMapping, Services};
use crate::widget::Widget;

type ListenerRef = Rc<RefCell<dyn EventListener>>;
type WidgetRef = Rc<RefCell<dyn Widget>>;

struct ListenerEntry {
    id: ListenerId,
    capture: bool,
    listener: ListenerRef,
}

struct Slot {
    actor: Actor,
    children: Vec<ActorId>,
    listeners: Vec<ListenerEntry>,
    actions: Vec<Box<dyn Action>>,
    behavior: Option<WidgetRef>,
}

impl Slot {
    fn new(actor: Actor) -> Self {
        Self {
            actor,
            children: Vec::new(),
            listeners: Vec::new(),
            actions: Vec::new(),
            behavior: None,
        }
    }
}

/// The scene graph: actor arena, event dispatch, layout driver.
pub struct Stage {
    slots: HashMap<ActorId, Slot>,
    root: ActorId,
    next_actor: u64,
    next_listener: u64,
    time: f32,
    services: Services,
    mapping: ScreenMapping,
    render_on_demand: bool,
    key_focus: Option<ActorId>,
    touch_focus: HashMap<u32, ActorId>,
    pointer_pos: Vec2,
}

impl Stage {
    /// Creates a stage with a root actor of the given size and an identity
    /// screen mapping for a screen of the same height.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        let root_id = ActorId(0);
        let mut root = Actor::new(root_id);
        root.set_name("root");
        root.set_size(width, height);

        let mut slots = HashMap::with_capacity(256);
        slots.insert(root_id, Slot::new(root));

        Self {
            slots,
            root: root_id,
            next_actor: 1,
            next_listener: 1,
            time: 0.0,
            services: Services::default(),
            mapping: ScreenMapping::identity(height),
            render_on_demand: false,
            key_focus: None,
            touch_focus: HashMap::new(),
            pointer_pos: Vec2::ZERO,
        }
    }

    /// The root actor; every attached actor is reachable from it.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> ActorId {
        self.root
    }

    /// Seconds of accumulated [`act`](Self::act) time.
    #[inline]
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Installs the injected engine services.
    pub fn set_services(&mut self, services: Services) {
        self.services = services;
    }

    /// Sets the screen↔stage mapping.
    pub fn set_mapping(&mut self, mapping: ScreenMapping) {
        self.mapping = mapping;
    }

    /// The current screen↔stage mapping.
    #[must_use]
    pub const fn mapping(&self) -> ScreenMapping {
        self.mapping
    }

    /// Enables the render-request side effect when actions are running.
    pub fn set_render_on_demand(&mut self, enabled: bool) {
        self.render_on_demand = enabled;
    }

    /// Asks the graphics service to render a frame soon. No-op without one.
    pub fn request_render(&mut self) {
        if let Some(graphics) = self.services.graphics.as_mut() {
            graphics.request_render();
        }
    }

    // ------------------------------------------------------------------
    // Actor management
    // ------------------------------------------------------------------

    /// Creates a detached actor.
    pub fn new_actor(&mut self) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        self.slots.insert(id, Slot::new(Actor::new(id)));
        id
    }

    /// Returns true if the id refers to a live actor.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Borrows an actor's state.
    pub fn actor(&self, id: ActorId) -> SceneResult<&Actor> {
        self.slots
            .get(&id)
            .map(|s| &s.actor)
            .ok_or(SceneError::UnknownActor(id))
    }

    /// Mutably borrows an actor's state.
    pub fn actor_mut(&mut self, id: ActorId) -> SceneResult<&mut Actor> {
        self.slots
            .get_mut(&id)
            .map(|s| &mut s.actor)
            .ok_or(SceneError::UnknownActor(id))
    }

    fn debug_label(&self, id: ActorId) -> String {
        self.slots
            .get(&id)
            .and_then(|s| s.actor.name().map(str::to_owned))
            .unwrap_or_else(|| format!("actor#{}", id.raw()))
    }

    /// Attaches a widget behavior to an actor.
    pub fn set_behavior(&mut self, id: ActorId, behavior: WidgetRef) -> SceneResult<()> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        slot.behavior = Some(behavior);
        Ok(())
    }

    /// Returns a handle to an actor's behavior, if any.
    #[must_use]
    pub fn behavior(&self, id: ActorId) -> Option<WidgetRef> {
        self.slots.get(&id).and_then(|s| s.behavior.clone())
    }

    /// Adds `child` as the frontmost child of `parent`.
    ///
    /// Reparents if the child was attached elsewhere. Rejected before any
    /// mutation if it would make an actor its own ancestor.
    pub fn add_child(&mut self, parent: ActorId, child: ActorId) -> SceneResult<()> {
        let index = self.children(parent)?.len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` into `parent`'s ordered child list.
    ///
    /// The index is clamped to the list length. Index 0 is furthest back.
    pub fn insert_child(&mut self, parent: ActorId, index: usize, child: ActorId) -> SceneResult<()> {
        if !self.slots.contains_key(&child) {
            return Err(SceneError::UnknownActor(child));
        }
        if !self.slots.contains_key(&parent) {
            return Err(SceneError::UnknownActor(parent));
        }
        // Reject cycles before mutating anything.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::WouldCycle { child, parent });
            }
            cursor = self.actor(id)?.parent();
        }

        if self.actor(child)?.parent().is_some() {
            self.remove_from_parent(child)?;
        }

        let slot = self
            .slots
            .get_mut(&parent)
            .ok_or(SceneError::UnknownActor(parent))?;
        let index = index.min(slot.children.len());
        slot.children.insert(index, child);
        if let Some(child_slot) = self.slots.get_mut(&child) {
            child_slot.actor.parent = Some(parent);
        }
        tracing::debug!(parent = parent.raw(), child = child.raw(), index, "child attached");
        self.invalidate_hierarchy(parent)?;
        Ok(())
    }

    /// Detaches an actor from its parent. The actor (and its subtree) stays
    /// alive, just unattached.
    pub fn remove_from_parent(&mut self, id: ActorId) -> SceneResult<()> {
        let parent = self
            .actor(id)?
            .parent()
            .ok_or(SceneError::Detached(id))?;
        if let Some(slot) = self.slots.get_mut(&parent) {
            slot.children.retain(|&c| c != id);
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.actor.parent = None;
        }
        tracing::debug!(parent = parent.raw(), child = id.raw(), "child detached");
        self.invalidate_hierarchy(parent)?;
        Ok(())
    }

    /// Destroys an actor and its whole subtree, clearing listeners, actions,
    /// and any focus entries that pointed into it.
    pub fn destroy(&mut self, id: ActorId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::Widget("the stage root cannot be destroyed".into()));
        }
        if !self.slots.contains_key(&id) {
            return Err(SceneError::UnknownActor(id));
        }
        if self.actor(id)?.parent().is_some() {
            self.remove_from_parent(id)?;
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(slot) = self.slots.remove(&next) {
                pending.extend(slot.children);
            }
            if self.key_focus == Some(next) {
                self.key_focus = None;
            }
            self.touch_focus.retain(|_, &mut target| target != next);
        }
        Ok(())
    }

    /// The ordered child list (index 0 is furthest back).
    pub fn children(&self, id: ActorId) -> SceneResult<&[ActorId]> {
        self.slots
            .get(&id)
            .map(|s| s.children.as_slice())
            .ok_or(SceneError::UnknownActor(id))
    }

    /// The actor's index in its parent's child list.
    pub fn z_index(&self, id: ActorId) -> SceneResult<usize> {
        let parent = self
            .actor(id)?
            .parent()
            .ok_or(SceneError::Detached(id))?;
        self.children(parent)?
            .iter()
            .position(|&c| c == id)
            .ok_or(SceneError::UnknownActor(id))
    }

    /// Moves the actor to the given index among its siblings.
    ///
    /// The index is clamped into `[0, sibling_count - 1]`; the relative order
    /// of the other siblings is preserved.
    pub fn set_z_index(&mut self, id: ActorId, index: usize) -> SceneResult<()> {
        let parent = self
            .actor(id)?
            .parent()
            .ok_or(SceneError::Detached(id))?;
        let slot = self
            .slots
            .get_mut(&parent)
            .ok_or(SceneError::UnknownActor(parent))?;
        let count = slot.children.len();
        let index = index.min(count.saturating_sub(1));
        slot.children.retain(|&c| c != id);
        slot.children.insert(index, id);
        Ok(())
    }

    /// Moves the actor in front of all siblings.
    pub fn to_front(&mut self, id: ActorId) -> SceneResult<()> {
        self.set_z_index(id, usize::MAX)
    }

    /// Moves the actor behind all siblings.
    pub fn to_back(&mut self, id: ActorId) -> SceneResult<()> {
        self.set_z_index(id, 0)
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    fn push_listener(
        &mut self,
        id: ActorId,
        capture: bool,
        listener: ListenerRef,
    ) -> SceneResult<ListenerId> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        let listener_id = ListenerId(self.next_listener);
        self.next_listener += 1;
        slot.listeners.push(ListenerEntry {
            id: listener_id,
            capture,
            listener,
        });
        Ok(listener_id)
    }

    /// Adds a listener to the actor's normal (bubble-phase) list.
    pub fn add_listener(
        &mut self,
        id: ActorId,
        listener: impl EventListener + 'static,
    ) -> SceneResult<ListenerId> {
        self.push_listener(id, false, Rc::new(RefCell::new(listener)))
    }

    /// Adds a listener to the actor's capture-phase list.
    pub fn add_capture_listener(
        &mut self,
        id: ActorId,
        listener: impl EventListener + 'static,
    ) -> SceneResult<ListenerId> {
        self.push_listener(id, true, Rc::new(RefCell::new(listener)))
    }

    /// Adds an [`InputHandler`] to the normal list, wrapped in the
    /// local-coordinate adapter.
    pub fn add_input_listener(
        &mut self,
        id: ActorId,
        handler: impl InputHandler + 'static,
    ) -> SceneResult<ListenerId> {
        self.add_listener(id, InputAdapter(handler))
    }

    /// Removes a listener from either list. Returns true if it was found.
    ///
    /// Safe to call from inside a listener callback: dispatch in progress
    /// iterates a copy of the list.
    pub fn remove_listener(&mut self, id: ActorId, listener: ListenerId) -> SceneResult<bool> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        let before = slot.listeners.len();
        slot.listeners.retain(|e| e.id != listener);
        Ok(slot.listeners.len() != before)
    }

    /// Removes every listener from the actor.
    pub fn clear_listeners(&mut self, id: ActorId) -> SceneResult<()> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        slot.listeners.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    /// Fires an event at a target actor using the two-phase protocol.
    ///
    /// Capture phase: each ascendant's capture list, root first, then the
    /// target's own capture list. Bubble phase: the target's normal list,
    /// then — if the event still bubbles — each ascendant's normal list up
    /// to the root. After every per-actor notification the stopped flag is
    /// checked and propagation halts immediately if set.
    ///
    /// Returns the event's cancelled flag; firing does not interpret
    /// "handled" as cancellation.
    pub fn fire(&mut self, target: ActorId, event: &mut Event) -> SceneResult<bool> {
        if !self.slots.contains_key(&target) {
            return Err(SceneError::UnknownActor(target));
        }
        event.set_target(target);
        tracing::trace!(id = target.raw(), kind = ?event.kind(), "fire");

        // Snapshot the ascendant chain so listener-driven hierarchy mutation
        // cannot corrupt the walk. Nearest ancestor first.
        let mut chain = Vec::new();
        let mut cursor = self.actor(target)?.parent();
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.slots.get(&id).and_then(|s| s.actor.parent());
        }

        for &id in chain.iter().rev() {
            self.notify(id, event, true)?;
            if event.is_stopped() {
                return Ok(event.is_cancelled());
            }
        }
        self.notify(target, event, true)?;
        if event.is_stopped() {
            return Ok(event.is_cancelled());
        }

        self.notify(target, event, false)?;
        if !event.bubbles() || event.is_stopped() {
            return Ok(event.is_cancelled());
        }
        for &id in &chain {
            self.notify(id, event, false)?;
            if event.is_stopped() {
                return Ok(event.is_cancelled());
            }
        }
        Ok(event.is_cancelled())
    }

    /// Notifies one actor's capture or normal listener list.
    ///
    /// Iterates a copy of the list, so listeners may add or remove listeners
    /// (including themselves) mid-dispatch. Every listener in the copy runs;
    /// a stop takes effect between actors, not between listeners.
    pub fn notify(&mut self, id: ActorId, event: &mut Event, capture: bool) -> SceneResult<()> {
        let listeners: Vec<ListenerRef> = match self.slots.get(&id) {
            Some(slot) => slot
                .listeners
                .iter()
                .filter(|e| e.capture == capture)
                .map(|e| e.listener.clone())
                .collect(),
            None => return Ok(()),
        };
        if listeners.is_empty() {
            return Ok(());
        }
        event.set_current(id);
        event.set_capture(capture);
        for listener in listeners {
            let Ok(mut guard) = listener.try_borrow_mut() else {
                tracing::warn!(actor = id.raw(), "skipping re-entrant listener");
                continue;
            };
            match guard.handle(self, event) {
                Ok(true) => event.mark_handled(),
                Ok(false) => {}
                Err(source) => {
                    return Err(SceneError::Listener {
                        actor: self.debug_label(id),
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Actions and per-frame update
    // ------------------------------------------------------------------

    /// Attaches an action to an actor.
    pub fn add_action(&mut self, id: ActorId, action: impl Action + 'static) -> SceneResult<()> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        slot.actions.push(Box::new(action));
        Ok(())
    }

    /// Removes every action from the actor.
    pub fn clear_actions(&mut self, id: ActorId) -> SceneResult<()> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        slot.actions.clear();
        Ok(())
    }

    /// Returns true if the actor has attached actions.
    #[must_use]
    pub fn has_actions(&self, id: ActorId) -> bool {
        self.slots.get(&id).is_some_and(|s| !s.actions.is_empty())
    }

    fn collect_subtree(&self, id: ActorId) -> Vec<ActorId> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(slot) = self.slots.get(&next) {
                out.push(next);
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        out
    }

    /// Advances the whole attached tree by `delta` seconds: runs each
    /// actor's actions (completed ones are removed), then its behavior's
    /// `act`. Requests a render from the graphics service if any action ran
    /// and render-on-demand is enabled.
    pub fn act(&mut self, delta: f32) -> SceneResult<()> {
        self.time += delta;
        let ids = self.collect_subtree(self.root);
        let mut any_actions = false;

        for id in ids {
            let mut actions = match self.slots.get_mut(&id) {
                Some(slot) => std::mem::take(&mut slot.actions),
                None => continue, // destroyed during this pass
            };
            if !actions.is_empty() {
                any_actions = true;
            }

            let mut failure = None;
            let mut i = 0;
            while i < actions.len() {
                match actions[i].act(self, id, delta) {
                    Ok(true) => {
                        // Completed: remove without advancing, the next
                        // action shifted into this index.
                        actions.remove(i);
                    }
                    Ok(false) => i += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            // Surviving actions go back first, then anything queued from
            // inside a callback.
            if let Some(slot) = self.slots.get_mut(&id) {
                let queued = std::mem::take(&mut slot.actions);
                actions.extend(queued);
                slot.actions = actions;
            }
            if let Some(e) = failure {
                return Err(e);
            }

            if let Some(behavior) = self.behavior(id) {
                let mut guard = behavior
                    .try_borrow_mut()
                    .map_err(|_| SceneError::ReentrantAccess(id))?;
                guard.act(self, id, delta)?;
            }
        }

        if any_actions && self.render_on_demand {
            if let Some(graphics) = self.services.graphics.as_mut() {
                graphics.request_render();
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Marks one actor's cached layout stale without recomputing.
    pub fn invalidate(&mut self, id: ActorId) -> SceneResult<()> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SceneError::UnknownActor(id))?;
        slot.actor.flags.set(ActorFlags::LAYOUT_DIRTY);
        if let Some(behavior) = slot.behavior.clone() {
            if let Ok(mut guard) = behavior.try_borrow_mut() {
                guard.invalidated();
            }
        }
        Ok(())
    }

    /// Marks the actor and every ancestor up to the root stale. Each actor
    /// still recomputes independently, top-down, when reached by the next
    /// draw/measure pass.
    pub fn invalidate_hierarchy(&mut self, id: ActorId) -> SceneResult<()> {
        let mut cursor = Some(id);
        while let Some(next) = cursor {
            self.invalidate(next)?;
            cursor = self.actor(next)?.parent();
        }
        Ok(())
    }

    /// Runs the actor's `layout` if (and only if) its layout is stale, then
    /// clears the stale flag.
    pub fn validate(&mut self, id: ActorId) -> SceneResult<()> {
        let stale = self.actor(id)?.flags.has(ActorFlags::LAYOUT_DIRTY);
        if !stale {
            return Ok(());
        }
        self.actor_mut(id)?.flags.clear(ActorFlags::LAYOUT_DIRTY);
        if let Some(behavior) = self.behavior(id) {
            let mut guard = behavior
                .try_borrow_mut()
                .map_err(|_| SceneError::ReentrantAccess(id))?;
            tracing::trace!(actor = id.raw(), "layout");
            guard.layout(self, id)?;
        }
        Ok(())
    }

    /// Preferred size: the behavior's answer, or the actor's current size.
    pub fn pref_size(&mut self, id: ActorId) -> SceneResult<Vec2> {
        match self.behavior(id) {
            Some(behavior) => {
                let mut guard = behavior
                    .try_borrow_mut()
                    .map_err(|_| SceneError::ReentrantAccess(id))?;
                guard.pref_size(self, id)
            }
            None => {
                let actor = self.actor(id)?;
                Ok(Vec2::new(actor.width(), actor.height()))
            }
        }
    }

    /// Minimum size: the behavior's answer, or the preferred size.
    pub fn min_size(&mut self, id: ActorId) -> SceneResult<Vec2> {
        match self.behavior(id) {
            Some(behavior) => {
                let mut guard = behavior
                    .try_borrow_mut()
                    .map_err(|_| SceneError::ReentrantAccess(id))?;
                guard.min_size(self, id)
            }
            None => self.pref_size(id),
        }
    }

    /// Maximum size: the behavior's answer, or zero (no maximum).
    pub fn max_size(&mut self, id: ActorId) -> SceneResult<Vec2> {
        match self.behavior(id) {
            Some(behavior) => {
                let mut guard = behavior
                    .try_borrow_mut()
                    .map_err(|_| SceneError::ReentrantAccess(id))?;
                guard.max_size(self, id)
            }
            None => Ok(Vec2::ZERO),
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draws the attached tree in paint order (back to front).
    pub fn draw(&mut self, batch: &mut Batch) -> SceneResult<()> {
        let root = self.root;
        self.draw_actor(root, batch, 1.0)
    }

    fn draw_actor(&mut self, id: ActorId, batch: &mut Batch, parent_alpha: f32) -> SceneResult<()> {
        if !self.actor(id)?.is_visible() {
            return Ok(());
        }
        self.validate(id)?;
        let (transform, alpha) = {
            let actor = self.actor(id)?;
            (actor.local_transform(), parent_alpha * actor.color().a)
        };
        batch.push_transform(&transform);
        let result = match self.behavior(id) {
            Some(behavior) => match behavior.try_borrow_mut() {
                Ok(mut guard) => guard.draw(self, id, batch, alpha),
                Err(_) => Err(SceneError::ReentrantAccess(id)),
            },
            None => self.draw_children(id, batch, alpha),
        };
        batch.pop_transform();
        result
    }

    /// Draws an actor's children back to front (low index first).
    pub fn draw_children(
        &mut self,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        let children: Vec<ActorId> = self.children(id)?.to_vec();
        for child in children {
            if self.contains(child) {
                self.draw_actor(child, batch, parent_alpha)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hit testing and coordinates
    // ------------------------------------------------------------------

    /// Finds the frontmost actor at a stage-space point.
    ///
    /// With `touchable` set, touchability rules apply: a Disabled actor
    /// blocks its whole subtree, a ChildrenOnly actor exposes only its
    /// children.
    #[must_use]
    pub fn hit(&mut self, point: Vec2, touchable: bool) -> Option<ActorId> {
        let root = self.root;
        let local = self.slots.get(&root)?.actor.parent_to_local(point);
        self.hit_actor(root, local, touchable)
    }

    fn hit_actor(&mut self, id: ActorId, local: Vec2, touchable: bool) -> Option<ActorId> {
        {
            let slot = self.slots.get(&id)?;
            if touchable && slot.actor.touchable() == Touchable::Disabled {
                return None;
            }
            if !slot.actor.is_visible() {
                return None;
            }
        }
        match self.behavior(id) {
            Some(behavior) => {
                let mut guard = behavior.try_borrow_mut().ok()?;
                guard.hit(self, id, local.x, local.y, touchable)
            }
            None => self.default_hit(id, local.x, local.y, touchable),
        }
    }

    /// Default hit test: children front to back (high index first), then the
    /// actor's own `[0, width) × [0, height)` bounds.
    #[must_use]
    pub fn default_hit(
        &mut self,
        id: ActorId,
        x: f32,
        y: f32,
        touchable: bool,
    ) -> Option<ActorId> {
        let children: Vec<ActorId> = self.slots.get(&id)?.children.clone();
        for &child in children.iter().rev() {
            let Some(slot) = self.slots.get(&child) else {
                continue;
            };
            let local = slot.actor.parent_to_local(Vec2::new(x, y));
            if let Some(hit) = self.hit_actor(child, local, touchable) {
                return Some(hit);
            }
        }
        let actor = &self.slots.get(&id)?.actor;
        if touchable && actor.touchable() != Touchable::Enabled {
            return None;
        }
        if actor.bounds_contain(x, y) {
            Some(id)
        } else {
            None
        }
    }

    /// Converts a stage-space point into an actor's local space, composing
    /// through every ancestor transform.
    #[must_use]
    pub fn stage_to_local(&self, id: ActorId, point: Vec2) -> Vec2 {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(next) = cursor {
            chain.push(next);
            cursor = self.slots.get(&next).and_then(|s| s.actor.parent());
        }
        let mut p = point;
        for ancestor in chain.iter().rev() {
            if let Some(slot) = self.slots.get(ancestor) {
                p = slot.actor.parent_to_local(p);
            }
        }
        p
    }

    /// Converts an actor-local point into stage space.
    #[must_use]
    pub fn local_to_stage(&self, id: ActorId, point: Vec2) -> Vec2 {
        let mut p = point;
        let mut cursor = Some(id);
        while let Some(next) = cursor {
            match self.slots.get(&next) {
                Some(slot) => {
                    p = slot.actor.local_to_parent(p);
                    cursor = slot.actor.parent();
                }
                None => break,
            }
        }
        p
    }

    /// Converts a screen point to stage coordinates.
    #[must_use]
    pub fn screen_to_stage(&self, screen: Vec2) -> Vec2 {
        self.mapping.to_stage(screen)
    }

    /// Converts a stage point to screen coordinates.
    #[must_use]
    pub fn stage_to_screen(&self, stage: Vec2) -> Vec2 {
        self.mapping.to_screen(stage)
    }

    /// The pointer position in stage coordinates: the injected input
    /// service's answer if present, else the last position seen by the
    /// input entry points.
    #[must_use]
    pub fn pointer_position(&self) -> Vec2 {
        match &self.services.input {
            Some(input) => self.mapping.to_stage(input.pointer_position()),
            None => self.pointer_pos,
        }
    }

    // ------------------------------------------------------------------
    // Backend input entry points (screen coordinates)
    // ------------------------------------------------------------------

    /// Routes a pointer press: hit test, record touch focus, fire.
    /// Returns true if a listener claimed the event.
    pub fn touch_down(
        &mut self,
        screen: Vec2,
        pointer: u32,
        button: MouseButton,
    ) -> SceneResult<bool> {
        let point = self.mapping.to_stage(screen);
        self.pointer_pos = point;
        let target = self.hit(point, true).unwrap_or(self.root);
        self.touch_focus.insert(pointer, target);
        let mut event = Event::input(InputEvent::TouchDown {
            x: point.x,
            y: point.y,
            pointer,
            button,
        });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Routes a pointer drag to the actor holding the touch focus.
    pub fn touch_dragged(&mut self, screen: Vec2, pointer: u32) -> SceneResult<bool> {
        let point = self.mapping.to_stage(screen);
        self.pointer_pos = point;
        let Some(&target) = self.touch_focus.get(&pointer) else {
            return Ok(false);
        };
        if !self.contains(target) {
            self.touch_focus.remove(&pointer);
            return Ok(false);
        }
        let mut event = Event::input(InputEvent::TouchDragged {
            x: point.x,
            y: point.y,
            pointer,
        });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Routes a pointer release to the focus holder and clears the focus.
    pub fn touch_up(
        &mut self,
        screen: Vec2,
        pointer: u32,
        button: MouseButton,
    ) -> SceneResult<bool> {
        let point = self.mapping.to_stage(screen);
        self.pointer_pos = point;
        let Some(target) = self.touch_focus.remove(&pointer) else {
            return Ok(false);
        };
        if !self.contains(target) {
            return Ok(false);
        }
        let mut event = Event::input(InputEvent::TouchUp {
            x: point.x,
            y: point.y,
            pointer,
            button,
        });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Drops any touch focus held for the given actor (used by widgets that
    /// cancel an in-progress drag).
    pub fn cancel_touch_focus(&mut self, id: ActorId) {
        self.touch_focus.retain(|_, &mut target| target != id);
    }

    /// Routes a mouse move to the actor under the pointer.
    pub fn mouse_moved(&mut self, screen: Vec2) -> SceneResult<bool> {
        let point = self.mapping.to_stage(screen);
        self.pointer_pos = point;
        let target = self.hit(point, true).unwrap_or(self.root);
        let mut event = Event::input(InputEvent::MouseMoved {
            x: point.x,
            y: point.y,
        });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Routes a scroll-wheel turn to the actor under the pointer.
    pub fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> SceneResult<bool> {
        let point = self.pointer_pos;
        let target = self.hit(point, true).unwrap_or(self.root);
        let mut event = Event::input(InputEvent::Scrolled { amount_x, amount_y });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Sets the keyboard focus target; None routes keys to the root.
    pub fn set_key_focus(&mut self, id: Option<ActorId>) {
        self.key_focus = id;
    }

    /// The keyboard focus target.
    #[must_use]
    pub const fn key_focus(&self) -> Option<ActorId> {
        self.key_focus
    }

    fn key_target(&mut self) -> ActorId {
        match self.key_focus {
            Some(id) if self.contains(id) => id,
            _ => {
                self.key_focus = None;
                self.root
            }
        }
    }

    /// Routes a key press to the keyboard focus (or the root).
    pub fn key_down(&mut self, key: Key) -> SceneResult<bool> {
        let target = self.key_target();
        let mut event = Event::input(InputEvent::KeyDown { key });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Routes a key release to the keyboard focus (or the root).
    pub fn key_up(&mut self, key: Key) -> SceneResult<bool> {
        let target = self.key_target();
        let mut event = Event::input(InputEvent::KeyUp { key });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }

    /// Routes a typed character to the keyboard focus (or the root).
    pub fn key_typed(&mut self, ch: char) -> SceneResult<bool> {
        let target = self.key_target();
        let mut event = Event::input(InputEvent::KeyTyped { ch });
        self.fire(target, &mut event)?;
        Ok(event.is_handled())
    }
}
