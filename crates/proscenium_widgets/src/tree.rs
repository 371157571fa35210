//! Hierarchical list with virtualized actor membership.
//!
//! A node's actor is present in the tree actor's child list if and only if
//! the node is "in the tree": it is a root, or its parent node is expanded
//! and itself in the tree. Membership changes are incremental — expanding
//! inserts a contiguous actor range immediately after the node's own actor,
//! collapsing removes that range — never a full re-flatten.
//!
//! Size accumulation, row positioning, drawing, row-at-y lookup, and range
//! selection all walk the same depth-first visible-row order
//! ([`Tree::visible_rows`]); a single traversal rule keeps them consistent
//! with each other and with z-order hit testing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use proscenium_scene::{
    ActorId, Batch, ClickListener, Color, Event, Rect, SceneError, SceneResult, Stage, Vec2,
    Widget,
};

use crate::selection::Selection;
use crate::style::TreeStyle;

/// Node identifier within one tree widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

struct Node<V> {
    value: V,
    actor: ActorId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    row_y: f32,
    row_height: f32,
}

/// A tree of values, each row backed by a caller-supplied actor.
pub struct Tree<V> {
    actor: ActorId,
    nodes: HashMap<NodeId, Node<V>>,
    roots: Vec<NodeId>,
    next_node: u64,
    style: TreeStyle,
    selection: Selection<NodeId>,
    over_node: Option<NodeId>,
    indent: f32,
    icon_spacing: f32,
    y_spacing: f32,
    padding: f32,
    pref: Option<Vec2>,
}

impl<V: 'static> Tree<V> {
    /// Creates a tree actor with a click listener for expand/select.
    pub fn create(stage: &mut Stage, style: TreeStyle) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let icon_w = style.plus.min_width.max(style.minus.min_width);
        let tree = Rc::new(RefCell::new(Self {
            actor,
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_node: 1,
            style,
            selection: Selection::new(),
            over_node: None,
            indent: icon_w + 4.0,
            icon_spacing: 2.0,
            y_spacing: 4.0,
            padding: 2.0,
            pref: None,
        }));
        stage.set_behavior(actor, tree.clone())?;

        let click_tree = tree.clone();
        stage.add_input_listener(
            actor,
            ClickListener::new(Box::new(move |stage: &mut Stage, _event: &mut Event| {
                // Mutate inside the borrow, fire after releasing it so Change
                // listeners can read the tree.
                let changed = {
                    let Ok(mut tree) = click_tree.try_borrow_mut() else {
                        return Ok(());
                    };
                    let local = stage.stage_to_local(tree.actor, stage.pointer_position());
                    tree.clicked(stage, local)?
                };
                if changed {
                    let mut event = Event::change();
                    stage.fire(actor, &mut event)?;
                }
                Ok(())
            })),
        )?;
        Ok((actor, tree))
    }

    /// The tree's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// The selection over node ids.
    #[must_use]
    pub const fn selection(&self) -> &Selection<NodeId> {
        &self.selection
    }

    /// Mutable access to the selection.
    pub fn selection_mut(&mut self) -> &mut Selection<NodeId> {
        &mut self.selection
    }

    /// The node under the pointer, refreshed every act step.
    #[must_use]
    pub const fn over_node(&self) -> Option<NodeId> {
        self.over_node
    }

    /// The node's value.
    pub fn value(&self, node: NodeId) -> SceneResult<&V> {
        self.nodes
            .get(&node)
            .map(|n| &n.value)
            .ok_or_else(|| SceneError::Widget(format!("unknown tree node {node:?}")))
    }

    /// The node's row actor.
    pub fn node_actor(&self, node: NodeId) -> SceneResult<ActorId> {
        self.nodes
            .get(&node)
            .map(|n| n.actor)
            .ok_or_else(|| SceneError::Widget(format!("unknown tree node {node:?}")))
    }

    /// The node's expanded flag.
    #[must_use]
    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.expanded)
    }

    /// The root nodes in order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// The node's children in order.
    #[must_use]
    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(&node).map_or(&[], |n| n.children.as_slice())
    }

    fn node(&self, id: NodeId) -> SceneResult<&Node<V>> {
        self.nodes
            .get(&id)
            .ok_or_else(|| SceneError::Widget(format!("unknown tree node {id:?}")))
    }

    /// Derived, never stored: a node is in the tree if it is a root, or its
    /// parent is expanded and itself in the tree.
    #[must_use]
    pub fn is_in_tree(&self, node: NodeId) -> bool {
        match self.nodes.get(&node).and_then(|n| n.parent) {
            None => self.nodes.contains_key(&node),
            Some(parent) => {
                self.nodes.get(&parent).is_some_and(|p| p.expanded) && self.is_in_tree(parent)
            }
        }
    }

    /// Visible actor count of a subtree; a collapsed subtree counts as 1.
    fn count_actors(&self, node: NodeId) -> usize {
        let Some(n) = self.nodes.get(&node) else {
            return 0;
        };
        let mut count = 1;
        if n.expanded {
            for &child in &n.children {
                count += self.count_actors(child);
            }
        }
        count
    }

    /// Inserts the subtree's visible actors at `index`, returning how many
    /// were inserted so callers can maintain index arithmetic.
    fn add_to_tree(&self, stage: &mut Stage, node: NodeId, index: usize) -> SceneResult<usize> {
        let n = self.node(node)?;
        stage.insert_child(self.actor, index, n.actor)?;
        let mut count = 1;
        if n.expanded {
            let children = n.children.clone();
            for child in children {
                count += self.add_to_tree(stage, child, index + count)?;
            }
        }
        Ok(count)
    }

    /// Removes the subtree's visible actors, returning how many were removed.
    fn remove_from_tree(&self, stage: &mut Stage, node: NodeId) -> SceneResult<usize> {
        let n = self.node(node)?;
        stage.remove_from_parent(n.actor)?;
        let mut count = 1;
        if n.expanded {
            let children = n.children.clone();
            for child in children {
                count += self.remove_from_tree(stage, child)?;
            }
        }
        Ok(count)
    }

    /// Appends a root node.
    pub fn add_root(&mut self, stage: &mut Stage, value: V, actor: ActorId) -> SceneResult<NodeId> {
        let index = self.roots.len();
        self.insert(stage, None, index, value, actor)
    }

    /// Appends a child node.
    pub fn add_child(
        &mut self,
        stage: &mut Stage,
        parent: NodeId,
        value: V,
        actor: ActorId,
    ) -> SceneResult<NodeId> {
        let index = self.node(parent)?.children.len();
        self.insert(stage, Some(parent), index, value, actor)
    }

    /// Inserts a node at `index` among the parent's children (or the roots).
    ///
    /// The actor-list insertion position is computed from the siblings: index
    /// 0 goes right after the parent's own actor (or at 0 for a root);
    /// otherwise right before the next sibling's actor, or right after the
    /// end of the previous sibling's visible subtree.
    pub fn insert(
        &mut self,
        stage: &mut Stage,
        parent: Option<NodeId>,
        index: usize,
        value: V,
        actor: ActorId,
    ) -> SceneResult<NodeId> {
        if let Some(p) = parent {
            self.node(p)?; // validate before any mutation
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let siblings = match parent {
            Some(p) => &self.node(p)?.children,
            None => &self.roots,
        };
        let index = index.min(siblings.len());

        // Will the new node be visible?
        let visible = match parent {
            None => true,
            Some(p) => self.node(p)?.expanded && self.is_in_tree(p),
        };
        let actor_index = if visible {
            Some(self.actor_insert_index(stage, parent, index)?)
        } else {
            None
        };

        self.nodes.insert(
            id,
            Node {
                value,
                actor,
                parent,
                children: Vec::new(),
                expanded: false,
                row_y: 0.0,
                row_height: 0.0,
            },
        );
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.insert(index, id);
                }
            }
            None => self.roots.insert(index, id),
        }
        if let Some(at) = actor_index {
            stage.insert_child(self.actor, at, actor)?;
        }
        self.pref = None;
        stage.invalidate_hierarchy(self.actor)?;
        Ok(id)
    }

    fn actor_insert_index(
        &self,
        stage: &Stage,
        parent: Option<NodeId>,
        index: usize,
    ) -> SceneResult<usize> {
        let group = stage.children(self.actor)?;
        let actor_pos = |actor: ActorId| group.iter().position(|&c| c == actor);

        let siblings = match parent {
            Some(p) => &self.node(p)?.children,
            None => &self.roots,
        };
        if index == 0 {
            return Ok(match parent {
                Some(p) => actor_pos(self.node(p)?.actor).map_or(0, |i| i + 1),
                None => 0,
            });
        }
        if index < siblings.len() {
            // Right before the next sibling's actor.
            let next = self.node(siblings[index])?;
            return Ok(actor_pos(next.actor).unwrap_or(group.len()));
        }
        // Right after the previous sibling's visible subtree.
        let prev = siblings[index - 1];
        let prev_actor = self.node(prev)?.actor;
        Ok(actor_pos(prev_actor).map_or(group.len(), |i| i + self.count_actors(prev)))
    }

    /// Removes a node and its whole subtree from the tree. Row actors are
    /// detached from the tree actor but stay alive for the caller.
    pub fn remove(&mut self, stage: &mut Stage, node: NodeId) -> SceneResult<()> {
        let parent = self.node(node)?.parent;
        if self.is_in_tree(node) {
            self.remove_from_tree(stage, node)?;
        }
        match parent {
            Some(p) => {
                if let Some(n) = self.nodes.get_mut(&p) {
                    n.children.retain(|&c| c != node);
                }
            }
            None => self.roots.retain(|&r| r != node),
        }

        // Drop the subtree's node entries and prune dangling references.
        let mut removed = Vec::new();
        let mut pending = vec![node];
        while let Some(next) = pending.pop() {
            if let Some(n) = self.nodes.remove(&next) {
                removed.push(next);
                pending.extend(n.children);
            }
        }
        self.selection.retain(|id| !removed.contains(id));
        if self.over_node.is_some_and(|o| removed.contains(&o)) {
            self.over_node = None;
        }
        self.pref = None;
        stage.invalidate_hierarchy(self.actor)?;
        Ok(())
    }

    /// Expands or collapses a node, incrementally inserting or removing the
    /// contiguous actor range of its children.
    pub fn set_expanded(&mut self, stage: &mut Stage, node: NodeId, expanded: bool) -> SceneResult<()> {
        if self.node(node)?.expanded == expanded {
            return Ok(());
        }
        let in_tree = self.is_in_tree(node);
        if expanded {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.expanded = true;
            }
            if in_tree {
                let group = stage.children(self.actor)?;
                let own_actor = self.node(node)?.actor;
                let own_index = group.iter().position(|&c| c == own_actor);
                if let Some(own_index) = own_index {
                    let mut at = own_index + 1;
                    let children = self.node(node)?.children.clone();
                    for child in children {
                        at += self.add_to_tree(stage, child, at)?;
                    }
                }
            }
        } else {
            if in_tree {
                let children = self.node(node)?.children.clone();
                for child in children {
                    self.remove_from_tree(stage, child)?;
                }
            }
            if let Some(n) = self.nodes.get_mut(&node) {
                n.expanded = false;
            }
        }
        self.pref = None;
        tracing::trace!(node = node.0, expanded, "tree node toggled");
        stage.invalidate_hierarchy(self.actor)?;
        Ok(())
    }

    /// The visible rows in draw order: depth-first, recursing only into
    /// expanded nodes. Every pass over rows shares this order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<(NodeId, u32)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, u32)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push((id, depth));
            if node.expanded {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        out
    }

    fn icon_width(&self) -> f32 {
        self.style.plus.min_width.max(self.style.minus.min_width)
    }

    fn icon_height(&self) -> f32 {
        self.style.plus.min_height.max(self.style.minus.min_height)
    }

    fn compute_size(&mut self, stage: &mut Stage) -> SceneResult<Vec2> {
        if let Some(pref) = self.pref {
            return Ok(pref);
        }
        let icon_w = self.icon_width();
        let icon_h = self.icon_height();
        let mut width = 0.0_f32;
        let mut height = 0.0_f32;
        let rows = self.visible_rows();
        for (index, &(id, depth)) in rows.iter().enumerate() {
            let actor = self.node(id)?.actor;
            let pref = stage.pref_size(actor)?;
            #[allow(clippy::cast_precision_loss)]
            let indent = self.indent * depth as f32;
            width = width.max(self.padding * 2.0 + indent + icon_w + self.icon_spacing + pref.x);
            let row_height = pref.y.max(icon_h);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.row_height = row_height;
            }
            height += row_height;
            if index + 1 < rows.len() {
                height += self.y_spacing;
            }
        }
        let pref = Vec2::new(width, height + self.padding * 2.0);
        self.pref = Some(pref);
        Ok(pref)
    }

    /// The visible node whose row span contains `y` (local coordinates).
    #[must_use]
    pub fn node_at_y(&self, y: f32) -> Option<NodeId> {
        for (id, _depth) in self.visible_rows() {
            let node = self.nodes.get(&id)?;
            if y >= node.row_y && y < node.row_y + node.row_height {
                return Some(id);
            }
        }
        None
    }

    /// Selects every visible node between `from` and `to` inclusive, in
    /// either order, walking the same visible-row order as layout and draw.
    pub fn select_range(&mut self, from: NodeId, to: NodeId) {
        let mut inside = false;
        for (id, _depth) in self.visible_rows() {
            let boundary = id == from || id == to;
            if inside || boundary {
                self.selection.add(id);
            }
            if boundary {
                if inside || from == to {
                    break;
                }
                inside = true;
            }
        }
    }

    /// Returns true if the selection changed (the caller fires the event).
    fn clicked(&mut self, stage: &mut Stage, local: Vec2) -> SceneResult<bool> {
        let Some(id) = self.node_at_y(local.y) else {
            return Ok(false);
        };
        let depth = self
            .visible_rows()
            .iter()
            .find(|(row, _)| *row == id)
            .map_or(0, |&(_, d)| d);
        #[allow(clippy::cast_precision_loss)]
        let icon_end = self.padding + self.indent * depth as f32 + self.icon_width();
        let has_children = !self.node(id)?.children.is_empty();
        if has_children && local.x < icon_end {
            let expanded = self.node(id)?.expanded;
            self.set_expanded(stage, id, !expanded)?;
            return Ok(false);
        }
        Ok(self.selection.choose(id))
    }
}

impl<V: 'static> Widget for Tree<V> {
    fn act(&mut self, stage: &mut Stage, id: ActorId, _delta: f32) -> SceneResult<()> {
        // Hover tracking via the injected pointer-position query.
        let pointer = stage.pointer_position();
        let local = stage.stage_to_local(id, pointer);
        self.over_node = if stage.actor(id)?.bounds_contain(local.x, local.y) {
            self.node_at_y(local.y)
        } else {
            None
        };
        Ok(())
    }

    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        self.compute_size(stage)?;
        let height = stage.actor(id)?.height();
        let icon_w = self.icon_width();
        let mut y = height - self.padding;
        let rows = self.visible_rows();
        for (row, depth) in rows {
            let (actor, row_height) = {
                let node = self.node(row)?;
                (node.actor, node.row_height)
            };
            y -= row_height;
            #[allow(clippy::cast_precision_loss)]
            let x = self.padding + self.indent * depth as f32 + icon_w + self.icon_spacing;
            let pref = stage.pref_size(actor)?;
            let actor_y = y + (row_height - pref.y) / 2.0;
            stage.actor_mut(actor)?.set_bounds(x, actor_y, pref.x, pref.y);
            stage.validate(actor)?;
            if let Some(node) = self.nodes.get_mut(&row) {
                node.row_y = y;
            }
            y -= self.y_spacing;
        }
        Ok(())
    }

    fn pref_size(&mut self, stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
        self.compute_size(stage)
    }

    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        let (width, tint) = {
            let actor = stage.actor(id)?;
            let c = actor.color();
            (actor.width(), Color::rgba(c.r, c.g, c.b, parent_alpha))
        };
        for (row, depth) in self.visible_rows() {
            let node = self.node(row)?;
            let row_rect = Rect::new(0.0, node.row_y, width, node.row_height);
            if self.selection.contains(&row) {
                if let Some(selection) = &self.style.selection {
                    selection.draw(batch, row_rect, tint);
                }
            } else if self.over_node == Some(row) {
                if let Some(over) = &self.style.over {
                    over.draw(batch, row_rect, tint);
                }
            }
            if !node.children.is_empty() {
                let icon = if node.expanded {
                    &self.style.minus
                } else {
                    &self.style.plus
                };
                #[allow(clippy::cast_precision_loss)]
                let icon_x = self.padding + self.indent * depth as f32;
                let icon_y = node.row_y + (node.row_height - icon.min_height) / 2.0;
                icon.draw(
                    batch,
                    Rect::new(icon_x, icon_y, icon.min_width, icon.min_height),
                    tint,
                );
            }
        }
        stage.draw_children(id, batch, parent_alpha)
    }

    fn invalidated(&mut self) {
        self.pref = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_actor(stage: &mut Stage, w: f32, h: f32) -> ActorId {
        let id = stage.new_actor();
        stage.actor_mut(id).unwrap().set_size(w, h);
        id
    }

    fn tree_fixture(stage: &mut Stage) -> (ActorId, Rc<RefCell<Tree<&'static str>>>) {
        let (id, tree) = Tree::create(stage, TreeStyle::default()).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        (id, tree)
    }

    /// Recomputes the expected in-tree actor set from first principles.
    fn expected_actors(tree: &Tree<&'static str>) -> Vec<ActorId> {
        tree.visible_rows()
            .into_iter()
            .map(|(id, _)| tree.node_actor(id).unwrap())
            .collect()
    }

    fn assert_membership(stage: &Stage, id: ActorId, tree: &Tree<&'static str>) {
        let actual = stage.children(id).unwrap();
        let expected = expected_actors(tree);
        assert_eq!(actual, expected.as_slice(), "group children must equal the visible DFS order");
        // And the invariant proper: every node's actor present iff in-tree.
        for &node in tree.nodes.keys() {
            let present = actual.contains(&tree.node_actor(node).unwrap());
            assert_eq!(present, tree.is_in_tree(node), "in-tree invariant for {node:?}");
        }
    }

    #[test]
    fn test_in_tree_invariant_through_operations() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, tree) = tree_fixture(&mut stage);

        let actors: Vec<ActorId> = (0..7).map(|_| row_actor(&mut stage, 40.0, 16.0)).collect();
        let mut t = tree.borrow_mut();
        let r0 = t.add_root(&mut stage, "r0", actors[0]).unwrap();
        let r1 = t.add_root(&mut stage, "r1", actors[1]).unwrap();
        let a = t.add_child(&mut stage, r0, "a", actors[2]).unwrap();
        let b = t.add_child(&mut stage, r0, "b", actors[3]).unwrap();
        let a1 = t.add_child(&mut stage, a, "a1", actors[4]).unwrap();
        assert_membership(&stage, id, &t);
        assert_eq!(stage.children(id).unwrap().len(), 2, "collapsed roots only");

        t.set_expanded(&mut stage, r0, true).unwrap();
        assert_membership(&stage, id, &t);
        assert_eq!(stage.children(id).unwrap().len(), 4, "r0, a, b, r1");

        t.set_expanded(&mut stage, a, true).unwrap();
        assert_membership(&stage, id, &t);
        assert_eq!(stage.children(id).unwrap().len(), 5);

        // Collapse r0: the whole contiguous range [a, a1, b] disappears while
        // the grandchild's expanded flag is preserved.
        t.set_expanded(&mut stage, r0, false).unwrap();
        assert_membership(&stage, id, &t);
        assert!(t.is_expanded(a), "collapse must not clear descendant flags");
        assert!(!t.is_in_tree(a1));

        // Re-expanding restores the already-expanded grandchild's range too.
        t.set_expanded(&mut stage, r0, true).unwrap();
        assert_membership(&stage, id, &t);
        assert!(t.is_in_tree(a1));

        t.remove(&mut stage, a).unwrap();
        assert_membership(&stage, id, &t);
        assert!(t.value(a1).is_err(), "subtree entries dropped");
        let _ = (b, r1);
    }

    #[test]
    fn test_insert_index_arithmetic_with_collapsed_sibling() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, tree) = tree_fixture(&mut stage);
        let mut t = tree.borrow_mut();

        let ra = row_actor(&mut stage, 40.0, 16.0);
        let rb = row_actor(&mut stage, 40.0, 16.0);
        let r0 = t.add_root(&mut stage, "r0", ra).unwrap();
        // r0 has two children but stays collapsed: its subtree counts as 1.
        let c0 = row_actor(&mut stage, 40.0, 16.0);
        let c1 = row_actor(&mut stage, 40.0, 16.0);
        t.add_child(&mut stage, r0, "c0", c0).unwrap();
        t.add_child(&mut stage, r0, "c1", c1).unwrap();

        let r1 = t.add_root(&mut stage, "r1", rb).unwrap();
        assert_eq!(stage.children(id).unwrap(), &[ra, rb]);

        // Insert between the collapsed r0 and r1: lands right after r0's
        // single visible actor.
        let rm = row_actor(&mut stage, 40.0, 16.0);
        let mid = t.insert(&mut stage, None, 1, "mid", rm).unwrap();
        assert_eq!(stage.children(id).unwrap(), &[ra, rm, rb]);

        // Expanding r0 inserts its children right after r0's actor.
        t.set_expanded(&mut stage, r0, true).unwrap();
        assert_eq!(stage.children(id).unwrap(), &[ra, c0, c1, rm, rb]);

        // Insert a child of r0 at index 0: right after the parent's actor.
        let cf = row_actor(&mut stage, 40.0, 16.0);
        t.insert(&mut stage, Some(r0), 0, "cf", cf).unwrap();
        assert_eq!(stage.children(id).unwrap(), &[ra, cf, c0, c1, rm, rb]);
        let _ = (mid, r1);
    }

    #[test]
    fn test_layout_rows_consistent_with_node_at_y() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, tree) = tree_fixture(&mut stage);
        {
            let mut t = tree.borrow_mut();
            let actors: Vec<ActorId> = (0..4).map(|_| row_actor(&mut stage, 60.0, 16.0)).collect();
            let r0 = t.add_root(&mut stage, "r0", actors[0]).unwrap();
            t.add_child(&mut stage, r0, "a", actors[1]).unwrap();
            t.add_child(&mut stage, r0, "b", actors[2]).unwrap();
            t.add_root(&mut stage, "r1", actors[3]).unwrap();
            t.set_expanded(&mut stage, r0, true).unwrap();
        }
        let pref = stage.pref_size(id).unwrap();
        stage.actor_mut(id).unwrap().set_size(pref.x, pref.y);
        stage.validate(id).unwrap();

        let t = tree.borrow();
        let rows = t.visible_rows();
        assert_eq!(rows.len(), 4);
        for &(node, _) in &rows {
            let n = t.node(node).unwrap();
            assert_eq!(
                t.node_at_y(n.row_y + n.row_height / 2.0),
                Some(node),
                "row lookup agrees with layout"
            );
            // The row actor sits inside its row span.
            let actor = stage.actor(t.node_actor(node).unwrap()).unwrap();
            assert!(actor.y() >= n.row_y - 1e-3);
            assert!(actor.y() + actor.height() <= n.row_y + n.row_height + 1e-3);
        }
        // Rows descend from the top, in visible order.
        for pair in rows.windows(2) {
            let first = t.node(pair[0].0).unwrap();
            let second = t.node(pair[1].0).unwrap();
            assert!(first.row_y > second.row_y);
        }
    }

    #[test]
    fn test_pref_size_accumulates_rows() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, tree) = tree_fixture(&mut stage);
        {
            let mut t = tree.borrow_mut();
            let a = row_actor(&mut stage, 100.0, 16.0);
            let b = row_actor(&mut stage, 50.0, 20.0);
            let r0 = t.add_root(&mut stage, "r0", a).unwrap();
            t.add_child(&mut stage, r0, "b", b).unwrap();
            t.set_expanded(&mut stage, r0, true).unwrap();
        }
        let pref = stage.pref_size(id).unwrap();
        let t = tree.borrow();
        // Heights: rows 16 and 20 (both ≥ icon height 12), one spacing.
        assert!((pref.y - (16.0 + 20.0 + t.y_spacing + t.padding * 2.0)).abs() < 1e-3);
        // Width: the deeper, narrower row is indented one level.
        let icon_w = t.icon_width();
        let row0 = t.padding * 2.0 + icon_w + t.icon_spacing + 100.0;
        let row1 = t.padding * 2.0 + t.indent + icon_w + t.icon_spacing + 50.0;
        assert!((pref.x - row0.max(row1)).abs() < 1e-3);
    }

    #[test]
    fn test_select_range_walks_visible_order_only() {
        let mut stage = Stage::new(400.0, 400.0);
        let (_id, tree) = tree_fixture(&mut stage);
        let mut t = tree.borrow_mut();
        t.selection_mut().set_multiple(true);

        let actors: Vec<ActorId> = (0..5).map(|_| row_actor(&mut stage, 40.0, 16.0)).collect();
        let r0 = t.add_root(&mut stage, "r0", actors[0]).unwrap();
        let hidden = t.add_child(&mut stage, r0, "hidden", actors[1]).unwrap();
        let r1 = t.add_root(&mut stage, "r1", actors[2]).unwrap();
        let shown = t.add_child(&mut stage, r1, "shown", actors[3]).unwrap();
        let r2 = t.add_root(&mut stage, "r2", actors[4]).unwrap();
        t.set_expanded(&mut stage, r1, true).unwrap();

        // Range r0..r2 in reverse order: collapsed r0's child is skipped,
        // expanded r1's child is included.
        t.select_range(r2, r0);
        assert!(t.selection().contains(&r0));
        assert!(t.selection().contains(&r1));
        assert!(t.selection().contains(&shown));
        assert!(t.selection().contains(&r2));
        assert!(!t.selection().contains(&hidden));
    }

    #[test]
    fn test_click_toggles_icon_and_selects_row() {
        let mut stage = Stage::new(400.0, 400.0);
        let (id, tree) = tree_fixture(&mut stage);
        let r0 = {
            let mut t = tree.borrow_mut();
            let a = row_actor(&mut stage, 60.0, 16.0);
            let b = row_actor(&mut stage, 60.0, 16.0);
            let r0 = t.add_root(&mut stage, "r0", a).unwrap();
            t.add_child(&mut stage, r0, "child", b).unwrap();
            r0
        };
        let pref = stage.pref_size(id).unwrap();
        stage
            .actor_mut(id)
            .unwrap()
            .set_bounds(0.0, 0.0, pref.x.max(120.0), pref.y.max(40.0));
        stage.validate(id).unwrap();

        let (row_y, row_h, icon_end) = {
            let t = tree.borrow();
            let n = t.node(r0).unwrap();
            (n.row_y, n.row_height, t.padding + t.icon_width())
        };
        let to_screen = |p: Vec2| Vec2::new(p.x, 400.0 - p.y);

        // Click on the expand icon zone.
        let icon_point = Vec2::new(icon_end - 1.0, row_y + row_h / 2.0);
        stage
            .touch_down(to_screen(icon_point), 0, proscenium_scene::MouseButton::Left)
            .unwrap();
        stage
            .touch_up(to_screen(icon_point), 0, proscenium_scene::MouseButton::Left)
            .unwrap();
        assert!(tree.borrow().is_expanded(r0), "icon click toggles expansion");

        // Click on the row body selects.
        let body_point = Vec2::new(icon_end + 20.0, row_y + row_h / 2.0);
        stage
            .touch_down(to_screen(body_point), 0, proscenium_scene::MouseButton::Left)
            .unwrap();
        stage
            .touch_up(to_screen(body_point), 0, proscenium_scene::MouseButton::Left)
            .unwrap();
        assert!(tree.borrow().selection().contains(&r0));
    }
}
