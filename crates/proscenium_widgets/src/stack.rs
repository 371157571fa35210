//! Overlay layout: every child fills the whole bounds.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::{ActorId, SceneResult, Stage, Vec2, Widget};

#[derive(Debug, Clone, Copy)]
struct SizeCache {
    pref: Vec2,
    min: Vec2,
    max: Vec2,
}

/// Lays every child out to fill the stack's full bounds, back to front.
///
/// Preferred/min size is the max across children; max size is the min of the
/// children's positive max sizes (a child with no maximum does not
/// constrain). The computation is cached until the next invalidation.
pub struct Stack {
    actor: ActorId,
    cache: Option<SizeCache>,
}

impl Stack {
    /// Creates a stack actor. Add children through the stage.
    pub fn create(stage: &mut Stage) -> SceneResult<(ActorId, Rc<RefCell<Self>>)> {
        let actor = stage.new_actor();
        let stack = Rc::new(RefCell::new(Self { actor, cache: None }));
        stage.set_behavior(actor, stack.clone())?;
        Ok((actor, stack))
    }

    /// The stack's actor.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    fn compute(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<SizeCache> {
        if let Some(cache) = self.cache {
            return Ok(cache);
        }
        let mut pref = Vec2::ZERO;
        let mut min = Vec2::ZERO;
        let mut max = Vec2::ZERO;
        let children: Vec<ActorId> = stage.children(id)?.to_vec();
        for child in children {
            let child_pref = stage.pref_size(child)?;
            let child_min = stage.min_size(child)?;
            let child_max = stage.max_size(child)?;
            pref.x = pref.x.max(child_pref.x);
            pref.y = pref.y.max(child_pref.y);
            min.x = min.x.max(child_min.x);
            min.y = min.y.max(child_min.y);
            if child_max.x > 0.0 {
                max.x = if max.x > 0.0 { max.x.min(child_max.x) } else { child_max.x };
            }
            if child_max.y > 0.0 {
                max.y = if max.y > 0.0 { max.y.min(child_max.y) } else { child_max.y };
            }
        }
        let cache = SizeCache { pref, min, max };
        self.cache = Some(cache);
        Ok(cache)
    }
}

impl Widget for Stack {
    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        let (width, height) = {
            let actor = stage.actor(id)?;
            (actor.width(), actor.height())
        };
        let children: Vec<ActorId> = stage.children(id)?.to_vec();
        for child in children {
            stage.actor_mut(child)?.set_bounds(0.0, 0.0, width, height);
            stage.validate(child)?;
        }
        Ok(())
    }

    fn pref_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        Ok(self.compute(stage, id)?.pref)
    }

    fn min_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        Ok(self.compute(stage, id)?.min)
    }

    fn max_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        Ok(self.compute(stage, id)?.max)
    }

    fn invalidated(&mut self) {
        self.cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sized {
        pref: Vec2,
        min: Vec2,
        max: Vec2,
    }
    impl Widget for Sized {
        fn pref_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
            Ok(self.pref)
        }
        fn min_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
            Ok(self.min)
        }
        fn max_size(&mut self, _stage: &mut Stage, _id: ActorId) -> SceneResult<Vec2> {
            Ok(self.max)
        }
    }

    fn sized(stage: &mut Stage, pref: Vec2, min: Vec2, max: Vec2) -> ActorId {
        let id = stage.new_actor();
        stage
            .set_behavior(id, Rc::new(RefCell::new(Sized { pref, min, max })))
            .unwrap();
        id
    }

    #[test]
    fn test_sizes_aggregate() {
        let mut stage = Stage::new(200.0, 200.0);
        let (id, _stack) = Stack::create(&mut stage).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();

        let a = sized(
            &mut stage,
            Vec2::new(50.0, 10.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(100.0, 0.0),
        );
        let b = sized(
            &mut stage,
            Vec2::new(20.0, 40.0),
            Vec2::new(10.0, 2.0),
            Vec2::new(80.0, 90.0),
        );
        stage.add_child(id, a).unwrap();
        stage.add_child(id, b).unwrap();

        // Pref/min are the max across children, not the sum.
        assert_eq!(stage.pref_size(id).unwrap(), Vec2::new(50.0, 40.0));
        assert_eq!(stage.min_size(id).unwrap(), Vec2::new(10.0, 5.0));
        // Max is the min of positive maxes; a 0 (no-max) child does not
        // constrain.
        assert_eq!(stage.max_size(id).unwrap(), Vec2::new(80.0, 90.0));
    }

    #[test]
    fn test_cache_cleared_by_invalidate() {
        let mut stage = Stage::new(200.0, 200.0);
        let (id, _stack) = Stack::create(&mut stage).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();

        let a = sized(&mut stage, Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::ZERO);
        stage.add_child(id, a).unwrap();
        assert_eq!(stage.pref_size(id).unwrap().x, 10.0);

        // A newly added child changes the answer only after invalidation.
        let b = sized(&mut stage, Vec2::new(99.0, 10.0), Vec2::ZERO, Vec2::ZERO);
        stage.add_child(id, b).unwrap();
        assert_eq!(stage.pref_size(id).unwrap().x, 99.0, "add_child invalidated the stack");
    }

    #[test]
    fn test_children_fill_bounds() {
        let mut stage = Stage::new(200.0, 200.0);
        let (id, _stack) = Stack::create(&mut stage).unwrap();
        let root = stage.root();
        stage.add_child(root, id).unwrap();
        stage.actor_mut(id).unwrap().set_bounds(10.0, 10.0, 60.0, 30.0);

        let a = sized(&mut stage, Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::ZERO);
        stage.add_child(id, a).unwrap();
        stage.validate(id).unwrap();

        let actor = stage.actor(a).unwrap();
        assert_eq!((actor.x(), actor.y()), (0.0, 0.0));
        assert_eq!((actor.width(), actor.height()), (60.0, 30.0));
    }
}
