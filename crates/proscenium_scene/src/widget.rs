//! The widget behavior contract.
//!
//! A widget is per-actor state behind this trait, attached to an actor slot.
//! Shared behavior is composed out of the stage's helpers (child drawing,
//! default hit testing) instead of inherited.
//!
//! # Layout contract
//!
//! `layout` recomputes cached sizes and positions children; it runs only when
//! the actor's layout is marked stale, via [`Stage::validate`]. `invalidate`
//! marks state stale without recomputing; a change that can affect an
//! ancestor's preferred size propagates with
//! [`Stage::invalidate_hierarchy`]. A parent that resizes or repositions a
//! layout-aware child must validate that child afterwards so nested widgets
//! recompute before being drawn or measured.

use crate::actor::ActorId;
use crate::batch::Batch;
use crate::error::SceneResult;
use crate::geom::Vec2;
use crate::stage::Stage;

/// Behavior attached to an actor: per-frame work, layout negotiation,
/// drawing, and hit testing.
///
/// Every method receives the owning stage and the actor id the behavior is
/// attached to. Defaults give a plain group actor: children drawn back to
/// front, hit-tested front to back, preferred size = current size, no
/// maximum.
#[allow(unused_variables)]
pub trait Widget: 'static {
    /// Per-frame update, after the actor's actions ran.
    fn act(&mut self, stage: &mut Stage, id: ActorId, delta: f32) -> SceneResult<()> {
        Ok(())
    }

    /// Recomputes cached sizes and positions children. Runs only while the
    /// actor's layout is stale; see [`Stage::validate`].
    fn layout(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<()> {
        Ok(())
    }

    /// Preferred size.
    fn pref_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        let actor = stage.actor(id)?;
        Ok(Vec2::new(actor.width(), actor.height()))
    }

    /// Minimum size.
    fn min_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        self.pref_size(stage, id)
    }

    /// Maximum size; zero on an axis means "no maximum".
    fn max_size(&mut self, stage: &mut Stage, id: ActorId) -> SceneResult<Vec2> {
        Ok(Vec2::ZERO)
    }

    /// Draws the actor. The batch transform is already in local space;
    /// implementations that draw children call [`Stage::draw_children`].
    fn draw(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        batch: &mut Batch,
        parent_alpha: f32,
    ) -> SceneResult<()> {
        stage.draw_children(id, batch, parent_alpha)
    }

    /// Hit-tests a point in local coordinates. The default checks children
    /// front to back, then the actor's own bounds.
    fn hit(
        &mut self,
        stage: &mut Stage,
        id: ActorId,
        x: f32,
        y: f32,
        touchable: bool,
    ) -> Option<ActorId> {
        stage.default_hit(id, x, y, touchable)
    }

    /// Cached layout state was marked stale; drop derived caches.
    fn invalidated(&mut self) {}
}
