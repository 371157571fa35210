//! Per-frame actions attached to actors.
//!
//! Every frame the stage runs each attached action once; an action that
//! reports completion is removed from the actor's list. Tween/interpolation
//! libraries are out of scope; integrators bring their own `Action` impls.

use crate::actor::ActorId;
use crate::error::SceneResult;
use crate::stage::Stage;

/// A unit of per-frame work attached to an actor.
pub trait Action {
    /// Advances the action by `delta` seconds. Returns true when complete;
    /// completed actions are removed from the actor's list.
    fn act(&mut self, stage: &mut Stage, id: ActorId, delta: f32) -> SceneResult<bool>;
}

/// Adapts a closure to [`Action`].
pub struct ActionFn<F>(pub F);

impl<F> Action for ActionFn<F>
where
    F: FnMut(&mut Stage, ActorId, f32) -> SceneResult<bool>,
{
    fn act(&mut self, stage: &mut Stage, id: ActorId, delta: f32) -> SceneResult<bool> {
        (self.0)(stage, id, delta)
    }
}
