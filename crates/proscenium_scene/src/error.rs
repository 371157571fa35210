//! Error types for the scene graph.
//!
//! Contract violations are rejected before any mutation occurs; listener
//! failures get the offending actor's identity attached before propagating.

use thiserror::Error;

use crate::actor::ActorId;

/// Errors that can occur in the scene graph.
#[derive(Error, Debug)]
pub enum SceneError {
    /// An operation referenced an actor id that is not in the stage.
    #[error("unknown actor: {0:?}")]
    UnknownActor(ActorId),

    /// An operation required a parent but the actor is detached.
    #[error("actor {0:?} is not attached to a parent")]
    Detached(ActorId),

    /// Adding the child would make an actor its own ancestor.
    #[error("actor {child:?} is an ancestor of {parent:?}, adding it would create a cycle")]
    WouldCycle {
        /// The actor being added.
        child: ActorId,
        /// The intended parent.
        parent: ActorId,
    },

    /// A widget or listener was entered again while already borrowed.
    #[error("re-entrant access to actor {0:?}")]
    ReentrantAccess(ActorId),

    /// A listener callback failed; the actor it was attached to is named.
    #[error("listener failure on actor `{actor}`")]
    Listener {
        /// Debug name (or id) of the actor whose listener failed.
        actor: String,
        /// The underlying failure.
        #[source]
        source: Box<SceneError>,
    },

    /// A widget callback reported a failure.
    #[error("widget failure: {0}")]
    Widget(String),

    /// Invalid tuning/configuration data.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
