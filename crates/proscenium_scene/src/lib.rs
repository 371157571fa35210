//! # PROSCENIUM Scene Core
//!
//! A 2D scene graph for retained-mode UI: an actor arena with hierarchical
//! transforms, two-phase event propagation (capture + bubble), a pref/min/max
//! layout contract with deferred re-layout, and a render command batch
//! consumed by an external backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       FRAME PIPELINE                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  Input Events → Fire (capture+bubble) → Act → Validate → │
//! │       ↓               ↓                   ↓       ↓      │
//! │  Hit Testing    Listener Lists        Actions   Layout   │
//! │                                                   ↓      │
//! │                                            Draw Commands │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Rules
//!
//! - One logical thread per frame: no locks, no async, no timers
//! - Listener lists tolerate mutation from inside a callback
//! - Contract violations surface immediately as errors, never as silent
//!   corruption

pub mod action;
pub mod actor;
pub mod batch;
pub mod color;
pub mod error;
pub mod event;
pub mod geom;
pub mod listener;
pub mod services;
pub mod stage;
pub mod widget;

pub use action::{Action, ActionFn};
pub use actor::{Actor, ActorFlags, ActorId, Touchable};
pub use batch::{Batch, RenderCommand, Vertex};
pub use color::Color;
pub use error::{SceneError, SceneResult};
pub use event::{Event, EventKind, InputEvent, Key, MouseButton};
pub use listener::{
    ClickListener, EventListener, FnListener, GestureListener, InputAdapter, InputHandler,
    ListenerId, VelocityTracker,
};
pub use geom::{Rect, Transform2, Vec2};
pub use services::{GraphicsService, InputService, ScreenMapping, Services};
pub use stage::Stage;
pub use widget::Widget;
