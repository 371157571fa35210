//! # PROSCENIUM Widgets
//!
//! Composite widgets built on the scene core's actor/event/layout contract:
//! single- and multi-child sizing boxes, the scroll pane state machine, the
//! virtualized tree, the split pane, lists and select boxes, and the button
//! group policy.
//!
//! ## Design Rules
//!
//! - Widgets are state structs behind the scene `Widget` trait; shared
//!   behavior is composed from stage helpers and free functions, never
//!   inherited
//! - Styles are immutable values pulled at construction time
//! - Feel tuning is data: a TOML-loadable config parsed once at startup

pub mod align;
pub mod button;
pub mod config;
pub mod container;
pub mod drawable;
pub mod list;
pub mod scroll;
pub mod select;
pub mod selection;
pub mod split;
pub mod stack;
pub mod style;
pub mod tree;
pub mod value;

pub use align::Align;
pub use button::{button_background, Button, ButtonGroup};
pub use config::ScrollTuning;
pub use container::Container;
pub use drawable::{Drawable, DrawableKind};
pub use list::List;
pub use scroll::ScrollPane;
pub use select::SelectBox;
pub use selection::Selection;
pub use split::SplitPane;
pub use stack::Stack;
pub use style::{
    ButtonStyle, ListStyle, ScrollPaneStyle, SelectBoxStyle, SplitPaneStyle, TextMetrics,
    TreeStyle,
};
pub use tree::{NodeId, Tree};
pub use value::Value;
