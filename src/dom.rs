//! Host document capability surface.
//!
//! Modals never touch a rendering surface directly. They describe the
//! subtree they want as a [`Node`] tree, ask a [`Host`] to mount it, and then
//! talk to the mounted elements through [`ElementId`] handles:
//! - [`Host`] - the capability trait (elements, classes, style, metrics,
//!   templates, listeners, timers)
//! - [`Document`] - in-memory host used by the terminal renderer and tests
//! - [`Node`] - immutable node-tree descriptor produced by pure builders

mod document;
mod event;
mod host;
mod node;

pub use document::{Document, TransitionRule};
pub use event::{ClickEvent, ClickHandler, KeyListener, Timer, TransitionEvent, TransitionHandler};
pub use host::{ElementId, Host, Layout, ListenerId, Metrics, Overflow};
pub use node::{Mounted, Node, NodeKey, Tag};

/// CSS property name reported by transform transitions.
pub const TRANSFORM: &str = "transform";

/// CSS property name reported by opacity transitions.
pub const OPACITY: &str = "opacity";
