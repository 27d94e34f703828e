//! Events delivered by the host and the handler shapes that receive them.

use std::rc::Rc;

use crossterm::event::KeyEvent;

use super::ElementId;

/// A click that bubbles from `target` up to the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Deepest element under the pointer.
    pub target: ElementId,
    /// Element whose handler is currently running.
    pub current_target: ElementId,
}

/// Completion of a CSS-like transition. Bubbles like a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Element whose property finished transitioning.
    pub target: ElementId,
    /// Transitioned property, e.g. `transform` or `opacity`.
    pub property_name: String,
}

/// Document-level keydown listener.
pub type KeyListener = Rc<dyn Fn(&KeyEvent)>;

/// Per-element click handler. An element holds at most one.
pub type ClickHandler = Rc<dyn Fn(&ClickEvent)>;

/// Per-element transition-end handler. An element holds at most one.
pub type TransitionHandler = Rc<dyn Fn(&TransitionEvent)>;

/// Deferred callback run on the next host tick.
pub type Timer = Box<dyn FnOnce()>;
