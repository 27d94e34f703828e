use std::fmt;

use super::{ClickHandler, KeyListener, Mounted, Node, Timer, TransitionHandler};

/// Handle to an element owned by a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an installed keydown listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Overflow behavior of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    /// Always reserves room for a scrollbar.
    Scroll,
}

/// Layout inputs supplied by whoever lays the document out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    /// Content-box width.
    pub width: u32,
    /// Full height of the content, including the part scrolled out of view.
    pub scroll_height: u32,
    /// Visible height.
    pub client_height: u32,
}

/// Measured box metrics of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub scroll_height: u32,
    pub client_height: u32,
    /// Width including a reserved scrollbar.
    pub offset_width: u32,
    /// Width available to content.
    pub client_width: u32,
}

/// Capability surface a modal needs from its host document.
///
/// Implementations own every element. Handlers registered here are invoked
/// by the implementation's own dispatch code, never from inside one of
/// these methods, so callers may hold other borrows while calling them.
pub trait Host {
    /// The document body, where modals mount their backdrop.
    fn body(&self) -> ElementId;

    /// The document root element (parent of the body).
    fn root(&self) -> ElementId;

    /// Whether the element is still alive.
    fn contains(&self, element: ElementId) -> bool;

    /// Materialize a node tree and append it to `parent`.
    fn mount(&mut self, parent: ElementId, node: &Node) -> Mounted;

    /// Detach and discard an element and all of its descendants.
    fn remove(&mut self, element: ElementId);

    /// Replace an element's children with raw markup.
    fn set_markup(&mut self, element: ElementId, markup: &str);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Inline right padding override, if any.
    fn padding_right(&self, element: ElementId) -> Option<u32>;

    fn set_padding_right(&mut self, element: ElementId, padding: Option<u32>);

    fn metrics(&self, element: ElementId) -> Metrics;

    /// Whether a transition of `property` is running on the element or on
    /// one of its descendants.
    fn is_transitioning(&self, element: ElementId, property: &str) -> bool;

    /// A fresh copy of a registered template's content.
    fn template(&self, id: &str) -> Option<Node>;

    fn add_key_listener(&mut self, listener: KeyListener) -> ListenerId;

    fn remove_key_listener(&mut self, id: ListenerId);

    /// Replace the element's click handler.
    fn set_on_click(&mut self, element: ElementId, handler: Option<ClickHandler>);

    /// Replace the element's transition-end handler.
    fn set_on_transition_end(&mut self, element: ElementId, handler: Option<TransitionHandler>);

    /// Run `timer` on the next tick, after the current call stack unwinds.
    fn set_timeout(&mut self, timer: Timer);
}
