//! In-memory host document.
//!
//! [`Document`] keeps an element arena, fires transitions declared through
//! [`TransitionRule`]s, runs deferred timers, and delivers key, click and
//! transition-end events. Dispatch functions take the shared
//! `Rc<RefCell<Document>>` and release the borrow before invoking a handler,
//! so handlers are free to mutate the document again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::KeyEvent;
use tracing::{trace, warn};

use super::{
    ClickEvent, ClickHandler, ElementId, Host, KeyListener, Layout, ListenerId, Metrics, Mounted,
    Node, Overflow, Tag, Timer, TransitionEvent, TransitionHandler,
};

/// Upper bound on ticks spent by [`Document::run_until_idle`].
const MAX_IDLE_TICKS: usize = 256;

/// Declares that toggling a class starts a transition.
///
/// This stands in for a stylesheet: when `trigger` is added to or removed
/// from an element, `property` starts transitioning on that element (or on
/// its descendants carrying `target`) and completes after `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub trigger: String,
    pub target: Option<String>,
    pub property: String,
    pub duration: Duration,
}

impl TransitionRule {
    pub fn new(trigger: impl Into<String>, property: impl Into<String>, duration: Duration) -> Self {
        Self {
            trigger: trigger.into(),
            target: None,
            property: property.into(),
            duration,
        }
    }

    /// Transition descendants with `class` instead of the toggled element.
    #[must_use]
    pub fn on_descendant(mut self, class: impl Into<String>) -> Self {
        self.target = Some(class.into());
        self
    }
}

struct Element {
    tag: Tag,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    markup: Option<String>,
    overflow: Overflow,
    padding_right: Option<u32>,
    layout: Layout,
    on_click: Option<ClickHandler>,
    on_transition_end: Option<TransitionHandler>,
}

impl Element {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            markup: None,
            overflow: Overflow::Visible,
            padding_right: None,
            layout: Layout::default(),
            on_click: None,
            on_transition_end: None,
        }
    }

    fn from_node(node: &Node) -> Self {
        let mut element = Self::new(node.tag);
        element.classes.clone_from(&node.classes);
        element.markup.clone_from(&node.markup);
        element.overflow = node.overflow;
        element
    }
}

struct Running {
    element: ElementId,
    property: String,
    remaining: Duration,
}

/// In-memory [`Host`] implementation.
pub struct Document {
    elements: HashMap<ElementId, Element>,
    next_element: u64,
    root: ElementId,
    body: ElementId,
    templates: HashMap<String, Node>,
    key_listeners: Vec<(ListenerId, KeyListener)>,
    next_listener: u64,
    timers: Vec<Timer>,
    rules: Vec<TransitionRule>,
    running: Vec<Running>,
    scrollbar_width: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a root and a body.
    ///
    /// Scrollbars are one unit wide, which matches a terminal column.
    pub fn new() -> Self {
        let mut document = Self {
            elements: HashMap::new(),
            next_element: 0,
            root: ElementId(0),
            body: ElementId(0),
            templates: HashMap::new(),
            key_listeners: Vec::new(),
            next_listener: 0,
            timers: Vec::new(),
            rules: Vec::new(),
            running: Vec::new(),
            scrollbar_width: 1,
        };
        document.root = document.alloc(Element::new(Tag::Div));
        document.body = document.alloc(Element::new(Tag::Div));
        document.attach(document.root, document.body);
        document
    }

    #[must_use]
    pub const fn with_scrollbar_width(mut self, width: u32) -> Self {
        self.scrollbar_width = width;
        self
    }

    /// Wrap the document for sharing with modals and dispatch.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn add_transition_rule(&mut self, rule: TransitionRule) {
        self.rules.push(rule);
    }

    /// Register template content that modals can reference by id.
    pub fn register_template(&mut self, id: impl Into<String>, content: Node) {
        self.templates.insert(id.into(), content);
    }

    pub fn set_layout(&mut self, element: ElementId, layout: Layout) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.layout = layout;
        }
    }

    /// Append an element described by `node` to `parent`.
    pub fn append(&mut self, parent: ElementId, node: &Node) -> ElementId {
        self.mount(parent, node).root
    }

    // Read access for renderers and tests.

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.elements.get(&element).and_then(|el| el.parent)
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.elements
            .get(&element)
            .map_or(&[], |el| el.children.as_slice())
    }

    pub fn classes(&self, element: ElementId) -> &[String] {
        self.elements
            .get(&element)
            .map_or(&[], |el| el.classes.as_slice())
    }

    pub fn markup(&self, element: ElementId) -> Option<&str> {
        self.elements
            .get(&element)
            .and_then(|el| el.markup.as_deref())
    }

    pub fn tag(&self, element: ElementId) -> Option<Tag> {
        self.elements.get(&element).map(|el| el.tag)
    }

    pub fn has_click_handler(&self, element: ElementId) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|el| el.on_click.is_some())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn key_listener_count(&self) -> usize {
        self.key_listeners.len()
    }

    /// Elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        self.collect_by_class(self.root, class, &mut found);
        found
    }

    /// No pending timers and no running transitions.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.running.is_empty()
    }

    // Dispatch.

    /// Deliver a keydown to every document listener, in installation order.
    pub fn dispatch_key(doc: &Rc<RefCell<Self>>, key: &KeyEvent) {
        let listeners = doc.borrow().key_listeners.clone();
        for (id, listener) in listeners {
            let still_installed = doc.borrow().key_listeners.iter().any(|(i, _)| *i == id);
            if still_installed {
                listener(key);
            }
        }
    }

    /// Deliver a click at `target`, bubbling towards the root.
    pub fn dispatch_click(doc: &Rc<RefCell<Self>>, target: ElementId) {
        let path = doc.borrow().path_to_root(target);
        trace!(%target, depth = path.len(), "Dispatching click");
        for current_target in path {
            let handler = doc
                .borrow()
                .elements
                .get(&current_target)
                .and_then(|el| el.on_click.clone());
            if let Some(handler) = handler {
                handler(&ClickEvent {
                    target,
                    current_target,
                });
            }
        }
    }

    /// Advance the clock by `elapsed`.
    ///
    /// Transitions whose duration has run out fire their transition-end
    /// events, then timers queued before this call run. Timers and
    /// transitions created while advancing wait for the next call.
    pub fn advance(doc: &Rc<RefCell<Self>>, elapsed: Duration) {
        let (timers, finished) = {
            let mut this = doc.borrow_mut();
            let timers = std::mem::take(&mut this.timers);
            let mut finished = Vec::new();
            this.running.retain_mut(|running| {
                if running.remaining <= elapsed {
                    finished.push(TransitionEvent {
                        target: running.element,
                        property_name: running.property.clone(),
                    });
                    false
                } else {
                    running.remaining -= elapsed;
                    true
                }
            });
            (timers, finished)
        };

        for event in finished {
            Self::dispatch_transition_end(doc, &event);
        }
        for timer in timers {
            timer();
        }
    }

    /// Advance in `step` increments until nothing is pending.
    ///
    /// Returns false if the document was still busy after the tick limit.
    pub fn run_until_idle(doc: &Rc<RefCell<Self>>, step: Duration) -> bool {
        for _ in 0..MAX_IDLE_TICKS {
            if doc.borrow().is_idle() {
                return true;
            }
            Self::advance(doc, step);
        }
        doc.borrow().is_idle()
    }

    fn dispatch_transition_end(doc: &Rc<RefCell<Self>>, event: &TransitionEvent) {
        let path = doc.borrow().path_to_root(event.target);
        for element in path {
            let handler = doc
                .borrow()
                .elements
                .get(&element)
                .and_then(|el| el.on_transition_end.clone());
            if let Some(handler) = handler {
                handler(event);
            }
        }
    }

    // Internals.

    fn alloc(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        self.elements.insert(id, element);
        id
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) {
        if !self.elements.contains_key(&parent) {
            warn!(%parent, %child, "Parent element does not exist, leaving child detached");
            return;
        }
        if let Some(el) = self.elements.get_mut(&child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.elements.get_mut(&parent) {
            el.children.push(child);
        }
    }

    fn mount_node(&mut self, parent: ElementId, node: &Node, mounted: &mut Mounted) -> ElementId {
        if node.tag == Tag::Fragment {
            for child in &node.children {
                self.mount_node(parent, child, mounted);
            }
            if let Some(key) = node.key {
                mounted.insert(key, parent);
            }
            return parent;
        }

        let id = self.alloc(Element::from_node(node));
        self.attach(parent, id);
        if let Some(key) = node.key {
            mounted.insert(key, id);
        }
        for child in &node.children {
            self.mount_node(id, child, mounted);
        }
        id
    }

    fn delete_subtree(&mut self, element: ElementId) {
        let Some(el) = self.elements.remove(&element) else {
            return;
        };
        self.running.retain(|running| running.element != element);
        for child in el.children {
            self.delete_subtree(child);
        }
    }

    fn path_to_root(&self, element: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut current = Some(element).filter(|id| self.elements.contains_key(id));
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }
        path
    }

    fn is_ancestor(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = self.parent(element);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn collect_by_class(&self, element: ElementId, class: &str, found: &mut Vec<ElementId>) {
        if self.classes(element).iter().any(|c| c == class) {
            found.push(element);
        }
        for child in self.children(element) {
            self.collect_by_class(*child, class, found);
        }
    }

    fn start_transitions(&mut self, element: ElementId, class: &str) {
        let triggered: Vec<(Vec<ElementId>, String, Duration)> = self
            .rules
            .iter()
            .filter(|rule| rule.trigger == class)
            .map(|rule| {
                let targets = match &rule.target {
                    None => vec![element],
                    Some(target) => {
                        let mut found = Vec::new();
                        self.collect_by_class(element, target, &mut found);
                        found
                    }
                };
                (targets, rule.property.clone(), rule.duration)
            })
            .collect();

        for (targets, property, duration) in triggered {
            for target in targets {
                // A restarted transition replaces the one in flight.
                self.running
                    .retain(|r| !(r.element == target && r.property == property));
                trace!(%target, %property, ?duration, "Transition started");
                self.running.push(Running {
                    element: target,
                    property: property.clone(),
                    remaining: duration,
                });
            }
        }
    }
}

impl Host for Document {
    fn body(&self) -> ElementId {
        self.body
    }

    fn root(&self) -> ElementId {
        self.root
    }

    fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    fn mount(&mut self, parent: ElementId, node: &Node) -> Mounted {
        let mut mounted = Mounted::new(parent);
        mounted.root = self.mount_node(parent, node, &mut mounted);
        mounted
    }

    fn remove(&mut self, element: ElementId) {
        if element == self.root || element == self.body {
            warn!(%element, "Refusing to remove the document root or body");
            return;
        }
        if let Some(parent) = self.parent(element)
            && let Some(el) = self.elements.get_mut(&parent)
        {
            el.children.retain(|child| *child != element);
        }
        self.delete_subtree(element);
    }

    fn set_markup(&mut self, element: ElementId, markup: &str) {
        let children = self
            .elements
            .get_mut(&element)
            .map(|el| {
                el.markup = Some(markup.to_string());
                std::mem::take(&mut el.children)
            })
            .unwrap_or_default();
        for child in children {
            self.delete_subtree(child);
        }
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        if el.classes.iter().any(|c| c == class) {
            return;
        }
        el.classes.push(class.to_string());
        self.start_transitions(element, class);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        let before = el.classes.len();
        el.classes.retain(|c| c != class);
        if el.classes.len() != before {
            self.start_transitions(element, class);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.classes(element).iter().any(|c| c == class)
    }

    fn padding_right(&self, element: ElementId) -> Option<u32> {
        self.elements.get(&element).and_then(|el| el.padding_right)
    }

    fn set_padding_right(&mut self, element: ElementId, padding: Option<u32>) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.padding_right = padding;
        }
    }

    fn metrics(&self, element: ElementId) -> Metrics {
        let Some(el) = self.elements.get(&element) else {
            return Metrics::default();
        };
        let scrollbar = if el.overflow == Overflow::Scroll {
            self.scrollbar_width
        } else {
            0
        };
        Metrics {
            scroll_height: el.layout.scroll_height,
            client_height: el.layout.client_height,
            offset_width: el.layout.width + scrollbar,
            client_width: el.layout.width,
        }
    }

    fn is_transitioning(&self, element: ElementId, property: &str) -> bool {
        self.running.iter().any(|running| {
            running.property == property
                && (running.element == element || self.is_ancestor(element, running.element))
        })
    }

    fn template(&self, id: &str) -> Option<Node> {
        self.templates.get(id).map(|content| match content.tag {
            Tag::Fragment => content.clone(),
            _ => Node::fragment(vec![content.clone()]),
        })
    }

    fn add_key_listener(&mut self, listener: KeyListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.key_listeners.push((id, listener));
        id
    }

    fn remove_key_listener(&mut self, id: ListenerId) {
        self.key_listeners.retain(|(i, _)| *i != id);
    }

    fn set_on_click(&mut self, element: ElementId, handler: Option<ClickHandler>) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.on_click = handler;
        }
    }

    fn set_on_transition_end(&mut self, element: ElementId, handler: Option<TransitionHandler>) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.on_transition_end = handler;
        }
    }

    fn set_timeout(&mut self, timer: Timer) {
        self.timers.push(timer);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::dom::{NodeKey, OPACITY, TRANSFORM};

    const TICK: Duration = Duration::from_millis(100);

    fn backdrop_with_container() -> Node {
        Node::div()
            .key(NodeKey::Backdrop)
            .class("backdrop")
            .child(Node::div().key(NodeKey::Container).class("container"))
    }

    #[test]
    fn test_mount_returns_keyed_elements() {
        let mut doc = Document::new();
        let body = doc.body();
        let mounted = doc.mount(body, &backdrop_with_container());

        let container = mounted.get(NodeKey::Container).unwrap();
        assert_eq!(mounted.get(NodeKey::Backdrop), Some(mounted.root));
        assert_eq!(doc.parent(container), Some(mounted.root));
        assert_eq!(doc.parent(mounted.root), Some(body));
        assert_eq!(doc.find_by_class("container"), vec![container]);
    }

    #[test]
    fn test_fragment_mounts_children_into_parent() {
        let mut doc = Document::new();
        let body = doc.body();
        let host = doc.append(body, &Node::div());
        let fragment = Node::fragment(vec![Node::div().class("a"), Node::div().class("b")]);

        let mounted = doc.mount(host, &fragment);
        assert_eq!(mounted.root, host);
        assert_eq!(doc.children(host).len(), 2);
    }

    #[test]
    fn test_set_markup_replaces_children() {
        let mut doc = Document::new();
        let body = doc.body();
        let mounted = doc.mount(body, &backdrop_with_container());
        let before = doc.element_count();

        doc.set_markup(mounted.root, "<p>replaced</p>");
        assert!(doc.children(mounted.root).is_empty());
        assert_eq!(doc.markup(mounted.root), Some("<p>replaced</p>"));
        assert_eq!(doc.element_count(), before - 1);
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let mounted = doc.mount(body, &backdrop_with_container());
        let container = mounted.get(NodeKey::Container).unwrap();

        doc.remove(mounted.root);
        assert!(!doc.contains(mounted.root));
        assert!(!doc.contains(container));
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn test_root_and_body_cannot_be_removed() {
        let mut doc = Document::new();
        let (root, body) = (doc.root(), doc.body());
        doc.remove(body);
        doc.remove(root);
        assert!(doc.contains(root));
        assert!(doc.contains(body));
    }

    #[test]
    fn test_scroll_overflow_reserves_scrollbar() {
        let mut doc = Document::new().with_scrollbar_width(15);
        let body = doc.body();
        let probe = doc.append(body, &Node::div().overflow(Overflow::Scroll));

        let metrics = doc.metrics(probe);
        assert_eq!(metrics.offset_width - metrics.client_width, 15);
    }

    #[test]
    fn test_transition_end_bubbles_after_duration() {
        let mut doc = Document::new();
        doc.add_transition_rule(
            TransitionRule::new("show", TRANSFORM, Duration::from_millis(200))
                .on_descendant("container"),
        );
        let body = doc.body();
        let mounted = doc.mount(body, &backdrop_with_container());
        let backdrop = mounted.root;
        let doc = doc.shared();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.borrow_mut().set_on_transition_end(
            backdrop,
            Some(Rc::new(move |event: &TransitionEvent| {
                sink.borrow_mut().push(event.property_name.clone());
            })),
        );

        doc.borrow_mut().add_class(backdrop, "show");
        assert!(doc.borrow().is_transitioning(backdrop, TRANSFORM));
        assert!(!doc.borrow().is_transitioning(backdrop, OPACITY));

        Document::advance(&doc, TICK);
        assert!(seen.borrow().is_empty());

        Document::advance(&doc, TICK);
        assert_eq!(*seen.borrow(), vec![TRANSFORM.to_string()]);
        assert!(doc.borrow().is_idle());
    }

    #[test]
    fn test_restarted_transition_replaces_running_one() {
        let mut doc = Document::new();
        doc.add_transition_rule(TransitionRule::new("show", OPACITY, TICK));
        let body = doc.body();
        let el = doc.append(body, &Node::div());
        let doc = doc.shared();

        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        doc.borrow_mut().set_on_transition_end(
            el,
            Some(Rc::new(move |_: &TransitionEvent| counter.set(counter.get() + 1))),
        );

        doc.borrow_mut().add_class(el, "show");
        doc.borrow_mut().remove_class(el, "show");
        assert!(Document::run_until_idle(&doc, TICK));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_timers_run_on_next_advance() {
        let doc = Document::new().shared();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        doc.borrow_mut().set_timeout(Box::new(move || flag.set(true)));

        assert!(!ran.get());
        Document::advance(&doc, Duration::ZERO);
        assert!(ran.get());
    }

    #[test]
    fn test_click_bubbles_with_original_target() {
        let mut doc = Document::new();
        let body = doc.body();
        let mounted = doc.mount(body, &backdrop_with_container());
        let container = mounted.get(NodeKey::Container).unwrap();
        let doc = doc.shared();

        let targets = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&targets);
        doc.borrow_mut().set_on_click(
            mounted.root,
            Some(Rc::new(move |event: &ClickEvent| {
                sink.borrow_mut().push((event.target, event.current_target));
            })),
        );

        Document::dispatch_click(&doc, container);
        assert_eq!(*targets.borrow(), vec![(container, mounted.root)]);
    }

    #[test]
    fn test_listener_removed_during_dispatch_is_skipped() {
        let doc = Document::new().shared();
        let calls = Rc::new(Cell::new(0));

        let second_id = Rc::new(Cell::new(None));
        let first = {
            let doc = Rc::clone(&doc);
            let second_id = Rc::clone(&second_id);
            let calls = Rc::clone(&calls);
            Rc::new(move |_: &KeyEvent| {
                calls.set(calls.get() + 1);
                if let Some(id) = second_id.get() {
                    doc.borrow_mut().remove_key_listener(id);
                }
            })
        };
        let second = {
            let calls = Rc::clone(&calls);
            Rc::new(move |_: &KeyEvent| calls.set(calls.get() + 10))
        };

        doc.borrow_mut().add_key_listener(first);
        let id = doc.borrow_mut().add_key_listener(second);
        second_id.set(Some(id));

        Document::dispatch_key(&doc, &KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(calls.get(), 1);
        assert_eq!(doc.borrow().key_listener_count(), 1);
    }

    #[test]
    fn test_template_is_returned_as_fragment() {
        let mut doc = Document::new();
        doc.register_template("greeting", Node::div().markup("<p>Hello</p>"));

        let template = doc.template("greeting").unwrap();
        assert_eq!(template.tag, Tag::Fragment);
        assert_eq!(template.children.len(), 1);
        assert!(doc.template("missing").is_none());
    }
}
