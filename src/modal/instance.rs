use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, error, warn};

use super::builder::{self, BuildInput, Content, FooterInput};
use super::environment::WeakEnvironment;
use super::options::Settings;
use super::{
    CloseMethods, Environment, FooterButton, ModalError, ModalId, ModalOptions, Result, SHOW_CLASS,
    has_scrollbar,
};
use crate::dom::{
    ClickEvent, ClickHandler, ElementId, KeyListener, ListenerId, Mounted, Node, NodeKey,
    TRANSFORM, TransitionEvent, TransitionHandler,
};

/// Lifecycle state of a [`Modal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// Never opened, nothing mounted.
    Unbuilt,
    /// Mounted but hidden.
    Closed,
    /// Show requested, waiting for the open transition.
    Opening,
    Open,
    /// Hide requested, waiting for the close transition.
    Closing,
    /// Subtree removed from the host. Opening again rebuilds it.
    Destroyed,
}

/// Element ids of a mounted modal.
#[derive(Debug, Clone, Copy)]
struct Subtree {
    backdrop: ElementId,
    container: ElementId,
    close_button: Option<ElementId>,
    content: ElementId,
    footer: Option<ElementId>,
    footer_body: Option<ElementId>,
}

impl Subtree {
    fn from_mounted(mounted: &Mounted) -> Self {
        let backdrop = mounted.root;
        let container = mounted.get(NodeKey::Container).unwrap_or(backdrop);
        Self {
            backdrop,
            container,
            close_button: mounted.get(NodeKey::CloseButton),
            content: mounted.get(NodeKey::Content).unwrap_or(container),
            footer: mounted.get(NodeKey::Footer),
            footer_body: mounted.get(NodeKey::FooterBody),
        }
    }
}

/// What a pending transition-end completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Opened,
    Closed { destroy: bool },
}

struct Inner {
    id: ModalId,
    content: Option<String>,
    template_id: Option<String>,
    settings: Settings,
    subtree: Option<Subtree>,
    footer_buttons: Vec<FooterButton>,
    footer_content: Option<String>,
    state: ModalState,
    key_listener: Option<ListenerId>,
}

/// A modal dialog.
///
/// `Modal` is a cheap handle; clones refer to the same dialog. All methods
/// take `&self` and return immediately. Work that depends on a transition
/// finishing (marking the modal open, tearing it down, releasing the scroll
/// lock, running `on_open`/`on_close`) happens later, from host callbacks.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<RefCell<Inner>>,
    env: Environment,
}

/// Handle captured by host callbacks.
#[derive(Clone)]
struct Detached {
    inner: Rc<RefCell<Inner>>,
    env: WeakEnvironment,
}

impl Detached {
    fn attach(&self) -> Option<Modal> {
        Some(Modal {
            inner: Rc::clone(&self.inner),
            env: self.env.upgrade()?,
        })
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Modal")
            .field("id", &inner.id)
            .field("state", &inner.state)
            .field("footer_buttons", &inner.footer_buttons.len())
            .finish_non_exhaustive()
    }
}

impl Modal {
    /// Create a modal against `env`.
    ///
    /// # Errors
    /// - [`ModalError::MissingContent`] if neither content nor a template id
    ///   is set.
    /// - [`ModalError::TemplateNotFound`] if the template id does not
    ///   resolve in the host.
    ///
    /// If both content and a template id are set, the template id is
    /// dropped with a warning.
    pub fn new(env: &Environment, mut options: ModalOptions) -> Result<Self> {
        let content = options.content.take();
        let template_id = match (&content, options.template_id.take()) {
            (None, None) => {
                error!("Modal requires either content or a template id");
                return Err(ModalError::MissingContent);
            }
            (Some(_), Some(template_id)) => {
                warn!(
                    %template_id,
                    "Both content and template id provided, using content and ignoring the template"
                );
                None
            }
            (None, Some(template_id)) => {
                if env.host.borrow().template(&template_id).is_none() {
                    error!(%template_id, "Template does not exist");
                    return Err(ModalError::TemplateNotFound(template_id));
                }
                Some(template_id)
            }
            (Some(_), None) => None,
        };

        let inner = Inner {
            id: ModalId::next(),
            content,
            template_id,
            settings: options.resolve(&env.defaults),
            subtree: None,
            footer_buttons: Vec::new(),
            footer_content: None,
            state: ModalState::Unbuilt,
            key_listener: None,
        };
        debug!(id = %inner.id, "Modal created");

        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            env: env.clone(),
        })
    }

    #[must_use]
    pub fn id(&self) -> ModalId {
        self.inner.borrow().id
    }

    #[must_use]
    pub fn state(&self) -> ModalState {
        self.inner.borrow().state
    }

    /// Opening or open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state(), ModalState::Opening | ModalState::Open)
    }

    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.env
    }

    /// The mounted backdrop, if built.
    #[must_use]
    pub fn backdrop(&self) -> Option<ElementId> {
        self.subtree().map(|subtree| subtree.backdrop)
    }

    #[must_use]
    pub fn container(&self) -> Option<ElementId> {
        self.subtree().map(|subtree| subtree.container)
    }

    #[must_use]
    pub fn close_button(&self) -> Option<ElementId> {
        self.subtree().and_then(|subtree| subtree.close_button)
    }

    #[must_use]
    pub fn content_element(&self) -> Option<ElementId> {
        self.subtree().map(|subtree| subtree.content)
    }

    #[must_use]
    pub fn footer_element(&self) -> Option<ElementId> {
        self.subtree().and_then(|subtree| subtree.footer)
    }

    #[must_use]
    pub fn footer_buttons(&self) -> Vec<FooterButton> {
        self.inner.borrow().footer_buttons.clone()
    }

    /// Show the modal, building it on first use.
    ///
    /// Returns the backdrop element.
    ///
    /// # Errors
    /// [`ModalError::InvalidState`] if the modal is already opening or open.
    pub fn open(&self) -> Result<ElementId> {
        let (id, state) = {
            let inner = self.inner.borrow();
            (inner.id, inner.state)
        };
        if matches!(state, ModalState::Opening | ModalState::Open) {
            return Err(self.invalid("open"));
        }

        self.env.stack.push(id);
        let backdrop = match self.backdrop() {
            Some(backdrop) => backdrop,
            None => self.build(),
        };
        self.inner.borrow_mut().state = ModalState::Opening;

        // Deferred so the hidden state renders first and the transition runs.
        let detached = self.detach();
        self.env.host.borrow_mut().set_timeout(Box::new(move || {
            if let Some(modal) = detached.attach() {
                modal.show();
            }
        }));

        let (methods, scroll_lock) = {
            let inner = self.inner.borrow();
            (inner.settings.close_methods, inner.settings.enable_scroll_lock)
        };
        if scroll_lock && self.env.stack.len() == 1 {
            self.engage_scroll_lock();
        }
        if methods.contains(CloseMethods::OVERLAY) {
            self.install_overlay_close(backdrop);
        }
        if methods.contains(CloseMethods::ESCAPE) {
            self.install_escape_close();
        }
        // A close transition still in flight must not complete the open.
        self.env
            .host
            .borrow_mut()
            .set_on_transition_end(backdrop, None);

        debug!(%id, depth = self.env.stack.len(), "Modal opening");
        Ok(backdrop)
    }

    /// Hide the modal, destroying it afterwards if `destroy_on_close` is set.
    ///
    /// # Errors
    /// [`ModalError::InvalidState`] if the modal was never built or is
    /// already destroyed.
    pub fn close(&self) -> Result<()> {
        let destroy = self.inner.borrow().settings.destroy_on_close;
        self.close_with(destroy)
    }

    /// Hide the modal and tear its subtree down once hidden.
    ///
    /// # Errors
    /// See [`Modal::close`].
    pub fn destroy(&self) -> Result<()> {
        self.close_with(true)
    }

    /// Hide the modal, choosing explicitly whether to tear it down.
    ///
    /// Calling this again before the close transition ends replaces the
    /// pending completion, so only the latest `destroy` choice applies.
    ///
    /// # Errors
    /// See [`Modal::close`].
    pub fn close_with(&self, destroy: bool) -> Result<()> {
        let (id, state) = {
            let inner = self.inner.borrow();
            (inner.id, inner.state)
        };

        match state {
            ModalState::Unbuilt | ModalState::Destroyed => Err(self.invalid("close")),
            ModalState::Closed => {
                if destroy {
                    self.teardown();
                }
                Ok(())
            }
            ModalState::Opening | ModalState::Open | ModalState::Closing => {
                let Some(backdrop) = self.backdrop() else {
                    return Err(self.invalid("close"));
                };
                self.env.stack.remove(id);

                let listener = {
                    let mut inner = self.inner.borrow_mut();
                    inner.state = ModalState::Closing;
                    inner.key_listener.take()
                };
                let transitioning = {
                    let mut host = self.env.host.borrow_mut();
                    if let Some(listener) = listener {
                        host.remove_key_listener(listener);
                    }
                    host.remove_class(backdrop, SHOW_CLASS);
                    host.is_transitioning(backdrop, TRANSFORM)
                };

                debug!(%id, destroy, depth = self.env.stack.len(), "Modal closing");
                let completion = Completion::Closed { destroy };
                if transitioning {
                    self.await_transition(backdrop, completion);
                } else {
                    self.complete(completion);
                }
                Ok(())
            }
        }
    }

    /// Replace the content markup, updating the mounted content region.
    pub fn set_content(&self, markup: impl Into<String>) {
        let markup = markup.into();
        let element = {
            let mut inner = self.inner.borrow_mut();
            inner.content = Some(markup.clone());
            inner.subtree.map(|subtree| subtree.content)
        };
        if let Some(element) = element {
            self.env.host.borrow_mut().set_markup(element, &markup);
        }
    }

    /// Replace the footer markup. Footer buttons are kept.
    pub fn set_footer_content(&self, markup: impl Into<String>) {
        let markup = markup.into();
        let element = {
            let mut inner = self.inner.borrow_mut();
            inner.footer_content = Some(markup.clone());
            inner.subtree.and_then(|subtree| subtree.footer_body)
        };
        if let Some(element) = element {
            self.env.host.borrow_mut().set_markup(element, &markup);
        }
    }

    /// Append a footer button.
    ///
    /// Buttons accumulate in call order. Without a footer they are kept but
    /// not rendered.
    pub fn add_footer_button(
        &self,
        title: impl Into<String>,
        css_class: impl Into<String>,
        callback: impl Fn(&Self) + 'static,
    ) {
        let button = FooterButton::new(title, css_class, callback);
        let (index, footer) = {
            let mut inner = self.inner.borrow_mut();
            inner.footer_buttons.push(button.clone());
            (
                inner.footer_buttons.len() - 1,
                inner.subtree.and_then(|subtree| subtree.footer),
            )
        };

        if let Some(footer) = footer {
            let handler = self.button_handler(&button);
            let mut host = self.env.host.borrow_mut();
            let element = host.mount(footer, &builder::footer_button(index, &button)).root;
            host.set_on_click(element, Some(handler));
        }
    }

    fn subtree(&self) -> Option<Subtree> {
        self.inner.borrow().subtree
    }

    fn detach(&self) -> Detached {
        Detached {
            inner: Rc::clone(&self.inner),
            env: self.env.downgrade(),
        }
    }

    fn invalid(&self, operation: &'static str) -> ModalError {
        let inner = self.inner.borrow();
        ModalError::InvalidState {
            id: inner.id,
            state: inner.state,
            operation,
        }
    }

    fn build(&self) -> ElementId {
        let mut host = self.env.host.borrow_mut();
        let (mounted, buttons) = {
            let inner = self.inner.borrow();
            let content = match &inner.content {
                Some(markup) => Content::Markup(markup),
                None => Content::Template(
                    inner
                        .template_id
                        .as_deref()
                        .and_then(|id| host.template(id))
                        .unwrap_or_else(|| {
                            warn!(id = %inner.id, "Template no longer exists, building empty content");
                            Node::fragment(Vec::new())
                        }),
                ),
            };
            let node = builder::build(&BuildInput {
                content,
                css_class: &inner.settings.css_class,
                close_button: inner.settings.close_methods.contains(CloseMethods::BUTTON),
                footer: inner.settings.footer.then(|| FooterInput {
                    content: inner.footer_content.as_deref(),
                    buttons: &inner.footer_buttons,
                }),
            });
            let body = host.body();
            (host.mount(body, &node), inner.footer_buttons.clone())
        };

        if let Some(close) = mounted.get(NodeKey::CloseButton) {
            host.set_on_click(close, Some(self.close_handler()));
        }
        for (index, button) in buttons.iter().enumerate() {
            if let Some(element) = mounted.get(NodeKey::FooterButton(index)) {
                host.set_on_click(element, Some(self.button_handler(button)));
            }
        }
        drop(host);

        let subtree = Subtree::from_mounted(&mounted);
        let mut inner = self.inner.borrow_mut();
        inner.subtree = Some(subtree);
        debug!(id = %inner.id, backdrop = %subtree.backdrop, "Modal built");
        subtree.backdrop
    }

    fn show(&self) {
        if self.state() != ModalState::Opening {
            return;
        }
        let Some(backdrop) = self.backdrop() else {
            return;
        };

        let transitioning = {
            let mut host = self.env.host.borrow_mut();
            host.add_class(backdrop, SHOW_CLASS);
            host.is_transitioning(backdrop, TRANSFORM)
        };
        if transitioning {
            self.await_transition(backdrop, Completion::Opened);
        } else {
            self.complete(Completion::Opened);
        }
    }

    fn complete(&self, completion: Completion) {
        let expected = match completion {
            Completion::Opened => ModalState::Opening,
            Completion::Closed { .. } => ModalState::Closing,
        };
        if self.state() != expected {
            return;
        }
        if let Some(backdrop) = self.backdrop() {
            self.env.host.borrow_mut().set_on_transition_end(backdrop, None);
        }

        let callback = match completion {
            Completion::Opened => {
                let mut inner = self.inner.borrow_mut();
                inner.state = ModalState::Open;
                debug!(id = %inner.id, "Modal open");
                inner.settings.on_open.clone()
            }
            Completion::Closed { destroy } => {
                if destroy {
                    self.teardown();
                } else {
                    self.inner.borrow_mut().state = ModalState::Closed;
                }
                self.release_scroll_lock_if_idle();
                debug!(id = %self.id(), "Modal closed");
                self.inner.borrow().settings.on_close.clone()
            }
        };

        if let Some(callback) = callback {
            callback();
        }
    }

    fn teardown(&self) {
        let (subtree, listener) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = ModalState::Destroyed;
            (inner.subtree.take(), inner.key_listener.take())
        };

        let mut host = self.env.host.borrow_mut();
        if let Some(listener) = listener {
            host.remove_key_listener(listener);
        }
        if let Some(subtree) = subtree {
            host.remove(subtree.backdrop);
        }
        debug!(id = %self.id(), "Modal destroyed");
    }

    fn engage_scroll_lock(&self) {
        let provider = Rc::clone(&self.inner.borrow().settings.scroll_lock_target);
        let mut host = self.env.host.borrow_mut();
        let target = provider(&*host);
        if has_scrollbar(&*host, target) {
            self.env.scroll_locks.engage(&mut *host, target);
        }
    }

    /// Once no modal is open, no target stays locked, whichever modal
    /// engaged it.
    fn release_scroll_lock_if_idle(&self) {
        if !self.env.stack.is_empty() {
            return;
        }
        let mut host = self.env.host.borrow_mut();
        let released = self.env.scroll_locks.release_all(&mut *host);
        if released > 0 {
            debug!(id = %self.id(), released, "Stack empty, scroll locks released");
        }
    }

    fn install_overlay_close(&self, backdrop: ElementId) {
        let detached = self.detach();
        let handler: ClickHandler = Rc::new(move |event: &ClickEvent| {
            // Clicks bubbling up from inside the container do not count.
            if event.target != event.current_target {
                return;
            }
            if let Some(modal) = detached.attach()
                && let Err(err) = modal.close()
            {
                warn!(%err, "Backdrop click could not close modal");
            }
        });
        self.env.host.borrow_mut().set_on_click(backdrop, Some(handler));
    }

    fn install_escape_close(&self) {
        let detached = self.detach();
        let listener: KeyListener = Rc::new(move |key: &KeyEvent| {
            if key.code != KeyCode::Esc {
                return;
            }
            let Some(modal) = detached.attach() else {
                return;
            };
            // Only the topmost modal reacts, decided at dispatch time.
            if !modal.env.stack.is_top(modal.id()) {
                return;
            }
            if let Err(err) = modal.close() {
                warn!(%err, "Escape could not close modal");
            }
        });

        let previous = self.inner.borrow_mut().key_listener.take();
        let id = {
            let mut host = self.env.host.borrow_mut();
            if let Some(previous) = previous {
                host.remove_key_listener(previous);
            }
            host.add_key_listener(listener)
        };
        self.inner.borrow_mut().key_listener = Some(id);
    }

    fn await_transition(&self, backdrop: ElementId, completion: Completion) {
        let detached = self.detach();
        let handler: TransitionHandler = Rc::new(move |event: &TransitionEvent| {
            if event.property_name != TRANSFORM {
                return;
            }
            if let Some(modal) = detached.attach() {
                modal.complete(completion);
            }
        });
        self.env
            .host
            .borrow_mut()
            .set_on_transition_end(backdrop, Some(handler));
    }

    fn close_handler(&self) -> ClickHandler {
        let detached = self.detach();
        Rc::new(move |_: &ClickEvent| {
            if let Some(modal) = detached.attach()
                && let Err(err) = modal.close()
            {
                warn!(%err, "Close button could not close modal");
            }
        })
    }

    fn button_handler(&self, button: &FooterButton) -> ClickHandler {
        let detached = self.detach();
        let callback = Rc::clone(&button.callback);
        Rc::new(move |_: &ClickEvent| {
            if let Some(modal) = detached.attach() {
                callback(&modal);
            }
        })
    }
}
