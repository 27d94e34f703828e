use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{ModalConfig, ModalStack, ScrollLocks};
use crate::dom::Host;

/// Shared state every modal of one document is built against.
///
/// Clones share the same host, stack and scroll locks. Tests create a fresh
/// environment per case to get an isolated stack.
#[derive(Clone)]
pub struct Environment {
    pub host: Rc<RefCell<dyn Host>>,
    pub stack: ModalStack,
    pub scroll_locks: ScrollLocks,
    pub defaults: Rc<ModalConfig>,
}

impl Environment {
    pub fn new(host: Rc<RefCell<dyn Host>>) -> Self {
        Self {
            host,
            stack: ModalStack::new(),
            scroll_locks: ScrollLocks::new(),
            defaults: Rc::new(ModalConfig::default()),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: ModalConfig) -> Self {
        self.defaults = Rc::new(defaults);
        self
    }

    /// Handle stored inside host callbacks, so the host does not keep
    /// itself alive through its own handlers.
    pub(crate) fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment {
            host: Rc::downgrade(&self.host),
            stack: self.stack.clone(),
            scroll_locks: self.scroll_locks.clone(),
            defaults: Rc::clone(&self.defaults),
        }
    }
}

#[derive(Clone)]
pub(crate) struct WeakEnvironment {
    host: Weak<RefCell<dyn Host>>,
    stack: ModalStack,
    scroll_locks: ScrollLocks,
    defaults: Rc<ModalConfig>,
}

impl WeakEnvironment {
    pub fn upgrade(&self) -> Option<Environment> {
        Some(Environment {
            host: self.host.upgrade()?,
            stack: self.stack.clone(),
            scroll_locks: self.scroll_locks.clone(),
            defaults: Rc::clone(&self.defaults),
        })
    }
}
