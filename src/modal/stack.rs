use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique modal ids.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    pub(crate) fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal-{}", self.0)
    }
}

/// Ordered set of open modals, most recently opened last.
///
/// Clones share the same stack. Every modal built from the same
/// [`Environment`](super::Environment) sees the same entries, while separate
/// environments stay independent.
#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    entries: Rc<RefCell<Vec<ModalId>>>,
}

impl ModalStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, id: ModalId) {
        self.entries.borrow_mut().push(id);
    }

    /// Remove `id` wherever it sits. Returns whether it was present.
    pub fn remove(&self, id: ModalId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().rposition(|entry| *entry == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Most recently opened modal that is still open.
    #[must_use]
    pub fn top(&self) -> Option<ModalId> {
        self.entries.borrow().last().copied()
    }

    #[must_use]
    pub fn is_top(&self, id: ModalId) -> bool {
        self.top() == Some(id)
    }

    #[must_use]
    pub fn contains(&self, id: ModalId) -> bool {
        self.entries.borrow().contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of the open modals, bottom to top.
    #[must_use]
    pub fn ids(&self) -> Vec<ModalId> {
        self.entries.borrow().clone()
    }
}
