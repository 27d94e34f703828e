//! Scroll locking of the surface underneath open modals.
//!
//! A lock is engaged when the first modal opens and released once the last
//! one has closed. While locked, the target carries [`NO_SCROLL_CLASS`] and
//! its right padding grows by the scrollbar width, so content does not shift
//! when the scrollbar disappears.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::{NO_SCROLL_CLASS, scrollbar_probe};
use crate::dom::{ElementId, Host};

/// Whether `target` currently overflows vertically.
///
/// The body and the root are treated as one surface: either of them
/// overflowing counts.
pub fn has_scrollbar(host: &dyn Host, target: ElementId) -> bool {
    let overflows = |element: ElementId| {
        let metrics = host.metrics(element);
        metrics.scroll_height > metrics.client_height
    };

    if target == host.body() || target == host.root() {
        overflows(host.root()) || overflows(host.body())
    } else {
        overflows(target)
    }
}

/// How many times a controller has engaged and released its lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollLockStats {
    pub engaged: usize,
    pub released: usize,
}

/// Lock state of a single target element.
#[derive(Debug)]
pub struct ScrollLockController {
    target: ElementId,
    locked: bool,
    original_padding_right: Option<u32>,
    scrollbar_width: Option<u32>,
    stats: ScrollLockStats,
}

impl ScrollLockController {
    #[must_use]
    pub const fn new(target: ElementId) -> Self {
        Self {
            target,
            locked: false,
            original_padding_right: None,
            scrollbar_width: None,
            stats: ScrollLockStats {
                engaged: 0,
                released: 0,
            },
        }
    }

    #[must_use]
    pub const fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub const fn stats(&self) -> ScrollLockStats {
        self.stats
    }

    /// Width of the host's scrollbars, measured once with an offscreen probe.
    pub fn scrollbar_width(&mut self, host: &mut dyn Host) -> u32 {
        if let Some(width) = self.scrollbar_width {
            return width;
        }

        let body = host.body();
        let probe = host.mount(body, &scrollbar_probe()).root;
        let metrics = host.metrics(probe);
        host.remove(probe);

        let width = metrics.offset_width.saturating_sub(metrics.client_width);
        self.scrollbar_width = Some(width);
        width
    }

    /// Lock the target. Returns false if it was already locked.
    pub fn engage(&mut self, host: &mut dyn Host) -> bool {
        if self.locked {
            return false;
        }

        let width = self.scrollbar_width(host);
        let original = host.padding_right(self.target);
        host.add_class(self.target, NO_SCROLL_CLASS);
        host.set_padding_right(self.target, Some(original.unwrap_or(0) + width));

        self.original_padding_right = original;
        self.locked = true;
        self.stats.engaged += 1;
        debug!(target = %self.target, width, "Scroll lock engaged");
        true
    }

    /// Unlock the target and restore its padding. Returns false if it was
    /// not locked.
    pub fn release(&mut self, host: &mut dyn Host) -> bool {
        if !self.locked {
            return false;
        }

        host.remove_class(self.target, NO_SCROLL_CLASS);
        host.set_padding_right(self.target, self.original_padding_right.take());

        self.locked = false;
        self.stats.released += 1;
        debug!(target = %self.target, "Scroll lock released");
        true
    }
}

/// Shared scroll-lock controllers, one per target element.
#[derive(Debug, Clone, Default)]
pub struct ScrollLocks {
    controllers: Rc<RefCell<HashMap<ElementId, ScrollLockController>>>,
}

impl ScrollLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self, host: &mut dyn Host, target: ElementId) -> bool {
        self.controllers
            .borrow_mut()
            .entry(target)
            .or_insert_with(|| ScrollLockController::new(target))
            .engage(host)
    }

    pub fn release(&self, host: &mut dyn Host, target: ElementId) -> bool {
        self.controllers
            .borrow_mut()
            .get_mut(&target)
            .is_some_and(|controller| controller.release(host))
    }

    /// Release every locked target. Returns how many were released.
    pub fn release_all(&self, host: &mut dyn Host) -> usize {
        self.controllers
            .borrow_mut()
            .values_mut()
            .map(|controller| controller.release(host))
            .filter(|released| *released)
            .count()
    }

    #[must_use]
    pub fn is_locked(&self, target: ElementId) -> bool {
        self.controllers
            .borrow()
            .get(&target)
            .is_some_and(ScrollLockController::is_locked)
    }

    #[must_use]
    pub fn stats(&self, target: ElementId) -> ScrollLockStats {
        self.controllers
            .borrow()
            .get(&target)
            .map(ScrollLockController::stats)
            .unwrap_or_default()
    }
}
