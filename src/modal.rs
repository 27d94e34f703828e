//! Stacked modal dialogs.
//!
//! A [`Modal`] owns its options, footer state and lifecycle. Everything it
//! shares with other modals lives in an [`Environment`]:
//! - the [`Host`](crate::dom::Host) document it mounts into
//! - the [`ModalStack`] of currently open modals (Escape goes to the top one)
//! - the [`ScrollLocks`] engaged while at least one modal is open
//!
//! # Lifecycle
//!
//! ```text
//! Unbuilt -> Opening -> Open -> Closing -> Closed -> Opening ...
//!                                      \-> Destroyed -> Opening ...
//! ```
//!
//! Transitions into `Open`, `Closed` and `Destroyed` complete when the host
//! reports the end of the container's `transform` transition, or right away
//! if nothing is transitioning.

mod builder;
mod environment;
mod error;
mod footer;
mod instance;
mod options;
mod scroll_lock;
mod stack;

pub use builder::{BuildInput, Content, FooterInput, build, footer_button, scrollbar_probe};
pub use environment::Environment;
pub use error::{ModalError, Result};
pub use footer::{ButtonCallback, FooterButton};
pub use instance::{Modal, ModalState};
pub use options::{
    Callback, CloseMethod, CloseMethods, ModalConfig, ModalOptions, TargetProvider,
};
pub use scroll_lock::{ScrollLockController, ScrollLockStats, ScrollLocks, has_scrollbar};
pub use stack::{ModalId, ModalStack};

/// Class on every backdrop element.
pub const BACKDROP_CLASS: &str = "modal__backdrop";
/// Class on the container inside a backdrop.
pub const CONTAINER_CLASS: &str = "modal__container";
/// Class on the built-in close button.
pub const CLOSE_CLASS: &str = "modal__close";
/// Class on the content region.
pub const CONTENT_CLASS: &str = "modal__content";
/// Class on the footer region.
pub const FOOTER_CLASS: &str = "modal__footer";
/// Class on the custom markup area inside the footer.
pub const FOOTER_BODY_CLASS: &str = "modal__footer-body";
/// Class on the temporary scrollbar measuring element.
pub const PROBE_CLASS: &str = "modal__scrollbar-probe";
/// Visual state class added to a backdrop while it is shown.
pub const SHOW_CLASS: &str = "modal--show";
/// Marker class added to the scroll-lock target while locked.
pub const NO_SCROLL_CLASS: &str = "modal--no-scroll";
/// Label of the built-in close button.
pub const CLOSE_LABEL: &str = "&times;";
