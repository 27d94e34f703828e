//! Stacked modal dialogs over an abstract host document, with a terminal
//! renderer.
//!
//! ```ignore
//! let doc = Document::new().shared();
//! let env = Environment::new(doc.clone());
//! let modal = Modal::new(&env, ModalOptions::new().content("<p>Hi</p>").footer(true))?;
//! modal.add_footer_button("OK", "btn", |modal| {
//!     let _ = modal.close();
//! });
//! modal.open()?;
//! ```

pub mod config;
pub mod dom;
pub mod modal;
pub mod theme;
pub mod ui;

pub use theme::Theme;
