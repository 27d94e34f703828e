use std::fmt;
use std::rc::Rc;

use super::Modal;

/// Invoked with the owning modal when a footer button is clicked.
pub type ButtonCallback = Rc<dyn Fn(&Modal)>;

/// A button rendered in the modal footer.
#[derive(Clone)]
pub struct FooterButton {
    pub title: String,
    pub css_class: String,
    pub callback: ButtonCallback,
}

impl FooterButton {
    pub fn new(
        title: impl Into<String>,
        css_class: impl Into<String>,
        callback: impl Fn(&Modal) + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            css_class: css_class.into(),
            callback: Rc::new(callback),
        }
    }
}

impl fmt::Debug for FooterButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FooterButton")
            .field("title", &self.title)
            .field("css_class", &self.css_class)
            .finish_non_exhaustive()
    }
}
