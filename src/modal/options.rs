use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::dom::{ElementId, Host};

/// Lifecycle callback, e.g. `on_open` / `on_close`.
pub type Callback = Rc<dyn Fn()>;

/// Resolves the element whose scrolling is locked while modals are open.
pub type TargetProvider = Rc<dyn Fn(&dyn Host) -> ElementId>;

/// A way the user can dismiss a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseMethod {
    /// The built-in close button in the container.
    Button,
    /// A click on the backdrop outside the container.
    Overlay,
    /// The Escape key, when the modal is on top of the stack.
    Escape,
}

bitflags! {
    /// Set of enabled [`CloseMethod`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CloseMethods: u8 {
        const BUTTON = 1;
        const OVERLAY = 1 << 1;
        const ESCAPE = 1 << 2;
    }
}

impl Default for CloseMethods {
    fn default() -> Self {
        Self::all()
    }
}

impl From<CloseMethod> for CloseMethods {
    fn from(method: CloseMethod) -> Self {
        match method {
            CloseMethod::Button => Self::BUTTON,
            CloseMethod::Overlay => Self::OVERLAY,
            CloseMethod::Escape => Self::ESCAPE,
        }
    }
}

impl FromIterator<CloseMethod> for CloseMethods {
    fn from_iter<I: IntoIterator<Item = CloseMethod>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |methods, method| methods | method.into())
    }
}

impl CloseMethods {
    /// Enabled methods in declaration order.
    #[must_use]
    pub fn methods(self) -> Vec<CloseMethod> {
        [CloseMethod::Button, CloseMethod::Overlay, CloseMethod::Escape]
            .into_iter()
            .filter(|method| self.contains((*method).into()))
            .collect()
    }
}

/// Defaults every modal starts from, loadable from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub destroy_on_close: bool,
    pub footer: bool,
    pub css_class: Vec<String>,
    pub close_methods: Vec<CloseMethod>,
    pub enable_scroll_lock: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            destroy_on_close: true,
            footer: false,
            css_class: Vec::new(),
            close_methods: CloseMethods::all().methods(),
            enable_scroll_lock: true,
        }
    }
}

/// Per-modal options. Anything left unset falls back to [`ModalConfig`].
///
/// # Example
///
/// ```ignore
/// let options = ModalOptions::new()
///     .content("<p>Hi</p>")
///     .footer(true)
///     .close_methods([CloseMethod::Button, CloseMethod::Escape])
///     .on_close(|| tracing::info!("closed"));
/// ```
#[derive(Clone, Default)]
pub struct ModalOptions {
    pub(crate) content: Option<String>,
    pub(crate) template_id: Option<String>,
    destroy_on_close: Option<bool>,
    footer: Option<bool>,
    css_class: Option<Vec<String>>,
    close_methods: Option<CloseMethods>,
    enable_scroll_lock: Option<bool>,
    scroll_lock_target: Option<TargetProvider>,
    on_open: Option<Callback>,
    on_close: Option<Callback>,
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("content", &self.content)
            .field("template_id", &self.template_id)
            .field("destroy_on_close", &self.destroy_on_close)
            .field("footer", &self.footer)
            .field("css_class", &self.css_class)
            .field("close_methods", &self.close_methods)
            .field("enable_scroll_lock", &self.enable_scroll_lock)
            .finish_non_exhaustive()
    }
}

impl ModalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw markup shown in the content region.
    #[must_use]
    pub fn content(mut self, markup: impl Into<String>) -> Self {
        self.content = Some(markup.into());
        self
    }

    /// Id of a host template whose content is cloned into the modal.
    #[must_use]
    pub fn template_id(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = Some(destroy);
        self
    }

    #[must_use]
    pub const fn footer(mut self, footer: bool) -> Self {
        self.footer = Some(footer);
        self
    }

    #[must_use]
    pub fn css_class<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.css_class = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn close_methods(mut self, methods: impl IntoIterator<Item = CloseMethod>) -> Self {
        self.close_methods = Some(methods.into_iter().collect());
        self
    }

    #[must_use]
    pub const fn enable_scroll_lock(mut self, enable: bool) -> Self {
        self.enable_scroll_lock = Some(enable);
        self
    }

    #[must_use]
    pub fn scroll_lock_target(mut self, target: impl Fn(&dyn Host) -> ElementId + 'static) -> Self {
        self.scroll_lock_target = Some(Rc::new(target));
        self
    }

    #[must_use]
    pub fn on_open(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }

    /// Merge over `defaults`. Values set on `self` win.
    pub(crate) fn resolve(self, defaults: &ModalConfig) -> Settings {
        Settings {
            destroy_on_close: self.destroy_on_close.unwrap_or(defaults.destroy_on_close),
            footer: self.footer.unwrap_or(defaults.footer),
            css_class: self.css_class.unwrap_or_else(|| defaults.css_class.clone()),
            close_methods: self
                .close_methods
                .unwrap_or_else(|| defaults.close_methods.iter().copied().collect()),
            enable_scroll_lock: self
                .enable_scroll_lock
                .unwrap_or(defaults.enable_scroll_lock),
            scroll_lock_target: self.scroll_lock_target.unwrap_or_else(body_target),
            on_open: self.on_open,
            on_close: self.on_close,
        }
    }
}

fn body_target() -> TargetProvider {
    Rc::new(|host: &dyn Host| host.body())
}

/// Options after merging, fixed for the life of a modal.
pub(crate) struct Settings {
    pub destroy_on_close: bool,
    pub footer: bool,
    pub css_class: Vec<String>,
    pub close_methods: CloseMethods,
    pub enable_scroll_lock: bool,
    pub scroll_lock_target: TargetProvider,
    pub on_open: Option<Callback>,
    pub on_close: Option<Callback>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_close_methods_from_membership() {
        let methods: CloseMethods = [CloseMethod::Escape, CloseMethod::Button].into_iter().collect();
        assert!(methods.contains(CloseMethods::BUTTON));
        assert!(methods.contains(CloseMethods::ESCAPE));
        assert!(!methods.contains(CloseMethods::OVERLAY));
        assert_eq!(methods.methods(), vec![CloseMethod::Button, CloseMethod::Escape]);
    }

    #[test]
    fn test_defaults() {
        let settings = ModalOptions::new().resolve(&ModalConfig::default());
        assert!(settings.destroy_on_close);
        assert!(!settings.footer);
        assert!(settings.css_class.is_empty());
        assert_eq!(settings.close_methods, CloseMethods::all());
        assert!(settings.enable_scroll_lock);

        let doc = Document::new();
        assert_eq!((settings.scroll_lock_target)(&doc as &dyn Host), doc.body());
    }

    #[test]
    fn test_caller_values_win() {
        let defaults = ModalConfig {
            footer: true,
            css_class: vec!["from-config".to_string()],
            ..ModalConfig::default()
        };
        let settings = ModalOptions::new()
            .destroy_on_close(false)
            .css_class(["mine"])
            .close_methods([])
            .resolve(&defaults);

        assert!(!settings.destroy_on_close);
        assert!(settings.footer);
        assert_eq!(settings.css_class, vec!["mine".to_string()]);
        assert!(settings.close_methods.is_empty());
    }

    #[test]
    fn test_config_parses_from_toml() {
        let config: ModalConfig = toml::from_str(
            r#"
            footer = true
            close_methods = ["button", "escape"]
            "#,
        )
        .unwrap();

        assert!(config.footer);
        assert!(config.destroy_on_close);
        assert_eq!(config.close_methods, vec![CloseMethod::Button, CloseMethod::Escape]);
    }
}
