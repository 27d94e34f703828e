pub mod actions;
mod defaults;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
pub use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

use crate::modal::ModalConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Durations of the show/hide transitions, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Backdrop fade.
    pub opacity_ms: u64,
    /// Container slide. Its end completes opening and closing.
    pub transform_ms: u64,
}

impl TransitionConfig {
    pub const fn opacity(&self) -> Duration {
        Duration::from_millis(self.opacity_ms)
    }

    pub const fn transform(&self) -> Duration {
        Duration::from_millis(self.transform_ms)
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            opacity_ms: 150,
            transform_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub modal: ModalConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
}
