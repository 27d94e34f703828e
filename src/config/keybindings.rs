use serde::{Deserialize, Serialize};

use crate::config::key::KeyBinding;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageKeybindings {
    pub scroll_up: KeyBinding,
    pub scroll_down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoKeybindings {
    pub open: KeyBinding,
    pub open_stacked: KeyBinding,
    pub close_top: KeyBinding,
    pub add_button: KeyBinding,
    pub toggle_footer_content: KeyBinding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub page: PageKeybindings,
    pub demo: DemoKeybindings,
}
