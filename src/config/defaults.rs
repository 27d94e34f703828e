use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{DemoKeybindings, GlobalKeybindings, PageKeybindings};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            help: KeyBinding::from(vec![Key::char('?'), Key::new(KeyCode::F(1))]),
        }
    }
}

impl Default for PageKeybindings {
    fn default() -> Self {
        Self {
            scroll_up: KeyBinding::from(vec![Key::new(KeyCode::Up), Key::char('k')]),
            scroll_down: KeyBinding::from(vec![Key::new(KeyCode::Down), Key::char('j')]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: KeyBinding::from(vec![Key::new(KeyCode::PageDown), Key::char(' ')]),
        }
    }
}

// Esc is left out on purpose: it belongs to the modals' own listener.
impl Default for DemoKeybindings {
    fn default() -> Self {
        Self {
            open: Key::char('o').into(),
            open_stacked: Key::char('O').into(),
            close_top: Key::char('x').into(),
            add_button: Key::char('b').into(),
            toggle_footer_content: Key::char('f').into(),
        }
    }
}
