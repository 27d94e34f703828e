use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DemoAction, GlobalAction, PageAction};
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to actions and actions back to their key labels.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Help => kb.help.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Help => kb.help.display(),
        }
    }

    // Page actions
    pub fn matches_page(&self, event: &KeyEvent, action: PageAction) -> bool {
        let kb = &self.keybindings.page;
        match action {
            PageAction::ScrollUp => kb.scroll_up.matches(event),
            PageAction::ScrollDown => kb.scroll_down.matches(event),
            PageAction::PageUp => kb.page_up.matches(event),
            PageAction::PageDown => kb.page_down.matches(event),
        }
    }

    pub fn display_page(&self, action: PageAction) -> String {
        let kb = &self.keybindings.page;
        match action {
            PageAction::ScrollUp => kb.scroll_up.display(),
            PageAction::ScrollDown => kb.scroll_down.display(),
            PageAction::PageUp => kb.page_up.display(),
            PageAction::PageDown => kb.page_down.display(),
        }
    }

    // Demo actions
    pub fn matches_demo(&self, event: &KeyEvent, action: DemoAction) -> bool {
        let kb = &self.keybindings.demo;
        match action {
            DemoAction::Open => kb.open.matches(event),
            DemoAction::OpenStacked => kb.open_stacked.matches(event),
            DemoAction::CloseTop => kb.close_top.matches(event),
            DemoAction::AddButton => kb.add_button.matches(event),
            DemoAction::ToggleFooterContent => kb.toggle_footer_content.matches(event),
        }
    }

    pub fn display_demo(&self, action: DemoAction) -> String {
        let kb = &self.keybindings.demo;
        match action {
            DemoAction::Open => kb.open.display(),
            DemoAction::OpenStacked => kb.open_stacked.display(),
            DemoAction::CloseTop => kb.close_top.display(),
            DemoAction::AddButton => kb.add_button.display(),
            DemoAction::ToggleFooterContent => kb.toggle_footer_content.display(),
        }
    }

    /// First page action bound to `event`.
    pub fn page_action(&self, event: &KeyEvent) -> Option<PageAction> {
        [
            PageAction::ScrollUp,
            PageAction::ScrollDown,
            PageAction::PageUp,
            PageAction::PageDown,
        ]
        .into_iter()
        .find(|action| self.matches_page(event, *action))
    }

    /// First demo action bound to `event`.
    pub fn demo_action(&self, event: &KeyEvent) -> Option<DemoAction> {
        [
            DemoAction::Open,
            DemoAction::OpenStacked,
            DemoAction::CloseTop,
            DemoAction::AddButton,
            DemoAction::ToggleFooterContent,
        ]
        .into_iter()
        .find(|action| self.matches_demo(event, *action))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn resolver() -> KeyResolver {
        KeyResolver::new(Arc::new(KeybindingsConfig::default()))
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_open_and_open_stacked_are_distinct() {
        let resolver = resolver();
        assert_eq!(
            resolver.demo_action(&press(KeyCode::Char('o'), KeyModifiers::NONE)),
            Some(DemoAction::Open)
        );
        assert_eq!(
            resolver.demo_action(&press(KeyCode::Char('O'), KeyModifiers::SHIFT)),
            Some(DemoAction::OpenStacked)
        );
    }

    #[test]
    fn test_escape_is_not_bound_by_default() {
        let resolver = resolver();
        let esc = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(resolver.demo_action(&esc), None);
        assert_eq!(resolver.page_action(&esc), None);
        assert!(!resolver.matches_global(&esc, GlobalAction::Quit));
    }

    #[test]
    fn test_display() {
        let resolver = resolver();
        assert_eq!(resolver.display_global(GlobalAction::Help), "?/F1");
        assert_eq!(resolver.display_page(PageAction::ScrollDown), "Down/j");
        assert_eq!(resolver.display_demo(DemoAction::OpenStacked), "O");
    }
}
