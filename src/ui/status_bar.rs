use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Component;
use crate::Theme;
use crate::config::{DemoAction, GlobalAction, KeyResolver, PageAction};
use crate::modal::ModalId;

/// A key and what it does, as listed in the status bar and help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
    /// Shown in the status bar, not only in help.
    pub hint: bool,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            hint: false,
        }
    }

    pub fn hint(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            hint: true,
            ..Self::new(key, description)
        }
    }
}

/// What the status bar reports about the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub open_modals: usize,
    pub top: Option<ModalId>,
    pub scroll_locked: bool,
    pub scroll: u16,
    pub max_scroll: u16,
}

pub struct StatusBar {
    resolver: Arc<KeyResolver>,
    info: StatusInfo,
}

impl StatusBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            resolver,
            info: StatusInfo {
                open_modals: 0,
                top: None,
                scroll_locked: false,
                scroll: 0,
                max_scroll: 0,
            },
        }
    }

    pub const fn set_info(&mut self, info: StatusInfo) {
        self.info = info;
    }

    /// Every binding, in the order help lists them.
    pub fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        vec![
            Keybinding::hint(r.display_demo(DemoAction::Open), "Open"),
            Keybinding::hint(r.display_demo(DemoAction::OpenStacked), "Stack"),
            Keybinding::hint("Esc", "Close top"),
            Keybinding::new(r.display_demo(DemoAction::CloseTop), "Close top"),
            Keybinding::new(r.display_demo(DemoAction::AddButton), "Add footer button"),
            Keybinding::new(
                r.display_demo(DemoAction::ToggleFooterContent),
                "Toggle footer note",
            ),
            Keybinding::new(r.display_page(PageAction::ScrollUp), "Scroll up"),
            Keybinding::new(r.display_page(PageAction::ScrollDown), "Scroll down"),
            Keybinding::new(r.display_page(PageAction::PageUp), "Page up"),
            Keybinding::new(r.display_page(PageAction::PageDown), "Page down"),
            Keybinding::hint(r.display_global(GlobalAction::Help), "Help"),
            Keybinding::hint(r.display_global(GlobalAction::Quit), "Quit"),
        ]
    }

    fn status_line(&self, theme: &Theme) -> Line<'static> {
        let label = Style::default().fg(theme.muted());
        let value = Style::default().fg(theme.page_fg());
        let (lock, lock_style) = if self.info.scroll_locked {
            ("locked", Style::default().fg(theme.warning()))
        } else {
            ("free", Style::default().fg(theme.success()))
        };
        let top = self
            .info
            .top
            .map_or_else(|| "-".to_string(), |id| id.to_string());

        Line::from(vec![
            Span::styled("open ", label),
            Span::styled(self.info.open_modals.to_string(), value),
            Span::styled("  top ", label),
            Span::styled(top, value),
            Span::styled("  scroll ", label),
            Span::styled(lock, lock_style),
            Span::styled(format!(" {}/{}", self.info.scroll, self.info.max_scroll), value),
        ])
    }

    fn hints_line(&self, theme: &Theme) -> Line<'static> {
        let spans = self
            .keybindings()
            .into_iter()
            .filter(|kb| kb.hint)
            .flat_map(|kb| {
                [
                    Span::styled(kb.key, Style::default().fg(theme.key_hint())),
                    Span::styled(format!(" {}  ", kb.description), Style::default().fg(theme.muted())),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()))
            .title(Span::styled(
                " lazymodal ",
                Style::default()
                    .fg(theme.button_fg())
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [status, hints] =
            Layout::horizontal([Constraint::Length(44), Constraint::Fill(1)]).areas(inner);
        frame.render_widget(Paragraph::new(self.status_line(theme)), status);
        frame.render_widget(Paragraph::new(self.hints_line(theme)), hints);
    }
}
