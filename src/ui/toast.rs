use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::Component;
use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
    Error,
}

/// Short-lived notice shown in the bottom-right corner.
#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        let duration = match toast_type {
            ToastType::Error => Duration::from_secs(6),
            ToastType::Success | ToastType::Info => Duration::from_secs(3),
        };
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Error)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Component for ToastManager {
    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let toast_height = 3u16;
        let toast_width = 44u16.min(area.width.saturating_sub(4));
        let spacing = 1u16;

        // Newest at the bottom, older ones stacked upwards.
        for (i, toast) in self.toasts.iter().rev().enumerate() {
            let y_offset = u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(toast_height + spacing);
            let Some(y) = area
                .bottom()
                .checked_sub(toast_height + y_offset + 1)
                .filter(|y| *y >= area.y)
            else {
                break;
            };
            let x = area.x + area.width.saturating_sub(toast_width + 2);
            let toast_area = Rect::new(x, y, toast_width, toast_height);

            let (border_color, icon) = match toast.toast_type {
                ToastType::Success => (theme.success(), "✓"),
                ToastType::Info => (theme.info(), "ℹ"),
                ToastType::Error => (theme.error(), "✗"),
            };

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(theme.button_bg()));
            let inner = block.inner(toast_area);
            frame.render_widget(block, toast_area);

            let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
                .style(Style::default().fg(theme.page_fg()).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
        }
    }
}
