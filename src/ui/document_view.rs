use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, Clear, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget, Widget, Wrap,
};

use super::markup;
use crate::Theme;
use crate::dom::{Document, ElementId, Host, OPACITY, TRANSFORM, Tag};
use crate::modal::{
    BACKDROP_CLASS, CLOSE_CLASS, CONTAINER_CLASS, CONTENT_CLASS, FOOTER_BODY_CLASS, FOOTER_CLASS,
    NO_SCROLL_CLASS, SHOW_CLASS, has_scrollbar,
};

const MAX_CONTAINER_WIDTH: u16 = 64;
const MARGIN: u16 = 2;
const BUTTON_GAP: u16 = 1;

/// Screen regions of drawn elements, in paint order.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Rect, ElementId)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    fn push(&mut self, rect: Rect, element: ElementId) {
        self.regions.push((rect, element));
    }

    /// Topmost element drawn at the given cell.
    #[must_use]
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ElementId> {
        let position = Position::new(column, row);
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, element)| *element)
    }

    /// Where `element` was last drawn.
    #[must_use]
    pub fn rect_of(&self, element: ElementId) -> Option<Rect> {
        self.regions
            .iter()
            .rev()
            .find(|(_, e)| *e == element)
            .map(|(rect, _)| *rect)
    }
}

/// Draws a [`Document`]: the body as a scrollable page, then every visible
/// modal backdrop on top of it in document order.
pub struct DocumentView<'a> {
    doc: &'a Document,
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> DocumentView<'a> {
    pub const fn new(doc: &'a Document, theme: &'a Theme) -> Self {
        Self {
            doc,
            theme,
            scroll: 0,
        }
    }

    /// First page line shown.
    #[must_use]
    pub const fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn render_page(&self, area: Rect, buf: &mut Buffer, hits: &mut HitMap) {
        let body = self.doc.body();
        hits.push(area, body);

        let padding = u16::try_from(self.doc.padding_right(body).unwrap_or(0)).unwrap_or(u16::MAX);
        let show_scrollbar =
            !self.doc.has_class(body, NO_SCROLL_CLASS) && has_scrollbar(self.doc, body);
        let reserved = padding.saturating_add(u16::from(show_scrollbar));
        let text_area = Rect {
            width: area.width.saturating_sub(reserved),
            ..area
        };

        let style = Style::default().fg(self.theme.page_fg()).bg(self.theme.page_bg());
        buf.set_style(area, style);
        let text = self.doc.markup(body).map(markup::to_text).unwrap_or_default();
        Paragraph::new(text)
            .style(style)
            .scroll((self.scroll, 0))
            .render(text_area, buf);

        if show_scrollbar {
            let metrics = self.doc.metrics(body);
            let max_scroll = metrics.scroll_height.saturating_sub(metrics.client_height);
            let mut state = ScrollbarState::new(usize::try_from(max_scroll).unwrap_or(usize::MAX))
                .position(usize::from(self.scroll));
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(self.theme.scrollbar()))
                .render(area, buf, &mut state);
        }
    }

    /// A backdrop is drawn while shown or while any of its transitions run.
    fn is_visible(&self, backdrop: ElementId) -> bool {
        self.doc.has_class(backdrop, SHOW_CLASS)
            || self.doc.is_transitioning(backdrop, OPACITY)
            || self.doc.is_transitioning(backdrop, TRANSFORM)
    }

    fn render_modal(
        &self,
        backdrop: ElementId,
        focused: bool,
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitMap,
    ) {
        buf.set_style(
            area,
            Style::default()
                .fg(self.theme.backdrop_fg())
                .bg(self.theme.backdrop())
                .add_modifier(Modifier::DIM),
        );
        hits.push(area, backdrop);

        let Some(container) = self.child_with_class(backdrop, CONTAINER_CLASS) else {
            return;
        };
        let content = self.child_with_class(container, CONTENT_CLASS);
        let footer = self.child_with_class(container, FOOTER_CLASS);
        let close = self.child_with_class(container, CLOSE_CLASS);

        let width = area
            .width
            .saturating_sub(MARGIN * 2)
            .min(MAX_CONTAINER_WIDTH);
        // Borders plus one column of padding on each side.
        let text_width = width.saturating_sub(4);

        let content_text = content.map(|el| self.element_text(el)).unwrap_or_default();
        let footer_text = footer
            .and_then(|el| self.child_with_class(el, FOOTER_BODY_CLASS))
            .map(|el| self.element_text(el))
            .unwrap_or_default();
        let buttons: Vec<(ElementId, String)> = footer
            .map(|el| {
                self.doc
                    .children(el)
                    .iter()
                    .filter(|child| self.doc.tag(**child) == Some(Tag::Button))
                    .map(|child| (*child, format!(" {} ", self.element_text(*child))))
                    .collect()
            })
            .unwrap_or_default();

        let content_height = wrapped_height(&content_text, text_width);
        let footer_text_height = wrapped_height(&footer_text, text_width);
        let buttons_height = u16::from(!buttons.is_empty());
        let height = (content_height + footer_text_height + buttons_height + 2)
            .min(area.height.saturating_sub(MARGIN));

        // The container slides while its transform transition runs.
        let slide = u16::from(self.doc.is_transitioning(container, TRANSFORM));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2 + slide;
        let rect = Rect::new(x, y, width, height).intersection(area);

        let border = if focused {
            self.theme.border_focused()
        } else {
            self.theme.border()
        };
        let block = Block::bordered()
            .border_type(self.theme.border_type)
            .border_style(Style::default().fg(border))
            .style(
                Style::default()
                    .fg(self.theme.page_fg())
                    .bg(self.theme.container_bg()),
            )
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        Clear.render(rect, buf);
        block.render(rect, buf);
        hits.push(rect, container);

        let [content_area, footer_area, buttons_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(footer_text_height),
            Constraint::Length(buttons_height),
        ])
        .areas(inner);

        if let Some(content) = content {
            Paragraph::new(content_text)
                .wrap(Wrap { trim: true })
                .render(content_area, buf);
            hits.push(content_area, content);
        }

        if let Some(footer) = footer {
            hits.push(footer_area.union(buttons_area), footer);
            Paragraph::new(footer_text)
                .style(Style::default().fg(self.theme.footer_fg()))
                .wrap(Wrap { trim: true })
                .render(footer_area, buf);
            self.render_buttons(&buttons, buttons_area, buf, hits);
        }

        if let Some(close) = close {
            let label = format!("[{}]", self.element_text(close));
            let label_width = u16::try_from(Line::from(label.as_str()).width()).unwrap_or(3);
            let close_rect = Rect::new(
                rect.right().saturating_sub(label_width + 2),
                rect.y,
                label_width,
                1,
            )
            .intersection(rect);
            buf.set_stringn(
                close_rect.x,
                close_rect.y,
                &label,
                usize::from(close_rect.width),
                Style::default()
                    .fg(self.theme.close_button())
                    .bg(self.theme.container_bg()),
            );
            hits.push(close_rect, close);
        }
    }

    /// Footer buttons, right aligned, in order.
    fn render_buttons(
        &self,
        buttons: &[(ElementId, String)],
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitMap,
    ) {
        let widths: Vec<u16> = buttons
            .iter()
            .map(|(_, label)| u16::try_from(Line::from(label.as_str()).width()).unwrap_or(u16::MAX))
            .collect();
        let gaps = BUTTON_GAP * u16::try_from(buttons.len().saturating_sub(1)).unwrap_or(0);
        let total = widths.iter().fold(gaps, |sum, w| sum.saturating_add(*w));

        let style = Style::default()
            .fg(self.theme.button_fg())
            .bg(self.theme.button_bg())
            .add_modifier(Modifier::BOLD);
        let mut x = area.x + area.width.saturating_sub(total);
        for ((element, label), width) in buttons.iter().zip(widths) {
            let rect = Rect::new(x, area.y, width, area.height).intersection(area);
            if rect.is_empty() {
                break;
            }
            buf.set_stringn(rect.x, rect.y, label, usize::from(rect.width), style);
            hits.push(rect, *element);
            x = x.saturating_add(width + BUTTON_GAP);
        }
    }

    fn child_with_class(&self, parent: ElementId, class: &str) -> Option<ElementId> {
        self.doc
            .children(parent)
            .iter()
            .copied()
            .find(|child| self.doc.has_class(*child, class))
    }

    /// Text of an element and its descendants, one block per line.
    fn element_text(&self, element: ElementId) -> String {
        let own = self.doc.markup(element).map(markup::to_text);
        own.into_iter()
            .chain(
                self.doc
                    .children(element)
                    .iter()
                    .map(|child| self.element_text(*child)),
            )
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StatefulWidget for DocumentView<'_> {
    type State = HitMap;

    fn render(self, area: Rect, buf: &mut Buffer, hits: &mut Self::State) {
        hits.clear();
        self.render_page(area, buf, hits);

        let backdrops: Vec<ElementId> = self
            .doc
            .children(self.doc.body())
            .iter()
            .copied()
            .filter(|el| self.doc.has_class(*el, BACKDROP_CLASS) && self.is_visible(*el))
            .collect();
        let last = backdrops.len().saturating_sub(1);
        for (index, backdrop) in backdrops.into_iter().enumerate() {
            self.render_modal(backdrop, index == last, area, buf, hits);
        }
    }
}

/// Rows `text` needs when wrapped to `width` columns.
fn wrapped_height(text: &str, width: u16) -> u16 {
    if text.is_empty() {
        return 0;
    }
    let width = usize::from(width.max(1));
    let rows: usize = text
        .lines()
        .map(|line| Line::from(line).width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::TransitionConfig;
    use crate::dom::Layout as BoxLayout;
    use crate::modal::{Environment, Modal, ModalOptions};
    use crate::ui::transition_rules;

    const WIDTH: u16 = 60;
    const HEIGHT: u16 = 20;

    fn page() -> Rc<RefCell<Document>> {
        let mut doc = Document::new();
        for rule in transition_rules(&TransitionConfig::default()) {
            doc.add_transition_rule(rule);
        }
        let body = doc.body();
        let lines: String = (1..=40).map(|n| format!("<p>Line {n}</p>")).collect();
        doc.set_markup(body, &lines);
        doc.set_layout(
            body,
            BoxLayout {
                width: u32::from(WIDTH),
                scroll_height: 40,
                client_height: u32::from(HEIGHT),
            },
        );
        doc.shared()
    }

    fn environment(doc: &Rc<RefCell<Document>>) -> Environment {
        let host: Rc<RefCell<dyn Host>> = doc.clone();
        Environment::new(host)
    }

    fn draw(doc: &Rc<RefCell<Document>>, hits: &mut HitMap) -> Vec<String> {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
        terminal
            .draw(|frame| {
                let doc = doc.borrow();
                frame.render_stateful_widget(DocumentView::new(&doc, &theme), frame.area(), hits);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(WIDTH))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn settle(doc: &Rc<RefCell<Document>>) {
        assert!(Document::run_until_idle(doc, Duration::from_millis(50)));
    }

    #[test]
    fn test_page_renders_with_scrollbar() {
        let doc = page();
        let mut hits = HitMap::default();
        let rows = draw(&doc, &mut hits);

        assert!(rows[0].starts_with("Line 1"));
        assert!(rows[HEIGHT as usize - 1].starts_with("Line 20"));
        // Rightmost column belongs to the scrollbar.
        assert!(rows.iter().all(|row| !row.ends_with(' ')));
        assert_eq!(hits.hit_test(5, 5), Some(doc.borrow().body()));
    }

    #[test]
    fn test_unshown_backdrop_is_not_drawn() {
        let doc = page();
        let env = environment(&doc);
        let modal = Modal::new(&env, ModalOptions::new().content("<p>Hidden</p>")).unwrap();
        modal.open().unwrap();

        let mut hits = HitMap::default();
        let rows = draw(&doc, &mut hits);
        assert!(rows.iter().all(|row| !row.contains("Hidden")));
        assert_eq!(hits.hit_test(0, 0), Some(doc.borrow().body()));
    }

    #[test]
    fn test_open_modal_renders_content_and_buttons() {
        let doc = page();
        let env = environment(&doc);
        let modal =
            Modal::new(&env, ModalOptions::new().content("<p>Hi</p>").footer(true)).unwrap();
        modal.add_footer_button("OK", "btn", |_| {});
        let backdrop = modal.open().unwrap();
        settle(&doc);

        let mut hits = HitMap::default();
        let rows = draw(&doc, &mut hits);
        assert!(rows.iter().any(|row| row.contains("Hi")));
        assert!(rows.iter().any(|row| row.contains(" OK ")));
        assert!(rows.iter().any(|row| row.contains("[×]")));

        let button = doc.borrow().children(modal.footer_element().unwrap())[1];
        let rect = hits.rect_of(button).unwrap();
        assert_eq!(hits.hit_test(rect.x, rect.y), Some(button));
        assert_eq!(hits.hit_test(0, 0), Some(backdrop));
        let container = hits.rect_of(modal.container().unwrap()).unwrap();
        assert_eq!(
            hits.hit_test(container.x, container.y),
            modal.container()
        );
    }

    #[test]
    fn test_scroll_lock_hides_scrollbar_without_shifting_text() {
        let doc = page();
        let env = environment(&doc);
        let modal = Modal::new(&env, ModalOptions::new().content("<p>Hi</p>")).unwrap();
        let mut hits = HitMap::default();
        let before = draw(&doc, &mut hits);

        modal.open().unwrap();
        modal.close().unwrap();
        let closed = draw(&doc, &mut hits);
        assert_eq!(before, closed);

        modal.open().unwrap();
        settle(&doc);
        let body = doc.borrow().body();
        assert!(env.scroll_locks.is_locked(body));
        assert_eq!(doc.borrow().padding_right(body), Some(1));

        let locked = draw(&doc, &mut hits);
        assert!(locked[0].starts_with("Line 1"));
        assert!(locked[0].ends_with(' '));
    }

    #[test]
    fn test_topmost_modal_drawn_last() {
        let doc = page();
        let env = environment(&doc);
        let first = Modal::new(&env, ModalOptions::new().content("<p>first</p>")).unwrap();
        let second = Modal::new(&env, ModalOptions::new().content("<p>second</p>")).unwrap();
        first.open().unwrap();
        second.open().unwrap();
        settle(&doc);

        let mut hits = HitMap::default();
        let rows = draw(&doc, &mut hits);
        assert!(rows.iter().any(|row| row.contains("second")));
        assert_eq!(hits.hit_test(0, 0), second.backdrop());
    }

    #[test]
    fn test_wrapped_height() {
        assert_eq!(wrapped_height("", 10), 0);
        assert_eq!(wrapped_height("short", 10), 1);
        assert_eq!(wrapped_height("exactly ten", 10), 2);
        assert_eq!(wrapped_height("a\nb\nc", 10), 3);
    }
}
