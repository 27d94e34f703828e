use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use lazymodal::Theme;
use lazymodal::config::{AppConfig, DemoAction, GlobalAction, KeyResolver, PageAction};
use lazymodal::dom::{Document, Host, Layout as BoxLayout};
use lazymodal::modal::{
    Environment, Modal, ModalId, ModalOptions, ModalState, NO_SCROLL_CLASS,
};
use lazymodal::ui::{
    Component, DocumentView, HitMap, StatusBar, StatusInfo, Toast, ToastManager, ToastType,
    transition_rules,
};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::tui::{Event, Tui};

const STATUS_HEIGHT: u16 = 3;
const PAGE_LINES: u16 = 200;
const WHEEL_LINES: u16 = 3;

/// Work queued by input handlers and modal callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Suspend,
    Resume,
    ClearScreen,
    Tick,
    Render,
    Resize(u16, u16),
    OpenStacked,
    Notify(ToastType, String),
}

fn notify(tx: &UnboundedSender<Command>, kind: ToastType, message: impl Into<String>) {
    if tx.send(Command::Notify(kind, message.into())).is_err() {
        warn!("Command channel closed, dropping notification");
    }
}

pub struct App {
    resolver: Arc<KeyResolver>,
    theme: Theme,
    doc: Rc<RefCell<Document>>,
    env: Environment,
    modals: Vec<Modal>,
    help: Option<Modal>,
    footer_notes: HashSet<ModalId>,
    opened: usize,
    buttons_added: usize,
    hits: HitMap,
    scroll: u16,
    status_bar: StatusBar,
    toasts: ToastManager,
    last_frame: Instant,
    should_quit: bool,
    should_suspend: bool,
    command_tx: UnboundedSender<Command>,
    command_rx: UnboundedReceiver<Command>,
}

impl App {
    pub fn new(config: &AppConfig, resolver: Arc<KeyResolver>, theme: Theme) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let mut doc = Document::new();
        for rule in transition_rules(&config.transition) {
            doc.add_transition_rule(rule);
        }
        let body = doc.body();
        doc.set_markup(body, &page_markup(&resolver));
        let doc = doc.shared();

        let host: Rc<RefCell<dyn Host>> = doc.clone();
        let env = Environment::new(host).with_defaults(config.modal.clone());

        Self {
            status_bar: StatusBar::new(Arc::clone(&resolver)),
            resolver,
            theme,
            doc,
            env,
            modals: Vec::new(),
            help: None,
            footer_notes: HashSet::new(),
            opened: 0,
            buttons_added: 0,
            hits: HitMap::default(),
            scroll: 0,
            toasts: ToastManager::new(),
            last_frame: Instant::now(),
            should_quit: false,
            should_suspend: false,
            command_tx,
            command_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(60.0, 4.0)?;
        tui.enter()?;
        let size = tui.size()?;
        self.resize_page(size.width, size.height);

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_commands(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.command_tx.send(Command::Resume)?;
                self.command_tx.send(Command::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Init => {}
            Event::Quit => self.command_tx.send(Command::Quit)?,
            Event::Suspend => self.command_tx.send(Command::Suspend)?,
            Event::Tick => self.command_tx.send(Command::Tick)?,
            Event::Render => self.command_tx.send(Command::Render)?,
            Event::Resize(width, height) => {
                self.command_tx.send(Command::Resize(width, height))?;
            }
            Event::Error(message) => notify(&self.command_tx, ToastType::Error, message),
            Event::Key(key) => self.handle_key(&key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        // Modals see every key first; Escape closes the topmost one.
        Document::dispatch_key(&self.doc, key);

        if self.resolver.matches_global(key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(key, GlobalAction::Help) {
            self.toggle_help();
        } else if let Some(action) = self.resolver.demo_action(key) {
            self.demo(action);
        } else if let Some(action) = self.resolver.page_action(key) {
            self.scroll_page(action);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = self.hits.hit_test(mouse.column, mouse.row) {
                    debug!(%target, "Click");
                    Document::dispatch_click(&self.doc, target);
                }
            }
            MouseEventKind::ScrollDown => self.scroll_by(i32::from(WHEEL_LINES)),
            MouseEventKind::ScrollUp => self.scroll_by(-i32::from(WHEEL_LINES)),
            _ => {}
        }
    }

    fn handle_commands(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(command) = self.command_rx.try_recv() {
            if !matches!(command, Command::Tick | Command::Render) {
                debug!(?command, "Handling command");
            }

            match command {
                Command::Quit => self.should_quit = true,
                Command::Suspend => self.should_suspend = true,
                Command::Resume => self.should_suspend = false,
                Command::ClearScreen => tui.clear()?,
                Command::Tick => self.tick(),
                Command::Render => self.render(tui)?,
                Command::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.resize_page(width, height);
                    self.render(tui)?;
                }
                Command::OpenStacked => self.open_new(),
                Command::Notify(kind, message) => self.toasts.show(Toast::new(message, kind)),
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.toasts.handle_tick();
        let before = self.modals.len();
        self.modals
            .retain(|modal| modal.state() != ModalState::Destroyed);
        if self.modals.len() != before {
            debug!(remaining = self.modals.len(), "Dropped destroyed modals");
        }
        let modals = &self.modals;
        self.footer_notes
            .retain(|id| modals.iter().any(|modal| modal.id() == *id));
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let now = Instant::now();
        Document::advance(&self.doc, now.duration_since(self.last_frame));
        self.last_frame = now;
        self.status_bar.set_info(self.status_info());

        tui.draw(|frame| {
            let [page, status] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(STATUS_HEIGHT)])
                    .areas(frame.area());
            let doc = self.doc.borrow();
            frame.render_stateful_widget(
                DocumentView::new(&doc, &self.theme).scroll(self.scroll),
                page,
                &mut self.hits,
            );
            self.status_bar.render(frame, status, &self.theme);
            self.toasts.render(frame, page, &self.theme);
        })?;
        Ok(())
    }

    fn resize_page(&mut self, width: u16, height: u16) {
        let mut doc = self.doc.borrow_mut();
        let body = doc.body();
        doc.set_layout(
            body,
            BoxLayout {
                width: u32::from(width),
                scroll_height: u32::from(PAGE_LINES),
                client_height: u32::from(height.saturating_sub(STATUS_HEIGHT)),
            },
        );
        drop(doc);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> u16 {
        let doc = self.doc.borrow();
        let metrics = doc.metrics(doc.body());
        u16::try_from(metrics.scroll_height.saturating_sub(metrics.client_height))
            .unwrap_or(u16::MAX)
    }

    fn page_locked(&self) -> bool {
        let doc = self.doc.borrow();
        doc.has_class(doc.body(), NO_SCROLL_CLASS)
    }

    fn status_info(&self) -> StatusInfo {
        StatusInfo {
            open_modals: self.env.stack.len(),
            top: self.env.stack.top(),
            scroll_locked: self.page_locked(),
            scroll: self.scroll,
            max_scroll: self.max_scroll(),
        }
    }

    fn scroll_page(&mut self, action: PageAction) {
        let page = i32::from(self.page_height().max(2) - 1);
        let delta = match action {
            PageAction::ScrollUp => -1,
            PageAction::ScrollDown => 1,
            PageAction::PageUp => -page,
            PageAction::PageDown => page,
        };
        self.scroll_by(delta);
    }

    fn page_height(&self) -> u16 {
        let doc = self.doc.borrow();
        u16::try_from(doc.metrics(doc.body()).client_height).unwrap_or(u16::MAX)
    }

    fn scroll_by(&mut self, delta: i32) {
        if self.page_locked() {
            debug!("Page is scroll locked");
            return;
        }
        let target = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = u16::try_from(target).unwrap_or(0);
    }

    fn top_modal(&self) -> Option<Modal> {
        let top = self.env.stack.top()?;
        self.modals
            .iter()
            .chain(self.help.iter())
            .find(|modal| modal.id() == top)
            .cloned()
    }

    fn demo(&mut self, action: DemoAction) {
        match action {
            DemoAction::Open => self.open(),
            DemoAction::OpenStacked => self.open_new(),
            DemoAction::CloseTop => match self.top_modal() {
                Some(modal) => {
                    if let Err(err) = modal.close() {
                        notify(&self.command_tx, ToastType::Error, err.to_string());
                    }
                }
                None => notify(&self.command_tx, ToastType::Info, "No modal is open"),
            },
            DemoAction::AddButton => match self.top_modal() {
                Some(modal) => self.add_button(&modal),
                None => notify(&self.command_tx, ToastType::Info, "No modal is open"),
            },
            DemoAction::ToggleFooterContent => match self.top_modal() {
                Some(modal) => self.toggle_footer_note(&modal),
                None => notify(&self.command_tx, ToastType::Info, "No modal is open"),
            },
        }
    }

    /// Reopen the most recent kept modal, or open a new one.
    fn open(&mut self) {
        let kept = self
            .modals
            .iter()
            .rev()
            .find(|modal| modal.state() == ModalState::Closed)
            .cloned();
        match kept {
            Some(modal) => {
                if let Err(err) = modal.open() {
                    notify(&self.command_tx, ToastType::Error, err.to_string());
                }
            }
            None => self.open_new(),
        }
    }

    fn open_new(&mut self) {
        self.opened += 1;
        let number = self.opened;
        let depth = self.env.stack.len() + 1;
        let content = format!(
            "<p><b>Modal {number}</b></p><p>Stack depth {depth}. Press Esc or click outside to \
             close the topmost modal. The page underneath cannot scroll while a modal is open.</p>"
        );

        let on_open_tx = self.command_tx.clone();
        let on_close_tx = self.command_tx.clone();
        let options = ModalOptions::new()
            .content(content)
            .footer(true)
            .css_class(["demo"])
            .on_open(move || notify(&on_open_tx, ToastType::Info, format!("Modal {number} open")))
            .on_close(move || {
                notify(&on_close_tx, ToastType::Success, format!("Modal {number} closed"));
            });

        let modal = match Modal::new(&self.env, options) {
            Ok(modal) => modal,
            Err(err) => {
                notify(&self.command_tx, ToastType::Error, err.to_string());
                return;
            }
        };

        modal.add_footer_button("Close", "btn btn--primary", |modal| {
            if let Err(err) = modal.close() {
                warn!(%err, "Close button failed");
            }
        });
        let stack_tx = self.command_tx.clone();
        modal.add_footer_button("Stack", "btn", move |_| {
            if stack_tx.send(Command::OpenStacked).is_err() {
                warn!("Command channel closed");
            }
        });
        modal.add_footer_button("Keep", "btn", |modal| {
            if let Err(err) = modal.close_with(false) {
                warn!(%err, "Keep button failed");
            }
        });

        match modal.open() {
            Ok(_) => self.modals.push(modal),
            Err(err) => notify(&self.command_tx, ToastType::Error, err.to_string()),
        }
    }

    fn add_button(&mut self, modal: &Modal) {
        self.buttons_added += 1;
        let title = format!("Extra {}", self.buttons_added);
        let tx = self.command_tx.clone();
        let message = format!("{title} clicked");
        modal.add_footer_button(title, "btn", move |modal| {
            notify(&tx, ToastType::Info, format!("{message} on {}", modal.id()));
        });
    }

    fn toggle_footer_note(&mut self, modal: &Modal) {
        let id = modal.id();
        if self.footer_notes.remove(&id) {
            modal.set_footer_content("");
        } else {
            modal.set_footer_content(format!("<small>Footer note for {id}</small>"));
            self.footer_notes.insert(id);
        }
    }

    fn toggle_help(&mut self) {
        if let Some(help) = &self.help {
            let result = if help.is_open() {
                help.close()
            } else {
                help.open().map(|_| ())
            };
            if let Err(err) = result {
                notify(&self.command_tx, ToastType::Error, err.to_string());
            }
            return;
        }

        let mut content = String::from("<p><b>Keys</b></p><ul>");
        for kb in self.status_bar.keybindings() {
            let _ = write!(
                content,
                "<li>{} - {}</li>",
                html_escape::encode_text(&kb.key),
                html_escape::encode_text(&kb.description)
            );
        }
        content.push_str("</ul>");

        let options = ModalOptions::new()
            .content(content)
            .footer(true)
            .destroy_on_close(false);
        let help = match Modal::new(&self.env, options) {
            Ok(help) => help,
            Err(err) => {
                notify(&self.command_tx, ToastType::Error, err.to_string());
                return;
            }
        };
        help.add_footer_button("Got it", "btn btn--primary", |modal| {
            if let Err(err) = modal.close() {
                warn!(%err, "Help close failed");
            }
        });
        if let Err(err) = help.open() {
            notify(&self.command_tx, ToastType::Error, err.to_string());
        }
        self.help = Some(help);
    }
}

fn page_markup(resolver: &KeyResolver) -> String {
    let mut markup = format!(
        "<p><b>lazymodal</b>: press {} to open a modal, {} to stack another on top, {} for help.</p>",
        html_escape::encode_text(&resolver.display_demo(DemoAction::Open)),
        html_escape::encode_text(&resolver.display_demo(DemoAction::OpenStacked)),
        html_escape::encode_text(&resolver.display_global(GlobalAction::Help)),
    );
    for line in 2..=PAGE_LINES {
        let _ = write!(
            markup,
            "<p>{line:03} Scroll the page, then open a modal: the scrollbar disappears and the \
             text stays where it is.</p>"
        );
    }
    markup
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use lazymodal::config::KeybindingsConfig;

    use super::*;

    fn app_with(config: &AppConfig) -> App {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        let mut app = App::new(config, resolver, Theme::default());
        app.resize_page(80, 24);
        app
    }

    fn app() -> App {
        app_with(&AppConfig::default())
    }

    fn settle(app: &App) {
        assert!(Document::run_until_idle(&app.doc, Duration::from_millis(50)));
    }

    fn press(app: &mut App, code: KeyCode) {
        let modifiers = match code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => KeyModifiers::SHIFT,
            _ => KeyModifiers::NONE,
        };
        app.handle_key(&KeyEvent::new(code, modifiers));
    }

    fn drain(app: &mut App) -> Vec<Command> {
        std::iter::from_fn(|| app.command_rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_open_then_escape() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        settle(&app);
        assert_eq!(app.env.stack.len(), 1);

        press(&mut app, KeyCode::Esc);
        settle(&app);
        app.tick();
        assert!(app.env.stack.is_empty());
        assert!(app.modals.is_empty());
    }

    #[test]
    fn test_stacked_modals_close_top_first() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('O'));
        settle(&app);
        let (first, second) = (app.modals[0].clone(), app.modals[1].clone());
        assert_eq!(app.env.stack.top(), Some(second.id()));

        press(&mut app, KeyCode::Char('x'));
        settle(&app);
        assert_eq!(second.state(), ModalState::Destroyed);
        assert_eq!(first.state(), ModalState::Open);
    }

    #[test]
    fn test_scroll_blocked_while_locked() {
        let mut app = app();
        press(&mut app, KeyCode::PageDown);
        let scrolled = app.scroll;
        assert!(scrolled > 0);

        press(&mut app, KeyCode::Char('o'));
        assert!(app.page_locked());
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll, scrolled);

        press(&mut app, KeyCode::Esc);
        settle(&app);
        assert!(!app.page_locked());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll, scrolled - 1);
    }

    #[test]
    fn test_no_scroll_lock_config() {
        let mut config = AppConfig::default();
        config.modal.enable_scroll_lock = false;
        let mut app = app_with(&config);

        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Down);
        assert!(!app.page_locked());
        assert_eq!(app.scroll, 1);
    }

    #[test]
    fn test_stack_button_queues_new_modal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        settle(&app);
        drain(&mut app);

        let footer = app.modals[0].footer_element().unwrap();
        let stack = app.doc.borrow().children(footer)[2];
        Document::dispatch_click(&app.doc, stack);
        assert_eq!(drain(&mut app), vec![Command::OpenStacked]);
    }

    #[test]
    fn test_keep_on_close_reopens_same_modal() {
        let mut config = AppConfig::default();
        config.modal.destroy_on_close = false;
        let mut app = app_with(&config);

        press(&mut app, KeyCode::Char('o'));
        settle(&app);
        let id = app.modals[0].id();
        press(&mut app, KeyCode::Esc);
        settle(&app);
        assert_eq!(app.modals[0].state(), ModalState::Closed);

        press(&mut app, KeyCode::Char('o'));
        settle(&app);
        app.tick();
        assert_eq!(app.modals.len(), 1);
        assert_eq!(app.modals[0].id(), id);
        assert_eq!(app.modals[0].state(), ModalState::Open);
    }

    #[test]
    fn test_add_button_and_footer_note_target_top_modal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('f'));

        let modal = app.modals[0].clone();
        assert_eq!(modal.footer_buttons().len(), 4);
        assert_eq!(modal.footer_buttons()[3].title, "Extra 1");
        assert!(app.footer_notes.contains(&modal.id()));

        press(&mut app, KeyCode::Char('f'));
        assert!(app.footer_notes.is_empty());
    }

    #[test]
    fn test_help_toggles_and_is_kept() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        settle(&app);
        let help = app.help.clone().unwrap();
        assert_eq!(help.state(), ModalState::Open);

        press(&mut app, KeyCode::Char('?'));
        settle(&app);
        assert_eq!(help.state(), ModalState::Closed);

        press(&mut app, KeyCode::Char('?'));
        assert!(help.is_open());
    }

    #[test]
    fn test_close_top_without_modal_notifies() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(
            drain(&mut app).as_slice(),
            [Command::Notify(ToastType::Info, _)]
        ));
    }

    #[test]
    fn test_help_lists_keys_as_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        let help = app.help.clone().unwrap();
        let content = help.content_element().unwrap();
        let markup = app.doc.borrow().markup(content).unwrap_or_default().to_string();
        assert!(markup.contains("<li>q - Quit</li>"));
    }
}
