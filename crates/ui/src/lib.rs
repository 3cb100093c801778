//! ratatui-based UI.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use bookify_application::{
    AppContext, Card, CardPane, CardRef, LoginField, PaneState, ResultsPane, SearchTicket,
    SessionError,
};
use bookify_catalog::{CatalogSource, PendingFetch, spawn_search};
use bookify_core::{BookRecord, CardAction, CardMode, NO_FAVORITES_MESSAGE, Screen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui_image::picker::Picker;
use tracing::{debug, error};
use unicode_width::UnicodeWidthStr;

mod cover;
mod image_protocol;

use cover::CoverPanel;

const ACCENT: Color = Color::Cyan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Quit,
}

/// Focus inside the search view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SearchFocus {
    #[default]
    Input,
    Button,
    Results,
}

impl SearchFocus {
    fn next(self) -> Self {
        match self {
            SearchFocus::Input => SearchFocus::Button,
            SearchFocus::Button => SearchFocus::Results,
            SearchFocus::Results => SearchFocus::Input,
        }
    }

    fn prev(self) -> Self {
        match self {
            SearchFocus::Input => SearchFocus::Results,
            SearchFocus::Button => SearchFocus::Input,
            SearchFocus::Results => SearchFocus::Button,
        }
    }
}

pub struct Ui {
    ctx: AppContext,
    catalog: Arc<dyn CatalogSource>,
    searches: Vec<(SearchTicket, PendingFetch<Vec<BookRecord>>)>,
    cover: CoverPanel,
    image_picker: Picker,
    search_focus: SearchFocus,
    alert: Option<String>,
}

impl Ui {
    pub fn new(ctx: AppContext, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            ctx,
            catalog,
            searches: Vec::new(),
            cover: CoverPanel::default(),
            image_picker: Picker::halfblocks(),
            search_focus: SearchFocus::default(),
            alert: None,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        if let Some(ticket) = self.ctx.start() {
            self.dispatch(ticket);
        }

        let mut terminal = setup_terminal()?;
        self.image_picker =
            image_protocol::build_picker(&image_protocol::GraphicsHints::from_env());
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(UiExit::Quit)), Ok(())) => Ok(()),
            (Ok(Err(err)), Ok(())) => Err(err),
            (Ok(_), Err(err)) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<UiExit> {
        let tick_rate = Duration::from_millis(100);
        let mut needs_redraw = true;

        loop {
            if self.poll_background() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }

                    needs_redraw = true;
                    if let Some(exit) = self.handle_key(key)? {
                        return Ok(exit);
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<Option<UiExit>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(UiExit::Quit));
        }

        if self.alert.is_some() {
            // Any key dismisses the alert.
            self.alert = None;
            return Ok(None);
        }

        if !self.ctx.is_logged_in() {
            return self.handle_login_key(key);
        }

        if self.ctx.active_screen() == Screen::Search && self.search_focus != SearchFocus::Results
        {
            return self.handle_search_box_key(key);
        }

        self.handle_main_key(key)
    }

    /// Runs a catalog fetch for `ticket` on a worker thread.
    fn dispatch(&mut self, ticket: SearchTicket) {
        debug!("dispatch {:?} fetch for {:?}", ticket.pane, ticket.query);
        let pending = spawn_search(Arc::clone(&self.catalog), ticket.query.clone());
        self.searches.push((ticket, pending));
    }

    /// Applies finished fetches. Returns true when something visible changed.
    fn poll_background(&mut self) -> bool {
        let mut changed = false;
        let mut still_running = Vec::with_capacity(self.searches.len());
        for (ticket, pending) in self.searches.drain(..) {
            match pending.try_take() {
                Some(result) => changed |= self.ctx.finish_fetch(&ticket, result),
                None => still_running.push((ticket, pending)),
            }
        }
        self.searches = still_running;

        if self.ctx.active_screen() == Screen::Details
            && let Some(details) = self.ctx.details()
        {
            self.cover.sync(&details.book, &self.catalog);
        }
        changed | self.cover.poll()
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<Option<UiExit>> {
        let form = &mut self.ctx.login_form;
        match key.code {
            KeyCode::Esc => return Ok(Some(UiExit::Quit)),
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Enter => match form.focus {
                LoginField::Username => form.focus = LoginField::Password,
                LoginField::Password | LoginField::Submit => self.submit_login()?,
            },
            KeyCode::Backspace => match form.focus {
                LoginField::Username => {
                    form.username.pop();
                }
                LoginField::Password => {
                    form.password.pop();
                }
                LoginField::Submit => {}
            },
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match form.focus {
                    LoginField::Username => form.username.push(ch),
                    LoginField::Password => form.password.push(ch),
                    LoginField::Submit => {}
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn submit_login(&mut self) -> anyhow::Result<()> {
        match self.ctx.submit_login() {
            Ok(ticket) => {
                self.search_focus = SearchFocus::default();
                self.dispatch(ticket);
                Ok(())
            }
            Err(SessionError::Login(err)) => {
                self.alert = Some(err.to_string());
                Ok(())
            }
            Err(SessionError::Storage(err)) => Err(err.context("save session")),
        }
    }

    fn handle_search_box_key(&mut self, key: KeyEvent) -> anyhow::Result<Option<UiExit>> {
        let typing = self.search_focus == SearchFocus::Input;
        match key.code {
            KeyCode::Esc | KeyCode::Down => self.search_focus = SearchFocus::Results,
            KeyCode::Tab => self.search_focus = self.search_focus.next(),
            KeyCode::BackTab => self.search_focus = self.search_focus.prev(),
            KeyCode::Enter => self.submit_search(),
            KeyCode::Backspace if typing => {
                self.ctx.search.input.pop();
            }
            KeyCode::Char('u') if typing && key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ctx.search.input.clear();
            }
            KeyCode::Char(ch) if typing && !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ctx.search.input.push(ch);
            }
            // The button has no text, so the usual shortcuts still apply.
            _ if !typing => return self.handle_main_key(key),
            _ => {}
        }
        Ok(None)
    }

    fn submit_search(&mut self) {
        if let Some(ticket) = self.ctx.submit_search() {
            self.dispatch(ticket);
        }
        self.search_focus = SearchFocus::Results;
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> anyhow::Result<Option<UiExit>> {
        let screen = self.ctx.active_screen();
        match key.code {
            KeyCode::Char('q') => return Ok(Some(UiExit::Quit)),
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                self.show_screen(Screen::NAV[index]);
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace if screen != Screen::Home => {
                self.ctx.back();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Tab | KeyCode::Char('/') if screen == Screen::Search => {
                self.search_focus = SearchFocus::Input;
            }
            KeyCode::BackTab if screen == Screen::Search => {
                self.search_focus = SearchFocus::Button;
            }
            KeyCode::Enter => self.activate_selected(CardAction::Details),
            KeyCode::Char('f') if screen == Screen::Details => {
                let result = self.ctx.toggle_details_favorite().map(|_| ());
                self.report(result, "update favorites");
            }
            KeyCode::Char('f') => self.activate_selected(CardAction::ToggleFavorite),
            KeyCode::Char('x') | KeyCode::Delete => self.activate_selected(CardAction::Remove),
            KeyCode::Char('l') if screen == Screen::Profile => {
                let result = self.ctx.logout();
                self.report(result, "log out");
            }
            _ => {}
        }
        Ok(None)
    }

    fn show_screen(&mut self, screen: Screen) {
        self.ctx.show_screen(screen);
        if screen == Screen::Search {
            self.search_focus = SearchFocus::Input;
        }
    }

    fn selected_card(&self) -> Option<CardRef> {
        match self.ctx.active_screen() {
            Screen::Home => self
                .ctx
                .home
                .selected_index()
                .map(|index| CardRef::new(CardPane::Home, index)),
            Screen::Search => self
                .ctx
                .search
                .results
                .selected_index()
                .map(|index| CardRef::new(CardPane::Search, index)),
            Screen::Favorites => self
                .ctx
                .favorites_view
                .selected_index()
                .map(|index| CardRef::new(CardPane::Favorites, index)),
            Screen::Details | Screen::Profile => None,
        }
    }

    fn activate_selected(&mut self, action: CardAction) {
        let Some(at) = self.selected_card() else {
            return;
        };
        let result = self.ctx.activate_card(at, action);
        self.report(result, "update favorites");
    }

    fn move_selection(&mut self, delta: isize) {
        let forward = delta > 0;
        match self.ctx.active_screen() {
            Screen::Home => step(&mut self.ctx.home, forward),
            Screen::Search => step(&mut self.ctx.search.results, forward),
            Screen::Favorites if forward => self.ctx.favorites_view.select_next(),
            Screen::Favorites => self.ctx.favorites_view.select_prev(),
            Screen::Details | Screen::Profile => {}
        }

        fn step(pane: &mut ResultsPane, forward: bool) {
            if forward {
                pane.select_next();
            } else {
                pane.select_prev();
            }
        }
    }

    /// Storage failures are shown to the user rather than ending the session.
    fn report(&mut self, result: anyhow::Result<()>, action: &str) {
        if let Err(err) = result {
            error!("{action}: {err:#}");
            self.alert = Some(format!("Could not {action}: {err}"));
        }
    }

    fn draw(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        frame.render_widget(Clear, area);

        if self.ctx.is_logged_in() {
            self.draw_shell(area, frame);
        } else {
            self.draw_login(area, frame);
        }

        if let Some(message) = self.alert.as_deref() {
            draw_alert(message, area, frame);
        }
    }

    fn draw_login(&self, area: Rect, frame: &mut ratatui::Frame) {
        let popup = centered_rect(50, 40, area);
        let form = &self.ctx.login_form;
        let field_style = |field: LoginField| {
            if form.focus == field {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };
        let cursor = |field: LoginField| if form.focus == field { "_" } else { "" };

        let lines = vec![
            Line::raw(""),
            Line::from(vec![
                Span::styled("Username: ", field_style(LoginField::Username)),
                Span::raw(format!("{}{}", form.username, cursor(LoginField::Username))),
            ]),
            Line::from(vec![
                Span::styled("Password: ", field_style(LoginField::Password)),
                Span::raw(format!(
                    "{}{}",
                    "*".repeat(form.password.chars().count()),
                    cursor(LoginField::Password)
                )),
            ]),
            Line::raw(""),
            Line::styled("[ Log in ]", field_style(LoginField::Submit)),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" next field  "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" submit  "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" quit"),
            ]),
        ];

        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Bookify"));
        frame.render_widget(paragraph, popup);
    }

    fn draw_shell(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let screen = self.ctx.active_screen();
        let title = Paragraph::new(Line::from(vec![
            Span::styled("Bookify", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" · {}", screen.title())),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, layout[0]);

        match screen {
            Screen::Home => draw_results(&self.ctx.home, "Popular Books", layout[1], frame),
            Screen::Search => self.draw_search(layout[1], frame),
            Screen::Favorites => self.draw_favorites(layout[1], frame),
            Screen::Details => self.draw_details(layout[1], frame),
            Screen::Profile => self.draw_profile(layout[1], frame),
        }

        let footer = Paragraph::new(Text::from(vec![self.nav_line(), self.hint_line()]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[2]);
    }

    fn nav_line(&self) -> Line<'static> {
        let active = self.ctx.active_screen();
        let spans = Screen::NAV
            .iter()
            .enumerate()
            .flat_map(|(index, screen)| {
                let style = if *screen == active {
                    Style::default()
                        .fg(Color::Black)
                        .bg(ACCENT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                [
                    Span::styled(format!(" {} {} ", index + 1, screen.title()), style),
                    Span::raw(" "),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn hint_line(&self) -> Line<'static> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut hints: Vec<(&str, &str)> = match self.ctx.active_screen() {
            Screen::Home => vec![("↑/↓", "move"), ("Enter", "details"), ("f", "favorite")],
            Screen::Search => match self.search_focus {
                SearchFocus::Input => vec![("Enter", "search"), ("Tab", "button"), ("Esc", "results")],
                SearchFocus::Button => vec![("Enter", "search"), ("Tab", "results")],
                SearchFocus::Results => vec![
                    ("/", "edit query"),
                    ("↑/↓", "move"),
                    ("Enter", "details"),
                    ("f", "favorite"),
                ],
            },
            Screen::Favorites => vec![("↑/↓", "move"), ("Enter", "details"), ("x", "remove")],
            Screen::Details => vec![("f", "toggle favorite"), ("Esc", "back")],
            Screen::Profile => vec![("l", "log out"), ("Esc", "back")],
        };
        hints.push(("q", "quit"));

        let spans = hints
            .into_iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), bold),
                    Span::raw(format!(" {label}  ")),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_search(&self, area: Rect, frame: &mut ratatui::Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(12)])
            .split(layout[0]);

        let focused = |focus: SearchFocus| {
            if self.search_focus == focus {
                Style::default().fg(ACCENT)
            } else {
                Style::default()
            }
        };

        let cursor = if self.search_focus == SearchFocus::Input { "_" } else { "" };
        let input = Paragraph::new(format!("{}{cursor}", self.ctx.search.input)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused(SearchFocus::Input))
                .title("Search books"),
        );
        frame.render_widget(input, row[0]);

        let button = Paragraph::new(Span::styled(
            "Search",
            focused(SearchFocus::Button).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused(SearchFocus::Button)),
        );
        frame.render_widget(button, row[1]);

        draw_results(&self.ctx.search.results, &self.ctx.search.label, layout[1], frame);
    }

    fn draw_favorites(&self, area: Rect, frame: &mut ratatui::Frame) {
        let view = &self.ctx.favorites_view;
        let title = format!("My Favorites ({})", view.cards.len());
        if view.placeholder_visible() {
            draw_message(NO_FAVORITES_MESSAGE, &title, area, frame);
            return;
        }
        draw_cards(&view.cards, view.selected_index(), &title, area, frame);
    }

    fn draw_details(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        let Some(details) = self.ctx.details() else {
            draw_message("No book selected.", "Details", area, frame);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let book = &details.book;
        let mut lines = vec![
            Line::styled(book.title.clone(), bold),
            Line::raw(format!("by {}", book.author)),
            Line::raw(""),
            Line::from(vec![
                Span::styled(details.rating.glyphs(), Style::default().fg(Color::Yellow)),
                Span::raw(format!("  {}", details.rating_text)),
            ]),
            Line::raw(""),
        ];
        lines.extend(book.description.lines().map(|line| Line::raw(line.to_string())));
        lines.push(Line::raw(""));
        let button_style = if details.favorited {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            bold
        };
        lines.push(Line::from(vec![
            Span::styled("f", bold),
            Span::raw(" "),
            Span::styled(format!("[ {} ]", details.favorite_label()), button_style),
        ]));

        let text = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(text, layout[1]);

        self.cover.render(frame, layout[0], &self.image_picker);
    }

    fn draw_profile(&self, area: Rect, frame: &mut ratatui::Frame) {
        let profile = self.ctx.profile();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::raw(""),
            Line::from(vec![
                Span::styled("Username: ", bold),
                Span::raw(profile.username.clone()),
            ]),
            Line::from(vec![
                Span::styled("Avatar: ", bold),
                Span::raw(profile.avatar_url.clone()),
            ]),
            Line::raw(""),
            Line::from(vec![
                Span::styled("l", bold),
                Span::raw(" "),
                Span::styled("[ Log out ]", Style::default().fg(Color::Red)),
            ]),
        ];
        let paragraph = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Profile"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

fn draw_results(pane: &ResultsPane, title: &str, area: Rect, frame: &mut ratatui::Frame) {
    match &pane.state {
        PaneState::Idle => draw_message("", title, area, frame),
        PaneState::Loading => draw_message("Loading...", title, area, frame),
        PaneState::Loaded(cards) => draw_cards(cards, pane.selected_index(), title, area, frame),
        state => draw_message(state.message().unwrap_or_default(), title, area, frame),
    }
}

fn draw_message(message: &str, title: &str, area: Rect, frame: &mut ratatui::Frame) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_cards(
    cards: &[Card],
    selected: Option<usize>,
    title: &str,
    area: Rect,
    frame: &mut ratatui::Frame,
) {
    let max_width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| ListItem::new(Text::from(card_lines(card, max_width.max(8)))))
        .collect();

    let highlight_style = Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD);

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(highlight_style)
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn card_lines(card: &Card, max_width: usize) -> Vec<Line<'static>> {
    let marker = match card.mode {
        CardMode::Browsable => card.heart(),
        CardMode::Removable => "✕",
    };
    let mut lines = wrap_text(&format!("{marker} {}", card.book.title), max_width)
        .into_iter()
        .map(|line| Line::styled(line, Style::default().add_modifier(Modifier::BOLD)))
        .collect::<Vec<_>>();
    lines.push(Line::raw(format!("  {}", card.book.author)));
    lines.push(Line::styled(
        format!("  {}", card.rating.glyphs()),
        Style::default().fg(Color::Yellow),
    ));
    lines
}

fn draw_alert(message: &str, area: Rect, frame: &mut ratatui::Frame) {
    let popup = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup);
    let lines = vec![
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("press any key", Style::default().add_modifier(Modifier::DIM)),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Alert"),
        );
    frame.render_widget(paragraph, popup);
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        let sep_width = usize::from(!current.is_empty());

        if current_width + sep_width + word_width <= max_width {
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        // Hard-split words wider than the column.
        for ch in word.chars() {
            let mut buf = [0u8; 4];
            let w = UnicodeWidthStr::width(&*ch.encode_utf8(&mut buf));
            if current_width + w > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
