use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use seatbook_core::{Passenger, SharedLedger};
use tokio::sync::mpsc;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 32;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Check,
    Book,
    Free,
    Show,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 5] = [
        MenuAction::Check,
        MenuAction::Book,
        MenuAction::Free,
        MenuAction::Show,
        MenuAction::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuAction::Check => "Check availability of seat",
            MenuAction::Book => "Book a seat",
            MenuAction::Free => "Free a seat",
            MenuAction::Show => "Show booking state",
            MenuAction::Exit => "Exit program",
        }
    }

    fn from_digit(ch: char) -> Option<Self> {
        let idx = ch.to_digit(10)? as usize;
        idx.checked_sub(1).and_then(|idx| Self::ALL.get(idx).copied())
    }

    fn fields(self) -> &'static [Field] {
        match self {
            MenuAction::Check | MenuAction::Free => &[Field::Seat],
            MenuAction::Book => &[
                Field::Seat,
                Field::Passport,
                Field::FirstName,
                Field::LastName,
            ],
            MenuAction::Show | MenuAction::Exit => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Seat,
    Passport,
    FirstName,
    LastName,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Seat => "Seat ID (e.g. 1A)",
            Field::Passport => "Passport number",
            Field::FirstName => "First name",
            Field::LastName => "Last name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Menu,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Failure,
}

#[derive(Debug, PartialEq, Eq)]
enum PromptStep {
    Next,
    Rejected(String),
    Complete(Vec<String>),
}

/// Multi-field text prompt collecting the inputs for one menu action.
#[derive(Debug, Clone)]
struct InputPrompt {
    action: MenuAction,
    values: Vec<String>,
    input: String,
    cursor: usize,
}

impl InputPrompt {
    /// Returns `None` for actions that take no input.
    fn new(action: MenuAction) -> Option<Self> {
        if action.fields().is_empty() {
            return None;
        }
        Some(Self {
            action,
            values: Vec::new(),
            input: String::new(),
            cursor: 0,
        })
    }

    fn current_field(&self) -> Field {
        let fields = self.action.fields();
        fields
            .get(self.values.len())
            .or_else(|| fields.last())
            .copied()
            .unwrap_or(Field::Seat)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    fn submit(&mut self) -> PromptStep {
        let field = self.current_field();
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return PromptStep::Rejected(format!("{} is required", field.label()));
        }
        let value = match field {
            Field::Seat => normalize_seat_id(trimmed),
            _ => trimmed.to_string(),
        };
        self.values.push(value);
        self.input.clear();
        self.cursor = 0;
        if self.values.len() < self.action.fields().len() {
            PromptStep::Next
        } else {
            PromptStep::Complete(std::mem::take(&mut self.values))
        }
    }
}

fn normalize_seat_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

enum AppEvent {
    Input(Event),
    Tick,
}

struct UiState {
    menu_cursor: usize,
    focus: Focus,
    map_offset: usize,
    map_height: usize,
    status: String,
    status_kind: StatusKind,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            menu_cursor: 0,
            focus: Focus::Menu,
            map_offset: 0,
            map_height: 1,
            status: "Ready".to_string(),
            status_kind: StatusKind::Info,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_menu_cursor(&mut self, delta: isize) {
        let last = MenuAction::ALL.len() as isize - 1;
        self.menu_cursor = (self.menu_cursor as isize + delta).clamp(0, last) as usize;
    }

    fn scroll_map(&mut self, delta: isize, total: usize) {
        let max_offset = total.saturating_sub(self.map_height) as isize;
        self.map_offset = (self.map_offset as isize + delta).clamp(0, max_offset.max(0)) as usize;
    }

    fn set_status(&mut self, kind: StatusKind, message: String) {
        self.status_kind = kind;
        self.status = message;
    }
}

/// Terminal front end for the seat ledger.
pub struct SeatbookApp {
    ledger: SharedLedger,
    state: UiState,
    prompt: Option<InputPrompt>,
    theme: Theme,
}

impl SeatbookApp {
    pub fn new(ledger: SharedLedger) -> Self {
        Self {
            ledger,
            state: UiState::default(),
            prompt: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let occupancy = self.ledger.occupancy();
        self.state.set_status(
            StatusKind::Info,
            format!(
                "Cabin ready: {} seats, {} free",
                occupancy.total(),
                occupancy.free
            ),
        );

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = self.event_loop(&mut terminal, &mut event_rx).await;
        restore_terminal(&mut terminal)?;
        info!("Shell exited");
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => self.handle_input(event),
                // Ticks only force a redraw.
                Some(AppEvent::Tick) => {}
                None => break,
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }
        match self.state.focus {
            Focus::Menu => self.handle_menu_key(key),
            Focus::Map => self.handle_map_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_menu_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_menu_cursor(-1),
            KeyCode::Char(ch) if ch.is_ascii_digit() => match MenuAction::from_digit(ch) {
                Some(action) => {
                    self.state.menu_cursor = MenuAction::ALL
                        .iter()
                        .position(|item| *item == action)
                        .unwrap_or(0);
                    self.activate(action);
                }
                None => self
                    .state
                    .set_status(StatusKind::Failure, "Invalid choice".to_string()),
            },
            KeyCode::Enter => self.activate(MenuAction::ALL[self.state.menu_cursor]),
            _ => {}
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) {
        let total = self.ledger.render_state().len();
        let page = self.state.map_height.max(1) as isize;
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.state.focus = Focus::Menu;
                self.state
                    .set_status(StatusKind::Info, "Back to menu".to_string());
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_map(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_map(-1, total),
            KeyCode::PageDown => self.state.scroll_map(page, total),
            KeyCode::PageUp => self.state.scroll_map(-page, total),
            KeyCode::Char('g') | KeyCode::Home => self.state.map_offset = 0,
            KeyCode::Char('G') | KeyCode::End => self.state.scroll_map(total as isize, total),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let mut step = None;
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                self.state
                    .set_status(StatusKind::Info, "Cancelled".to_string());
                return;
            }
            KeyCode::Enter => step = Some(prompt.submit()),
            KeyCode::Left => prompt.move_cursor(-1),
            KeyCode::Right => prompt.move_cursor(1),
            KeyCode::Home => prompt.move_home(),
            KeyCode::End => prompt.move_end(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Delete => prompt.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    prompt.insert(ch);
                }
            }
            _ => {}
        }

        match step {
            Some(PromptStep::Rejected(message)) => {
                self.state.set_status(StatusKind::Failure, message);
            }
            Some(PromptStep::Complete(values)) => {
                let action = prompt.action;
                self.prompt = None;
                self.execute(action, &values);
            }
            Some(PromptStep::Next) | None => {}
        }
    }

    fn activate(&mut self, action: MenuAction) {
        match action {
            MenuAction::Check | MenuAction::Book | MenuAction::Free => {
                self.prompt = InputPrompt::new(action);
            }
            MenuAction::Show => {
                self.state.focus = Focus::Map;
                self.state.map_offset = 0;
                self.state.set_status(
                    StatusKind::Info,
                    "Showing booking state (j/k scroll, Esc back)".to_string(),
                );
            }
            MenuAction::Exit => self.state.should_quit = true,
        }
    }

    fn execute(&mut self, action: MenuAction, values: &[String]) {
        match (action, values) {
            (MenuAction::Check, [seat]) => {
                let available = self.ledger.check_availability(seat);
                debug!(%seat, available, "Availability checked");
                let (kind, verdict) = if available {
                    (StatusKind::Success, "Available")
                } else {
                    (StatusKind::Failure, "Not available")
                };
                self.state.set_status(kind, format!("{seat}: {verdict}"));
            }
            (MenuAction::Book, [seat, passport, first, last]) => {
                let passenger = Passenger::new(passport.as_str(), first.as_str(), last.as_str());
                match self.ledger.book_seat(seat, passenger) {
                    Ok(reference) => {
                        info!(%seat, %reference, "Booking successful");
                        self.state.set_status(
                            StatusKind::Success,
                            format!("Booking successful: {seat} (reference {reference})"),
                        );
                    }
                    Err(err) => {
                        info!(%seat, %err, "Booking failed");
                        self.state
                            .set_status(StatusKind::Failure, format!("Booking failed: {err}"));
                    }
                }
            }
            (MenuAction::Free, [seat]) => match self.ledger.free_seat(seat) {
                Ok(()) => {
                    info!(%seat, "Freeing successful");
                    self.state
                        .set_status(StatusKind::Success, format!("Freeing successful: {seat}"));
                }
                Err(err) => {
                    info!(%seat, %err, "Freeing failed");
                    self.state
                        .set_status(StatusKind::Failure, format!("Freeing failed: {err}"));
                }
            },
            (action, values) => {
                debug!(?action, received = values.len(), "Prompt values do not match action");
                self.state.set_status(
                    StatusKind::Failure,
                    format!("{}: unexpected input", action.label()),
                );
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(20)])
            .split(chunks[1]);

        self.render_title(frame, chunks[0]);
        self.render_menu(frame, body[0]);
        self.render_seat_map(frame, body[1]);
        self.render_status(frame, chunks[2]);
        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, prompt);
        }
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(Span::styled(
            "SEATBOOK · cabin seat ledger",
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(title, area);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let focused = self.state.focus == Focus::Menu && self.prompt.is_none();
        let lines: Vec<Line> = MenuAction::ALL
            .iter()
            .enumerate()
            .map(|(idx, action)| {
                let text = format!("{}. {}", idx + 1, action.label());
                if idx == self.state.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {text}"),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {text}"),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                }
            })
            .collect();

        let border = if focused {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let menu = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title("Menu"),
        );
        frame.render_widget(menu, area);
    }

    fn render_seat_map(&mut self, frame: &mut Frame, area: Rect) {
        let rows = self.ledger.render_state();
        self.state.map_height = area.height.saturating_sub(2) as usize;
        self.state.scroll_map(0, rows.len());

        let lines: Vec<Line> = rows
            .iter()
            .skip(self.state.map_offset)
            .take(self.state.map_height)
            .map(|row| {
                let spans: Vec<Span> = row
                    .split(' ')
                    .flat_map(|entry| {
                        [
                            Span::styled(entry.to_string(), self.seat_style(entry)),
                            Span::raw(" "),
                        ]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let border = if self.state.focus == Focus::Map {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let last = cmp::min(self.state.map_offset + self.state.map_height, rows.len());
        let title = format!(
            "Seat map (rows {}-{} of {})",
            self.state.map_offset + 1,
            last,
            rows.len()
        );
        let map = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        frame.render_widget(map, area);
    }

    fn seat_style(&self, entry: &str) -> Style {
        if entry.ends_with("(Booked)") {
            Style::default().fg(self.theme.danger)
        } else if entry.ends_with("(S)") {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default().fg(self.theme.success)
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let color = match self.state.status_kind {
            StatusKind::Info => self.theme.primary_fg,
            StatusKind::Success => self.theme.success,
            StatusKind::Failure => self.theme.danger,
        };
        let occupancy = self.ledger.occupancy();
        let secondary = format!(
            "Free {}  Booked {}  Storage {}",
            occupancy.free, occupancy.reserved, occupancy.storage
        );
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(self.state.status.clone(), Style::default().fg(color))),
            Line::from(Span::styled(secondary, Style::default().fg(self.theme.muted))),
        ])
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &InputPrompt) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(56_u16, frame_area.width.saturating_sub(4)), 24_u16);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let fields = prompt.action.fields();
        let title = format!(
            "{} ({}/{})",
            prompt.action.label(),
            prompt.values.len() + 1,
            fields.len()
        );
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);

        let paragraph = Paragraph::new(vec![
            Line::from(prompt.current_field().label()),
            input_line,
            Line::from(""),
            helper,
        ])
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + prompt.cursor as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 2;
        frame.set_cursor(cursor_x, cursor_y);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
