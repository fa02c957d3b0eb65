use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDate};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use team_terminal::config::{AppConfig, StoreConfig};
use team_terminal::feed::{load_initial_bundle, spawn_provider};
use team_terminal::persist;
use team_terminal::state::{
    AppState, CalendarFilter, EventKind, FormKind, Medal, Outcome, ProviderCommand, Screen,
    StatsTab, UPCOMING_LIMIT, apply_delta, data_source_label, player_detail_sections,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    data_file: Option<PathBuf>,
}

impl App {
    fn new(
        state: AppState,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        data_file: Option<PathBuf>,
    ) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            data_file,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.form.is_some() {
            self.on_form_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Dashboard,
            KeyCode::Char('2') => self.state.screen = Screen::Roster,
            KeyCode::Char('3') => self.state.screen = Screen::Calendar,
            KeyCode::Char('4') => self.state.screen = Screen::Stats,
            KeyCode::Enter => {
                if self.state.screen == Screen::Roster {
                    self.state.open_selected_player();
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => {
                if matches!(self.state.screen, Screen::PlayerDetail { .. }) {
                    self.state.screen = Screen::Roster;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('f') => self.state.cycle_calendar_filter(),
            KeyCode::Char('t') => self.state.cycle_stats_tab(),
            KeyCode::Char('p') => self.state.open_form(FormKind::Player),
            KeyCode::Char('e') => self.state.open_form(FormKind::Match),
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.close_form(),
            KeyCode::Enter => {
                if self.state.submit_form(now_millis()) {
                    self.save_local();
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left | KeyCode::Right => form.toggle_event_kind(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state
                .push_log("[INFO] Remote refresh unavailable (set AIRTABLE_TOKEN)");
            return;
        };
        if self.state.refreshing {
            self.state.push_log("[INFO] Refresh already running");
            return;
        }
        if tx.send(ProviderCommand::Refresh).is_err() {
            self.state.push_log("[WARN] Refresh request failed");
        } else {
            self.state.refreshing = true;
        }
    }

    fn save_local(&mut self) {
        let Some(path) = self.data_file.as_deref() else {
            self.state
                .push_log("[WARN] No data file location, changes kept in memory only");
            return;
        };
        if let Err(err) = persist::save_bundle(path, &self.state.bundle) {
            self.state.push_log(format!("[WARN] Save failed: {err:#}"));
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let store = StoreConfig::from_env();
    let app_config = AppConfig::from_env();

    let mut state = AppState::with_team(&store.team_name);
    let (bundle, source, notes) = load_initial_bundle(&app_config);
    state.set_bundle(bundle, source);
    for note in notes {
        state.push_log(note);
    }

    let (tx, rx) = mpsc::channel();
    let cmd_tx = if store.has_token() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        spawn_provider(store, tx, cmd_rx);
        Some(cmd_tx)
    } else {
        None
    };

    let mut app = App::new(state, cmd_tx, app_config.data_file);
    if app_config.auto_refresh {
        app.request_refresh();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<team_terminal::state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let today = Local::now().date_naive();
        terminal.draw(|f| ui(f, app, today))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn ui(frame: &mut Frame, app: &App, today: NaiveDate) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state, today),
        Screen::Roster => render_roster(frame, chunks[1], &app.state),
        Screen::PlayerDetail { player_id } => {
            render_player_detail(frame, chunks[1], &app.state, player_id)
        }
        Screen::Calendar => render_calendar(frame, chunks[1], &app.state, today),
        Screen::Stats => render_stats(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.form.is_some() {
        render_form(frame, frame.size(), &app.state);
    } else if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Dashboard => "DASHBOARD",
        Screen::Roster => "ROSTER",
        Screen::PlayerDetail { .. } => "PLAYER",
        Screen::Calendar => "CALENDAR",
        Screen::Stats => "STATS",
    };
    let refreshing = if state.refreshing { " | refreshing..." } else { "" };
    format!(
        " {} | {} | Data: {}{}",
        state.team_name.to_uppercase(),
        screen,
        data_source_label(state.source),
        refreshing
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Dashboard => {
            "1 Dash | 2 Roster | 3 Calendar | 4 Stats | p Add player | e Add event | r Refresh | ? Help | q Quit".to_string()
        }
        Screen::Roster => {
            "j/k/↑/↓ Move | Enter Details | p Add player | 1-4 Views | ? Help | q Quit".to_string()
        }
        Screen::PlayerDetail { .. } => "b/Esc Back | 1-4 Views | ? Help | q Quit".to_string(),
        Screen::Calendar => {
            "j/k/↑/↓ Scroll | f Filter | e Add event | 1-4 Views | ? Help | q Quit".to_string()
        }
        Screen::Stats => "t Leaderboard | 1-4 Views | ? Help | q Quit".to_string(),
    }
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState, today: NaiveDate) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);

    let summary = state.dashboard(today);
    let counters = [
        ("Players", summary.total_players.to_string()),
        ("Upcoming", summary.upcoming_events.to_string()),
        ("Goals", summary.total_goals.to_string()),
        ("Played", summary.matches_played.to_string()),
    ];
    for (idx, (title, value)) in counters.iter().enumerate() {
        let card = Paragraph::new(value.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().title(*title).borders(Borders::ALL));
        frame.render_widget(card, cards[idx]);
    }

    let upcoming = state.upcoming_events(today, UPCOMING_LIMIT);
    let text = if upcoming.is_empty() {
        "No events scheduled".to_string()
    } else {
        upcoming
            .iter()
            .map(|e| {
                format!(
                    "{:<12} {:<5} {}  ({})",
                    format_event_date(&e.date),
                    e.time,
                    e.title,
                    or_dash(&e.location)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let list = Paragraph::new(text)
        .block(Block::default().title("Upcoming events").borders(Borders::ALL));
    frame.render_widget(list, rows[1]);
}

fn roster_columns() -> [Constraint; 6] {
    [
        Constraint::Length(5),
        Constraint::Min(12),
        Constraint::Min(14),
        Constraint::Length(16),
        Constraint::Length(7),
        Constraint::Length(8),
    ]
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = roster_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    for (idx, label) in ["#", "First", "Last", "Position", "Goals", "Assists"]
        .iter()
        .enumerate()
    {
        render_cell_text(frame, header_cols[idx], label, bold);
    }

    let list_area = sections[1];
    let roster = state.roster();
    if roster.is_empty() {
        let empty = Paragraph::new("No players yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.roster_selected, roster.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.roster_selected;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        let p = roster[idx];
        render_cell_text(frame, cols[0], &p.shirt_label(), style);
        render_cell_text(frame, cols[1], &p.first_name, style);
        render_cell_text(frame, cols[2], &p.last_name, style);
        render_cell_text(frame, cols[3], or_dash(&p.position), style);
        render_cell_text(frame, cols[4], &p.goals.to_string(), style);
        render_cell_text(frame, cols[5], &p.assists.to_string(), style);
    }
}

fn render_player_detail(frame: &mut Frame, area: Rect, state: &AppState, player_id: &str) {
    let Some(player) = state.player(player_id) else {
        let empty = Paragraph::new("Player not found").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        format!("#{}  {}", player.shirt_label(), player.full_name()),
        if player.position.is_empty() {
            "Position not set".to_string()
        } else {
            player.position.clone()
        },
    ];
    for section in player_detail_sections(player) {
        lines.push(String::new());
        lines.push(format!("{}:", section.title));
        for (label, value) in section.rows {
            lines.push(format!("  {label:<20} {value}"));
        }
    }

    let detail = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Player").borders(Borders::ALL));
    frame.render_widget(detail, area);
}

fn render_calendar(frame: &mut Frame, area: Rect, state: &AppState, today: NaiveDate) {
    let title = format!("Calendar [{}]", calendar_filter_label(state.calendar_filter));
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let events = state.calendar_events();
    if events.is_empty() {
        let empty = Paragraph::new("No events found").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let start = state
        .calendar_scroll
        .min(events.len().saturating_sub(visible));
    let end = (start + visible).min(events.len());

    for (i, event) in events[start..end].iter().enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let past = event.parsed_date().is_some_and(|d| d < today);
        let style = if past {
            Style::default().fg(Color::DarkGray)
        } else {
            match event.kind {
                EventKind::Match { .. } => Style::default().fg(Color::Green),
                EventKind::Training { .. } => Style::default().fg(Color::Cyan),
            }
        };
        let detail = match &event.kind {
            EventKind::Match { result, home, .. } => {
                let venue = match home {
                    Some(true) => " home",
                    Some(false) => " away",
                    None => "",
                };
                match result {
                    Some(r) => format!("{}-{} {}{venue}", r.goals_for, r.goals_against, outcome_label(r.outcome())),
                    None => venue.trim().to_string(),
                }
            }
            EventKind::Training { notes } => notes.clone(),
        };
        let line = format!(
            "{:<16} {:<5} {:<8} {}  @ {}  {}",
            format_event_date(&event.date),
            event.time,
            event.kind_label(),
            event.title,
            or_dash(&event.location),
            detail
        );
        frame.render_widget(Paragraph::new(line).style(style), row_area);
    }
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let tabs = [StatsTab::Goals, StatsTab::Contributions, StatsTab::Motm]
        .iter()
        .map(|tab| {
            if *tab == state.stats_tab {
                format!("[{}]", stats_tab_label(*tab))
            } else {
                format!(" {} ", stats_tab_label(*tab))
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let block = Block::default().title(tabs).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = state.leaderboard(state.stats_tab);
    if rows.is_empty() {
        let empty = Paragraph::new("No players yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(Line::styled(
        match state.stats_tab {
            StatsTab::Contributions => format!(
                "{:<4} {:<28} {:<14} {:>5} {:>7} {:>6}",
                "Pos", "Player", "Position", "Goals", "Assists", "Total"
            ),
            StatsTab::Goals => format!("{:<4} {:<28} {:<14} {:>5}", "Pos", "Player", "Position", "Goals"),
            StatsTab::Motm => format!("{:<4} {:<28} {:<14} {:>5}", "Pos", "Player", "Position", "MOTM"),
        },
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for row in rows.iter().take(inner.height.saturating_sub(1) as usize) {
        let text = match state.stats_tab {
            StatsTab::Contributions => format!(
                "{:<4} {:<28} {:<14} {:>5} {:>7} {:>6}",
                row.rank,
                row.player.full_name(),
                row.player.position,
                row.player.goals,
                row.player.assists,
                row.value
            ),
            StatsTab::Goals | StatsTab::Motm => format!(
                "{:<4} {:<28} {:<14} {:>5}",
                row.rank,
                row.player.full_name(),
                row.player.position,
                row.value
            ),
        };
        let style = match row.medal {
            Some(Medal::Gold) => Style::default().fg(Color::Yellow),
            Some(Medal::Silver) => Style::default().fg(Color::Gray),
            Some(Medal::Bronze) => Style::default().fg(Color::Red),
            None => Style::default(),
        };
        lines.push(Line::styled(text, style));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(form) = state.form.as_ref() else {
        return;
    };
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let marker = if idx == form.focus { "> " } else { "  " };
        let cursor = if idx == form.focus { "_" } else { "" };
        lines.push(format!("{marker}{:<20} {}{cursor}", field.key.label(), field.value));
    }
    lines.push(String::new());
    let hint = match form.kind {
        FormKind::Player => "Tab Next field | Enter Save | Esc Cancel",
        FormKind::Match | FormKind::Training => {
            "Tab Next field | ←/→ Match/Training | Enter Save | Esc Cancel"
        }
    };
    lines.push(hint.to_string());

    let popup = Paragraph::new(lines.join("\n"))
        .block(Block::default().title(form.title()).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_event_date(raw: &str) -> String {
    match team_terminal::state::parse_event_date(raw) {
        Some(date) => date.format("%a %d %b %Y").to_string(),
        None if raw.trim().is_empty() => "TBD".to_string(),
        None => raw.trim().to_string(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn calendar_filter_label(filter: CalendarFilter) -> &'static str {
    match filter {
        CalendarFilter::All => "ALL",
        CalendarFilter::Matches => "MATCHES",
        CalendarFilter::Trainings => "TRAININGS",
    }
}

fn stats_tab_label(tab: StatsTab) -> &'static str {
    match tab {
        StatsTab::Goals => "Goals",
        StatsTab::Contributions => "Goals + Assists",
        StatsTab::Motm => "Man of the match",
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "W",
        Outcome::Draw => "D",
        Outcome::Loss => "L",
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Team Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3 / 4  Dashboard / Roster / Calendar / Stats",
        "  p              Add player",
        "  e              Add event",
        "  r              Refresh from record store",
        "  ?              Toggle help",
        "  q              Quit",
        "",
        "Roster:",
        "  j/k or ↑/↓     Move",
        "  Enter          Player details",
        "  b / Esc        Back",
        "",
        "Calendar:  f  Filter all/matches/trainings",
        "Stats:     t  Next leaderboard",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
