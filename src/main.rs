use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
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
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

use matchday_terminal::boxscore::TeamGame;
use matchday_terminal::config::{self, Config};
use matchday_terminal::feed;
use matchday_terminal::fixtures::{FixtureMatch, competition_by_code};
use matchday_terminal::lineup::PositionedPlayer;
use matchday_terminal::match_stats::PitchLayout;
use matchday_terminal::logging;
use matchday_terminal::state::{
    self, AppState, MatchDetail, MatchTab, ProviderCommand, Screen, apply_delta, view_label,
};
use matchday_terminal::stream::{LIVE_TV_PATH, PROVIDERS, STREAM_PARAM};
use matchday_terminal::summary::fmt_stat;
use matchday_terminal::timeline::{Category, Side, TimelineEvent};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    detail_refresh: Duration,
    last_detail_refresh: HashMap<u64, Instant>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: &Config) -> Self {
        Self {
            state: AppState::new(Local::now().date_naive()),
            should_quit: false,
            cmd_tx,
            detail_refresh: config.details_poll,
            last_detail_refresh: HashMap::new(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('r') => self.send(ProviderCommand::RefreshMatches, "Refresh requested"),
            _ => match self.state.screen {
                Screen::Matches => self.on_list_key(key),
                Screen::MatchCentre { .. } => self.on_centre_key(key),
            },
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('v') => self.state.cycle_view(),
            KeyCode::Char('c') => self.state.cycle_competition(),
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some((competition, game_id)) = self.state.open_selected() {
                    self.request_match_details(competition, game_id, true);
                }
            }
            _ => {}
        }
    }

    fn on_centre_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.state.back_to_list(),
            KeyCode::Tab | KeyCode::Right => self.state.cycle_tab(true),
            KeyCode::BackTab | KeyCode::Left => self.state.cycle_tab(false),
            KeyCode::Char('i') => {
                if let Some(m) = self.state.selected_match() {
                    let request = (m.competition.clone(), m.game_id);
                    self.request_match_details(request.0, request.1, true);
                }
            }
            KeyCode::Char('n') if self.state.tab == MatchTab::Stream => {
                self.state.cycle_stream_channel(true)
            }
            KeyCode::Char('p') if self.state.tab == MatchTab::Stream => {
                self.state.cycle_stream_channel(false)
            }
            KeyCode::Char('P') if self.state.tab == MatchTab::Stream => {
                self.state.cycle_stream_provider()
            }
            KeyCode::Char('L') if self.state.tab == MatchTab::Stream => {
                self.send(ProviderCommand::ReloadChannels, "Channel reload requested")
            }
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, announce: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
        } else {
            self.state.push_log(format!("[INFO] {announce}"));
        }
    }

    fn request_match_details(&mut self, competition: String, game_id: u64, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        if tx
            .send(ProviderCommand::FetchMatchDetails {
                competition,
                game_id,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Match details request failed");
            return;
        }
        if announce {
            self.state.push_log(format!("[INFO] Loading match {game_id}"));
        }
        self.last_detail_refresh.insert(game_id, Instant::now());
    }

    /// Re-polls the open match while it is in progress.
    fn maybe_refresh_match_details(&mut self) {
        let Screen::MatchCentre { .. } = self.state.screen else {
            return;
        };
        let Some(m) = self.state.selected_match().filter(|m| m.is_live()) else {
            return;
        };
        let (competition, game_id) = (m.competition.clone(), m.game_id);
        let due = self
            .last_detail_refresh
            .get(&game_id)
            .is_none_or(|t| t.elapsed() >= self.detail_refresh);
        if due {
            self.request_match_details(competition, game_id, false);
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let _log_guard = logging::init_file_logging("matchday_terminal");
    let config = Config::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), &config);
    if let Some(code) = stream_code_arg() {
        app.state.stream_query = format!("{STREAM_PARAM}={code}");
    }
    if config.sportsdata_api_key.is_none() {
        app.state
            .push_log("[WARN] SPORTSDATA_API_KEY not set; box scores unavailable");
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
        tracing::error!(error = %err, "ui loop failed");
        eprintln!("error: {err}");
    }
    Ok(())
}

/// `--stream <code>` preselects a channel the way a shared live-TV link does.
fn stream_code_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--stream" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--stream=") {
            return Some(value.to_string());
        }
    }
    None
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh_match_details();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Matches => render_match_list(frame, chunks[1], &app.state),
        Screen::MatchCentre { .. } => render_match_centre(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let competition = state
        .competition
        .and_then(competition_by_code)
        .map(|c| c.name)
        .unwrap_or("All competitions");
    match state.screen {
        Screen::Matches => format!(
            "MATCHDAY | {} | {} | {}",
            view_label(state.view),
            competition,
            if state.matches_loading {
                "loading..."
            } else {
                "ready"
            }
        ),
        Screen::MatchCentre { game_id } => format!("MATCHDAY | Match centre #{game_id}"),
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Matches => {
            "j/k Move | Enter Open | v View | c Competition | r Refresh | ? Help | q Quit"
                .to_string()
        }
        Screen::MatchCentre { .. } if state.tab == MatchTab::Stream => {
            "Tab Next tab | n/p Channel | P Provider | L Reload | b Back | q Quit".to_string()
        }
        Screen::MatchCentre { .. } => {
            "Tab/←/→ Tabs | i Reload | b/Esc Back | ? Help | q Quit".to_string()
        }
    }
}

fn render_match_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Matches").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = state.visible_matches();
    if visible.is_empty() {
        let text = if state.matches_loading {
            "Loading fixtures..."
        } else {
            "No matches for this view"
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let (start, end) = visible_range(state.selected, visible.len(), inner.height as usize);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let m = visible[idx];
            let style = if idx == state.selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else if m.is_live() {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::styled(match_row_text(m), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn match_row_text(m: &FixtureMatch) -> String {
    let kickoff = m
        .kickoff()
        .map(|k| k.format("%a %d %b %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    format!(
        "{kickoff:<16} {:<5} {:>22} {:^7} {:<22} {}",
        m.competition,
        m.home_team_name,
        m.score_text(),
        m.away_team_name,
        status_label(m)
    )
}

fn status_label(m: &FixtureMatch) -> &str {
    if m.is_final() {
        "FT"
    } else if m.is_live() {
        "LIVE"
    } else {
        m.status.as_str()
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
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

fn render_match_centre(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(m) = state.selected_match() else {
        frame.render_widget(Paragraph::new("Match not in the current listing"), area);
        return;
    };
    let detail = state.details.get(&m.game_id);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    render_score_panel(frame, rows[0], m, detail);

    let titles: Vec<&str> = MatchTab::ALL.iter().map(|t| t.label()).collect();
    let selected = MatchTab::ALL
        .iter()
        .position(|t| *t == state.tab)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, rows[1]);

    let body = rows[2];
    if state.tab == MatchTab::Stream {
        render_stream(frame, body, state);
        return;
    }
    let Some(detail) = detail else {
        frame.render_widget(
            Paragraph::new("Loading match details...")
                .block(Block::default().borders(Borders::ALL)),
            body,
        );
        return;
    };
    match state.tab {
        MatchTab::Summary => render_summary(frame, body, detail),
        MatchTab::Timeline => render_timeline(frame, body, detail),
        MatchTab::Lineups => render_pitch(frame, body, detail),
        MatchTab::Stats => render_stats(frame, body, detail),
        MatchTab::Stream => {}
    }
}

fn render_score_panel(
    frame: &mut Frame,
    area: Rect,
    m: &FixtureMatch,
    detail: Option<&MatchDetail>,
) {
    let score = detail
        .and_then(|d| d.score.as_ref())
        .map(|s| s.display())
        .unwrap_or_else(|| m.score_text());
    let scorers = |home: bool| -> String {
        detail
            .and_then(|d| d.score.as_ref())
            .map(|s| if home { &s.home_goals } else { &s.away_goals })
            .map(|goals| {
                goals
                    .iter()
                    .map(|g| g.scorer_label())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ])
        .split(area);

    let home = Paragraph::new(vec![
        Line::styled(m.home_team_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::from(scorers(true)),
    ])
    .alignment(Alignment::Right)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(home, cols[0]);

    let centre = Paragraph::new(vec![
        Line::styled(score, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Line::from(status_label(m).to_string()),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(centre, cols[1]);

    let away = Paragraph::new(vec![
        Line::styled(m.away_team_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::from(scorers(false)),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(away, cols[2]);
}

fn render_summary(frame: &mut Frame, area: Rect, detail: &MatchDetail) {
    let text = if let Some(err) = &detail.error {
        format!("Box score unavailable: {err}")
    } else if detail.summary.is_empty() {
        "No summary yet".to_string()
    } else {
        detail.summary.join("\n\n")
    };
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_timeline(frame: &mut Frame, area: Rect, detail: &MatchDetail) {
    let block = Block::default().title("Timeline").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 4 || inner.height < 4 {
        return;
    }

    let mut lines = timeline_track(&detail.timeline, inner.width as usize);
    lines.push(Line::from(""));
    if detail.timeline.is_empty() {
        lines.push(Line::from("No events yet"));
    }
    for event in &detail.timeline {
        lines.push(Line::from(vec![
            Span::raw(format!("{:>4}' ", event.minute)),
            Span::styled(
                format!("{:<6} ", marker_symbol(event.category)),
                marker_style(event.category),
            ),
            Span::raw(format!("{:<5} {}", event.side.as_str(), event.label)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Home markers above the track, away markers below.
fn timeline_track(events: &[TimelineEvent], width: usize) -> Vec<Line<'static>> {
    let mut home: Vec<Option<Category>> = vec![None; width];
    let mut away: Vec<Option<Category>> = vec![None; width];
    for event in events {
        let col = ((event.position_pct() / 100.0) * (width - 1) as f64).round() as usize;
        let row = match event.side {
            Side::Home => &mut home,
            Side::Away => &mut away,
        };
        row[col.min(width - 1)] = Some(event.category);
    }

    let marker_line = |row: Vec<Option<Category>>| -> Line<'static> {
        Line::from(
            row.into_iter()
                .map(|slot| match slot {
                    Some(cat) => Span::styled(marker_glyph(cat).to_string(), marker_style(cat)),
                    None => Span::raw(" "),
                })
                .collect::<Vec<_>>(),
        )
    };

    let mut axis: Vec<char> = vec!['─'; width];
    for minute in [0u32, 45, 90, 120] {
        let col = ((minute as f64 / 120.0) * (width - 1) as f64).round() as usize;
        axis[col.min(width - 1)] = '┼';
    }
    vec![
        marker_line(home),
        Line::styled(axis.into_iter().collect::<String>(), Style::default().fg(Color::DarkGray)),
        marker_line(away),
    ]
}

fn marker_glyph(category: Category) -> char {
    match category {
        Category::Goal => '●',
        Category::Yellow | Category::Red => '▮',
        Category::Substitution => '⇅',
    }
}

fn marker_symbol(category: Category) -> &'static str {
    match category {
        Category::Goal => "GOAL",
        Category::Yellow => "YC",
        Category::Red => "RC",
        Category::Substitution => "SUB",
    }
}

fn marker_style(category: Category) -> Style {
    match category {
        Category::Goal => Style::default().fg(Color::Green),
        Category::Yellow => Style::default().fg(Color::Yellow),
        Category::Red => Style::default().fg(Color::Red),
        Category::Substitution => Style::default().fg(Color::Cyan),
    }
}

fn render_pitch(frame: &mut Frame, area: Rect, detail: &MatchDetail) {
    let title = detail
        .stats
        .as_ref()
        .map(|s| {
            let formation = |l: Option<&matchday_terminal::lineup::TeamLineup>| {
                l.map(|l| format!("{} {}", l.team.name, l.formation))
                    .unwrap_or_default()
            };
            format!(
                "Lineups: {} v {}",
                formation(s.home_lineup()),
                formation(s.away_lineup())
            )
        })
        .unwrap_or_else(|| "Lineups".to_string());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(pitch) = &detail.pitch else {
        let text = if detail.stats_missing {
            "No lineup data for this match"
        } else {
            "Loading lineups..."
        };
        frame.render_widget(Paragraph::new(text), inner);
        return;
    };
    if inner.width < 10 || inner.height < 6 {
        return;
    }

    let field = if inner.width >= BENCH_MIN_WIDTH {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(BENCH_WIDTH)])
            .split(inner);
        render_bench(frame, cols[1], pitch);
        cols[0]
    } else {
        inner
    };

    let halfway = Rect {
        x: field.x,
        y: field.y + field.height / 2,
        width: field.width,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new("─".repeat(field.width as usize))
            .style(Style::default().fg(Color::DarkGray)),
        halfway,
    );

    for (players, colour) in [(&pitch.home, Color::Cyan), (&pitch.away, Color::Magenta)] {
        for placed in players {
            render_player(frame, field, placed, colour);
        }
    }
}

const BENCH_WIDTH: u16 = 26;
const BENCH_MIN_WIDTH: u16 = 60;

fn render_bench(frame: &mut Frame, area: Rect, pitch: &PitchLayout) {
    let mut lines = Vec::new();
    for (title, bench, colour) in [
        ("Home bench", &pitch.home_bench, Color::Cyan),
        ("Away bench", &pitch.away_bench, Color::Magenta),
    ] {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::styled(
            title,
            Style::default().fg(colour).add_modifier(Modifier::BOLD),
        ));
        if bench.is_empty() {
            lines.push(Line::styled("  -", Style::default().fg(Color::DarkGray)));
        }
        for sub in bench {
            let style = if sub.subbed_in {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::styled(sub.label(), style));
        }
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::LEFT)),
        area,
    );
}

fn render_player(frame: &mut Frame, pitch: Rect, placed: &PositionedPlayer, colour: Color) {
    let number = placed
        .player
        .number
        .map(|n| n.to_string())
        .unwrap_or_default();
    let badges: String = placed.events.iter().map(|b| b.symbol()).collect();
    let label = format!("{number} {}{badges}", placed.player.short_name());
    let label_width = (label.chars().count() as u16).min(pitch.width);

    let centre_x = ((placed.x / 100.0) * pitch.width as f64).round() as u16;
    let x = centre_x
        .saturating_sub(label_width / 2)
        .min(pitch.width - label_width);
    let y = ((placed.y / 100.0) * (pitch.height - 1) as f64).round() as u16;

    let style = if placed.player.is_goalkeeper() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colour).add_modifier(Modifier::BOLD)
    };
    let cell = Rect {
        x: pitch.x + x,
        y: pitch.y + y.min(pitch.height - 1),
        width: label_width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(label).style(style), cell);
}

fn render_stats(frame: &mut Frame, area: Rect, detail: &MatchDetail) {
    let Some(box_score) = &detail.box_score else {
        let text = detail
            .error
            .clone()
            .unwrap_or_else(|| "No stats yet".to_string());
        frame.render_widget(
            Paragraph::new(text).block(Block::default().title("Stats").borders(Borders::ALL)),
            area,
        );
        return;
    };
    let empty = TeamGame::default();
    let home = box_score.home_team_game().unwrap_or(&empty);
    let away = box_score.away_team_game().unwrap_or(&empty);
    let rows: [(&str, f64, f64); 7] = [
        ("Possession %", home.possession, away.possession),
        ("Shots", home.shots, away.shots),
        ("On target", home.shots_on_goal, away.shots_on_goal),
        ("Passes", home.passes, away.passes),
        ("Tackles", home.tackles, away.tackles),
        ("Fouls", home.fouls, away.fouls),
        ("Corners", home.corner_kicks, away.corner_kicks),
    ];

    let game = &box_score.game;
    let mut lines = vec![format!(
        "{:>14}  {:^14}  {:<14}",
        game.home_team_key, "", game.away_team_key
    )];
    for (name, h, a) in rows {
        lines.push(format!("{:>14}  {:^14}  {:<14}", fmt_stat(h), name, fmt_stat(a)));
    }
    lines.push(String::new());
    if let Some(attendance) = game.attendance {
        lines.push(format!("Attendance: {attendance}"));
    }
    if let (Some(h), Some(a)) = (&game.home_team_formation, &game.away_team_formation) {
        lines.push(format!("Formations: {h} / {a}"));
    }

    let paragraph = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Stats").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_stream(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(20)])
        .split(area);

    let providers: Vec<Line> = PROVIDERS
        .iter()
        .map(|p| {
            if p.keyword == state.stream.provider() {
                Line::styled(
                    format!("> {}", p.label),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )
            } else {
                Line::from(format!("  {}", p.label))
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(providers).block(Block::default().title("Providers").borders(Borders::ALL)),
        cols[0],
    );

    let current_url = state.stream.current().map(|c| c.url.as_str());
    let mut lines: Vec<Line> = state
        .stream
        .filtered()
        .into_iter()
        .map(|c| {
            if Some(c.url.as_str()) == current_url {
                Line::styled(
                    format!("> {}", c.label),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                )
            } else {
                Line::from(format!("  {}", c.label))
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from("No channels for this provider"));
    }
    lines.push(Line::from(""));
    match state.stream.current() {
        Some(channel) => {
            lines.push(Line::from(format!("Now playing: {}", channel.label)));
            lines.push(Line::from(format!("Source: {}", channel.url)));
            if !state.stream_query.is_empty() {
                lines.push(Line::from(format!(
                    "Link: {LIVE_TV_PATH}?{}",
                    state.stream_query
                )));
            }
        }
        None => lines.push(Line::from("No channel selected")),
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Channels").borders(Borders::ALL)),
        cols[1],
    );
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchday Terminal - Help",
        "",
        "Global:",
        "  r            Refresh fixtures",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Match list:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open match centre",
        "  v            Recent / Today / Live",
        "  c            Cycle competition",
        "",
        "Match centre:",
        "  Tab / ←/→    Switch tab",
        "  i            Reload details",
        "  b / Esc      Back",
        "  n / p        Next / previous channel (Stream)",
        "  P            Next provider (Stream)",
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
