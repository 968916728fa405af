use std::io;
use std::time::Duration;

use chrono::{Local, Utc};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use lessonfeed_core::format::{Body, SpanStyle};
use lessonfeed_core::types::{ConnectionState, Notification, NotificationKind};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::config::WatchSettings;
use crate::session::{Session, UserAction};
use crate::transport::WsDialer;
use crate::view::FeedView;

/// How often expired notifications are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Terminal cleanup guard
// ---------------------------------------------------------------------------

/// Restores the terminal on drop, including on panic and early `?` returns.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
    }
}

// ---------------------------------------------------------------------------
// Key mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    Action(UserAction),
}

pub fn command_for_key(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let action = match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Some(KeyCommand::Quit),
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => return Some(KeyCommand::Quit),
        (KeyCode::Char('p'), _) | (KeyCode::Char(' '), _) => UserAction::TogglePause,
        (KeyCode::Char('c'), _) => UserAction::Clear,
        (KeyCode::Char('d'), _) | (KeyCode::Char('x'), _) | (KeyCode::Delete, _) => {
            UserAction::DismissSelected
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => UserAction::SelectNext,
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => UserAction::SelectPrevious,
        (KeyCode::Char('r'), _) => UserAction::Reconnect,
        _ => return None,
    };
    Some(KeyCommand::Action(action))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the live feed until the user quits.
pub async fn run_watch(settings: WatchSettings) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::new(&settings, WsDialer, tx);
    tracing::info!(url = %settings.ws_url, "starting feed");
    session.start(Utc::now());

    enable_raw_mode()?;
    let _guard = TerminalGuard;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        terminal.draw(|frame| render(frame, session.view(), session.url()))?;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) => match command_for_key(key) {
                            Some(KeyCommand::Quit) => should_quit = true,
                            Some(KeyCommand::Action(action)) => {
                                session.handle_action(action, Utc::now());
                            }
                            None => {}
                        },
                        Event::FocusGained => session.handle_action(UserAction::Focus, Utc::now()),
                        _ => {}
                    }
                }
            }
            Some(ev) = rx.recv() => {
                session.handle_loop_event(ev, Utc::now());
            }
            _ = sweep.tick() => {
                session.tick(Utc::now());
            }
        }
    }

    terminal.show_cursor()?;
    tracing::info!("feed closed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn state_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::DarkGray,
        ConnectionState::Error => Color::Red,
    }
}

fn kind_color(kind: &NotificationKind) -> Color {
    match kind {
        NotificationKind::System => Color::Cyan,
        NotificationKind::Success => Color::Green,
        NotificationKind::Reminder => Color::Yellow,
        NotificationKind::Info => Color::Blue,
        NotificationKind::Error => Color::Red,
        NotificationKind::Other(_) => Color::Magenta,
    }
}

fn span_style(style: SpanStyle) -> Style {
    let mut out = Style::default();
    if style.strong {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.emphasis {
        out = out.add_modifier(Modifier::ITALIC);
    }
    out
}

fn body_lines(body: &Body) -> Vec<Line<'static>> {
    body.lines()
        .iter()
        .map(|line| {
            let mut spans = vec![Span::raw("   ")];
            spans.extend(
                line.spans
                    .iter()
                    .map(|s| Span::styled(s.text.clone(), span_style(s.style))),
            );
            Line::from(spans)
        })
        .collect()
}

fn notification_item(n: &Notification) -> ListItem<'static> {
    let color = kind_color(&n.kind);
    let time = n.created_at.with_timezone(&Local).format("%H:%M:%S").to_string();
    let mut lines = vec![Line::from(vec![
        Span::styled("\u{258C} ", Style::default().fg(color)),
        Span::styled(n.title.clone(), Style::default().bold()),
        Span::raw("  "),
        Span::styled(time, Style::default().fg(Color::DarkGray)),
    ])];
    lines.extend(body_lines(&n.body));
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(n.kind.label().to_owned(), Style::default().fg(color)),
    ]));
    ListItem::new(lines)
}

fn header_line(view: &FeedView, url: &str) -> Line<'static> {
    let mut spans = vec![
        Span::styled("\u{25CF} ", Style::default().fg(state_color(view.status.state))),
        Span::raw(view.status.label),
        Span::raw("  |  "),
        Span::raw(format!("{} notifications", view.count)),
    ];
    if view.paused {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled("PAUSED", Style::default().fg(Color::Yellow).bold()));
    }
    spans.push(Span::styled(format!("  {url}"), Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

fn render(frame: &mut Frame, view: &FeedView, url: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(5),    // Feed
            Constraint::Length(3), // Help bar
        ])
        .split(frame.area());

    let header = Paragraph::new(header_line(view, url)).block(
        Block::default()
            .title(" LESSONFEED ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, chunks[0]);

    let feed_block = Block::default().borders(Borders::ALL).title(" Notifications ");
    match view.placeholder {
        Some(placeholder) => {
            let (heading, detail) = placeholder.text();
            let text = vec![
                Line::from(Span::styled(heading, Style::default().bold())),
                Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
            ];
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(feed_block);
            frame.render_widget(paragraph, chunks[1]);
        }
        None => {
            let items: Vec<ListItem> = view.items.iter().map(notification_item).collect();
            let list = List::new(items)
                .block(feed_block)
                .highlight_style(Style::default().bg(Color::DarkGray));
            let mut state = ListState::default().with_selected(Some(view.selected));
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }
    }

    let pause_hint = if view.paused { "resume" } else { "pause" };
    let help = Paragraph::new(format!(
        " j/k: select | d: dismiss | c: clear | p: {pause_hint} | r: reconnect | q: quit"
    ))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
