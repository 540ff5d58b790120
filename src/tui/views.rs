// UI rendering
//
// All drawing lives here. The render functions read App state and never
// mutate anything except the transcript scroll dimensions, which have to be
// updated with the viewport size computed during layout.

use super::app::App;
use crate::logging::LogLevel;
use crate::session::{SessionState, SetupPhase};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    if app.in_setup() {
        draw_setup(f, app);
    } else {
        draw_main(f, app);
    }

    if app.palette.visible {
        draw_palette(f, app);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Setup wizard
// ─────────────────────────────────────────────────────────────────────────────

fn draw_setup(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let config = &app.controller.config.irc;
    let (title, prompt, current) = match app.controller.setup_phase() {
        SetupPhase::Server => (
            "Server",
            "IRC server (host:port)",
            config.server.clone(),
        ),
        SetupPhase::Nick => ("Nickname", "Your nickname", config.nick.clone()),
        SetupPhase::Channels => (
            "Channels",
            "Channels to join (comma-separated)",
            config.channels.join(", "),
        ),
        SetupPhase::Confirm => ("Confirm", "Connect now? [Y/n/r]", String::new()),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "tirc setup",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("{} (default: {})", prompt, current)),
        Line::from(""),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(
                app.input.text().to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
    ];

    if app.controller.setup_phase() == SetupPhase::Confirm {
        lines.insert(
            2,
            Line::from(Span::styled(
                format!(
                    "{} as {} -> {}",
                    config.server,
                    config.nick,
                    config.channels.join(", ")
                ),
                Style::default().fg(Color::Gray),
            )),
        );
    }

    if let Some(error) = app.controller.setup_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter accepts · Shift+Tab back · F1 help · Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Setup · {} ", title))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(widget, area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Main chat view
// ─────────────────────────────────────────────────────────────────────────────

fn draw_main(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(5),    // transcript (+ sidebar)
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let sidebar_width = app.controller.config.ui.sidebar_width;
    if app.show_sidebar && chunks[1].width > sidebar_width + 20 {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
            .split(chunks[1]);
        render_sidebar(f, body[0], app);
        render_transcript(f, body[1], app);
    } else {
        render_transcript(f, chunks[1], app);
    }

    render_input(f, chunks[2], app);
    render_status(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let state = match app.controller.state() {
        SessionState::Connected => Span::styled("● connected", Style::default().fg(Color::Green)),
        SessionState::Connecting => {
            Span::styled("◌ connecting", Style::default().fg(Color::Yellow))
        }
        SessionState::Setup => Span::styled("○ offline", Style::default().fg(Color::Red)),
    };

    let channel = app.controller.current_channel();
    let title = if channel.is_empty() {
        "(no channel)".to_string()
    } else {
        format!("{} @ {}", app.controller.nick(), channel)
    };

    let mut spans = vec![
        Span::styled(
            " tirc ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        state,
        Span::raw("  "),
        Span::styled(
            format!("({})", app.controller.config.irc.server),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(uptime) = app.controller.uptime() {
        spans.push(Span::styled(
            format!("  up {}", format_uptime(uptime)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// "MM:SS" under an hour, "HH:MM:SS" above
fn format_uptime(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .controller
        .joined_with_status()
        .into_iter()
        .enumerate()
        .map(|(i, status)| {
            let style = if status.active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if status.active { "➤" } else { " " };
            ListItem::new(Line::from(Span::styled(
                format!("{} {}. {}", marker, i + 1, status.name),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::RIGHT)
            .title(" Channels ")
            .title_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, area);
}

fn render_transcript(f: &mut Frame, area: Rect, app: &mut App) {
    let transcript = app.controller.transcript();
    let viewport = area.height as usize;
    app.scroll.update_dimensions(transcript.len(), viewport);
    let (start, end) = app.scroll.visible_range();

    let nick = app.controller.nick().to_string();
    let lines: Vec<Line> = transcript[start..end]
        .iter()
        .map(|l| style_line(l, &nick))
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// Color a transcript line by its leading glyph (after the HH:MM stamp)
fn style_line<'a>(line: &'a str, own_nick: &str) -> Line<'a> {
    // "HH:MM " prefix is 6 chars when present
    let body = line.get(6..).unwrap_or(line);

    let style = if body.starts_with('⚠') {
        Style::default().fg(Color::Red)
    } else if body.starts_with('•') {
        Style::default().fg(Color::Yellow)
    } else if body.starts_with('→') || body.starts_with('←') || body.starts_with('⇐') {
        Style::default().fg(Color::DarkGray)
    } else if body.starts_with('[') {
        Style::default().fg(Color::Magenta)
    } else if body.starts_with(&format!("<{}>", own_nick)) {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    Line::from(Span::styled(line, style))
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(app.input.text()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.controller.nick()))
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(input, area);

    // Place the real terminal cursor inside the box
    f.set_cursor_position((area.x + 1 + app.input.cursor_column(), area.y + 1));
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let channels = app.controller.joined_with_status().len();
    let mut spans = vec![Span::styled(
        format!(
            " {} channel{} · Tab next · Ctrl+P palette · Ctrl+B sidebar ",
            channels,
            if channels == 1 { "" } else { "s" }
        ),
        Style::default().fg(Color::DarkGray),
    )];

    // Surface the most recent warning or error from the log buffer
    if let Some(entry) = app.log_buffer.latest_problem() {
        let color = match entry.level {
            LogLevel::Error => Color::Red,
            _ => Color::Yellow,
        };
        spans.push(Span::styled(
            format!("· {} {} ", entry.level.as_str(), entry.message),
            Style::default().fg(color),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Command palette overlay
// ─────────────────────────────────────────────────────────────────────────────

fn draw_palette(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let query = Paragraph::new(format!("› {}", app.palette.query)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Command Palette ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(query, chunks[0]);

    let items: Vec<ListItem> = app
        .palette
        .filtered
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = i == app.palette.selected;
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let shortcut = if item.shortcut.is_empty() {
                String::new()
            } else {
                format!("  [{}]", item.shortcut)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", item.name), style),
                Span::styled(
                    format!("{} · {}{}", item.category, item.description, shortcut),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL ^ Borders::TOP)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, chunks[1]);
}

/// Centered sub-rectangle, percentages of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
