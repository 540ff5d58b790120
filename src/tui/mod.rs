// Terminal UI
//
// Terminal setup/teardown, the main event loop, and keyboard dispatch.
// The loop multiplexes three sources with select!: keyboard/terminal input,
// inbound IRC events, and a periodic redraw tick. All session state changes
// happen on this one task.

pub mod app;
pub mod input;
pub mod palette;
pub mod scroll;
pub mod views;

use crate::config::Config;
use crate::events::IrcEvent;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the client until the user quits. `skip_setup` connects straight away
/// with the loaded configuration instead of walking through the wizard.
pub async fn run_tui(config: Config, log_buffer: LogBuffer, skip_setup: bool) -> Result<()> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, log_buffer, event_tx);
    if skip_setup {
        app.connect();
    }

    let result = run_event_loop(&mut terminal, &mut app, event_rx).await;

    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring terminal")?;
    terminal.show_cursor().context("showing cursor")?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut event_rx: mpsc::UnboundedReceiver<IrcEvent>,
) -> Result<()> {
    let mut tick = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("drawing frame")?;

        tokio::select! {
            // Terminal input, polled so the select! stays responsive
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        handle_key_event(app, key);
                    }
                }
            } => {}

            _ = tick.tick() => {}

            Some(irc_event) = event_rx.recv() => {
                app.handle_irc_event(irc_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Layered dispatch: palette overlay, then setup wizard, then the chat view
fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.request_quit();
        return;
    }

    if app.palette.visible {
        handle_palette_keys(app, key);
        return;
    }
    if app.in_setup() {
        handle_setup_keys(app, key);
        return;
    }
    handle_chat_keys(app, key);
}

fn handle_palette_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.palette.close(),
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.palette.close()
        }
        KeyCode::Enter => app.palette_execute(),
        KeyCode::Up => app.palette.select_prev(),
        KeyCode::Down => app.palette.select_next(),
        KeyCode::Backspace => app.palette_query_pop(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.palette_query_clear()
        }
        // Other Ctrl chords must not leak into the query
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.palette_query_push(c)
        }
        _ => {}
    }
}

fn handle_setup_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::BackTab => app.controller.setup_back(),
        KeyCode::F(1) => app.controller.setup_help(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.input.clear(),
        // Palette still works pre-connect, mainly for Reconnect
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => app.open_palette(),
        KeyCode::Char(c) => app.input.insert(c),
        _ => {}
    }
}

fn handle_chat_keys(app: &mut App, key: KeyEvent) {
    // Alt+1..9 jumps to a channel by its sidebar number
    if key.modifiers.contains(KeyModifiers::ALT) {
        if let KeyCode::Char(c @ '1'..='9') = key.code {
            app.controller.jump_to_index(c as usize - '1' as usize);
            return;
        }
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('p') => app.open_palette(),
            KeyCode::Char('b') => app.toggle_sidebar(),
            KeyCode::Char('u') => app.input.clear(),
            KeyCode::Char('a') => app.input.move_home(),
            KeyCode::Char('e') => app.input.move_end(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Tab => app.controller.next_channel(),
        KeyCode::BackTab => app.controller.prev_channel(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Up => app.scroll.scroll_up(),
        KeyCode::Down => app.scroll.scroll_down(),
        KeyCode::PageUp => app.scroll.page_up(),
        KeyCode::PageDown => app.scroll.page_down(),
        KeyCode::Char(c) => app.input.insert(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogBuffer;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::default(), LogBuffer::new(), tx)
    }

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_palette_ctrl_u_clears_query() {
        let mut app = app();
        app.open_palette();
        handle_key_event(&mut app, plain(KeyCode::Char('j')));
        handle_key_event(&mut app, plain(KeyCode::Char('o')));
        assert_eq!(app.palette.query, "jo");

        handle_key_event(&mut app, ctrl('u'));
        assert_eq!(app.palette.query, "");
        assert_eq!(app.palette.selected, 0);
        assert!(!app.palette.filtered.is_empty());
    }

    #[test]
    fn test_palette_ignores_other_ctrl_chords() {
        let mut app = app();
        app.open_palette();
        handle_key_event(&mut app, ctrl('a'));
        handle_key_event(&mut app, ctrl('e'));
        assert_eq!(app.palette.query, "");
    }
}
