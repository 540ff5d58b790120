// Application state for the TUI
//
// Owns the session controller plus everything that is purely presentational:
// the input editor, transcript scroll position, palette overlay, and sidebar
// toggle. The event loop mutates this; views.rs only reads it.

use super::input::InputLine;
use super::palette::{self, Palette, PaletteAction};
use super::scroll::ScrollState;
use crate::config::Config;
use crate::events::IrcEvent;
use crate::logging::LogBuffer;
use crate::session::{SessionController, SessionState, SetupOutcome};
use crate::transport;
use tokio::sync::mpsc::UnboundedSender;

pub struct App {
    pub controller: SessionController,
    pub input: InputLine,
    pub scroll: ScrollState,
    pub palette: Palette,
    pub show_sidebar: bool,
    pub log_buffer: LogBuffer,
    pub should_quit: bool,

    /// Cloned into each transport task so inbound events reach the loop
    event_tx: UnboundedSender<IrcEvent>,
}

impl App {
    pub fn new(config: Config, log_buffer: LogBuffer, event_tx: UnboundedSender<IrcEvent>) -> Self {
        let show_sidebar = config.ui.show_sidebar;
        Self {
            controller: SessionController::new(config),
            input: InputLine::new(),
            scroll: ScrollState::new(),
            palette: Palette::default(),
            show_sidebar,
            log_buffer,
            should_quit: false,
            event_tx,
        }
    }

    pub fn in_setup(&self) -> bool {
        self.controller.state() == SessionState::Setup
    }

    /// Spawn a transport task for the configured server and start connecting
    pub fn connect(&mut self) {
        let outbound = transport::spawn(self.controller.config.irc.clone(), self.event_tx.clone());
        self.controller.begin_connecting(outbound);
    }

    pub fn handle_irc_event(&mut self, event: IrcEvent) {
        self.controller.handle_event(event);
    }

    /// Enter pressed at the prompt
    pub fn submit_input(&mut self) {
        let line = self.input.take();
        if self.in_setup() {
            if self.controller.handle_setup_input(&line) == SetupOutcome::Connect {
                self.connect();
            }
            return;
        }
        self.controller.handle_input(&line);
        if self.controller.quit_requested() {
            self.should_quit = true;
        }
    }

    pub fn request_quit(&mut self) {
        self.controller.request_quit(None);
        self.should_quit = true;
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Command palette
    // ─────────────────────────────────────────────────────────────────────

    pub fn open_palette(&mut self) {
        self.palette.open(self.palette_items());
    }

    pub fn palette_query_push(&mut self, c: char) {
        self.palette.query.push(c);
        let items = self.palette_items();
        self.palette.refilter(items);
    }

    pub fn palette_query_pop(&mut self) {
        self.palette.query.pop();
        let items = self.palette_items();
        self.palette.refilter(items);
    }

    pub fn palette_query_clear(&mut self) {
        self.palette.query.clear();
        self.palette.selected = 0;
        let items = self.palette_items();
        self.palette.refilter(items);
    }

    fn palette_items(&self) -> Vec<palette::PaletteItem> {
        let mut items = palette::static_items();
        let joined: Vec<String> = self
            .controller
            .joined_with_status()
            .into_iter()
            .map(|s| s.name)
            .collect();
        items.extend(palette::dynamic_items(
            self.controller.is_connected(),
            &joined,
            self.controller.current_channel(),
        ));
        items
    }

    /// Run the selected palette entry and close the overlay
    pub fn palette_execute(&mut self) {
        let Some(item) = self.palette.current().cloned() else {
            self.palette.close();
            return;
        };
        self.palette.close();

        match item.action {
            PaletteAction::Input(command) => {
                // Entries ending in a space want an argument; prefill the
                // prompt instead of running them incomplete
                if command.ends_with(' ') {
                    self.input.clear();
                    for c in command.chars() {
                        self.input.insert(c);
                    }
                } else {
                    self.controller.handle_input(&command);
                    if self.controller.quit_requested() {
                        self.should_quit = true;
                    }
                }
            }
            PaletteAction::NextChannel => self.controller.next_channel(),
            PaletteAction::PrevChannel => self.controller.prev_channel(),
            PaletteAction::ToggleSidebar => self.toggle_sidebar(),
            PaletteAction::ClearScreen => self.controller.clear_screen(),
            PaletteAction::ListChannels => self.controller.list_joined(),
            PaletteAction::ConnectionStatus => self.controller.connection_status(),
            PaletteAction::Reconnect => {
                if !self.controller.is_connected() {
                    self.connect();
                }
            }
        }
    }
}
