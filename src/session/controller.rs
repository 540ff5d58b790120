// Session controller - the central state machine
//
// Receives inbound protocol events and parsed user commands, mutates the
// channel registry, maintains the visible transcript, and emits outbound
// commands to the transport task. The controller runs entirely inside the
// single-threaded TUI event loop: every event is processed to completion
// before the next, so channel state never sees interleaved mutation.
//
// Propagation policy: nothing here is fatal. Every operation either succeeds,
// appends a visible transcript message, or is a documented no-op.

use super::command::{self, Command, ConfigAction, LoggingAction};
use super::format;
use super::navigator;
use super::registry::{ChannelRegistry, ChannelStatus};
use crate::config::{Config, DEFAULT_CHANNEL, DEFAULT_NICK, DEFAULT_SERVER};
use crate::events::{IrcEvent, OutboundCommand};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Guided configuration, also the holding state after a disconnect
    Setup,
    Connecting,
    Connected,
}

/// Steps of the guided first-run setup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    Server,
    Nick,
    Channels,
    Confirm,
}

/// What the caller should do after feeding a line to the setup wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Stay in setup (advanced a phase, or showed a validation error)
    Stay,
    /// Configuration confirmed - spawn the transport and connect
    Connect,
}

pub struct SessionController {
    pub config: Config,
    registry: ChannelRegistry,

    /// Flattened view of the current channel's messages, plus global lines.
    /// Always a copy of the channel buffer, never an alias into it.
    transcript: Vec<String>,

    current_channel: Option<String>,
    nick: String,
    state: SessionState,
    setup_phase: SetupPhase,
    setup_error: Option<String>,
    connected_at: Option<Instant>,

    /// Outbound command sink, present while a transport task is alive
    outbound: Option<UnboundedSender<OutboundCommand>>,

    quit_requested: bool,
}

impl SessionController {
    /// Create a session from a configuration snapshot. Channels named in the
    /// config are pre-registered as known-but-not-joined before any network
    /// activity.
    pub fn new(config: Config) -> Self {
        let mut registry = ChannelRegistry::new();
        for channel in &config.irc.channels {
            registry.register(channel);
        }
        let nick = config.irc.nick.clone();
        Self {
            config,
            registry,
            transcript: Vec::new(),
            current_channel: None,
            nick,
            state: SessionState::Setup,
            setup_phase: SetupPhase::Server,
            setup_error: None,
            connected_at: None,
            outbound: None,
            quit_requested: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read-only snapshots for rendering (pull model)
    // ─────────────────────────────────────────────────────────────────────

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Name of the currently displayed channel, empty if none selected
    pub fn current_channel(&self) -> &str {
        self.current_channel.as_deref().unwrap_or("")
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn joined_with_status(&self) -> Vec<ChannelStatus> {
        self.registry.list_with_status()
    }

    pub fn uptime(&self) -> Option<Duration> {
        self.connected_at.map(|t| t.elapsed())
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn setup_phase(&self) -> SetupPhase {
        self.setup_phase
    }

    pub fn setup_error(&self) -> Option<&str> {
        self.setup_error.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Setup wizard
    // ─────────────────────────────────────────────────────────────────────

    /// Feed one input line to the setup wizard. Empty input accepts the
    /// default for the current phase.
    pub fn handle_setup_input(&mut self, input: &str) -> SetupOutcome {
        let input = input.trim();
        self.setup_error = None;

        match self.setup_phase {
            SetupPhase::Server => {
                if input.is_empty() {
                    self.config.irc.server = DEFAULT_SERVER.to_string();
                } else if !validate_server_format(input) {
                    self.setup_error = Some(
                        "Invalid server format. Use: hostname:port (e.g., irc.libera.chat:6697)"
                            .to_string(),
                    );
                    return SetupOutcome::Stay;
                } else {
                    self.config.irc.server = input.to_string();
                }
                // SSL auto-detected from the conventional TLS port
                self.config.irc.use_ssl = self.config.irc.server.ends_with(":6697");
                self.setup_phase = SetupPhase::Nick;
            }
            SetupPhase::Nick => {
                if input.is_empty() {
                    self.config.irc.nick = DEFAULT_NICK.to_string();
                } else if !validate_nickname(input) {
                    self.setup_error = Some(
                        "Invalid nickname. Use 3-16 characters, letters, numbers, - and _ only"
                            .to_string(),
                    );
                    return SetupOutcome::Stay;
                } else {
                    self.config.irc.nick = input.to_string();
                }
                self.setup_phase = SetupPhase::Channels;
            }
            SetupPhase::Channels => {
                if input.is_empty() {
                    self.config.irc.channels = vec![DEFAULT_CHANNEL.to_string()];
                } else {
                    let mut channels = Vec::new();
                    for raw in input.split(',') {
                        let raw = raw.trim();
                        if raw.is_empty() {
                            continue;
                        }
                        let channel = command::normalize_channel(raw);
                        if !validate_channel_name(&channel) {
                            self.setup_error = Some(format!(
                                "Invalid channel name: {}. Use letters, numbers, - and _ only",
                                channel
                            ));
                            return SetupOutcome::Stay;
                        }
                        channels.push(channel);
                    }
                    if channels.is_empty() {
                        self.setup_error =
                            Some("Please enter at least one valid channel".to_string());
                        return SetupOutcome::Stay;
                    }
                    self.config.irc.channels = channels;
                }
                self.setup_phase = SetupPhase::Confirm;
            }
            SetupPhase::Confirm => match input.to_ascii_lowercase().as_str() {
                "" | "y" | "yes" => {
                    // Persist the finalized configuration before connecting
                    if let Err(e) = self.config.save() {
                        tracing::warn!("could not save config: {:#}", e);
                    }
                    // Nick may have changed since construction
                    self.nick = self.config.irc.nick.clone();
                    for channel in self.config.irc.channels.clone() {
                        self.registry.register(&channel);
                    }
                    return SetupOutcome::Connect;
                }
                "n" | "no" | "r" | "restart" => {
                    self.setup_phase = SetupPhase::Server;
                }
                _ => {
                    self.setup_error = Some(
                        "Press Enter to connect, 'n' to go back, or 'r' to restart".to_string(),
                    );
                }
            },
        }
        SetupOutcome::Stay
    }

    /// Step back to the previous setup phase (Shift+Tab)
    pub fn setup_back(&mut self) {
        self.setup_error = None;
        self.setup_phase = match self.setup_phase {
            SetupPhase::Server | SetupPhase::Nick => SetupPhase::Server,
            SetupPhase::Channels => SetupPhase::Nick,
            SetupPhase::Confirm => SetupPhase::Channels,
        };
    }

    /// Show a contextual hint for the current setup phase (F1)
    pub fn setup_help(&mut self) {
        self.setup_error = Some(
            match self.setup_phase {
                SetupPhase::Server => {
                    "Enter server:port (e.g., irc.libera.chat:6697). SSL auto-detected on port 6697"
                }
                SetupPhase::Nick => {
                    "Nickname: 3-16 chars, letters/numbers only, must start with letter or _"
                }
                SetupPhase::Channels => {
                    "Channels: comma-separated list (e.g., general,help,dev). # is added automatically"
                }
                SetupPhase::Confirm => {
                    "Press Enter to connect, 'n' to go back, or 'r' to restart setup"
                }
            }
            .to_string(),
        );
    }

    /// Attach a freshly spawned transport and enter the Connecting state
    pub fn begin_connecting(&mut self, outbound: UnboundedSender<OutboundCommand>) {
        self.outbound = Some(outbound);
        self.state = SessionState::Connecting;
        self.push_transcript(format::system(&format!(
            "Connecting to {}...",
            self.config.irc.server
        )));
        tracing::info!("connecting to {}", self.config.irc.server);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inbound protocol events
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: IrcEvent) {
        match event {
            IrcEvent::Connected => {
                self.state = SessionState::Connected;
                self.connected_at = Some(Instant::now());
                self.push_transcript(format::system("Connected to IRC server"));
                tracing::info!("connected to {}", self.config.irc.server);

                // Auto-join the configured channel list
                for channel in self.config.irc.channels.clone() {
                    self.registry.register(&channel);
                    self.send(OutboundCommand::Join(channel));
                }
            }

            IrcEvent::Disconnected => {
                self.state = SessionState::Setup;
                self.connected_at = None;
                self.outbound = None;
                self.push_transcript(format::error("Disconnected from IRC server"));
                tracing::warn!("disconnected from {}", self.config.irc.server);
            }

            IrcEvent::ConnectFailed(detail) => {
                self.state = SessionState::Setup;
                self.connected_at = None;
                self.outbound = None;
                self.push_transcript(format::error(&format!("Connection failed: {}", detail)));
                tracing::error!("connection failed: {}", detail);
            }

            IrcEvent::Chat {
                user,
                channel,
                text,
            } => {
                let line = format::chat(&user, &text);
                match channel {
                    Some(channel) => {
                        self.registry.append_message(&channel, line.clone());
                        if self.is_current(&channel) {
                            self.transcript.push(line);
                        }
                    }
                    // Private messages have no channel home - always visible
                    None => self.transcript.push(line),
                }
            }

            IrcEvent::NickChanged { old_nick, new_nick } => {
                if old_nick == self.nick {
                    tracing::info!("nick changed: {} -> {}", old_nick, new_nick);
                    self.nick = new_nick.clone();
                }
                self.push_transcript(format::system(&format!(
                    "{} is now known as {}",
                    old_nick, new_nick
                )));
            }

            IrcEvent::Joined { user, channel } => {
                if user.eq_ignore_ascii_case(&self.nick) {
                    self.registry.set_joined(&channel, true);
                    tracing::info!("joined {}", channel);

                    // Establish the initial working channel only: switch when
                    // nothing is selected or this is the sole joined channel.
                    let joined = self.registry.joined_channels();
                    if self.current_channel.is_none()
                        || (joined.len() == 1 && joined[0] == channel)
                    {
                        self.switch_to(&channel, false);
                    }
                }

                let line = format::join(&user, &channel);
                self.registry.append_message(&channel, line.clone());
                if self.is_current(&channel) {
                    self.transcript.push(line);
                }
            }

            IrcEvent::Parted {
                user,
                channel,
                reason,
            } => {
                let line = format::part(&user, &channel, reason.as_deref());
                self.registry.append_message(&channel, line.clone());
                if self.is_current(&channel) {
                    self.transcript.push(line);
                }
                // Server echo of our own PART confirms departure
                if user.eq_ignore_ascii_case(&self.nick) {
                    self.leave_channel(&channel);
                }
            }

            IrcEvent::Quit { user, reason } => {
                self.push_transcript(format::quit(&user, reason.as_deref()));
            }

            IrcEvent::Notice { from, text } => {
                self.push_transcript(format::notice(&from, &text));
            }

            IrcEvent::Error(detail) => {
                self.push_transcript(format::error(&detail));
                tracing::error!("{}", detail);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // User input
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, input: &str) {
        match command::parse(input) {
            Command::Empty => {}

            Command::Say(text) => match self.current_channel.clone() {
                Some(channel) => {
                    if self.send(OutboundCommand::SendChat {
                        channel: channel.clone(),
                        text: text.clone(),
                    }) {
                        let line = format::chat(&self.nick, &text);
                        self.registry.append_message(&channel, line.clone());
                        self.transcript.push(line);
                    }
                }
                None => {
                    self.push_transcript(format::error("No channel selected. Try /join <#channel>"))
                }
            },

            Command::Join(channel) => {
                self.registry.register(&channel);
                self.send(OutboundCommand::Join(channel));
            }

            Command::Part(target) => {
                let Some(channel) = target.or_else(|| self.current_channel.clone()) else {
                    self.push_transcript(format::error("No channel to part"));
                    return;
                };
                if self.send(OutboundCommand::Part(channel.clone())) {
                    self.leave_channel(&channel);
                }
            }

            // Local nickname changes only when the server confirms
            Command::Nick(new_nick) => {
                self.send(OutboundCommand::ChangeNick(new_nick));
            }

            Command::Msg { target, text } => {
                if self.send(OutboundCommand::SendDirect {
                    target,
                    text: text.clone(),
                }) {
                    let line = format::chat(&self.nick, &text);
                    self.transcript.push(line);
                }
            }

            Command::Switch(Some(name)) => match self.registry.find_joined(&name) {
                Some(found) => {
                    let found = found.to_string();
                    self.switch_to(&found, true);
                }
                None => self.push_transcript(format::error(&format!(
                    "Channel {} not found or not joined",
                    name
                ))),
            },

            Command::Switch(None) => {
                let joined = self.registry.joined_channels();
                if joined.is_empty() {
                    self.push_transcript(format::system("No channels joined"));
                } else {
                    self.push_transcript(format::system(&format!(
                        "Available channels: {}",
                        joined.join(", ")
                    )));
                }
            }

            Command::List(pattern) => {
                if self.send(OutboundCommand::List(pattern)) {
                    self.push_transcript(format::system("Requested channel list from server"));
                }
            }

            Command::Quit(reason) => self.request_quit(reason),

            Command::Help => {
                for line in HELP_TEXT {
                    self.push_transcript(format::system(line));
                }
            }

            Command::Config(action) => self.handle_config(action),
            Command::Logging(action) => self.handle_logging(action),

            Command::Raw(line) => {
                if self.send(OutboundCommand::Raw(line.clone())) {
                    self.push_transcript(format::system(&format!("→ {}", line)));
                }
            }

            Command::Usage(hint) => self.push_transcript(format::error(hint)),
        }
    }

    /// Quit the session: tell the server first if we are connected
    pub fn request_quit(&mut self, reason: Option<String>) {
        if self.is_connected() {
            let reason = reason.unwrap_or_else(|| self.config.irc.quit_message.clone());
            if let Some(tx) = &self.outbound {
                let _ = tx.send(OutboundCommand::Quit(Some(reason)));
            }
        }
        self.quit_requested = true;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Channel navigation
    // ─────────────────────────────────────────────────────────────────────

    /// Switch the displayed channel. No-op if the name is unknown or not
    /// joined. The transcript becomes a copy of the channel buffer so later
    /// buffer appends never mutate an already-rendered snapshot.
    pub fn switch_to(&mut self, name: &str, announce: bool) {
        if !self.registry.is_joined(name) {
            tracing::debug!("switch_to {}: not joined, ignoring", name);
            return;
        }

        let previous = self.current_channel.take();
        if let Some(prev) = &previous {
            self.registry.set_active(prev, false);
        }
        self.current_channel = Some(name.to_string());
        self.registry.set_active(name, true);

        self.transcript = self
            .registry
            .get(name)
            .map(|c| c.messages.clone())
            .unwrap_or_default();

        if announce && previous.as_deref() != Some(name) {
            self.transcript
                .push(format::channel_switch(&format!("• Now viewing {}", name)));
        }
    }

    /// Tab: cycle forward through joined channels
    pub fn next_channel(&mut self) {
        self.cycle_channel(true);
    }

    /// Shift+Tab: cycle backward through joined channels
    pub fn prev_channel(&mut self) {
        self.cycle_channel(false);
    }

    fn cycle_channel(&mut self, forward: bool) {
        let joined = self.registry.joined_channels();
        if joined.len() <= 1 {
            if joined.len() == 1 {
                self.push_transcript(format::system("Only one channel available"));
            }
            return;
        }

        let current = self.current_channel().to_string();
        let target = if forward {
            navigator::next(&current, &joined)
        } else {
            navigator::previous(&current, &joined)
        };
        let position = joined.iter().position(|c| *c == target).unwrap_or(0);

        self.switch_to(&target, false);
        let arrow = if forward { "→" } else { "←" };
        self.transcript.push(format::channel_switch(&format!(
            "{} Switched to {} ({}/{})",
            arrow,
            target,
            position + 1,
            joined.len()
        )));
    }

    /// Alt+1..9: jump straight to a channel by its displayed number
    pub fn jump_to_index(&mut self, zero_based: usize) {
        let joined = self.registry.joined_channels();
        if let Some(target) = navigator::by_index(&joined, zero_based) {
            let target = target.to_string();
            self.switch_to(&target, true);
        }
    }

    /// Clear the transcript and the current channel's buffer
    pub fn clear_screen(&mut self) {
        self.transcript.clear();
        if let Some(current) = self.current_channel.clone() {
            self.registry.clear_messages(&current);
        }
        self.push_transcript(format::system("Screen cleared"));
    }

    /// Show joined channels with the current one marked
    pub fn list_joined(&mut self) {
        let joined = self.registry.joined_channels();
        if joined.is_empty() {
            self.push_transcript(format::system("No channels joined"));
            return;
        }
        self.push_transcript(format::system("Joined channels:"));
        for (i, channel) in joined.iter().enumerate() {
            let marker = if self.is_current(channel) { "➤" } else { " " };
            let line = format!("{} {}. {}", marker, i + 1, channel);
            self.push_transcript(format::system(&line));
        }
    }

    /// Show connection details in the transcript
    pub fn connection_status(&mut self) {
        if self.is_connected() {
            let uptime = self
                .uptime()
                .map(|d| format!("{}s", d.as_secs()))
                .unwrap_or_default();
            let lines = [
                "Connection status: connected".to_string(),
                format!("Server: {}", self.config.irc.server),
                format!("Nickname: {}", self.nick),
                format!("Current channel: {}", self.current_channel()),
                format!("Uptime: {}", uptime),
            ];
            for line in lines {
                self.push_transcript(format::system(&line));
            }
        } else {
            self.push_transcript(format::system("Connection status: disconnected"));
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn is_current(&self, channel: &str) -> bool {
        self.current_channel.as_deref() == Some(channel)
    }

    fn push_transcript(&mut self, line: String) {
        self.transcript.push(line);
    }

    /// Dispatch an outbound command if the transport is ready.
    /// Commands issued before the connection is established are dropped with
    /// a visible error rather than queued.
    fn send(&mut self, cmd: OutboundCommand) -> bool {
        if self.state != SessionState::Connected {
            self.push_transcript(format::error("Not connected to a server"));
            return false;
        }
        match &self.outbound {
            Some(tx) => {
                if tx.send(cmd).is_err() {
                    self.push_transcript(format::error("Connection lost"));
                    false
                } else {
                    true
                }
            }
            None => {
                self.push_transcript(format::error("Not connected to a server"));
                false
            }
        }
    }

    /// Mark a channel departed and move the display off it if needed
    fn leave_channel(&mut self, channel: &str) {
        self.registry.set_joined(channel, false);
        self.registry.set_active(channel, false);

        if self.is_current(channel) {
            self.current_channel = None;
            let joined = self.registry.joined_channels();
            match joined.first() {
                Some(next) => {
                    let next = next.clone();
                    self.switch_to(&next, true);
                }
                None => self.transcript.clear(),
            }
        }
    }

    fn handle_config(&mut self, action: ConfigAction) {
        match action {
            ConfigAction::Show => {
                let path = Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(unknown)".to_string());
                let lines = [
                    format!("Config file: {}", path),
                    format!("Server: {}", self.config.irc.server),
                    format!("Nick: {}", self.config.irc.nick),
                    format!("Channels: {}", self.config.irc.channels.join(", ")),
                    format!("SSL: {}", self.config.irc.use_ssl),
                    format!(
                        "Logging: level={} file={}",
                        self.config.logging.level, self.config.logging.file_enabled
                    ),
                ];
                for line in lines {
                    self.push_transcript(format::system(&line));
                }
            }
            ConfigAction::Save => match self.config.save() {
                Ok(()) => self.push_transcript(format::system("Configuration saved")),
                Err(e) => {
                    self.push_transcript(format::error(&format!("Failed to save config: {:#}", e)))
                }
            },
            ConfigAction::Reload => {
                self.config = Config::load();
                self.push_transcript(format::system("Configuration reloaded"));
            }
        }
    }

    fn handle_logging(&mut self, action: LoggingAction) {
        let message = match action {
            LoggingAction::On => {
                self.config.logging.file_enabled = true;
                "File logging enabled (takes effect on restart)"
            }
            LoggingAction::Off => {
                self.config.logging.file_enabled = false;
                "File logging disabled (takes effect on restart)"
            }
            LoggingAction::DebugOn => {
                self.config.logging.level = "debug".to_string();
                "Debug logging enabled (takes effect on restart)"
            }
            LoggingAction::DebugOff => {
                self.config.logging.level = "info".to_string();
                "Debug logging disabled (takes effect on restart)"
            }
            LoggingAction::Status => {
                let lines = [
                    format!("Logging level: {}", self.config.logging.level),
                    format!("File logging: {}", self.config.logging.file_enabled),
                    format!("Log directory: {}", self.config.logging.file_dir.display()),
                ];
                for line in lines {
                    self.push_transcript(format::system(&line));
                }
                return;
            }
        };
        if let Err(e) = self.config.save() {
            tracing::warn!("could not save config: {:#}", e);
        }
        self.push_transcript(format::system(message));
    }
}

const HELP_TEXT: &[&str] = &[
    "Available commands:",
    "/join <#channel> - Join a channel",
    "/part [#channel] - Leave current channel or specified channel",
    "/switch <#channel> - Switch to a channel (or /sw)",
    "/nick <nickname> - Change nickname",
    "/msg <user> <message> - Send private message",
    "/list [pattern] - Request the server's channel list",
    "/config [show|save|reload] - Manage configuration",
    "/logging [on|off|debug on|debug off|status] - Control logging",
    "/quit [reason] - Quit",
    "/help - Show this help",
    "Anything else after / is sent to the server verbatim",
    "",
    "Key bindings:",
    "Tab / Shift+Tab - Next / previous channel",
    "Alt+1..9 - Jump to channel by number",
    "Ctrl+B - Toggle sidebar",
    "Ctrl+P - Command palette",
    "Ctrl+U - Clear input",
    "Ctrl+C - Exit",
];

// ─────────────────────────────────────────────────────────────────────────────
// Setup validation
// ─────────────────────────────────────────────────────────────────────────────

/// hostname:port, port numeric (an optional leading + marks SSL ports)
pub fn validate_server_format(server: &str) -> bool {
    let Some((host, port)) = server.split_once(':') else {
        return false;
    };
    if host.is_empty() || port.contains(':') {
        return false;
    }
    let port = port.strip_prefix('+').unwrap_or(port);
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}

/// 3-16 characters, first must be a letter or underscore, rest alphanumeric
/// plus - and _
pub fn validate_nickname(nick: &str) -> bool {
    let len = nick.chars().count();
    if !(3..=16).contains(&len) {
        return false;
    }
    let mut chars = nick.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// `#` followed by 1-49 alphanumeric/-/_ characters
pub fn validate_channel_name(channel: &str) -> bool {
    let Some(name) = channel.strip_prefix('#') else {
        return false;
    };
    if name.is_empty() || channel.chars().count() > 50 {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn test_config(nick: &str, channels: &[&str]) -> Config {
        let mut config = Config::default();
        config.irc.nick = nick.to_string();
        config.irc.channels = channels.iter().map(|s| s.to_string()).collect();
        config
    }

    /// A controller wired to a recording outbound channel, taken through
    /// the Connecting -> Connected transition.
    fn connected(
        nick: &str,
        channels: &[&str],
    ) -> (SessionController, UnboundedReceiver<OutboundCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut ctrl = SessionController::new(test_config(nick, channels));
        ctrl.begin_connecting(tx);
        ctrl.handle_event(IrcEvent::Connected);
        (ctrl, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<OutboundCommand>) -> Vec<OutboundCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    fn self_join(ctrl: &mut SessionController, nick: &str, channel: &str) {
        ctrl.handle_event(IrcEvent::Joined {
            user: nick.to_string(),
            channel: channel.to_string(),
        });
    }

    #[test]
    fn test_connect_emits_auto_joins_and_system_message() {
        let (ctrl, mut rx) = connected("alice", &["#general"]);

        let sent = drain(&mut rx);
        assert_eq!(sent, vec![OutboundCommand::Join("#general".to_string())]);
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Connected to IRC server")));
        assert_eq!(ctrl.state(), SessionState::Connected);
    }

    #[test]
    fn test_self_join_auto_switch_establishes_initial_channel() {
        let (mut ctrl, _rx) = connected("me", &["#test"]);
        assert_eq!(ctrl.current_channel(), "");

        self_join(&mut ctrl, "me", "#test");
        assert_eq!(ctrl.current_channel(), "#test");
        assert!(ctrl.joined_with_status()[0].active);

        // Another user joining must not move the display
        ctrl.handle_input("/join #second");
        self_join(&mut ctrl, "me", "#second");
        // Two channels joined now; display stayed where the user left it
        let before = ctrl.current_channel().to_string();
        self_join(&mut ctrl, "other", "#test");
        assert_eq!(ctrl.current_channel(), before);
    }

    #[test]
    fn test_self_join_does_not_steal_focus_after_initial() {
        let (mut ctrl, _rx) = connected("me", &["#a"]);
        self_join(&mut ctrl, "me", "#a");
        assert_eq!(ctrl.current_channel(), "#a");

        ctrl.handle_input("/join #b");
        self_join(&mut ctrl, "me", "#b");
        // Second self-join must not fire the initial-channel rule
        assert_eq!(ctrl.current_channel(), "#a");
    }

    #[test]
    fn test_single_active_channel_invariant() {
        let (mut ctrl, _rx) = connected("me", &["#a", "#b", "#c"]);
        for ch in ["#a", "#b", "#c"] {
            self_join(&mut ctrl, "me", ch);
        }

        for target in ["#b", "#c", "#a", "#c"] {
            ctrl.switch_to(target, true);
            let active: Vec<_> = ctrl
                .joined_with_status()
                .into_iter()
                .filter(|s| s.active)
                .collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].name, target);
            assert_eq!(ctrl.current_channel(), target);
        }
    }

    #[test]
    fn test_switch_to_unjoined_is_noop() {
        let (mut ctrl, _rx) = connected("me", &["#a"]);
        self_join(&mut ctrl, "me", "#a");

        ctrl.switch_to("#nowhere", true);
        assert_eq!(ctrl.current_channel(), "#a");
    }

    #[test]
    fn test_transcript_is_copy_not_alias() {
        let (mut ctrl, _rx) = connected("me", &["#a", "#b"]);
        self_join(&mut ctrl, "me", "#a");
        self_join(&mut ctrl, "me", "#b");

        ctrl.switch_to("#b", false);
        let len_before = ctrl.transcript().len();

        // A message for #a while #b is displayed must not leak into the view
        ctrl.handle_event(IrcEvent::Chat {
            user: "bob".to_string(),
            channel: Some("#a".to_string()),
            text: "hidden".to_string(),
        });
        assert_eq!(ctrl.transcript().len(), len_before);

        // But it is waiting in #a's buffer when we switch back
        ctrl.switch_to("#a", false);
        assert!(ctrl.transcript().iter().any(|l| l.contains("<bob> hidden")));
    }

    #[test]
    fn test_message_isolation() {
        let (mut ctrl, mut rx) = connected("me", &["#x", "#y"]);
        self_join(&mut ctrl, "me", "#x");
        self_join(&mut ctrl, "me", "#y");
        drain(&mut rx);

        // #x is current (initial auto-switch); say something
        assert_eq!(ctrl.current_channel(), "#x");
        ctrl.handle_input("a message");

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::SendChat {
                channel: "#x".to_string(),
                text: "a message".to_string(),
            }]
        );
        assert!(ctrl.transcript().iter().any(|l| l.contains("a message")));

        // Nothing about it in #y
        ctrl.switch_to("#y", false);
        assert!(!ctrl.transcript().iter().any(|l| l.contains("a message")));
    }

    #[test]
    fn test_private_message_always_hits_transcript() {
        let (mut ctrl, _rx) = connected("me", &["#a"]);
        self_join(&mut ctrl, "me", "#a");

        ctrl.handle_event(IrcEvent::Chat {
            user: "carol".to_string(),
            channel: None,
            text: "psst".to_string(),
        });
        assert!(ctrl.transcript().iter().any(|l| l.contains("<carol> psst")));
    }

    #[test]
    fn test_part_then_navigate() {
        let (mut ctrl, mut rx) = connected("me", &["#a", "#b"]);
        self_join(&mut ctrl, "me", "#a");
        self_join(&mut ctrl, "me", "#b");
        assert_eq!(ctrl.current_channel(), "#a");
        drain(&mut rx);

        ctrl.handle_input("/part");
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Part("#a".to_string())]
        );
        let joined: Vec<_> = ctrl
            .joined_with_status()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(joined, vec!["#b"]);
        assert_eq!(ctrl.current_channel(), "#b");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (mut ctrl, mut rx) = connected("alice", &["#general"]);
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Join("#general".to_string())]
        );
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Connected")));

        self_join(&mut ctrl, "alice", "#general");
        assert_eq!(ctrl.current_channel(), "#general");
        assert_eq!(
            ctrl.joined_with_status()
                .into_iter()
                .map(|s| s.name)
                .collect::<Vec<_>>(),
            vec!["#general"]
        );

        ctrl.handle_event(IrcEvent::Chat {
            user: "bob".to_string(),
            channel: Some("#general".to_string()),
            text: "hi".to_string(),
        });
        assert!(ctrl.transcript().last().unwrap().contains("<bob> hi"));

        ctrl.handle_input("/part");
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Part("#general".to_string())]
        );
        assert!(ctrl.joined_with_status().is_empty());
        assert_eq!(ctrl.current_channel(), "");
    }

    #[test]
    fn test_unknown_command_passthrough() {
        let (mut ctrl, mut rx) = connected("me", &[]);
        ctrl.handle_input("/WHOIS alice");

        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::Raw("WHOIS alice".to_string())]
        );
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("WHOIS alice")));
    }

    #[test]
    fn test_commands_before_connect_are_dropped_with_error() {
        let mut ctrl = SessionController::new(test_config("me", &["#a"]));
        ctrl.handle_input("/join #b");
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Not connected")));
    }

    #[test]
    fn test_nick_updates_only_on_server_event() {
        let (mut ctrl, mut rx) = connected("alice", &[]);
        ctrl.handle_input("/nick trillian");
        assert_eq!(ctrl.nick(), "alice");
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::ChangeNick("trillian".to_string())]
        );

        ctrl.handle_event(IrcEvent::NickChanged {
            old_nick: "alice".to_string(),
            new_nick: "trillian".to_string(),
        });
        assert_eq!(ctrl.nick(), "trillian");
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("alice is now known as trillian")));

        // Someone else's rename leaves our nick alone
        ctrl.handle_event(IrcEvent::NickChanged {
            old_nick: "bob".to_string(),
            new_nick: "rob".to_string(),
        });
        assert_eq!(ctrl.nick(), "trillian");
    }

    #[test]
    fn test_msg_sends_direct_with_local_echo() {
        let (mut ctrl, mut rx) = connected("me", &[]);
        ctrl.handle_input("/msg carol hello there");
        assert_eq!(
            drain(&mut rx),
            vec![OutboundCommand::SendDirect {
                target: "carol".to_string(),
                text: "hello there".to_string(),
            }]
        );
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("<me> hello there")));
    }

    #[test]
    fn test_malformed_msg_shows_usage() {
        let (mut ctrl, mut rx) = connected("me", &[]);
        ctrl.handle_input("/msg carol");
        assert!(drain(&mut rx).is_empty());
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Usage: /msg")));
    }

    #[test]
    fn test_switch_is_case_insensitive() {
        let (mut ctrl, _rx) = connected("me", &["#Rust", "#go"]);
        self_join(&mut ctrl, "me", "#Rust");
        self_join(&mut ctrl, "me", "#go");

        ctrl.handle_input("/switch #RUST");
        assert_eq!(ctrl.current_channel(), "#Rust");

        ctrl.handle_input("/switch #nope");
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("not found or not joined")));
    }

    #[test]
    fn test_cycle_with_single_channel_reports_instead_of_moving() {
        let (mut ctrl, _rx) = connected("me", &["#only"]);
        self_join(&mut ctrl, "me", "#only");

        ctrl.next_channel();
        assert_eq!(ctrl.current_channel(), "#only");
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Only one channel available")));
    }

    #[test]
    fn test_cycle_wraps_and_announces() {
        let (mut ctrl, _rx) = connected("me", &["#a", "#b", "#c"]);
        for ch in ["#a", "#b", "#c"] {
            self_join(&mut ctrl, "me", ch);
        }
        assert_eq!(ctrl.current_channel(), "#a");

        ctrl.next_channel();
        assert_eq!(ctrl.current_channel(), "#b");
        assert!(ctrl
            .transcript()
            .last()
            .unwrap()
            .contains("Switched to #b (2/3)"));

        ctrl.prev_channel();
        ctrl.prev_channel();
        assert_eq!(ctrl.current_channel(), "#c");
    }

    #[test]
    fn test_jump_to_index() {
        let (mut ctrl, _rx) = connected("me", &["#a", "#b"]);
        self_join(&mut ctrl, "me", "#a");
        self_join(&mut ctrl, "me", "#b");

        ctrl.jump_to_index(1);
        assert_eq!(ctrl.current_channel(), "#b");

        // Out of range is a no-op
        ctrl.jump_to_index(9);
        assert_eq!(ctrl.current_channel(), "#b");
    }

    #[test]
    fn test_quit_sends_configured_reason() {
        let (mut ctrl, mut rx) = connected("me", &[]);
        ctrl.handle_input("/quit");
        assert!(ctrl.quit_requested());
        match drain(&mut rx).as_slice() {
            [OutboundCommand::Quit(Some(reason))] => {
                assert_eq!(reason, &Config::default().irc.quit_message)
            }
            other => panic!("unexpected outbound: {:?}", other),
        }
    }

    #[test]
    fn test_disconnect_returns_to_setup() {
        let (mut ctrl, _rx) = connected("me", &["#a"]);
        ctrl.handle_event(IrcEvent::Disconnected);
        assert_eq!(ctrl.state(), SessionState::Setup);
        assert!(ctrl
            .transcript()
            .iter()
            .any(|l| l.contains("Disconnected")));
    }

    #[test]
    fn test_clear_screen_clears_channel_buffer_too() {
        let (mut ctrl, _rx) = connected("me", &["#a"]);
        self_join(&mut ctrl, "me", "#a");
        ctrl.handle_event(IrcEvent::Chat {
            user: "bob".to_string(),
            channel: Some("#a".to_string()),
            text: "old".to_string(),
        });

        ctrl.clear_screen();
        assert_eq!(ctrl.transcript().len(), 1); // just "Screen cleared"

        // Switching away and back shows the emptied buffer, not old lines
        ctrl.handle_input("/join #b");
        self_join(&mut ctrl, "me", "#b");
        ctrl.switch_to("#b", false);
        ctrl.switch_to("#a", false);
        assert!(!ctrl.transcript().iter().any(|l| l.contains("old")));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Setup wizard
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_setup_happy_path_with_defaults() {
        let mut ctrl = SessionController::new(Config::default());
        assert_eq!(ctrl.setup_phase(), SetupPhase::Server);

        assert_eq!(ctrl.handle_setup_input(""), SetupOutcome::Stay);
        assert_eq!(ctrl.setup_phase(), SetupPhase::Nick);
        assert!(ctrl.config.irc.use_ssl); // default server ends in :6697

        assert_eq!(ctrl.handle_setup_input(""), SetupOutcome::Stay);
        assert_eq!(ctrl.handle_setup_input(""), SetupOutcome::Stay);
        assert_eq!(ctrl.setup_phase(), SetupPhase::Confirm);
    }

    #[test]
    fn test_setup_validation_errors_hold_phase() {
        let mut ctrl = SessionController::new(Config::default());

        ctrl.handle_setup_input("not a server");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Server);
        assert!(ctrl.setup_error().is_some());

        ctrl.handle_setup_input("irc.example.net:6667");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Nick);
        assert!(!ctrl.config.irc.use_ssl);

        ctrl.handle_setup_input("x");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Nick);
        assert!(ctrl.setup_error().is_some());
    }

    #[test]
    fn test_setup_channel_list_normalization() {
        let mut ctrl = SessionController::new(Config::default());
        ctrl.handle_setup_input("");
        ctrl.handle_setup_input("alice_99");
        ctrl.handle_setup_input("general, #dev , help");
        assert_eq!(
            ctrl.config.irc.channels,
            vec!["#general", "#dev", "#help"]
        );
    }

    #[test]
    fn test_setup_back_and_restart() {
        let mut ctrl = SessionController::new(Config::default());
        ctrl.handle_setup_input("");
        ctrl.handle_setup_input("");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Channels);

        ctrl.setup_back();
        assert_eq!(ctrl.setup_phase(), SetupPhase::Nick);

        ctrl.handle_setup_input("");
        ctrl.handle_setup_input("");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Confirm);
        ctrl.handle_setup_input("r");
        assert_eq!(ctrl.setup_phase(), SetupPhase::Server);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation helpers
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_server_format() {
        assert!(validate_server_format("irc.libera.chat:6697"));
        assert!(validate_server_format("localhost:+6697"));
        assert!(!validate_server_format("no-port"));
        assert!(!validate_server_format(":6667"));
        assert!(!validate_server_format("host:"));
        assert!(!validate_server_format("host:abc"));
        assert!(!validate_server_format("a:b:c"));
    }

    #[test]
    fn test_validate_nickname() {
        assert!(validate_nickname("alice"));
        assert!(validate_nickname("_bot-1"));
        assert!(!validate_nickname("ab")); // too short
        assert!(!validate_nickname("averyveryverylongnick")); // too long
        assert!(!validate_nickname("1alice")); // digit first
        assert!(!validate_nickname("al ice")); // space
    }

    #[test]
    fn test_validate_channel_name() {
        assert!(validate_channel_name("#rust"));
        assert!(validate_channel_name("#rust-beginners_2"));
        assert!(!validate_channel_name("rust"));
        assert!(!validate_channel_name("#"));
        assert!(!validate_channel_name("#with space"));
    }
}
