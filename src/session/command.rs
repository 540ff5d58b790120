// Command interpretation - one input line to one tagged command
//
// A trimmed input line starting with '/' is split on the first whitespace
// into a case-folded command word and a raw remainder; each command then
// applies its own argument convention. Lines without the marker are chat for
// the current channel. Unknown commands are not errors: they pass through
// verbatim as raw protocol commands so advanced users can issue anything.

/// A parsed input line, dispatched exhaustively by the session controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Input was empty after trimming - nothing to do
    Empty,

    /// Free text for the current channel
    Say(String),

    Join(String),
    Part(Option<String>),
    Nick(String),
    Msg { target: String, text: String },
    Switch(Option<String>),
    List(Option<String>),
    Quit(Option<String>),
    Help,
    Config(ConfigAction),
    Logging(LoggingAction),

    /// Unrecognized command, forwarded verbatim (without the marker)
    Raw(String),

    /// Recognized command with malformed arguments: show a usage hint
    Usage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    Save,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingAction {
    On,
    Off,
    DebugOn,
    DebugOff,
    Status,
}

/// Prefix with the channel marker if absent
pub fn normalize_channel(name: &str) -> String {
    if name.starts_with('#') {
        name.to_string()
    } else {
        format!("#{}", name)
    }
}

/// Parse one line of user input
pub fn parse(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    let Some(stripped) = input.strip_prefix('/') else {
        return Command::Say(input.to_string());
    };

    let (word, rest) = match stripped.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (stripped, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match word.to_ascii_lowercase().as_str() {
        "join" => match arg {
            Some(ch) => Command::Join(normalize_channel(&ch)),
            None => Command::Usage("Usage: /join <#channel>"),
        },
        "part" | "leave" => Command::Part(arg.map(|ch| normalize_channel(&ch))),
        "nick" => match arg {
            Some(n) => Command::Nick(n),
            None => Command::Usage("Usage: /nick <nickname>"),
        },
        "msg" | "query" => match rest.split_once(char::is_whitespace) {
            Some((target, text)) if !text.trim().is_empty() => Command::Msg {
                target: target.to_string(),
                text: text.trim().to_string(),
            },
            _ => Command::Usage("Usage: /msg <target> <message>"),
        },
        "switch" | "sw" => Command::Switch(arg.map(|ch| normalize_channel(&ch))),
        "list" | "ls" => Command::List(arg),
        "quit" => Command::Quit(arg),
        "help" | "h" => Command::Help,
        "config" => match rest {
            "show" => Command::Config(ConfigAction::Show),
            "save" => Command::Config(ConfigAction::Save),
            "reload" => Command::Config(ConfigAction::Reload),
            _ => Command::Usage("Usage: /config [show|save|reload]"),
        },
        "logging" | "log" => match rest.to_ascii_lowercase().as_str() {
            "on" | "enable" | "true" => Command::Logging(LoggingAction::On),
            "off" | "disable" | "false" => Command::Logging(LoggingAction::Off),
            "debug on" | "debug enable" | "debug true" => Command::Logging(LoggingAction::DebugOn),
            "debug off" | "debug disable" | "debug false" => {
                Command::Logging(LoggingAction::DebugOff)
            }
            "" | "status" | "show" | "debug" => Command::Logging(LoggingAction::Status),
            _ => Command::Usage("Usage: /logging [on|off|debug on|debug off|status]"),
        },
        _ => Command::Raw(stripped.to_string()),
    }
}
