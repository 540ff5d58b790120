// Events that flow between the transport task and the session core
//
// The transport translates raw IRC traffic into `IrcEvent`s and pushes them
// into the TUI event loop over an mpsc channel. The session emits
// `OutboundCommand`s back to the transport over a second channel. Using enums
// on both sides gives us exhaustive pattern matching and type-safe
// communication between async tasks.

/// Inbound protocol events, delivered in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcEvent {
    /// Registration with the server completed (001 welcome)
    Connected,

    /// The connection closed, cleanly or not
    Disconnected,

    /// The initial connection attempt failed before registration
    ConnectFailed(String),

    /// A chat line. `channel` is `None` for direct/private messages,
    /// which have no channel home and always land in the transcript.
    Chat {
        user: String,
        channel: Option<String>,
        text: String,
    },

    /// Someone changed their nickname (possibly us)
    NickChanged { old_nick: String, new_nick: String },

    /// Someone joined a channel (possibly us)
    Joined { user: String, channel: String },

    /// Someone left a channel
    Parted {
        user: String,
        channel: String,
        reason: Option<String>,
    },

    /// Someone disconnected from the network entirely
    Quit { user: String, reason: Option<String> },

    /// A server or user notice
    Notice { from: String, text: String },

    /// A transport-level error worth surfacing in the transcript
    Error(String),
}

/// Outbound protocol commands, dispatched fire-and-forget to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    Join(String),
    Part(String),
    SendChat { channel: String, text: String },
    SendDirect { target: String, text: String },
    ChangeNick(String),
    List(Option<String>),
    Quit(Option<String>),
    Raw(String),
}
