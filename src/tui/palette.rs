// Command palette (Ctrl+P)
//
// A searchable overlay of every action the client knows about. Static items
// cover the command set; dynamic items are generated from live session state
// (quick-switch entries per joined channel, reconnect when offline).

/// What an activated palette entry does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteAction {
    /// Run as if typed at the prompt (may be a partial command to finish)
    Input(String),
    NextChannel,
    PrevChannel,
    ToggleSidebar,
    ClearScreen,
    ListChannels,
    ConnectionStatus,
    Reconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    pub name: String,
    pub description: String,
    pub action: PaletteAction,
    pub category: &'static str,
    pub shortcut: &'static str,
    priority: i32,
}

impl PaletteItem {
    fn new(
        name: &str,
        description: &str,
        action: PaletteAction,
        category: &'static str,
        shortcut: &'static str,
        priority: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            action,
            category,
            shortcut,
            priority,
        }
    }
}

/// Palette overlay state
#[derive(Debug, Default)]
pub struct Palette {
    pub visible: bool,
    pub query: String,
    pub selected: usize,
    pub filtered: Vec<PaletteItem>,
}

impl Palette {
    pub fn open(&mut self, items: Vec<PaletteItem>) {
        self.visible = true;
        self.query.clear();
        self.selected = 0;
        self.filtered = filter(&self.query, items);
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.query.clear();
        self.selected = 0;
        self.filtered.clear();
    }

    pub fn refilter(&mut self, items: Vec<PaletteItem>) {
        self.filtered = filter(&self.query, items);
        if self.selected >= self.filtered.len() {
            self.selected = 0;
        }
    }

    /// Move selection up, wrapping to the end
    pub fn select_prev(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.filtered.len() - 1);
    }

    /// Move selection down, wrapping to the start
    pub fn select_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.filtered.len();
    }

    pub fn current(&self) -> Option<&PaletteItem> {
        self.filtered.get(self.selected)
    }
}

/// The fixed command set
pub fn static_items() -> Vec<PaletteItem> {
    use PaletteAction::*;
    vec![
        PaletteItem::new(
            "Join Channel",
            "Join a new IRC channel",
            Input("/join ".into()),
            "Channels",
            "",
            90,
        ),
        PaletteItem::new(
            "Part Channel",
            "Leave the current channel",
            Input("/part".into()),
            "Channels",
            "",
            80,
        ),
        PaletteItem::new(
            "Switch Channel",
            "Switch to a different channel",
            Input("/switch ".into()),
            "Channels",
            "",
            95,
        ),
        PaletteItem::new(
            "Next Channel",
            "Switch to the next channel",
            NextChannel,
            "Navigation",
            "Tab",
            85,
        ),
        PaletteItem::new(
            "Previous Channel",
            "Switch to the previous channel",
            PrevChannel,
            "Navigation",
            "Shift+Tab",
            85,
        ),
        PaletteItem::new(
            "List Channels",
            "Show all joined channels",
            ListChannels,
            "Channels",
            "",
            65,
        ),
        PaletteItem::new(
            "Send Private Message",
            "Send a private message to a user",
            Input("/msg ".into()),
            "Communication",
            "",
            75,
        ),
        PaletteItem::new(
            "Change Nickname",
            "Change your nickname",
            Input("/nick ".into()),
            "User",
            "",
            70,
        ),
        PaletteItem::new(
            "Toggle Sidebar",
            "Show/hide the channel sidebar",
            ToggleSidebar,
            "Interface",
            "Ctrl+B",
            60,
        ),
        PaletteItem::new(
            "Clear Screen",
            "Clear the chat messages",
            ClearScreen,
            "Interface",
            "",
            55,
        ),
        PaletteItem::new(
            "Show Help",
            "Display available commands",
            Input("/help".into()),
            "Help",
            "",
            50,
        ),
        PaletteItem::new(
            "Connection Status",
            "Show connection information",
            ConnectionStatus,
            "Information",
            "",
            45,
        ),
        PaletteItem::new(
            "Show Configuration",
            "Display current configuration",
            Input("/config show".into()),
            "Configuration",
            "",
            40,
        ),
        PaletteItem::new(
            "Save Configuration",
            "Save current configuration to file",
            Input("/config save".into()),
            "Configuration",
            "",
            35,
        ),
        PaletteItem::new(
            "Reload Configuration",
            "Reload configuration from file",
            Input("/config reload".into()),
            "Configuration",
            "",
            25,
        ),
        PaletteItem::new(
            "Show Logging Status",
            "Display logging information",
            Input("/logging status".into()),
            "Logging",
            "",
            30,
        ),
        PaletteItem::new(
            "Enable Logging",
            "Turn on file logging",
            Input("/logging on".into()),
            "Logging",
            "",
            20,
        ),
        PaletteItem::new(
            "Disable Logging",
            "Turn off file logging",
            Input("/logging off".into()),
            "Logging",
            "",
            15,
        ),
        PaletteItem::new(
            "Quit",
            "Disconnect and exit the application",
            Input("/quit".into()),
            "System",
            "Ctrl+C",
            10,
        ),
    ]
}

/// Channels suggested as quick-join entries while not yet joined
const COMMON_CHANNELS: [&str; 5] = ["#general", "#help", "#random", "#dev", "#announcements"];

/// Session-dependent entries, rebuilt each time the palette opens
pub fn dynamic_items(connected: bool, joined: &[String], current: &str) -> Vec<PaletteItem> {
    let mut items = Vec::new();

    if connected {
        for channel in joined {
            if channel != current {
                items.push(PaletteItem::new(
                    &format!("Switch to {}", channel),
                    &format!("Switch to channel {}", channel),
                    PaletteAction::Input(format!("/switch {}", channel)),
                    "Quick Switch",
                    "",
                    88,
                ));
            }
        }
        if !current.is_empty() {
            items.push(PaletteItem::new(
                &format!("Part {}", current),
                &format!("Leave channel {}", current),
                PaletteAction::Input(format!("/part {}", current)),
                "Current Channel",
                "",
                85,
            ));
        }
        for channel in COMMON_CHANNELS {
            if !joined.iter().any(|j| j == channel) {
                items.push(PaletteItem::new(
                    &format!("Join {}", channel),
                    &format!("Join channel {}", channel),
                    PaletteAction::Input(format!("/join {}", channel)),
                    "Quick Join",
                    "",
                    75,
                ));
            }
        }
    } else {
        items.push(PaletteItem::new(
            "Reconnect",
            "Reconnect to IRC server",
            PaletteAction::Reconnect,
            "Connection",
            "",
            95,
        ));
    }

    items
}

/// Score and rank items against a query. An empty query keeps the given
/// order; otherwise only scoring items survive, best first.
pub fn filter(query: &str, items: Vec<PaletteItem>) -> Vec<PaletteItem> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return items;
    }

    let mut scored: Vec<(i32, PaletteItem)> = items
        .into_iter()
        .filter_map(|item| {
            let score = score(&item, &query);
            (score > 0).then_some((score, item))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn score(item: &PaletteItem, query: &str) -> i32 {
    let name = item.name.to_lowercase();
    let mut score = 0;

    if name.contains(query) {
        score += 100;
        if name.starts_with(query) {
            score += 50;
        }
    }
    if item.description.to_lowercase().contains(query) {
        score += 30;
    }
    if item.category.to_lowercase().contains(query) {
        score += 20;
    }
    if subsequence_match(&name, query) {
        score += 15;
    }

    // Priority only breaks ties between matches; it never makes a
    // non-matching item survive the filter.
    if score > 0 {
        score += item.priority / 10;
    }
    score
}

/// True when every pattern char appears in order within the text
fn subsequence_match(text: &str, pattern: &str) -> bool {
    let mut chars = text.chars();
    pattern.chars().all(|p| chars.any(|c| c == p))
}
