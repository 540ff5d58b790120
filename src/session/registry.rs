// Channel registry - the in-memory source of truth for channel state
//
// Owns the set of known channels, their join/active flags, and per-channel
// message buffers. Lookup goes through a name-keyed map; enumeration goes
// through an explicit insertion-ordered list of names, so listing and
// navigation never depend on map iteration order.
//
// Pure data structure: no I/O beyond tracing calls.

use std::collections::HashMap;

/// One named conversation space
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,

    /// Formatted display lines, append-only while joined.
    /// Cleared only by explicit user action or channel removal.
    pub messages: Vec<String>,

    /// True once the server confirmed our membership.
    /// Distinct from merely known about (e.g. typed into setup).
    pub joined: bool,

    /// True while this channel is part of the active working set
    pub active: bool,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: Vec::new(),
            joined: false,
            active: false,
        }
    }
}

/// A joined channel paired with its active marker, for display listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,

    /// Insertion order of channel names - canonical enumeration order
    order: Vec<String>,

    /// Names currently activated, derived from the `active` flags
    active: Vec<String>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new channel as known-but-not-joined.
    /// Idempotent: registering an existing name changes nothing.
    pub fn register(&mut self, name: &str) {
        if self.channels.contains_key(name) {
            tracing::debug!("channel {} already registered", name);
            return;
        }
        self.channels.insert(name.to_string(), Channel::new(name));
        self.order.push(name.to_string());
        tracing::debug!("registered channel {}", name);
    }

    /// Set the joined flag. Unknown names are a logged no-op.
    pub fn set_joined(&mut self, name: &str, joined: bool) {
        match self.channels.get_mut(name) {
            Some(ch) => ch.joined = joined,
            None => tracing::warn!("set_joined on unknown channel {}", name),
        }
    }

    /// Set the active flag and keep the derived active list in sync.
    /// Unknown names are a no-op.
    pub fn set_active(&mut self, name: &str, active: bool) {
        let Some(ch) = self.channels.get_mut(name) else {
            return;
        };
        ch.active = active;
        if active {
            if !self.active.iter().any(|n| n == name) {
                self.active.push(name.to_string());
            }
        } else {
            self.active.retain(|n| n != name);
        }
    }

    /// Append a display line to a channel's buffer.
    /// Messages for unknown channels are silently dropped - a documented
    /// limitation carried over from the original behavior.
    pub fn append_message(&mut self, name: &str, text: String) {
        if let Some(ch) = self.channels.get_mut(name) {
            ch.messages.push(text);
        }
    }

    /// Clear a channel's message buffer
    pub fn clear_messages(&mut self, name: &str) {
        if let Some(ch) = self.channels.get_mut(name) {
            ch.messages.clear();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// True if the channel exists and is joined
    pub fn is_joined(&self, name: &str) -> bool {
        self.channels.get(name).map(|c| c.joined).unwrap_or(false)
    }

    /// Case-insensitive lookup among joined channels, returning the
    /// channel's protocol-identity name
    pub fn find_joined(&self, name: &str) -> Option<&str> {
        self.joined_channels_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.name.as_str())
    }

    /// Joined channel names in canonical (insertion) order.
    /// This ordering drives navigation and 1-based display numbering.
    pub fn joined_channels(&self) -> Vec<String> {
        self.joined_channels_iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Joined channels with their active markers, in canonical order
    pub fn list_with_status(&self) -> Vec<ChannelStatus> {
        self.joined_channels_iter()
            .map(|c| ChannelStatus {
                name: c.name.clone(),
                active: c.active,
            })
            .collect()
    }

    fn joined_channels_iter(&self) -> impl Iterator<Item = &Channel> {
        self.order
            .iter()
            .filter_map(|name| self.channels.get(name))
            .filter(|c| c.joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut reg = ChannelRegistry::new();
        reg.register("#rust");
        reg.set_joined("#rust", true);
        reg.append_message("#rust", "hello".to_string());

        // Second register must not reset anything
        reg.register("#rust");
        let ch = reg.get("#rust").unwrap();
        assert!(ch.joined);
        assert_eq!(ch.messages.len(), 1);
        assert_eq!(reg.joined_channels(), vec!["#rust"]);
    }

    #[test]
    fn test_unjoined_channels_hidden_from_listings() {
        let mut reg = ChannelRegistry::new();
        reg.register("#a");
        reg.register("#b");
        reg.set_joined("#b", true);

        assert_eq!(reg.joined_channels(), vec!["#b"]);
        assert_eq!(reg.list_with_status().len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut reg = ChannelRegistry::new();
        for name in ["#z", "#a", "#m"] {
            reg.register(name);
            reg.set_joined(name, true);
        }
        assert_eq!(reg.joined_channels(), vec!["#z", "#a", "#m"]);
    }

    #[test]
    fn test_set_joined_unknown_is_noop() {
        let mut reg = ChannelRegistry::new();
        reg.set_joined("#ghost", true);
        assert!(!reg.contains("#ghost"));
    }

    #[test]
    fn test_append_to_unknown_channel_drops_message() {
        let mut reg = ChannelRegistry::new();
        reg.register("#a");
        reg.append_message("#ghost", "lost".to_string());
        assert_eq!(reg.get("#a").unwrap().messages.len(), 0);
    }

    #[test]
    fn test_message_isolation_between_channels() {
        let mut reg = ChannelRegistry::new();
        reg.register("#x");
        reg.register("#y");
        reg.append_message("#x", "only in x".to_string());

        assert_eq!(reg.get("#x").unwrap().messages, vec!["only in x"]);
        assert!(reg.get("#y").unwrap().messages.is_empty());
    }

    #[test]
    fn test_active_list_tracks_flags() {
        let mut reg = ChannelRegistry::new();
        reg.register("#a");
        reg.register("#b");
        reg.set_joined("#a", true);
        reg.set_joined("#b", true);

        reg.set_active("#a", true);
        // Activating twice must not duplicate
        reg.set_active("#a", true);
        reg.set_active("#b", true);
        reg.set_active("#a", false);

        let statuses = reg.list_with_status();
        assert!(!statuses[0].active);
        assert!(statuses[1].active);
    }

    #[test]
    fn test_find_joined_case_insensitive() {
        let mut reg = ChannelRegistry::new();
        reg.register("#Rust");
        reg.set_joined("#Rust", true);

        assert_eq!(reg.find_joined("#rust"), Some("#Rust"));
        assert_eq!(reg.find_joined("#RUST"), Some("#Rust"));
        assert_eq!(reg.find_joined("#go"), None);
    }

    #[test]
    fn test_clear_messages() {
        let mut reg = ChannelRegistry::new();
        reg.register("#a");
        reg.append_message("#a", "one".to_string());
        reg.clear_messages("#a");
        assert!(reg.get("#a").unwrap().messages.is_empty());
    }
}
