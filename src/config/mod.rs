//! Configuration for the IRC client
//!
//! Configuration lives in a TOML file (~/.config/tirc/config.toml) with
//! built-in defaults for every field, so a missing or partial file always
//! yields a usable config. The setup wizard writes the file on first
//! successful connect; `/config save` and the `/logging` commands persist
//! later changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;


/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed fallbacks offered by the setup wizard
pub const DEFAULT_SERVER: &str = "irc.libera.chat:6697";
pub const DEFAULT_NICK: &str = "tirc-user";
pub const DEFAULT_CHANNEL: &str = "#tirc-test";

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings, immutable for the duration of one connection attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    /// Server address as host:port
    pub server: String,
    pub nick: String,
    pub username: String,
    pub realname: String,
    /// Channels to auto-join after connecting
    pub channels: Vec<String>,
    pub use_ssl: bool,
    /// Server password (PASS), sent before registration if set
    pub password: Option<String>,
    pub quit_message: String,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            nick: DEFAULT_NICK.to_string(),
            username: "tirc".to_string(),
            realname: "tirc terminal client".to_string(),
            channels: vec![DEFAULT_CHANNEL.to_string()],
            use_ssl: true,
            password: None,
            quit_message: "Goodbye from tirc".to_string(),
        }
    }
}

impl IrcConfig {
    /// Hostname part of the server address
    pub fn host(&self) -> &str {
        self.server.split(':').next().unwrap_or(&self.server)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_sidebar: bool,
    pub sidebar_width: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            sidebar_width: 26,
        }
    }
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter level: "error", "warn", "info", "debug", "trace"
    pub level: String,
    /// Write logs to rotating files in addition to the in-memory buffer
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
    pub file_rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let dir = Config::config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"));
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: dir,
            file_prefix: "tirc.log".to_string(),
            file_rotation: LogRotation::Daily,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub irc: IrcConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Config directory: ~/.config/tirc
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("tirc"))
    }

    /// Config file path: ~/.config/tirc/config.toml
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Create a config file with defaults if none exists yet.
    /// Called during startup to help users discover configuration options.
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional - fail quietly
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load configuration: file -> defaults
    ///
    /// A broken config fails fast with a clear error rather than silently
    /// falling back to defaults while the user debugs the wrong thing.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse {}:\n  {}", path.display(), e);
                    eprintln!("Fix the file or delete it to regenerate defaults.");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                eprintln!("Cannot read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    /// Serialize to TOML for the config file template and `config --show`
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Persist the configuration to its file path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, self.to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
