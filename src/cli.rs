// Command-line interface
//
// The binary normally launches straight into the TUI; the `config`
// subcommand handles configuration maintenance without starting a session.

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// tirc - a terminal IRC client
#[derive(Parser)]
#[command(name = "tirc")]
#[command(version = VERSION)]
#[command(about = "Terminal IRC client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Always run the setup wizard, even when a config file exists
    #[arg(long)]
    pub setup: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI subcommands. Returns the parsed CLI if the program should
/// continue into the TUI, None if a subcommand ran and we should exit.
pub fn handle_cli() -> Option<Cli> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            path,
        }) => {
            if *path {
                handle_config_path();
            } else if *show {
                handle_config_show();
            } else if *reset {
                handle_config_reset();
            } else if *edit {
                handle_config_edit();
            } else {
                println!("Usage: tirc config [--show|--reset|--edit|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --path    Show config file path");
            }
            None
        }
        None => Some(cli),
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::load();

    println!("# Effective configuration (file > defaults)");
    println!();
    println!("[irc]");
    println!("server = {:?}", config.irc.server);
    println!("nick = {:?}", config.irc.nick);
    println!("username = {:?}", config.irc.username);
    println!("realname = {:?}", config.irc.realname);
    println!("channels = {:?}", config.irc.channels);
    println!("use_ssl = {}", config.irc.use_ssl);
    println!("quit_message = {:?}", config.irc.quit_message);
    println!();
    println!("[ui]");
    println!("show_sidebar = {}", config.ui.show_sidebar);
    println!("sidebar_width = {}", config.ui.sidebar_width);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().unwrap();

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status();

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}
