//! CLI definition using clap derive.

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "lessonfeed", about = "Real-time lesson notification feed")]
pub struct Cli {
    /// Site origin; the feed endpoint and lesson API are derived from it
    #[arg(long, short = 'o', global = true, env = "LESSONFEED_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Write logs to this file (the feed UI owns the terminal)
    #[arg(long, global = true, env = "LESSONFEED_LOG_FILE")]
    pub log_file: Option<String>,

    /// Color output for lesson listings: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    pub color: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Live notification feed (default)
    Watch(WatchOpts),
    /// Lesson list and creation
    #[command(subcommand)]
    Lessons(LessonsCommand),
}

#[derive(Args, Clone, Debug)]
pub struct WatchOpts {
    /// Explicit WebSocket URL (default: derived from --origin)
    #[arg(long)]
    pub ws_url: Option<String>,

    /// Automatic reconnect attempts after consecutive closes
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// Reconnect delay unit in milliseconds (delay = unit * attempt)
    #[arg(long, default_value_t = 1_000)]
    pub base_delay_ms: u64,

    /// Upper bound for a single reconnect delay in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub cap_ms: u64,

    /// Maximum notifications kept in the feed
    #[arg(long, default_value_t = 100)]
    pub capacity: usize,

    /// Notifications older than this many seconds are removed
    #[arg(long, default_value_t = 3_600)]
    pub retention_secs: i64,
}

impl Default for WatchOpts {
    fn default() -> Self {
        Self {
            ws_url: None,
            max_attempts: 5,
            base_delay_ms: 1_000,
            cap_ms: 10_000,
            capacity: 100,
            retention_secs: 3_600,
        }
    }
}

#[derive(Subcommand)]
pub enum LessonsCommand {
    /// Show one page of lessons
    List {
        /// Page number (1-based)
        #[arg(long, short = 'p', default_value_t = 1)]
        page: u32,
    },
    /// Create a lesson, then show the first page
    Add(AddOpts),
}

#[derive(Args)]
pub struct AddOpts {
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Start time, e.g. 2026-05-01T10:00
    #[arg(long)]
    pub start_time: String,

    #[arg(long)]
    pub end_time: Option<String>,

    #[arg(long, default_value = "scheduled")]
    pub status: String,

    /// Cookie to seed the jar with, e.g. "csrftoken=..."
    #[arg(long, env = "LESSONFEED_COOKIE")]
    pub cookie: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["lessonfeed"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.origin, DEFAULT_ORIGIN);
        assert_eq!(cli.color, "auto");
    }

    #[test]
    fn color_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["lessonfeed", "--color", "sometimes"]).is_err());
    }

    #[test]
    fn watch_flags_parse() {
        let cli = Cli::try_parse_from([
            "lessonfeed",
            "--origin",
            "https://school.example",
            "watch",
            "--max-attempts",
            "3",
            "--capacity",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.origin, "https://school.example");
        match cli.command {
            Some(Command::Watch(opts)) => {
                assert_eq!(opts.max_attempts, 3);
                assert_eq!(opts.capacity, 10);
                assert_eq!(opts.cap_ms, 10_000);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn lessons_add_requires_title_and_start() {
        assert!(Cli::try_parse_from(["lessonfeed", "lessons", "add", "--title", "x"]).is_err());
        let cli = Cli::try_parse_from([
            "lessonfeed",
            "lessons",
            "add",
            "--title",
            "Math",
            "--start-time",
            "2026-05-01T10:00",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Lessons(LessonsCommand::Add(opts))) => {
                assert_eq!(opts.status, "scheduled");
                assert!(opts.end_time.is_none());
            }
            _ => panic!("expected lessons add"),
        }
    }
}
