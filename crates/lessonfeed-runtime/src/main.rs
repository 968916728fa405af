//! lessonfeed: real-time lesson notification feed for the terminal.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use lessonfeed_runtime::{cli, cmd_lessons, config, tui};

fn env_filter() -> tracing_subscriber::EnvFilter {
    let filter = std::env::var("LESSONFEED_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::EnvFilter::new(filter)
}

/// The feed owns the terminal, so its logs go to a file or nowhere.
fn init_file_logging(path: Option<&str>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_color(color: &str) -> bool {
    use std::io::IsTerminal;
    match color {
        "always" => true,
        "never" => false,
        _ => std::io::stdout().is_terminal(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let command = args
        .command
        .unwrap_or_else(|| cli::Command::Watch(cli::WatchOpts::default()));

    match command {
        cli::Command::Watch(opts) => {
            init_file_logging(args.log_file.as_deref())?;
            let settings = config::WatchSettings::resolve(&args.origin, &opts)?;
            tui::run_watch(settings).await?;
        }
        cli::Command::Lessons(cmd) => {
            init_stderr_logging();
            let use_color = resolve_color(&args.color);
            match cmd {
                cli::LessonsCommand::List { page } => {
                    cmd_lessons::cmd_list(&args.origin, page, use_color).await?;
                }
                cli::LessonsCommand::Add(opts) => {
                    let exit_code = cmd_lessons::cmd_add(&args.origin, opts, use_color).await?;
                    if exit_code != 0 {
                        std::process::exit(exit_code);
                    }
                }
            }
        }
    }

    Ok(())
}
