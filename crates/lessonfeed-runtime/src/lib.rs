//! Runtime for the `lessonfeed` binary: CLI, feed session, WebSocket
//! transport, terminal UI and the lesson commands.

pub mod cli;
pub mod cmd_lessons;
pub mod config;
pub mod session;
pub mod transport;
pub mod tui;
pub mod view;
