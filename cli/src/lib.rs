//! Command-line client for the remote keystore service.
//!
//! Parses arguments with clap, loads `~/.keystore-cli/config.toml`, and
//! drives `keystore_core::KeystoreClient` over a blocking ureq transport.

pub mod args;
pub mod commands;
pub mod config;
pub mod logging;
pub mod notice;
pub mod transport;

pub use args::Cli;
pub use commands::{CommandError, Outcome, Session};
pub use config::{Config, ConfigError, ConfigLoader};
pub use notice::{Notice, NoticeKind};
pub use transport::Transport;
