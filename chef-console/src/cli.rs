//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for chef-console
#[derive(Parser, Debug)]
#[command(name = "chef-console")]
#[command(about = "Prints restaurant order notifications as they arrive")]
#[command(version)]
pub struct Args {
    /// Database connection string
    #[arg(long, env = "CHEF_DATABASE_URL")]
    pub database_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "CHEF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Wait for order notifications and print them (default)
    Watch,
    /// Print every menu item
    Menu,
    /// Print every order
    Orders,
    /// Enqueue one order notification
    Send {
        /// Notification text
        text: String,
    },
}

impl Args {
    /// Subcommand to run, `watch` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }
}
