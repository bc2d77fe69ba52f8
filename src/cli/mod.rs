//! CLI module providing command-line interface functionality
//!
//! This module handles argument parsing and routing to the handlers.

pub mod commands;
pub mod context;
pub mod handlers;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

pub use commands::{CertAction, Cli, Commands, ConfigAction, PushArgs};
pub use context::CliContext;
pub use handlers::CommandHandler;

/// Exit code when the gateway answered but rejected the notification.
pub const EXIT_REJECTED: u8 = 2;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Parse command line arguments and execute the requested command
    pub async fn run() -> Result<ExitCode> {
        let cli = Cli::parse();

        let context = CliContext::new(cli.project.clone(), cli.verbose)?;
        let _log_guard = context.init_logging()?;

        let handler = CommandHandler::new(context);
        handler.handle_command(cli.command).await
    }
}
