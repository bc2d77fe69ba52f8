//! Command handlers for all CLI operations
//!
//! This module routes parsed commands to the handler for each area, keeping
//! CLI parsing separate from the push and configuration logic.

mod cert;
mod config;
mod push;

use anyhow::Result;
use std::process::ExitCode;

use super::{CertAction, CliContext, Commands};

pub use cert::CertHandler;
pub use config::ConfigHandler;
pub use push::{PushHandler, PushOutcome};

/// Coordinates all command handling operations with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    /// Create a new command handler instance with the provided context
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub async fn handle_command(&self, command: Commands) -> Result<ExitCode> {
        match command {
            Commands::Push(args) => {
                let outcome = PushHandler::new(&self.context).handle_push(args).await?;
                Ok(outcome.exit_code())
            }
            Commands::Init { global, force } => {
                ConfigHandler::new(&self.context).handle_init(global, force)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Config { action } => {
                ConfigHandler::new(&self.context).handle_config(action)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Cert { action } => {
                match action {
                    CertAction::Inspect { cert } => {
                        CertHandler::new(&self.context).handle_inspect(cert)?
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
