//! Configuration management handler
//!
//! This module handles initialization, display and dotted-key editing of the
//! configuration file.

use super::super::{CliContext, ConfigAction};
use crate::config::ConfigManager;
use anyhow::Result;
use std::path::PathBuf;

const NEXT_STEPS: &str = r#"
Next steps:
  apns-push config set certificate.path /path/to/push-cert.pem
  apns-push config set defaults.topic com.example.app
  apns-push push <device-token> --alert "Hello"

Use `gateway.endpoint production` for release builds, or `gateway.proxy_url`
when outbound connections must go through a socket proxy.
"#;

/// Handler for configuration operations
pub struct ConfigHandler<'a> {
    context: &'a CliContext,
}

impl<'a> ConfigHandler<'a> {
    /// Create new configuration handler
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Handle configuration initialization
    pub fn handle_init(&self, global: bool, force: bool) -> Result<()> {
        let path = if global {
            None
        } else {
            Some(
                self.context
                    .project_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            )
        };

        let config_path = ConfigManager::get_config_path(path.clone())?;
        let config_exists = config_path.exists();

        if config_exists && !force {
            println!("Configuration already initialized at: {}", config_path.display());
            println!("Use --force to overwrite");
            return Ok(());
        }

        let mut config_manager = ConfigManager::open(config_path.clone())?;
        if force {
            *config_manager.config_mut() = Default::default();
        }
        config_manager.save()?;
        println!("Configuration initialized successfully at: {}", config_path.display());
        print!("{NEXT_STEPS}");

        Ok(())
    }

    /// Handle configuration management
    pub fn handle_config(&self, action: ConfigAction) -> Result<()> {
        // Reload so edits see a configuration created by `init` in this run.
        let mut config_manager = ConfigManager::new(self.context.project_path.clone())?;

        match action {
            ConfigAction::Show => {
                println!("# {}", config_manager.config_path().display());
                println!("{}", toml::to_string_pretty(config_manager.config())?);
            }
            ConfigAction::Set { key, value } => {
                config_manager.set(&key, &value)?;
                config_manager.save()?;
                println!("Configuration updated: {key} = {value}");
            }
            ConfigAction::Get { key } => {
                println!("{}", config_manager.get(&key)?);
            }
        }

        Ok(())
    }
}
