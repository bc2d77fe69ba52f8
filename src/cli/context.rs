//! CLI Context for dependency injection and shared state
//!
//! This module provides the CliContext abstraction that centralizes
//! configuration management and logging setup for the handlers.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigManager;

const LOG_FILE_NAME: &str = "apns-push.log";

/// CLI execution context containing shared dependencies and configuration
#[derive(Clone)]
pub struct CliContext {
    pub project_path: Option<PathBuf>,
    pub verbose: bool,
    pub config_manager: Arc<ConfigManager>,
}

impl CliContext {
    /// Create a new CLI context with the specified project path and verbosity
    pub fn new(project_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let resolved_project_path = Self::resolve_project_path(project_path);
        let config_manager = Arc::new(ConfigManager::new(resolved_project_path.clone())?);

        Ok(Self {
            project_path: resolved_project_path,
            verbose,
            config_manager,
        })
    }

    /// Auto-detect project path by looking for .apns-push/config.toml
    fn resolve_project_path(project_path: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = project_path {
            return Some(path);
        }

        if let Ok(current_dir) = std::env::current_dir() {
            let config_path = current_dir.join(".apns-push").join("config.toml");
            if config_path.exists() {
                return Some(current_dir);
            }
        }

        None
    }

    /// Log filter directive from verbosity and configuration.
    pub fn log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.config_manager.config().logging.level
        }
    }

    /// Install the tracing subscriber.
    ///
    /// Console output goes to stderr so stdout stays clean for results. When
    /// `logging.log_path` is set, a daily rolling file is written as well; the
    /// returned guard must be held until exit to flush it.
    pub fn init_logging(&self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::from_default_env().add_directive(
            self.log_level()
                .parse()
                .unwrap_or_else(|_| tracing::Level::INFO.into()),
        );
        let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        let guard = match &self.config_manager.config().logging.log_path {
            Some(log_dir) => {
                std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;
                let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .with(file_layer)
                    .try_init()
                    .context("Failed to install tracing subscriber")?;
                Some(guard)
            }
            None => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init()
                    .context("Failed to install tracing subscriber")?;
                None
            }
        };

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Project path: {:?}", self.project_path);
            tracing::debug!("Config path: {:?}", self.config_manager.config_path());
        }

        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_creation() {
        let temp_dir = TempDir::new().unwrap();
        let context = CliContext::new(Some(temp_dir.path().to_path_buf()), false).unwrap();

        assert_eq!(context.project_path, Some(temp_dir.path().to_path_buf()));
        assert!(!context.verbose);
        assert_eq!(context.log_level(), "info");
    }

    #[test]
    fn test_context_verbose_mode() {
        let temp_dir = TempDir::new().unwrap();
        let context = CliContext::new(Some(temp_dir.path().to_path_buf()), true).unwrap();

        assert!(context.verbose);
        assert_eq!(context.log_level(), "debug");
    }
}
