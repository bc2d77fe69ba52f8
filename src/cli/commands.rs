//! Command definitions and structures for the CLI
//!
//! This module contains all the clap-based command line argument definitions,
//! including the main CLI structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "apns-push")]
#[command(about = "Send push notifications through the APNs HTTP/2 gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project path for project-level configuration
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send one notification to a device token
    Push(PushArgs),

    /// Initialize configuration
    Init {
        /// Initialize global configuration (default is project-level)
        #[arg(short, long)]
        global: bool,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Client certificate tools
    Cert {
        #[command(subcommand)]
        action: CertAction,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PushArgs {
    /// Device token (hex)
    pub token: String,

    /// Topic, usually the app bundle id
    #[arg(short = 't', long)]
    pub topic: Option<String>,

    /// Delivery priority (10 immediate, 5 power-considerate)
    #[arg(short, long)]
    pub priority: Option<u8>,

    /// Expiration as Unix seconds
    #[arg(short, long)]
    pub expiration: Option<i64>,

    /// Collapse id for coalescing notifications
    #[arg(long)]
    pub collapse_id: Option<String>,

    /// Caller-chosen notification id (UUID)
    #[arg(long)]
    pub apns_id: Option<String>,

    /// Alert text
    #[arg(short, long)]
    pub alert: Option<String>,

    /// Alert title; turns the alert into a dictionary
    #[arg(long)]
    pub title: Option<String>,

    /// Badge number
    #[arg(short, long)]
    pub badge: Option<u32>,

    /// Sound name
    #[arg(short, long)]
    pub sound: Option<String>,

    /// Full JSON payload; flags above are applied on top
    #[arg(long)]
    pub payload: Option<String>,

    /// Target the production gateway
    #[arg(long, conflicts_with = "host")]
    pub production: bool,

    /// Target an explicit gateway host
    #[arg(long, env = "APNS_PUSH_HOST")]
    pub host: Option<String>,

    /// PEM bundle with key and certificate chain
    #[arg(short, long, env = "APNS_PUSH_CERT")]
    pub cert: Option<PathBuf>,
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (e.g., gateway.endpoint)
        key: String,
        /// Value to set; empty clears optional keys
        value: String,
    },

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

/// Certificate actions
#[derive(Subcommand)]
pub enum CertAction {
    /// Print subject, names, expiry and fingerprint
    Inspect {
        /// PEM bundle; defaults to certificate.path from configuration
        #[arg(short, long)]
        cert: Option<PathBuf>,
    },
}
