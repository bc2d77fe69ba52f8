//! Shared modules used by the library and the CLI
//!
//! Gateway clients plus the configuration types they are built from.

pub mod clients;
pub mod config;
