//! Common test utilities and helpers
//!
//! This module provides reusable test helpers shared by the integration
//! tests: fixture certificates, clients pointed at a mock gateway, and a
//! builder for running the CLI binary in an isolated environment.

#![allow(dead_code)]

use apns_push::shared::clients::{
    ApnsClient, CertificateTransport, ClientCertificate, ClientConfig,
};
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The self-signed fixture identity.
pub fn client_certificate() -> ClientCertificate {
    ClientCertificate::from_pem_file(fixture_path("client.pem"))
        .expect("Failed to load fixture certificate")
}

/// A push client using the fixture identity, aimed at `host`.
pub fn client_for(host: &str) -> ApnsClient {
    let transport =
        CertificateTransport::direct(client_certificate()).expect("Failed to build transport");
    ApnsClient::new(
        Arc::new(transport),
        ClientConfig::with_host(host).expect("Invalid mock host"),
    )
}

/// Test command builder for the apns-push CLI
pub struct TestCommand {
    cmd: Command,
}

impl TestCommand {
    /// Create a new test command for the apns-push binary
    pub fn new() -> Self {
        let cmd = Command::cargo_bin("apns-push").expect("Failed to find apns-push binary");
        Self { cmd }
    }

    /// Add arguments to the command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.cmd.arg(arg.as_ref());
        }
        self
    }

    /// Add a single argument to the command
    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.cmd.arg(arg.as_ref());
        self
    }

    /// Set environment variable
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.cmd.env(key.as_ref(), val.as_ref());
        self
    }

    /// Execute and expect success
    pub fn expect_success(mut self) -> TestAssertion {
        let assert = self.cmd.assert().success();
        TestAssertion { assert }
    }

    /// Execute and expect a specific exit code
    pub fn expect_code(mut self, code: i32) -> TestAssertion {
        let assert = self.cmd.assert().code(code);
        TestAssertion { assert }
    }

    /// Execute and expect failure
    pub fn expect_failure(mut self) -> TestAssertion {
        let assert = self.cmd.assert().failure();
        TestAssertion { assert }
    }
}

impl Default for TestCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Test assertion wrapper with convenient methods
pub struct TestAssertion {
    assert: assert_cmd::assert::Assert,
}

impl TestAssertion {
    /// Assert stdout contains text
    pub fn stdout_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stdout(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Assert stderr contains text
    pub fn stderr_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stderr(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Assert multiple stdout patterns
    pub fn stdout_contains_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.assert = self.assert.stdout(predicate::str::contains(pattern.as_ref()));
        }
        Self { assert: self.assert }
    }

    /// Finish the assertion
    pub fn done(self) -> assert_cmd::assert::Assert {
        self.assert
    }
}

/// Isolated project and home directories for CLI runs
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub home_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with temporary directories
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let home_dir = TempDir::new().expect("Failed to create temp home directory");
        let config_path = temp_dir.path().join(".apns-push").join("config.toml");

        Self {
            temp_dir,
            home_dir,
            config_path,
        }
    }

    /// Initialize configuration in the test environment
    pub fn init_config(&self) -> TestAssertion {
        self.command().arg("init").expect_success()
    }

    /// Get the project path
    pub fn project_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command configured for this environment
    pub fn command(&self) -> TestCommand {
        TestCommand::new()
            .env("HOME", self.home_dir.path().to_string_lossy())
            .env("RUST_LOG", "warn")
            .arg("--project")
            .arg(self.project_path().to_string_lossy())
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
