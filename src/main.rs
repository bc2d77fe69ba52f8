use anyhow::Result;
use std::process::ExitCode;

use apns_push::cli::CliApp;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    CliApp::run().await
}
