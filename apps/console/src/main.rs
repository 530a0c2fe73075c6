//! MyMatch admin console.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod console_config;

use clap::Parser;
use mymatch_core::AppError;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::commands::ConsoleContext;
use crate::console_config::{ConsoleConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let config = ConsoleConfig::load()?;
    debug!(
        api_root = %config.api_root,
        http_timeout_ms = u64::try_from(config.http_timeout.as_millis()).unwrap_or(u64::MAX),
        credentials_path = %config.credentials_path.display(),
        "console configured"
    );

    let context = ConsoleContext::build(&config)?;
    let output = match context.run(cli.command).await {
        Ok(output) => output,
        Err(error) => {
            if let AppError::Network { detail, .. } = &error {
                warn!(detail = %detail, "backend unreachable");
            }
            return Err(error);
        }
    };

    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))?;
    println!("{rendered}");

    Ok(())
}
