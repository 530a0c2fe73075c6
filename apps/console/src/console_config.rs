use std::env;
use std::path::PathBuf;
use std::time::Duration;

use mymatch_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_CREDENTIALS_PATH: &str = ".mymatch/credentials.json";

/// Runtime settings for the console, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_root: String,
    pub http_timeout: Duration,
    pub credentials_path: PathBuf,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let api_root = required_env(&lookup, "MYMATCH_API_ROOT")?;
        if !(api_root.starts_with("http://") || api_root.starts_with("https://")) {
            return Err(AppError::Validation(format!(
                "MYMATCH_API_ROOT must be an http(s) URL, got '{api_root}'"
            )));
        }

        let http_timeout_ms =
            parse_env_u64(&lookup, "MYMATCH_HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?;
        if http_timeout_ms == 0 {
            return Err(AppError::Validation(
                "MYMATCH_HTTP_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let credentials_path = lookup("MYMATCH_CREDENTIALS_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_owned());

        Ok(Self {
            api_root,
            http_timeout: Duration::from_millis(http_timeout_ms),
            credentials_path: PathBuf::from(credentials_path),
        })
    }
}

/// Installs the log subscriber on stderr so command output on stdout stays parseable.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
