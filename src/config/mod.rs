mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub request_timeout_sec: u64,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub request_timeout_sec: u64,
    /// Session token resolved at startup, if any. When absent, the console
    /// falls back to reading `VIGIA_SESSION_TOKEN` at call time.
    pub token: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("base_url must be specified via --base-url or in config file")
            })?;
        if base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);

        let token_file = file
            .token_file
            .map(PathBuf::from)
            .or_else(|| cli.token_file.clone());

        // An explicit token wins over a token file.
        let token = match file.token.or_else(|| cli.token.clone()) {
            Some(token) => Some(token),
            None => match token_file {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read token file: {:?}", path))?;
                    let token = content.trim().to_string();
                    if token.is_empty() {
                        bail!("Token file is empty: {:?}", path);
                    }
                    Some(token)
                }
                None => None,
            },
        };

        Ok(Self {
            base_url,
            request_timeout_sec,
            token,
        })
    }
}
