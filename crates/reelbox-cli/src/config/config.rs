//! `AppConfig` TOML model and its resolution against the environment.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use url::Url;

/// Environment variable that overrides `tmdb.api_token`.
pub const TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// Top-level application configuration as written in `config.toml`.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB access settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// `[tmdb]` section.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct TmdbConfig {
    /// Bearer token; `TMDB_API_TOKEN` takes precedence.
    #[serde(default)]
    pub api_token: Option<String>,
    /// API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Response language (e.g. "en-US").
    #[serde(default)]
    pub language: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Configuration after merging file and environment.
///
/// Built once at startup and passed by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    api_token: Option<String>,
    base_url: Option<Url>,
    language: String,
}

impl ResolvedConfig {
    /// Merges `config` with the token taken from the environment.
    ///
    /// Blank tokens count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `tmdb.base_url` is not a valid URL.
    pub fn resolve(config: AppConfig, env_token: Option<String>) -> Result<Self> {
        let api_token = env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| config.tmdb.api_token.filter(|t| !t.trim().is_empty()));

        let base_url = config
            .tmdb
            .base_url
            .map(|raw| {
                // `Url::join` drops the last segment unless the base ends with '/'.
                let normalized = if raw.ends_with('/') {
                    raw
                } else {
                    format!("{raw}/")
                };
                Url::parse(&normalized)
                    .with_context(|| format!("invalid tmdb.base_url: {normalized}"))
            })
            .transpose()?;

        Ok(Self {
            api_token,
            base_url,
            language: config
                .tmdb
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
        })
    }

    /// Loads `config.toml` from `path` and reads `TMDB_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or holds an invalid URL.
    pub fn from_env(path: &Path) -> Result<Self> {
        let config = AppConfig::load(path)?;
        Self::resolve(config, std::env::var(TOKEN_ENV).ok())
    }

    /// The bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the environment nor the file provides one.
    pub fn api_token(&self) -> Result<&str> {
        match self.api_token.as_deref() {
            Some(token) => Ok(token),
            None => bail!("{TOKEN_ENV} environment variable or tmdb.api_token config is required"),
        }
    }

    /// Base URL override, if configured.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Response language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}
