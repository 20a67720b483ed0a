use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::export::ExportOptions;
use crate::session::SessionConfig;
use crate::transcript::TranscriptConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub session: SessionTuning,
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Which speech engine to run
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// `replay` (scripted events from a file) or `none`
    pub provider: String,

    /// Event script for the replay provider
    pub script: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            script: None,
        }
    }
}

/// Session-controller tuning, file-facing flat numbers
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub language: String,
    pub window_secs: u64,
    pub settle_ms: u64,
    pub retry_backoff_ms: u64,
    pub max_retries: u32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            language: defaults.language,
            window_secs: defaults.window.as_secs(),
            settle_ms: defaults.settle.as_millis() as u64,
            retry_backoff_ms: defaults.retry_backoff.as_millis() as u64,
            max_retries: defaults.max_retries,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub path: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: "./library".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `open` or `token`
    pub mode: String,
    pub token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: "open".to_string(),
            token: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            language: self.session.language.clone(),
            window: Duration::from_secs(self.session.window_secs),
            settle: Duration::from_millis(self.session.settle_ms),
            retry_backoff: Duration::from_millis(self.session.retry_backoff_ms),
            max_retries: self.session.max_retries,
        }
    }
}
