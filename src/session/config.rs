use std::time::Duration;

/// Configuration for the session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Default recognition language (BCP-47 tag)
    pub language: String,

    /// How long one engine session runs before a transparent restart.
    /// Default: 240 seconds (4 minutes), safely under the roughly 5 minute
    /// cutoff continuous engines impose on their own.
    pub window: Duration,

    /// Pause between an engine session ending and the relaunch
    pub settle: Duration,

    /// Base retry backoff; attempt N waits N times this
    pub retry_backoff: Duration,

    /// Consecutive engine failures tolerated before giving up
    pub max_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            window: Duration::from_secs(240), // 4 minutes
            settle: Duration::from_millis(500),
            retry_backoff: Duration::from_millis(2000),
            max_retries: 3,
        }
    }
}
