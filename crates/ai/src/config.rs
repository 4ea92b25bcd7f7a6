//! Queue configuration.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_NAME: &str = "AI_QUEUE_NAME";
pub const ENV_MAX_CONCURRENT: &str = "AI_QUEUE_MAX_CONCURRENT";
pub const ENV_CONCURRENCY_LIMIT: &str = "AI_QUEUE_CONCURRENCY_LIMIT";
pub const ENV_MAX_SIZE: &str = "AI_QUEUE_MAX_SIZE";
pub const ENV_TIMEOUT_MS: &str = "AI_QUEUE_TIMEOUT_MS";
pub const ENV_DRAIN_DELAY_MS: &str = "AI_QUEUE_DRAIN_DELAY_MS";
pub const ENV_WAIT_WINDOW: &str = "AI_QUEUE_WAIT_WINDOW";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid queue configuration: {0}")]
    Invalid(String),
}

/// AI request queue configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiQueueConfig {
    /// Name for logging
    pub name: String,
    /// Initial cap on in-flight operations
    pub max_concurrent: usize,
    /// Lower bound applied by `set_max_concurrent`
    pub min_concurrent: usize,
    /// Upper bound applied by `set_max_concurrent`
    pub concurrency_limit: usize,
    /// Maximum number of pending (not yet admitted) requests
    pub max_queue_size: usize,
    /// How long a request may wait for admission
    pub request_timeout: Duration,
    /// Pause between a completion and the next scheduling pass
    pub drain_delay: Duration,
    /// Number of wait-time samples kept for the rolling average
    pub wait_window: usize,
}

impl Default for AiQueueConfig {
    fn default() -> Self {
        Self {
            name: "ai-queue".to_string(),
            max_concurrent: 10,
            min_concurrent: 1,
            concurrency_limit: 50,
            max_queue_size: 100,
            request_timeout: Duration::from_secs(60),
            drain_delay: Duration::from_millis(10),
            wait_window: 100,
        }
    }
}

impl AiQueueConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_drain_delay(mut self, delay: Duration) -> Self {
        self.drain_delay = delay;
        self
    }

    pub fn with_wait_window(mut self, samples: usize) -> Self {
        self.wait_window = samples;
        self
    }

    /// Load overrides from the process environment (`AI_QUEUE_*`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides from an arbitrary key/value lookup.
    ///
    /// Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_NAME) {
            config.name = name;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_MAX_CONCURRENT)? {
            config.max_concurrent = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_CONCURRENCY_LIMIT)? {
            config.concurrency_limit = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_MAX_SIZE)? {
            config.max_queue_size = v;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TIMEOUT_MS)? {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_DRAIN_DELAY_MS)? {
            config.drain_delay = Duration::from_millis(ms);
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_WAIT_WINDOW)? {
            config.wait_window = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check bounds and clamp `max_concurrent` into them.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.min_concurrent == 0 {
            return Err(ConfigError::Invalid("min_concurrent must be at least 1".into()));
        }
        if self.concurrency_limit < self.min_concurrent {
            return Err(ConfigError::Invalid(format!(
                "concurrency_limit ({}) is below min_concurrent ({})",
                self.concurrency_limit, self.min_concurrent
            )));
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid("max_queue_size must be at least 1".into()));
        }
        if self.wait_window == 0 {
            return Err(ConfigError::Invalid("wait_window must be at least 1".into()));
        }

        self.max_concurrent = self.clamp_concurrency(self.max_concurrent);
        Ok(())
    }

    pub fn clamp_concurrency(&self, requested: usize) -> usize {
        requested.clamp(self.min_concurrent, self.concurrency_limit)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
