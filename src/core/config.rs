use std::env;
use std::num::NonZeroU32;

/// Browser user agent the service expects on every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

const DEFAULT_LANGUAGE: &str = "en-us";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(n) => n,
    None => panic!("default attempt count is non-zero"),
};

/// Client-wide configuration shared by all API surfaces.
///
/// `max_attempts` bounds the transient-fault retrier for a single send; it is
/// a `NonZeroU32` so a zero-attempt retrier cannot be configured at all.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub language: String,
    pub timeout_seconds: u64,
    pub max_attempts: NonZeroU32,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response language (e.g. "en-us", "zh-cn").
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the number of attempts for transient connection faults.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: NonZeroU32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Recognized variables, all optional:
    /// - `HOYOSTATS_LANGUAGE`
    /// - `HOYOSTATS_TIMEOUT_SECONDS`
    /// - `HOYOSTATS_MAX_ATTEMPTS`
    /// - `HOYOSTATS_USER_AGENT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(language) = env::var("HOYOSTATS_LANGUAGE") {
            config.language = language;
        }
        if let Ok(timeout) = env::var("HOYOSTATS_TIMEOUT_SECONDS") {
            config.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!(
                    "HOYOSTATS_TIMEOUT_SECONDS must be an integer, got {:?}",
                    timeout
                ))
            })?;
        }
        if let Ok(attempts) = env::var("HOYOSTATS_MAX_ATTEMPTS") {
            let parsed: u32 = attempts.parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!(
                    "HOYOSTATS_MAX_ATTEMPTS must be an integer, got {:?}",
                    attempts
                ))
            })?;
            config.max_attempts = NonZeroU32::new(parsed).ok_or_else(|| {
                ConfigError::InvalidConfiguration(
                    "HOYOSTATS_MAX_ATTEMPTS must be at least 1".to_string(),
                )
            })?;
        }
        if let Ok(user_agent) = env::var("HOYOSTATS_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(config)
    }

    /// Create configuration from a .env file and environment variables.
    ///
    /// Loads the given file first (missing file is fine), then reads the
    /// standard `HOYOSTATS_*` variables.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new();
        assert_eq!(config.language, "en-us");
        assert_eq!(config.max_attempts.get(), 3);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new()
            .with_language("zh-cn")
            .with_timeout(10)
            .with_max_attempts(NonZeroU32::new(5).unwrap());
        assert_eq!(config.language, "zh-cn");
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.max_attempts.get(), 5);
    }
}
