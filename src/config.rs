use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::client::{EmodulClient, EmodulClientBuilder};
use crate::logger::MessageLogMode;
use crate::protocol::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_DELAY, DEFAULT_TIMEOUT};
use crate::Result;

/// What discovery does when one module's directory cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFailurePolicy {
    /// Log the failure and carry on with the remaining modules.
    #[default]
    Continue,
    /// Stop the discovery pass and return the error.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageLogConfig {
    pub path: String,
    #[serde(default)]
    pub mode: MessageLogMode,
}

/// Platform block of the host configuration.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    pub login: String,
    pub password: String,
    /// Seconds between directory polls.
    #[serde(default)]
    pub poll_interval: Option<u64>,
    /// Seconds between a setpoint write and the follow-up refresh.
    #[serde(default)]
    pub refresh_delay: Option<u64>,
    /// HTTP request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub module_failure: ModuleFailurePolicy,
    #[serde(default)]
    pub message_log: Option<MessageLogConfig>,
}

impl PlatformConfig {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: None,
            api_url: None,
            login: login.into(),
            password: password.into(),
            poll_interval: None,
            refresh_delay: None,
            timeout: None,
            module_failure: ModuleFailurePolicy::default(),
            message_log: None,
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_DELAY)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn client(&self) -> Result<EmodulClient> {
        let mut builder = EmodulClientBuilder::new(self.api_url()).timeout(self.timeout());
        if let Some(log) = &self.message_log {
            builder = builder.message_log(log.mode, log.path.clone());
        }
        builder.build()
    }
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("name", &self.name)
            .field("api_url", &self.api_url())
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("poll_interval", &self.poll_interval())
            .field("refresh_delay", &self.refresh_delay())
            .field("timeout", &self.timeout())
            .field("module_failure", &self.module_failure)
            .field("message_log", &self.message_log)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply() {
        let config = PlatformConfig::from_value(json!({
            "platform": "TechEmodul",
            "login": "user",
            "password": "secret"
        }))
        .unwrap();
        assert_eq!(config.api_url(), "https://emodul.eu/api/v1/");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.refresh_delay(), Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.module_failure, ModuleFailurePolicy::Continue);
        assert!(config.message_log.is_none());
    }

    #[test]
    fn null_api_url_falls_back_to_default() {
        let config = PlatformConfig::from_value(json!({
            "apiUrl": null,
            "login": "user",
            "password": "secret"
        }))
        .unwrap();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn overrides_are_read() {
        let config = PlatformConfig::from_value(json!({
            "name": "Home",
            "apiUrl": "http://localhost:8080/api/",
            "login": "user",
            "password": "secret",
            "pollInterval": 10,
            "refreshDelay": 2,
            "moduleFailure": "abort",
            "messageLog": { "path": "/tmp/emodul.ndjson", "mode": "diffed" }
        }))
        .unwrap();
        assert_eq!(config.api_url(), "http://localhost:8080/api/");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.refresh_delay(), Duration::from_secs(2));
        assert_eq!(config.module_failure, ModuleFailurePolicy::Abort);
        assert_eq!(config.message_log.unwrap().mode, MessageLogMode::Diffed);
    }

    #[test]
    fn missing_credentials_rejected() {
        assert!(PlatformConfig::from_value(json!({"login": "user"})).is_err());
    }

    #[test]
    fn debug_hides_password() {
        let config = PlatformConfig::new("user", "hunter2");
        let out = format!("{config:?}");
        assert!(!out.contains("hunter2"));
        assert!(out.contains("user"));
    }
}
