use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    authentication_data, directory_path, modules_path, zones_path, AUTHENTICATION_PATH,
    DEFAULT_API_URL, DEFAULT_TIMEOUT,
};
use crate::types::{AuthenticationResponse, Module};
use crate::{Error, Result};

pub struct EmodulClientBuilder {
    base_url: String,
    timeout: Duration,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl EmodulClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            log_mode: None,
            log_path: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<EmodulClient> {
        let http = http_client(self.timeout, None)?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(MessageLogger::new(mode, &path)?)),
            _ => None,
        };

        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(EmodulClient {
            base_url,
            timeout: self.timeout,
            http: RwLock::new(http),
            session: RwLock::new(None),
            logger,
        })
    }
}

impl Default for EmodulClientBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Debug, Clone)]
struct Session {
    user_id: i64,
}

/// Client for the eModul cloud API.
///
/// Shared behind an `Arc` by the poller and every accessory; login swaps
/// the inner HTTP client for one carrying the bearer token.
pub struct EmodulClient {
    base_url: String,
    timeout: Duration,
    http: RwLock<reqwest::Client>,
    session: RwLock<Option<Session>>,
    logger: Option<Mutex<MessageLogger>>,
}

impl EmodulClient {
    pub fn builder(base_url: impl Into<String>) -> EmodulClientBuilder {
        EmodulClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a token. Returns the user id.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<i64> {
        let url = self.url(AUTHENTICATION_PATH);
        debug!(url = %url, username, "authenticating");
        self.log(|logger| logger.log_request("POST", AUTHENTICATION_PATH));

        let resp = self
            .http()
            .post(&url)
            .json(&authentication_data(username, password))
            .send()
            .await?
            .error_for_status()?;
        let auth: AuthenticationResponse = resp.json().await?;

        let http = http_client(self.timeout, Some(&auth.token))?;
        *self.http.write().unwrap_or_else(PoisonError::into_inner) = http;
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            user_id: auth.user_id,
        });

        debug!(user_id = auth.user_id, "authenticated");
        Ok(auth.user_id)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    pub async fn modules(&self) -> Result<Vec<Module>> {
        let user_id = self.user_id().ok_or(Error::NotAuthenticated)?;
        self.get(&modules_path(user_id)).await
    }

    /// Relative path of a module's zone directory. Also the cache key.
    pub fn directory_path(&self, udid: &str) -> Result<String> {
        let user_id = self.user_id().ok_or(Error::NotAuthenticated)?;
        Ok(directory_path(user_id, udid))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_json(path).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        trace!(url = %url, "GET");
        self.log(|logger| logger.log_request("GET", path));

        let resp = self.http().get(&url).send().await?.error_for_status()?;
        let status = resp.status().as_u16();
        let body: Value = resp.json().await?;

        self.log(|logger| logger.log_response(path, status, &body));
        Ok(body)
    }

    /// Post a mode change for a zone of the module at `directory`.
    pub async fn set_zone_mode(&self, directory: &str, body: &Value) -> Result<()> {
        self.post_json(&zones_path(directory), body).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        self.log(|logger| logger.log_command(path, body));

        self.http()
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn http(&self) -> reqwest::Client {
        self.http.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn log(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(logger) = &self.logger {
            let mut guard = logger.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard);
        }
    }
}

fn http_client(timeout: Duration, token: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Protocol("token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}
