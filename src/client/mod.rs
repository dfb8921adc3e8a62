//! Authenticated request client.
//!
//! Flow Overview:
//! 1. `execute` reads the stored access token and sends the call with
//!    `Content-Type: application/json` and `Authorization: Bearer <access>`.
//! 2. On `401` it obtains a new access token: reuse one that a concurrent
//!    request already stored, otherwise join or start the single in-flight
//!    renewal against `/api/auth/token/refresh/`.
//! 3. The original call is replayed exactly once with the new token. A second
//!    `401` is final.
//! 4. The final response is normalized: non-success becomes
//!    `RequestError::Failed` with a message taken from the body, `204` becomes
//!    `ApiResponse::NoContent`, anything else is decoded leniently.
//!
//! A missing refresh token or a failed renewal clears the whole session and
//! returns `RequestError::SessionExpired`.
//!
//! Security boundary: the refresh token is only ever sent in the renewal body,
//! never as a bearer credential, and the renewal call carries no access token.

mod error;
mod renew;
mod request;
mod response;

pub use error::{NO_REFRESH_TOKEN, REQUEST_FAILED, RequestError};
pub use request::RequestDescriptor;
pub use response::ApiResponse;

use crate::session::SessionStore;
use anyhow::{Result, anyhow};
use futures::FutureExt;
use renew::{RenewalGate, RenewalOutcome};
use request::{build_headers, endpoint_url};
use reqwest::{StatusCode, header::CONTENT_TYPE};
use response::{error_message, lenient_json, normalize};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const TOKEN_REFRESH_PATH: &str = "/api/auth/token/refresh/";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: crate::APP_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    renewal: RenewalGate,
}

impl ApiClient {
    /// Build a client that reads and writes credentials through `store`.
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let base = Url::parse(config.base_url.trim())?;
        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        debug!(base_url = %config.base_url, "API client configured");

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url,
                store,
                renewal: RenewalGate::default(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Send `request` with the stored credentials, renewing them once on `401`.
    ///
    /// # Errors
    /// - `SessionExpired` when the session cannot be renewed; it has been cleared.
    /// - `Failed` for any non-success response after the optional replay.
    /// - `Transport` when no response was received.
    /// - `InvalidRequest` / `Storage` when the call cannot be prepared.
    #[instrument(skip_all, fields(method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse, RequestError> {
        let access = self.inner.store.access().map_err(RequestError::storage)?;

        let mut response = self.inner.send(request, access.as_ref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let renewed = self.access_after_unauthorized(access.as_ref()).await?;
            debug!("replaying request with renewed access token");
            response = self.inner.send(request, Some(&renewed)).await?;
        }

        normalize(response).await
    }

    async fn access_after_unauthorized(
        &self,
        sent: Option<&SecretString>,
    ) -> Result<SecretString, RequestError> {
        let store = &self.inner.store;

        if let Some(current) = store.access().map_err(RequestError::storage)? {
            let superseded = sent.map_or(true, |sent| {
                sent.expose_secret() != current.expose_secret()
            });
            if superseded {
                debug!("access token was replaced while the request was in flight");
                return Ok(current);
            }
        }

        let Some(refresh) = store.refresh().map_err(RequestError::storage)? else {
            warn!("access token rejected and no refresh token stored");
            self.inner.clear_session();
            return Err(RequestError::SessionExpired(NO_REFRESH_TOKEN.to_string()));
        };

        let inner = Arc::clone(&self.inner);
        self.inner
            .renewal
            .run(move || async move { inner.renew(refresh).await }.boxed())
            .await
    }
}

impl Inner {
    async fn send(
        &self,
        request: &RequestDescriptor,
        access: Option<&SecretString>,
    ) -> Result<reqwest::Response, RequestError> {
        let url = endpoint_url(&self.base_url, request.path())?;
        let headers = build_headers(request.headers(), access)?;

        let mut builder = self
            .http
            .request(request.method().clone(), url.clone())
            .headers(headers);

        if let Some(body) = request.body() {
            let payload = serde_json::to_string(body).map_err(|err| {
                RequestError::InvalidRequest(format!("Failed to encode request: {err}"))
            })?;
            builder = builder.body(payload);
        }

        let span = info_span!(
            "saep.request",
            http.method = %request.method(),
            url = %url
        );
        let response = builder
            .send()
            .instrument(span)
            .await
            .map_err(|err| RequestError::transport(&err))?;

        debug!(status = response.status().as_u16(), "response received");

        Ok(response)
    }

    /// Exchange the refresh token for a new access token and store it.
    async fn renew(&self, refresh: SecretString) -> RenewalOutcome {
        match self.request_access(&refresh).await {
            Ok(access) => {
                self.store
                    .set_access(access.clone())
                    .map_err(RequestError::storage)?;
                info!("access token renewed");
                Ok(access)
            }
            Err(message) => {
                warn!("{message}");
                self.clear_session();
                Err(RequestError::SessionExpired(message))
            }
        }
    }

    async fn request_access(&self, refresh: &SecretString) -> Result<SecretString, String> {
        let url = endpoint_url(&self.base_url, TOKEN_REFRESH_PATH).map_err(|err| err.to_string())?;
        let payload = json!({ "refresh": refresh.expose_secret() }).to_string();

        let span = info_span!(
            "saep.token_refresh",
            http.method = "POST",
            url = %url
        );
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .instrument(span)
            .await
            .map_err(|err| format!("Token renewal failed: {}", RequestError::transport(&err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "Token renewal rejected ({}): {}",
                status.as_u16(),
                error_message(&body)
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|err| format!("Token renewal failed: {err}"))?;

        lenient_json(&body)
            .get("access")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.to_string()))
            .ok_or_else(|| "Token renewal response has no access token".to_string())
    }

    fn clear_session(&self) {
        match self.store.clear() {
            Ok(()) => info!("session cleared"),
            Err(err) => error!("Failed to clear session: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    #[test]
    fn default_config_targets_localhost() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("saep/"));
    }

    #[test]
    fn new_rejects_unsupported_scheme() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        assert!(ApiClient::new(ClientConfig::new("ftp://example.com"), Arc::clone(&store)).is_err());
        assert!(ApiClient::new(ClientConfig::new("localhost:8000"), store).is_err());
    }

    #[test]
    fn new_accepts_http_and_https() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        let client = ApiClient::new(ClientConfig::new("https://stock.example.com"), store)
            .expect("client");
        assert_eq!(client.base_url(), "https://stock.example.com");
    }
}
