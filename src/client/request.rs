use super::error::RequestError;
use reqwest::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use url::{Url, form_urlencoded};

/// One outbound call: path, method, extra headers and optional JSON body.
///
/// The client only reads a descriptor; renewing the session and replaying the
/// call never changes what the caller built.
#[derive(Clone)]
pub struct RequestDescriptor {
    path: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header that overrides the client defaults of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    /// # Errors
    /// Returns `RequestError::InvalidRequest` if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)
            .map_err(|err| RequestError::InvalidRequest(format!("Failed to encode request: {err}")))?;
        Ok(self.with_body(value))
    }

    /// Append a url-encoded query parameter to the path.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        let separator = if self.path.contains('?') { '&' } else { '?' };
        self.path = format!("{}{separator}{pair}", self.path);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

// Bodies carry passwords on login and register.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field(
                "headers",
                &self.headers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("body", &self.body.as_ref().map(|_| "<json>"))
            .finish()
    }
}

/// Join the configured base URL and a request path.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url, RequestError> {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    let joined = if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    };

    Url::parse(&joined)
        .map_err(|err| RequestError::InvalidRequest(format!("Invalid URL {joined}: {err}")))
}

/// Default JSON headers plus the bearer token, then caller overrides.
pub(crate) fn build_headers(
    caller: &[(String, String)],
    access: Option<&SecretString>,
) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = access {
        headers.insert(AUTHORIZATION, bearer(token)?);
    }

    for (name, value) in caller {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| RequestError::InvalidRequest(format!("Invalid header name {name}: {err}")))?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            RequestError::InvalidRequest(format!("Invalid value for header {name}: {err}"))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn bearer(token: &SecretString) -> Result<HeaderValue, RequestError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| RequestError::InvalidRequest("Access token is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
