use super::error::{REQUEST_FAILED, RequestError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Successful result of an authenticated call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `204 No Content`: the call succeeded and there is nothing to decode.
    NoContent,
    /// Decoded JSON body; empty or malformed bodies arrive as `{}`.
    Payload(Value),
}

impl ApiResponse {
    #[must_use]
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(value) => Some(value),
            Self::NoContent => None,
        }
    }

    /// JSON view of the result; no-content success becomes `true`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::NoContent => Value::Bool(true),
            Self::Payload(value) => value,
        }
    }

    /// Decode the payload into `T`.
    /// # Errors
    /// Returns `RequestError::Decode` for no-content responses or payloads
    /// that do not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        match self {
            Self::NoContent => Err(RequestError::Decode(
                "expected a JSON body, got no content".to_string(),
            )),
            Self::Payload(value) => serde_json::from_value(value)
                .map_err(|err| RequestError::Decode(err.to_string())),
        }
    }
}

/// Turn a final response (after any replay) into the client contract.
pub(crate) async fn normalize(response: reqwest::Response) -> Result<ApiResponse, RequestError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        debug!(status = status.as_u16(), %message, "request failed");
        return Err(RequestError::Failed {
            status: status.as_u16(),
            message,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::NoContent);
    }

    let body = response
        .text()
        .await
        .map_err(|err| RequestError::transport(&err))?;

    Ok(ApiResponse::Payload(lenient_json(&body)))
}

/// Best-effort message from an error body: `error`, then `detail`, then the
/// generic fallback. Bodies that are empty or not JSON use the fallback.
pub(crate) fn error_message(body: &str) -> String {
    if body.is_empty() {
        return REQUEST_FAILED.to_string();
    }

    let Ok(data) = serde_json::from_str::<Value>(body) else {
        return REQUEST_FAILED.to_string();
    };

    ["error", "detail"]
        .iter()
        .find_map(|field| data.get(field).and_then(field_message))
        .unwrap_or_else(|| REQUEST_FAILED.to_string())
}

fn field_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Success bodies never fail the call: empty text and malformed JSON both
/// become an empty object, and callers validate shape when they decode.
pub(crate) fn lenient_json(body: &str) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }

    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            debug!("discarding malformed success body: {err}");
            Value::Object(Map::new())
        }
    }
}
