use thiserror::Error;

/// Message used when the session has no refresh token to renew with.
pub const NO_REFRESH_TOKEN: &str = "No refresh token";
/// Fallback message for failed responses without a usable error body.
pub const REQUEST_FAILED: &str = "Request failed";

/// Uniform failure contract of [`super::ApiClient::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The session can no longer be renewed and has been cleared locally.
    #[error("{0}")]
    SessionExpired(String),
    /// The server answered with a non-success status.
    #[error("{message}")]
    Failed { status: u16, message: String },
    /// The call never produced a response (DNS, refused connection, timeout).
    #[error("{0}")]
    Transport(String),
    /// The request could not be built (bad URL, header or body).
    #[error("{0}")]
    InvalidRequest(String),
    /// The credential store could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),
    /// A payload did not have the shape the caller asked for.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RequestError {
    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }

    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport("Request timed out".to_string())
        } else {
            Self::Transport(format!("Unable to reach the server: {err}"))
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// Whether the failure should be shown to the user.
    ///
    /// An expired session is a signal to sign out and ask for credentials
    /// again, not an error message.
    #[must_use]
    pub fn notify_user(&self) -> bool {
        !self.is_session_expired()
    }

    /// HTTP status of a failed response, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
