//! Sign-in, registration and the local session lifecycle.
//!
//! `login` and `register` are plain bindings over
//! [`ApiClient::execute`](crate::client::ApiClient::execute). `sign_in` adds
//! the lifecycle step: on success the access token, refresh token and
//! principal are stored together. `sign_out` clears all three.

use crate::{
    client::{ApiClient, RequestDescriptor, RequestError},
    session::Principal,
    validate::{InvalidField, required},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::{info, instrument};

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const REGISTER_PATH: &str = "/api/register/";

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "secret")]
    pub access: SecretString,
    #[serde(deserialize_with = "secret")]
    pub refresh: SecretString,
    pub user: Principal,
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// New account request.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    #[serde(serialize_with = "expose")]
    pub password2: SecretString,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("empresa", &self.empresa)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Form checks done before submitting; the server validates again.
    /// # Errors
    /// Returns the first field that is missing or inconsistent.
    pub fn validate(&self) -> Result<(), InvalidField> {
        required("username", &self.username)?;
        required("email", &self.email)?;
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;

        if self.password.expose_secret() != self.password2.expose_secret() {
            return Err(InvalidField::new("password2", "passwords do not match"));
        }
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
            return Err(InvalidField::new(
                "password",
                "must be at least 8 characters",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registered {
    #[serde(default)]
    pub message: String,
    pub user: Principal,
}

impl ApiClient {
    /// `POST /api/auth/login/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` if the body is not a login response.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, RequestError> {
        let request = RequestDescriptor::post(LOGIN_PATH).with_body(serde_json::json!({
            "email": email,
            "password": password,
        }));
        self.execute(&request).await?.decode()
    }

    /// `POST /api/register/`
    /// # Errors
    /// Returns the `execute` error contract, or `Decode` if the body is not a registration response.
    pub async fn register(&self, registration: &Registration) -> Result<Registered, RequestError> {
        let request = RequestDescriptor::post(REGISTER_PATH).with_json(registration)?;
        self.execute(&request).await?.decode()
    }

    /// Log in and store the resulting session as one unit.
    /// # Errors
    /// Returns the `login` errors, or `Storage` if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, RequestError> {
        let LoginResponse {
            access,
            refresh,
            user,
        } = self.login(email, password).await?;

        self.store()
            .set_session(access, refresh, user.clone())
            .map_err(RequestError::storage)?;

        info!(user_id = user.id, "signed in");

        Ok(user)
    }

    /// Drop the local session. Safe to call when already signed out.
    /// # Errors
    /// Returns `Storage` if the store cannot be cleared.
    pub fn sign_out(&self) -> Result<(), RequestError> {
        self.store().clear().map_err(RequestError::storage)?;
        info!("signed out");
        Ok(())
    }

    /// The cached principal, when a session with an access token exists.
    /// # Errors
    /// Returns `Storage` if the store cannot be read.
    pub fn current_principal(&self) -> Result<Option<Principal>, RequestError> {
        let store = self.store();
        if store.access().map_err(RequestError::storage)?.is_none() {
            return Ok(None);
        }
        store.principal().map_err(RequestError::storage)
    }
}
