use crate::{
    auth::Registration,
    cli::actions::run::print_json,
    client::{ApiClient, RequestError},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Sign in and print the user.
///
/// Without a stored session the API answers bad credentials with `401`,
/// which the client reports as an expired session. Here that means the
/// credentials were rejected, so it is shown as a login failure instead of
/// the expired-session hint.
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<(), RequestError> {
    let user = client
        .sign_in(email, password.expose_secret())
        .await
        .map_err(|err| {
            if err.is_session_expired() {
                RequestError::Failed {
                    status: 401,
                    message: INVALID_CREDENTIALS.to_string(),
                }
            } else {
                err
            }
        })?;
    eprintln!("Signed in as {}", user.display_name());
    print_json(&user)
}

pub fn logout(client: &ApiClient) -> Result<(), RequestError> {
    client.sign_out()?;
    eprintln!("Signed out");
    Ok(())
}

pub fn whoami(client: &ApiClient) -> Result<(), RequestError> {
    match client.current_principal()? {
        Some(user) => print_json(&user),
        None => print_json(&json!({ "authenticated": false })),
    }
}

pub async fn register(client: &ApiClient, registration: &Registration) -> Result<(), RequestError> {
    registration.validate()?;
    let registered = client.register(registration).await?;
    if !registered.message.is_empty() {
        eprintln!("{}", registered.message);
    }
    print_json(&registered.user)
}
