use crate::{
    cli::{
        actions::{Action, inventory, session},
        globals::GlobalArgs,
    },
    client::{ApiClient, RequestError},
};
use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::{debug, warn};

pub const SESSION_EXPIRED_HINT: &str = "Session expired, run `saep login` to sign in again";

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let client = globals.client()?;

    let result = match action {
        Action::Login { email, password } => session::login(&client, &email, &password).await,
        Action::Logout => session::logout(&client),
        Action::Whoami => session::whoami(&client),
        Action::Register(registration) => session::register(&client, &registration).await,
        Action::Products(action) => inventory::products(&client, action).await,
        Action::Movements(action) => inventory::movements(&client, action).await,
        Action::Alerts(action) => inventory::alerts(&client, action).await,
        Action::Dashboard => inventory::dashboard(&client).await,
    };

    result.map_err(|err| report(&client, err))
}

/// Apply the call-site policy: an expired session is dropped and replaced
/// by a sign-in hint, everything else is shown as is.
pub(crate) fn report(client: &ApiClient, err: RequestError) -> anyhow::Error {
    if err.is_session_expired() {
        debug!(error = %err, "session expired");
        if let Err(clear_err) = client.sign_out() {
            warn!(error = %clear_err, "failed to clear expired session");
        }
        return anyhow!(SESSION_EXPIRED_HINT);
    }

    anyhow!(err)
}

/// Write `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), RequestError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| RequestError::Decode(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}
