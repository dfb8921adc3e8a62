//! Credential storage for the signed-in session.
//!
//! A session is three independent values kept together: the short-lived
//! access token, the longer-lived refresh token and the cached principal
//! record. They are written as one unit on sign-in, the access token alone is
//! replaced after a renewal, and all three are cleared together on sign-out
//! or when a renewal fails.
//!
//! Stores hold data only. They never talk to the network, never retry and
//! report any storage problem as a plain `anyhow::Error`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Display record for the signed-in user, cached next to the tokens.
///
/// The server is the only authority on what this user may do; the record is
/// never consulted for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub empresa: Option<String>,
    #[serde(default)]
    pub data_criacao: Option<String>,
}

impl Principal {
    /// Full name when known, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Storage seam for the session credentials.
pub trait SessionStore: Send + Sync {
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn access(&self) -> Result<Option<SecretString>>;

    /// # Errors
    /// Returns an error if the store cannot be read.
    fn refresh(&self) -> Result<Option<SecretString>>;

    /// # Errors
    /// Returns an error if the store cannot be read or the record is corrupt.
    fn principal(&self) -> Result<Option<Principal>>;

    /// Store access token, refresh token and principal as one unit.
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn set_session(
        &self,
        access: SecretString,
        refresh: SecretString,
        principal: Principal,
    ) -> Result<()>;

    /// Replace only the access token, used after a renewal.
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn set_access(&self, access: SecretString) -> Result<()>;

    /// Remove all three values. Clearing an empty store is a no-op.
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn clear(&self) -> Result<()>;
}
