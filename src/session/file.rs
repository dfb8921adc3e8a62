//! File-backed session store used by the CLI.
//!
//! The session lives in a small JSON document with three independent keys,
//! `access_token`, `refresh_token` and `user`. Opening the store loads that
//! document once; every mutation rewrites it through a temporary file and a
//! rename so readers never see a half-written session. Clearing removes the
//! file.

use super::{Principal, SessionStore};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, warn};

#[derive(Default)]
struct Slots {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
    principal: Option<Principal>,
}

impl Slots {
    fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none() && self.principal.is_none()
    }
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a Principal>,
}

#[derive(Deserialize)]
struct Persisted {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<Principal>,
}

pub struct FileStore {
    path: PathBuf,
    slots: Mutex<Slots>,
}

impl FileStore {
    /// Open the store at `path`, loading any session already persisted there.
    ///
    /// A missing file is an empty session. An unreadable document is logged
    /// and treated as empty so a corrupt file never locks the user out.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let slots = match fs::read_to_string(&path) {
            Ok(contents) => parse_slots(&path, &contents),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored session");
                Slots::default()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read session file {}", path.display()));
            }
        };

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slots>> {
        self.slots
            .lock()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }

    fn persist(&self, slots: &Slots) -> Result<()> {
        if slots.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err).with_context(|| {
                    format!("failed to remove session file {}", self.path.display())
                }),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let document = PersistedRef {
            access_token: slots.access.as_ref().map(|s| s.expose_secret()),
            refresh_token: slots.refresh.as_ref().map(|s| s.expose_secret()),
            user: slots.principal.as_ref(),
        };
        let contents = serde_json::to_vec_pretty(&document)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)
            .with_context(|| format!("failed to write session file {}", tmp.display()))?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace session file {}", self.path.display()))?;

        Ok(())
    }
}

fn parse_slots(path: &Path, contents: &str) -> Slots {
    if contents.trim().is_empty() {
        return Slots::default();
    }

    match serde_json::from_str::<Persisted>(contents) {
        Ok(doc) => Slots {
            access: doc.access_token.map(SecretString::from),
            refresh: doc.refresh_token.map(SecretString::from),
            principal: doc.user,
        },
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable session file: {err}");
            Slots::default()
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl SessionStore for FileStore {
    fn access(&self) -> Result<Option<SecretString>> {
        Ok(self.lock()?.access.clone())
    }

    fn refresh(&self) -> Result<Option<SecretString>> {
        Ok(self.lock()?.refresh.clone())
    }

    fn principal(&self) -> Result<Option<Principal>> {
        Ok(self.lock()?.principal.clone())
    }

    fn set_session(
        &self,
        access: SecretString,
        refresh: SecretString,
        principal: Principal,
    ) -> Result<()> {
        let mut slots = self.lock()?;
        let next = Slots {
            access: Some(access),
            refresh: Some(refresh),
            principal: Some(principal),
        };
        self.persist(&next)?;
        *slots = next;
        Ok(())
    }

    fn set_access(&self, access: SecretString) -> Result<()> {
        let mut slots = self.lock()?;
        let next = Slots {
            access: Some(access),
            refresh: slots.refresh.clone(),
            principal: slots.principal.clone(),
        };
        self.persist(&next)?;
        *slots = next;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slots = self.lock()?;
        // forget the session in memory even when the file cannot be removed
        *slots = Slots::default();
        self.persist(&slots)
    }
}
