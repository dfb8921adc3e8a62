use super::{Principal, SessionStore};
use anyhow::{Result, anyhow};
use secrecy::SecretString;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Slots {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
    principal: Option<Principal>,
}

/// Process-local session store.
#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<Slots>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store that already holds a session.
    #[must_use]
    pub fn with_session(access: &str, refresh: Option<&str>, principal: Option<Principal>) -> Self {
        Self {
            slots: RwLock::new(Slots {
                access: Some(SecretString::from(access.to_string())),
                refresh: refresh.map(|token| SecretString::from(token.to_string())),
                principal,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Slots>> {
        self.slots
            .read()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Slots>> {
        self.slots
            .write()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }
}

impl SessionStore for MemoryStore {
    fn access(&self) -> Result<Option<SecretString>> {
        Ok(self.read()?.access.clone())
    }

    fn refresh(&self) -> Result<Option<SecretString>> {
        Ok(self.read()?.refresh.clone())
    }

    fn principal(&self) -> Result<Option<Principal>> {
        Ok(self.read()?.principal.clone())
    }

    fn set_session(
        &self,
        access: SecretString,
        refresh: SecretString,
        principal: Principal,
    ) -> Result<()> {
        let mut slots = self.write()?;
        *slots = Slots {
            access: Some(access),
            refresh: Some(refresh),
            principal: Some(principal),
        };
        Ok(())
    }

    fn set_access(&self, access: SecretString) -> Result<()> {
        self.write()?.access = Some(access);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.write()? = Slots::default();
        Ok(())
    }
}
