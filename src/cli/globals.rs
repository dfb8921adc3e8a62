use crate::{
    client::{ApiClient, ClientConfig},
    session::FileStore,
};
use anyhow::Result;
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            timeout: ClientConfig::default().request_timeout,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Open the session file and build a client on top of it.
    /// # Errors
    /// Returns an error if the session file cannot be read or the API URL is invalid.
    pub fn client(&self) -> Result<ApiClient> {
        let store = FileStore::open(&self.session_file)?;
        let config = ClientConfig::new(self.api_url.clone()).with_request_timeout(self.timeout);
        ApiClient::new(config, Arc::new(store))
    }
}
