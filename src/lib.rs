//! # SAEP (Inventory Client)
//!
//! `saep` talks to the SAEP stock control API: products, stock movements,
//! low-stock alerts and the dashboard summary, all behind JWT bearer auth.
//!
//! ## Authenticated requests
//!
//! Every call goes through [`client::ApiClient::execute`], which attaches the
//! stored access token, renews it once through the refresh token when the
//! server answers `401`, replays the original call and normalizes the
//! response into a single contract ([`client::ApiResponse`] or
//! [`client::RequestError`]).
//!
//! - **Single-flight renewal:** concurrent callers that hit `401` while a
//!   renewal is running wait for that renewal instead of starting their own.
//! - **Session expiry:** a missing refresh token or a rejected renewal clears
//!   the whole session and surfaces as `RequestError::SessionExpired`, which
//!   callers handle as a silent logout rather than a user-facing error.
//!
//! ## Credential storage
//!
//! Tokens and the cached principal live behind the [`session::SessionStore`]
//! trait. The CLI persists them in a JSON file ([`session::FileStore`]);
//! tests use [`session::MemoryStore`].

pub mod auth;
pub mod cli;
pub mod client;
pub mod inventory;
pub mod session;
pub mod validate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
