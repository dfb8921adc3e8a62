#![allow(dead_code)]

use saep::{
    client::{ApiClient, ClientConfig},
    session::{MemoryStore, Principal},
};
use std::{net::TcpListener, sync::Arc};
use wiremock::{MockServer, Request};

pub const ACCESS: &str = "access-1";
pub const REFRESH: &str = "refresh-1";
pub const RENEWED: &str = "access-2";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn principal() -> Principal {
    Principal {
        id: 7,
        username: "ana".to_string(),
        email: "ana@example.com".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Souza".to_string(),
        empresa: Some("ACME".to_string()),
        data_criacao: None,
    }
}

/// Store holding an access token, a refresh token and the principal.
pub fn signed_in() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_session(
        ACCESS,
        Some(REFRESH),
        Some(principal()),
    ))
}

pub fn client(server: &MockServer, store: Arc<MemoryStore>) -> ApiClient {
    ApiClient::new(ClientConfig::new(server.uri()), store).expect("client")
}

pub async fn requests_to(server: &MockServer, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|request| request.url.path() == path)
        .collect()
}

pub fn bearer(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
