//! End-to-end behaviour of `ApiClient::execute` against a mock API.

mod common;

use anyhow::Result;
use common::{
    ACCESS, REFRESH, RENEWED, bearer, can_bind_localhost, client, principal, requests_to,
    signed_in,
};
use saep::{
    client::{
        ApiClient, ApiResponse, ClientConfig, NO_REFRESH_TOKEN, REQUEST_FAILED,
        RequestDescriptor, RequestError, TOKEN_REFRESH_PATH,
    },
    session::{MemoryStore, SessionStore},
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use std::{net::TcpListener, sync::Arc, time::Duration};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const PRODUCTS: &str = "/api/produtos/";
const ALERTS: &str = "/api/alertas/";

fn products_body() -> Value {
    json!([
        { "id": 1, "nome": "Caneta", "quantidade": 10, "estoque_minimo": 2, "preco": "1.50" },
        { "id": 2, "nome": "Caderno", "quantidade": 0, "estoque_minimo": 5, "preco": "12.00" }
    ])
}

async fn mount_renewal(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(TOKEN_REFRESH_PATH))
        .and(body_json(json!({ "refresh": REFRESH })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": RENEWED }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

async fn mount_expired_then_fresh(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .and(header("authorization", format!("Bearer {ACCESS}").as_str()))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Given token not valid for any token type" })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .and(header("authorization", format!("Bearer {RENEWED}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_token_returns_payload_unchanged() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .and(header("authorization", format!("Bearer {ACCESS}").as_str()))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let response = client.execute(&RequestDescriptor::get(PRODUCTS)).await?;

    assert_eq!(response, ApiResponse::Payload(products_body()));
    assert!(requests_to(&server, TOKEN_REFRESH_PATH).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn expired_token_is_renewed_and_replayed_once() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_expired_then_fresh(&server).await;
    mount_renewal(&server, Duration::ZERO).await;

    let store = signed_in();
    let client = client(&server, store.clone());
    let response = client.execute(&RequestDescriptor::get(PRODUCTS)).await?;

    assert_eq!(response.into_value(), products_body());

    let renewals = requests_to(&server, TOKEN_REFRESH_PATH).await;
    assert_eq!(renewals.len(), 1);
    assert_eq!(bearer(&renewals[0]), None);

    let calls = requests_to(&server, PRODUCTS).await;
    assert_eq!(calls.len(), 2);
    assert_eq!(bearer(&calls[0]), Some(format!("Bearer {ACCESS}")));
    assert_eq!(bearer(&calls[1]), Some(format!("Bearer {RENEWED}")));

    let stored = store.access()?.map(|token| token.expose_secret().to_string());
    assert_eq!(stored.as_deref(), Some(RENEWED));
    let refresh = store.refresh()?.map(|token| token.expose_secret().to_string());
    assert_eq!(refresh.as_deref(), Some(REFRESH));
    assert_eq!(store.principal()?, Some(principal()));
    Ok(())
}

#[tokio::test]
async fn no_content_yields_true() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/produtos/3/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let response = client
        .execute(&RequestDescriptor::delete("/api/produtos/3/"))
        .await?;

    assert!(response.is_no_content());
    assert_eq!(response.into_value(), Value::Bool(true));
    Ok(())
}

#[tokio::test]
async fn error_field_becomes_the_message() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PRODUCTS))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "nome is required" })))
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let err = client
        .execute(&RequestDescriptor::post(PRODUCTS).with_body(json!({ "nome": "" })))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Failed {
            status: 400,
            message: "nome is required".to_string(),
        }
    );
    assert_eq!(err.to_string(), "nome is required");
    assert!(err.notify_user());
    Ok(())
}

#[tokio::test]
async fn detail_field_is_the_fallback_message() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/produtos/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let err = client
        .execute(&RequestDescriptor::get("/api/produtos/99/"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Not found.");
    Ok(())
}

#[tokio::test]
async fn unparsable_error_body_is_generic() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Server Error</html>"))
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let err = client
        .execute(&RequestDescriptor::get("/api/dashboard/"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Failed {
            status: 500,
            message: REQUEST_FAILED.to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_renewal() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_expired_then_fresh(&server).await;
    mount_renewal(&server, Duration::from_millis(200)).await;

    let store = signed_in();
    let client = client(&server, store.clone());
    let other = client.clone();

    let request = RequestDescriptor::get(PRODUCTS);
    let (first, second) = tokio::join!(client.execute(&request), other.execute(&request));

    assert_eq!(first?.into_value(), products_body());
    assert_eq!(second?.into_value(), products_body());

    assert_eq!(requests_to(&server, TOKEN_REFRESH_PATH).await.len(), 1);

    let replays = requests_to(&server, PRODUCTS)
        .await
        .iter()
        .filter(|request| bearer(request) == Some(format!("Bearer {RENEWED}")))
        .count();
    assert_eq!(replays, 2);
    Ok(())
}

#[tokio::test]
async fn late_unauthorized_reuses_the_renewed_token() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    // the alerts call is rejected at once, the products call only after
    // the renewal has already finished
    Mock::given(method("GET"))
        .and(path(ALERTS))
        .and(header("authorization", format!("Bearer {ACCESS}").as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .and(header("authorization", format!("Bearer {ACCESS}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    for route in [ALERTS, PRODUCTS] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", format!("Bearer {RENEWED}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
    }
    mount_renewal(&server, Duration::from_millis(50)).await;

    let client = client(&server, signed_in());
    let other = client.clone();

    let alerts = RequestDescriptor::get(ALERTS);
    let products = RequestDescriptor::get(PRODUCTS);
    let (first, second) = tokio::join!(client.execute(&alerts), other.execute(&products));

    assert_eq!(first?.into_value(), json!([]));
    assert_eq!(second?.into_value(), json!([]));
    assert_eq!(requests_to(&server, TOKEN_REFRESH_PATH).await.len(), 1);

    for route in [ALERTS, PRODUCTS] {
        let calls = requests_to(&server, route).await;
        assert_eq!(calls.len(), 2);
        assert_eq!(bearer(&calls[1]), Some(format!("Bearer {RENEWED}")));
    }
    Ok(())
}

#[tokio::test]
async fn missing_refresh_token_expires_the_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_session(ACCESS, None, Some(principal())));
    let client = client(&server, store.clone());
    let err = client
        .execute(&RequestDescriptor::get(PRODUCTS))
        .await
        .unwrap_err();

    assert_eq!(err, RequestError::SessionExpired(NO_REFRESH_TOKEN.to_string()));
    assert!(!err.notify_user());
    assert!(requests_to(&server, TOKEN_REFRESH_PATH).await.is_empty());
    assert!(store.access()?.is_none());
    assert!(store.principal()?.is_none());
    Ok(())
}

#[tokio::test]
async fn rejected_renewal_clears_the_whole_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Token is invalid or expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in();
    let client = client(&server, store.clone());
    let err = client
        .execute(&RequestDescriptor::get(PRODUCTS))
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert!(err.to_string().contains("Token is invalid or expired"));
    assert!(store.access()?.is_none());
    assert!(store.refresh()?.is_none());
    assert!(store.principal()?.is_none());
    assert_eq!(requests_to(&server, PRODUCTS).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn renewal_without_access_token_clears_the_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let store = signed_in();
    let client = client(&server, store.clone());
    let err = client
        .execute(&RequestDescriptor::get(PRODUCTS))
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert!(store.refresh()?.is_none());
    Ok(())
}

#[tokio::test]
async fn second_unauthorized_is_final() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "User is inactive" })),
        )
        .mount(&server)
        .await;
    mount_renewal(&server, Duration::ZERO).await;

    let store = signed_in();
    let client = client(&server, store.clone());
    let err = client
        .execute(&RequestDescriptor::get(PRODUCTS))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Failed {
            status: 401,
            message: "User is inactive".to_string(),
        }
    );
    assert_eq!(requests_to(&server, TOKEN_REFRESH_PATH).await.len(), 1);
    assert_eq!(requests_to(&server, PRODUCTS).await.len(), 2);
    // renewal itself succeeded, so the session stays
    assert!(store.refresh()?.is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_success_bodies_degrade_to_empty_object() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/alertas/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/alertas/1/marcar_como_lido/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client(&server, signed_in());

    let malformed = client
        .execute(&RequestDescriptor::get("/api/alertas/"))
        .await?;
    assert_eq!(malformed.into_value(), json!({}));

    let empty = client
        .execute(&RequestDescriptor::post("/api/alertas/1/marcar_como_lido/"))
        .await?;
    assert_eq!(empty, ApiResponse::Payload(json!({})));
    Ok(())
}

#[tokio::test]
async fn caller_headers_override_defaults() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .and(header("authorization", "Token service-key"))
        .and(header("content-type", "application/json"))
        .and(header("accept-language", "pt-br"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, signed_in());
    let request = RequestDescriptor::get(PRODUCTS)
        .with_header("Authorization", "Token service-key")
        .with_header("Accept-Language", "pt-br");

    assert_eq!(client.execute(&request).await?.into_value(), json!([]));
    Ok(())
}

#[tokio::test]
async fn anonymous_calls_carry_no_bearer() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryStore::new()));
    client.execute(&RequestDescriptor::get(PRODUCTS)).await?;

    let calls = requests_to(&server, PRODUCTS).await;
    assert_eq!(bearer(&calls[0]), None);
    Ok(())
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/backend/api/dashboard/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_produtos": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(format!("{}/backend/", server.uri()));
    let client = ApiClient::new(config, signed_in())?;

    let response = client
        .execute(&RequestDescriptor::get("/api/dashboard/"))
        .await?;
    assert_eq!(response.into_value(), json!({ "total_produtos": 0 }));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();

    let config = ClientConfig::new(format!("http://127.0.0.1:{port}"));
    let client = ApiClient::new(config, signed_in())?;

    let err = client
        .execute(&RequestDescriptor::get(PRODUCTS))
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Transport(_)));
    assert!(err.notify_user());
    Ok(())
}
