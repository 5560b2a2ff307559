//! `ReqwestTransport` against a wiremock server.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postgrest_client_core::{
    CancellationToken, ErrorShape, Method, ReqwestTransport, Transport, TransportError,
    TransportRequest,
};

fn request(server: &MockServer, method: Method, route: &str) -> TransportRequest {
    TransportRequest {
        url: Url::parse(&format!("{}{route}", server.uri())).unwrap(),
        method,
        headers: HeaderMap::new(),
        body: None,
        signal: None,
    }
}

#[tokio::test]
async fn fetch_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("x-client", "test"))
        .and(body_string(r#"{"a":1}"#))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Content-Range", "*/1")
                .set_body_string(r#"[{"a":1}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(&server, Method::Post, "/items");
    req.headers.insert("x-client", HeaderValue::from_static("test"));
    req.body = Some(r#"{"a":1}"#.to_string());

    let raw = ReqwestTransport::default().fetch(req).await.unwrap();
    assert_eq!(raw.status, 201);
    assert_eq!(raw.status_text, "Created");
    assert_eq!(raw.header("content-range"), Some("*/1"));
    assert_eq!(raw.body, r#"[{"a":1}]"#);
}

#[tokio::test]
async fn error_statuses_are_responses_not_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let raw = ReqwestTransport::default()
        .fetch(request(&server, Method::Get, "/missing"))
        .await
        .unwrap();
    assert_eq!(raw.status, 404);
    assert_eq!(raw.status_text, "Not Found");
    assert_eq!(raw.body, "");
}

#[tokio::test]
async fn cancelled_token_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let mut req = request(&server, Method::Get, "/slow");
    req.signal = Some(token.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = ReqwestTransport::default().fetch(req).await.unwrap_err();
    trigger.await.unwrap();
    assert!(matches!(err, TransportError::Aborted));

    let shape = ErrorShape::from(&err);
    assert_eq!(shape.message, "AbortError: The operation was aborted");
    assert_eq!(shape.code, "ABORT_ERR");
    assert_eq!(shape.hint, "");
}

#[tokio::test]
async fn already_cancelled_token_never_sends() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let mut req = request(&server, Method::Get, "/never");
    req.signal = Some(token);

    let err = ReqwestTransport::default().fetch(req).await.unwrap_err();
    assert_eq!(err.name(), "AbortError");
}

#[tokio::test]
async fn connection_failure_is_fetch_error() {
    let req = TransportRequest {
        url: Url::parse("http://127.0.0.1:9/items").unwrap(),
        method: Method::Get,
        headers: HeaderMap::new(),
        body: None,
        signal: None,
    };

    let err = ReqwestTransport::default().fetch(req).await.unwrap_err();
    assert_eq!(err.name(), "FetchError");
    let shape = ErrorShape::from(&err);
    assert!(shape.message.starts_with("FetchError: "));
    assert!(!shape.details.is_empty());
}
