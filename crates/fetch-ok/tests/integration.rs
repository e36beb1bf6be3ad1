//! Integration tests for fetch-ok using mockito

use std::time::Duration;

use fetch_ok::{
    fetch_ok, fetch_text, ok_response, text_response, throw_on_not_ok, thrown_has_status,
    BodyLimit, CancellationToken, Error, ErrorContext, Fetcher, Method, Profile, Request,
    RequestInit, ReqwestTransport, ResponseHandle, Transport, TransportConfig, ELLIPSIS,
    MAX_BODY_CHARS, SEC_FETCH_MODE,
};
use mockito::Matcher;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestPayload {
    name: String,
    value: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestResponse {
    success: bool,
    data: String,
}

// === fetch_text tests ===

#[tokio::test]
async fn test_fetch_text_success() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/ok")
        .match_header("accept", "text/*")
        .with_status(200)
        .with_body("hello 💮")
        .create_async()
        .await;

    let url = format!("{}/ok", server.url());
    let text = fetch_text(&url, None, "text did not succeed")
        .await
        .expect("Fetch text should succeed");
    assert_eq!(text, "hello 💮");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_text_error_status() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/text")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let url = format!("{}/text", server.url());
    let err = fetch_text(&url, None, "text rejected")
        .await
        .expect_err("503 should fail");

    assert_eq!(err.to_string(), "text rejected");
    let response = err.as_response().expect("Expected Error::Response");
    assert_eq!(response.status(), Some(503));
    assert_eq!(response.body(), Some("Service Unavailable"));

    mock.assert_async().await;
}

// === fetch_ok tests ===

#[tokio::test]
async fn test_fetch_ok_success() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/ok")
        .with_status(200)
        .create_async()
        .await;

    let url = format!("{}/ok", server.url());
    fetch_ok(&url, None, "ok did not succeed")
        .await
        .expect("Fetch ok should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_ok_not_found_without_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/fail")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/fail", server.url());
    let err = fetch_ok(&url, None, "ok failed")
        .await
        .expect_err("404 should fail");

    assert!(thrown_has_status(&err, 404));
    assert!(!thrown_has_status(&err, 500));
    assert_eq!(err.as_response().and_then(|e| e.body()), Some(""));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_ok_sends_method_and_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/submit")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "test",
            "value": 42
        })))
        .with_status(201)
        .with_body("created")
        .create_async()
        .await;

    let payload = TestPayload {
        name: "test".to_string(),
        value: 42,
    };
    let init = RequestInit::new()
        .method(Method::POST)
        .json(&payload)
        .expect("Serializable payload");

    let url = format!("{}/api/submit", server.url());
    Fetcher::new()
        .fetch_ok(&url, Some(init), "submit failed")
        .await
        .expect("POST should succeed");

    mock.assert_async().await;
}

// === fetch_json tests ===

#[tokio::test]
async fn test_fetch_json_success() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/data")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": "hello"}"#)
        .create_async()
        .await;

    let url = format!("{}/api/data", server.url());
    let response: TestResponse = Fetcher::new()
        .fetch_json(&url, None, "json did not succeed")
        .await
        .expect("Fetch JSON should succeed");

    assert!(response.success);
    assert_eq!(response.data, "hello");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_json_keeps_explicit_accept() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/data")
        .match_header("accept", "text/html")
        .with_status(200)
        .with_body(r#"{"success": true, "data": "html"}"#)
        .create_async()
        .await;

    let url = format!("{}/api/data", server.url());
    let init = RequestInit::new().header("accept", "text/html");
    let response: TestResponse = Fetcher::new()
        .fetch_json(&url, Some(init), "json did not succeed")
        .await
        .expect("Fetch JSON should succeed");
    assert_eq!(response.data, "html");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_json_error_carries_context() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/users/7")
        .with_status(403)
        .with_body(r#"{"error": "forbidden"}"#)
        .create_async()
        .await;

    let url = format!("{}/api/users/7", server.url());
    let context = ErrorContext::new("could not load user")
        .with("user", 7)
        .with("scope", "admin");
    let err = Fetcher::new()
        .fetch_json::<TestResponse>(&url, None, context)
        .await
        .expect_err("403 should fail");

    let response = err.as_response().expect("Expected Error::Response");
    assert_eq!(response.status(), Some(403));
    assert_eq!(
        response.to_json(),
        serde_json::json!({
            "message": "could not load user",
            "response": { "status": 403, "body": r#"{"error": "forbidden"}"# },
            "user": 7,
            "scope": "admin",
        })
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_json_malformed_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/broken")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let url = format!("{}/api/broken", server.url());
    let err = Fetcher::new()
        .fetch_json::<TestResponse>(&url, None, "json did not succeed")
        .await
        .expect_err("Malformed JSON should fail");

    assert!(matches!(err, Error::Json(_)));
    assert!(!thrown_has_status(&err, 200));

    mock.assert_async().await;
}

// === body limit tests ===

#[tokio::test]
async fn test_error_body_is_truncated() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/big")
        .with_status(500)
        .with_body("e".repeat(10_000))
        .expect(2)
        .create_async()
        .await;

    let url = format!("{}/big", server.url());
    for limit in [BodyLimit::Head, BodyLimit::HeadTail] {
        let config = TransportConfig::builder().body_limit(limit).build();
        let fetcher = Fetcher::with_transport(ReqwestTransport::with_config(config));
        let err = fetcher
            .fetch_ok(&url, None, "big failure")
            .await
            .expect_err("500 should fail");
        let body = err
            .as_response()
            .and_then(|e| e.body())
            .expect("Body attached");
        assert_eq!(body.chars().count(), MAX_BODY_CHARS);
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_lower_level_entry_points_use_transport_body_limit() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/big")
        .with_status(500)
        .with_body("e".repeat(10_000))
        .expect(3)
        .create_async()
        .await;

    let config = TransportConfig::builder()
        .body_limit(BodyLimit::HeadTail)
        .build();
    let transport = ReqwestTransport::with_config(config);
    let url = format!("{}/big", server.url());

    let text_err = text_response(
        transport.fetch(Request::new(url.clone(), RequestInit::new())),
        "big failure",
    )
    .await
    .expect_err("500 should fail");
    let ok_err = ok_response(
        transport.fetch(Request::new(url.clone(), RequestInit::new())),
        "big failure",
    )
    .await
    .expect_err("500 should fail");
    let fetcher_err = Fetcher::with_transport(transport)
        .fetch_text(&url, None, "big failure")
        .await
        .expect_err("500 should fail");

    for err in [text_err, ok_err, fetcher_err] {
        let body = err
            .as_response()
            .and_then(|e| e.body())
            .expect("Body attached");
        assert_eq!(body.chars().count(), MAX_BODY_CHARS);
        assert!(body.contains(ELLIPSIS));
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_capped_read_stops_at_the_cap() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/flowers")
        .with_status(200)
        .with_body("💮".repeat(10_000))
        .create_async()
        .await;

    let transport = ReqwestTransport::new();
    let url = format!("{}/flowers", server.url());
    let response = transport
        .fetch(Request::new(url, RequestInit::new()))
        .await
        .expect("Request should succeed");
    assert_eq!(response.body_limit(), BodyLimit::Head);

    let text = response.text_capped(10).await.expect("Readable");
    assert_eq!(text, "💮💮");

    mock.assert_async().await;
}

// === profile and interceptor tests ===

#[tokio::test]
async fn test_pooled_profile_strips_fetch_metadata() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/pooled")
        .match_header(SEC_FETCH_MODE, Matcher::Missing)
        .match_header("x-client", "fetch-ok")
        .with_status(200)
        .with_body("clean")
        .create_async()
        .await;

    let config = TransportConfig::builder()
        .profile(Profile::Pooled)
        .default_header(SEC_FETCH_MODE, "cors")
        .default_header("x-client", "fetch-ok")
        .build();
    let fetcher = Fetcher::with_transport(ReqwestTransport::with_config(config));

    let url = format!("{}/pooled", server.url());
    let init = RequestInit::new().header("Sec-Fetch-Mode", "navigate");
    let text = fetcher
        .fetch_text(&url, Some(init), "pooled request failed")
        .await
        .expect("Header should be stripped");
    assert_eq!(text, "clean");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_pooled_profile_strips_on_lower_level_entry_points() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/raw")
        .match_header(SEC_FETCH_MODE, Matcher::Missing)
        .with_status(200)
        .with_body("raw")
        .create_async()
        .await;

    let config = TransportConfig::builder()
        .profile(Profile::Pooled)
        .default_header(SEC_FETCH_MODE, "cors")
        .build();
    let transport = ReqwestTransport::with_config(config);

    let url = format!("{}/raw", server.url());
    let text = text_response(
        transport.fetch(Request::new(url, RequestInit::new())),
        "raw request failed",
    )
    .await
    .expect("Header should be stripped");
    assert_eq!(text, "raw");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_profile_keeps_injected_headers() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/server")
        .match_header(SEC_FETCH_MODE, "cors")
        .with_status(200)
        .create_async()
        .await;

    let config = TransportConfig::builder()
        .default_header(SEC_FETCH_MODE, "cors")
        .build();
    let fetcher = Fetcher::with_transport(ReqwestTransport::with_config(config));

    let url = format!("{}/server", server.url());
    fetcher
        .fetch_ok(&url, None, "server request failed")
        .await
        .expect("Header should be sent");

    mock.assert_async().await;
}

// === lower-level response tests ===

#[tokio::test]
async fn test_throw_on_not_ok_passes_success_unread() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/raw")
        .with_status(200)
        .with_body("still readable")
        .create_async()
        .await;

    let transport = ReqwestTransport::new();
    let url = format!("{}/raw", server.url());
    let response = throw_on_not_ok(
        transport.fetch(Request::new(url, RequestInit::new())),
        "raw failed",
    )
    .await
    .expect("200 should pass");

    assert_eq!(response.status(), Some(200));
    assert_eq!(response.ok(), Some(true));
    assert_eq!(response.text().await.expect("Readable"), "still readable");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_ok_response_rejects_server_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("DELETE", "/item")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let transport = ReqwestTransport::new();
    let url = format!("{}/item", server.url());
    let init = RequestInit::new().method(Method::DELETE);
    let err = ok_response(transport.fetch(Request::new(url, init)), "delete failed")
        .await
        .expect_err("500 should fail");

    assert!(thrown_has_status(&err, 500));

    mock.assert_async().await;
}

// === transport failure tests ===

#[tokio::test]
async fn test_connection_failure_is_not_a_response_error() {
    let err = fetch_ok("http://127.0.0.1:1/", None, "unreachable")
        .await
        .expect_err("Connection should fail");

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), None);
    assert!(!thrown_has_status(&err, 404));
}

#[tokio::test]
async fn test_invalid_url_is_a_build_error() {
    let err = fetch_text("not a url", None, "invalid")
        .await
        .expect_err("Invalid URL should fail");
    assert!(matches!(err, Error::Build(_)));
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind local listener");
    let addr = listener.local_addr().expect("Listener address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let init = RequestInit::new().timeout(Duration::from_millis(50));
    let err = Fetcher::new()
        .fetch_text(&format!("http://{addr}/silent"), Some(init), "silent")
        .await
        .expect_err("Request should time out");

    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_timeout());
    assert_eq!(err.status(), None);
    assert!(!thrown_has_status(&err, 0));
}

#[tokio::test]
async fn test_cancelled_request() {
    let server = mockito::Server::new_async().await;

    let token = CancellationToken::new();
    token.cancel();
    let init = RequestInit::new().cancel(token);

    let url = format!("{}/slow", server.url());
    let err = Fetcher::new()
        .fetch_text(&url, Some(init), "cancelled")
        .await
        .expect_err("Cancelled request should fail");
    assert!(matches!(err, Error::Cancelled));
}

// === proxy tests ===

#[tokio::test]
async fn test_requests_go_through_proxy() {
    let mut proxy = mockito::Server::new_async().await;

    let mock = proxy
        .mock("GET", Matcher::Any)
        .match_header("host", "upstream.invalid")
        .with_status(200)
        .with_body("via proxy")
        .create_async()
        .await;

    let proxy_url = Url::parse(&proxy.url()).expect("Valid proxy URL");
    let fetcher = Fetcher::with_transport(
        ReqwestTransport::builder()
            .proxy(proxy_url)
            .build()
            .expect("Valid builder"),
    );

    let text = fetcher
        .fetch_text("http://upstream.invalid/motd", None, "proxied request failed")
        .await
        .expect("Proxy should answer");
    assert_eq!(text, "via proxy");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_proxy_matcher_selects_hosts() {
    let mut proxy = mockito::Server::new_async().await;
    let mut direct = mockito::Server::new_async().await;

    let proxied = proxy
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body("via proxy")
        .expect(1)
        .create_async()
        .await;
    let unproxied = direct
        .mock("GET", "/direct")
        .with_status(200)
        .with_body("direct")
        .create_async()
        .await;

    let proxy_url = Url::parse(&proxy.url()).expect("Valid proxy URL");
    let fetcher = Fetcher::with_transport(
        ReqwestTransport::builder()
            .proxy_with_matcher(proxy_url, r"\.invalid$")
            .expect("Valid matcher")
            .build()
            .expect("Valid builder"),
    );

    let text = fetcher
        .fetch_text("http://upstream.invalid/motd", None, "proxied request failed")
        .await
        .expect("Proxy should answer");
    assert_eq!(text, "via proxy");

    let url = format!("{}/direct", direct.url());
    let text = fetcher
        .fetch_text(&url, None, "direct request failed")
        .await
        .expect("Direct server should answer");
    assert_eq!(text, "direct");

    proxied.assert_async().await;
    unproxied.assert_async().await;
}
