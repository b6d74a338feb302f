//! Integration tests for ReqwestUpstream using wiremock.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode, Uri};
use pretty_assertions::assert_eq;
use swcache::{
    FetchEvent, FetchRequest, NetworkError, ResponseSource, ServiceWorker, Upstream, WorkerConfig,
};
use swcache_moka::MokaStorage;
use swcache_reqwest::ReqwestUpstream;
use wiremock::matchers::{any, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn uri(server: &MockServer, path: &str) -> Uri {
    format!("{}{path}", server.uri()).parse().unwrap()
}

#[tokio::test]
async fn response_keeps_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"songs":[]}"#, "application/json")
                .insert_header("x-praise-version", "7"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let upstream = ReqwestUpstream::default();
    let response = upstream
        .call(FetchRequest::get(uri(&server, "/api/songs")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.headers()["x-praise-version"], "7");
    assert_eq!(response.body().as_ref(), br#"{"songs":[]}"#);
    assert_eq!(response.source(), &ResponseSource::Network);
}

#[tokio::test]
async fn error_status_is_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let response = ReqwestUpstream::default()
        .call(FetchRequest::get(uri(&server, "/api/broken")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body().as_ref(), b"maintenance");
}

#[tokio::test]
async fn method_headers_and_body_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/songs"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"title":"New"}"#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::new(Method::POST, uri(&server, "/api/songs"))
        .with_header(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        )
        .with_body(r#"{"title":"New"}"#);
    let response = ReqwestUpstream::default().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let target: Uri = format!("http://127.0.0.1:{port}/api/songs").parse().unwrap();

    let error = ReqwestUpstream::default()
        .call(FetchRequest::get(target))
        .await
        .unwrap_err();

    assert!(matches!(error, NetworkError::Connect(_)), "{error:?}");
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let error = ReqwestUpstream::new(client)
        .call(FetchRequest::get(uri(&server, "/api/slow")))
        .await
        .unwrap_err();

    assert!(matches!(error, NetworkError::Timeout), "{error:?}");
}

#[tokio::test]
async fn worker_replays_when_server_stops_answering() {
    let server = MockServer::start().await;
    for (route, body) in [("/", "<html>shell</html>"), ("/logo192.png", "png")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "songs": [{"id": 1, "title": "Amazing Grace"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        "origin: {}\nprecache:\n  - /\n  - /logo192.png\n",
        server.uri()
    );
    let config = WorkerConfig::from_yaml(&yaml).unwrap();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let storage = Arc::new(MokaStorage::builder().build());
    let worker = ServiceWorker::builder()
        .config(config)
        .storage(storage)
        .upstream(ReqwestUpstream::new(client))
        .build()
        .unwrap();

    worker.on_install().await.unwrap();
    worker.on_activate().await.unwrap();
    let live = worker
        .on_fetch(FetchEvent::new(FetchRequest::get(uri(&server, "/api/songs"))))
        .await
        .unwrap();

    let songs = uri(&server, "/api/songs");
    let page = uri(&server, "/rehearsals");
    server.verify().await;

    // Every request now outlives the client timeout.
    server.reset().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let replay = worker
        .on_fetch(FetchEvent::new(FetchRequest::get(songs)))
        .await
        .unwrap();
    assert!(replay.source().is_cached());
    assert_eq!(replay.body(), live.body());

    let shell = worker
        .on_fetch(FetchEvent::new(FetchRequest::navigate(page)))
        .await
        .unwrap();
    assert_eq!(shell.body().as_ref(), b"<html>shell</html>");
}
