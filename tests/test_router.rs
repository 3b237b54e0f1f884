//! Tests for endpoint matching and dispatch

use std::io::Read;

use flate2::read::GzDecoder;
use handwire::http::request::{Method, Request, RequestBuilder};
use handwire::http::response::StatusCode;
use handwire::http::writer::serialize_response;
use handwire::routes::{FileStore, Route, Router};
use tempfile::TempDir;

fn router() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(FileStore::new(dir.path()));
    (dir, router)
}

fn get(path: &str) -> RequestBuilder {
    RequestBuilder::new().method(Method::GET).path(path)
}

fn build(builder: RequestBuilder) -> Request {
    builder.build().unwrap()
}

#[test]
fn test_route_resolution() {
    assert_eq!(Route::resolve(Method::GET, "/"), Route::Root);
    assert_eq!(Route::resolve(Method::GET, "/echo/abc"), Route::Echo("abc"));
    assert_eq!(Route::resolve(Method::GET, "/echo/a/b%20c"), Route::Echo("a/b%20c"));
    assert_eq!(Route::resolve(Method::GET, "/echo/"), Route::Echo(""));
    assert_eq!(Route::resolve(Method::GET, "/user-agent"), Route::UserAgent);
    assert_eq!(Route::resolve(Method::GET, "/files/foo.txt"), Route::ReadFile("foo.txt"));
    assert_eq!(Route::resolve(Method::POST, "/files/foo.txt"), Route::WriteFile("foo.txt"));
}

#[test]
fn test_route_fallthrough_is_not_found() {
    assert_eq!(Route::resolve(Method::GET, "/nope"), Route::NotFound);
    assert_eq!(Route::resolve(Method::GET, "/echo"), Route::NotFound);
    assert_eq!(Route::resolve(Method::GET, "/user-agent/x"), Route::NotFound);
    assert_eq!(Route::resolve(Method::GET, "/files/"), Route::NotFound);
    assert_eq!(Route::resolve(Method::POST, "/"), Route::NotFound);
    assert_eq!(Route::resolve(Method::POST, "/echo/abc"), Route::NotFound);
    assert_eq!(Route::resolve(Method::PUT, "/files/foo.txt"), Route::NotFound);
    assert_eq!(Route::resolve(Method::DELETE, "/"), Route::NotFound);
}

#[tokio::test]
async fn test_dispatch_root() {
    let (_dir, router) = router();
    let response = router.dispatch(&build(get("/"))).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_dispatch_echo_plain() {
    let (_dir, router) = router();
    let response = router.dispatch(&build(get("/echo/abc"))).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.header("Content-Encoding"), None);
    assert_eq!(response.body, b"abc".to_vec());

    let wire = String::from_utf8(serialize_response(&response)).unwrap();
    assert!(wire.contains("Content-Length: 3\r\n"));
}

#[tokio::test]
async fn test_dispatch_echo_gzip() {
    let (_dir, router) = router();
    let request = build(get("/echo/abc").header("Accept-Encoding", "encoding-1, gzip, encoding-2"));
    let response = router.dispatch(&request).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.header("Content-Encoding"), Some("gzip"));

    let mut decoded = String::new();
    GzDecoder::new(&response.body[..])
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "abc");

    let wire = serialize_response(&response);
    let expected_len = format!("Content-Length: {}\r\n", response.body.len());
    assert!(String::from_utf8_lossy(&wire).contains(&expected_len));
}

#[tokio::test]
async fn test_dispatch_echo_unsupported_encoding() {
    let (_dir, router) = router();
    let request = build(get("/echo/abc").header("Accept-Encoding", "invalid-encoding"));
    let response = router.dispatch(&request).await;

    assert_eq!(response.header("Content-Encoding"), None);
    assert_eq!(response.body, b"abc".to_vec());
}

#[tokio::test]
async fn test_dispatch_gzip_only_applies_to_echo() {
    let (_dir, router) = router();
    let request = build(
        get("/user-agent")
            .header("User-Agent", "curl/7.64")
            .header("Accept-Encoding", "gzip"),
    );
    let response = router.dispatch(&request).await;

    assert_eq!(response.header("Content-Encoding"), None);
    assert_eq!(response.body, b"curl/7.64".to_vec());
}

#[tokio::test]
async fn test_dispatch_user_agent() {
    let (_dir, router) = router();
    let request = build(get("/user-agent").header("User-Agent", "curl/7.64"));
    let response = router.dispatch(&request).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"curl/7.64".to_vec());
}

#[tokio::test]
async fn test_dispatch_user_agent_missing() {
    let (_dir, router) = router();
    let response = router.dispatch(&build(get("/user-agent"))).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_dispatch_file_round_trip() {
    let (dir, router) = router();

    let post = build(
        RequestBuilder::new()
            .method(Method::POST)
            .path("/files/foo.txt")
            .header("Content-Length", "5")
            .body(b"hello".to_vec()),
    );
    let created = router.dispatch(&post).await;
    assert_eq!(created.status, StatusCode::Created);
    assert!(created.body.is_empty());
    assert_eq!(std::fs::read(dir.path().join("foo.txt")).unwrap(), b"hello");

    let fetched = router.dispatch(&build(get("/files/foo.txt"))).await;
    assert_eq!(fetched.status, StatusCode::Ok);
    assert_eq!(fetched.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(fetched.body, b"hello".to_vec());
}

#[tokio::test]
async fn test_dispatch_post_overwrites() {
    let (dir, router) = router();
    std::fs::write(dir.path().join("a.bin"), b"old contents").unwrap();

    let post = build(
        RequestBuilder::new()
            .method(Method::POST)
            .path("/files/a.bin")
            .body(b"new".to_vec()),
    );
    assert_eq!(router.dispatch(&post).await.status, StatusCode::Created);
    assert_eq!(std::fs::read(dir.path().join("a.bin")).unwrap(), b"new");
}

#[tokio::test]
async fn test_dispatch_missing_file() {
    let (_dir, router) = router();
    let response = router.dispatch(&build(get("/files/does-not-exist"))).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_dispatch_directory_is_not_a_file() {
    let (dir, router) = router();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let response = router.dispatch(&build(get("/files/sub"))).await;

    assert_eq!(response.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_dispatch_read_failure_is_internal_error() {
    let (_dir, router) = router();
    // Longer than any file name component the filesystem accepts.
    let path = format!("/files/{}", "n".repeat(300));

    let response = router.dispatch(&build(get(&path))).await;

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_dispatch_write_failure_is_internal_error() {
    let (_dir, router) = router();
    let post = build(
        RequestBuilder::new()
            .method(Method::POST)
            .path("/files/missing-dir/x.txt")
            .body(b"x".to_vec()),
    );

    let response = router.dispatch(&post).await;

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_dispatch_unknown_path() {
    let (_dir, router) = router();
    let response = router.dispatch(&build(get("/nope"))).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_repeated_get_is_byte_identical() {
    let (dir, router) = router();
    std::fs::write(dir.path().join("same.txt"), b"stable").unwrap();

    for path in ["/", "/echo/abc", "/user-agent", "/files/same.txt", "/nope"] {
        let request = build(get(path).header("User-Agent", "t/1"));
        let first = serialize_response(&router.dispatch(&request).await);
        let second = serialize_response(&router.dispatch(&request).await);
        assert_eq!(first, second, "{}", path);
    }
}
