mod common;

use std::fs;

use common::init_logging;
use relay_core::upload_endpoint;
use relay_engine::{SinkError, SinkHandle, SinkService, SinkSettings};
use reqwest::StatusCode;
use tempfile::TempDir;

fn start_sink(storage: &TempDir) -> SinkHandle {
    init_logging();
    SinkService::spawn(SinkSettings {
        port: 0,
        storage_dir: storage.path().join("received_images"),
        ..SinkSettings::default()
    })
    .expect("sink starts")
}

#[tokio::test]
async fn post_stores_the_body_under_the_given_name() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);

    let response = reqwest::Client::new()
        .post(format!("{}/cat.png", sink.base_url()))
        .body(b"\x89PNG".to_vec())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = storage.path().join("received_images").join("cat.png");
    assert_eq!(fs::read(stored).unwrap(), b"\x89PNG");
}

#[tokio::test]
async fn encoded_names_are_decoded_before_storing() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);

    let response = reqwest::Client::new()
        .post(upload_endpoint(&sink.base_url(), "my cat.png"))
        .body("x")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(storage
        .path()
        .join("received_images")
        .join("my cat.png")
        .is_file());
}

#[tokio::test]
async fn repeated_upload_replaces_the_file() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);
    let client = reqwest::Client::new();
    let endpoint = format!("{}/dog.jpg", sink.base_url());

    for body in ["first", "second"] {
        let response = client.post(&endpoint).body(body).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = storage.path().join("received_images").join("dog.jpg");
    assert_eq!(fs::read_to_string(stored).unwrap(), "second");
}

#[tokio::test]
async fn non_post_methods_get_bad_request() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);
    let client = reqwest::Client::new();
    let endpoint = format!("{}/cat.png", sink.base_url());

    let get = client.get(&endpoint).send().await.unwrap();
    let put = client.put(&endpoint).body("x").send().await.unwrap();

    assert_eq!(get.status(), StatusCode::BAD_REQUEST);
    assert_eq!(put.status(), StatusCode::BAD_REQUEST);
    assert!(!storage
        .path()
        .join("received_images")
        .join("cat.png")
        .exists());
}

#[tokio::test]
async fn names_escaping_the_storage_dir_are_refused() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);

    let response = reqwest::Client::new()
        .post(format!("{}/..%2Fescape.png", sink.base_url()))
        .body("x")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!storage.path().join("escape.png").exists());
}

#[tokio::test]
async fn storage_failure_gives_server_error() {
    let storage = TempDir::new().unwrap();
    let sink = start_sink(&storage);
    let dir = storage.path().join("received_images");
    fs::remove_dir_all(&dir).unwrap();
    fs::write(&dir, "now a file").unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/cat.png", sink.base_url()))
        .body("x")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(flavor = "current_thread")]
async fn start_serves_while_caller_runtime_keeps_running() {
    init_logging();
    let storage = TempDir::new().unwrap();
    let ticker = tokio::spawn(async { tokio::task::yield_now().await });

    let sink = SinkService::start(SinkSettings {
        port: 0,
        storage_dir: storage.path().join("received_images"),
        ..SinkSettings::default()
    })
    .await
    .expect("sink starts");
    ticker.await.unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/bird.gif", sink.base_url()))
        .body("gif")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_reports_occupied_port() {
    init_logging();
    let storage = TempDir::new().unwrap();
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    let result = SinkService::start(SinkSettings {
        port,
        storage_dir: storage.path().to_path_buf(),
        ..SinkSettings::default()
    })
    .await;

    assert!(matches!(result, Err(SinkError::Bind { .. })));
}

#[test]
fn occupied_port_is_reported_at_startup() {
    init_logging();
    let storage = TempDir::new().unwrap();
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    let result = SinkService::spawn(SinkSettings {
        port,
        storage_dir: storage.path().to_path_buf(),
        ..SinkSettings::default()
    });

    assert!(matches!(result, Err(SinkError::Bind { .. })));
}

#[test]
fn shutdown_releases_the_port() {
    init_logging();
    let storage = TempDir::new().unwrap();
    let sink = SinkService::spawn(SinkSettings {
        port: 0,
        storage_dir: storage.path().to_path_buf(),
        ..SinkSettings::default()
    })
    .unwrap();
    let addr = sink.local_addr();
    assert!(sink.base_url().ends_with("/add/image"));

    sink.shutdown();

    std::net::TcpListener::bind(addr).expect("port is free again");
}
