//! Content server behaviour over real HTTP

use deckcheck_e2e::{ContentServer, ServerConfig};
use std::path::Path;

fn config_for(root: &Path) -> ServerConfig {
    ServerConfig {
        root_dir: root.to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn serves_files_below_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>deck</h1>").unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js/app.js"), "window.app = 1;").unwrap();

    let mut server = ContentServer::start(&config_for(dir.path())).await.unwrap();

    let body = reqwest::get(server.url_for("index.html"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "<h1>deck</h1>");

    let script = reqwest::get(server.url_for("/js/app.js")).await.unwrap();
    assert!(script.status().is_success());
    assert_eq!(script.text().await.unwrap(), "window.app = 1;");

    server.stop().await;
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = ContentServer::start(&config_for(dir.path())).await.unwrap();

    let response = reqwest::get(server.url_for("nope.html")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn concurrent_servers_get_distinct_ports() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = ContentServer::start(&config_for(dir.path())).await.unwrap();
    let mut b = ContentServer::start(&config_for(dir.path())).await.unwrap();

    assert_ne!(a.port(), b.port());
    assert_ne!(a.base_url(), b.base_url());

    a.stop().await;
    b.stop().await;
}

#[tokio::test]
async fn stopped_server_refuses_connections() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "ok").unwrap();
    let mut server = ContentServer::start(&config_for(dir.path())).await.unwrap();
    let url = server.url_for("index.html");

    server.stop().await;
    assert!(!server.is_running());
    assert!(reqwest::get(url).await.is_err());
}
