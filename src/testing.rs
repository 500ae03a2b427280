//! Test doubles for upstream providers

use crate::config::{Config, HttpConfig};
use axum::Router;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// HTTP client that talks to local doubles directly
pub fn client() -> reqwest::Client {
    crate::http::build_client(&HttpConfig {
        timeout_secs: 2,
        system_proxy: false,
    })
    .unwrap()
}

/// Default config with every endpoint pointed at a dead local port
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.http.system_proxy = false;
    config.http.timeout_secs = 2;
    let dead = "http://127.0.0.1:9".to_string();
    config.endpoints.ipapi = dead.clone();
    config.endpoints.ipinfo = dead.clone();
    config.endpoints.ipgeolocation = dead.clone();
    config.endpoints.google_places = dead.clone();
    config.endpoints.overpass = dead;
    config
}
