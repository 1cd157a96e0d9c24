//! Web view routes serving what the dispatcher published.

use crate::helpers::{RecordingMailer, date, dispatcher, item, mount_catalog, mount_login, noon};
use serde_json::Value;
use std::sync::Arc;
use throwback::{DisplaySlot, SendPeriod, WebServer};
use wiremock::MockServer;

async fn get(server: &WebServer, route: &str) -> reqwest::Response {
    reqwest::get(format!("http://{}{route}", server.addr()))
        .await
        .unwrap()
}

#[tokio::test]
async fn empty_slot_renders_placeholder() {
    let web = WebServer::start(DisplaySlot::new(), "127.0.0.1", 0).await.unwrap();

    let response = get(&web, "/").await;
    assert_eq!(response.status(), 200);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"), "{content_type}");
    assert!(response.text().await.unwrap().contains("No photos yet"));

    let json: Value = get(&web, "/photos.json").await.json().await.unwrap();
    assert_eq!(json, Value::Array(vec![]));
}

#[tokio::test]
async fn health_reports_ok() {
    let web = WebServer::start(DisplaySlot::new(), "127.0.0.1", 0).await.unwrap();
    let json: Value = get(&web, "/health").await.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let web = WebServer::start(DisplaySlot::new(), "127.0.0.1", 0).await.unwrap();
    assert_eq!(get(&web, "/admin").await.status(), 404);
}

#[tokio::test]
async fn page_shows_latest_dispatch() {
    let photos = MockServer::start().await;
    mount_login(&photos, 1).await;
    mount_catalog(
        &photos,
        vec![item(1, noon(2022, 3, 15)), item(2, noon(2019, 3, 15))],
    )
    .await;

    let slot = DisplaySlot::new();
    let web = WebServer::start(slot.clone(), "127.0.0.1", 0).await.unwrap();
    let dispatcher = dispatcher(
        &photos,
        Arc::new(RecordingMailer::default()),
        slot,
        SendPeriod::Day,
    );
    dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();

    let html = get(&web, "/").await.text().await.unwrap();
    assert!(html.contains("<li id=\"photo-1\">"));
    assert!(html.contains("<li id=\"photo-2\">"));
    assert!(html.contains("3/15/2019 12:00:00 PM (4032x3024)"));
    assert!(html.find("photo-1").unwrap() < html.find("photo-2").unwrap());

    let json: Value = get(&web, "/photos.json").await.json().await.unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["filename"], "IMG_0001.JPG");
    assert_eq!(records[1]["taken_label"], "3/15/2019 12:00:00 PM");
    assert!(records[1]["thumbnail_url"].as_str().unwrap().contains("size=xl"));
}
