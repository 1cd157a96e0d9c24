//! Web view of the latest selection.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | HTML list of the slot contents |
//! | `GET /photos.json` | the slot as a JSON array |
//! | `GET /health` | `{"status":"ok"}` |
//!
//! Pages are rendered from a snapshot on every request; nothing is cached.

use crate::error::{Result, ThrowbackError};
use crate::links::{DisplayRecord, html_escape};
use crate::slot::DisplaySlot;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use std::fmt::Write as _;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// Build the router over `slot`.
pub fn router(slot: DisplaySlot) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/photos.json", get(photos_json))
        .route("/health", get(health))
        .with_state(slot)
}

/// Running web presenter.
pub struct WebServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl WebServer {
    /// Bind `{host}:{port}` (port `0` auto-assigns) and serve in a
    /// background task.
    ///
    /// # Errors
    ///
    /// Returns [`ThrowbackError::Web`] if the listener cannot bind.
    pub async fn start(slot: DisplaySlot, host: &str, port: u16) -> Result<Self> {
        let bind_addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ThrowbackError::Web(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ThrowbackError::Web(format!("failed to get local addr: {e}")))?;

        info!("web view listening on http://{addr}/");

        let app = router(slot);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("web server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for WebServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn index(State(slot): State<DisplaySlot>) -> Html<String> {
    Html(render_page(&slot.snapshot()))
}

async fn photos_json(State(slot): State<DisplaySlot>) -> Json<Vec<DisplayRecord>> {
    Json(slot.snapshot().to_vec())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Rendering ────────────────────────────────────────────────────────

/// Full HTML page for `records`.
pub fn render_page(records: &[DisplayRecord]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Throwback photos</title>\n</head>\n<body>\n<h1>Throwback photos</h1>\n",
    );

    if records.is_empty() {
        html.push_str("<p>No photos yet. Check back after the next run.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for record in records {
            let _ = writeln!(html, "{}", render_item(record));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_item(record: &DisplayRecord) -> String {
    let large = html_escape(&record.thumbnail_url);
    let small = html_escape(&record.thumbnail_small_url);
    let label = html_escape(&record.taken_label);
    let resolution = record
        .resolution
        .map(|r| format!(" ({r})"))
        .unwrap_or_default();
    format!(
        "<li id=\"photo-{id}\"><a href=\"{large}\"><img src=\"{small}\" alt=\"{label}\" loading=\"lazy\"></a>\
         <br>#{id} taken {label}{resolution} \
         <a href=\"{large}\">large</a> | <a href=\"{small}\">small</a></li>",
        id = record.id,
    )
}
