//! Shared fixtures: a mock photo server and a recording mailer.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use throwback::mail::{MailError, Mailer, OutboundEmail};
use throwback::{CaptureZone, DispatchSettings, Dispatcher, DisplaySlot, SendPeriod};
use throwback_photos::{PhotosClient, PhotosConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SID: &str = "sid-abc";
pub const PAGE_SIZE: usize = 50;
pub const WEB_URL: &str = "http://photos.example.org/";

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            Err(MailError::Transport("connection refused".into()))
        } else {
            Ok("250 queued".into())
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Noon UTC on the given day.
pub fn noon(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap().timestamp()
}

pub fn item(id: u64, time: i64) -> Value {
    json!({
        "id": id,
        "filename": format!("IMG_{id:04}.JPG"),
        "time": time,
        "type": "photo",
        "additional": {
            "thumbnail": {"cache_key": format!("{id}_{time}")},
            "resolution": {"width": 4032, "height": 3024}
        }
    })
}

/// Accept the login and answer with [`SID`], expecting `logins` calls.
pub async fn mount_login(server: &MockServer, logins: u64) {
    Mock::given(method("GET"))
        .and(path("/photo/webapi/auth.cgi"))
        .and(query_param("method", "login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"sid": SID}
        })))
        .expect(logins)
        .mount(server)
        .await;
}

/// Serve `items` as a single catalog page followed by an empty one.
pub async fn mount_catalog(server: &MockServer, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/photo/webapi/entry.cgi"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"list": items}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photo/webapi/entry.cgi"))
        .and(query_param("offset", PAGE_SIZE.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"list": []}
        })))
        .mount(server)
        .await;
}

/// Dispatcher against `server`, capture dates in UTC.
pub fn dispatcher(
    server: &MockServer,
    mailer: Arc<RecordingMailer>,
    slot: DisplaySlot,
    period: SendPeriod,
) -> Dispatcher {
    let config = PhotosConfig::new(server.uri(), "alice", "secret").with_page_size(PAGE_SIZE);
    let photos = PhotosClient::new(config).unwrap();
    let settings = DispatchSettings {
        period,
        zone: CaptureZone::utc(),
        from: "sender@example.com".into(),
        to: "family@example.com".into(),
        subject: "On this day".into(),
        web_url: WEB_URL.into(),
    };
    Dispatcher::new(photos, mailer, slot, settings)
}
