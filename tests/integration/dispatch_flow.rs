//! End-to-end dispatcher runs against a mock photo server.

use crate::helpers::{
    RecordingMailer, SID, WEB_URL, date, dispatcher, item, mount_catalog, mount_login, noon,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use throwback::links::display_records;
use throwback::{CaptureZone, DispatchOutcome, DisplaySlot, SendPeriod, ThrowbackError};
use throwback_photos::{Photo, PhotosError, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn day_mode_mails_and_publishes_matching_photos() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_catalog(
        &server,
        vec![
            item(1, noon(2022, 3, 15)),
            item(2, noon(2023, 3, 16)),
            item(3, noon(2024, 3, 15)),
        ],
    )
    .await;

    let mailer = Arc::new(RecordingMailer::default());
    let slot = DisplaySlot::new();
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Day);

    let outcome = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Sent {
            photos: 1,
            summary: "250 queued".into()
        }
    );

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.from, "sender@example.com");
    assert_eq!(email.to, "family@example.com");
    assert_eq!(email.subject, "On this day");
    assert_eq!(email.html.matches("<a href=").count(), 2);
    assert!(email.html.contains(">3/15/2022 12:00:00 PM</a><br>\n"));
    assert!(email.html.contains(&format!("_sid={SID}")));
    assert!(email.html.contains("size=xl"));
    assert!(email.html.ends_with(&format!("<a href=\"{WEB_URL}\">View all photos</a>")));

    let records = slot.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 1);
    assert_eq!(records[0].fields["filename"], "IMG_0001.JPG");
    assert!(records[0].thumbnail_small_url.contains("size=m"));
}

#[tokio::test]
async fn week_mode_uses_week_numbers() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    // Week 11 of 2023 runs Saturday 03-11 to Friday 03-17.
    mount_catalog(
        &server,
        vec![
            item(10, noon(2023, 3, 10)),
            item(11, noon(2023, 3, 11)),
            item(17, noon(2023, 3, 17)),
            item(18, noon(2023, 3, 18)),
        ],
    )
    .await;

    let mailer = Arc::new(RecordingMailer::default());
    let slot = DisplaySlot::new();
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Week);

    let outcome = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Sent { photos: 2, .. }));
    let ids: Vec<u64> = slot.snapshot().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![11, 17]);
}

#[tokio::test]
async fn empty_selection_sends_nothing_and_keeps_previous_records() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_catalog(&server, vec![item(5, noon(2023, 7, 4))]).await;

    let previous = display_records(
        &[Photo::new(99, noon(2020, 1, 1))],
        "https://nas.local",
        &Session::new("old"),
        &CaptureZone::utc(),
    );
    let slot = DisplaySlot::new();
    slot.replace(previous);

    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Month);

    let outcome = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::NothingToSend);
    assert!(mailer.sent().is_empty());
    let ids: Vec<u64> = slot.snapshot().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![99]);
}

#[tokio::test]
async fn send_failure_is_reported_after_slot_update() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_catalog(&server, vec![item(1, noon(2021, 3, 2)), item(2, noon(2022, 3, 30))]).await;

    let mailer = Arc::new(RecordingMailer::failing());
    let slot = DisplaySlot::new();
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Month);

    let outcome = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    match outcome {
        DispatchOutcome::SendFailed { photos, error } => {
            assert_eq!(photos, 2);
            assert!(error.contains("connection refused"), "{error}");
        }
        other => panic!("expected SendFailed, got {other:?}"),
    }
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(slot.len(), 2);
}

#[tokio::test]
async fn login_failure_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photo/webapi/auth.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": 400}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photo/webapi/entry.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mailer = Arc::new(RecordingMailer::default());
    let slot = DisplaySlot::new();
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Day);

    let err = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap_err();
    assert!(
        matches!(err, ThrowbackError::Photos(PhotosError::Auth(_))),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
    assert!(slot.is_empty());
}

#[tokio::test]
async fn catalog_failure_aborts_the_run() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/photo/webapi/entry.cgi"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mailer = Arc::new(RecordingMailer::default());
    let slot = DisplaySlot::new();
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Day);

    let err = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap_err();
    assert!(
        matches!(err, ThrowbackError::Photos(PhotosError::Status { status: 502, .. })),
        "got {err:?}"
    );
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn every_run_logs_in_again() {
    let server = MockServer::start().await;
    mount_login(&server, 2).await;
    mount_catalog(&server, vec![item(1, noon(2022, 3, 15))]).await;

    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), DisplaySlot::new(), SendPeriod::Day);

    dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    assert_eq!(mailer.sent().len(), 2);
}

#[tokio::test]
async fn capture_dates_follow_the_configured_zone() {
    // 23:30 UTC on 2023-03-14 is already the 15th at +02:00.
    let late = Utc
        .with_ymd_and_hms(2023, 3, 14, 23, 30, 0)
        .single()
        .unwrap()
        .timestamp();
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_catalog(&server, vec![item(7, late)]).await;

    let mailer = Arc::new(RecordingMailer::default());
    let slot = DisplaySlot::new();
    // The helper dispatcher captures in UTC: the photo is on the 14th.
    let dispatcher = dispatcher(&server, Arc::clone(&mailer), slot.clone(), SendPeriod::Day);
    let outcome = dispatcher.run_once_at(date(2024, 3, 15)).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::NothingToSend);

    let records = display_records(
        &[Photo::new(7, late)],
        "https://nas.local",
        &Session::new(SID),
        &CaptureZone::Fixed(chrono::FixedOffset::east_opt(2 * 3600).unwrap()),
    );
    assert_eq!(records[0].taken_label, "3/15/2023 1:30:00 AM");
}
