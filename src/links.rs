//! Email links and web display records for a selection of photos.
//!
//! Both projections keep input order and embed the session id in the
//! thumbnail URLs, so they are only useful while that session lives.

use crate::period::CaptureZone;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use throwback_photos::thumbnail::{ThumbnailSize, small_from_large, thumbnail_url};
use throwback_photos::{Photo, Resolution, Session};

/// A photo prepared for the web view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// Server-side item identifier.
    pub id: u64,
    /// Capture time, seconds since the Unix epoch.
    pub time: i64,
    /// Original catalog attributes other than `additional`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Extra-large thumbnail link.
    pub thumbnail_url: String,
    /// Medium thumbnail link.
    pub thumbnail_small_url: String,
    /// Capture time in the configured zone.
    pub taken_at: DateTime<FixedOffset>,
    /// Human-readable capture date and time.
    pub taken_label: String,
}

/// Format a capture time the way US-English locales print dates
/// (`3/15/2022 12:00:00 PM`).
pub fn format_taken(taken: &DateTime<FixedOffset>) -> String {
    taken.format("%-m/%-d/%Y %-I:%M:%S %p").to_string()
}

/// One `<a>` element per photo, linking its large thumbnail and labelled
/// with the capture date and time.
pub fn email_anchors(
    photos: &[Photo],
    base_url: &str,
    session: &Session,
    zone: &CaptureZone,
) -> Vec<String> {
    photos
        .iter()
        .map(|photo| {
            let href = thumbnail_url(base_url, photo, session, ThumbnailSize::Large);
            let label = zone
                .datetime(photo.time)
                .map_or_else(|| photo.time.to_string(), |dt| format_taken(&dt));
            format!(
                r#"<a href="{}">{}</a>"#,
                html_escape(&href),
                html_escape(&label)
            )
        })
        .collect()
}

/// Display records for the web view.
///
/// Photos whose timestamp cannot be represented as a date are skipped.
pub fn display_records(
    photos: &[Photo],
    base_url: &str,
    session: &Session,
    zone: &CaptureZone,
) -> Vec<DisplayRecord> {
    photos
        .iter()
        .filter_map(|photo| {
            let taken_at = zone.datetime(photo.time)?;
            let thumbnail_url = thumbnail_url(base_url, photo, session, ThumbnailSize::Large);
            let thumbnail_small_url = small_from_large(&thumbnail_url);
            Some(DisplayRecord {
                id: photo.id,
                time: photo.time,
                fields: photo.fields.clone(),
                resolution: photo.resolution(),
                thumbnail_url,
                thumbnail_small_url,
                taken_label: format_taken(&taken_at),
                taken_at,
            })
        })
        .collect()
}

/// Escape text for use in HTML element content and attribute values.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
