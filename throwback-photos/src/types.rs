//! Wire types for the photo server API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An authenticated session.
///
/// Valid for one dispatcher run; never cached across runs.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    sid: String,
}

impl Session {
    /// Wrap a session identifier returned by the login call.
    pub fn new(sid: impl Into<String>) -> Self {
        Self { sid: sid.into() }
    }

    /// The raw session identifier, for building authenticated URLs.
    pub fn sid(&self) -> &str {
        &self.sid
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("sid", &"<redacted>").finish()
    }
}

/// A catalog item as returned by the listing endpoint.
///
/// `fields` keeps every attribute besides `id`, `time` and `additional`
/// (filename, filesize, type, owner, ...), untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Server-side item identifier.
    pub id: u64,
    /// Capture time, seconds since the Unix epoch.
    pub time: i64,
    /// Metadata requested through the `additional` query parameter.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional: Option<PhotoAdditional>,
    /// All other original attributes.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Photo {
    /// Create a photo with no additional metadata.
    pub fn new(id: u64, time: i64) -> Self {
        Self {
            id,
            time,
            additional: None,
            fields: Map::new(),
        }
    }

    /// Attach a thumbnail cache key.
    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        let additional = self.additional.get_or_insert_with(PhotoAdditional::default);
        additional.thumbnail = Some(Thumbnail {
            cache_key: Some(cache_key.into()),
        });
        self
    }

    /// Attach resolution metadata.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        let additional = self.additional.get_or_insert_with(PhotoAdditional::default);
        additional.resolution = Some(Resolution { width, height });
        self
    }

    /// The thumbnail cache key, if the server supplied one.
    pub fn cache_key(&self) -> Option<&str> {
        self.additional
            .as_ref()
            .and_then(|a| a.thumbnail.as_ref())
            .and_then(|t| t.cache_key.as_deref())
    }

    /// Resolution metadata, if the server supplied it.
    pub fn resolution(&self) -> Option<Resolution> {
        self.additional.as_ref().and_then(|a| a.resolution)
    }
}

/// The `additional` envelope of a catalog item.
///
/// Each entry is optional metadata: one that is missing or malformed
/// decodes as `None` and never costs the photo itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoAdditional {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<Thumbnail>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolution: Option<Resolution>,
}

/// Thumbnail descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Cache key, usually `<unit id>_<timestamp>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

/// Decode an optional value, turning anything that does not fit `T` into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Pixel dimensions of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Response of the login call.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthEnvelope {
    #[serde(default)]
    pub data: Option<AuthData>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthData {
    #[serde(default)]
    pub sid: Option<String>,
}

/// Error object the server attaches to `success: false` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub code: i64,
}
