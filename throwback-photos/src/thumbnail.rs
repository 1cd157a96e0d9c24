//! Authenticated thumbnail download links.
//!
//! A link embeds the session id, so it stops working once the session
//! expires on the server.

use crate::types::{Photo, Session};
use url::form_urlencoded;

/// Path of the thumbnail download endpoint, relative to the base URL.
pub const THUMBNAIL_PATH: &str = "/webapi/entry.cgi";

/// Thumbnail size variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSize {
    /// Extra-large preview (`xl`).
    Large,
    /// Medium preview (`m`).
    Small,
}

impl ThumbnailSize {
    /// Size token used by the server.
    pub fn token(self) -> &'static str {
        match self {
            Self::Large => "xl",
            Self::Small => "m",
        }
    }

    fn query_fragment(self) -> String {
        format!("size={}", self.token())
    }
}

/// The unit id used to address a photo's thumbnail.
///
/// Cache keys look like `40_1628323785`; the numeric part before the
/// underscore is the unit id. Falls back to the photo id when the key is
/// missing or has no numeric prefix.
pub fn thumbnail_unit_id(photo: &Photo) -> u64 {
    photo
        .cache_key()
        .and_then(|key| key.split('_').next())
        .and_then(|prefix| prefix.parse::<u64>().ok())
        .unwrap_or(photo.id)
}

/// Build the download URL for `photo`'s thumbnail at `size`.
///
/// `base_url` must not end with a slash. Query values are
/// percent-encoded, so distinct inputs always produce distinct URLs.
pub fn thumbnail_url(base_url: &str, photo: &Photo, session: &Session, size: ThumbnailSize) -> String {
    let id = thumbnail_unit_id(photo).to_string();
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "SYNO.Foto.Thumbnail")
        .append_pair("version", "1")
        .append_pair("method", "get")
        .append_pair("mode", "download")
        .append_pair("id", &id)
        .append_pair("type", "unit")
        .append_pair("size", size.token())
        .append_pair("cache_key", photo.cache_key().unwrap_or_default())
        .append_pair("_sid", session.sid())
        .finish();
    format!("{base_url}{THUMBNAIL_PATH}?{query}")
}

/// Derive the small-size URL from a large-size URL by swapping the size token.
pub fn small_from_large(large_url: &str) -> String {
    large_url.replacen(
        &ThumbnailSize::Large.query_fragment(),
        &ThumbnailSize::Small.query_fragment(),
        1,
    )
}
