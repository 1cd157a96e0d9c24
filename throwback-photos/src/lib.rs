//! # throwback-photos
//!
//! Minimal client for a Synology Photos server, covering exactly what
//! Throwback needs:
//!
//! - Log in and obtain a session id ([`PhotosClient::authenticate`])
//! - List the whole photo catalog page by page ([`PhotosClient::fetch_all`])
//! - Build authenticated thumbnail download links ([`thumbnail::thumbnail_url`])
//!
//! ## Security
//!
//! - Certificate validation is an explicit [`TlsPolicy`] fixed when the
//!   client is built; there is no global toggle.
//! - Passwords and session ids never appear in logs, errors or `Debug` output.
//!   Thumbnail URLs do carry the session id, by necessity.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod thumbnail;
pub mod types;

pub use client::PhotosClient;
pub use config::{PhotosConfig, TlsPolicy};
pub use error::{PhotosError, Result};
pub use thumbnail::ThumbnailSize;
pub use types::{Photo, Resolution, Session};
