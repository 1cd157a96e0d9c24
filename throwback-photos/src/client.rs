//! Photo server client: login and paginated catalog listing.

use crate::config::PhotosConfig;
use crate::error::{PhotosError, Result};
use crate::http::build_client;
use crate::types::{ApiError, AuthEnvelope, Photo, Session};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Login endpoint, relative to the base URL.
pub const AUTH_PATH: &str = "/photo/webapi/auth.cgi";

/// Catalog listing endpoint, relative to the base URL.
pub const BROWSE_PATH: &str = "/photo/webapi/entry.cgi";

/// Metadata requested for every catalog item.
const ADDITIONAL_FIELDS: &str = r#"["thumbnail","resolution"]"#;

/// Client for one photo server.
///
/// Holds a single [`reqwest::Client`] built from the configured TLS policy.
/// Sessions are not stored: every caller authenticates for itself.
pub struct PhotosClient {
    config: PhotosConfig,
    http: reqwest::Client,
}

impl PhotosClient {
    /// Create a client, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PhotosError::Config`] for invalid settings or an unreadable
    /// trusted certificate.
    pub fn new(config: PhotosConfig) -> Result<Self> {
        config.validate()?;
        let http = build_client(&config)?;
        Ok(Self { config, http })
    }

    /// The base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.normalized_base_url()
    }

    /// Exchange the configured credentials for a session.
    ///
    /// # Errors
    ///
    /// Network failure, a non-2xx status, an unparsable body, or a response
    /// without a session id all fail; there is no retry.
    pub async fn authenticate(&self) -> Result<Session> {
        let url = format!("{}{AUTH_PATH}", self.base_url());
        debug!("authenticating as {}", self.config.account);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api", "SYNO.API.Auth"),
                ("version", "3"),
                ("method", "login"),
                ("account", self.config.account.as_str()),
                ("passwd", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PhotosError::Http(format!("login request failed: {}", e.without_url())))?;

        let bytes = read_success_body(response, "auth").await?;
        let envelope: AuthEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| PhotosError::Parse(format!("login response: {e}")))?;

        match envelope.data.and_then(|d| d.sid).filter(|sid| !sid.is_empty()) {
            Some(sid) => Ok(Session::new(sid)),
            None => match envelope.error {
                Some(err) => Err(PhotosError::Auth(format!(
                    "login rejected (code {})",
                    err.code
                ))),
                None => Err(PhotosError::Auth(
                    "login response has no session id".into(),
                )),
            },
        }
    }

    /// Fetch one catalog page starting at `offset`.
    ///
    /// Returns `None` at the end of the catalog: an empty list, or a
    /// response without `data.list`. Items that do not decode as a photo
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Network failure, a non-2xx status, or a body that is not JSON.
    pub async fn fetch_page(&self, session: &Session, offset: usize) -> Result<Option<Vec<Photo>>> {
        let url = format!("{}{BROWSE_PATH}", self.base_url());
        let offset_param = offset.to_string();
        let limit_param = self.config.page_size.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api", "SYNO.Foto.Browse.Item"),
                ("version", "1"),
                ("method", "list"),
                ("type", "photo"),
                ("offset", offset_param.as_str()),
                ("limit", limit_param.as_str()),
                ("_sid", session.sid()),
                ("additional", ADDITIONAL_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| PhotosError::Http(format!("browse request failed: {}", e.without_url())))?;

        let bytes = read_success_body(response, "browse").await?;
        let mut body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| PhotosError::Parse(format!("browse response: {e}")))?;

        let Some(Value::Array(items)) = body.pointer_mut("/data/list").map(Value::take) else {
            match body.get("error").cloned().map(serde_json::from_value::<ApiError>) {
                Some(Ok(ApiError { code })) => warn!(
                    offset,
                    code, "browse request rejected by the photo server, treating as end of catalog"
                ),
                _ => debug!(offset, "browse response has no data.list, treating as end of catalog"),
            }
            return Ok(None);
        };
        if items.is_empty() {
            return Ok(None);
        }

        let mut photos = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Photo>(item) {
                Ok(photo) => photos.push(photo),
                Err(e) => warn!(offset, "skipping undecodable catalog item: {e}"),
            }
        }
        Ok(Some(photos))
    }

    /// Fetch the whole catalog, page by page, until an empty page.
    ///
    /// Pages are concatenated in request order.
    ///
    /// # Errors
    ///
    /// Any page failure aborts the whole fetch.
    pub async fn fetch_all(&self, session: &Session) -> Result<Vec<Photo>> {
        let mut photos = Vec::new();
        let mut offset = 0;
        loop {
            let Some(page) = self.fetch_page(session, offset).await? else {
                break;
            };
            debug!(offset, count = page.len(), "fetched catalog page");
            photos.extend(page);
            offset += self.config.page_size;
        }
        info!(count = photos.len(), "fetched photo catalog");
        Ok(photos)
    }
}

async fn read_success_body(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<bytes::Bytes> {
    let status = response.status();
    if !status.is_success() {
        return Err(PhotosError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }
    response
        .bytes()
        .await
        .map_err(|e| PhotosError::Http(format!("{endpoint} body read failed: {e}")))
}
