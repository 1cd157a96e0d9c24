//! Shared HTTP client for photo server requests.
//!
//! Certificate validation is decided here, once, from
//! [`PhotosConfig::tls`]. Nothing else in the crate touches TLS settings.

use crate::config::{PhotosConfig, TlsPolicy};
use crate::error::PhotosError;
use std::time::Duration;
use tracing::warn;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("throwback/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for the photo server.
///
/// The client has:
/// - Timeout from config
/// - A fixed User-Agent
/// - Certificate validation according to [`TlsPolicy`]
///
/// # Errors
///
/// Returns [`PhotosError::Config`] if a trusted certificate cannot be read
/// or parsed, and [`PhotosError::Http`] if the client cannot be constructed.
pub fn build_client(config: &PhotosConfig) -> Result<reqwest::Client, PhotosError> {
    let builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(USER_AGENT);

    let builder = match &config.tls {
        TlsPolicy::Verify => builder,
        TlsPolicy::TrustCertificate(path) => {
            let pem = std::fs::read(path).map_err(|e| {
                PhotosError::Config(format!(
                    "cannot read trusted certificate {}: {e}",
                    path.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                PhotosError::Config(format!(
                    "invalid trusted certificate {}: {e}",
                    path.display()
                ))
            })?;
            builder.add_root_certificate(cert)
        }
        TlsPolicy::Insecure => {
            warn!("photo server certificate validation is disabled");
            builder.danger_accept_invalid_certs(true)
        }
    };

    builder
        .build()
        .map_err(|e| PhotosError::Http(format!("failed to build HTTP client: {e}")))
}
