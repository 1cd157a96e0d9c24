//! Photo server connection settings.
//!
//! [`PhotosConfig`] carries the server address, credentials, request
//! timeout, page size and the certificate-validation policy used for every
//! call the client makes.

use crate::error::PhotosError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Number of catalog items requested per listing call.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// How the client validates the photo server's TLS certificate.
///
/// Chosen once when the HTTP client is built. NAS boxes commonly serve a
/// self-signed certificate; prefer [`TlsPolicy::TrustCertificate`] over
/// [`TlsPolicy::Insecure`] for those.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Validate against the platform/webpki roots.
    #[default]
    Verify,
    /// Additionally trust the PEM certificate at this path.
    TrustCertificate(PathBuf),
    /// Accept any certificate. Only for NAS-only deployments on a trusted LAN.
    Insecure,
}

impl TlsPolicy {
    /// Build a policy from a mode name (`verify`, `trust-cert`, `insecure`)
    /// and an optional certificate path.
    ///
    /// # Errors
    ///
    /// Returns [`PhotosError::Config`] for an unknown mode, or for
    /// `trust-cert` without a certificate path.
    pub fn from_mode(mode: &str, ca_cert: Option<PathBuf>) -> Result<Self, PhotosError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "" | "verify" => Ok(Self::Verify),
            "trust-cert" | "trust_cert" => ca_cert.map(Self::TrustCertificate).ok_or_else(|| {
                PhotosError::Config("TLS mode trust-cert requires a certificate path".into())
            }),
            "insecure" => Ok(Self::Insecure),
            other => Err(PhotosError::Config(format!(
                "unknown TLS mode '{other}' (expected verify, trust-cert or insecure)"
            ))),
        }
    }
}

impl fmt::Display for TlsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verify => write!(f, "verify"),
            Self::TrustCertificate(path) => write!(f, "trust-cert ({})", path.display()),
            Self::Insecure => write!(f, "insecure"),
        }
    }
}

impl FromStr for TlsPolicy {
    type Err = PhotosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mode(s, None)
    }
}

/// Connection settings for a photo server.
#[derive(Clone)]
pub struct PhotosConfig {
    /// Scheme + host (+ optional port/path prefix), e.g. `https://192.168.1.20`.
    pub base_url: String,
    /// Login account.
    pub account: String,
    /// Login password.
    pub password: String,
    /// Certificate validation policy.
    pub tls: TlsPolicy,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Items requested per catalog page.
    pub page_size: usize,
}

impl PhotosConfig {
    /// Create a config with default TLS policy, timeout and page size.
    pub fn new(
        base_url: impl Into<String>,
        account: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            account: account.into(),
            password: password.into(),
            tls: TlsPolicy::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the TLS policy.
    pub fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Set the request timeout in seconds.
    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// Set the catalog page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `base_url` parses as an absolute `http`/`https` URL
    /// - `timeout_seconds` and `page_size` are greater than 0
    pub fn validate(&self) -> Result<(), PhotosError> {
        let url = url::Url::parse(self.normalized_base_url())
            .map_err(|e| PhotosError::Config(format!("invalid base URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PhotosError::Config(format!(
                "base URL scheme must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(PhotosError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(PhotosError::Config("page_size must be greater than 0".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for PhotosConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotosConfig")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("page_size", &self.page_size)
            .finish()
    }
}
