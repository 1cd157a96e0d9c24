//! Service configuration, read from the environment.
//!
//! [`ThrowbackConfig::from_env`] reads process variables (after the binary
//! has loaded any `.env` file). Everything goes through
//! [`ThrowbackConfig::from_lookup`], which tests drive with a map.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `NAS_IP` | unless `PHOTOS_BASE_URL` | |
//! | `PHOTOS_BASE_URL` | No | `https://{NAS_IP}` |
//! | `USER_ID`, `USER_PASSWORD` | Yes | |
//! | `SEND_BY` | Yes | `day`, `week` or `month` |
//! | `SERVICE_NAME`, `SEND_EMAIL`, `SEND_EMAIL_PASSWORD` | Yes | |
//! | `RECEIVE_EMAIL`, `EMAIL_SUBJECT` | Yes | |
//! | `PORT` | No | `3000` |
//! | `WEB_HOST` | No | `0.0.0.0` |
//! | `WEB_PUBLIC_URL` | No | `http://localhost:{PORT}/` |
//! | `SEND_HOUR` | No | `8` |
//! | `CAPTURE_UTC_OFFSET` | No | host local time |
//! | `PHOTOS_TLS` | No | `verify` (`trust-cert`, `insecure`) |
//! | `PHOTOS_CA_CERT` | with `trust-cert` | |
//! | `PHOTOS_TIMEOUT_SECS` | No | `30` |
//! | `RUN_ON_START` | No | `false` |

use crate::error::{Result, ThrowbackError};
use crate::mail::SmtpRelay;
use crate::period::{CaptureZone, SendPeriod};
use chrono::{FixedOffset, Offset, Utc};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use throwback_photos::config::DEFAULT_TIMEOUT_SECONDS;
use throwback_photos::{PhotosConfig, TlsPolicy};
use tracing::warn;

/// Hour of day at which scheduled runs fire unless `SEND_HOUR` says otherwise.
pub const DEFAULT_SEND_HOUR: u8 = 8;

/// Web presenter port unless `PORT` says otherwise.
pub const DEFAULT_WEB_PORT: u16 = 3000;

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct ThrowbackConfig {
    /// Photo server connection.
    pub photos: PhotosConfig,
    /// Look-back granularity; also decides the schedule.
    pub period: SendPeriod,
    /// Calendar for capture dates and "today".
    pub zone: CaptureZone,
    /// Outbound email settings.
    pub mail: MailConfig,
    /// Web presenter settings.
    pub web: WebConfig,
    /// Scheduling settings.
    pub schedule: ScheduleConfig,
}

/// Outbound email settings.
#[derive(Clone)]
pub struct MailConfig {
    /// Mail service name or SMTP host.
    pub service: String,
    /// Sender address, also the SMTP username.
    pub sender: String,
    /// SMTP credential.
    pub password: String,
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
}

impl MailConfig {
    /// SMTP relay for the configured service.
    pub fn relay(&self) -> SmtpRelay {
        SmtpRelay::for_service(&self.service)
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("service", &self.service)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .finish()
    }
}

/// Web presenter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Bind address.
    pub host: String,
    /// Listen port (`0` picks a free port).
    pub port: u16,
    /// Address of the web view as seen from a mail client.
    pub public_url: String,
}

/// Scheduling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Hour of day (0-23) at which runs fire.
    pub send_hour: u8,
    /// Run once immediately at startup as well.
    pub run_on_start: bool,
}

impl ThrowbackConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ThrowbackError::Config`] for a missing required variable or
    /// an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            var(key).ok_or_else(|| ThrowbackError::Config(format!("{key} is not set")))
        };

        let period: SendPeriod = required("SEND_BY")?.parse()?;

        let base_url = match var("PHOTOS_BASE_URL") {
            Some(url) => url,
            None => format!("https://{}", required("NAS_IP")?),
        };
        let tls = TlsPolicy::from_mode(
            var("PHOTOS_TLS").as_deref().unwrap_or("verify"),
            var("PHOTOS_CA_CERT").map(PathBuf::from),
        )
        .map_err(|e| ThrowbackError::Config(format!("PHOTOS_TLS: {e}")))?;
        let timeout = parse_or(var("PHOTOS_TIMEOUT_SECS"), "PHOTOS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECONDS)?;

        let photos = PhotosConfig::new(base_url, required("USER_ID")?, required("USER_PASSWORD")?)
            .with_tls(tls)
            .with_timeout_seconds(timeout);
        photos
            .validate()
            .map_err(|e| ThrowbackError::Config(e.to_string()))?;

        let zone = match var("CAPTURE_UTC_OFFSET") {
            Some(raw) => CaptureZone::Fixed(parse_utc_offset(&raw)?),
            None => CaptureZone::Local,
        };

        let mail = MailConfig {
            service: required("SERVICE_NAME")?,
            sender: required("SEND_EMAIL")?,
            password: required("SEND_EMAIL_PASSWORD")?,
            recipient: required("RECEIVE_EMAIL")?,
            subject: required("EMAIL_SUBJECT")?,
        };

        let port = parse_or(var("PORT"), "PORT", DEFAULT_WEB_PORT)?;
        let web = WebConfig {
            host: var("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            public_url: var("WEB_PUBLIC_URL").unwrap_or_else(|| default_public_url(port)),
        };

        let send_hour = parse_or(var("SEND_HOUR"), "SEND_HOUR", DEFAULT_SEND_HOUR)?;
        if send_hour > 23 {
            return Err(ThrowbackError::Config(format!(
                "SEND_HOUR must be between 0 and 23, got {send_hour}"
            )));
        }
        let run_on_start = match var("RUN_ON_START") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ThrowbackError::Config(format!("RUN_ON_START: invalid flag '{raw}'")))?,
            None => false,
        };

        Ok(Self {
            photos,
            period,
            zone,
            mail,
            web,
            schedule: ScheduleConfig {
                send_hour,
                run_on_start,
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|e| ThrowbackError::Config(format!("{key}: invalid value '{raw}': {e}"))),
        None => Ok(default),
    }
}

fn default_public_url(port: u16) -> String {
    let url = format!("http://localhost:{port}/");
    warn!(
        "WEB_PUBLIC_URL is not set; mailed links to the web view point at {url} \
         and only work on this host"
    );
    url
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `+09:00`, `-05:30`, `Z` or `UTC`.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    raw.parse::<FixedOffset>()
        .map_err(|e| ThrowbackError::Config(format!("CAPTURE_UTC_OFFSET: invalid offset '{raw}': {e}")))
}
