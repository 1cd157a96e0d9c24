//! Outbound email.
//!
//! [`Mailer`] is the seam the dispatcher sends through; [`SmtpMailer`] is
//! the production implementation, built once at startup and reused for
//! every run.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use tracing::debug;

/// Errors raised while building or sending a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// A sender or recipient address does not parse.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// The SMTP exchange failed.
    #[error("SMTP error: {0}")]
    Transport(String),
}

/// A fully addressed HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Mail transport contract.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message, returning a short transport summary.
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError>;
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte (port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
}

/// SMTP relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpRelay {
    pub host: String,
    pub security: SmtpSecurity,
}

impl SmtpRelay {
    /// Resolve a well-known mail service name (`gmail`, `outlook`, ...) to
    /// its relay. Anything else is taken as an SMTP hostname using STARTTLS.
    pub fn for_service(service: &str) -> Self {
        let service = service.trim();
        let (host, security) = match service.to_ascii_lowercase().as_str() {
            "gmail" | "googlemail" => ("smtp.gmail.com", SmtpSecurity::Implicit),
            "outlook" | "outlook.com" | "hotmail" | "live" => {
                ("smtp-mail.outlook.com", SmtpSecurity::StartTls)
            }
            "office365" => ("smtp.office365.com", SmtpSecurity::StartTls),
            "yahoo" => ("smtp.mail.yahoo.com", SmtpSecurity::Implicit),
            "icloud" => ("smtp.mail.me.com", SmtpSecurity::StartTls),
            "zoho" => ("smtp.zoho.com", SmtpSecurity::Implicit),
            "fastmail" => ("smtp.fastmail.com", SmtpSecurity::Implicit),
            _ => (service, SmtpSecurity::StartTls),
        };
        Self {
            host: host.to_owned(),
            security,
        }
    }
}

impl fmt::Display for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.security {
            SmtpSecurity::Implicit => write!(f, "smtps://{}", self.host),
            SmtpSecurity::StartTls => write!(f, "smtp://{} (STARTTLS)", self.host),
        }
    }
}

/// Assemble a lettre [`Message`] with an HTML body.
///
/// # Errors
///
/// Returns [`MailError::InvalidAddress`] when `from` or `to` does not parse.
pub fn build_message(email: &OutboundEmail) -> Result<Message, MailError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| MailError::InvalidAddress(format!("from '{}': {e}", email.from)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| MailError::InvalidAddress(format!("to '{}': {e}", email.to)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// SMTP mailer with authenticated relay.
pub struct SmtpMailer {
    relay: SmtpRelay,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Transport`] if the TLS parameters for `relay`
    /// cannot be constructed.
    pub fn new(
        relay: SmtpRelay,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, MailError> {
        let builder = match relay.security {
            SmtpSecurity::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&relay.host),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&relay.host)
            }
        }
        .map_err(|e| MailError::Transport(format!("cannot configure relay {relay}: {e}")))?;

        let transport = builder
            .credentials(Credentials::new(username.into(), password.into()))
            .build();
        Ok(Self { relay, transport })
    }

    /// The relay this mailer sends through.
    pub fn relay(&self) -> &SmtpRelay {
        &self.relay
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        let message = build_message(email)?;
        debug!("sending mail via {}", self.relay);
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let text = response.message().collect::<Vec<_>>().join(" ");
        Ok(format!("{} {text}", response.code()))
    }
}
