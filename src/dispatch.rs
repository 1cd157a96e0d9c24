//! One end-to-end run: login, fetch, select, publish, mail.

use crate::config::ThrowbackConfig;
use crate::error::Result;
use crate::links::{display_records, email_anchors, html_escape};
use crate::mail::{Mailer, OutboundEmail};
use crate::period::{CaptureZone, SendPeriod, filter_photos};
use crate::scheduler::ScheduledJob;
use crate::slot::DisplaySlot;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use throwback_photos::PhotosClient;
use tracing::{error, info, warn};

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing matched today; no mail, slot untouched.
    NothingToSend,
    /// Slot updated and mail accepted by the relay.
    Sent {
        /// Photos in the mail.
        photos: usize,
        /// Relay response.
        summary: String,
    },
    /// Slot updated, but the mail could not be sent.
    SendFailed {
        /// Photos that would have been mailed.
        photos: usize,
        /// Transport error text.
        error: String,
    },
}

/// Addressing and selection settings for a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub period: SendPeriod,
    pub zone: CaptureZone,
    pub from: String,
    pub to: String,
    pub subject: String,
    /// Link to the web view appended to every mail.
    pub web_url: String,
}

impl DispatchSettings {
    /// Settings from the service configuration.
    pub fn from_config(config: &ThrowbackConfig) -> Self {
        Self {
            period: config.period,
            zone: config.zone,
            from: config.mail.sender.clone(),
            to: config.mail.recipient.clone(),
            subject: config.mail.subject.clone(),
            web_url: config.web.public_url.clone(),
        }
    }
}

/// Runs the pipeline against one photo server, one mailer and one slot.
pub struct Dispatcher {
    photos: PhotosClient,
    mailer: Arc<dyn Mailer>,
    slot: DisplaySlot,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        photos: PhotosClient,
        mailer: Arc<dyn Mailer>,
        slot: DisplaySlot,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            photos,
            mailer,
            slot,
            settings,
        }
    }

    /// The slot this dispatcher publishes to.
    pub fn slot(&self) -> &DisplaySlot {
        &self.slot
    }

    /// Run once for today's date in the configured zone.
    ///
    /// # Errors
    ///
    /// See [`run_once_at`](Self::run_once_at).
    pub async fn run_once(&self) -> Result<DispatchOutcome> {
        self.run_once_at(self.settings.zone.today()).await
    }

    /// Run once as if today were `today`.
    ///
    /// A fresh session is opened on every call. The slot is replaced before
    /// the mail goes out, so the web view is current even when sending fails.
    ///
    /// # Errors
    ///
    /// Login and catalog failures abort the run. Mail failures do not; they
    /// come back as [`DispatchOutcome::SendFailed`].
    pub async fn run_once_at(&self, today: NaiveDate) -> Result<DispatchOutcome> {
        let session = self.photos.authenticate().await?;
        let catalog = self.photos.fetch_all(&session).await?;
        let total = catalog.len();

        let selected = filter_photos(catalog, today, self.settings.period, &self.settings.zone);
        let base_url = self.photos.base_url();
        let anchors = email_anchors(&selected, base_url, &session, &self.settings.zone);
        let records = display_records(&selected, base_url, &session, &self.settings.zone);

        if anchors.is_empty() {
            info!(%today, period = %self.settings.period, total, "no photos to send");
            return Ok(DispatchOutcome::NothingToSend);
        }

        let count = anchors.len();
        info!(%today, period = %self.settings.period, total, selected = count, "publishing photos");
        self.slot.replace(records);

        let email = OutboundEmail {
            from: self.settings.from.clone(),
            to: self.settings.to.clone(),
            subject: self.settings.subject.clone(),
            html: compose_body(&anchors, &self.settings.web_url),
        };
        match self.mailer.send(&email).await {
            Ok(summary) => {
                info!(photos = count, "mail sent: {summary}");
                Ok(DispatchOutcome::Sent {
                    photos: count,
                    summary,
                })
            }
            Err(e) => {
                error!(photos = count, "mail send failed: {e}");
                Ok(DispatchOutcome::SendFailed {
                    photos: count,
                    error: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for Dispatcher {
    async fn run(&self) {
        if let Err(e) = self.run_once().await {
            warn!("dispatch run aborted: {e}");
        }
    }
}

/// Mail body: one anchor per line, then a link to the web view.
pub fn compose_body(anchors: &[String], web_url: &str) -> String {
    format!(
        "{}<br>\n<a href=\"{}\">View all photos</a>",
        anchors.join("<br>\n"),
        html_escape(web_url)
    )
}
