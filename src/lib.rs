//! Throwback: "on this day" photo mail from a Synology Photos library.
//!
//! On a fixed schedule the service logs into the photo server, lists the
//! whole catalog, keeps the photos taken on today's day, week or month in a
//! past year, mails links to them and publishes the same selection on a
//! small web page.
//!
//! # Architecture
//!
//! - **Photos client** (`throwback-photos`): login, paginated listing,
//!   thumbnail links
//! - **Period filter**: past-year day/week/month selection
//! - **Links**: email anchors and display records
//! - **Slot**: the latest selection, shared with the web view
//! - **Dispatcher**: one end-to-end run
//! - **Scheduler**: fires the dispatcher on a rule derived from the period
//! - **Web**: `GET /`, `GET /photos.json`, `GET /health`

pub mod config;
pub mod dispatch;
pub mod error;
pub mod links;
pub mod mail;
pub mod period;
pub mod runtime;
pub mod scheduler;
pub mod slot;
pub mod web;

pub use config::ThrowbackConfig;
pub use dispatch::{DispatchOutcome, DispatchSettings, Dispatcher};
pub use error::{Result, ThrowbackError};
pub use links::DisplayRecord;
pub use mail::{MailError, Mailer, OutboundEmail, SmtpMailer};
pub use period::{CaptureZone, SendPeriod};
pub use scheduler::{Recurrence, Scheduler};
pub use slot::DisplaySlot;
pub use web::WebServer;
