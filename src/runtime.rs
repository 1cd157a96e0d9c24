//! Service wiring: one photo client, one mailer, one slot, a scheduler and
//! the web view, all sharing the same tokio runtime.

use crate::config::ThrowbackConfig;
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::error::{Result, ThrowbackError};
use crate::mail::{Mailer, SmtpMailer};
use crate::scheduler::{Recurrence, Scheduler};
use crate::slot::DisplaySlot;
use crate::web::WebServer;
use std::net::SocketAddr;
use std::sync::Arc;
use throwback_photos::PhotosClient;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Build the dispatcher with the production SMTP mailer.
///
/// # Errors
///
/// Invalid photo server settings or an unusable mail relay.
pub fn build_dispatcher(config: &ThrowbackConfig, slot: DisplaySlot) -> Result<Dispatcher> {
    let photos = PhotosClient::new(config.photos.clone())?;
    let mailer = SmtpMailer::new(
        config.mail.relay(),
        config.mail.sender.clone(),
        config.mail.password.clone(),
    )
    .map_err(|e| ThrowbackError::Mail(e.to_string()))?;
    info!("mail relay: {}", mailer.relay());
    Ok(Dispatcher::new(
        photos,
        Arc::new(mailer) as Arc<dyn Mailer>,
        slot,
        DispatchSettings::from_config(config),
    ))
}

/// A running service.
pub struct Service {
    web: WebServer,
    scheduler: JoinHandle<()>,
    recurrence: Recurrence,
}

impl Service {
    /// Start the web view and the scheduler around `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns [`ThrowbackError::Web`] if the web listener cannot bind.
    pub async fn start(config: &ThrowbackConfig, dispatcher: Dispatcher) -> Result<Self> {
        let web = WebServer::start(dispatcher.slot().clone(), &config.web.host, config.web.port).await?;

        let recurrence = Recurrence::for_period(config.period, config.schedule.send_hour);
        let scheduler = Scheduler::new(recurrence, config.zone)
            .with_run_on_start(config.schedule.run_on_start)
            .run(Arc::new(dispatcher));

        Ok(Self {
            web,
            scheduler,
            recurrence,
        })
    }

    /// Address the web view is bound to.
    pub fn web_addr(&self) -> SocketAddr {
        self.web.addr()
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// Stop the scheduler and the web view. Runs already in flight are
    /// dropped with the runtime.
    pub fn shutdown(self) {
        self.scheduler.abort();
        self.web.shutdown();
        info!("service stopped");
    }
}

/// Run until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Startup failures only; run failures are logged by the dispatcher.
pub async fn run(config: ThrowbackConfig) -> Result<()> {
    let dispatcher = build_dispatcher(&config, DisplaySlot::new())?;
    let service = Service::start(&config, dispatcher).await?;
    info!(
        "throwback running: {} mode, {}; web view on http://{}/",
        config.period,
        service.recurrence(),
        service.web_addr()
    );

    shutdown_signal().await;
    service.shutdown();
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
