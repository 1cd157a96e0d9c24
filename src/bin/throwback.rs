//! Throwback service binary.

use throwback::runtime::{build_dispatcher, run};
use throwback::scheduler::Recurrence;
use throwback::{DispatchOutcome, DisplaySlot, ThrowbackConfig, ThrowbackError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("throwback=info,throwback_photos=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map_or("serve", String::as_str);
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    if let Ok(path) = dotenv::dotenv() {
        info!("loaded environment from {}", path.display());
    }
    let config = ThrowbackConfig::from_env()?;

    match command {
        "serve" => Ok(run(config).await?),
        "once" => once(config).await,
        "check" => {
            check(&config);
            Ok(())
        }
        other => Err(ThrowbackError::Config(format!(
            "unknown subcommand `{other}` (use serve|once|check)"
        ))
        .into()),
    }
}

async fn once(config: ThrowbackConfig) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(&config, DisplaySlot::new())?;
    match dispatcher.run_once().await? {
        DispatchOutcome::NothingToSend => println!("no photos to send"),
        DispatchOutcome::Sent { photos, summary } => {
            println!("sent {photos} photo link(s): {summary}");
        }
        DispatchOutcome::SendFailed { photos, error } => {
            anyhow::bail!("selected {photos} photo(s) but sending failed: {error}");
        }
    }
    Ok(())
}

fn check(config: &ThrowbackConfig) {
    let recurrence = Recurrence::for_period(config.period, config.schedule.send_hour);
    println!("photo server:  {}", config.photos.normalized_base_url());
    println!("tls:           {}", config.photos.tls);
    println!("period:        {}", config.period);
    println!("schedule:      {recurrence} (cron `{}`)", recurrence.cron_expression());
    println!("mail relay:    {}", config.mail.relay());
    println!("recipient:     {}", config.mail.recipient);
    println!("web view:      {}:{} ({})", config.web.host, config.web.port, config.web.public_url);
}

fn print_usage() {
    println!("usage: throwback [serve|once|check]");
    println!();
    println!("  serve  run the scheduler and web view (default)");
    println!("  once   run the dispatcher once now and exit");
    println!("  check  validate the configuration and print the schedule");
}
