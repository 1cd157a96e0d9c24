//! Scheduler background loop.
//!
//! Sleeps until the next firing of a [`Recurrence`], spawns the job and
//! goes back to sleep. Jobs are not awaited, so a slow run can overlap the
//! next one.

use crate::period::CaptureZone;
use crate::scheduler::rule::Recurrence;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Work executed on every firing.
#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    /// Run once. Failures are the job's to log.
    async fn run(&self);
}

/// Source of the current wall-clock time.
pub type WallClock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Background scheduler driving one job.
pub struct Scheduler {
    recurrence: Recurrence,
    zone: CaptureZone,
    run_on_start: bool,
    clock: WallClock,
}

impl Scheduler {
    /// Fire `recurrence` in `zone`'s wall-clock time.
    pub fn new(recurrence: Recurrence, zone: CaptureZone) -> Self {
        Self {
            recurrence,
            zone,
            run_on_start: false,
            clock: Arc::new(move || zone.now()),
        }
    }

    /// Also run once as soon as the loop starts.
    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: WallClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// First firing strictly after `from`, evaluated in the schedule's zone.
    pub fn next_firing(&self, from: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        match self.zone {
            CaptureZone::Local => self
                .recurrence
                .next_after(&from.with_timezone(&Local))
                .map(|dt| dt.fixed_offset()),
            CaptureZone::Fixed(offset) => self.recurrence.next_after(&from.with_timezone(&offset)),
        }
    }

    /// Start the scheduler background loop.
    pub fn run(self, job: Arc<dyn ScheduledJob>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "scheduler started: {} (cron `{}`)",
                self.recurrence,
                self.recurrence.cron_expression()
            );
            if self.run_on_start {
                info!("running once at startup");
                spawn_job(&job);
            }

            let mut last: Option<DateTime<FixedOffset>> = None;
            loop {
                let now = (self.clock)();
                // An early wake-up must not fire the same slot twice.
                let from = match last {
                    Some(last) if last > now => last,
                    _ => now,
                };
                let Some(next) = self.next_firing(from) else {
                    error!("no upcoming firing for {}; scheduler stopped", self.recurrence);
                    return;
                };
                let wait = (next - now).to_std().unwrap_or_default();
                debug!("next run at {next} (in {}s)", wait.as_secs());

                tokio::time::sleep(wait).await;
                last = Some(next);
                info!("scheduled run firing for {next}");
                spawn_job(&job);
            }
        })
    }
}

fn spawn_job(job: &Arc<dyn ScheduledJob>) {
    let job = Arc::clone(job);
    tokio::spawn(async move { job.run().await });
}
