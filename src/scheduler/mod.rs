//! Timed dispatcher runs.
//!
//! The send period maps to one fixed [`Recurrence`]; the [`Scheduler`]
//! fires a [`ScheduledJob`] on every occurrence.

pub mod rule;
pub mod runner;

pub use rule::Recurrence;
pub use runner::{ScheduledJob, Scheduler, WallClock};
