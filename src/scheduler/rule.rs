//! Recurrence rules derived from the send period.

use crate::period::SendPeriod;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

/// Upper bound on how far ahead [`Recurrence::next_after`] looks.
const MAX_SEARCH_DAYS: u32 = 366;

/// When dispatcher runs fire. Times are wall-clock in the schedule's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every day.
    Daily {
        /// Hour of day (0-23).
        hour: u8,
    },
    /// Every Monday.
    Weekly {
        /// Hour of day (0-23).
        hour: u8,
    },
    /// The first day of every month.
    Monthly {
        /// Hour of day (0-23).
        hour: u8,
    },
}

impl Recurrence {
    /// The fixed rule for a send period.
    pub fn for_period(period: SendPeriod, hour: u8) -> Self {
        match period {
            SendPeriod::Day => Self::Daily { hour },
            SendPeriod::Week => Self::Weekly { hour },
            SendPeriod::Month => Self::Monthly { hour },
        }
    }

    pub fn hour(self) -> u8 {
        match self {
            Self::Daily { hour } | Self::Weekly { hour } | Self::Monthly { hour } => hour,
        }
    }

    /// The equivalent five-field cron expression.
    pub fn cron_expression(self) -> String {
        match self {
            Self::Daily { hour } => format!("0 {hour} * * *"),
            Self::Weekly { hour } => format!("0 {hour} * * 1"),
            Self::Monthly { hour } => format!("0 {hour} 1 * *"),
        }
    }

    /// Returns `true` if the rule fires at some point on `date`.
    pub fn fires_on(self, date: NaiveDate) -> bool {
        match self {
            Self::Daily { .. } => true,
            Self::Weekly { .. } => date.weekday() == Weekday::Mon,
            Self::Monthly { .. } => date.day() == 1,
        }
    }

    /// First firing strictly after `after`, in `after`'s time zone.
    ///
    /// A firing that falls into a DST gap moves to the first valid local
    /// time after it; an ambiguous one takes the earlier instant. Returns
    /// `None` for an hour outside 0-23.
    pub fn next_after<Tz: TimeZone>(self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let at = NaiveTime::from_hms_opt(u32::from(self.hour()), 0, 0)?;
        let mut date = after.date_naive();
        for _ in 0..MAX_SEARCH_DAYS {
            if self.fires_on(date) {
                if let Some(candidate) = resolve_local(&tz, date.and_time(at)) {
                    if candidate > *after {
                        return Some(candidate);
                    }
                }
            }
            date = date.succ_opt()?;
        }
        None
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { hour } => write!(f, "daily at {hour:02}:00"),
            Self::Weekly { hour } => write!(f, "Mondays at {hour:02}:00"),
            Self::Monthly { hour } => write!(f, "monthly on the 1st at {hour:02}:00"),
        }
    }
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut candidate = naive;
    // Gaps are at most a few hours; walk forward in 15 minute steps.
    for _ in 0..(4 * 24) {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Some(dt);
        }
        candidate += Duration::minutes(15);
    }
    None
}
