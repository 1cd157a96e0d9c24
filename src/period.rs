//! "On this day in a past year" selection.
//!
//! A photo is selected when its capture date lies in a strictly earlier
//! year than today and falls in the same day, week or month as today,
//! depending on the configured [`SendPeriod`].

use crate::error::ThrowbackError;
use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use throwback_photos::Photo;

/// Look-back granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPeriod {
    /// Same month and day-of-month.
    Day,
    /// Same [`week_number`].
    Week,
    /// Same month.
    Month,
}

impl SendPeriod {
    /// Returns `true` if a photo taken on `taken` belongs in today's selection.
    pub fn matches(self, taken: NaiveDate, today: NaiveDate) -> bool {
        if taken.year() >= today.year() {
            return false;
        }
        match self {
            Self::Day => taken.month() == today.month() && taken.day() == today.day(),
            Self::Week => week_number(taken) == week_number(today),
            Self::Month => taken.month() == today.month(),
        }
    }
}

impl fmt::Display for SendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl FromStr for SendPeriod {
    type Err = ThrowbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(ThrowbackError::Config(format!(
                "invalid send period '{}' (expected day, week or month)",
                s.trim()
            ))),
        }
    }
}

/// Week of the year as counted by the schedule.
///
/// `ceil((days_since_jan1 + 1 + weekday_of_jan1 + 1) / 7)` with the weekday
/// of January 1st counted from Sunday = 0. Not an ISO week: a year whose
/// January 1st is a Saturday starts in week 2, and December 31st can land
/// in week 54.
pub fn week_number(date: NaiveDate) -> u32 {
    let days_since_jan1 = date.ordinal0();
    let jan1_weekday = date
        .with_ordinal0(0)
        .map_or(0, |jan1| jan1.weekday().num_days_from_sunday());
    (days_since_jan1 + 1 + jan1_weekday + 1).div_ceil(7)
}

/// Calendar used to turn capture timestamps (and "now") into dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureZone {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl CaptureZone {
    /// UTC.
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Capture date-time for an epoch-seconds timestamp, or `None` when out of range.
    pub fn datetime(&self, epoch_secs: i64) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Local => Local
                .timestamp_opt(epoch_secs, 0)
                .single()
                .map(|dt| dt.fixed_offset()),
            Self::Fixed(offset) => offset.timestamp_opt(epoch_secs, 0).single(),
        }
    }

    /// Capture date for an epoch-seconds timestamp.
    pub fn date(&self, epoch_secs: i64) -> Option<NaiveDate> {
        self.datetime(epoch_secs).map(|dt| dt.date_naive())
    }

    /// Current date-time in this zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Local => Local::now().fixed_offset(),
            Self::Fixed(offset) => Utc::now().with_timezone(offset),
        }
    }

    /// Today's date in this zone.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Keep the photos taken in today's day/week/month of a past year.
///
/// Input order is preserved; duplicates pass through untouched. Photos
/// whose timestamp cannot be represented as a date are dropped.
pub fn filter_photos(
    photos: Vec<Photo>,
    today: NaiveDate,
    period: SendPeriod,
    zone: &CaptureZone,
) -> Vec<Photo> {
    photos
        .into_iter()
        .filter(|photo| {
            zone.date(photo.time)
                .is_some_and(|taken| period.matches(taken, today))
        })
        .collect()
}
