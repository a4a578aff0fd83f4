//! Category vocabularies for the rental dataset.
//! Maps raw integer codes and timestamps to the labels shown in the dashboard.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use std::fmt;

/// Month labels, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Working-day flag labels, indexed by the flag value.
pub const WORKING_DAY_LABELS: [&str; 2] = ["Non-working", "Working"];

/// Timestamp layouts accepted in the `datetime` column.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Meteorological season as coded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn code(self) -> i64 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse part of the day an hour falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    /// Buckets are left-closed: [0,6) [6,12) [12,18) [18,24).
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0..=5 => Some(DayPeriod::Night),
            6..=11 => Some(DayPeriod::Morning),
            12..=17 => Some(DayPeriod::Afternoon),
            18..=23 => Some(DayPeriod::Evening),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPeriod::Night => "night",
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
        }
    }
}

pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn working_day_label(flag: i64) -> Option<&'static str> {
    usize::try_from(flag)
        .ok()
        .and_then(|idx| WORKING_DAY_LABELS.get(idx))
        .copied()
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Calendar attributes derived from one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarParts {
    pub year: i32,
    pub month: &'static str,
    pub day_of_week: &'static str,
    pub hour: i32,
    pub day_period: &'static str,
}

impl CalendarParts {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        let hour = ts.hour();
        Self {
            year: ts.year(),
            // chrono guarantees 1..=12 and 0..=23
            month: month_name(ts.month()).unwrap_or_default(),
            day_of_week: weekday_name(ts.weekday()),
            hour: hour as i32,
            day_period: DayPeriod::from_hour(hour)
                .map(DayPeriod::label)
                .unwrap_or_default(),
        }
    }
}
