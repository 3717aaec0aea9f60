//! Daylight-saving transition rules.
//!
//! A rule names the local wall-clock moment at which the offset changes,
//! e.g. "last Sunday of March at 02:00". Only the date arithmetic needed to
//! check that a start/end pair is consistent lives here; converting clock
//! readings is left to the time collaborator on the device.

use std::fmt;
use std::str::FromStr;

use time::{Date, Duration, Month, PrimitiveDateTime, Time, Weekday};

use crate::domain::error::ConfigIssue;

/// Largest UTC offset accepted anywhere in the manifest, in seconds.
pub const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// Years checked when comparing a start and an end rule. 2000..2028 covers
/// every weekday/leap-year combination of the 1901..=2099 calendar.
const CHECK_YEARS: std::ops::Range<i32> = 2000..2028;

/// Which occurrence of the weekday within the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekOrdinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOrdinal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Last => "last",
        }
    }

    /// Resolve to a calendar date. `None` only for years `time` cannot represent.
    pub fn resolve(&self, year: i32, month: Month, weekday: Weekday) -> Option<Date> {
        match self {
            Self::First => nth_weekday(year, month, weekday, 1),
            Self::Second => nth_weekday(year, month, weekday, 2),
            Self::Third => nth_weekday(year, month, weekday, 3),
            Self::Fourth => nth_weekday(year, month, weekday, 4),
            Self::Last => last_weekday(year, month, weekday),
        }
    }
}

impl FromStr for WeekOrdinal {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "third" => Ok(Self::Third),
            "fourth" => Ok(Self::Fourth),
            "last" => Ok(Self::Last),
            _ => Err(ConfigIssue::invalid_enum("weekOrdinal", s)),
        }
    }
}

fn nth_weekday(year: i32, month: Month, weekday: Weekday, n: u8) -> Option<Date> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let shift =
        (7 + weekday.number_days_from_monday() - first.weekday().number_days_from_monday()) % 7;
    Date::from_calendar_date(year, month, 1 + shift + 7 * (n - 1)).ok()
}

fn last_weekday(year: i32, month: Month, weekday: Weekday) -> Option<Date> {
    let next_first = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        _ => Date::from_calendar_date(year, month.next(), 1),
    }
    .ok()?;
    let last = next_first.previous_day()?;
    let shift =
        (7 + last.weekday().number_days_from_monday() - weekday.number_days_from_monday()) % 7;
    last.checked_sub(Duration::days(i64::from(shift)))
}

/// Parse an English weekday name or its three-letter abbreviation.
pub fn parse_weekday(s: &str) -> Result<Weekday, ConfigIssue> {
    let weekday = match s.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Weekday::Monday,
        "tue" | "tuesday" => Weekday::Tuesday,
        "wed" | "wednesday" => Weekday::Wednesday,
        "thu" | "thursday" => Weekday::Thursday,
        "fri" | "friday" => Weekday::Friday,
        "sat" | "saturday" => Weekday::Saturday,
        "sun" | "sunday" => Weekday::Sunday,
        _ => return Err(ConfigIssue::invalid_enum("weekday", s)),
    };
    Ok(weekday)
}

/// Parse an English month name or its three-letter abbreviation.
pub fn parse_month(s: &str) -> Result<Month, ConfigIssue> {
    let month = match s.to_ascii_lowercase().as_str() {
        "jan" | "january" => Month::January,
        "feb" | "february" => Month::February,
        "mar" | "march" => Month::March,
        "apr" | "april" => Month::April,
        "may" => Month::May,
        "jun" | "june" => Month::June,
        "jul" | "july" => Month::July,
        "aug" | "august" => Month::August,
        "sep" | "september" => Month::September,
        "oct" | "october" => Month::October,
        "nov" | "november" => Month::November,
        "dec" | "december" => Month::December,
        _ => return Err(ConfigIssue::invalid_enum("month", s)),
    };
    Ok(month)
}

pub fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// One annual clock change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DstRule {
    label: String,
    week: WeekOrdinal,
    weekday: Weekday,
    month: Month,
    hour: u8,
    offset_seconds: i32,
}

impl DstRule {
    /// Build a rule from already range-checked parts.
    pub fn new(
        label: impl Into<String>,
        week: WeekOrdinal,
        weekday: Weekday,
        month: Month,
        hour: u8,
        offset_seconds: i32,
    ) -> Self {
        Self {
            label: label.into(),
            week,
            weekday,
            month,
            hour,
            offset_seconds,
        }
    }

    /// Same rule under a different label.
    pub(crate) fn with_label(self, label: String) -> Self {
        Self { label, ..self }
    }

    /// Time zone abbreviation shown while the rule is in effect, e.g. `CEST`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn week(&self) -> WeekOrdinal {
        self.week
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// Local hour of the change.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Offset added to the standard UTC offset once the rule applies.
    pub fn offset_seconds(&self) -> i32 {
        self.offset_seconds
    }

    /// Local date and time of the change in `year`.
    pub fn transition(&self, year: i32) -> Option<PrimitiveDateTime> {
        let date = self.week.resolve(year, self.month, self.weekday)?;
        let time = Time::from_hms(self.hour, 0, 0).ok()?;
        Some(PrimitiveDateTime::new(date, time))
    }
}

impl fmt::Display for DstRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {} of {} at {:02}:00, {:+}s)",
            self.label,
            self.week.as_str(),
            weekday_abbrev(self.weekday),
            month_abbrev(self.month),
            self.hour,
            self.offset_seconds
        )
    }
}

/// Check that `start` and `end` describe one summer period per calendar year.
pub fn check_pair(start: &DstRule, end: &DstRule) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if start.offset_seconds <= end.offset_seconds {
        issues.push(ConfigIssue::InvalidRule(format!(
            "dstStart offset ({}s) must be greater than dstEnd offset ({}s)",
            start.offset_seconds, end.offset_seconds
        )));
    }

    for year in CHECK_YEARS {
        if let (Some(s), Some(e)) = (start.transition(year), end.transition(year)) {
            if s >= e {
                issues.push(ConfigIssue::InvalidRule(format!(
                    "dstStart ({}) does not precede dstEnd ({}) in {}",
                    s, e, year
                )));
                break;
            }
        }
    }

    issues
}
