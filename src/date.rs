//! Week-start convention and date labels
//!
//! Parsing of the week-start option and the text labels printed on planner
//! pages (month names, weekday names, long dates).

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::Deserialize;

use crate::error::{Error, Result};

/// First day of the planner week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// The weekday a week begins on
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// Column of `weekday` (0..7) in a week beginning on this day
    pub fn column_of(self, weekday: Weekday) -> u32 {
        match self {
            WeekStart::Monday => weekday.num_days_from_monday(),
            WeekStart::Sunday => weekday.num_days_from_sunday(),
        }
    }

    /// The seven weekdays in column order
    pub fn weekdays(self) -> [Weekday; 7] {
        let mut days = [self.weekday(); 7];
        for i in 1..7 {
            days[i] = days[i - 1].succ();
        }
        days
    }
}

impl FromStr for WeekStart {
    type Err = Error;

    /// Accepts monday, mon, sunday and sun in any case
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(Error::InvalidWeekStart(s)),
        }
    }
}

impl TryFrom<String> for WeekStart {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

/// Upper-case weekday name as printed on pages, e.g. "MONDAY"
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Placeholder prefix for the per-weekday day-of-month fields ("{mon_dom}")
pub fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thur",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Upper-case month name of a date, e.g. "JANUARY"
pub fn month_label(date: &NaiveDate) -> String {
    date.format("%B").to_string().to_uppercase()
}

/// Format a date in the standard format: "Month day, year"
/// Example: "November 20, 2024"
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
