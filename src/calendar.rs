//! Calendar calculation
//!
//! Pure date arithmetic for one planner year: the twelve months with their
//! days, and the weeks that partition those days according to the configured
//! week start.
//!
//! The days are cut into consecutive weeks beginning on the configured week
//! start, so the first and last week of a year are usually partial.
//!
//! Weeks are numbered from the week-start day nearest 1 January: a week
//! belongs to the year holding its fourth day. With a Monday start this is
//! ISO 8601 week numbering. A leading week whose fourth day falls in the
//! previous year carries that year's last week number, and a trailing one
//! carries week 1 of the next year; neither gets a week page of its own.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::date::{month_label, WeekStart};
use crate::error::{Error, Result};

/// First year of the supported range (first full Gregorian year)
pub const MIN_YEAR: i32 = 1583;
/// Last year of the supported range
pub const MAX_YEAR: i32 = 9999;

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub is_first_of_month: bool,
    pub is_last_of_month: bool,
    /// Day of year, starting at 1
    pub ordinal: u32,
}

/// A calendar month
#[derive(Debug, Clone)]
pub struct Month {
    /// Month number, 1-12
    pub index: u32,
    /// Upper-case month name, e.g. "JANUARY"
    pub name: String,
    pub days: Vec<Day>,
}

impl Month {
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Month-calendar grid with one row per (possibly partial) week
    ///
    /// Cells hold the day of month, `None` outside the month.
    pub fn grid(&self, week_start: WeekStart) -> Vec<[Option<u32>; 7]> {
        let lead = self
            .days
            .first()
            .map(|d| week_start.column_of(d.weekday) as usize)
            .unwrap_or(0);

        let cells = lead + self.days.len();
        let mut rows = vec![[None; 7]; cells.div_ceil(7)];
        for (i, day) in self.days.iter().enumerate() {
            let cell = lead + i;
            rows[cell / 7][cell % 7] = Some(day.date.day());
        }
        rows
    }
}

/// A planner week
#[derive(Debug, Clone)]
pub struct Week {
    /// Week of year, starting at 1
    pub index: u32,
    /// First display date; may fall in the previous year
    pub start: NaiveDate,
    /// In-year days belonging to this week (1 to 7 of them)
    pub days: Vec<Day>,
    /// Month this week is filed under
    pub home_month: u32,
    /// Printed week number (1-53) within `week_year`
    pub number: u32,
    /// Year the week is numbered in, which differs from the calendar year
    /// for leading and trailing partial weeks that belong to a neighbour
    pub week_year: i32,
}

impl Week {
    /// All seven dates of the week, including out-of-year ones
    pub fn display_dates(&self) -> [NaiveDate; 7] {
        let mut dates = [self.start; 7];
        for (i, date) in dates.iter_mut().enumerate() {
            *date = self.start + Duration::days(i as i64);
        }
        dates
    }

    /// Whether the week is numbered in `year` and so gets a week page
    pub fn belongs_to(&self, year: i32) -> bool {
        self.week_year == year
    }

    pub fn is_partial(&self) -> bool {
        self.days.len() < 7
    }

    /// Whether the display dates span two months
    pub fn spans_months(&self) -> bool {
        let dates = self.display_dates();
        dates[0].month() != dates[6].month()
    }
}

/// All months and weeks of one year
#[derive(Debug, Clone)]
pub struct Calendar {
    pub year: i32,
    pub week_start: WeekStart,
    pub months: Vec<Month>,
    pub weeks: Vec<Week>,
}

impl Calendar {
    /// Total number of days (365 or 366)
    pub fn day_count(&self) -> usize {
        self.months.iter().map(Month::day_count).sum()
    }

    /// Iterate over every day of the year in order
    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.months.iter().flat_map(|m| m.days.iter())
    }

    /// Look up a day by its day-of-year
    pub fn day(&self, ordinal: u32) -> Option<&Day> {
        let date = NaiveDate::from_yo_opt(self.year, ordinal)?;
        self.months
            .get(date.month0() as usize)?
            .days
            .get(date.day0() as usize)
    }

    pub fn month(&self, index: u32) -> Option<&Month> {
        self.months.get(index.checked_sub(1)? as usize)
    }

    pub fn week(&self, index: u32) -> Option<&Week> {
        self.weeks.get(index.checked_sub(1)? as usize)
    }

    /// The week holding `date`, if the date is in this year
    pub fn week_containing(&self, date: NaiveDate) -> Option<&Week> {
        if date.year() != self.year {
            return None;
        }
        let first = self.weeks.first()?;
        let offset = (date - first.start).num_days() as usize;
        self.weeks.get(offset / 7)
    }

    /// Weeks filed under the given month, in order
    pub fn weeks_of_month(&self, month: u32) -> impl Iterator<Item = &Week> {
        self.weeks.iter().filter(move |w| w.home_month == month)
    }

    /// Weeks numbered in this year (52 or 53 of them)
    pub fn numbered_weeks(&self) -> impl Iterator<Item = &Week> {
        let year = self.year;
        self.weeks.iter().filter(move |w| w.belongs_to(year))
    }
}

/// Compute the months, days and weeks of `year`
pub fn compute_year(year: i32, week_start: WeekStart) -> Result<Calendar> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::InvalidYear(year));
    }

    let months = (1..=12)
        .map(|m| build_month(year, m))
        .collect::<Result<Vec<_>>>()?;

    let first_day = months[0].days[0];
    let last_day = months[11].days[months[11].days.len() - 1];
    let lead = week_start.column_of(first_day.weekday);
    let first_start = first_day.date - Duration::days(lead as i64);

    let mut weeks: Vec<Week> = Vec::new();
    for day in months.iter().flat_map(|m| m.days.iter()) {
        let slot = ((lead + day.ordinal - 1) / 7) as usize;
        if weeks.len() <= slot {
            let start = first_start + Duration::days(7 * slot as i64);
            let fourth = start + Duration::days(3);
            weeks.push(Week {
                index: slot as u32 + 1,
                start,
                days: Vec::with_capacity(7),
                home_month: fourth.clamp(first_day.date, last_day.date).month(),
                number: fourth.ordinal0() / 7 + 1,
                week_year: fourth.year(),
            });
        }
        weeks[slot].days.push(*day);
    }

    Ok(Calendar {
        year,
        week_start,
        months,
        weeks,
    })
}

fn build_month(year: i32, month: u32) -> Result<Month> {
    let count = days_in_month(year, month);
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidYear(year))?;

    let days = (0..count)
        .map(|offset| {
            let date = first + Duration::days(offset as i64);
            Day {
                date,
                weekday: date.weekday(),
                is_first_of_month: offset == 0,
                is_last_of_month: offset + 1 == count,
                ordinal: date.ordinal(),
            }
        })
        .collect();

    Ok(Month {
        index: month,
        name: month_label(&first),
        days,
    })
}
