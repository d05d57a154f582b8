//! Template binding
//!
//! Turns a calendar unit into a [`BoundPage`]: the template that draws it and
//! the placeholder values printed on it, including page numbers of related
//! pages.

use std::collections::BTreeMap;

use chrono::Datelike;
use log::trace;

use crate::calendar::{Calendar, Day, Month, Week};
use crate::catalog::{TemplateCatalog, TemplateId};
use crate::date::{format_date, month_label, weekday_key, weekday_label};
use crate::error::{Error, Result};
use crate::sequence::{BoundPage, PageIndex, PageUnit};

/// Number of cells in a month grid template (six rows of seven)
pub const MONTH_GRID_CELLS: usize = 42;

/// Binds calendar units against a template catalog
pub struct Binder<'a, C: TemplateCatalog + ?Sized> {
    calendar: &'a Calendar,
    catalog: &'a C,
    index: &'a PageIndex,
}

impl<'a, C: TemplateCatalog + ?Sized> Binder<'a, C> {
    pub fn new(calendar: &'a Calendar, catalog: &'a C, index: &'a PageIndex) -> Self {
        Self {
            calendar,
            catalog,
            index,
        }
    }

    /// Bind every unit of an outline, in order
    pub fn bind_all(&self, units: &[PageUnit]) -> Result<Vec<BoundPage>> {
        units.iter().map(|unit| self.bind(*unit)).collect()
    }

    /// Bind one unit
    ///
    /// Fails with [`Error::MissingTemplate`] when the catalog lacks the
    /// template selected for the unit.
    pub fn bind(&self, unit: PageUnit) -> Result<BoundPage> {
        let mut subs = Substitutions::default();
        subs.set("YEAR", self.calendar.year);
        if let Some(page) = self.index.page_number(unit) {
            subs.set("PAGE", page);
        }

        let template = match unit {
            PageUnit::Cover => TemplateId::Cover,
            PageUnit::Notes => TemplateId::Notes,
            PageUnit::Spacer => TemplateId::Blank,
            PageUnit::MonthOverview(index) => {
                let month = self.calendar.month(index).ok_or_else(|| unknown(unit))?;
                self.bind_month(month, &mut subs)
            }
            PageUnit::Week(index) => {
                let week = self.calendar.week(index).ok_or_else(|| unknown(unit))?;
                self.bind_week(week, &mut subs);
                TemplateId::Week
            }
            PageUnit::Day(ordinal) => {
                let day = self.calendar.day(ordinal).ok_or_else(|| unknown(unit))?;
                self.bind_day(day, &mut subs)
            }
        };

        self.catalog.require(template)?;
        trace!("bound {} to {}", unit, template);

        Ok(BoundPage {
            unit,
            template,
            substitutions: subs.0,
        })
    }

    fn bind_month(&self, month: &Month, subs: &mut Substitutions) -> TemplateId {
        let week_start = self.calendar.week_start;
        let grid = month.grid(week_start);

        subs.set("MONTH", &month.name);
        subs.set("MONTH_NUMBER", month.index);

        let cells = grid.iter().flat_map(|row| row.iter());
        let padded = cells.chain(std::iter::repeat(&None));
        for (i, cell) in padded.take(MONTH_GRID_CELLS).enumerate() {
            let value = cell.map(|d| d.to_string()).unwrap_or_default();
            subs.set(&(i + 1).to_string(), value);
        }

        for (i, weekday) in week_start.weekdays().iter().enumerate() {
            subs.set(&format!("WEEKDAY{}", i + 1), weekday_label(*weekday));
        }

        let first_week_page = self
            .calendar
            .weeks_of_month(month.index)
            .find_map(|week| self.index.page_number(PageUnit::Week(week.index)));
        if let Some(page) = first_week_page {
            subs.set("FIRST_WEEK_PAGE", page);
        }

        TemplateId::MonthSummary(grid.len())
    }

    fn bind_week(&self, week: &Week, subs: &mut Substitutions) {
        let year = self.calendar.year;
        let dates = week.display_dates();
        let (first, last) = (dates[0], dates[6]);

        subs.set("WEEK_NUMBER", week.number);
        subs.set(
            "WEEK_DESCRIPTION_TEXT",
            format!("{} WEEK {}", week.week_year, week.number),
        );

        let month_days_text = if first.month() == last.month() {
            format!("{} {} - {}", month_label(&first), first.day(), last.day())
        } else {
            format!(
                "{} {} - {} {}",
                month_label(&first),
                first.day(),
                month_label(&last),
                last.day()
            )
        };
        subs.set("MONTH_DAYS_TEXT", month_days_text);

        for (i, date) in dates.iter().enumerate() {
            let column = i + 1;
            subs.set(&format!("{}_dom", weekday_key(date.weekday())), date.day());
            subs.set(&format!("DAY{}", column), date.day());

            let key = format!("DAY{}_PAGE", column);
            if date.year() == year {
                subs.set_page(&key, self.index, PageUnit::Day(date.ordinal()));
            } else {
                subs.set(&key, "");
            }
        }

        subs.set_page("MONTH_PAGE", self.index, PageUnit::MonthOverview(week.home_month));
    }

    fn bind_day(&self, day: &Day, subs: &mut Substitutions) -> TemplateId {
        subs.set("DATE", day.date.format("%Y-%m-%d"));
        subs.set("DATE_TEXT", format_date(&day.date));
        subs.set("DAY_OF_MONTH", day.date.day());
        subs.set("DAY_OF_YEAR", day.ordinal);
        subs.set("WEEKDAY", weekday_label(day.weekday));
        subs.set("MONTH", month_label(&day.date));

        if let Some(week) = self.calendar.week_containing(day.date) {
            subs.set_page("WEEK_PAGE", self.index, PageUnit::Week(week.index));
        }
        subs.set_page(
            "MONTH_PAGE",
            self.index,
            PageUnit::MonthOverview(day.date.month()),
        );

        if day.is_first_of_month {
            TemplateId::DayMonthStart
        } else if day.is_last_of_month {
            TemplateId::DayMonthEnd
        } else {
            TemplateId::Day
        }
    }
}

fn unknown(unit: PageUnit) -> Error {
    Error::UnknownUnit(unit.to_string())
}

/// Placeholder map keyed with braces, e.g. `{MONTH}`
#[derive(Debug, Default)]
struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    fn set(&mut self, name: &str, value: impl ToString) {
        self.0.insert(format!("{{{}}}", name), value.to_string());
    }

    /// Set a cross-reference; left empty when the unit is not in the outline
    fn set_page(&mut self, name: &str, index: &PageIndex, unit: PageUnit) {
        let value = index
            .page_number(unit)
            .map(|n| n.to_string())
            .unwrap_or_default();
        self.set(name, value);
    }
}
