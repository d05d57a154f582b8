//! Page sequencing
//!
//! Builds the reading order of a planner and assigns each bound page its
//! logical position.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::{debug, info};

use crate::calendar::Calendar;
use crate::catalog::TemplateId;

/// What a planner page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageUnit {
    Cover,
    /// Month overview, month number 1-12
    MonthOverview(u32),
    /// Week page, week-of-year index
    Week(u32),
    /// Day page, day of year
    Day(u32),
    Notes,
    /// Blank page inside the reading order, used to align month overviews
    Spacer,
}

impl fmt::Display for PageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageUnit::Cover => write!(f, "cover"),
            PageUnit::MonthOverview(m) => write!(f, "month {}", m),
            PageUnit::Week(w) => write!(f, "week {}", w),
            PageUnit::Day(d) => write!(f, "day {}", d),
            PageUnit::Notes => write!(f, "notes"),
            PageUnit::Spacer => write!(f, "spacer"),
        }
    }
}

/// Options shaping the reading order
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineOptions {
    /// Insert spacers so every month overview lands on a right-hand page
    pub align_months: bool,
}

/// Reading order of every page of the planner
///
/// Cover, then per month its overview followed by the weeks filed under it,
/// each week page followed by its day pages, then the notes page. Days of a
/// partial week numbered in the previous or next year follow the month
/// overview without a week page.
pub fn outline(calendar: &Calendar, options: &OutlineOptions) -> Vec<PageUnit> {
    let mut units = vec![PageUnit::Cover];

    for month in &calendar.months {
        // Right-hand pages have even 0-based positions
        if options.align_months && units.len() % 2 == 1 {
            debug!("spacer before {} overview", month.name);
            units.push(PageUnit::Spacer);
        }
        units.push(PageUnit::MonthOverview(month.index));

        for week in calendar.weeks_of_month(month.index) {
            // Partial weeks numbered in a neighbouring year only hold days
            if week.belongs_to(calendar.year) {
                units.push(PageUnit::Week(week.index));
            }
            units.extend(week.days.iter().map(|day| PageUnit::Day(day.ordinal)));
        }
    }

    units.push(PageUnit::Notes);

    info!(
        "outlined {} pages for {} ({} weeks)",
        units.len(),
        calendar.year,
        calendar.numbered_weeks().count()
    );
    units
}

/// Where each calendar unit sits in the reading order
///
/// Used by the binder to print cross-references before pages exist.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    positions: HashMap<PageUnit, usize>,
}

impl PageIndex {
    pub fn new(units: &[PageUnit]) -> Self {
        let positions = units
            .iter()
            .enumerate()
            .filter(|(_, unit)| **unit != PageUnit::Spacer)
            .map(|(position, unit)| (*unit, position))
            .collect();
        Self { positions }
    }

    /// Logical position of `unit`
    pub fn position(&self, unit: PageUnit) -> Option<usize> {
        self.positions.get(&unit).copied()
    }

    /// Printed page number (1-based) of `unit`
    pub fn page_number(&self, unit: PageUnit) -> Option<usize> {
        self.position(unit).map(|p| p + 1)
    }
}

/// A page produced by the binder, not yet placed
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPage {
    pub unit: PageUnit,
    pub template: TemplateId,
    /// Placeholder (with braces) to value
    pub substitutions: BTreeMap<String, String>,
}

/// A page with its place in the reading order
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// `None` for imposition filler pages
    pub unit: Option<PageUnit>,
    pub template: TemplateId,
    pub substitutions: BTreeMap<String, String>,
    /// 0-based position in reading order
    pub logical_position: usize,
}

impl Page {
    /// Blank filler page appended for imposition
    pub fn filler(logical_position: usize) -> Self {
        Self {
            unit: None,
            template: TemplateId::Blank,
            substitutions: BTreeMap::new(),
            logical_position,
        }
    }

    pub fn is_filler(&self) -> bool {
        self.unit.is_none()
    }
}

/// Assign logical positions `0..N` in the given order
pub fn sequence(pages: Vec<BoundPage>) -> Vec<Page> {
    pages
        .into_iter()
        .enumerate()
        .map(|(logical_position, bound)| Page {
            unit: Some(bound.unit),
            template: bound.template,
            substitutions: bound.substitutions,
            logical_position,
        })
        .collect()
}
