//! Planner generation pipeline
//!
//! Runs calendar calculation, binding, sequencing and (optionally) imposition,
//! then renders the result. The output file is only written once the whole
//! document has been rendered and merged.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::binder::Binder;
use crate::calendar::{compute_year, Calendar};
use crate::catalog::TemplateCatalog;
use crate::date::WeekStart;
use crate::error::{Error, Result};
use crate::impose::{impose, Imposition, PAGES_PER_SHEET};
use crate::render::{compose_markup, Renderer};
use crate::sequence::{outline, sequence, OutlineOptions, Page, PageIndex};
use crate::sheet::compose_two_up;

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    pub year: i32,
    pub week_start: WeekStart,
    /// Put pages in booklet printing order
    pub reorder: bool,
    /// Sheets folded together per signature when reordering
    pub sheets_per_signature: usize,
    /// Start every month overview on a right-hand page
    pub align_months: bool,
    /// Put two pages side by side on each A4 sheet
    pub two_up: bool,
}

impl PlannerOptions {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            week_start: WeekStart::default(),
            reorder: false,
            sheets_per_signature: 1,
            align_months: false,
            two_up: false,
        }
    }

    /// Reject settings the imposition cannot work with
    pub fn validate(&self) -> Result<()> {
        let pages = self
            .sheets_per_signature
            .checked_mul(PAGES_PER_SHEET)
            .unwrap_or(0);
        if pages == 0 {
            return Err(Error::Config(format!(
                "sheets_per_signature must be between 1 and {}, got {}",
                usize::MAX / PAGES_PER_SHEET,
                self.sheets_per_signature
            )));
        }
        Ok(())
    }
}

/// A fully planned document, ready for rendering
#[derive(Debug, Clone)]
pub struct PlannedDocument {
    pub calendar: Calendar,
    /// Pages in reading order, without imposition padding
    pub reading_order: Vec<Page>,
    /// Printing order, present when reordering was requested
    pub imposition: Option<Imposition>,
}

impl PlannedDocument {
    /// Pages in the order they go into the PDF
    pub fn physical_pages(&self) -> &[Page] {
        match &self.imposition {
            Some(imposition) => &imposition.pages,
            None => &self.reading_order,
        }
    }

    pub fn logical_count(&self) -> usize {
        self.reading_order.len()
    }

    pub fn physical_count(&self) -> usize {
        self.physical_pages().len()
    }
}

/// Summary of a finished generation run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output: PathBuf,
    pub logical_pages: usize,
    pub physical_pages: usize,
    pub filler_pages: usize,
    /// Pages in the PDF: sheet sides when printing two-up
    pub output_pages: usize,
    pub bytes: usize,
}

/// Planner generator bound to a template catalog
pub struct Planner<'a, C: TemplateCatalog + ?Sized> {
    options: PlannerOptions,
    catalog: &'a C,
}

impl<'a, C: TemplateCatalog + ?Sized> Planner<'a, C> {
    pub fn new(options: PlannerOptions, catalog: &'a C) -> Self {
        Self { options, catalog }
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Compute every page and its order without rendering anything
    pub fn plan(&self) -> Result<PlannedDocument> {
        let options = &self.options;
        options.validate()?;
        let calendar = compute_year(options.year, options.week_start)?;

        let units = outline(
            &calendar,
            &OutlineOptions {
                align_months: options.align_months,
            },
        );
        let index = PageIndex::new(&units);
        let bound = Binder::new(&calendar, self.catalog, &index).bind_all(&units)?;
        let reading_order = sequence(bound);

        let imposition = if options.reorder {
            Some(impose(reading_order.clone(), options.sheets_per_signature)?)
        } else {
            None
        };

        Ok(PlannedDocument {
            calendar,
            reading_order,
            imposition,
        })
    }

    /// Plan, render and write the planner to `output`
    ///
    /// Nothing is written unless every page rendered successfully.
    pub fn generate<R>(&self, renderer: &R, output: &Path) -> Result<GenerationReport>
    where
        R: Renderer + ?Sized,
    {
        let plan = self.plan()?;
        let markup = if self.options.two_up {
            compose_two_up(plan.physical_pages(), self.catalog)?
        } else {
            compose_markup(plan.physical_pages(), self.catalog)?
        };
        let pdf = renderer.render(&markup)?;

        write_atomically(output, &pdf)?;
        info!("wrote {} ({} bytes)", output.display(), pdf.len());

        Ok(GenerationReport {
            output: output.to_path_buf(),
            logical_pages: plan.logical_count(),
            physical_pages: plan.physical_count(),
            filler_pages: plan
                .imposition
                .as_ref()
                .map(Imposition::filler_count)
                .unwrap_or(0),
            output_pages: markup.len(),
            bytes: pdf.len(),
        })
    }
}

/// Write through a temporary file in the same directory, then rename
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
