//! Paper Planner Library
//!
//! Generates a printable year planner from a family of SVG page templates.
//! This library provides functionality to:
//! - Compute the months, weeks and days of a year for a chosen week start
//! - Bind calendar units to templates, with cross-page references
//! - Sequence pages in reading order
//! - Reorder pages into booklet signatures for fold-and-staple printing
//! - Print two pages side by side on A4 sheets
//! - Render pages through an external SVG converter and merge the PDFs
//!
//! # Example
//!
//! ```no_run
//! use paper_planner::catalog::DirectoryCatalog;
//! use paper_planner::planner::{Planner, PlannerOptions};
//! use paper_planner::render::CommandRenderer;
//! use std::path::Path;
//!
//! let catalog = DirectoryCatalog::load(Path::new("a5_templates")).unwrap();
//! let options = PlannerOptions {
//!     reorder: true,
//!     ..PlannerOptions::new(2024)
//! };
//!
//! Planner::new(options, &catalog)
//!     .generate(&CommandRenderer::default(), Path::new("planner_2024.pdf"))
//!     .expect("Failed to generate planner");
//! ```

pub mod binder;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod date;
pub mod error;
pub mod impose;
pub mod pdf;
pub mod planner;
pub mod render;
pub mod sequence;
pub mod sheet;

// Re-export commonly used items
pub use error::{Error, Result};
