//! Planner configuration file
//!
//! Every setting is optional. Values given on the command line are layered
//! on top of the file with [`PlannerConfig::overridden_by`].
//!
//! ```toml
//! year = 2024
//! week_start = "sunday"
//! reorder = true
//! sheets_per_signature = 1
//! two_up = true
//! templates = "a5_templates"
//!
//! [converter]
//! program = "rsvg-convert"
//! args = ["-f", "pdf", "-o", "{output}", "{input}"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::date::WeekStart;
use crate::error::{Error, Result};
use crate::planner::PlannerOptions;
use crate::render::ConverterCommand;

/// Template directory used when none is configured
pub const DEFAULT_TEMPLATE_DIR: &str = "a5_templates";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    pub year: Option<i32>,
    pub week_start: Option<WeekStart>,
    pub reorder: Option<bool>,
    pub sheets_per_signature: Option<usize>,
    pub align_months: Option<bool>,
    pub two_up: Option<bool>,
    /// Directory holding the SVG templates
    pub templates: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub converter: Option<ConverterCommand>,
}

impl PlannerConfig {
    /// Read a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Layer `overrides` on top of this configuration
    pub fn overridden_by(self, overrides: PlannerConfig) -> PlannerConfig {
        PlannerConfig {
            year: overrides.year.or(self.year),
            week_start: overrides.week_start.or(self.week_start),
            reorder: overrides.reorder.or(self.reorder),
            sheets_per_signature: overrides.sheets_per_signature.or(self.sheets_per_signature),
            align_months: overrides.align_months.or(self.align_months),
            two_up: overrides.two_up.or(self.two_up),
            templates: overrides.templates.or(self.templates),
            output: overrides.output.or(self.output),
            converter: overrides.converter.or(self.converter),
        }
    }

    /// Planning options; the year is the only required setting
    pub fn planner_options(&self) -> Result<PlannerOptions> {
        let year = self
            .year
            .ok_or_else(|| Error::Config("no year given".to_string()))?;
        let defaults = PlannerOptions::new(year);

        let options = PlannerOptions {
            year,
            week_start: self.week_start.unwrap_or(defaults.week_start),
            reorder: self.reorder.unwrap_or(defaults.reorder),
            sheets_per_signature: self
                .sheets_per_signature
                .unwrap_or(defaults.sheets_per_signature),
            align_months: self.align_months.unwrap_or(defaults.align_months),
            two_up: self.two_up.unwrap_or(defaults.two_up),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn template_dir(&self) -> PathBuf {
        self.templates
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR))
    }

    /// Output path, `planner_{year}.pdf` unless configured
    pub fn output_path(&self, year: i32) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("planner_{}.pdf", year)))
    }

    pub fn converter(&self) -> ConverterCommand {
        self.converter.clone().unwrap_or_default()
    }
}
