//! Template catalog
//!
//! Page templates are SVG documents containing literal `{NAME}` placeholders.
//! The catalog is handed to the binder and renderer explicitly and is only
//! read during a run.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use log::{debug, info};

use crate::error::{Error, Result};

/// Identifier of a template in the planner's template family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Cover,
    Notes,
    Blank,
    /// Month overview with the given number of calendar rows (4, 5 or 6)
    MonthSummary(usize),
    Week,
    Day,
    DayMonthStart,
    DayMonthEnd,
}

impl TemplateId {
    /// Every template a full planner can ask for
    pub const ALL: [TemplateId; 10] = [
        TemplateId::Cover,
        TemplateId::Notes,
        TemplateId::Blank,
        TemplateId::MonthSummary(4),
        TemplateId::MonthSummary(5),
        TemplateId::MonthSummary(6),
        TemplateId::Week,
        TemplateId::Day,
        TemplateId::DayMonthStart,
        TemplateId::DayMonthEnd,
    ];

    /// Catalog key, also the file stem in a template directory
    pub fn name(&self) -> String {
        match self {
            TemplateId::Cover => "cover".to_string(),
            TemplateId::Notes => "notes".to_string(),
            TemplateId::Blank => "blank".to_string(),
            TemplateId::MonthSummary(rows) => format!("month_summary_{}wk", rows),
            TemplateId::Week => "week".to_string(),
            TemplateId::Day => "day".to_string(),
            TemplateId::DayMonthStart => "day_month_start".to_string(),
            TemplateId::DayMonthEnd => "day_month_end".to_string(),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name())
    }
}

/// Read-only source of template markup
pub trait TemplateCatalog {
    /// Raw markup for `id`, if the catalog has it
    fn get(&self, id: TemplateId) -> Option<&str>;

    /// Raw markup for `id`, failing with [`Error::MissingTemplate`]
    fn require(&self, id: TemplateId) -> Result<&str> {
        self.get(id)
            .ok_or_else(|| Error::MissingTemplate(id.name()))
    }

    /// Names of required templates this catalog lacks
    fn missing(&self) -> Vec<String> {
        TemplateId::ALL
            .iter()
            .filter(|id| self.get(**id).is_none())
            .map(TemplateId::name)
            .collect()
    }
}

/// Catalog held entirely in memory, keyed by template name
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<String, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template
    pub fn insert(&mut self, name: impl Into<String>, markup: impl Into<String>) {
        self.templates.insert(name.into(), markup.into());
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, id: TemplateId, markup: impl Into<String>) -> Self {
        self.insert(id.name(), markup);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateCatalog for InMemoryCatalog {
    fn get(&self, id: TemplateId) -> Option<&str> {
        self.templates.get(&id.name()).map(String::as_str)
    }
}

/// Catalog loaded from the `*.svg` files of a directory
///
/// Each file's stem is its template name, so `week.svg` provides
/// [`TemplateId::Week`]. Files not belonging to the template family are
/// loaded but never asked for.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    inner: InMemoryCatalog,
}

impl DirectoryCatalog {
    /// Load every SVG template in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::TemplateDirectory(dir.to_path_buf()));
        }

        let pattern = format!("{}/*.svg", Pattern::escape(&dir.to_string_lossy()));
        let entries = glob(&pattern).map_err(|e| Error::InvalidGlob(e.to_string()))?;

        let mut inner = InMemoryCatalog::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!("loading template {} from {}", stem, path.display());
            inner.insert(stem, fs::read_to_string(&path)?);
        }

        info!("loaded {} templates from {}", inner.len(), dir.display());

        Ok(Self {
            root: dir.to_path_buf(),
            inner,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateCatalog for DirectoryCatalog {
    fn get(&self, id: TemplateId) -> Option<&str> {
        self.inner.get(id)
    }
}

/// Replace every placeholder of `substitutions` in `markup`
///
/// Keys are complete placeholders including braces, so `{1}` never matches
/// inside `{11}`.
pub fn apply_substitutions<'a, I>(markup: &str, substitutions: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    substitutions
        .into_iter()
        .fold(markup.to_string(), |acc, (pattern, value)| {
            acc.replace(pattern.as_str(), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_template_names() {
        assert_eq!(TemplateId::MonthSummary(5).name(), "month_summary_5wk");
        assert_eq!(TemplateId::DayMonthStart.to_string(), "day_month_start");
        assert_eq!(TemplateId::Blank.name(), "blank");
    }

    #[test]
    fn test_in_memory_require() {
        let catalog = InMemoryCatalog::new().with(TemplateId::Week, "<svg/>");
        assert_eq!(catalog.require(TemplateId::Week).unwrap(), "<svg/>");

        let err = catalog.require(TemplateId::Day).unwrap_err();
        assert!(matches!(err, Error::MissingTemplate(ref name) if name == "day"));
    }

    #[test]
    fn test_missing_lists_absent_templates() {
        let mut catalog = InMemoryCatalog::new();
        for id in TemplateId::ALL {
            catalog.insert(id.name(), "<svg/>");
        }
        assert!(catalog.missing().is_empty());

        let catalog = InMemoryCatalog::new().with(TemplateId::Cover, "<svg/>");
        let missing = catalog.missing();
        assert_eq!(missing.len(), TemplateId::ALL.len() - 1);
        assert!(!missing.contains(&"cover".to_string()));
    }

    #[test]
    fn test_directory_catalog() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("week.svg"), "<svg>{WEEK_NUMBER}</svg>").unwrap();
        fs::write(dir.path().join("month_summary_6wk.svg"), "<svg>{MONTH}</svg>").unwrap();
        fs::write(dir.path().join("readme.txt"), "not a template").unwrap();

        let catalog = DirectoryCatalog::load(dir.path()).unwrap();
        assert_eq!(
            catalog.get(TemplateId::Week),
            Some("<svg>{WEEK_NUMBER}</svg>")
        );
        assert!(catalog.get(TemplateId::MonthSummary(6)).is_some());
        assert!(catalog.get(TemplateId::Day).is_none());
        assert_eq!(catalog.root(), dir.path());
    }

    #[test]
    fn test_directory_catalog_missing_dir() {
        let result = DirectoryCatalog::load(Path::new("no-such-template-dir"));
        assert!(matches!(result, Err(Error::TemplateDirectory(_))));
    }

    #[test]
    fn test_apply_substitutions() {
        let mut subs = BTreeMap::new();
        subs.insert("{1}".to_string(), "A".to_string());
        subs.insert("{11}".to_string(), "B".to_string());
        subs.insert("{MONTH}".to_string(), "MAY".to_string());

        let out = apply_substitutions("{1}-{11}-{MONTH}-{UNKNOWN}", &subs);
        assert_eq!(out, "A-B-MAY-{UNKNOWN}");
    }
}
