//! Rendering pages to PDF
//!
//! Template markup is filled in here, then each page is handed to an external
//! SVG converter and the per-page PDFs are concatenated in order.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::{debug, info};
use serde::Deserialize;

use crate::catalog::{apply_substitutions, TemplateCatalog};
use crate::error::{Error, Result};
use crate::pdf::merge_bytes;
use crate::sequence::Page;

/// Fill in the template of every page, in the given order
///
/// Fails with [`Error::MissingTemplate`] before anything is rendered if a
/// page's template (including the blank filler template) is absent.
pub fn compose_markup<C>(pages: &[Page], catalog: &C) -> Result<Vec<String>>
where
    C: TemplateCatalog + ?Sized,
{
    pages.iter().map(|page| fill_page(page, catalog)).collect()
}

/// Template markup of one page with its placeholders replaced
pub fn fill_page<C>(page: &Page, catalog: &C) -> Result<String>
where
    C: TemplateCatalog + ?Sized,
{
    let template = catalog.require(page.template)?;
    Ok(apply_substitutions(template, &page.substitutions))
}

/// Turns filled-in SVG pages into one PDF
pub trait Renderer {
    /// Render `pages` in order and return the merged PDF bytes
    ///
    /// Fails with [`Error::Render`] naming the first page that could not be
    /// converted.
    fn render(&self, pages: &[String]) -> Result<Vec<u8>>;
}

/// External converter invocation
///
/// `{input}` and `{output}` in the arguments are replaced by the SVG file to
/// read and the PDF file to write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ConverterCommand {
    fn default() -> Self {
        Self {
            program: "cairosvg".to_string(),
            args: vec!["-o".to_string(), "{output}".to_string(), "{input}".to_string()],
        }
    }
}

impl ConverterCommand {
    /// Use `program` with the default argument layout
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    fn command_for(&self, input: &Path, output: &Path) -> Command {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();

        let mut command = Command::new(&self.program);
        command.args(self.args.iter().map(|arg| {
            arg.replace("{input}", &input).replace("{output}", &output)
        }));
        command
    }
}

/// Renderer that runs an external converter once per page
#[derive(Debug, Clone, Default)]
pub struct CommandRenderer {
    converter: ConverterCommand,
}

impl CommandRenderer {
    pub fn new(converter: ConverterCommand) -> Self {
        Self { converter }
    }

    fn render_page(&self, dir: &Path, page_index: usize, markup: &str) -> Result<Vec<u8>> {
        let input = dir.join(format!("{:04}.svg", page_index));
        let output = dir.join(format!("{:04}.pdf", page_index));
        fs::write(&input, markup)?;

        let mut command = self.converter.command_for(&input, &output);
        debug!("page {}: {:?}", page_index, command);

        let result = command.output().map_err(|e| Error::Render {
            page_index,
            message: format!("failed to run {}: {}", self.converter.program, e),
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.converter.program, result.status),
                diagnostic => diagnostic.to_string(),
            };
            return Err(Error::Render {
                page_index,
                message,
            });
        }

        fs::read(&output).map_err(|e| Error::Render {
            page_index,
            message: format!("no output from {}: {}", self.converter.program, e),
        })
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, pages: &[String]) -> Result<Vec<u8>> {
        let work_dir = tempfile::Builder::new()
            .prefix("paper-planner-")
            .tempdir()?;

        info!(
            "converting {} pages with {}",
            pages.len(),
            self.converter.program
        );

        let rendered = pages
            .iter()
            .enumerate()
            .map(|(index, markup)| self.render_page(work_dir.path(), index, markup))
            .collect::<Result<Vec<_>>>()?;

        merge_bytes(&rendered)
    }
}
