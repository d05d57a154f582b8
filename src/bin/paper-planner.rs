//! Paper Planner CLI tool
//!
//! A command-line tool for generating a year planner PDF from SVG templates.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{error, LevelFilter};

use paper_planner::catalog::{DirectoryCatalog, TemplateCatalog};
use paper_planner::config::PlannerConfig;
use paper_planner::date::WeekStart;
use paper_planner::planner::Planner;
use paper_planner::render::{CommandRenderer, ConverterCommand};
use paper_planner::sequence::Page;

/// Paper Planner - Generate a printable year planner
#[derive(Parser)]
#[command(name = "paper-planner")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Planner for 2024 in reading order
    paper-planner generate --year 2024

    # Booklet order for folding, weeks starting on Sunday
    paper-planner generate --year 2024 --week-start sunday --reorder -o booklet.pdf

    # Booklet sheets with two pages per A4 side, to cut and fold
    paper-planner generate --year 2024 --reorder --two-up

    # Show the printing order without rendering
    paper-planner outline --year 2024 --reorder --sheets-per-signature 4")]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the planner to a PDF
    Generate {
        #[command(flatten)]
        plan: PlanArgs,

        /// Output PDF file path (default: planner_<year>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// SVG converter program, called as `<program> -o <output.pdf> <input.svg>`
        #[arg(long)]
        converter: Option<String>,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Print the page order without rendering
    Outline {
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// List templates missing from the template directory
    Templates {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the SVG templates
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },

    /// Show the page count of a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

/// Options shared by every command that plans a planner
#[derive(Args)]
struct PlanArgs {
    /// The year to generate, e.g. 2024
    #[arg(short, long)]
    year: Option<i32>,

    /// First day of the week: monday or sunday
    #[arg(short, long)]
    week_start: Option<String>,

    /// Rearrange pages into booklet order for folding
    #[arg(long)]
    reorder: bool,

    /// Sheets folded together per signature when reordering
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    sheets_per_signature: Option<u16>,

    /// Start every month overview on a right-hand page
    #[arg(long)]
    align_months: bool,

    /// Print two pages side by side on each A4 sheet, with cut marks
    #[arg(long)]
    two_up: bool,

    /// Directory holding the SVG templates
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Configuration file (TOML); command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PlanArgs {
    /// Configuration file layered with the command-line flags
    fn resolve(self) -> anyhow::Result<PlannerConfig> {
        let file = match &self.config {
            Some(path) => PlannerConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => PlannerConfig::default(),
        };

        let week_start = self
            .week_start
            .as_deref()
            .map(str::parse::<WeekStart>)
            .transpose()?;

        let flags = PlannerConfig {
            year: self.year,
            week_start,
            reorder: self.reorder.then_some(true),
            sheets_per_signature: self.sheets_per_signature.map(usize::from),
            align_months: self.align_months.then_some(true),
            two_up: self.two_up.then_some(true),
            templates: self.templates,
            ..PlannerConfig::default()
        };

        Ok(file.overridden_by(flags))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            plan,
            output,
            converter,
            open,
        } => cmd_generate(plan, output, converter, open),
        Commands::Outline { plan } => cmd_outline(plan),
        Commands::Templates { config, templates } => cmd_templates(config, templates),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the -v flags
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn load_catalog(config: &PlannerConfig) -> anyhow::Result<DirectoryCatalog> {
    let dir = config.template_dir();
    DirectoryCatalog::load(&dir).with_context(|| format!("loading templates from {}", dir.display()))
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Render the planner
fn cmd_generate(
    plan: PlanArgs,
    output: Option<PathBuf>,
    converter: Option<String>,
    open: bool,
) -> anyhow::Result<()> {
    let config = plan.resolve()?.overridden_by(PlannerConfig {
        output,
        converter: converter.map(ConverterCommand::with_program),
        ..PlannerConfig::default()
    });

    let options = config.planner_options()?;
    let output = config.output_path(options.year);
    let catalog = load_catalog(&config)?;

    eprintln!(
        "Generating {} planner (weeks start {}{})...",
        options.year,
        options.week_start,
        if options.reorder { ", booklet order" } else { "" }
    );

    let renderer = CommandRenderer::new(config.converter());
    let report = Planner::new(options, &catalog)
        .generate(&renderer, &output)
        .context("planner generation failed")?;

    eprintln!(
        "Planner created at: {} ({} planner pages on {} PDF pages, {} blank fillers)",
        report.output.display(),
        report.physical_pages,
        report.output_pages,
        report.filler_pages
    );

    if open {
        open_file(&report.output)?;
    }

    Ok(())
}

/// Print the physical page order
fn cmd_outline(plan: PlanArgs) -> anyhow::Result<()> {
    let config = plan.resolve()?;
    let options = config.planner_options()?;
    let catalog = load_catalog(&config)?;

    let planned = Planner::new(options, &catalog).plan()?;

    match &planned.imposition {
        Some(imposition) => {
            for side in imposition.sides() {
                println!(
                    "sheet {:>3} {:<5}  {}  |  {}",
                    side.sheet + 1,
                    side.side,
                    describe(side.left),
                    describe(side.right)
                );
            }
        }
        None => {
            for page in &planned.reading_order {
                println!("{}", describe(page));
            }
        }
    }

    println!(
        "{} pages in reading order, {} in the document",
        planned.logical_count(),
        planned.physical_count()
    );
    Ok(())
}

fn describe(page: &Page) -> String {
    match page.unit {
        Some(unit) => format!("p{:<4} {:<18} {}", page.logical_position + 1, page.template, unit),
        None => format!("p{:<4} {:<18} filler", page.logical_position + 1, page.template),
    }
}

/// Check the template directory against the template family
fn cmd_templates(config: Option<PathBuf>, templates: Option<PathBuf>) -> anyhow::Result<()> {
    let file = match &config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    let config = file.overridden_by(PlannerConfig {
        templates,
        ..PlannerConfig::default()
    });

    let catalog = load_catalog(&config)?;
    let missing = catalog.missing();
    if !missing.is_empty() {
        bail!(
            "{} is missing templates: {}",
            catalog.root().display(),
            missing.join(", ")
        );
    }

    println!("All templates present in {}", catalog.root().display());
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let pages = paper_planner::pdf::count_pages(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", pages);

    Ok(())
}
