//! Integration tests for the planner pipeline

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;

use lopdf::{dictionary, Document, Object, Stream};
use paper_planner::catalog::{DirectoryCatalog, InMemoryCatalog, TemplateCatalog, TemplateId};
use paper_planner::config::PlannerConfig;
use paper_planner::date::WeekStart;
use paper_planner::pdf::{count_pages, merge_bytes};
use paper_planner::planner::{Planner, PlannerOptions};
use paper_planner::render::Renderer;
use paper_planner::sequence::PageUnit;
use paper_planner::Error;
use tempfile::TempDir;

/// Template whose rendered text identifies the page it was bound for
fn template_for(id: TemplateId) -> String {
    let body = match id {
        TemplateId::Cover => "cover {YEAR}",
        TemplateId::Notes => "notes {PAGE}",
        TemplateId::Blank => "blank",
        TemplateId::MonthSummary(_) => "month {MONTH} p{PAGE} w{FIRST_WEEK_PAGE}",
        TemplateId::Week => "week {WEEK_NUMBER} p{PAGE} m{MONTH_PAGE} d{DAY7_PAGE}",
        TemplateId::Day | TemplateId::DayMonthStart | TemplateId::DayMonthEnd => {
            "day {DATE} p{PAGE} w{WEEK_PAGE} m{MONTH_PAGE}"
        }
    };
    format!("<svg><text>{}</text></svg>", body)
}

fn full_catalog() -> InMemoryCatalog {
    TemplateId::ALL
        .iter()
        .fold(InMemoryCatalog::new(), |catalog, id| {
            catalog.with(*id, template_for(*id))
        })
}

fn one_page_pdf(markup: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, markup.as_bytes().to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 420.into(), 595.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Renders each page to a one-page PDF in process and records the markup
#[derive(Default)]
struct FakeRenderer {
    fail_at: Option<usize>,
    seen: RefCell<Vec<String>>,
}

impl Renderer for FakeRenderer {
    fn render(&self, pages: &[String]) -> paper_planner::Result<Vec<u8>> {
        let mut rendered = Vec::with_capacity(pages.len());
        for (page_index, markup) in pages.iter().enumerate() {
            if self.fail_at == Some(page_index) {
                return Err(Error::Render {
                    page_index,
                    message: "converter crashed".to_string(),
                });
            }
            rendered.push(one_page_pdf(markup));
        }
        *self.seen.borrow_mut() = pages.to_vec();
        merge_bytes(&rendered)
    }
}

/// Pull the number printed after `prefix` out of rendered markup
fn number_after(markup: &str, prefix: &str) -> Option<usize> {
    let start = markup.find(prefix)? + prefix.len();
    let digits: String = markup[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[test]
fn test_generate_reading_order() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("planner_2023.pdf");
    let catalog = full_catalog();
    let renderer = FakeRenderer::default();

    let report = Planner::new(PlannerOptions::new(2023), &catalog)
        .generate(&renderer, &output)
        .unwrap();

    // 12 month overviews, 52 weeks, 365 days, cover and notes
    assert_eq!(report.logical_pages, 431);
    assert_eq!(report.physical_pages, 431);
    assert_eq!(report.output_pages, 431);
    assert_eq!(report.filler_pages, 0);
    assert_eq!(count_pages(&output).unwrap(), 431);

    let seen = renderer.seen.borrow();
    assert!(seen[0].contains("cover 2023"));
    assert!(seen[1].contains("month JANUARY p2"));
    // 1 January 2023 is a Sunday and belongs to week 52 of 2022, which has
    // no page here
    assert!(seen[2].contains("day 2023-01-01 p3 w m2"));
    assert!(seen[3].contains("week 1 p4 m2 d11"));
    assert!(seen[4].contains("day 2023-01-02 p5 w4 m2"));
    assert!(seen[430].contains("notes 431"));
}

#[test]
fn test_reorder_permutes_same_pages() {
    let catalog = full_catalog();
    let plain = Planner::new(PlannerOptions::new(2024), &catalog)
        .plan()
        .unwrap();

    for sheets in [1, 3, 8] {
        let options = PlannerOptions {
            reorder: true,
            sheets_per_signature: sheets,
            ..PlannerOptions::new(2024)
        };
        let planned = Planner::new(options, &catalog).plan().unwrap();
        let imposition = planned.imposition.as_ref().unwrap();

        assert_eq!(planned.physical_count() % 4, 0);
        assert!(planned.physical_count() - planned.logical_count() < 4);

        let mut logical: Vec<usize> = imposition
            .pages
            .iter()
            .map(|page| page.logical_position)
            .collect();
        logical.sort_unstable();
        assert_eq!(logical, (0..planned.physical_count()).collect::<Vec<_>>());

        let units: HashSet<PageUnit> = imposition.pages.iter().filter_map(|p| p.unit).collect();
        let expected: HashSet<PageUnit> = plain.reading_order.iter().filter_map(|p| p.unit).collect();
        assert_eq!(units, expected);
    }
}

#[test]
fn test_cross_references_survive_imposition() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("booklet.pdf");
    let catalog = full_catalog();
    let renderer = FakeRenderer::default();
    let options = PlannerOptions {
        week_start: WeekStart::Sunday,
        reorder: true,
        ..PlannerOptions::new(2024)
    };

    let planner = Planner::new(options, &catalog);
    let planned = planner.plan().unwrap();
    planner.generate(&renderer, &output).unwrap();

    let seen = renderer.seen.borrow();
    assert_eq!(seen.len(), planned.physical_count());

    // Printed page numbers refer to reading-order positions
    let reading = &planned.reading_order;
    for (markup, page) in seen.iter().zip(planned.physical_pages()) {
        if let Some(number) = number_after(markup, " p") {
            assert_eq!(number, page.logical_position + 1);
        }
        for (prefix, check) in [(" w", "week "), (" m", "month "), (" d", "day ")] {
            if let Some(target) = number_after(markup, prefix) {
                let referenced = &reading[target - 1];
                assert!(!referenced.is_filler());
                assert!(
                    referenced.unit.unwrap().to_string().starts_with(check),
                    "{} points at {:?}",
                    markup,
                    referenced.unit
                );
            }
        }
    }
}

#[test]
fn test_render_failure_leaves_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("planner.pdf");
    let catalog = full_catalog();
    let renderer = FakeRenderer {
        fail_at: Some(17),
        ..FakeRenderer::default()
    };

    let err = Planner::new(PlannerOptions::new(2023), &catalog)
        .generate(&renderer, &output)
        .unwrap_err();

    assert!(matches!(err, Error::Render { page_index: 17, .. }));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_template_aborts_before_rendering() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("planner.pdf");
    let mut catalog = InMemoryCatalog::new();
    for id in TemplateId::ALL {
        if id != TemplateId::DayMonthEnd {
            catalog.insert(id.name(), template_for(id));
        }
    }
    let renderer = FakeRenderer::default();

    let err = Planner::new(PlannerOptions::new(2023), &catalog)
        .generate(&renderer, &output)
        .unwrap_err();

    assert!(matches!(err, Error::MissingTemplate(ref name) if name == "day_month_end"));
    assert!(renderer.seen.borrow().is_empty());
    assert!(!output.exists());
}

#[test]
fn test_invalid_year() {
    let catalog = full_catalog();
    for year in [1582, 10_000, -4] {
        let result = Planner::new(PlannerOptions::new(year), &catalog).plan();
        assert!(matches!(result, Err(Error::InvalidYear(y)) if y == year));
    }
}

#[test]
fn test_aligned_months_from_directory() {
    let temp_dir = TempDir::new().unwrap();
    let templates = temp_dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    for id in TemplateId::ALL {
        fs::write(templates.join(format!("{}.svg", id.name())), template_for(id)).unwrap();
    }

    let catalog = DirectoryCatalog::load(&templates).unwrap();
    assert!(catalog.missing().is_empty());

    let config = PlannerConfig::from_toml_str(&format!(
        "year = 2025\nalign_months = true\ntemplates = {:?}\n",
        templates.display().to_string()
    ))
    .unwrap();
    assert_eq!(config.template_dir(), templates);

    let planned = Planner::new(config.planner_options().unwrap(), &catalog)
        .plan()
        .unwrap();

    for page in &planned.reading_order {
        if let Some(PageUnit::MonthOverview(_)) = page.unit {
            assert_eq!(page.logical_position % 2, 0);
        }
    }
    let spacers = planned
        .reading_order
        .iter()
        .filter(|page| page.unit == Some(PageUnit::Spacer))
        .count();
    assert_eq!(
        planned.logical_count(),
        12 + planned.calendar.numbered_weeks().count() + 365 + 2 + spacers
    );
}

#[test]
fn test_two_up_booklet_sheets() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("two_up.pdf");
    let catalog = full_catalog();
    let renderer = FakeRenderer::default();
    let options = PlannerOptions {
        reorder: true,
        two_up: true,
        ..PlannerOptions::new(2023)
    };

    let planner = Planner::new(options, &catalog);
    let planned = planner.plan().unwrap();
    let report = planner.generate(&renderer, &output).unwrap();

    assert_eq!(planned.physical_count(), 432);
    assert_eq!(report.output_pages, 216);
    assert_eq!(count_pages(&output).unwrap(), 216);

    let seen = renderer.seen.borrow();
    assert_eq!(seen.len(), planned.physical_count() / 2);

    // Each rendered side holds the pages of one imposed sheet side
    let imposition = planned.imposition.as_ref().unwrap();
    for (markup, side) in seen.iter().zip(imposition.sides()) {
        assert!(markup.contains("width=\"297mm\""));
        let placed = [side.left, side.right]
            .iter()
            .filter(|page| !page.is_filler())
            .count();
        assert_eq!(markup.matches("<svg x=").count(), placed);
    }

    // The single filler pads the last signature and leaves its slot empty
    assert_eq!(report.filler_pages, 1);
    let with_filler = imposition
        .sides()
        .position(|side| side.left.is_filler() || side.right.is_filler())
        .unwrap();
    assert_eq!(seen[with_filler].matches("<svg x=").count(), 1);
}

#[test]
fn test_bad_signature_size_from_config() {
    let config = PlannerConfig::from_toml_str("year = 2024\nreorder = true\nsheets_per_signature = 0\n")
        .unwrap();
    assert!(matches!(config.planner_options(), Err(Error::Config(_))));

    let options = PlannerOptions {
        reorder: true,
        sheets_per_signature: usize::MAX,
        ..PlannerOptions::new(2024)
    };
    let result = Planner::new(options, &full_catalog()).plan();
    assert!(matches!(result, Err(Error::Config(_))));
}
