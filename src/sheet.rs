//! Two-up A4 sheets
//!
//! Places pairs of A5 pages side by side on landscape A4 sheets, with short
//! cut marks on the centre line, so a booklet prints on a printer without
//! duplex or imposition support. Every two consecutive physical pages make
//! one sheet side; for imposed pages these are exactly
//! [`Imposition::sides`](crate::impose::Imposition::sides). Filler pages leave
//! their slot empty.

use log::{debug, info};

use crate::catalog::TemplateCatalog;
use crate::error::{Error, Result};
use crate::render::fill_page;
use crate::sequence::Page;

/// Sheet size in millimetres (A4 landscape)
pub const SHEET_WIDTH_MM: f64 = 297.0;
pub const SHEET_HEIGHT_MM: f64 = 210.0;

/// Cut mark stroke width in millimetres
const CUT_MARK_WIDTH: f64 = 0.5;

/// Vertical extent of the two cut marks on the centre line
const CUT_MARK_SPANS: [(&str, &str); 2] = [("9%", "10%"), ("90%", "91%")];

/// Area of the sheet a page is scaled into, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Left half of the sheet
pub const LEFT_SLOT: Slot = Slot {
    x: 5.5,
    y: 5.0,
    width: 135.0,
    height: 200.0,
};

/// Right half of the sheet
pub const RIGHT_SLOT: Slot = Slot {
    x: 156.5,
    y: 5.0,
    width: 135.0,
    height: 200.0,
};

/// Fill in `pages` and pair them onto sheet sides
///
/// Returns one SVG document per sheet side. An odd last page gets an empty
/// right slot.
pub fn compose_two_up<C>(pages: &[Page], catalog: &C) -> Result<Vec<String>>
where
    C: TemplateCatalog + ?Sized,
{
    let sides = pages
        .chunks(2)
        .enumerate()
        .map(|(side, pair)| {
            let left = fill_slot(pair.first(), catalog)?;
            let right = fill_slot(pair.get(1), catalog)?;
            debug!(
                "sheet side {}: {:?} | {:?}",
                side,
                pair.first().map(|p| p.logical_position),
                pair.get(1).map(|p| p.logical_position)
            );
            sheet_side(side, left.as_deref(), right.as_deref())
        })
        .collect::<Result<Vec<_>>>()?;

    info!("composed {} pages onto {} sheet sides", pages.len(), sides.len());
    Ok(sides)
}

fn fill_slot<C>(page: Option<&Page>, catalog: &C) -> Result<Option<String>>
where
    C: TemplateCatalog + ?Sized,
{
    match page {
        Some(page) if !page.is_filler() => fill_page(page, catalog).map(Some),
        _ => Ok(None),
    }
}

/// One A4 sheet side holding up to two pages
///
/// `side` is the index of the sheet side in the output, used in errors.
pub fn sheet_side(side: usize, left: Option<&str>, right: Option<&str>) -> Result<String> {
    let mut svg = format!(
        "<svg version=\"1.1\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\" \
         xmlns=\"http://www.w3.org/2000/svg\">\n",
        w = SHEET_WIDTH_MM,
        h = SHEET_HEIGHT_MM
    );

    for (markup, slot) in [(left, LEFT_SLOT), (right, RIGHT_SLOT)] {
        if let Some(markup) = markup {
            svg.push_str(&place(side, markup, &slot)?);
            svg.push('\n');
        }
    }

    for (from, to) in CUT_MARK_SPANS {
        svg.push_str(&format!(
            "<line x1=\"50%\" x2=\"50%\" y1=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"{}\"/>\n",
            from, to, CUT_MARK_WIDTH
        ));
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Nest a page's root `<svg>` element into `slot`
///
/// The XML prolog is dropped and the root's own position and size are
/// replaced, so the page scales into the slot through its `viewBox`.
fn place(side: usize, markup: &str, slot: &Slot) -> Result<String> {
    let no_root = || Error::Render {
        page_index: side,
        message: "page template has no <svg> root element".to_string(),
    };

    let start = markup.find("<svg").ok_or_else(no_root)?;
    let root = &markup[start..];
    let tag_end = root.find('>').ok_or_else(no_root)?;
    let (tag, rest) = root.split_at(tag_end);

    Ok(format!(
        "<svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}{}",
        slot.x,
        slot.y,
        slot.width,
        slot.height,
        strip_attributes(&tag["<svg".len()..], &["x", "y", "width", "height"]),
        rest.trim_end()
    ))
}

/// Drop the named attributes from the inside of a start tag
fn strip_attributes(attributes: &str, names: &[&str]) -> String {
    let mut kept = String::new();
    let mut rest = attributes;

    while let Some((attribute, tail)) = next_attribute(rest) {
        let name = attribute.split('=').next().unwrap_or_default().trim();
        if !names.contains(&name) {
            kept.push(' ');
            kept.push_str(attribute.trim());
        }
        rest = tail;
    }

    // Whatever follows the last attribute, e.g. the `/` of `<svg/>`
    kept.push_str(rest.trim());
    kept
}

/// Split the first `name="value"` attribute off `s`
fn next_attribute(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let equals = s.find('=')?;
    let value = s[equals + 1..].trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let close = value[1..].find(quote)?;
    let end = (s.len() - value.len()) + close + 2;
    Some((&s[..end], &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, TemplateId};
    use crate::sequence::{sequence, BoundPage, PageUnit};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn pages(n: u32) -> Vec<Page> {
        sequence(
            (1..=n)
                .map(|d| BoundPage {
                    unit: PageUnit::Day(d),
                    template: TemplateId::Day,
                    substitutions: [("{DAY}".to_string(), d.to_string())]
                        .into_iter()
                        .collect::<BTreeMap<_, _>>(),
                })
                .collect(),
        )
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with(
                TemplateId::Day,
                "<?xml version=\"1.0\"?>\n<svg width=\"148mm\" height='210mm' viewBox=\"0 0 148 210\"><text>day {DAY}</text></svg>\n",
            )
            .with(TemplateId::Blank, "<svg/>")
    }

    #[test]
    fn test_place_replaces_root_geometry() {
        let placed = place(
            0,
            "<?xml version=\"1.0\"?><svg x=\"1\" width=\"148mm\" height='210mm' id=\"page\"><g/></svg>",
            &LEFT_SLOT,
        )
        .unwrap();
        assert_eq!(
            placed,
            "<svg x=\"5.5\" y=\"5\" width=\"135\" height=\"200\" id=\"page\"><g/></svg>"
        );
    }

    #[test]
    fn test_place_self_closing_root() {
        let placed = place(0, "<svg/>", &RIGHT_SLOT).unwrap();
        assert_eq!(placed, "<svg x=\"156.5\" y=\"5\" width=\"135\" height=\"200\"/>");
    }

    #[test]
    fn test_place_without_root() {
        let err = place(3, "<html/>", &LEFT_SLOT).unwrap_err();
        assert!(matches!(err, Error::Render { page_index: 3, .. }));
    }

    #[test]
    fn test_strip_keeps_other_attributes() {
        let kept = strip_attributes(
            " xmlns=\"http://www.w3.org/2000/svg\" width=\"1\" stroke-width=\"2\" viewBox = \"0 0 1 1\"",
            &["width"],
        );
        assert_eq!(
            kept,
            " xmlns=\"http://www.w3.org/2000/svg\" stroke-width=\"2\" viewBox = \"0 0 1 1\""
        );
    }

    #[test]
    fn test_two_up_pairs_pages() {
        let sides = compose_two_up(&pages(4), &catalog()).unwrap();
        assert_eq!(sides.len(), 2);

        let first = &sides[0];
        assert!(first.starts_with("<svg version=\"1.1\" width=\"297mm\" height=\"210mm\""));
        assert!(!first.contains("<?xml"));
        assert!(first.contains("<svg x=\"5.5\" y=\"5\" width=\"135\" height=\"200\" viewBox=\"0 0 148 210\"><text>day 1</text>"));
        assert!(first.contains("<svg x=\"156.5\" y=\"5\" width=\"135\" height=\"200\" viewBox=\"0 0 148 210\"><text>day 2</text>"));
        assert_eq!(first.matches("<line").count(), 2);
        assert!(sides[1].contains("day 3") && sides[1].contains("day 4"));
    }

    #[test]
    fn test_two_up_leaves_fillers_empty() {
        let mut padded = pages(2);
        padded.push(Page::filler(2));
        padded.push(Page::filler(3));
        // A trailing odd page gets an empty right slot as well
        padded.extend(pages(1).into_iter().map(|mut p| {
            p.logical_position = 4;
            p
        }));

        let sides = compose_two_up(&padded, &catalog()).unwrap();
        assert_eq!(sides.len(), 3);
        assert_eq!(sides[1].matches("<svg x=").count(), 0);
        assert_eq!(sides[2].matches("<svg x=").count(), 1);
        assert!(sides[2].contains("<svg x=\"5.5\""));
    }

    #[test]
    fn test_two_up_missing_template() {
        let catalog = InMemoryCatalog::new();
        let err = compose_two_up(&pages(2), &catalog).unwrap_err();
        assert!(matches!(err, Error::MissingTemplate(_)));
    }
}
