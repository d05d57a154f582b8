//! Booklet imposition
//!
//! Reorders a reading-order page sequence into printing order for saddle
//! folded signatures. Each physical sheet carries four logical pages, two per
//! side:
//!
//! ```text
//! Four pages, one sheet:
//!
//!   front         back
//! +---+---+     +---+---+
//! | 4 | 1 |     | 2 | 3 |
//! +---+---+     +---+---+
//! ```
//!
//! For a signature of N pages, sheet i holds (N-1-2i, 2i) on the front and
//! (2i+1, N-2-2i) on the back, left then right. Signatures follow each other;
//! the last one may hold fewer sheets than the others.

use std::fmt;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sequence::Page;

/// Logical pages printed on one physical sheet (two per side)
pub const PAGES_PER_SHEET: usize = 4;

/// Smallest multiple of [`PAGES_PER_SHEET`] holding `count` pages
pub fn padded_count(count: usize) -> usize {
    count.div_ceil(PAGES_PER_SHEET) * PAGES_PER_SHEET
}

/// Printing order for `padded` pages
///
/// Entry `p` is the logical position printed at physical position `p`.
/// `padded` must already be a multiple of four.
pub fn booklet_order(padded: usize, sheets_per_signature: usize) -> Result<Vec<usize>> {
    if sheets_per_signature == 0 {
        return Err(Error::Imposition(
            "signatures must hold at least one sheet".to_string(),
        ));
    }
    if padded % PAGES_PER_SHEET != 0 {
        return Err(Error::Imposition(format!(
            "{} pages cannot be split into sheets of {}",
            padded, PAGES_PER_SHEET
        )));
    }

    let signature_pages = sheets_per_signature
        .checked_mul(PAGES_PER_SHEET)
        .ok_or_else(|| {
            Error::Imposition(format!(
                "{} sheets per signature is too many",
                sheets_per_signature
            ))
        })?;
    let mut order = Vec::with_capacity(padded);

    for start in (0..padded).step_by(signature_pages) {
        let n = signature_pages.min(padded - start);
        for i in 0..n / PAGES_PER_SHEET {
            // Front: outermost remaining pair, back: the pair inside it
            order.push(start + n - 1 - 2 * i);
            order.push(start + 2 * i);
            order.push(start + 2 * i + 1);
            order.push(start + n - 2 - 2 * i);
        }
    }

    Ok(order)
}

/// Inverse of a permutation: entry `l` is the position holding `l`
pub fn invert(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (position, &logical) in order.iter().enumerate() {
        inverse[logical] = position;
    }
    inverse
}

/// Rearrange `items` so that output `p` is `items[order[p]]`
///
/// Fails if `order` is not a permutation of `0..items.len()`.
pub fn permute<T>(items: Vec<T>, order: &[usize]) -> Result<Vec<T>> {
    if items.len() != order.len() {
        return Err(Error::Imposition(format!(
            "permutation covers {} positions but there are {} pages",
            order.len(),
            items.len()
        )));
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .map(|&logical| {
            slots
                .get_mut(logical)
                .and_then(Option::take)
                .ok_or_else(|| {
                    Error::Imposition(format!("logical page {} placed twice or out of range", logical))
                })
        })
        .collect()
}

/// Side of a physical sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    Front,
    Back,
}

impl fmt::Display for SheetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SheetSide::Front => "front",
            SheetSide::Back => "back",
        })
    }
}

/// Two pages printed side by side on one side of a sheet
#[derive(Debug, Clone, Copy)]
pub struct SidePlacement<'a> {
    pub sheet: usize,
    pub side: SheetSide,
    pub left: &'a Page,
    pub right: &'a Page,
}

/// Pages in physical printing order
#[derive(Debug, Clone)]
pub struct Imposition {
    /// Pages in printing order, fillers included
    pub pages: Vec<Page>,
    /// Physical position to logical position
    pub order: Vec<usize>,
    /// Page count before padding
    pub logical_count: usize,
    pub sheets_per_signature: usize,
}

impl Imposition {
    pub fn filler_count(&self) -> usize {
        self.pages.len() - self.logical_count
    }

    pub fn sheet_count(&self) -> usize {
        self.pages.len() / PAGES_PER_SHEET
    }

    /// Printing sides in order, two pages each
    pub fn sides(&self) -> impl Iterator<Item = SidePlacement<'_>> {
        self.pages.chunks(2).enumerate().map(|(i, pair)| SidePlacement {
            sheet: i / 2,
            side: if i % 2 == 0 {
                SheetSide::Front
            } else {
                SheetSide::Back
            },
            left: &pair[0],
            right: &pair[1],
        })
    }

    /// Undo the permutation, giving the padded reading order back
    pub fn into_reading_order(self) -> Result<Vec<Page>> {
        permute(self.pages, &invert(&self.order))
    }
}

/// Pad `pages` with trailing blank fillers and put them in printing order
///
/// `pages` must be in reading order with positions `0..N`. Fillers get the
/// positions after the last real page and never carry substitutions.
pub fn impose(pages: Vec<Page>, sheets_per_signature: usize) -> Result<Imposition> {
    let logical_count = pages.len();
    let padded = padded_count(logical_count);

    if let Some((i, page)) = pages
        .iter()
        .enumerate()
        .find(|(i, page)| page.logical_position != *i)
    {
        return Err(Error::Imposition(format!(
            "page at index {} has logical position {}",
            i, page.logical_position
        )));
    }

    let mut padded_pages = pages;
    if padded > logical_count {
        warn!(
            "adding {} blank filler pages to reach {} pages",
            padded - logical_count,
            padded
        );
    }
    padded_pages.extend((logical_count..padded).map(Page::filler));

    let order = booklet_order(padded, sheets_per_signature)?;
    debug!("booklet order: {:?}", order);

    let pages = permute(padded_pages, &order)?;

    info!(
        "imposed {} pages onto {} sheets ({} per signature)",
        pages.len(),
        pages.len() / PAGES_PER_SHEET,
        sheets_per_signature
    );

    Ok(Imposition {
        pages,
        order,
        logical_count,
        sheets_per_signature,
    })
}
