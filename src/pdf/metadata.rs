//! PDF page counting

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let malformed = |what: &str| Error::MalformedPdf(format!("missing or invalid {}", what));

    let catalog_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return Err(malformed("Root")),
    };

    let pages_id = match doc.get_dictionary(catalog_id)?.get(b"Pages") {
        Ok(Object::Reference(id)) => *id,
        _ => return Err(malformed("Pages")),
    };

    match doc.get_dictionary(pages_id)?.get(b"Count") {
        Ok(Object::Integer(n)) => Ok(*n as usize),
        _ => Err(malformed("Count")),
    }
}

/// Count the pages of an in-memory PDF
pub fn count_pages_in(bytes: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(bytes)?;
    count_pages_from_catalog(&doc)
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = Document::load(path)?;
    count_pages_from_catalog(&doc)
}
