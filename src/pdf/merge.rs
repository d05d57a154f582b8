//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Concatenate documents into a single PDF, keeping the given order
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use paper_planner::pdf::merge_documents;
/// use lopdf::Document;
///
/// let pages = vec![
///     Document::load("001.pdf").unwrap(),
///     Document::load("002.pdf").unwrap(),
/// ];
/// let mut merged = merge_documents(pages).expect("Failed to merge");
/// merged.save("planner.pdf").unwrap();
/// ```
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    if documents.is_empty() {
        return Err(Error::Render {
            page_index: 0,
            message: "No pages to merge".to_string(),
        });
    }

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (index, mut doc) in documents.into_iter().enumerate() {
        if doc.get_pages().is_empty() {
            return Err(Error::Render {
                page_index: index,
                message: "Converter produced a PDF without pages".to_string(),
            });
        }

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());

        objects.extend(doc.objects);
    }

    let mut merged_doc = Document::with_version("1.5");

    // Add all collected objects FIRST
    merged_doc.objects.extend(objects);

    // Otherwise new_object_id() will return IDs that collide with existing objects
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    // Update parent references for all pages
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    merged_doc.compress();
    Ok(merged_doc)
}

/// Merge PDF byte streams and serialize the result
pub fn merge_bytes(inputs: &[Vec<u8>]) -> Result<Vec<u8>> {
    let documents = inputs
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            Document::load_mem(bytes).map_err(|e| Error::Render {
                page_index: index,
                message: format!("Converter output is not a readable PDF: {}", e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut merged = merge_documents(documents)?;
    let mut out = Vec::new();
    merged.save_to(&mut out)?;
    Ok(out)
}
