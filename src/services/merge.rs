use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::AppError;

/// Concatenate the pages of `documents` into one PDF.
///
/// Pages appear in the order the documents were supplied, and within each
/// document in its own page order. Bookmarks and outlines are dropped; the
/// result is a plain page concatenation.
pub fn merge_documents(mut documents: Vec<Document>) -> Result<Document, AppError> {
    if documents.is_empty() {
        return Err(AppError::BadRequest("No documents to merge".to_string()));
    }

    // Renumber every source so all object ids fit one shared table.
    let mut max_id = 1;
    let mut ordered_pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for doc in documents.iter_mut() {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by 1-based page number, so iterating the map
        // in key order preserves the document's page order.
        let pages = doc.get_pages();
        for (_, page_id) in pages {
            let page = doc.get_object(page_id)?.to_owned();
            ordered_pages.push((page_id, page));
        }

        objects.extend(doc.objects.clone());
    }

    let mut merged = Document::with_version("1.5");

    // Carry everything except the structural objects, which are rebuilt.
    let mut pages_node: Option<(ObjectId, Dictionary)> = None;
    let mut catalog_node: Option<(ObjectId, Dictionary)> = None;

    for (object_id, object) in objects {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" => {
                if catalog_node.is_none() {
                    if let Ok(dict) = object.as_dict() {
                        catalog_node = Some((object_id, dict.clone()));
                    }
                }
            }
            b"Pages" => {
                if let Ok(dict) = object.as_dict() {
                    match &mut pages_node {
                        Some((_, existing)) => existing.extend(dict),
                        None => pages_node = Some((object_id, dict.clone())),
                    }
                }
            }
            b"Page" => {} // re-inserted below with a patched /Parent
            b"Outlines" | b"Outline" => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let (pages_id, mut pages_dict) = pages_node
        .ok_or_else(|| AppError::Conversion("Merged document has no page tree".to_string()))?;
    let (catalog_id, mut catalog_dict) = catalog_node
        .ok_or_else(|| AppError::Conversion("Merged document has no catalog".to_string()))?;

    for (page_id, page) in &ordered_pages {
        if let Ok(dict) = page.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            merged.objects.insert(*page_id, Object::Dictionary(dict));
        }
    }

    pages_dict.set("Count", ordered_pages.len() as u32);
    pages_dict.set(
        "Kids",
        ordered_pages
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    catalog_dict.set("Pages", pages_id);
    catalog_dict.remove(b"Outlines");
    merged
        .objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();

    tracing::debug!(
        pages = ordered_pages.len(),
        "Merged {} documents",
        documents.len()
    );

    Ok(merged)
}
