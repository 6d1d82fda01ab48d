//! Ordered binary merge of PDF documents.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::{debug, instrument};

use dossier_shared::{DossierError, Result};

/// `/Type` name of a dictionary object, if it has one.
fn dict_type(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// Concatenate `parts` into one document, preserving part order exactly.
///
/// The order is a product requirement (terms, then caveats, then the
/// survey report) and page order within each part is kept. A malformed
/// part aborts the merge — a delivery document must never silently lose
/// pages.
#[instrument(skip_all, fields(parts = parts.len()))]
pub fn merge_documents(parts: &[Vec<u8>]) -> Result<Vec<u8>> {
    if parts.is_empty() {
        return Err(DossierError::Merge("no documents to merge".into()));
    }

    // Load every part, renumbering its objects past the running maximum so
    // ids stay unique across parts.
    let mut max_id = 1;
    let mut page_order: Vec<ObjectId> = Vec::new();
    let mut page_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (idx, bytes) in parts.iter().enumerate() {
        let mut doc = Document::load_mem(bytes)
            .map_err(|e| DossierError::Merge(format!("document {idx} is malformed: {e}")))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(DossierError::Merge(format!("document {idx} has no pages")));
        }

        // `get_pages` is keyed by page number, so iteration preserves the
        // part's own page order.
        for (_, object_id) in pages {
            let object = doc
                .get_object(object_id)
                .map_err(|e| DossierError::Merge(format!("document {idx}: {e}")))?
                .to_owned();
            page_order.push(object_id);
            page_objects.insert(object_id, object);
        }

        objects.extend(doc.objects);
    }

    // Rebuild a single page tree: drop the per-part catalogs and page-tree
    // roots, reusing two of their ids for the merged ones.
    let mut merged = Document::with_version("1.5");
    let mut catalog_id: Option<ObjectId> = None;
    let mut pages_root_id: Option<ObjectId> = None;

    for (object_id, object) in objects {
        match dict_type(&object) {
            Some(b"Catalog") => {
                catalog_id.get_or_insert(object_id);
            }
            Some(b"Pages") => {
                pages_root_id.get_or_insert(object_id);
            }
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let catalog_id =
        catalog_id.ok_or_else(|| DossierError::Merge("no catalog in any document".into()))?;
    let pages_root_id =
        pages_root_id.ok_or_else(|| DossierError::Merge("no page tree in any document".into()))?;

    for (object_id, object) in &page_objects {
        let mut dict = object
            .as_dict()
            .map_err(|e| DossierError::Merge(format!("page object: {e}")))?
            .clone();
        dict.set("Parent", pages_root_id);
        merged
            .objects
            .insert(*object_id, Object::Dictionary(dict));
    }

    merged.objects.insert(
        pages_root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_order.len() as u32,
            "Kids" => page_order
                .iter()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_root_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);
    merged.max_id = max_id;
    merged.renumber_objects();
    merged.compress();

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| DossierError::Merge(format!("write merged document: {e}")))?;

    debug!(pages = page_order.len(), len = out.len(), "documents merged");
    Ok(out)
}
