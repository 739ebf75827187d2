use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

use super::decode_pdf_string;

/// One entry of a document's outline, flattened in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// 1 for top-level entries.
    pub level: u32,
    pub title: String,
    /// Physical, 1-indexed target page.
    pub page: u32,
}

impl Bookmark {
    pub fn new(level: u32, title: impl Into<String>, page: u32) -> Self {
        Bookmark {
            level,
            title: title.into(),
            page,
        }
    }
}

/// Read the outline of a loaded document. Entries whose destination cannot
/// be resolved to a page are dropped.
pub fn read_bookmarks(doc: &Document) -> Result<Vec<Bookmark>> {
    let catalog = doc
        .catalog()
        .with_context(|| "Failed to get document catalog")?;

    let outlines_ref = match catalog.get(b"Outlines") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let outlines = match doc.get_dictionary(outlines_ref) {
        Ok(d) => d,
        _ => return Ok(Vec::new()),
    };

    let first_ref = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let page_map = build_page_map(doc);
    let mut bookmarks = Vec::new();
    let mut visited = HashSet::new();
    walk_outline(doc, first_ref, &page_map, 1, &mut visited, &mut bookmarks);

    Ok(bookmarks)
}

fn walk_outline(
    doc: &Document,
    first_id: ObjectId,
    page_map: &[(ObjectId, u32)],
    level: u32,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<Bookmark>,
) {
    let mut current_id = Some(first_id);

    while let Some(id) = current_id {
        // Broken files sometimes link outline items in a cycle.
        if !visited.insert(id) {
            break;
        }

        let dict = match doc.get_dictionary(id) {
            Ok(d) => d,
            Err(_) => break,
        };

        let title = match dict.get(b"Title") {
            Ok(Object::String(bytes, _)) => decode_pdf_string(bytes).trim().to_string(),
            _ => "Untitled".to_string(),
        };

        match get_destination_page(doc, dict, page_map) {
            Some(page) => out.push(Bookmark { level, title, page }),
            None => debug!(title = %title, "Skipping bookmark without a resolvable page"),
        }

        if let Ok(Object::Reference(child_ref)) = dict.get(b"First") {
            walk_outline(doc, *child_ref, page_map, level + 1, visited, out);
        }

        current_id = match dict.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }
}

fn get_destination_page(
    doc: &Document,
    dict: &lopdf::Dictionary,
    page_map: &[(ObjectId, u32)],
) -> Option<u32> {
    if let Ok(dest) = dict.get(b"Dest") {
        return resolve_destination(doc, dest, page_map);
    }

    let action = match dict.get(b"A") {
        Ok(Object::Reference(action_ref)) => doc.get_dictionary(*action_ref).ok(),
        Ok(Object::Dictionary(action_dict)) => Some(action_dict),
        _ => None,
    }?;

    match action.get(b"S") {
        Ok(Object::Name(action_type)) if action_type == b"GoTo" => {
            let dest = action.get(b"D").ok()?;
            resolve_destination(doc, dest, page_map)
        }
        _ => None,
    }
}

fn resolve_destination(doc: &Document, dest: &Object, page_map: &[(ObjectId, u32)]) -> Option<u32> {
    match dest {
        Object::String(name, _) | Object::Name(name) => {
            resolve_named_destination(doc, name, page_map)
        }
        Object::Array(arr) => get_page_from_dest_array(arr, page_map),
        Object::Reference(r) => match doc.get_object(*r) {
            // A referenced destination may be a dictionary wrapping the array in /D.
            Ok(Object::Dictionary(d)) => d
                .get(b"D")
                .ok()
                .and_then(|inner| resolve_destination(doc, inner, page_map)),
            Ok(obj) => resolve_destination(doc, obj, page_map),
            Err(_) => None,
        },
        Object::Dictionary(d) => d
            .get(b"D")
            .ok()
            .and_then(|inner| resolve_destination(doc, inner, page_map)),
        _ => None,
    }
}

fn resolve_named_destination(
    doc: &Document,
    name: &[u8],
    page_map: &[(ObjectId, u32)],
) -> Option<u32> {
    let catalog = doc.catalog().ok()?;

    if let Ok(Object::Reference(names_ref)) = catalog.get(b"Names") {
        if let Ok(names_dict) = doc.get_dictionary(*names_ref) {
            if let Ok(Object::Reference(dests_ref)) = names_dict.get(b"Dests") {
                if let Some(page) = search_name_tree(doc, *dests_ref, name, page_map, 0) {
                    return Some(page);
                }
            }
        }
    }

    // Older files keep a plain /Dests dictionary in the catalog.
    if let Ok(Object::Reference(dests_ref)) = catalog.get(b"Dests") {
        if let Ok(dests_dict) = doc.get_dictionary(*dests_ref) {
            if let Ok(dest) = dests_dict.get(name) {
                return resolve_destination(doc, dest, page_map);
            }
        }
    }

    None
}

const MAX_NAME_TREE_DEPTH: usize = 32;

fn search_name_tree(
    doc: &Document,
    node_id: ObjectId,
    name: &[u8],
    page_map: &[(ObjectId, u32)],
    depth: usize,
) -> Option<u32> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }
    let dict = doc.get_dictionary(node_id).ok()?;

    if let Ok(Object::Array(names)) = dict.get(b"Names") {
        for chunk in names.chunks(2) {
            if let [Object::String(key, _), value] = chunk {
                if key == name {
                    return resolve_destination(doc, value, page_map);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid_ref) = kid {
                if let Some(page) = search_name_tree(doc, *kid_ref, name, page_map, depth + 1) {
                    return Some(page);
                }
            }
        }
    }

    None
}

fn get_page_from_dest_array(arr: &[Object], page_map: &[(ObjectId, u32)]) -> Option<u32> {
    // [page_ref /XYZ left top zoom] or similar
    match arr.first() {
        Some(Object::Reference(page_ref)) => page_map
            .iter()
            .find(|(id, _)| id == page_ref)
            .map(|(_, page_num)| *page_num),
        _ => None,
    }
}

fn build_page_map(doc: &Document) -> Vec<(ObjectId, u32)> {
    let mut pages: Vec<_> = doc.get_pages().into_iter().collect();
    pages.sort_by_key(|(num, _)| *num);
    pages.into_iter().map(|(num, id)| (id, num)).collect()
}
