use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::path::Path;

use super::outline::{read_bookmarks, Bookmark};
use super::text::{extract_page_text, PageText};
use super::encode_pdf_string;

/// An open PDF. The handle is held for one pipeline run and dropped with it.
pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
    // Raw file contents; text is extracted from these.
    bytes: Vec<u8>,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read PDF: {}", path_str))?;
        let doc = Document::load_mem(&bytes)
            .with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
            bytes,
        })
    }

    /// Per-page text. Fails for documents with no text layer at all.
    pub fn page_text(&self) -> Result<PageText> {
        let pages = extract_page_text(&self.bytes)
            .with_context(|| format!("Failed to read text of {}", self.path))?;
        if pages.is_empty() || !pages.has_text() {
            anyhow::bail!(
                "No extractable text in {} (scanned PDFs need OCR first)",
                self.path
            );
        }
        Ok(pages)
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        read_bookmarks(&self.doc)
            .with_context(|| format!("Failed to read bookmarks from {}", self.path))
    }

    /// Copy the inclusive, 1-indexed page span `start..=end` into a new document.
    ///
    /// The source outline is dropped from the copy since most of its targets
    /// would point at removed pages.
    pub fn extract_range(&self, start: u32, end: u32) -> Result<Document> {
        let total = self.page_count();
        if start == 0 || start > end || end > total {
            anyhow::bail!(
                "Page range {}-{} is out of range (1-{})",
                start,
                end,
                total
            );
        }

        let mut new_doc = self.doc.clone();
        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .into_iter()
            .map(|(num, _)| num)
            .filter(|num| *num < start || *num > end)
            .collect();

        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        if let Ok(catalog) = new_doc.catalog_mut() {
            catalog.remove(b"Outlines");
        }
        new_doc.prune_objects();

        Ok(new_doc)
    }

    /// Replace the document outline with `entries`.
    ///
    /// Nesting follows `level`: an entry becomes a child of the closest
    /// preceding entry with a smaller level.
    pub fn set_bookmarks(&mut self, entries: &[Bookmark]) -> Result<()> {
        let page_ids = self.page_ids();
        let total = page_ids.len() as u32;

        let mut parents: Vec<Option<usize>> = Vec::with_capacity(entries.len());
        let mut stack: Vec<usize> = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.page == 0 || entry.page > total {
                anyhow::bail!(
                    "Bookmark '{}' targets page {} which is out of range (1-{})",
                    entry.title,
                    entry.page,
                    total
                );
            }
            while stack.last().is_some_and(|&top| entries[top].level >= entry.level) {
                stack.pop();
            }
            parents.push(stack.last().copied());
            stack.push(i);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
        let mut roots: Vec<usize> = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }

        let outlines_id = self.doc.new_object_id();
        let item_ids: Vec<ObjectId> = entries.iter().map(|_| self.doc.new_object_id()).collect();

        for (i, entry) in entries.iter().enumerate() {
            let page_id = page_ids[(entry.page - 1) as usize].1;
            let parent_id = parents[i].map_or(outlines_id, |p| item_ids[p]);
            let siblings = parents[i].map_or(&roots, |p| &children[p]);

            let mut item = dictionary! {
                "Title" => encode_pdf_string(&entry.title),
                "Parent" => parent_id,
                "Dest" => vec![Object::Reference(page_id), Object::Name(b"Fit".to_vec())],
            };

            if let Some(pos) = siblings.iter().position(|&s| s == i) {
                if pos > 0 {
                    item.set("Prev", item_ids[siblings[pos - 1]]);
                }
                if let Some(&next) = siblings.get(pos + 1) {
                    item.set("Next", item_ids[next]);
                }
            }

            if let (Some(&first), Some(&last)) = (children[i].first(), children[i].last()) {
                item.set("First", item_ids[first]);
                item.set("Last", item_ids[last]);
                // Negative count: children start collapsed.
                item.set("Count", -(children[i].len() as i64));
            }

            self.doc.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let mut outlines = dictionary! {
            "Type" => "Outlines",
            "Count" => roots.len() as i64,
        };
        if let (Some(&first), Some(&last)) = (roots.first(), roots.last()) {
            outlines.set("First", item_ids[first]);
            outlines.set("Last", item_ids[last]);
        }
        self.doc
            .objects
            .insert(outlines_id, Object::Dictionary(outlines));

        let catalog = self
            .doc
            .catalog_mut()
            .with_context(|| "Failed to get document catalog")?;
        catalog.set("Outlines", outlines_id);
        catalog.set("PageMode", "UseOutlines");

        // Drop whatever the previous outline left behind.
        self.doc.prune_objects();

        Ok(())
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.compress();
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}
