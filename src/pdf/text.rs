use anyhow::{Context, Result};

/// Raw extracted text of every page of one document, in physical order.
///
/// Internally 0-indexed; the accessors that take a page number are 1-indexed
/// like everything else that reports pages.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        PageText { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether any page carries non-whitespace text. Scanned PDFs without a
    /// text layer come back as pages of blanks.
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|text| !text.trim().is_empty())
    }

    /// Text of a 1-indexed physical page, if it exists.
    pub fn page(&self, page: u32) -> Option<&str> {
        let index = (page as usize).checked_sub(1)?;
        self.pages.get(index).map(String::as_str)
    }

    /// `(1-indexed page number, text)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, text)| ((i + 1) as u32, text.as_str()))
    }
}

/// Extract the text of every page of an in-memory PDF
pub fn extract_page_text(bytes: &[u8]) -> Result<PageText> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .context("Failed to extract text from PDF")?;
    Ok(PageText::new(pages))
}

/// First `n` characters of `text`, never splitting a character.
pub fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
