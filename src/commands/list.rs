use anyhow::Result;
use std::path::Path;

use crate::ai::prompt::format_bookmarks;
use crate::chapters::TocLocator;
use crate::config::HeuristicsConfig;
use crate::pdf::text::head_chars;
use crate::pdf::PdfDocument;

const TOC_PREVIEW_CHARS: usize = 5000;

pub fn run<P: AsRef<Path>>(path: P, config: Option<&Path>) -> Result<()> {
    let path = path.as_ref();
    super::validate_input(path)?;

    let doc = PdfDocument::open(path)?;
    let bookmarks = doc.bookmarks()?;

    if !bookmarks.is_empty() {
        println!("Found {} bookmarks", bookmarks.len());
        println!();
        println!("Bookmark structure:");
        println!("{}", format_bookmarks(&bookmarks));
        return Ok(());
    }

    println!("No bookmarks found, looking for a Table of Contents...");
    let config = HeuristicsConfig::load(config)?;
    let pages = doc.page_text()?;
    let toc = TocLocator::new(&config.toc).locate(&pages);

    if !toc.is_found() {
        println!("No table of contents found.");
        return Ok(());
    }

    println!();
    println!("TOC text extracted starting from PDF page {}:", toc.start_page);
    println!("{}", head_chars(&toc.text, TOC_PREVIEW_CHARS));

    Ok(())
}
