pub mod bookmark;
pub mod list;
pub mod split;

use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::ai::{ChapterOracle, OpenAiOracle};
use crate::chapters::{pipeline, ChapterRange};
use crate::cli::ResolveArgs;
use crate::config::HeuristicsConfig;
use crate::pdf::PdfDocument;

pub fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("File must be a PDF: {}", path.display());
    }
    Ok(())
}

fn heuristics(args: &ResolveArgs) -> Result<HeuristicsConfig> {
    let mut config = HeuristicsConfig::load(args.config.as_deref())?;
    config.per_chapter_offsets |= args.locate_chapters;
    Ok(config)
}

fn oracle(args: &ResolveArgs) -> Result<OpenAiOracle> {
    Ok(OpenAiOracle::new(
        &args.api_url,
        args.api_key.clone(),
        args.model.clone(),
    )?)
}

/// Resolve chapter ranges from the bookmarks if there are any, otherwise
/// from the printed table of contents.
pub async fn resolve_chapters(
    doc: &PdfDocument,
    oracle: &dyn ChapterOracle,
    config: &HeuristicsConfig,
) -> Result<Vec<ChapterRange>> {
    let bookmarks = doc.bookmarks()?;
    let total_pages = doc.page_count();

    let chapters = if bookmarks.is_empty() {
        info!("No bookmarks found, attempting to extract chapters from Table of Contents");
        let pages = doc.page_text()?;
        pipeline::from_toc(oracle, &pages, total_pages, config).await?
    } else {
        info!("Found {} bookmarks", bookmarks.len());
        pipeline::from_bookmarks(oracle, &bookmarks, total_pages).await?
    };

    Ok(chapters)
}
