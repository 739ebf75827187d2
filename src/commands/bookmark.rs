use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::chapters::ChapterRange;
use crate::cli::ResolveArgs;
use crate::pdf::{Bookmark, PdfDocument};

pub async fn run(args: &ResolveArgs, output_dir: Option<&Path>) -> Result<()> {
    let input = args.path.as_path();
    super::validate_input(input)?;

    let config = super::heuristics(args)?;
    let oracle = super::oracle(args)?;

    let mut doc = PdfDocument::open(input)?;
    let chapters = super::resolve_chapters(&doc, &oracle, &config).await?;

    let output_path = bookmarked_path(input, output_dir)?;

    println!("Adding {} chapter bookmark(s)", chapters.len());
    doc.set_bookmarks(&chapter_bookmarks(&chapters))?;
    PdfDocument::save(&mut doc.doc, &output_path)?;

    println!("Created bookmarked PDF: {}", output_path.display());

    Ok(())
}

/// `<stem>_bookmarked.pdf` in the requested directory (created if needed) or next to the input.
fn bookmarked_path(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let file_name = format!("{}_bookmarked.pdf", stem);

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            Ok(dir.join(file_name))
        }
        None => Ok(input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(file_name)),
    }
}

fn chapter_bookmarks(chapters: &[ChapterRange]) -> Vec<Bookmark> {
    chapters
        .iter()
        .map(|chapter| Bookmark::new(1, chapter.title.clone(), chapter.start_page))
        .collect()
}
