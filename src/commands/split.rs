use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::chapters::ChapterRange;
use crate::cli::ResolveArgs;
use crate::filename::sanitize_filename;
use crate::pdf::PdfDocument;

pub async fn run(args: &ResolveArgs, output_dir: Option<&Path>) -> Result<()> {
    let input = args.path.as_path();
    super::validate_input(input)?;

    let config = super::heuristics(args)?;
    let oracle = super::oracle(args)?;

    let doc = PdfDocument::open(input)?;
    let chapters = super::resolve_chapters(&doc, &oracle, &config).await?;

    let output_dir = chapter_dir(input, output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
    println!("Output directory: {}", output_dir.display());

    let written = write_chapters(&doc, &chapters, &output_dir)?;

    println!(
        "Split {} chapter(s) into {}",
        written.len(),
        output_dir.display()
    );

    Ok(())
}

/// `<base>/<sanitized stem>`, where base is the requested directory or the input's folder.
fn chapter_dir(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chapters");

    let base = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    base.join(sanitize_filename(stem))
}

fn chapter_file_name(index: usize, chapter: &ChapterRange) -> String {
    format!("{:02}_{}.pdf", index, sanitize_filename(&chapter.title))
}

fn write_chapters(
    doc: &PdfDocument,
    chapters: &[ChapterRange],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(chapters.len());

    for (i, chapter) in chapters.iter().enumerate() {
        let file_name = chapter_file_name(i + 1, chapter);
        let output_path = output_dir.join(&file_name);

        let mut new_doc = doc.extract_range(chapter.start_page, chapter.end_page)?;
        PdfDocument::save(&mut new_doc, &output_path)?;

        println!(
            "  Created: {} (pages {}-{}, {} page(s))",
            file_name,
            chapter.start_page,
            chapter.end_page,
            chapter.page_count()
        );
        written.push(output_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::blank_document;

    fn chapter(title: &str, start_page: u32, end_page: u32) -> ChapterRange {
        ChapterRange {
            title: title.to_string(),
            start_page,
            end_page,
        }
    }

    #[test]
    fn test_chapter_file_names() {
        assert_eq!(
            chapter_file_name(3, &chapter("Chapter 3: Why/How?", 1, 2)),
            "03_Chapter 3 WhyHow.pdf"
        );
        assert_eq!(chapter_file_name(12, &chapter("x", 1, 1)), "12_x.pdf");
    }

    #[test]
    fn test_chapter_dir_defaults_next_to_input() {
        assert_eq!(
            chapter_dir(Path::new("/books/My: Book.pdf"), None),
            PathBuf::from("/books/My Book")
        );
        assert_eq!(
            chapter_dir(Path::new("/books/a.pdf"), Some(Path::new("/out"))),
            PathBuf::from("/out/a")
        );
    }

    #[test]
    fn test_write_chapters() {
        let doc = blank_document(10);
        let dir = tempfile::tempdir().unwrap();
        let chapters = vec![chapter("One", 1, 4), chapter("Two", 5, 10)];

        let written = write_chapters(&doc, &chapters, dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("01_One.pdf"));
        let second = PdfDocument::open(&written[1]).unwrap();
        assert_eq!(second.page_count(), 6);
    }
}
