use std::collections::HashMap;
use tracing::warn;

use super::TocEntry;
use crate::pdf::Bookmark;

/// A validated chapter span: `1 <= start_page <= end_page <= total_pages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRange {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl ChapterRange {
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

/// Ranges for the classifier-selected `titles`, started at their bookmarks.
///
/// Titles missing from the bookmarks are skipped with a warning and the
/// preceding chapter then runs up to the next title that does resolve.
pub fn from_bookmarks(
    bookmarks: &[Bookmark],
    titles: &[String],
    total_pages: u32,
) -> Vec<ChapterRange> {
    let mut by_title: HashMap<&str, &Bookmark> = HashMap::new();
    for bookmark in bookmarks {
        by_title.entry(bookmark.title.as_str()).or_insert(bookmark);
    }

    let mut ranges = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        let Some(bookmark) = by_title.get(title.as_str()) else {
            warn!(title = %title, "Chapter not found in bookmarks");
            continue;
        };

        let start = bookmark.page as i64;
        let end = titles[i + 1..]
            .iter()
            .find_map(|next| by_title.get(next.as_str()))
            .map_or(total_pages as i64, |next| next.page as i64 - 1);

        match validated(title, start, end, total_pages as i64) {
            Some(range) => ranges.push(range),
            None => warn!(title = %title, start, end, "Dropping invalid chapter range"),
        }
    }

    ranges
}

/// Ranges for TOC entries shifted by one global offset.
pub fn from_toc(entries: &[TocEntry], offset: i64, total_pages: u32) -> Vec<ChapterRange> {
    let starts: Vec<i64> = entries
        .iter()
        .map(|e| e.toc_page.saturating_add(offset))
        .collect();
    from_starts(entries, &starts, total_pages)
}

/// Ranges for TOC entries whose physical start pages are already known.
/// Each chapter ends just before the next entry's start.
pub fn from_starts(entries: &[TocEntry], starts: &[i64], total_pages: u32) -> Vec<ChapterRange> {
    let total = total_pages as i64;
    let mut ranges = Vec::new();

    for (i, (entry, &start)) in entries.iter().zip(starts).enumerate() {
        let end = starts.get(i + 1).map_or(total, |next| next.saturating_sub(1));

        match validated(&entry.title, start, end, total) {
            Some(range) => ranges.push(range),
            None => warn!(
                title = %entry.title,
                start,
                end,
                total_pages,
                "Dropping invalid chapter range"
            ),
        }
    }

    ranges
}

fn validated(title: &str, start: i64, end: i64, max_end: i64) -> Option<ChapterRange> {
    if start <= 0 || start > end || end > max_end {
        return None;
    }
    Some(ChapterRange {
        title: title.to_string(),
        start_page: u32::try_from(start).ok()?,
        end_page: u32::try_from(end).ok()?,
    })
}
