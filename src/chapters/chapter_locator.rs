use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::ChapterSearch;
use crate::pdf::text::head_chars;
use crate::pdf::PageText;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s+").unwrap());
static CHAPTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:chapter\s*)?\d*\.?\s*").unwrap());

/// Markers that show a title mention is a chapter opening rather than body text.
static OPENING_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)chapter\s+outline|learning\s+outcome|introduction").unwrap()
});
static LONG_TITLE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter\s+outline|figure\s+\d|learning").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingMatch {
    Number,
    TitleWords,
    LongTitle,
}

/// Patterns derived from one chapter title, built once and tried on every page.
#[derive(Debug)]
struct ChapterPatterns {
    number: Option<String>,
    number_heading: Option<Regex>,
    title_words: Option<Regex>,
    clean_title: String,
}

impl ChapterPatterns {
    fn new(title: &str, search: &ChapterSearch) -> Self {
        let number = LEADING_NUMBER
            .captures(title)
            .map(|caps| caps[1].to_string());
        let number_heading = number
            .as_ref()
            .and_then(|n| Regex::new(&format!(r"(?i)^Chapter\s+{}\b", n)).ok());

        let clean_title = CHAPTER_PREFIX.replace(title, "").trim().to_string();
        let words: Vec<String> = clean_title
            .split_whitespace()
            .take(search.title_words)
            .map(regex::escape)
            .collect();
        let title_words = if words.is_empty() {
            None
        } else {
            RegexBuilder::new(&words.join(r"\s+"))
                .case_insensitive(true)
                .build()
                .ok()
        };

        ChapterPatterns {
            number,
            number_heading,
            title_words,
            clean_title,
        }
    }

    fn match_heading(&self, block: &str, search: &ChapterSearch) -> Option<HeadingMatch> {
        if let Some(number) = &self.number {
            let starts_with_chapter = self
                .number_heading
                .as_ref()
                .is_some_and(|re| re.is_match(block));
            let mut lines = block.split('\n');
            let first_line = lines.next().unwrap_or("").trim();
            let heading_line = lines.next().is_some()
                && (first_line == format!("Chapter {}", number) || first_line == number);

            if starts_with_chapter || heading_line {
                return Some(HeadingMatch::Number);
            }
        }

        if let Some(words) = &self.title_words {
            if words.is_match(block) && OPENING_MARKERS.is_match(block) {
                return Some(HeadingMatch::TitleWords);
            }
        }

        if self.clean_title.chars().count() > search.long_title_min_chars {
            let prefix = head_chars(&self.clean_title, search.title_prefix_chars).to_lowercase();
            let top = head_chars(block, search.title_search_chars).to_lowercase();
            if top.contains(&prefix) && LONG_TITLE_MARKERS.is_match(block) {
                return Some(HeadingMatch::LongTitle);
            }
        }

        None
    }
}

pub struct ChapterLocator<'a> {
    search: &'a ChapterSearch,
}

impl<'a> ChapterLocator<'a> {
    pub fn new(search: &'a ChapterSearch) -> Self {
        ChapterLocator { search }
    }

    /// Search the configured window for the page where `chapter_title` begins.
    pub fn locate(&self, pages: &PageText, chapter_title: &str) -> Option<u32> {
        self.locate_within(
            pages,
            chapter_title,
            self.search.window_start,
            self.search.window_end,
        )
    }

    /// Search physical pages `first..=last` (1-indexed, clipped to the document).
    pub fn locate_within(
        &self,
        pages: &PageText,
        chapter_title: &str,
        first: u32,
        last: u32,
    ) -> Option<u32> {
        let patterns = ChapterPatterns::new(chapter_title, self.search);
        let last = last.min(pages.len() as u32);

        for page_num in first.max(1)..=last {
            let Some(text) = pages.page(page_num) else {
                break;
            };
            let block = head_chars(text, self.search.heading_chars).trim();

            if let Some(how) = patterns.match_heading(block, self.search) {
                debug!(title = chapter_title, page = page_num, ?how, "Chapter located");
                return Some(page_num);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "Body text about something else entirely, with no headings at all.";

    /// A document whose page `at` (1-indexed) holds `text` and every other page is body text.
    fn doc_with(total: usize, at: usize, text: &str) -> PageText {
        let mut pages = vec![BODY.to_string(); total];
        pages[at - 1] = text.to_string();
        PageText::new(pages)
    }

    fn locate(pages: &PageText, title: &str) -> Option<u32> {
        let search = ChapterSearch::default();
        ChapterLocator::new(&search).locate(pages, title)
    }

    #[test]
    fn test_chapter_number_heading() {
        let pages = doc_with(40, 23, "Chapter 3\nKinematics\nIn this chapter...");
        assert_eq!(locate(&pages, "3 Kinematics"), Some(23));
    }

    #[test]
    fn test_chapter_prefix_is_case_insensitive() {
        let pages = doc_with(40, 15, "CHAPTER 2 Methods and materials");
        assert_eq!(locate(&pages, "2 Methods"), Some(15));
    }

    #[test]
    fn test_bare_number_first_line() {
        let pages = doc_with(40, 30, "  4  \nThermodynamics\nHeat flows...");
        assert_eq!(locate(&pages, "4 Thermodynamics"), Some(30));
    }

    #[test]
    fn test_number_heading_does_not_match_larger_number() {
        let pages = doc_with(40, 20, "Chapter 12\nOptics");
        assert_eq!(locate(&pages, "1 Optics"), None);
    }

    #[test]
    fn test_title_words_need_opening_marker() {
        let without_marker = doc_with(40, 18, "We now discuss Cell Biology Basics in detail.");
        assert_eq!(locate(&without_marker, "Cell Biology Basics"), None);

        let with_marker = doc_with(
            40,
            18,
            "Cell  Biology\nBasics\nChapter Outline\n5.1 The cell",
        );
        assert_eq!(locate(&with_marker, "Cell Biology Basics"), Some(18));
    }

    #[test]
    fn test_long_title_prefix_with_figure_marker() {
        let title = "7. Electromagnetic Induction and Waves";
        // No opening marker, so only the long-title rule can match.
        let page = "electromagnetic induction and waves\nFigure 7.1 A generator";
        let pages = doc_with(60, 44, page);
        assert_eq!(locate(&pages, title), Some(44));
    }

    #[test]
    fn test_pages_outside_window_are_ignored() {
        let early = doc_with(40, 5, "Chapter 1\nIntroduction");
        assert_eq!(locate(&early, "1 Introduction"), None);

        let search = ChapterSearch::default();
        let late = doc_with(150, 120, "Chapter 9\nEpilogue");
        assert_eq!(ChapterLocator::new(&search).locate(&late, "9 Epilogue"), None);
        assert_eq!(
            ChapterLocator::new(&search).locate_within(&late, "9 Epilogue", 100, 150),
            Some(120)
        );
    }

    #[test]
    fn test_first_match_wins() {
        let mut pages = vec![BODY.to_string(); 40];
        pages[11] = "Chapter 2\nMotion".to_string();
        pages[25] = "Chapter 2\nMotion".to_string();
        assert_eq!(locate(&PageText::new(pages), "2 Motion"), Some(12));
    }
}
