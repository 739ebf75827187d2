use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use super::TocEntry;
use crate::config::OffsetSearch;
use crate::pdf::text::head_chars;
use crate::pdf::PageText;

static CHAPTER_OUTLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Chapter\s+Outline").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Figure,
    Heading,
    Outline,
}

/// Per-chapter-number patterns for the three opening signals.
struct OpeningSignals {
    first_figure: Regex,
    heading: Regex,
    first_section: Regex,
}

impl OpeningSignals {
    fn new(chapter_num: usize) -> Result<Self, regex::Error> {
        Ok(OpeningSignals {
            first_figure: Regex::new(&format!(r"Figure\s+{}\.1\b", chapter_num))?,
            heading: Regex::new(&format!(r"(?i)^(?:Chapter\s+)?{}\b", chapter_num))?,
            first_section: Regex::new(&format!(r"\b{}\.1\s+\w", chapter_num))?,
        })
    }

    fn detect(&self, block: &str) -> Option<Signal> {
        if self.first_figure.is_match(block) && CHAPTER_OUTLINE.is_match(block) {
            return Some(Signal::Figure);
        }
        if self.heading.is_match(block) {
            return Some(Signal::Heading);
        }
        if CHAPTER_OUTLINE.is_match(block) && self.first_section.is_match(block) {
            return Some(Signal::Outline);
        }
        None
    }
}

pub struct OffsetResolver<'a> {
    search: &'a OffsetSearch,
}

impl<'a> OffsetResolver<'a> {
    pub fn new(search: &'a OffsetSearch) -> Self {
        OffsetResolver { search }
    }

    /// Sample the leading TOC entries and return the most common
    /// `physical_page - toc_page`, or the fallback when nothing was found.
    pub fn resolve(&self, pages: &PageText, entries: &[TocEntry], total_pages: u32) -> i64 {
        let offsets = self.sample_offsets(pages, entries, total_pages);

        match mode(&offsets) {
            Some(offset) => {
                info!(offset, samples = offsets.len(), "Using page offset");
                offset
            }
            None => {
                warn!(
                    offset = self.search.fallback_offset,
                    "Could not find chapters, using estimated offset"
                );
                self.search.fallback_offset
            }
        }
    }

    fn sample_offsets(&self, pages: &PageText, entries: &[TocEntry], total_pages: u32) -> Vec<i64> {
        let mut offsets = Vec::new();

        // Position in the TOC stands in for the chapter number.
        for (idx, entry) in entries.iter().take(self.search.sample_chapters).enumerate() {
            let chapter_num = idx + 1;
            let signals = match OpeningSignals::new(chapter_num) {
                Ok(signals) => signals,
                Err(e) => {
                    warn!(chapter = chapter_num, error = %e, "Skipping chapter, bad pattern");
                    continue;
                }
            };

            let first = self.search.min_search_page.max(entry.toc_page);
            let last = entry
                .toc_page
                .saturating_add(self.search.search_span)
                .min(total_pages as i64);

            for page_num in first..=last {
                let Some(text) = u32::try_from(page_num).ok().and_then(|p| pages.page(p)) else {
                    continue;
                };
                let block = head_chars(text, self.search.heading_chars).trim();

                if let Some(signal) = signals.detect(block) {
                    let offset = page_num.saturating_sub(entry.toc_page);
                    info!(
                        chapter = chapter_num,
                        ?signal,
                        toc_page = entry.toc_page,
                        pdf_page = page_num,
                        offset,
                        "Found chapter"
                    );
                    offsets.push(offset);
                    break;
                }
            }
        }

        offsets
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn mode(values: &[i64]) -> Option<i64> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for &value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(i64, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}
