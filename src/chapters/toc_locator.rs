use tracing::debug;

use super::signals::PageSignals;
use crate::config::TocThresholds;
use crate::pdf::PageText;

/// Where the locator is in its single pass over the leading pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Searching,
    Collecting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedToc {
    /// Collected pages, each prefixed with its page label. Empty when no TOC was found.
    pub text: String,
    /// 1-indexed physical page where the TOC starts; 1 when nothing was found.
    pub start_page: u32,
    pub page_count: usize,
}

impl LocatedToc {
    pub fn is_found(&self) -> bool {
        !self.text.is_empty()
    }
}

pub struct TocLocator<'a> {
    thresholds: &'a TocThresholds,
}

impl<'a> TocLocator<'a> {
    pub fn new(thresholds: &'a TocThresholds) -> Self {
        TocLocator { thresholds }
    }

    /// Strong evidence that a page is part of a TOC.
    pub fn is_toc_page(&self, signals: &PageSignals) -> bool {
        let t = self.thresholds;
        signals.has_contents_header
            || (signals.section_numbers >= t.sections_with_page_numbers
                && signals.page_numbers >= t.min_page_numbers)
            || (signals.keywords >= t.keywords_with_page_numbers
                && signals.page_numbers >= t.min_page_numbers)
            || signals.section_numbers >= t.sections_alone
    }

    /// Weaker evidence, only consulted once a TOC has started.
    fn is_continuation(&self, signals: &PageSignals) -> bool {
        signals.section_numbers >= self.thresholds.continuation_sections
            || signals.page_numbers >= self.thresholds.continuation_page_numbers
    }

    pub fn locate(&self, pages: &PageText) -> LocatedToc {
        self.locate_within(pages, self.thresholds.max_pages_to_scan)
    }

    pub fn locate_within(&self, pages: &PageText, max_pages_to_scan: usize) -> LocatedToc {
        let mut state = ScanState::Searching;
        let mut start_page = None;
        let mut collected: Vec<String> = Vec::new();

        for (page_num, text) in pages.iter().take(max_pages_to_scan) {
            let signals = PageSignals::scan(text);

            state = match state {
                ScanState::Searching if self.is_toc_page(&signals) => {
                    debug!(page = page_num, ?signals, "TOC starts");
                    start_page = Some(page_num);
                    collected.push(label_page(page_num, text));
                    ScanState::Collecting
                }
                ScanState::Searching => ScanState::Searching,
                ScanState::Collecting if collected.len() >= self.thresholds.max_collected_pages => {
                    ScanState::Done
                }
                ScanState::Collecting
                    if self.is_toc_page(&signals)
                        || self.is_continuation(&signals)
                        || collected.len() < self.thresholds.min_collected_pages =>
                {
                    collected.push(label_page(page_num, text));
                    ScanState::Collecting
                }
                ScanState::Collecting => {
                    debug!(page = page_num, ?signals, "TOC ends");
                    ScanState::Done
                }
                ScanState::Done => ScanState::Done,
            };

            if state == ScanState::Done {
                break;
            }
        }

        LocatedToc {
            text: collected.join("\n\n"),
            start_page: start_page.unwrap_or(1),
            page_count: collected.len(),
        }
    }
}

fn label_page(page_num: u32, text: &str) -> String {
    format!("=== PDF Page {} ===\n{}", page_num, text)
}
