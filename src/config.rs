use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Tunable thresholds for the page-range resolution heuristics.
///
/// Every field has a default, so a missing file or a partial file is fine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub toc: TocThresholds,
    pub chapter: ChapterSearch,
    pub offset: OffsetSearch,
    /// Use the chapter locator to pin each TOC chapter to its own page
    /// instead of relying only on the global offset.
    pub per_chapter_offsets: bool,
}

/// Thresholds used by the TOC locator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TocThresholds {
    /// Only the first this-many pages are scanned for a TOC.
    pub max_pages_to_scan: usize,
    /// Section numbers needed when paired with enough page-number tokens.
    pub sections_with_page_numbers: usize,
    /// Keyword hits needed when paired with enough page-number tokens.
    pub keywords_with_page_numbers: usize,
    /// Page-number tokens needed for either paired rule.
    pub min_page_numbers: usize,
    /// Section numbers that classify a page on their own.
    pub sections_alone: usize,
    /// Weaker continuation rule once collecting.
    pub continuation_sections: usize,
    pub continuation_page_numbers: usize,
    /// Pages are kept unconditionally until this many have been collected.
    pub min_collected_pages: usize,
    /// Hard cap on collected pages.
    pub max_collected_pages: usize,
}

impl Default for TocThresholds {
    fn default() -> Self {
        TocThresholds {
            max_pages_to_scan: 20,
            sections_with_page_numbers: 3,
            keywords_with_page_numbers: 2,
            min_page_numbers: 5,
            sections_alone: 5,
            continuation_sections: 2,
            continuation_page_numbers: 3,
            min_collected_pages: 3,
            max_collected_pages: 15,
        }
    }
}

/// Search window and text limits for the chapter locator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChapterSearch {
    /// First physical page (1-indexed) searched.
    pub window_start: u32,
    /// Last physical page (1-indexed) searched.
    pub window_end: u32,
    pub heading_chars: usize,
    pub title_words: usize,
    pub long_title_min_chars: usize,
    pub title_prefix_chars: usize,
    pub title_search_chars: usize,
}

impl Default for ChapterSearch {
    fn default() -> Self {
        ChapterSearch {
            window_start: 10,
            window_end: 100,
            heading_chars: 800,
            title_words: 4,
            long_title_min_chars: 10,
            title_prefix_chars: 40,
            title_search_chars: 500,
        }
    }
}

/// Sampling parameters for the offset resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OffsetSearch {
    /// How many leading TOC entries are sampled.
    pub sample_chapters: usize,
    /// Pages before this one (1-indexed) are never searched; skips front matter.
    pub min_search_page: i64,
    /// How far past the printed page number the search extends.
    pub search_span: i64,
    pub heading_chars: usize,
    /// Assumed front-matter length when no chapter could be located.
    pub fallback_offset: i64,
}

impl Default for OffsetSearch {
    fn default() -> Self {
        OffsetSearch {
            sample_chapters: 5,
            min_search_page: 10,
            search_span: 50,
            heading_chars: 1000,
            fallback_offset: 16,
        }
    }
}

impl HeuristicsConfig {
    /// Load defaults, then an optional file, then `PDF_CHAPTERS__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("PDF_CHAPTERS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to load heuristics configuration")?;
        config
            .try_deserialize()
            .context("Invalid heuristics configuration")
    }
}
