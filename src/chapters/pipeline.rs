use tracing::{debug, info};

use super::ranges::{self, ChapterRange};
use super::{ChapterLocator, OffsetResolver, TocEntry, TocLocator};
use crate::ai::ChapterOracle;
use crate::config::HeuristicsConfig;
use crate::error::{ChapterError, Result};
use crate::pdf::{Bookmark, PageText};

/// Ask the oracle which bookmarks are primary chapters and build their ranges.
pub async fn from_bookmarks(
    oracle: &dyn ChapterOracle,
    bookmarks: &[Bookmark],
    total_pages: u32,
) -> Result<Vec<ChapterRange>> {
    info!("Analyzing {} bookmarks to identify primary chapters", bookmarks.len());
    let titles = oracle.classify(bookmarks).await?;
    if titles.is_empty() {
        return Err(ChapterError::NoChapters);
    }

    info!("Identified {} primary chapters", titles.len());
    for title in &titles {
        info!("  - {}", title);
    }

    non_empty(ranges::from_bookmarks(bookmarks, &titles, total_pages))
}

/// Locate the printed TOC, have the oracle read it, then map printed page
/// numbers onto physical pages.
pub async fn from_toc(
    oracle: &dyn ChapterOracle,
    pages: &PageText,
    total_pages: u32,
    config: &HeuristicsConfig,
) -> Result<Vec<ChapterRange>> {
    let toc = TocLocator::new(&config.toc).locate(pages);
    if !toc.is_found() {
        return Err(ChapterError::TocNotFound);
    }
    info!(
        "Found TOC starting on PDF page {} ({} pages)",
        toc.start_page, toc.page_count
    );

    info!("Analyzing TOC to identify chapters and page numbers");
    let entries = oracle.parse_toc(&toc.text).await?;
    if entries.is_empty() {
        return Err(ChapterError::NoChapters);
    }

    info!("Identified {} primary chapters from TOC", entries.len());
    for entry in &entries {
        info!("  - {} (TOC page {})", entry.title, entry.toc_page);
    }

    info!("Calculating page offset");
    let offset = OffsetResolver::new(&config.offset).resolve(pages, &entries, total_pages);

    let chapters = if config.per_chapter_offsets {
        let starts = located_starts(pages, &entries, offset, total_pages, config);
        ranges::from_starts(&entries, &starts, total_pages)
    } else {
        ranges::from_toc(&entries, offset, total_pages)
    };

    non_empty(chapters)
}

/// Physical start page for each entry: where the chapter locator finds its
/// heading, or the printed page shifted by the global offset.
fn located_starts(
    pages: &PageText,
    entries: &[TocEntry],
    offset: i64,
    total_pages: u32,
    config: &HeuristicsConfig,
) -> Vec<i64> {
    let locator = ChapterLocator::new(&config.chapter);

    entries
        .iter()
        .map(|entry| {
            let estimate = entry.toc_page.saturating_add(offset);
            // Front matter only ever pushes chapters later, never earlier.
            let first = entry.toc_page.max(config.chapter.window_start as i64);
            let last = entry
                .toc_page
                .saturating_add(config.offset.search_span)
                .min(total_pages as i64);

            let located = match (u32::try_from(first), u32::try_from(last)) {
                (Ok(first), Ok(last)) if first <= last => {
                    locator.locate_within(pages, &entry.title, first, last)
                }
                _ => None,
            };

            match located {
                Some(page) => {
                    debug!(title = %entry.title, page, estimate, "Using located chapter start");
                    page as i64
                }
                None => estimate,
            }
        })
        .collect()
}

fn non_empty(chapters: Vec<ChapterRange>) -> Result<Vec<ChapterRange>> {
    if chapters.is_empty() {
        Err(ChapterError::EmptyResult)
    } else {
        Ok(chapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Replays canned answers instead of calling a model.
    struct StubOracle {
        titles: Vec<String>,
        entries: Vec<TocEntry>,
    }

    impl StubOracle {
        fn titles(titles: &[&str]) -> Self {
            StubOracle {
                titles: titles.iter().map(|t| t.to_string()).collect(),
                entries: Vec::new(),
            }
        }

        fn toc(entries: &[(&str, i64)]) -> Self {
            StubOracle {
                titles: Vec::new(),
                entries: entries
                    .iter()
                    .map(|(title, toc_page)| TocEntry {
                        title: title.to_string(),
                        toc_page: *toc_page,
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ChapterOracle for StubOracle {
        async fn classify(&self, _bookmarks: &[Bookmark]) -> Result<Vec<String>> {
            Ok(self.titles.clone())
        }

        async fn parse_toc(&self, _toc_text: &str) -> Result<Vec<TocEntry>> {
            Ok(self.entries.clone())
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl ChapterOracle for FailingOracle {
        async fn classify(&self, _bookmarks: &[Bookmark]) -> Result<Vec<String>> {
            Err(ChapterError::Api {
                status: 503,
                body: "overloaded".into(),
            })
        }

        async fn parse_toc(&self, _toc_text: &str) -> Result<Vec<TocEntry>> {
            Err(ChapterError::MalformedResponse("No choices in response".into()))
        }
    }

    const BODY: &str = "Ordinary prose without any structure worth noting.";
    const TOC: &str = "Contents\nPreface vii\n1 Intro 1\n1.1 Scope 2\n2 Methods 20\n2.1 Data 21";

    /// 80 pages: TOC on page 3, chapter openings on 17 and 36 (offset 16).
    fn textbook() -> PageText {
        let mut pages = vec![BODY.to_string(); 80];
        pages[2] = TOC.to_string();
        pages[16] = "Chapter 1\nIntro".to_string();
        pages[35] = "Chapter 2\nMethods".to_string();
        PageText::new(pages)
    }

    fn range(title: &str, start_page: u32, end_page: u32) -> ChapterRange {
        ChapterRange {
            title: title.to_string(),
            start_page,
            end_page,
        }
    }

    #[tokio::test]
    async fn test_bookmark_pipeline() {
        let bookmarks = vec![
            Bookmark::new(1, "Preface", 1),
            Bookmark::new(1, "A", 3),
            Bookmark::new(2, "A.1", 4),
            Bookmark::new(1, "B", 10),
        ];
        let oracle = StubOracle::titles(&["A", "B"]);

        let chapters = from_bookmarks(&oracle, &bookmarks, 20).await.unwrap();
        assert_eq!(chapters, vec![range("A", 3, 9), range("B", 10, 20)]);
    }

    #[tokio::test]
    async fn test_bookmark_pipeline_skips_unknown_title() {
        let bookmarks = vec![Bookmark::new(1, "A", 1), Bookmark::new(1, "B", 10)];
        let oracle = StubOracle::titles(&["A", "Missing", "B"]);

        let chapters = from_bookmarks(&oracle, &bookmarks, 20).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "A");
        assert_eq!(chapters[1].title, "B");
    }

    #[tokio::test]
    async fn test_bookmark_pipeline_without_titles_fails() {
        let bookmarks = vec![Bookmark::new(1, "A", 1)];
        let err = from_bookmarks(&StubOracle::titles(&[]), &bookmarks, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterError::NoChapters));
    }

    #[tokio::test]
    async fn test_bookmark_pipeline_with_no_resolvable_titles_fails() {
        let bookmarks = vec![Bookmark::new(1, "A", 1)];
        let err = from_bookmarks(&StubOracle::titles(&["Nope"]), &bookmarks, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterError::EmptyResult));
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let bookmarks = vec![Bookmark::new(1, "A", 1)];
        let err = from_bookmarks(&FailingOracle, &bookmarks, 5).await.unwrap_err();
        assert!(matches!(err, ChapterError::Api { status: 503, .. }));

        let config = HeuristicsConfig::default();
        let err = from_toc(&FailingOracle, &textbook(), 80, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_toc_pipeline() {
        let oracle = StubOracle::toc(&[("1 Intro", 1), ("2 Methods", 20)]);
        let config = HeuristicsConfig::default();

        let chapters = from_toc(&oracle, &textbook(), 80, &config).await.unwrap();
        assert_eq!(
            chapters,
            vec![range("1 Intro", 17, 35), range("2 Methods", 36, 80)]
        );
    }

    #[tokio::test]
    async fn test_toc_pipeline_without_toc_fails() {
        let pages = PageText::new(vec![BODY.to_string(); 30]);
        let oracle = StubOracle::toc(&[("1 Intro", 1)]);
        let config = HeuristicsConfig::default();

        let err = from_toc(&oracle, &pages, 30, &config).await.unwrap_err();
        assert!(matches!(err, ChapterError::TocNotFound));
    }

    #[tokio::test]
    async fn test_toc_pipeline_with_unparsed_toc_fails() {
        let config = HeuristicsConfig::default();
        let err = from_toc(&StubOracle::toc(&[]), &textbook(), 80, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ChapterError::NoChapters));
    }

    #[tokio::test]
    async fn test_per_chapter_offsets_follow_located_headings() {
        // Chapter 2 sits two pages later than the global offset predicts.
        let mut pages = vec![BODY.to_string(); 80];
        pages[2] = TOC.to_string();
        pages[16] = "Chapter 1\nIntro".to_string();
        pages[37] = "Chapter 2\nMethods".to_string();
        let pages = PageText::new(pages);
        let oracle = StubOracle::toc(&[("1 Intro", 1), ("2 Methods", 20), ("3 Results", 50)]);

        let mut config = HeuristicsConfig::default();
        let global = from_toc(&oracle, &pages, 80, &config).await.unwrap();
        assert_eq!(global[1], range("2 Methods", 36, 65));

        config.per_chapter_offsets = true;
        let located = from_toc(&oracle, &pages, 80, &config).await.unwrap();
        assert_eq!(
            located,
            vec![
                range("1 Intro", 17, 37),
                range("2 Methods", 38, 65),
                range("3 Results", 66, 80),
            ]
        );
    }
}
