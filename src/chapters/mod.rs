pub mod chapter_locator;
pub mod offset;
pub mod pipeline;
pub mod ranges;
pub mod signals;
pub mod toc_locator;

pub use chapter_locator::ChapterLocator;
pub use offset::OffsetResolver;
pub use ranges::ChapterRange;
pub use toc_locator::TocLocator;

/// A chapter as listed in the printed TOC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    /// Page number as printed in the book, not a physical page.
    pub toc_page: i64,
}
