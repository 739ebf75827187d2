pub mod openai;
pub mod prompt;
pub mod response;

pub use openai::OpenAiOracle;

use async_trait::async_trait;

use crate::chapters::TocEntry;
use crate::error::Result;
use crate::pdf::Bookmark;

/// The black-box model the resolution pipelines consult.
#[async_trait]
pub trait ChapterOracle: Send + Sync {
    /// Pick the primary chapter titles out of a bookmark table, in document order.
    async fn classify(&self, bookmarks: &[Bookmark]) -> Result<Vec<String>>;

    /// Read chapter titles and printed page numbers out of TOC text.
    async fn parse_toc(&self, toc_text: &str) -> Result<Vec<TocEntry>>;
}
