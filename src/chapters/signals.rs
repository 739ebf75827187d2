use regex::Regex;
use std::sync::LazyLock;

/// Section numbering such as `1.1`, `2.3` or `3.2.1`.
static SECTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\.\d+(?:\.\d+)?\b").unwrap());

/// A short standalone number, the way trailing page numbers appear in a TOC.
static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\d{1,3}(?:\s|$)").unwrap());

const TOC_KEYWORDS: [&str; 6] = [
    "chapter",
    "preface",
    "introduction",
    "appendix",
    "index",
    "exercises",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub section_numbers: usize,
    pub page_numbers: usize,
    /// Number of distinct TOC keywords present.
    pub keywords: usize,
    pub has_contents_header: bool,
}

impl PageSignals {
    pub fn scan(text: &str) -> Self {
        let lower = text.to_lowercase();

        PageSignals {
            section_numbers: SECTION_NUMBER.find_iter(text).count(),
            page_numbers: PAGE_NUMBER.find_iter(text).count(),
            keywords: TOC_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count(),
            // "table of contents" contains "contents"
            has_contents_header: lower.contains("contents"),
        }
    }
}
