use crate::pdf::Bookmark;

pub const CLASSIFY_SYSTEM: &str = "You are a helpful assistant that analyzes document structures. Always respond with valid JSON only.";

pub const PARSE_TOC_SYSTEM: &str = "You are a helpful assistant that parses document structures. Always respond with valid JSON only.";

/// Render bookmarks one per line, indented two spaces per level below the top.
pub fn format_bookmarks(bookmarks: &[Bookmark]) -> String {
    bookmarks
        .iter()
        .map(|bm| {
            let indent = "  ".repeat(bm.level.saturating_sub(1) as usize);
            format!("{}[Level {}] {} (Page {})", indent, bm.level, bm.title, bm.page)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn classify_prompt(bookmarks: &[Bookmark]) -> String {
    format!(
        r#"Analyze the following PDF bookmark structure and identify ONLY the primary/main chapters.

Rules:
1. Focus on top-level chapters (typically level 1 or 2 bookmarks)
2. Ignore sub-sections, appendices, index, table of contents, preface, acknowledgments, and similar front/back matter
3. Return ONLY the main content chapters that a reader would consider the core material
4. Return the chapter titles EXACTLY as they appear in the bookmark list
5. Return your answer as a JSON array of strings containing the exact chapter titles

Bookmark structure:
{}

Return ONLY a valid JSON array of chapter titles, nothing else. Example format:
["Chapter 1: Introduction", "Chapter 2: Getting Started", "Chapter 3: Advanced Topics"]"#,
        format_bookmarks(bookmarks)
    )
}

pub fn parse_toc_prompt(toc_text: &str) -> String {
    format!(
        r#"Analyze the following Table of Contents extracted from a PDF and identify the PRIMARY/MAIN chapters.

Rules:
1. Focus on main chapters only (numbered chapters like "1 Introduction", "Chapter 2: Methods", etc.)
2. Ignore sub-sections, appendices, index, preface, acknowledgments, bibliography, and similar front/back matter
3. For each chapter, extract the chapter title and its page number as shown in the TOC
4. The page numbers in the TOC are the BOOK's page numbers, not PDF page numbers
5. Return as a JSON array of objects with "title" and "toc_page" fields

TOC Text:
{}

Return ONLY a valid JSON array. Example format:
[{{"title": "1 Introduction", "toc_page": 1}}, {{"title": "2 Linear Algebra", "toc_page": 31}}]"#,
        toc_text
    )
}
