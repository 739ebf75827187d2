use regex::Regex;
use std::sync::LazyLock;

const MAX_FILENAME_CHARS: usize = 100;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Make a chapter title or document stem safe to use as a file name.
pub fn sanitize_filename(name: &str) -> String {
    let stripped = INVALID_CHARS.replace_all(name, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let trimmed = collapsed.trim();

    if trimmed.chars().count() <= MAX_FILENAME_CHARS {
        return trimmed.to_string();
    }

    // Truncation can expose a trailing space; trim again so the result is a fixed point.
    let truncated: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();
    truncated.trim_end().to_string()
}
