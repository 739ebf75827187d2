use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

use crate::chapters::TocEntry;
use crate::pdf::Bookmark;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());

/// The contents of the first fenced code block, or the whole reply when there is none.
pub fn unfence(reply: &str) -> &str {
    let reply = reply.trim();
    if !reply.contains("```") {
        return reply;
    }
    FENCED_BLOCK
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map_or(reply, |m| m.as_str())
}

/// Chapter titles from a classifier reply.
///
/// A JSON array is taken as is. Anything else falls back to scanning the
/// reply line by line for lines that name a known bookmark exactly.
pub fn parse_titles(reply: &str, bookmarks: &[Bookmark]) -> Vec<String> {
    let body = unfence(reply);

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) {
        return items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
    }

    warn!("Could not parse AI response as JSON, attempting fallback extraction");
    body.lines()
        .map(|line| {
            line.trim()
                .trim_matches('-')
                .trim_matches('*')
                .trim_matches('"')
                .trim()
        })
        .filter(|line| !line.is_empty() && bookmarks.iter().any(|bm| bm.title == *line))
        .map(str::to_string)
        .collect()
}

/// TOC entries from a parser reply. Unusable replies give an empty list.
pub fn parse_toc_entries(reply: &str) -> Vec<TocEntry> {
    let body = unfence(reply);

    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Could not parse AI response as JSON");
            return Vec::new();
        }
    };

    let entries: Result<Vec<TocEntry>, String> = items.iter().map(toc_entry).collect();
    entries.unwrap_or_else(|e| {
        warn!(error = %e, "Could not parse AI response as JSON");
        Vec::new()
    })
}

fn toc_entry(item: &Value) -> Result<TocEntry, String> {
    let Value::Object(fields) = item else {
        return Err(format!("expected an object, got {}", item));
    };

    let title = match fields.get("title") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let toc_page = match fields.get("toc_page") {
        None => 0,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| format!("invalid page number {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid page number {:?}", s))?,
        Some(other) => return Err(format!("invalid page number {}", other)),
    };

    Ok(TocEntry { title, toc_page })
}
