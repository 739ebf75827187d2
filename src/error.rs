use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChapterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Could not find Table of Contents in PDF")]
    TocNotFound,

    #[error("Could not identify any primary chapters")]
    NoChapters,

    #[error("Could not determine page ranges for chapters")]
    EmptyResult,
}

pub type Result<T> = std::result::Result<T, ChapterError>;
