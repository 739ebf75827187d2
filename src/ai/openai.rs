use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::prompt::{classify_prompt, parse_toc_prompt, CLASSIFY_SYSTEM, PARSE_TOC_SYSTEM};
use super::response::{parse_titles, parse_toc_entries};
use super::ChapterOracle;
use crate::chapters::TocEntry;
use crate::error::{ChapterError, Result};
use crate::pdf::Bookmark;

const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: String) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chapter oracle backed by any OpenAI-compatible chat completions endpoint.
pub struct OpenAiOracle {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    pub fn new(base_url: &str, api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(OpenAiOracle {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn chat(&self, system: &str, prompt: String) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: TEMPERATURE,
        };

        debug!(url = %url, model = %self.model, "Sending chat request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChapterError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ChapterError::MalformedResponse("No choices in response".to_string()))
    }
}

#[async_trait]
impl ChapterOracle for OpenAiOracle {
    async fn classify(&self, bookmarks: &[Bookmark]) -> Result<Vec<String>> {
        let reply = self
            .chat(CLASSIFY_SYSTEM, classify_prompt(bookmarks))
            .await?;
        Ok(parse_titles(&reply, bookmarks))
    }

    async fn parse_toc(&self, toc_text: &str) -> Result<Vec<TocEntry>> {
        let reply = self
            .chat(PARSE_TOC_SYSTEM, parse_toc_prompt(toc_text))
            .await?;
        Ok(parse_toc_entries(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "glm-4.7",
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi".into())],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "glm-4.7");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_response_with_null_content_parses() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let oracle =
            OpenAiOracle::new("https://example.test/v1/", "key".into(), "m".into()).unwrap();
        assert_eq!(oracle.base_url, "https://example.test/v1");
    }
}
