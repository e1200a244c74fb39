//! OpenAI-compatible chat completion improver.
//!
//! Works against any endpoint exposing the `/chat/completions` shape,
//! so a local inference server can stand in for the hosted API by
//! pointing `base_url` at it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{normalize_response, Improvement, TextImprover};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const SYSTEM_PROMPT: &str = "You are a careful copy editor. Improve the document you are given: \
fix grammar and spelling, improve clarity and readability, and keep the author's meaning and \
paragraph structure intact. Do not add or remove paragraphs.\n\n\
Format your response as:\n\
IMPROVED DOCUMENT:\n\
[Your improved version here]\n\n\
CHANGES SUMMARY:\n\
[Brief summary of what you changed]";

pub struct OpenAiImprover {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiImprover {
    /// Create an improver against the hosted OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create an improver against any OpenAI-compatible endpoint.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Config(
                "OPENAI_API_KEY is not set; set it or switch to the rules provider".into(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::ImproverUnavailable(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            timeout_secs,
        })
    }

    fn call(&self, text: &str, hint: Option<&str>) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f64,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let user_content = user_message(text, hint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ImproverTimeout(self.timeout_secs)
                } else {
                    Error::ImproverUnavailable(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::ImproverUnavailable(format!(
                "API error {status}: {body}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .map_err(|e| Error::ImproverUnavailable(format!("malformed API response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::ImproverUnavailable("API returned no choices".into()))
    }
}

fn user_message(text: &str, hint: Option<&str>) -> String {
    match hint {
        Some(kind) => format!("Document type: {kind}\n\n{text}"),
        None => text.to_string(),
    }
}

impl TextImprover for OpenAiImprover {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn improve(&self, text: &str, hint: Option<&str>) -> Result<Improvement> {
        let raw = self.call(text, hint)?;
        Ok(normalize_response(&raw))
    }
}
