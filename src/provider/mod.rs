//! Client for the OpenAI-compatible transcription and summarization API.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::RecorderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const SUMMARY_MODEL: &str = "gpt-4";
const FALLBACK_TITLE: &str = "meeting_summary";

/// Transcription uploads carry minutes of audio; give them room.
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Title and key points extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingSummary {
    pub title: String,
    pub summary: String,
}

pub struct ProviderClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ProviderClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Upload an audio artifact for transcription. A `language` of "auto"
    /// lets the provider detect the language itself.
    pub async fn transcribe(&self, audio: &Path, language: &str, model: &str) -> Result<String> {
        info!("Transcribing {}", audio.display());

        let file_name = audio
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("failed to read {}", audio.display()))?;

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", model.to_string());
        if language != "auto" {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(TRANSCRIBE_TIMEOUT)
            .send()
            .await
            .context("transcription request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecorderError::Provider {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .context("failed to parse transcription response")?;
        if transcription.text.trim().is_empty() {
            anyhow::bail!("empty transcript received");
        }

        Ok(transcription.text)
    }

    /// Ask the chat model for a `{title, summary}` digest of the
    /// transcript.
    pub async fn summarize(&self, transcript: &str) -> Result<MeetingSummary> {
        info!("Summarizing transcript ({} chars)", transcript.len());

        let request = json!({
            "model": SUMMARY_MODEL,
            "messages": [{ "role": "user", "content": summary_prompt(transcript) }],
            "max_tokens": 1000,
            "temperature": 0.3,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(SUMMARIZE_TIMEOUT)
            .send()
            .await
            .context("summary request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecorderError::Provider {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("failed to parse summary response")?;
        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .context("summary response contained no choices")?;

        Ok(parse_summary_content(content))
    }
}

fn summary_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcription and extract:\n\
         1. The main topic of the meeting (for the file name)\n\
         2. The key points and decisions\n\
         \n\
         Transcription:\n\
         {transcript}\n\
         \n\
         Answer with a JSON object:\n\
         {{\n\
           \"title\": \"short name of the meeting's main topic\",\n\
           \"summary\": \"detailed key points and decisions, with line breaks (\\n) for readability\"\n\
         }}"
    )
}

/// Content that is not the expected JSON object is kept verbatim as the
/// summary under a placeholder title. Intentional fallback, not an error.
fn parse_summary_content(content: &str) -> MeetingSummary {
    #[derive(Deserialize)]
    struct RawSummary {
        title: String,
        summary: String,
    }

    match serde_json::from_str::<RawSummary>(content) {
        Ok(raw) => MeetingSummary {
            title: raw.title,
            summary: raw.summary,
        },
        Err(_) => MeetingSummary {
            title: FALLBACK_TITLE.to_string(),
            summary: content.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_content_is_parsed() {
        let parsed =
            parse_summary_content(r#"{"title": "Quarterly Review", "summary": "went well"}"#);
        assert_eq!(parsed.title, "Quarterly Review");
        assert_eq!(parsed.summary, "went well");
    }

    #[test]
    fn malformed_content_becomes_the_summary() {
        let content = "The meeting covered the launch timeline.";
        let parsed = parse_summary_content(content);
        assert_eq!(parsed.title, "meeting_summary");
        assert_eq!(parsed.summary, content);
    }

    #[test]
    fn truncated_json_falls_back_too() {
        let content = r#"{"title": "Quarterly Rev"#;
        let parsed = parse_summary_content(content);
        assert_eq!(parsed.title, "meeting_summary");
        assert_eq!(parsed.summary, content);
    }

    #[test]
    fn prompt_embeds_the_transcript() {
        let prompt = summary_prompt("we discussed hiring");
        assert!(prompt.contains("we discussed hiring"));
        assert!(prompt.contains("\"title\""));
    }
}
