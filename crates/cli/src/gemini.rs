//! Gemini HTTP backend for workflow steps.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use orchestrator::{EventStream, ModelBackend, OrchestratorError, Result};
use toneflow_core::{Event, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Calls the Gemini `generateContent` endpoint and yields the reply as
/// a single-event stream.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn stream_reply(
        &self,
        agent_name: &str,
        instruction: &str,
        history: &[Event],
    ) -> Result<EventStream> {
        let contents: Vec<serde_json::Value> = history
            .iter()
            .map(|event| {
                json!({
                    "role": match event.role {
                        Role::User => "user",
                        Role::Agent => "model",
                    },
                    "parts": [{ "text": event.first_text().unwrap_or_default() }],
                })
            })
            .collect();

        let body = json!({
            "system_instruction": { "parts": [{ "text": instruction }] },
            "contents": contents,
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(agent = agent_name, model = %self.model, "calling Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratorError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Backend(format!(
                "{} returned {status}: {detail}",
                self.model
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Backend(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .unwrap_or_default();

        let event = Event::agent(agent_name, text);
        Ok(Box::pin(futures::stream::iter(vec![Ok(event)])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": " 4\n" }] } }
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string());
        assert_eq!(text.as_deref(), Some("4"));
    }

    #[test]
    fn test_empty_response_parses() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
