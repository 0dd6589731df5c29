//! Single-turn JSON-mode LLM client used by Selector Strategy A.
//!
//! Speaks the Gemini `generateContent` wire shape directly rather than
//! through an SDK, matching the corpus's preference for a thin `reqwest`
//! wrapper over pulling in a full client library for one endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

pub struct LlmClient {
    endpoint: String,
    api_key: String,
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct Request {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct Response {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl LlmClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: Client::new(),
            timeout,
        }
    }

    /// Send `prompt` and return the raw text of the first candidate, with
    /// markdown code fences stripped if the model wrapped its JSON in one.
    pub async fn complete_json(&self, prompt: &str) -> WorkerResult<String> {
        let request = Request {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WorkerError::LlmFailed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::LlmFailed(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| WorkerError::LlmFailed(format!("invalid response body: {e}")))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| WorkerError::LlmFailed("empty response".to_string()))?;

        Ok(strip_json_fence(text))
    }
}

fn strip_json_fence(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn strips_markdown_json_fence() {
        assert_eq!(strip_json_fence("```json\n[1,2,3]\n```"), "[1,2,3]");
        assert_eq!(strip_json_fence("[1,2,3]"), "[1,2,3]");
    }

    #[tokio::test]
    async fn complete_json_parses_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "```json\n[{\"start\":1.0,\"end\":2.0,\"reason\":\"x\"}]\n```" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(
            format!("{}/v1beta/models/test-model:generateContent", server.uri()),
            "test-key",
            Duration::from_secs(5),
        );

        let text = client.complete_json("pick ranges").await.unwrap();
        assert_eq!(text, "[{\"start\":1.0,\"end\":2.0,\"reason\":\"x\"}]");
    }

    #[tokio::test]
    async fn complete_json_surfaces_non_success_status_as_llm_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = LlmClient::new(server.uri(), "test-key", Duration::from_secs(5));
        let result = client.complete_json("pick ranges").await;
        assert!(matches!(result, Err(WorkerError::LlmFailed(_))));
    }
}
