//! Generative content client (`/v1beta/models/{model}:generateContent`).
//!
//! One prompt in, the first candidate's first text part out. The request and
//! response envelopes are private to this module.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{HttpTransport, TextGenerator, TransportError, endpoint};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: HttpTransport,
    api_base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: HttpTransport, api_base_url: String, model: String, api_key: String) -> Self {
        Self { http, api_base_url, model, api_key }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        let method = format!("{}:generateContent", self.model);
        let mut url = endpoint(&self.api_base_url, &["v1beta", "models", method.as_str()])?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let body = GenerateRequest {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "sending generate request");

        let parsed: GenerateResponse = self.http.post_json(url, &body).await?;
        let text = parsed.first_text()?;
        debug!(text_len = text.len(), "generate request succeeded");
        Ok(text)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Missing candidate or part is a parse failure; a present but blank text is
    /// `NoData`.
    fn first_text(self) -> Result<String, TransportError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| TransportError::ParseFailure("no candidate text in response".into()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(TransportError::NoData);
        }
        Ok(text.to_string())
    }
}
