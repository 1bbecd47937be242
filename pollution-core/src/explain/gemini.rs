use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::Category;

use super::{Explainer, prompt};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiExplainer {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiExplainer {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Gemini")?;

        Ok(Self { api_key, model, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate(&self, text: String) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest { contents: vec![Content { parts: vec![Part { text }] }] };

        let res = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        extract_text(&body)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).context("Failed to parse Gemini response JSON")?;

    let text: String = parsed
        .candidates
        .first()
        .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(anyhow!("Gemini response contained no text"));
    }

    Ok(text.to_string())
}

#[async_trait]
impl Explainer for GeminiExplainer {
    async fn explain(&self, prediction: f64, category: Category) -> Result<String> {
        self.generate(prompt(prediction, category)).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &body[..i]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_trims_candidate_text() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [
                    { "text": "  Air is fair today. " },
                    { "text": "Breathe easy.\n" }
                ] } }
            ]
        }"#;

        assert_eq!(extract_text(body).unwrap(), "Air is fair today. Breathe easy.");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let err = extract_text(r#"{ "candidates": [] }"#).unwrap_err();
        assert!(err.to_string().contains("no candidates"));

        let body = r#"{ "candidates": [ { "content": { "parts": [] } } ] }"#;
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(extract_text("<html>quota exceeded</html>").is_err());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "µ".repeat(300);
        let short = truncate_body(&long);

        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let timeout = Duration::from_secs(2);
        let explainer = GeminiExplainer::new("KEY".into(), "gemini-1.5-pro".into(), timeout)
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        assert!(explainer.explain(80.0, Category::Moderate).await.is_err());
    }
}
