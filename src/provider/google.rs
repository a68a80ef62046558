//! Google Gemini adapter.
//!
//! Wire shape: `models/{model}:generateContent` with a `contents` array whose
//! single entry carries a `parts` array — text parts are plain
//! `{"text": …}` objects and images are `{"inline_data": …}` objects holding
//! the mime type and raw base64. The output cap goes through
//! `generationConfig.maxOutputTokens`. The response nests the generated text
//! under `candidates[0].content.parts[*].text`.
//!
//! The API key travels in the `x-goog-api-key` header rather than the `?key=`
//! query parameter so request URLs stay safe to log.

use super::{
    AdapterError, ContentKind, ModelInfo, Provider, SummaryBackend, SummaryContent,
    PAGE_IMAGE_MEDIA_TYPE,
};
use crate::prompts::{compose_text_prompt, IMAGE_SUMMARIZATION_PROMPT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Adapter for the Google Gemini generateContent API.
pub struct GoogleAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    /// Fully qualified name, e.g. `models/gemini-1.5-pro`.
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

// ── Adapter ──────────────────────────────────────────────────────────────

impl GoogleAdapter {
    pub fn new(client: reqwest::Client, api_key: String, max_output_tokens: u32) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens,
        }
    }

    /// Point the adapter at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, kind: &ContentKind<'_>) -> GenerateRequest {
        let parts = match kind {
            ContentKind::Text(text) => vec![Part::Text {
                text: compose_text_prompt(text),
            }],
            ContentKind::Images(pages) => {
                let mut parts = Vec::with_capacity(pages.len() + 1);
                parts.push(Part::Text {
                    text: IMAGE_SUMMARIZATION_PROMPT.to_string(),
                });
                parts.extend(pages.iter().map(|page| Part::InlineData {
                    inline_data: InlineData {
                        mime_type: PAGE_IMAGE_MEDIA_TYPE,
                        data: page.data.clone(),
                    },
                }));
                parts
            }
        };

        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// List Gemini models that support content generation.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, AdapterError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(super::openai::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
                    && m.name.contains("gemini")
            })
            .map(|m| {
                let id = m
                    .name
                    .rsplit('/')
                    .next()
                    .unwrap_or(m.name.as_str())
                    .to_string();
                let name = if m.display_name.is_empty() {
                    id.clone()
                } else {
                    m.display_name
                };
                ModelInfo {
                    id,
                    provider: Provider::Google,
                    name,
                }
            })
            .collect())
    }
}

#[async_trait]
impl SummaryBackend for GoogleAdapter {
    async fn summarize(
        &self,
        model_id: &str,
        content: &SummaryContent,
    ) -> Result<String, AdapterError> {
        let kind = content.validate()?;
        info!(model = model_id, "summarizing with Google");
        if let ContentKind::Images(pages) = &kind {
            debug!(pages = pages.len(), "building Google image request");
        }

        let request = self.build_request(&kind);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, model_id
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(super::openai::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let summary = first_text(parsed);
        info!(model = model_id, "received summary from Google");
        Ok(summary.trim().to_string())
    }
}

/// First text part of the first candidate; empty when none exists.
fn first_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .find_map(|p| p.text)
                .unwrap_or_default()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PageImage;

    fn adapter() -> GoogleAdapter {
        GoogleAdapter::new(reqwest::Client::new(), "test-key".into(), 1024)
    }

    #[tokio::test]
    async fn rejects_both_contents_before_any_io() {
        let content = SummaryContent {
            text: Some("t".into()),
            images: Some(vec![]),
        };
        let err = adapter()
            .summarize("gemini-1.5-pro", &content)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn rejects_empty_content_before_any_io() {
        let err = adapter()
            .summarize("gemini-1.5-pro", &SummaryContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[test]
    fn image_request_mixes_text_and_inline_parts() {
        let pages = vec![
            PageImage {
                data: "Zmlyc3Q=".into(),
            },
            PageImage {
                data: "c2Vjb25k".into(),
            },
        ];
        let kind = ContentKind::Images(&pages);
        let json = serde_json::to_value(adapter().build_request(&kind)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0]["text"].is_string());
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "Zmlyc3Q=");
        assert_eq!(parts[2]["inline_data"]["data"], "c2Vjb25k");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn text_request_is_single_part() {
        let kind = ContentKind::Text("Hb 13.5 g/dL");
        let json = serde_json::to_value(adapter().build_request(&kind)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        let text = parts[0]["text"].as_str().unwrap();
        assert!(text.contains("Hb 13.5 g/dL"));
    }

    #[test]
    fn first_text_skips_textless_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"x"}},{"text":"the summary"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_text(parsed), "the summary");
    }

    #[test]
    fn first_text_empty_when_no_text_part() {
        let body = r#"{"candidates":[{"content":{"parts":[]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_text(parsed), "");
    }

    #[test]
    fn model_listing_filters_and_strips_prefix() {
        let body = r#"{"models":[
            {"name":"models/gemini-1.5-pro","displayName":"Gemini 1.5 Pro","supportedGenerationMethods":["generateContent"]},
            {"name":"models/embedding-001","displayName":"Embedding","supportedGenerationMethods":["embedContent"]},
            {"name":"models/gemini-embed","displayName":"","supportedGenerationMethods":["embedContent"]}
        ]}"#;
        let parsed: ModelsResponse = serde_json::from_str(body).unwrap();
        let models: Vec<_> = parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|x| x == "generateContent")
                    && m.name.contains("gemini")
            })
            .collect();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "models/gemini-1.5-pro");
    }
}
