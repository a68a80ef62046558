//! OpenAI chat-completions adapter.
//!
//! Wire shape: a flat `messages` list. The text path uses a system turn plus
//! a plain-string user turn; the image path uses a single user turn whose
//! content is a parts array — one text part followed by one `image_url` part
//! per page, each carrying a `data:image/png;base64,…` URI. The response is
//! `choices[0].message.content`, a plain string that may be null.

use super::{AdapterError, ContentKind, ModelInfo, Provider, SummaryBackend, SummaryContent};
use crate::prompts::{compose_text_prompt, IMAGE_SUMMARIZATION_PROMPT, SYSTEM_PREAMBLE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Adapter for the OpenAI chat-completions API.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

// ── Adapter ──────────────────────────────────────────────────────────────

impl OpenAiAdapter {
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

    fn build_request<'a>(&self, model_id: &'a str, kind: &ContentKind<'_>) -> ChatRequest<'a> {
        let messages = match kind {
            ContentKind::Text(text) => vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PREAMBLE.to_string()),
                },
                Message {
                    role: "user",
                    content: MessageContent::Text(compose_text_prompt(text)),
                },
            ],
            ContentKind::Images(pages) => {
                let mut parts = Vec::with_capacity(pages.len() + 1);
                parts.push(ContentPart::Text {
                    text: IMAGE_SUMMARIZATION_PROMPT.to_string(),
                });
                parts.extend(pages.iter().map(|page| ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/png;base64,{}", page.data),
                    },
                }));
                vec![Message {
                    role: "user",
                    content: MessageContent::Parts(parts),
                }]
            }
        };

        ChatRequest {
            model: model_id,
            messages,
            max_tokens: self.max_output_tokens,
        }
    }

    /// List models suitable for summarization (GPT-4 family).
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, AdapterError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

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
            .data
            .into_iter()
            .filter(|m| m.id.starts_with("gpt-4"))
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
                provider: Provider::OpenAi,
            })
            .collect())
    }
}

#[async_trait]
impl SummaryBackend for OpenAiAdapter {
    async fn summarize(
        &self,
        model_id: &str,
        content: &SummaryContent,
    ) -> Result<String, AdapterError> {
        let kind = content.validate()?;
        info!(model = model_id, "summarizing with OpenAI");
        if let ContentKind::Images(pages) = &kind {
            debug!(pages = pages.len(), "building OpenAI image request");
        }

        let request = self.build_request(model_id, &kind);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        info!(model = model_id, "received summary from OpenAI");
        Ok(summary.trim().to_string())
    }
}

pub(super) fn map_transport_error(e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Network("request timed out".to_string())
    } else {
        AdapterError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PageImage;

    fn adapter() -> OpenAiAdapter {
        OpenAiAdapter::new(reqwest::Client::new(), "test-key".into(), 1024)
    }

    fn page(data: &str) -> PageImage {
        PageImage { data: data.into() }
    }

    #[tokio::test]
    async fn rejects_both_contents_before_any_io() {
        let content = SummaryContent {
            text: Some("t".into()),
            images: Some(vec![page("aGk=")]),
        };
        // No server exists at the default endpoint in tests; an attempted
        // call would surface as a network error, not InvalidContent.
        let err = adapter().summarize("gpt-4o", &content).await.unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn rejects_empty_content_before_any_io() {
        let err = adapter()
            .summarize("gpt-4o", &SummaryContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[test]
    fn text_request_shape() {
        let kind = ContentKind::Text("BP 120/80");
        let request = adapter().build_request("gpt-4o", &kind);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        let user = json["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("BP 120/80"));
        assert!(user.starts_with("Summarize the following medical record"));
    }

    #[test]
    fn image_request_shape() {
        let pages = vec![page("Zmlyc3Q="), page("c2Vjb25k")];
        let kind = ContentKind::Images(&pages);
        let request = adapter().build_request("gpt-4o", &kind);
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 3); // prompt + 2 pages
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/png;base64,Zmlyc3Q="
        );
        // Page order is preserved
        assert_eq!(
            parts[2]["image_url"]["url"],
            "data:image/png;base64,c2Vjb25k"
        );
    }

    #[test]
    fn response_extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"  summary text  "}},{"message":{"content":"ignored"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        assert_eq!(summary.trim(), "summary text");
    }

    #[test]
    fn response_null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        assert_eq!(summary, "");
    }
}
