//! Anthropic messages adapter.
//!
//! Wire shape: `v1/messages` authenticated with `x-api-key` plus a pinned
//! `anthropic-version` header. The text path sends the user content as a
//! plain string; the image path sends typed content blocks — a `text` block
//! followed by one `image` block per page, each with a nested base64
//! `source` object. The response is a list of typed blocks; only the first
//! `text` block is used, and a response with none yields an empty summary.

use super::{
    AdapterError, ContentKind, ModelInfo, Provider, SummaryBackend, SummaryContent,
    PAGE_IMAGE_MEDIA_TYPE,
};
use crate::prompts::{compose_text_prompt, IMAGE_SUMMARIZATION_PROMPT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude models known to accept page images.
///
/// Anthropic exposes no capability-filtered listing endpoint, so this is a
/// curated list updated alongside provider documentation.
const VISION_MODELS: &[&str] = &[
    "claude-3-7-sonnet-20250219",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-sonnet-20240620",
    "claude-3-5-haiku-20241022",
    "claude-3-opus-20240229",
    "claude-3-haiku-20240307",
];

/// Adapter for the Anthropic messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
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
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

/// Response blocks keep an open type tag: providers add block kinds over
/// time and unknown ones must be skipped, not rejected.
#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

// ── Adapter ──────────────────────────────────────────────────────────────

impl AnthropicAdapter {
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

    fn build_request<'a>(&self, model_id: &'a str, kind: &ContentKind<'_>) -> MessagesRequest<'a> {
        let content = match kind {
            ContentKind::Text(text) => MessageContent::Text(compose_text_prompt(text)),
            ContentKind::Images(pages) => {
                let mut blocks = Vec::with_capacity(pages.len() + 1);
                blocks.push(ContentBlock::Text {
                    text: IMAGE_SUMMARIZATION_PROMPT.to_string(),
                });
                blocks.extend(pages.iter().map(|page| ContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type: PAGE_IMAGE_MEDIA_TYPE,
                        data: page.data.clone(),
                    },
                }));
                MessageContent::Blocks(blocks)
            }
        };

        MessagesRequest {
            model: model_id,
            max_tokens: self.max_output_tokens,
            messages: vec![Message {
                role: "user",
                content,
            }],
        }
    }

    /// The curated vision-capable Claude model list.
    pub fn list_models(&self) -> Vec<ModelInfo> {
        VISION_MODELS
            .iter()
            .map(|id| ModelInfo {
                id: id.to_string(),
                provider: Provider::Anthropic,
                name: id.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SummaryBackend for AnthropicAdapter {
    async fn summarize(
        &self,
        model_id: &str,
        content: &SummaryContent,
    ) -> Result<String, AdapterError> {
        let kind = content.validate()?;
        info!(model = model_id, "summarizing with Anthropic");
        if let ContentKind::Images(pages) = &kind {
            debug!(pages = pages.len(), "building Anthropic image request");
        }

        let request = self.build_request(model_id, &kind);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let summary = first_text_block(parsed);
        info!(model = model_id, "received summary from Anthropic");
        Ok(summary.trim().to_string())
    }
}

/// First `text`-typed block; empty when the response has none.
fn first_text_block(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PageImage;

    fn adapter() -> AnthropicAdapter {
        AnthropicAdapter::new(reqwest::Client::new(), "test-key".into(), 1024)
    }

    #[tokio::test]
    async fn rejects_both_contents_before_any_io() {
        let content = SummaryContent {
            text: Some("t".into()),
            images: Some(vec![]),
        };
        let err = adapter()
            .summarize("claude-3-5-sonnet-20241022", &content)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn rejects_empty_content_before_any_io() {
        let err = adapter()
            .summarize("claude-3-5-sonnet-20241022", &SummaryContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidContent(_)));
    }

    #[test]
    fn text_request_uses_plain_string_content() {
        let kind = ContentKind::Text("Allergic to penicillin.");
        let request = adapter().build_request("claude-3-opus-20240229", &kind);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-3-opus-20240229");
        assert_eq!(json["max_tokens"], 1024);
        let content = json["messages"][0]["content"].as_str().unwrap();
        assert!(content.contains("Allergic to penicillin."));
    }

    #[test]
    fn image_request_uses_typed_blocks() {
        let pages = vec![
            PageImage {
                data: "Zmlyc3Q=".into(),
            },
            PageImage {
                data: "c2Vjb25k".into(),
            },
            PageImage {
                data: "dGhpcmQ=".into(),
            },
        ];
        let kind = ContentKind::Images(&pages);
        let request = adapter().build_request("claude-3-5-haiku-20241022", &kind);
        let json = serde_json::to_value(&request).unwrap();

        let blocks = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0]["type"], "text");
        for (i, expected) in ["Zmlyc3Q=", "c2Vjb25k", "dGhpcmQ="].iter().enumerate() {
            let block = &blocks[i + 1];
            assert_eq!(block["type"], "image");
            assert_eq!(block["source"]["type"], "base64");
            assert_eq!(block["source"]["media_type"], "image/png");
            assert_eq!(block["source"]["data"], *expected);
        }
    }

    #[test]
    fn first_text_block_skips_non_text() {
        let body = r#"{"content":[
            {"type":"thinking","thinking":"..."},
            {"type":"text","text":"the summary"},
            {"type":"text","text":"a second block"}
        ]}"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_text_block(parsed), "the summary");
    }

    #[test]
    fn first_text_block_empty_when_absent() {
        let body = r#"{"content":[{"type":"tool_use","id":"x","name":"t","input":{}}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_text_block(parsed), "");
    }

    #[test]
    fn curated_model_list_is_nonempty_and_scoped() {
        let models = adapter().list_models();
        assert!(!models.is_empty());
        assert!(models.iter().all(|m| m.provider == Provider::Anthropic));
        assert!(models.iter().all(|m| m.id.starts_with("claude-")));
    }
}
