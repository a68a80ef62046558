//! Provider adapters: one module per LLM service, unified by a narrow contract.
//!
//! The three providers have incompatible multimodal payload shapes (a flat
//! message list with inline image URLs, a parts array mixing strings and raw
//! image objects, and typed content blocks with nested base64 sources) and
//! incompatible response shapes. Each adapter therefore owns its wire types
//! completely; the only thing they share is the
//! `summarize(model_id, content) -> String` contract and the
//! [`AdapterError`] mapping.
//!
//! Dispatch in the orchestrator is an enum match over concrete adapter
//! structs, not a registry of trait objects — the variants share no behavior
//! worth abstracting. [`SummaryBackend`] exists only as an injection seam:
//! tests substitute it for the network, and embedders can wrap a real
//! adapter in middleware (caching, accounting) without touching dispatch.

use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub mod anthropic;
pub mod google;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;

/// MIME type of every page image this crate produces.
pub const PAGE_IMAGE_MEDIA_TYPE: &str = "image/png";

/// One of the three supported LLM services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Google,
    Anthropic,
}

impl Provider {
    /// The wire identifier callers use to select this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "google" => Ok(Provider::Google),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(SummarizeError::UnsupportedProvider {
                name: other.to_string(),
            }),
        }
    }
}

/// A single rasterized PDF page, base64-encoded PNG, ready for a
/// multimodal request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Base64-encoded PNG bytes (standard alphabet, padded).
    pub data: String,
}

/// Content of a summarization request: extracted text OR page images.
///
/// Modeled as two options rather than an either-enum on purpose: the
/// adapters are required to reject a request carrying both or neither
/// before any network I/O, and that validation must be expressible.
#[derive(Debug, Clone, Default)]
pub struct SummaryContent {
    pub text: Option<String>,
    pub images: Option<Vec<PageImage>>,
}

/// A validated view into [`SummaryContent`] — exactly one variant.
#[derive(Debug)]
pub enum ContentKind<'a> {
    Text(&'a str),
    Images(&'a [PageImage]),
}

impl SummaryContent {
    /// Content for a text-classified PDF.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            images: None,
        }
    }

    /// Content for an image-classified PDF, pages in document order.
    pub fn from_images(images: Vec<PageImage>) -> Self {
        Self {
            text: None,
            images: Some(images),
        }
    }

    /// Check the exactly-one invariant and borrow the populated variant.
    pub fn validate(&self) -> Result<ContentKind<'_>, AdapterError> {
        match (&self.text, &self.images) {
            (Some(_), Some(_)) => Err(AdapterError::InvalidContent(
                "provide either text content or image content, not both",
            )),
            (None, None) => Err(AdapterError::InvalidContent(
                "either text content or image content must be provided",
            )),
            (Some(text), None) => Ok(ContentKind::Text(text)),
            (None, Some(images)) => Ok(ContentKind::Images(images)),
        }
    }
}

/// A model usable for PDF summarization, as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Provider-scoped model identifier, e.g. `gpt-4o` or `gemini-1.5-pro`.
    pub id: String,
    /// Owning provider.
    pub provider: Provider,
    /// Human-readable name (falls back to the id where the provider has none).
    pub name: String,
}

/// Errors produced inside an adapter, before the orchestrator re-classifies
/// them into [`SummarizeError`] variants.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The caller violated the exactly-one-content contract.
    #[error("{0}")]
    InvalidContent(&'static str),

    /// The provider returned a non-success HTTP status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never completed: DNS, TLS, connect, or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered 2xx but the body did not match its schema.
    #[error("response parsing failed: {0}")]
    Parse(String),
}

/// The common summarize contract, used as an injection seam.
///
/// All three adapters implement this; the orchestrator normally dispatches
/// to them by enum match, but a caller (or a test) can override dispatch
/// entirely with a custom backend via
/// [`crate::config::SummarizeConfig::backend`].
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Summarize the given content with the given model.
    ///
    /// Must validate the content shape before performing any I/O.
    async fn summarize(
        &self,
        model_id: &str,
        content: &SummaryContent,
    ) -> Result<String, AdapterError>;
}

/// The three adapters, each present only when its credential resolved.
///
/// Constructed once at process startup and owned by the orchestrator;
/// each adapter holds one `reqwest::Client` for the process lifetime.
pub struct Adapters {
    pub(crate) openai: Option<OpenAiAdapter>,
    pub(crate) google: Option<GoogleAdapter>,
    pub(crate) anthropic: Option<AnthropicAdapter>,
}

impl Adapters {
    /// Build the adapter set from config, falling back to the conventional
    /// environment variables for any key the config does not carry.
    ///
    /// A provider whose key is absent or empty gets no adapter; the
    /// orchestrator reports it unavailable instead of attempting a call.
    pub fn from_config(config: &SummarizeConfig) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Internal(format!("HTTP client construction: {e}")))?;

        let resolve = |explicit: &Option<String>, provider: Provider| -> Option<String> {
            explicit
                .clone()
                .filter(|k| !k.is_empty())
                .or_else(|| std::env::var(provider.key_env_var()).ok())
                .filter(|k| !k.is_empty())
        };

        let openai = resolve(&config.openai_api_key, Provider::OpenAi)
            .map(|key| OpenAiAdapter::new(client.clone(), key, config.max_output_tokens));
        let google = resolve(&config.google_api_key, Provider::Google)
            .map(|key| GoogleAdapter::new(client.clone(), key, config.max_output_tokens));
        let anthropic = resolve(&config.anthropic_api_key, Provider::Anthropic)
            .map(|key| AnthropicAdapter::new(client, key, config.max_output_tokens));

        for (provider, configured) in [
            (Provider::OpenAi, openai.is_some()),
            (Provider::Google, google.is_some()),
            (Provider::Anthropic, anthropic.is_some()),
        ] {
            if !configured {
                tracing::warn!(
                    provider = %provider,
                    "API key not found; provider will be reported unavailable"
                );
            }
        }

        Ok(Self {
            openai,
            google,
            anthropic,
        })
    }

    /// Whether the given provider has a configured adapter.
    pub fn is_available(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAi => self.openai.is_some(),
            Provider::Google => self.google.is_some(),
            Provider::Anthropic => self.anthropic.is_some(),
        }
    }
}
