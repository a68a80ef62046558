//! Error types for the medrecap library.
//!
//! One enum, [`SummarizeError`], covers every failure a summarization call
//! can surface. Callers that sit behind an HTTP layer map variants to status
//! codes via [`SummarizeError::class`] rather than matching every variant,
//! so adding a new failure mode does not break the web layer.
//!
//! Classification falling back to the image path is deliberately NOT an
//! error: the classifier degrades silently (logged at warn) because a PDF
//! that cannot be parsed for text is exactly the input the rasterization
//! path exists for.

use crate::provider::Provider;
use thiserror::Error;

/// All errors returned by [`crate::Summarizer::summarize`].
#[derive(Debug, Error)]
pub enum SummarizeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded PDF byte buffer was empty.
    #[error("uploaded PDF file is empty")]
    EmptyInput,

    /// The requested provider name is not one of the supported identifiers.
    #[error("unsupported provider '{name}' (expected one of: openai, google, anthropic)")]
    UnsupportedProvider { name: String },

    /// A summarization request carried both text and image content, or neither.
    #[error("invalid summarization content: {detail}")]
    InvalidContent { detail: String },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// Page rasterization produced zero images for an image-classified PDF.
    #[error("failed to convert PDF pages to images; the file may be corrupted")]
    RasterizationFailed,

    // ── Provider errors ───────────────────────────────────────────────────
    /// The selected provider has no API key configured.
    ///
    /// Surfaced distinctly from [`SummarizeError::ProviderApi`] so operators
    /// can tell "this deployment does not support the call" apart from "the
    /// call was attempted and failed".
    #[error("provider '{provider}' is not configured; set its API key to enable it")]
    ProviderUnavailable { provider: Provider },

    /// The provider API call failed: auth, rate limit, malformed request,
    /// or network failure. Status and message are preserved for diagnosis;
    /// credentials never appear here.
    #[error("provider '{provider}' API error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    ProviderApi {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error. Always logged with full context; callers
    /// see only a generic server-error classification.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`SummarizeError`] for the calling layer.
///
/// The web layer maps these to response families (400 / 500 / 503 / 502)
/// without inspecting individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller mistake: bad bytes, bad provider name, bad content shape.
    InvalidInput,
    /// This core failed while processing a valid request.
    ServerError,
    /// The selected provider is not configured in this deployment.
    ProviderUnavailable,
    /// The provider was contacted (or contact was attempted) and failed.
    GatewayError,
}

impl SummarizeError {
    /// The caller-facing classification of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            SummarizeError::EmptyInput
            | SummarizeError::UnsupportedProvider { .. }
            | SummarizeError::InvalidContent { .. } => ErrorClass::InvalidInput,
            SummarizeError::RasterizationFailed
            | SummarizeError::InvalidConfig(_)
            | SummarizeError::Internal(_) => ErrorClass::ServerError,
            SummarizeError::ProviderUnavailable { .. } => ErrorClass::ProviderUnavailable,
            SummarizeError::ProviderApi { .. } => ErrorClass::GatewayError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_provider_display() {
        let e = SummarizeError::UnsupportedProvider {
            name: "azure".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("azure"), "got: {msg}");
        assert!(msg.contains("anthropic"), "got: {msg}");
    }

    #[test]
    fn provider_api_display_with_status() {
        let e = SummarizeError::ProviderApi {
            provider: Provider::OpenAi,
            status: Some(429),
            message: "rate limit exceeded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("429"), "got: {msg}");
        assert!(msg.contains("rate limit exceeded"), "got: {msg}");
    }

    #[test]
    fn provider_api_display_without_status() {
        let e = SummarizeError::ProviderApi {
            provider: Provider::Google,
            status: None,
            message: "connection refused".into(),
        };
        let msg = e.to_string();
        assert!(!msg.contains("status"), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
    }

    #[test]
    fn error_classes() {
        assert_eq!(SummarizeError::EmptyInput.class(), ErrorClass::InvalidInput);
        assert_eq!(
            SummarizeError::RasterizationFailed.class(),
            ErrorClass::ServerError
        );
        assert_eq!(
            SummarizeError::ProviderUnavailable {
                provider: Provider::Anthropic
            }
            .class(),
            ErrorClass::ProviderUnavailable
        );
        assert_eq!(
            SummarizeError::ProviderApi {
                provider: Provider::OpenAi,
                status: Some(500),
                message: "boom".into()
            }
            .class(),
            ErrorClass::GatewayError
        );
    }
}
