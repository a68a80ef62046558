//! Configuration for the summarization pipeline.
//!
//! All behaviour is controlled through [`SummarizeConfig`], built via its
//! [`SummarizeConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to construct the pipeline once at process startup, share it
//! across request handlers, and diff two deployments' settings.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults
//! for the rest; adding a field never breaks existing construction sites.

use crate::error::SummarizeError;
use crate::pipeline::classify::DEFAULT_TEXT_THRESHOLD;
use crate::pipeline::render::{DEFAULT_MAX_DIMENSION_PX, DEFAULT_RENDER_DPI};
use crate::provider::SummaryBackend;
use std::fmt;
use std::sync::Arc;

/// Configuration for a [`crate::Summarizer`].
///
/// # Example
/// ```rust
/// use medrecap::SummarizeConfig;
///
/// let config = SummarizeConfig::builder()
///     .text_threshold(350.0)
///     .dpi(200)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummarizeConfig {
    /// Minimum average extracted characters per page for a PDF to take the
    /// text path. Default: 500.
    ///
    /// Documents below the threshold are treated as scans and rasterized.
    /// The value is an empirical heuristic, not a law — deployments seeing
    /// misclassified faxes should tune it and re-test at the boundary.
    pub text_threshold: f64,

    /// Rendering DPI for the image path. Range: 72–600. Default: 300.
    ///
    /// 300 keeps small print legible to vision models; lowering it shrinks
    /// payloads at the cost of fine detail like dosage superscripts.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 4096.
    ///
    /// A safety cap independent of DPI so an outsized page cannot exhaust
    /// memory; the other dimension scales proportionally.
    pub max_dimension_px: u32,

    /// Maximum tokens a provider may generate per summary. Default: 1024.
    ///
    /// Bounds cost and latency per call; summaries are expected to be
    /// short, so the cap is rarely the limiting factor.
    pub max_output_tokens: u32,

    /// Per-provider-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// OpenAI API key. Falls back to `OPENAI_API_KEY` when unset.
    pub openai_api_key: Option<String>,

    /// Google API key. Falls back to `GOOGLE_API_KEY` when unset.
    pub google_api_key: Option<String>,

    /// Anthropic API key. Falls back to `ANTHROPIC_API_KEY` when unset.
    pub anthropic_api_key: Option<String>,

    /// Pre-built backend that bypasses provider dispatch entirely.
    ///
    /// When set, every summarization call goes to this backend regardless
    /// of the requested provider. Useful in tests and for callers that
    /// wrap a real adapter in middleware (caching, accounting).
    pub backend: Option<Arc<dyn SummaryBackend>>,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            text_threshold: DEFAULT_TEXT_THRESHOLD,
            dpi: DEFAULT_RENDER_DPI,
            max_dimension_px: DEFAULT_MAX_DIMENSION_PX,
            max_output_tokens: 1024,
            api_timeout_secs: 60,
            openai_api_key: None,
            google_api_key: None,
            anthropic_api_key: None,
            backend: None,
        }
    }
}

impl fmt::Debug for SummarizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // API keys are deliberately absent: configs get logged.
        f.debug_struct("SummarizeConfig")
            .field("text_threshold", &self.text_threshold)
            .field("dpi", &self.dpi)
            .field("max_dimension_px", &self.max_dimension_px)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<set>"))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<set>"),
            )
            .field("backend", &self.backend.as_ref().map(|_| "<dyn SummaryBackend>"))
            .finish()
    }
}

impl SummarizeConfig {
    /// Create a new builder for `SummarizeConfig`.
    pub fn builder() -> SummarizeConfigBuilder {
        SummarizeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummarizeConfig`].
#[derive(Debug)]
pub struct SummarizeConfigBuilder {
    config: SummarizeConfig,
}

impl SummarizeConfigBuilder {
    pub fn text_threshold(mut self, chars_per_page: f64) -> Self {
        self.config.text_threshold = chars_per_page.max(0.0);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_dimension_px(mut self, px: u32) -> Self {
        self.config.max_dimension_px = px.max(100);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    pub fn google_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.google_api_key = Some(key.into());
        self
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.anthropic_api_key = Some(key.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn SummaryBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizeConfig, SummarizeError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(SummarizeError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_output_tokens == 0 {
            return Err(SummarizeError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(SummarizeError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = SummarizeConfig::default();
        assert_eq!(config.text_threshold, 500.0);
        assert_eq!(config.dpi, 300);
        assert_eq!(config.max_output_tokens, 1024);
    }

    #[test]
    fn builder_clamps_dpi() {
        let config = SummarizeConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(config.dpi, 600);
        let config = SummarizeConfig::builder().dpi(10).build().unwrap();
        assert_eq!(config.dpi, 72);
    }

    #[test]
    fn builder_rejects_zero_tokens() {
        assert!(SummarizeConfig::builder()
            .max_output_tokens(0)
            .build()
            .is_err());
    }

    #[test]
    fn threshold_cannot_go_negative() {
        let config = SummarizeConfig::builder()
            .text_threshold(-5.0)
            .build()
            .unwrap();
        assert_eq!(config.text_threshold, 0.0);
    }

    #[test]
    fn debug_never_prints_keys() {
        let config = SummarizeConfig::builder()
            .openai_api_key("sk-secret-value")
            .build()
            .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<set>"));
    }
}
