//! The summarization orchestrator: classify → extract/rasterize → dispatch.
//!
//! One [`Summarizer`] is constructed at process startup and shared across
//! request handlers. Each call runs the pipeline strictly sequentially —
//! every stage's output is the next stage's input, so there is nothing to
//! parallelise inside a request — while concurrent calls progress
//! independently: the CPU-bound stages run on the blocking thread pool and
//! the only await points are the provider HTTP calls.
//!
//! The orchestrator performs no retries. Retrying an LLM call has cost and
//! latency implications that belong to the calling layer, which can also
//! decide whether a given failure class is worth retrying at all.

use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use crate::pipeline::classify::{Classification, DocumentClassifier, PdfiumClassifier};
use crate::pipeline::encode;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::provider::{
    AdapterError, Adapters, ModelInfo, Provider, SummaryBackend, SummaryContent,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates PDF classification, content extraction, and provider
/// dispatch for medical-record summarization.
pub struct Summarizer {
    config: SummarizeConfig,
    adapters: Adapters,
    classifier: Arc<dyn DocumentClassifier>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl Summarizer {
    /// Build a summarizer with the default PDFium-backed pipeline stages.
    pub fn new(config: SummarizeConfig) -> Result<Self, SummarizeError> {
        let classifier = Arc::new(PdfiumClassifier::new(config.text_threshold));
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.dpi, config.max_dimension_px));
        Self::with_components(config, classifier, rasterizer)
    }

    /// Build a summarizer with injected pipeline stages.
    ///
    /// The seam tests and embedders use to substitute classification or
    /// rasterization without a PDFium library present.
    pub fn with_components(
        config: SummarizeConfig,
        classifier: Arc<dyn DocumentClassifier>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self, SummarizeError> {
        let adapters = Adapters::from_config(&config)?;
        Ok(Self {
            config,
            adapters,
            classifier,
            rasterizer,
        })
    }

    /// Whether the given provider can serve requests right now.
    pub fn is_available(&self, provider: Provider) -> bool {
        self.config.backend.is_some() || self.adapters.is_available(provider)
    }

    /// Summarize a PDF with the named provider and model.
    ///
    /// `provider_name` must be one of `openai`, `google`, `anthropic`.
    /// Returns the provider's summary text, or a typed error whose
    /// [`class`](SummarizeError::class) the caller maps to a response code.
    pub async fn summarize(
        &self,
        provider_name: &str,
        model_id: &str,
        pdf_bytes: &[u8],
    ) -> Result<String, SummarizeError> {
        let provider: Provider = provider_name.parse()?;

        if pdf_bytes.is_empty() {
            warn!("uploaded PDF file is empty");
            return Err(SummarizeError::EmptyInput);
        }

        // Credential check precedes classification and rasterization: a
        // request we cannot dispatch must not pay for the pipeline first.
        if !self.is_available(provider) {
            warn!(provider = %provider, "provider requested but not configured");
            return Err(SummarizeError::ProviderUnavailable { provider });
        }

        info!(
            provider = %provider,
            model = model_id,
            bytes = pdf_bytes.len(),
            "starting PDF summarization"
        );

        let content = match self.classify(pdf_bytes).await? {
            Classification::Text(text) => {
                info!(chars = text.chars().count(), "processing PDF as text");
                SummaryContent::from_text(text)
            }
            Classification::Image => {
                info!("processing PDF as image; rasterizing pages");
                let pages = self.rasterize(pdf_bytes).await?;
                if pages.is_empty() {
                    warn!("rasterization produced no images");
                    return Err(SummarizeError::RasterizationFailed);
                }
                info!(pages = pages.len(), "converted PDF pages to images");
                SummaryContent::from_images(encode::encode_pages(&pages))
            }
        };

        let summary = self.dispatch(provider, model_id, &content).await?;
        info!(provider = %provider, model = model_id, "summarization complete");
        Ok(summary)
    }

    /// Models suitable for PDF summarization, per configured provider.
    ///
    /// OpenAI and Google listings are fetched concurrently; Anthropic's is
    /// a curated constant. A provider that is unconfigured, or whose fetch
    /// fails, is omitted rather than failing the whole catalog.
    pub async fn available_models(&self) -> BTreeMap<Provider, Vec<ModelInfo>> {
        let openai = async {
            match &self.adapters.openai {
                Some(adapter) => adapter.list_models().await.unwrap_or_else(|e| {
                    warn!(provider = %Provider::OpenAi, error = %e, "model listing failed");
                    Vec::new()
                }),
                None => Vec::new(),
            }
        };
        let google = async {
            match &self.adapters.google {
                Some(adapter) => adapter.list_models().await.unwrap_or_else(|e| {
                    warn!(provider = %Provider::Google, error = %e, "model listing failed");
                    Vec::new()
                }),
                None => Vec::new(),
            }
        };
        let (openai_models, google_models) = futures::join!(openai, google);
        let anthropic_models = self
            .adapters
            .anthropic
            .as_ref()
            .map(|adapter| adapter.list_models())
            .unwrap_or_default();

        let mut catalog = BTreeMap::new();
        for (provider, models) in [
            (Provider::OpenAi, openai_models),
            (Provider::Google, google_models),
            (Provider::Anthropic, anthropic_models),
        ] {
            if !models.is_empty() {
                catalog.insert(provider, models);
            }
        }
        if catalog.is_empty() {
            warn!("could not retrieve models from any provider");
        }
        catalog
    }

    // ── Pipeline stages ──────────────────────────────────────────────────

    /// Run classification on the blocking pool; PDF parsing is CPU-bound
    /// and must not stall concurrent requests' network stages.
    async fn classify(&self, pdf_bytes: &[u8]) -> Result<Classification, SummarizeError> {
        let classifier = Arc::clone(&self.classifier);
        let bytes = pdf_bytes.to_vec();
        tokio::task::spawn_blocking(move || classifier.classify(&bytes))
            .await
            .map_err(|e| SummarizeError::Internal(format!("classification task panicked: {e}")))
    }

    /// Run rasterization on the blocking pool, same as classification.
    async fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<Vec<u8>>, SummarizeError> {
        let rasterizer = Arc::clone(&self.rasterizer);
        let bytes = pdf_bytes.to_vec();
        tokio::task::spawn_blocking(move || rasterizer.rasterize(&bytes))
            .await
            .map_err(|e| SummarizeError::Internal(format!("rasterization task panicked: {e}")))
    }

    /// Select the adapter for `provider` and invoke the summarize contract.
    ///
    /// Dispatch is a plain enum match over concrete adapters — the three
    /// share no behavior beyond the contract, so a registry of trait
    /// objects would only obscure which wire format serves the request.
    async fn dispatch(
        &self,
        provider: Provider,
        model_id: &str,
        content: &SummaryContent,
    ) -> Result<String, SummarizeError> {
        let result = if let Some(backend) = &self.config.backend {
            backend.summarize(model_id, content).await
        } else {
            match provider {
                Provider::OpenAi => {
                    let adapter = self
                        .adapters
                        .openai
                        .as_ref()
                        .ok_or(SummarizeError::ProviderUnavailable { provider })?;
                    adapter.summarize(model_id, content).await
                }
                Provider::Google => {
                    let adapter = self
                        .adapters
                        .google
                        .as_ref()
                        .ok_or(SummarizeError::ProviderUnavailable { provider })?;
                    adapter.summarize(model_id, content).await
                }
                Provider::Anthropic => {
                    let adapter = self
                        .adapters
                        .anthropic
                        .as_ref()
                        .ok_or(SummarizeError::ProviderUnavailable { provider })?;
                    adapter.summarize(model_id, content).await
                }
            }
        };

        result.map_err(|e| classify_adapter_error(provider, e))
    }
}

/// Re-classify an adapter failure for the caller.
fn classify_adapter_error(provider: Provider, error: AdapterError) -> SummarizeError {
    match error {
        AdapterError::InvalidContent(detail) => SummarizeError::InvalidContent {
            detail: detail.to_string(),
        },
        AdapterError::Api { status, message } => SummarizeError::ProviderApi {
            provider,
            status: Some(status),
            message,
        },
        AdapterError::Network(message) => SummarizeError::ProviderApi {
            provider,
            status: None,
            message,
        },
        AdapterError::Parse(message) => SummarizeError::ProviderApi {
            provider,
            status: None,
            message: format!("response parsing failed: {message}"),
        },
    }
}
