//! # medrecap
//!
//! Classify and summarize medical-record PDFs with multi-provider LLMs.
//!
//! ## Why this crate?
//!
//! Uploaded health records arrive as two very different kinds of PDF:
//! digital-native documents with a reliable text layer, and scans or faxes
//! whose text layer is absent or pure noise. Summarizing the first kind
//! from extracted text is cheap and faithful; the second kind needs page
//! images and a vision-capable model. This crate makes that decision per
//! document and speaks each provider's multimodal dialect behind one
//! uniform contract.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Classify  text-vs-image via the native text layer (CPU-bound, spawn_blocking)
//!  ├─ 2a. Text     concatenated page text
//!  ├─ 2b. Render   rasterize pages to PNG via pdfium, base64-encode
//!  ├─ 3. Dispatch  one request to OpenAI / Google / Anthropic
//!  └─ 4. Summary   plain text, uniform across providers
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medrecap::{SummarizeConfig, Summarizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Keys resolve from OPENAI_API_KEY / GOOGLE_API_KEY / ANTHROPIC_API_KEY
//!     let summarizer = Summarizer::new(SummarizeConfig::default())?;
//!     let bytes = std::fs::read("lab_report.pdf")?;
//!     let summary = summarizer.summarize("anthropic", "claude-3-5-sonnet-20241022", &bytes).await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Every failure surfaces as a [`SummarizeError`] whose
//! [`class`](SummarizeError::class) tells the web layer which response
//! family to use. The one deliberate non-failure: a PDF that cannot be
//! parsed for text silently takes the image path — that degradation is the
//! pipeline working as designed, and it is logged at warn level.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummarizeConfig, SummarizeConfigBuilder};
pub use error::{ErrorClass, SummarizeError};
pub use pipeline::classify::{Classification, DocumentClassifier, PdfiumClassifier};
pub use pipeline::pdfium_available;
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use provider::{
    AdapterError, AnthropicAdapter, GoogleAdapter, ModelInfo, OpenAiAdapter, PageImage, Provider,
    SummaryBackend, SummaryContent,
};
pub use summarize::Summarizer;
