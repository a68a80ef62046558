//! Fixed instruction preambles for medical-record summarization.
//!
//! Centralising the prompts here serves two purposes:
//!
//! 1. **Single source of truth** — all three provider adapters reuse the same
//!    two templates, so the summarization focus (diagnoses, treatments,
//!    medications, allergies) can only ever drift in one place.
//!
//! 2. **Testability** — tests can assert on prompt content and on prompt
//!    placement inside request bodies without a live provider.
//!
//! Prompt construction is deterministic: the text template is concatenated
//! with the extracted text, the image template is sent alongside the page
//! images. Nothing else is ever interpolated.

/// Instruction prefix for text-extractable PDFs.
pub const TEXT_SUMMARIZATION_PROMPT: &str = "Summarize the following medical record content, \
focusing on key diagnoses, treatments, medications, and allergies:";

/// Instruction for image-classified PDFs, sent alongside the page images.
pub const IMAGE_SUMMARIZATION_PROMPT: &str = "Analyze the following medical document page \
image(s) and provide a concise summary, focusing on key diagnoses, treatments, medications, \
and allergies mentioned or depicted.";

/// System-role preamble used where a provider's schema has a system turn.
pub const SYSTEM_PREAMBLE: &str =
    "You are a helpful medical assistant specializing in summarizing records.";

/// Compose the full user-facing prompt for the text path.
pub fn compose_text_prompt(text: &str) -> String {
    format!("{TEXT_SUMMARIZATION_PROMPT}\n\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prompt_carries_content_verbatim() {
        let composed = compose_text_prompt("Patient presents with hypertension.");
        assert!(composed.starts_with(TEXT_SUMMARIZATION_PROMPT));
        assert!(composed.ends_with("Patient presents with hypertension."));
    }

    #[test]
    fn prompts_emphasize_clinical_focus() {
        for prompt in [TEXT_SUMMARIZATION_PROMPT, IMAGE_SUMMARIZATION_PROMPT] {
            assert!(prompt.contains("diagnoses"));
            assert!(prompt.contains("medications"));
            assert!(prompt.contains("allergies"));
        }
    }
}
