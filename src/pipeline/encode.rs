//! Image encoding: PNG page buffers → base64 [`PageImage`]s.
//!
//! All three provider APIs accept inline images as base64 in the JSON
//! request body; only the surrounding structure differs, and that part is
//! each adapter's business. This stage produces the shared representation
//! once so the adapters never re-encode.

use crate::provider::PageImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Base64-encode rendered page buffers, preserving page order.
pub fn encode_pages(pages: &[Vec<u8>]) -> Vec<PageImage> {
    let encoded: Vec<PageImage> = pages
        .iter()
        .map(|png| PageImage {
            data: STANDARD.encode(png),
        })
        .collect();
    debug!(pages = encoded.len(), "encoded page images to base64");
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_page_order() {
        let pages = vec![b"page-one".to_vec(), b"page-two".to_vec()];
        let encoded = encode_pages(&pages);
        assert_eq!(encoded.len(), 2);
        assert_eq!(
            STANDARD.decode(&encoded[0].data).unwrap(),
            b"page-one".to_vec()
        );
        assert_eq!(
            STANDARD.decode(&encoded[1].data).unwrap(),
            b"page-two".to_vec()
        );
    }

    #[test]
    fn empty_input_encodes_to_empty() {
        assert!(encode_pages(&[]).is_empty());
    }
}
