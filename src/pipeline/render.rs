//! Page rasterization: render every PDF page to a PNG buffer via PDFium.
//!
//! PNG is chosen over JPEG because it is lossless — medical document
//! legibility (dosage numbers, small print) must not be compromised by
//! compression artifacts. The default 300 DPI balances vision-model
//! legibility against payload size.
//!
//! Rasterization never fails: any error yields an empty sequence. Callers
//! treat an empty result as a fatal pipeline error, not a zero-page
//! success — a document reaches this stage only after classifying as
//! image, so "no pages rendered" always means the processing failed.

use super::load_pdfium;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, warn};

/// Default rendering DPI for vision-model input.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
pub const DEFAULT_MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// The rasterization stage contract.
///
/// Blocking: implementations render full pages. The orchestrator runs
/// calls through `spawn_blocking`, same as classification.
pub trait PageRasterizer: Send + Sync {
    /// Render every page to an encoded PNG buffer, in page order.
    /// Returns an empty vector on any failure.
    fn rasterize(&self, pdf_bytes: &[u8]) -> Vec<Vec<u8>>;
}

/// Rasterizer backed by Google PDFium.
pub struct PdfiumRasterizer {
    dpi: u32,
    max_dimension_px: u32,
}

impl PdfiumRasterizer {
    pub fn new(dpi: u32, max_dimension_px: u32) -> Self {
        Self {
            dpi,
            max_dimension_px,
        }
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DPI, DEFAULT_MAX_DIMENSION_PX)
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Vec<Vec<u8>> {
        match render_all_pages(pdf_bytes, self.dpi, self.max_dimension_px) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(error = %e, "PDF rasterization failed");
                Vec::new()
            }
        }
    }
}

/// Render every page or fail as a whole: a partial page set would silently
/// drop document content, which downstream must never mistake for success.
fn render_all_pages(
    pdf_bytes: &[u8],
    dpi: u32,
    max_dimension_px: u32,
) -> Result<Vec<Vec<u8>>, RenderError> {
    let pdfium = load_pdfium().map_err(RenderError::Pdfium)?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(RenderError::Pdfium)?;

    let pages = document.pages();
    let mut buffers = Vec::with_capacity(pages.len() as usize);

    for (index, page) in pages.iter().enumerate() {
        let (width, height) = compute_render_dimensions(
            page.width().value,
            page.height().value,
            dpi,
            max_dimension_px,
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_height(height as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(RenderError::Pdfium)?;

        let png = encode_png(&bitmap.as_image()).map_err(RenderError::Png)?;
        debug!(
            page = index + 1,
            width,
            height,
            png_bytes = png.len(),
            "rendered PDF page to PNG"
        );
        buffers.push(png);
    }

    Ok(buffers)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, image::ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, max_dimension_px],
/// preserving aspect ratio when capping.
fn compute_render_dimensions(
    width_points: f32,
    height_points: f32,
    dpi: u32,
    max_dimension_px: u32,
) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > max_dimension_px as f32 {
        let ratio = max_dimension_px as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, max_dimension_px);
        let h = ((raw_h * ratio) as u32).clamp(1, max_dimension_px);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

#[derive(Debug, thiserror::Error)]
enum RenderError {
    #[error("pdfium: {0}")]
    Pdfium(PdfiumError),
    #[error("PNG encoding: {0}")]
    Png(image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_at_300dpi() {
        // US Letter = 612 x 792 points
        let (w, h) = compute_render_dimensions(612.0, 792.0, 300, 4096);
        assert_eq!(w, 2550);
        assert_eq!(h, 3300);
    }

    #[test]
    fn a4_at_300dpi_fits_default_guard() {
        let (w, h) = compute_render_dimensions(595.0, 842.0, 300, 4096);
        assert!(w > 2400 && w < 2550, "A4 width at 300dpi: got {w}");
        assert!(h > 3450 && h < 3600, "A4 height at 300dpi: got {h}");
    }

    #[test]
    fn dimension_guard_caps_oversized_preserving_aspect() {
        // A0 poster-sized page would exhaust memory uncapped.
        let (w, h) = compute_render_dimensions(2384.0, 3370.0, 300, 4096);
        assert!(w <= 4096 && h <= 4096);
        let ratio = h as f32 / w as f32;
        assert!((ratio - 3370.0 / 2384.0).abs() < 0.05, "ratio {ratio}");
    }

    #[test]
    fn zero_points_clamped_to_1() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 300, 4096);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn corrupted_bytes_yield_empty_sequence() {
        // Holds whether or not a PDFium library is present.
        let rasterizer = PdfiumRasterizer::default();
        assert!(rasterizer.rasterize(b"not a pdf").is_empty());
    }

    #[test]
    fn empty_bytes_yield_empty_sequence() {
        let rasterizer = PdfiumRasterizer::default();
        assert!(rasterizer.rasterize(b"").is_empty());
    }
}
