//! Pipeline stages between raw PDF bytes and a provider-ready payload.
//!
//! Each submodule implements exactly one transformation step, keeping
//! stages independently testable and swappable:
//!
//! ```text
//! bytes ──▶ classify ──▶ (text)            ──▶ provider
//!              │
//!              └──▶ render ──▶ encode      ──▶ provider
//!                  (pdfium)    (base64 PNG)
//! ```
//!
//! 1. [`classify`] — text-vs-image decision plus text extraction; CPU-bound,
//!    callers run it through `spawn_blocking`
//! 2. [`render`]   — rasterize every page to PNG; CPU-bound, same treatment
//! 3. [`encode`]   — base64-wrap the PNG buffers for multimodal request bodies

pub mod classify;
pub mod encode;
pub mod render;

use pdfium_render::prelude::*;

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to the library file)
/// 2. Alongside the running executable
/// 3. System library search paths
///
/// A fresh `Pdfium` is created per operation because the upstream type is
/// `!Send`; the OS caches `dlopen` calls, so repeat loads are near-free.
pub(crate) fn load_pdfium() -> Result<Pdfium, PdfiumError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        return Pdfium::bind_to_library(&path).map(Pdfium::new);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Whether a PDFium library can be loaded in this environment.
///
/// Useful for callers (and tests) that want to fail fast or skip
/// PDF-dependent work when the native library is absent.
pub fn pdfium_available() -> bool {
    load_pdfium().is_ok()
}
