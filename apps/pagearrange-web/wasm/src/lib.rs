//! WASM bindings for the page arranger
//!
//! The whole editing state lives in Rust inside `PageArrangeSession`.
//! JavaScript renders pages with pdf.js, runs the cropper widget and wires
//! up drag-and-drop; everything else happens here.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PageArrangeSession } from './pkg/pagearrange_wasm.js';
//!
//! await init();
//!
//! const session = new PageArrangeSession();
//! const info = await session.load(bytes, async (pageNumber, scale) => {
//!     const page = await pdf.getPage(pageNumber);
//!     const viewport = page.getViewport({ scale });
//!     // ... draw into a canvas ...
//!     return canvas.toDataURL();
//! });
//!
//! session.movePage(2, 0);
//! session.select(0);
//! session.rotate(90);
//! session.applyCroppedImage(cropper.getCroppedCanvas().toDataURL());
//! session.exportAndDownload(); // saves rearranged.pdf
//! ```

pub mod download;
pub mod renderer;
pub mod session;

use wasm_bindgen::prelude::*;

pub use renderer::JsPageRenderer;
pub use session::PageArrangeSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Cheap header/trailer check, suitable for rejecting a dropped file early
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    pagearrange_core::quick_validate(bytes).map_err(session::to_js_error)
}

/// Get detailed PDF info without creating a session
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = pagearrange_core::validate_pdf(bytes).map_err(session::to_js_error)?;
    session::to_js_value(&info)
}

/// Get page count from PDF bytes
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    pagearrange_core::get_page_count(bytes).map_err(session::to_js_error)
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    match bytes {
        b if b < KB => format!("{} B", b),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{:.1} MB", b as f64 / MB as f64),
    }
}
