//! Stateful editing session exposed to JavaScript
//!
//! The core session sits behind `Rc<RefCell<..>>` so a load can keep a
//! handle while pdf.js renders pages asynchronously. The core marks itself
//! busy for the duration, so edits and exports that JavaScript fires in the
//! meantime are rejected instead of racing the load.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use js_sys::{Function, Promise};
use pagearrange_core::{
    load_document, CropRegion, EditorConfig, EditorSession, ExportedDocument, LoadError,
    PageArrangeError, PageId, PageInfo, PageRenderer, PdfInfo, Raster, SessionPhase,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::download::download_bytes;
use crate::renderer::JsPageRenderer;

/// Convert any error to a JS string, logging it to the console.
pub(crate) fn to_js_error(err: impl Display) -> JsValue {
    let message = err.to_string();
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

pub(crate) fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Load `bytes` into `session` without holding a borrow across awaits.
async fn load_shared<R>(
    session: Rc<RefCell<EditorSession>>,
    bytes: Vec<u8>,
    renderer: R,
) -> Result<PdfInfo, LoadError>
where
    R: PageRenderer,
{
    let (ticket, config) = {
        let mut guard = session.borrow_mut();
        let ticket = guard.begin_load()?;
        (ticket, guard.config().clone())
    };
    let result = load_document(&bytes, &renderer, &config).await;
    session.borrow_mut().finish_load(ticket, result)
}

/// Page rearranging session held in Rust memory
#[wasm_bindgen]
pub struct PageArrangeSession {
    inner: Rc<RefCell<EditorSession>>,
}

impl PageArrangeSession {
    /// Create a session from an already parsed configuration
    pub fn with_config(config: EditorConfig) -> Result<Self, PageArrangeError> {
        let session = EditorSession::new(config)?;
        Ok(Self {
            inner: Rc::new(RefCell::new(session)),
        })
    }

    fn crop_internal(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<bool, PageArrangeError> {
        let region = CropRegion::from_box(x, y, width, height)?;
        self.inner.borrow_mut().crop(region)
    }

    fn apply_cropped_image_internal(&mut self, data_url: &str) -> Result<bool, PageArrangeError> {
        let raster = Raster::from_data_url(data_url)?;
        self.inner.borrow_mut().apply_crop_override(raster)
    }

    fn reorder_internal(&mut self, order: &[u32]) -> Result<(), PageArrangeError> {
        let ids: Vec<PageId> = order.iter().copied().map(PageId).collect();
        self.inner.borrow_mut().reorder(&ids)
    }

    fn page_image_internal(&self, page_id: u32) -> Result<String, PageArrangeError> {
        let session = self.inner.borrow();
        let raster = session
            .raster(PageId(page_id))
            .ok_or(PageArrangeError::UnknownPage(PageId(page_id)))?;
        Ok(raster.to_data_url()?)
    }

    fn page_info_internal(&self, page_id: u32) -> Result<PageInfo, PageArrangeError> {
        self.inner
            .borrow()
            .page(PageId(page_id))
            .map(|page| page.info.clone())
            .ok_or(PageArrangeError::UnknownPage(PageId(page_id)))
    }

    /// Build the export, hand it to `deliver`, and only record the session
    /// as exported once delivery succeeded.
    fn export_then<T, E>(
        &mut self,
        on_error: impl FnOnce(PageArrangeError) -> E,
        deliver: impl FnOnce(ExportedDocument) -> Result<T, E>,
    ) -> Result<T, E> {
        let exported = self
            .inner
            .borrow()
            .build_export()
            .map_err(|e| on_error(e.into()))?;
        let delivered = deliver(exported)?;
        self.inner.borrow_mut().mark_exported();
        Ok(delivered)
    }
}

#[wasm_bindgen]
impl PageArrangeSession {
    /// Create a session. `config` is an optional object with any of the
    /// `EditorConfig` fields; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PageArrangeSession, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| to_js_error(format!("Invalid config: {}", e)))?
        };
        Self::with_config(config).map_err(to_js_error)
    }

    /// Load a PDF, rendering every page through `render`.
    ///
    /// `render(pageNumber, scale)` must return a data URL or a promise of
    /// one. Resolves to the document info once all pages are rendered; on
    /// failure the previously loaded document stays in place.
    pub fn load(&self, bytes: Vec<u8>, render: Function) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let info = load_shared(inner, bytes, JsPageRenderer::new(render))
                .await
                .map_err(to_js_error)?;
            to_js_value(&info)
        })
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().phase() == SessionPhase::Loading
    }

    /// True once the current state has been exported and not edited since
    #[wasm_bindgen(getter, js_name = isExported)]
    pub fn is_exported(&self) -> bool {
        self.inner.borrow().phase() == SessionPhase::Exported
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.inner.borrow().page_count()
    }

    /// Original page ids in display order
    #[wasm_bindgen(js_name = pageOrder)]
    pub fn page_order(&self) -> Vec<u32> {
        self.inner.borrow().page_order().iter().map(|id| id.0).collect()
    }

    /// Report a finished drag. `to` is `undefined` when the drop was cancelled.
    #[wasm_bindgen(js_name = movePage)]
    pub fn move_page(&mut self, from: usize, to: Option<usize>) -> Result<bool, JsValue> {
        self.inner
            .borrow_mut()
            .move_page(from, to)
            .map_err(to_js_error)
    }

    /// Replace the display order with `order`, a permutation of page ids
    pub fn reorder(&mut self, order: Vec<u32>) -> Result<(), JsValue> {
        self.reorder_internal(&order).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = resetOrder)]
    pub fn reset_order(&mut self) -> Result<(), JsValue> {
        self.inner.borrow_mut().reset_order().map_err(to_js_error)
    }

    pub fn select(&mut self, page_id: u32) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .select(PageId(page_id))
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.inner.borrow_mut().clear_selection();
    }

    #[wasm_bindgen(getter)]
    pub fn selection(&self) -> Option<u32> {
        self.inner.borrow().selection().map(|id| id.0)
    }

    /// Rotate the selected page; returns the new angle in degrees
    pub fn rotate(&mut self, delta: i32) -> Result<Option<i32>, JsValue> {
        self.inner
            .borrow_mut()
            .rotate(delta)
            .map(|r| r.map(|r| r.degrees()))
            .map_err(to_js_error)
    }

    pub fn rotation(&self, page_id: u32) -> Option<i32> {
        self.inner
            .borrow()
            .rotation(PageId(page_id))
            .map(|r| r.degrees())
    }

    /// Crop the selected page to a box given in raster pixels
    pub fn crop(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<bool, JsValue> {
        self.crop_internal(x, y, width, height).map_err(to_js_error)
    }

    /// Install the cropper's `toDataURL()` output for the selected page
    #[wasm_bindgen(js_name = applyCroppedImage)]
    pub fn apply_cropped_image(&mut self, data_url: &str) -> Result<bool, JsValue> {
        self.apply_cropped_image_internal(data_url)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = resetCrop)]
    pub fn reset_crop(&mut self) -> Result<bool, JsValue> {
        self.inner.borrow_mut().reset_crop().map_err(to_js_error)
    }

    /// Adjust the crop preview zoom; returns the clamped zoom
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, delta: f64) -> f64 {
        self.inner.borrow_mut().set_zoom(delta)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.borrow().zoom()
    }

    /// Current image for a page (crop override if any) as a PNG data URL
    #[wasm_bindgen(js_name = pageImage)]
    pub fn page_image(&self, page_id: u32) -> Result<String, JsValue> {
        self.page_image_internal(page_id).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getPageInfo)]
    pub fn get_page_info(&self, page_id: u32) -> Result<JsValue, JsValue> {
        let info = self.page_info_internal(page_id).map_err(to_js_error)?;
        to_js_value(&info)
    }

    #[wasm_bindgen(js_name = getDocumentInfo)]
    pub fn get_document_info(&self) -> Result<JsValue, JsValue> {
        match self.inner.borrow().info() {
            Some(info) => to_js_value(info),
            None => Err(to_js_error(PageArrangeError::NothingLoaded)),
        }
    }

    /// Build the output PDF and return its bytes
    pub fn export(&mut self) -> Result<Vec<u8>, JsValue> {
        self.export_then(to_js_error, |exported| Ok(exported.bytes))
    }

    /// Build the output PDF and hand it to the browser as a download
    #[wasm_bindgen(js_name = exportAndDownload)]
    pub fn export_and_download(&mut self) -> Result<(), JsValue> {
        self.export_then(to_js_error, |exported| {
            download_bytes(&exported.bytes, &exported.file_name)?;
            web_sys::console::log_1(&JsValue::from_str(&format!(
                "Exported {} pages to {}",
                exported.page_count, exported.file_name
            )));
            Ok(())
        })
    }
}
