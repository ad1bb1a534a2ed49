//! Adapts a JavaScript page rendering callback to `PageRenderer`

use async_trait::async_trait;
use js_sys::{Function, Promise};
use pagearrange_core::{PageId, PageRenderer, Raster, RenderFailure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Calls `(pageNumber, scale) => string | Promise<string>` for each page.
///
/// `pageNumber` is 1-based, as pdf.js `getPage` expects. The callback must
/// resolve to an image data URL, typically `canvas.toDataURL()`.
pub struct JsPageRenderer {
    callback: Function,
}

impl JsPageRenderer {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }

    async fn data_url(&self, page: PageId, scale: f64) -> Result<String, RenderFailure> {
        let returned = self
            .callback
            .call2(
                &JsValue::NULL,
                &JsValue::from(page.page_number()),
                &JsValue::from_f64(scale),
            )
            .map_err(|e| js_failure("render callback threw", &e))?;

        let value = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| js_failure("render callback rejected", &e))?,
            Err(value) => value,
        };

        value
            .as_string()
            .ok_or_else(|| RenderFailure("render callback did not return a data URL".into()))
    }
}

#[async_trait(?Send)]
impl PageRenderer for JsPageRenderer {
    async fn render_page(&self, page: PageId, scale: f64) -> Result<Raster, RenderFailure> {
        let url = self.data_url(page, scale).await?;
        Ok(Raster::from_data_url(&url)?)
    }
}

fn js_failure(context: &str, err: &JsValue) -> RenderFailure {
    let detail = err
        .as_string()
        .unwrap_or_else(|| format!("{:?}", err));
    RenderFailure(format!("{}: {}", context, detail))
}
