//! MuPDF page rasterization

use anyhow::{Context, Result};
use async_trait::async_trait;
use mupdf::{Colorspace, Matrix};
use pagearrange_core::{PageId, PageRenderer, Raster, RenderFailure};

/// Renders pages of one document with MuPDF.
///
/// `mupdf::Document` is not `Send`, so this only runs on a current-thread
/// runtime.
pub struct MupdfRenderer {
    doc: mupdf::Document,
}

impl MupdfRenderer {
    pub fn open(path: &str) -> Result<Self> {
        let doc = mupdf::Document::open(path)
            .with_context(|| format!("MuPDF could not open {}", path))?;
        Ok(Self { doc })
    }

    fn render(&self, page: PageId, scale: f64) -> Result<Raster> {
        let index = i32::try_from(page.index()).context("page index overflows i32")?;
        let page = self.doc.load_page(index)?;
        let scale = scale as f32;
        let pixmap = page.to_pixmap(
            &Matrix::new_scale(scale, scale),
            &Colorspace::device_rgb(),
            false,
            true,
        )?;
        let raster = Raster::from_pixels(pixmap.width(), pixmap.height(), pixmap.samples().to_vec())?;
        Ok(raster)
    }
}

#[async_trait(?Send)]
impl PageRenderer for MupdfRenderer {
    async fn render_page(&self, page: PageId, scale: f64) -> Result<Raster, RenderFailure> {
        self.render(page, scale)
            .map_err(|e| RenderFailure(format!("{:#}", e)))
    }
}
