//! Loaded document state: page order plus per-page rasters and transforms

use crate::page_info::PageInfo;
use crate::page_order::{PageId, PageOrder};
use crate::raster::Raster;
use crate::rotation::Rotation;
use crate::validation::PdfInfo;

/// Per-page state, indexed by [`PageId`].
#[derive(Debug, Clone)]
pub struct PageState {
    pub id: PageId,
    pub info: PageInfo,
    raster: Raster,
    crop_override: Option<Raster>,
    rotation: Rotation,
}

impl PageState {
    pub fn new(id: PageId, info: PageInfo, raster: Raster) -> Self {
        Self {
            id,
            info,
            raster,
            crop_override: None,
            rotation: Rotation::NONE,
        }
    }

    /// Raster used for display and export: the crop override if present.
    pub fn current_raster(&self) -> &Raster {
        self.crop_override.as_ref().unwrap_or(&self.raster)
    }

    /// Raster as rendered at load time
    pub fn original_raster(&self) -> &Raster {
        &self.raster
    }

    pub fn is_cropped(&self) -> bool {
        self.crop_override.is_some()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub(crate) fn rotate(&mut self, delta: i32) -> Rotation {
        self.rotation = self.rotation.rotated_by(delta);
        self.rotation
    }

    pub(crate) fn set_crop_override(&mut self, raster: Raster) {
        self.crop_override = Some(raster);
    }

    pub(crate) fn clear_crop_override(&mut self) -> bool {
        self.crop_override.take().is_some()
    }
}

/// A successfully loaded document, ready to be installed in a session.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub info: PdfInfo,
    pub(crate) pages: Vec<PageState>,
    pub(crate) order: PageOrder,
}

impl LoadedDocument {
    /// Assemble a document from pages in source order.
    pub fn new(info: PdfInfo, pages: Vec<PageState>) -> Self {
        let order = PageOrder::new(pages.len() as u32);
        Self { info, pages, order }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn order(&self) -> &PageOrder {
        &self.order
    }

    pub fn page(&self, id: PageId) -> Option<&PageState> {
        self.pages.get(id.index())
    }

    pub(crate) fn page_mut(&mut self, id: PageId) -> Option<&mut PageState> {
        self.pages.get_mut(id.index())
    }

    /// Pages in source order
    pub fn pages(&self) -> &[PageState] {
        &self.pages
    }
}
