//! Editing session
//!
//! [`EditorSession`] owns everything a user builds up between loading a
//! file and exporting it: the loaded document, the page order, per-page
//! rotation and crop overrides, the selected page and the preview zoom.
//!
//! Lifecycle:
//!
//! ```text
//! Empty ──load──▶ Loading ──ok──▶ Loaded ◀──edit── Exported
//!                    │                 └──export──▶ Exported
//!                    └──err──▶ (previous phase)
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::document::{LoadedDocument, PageState};
use crate::error::{ConfigError, ExportError, LoadError, PageArrangeError};
use crate::export::{export_document, ExportedDocument};
use crate::loader::{load_document, PageRenderer};
use crate::page_order::PageId;
use crate::raster::{CropRegion, Raster};
use crate::rotation::Rotation;
use crate::validation::PdfInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// Nothing loaded yet
    Empty,
    /// A load is in flight; edits and exports are rejected
    Loading,
    /// A document is loaded and has changes since the last export
    Loaded,
    /// The current state has been exported
    Exported,
}

/// Proof that a load was started, handed back to [`EditorSession::finish_load`].
#[must_use = "a started load must be finished"]
#[derive(Debug)]
pub struct LoadTicket {
    previous: SessionPhase,
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    phase: SessionPhase,
    document: Option<LoadedDocument>,
    selection: Option<PageId>,
    zoom: f64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create a session after validating `config`.
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: EditorConfig) -> Self {
        Self {
            zoom: config.zoom_initial,
            config,
            phase: SessionPhase::Empty,
            document: None,
            selection: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn info(&self) -> Option<&PdfInfo> {
        self.document.as_ref().map(|d| &d.info)
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, LoadedDocument::page_count)
    }

    /// Page identifiers in display order
    pub fn page_order(&self) -> &[PageId] {
        match &self.document {
            Some(document) => document.order().pages(),
            None => &[],
        }
    }

    pub fn page(&self, id: PageId) -> Option<&PageState> {
        self.document.as_ref()?.page(id)
    }

    /// Raster shown for a page, honoring any crop override
    pub fn raster(&self, id: PageId) -> Option<&Raster> {
        self.page(id).map(PageState::current_raster)
    }

    pub fn rotation(&self, id: PageId) -> Option<Rotation> {
        self.page(id).map(PageState::rotation)
    }

    pub fn selection(&self) -> Option<PageId> {
        self.selection
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    // ---- loading ----

    /// Load a document, replacing the current one only if every page renders.
    pub async fn load<R>(&mut self, bytes: &[u8], renderer: &R) -> Result<PdfInfo, LoadError>
    where
        R: PageRenderer + ?Sized,
    {
        let ticket = self.begin_load()?;
        let result = load_document(bytes, renderer, &self.config).await;
        self.finish_load(ticket, result)
    }

    /// Mark a load as in flight.
    ///
    /// Used by front ends that render outside of a `&mut` borrow of the
    /// session; pair with [`finish_load`](Self::finish_load).
    pub fn begin_load(&mut self) -> Result<LoadTicket, LoadError> {
        if self.phase == SessionPhase::Loading {
            return Err(LoadError::Busy);
        }
        let ticket = LoadTicket {
            previous: self.phase,
        };
        self.phase = SessionPhase::Loading;
        Ok(ticket)
    }

    /// Install a loaded document, or restore the previous phase on failure.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedDocument, LoadError>,
    ) -> Result<PdfInfo, LoadError> {
        match result {
            Ok(document) => {
                let info = document.info.clone();
                self.install(document);
                Ok(info)
            }
            Err(e) => {
                warn!("Load failed, keeping previous document: {}", e);
                self.phase = ticket.previous;
                Err(e)
            }
        }
    }

    /// Replace the session state with a freshly loaded document.
    fn install(&mut self, document: LoadedDocument) {
        info!("Installed document with {} pages", document.page_count());
        self.document = Some(document);
        self.selection = None;
        self.zoom = self.config.zoom_initial;
        self.phase = SessionPhase::Loaded;
    }

    // ---- page order ----

    /// Move the page shown at `from` to position `to`.
    ///
    /// A `None` target means the drag was cancelled and nothing moves.
    pub fn move_page(&mut self, from: usize, to: Option<usize>) -> Result<bool, PageArrangeError> {
        let moved = self.document_mut()?.order.move_page(from, to)?;
        if moved {
            debug!("Moved page from position {} to {:?}", from, to);
            self.mark_edited();
        }
        Ok(moved)
    }

    /// Replace the display order with an explicit permutation.
    pub fn reorder(&mut self, new_order: &[PageId]) -> Result<(), PageArrangeError> {
        self.document_mut()?.order.reorder(new_order)?;
        self.mark_edited();
        Ok(())
    }

    /// Restore the order pages had when loaded.
    pub fn reset_order(&mut self) -> Result<(), PageArrangeError> {
        self.document_mut()?.order.reset();
        self.mark_edited();
        Ok(())
    }

    // ---- selection ----

    pub fn select(&mut self, id: PageId) -> Result<(), PageArrangeError> {
        let document = self.document_mut()?;
        if !document.order().contains(id) {
            return Err(PageArrangeError::UnknownPage(id));
        }
        self.selection = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ---- transforms on the selected page ----

    /// Rotate the selected page by `delta` degrees.
    ///
    /// Returns the new angle, or `None` when no page is selected.
    pub fn rotate(&mut self, delta: i32) -> Result<Option<Rotation>, PageArrangeError> {
        let Some(page) = self.selected_page_mut()? else {
            debug!("Rotate ignored: no page selected");
            return Ok(None);
        };
        let rotation = page.rotate(delta);
        debug!("Page {} rotated to {}", page.id, rotation);
        self.mark_edited();
        Ok(Some(rotation))
    }

    /// Crop the selected page's current raster to `region`.
    ///
    /// Returns `false` when no page is selected.
    pub fn crop(&mut self, region: CropRegion) -> Result<bool, PageArrangeError> {
        let Some(page) = self.selected_page_mut()? else {
            debug!("Crop ignored: no page selected");
            return Ok(false);
        };
        let cropped = page.current_raster().crop(region).inspect_err(|e| {
            warn!("Rejected crop of page {}: {}", page.id, e);
        })?;
        page.set_crop_override(cropped);
        self.mark_edited();
        Ok(true)
    }

    /// Install a raster produced by an external crop tool for the selected page.
    pub fn apply_crop_override(&mut self, raster: Raster) -> Result<bool, PageArrangeError> {
        let Some(page) = self.selected_page_mut()? else {
            debug!("Crop override ignored: no page selected");
            return Ok(false);
        };
        page.set_crop_override(raster);
        self.mark_edited();
        Ok(true)
    }

    /// Drop the selected page's crop override, returning to the rendered raster.
    pub fn reset_crop(&mut self) -> Result<bool, PageArrangeError> {
        let Some(page) = self.selected_page_mut()? else {
            return Ok(false);
        };
        let cleared = page.clear_crop_override();
        if cleared {
            self.mark_edited();
        }
        Ok(cleared)
    }

    /// Adjust the crop preview zoom by `delta`, clamped to the configured range.
    pub fn set_zoom(&mut self, delta: f64) -> f64 {
        self.zoom = self.config.clamp_zoom(self.zoom + delta);
        self.zoom
    }

    // ---- export ----

    /// Build the output document and record the session as exported.
    ///
    /// Either the whole document is produced or the session is left as it was.
    pub fn export(&mut self) -> Result<ExportedDocument, ExportError> {
        let exported = self.build_export()?;
        self.mark_exported();
        Ok(exported)
    }

    /// Build the output document without touching the session phase.
    ///
    /// Front ends that still have to deliver the bytes call
    /// [`mark_exported`](Self::mark_exported) once delivery succeeded.
    pub fn build_export(&self) -> Result<ExportedDocument, ExportError> {
        if self.phase == SessionPhase::Loading {
            return Err(ExportError::Busy);
        }
        let document = self.document.as_ref().ok_or(ExportError::NothingLoaded)?;

        let bytes = export_document(document, &self.config).inspect_err(|e| {
            warn!("Export failed: {}", e);
        })?;

        Ok(ExportedDocument {
            file_name: self.config.export_file_name.clone(),
            page_count: document.order().len() as u32,
            bytes,
        })
    }

    /// Record that the current state has been delivered.
    ///
    /// Ignored unless a document is loaded and no load is in flight.
    pub fn mark_exported(&mut self) {
        match self.phase {
            SessionPhase::Loaded | SessionPhase::Exported => {
                self.phase = SessionPhase::Exported;
            }
            phase => debug!("Not marking export in phase {:?}", phase),
        }
    }

    // ---- helpers ----

    fn document_mut(&mut self) -> Result<&mut LoadedDocument, PageArrangeError> {
        if self.phase == SessionPhase::Loading {
            return Err(PageArrangeError::Busy);
        }
        self.document.as_mut().ok_or(PageArrangeError::NothingLoaded)
    }

    fn selected_page_mut(&mut self) -> Result<Option<&mut PageState>, PageArrangeError> {
        let selection = self.selection;
        let document = self.document_mut()?;
        match selection {
            Some(id) => Ok(document.page_mut(id)),
            None => Ok(None),
        }
    }

    fn mark_edited(&mut self) {
        if self.phase == SessionPhase::Exported {
            self.phase = SessionPhase::Loaded;
        }
    }
}
