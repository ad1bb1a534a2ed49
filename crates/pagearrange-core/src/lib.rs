//! Page rearranging for PDF documents
//!
//! Loads a PDF, keeps one rendered raster per page, lets the caller reorder,
//! rotate and crop pages, and exports the result as a new PDF built from the
//! (possibly cropped) rasters.
//!
//! Parsing and output use lopdf. Rasterization is delegated to a
//! [`PageRenderer`] so the same session works behind pdf.js in the browser
//! and MuPDF on the command line.
//!
//! ```no_run
//! # async fn example(bytes: &[u8], renderer: &dyn pagearrange_core::PageRenderer)
//! #     -> Result<(), pagearrange_core::PageArrangeError> {
//! use pagearrange_core::{EditorSession, PageId};
//!
//! let mut session = EditorSession::default();
//! session.load(bytes, renderer).await?;
//! session.move_page(2, Some(0))?;
//! session.select(PageId(0))?;
//! session.rotate(90)?;
//! let exported = session.export()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod loader;
pub mod page_info;
pub mod page_order;
pub mod raster;
pub mod rotation;
pub mod session;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::EditorConfig;
pub use document::{LoadedDocument, PageState};
pub use error::{
    ConfigError, CropError, ExportError, LoadError, PageArrangeError, RasterError, RenderFailure,
    ReorderError,
};
pub use export::{export_document, ExportedDocument, Placement};
pub use loader::{load_document, PageRenderer};
pub use page_info::{PageInfo, PageOrientation};
pub use page_order::{PageId, PageOrder};
pub use raster::{CropRegion, Raster};
pub use rotation::Rotation;
pub use session::{EditorSession, LoadTicket, SessionPhase};
pub use validation::{quick_validate, validate_pdf, PdfInfo};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, LoadError> {
    validate_pdf(bytes).map(|info| info.page_count)
}

/// Parse a page order string like "3, 1, 2" (1-indexed page numbers)
/// into page identifiers, preserving the given order.
pub fn parse_order(input: &str) -> Result<Vec<PageId>, ReorderError> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            // Range like "1-3" or a descending "3-1"
            let start = parse_page_number(start)?;
            let end = parse_page_number(end)?;
            if start <= end {
                pages.extend((start..=end).map(|n| PageId(n - 1)));
            } else {
                pages.extend((end..=start).rev().map(|n| PageId(n - 1)));
            }
        } else {
            pages.push(PageId(parse_page_number(part)? - 1));
        }
    }

    Ok(pages)
}

fn parse_page_number(input: &str) -> Result<u32, ReorderError> {
    match input.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ReorderError::InvalidPageNumber(input.trim().to_string())),
    }
}
