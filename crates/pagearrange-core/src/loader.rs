//! Document loading
//!
//! Parsing is done here with lopdf; rasterization is delegated to a
//! [`PageRenderer`] supplied by the front end (pdf.js in the browser,
//! MuPDF on the command line).

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::document::{LoadedDocument, PageState};
use crate::error::{LoadError, RenderFailure};
use crate::page_info::PageInfo;
use crate::page_order::PageId;
use crate::raster::Raster;
use crate::validation::parse_pdf;

/// Rasterizes pages of the document being loaded.
///
/// Implementations are bound to one document; `page` is the 0-based index
/// of the page to draw and `scale` is relative to PDF points.
#[async_trait(?Send)]
pub trait PageRenderer {
    async fn render_page(&self, page: PageId, scale: f64) -> Result<Raster, RenderFailure>;
}

/// Parse `bytes`, then render every page in page order.
///
/// Nothing is returned until every page has rendered, so a failure on any
/// page discards the whole load.
pub async fn load_document<R>(
    bytes: &[u8],
    renderer: &R,
    config: &EditorConfig,
) -> Result<LoadedDocument, LoadError>
where
    R: PageRenderer + ?Sized,
{
    let (document, info) = parse_pdf(bytes)?;
    info!(
        "Loading PDF {} with {} pages ({} bytes)",
        info.version, info.page_count, info.size_bytes
    );

    let page_infos = PageInfo::all_from_document(&document)?;
    // The parsed tree is only needed for geometry
    drop(document);

    let mut pages = Vec::with_capacity(page_infos.len());
    for (index, page_info) in page_infos.into_iter().enumerate() {
        let id = PageId(index as u32);
        debug!("Rendering page {} at scale {}", id.page_number(), config.render_scale);

        let raster = renderer
            .render_page(id, config.render_scale)
            .await
            .map_err(|e| LoadError::RenderError {
                page: id.page_number(),
                reason: e.to_string(),
            })?;

        pages.push(PageState::new(id, page_info, raster));
    }

    info!("Rendered {} pages", pages.len());
    Ok(LoadedDocument::new(info, pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{create_test_pdf, StubRenderer};
    use tokio_test::block_on;

    #[test]
    fn test_load_renders_every_page_in_order() {
        let pdf = create_test_pdf(4);
        let renderer = StubRenderer::new();
        let doc = block_on(load_document(&pdf, &renderer, &EditorConfig::default())).unwrap();

        assert_eq!(doc.page_count(), 4);
        assert_eq!(renderer.rendered(), vec![0, 1, 2, 3]);
        for (i, page) in doc.pages().iter().enumerate() {
            assert_eq!(page.id, PageId(i as u32));
            assert_eq!(page.current_raster().width(), StubRenderer::width_for(page.id));
        }
    }

    #[test]
    fn test_load_passes_render_scale() {
        let pdf = create_test_pdf(1);
        let renderer = StubRenderer::new();
        let config = EditorConfig::default().with_render_scale(2.0);
        block_on(load_document(&pdf, &renderer, &config)).unwrap();
        assert_eq!(renderer.scales(), vec![2.0]);
    }

    #[test]
    fn test_load_rejects_invalid_pdf_without_rendering() {
        let renderer = StubRenderer::new();
        let result = block_on(load_document(
            b"definitely not a pdf",
            &renderer,
            &EditorConfig::default(),
        ));
        assert!(matches!(result, Err(LoadError::MissingHeader)));
        assert!(renderer.rendered().is_empty());
    }

    #[test]
    fn test_render_failure_names_the_page() {
        let pdf = create_test_pdf(3);
        let renderer = StubRenderer::failing_on(PageId(1));
        let result = block_on(load_document(&pdf, &renderer, &EditorConfig::default()));
        match result {
            Err(LoadError::RenderError { page, .. }) => assert_eq!(page, 2),
            other => panic!("Expected RenderError, got {:?}", other.err()),
        }
    }
}
