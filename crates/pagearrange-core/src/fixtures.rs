//! In-memory PDFs and a deterministic renderer for unit tests

use std::cell::RefCell;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

use crate::error::RenderFailure;
use crate::loader::PageRenderer;
use crate::page_order::PageId;
use crate::raster::Raster;

/// Create a valid test PDF with `num_pages` US Letter pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let pages: Vec<(i64, i64, Option<i64>)> = (0..num_pages).map(|_| (612, 792, None)).collect();
    create_test_pdf_with(&pages)
}

/// Create a test PDF with one page per `(width, height, rotate)` entry
pub fn create_test_pdf_with(pages: &[(i64, i64, Option<i64>)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();

    for (i, &(width, height, rotate)) in pages.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(50), Object::Integer(50)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        if let Some(angle) = rotate {
            page.set("Rotate", Object::Integer(angle));
        }
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Renders page N as a solid `(20 + 10 * N) x 30` image, so every page is
/// identifiable by its width alone.
#[derive(Default)]
pub struct StubRenderer {
    fail_on: Option<PageId>,
    rendered: RefCell<Vec<u32>>,
    scales: RefCell<Vec<f64>>,
}

impl StubRenderer {
    pub const HEIGHT: u32 = 30;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(page: PageId) -> Self {
        Self {
            fail_on: Some(page),
            ..Self::default()
        }
    }

    pub fn width_for(page: PageId) -> u32 {
        20 + 10 * page.0
    }

    pub fn raster_for(page: PageId) -> Raster {
        let shade = (page.0 * 40 % 256) as u8;
        Raster::from_image(RgbaImage::from_pixel(
            Self::width_for(page),
            Self::HEIGHT,
            Rgba([shade, 0, 255 - shade, 255]),
        ))
    }

    pub fn rendered(&self) -> Vec<u32> {
        self.rendered.borrow().clone()
    }

    pub fn scales(&self) -> Vec<f64> {
        self.scales.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PageRenderer for StubRenderer {
    async fn render_page(&self, page: PageId, scale: f64) -> Result<Raster, RenderFailure> {
        self.rendered.borrow_mut().push(page.0);
        self.scales.borrow_mut().push(scale);
        if self.fail_on == Some(page) {
            return Err(RenderFailure("canvas context lost".into()));
        }
        Ok(Self::raster_for(page))
    }
}
