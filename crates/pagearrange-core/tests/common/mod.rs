//! Shared fixtures for pagearrange-core integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use pagearrange_core::{PageId, PageRenderer, Raster, RenderFailure};

/// Create a valid test PDF with the specified number of pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
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

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
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

/// Renders page N as a `(100 + 10 * N) x 50` image so output pages can be
/// traced back to their source by width.
pub struct WidthCodedRenderer;

impl WidthCodedRenderer {
    pub const HEIGHT: u32 = 50;

    pub fn width_for(page: PageId) -> u32 {
        100 + 10 * page.0
    }
}

#[async_trait(?Send)]
impl PageRenderer for WidthCodedRenderer {
    async fn render_page(&self, page: PageId, _scale: f64) -> Result<Raster, RenderFailure> {
        Ok(Raster::from_image(RgbaImage::from_pixel(
            Self::width_for(page),
            Self::HEIGHT,
            Rgba([200, 200, 200, 255]),
        )))
    }
}

/// Read a number that lopdf may have written as either integer or real
pub fn as_number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(n) => *n as f64,
        Object::Real(n) => *n as f64,
        other => panic!("Expected a number, got {:?}", other),
    }
}

/// Media box sizes of every page of an exported PDF, in page order
pub fn page_sizes(bytes: &[u8]) -> Vec<(f64, f64)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            (as_number(&media_box[2]), as_number(&media_box[3]))
        })
        .collect()
}

/// Operands of the first `cm` operator on every page, in page order
pub fn image_matrices(bytes: &[u8]) -> Vec<Vec<f64>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let raw = doc.get_page_content(page_id).unwrap();
            let content = Content::decode(&raw).unwrap();
            let cm = content
                .operations
                .iter()
                .find(|op| op.operator == "cm")
                .expect("page has no cm operator");
            cm.operands.iter().map(as_number).collect()
        })
        .collect()
}
