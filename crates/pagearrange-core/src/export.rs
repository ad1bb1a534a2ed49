//! PDF export
//!
//! Builds a new document with one page per entry of the page order. Each
//! page holds its raster as an image XObject, drawn with the page rotation
//! applied:
//!
//! ```text
//! q  a b c d e f cm  /Im0 Do  Q
//! ```
//!
//! The page box is the bounding box of the rotated raster, so quarter turns
//! swap width and height and nothing is clipped.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::document::LoadedDocument;
use crate::error::ExportError;
use crate::page_order::PageId;
use crate::raster::Raster;
use crate::rotation::Rotation;

const IMAGE_NAME: &str = "Im0";

/// The assembled output, ready to be saved by the front end.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub page_count: u32,
    pub bytes: Vec<u8>,
}

/// Where a raster lands on its output page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Image transformation matrix `[a b c d e f]`
    pub matrix: [f64; 6],
    pub page_width: f64,
    pub page_height: f64,
}

impl Placement {
    /// Place a `width` x `height` image rotated clockwise by `rotation`.
    pub fn new(width: f64, height: f64, rotation: Rotation) -> Self {
        let theta = rotation.radians();
        let (sin, cos) = (snap(theta.sin()), snap(theta.cos()));

        // Unit square -> scaled image -> rotated clockwise about the origin
        let a = width * cos;
        let b = -width * sin;
        let c = height * sin;
        let d = height * cos;

        let xs = [0.0, a, c, a + c];
        let ys = [0.0, b, d, b + d];
        let (min_x, max_x) = bounds(&xs);
        let (min_y, max_y) = bounds(&ys);

        Self {
            matrix: [a, b, c, d, -min_x, -min_y].map(snap),
            page_width: snap(max_x - min_x),
            page_height: snap(max_y - min_y),
        }
    }
}

fn bounds(values: &[f64; 4]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Round away floating point noise from trigonometry, and drop negative zero.
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    let snapped = if (value - rounded).abs() < 1e-9 {
        rounded
    } else {
        value
    };
    snapped + 0.0
}

/// Assemble the output PDF for `document` in its current page order.
pub fn export_document(
    document: &LoadedDocument,
    config: &EditorConfig,
) -> Result<Vec<u8>, ExportError> {
    let mut out = Document::with_version(config.pdf_version.as_str());
    let pages_id = out.new_object_id();

    let mut kids = Vec::with_capacity(document.order().len());
    for (position, id) in document.order().iter().enumerate() {
        let page = document.page(id).ok_or(ExportError::MissingRaster(id))?;
        let raster = page.current_raster();
        if raster.width() == 0 || raster.height() == 0 {
            return Err(ExportError::MissingRaster(id));
        }

        debug!(
            "Exporting page {} at position {} ({}x{}, {})",
            id,
            position,
            raster.width(),
            raster.height(),
            page.rotation()
        );
        let page_id = add_image_page(&mut out, pages_id, id, raster, page.rotation())?;
        kids.push(Object::Reference(page_id));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    out.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = out.add_object(catalog);
    out.trailer.set("Root", Object::Reference(catalog_id));

    let producer = Dictionary::from_iter(vec![(
        "Producer",
        Object::string_literal(format!("pagearrange {}", env!("CARGO_PKG_VERSION"))),
    )]);
    let info_id = out.add_object(producer);
    out.trailer.set("Info", Object::Reference(info_id));

    if config.compress_output {
        out.compress();
    }

    let mut buffer = Vec::new();
    out.save_to(&mut buffer)
        .map_err(|e| ExportError::SaveError(e.to_string()))?;

    info!(
        "Exported {} pages ({} bytes)",
        document.order().len(),
        buffer.len()
    );
    Ok(buffer)
}

fn add_image_page(
    out: &mut Document,
    pages_id: ObjectId,
    id: PageId,
    raster: &Raster,
    rotation: Rotation,
) -> Result<ObjectId, ExportError> {
    let image_id = embed_raster(out, id, raster)?;

    let placement = Placement::new(raster.width() as f64, raster.height() as f64, rotation);
    let [a, b, c, d, e, f] = placement.matrix.map(|v| Object::Real(v as f32));
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![a, b, c, d, e, f]),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|e| ExportError::EncodeError {
        page: id,
        reason: e.to_string(),
    })?;
    let content_id = out.add_object(Stream::new(Dictionary::new(), encoded));

    let xobjects = Dictionary::from_iter(vec![(IMAGE_NAME, Object::Reference(image_id))]);
    let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);

    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(placement.page_width as f32),
                Object::Real(placement.page_height as f32),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    Ok(out.add_object(page))
}

/// Add the raster as a Flate-compressed RGB image, with a soft mask when it
/// carries transparency.
fn embed_raster(out: &mut Document, id: PageId, raster: &Raster) -> Result<ObjectId, ExportError> {
    let (rgb, alpha) = raster.split_channels();

    let mut image_dict = image_dictionary(raster, "DeviceRGB");
    if let Some(alpha) = alpha {
        let mask = Stream::new(image_dictionary(raster, "DeviceGray"), deflate(id, &alpha)?)
            .with_compression(false);
        let mask_id = out.add_object(mask);
        image_dict.set("SMask", Object::Reference(mask_id));
    }

    let image = Stream::new(image_dict, deflate(id, &rgb)?).with_compression(false);
    Ok(out.add_object(image))
}

fn image_dictionary(raster: &Raster, color_space: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(raster.width() as i64)),
        ("Height", Object::Integer(raster.height() as i64)),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ])
}

fn deflate(id: PageId, data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let to_error = |e: std::io::Error| ExportError::EncodeError {
        page: id,
        reason: e.to_string(),
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(to_error)?;
    encoder.finish().map_err(to_error)
}
