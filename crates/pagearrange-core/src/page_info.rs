//! Page-level information extraction
//!
//! Reads the geometry of source pages so front ends can size thumbnails
//! before the rasters arrive.

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::error::LoadError;
use crate::rotation::Rotation;

/// US Letter, used when neither the page nor its parents carry a MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Information about a single source page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    /// Page number (1-indexed, as in the source document)
    pub page_num: u32,
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Rotation stored in the source document's /Rotate entry
    pub intrinsic_rotation: Rotation,
    /// Estimated orientation based on dimensions and intrinsic rotation
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

impl PageInfo {
    /// Extract page info from a document
    pub fn from_document(doc: &Document, page_num: u32) -> Result<Self, LoadError> {
        let pages = doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or_else(|| LoadError::ParseError(format!("Page {} not found", page_num)))?;

        let page_dict = doc
            .get_object(*page_id)
            .and_then(Object::as_dict)
            .map_err(|_| LoadError::ParseError(format!("Page {} is not a dictionary", page_num)))?;

        let media_box = inherited(doc, page_dict, b"MediaBox", |obj| {
            obj.as_array().ok().and_then(|a| parse_box_array(a))
        })
        .unwrap_or(DEFAULT_MEDIA_BOX);
        let (width, height) = (media_box[2] - media_box[0], media_box[3] - media_box[1]);

        let intrinsic_rotation = inherited(doc, page_dict, b"Rotate", |obj| obj.as_i64().ok())
            .map(|angle| Rotation::from_degrees(angle as i32))
            .unwrap_or_default();

        let (effective_width, effective_height) = if intrinsic_rotation.is_quarter_turn() {
            (height, width)
        } else {
            (width, height)
        };

        let orientation = if (effective_width - effective_height).abs() < 1.0 {
            PageOrientation::Square
        } else if effective_width > effective_height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };

        Ok(Self {
            page_num,
            width: width as f32,
            height: height as f32,
            intrinsic_rotation,
            orientation,
        })
    }

    /// Get all page infos for a document, in page order
    pub fn all_from_document(doc: &Document) -> Result<Vec<Self>, LoadError> {
        let count = doc.get_pages().len() as u32;
        (1..=count).map(|n| Self::from_document(doc, n)).collect()
    }
}

/// Look up an inheritable page attribute, walking up the page tree.
fn inherited<T>(
    doc: &Document,
    page_dict: &Dictionary,
    key: &[u8],
    read: impl Fn(&Object) -> Option<T>,
) -> Option<T> {
    let mut dict = page_dict;
    // Bounded walk so a cyclic Parent chain cannot loop forever
    for _ in 0..32 {
        if let Some(value) = dict.get(key).ok().and_then(&read) {
            return Some(value);
        }
        let parent: ObjectId = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        dict = doc.get_object(parent).and_then(Object::as_dict).ok()?;
    }
    None
}

/// Read `[llx lly urx ury]`; `None` unless all four entries are numbers.
fn parse_box_array(array: &[Object]) -> Option<[f64; 4]> {
    let numbers: Vec<f64> = array
        .iter()
        .map(|obj| match obj {
            Object::Integer(n) => Some(*n as f64),
            Object::Real(n) => Some(f64::from(*n)),
            _ => None,
        })
        .collect::<Option<_>>()?;
    numbers.try_into().ok()
}
