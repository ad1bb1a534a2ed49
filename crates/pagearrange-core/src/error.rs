use thiserror::Error;

use crate::page_order::PageId;

/// Failure to turn an input file into a loaded document.
///
/// Session state is never touched when one of these is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File too small to be a valid PDF ({0} bytes)")]
    TooSmall(usize),

    #[error("Not a valid PDF file (missing %PDF- header)")]
    MissingHeader,

    #[error("PDF appears truncated (missing %%EOF marker)")]
    Truncated,

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Failed to render page {page}: {reason}")]
    RenderError { page: u32, reason: String },

    #[error("A document is already being loaded")]
    Busy,
}

/// Failure reported by a page rendering collaborator
#[derive(Error, Debug)]
#[error("{0}")]
pub struct RenderFailure(pub String);

impl From<RasterError> for RenderFailure {
    fn from(err: RasterError) -> Self {
        RenderFailure(err.to_string())
    }
}

/// Failure while assembling the output document.
///
/// An export either produces the complete document or nothing.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No document loaded")]
    NothingLoaded,

    #[error("No raster available for page {0}")]
    MissingRaster(PageId),

    #[error("Failed to encode page {page}: {reason}")]
    EncodeError { page: PageId, reason: String },

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Cannot export while a document is loading")]
    Busy,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReorderError {
    #[error("Position {position} is out of range (document has {len} pages)")]
    OutOfRange { position: usize, len: usize },

    #[error("Invalid order: expected {expected} pages, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Invalid order: page {0} does not exist")]
    UnknownPage(PageId),

    #[error("Invalid order: page {0} listed twice")]
    DuplicatePage(PageId),

    #[error("Invalid page number: {0:?}")]
    InvalidPageNumber(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CropError {
    #[error("Crop region is empty")]
    EmptyRegion,

    #[error("Crop region ({x}, {y}) lies outside the {width}x{height} image")]
    OutsideImage {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        actual: usize,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("render_scale must be positive, got {0}")]
    InvalidScale(f64),

    #[error("zoom range [{min}, {max}] is invalid")]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("zoom_initial {0} lies outside the zoom range")]
    InitialZoomOutOfRange(f64),

    #[error("export_file_name must not be empty")]
    EmptyFileName,
}

/// Any failure a session operation can report.
#[derive(Error, Debug)]
pub enum PageArrangeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Page {0} does not exist")]
    UnknownPage(PageId),

    #[error("No document loaded")]
    NothingLoaded,

    #[error("Session is busy loading a document")]
    Busy,
}
