//! PDF validation and info extraction
//!
//! Rejects files that cannot be loaded before any page is rendered.

use lopdf::Document;
use serde::Serialize;

use crate::error::LoadError;

/// Smallest byte count that can hold a `%PDF-x.y` header
const MIN_PDF_SIZE: usize = 8;

/// How far from the end of the file the `%%EOF` marker is searched for
const EOF_SEARCH_WINDOW: usize = 1024;

/// Document-level facts shown before and after loading
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    pub page_count: u32,
    /// Header version, `"1.4"` when the header is unreadable
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    /// `/Title` from the Info dictionary
    pub title: Option<String>,
    /// `/Author` from the Info dictionary
    pub author: Option<String>,
}

/// Parse and validate a PDF, returning the parsed document with its info.
pub fn parse_pdf(bytes: &[u8]) -> Result<(Document, PdfInfo), LoadError> {
    check_header(bytes)?;

    let version = extract_version(bytes);

    let document = Document::load_mem(bytes).map_err(|e| LoadError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(LoadError::NoPages);
    }

    let (title, author) = extract_metadata(&document);

    let info = PdfInfo {
        page_count,
        version,
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    };

    Ok((document, info))
}

/// Like [`parse_pdf`], keeping only the info.
pub fn validate_pdf(bytes: &[u8]) -> Result<PdfInfo, LoadError> {
    parse_pdf(bytes).map(|(_, info)| info)
}

/// Header and `%%EOF` check only; cheap enough to run on drop.
pub fn quick_validate(bytes: &[u8]) -> Result<(), LoadError> {
    check_header(bytes)?;

    let tail = if bytes.len() > EOF_SEARCH_WINDOW {
        &bytes[bytes.len() - EOF_SEARCH_WINDOW..]
    } else {
        bytes
    };

    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(LoadError::Truncated);
    }

    Ok(())
}

fn check_header(bytes: &[u8]) -> Result<(), LoadError> {
    if bytes.len() < MIN_PDF_SIZE {
        return Err(LoadError::TooSmall(bytes.len()));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(LoadError::MissingHeader);
    }

    Ok(())
}

fn extract_version(bytes: &[u8]) -> String {
    bytes
        .get(5..MIN_PDF_SIZE)
        .filter(|_| bytes.starts_with(b"%PDF-"))
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

/// Extract title and author from the trailer's Info dictionary
fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info_dict = document
        .trailer
        .get(b"Info")
        .and_then(|obj| obj.as_reference())
        .ok()
        .and_then(|id| document.objects.get(&id))
        .and_then(|obj| obj.as_dict().ok());

    let Some(info_dict) = info_dict else {
        return (None, None);
    };

    let read = |key: &[u8]| -> Option<String> {
        let bytes = info_dict.get(key).ok()?.as_str().ok()?;
        let decoded = String::from_utf8_lossy(bytes);
        (!decoded.is_empty()).then(|| decoded.into_owned())
    };

    (read(b"Title"), read(b"Author"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::create_test_pdf;

    #[test]
    fn test_quick_validate_rejects_non_pdf() {
        assert!(matches!(
            quick_validate(b"not a pdf file"),
            Err(LoadError::MissingHeader)
        ));
    }

    #[test]
    fn test_quick_validate_rejects_small_file() {
        assert!(matches!(quick_validate(b"tiny"), Err(LoadError::TooSmall(4))));
    }

    #[test]
    fn test_quick_validate_rejects_truncated_file() {
        let pdf = create_test_pdf(1);
        let truncated = &pdf[..pdf.len() - 10];
        assert!(matches!(quick_validate(truncated), Err(LoadError::Truncated)));
    }

    #[test]
    fn test_quick_validate_accepts_valid_pdf() {
        let pdf = create_test_pdf(1);
        assert!(quick_validate(&pdf).is_ok());
    }

    #[test]
    fn test_validate_counts_pages_and_bytes() {
        let pdf = create_test_pdf(5);
        let info = validate_pdf(&pdf).unwrap();
        assert_eq!(info.page_count, 5);
        assert_eq!(info.size_bytes, pdf.len());
    }

    #[test]
    fn test_validate_reports_header_version() {
        let pdf = create_test_pdf(1);
        let info = validate_pdf(&pdf).unwrap();
        assert_eq!(info.page_count, 1);
        assert_eq!(info.version, "1.7");
        assert!(!info.encrypted);
        assert_eq!(info.title, None);
    }

    #[test]
    fn test_validate_pdf_rejects_garbage_after_header() {
        let result = validate_pdf(b"%PDF-1.7\nthis is not really a pdf");
        assert!(matches!(result, Err(LoadError::ParseError(_))));
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version(b"%PDF-1.7\n"), "1.7");
        assert_eq!(extract_version(b"%PDF-2.0\n"), "2.0");
        assert_eq!(extract_version(b"%PDF"), "1.4");
        assert_eq!(extract_version(b"garbage!"), "1.4");
    }
}
