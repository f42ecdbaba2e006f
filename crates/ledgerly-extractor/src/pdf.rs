//! Per-page text extraction
//!
//! Pages are extracted independently so that one undecodable page costs
//! only that page. Supported inputs:
//!
//! - `.pdf`: text per page via `lopdf`
//! - `.txt`: a plain-text export with pages separated by form feeds

use crate::error::ExtractorError;
use ledgerly_domain::RawPage;
use std::path::Path;
use tracing::{debug, warn};

/// Extensions recognised as images and rejected explicitly
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "heic", "gif", "bmp"];

/// Extract the usable pages of a document, in page order
///
/// Blank pages and pages that fail to decode are skipped with a log line.
/// A document with no usable page is an error.
pub fn extract_pages(path: &Path) -> Result<Vec<RawPage>, ExtractorError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let pages = match extension.as_str() {
        "pdf" => extract_pdf_pages(path)?,
        "txt" => extract_text_pages(path)?,
        ext if IMAGE_EXTENSIONS.contains(&ext) => {
            return Err(ExtractorError::UnsupportedImage(path.display().to_string()));
        }
        _ => return Err(ExtractorError::UnsupportedFormat(path.display().to_string())),
    };

    if pages.is_empty() {
        return Err(ExtractorError::NoPages(path.display().to_string()));
    }

    debug!("Extracted {} page(s) from {}", pages.len(), path.display());
    Ok(pages)
}

fn extract_pdf_pages(path: &Path) -> Result<Vec<RawPage>, ExtractorError> {
    let doc = lopdf::Document::load(path)?;
    let mut pages = Vec::new();

    for number in doc.get_pages().keys().copied() {
        match doc.extract_text(&[number]) {
            Ok(text) => push_page(&mut pages, number, text, path),
            Err(e) => warn!(
                "Skipping page {} of {}: {}",
                number,
                path.display(),
                e
            ),
        }
    }

    Ok(pages)
}

fn extract_text_pages(path: &Path) -> Result<Vec<RawPage>, ExtractorError> {
    let content = std::fs::read_to_string(path)?;
    let mut pages = Vec::new();

    for (index, text) in content.split('\u{c}').enumerate() {
        push_page(&mut pages, index as u32 + 1, text.to_string(), path);
    }

    Ok(pages)
}

fn push_page(pages: &mut Vec<RawPage>, number: u32, text: String, path: &Path) {
    if text.trim().is_empty() {
        debug!("Skipping blank page {} of {}", number, path.display());
        return;
    }
    pages.push(RawPage { number, text });
}
