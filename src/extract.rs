//! PDF text extraction.
//!
//! pdfium is a native library bound at runtime. The service only sees
//! [`TextExtractor`] and always calls it from the blocking pool.
//!
//! ## Page-level tolerance
//!
//! A page whose text layer cannot be read, or which simply has no text
//! (a scanned image), contributes an empty string. Only a document that cannot
//! be opened at all is an error.

use pdfium_render::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable pointing at an existing libpdfium.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Why a document yielded no pages at all.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The bytes are not a readable PDF (bad header, corrupt xref, encrypted).
    #[error("{0}")]
    Unreadable(String),

    /// The extraction backend itself is unavailable (e.g. libpdfium missing).
    #[error("PDF engine unavailable: {0}")]
    Unavailable(String),
}

/// Extracts plain text, one string per page, from PDF bytes.
///
/// Called from `spawn_blocking`; implementations may block.
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// Concatenate page texts in order with no separator.
pub fn join_pages(pages: &[String]) -> String {
    pages.concat()
}

/// Fail fast on bytes that cannot be a PDF, before handing them to pdfium.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), ExtractError> {
    if bytes.len() < 4 {
        return Err(ExtractError::Unreadable(format!(
            "file too short to be a PDF ({} bytes)",
            bytes.len()
        )));
    }
    if &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(ExtractError::Unreadable(format!(
            "not a PDF (first bytes {magic:?})"
        )));
    }
    Ok(())
}

/// [`TextExtractor`] backed by pdfium-render.
///
/// Library resolution, first match wins:
/// 1. `PDFIUM_LIB_PATH`: explicit path to libpdfium
/// 2. the platform library name in the current directory
/// 3. the system library search path
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    lib_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always bind to the library at `path`.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            lib_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let explicit = self
            .lib_path
            .clone()
            .or_else(|| std::env::var(PDFIUM_LIB_PATH_ENV).ok().map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => Pdfium::bind_to_library(&path).map_err(|e| {
                ExtractError::Unavailable(format!("{}: {:?}", path.display(), e))
            })?,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| {
                    ExtractError::Unavailable(format!(
                        "{:?}\nSet {}=/path/to/libpdfium to use an existing copy.",
                        e, PDFIUM_LIB_PATH_ENV
                    ))
                })?,
        };

        Ok(Pdfium::new(bindings))
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        check_pdf_magic(bytes)?;
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            let detail = format!("{:?}", e);
            if detail.contains("Password") || detail.contains("password") {
                ExtractError::Unreadable("PDF is encrypted and requires a password".into())
            } else {
                ExtractError::Unreadable(detail)
            }
        })?;

        let pages = document.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let text = match page.text() {
                Ok(t) => t.all(),
                Err(e) => {
                    warn!("Page {}: text layer unreadable, using empty text: {:?}", idx + 1, e);
                    String::new()
                }
            };
            debug!("Page {}: {} chars", idx + 1, text.len());
            texts.push(text);
        }

        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_has_no_separator() {
        let pages = vec!["Hello ".to_string(), String::new(), "world".to_string()];
        assert_eq!(join_pages(&pages), "Hello world");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn magic_check_rejects_non_pdf() {
        assert!(check_pdf_magic(b"%PDF-1.7\n").is_ok());

        let err = check_pdf_magic(b"PK\x03\x04zip").unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable(_)));
        assert!(err.to_string().contains("not a PDF"));

        let err = check_pdf_magic(b"%P").unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn pdfium_extractor_rejects_garbage_before_binding() {
        // Never reaches pdfium, so this runs without the native library.
        let extractor = PdfiumExtractor::with_library("/nonexistent/libpdfium.so");
        let err = extractor.extract_pages(b"hello world").unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable(_)));
    }

    #[test]
    fn pdfium_extractor_reports_missing_library() {
        let extractor = PdfiumExtractor::with_library("/nonexistent/libpdfium.so");
        let err = extractor.extract_pages(b"%PDF-1.4\n%%EOF").unwrap_err();
        assert!(matches!(err, ExtractError::Unavailable(_)), "got: {err:?}");
    }
}
