//! Error types for the edgequake-pdfqa library.
//!
//! Every failure in the pipeline is request-scoped and terminal: nothing is
//! retried. [`PdfQaError`] carries enough detail (the offending filename, the
//! backend's own message) for the HTTP layer to report it verbatim.
//!
//! One failure mode is *not* an error: a single page whose text
//! layer cannot be read contributes an empty string to the corpus and is only
//! logged. Document-level and batch-level failures abort the request.

use thiserror::Error;

/// All errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Request validation ────────────────────────────────────────────────
    /// The question was absent or the empty string.
    #[error("Missing 'question' field.")]
    MissingQuestion,

    /// The uploaded filename has no usable final path component.
    #[error("Invalid file name: {name:?}")]
    InvalidFilename { name: String },

    // ── Corpus errors ─────────────────────────────────────────────────────
    /// Extraction succeeded but produced only whitespace.
    ///
    /// `recovered` distinguishes the ingestion path from the
    /// recovery-from-storage path; only the message differs.
    #[error("{}", empty_content_message(.recovered))]
    EmptyContent { recovered: bool },

    /// The in-memory corpus is empty and storage holds no PDF to rebuild it from.
    #[error("No uploaded PDFs found in local storage.")]
    NoDocuments,

    // ── Document errors ───────────────────────────────────────────────────
    /// Writing, reading, or listing stored documents failed.
    ///
    /// `action` is the verb shown to the caller: `"save"`, `"read"`, `"list"`.
    #[error("Failed to {action} file: {filename}")]
    Storage {
        action: &'static str,
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes could not be parsed as a PDF.
    #[error("Error reading PDF: {filename}: {detail}")]
    Extraction { filename: String, detail: String },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The completion backend failed (transport, HTTP status, or response shape).
    #[error("Sambanova API error: {message}")]
    Backend { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

fn empty_content_message(recovered: &bool) -> &'static str {
    if *recovered {
        "No readable text found in uploaded PDFs."
    } else {
        "No readable text in uploaded PDFs."
    }
}

impl PdfQaError {
    /// `true` when the failure was caused by the request itself rather than
    /// by storage, parsing, or the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfQaError::MissingQuestion
                | PdfQaError::InvalidFilename { .. }
                | PdfQaError::EmptyContent { .. }
                | PdfQaError::NoDocuments
        )
    }
}
