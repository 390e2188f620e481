//! Ingestion and answering: the two operations the HTTP layer exposes.
//!
//! ## Data Flow
//!
//! ```text
//! ingest:  upload ──▶ store.write ──▶ store.read ──▶ extract ──▶ corpus.replace
//! answer:  question ──▶ corpus.snapshot ─(empty)─▶ recover ──▶ prompt ──▶ backend
//! recover: store.list_pdfs ──▶ store.read ──▶ extract ──▶ corpus.fill_if_empty
//! ```
//!
//! Extraction always works on bytes re-read from storage, never on the request
//! buffer, so ingestion and recovery see exactly the same input for a given
//! file and produce the same corpus.

use crate::backend::{ChatCompletionsBackend, CompletionBackend};
use crate::config::ServiceConfig;
use crate::corpus::Corpus;
use crate::error::PdfQaError;
use crate::extract::{join_pages, ExtractError, PdfiumExtractor, TextExtractor};
use crate::prompts::build_prompt;
use crate::storage::{sanitize_filename, DocumentStore, FsDocumentStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// One uploaded file: its client-supplied name and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Summary of a successful ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Stored names, in input order.
    pub documents: Vec<String>,
    /// Length in bytes of the new corpus.
    pub characters: usize,
}

/// The question-answering service. Cheap to share behind an `Arc`.
pub struct QaService {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    backend: Arc<dyn CompletionBackend>,
    corpus: Corpus,
}

impl QaService {
    /// Assemble a service from its collaborators with an empty corpus.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            store,
            extractor,
            backend,
            corpus: Corpus::new(),
        }
    }

    /// Production wiring: directory store, pdfium extractor, chat-completions backend.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, PdfQaError> {
        let store = FsDocumentStore::open(&config.upload_dir)
            .await
            .map_err(|e| PdfQaError::Storage {
                action: "create",
                filename: config.upload_dir.display().to_string(),
                source: e,
            })?;
        let backend = ChatCompletionsBackend::new(&config.api_key, config.api_timeout_secs)
            .map_err(|e| PdfQaError::InvalidConfig(e.message))?;

        info!("Uploads directory: {}", store.root().display());
        Ok(Self::new(
            Arc::new(store),
            Arc::new(PdfiumExtractor::new()),
            Arc::new(backend),
        ))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Store every document, extract all their text, and replace the corpus.
    ///
    /// # Errors
    /// - [`PdfQaError::InvalidFilename`]: a name with no usable final component
    /// - [`PdfQaError::Storage`]: a write or the read-back failed
    /// - [`PdfQaError::Extraction`]: stored bytes are not a readable PDF
    /// - [`PdfQaError::EmptyContent`]: nothing but whitespace was extracted
    ///
    /// The first failing document aborts the batch and the corpus is left as
    /// it was. Files already written by the batch stay on disk.
    pub async fn ingest(
        &self,
        documents: Vec<UploadedDocument>,
    ) -> Result<IngestReport, PdfQaError> {
        let start = Instant::now();
        info!("Ingesting {} document(s)", documents.len());

        let mut text = String::new();
        let mut stored = Vec::with_capacity(documents.len());

        for doc in documents {
            let name = sanitize_filename(&doc.filename).ok_or_else(|| {
                PdfQaError::InvalidFilename {
                    name: doc.filename.clone(),
                }
            })?;

            self.store
                .write(&name, &doc.bytes)
                .await
                .map_err(|e| PdfQaError::Storage {
                    action: "save",
                    filename: name.clone(),
                    source: e,
                })?;
            debug!("Saved {} ({} bytes)", name, doc.bytes.len());

            text.push_str(&self.read_and_extract(&name).await?);
            stored.push(name);
        }

        if text.trim().is_empty() {
            return Err(PdfQaError::EmptyContent { recovered: false });
        }

        let characters = text.len();
        self.corpus.replace(text).await;
        info!(
            "Corpus replaced: {} document(s), {} chars, {}ms",
            stored.len(),
            characters,
            start.elapsed().as_millis()
        );

        Ok(IngestReport {
            documents: stored,
            characters,
        })
    }

    /// Answer `question` from the corpus via the completion backend.
    ///
    /// # Errors
    /// - [`PdfQaError::MissingQuestion`]: `None` or the empty string
    /// - any error of [`QaService::recover`] when the corpus is empty
    /// - [`PdfQaError::Backend`]: the completion call failed
    pub async fn answer(&self, question: Option<&str>) -> Result<String, PdfQaError> {
        let question = match question {
            Some(q) if !q.is_empty() => q,
            _ => return Err(PdfQaError::MissingQuestion),
        };

        let mut context = self.corpus.snapshot().await;
        if context.is_empty() {
            context = self.recover().await?;
        }

        let prompt = build_prompt(&context, question);
        debug!(
            "Prompt built: {} chars ({} context, {} question)",
            prompt.len(),
            context.len(),
            question.len()
        );

        let start = Instant::now();
        let answer = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| PdfQaError::Backend { message: e.message })?;
        info!(
            "Answered in {}ms ({} chars)",
            start.elapsed().as_millis(),
            answer.len()
        );

        Ok(answer)
    }

    /// Rebuild the corpus from every PDF in storage, in filename order.
    ///
    /// Single-flight: concurrent callers wait for the first rebuild and reuse
    /// its result. If an ingestion fills the corpus meanwhile, the ingested
    /// text is kept and returned.
    ///
    /// # Errors
    /// - [`PdfQaError::NoDocuments`]: storage holds no PDF
    /// - [`PdfQaError::Storage`] / [`PdfQaError::Extraction`]: as for ingestion
    /// - [`PdfQaError::EmptyContent`]: stored PDFs hold no text
    pub async fn recover(&self) -> Result<Arc<str>, PdfQaError> {
        let _guard = self.corpus.recovery_guard().await;

        let current = self.corpus.snapshot().await;
        if !current.is_empty() {
            debug!("Corpus filled while waiting for recovery; skipping");
            return Ok(current);
        }

        let names = self
            .store
            .list_pdfs()
            .await
            .map_err(|e| PdfQaError::Storage {
                action: "list",
                filename: "uploads".into(),
                source: e,
            })?;
        if names.is_empty() {
            return Err(PdfQaError::NoDocuments);
        }
        info!("Corpus empty; recovering from {} stored PDF(s)", names.len());

        let mut text = String::new();
        for name in &names {
            text.push_str(&self.read_and_extract(name).await?);
        }

        if text.trim().is_empty() {
            return Err(PdfQaError::EmptyContent { recovered: true });
        }

        let corpus = self.corpus.fill_if_empty(text).await;
        info!("Corpus recovered: {} chars", corpus.len());
        Ok(corpus)
    }

    /// Read `name` back from storage and extract all of its pages.
    async fn read_and_extract(&self, name: &str) -> Result<String, PdfQaError> {
        let bytes = self
            .store
            .read(name)
            .await
            .map_err(|e| PdfQaError::Storage {
                action: "read",
                filename: name.to_string(),
                source: e,
            })?;

        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&bytes))
            .await
            .map_err(|e| PdfQaError::Internal(format!("Extraction task panicked: {}", e)))?
            .map_err(|e| match e {
                ExtractError::Unreadable(detail) => PdfQaError::Extraction {
                    filename: name.to_string(),
                    detail,
                },
                ExtractError::Unavailable(detail) => PdfQaError::Internal(detail),
            })?;

        debug!("Extracted {} page(s) from {}", pages.len(), name);
        Ok(join_pages(&pages))
    }
}
