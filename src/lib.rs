//! # edgequake-pdfqa
//!
//! Answer natural-language questions grounded in uploaded PDF documents.
//!
//! Uploaded PDFs are stored on disk, their text is extracted with pdfium and
//! flattened into one shared corpus, and every question is sent to an LLM
//! together with the whole corpus and an instruction to answer only from it.
//! There is no chunking, embedding, or retrieval step: the model always sees
//! everything that was uploaded.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /upload_pdfs                         POST /ask_question
//!  │                                          │
//!  ├─ 1. Store    one file per upload         ├─ 1. Validate  non-empty question
//!  ├─ 2. Re-read  bytes from storage          ├─ 2. Corpus    snapshot, or recover
//!  ├─ 3. Extract  pdfium, every page          │               from storage if empty
//!  └─ 4. Replace  the shared corpus           ├─ 3. Prompt    grounding template
//!                                             └─ 4. Complete  single LLM call
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{router, QaService, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder()
//!         .api_key(std::env::var("SAMBANOVA_API_KEY")?)
//!         .build()?;
//!     let service = Arc::new(QaService::from_config(&config).await?);
//!     let app = router(service, config.max_upload_bytes);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` server binary (clap + anyhow + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod server;
pub mod service;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendError, ChatCompletionsBackend, CompletionBackend};
pub use config::{api_key_from_env, ServiceConfig, ServiceConfigBuilder};
pub use corpus::Corpus;
pub use error::PdfQaError;
pub use extract::{ExtractError, PdfiumExtractor, TextExtractor};
pub use server::router;
pub use service::{IngestReport, QaService, UploadedDocument};
pub use storage::{DocumentStore, FsDocumentStore};
