//! Durable storage for uploaded documents.
//!
//! The persisted layout is one directory holding one file per
//! upload, named by the uploaded filename. Re-uploading a name overwrites the
//! previous bytes. There is no manifest; [`DocumentStore::list_pdfs`] is the
//! only index and is what corpus recovery walks.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Named-blob storage used by [`crate::QaService`].
///
/// Implementations must be last-write-wins per name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist `bytes` under `name`, replacing any previous document.
    async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Read back the document stored under `name`.
    async fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Names of stored documents ending in `.pdf` (any case), sorted.
    async fn list_pdfs(&self) -> io::Result<Vec<String>>;
}

/// `true` when `name` ends in `.pdf`, ignoring case.
pub fn is_pdf_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf")
}

/// Reduce a client-supplied filename to its final path component.
///
/// Browsers and HTTP clients may send full paths (`C:\Users\me\doc.pdf`) or
/// hostile ones (`../../etc/passwd`). Only the last component is kept, with
/// both `/` and `\` treated as separators. Returns `None` when nothing usable
/// is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." || last.contains('\0') {
        None
    } else {
        Some(last.to_string())
    }
}

/// [`DocumentStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Open (and create if needed) the storage directory.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!("Document store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        match sanitize_filename(name) {
            Some(clean) if clean == name => Ok(self.root.join(clean)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to store under {name:?}"),
            )),
        }
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.path_for(name)?;
        tokio::fs::read(&path).await
    }

    async fn list_pdfs(&self) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_pdf_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pdf_name_matching_ignores_case() {
        assert!(is_pdf_name("a.pdf"));
        assert!(is_pdf_name("REPORT.PDF"));
        assert!(is_pdf_name("mixed.Pdf"));
        assert!(!is_pdf_name("notes.txt"));
        assert!(!is_pdf_name("pdf"));
        assert!(!is_pdf_name(".pd"));
    }

    #[test]
    fn sanitize_keeps_last_component() {
        assert_eq!(sanitize_filename("doc.pdf").as_deref(), Some("doc.pdf"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename(r"C:\Users\me\report.pdf").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[tokio::test]
    async fn write_overwrites_same_name() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::open(dir.path()).await.unwrap();

        store.write("doc.pdf", b"version A").await.unwrap();
        store.write("doc.pdf", b"version B").await.unwrap();

        assert_eq!(store.read("doc.pdf").await.unwrap(), b"version B");
        assert_eq!(store.list_pdfs().await.unwrap(), vec!["doc.pdf"]);
    }

    #[tokio::test]
    async fn list_pdfs_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::open(dir.path().join("uploads"))
            .await
            .unwrap();

        store.write("b.pdf", b"b").await.unwrap();
        store.write("A.PDF", b"a").await.unwrap();
        store.write("notes.txt", b"n").await.unwrap();
        tokio::fs::create_dir(store.root().join("nested.pdf"))
            .await
            .unwrap();

        assert_eq!(store.list_pdfs().await.unwrap(), vec!["A.PDF", "b.pdf"]);
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::open(dir.path()).await.unwrap();
        let err = store.write("../escape.pdf", b"x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::open(dir.path()).await.unwrap();
        let err = store.read("ghost.pdf").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
