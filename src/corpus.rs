//! The shared text corpus questions are answered against.
//!
//! ## Synchronisation
//!
//! The corpus is one string, replaced wholesale. It is stored as an
//! `Arc<str>` behind a [`tokio::sync::RwLock`]:
//!
//! * readers clone the `Arc` and drop the lock at once, so an answer is always
//!   built from one complete corpus value, never a half-replaced one;
//! * writers swap the `Arc`. Two ingestion batches racing to replace the
//!   corpus still resolve last-writer-wins, but neither can observe a torn
//!   value.
//!
//! Rebuilding from storage is expensive, so [`Corpus::recovery_guard`] hands
//! out a single-flight lock: concurrent questions on an empty corpus queue on
//! it, and all but the first find the corpus already filled when they get it.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Process-wide corpus owned by a [`crate::QaService`].
#[derive(Debug)]
pub struct Corpus {
    text: RwLock<Arc<str>>,
    recovery: Mutex<()>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Corpus {
    /// An empty corpus.
    pub fn new() -> Self {
        Self {
            text: RwLock::new(Arc::from("")),
            recovery: Mutex::new(()),
        }
    }

    /// Current corpus value. Cheap: clones an `Arc`.
    pub async fn snapshot(&self) -> Arc<str> {
        Arc::clone(&*self.text.read().await)
    }

    /// `true` when nothing has been ingested or recovered yet.
    pub async fn is_empty(&self) -> bool {
        self.text.read().await.is_empty()
    }

    /// Replace the whole corpus (successful ingestion).
    pub async fn replace(&self, text: impl Into<Arc<str>>) {
        *self.text.write().await = text.into();
    }

    /// Store `text` only if the corpus is still empty (successful recovery).
    ///
    /// Returns whichever value the corpus holds afterwards, so a recovery that
    /// lost the race against an ingestion answers from the ingested text.
    pub async fn fill_if_empty(&self, text: impl Into<Arc<str>>) -> Arc<str> {
        let mut guard = self.text.write().await;
        if guard.is_empty() {
            *guard = text.into();
        }
        Arc::clone(&*guard)
    }

    /// Serialise recoveries. Hold the guard for the whole rebuild.
    pub async fn recovery_guard(&self) -> MutexGuard<'_, ()> {
        self.recovery.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let c = Corpus::new();
        assert!(c.is_empty().await);
        assert_eq!(&*c.snapshot().await, "");
    }

    #[tokio::test]
    async fn replace_is_wholesale() {
        let c = Corpus::new();
        c.replace("first batch").await;
        c.replace("second batch").await;
        assert_eq!(&*c.snapshot().await, "second batch");
    }

    #[tokio::test]
    async fn snapshot_survives_replace() {
        let c = Corpus::new();
        c.replace("old").await;
        let snap = c.snapshot().await;
        c.replace("new").await;
        assert_eq!(&*snap, "old");
        assert_eq!(&*c.snapshot().await, "new");
    }

    #[tokio::test]
    async fn fill_if_empty_does_not_clobber_ingested_text() {
        let c = Corpus::new();
        assert_eq!(&*c.fill_if_empty("recovered").await, "recovered");

        let c = Corpus::new();
        c.replace("ingested").await;
        assert_eq!(&*c.fill_if_empty("recovered").await, "ingested");
        assert_eq!(&*c.snapshot().await, "ingested");
    }

    #[tokio::test]
    async fn recovery_guard_is_exclusive() {
        let c = Arc::new(Corpus::new());
        let guard = c.recovery_guard().await;
        let c2 = Arc::clone(&c);
        let waiter = tokio::spawn(async move {
            let _g = c2.recovery_guard().await;
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
    }
}
