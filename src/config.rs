//! Configuration for the question-answering service.
//!
//! Everything the service needs at startup lives in [`ServiceConfig`], built
//! via its [`ServiceConfigBuilder`]. The completion backend's base URL, model
//! identifier and sampling parameters are compile-time constants in
//! [`crate::backend`]; only deployment concerns (secret, storage directory,
//! limits) are configurable here.

use crate::error::PdfQaError;
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the backend API key.
pub const API_KEY_ENV: &str = "SAMBANOVA_API_KEY";

/// Key name accepted from a `.env` file, kept for compatibility with existing
/// deployments. Not a valid shell identifier, so it only arrives via dotenv.
pub const API_KEY_DOTENV: &str = "sambanova-api-key";

/// Configuration for a [`crate::QaService`].
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("sn-test")
///     .upload_dir("/var/lib/pdfqa")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_timeout_secs, 30);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Secret for the completion backend. Required.
    pub api_key: String,

    /// Directory holding one file per uploaded document. Default: `./uploads`.
    ///
    /// Created on startup if missing. Its listing is the only index used when
    /// the in-memory corpus has to be rebuilt.
    pub upload_dir: PathBuf,

    /// Per-request timeout for the completion backend in seconds. Default: 120.
    ///
    /// The whole corpus is sent with every question, so large document sets
    /// make for slow completions; the timeout only guards against a hung
    /// connection.
    pub api_timeout_secs: u64,

    /// Maximum accepted body size for an upload request in bytes. Default: 64 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            upload_dir: PathBuf::from("./uploads"),
            api_timeout_secs: 120,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("upload_dir", &self.upload_dir)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Look up the API key in the process environment.
///
/// [`API_KEY_ENV`] wins over [`API_KEY_DOTENV`]; empty values are ignored.
pub fn api_key_from_env() -> Option<String> {
    [API_KEY_ENV, API_KEY_DOTENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, PdfQaError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig(format!(
                "Missing '{}' (set {} or add it to .env)",
                API_KEY_DOTENV, API_KEY_ENV
            )));
        }
        if c.upload_dir.as_os_str().is_empty() {
            return Err(PdfQaError::InvalidConfig(
                "Upload directory must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfQaError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(PdfQaError::InvalidConfig(
                "Maximum upload size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ServiceConfig::default();
        assert_eq!(c.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(c.api_timeout_secs, 120);
        assert_eq!(c.max_upload_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn build_requires_api_key() {
        let err = ServiceConfig::builder().build().unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidConfig(_)));
        assert!(err.to_string().contains(API_KEY_DOTENV));

        let err = ServiceConfig::builder().api_key("   ").build().unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_zero_limits() {
        let err = ServiceConfig::builder()
            .api_key("k")
            .api_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));

        let err = ServiceConfig::builder()
            .api_key("k")
            .max_upload_bytes(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("upload"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ServiceConfig::builder().api_key("sn-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sn-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }
}
