//! Cosigner configuration.

use std::time::Duration;

use cosign_core::Email;

/// Default prefix of document URLs.
pub const DEFAULT_URL_BASE: &str = "https://docs.google.com/document/d/";

/// Configuration for the Cosigner.
#[derive(Debug, Clone)]
pub struct CosignConfig {
    /// Deadline for the external-store phase of one request.
    pub request_timeout: Duration,
    /// Service account granted `owner` on every created document.
    ///
    /// `None` skips the owner grant.
    pub owner_account: Option<Email>,
    /// Prefix of document URLs; the id and a trailing `/` are appended.
    pub url_base: String,
}

impl Default for CosignConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            owner_account: None,
            url_base: DEFAULT_URL_BASE.to_string(),
        }
    }
}

impl CosignConfig {
    /// URL of a document.
    pub fn document_url(&self, document_id: &cosign_core::DocumentId) -> String {
        format!("{}{}/", self.url_base, document_id)
    }
}
