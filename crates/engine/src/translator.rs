//! The external translation seam.

use async_trait::async_trait;
use thiserror::Error;

/// Failure kinds a translation backend can report.
///
/// The scheduler retries `Transient` failures with backoff and treats
/// `Fatal` as non-retryable.
#[derive(Error, Debug, Clone)]
pub enum TranslateError {
    /// Network problem, rate limit, or other condition worth retrying.
    #[error("transient translation failure: {0}")]
    Transient(String),

    /// The backend cannot serve this request at all (bad credentials,
    /// rejected request, unsupported language).
    #[error("translation failure: {0}")]
    Fatal(String),
}

/// A translation backend: text plus target language in, translated
/// text out. Implementations must be safe to call concurrently; the
/// scheduler bounds how many calls are in flight.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslateError>;
}
