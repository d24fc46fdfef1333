//! Engine-level errors.
//!
//! Only two things abort a run: a structural document error and a
//! translation transport that is unusable for an entire batch. Blocked
//! geometry repairs and exhausted retries are policy decisions, not
//! errors, and surface through the summary counters instead.

use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Structural problem in the document itself.
    #[error(transparent)]
    Document(#[from] slideglot_core::Error),

    /// Every call in a translation batch failed non-transiently; the
    /// transport is unusable and continuing would degrade the whole
    /// deck to passthrough.
    #[error("Translation transport unusable: {0}")]
    TransportUnusable(String),
}
