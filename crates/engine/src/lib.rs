//! Layout-preserving translation engine for slide documents.
//!
//! Two core components wired into a three-stage pipeline:
//!
//! 1. the translation scheduler, which drives many independent
//!    translation calls under a bounded concurrency limit with retry
//!    and graceful degradation, and
//! 2. the reconstruction engine, which rewrites each translated shape
//!    in place: capturing and restoring its full style, scaling font
//!    sizes group-wise, and repairing box geometry without introducing
//!    overlaps on the slide canvas.
//!
//! The stages are separated by a hard barrier: reconstruction never
//! starts until the translation map is fully populated.

pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod ratio;
pub mod reconstruct;
pub mod scale;
pub mod scheduler;
pub mod style;
pub mod translator;

pub use error::EngineError;
pub use pipeline::translate_document;
pub use reconstruct::{reconstruct, EngineOptions, Summary};
pub use scheduler::{translate_texts, SchedulerConfig, TranslationMap};
pub use translator::{TranslateError, Translator};
