//! Core domain types, fixed-point units, and text-unit extraction
//! for layout-preserving slide translation.

pub mod error;
pub mod extract;
pub mod types;
pub mod units;

pub use error::{Error, Result};
pub use extract::{extract_text_units, TextUnit};
pub use types::{
    Alignment, AutoSize, BulletScheme, BulletSpec, BulletStyle, Color, Document, Paragraph,
    ParagraphProps, Rect, Run, RunProps, Shape, Slide, Spacing, TextFrame,
};
