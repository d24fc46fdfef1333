//! Stage 1: walk the document and emit text units for translation.

use crate::types::Document;
use serde::{Deserialize, Serialize};

/// One extracted (slide, original text) pair awaiting translation.
///
/// Immutable once created; the scheduler consumes these and the
/// reconstruction stage re-resolves shapes by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextUnit {
    /// 0-based slide index.
    pub slide_index: usize,

    /// Id of the shape the text came from.
    pub shape_id: u32,

    /// Whitespace-trimmed shape text.
    pub text: String,
}

/// Walk every slide in order and emit one unit per non-empty
/// text-bearing shape.
pub fn extract_text_units(document: &Document) -> Vec<TextUnit> {
    let mut units = Vec::new();

    for (slide_index, slide) in document.slides.iter().enumerate() {
        for shape in &slide.shapes {
            if !shape.has_text_frame() {
                continue;
            }

            let text = shape.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            units.push(TextUnit {
                slide_index,
                shape_id: shape.id,
                text: text.to_string(),
            });
        }
    }

    log::debug!("Extracted {} text units", units.len());
    units
}
