//! PPTX (Office Open XML) adapter.
//!
//! A .pptx file is a ZIP archive of XML parts. The parser lifts slide
//! parts into the core document model; the writer saves the mutated
//! model back by replaying each slide part's XML events, rewriting
//! only shape geometry, body properties, and the paragraph lists of
//! text-bearing shapes. Everything the model does not cover (images,
//! tables, charts, masters) passes through untouched.

pub mod parser;
pub mod writer;

pub use parser::PptxParser;
pub use writer::save_document;

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Extract a trailing number from a string like "rId2" or "slide3.xml".
pub(crate) fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    digits.parse().ok()
}
