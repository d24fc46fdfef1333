//! Domain types for the in-memory slide document model.
//!
//! The model carries exactly what the translation pipeline needs:
//! shape geometry in EMU, paragraph and run formatting, and a closed
//! tagged bullet descriptor that keeps "inherited" distinct from
//! "explicitly suppressed".

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed presentation, mutable in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Slide width in EMU.
    pub slide_width: i64,

    /// Slide height in EMU.
    pub slide_height: i64,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// Path the document was opened from, if any.
    pub source_path: Option<PathBuf>,
}

impl Document {
    /// Create an empty document with the given canvas size.
    pub fn new(slide_width: i64, slide_height: i64) -> Self {
        Self {
            slide_width,
            slide_height,
            slides: Vec::new(),
            source_path: None,
        }
    }
}

/// A single slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// Shapes in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Look up a shape by its document-assigned id.
    pub fn shape_by_id(&self, id: u32) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Mutable lookup by shape id.
    pub fn shape_by_id_mut(&mut self, id: u32) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }
}

/// Axis-aligned shape placement on the slide canvas, in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }
}

/// A shape on a slide. Only text-bearing shapes carry a text frame;
/// pictures, tables, and charts are not modeled and pass through the
/// adapter untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Shape id from the document (`p:cNvPr id`), unique per slide.
    pub id: u32,

    /// Shape name from the document, informational only.
    pub name: String,

    /// Placement on the slide canvas.
    pub frame: Rect,

    /// Text content, if this shape has a text frame.
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    /// Create a text-bearing shape.
    pub fn new(id: u32, name: impl Into<String>, frame: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            frame,
            text_frame: Some(TextFrame::default()),
        }
    }

    /// Whether this shape carries a text frame.
    pub fn has_text_frame(&self) -> bool {
        self.text_frame.is_some()
    }

    /// Full shape text: paragraphs joined with `\n`, runs concatenated.
    pub fn text(&self) -> String {
        match &self.text_frame {
            Some(tf) => tf
                .paragraphs
                .iter()
                .map(|p| p.text())
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }

    /// Hard text swap: replaces the entire paragraph list with one
    /// default-formatted paragraph per line. An empty line yields a
    /// paragraph with zero runs. All previous run and paragraph
    /// formatting is lost; callers that care capture it first.
    pub fn set_text(&mut self, text: &str) {
        let tf = self.text_frame.get_or_insert_with(TextFrame::default);
        tf.paragraphs = text
            .split('\n')
            .map(|line| {
                let mut para = Paragraph::default();
                if !line.is_empty() {
                    para.runs.push(Run::new(line));
                }
                para
            })
            .collect();
    }
}

/// How the shape reacts to text that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoSize {
    /// No automatic resizing; overflow is allowed.
    None,
    /// Shrink text to fit the shape.
    ShrinkText,
    /// Grow the shape to fit the text.
    FitShape,
}

/// The text content of a shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFrame {
    /// Paragraphs in order.
    pub paragraphs: Vec<Paragraph>,

    /// Explicit word-wrap setting; `None` leaves the document value.
    pub word_wrap: Option<bool>,

    /// Explicit autosize behavior; `None` leaves the document value.
    pub auto_size: Option<AutoSize>,
}

/// One paragraph: properties plus formatted runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub props: ParagraphProps,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Paragraph-level formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProps {
    pub alignment: Option<Alignment>,

    /// Outline indent level, 0-based.
    pub level: Option<u8>,

    /// Left margin in EMU (`marL`).
    pub margin_left: Option<i64>,

    /// First-line indent in EMU (`indent`).
    pub indent: Option<i64>,

    pub space_before: Option<Spacing>,
    pub space_after: Option<Spacing>,

    /// Bullet/numbering descriptor. Defaults to `Inherited`.
    pub bullet: BulletSpec,
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Paragraph spacing, either absolute points or a percentage of the
/// line height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spacing {
    Points(f32),
    Percent(f32),
}

/// Bullet/numbering state for a paragraph.
///
/// `Inherited` means no explicit marker is present and the surrounding
/// layout/master resolves the bullet; writing any bullet markup for it
/// would silently convert it into an explicit bullet. `None` is an
/// explicit suppression marker. The explicit variants carry everything
/// needed to re-emit the marker verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum BulletSpec {
    #[default]
    Inherited,
    None,
    Char {
        ch: String,
        style: BulletStyle,
    },
    AutoNum {
        /// Numbering scheme name, e.g. `arabicPeriod`.
        scheme: String,
        start_at: u32,
        style: BulletStyle,
    },
    /// Picture bullet. The image payload stays in the document part
    /// and is referenced by the original markup; only presence is
    /// tracked here.
    Picture,
}

/// Numbering scheme helpers for `BulletSpec::AutoNum`.
pub struct BulletScheme;

impl BulletScheme {
    /// Scheme used when a document carries an autonumber marker with
    /// no `type` attribute.
    pub const DEFAULT: &'static str = "arabicPlain";
}

/// Shared styling for character and autonumber bullets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletStyle {
    /// Bullet typeface (`a:buFont`).
    pub font: Option<String>,

    /// Bullet size as percent of the text size (`a:buSzPct`, 100.0 = same size).
    pub size_percent: Option<f32>,

    /// Bullet color (`a:buClr`).
    pub color: Option<Color>,
}

/// A color in either direct RGB or theme-relative form. The two color
/// spaces round-trip differently and must not be conflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Direct RGB as an uppercase hex string, e.g. `FF0000`.
    Rgb(String),
    /// Theme color reference, e.g. `accent1`.
    Theme(String),
}

/// One formatted text run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub props: RunProps,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            props: RunProps::default(),
        }
    }
}

/// Run-level character formatting. `None` everywhere means the value
/// is inherited from the paragraph/layout defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProps {
    /// Latin typeface name.
    pub font: Option<String>,

    /// Font size in points.
    pub size_pt: Option<f32>,

    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,

    pub color: Option<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_with_text(text: &str) -> Shape {
        let mut shape = Shape::new(1, "TextBox 1", Rect::default());
        shape.set_text(text);
        shape
    }

    #[test]
    fn test_text_joins_paragraphs() {
        let shape = shape_with_text("Title\nSubtitle");
        assert_eq!(shape.text(), "Title\nSubtitle");
    }

    #[test]
    fn test_set_text_resets_runs_to_defaults() {
        let mut shape = shape_with_text("old");
        shape.text_frame.as_mut().unwrap().paragraphs[0].runs[0]
            .props
            .bold = Some(true);

        shape.set_text("new");
        let para = &shape.text_frame.as_ref().unwrap().paragraphs[0];
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.runs[0].props, RunProps::default());
        assert_eq!(para.props.bullet, BulletSpec::Inherited);
    }

    #[test]
    fn test_set_text_empty_line_has_no_runs() {
        let shape = shape_with_text("a\n\nb");
        let paras = &shape.text_frame.as_ref().unwrap().paragraphs;
        assert_eq!(paras.len(), 3);
        assert!(paras[1].runs.is_empty());
    }
}
