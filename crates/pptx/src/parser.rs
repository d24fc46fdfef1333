//! PPTX parser: lifts slide parts into the core document model.

use crate::{local_name, trailing_number};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slideglot_core::{
    Alignment, AutoSize, BulletScheme, BulletSpec, BulletStyle, Color, Document, Error, Paragraph,
    Rect, Result, Run, Shape, Slide, Spacing, TextFrame,
};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Parser for PPTX (Office Open XML) presentations.
pub struct PptxParser;

impl PptxParser {
    pub fn new() -> Self {
        Self
    }

    /// Open and fully parse a .pptx file into the document model.
    pub fn open(&self, path: &Path) -> Result<Document> {
        let is_pptx = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pptx"))
            .unwrap_or(false);
        if !is_pptx {
            return Err(Error::UnsupportedFormat(format!(
                "Not a .pptx file: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation_xml = read_part(&mut archive, "ppt/presentation.xml")?;
        let (slide_width, slide_height) = parse_slide_size(&presentation_xml)?;

        let mut document = Document::new(slide_width, slide_height);
        document.source_path = Some(path.to_path_buf());

        for slide_path in slide_paths_in_order(&mut archive)? {
            let content = read_part(&mut archive, &slide_path)?;
            document.slides.push(parse_slide_xml(&content)?);
        }

        log::debug!(
            "Parsed {}: {} slides, canvas {}x{} EMU",
            path.display(),
            document.slides.len(),
            slide_width,
            slide_height
        );
        Ok(document)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one archive part as a UTF-8 string.
pub(crate) fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// The ordered list of slide part paths from the presentation
/// relationships.
pub(crate) fn slide_paths_in_order<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>> {
    let rels_content = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
    let mut slides: Vec<(String, Option<usize>)> = Vec::new();

    let mut reader = Reader::from_str(&rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                let id = attr_value(e, b"Id").unwrap_or_default();

                if rel_type.contains("/slide")
                    && !rel_type.contains("slideLayout")
                    && !rel_type.contains("slideMaster")
                {
                    let order = trailing_number(&id).or_else(|| trailing_number(&target));
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push((full_path, order));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Canvas size from `p:sldSz` in ppt/presentation.xml.
fn parse_slide_size(xml: &str) -> Result<(i64, i64)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldSz" =>
            {
                let cx = attr_i64(e, b"cx");
                let cy = attr_i64(e, b"cy");
                return match (cx, cy) {
                    (Some(cx), Some(cy)) => Ok((cx, cy)),
                    _ => Err(Error::CorruptedFile(
                        "p:sldSz is missing cx/cy".to_string(),
                    )),
                };
            }
            Ok(Event::Eof) => {
                return Err(Error::CorruptedFile(
                    "presentation.xml has no p:sldSz element".to_string(),
                ))
            }
            Err(e) => return Err(Error::XmlError(format!("Error parsing presentation: {}", e))),
            _ => {}
        }
    }
}

/// Elements whose subtrees the model does not cover; they pass through
/// the writer untouched, so the parser skips them wholesale.
const SKIPPED_SHAPE_KINDS: &[&[u8]] = &[b"pic", b"grpSp", b"graphicFrame", b"cxnSp"];

/// Bullet marker seen inside `a:pPr`.
enum BulletKind {
    Suppressed,
    Char(String),
    AutoNum { scheme: String, start_at: u32 },
    Picture,
}

/// Transient state for the shape currently being assembled.
#[derive(Default)]
struct ShapeBuilder {
    id: Option<u32>,
    name: String,
    frame: Rect,
    text_frame: Option<TextFrame>,
    in_tx_body: bool,
    paragraph: Option<Paragraph>,
    in_p_pr: bool,
    spacing_target: Option<SpacingTarget>,
    bullet_kind: Option<BulletKind>,
    bullet_style: BulletStyle,
    run: Option<Run>,
    in_r_pr: bool,
    in_solid_fill: bool,
    in_bu_clr: bool,
    in_text: bool,
}

#[derive(Clone, Copy)]
enum SpacingTarget {
    Before,
    After,
}

/// Parse one slide part into the model.
pub fn parse_slide_xml(xml: &str) -> Result<Slide> {
    let mut reader = Reader::from_str(xml);
    let mut slide = Slide::default();
    let mut builder: Option<ShapeBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref()).to_vec();

                // Non-text shape kinds are invisible to the model.
                if builder.is_none() && SKIPPED_SHAPE_KINDS.contains(&name.as_slice()) {
                    let end = e.to_end().into_owned();
                    reader
                        .read_to_end(end.name())
                        .map_err(|err| Error::XmlError(format!("Error skipping subtree: {}", err)))?;
                    continue;
                }

                // Field runs (slide numbers, dates) render from
                // document state, not stored text; leave them alone.
                if name == b"fld" {
                    if let Some(b) = builder.as_ref() {
                        if b.paragraph.is_some() {
                            let end = e.to_end().into_owned();
                            reader.read_to_end(end.name()).map_err(|err| {
                                Error::XmlError(format!("Error skipping field: {}", err))
                            })?;
                            continue;
                        }
                    }
                }

                handle_open(&mut builder, &name, &e);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.name().as_ref()).to_vec();
                handle_open(&mut builder, &name, &e);
                handle_close(&mut builder, &mut slide, &name);
            }
            Ok(Event::Text(t)) => {
                if let Some(b) = builder.as_mut() {
                    if b.in_text {
                        if let Some(run) = b.run.as_mut() {
                            let text = t
                                .unescape()
                                .map_err(|e| Error::XmlError(format!("Bad text content: {}", e)))?;
                            run.text.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref()).to_vec();
                handle_close(&mut builder, &mut slide, &name);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing slide: {}", e))),
            _ => {}
        }
    }

    Ok(slide)
}

fn handle_open(builder: &mut Option<ShapeBuilder>, name: &[u8], e: &BytesStart) {
    match name {
        b"sp" if builder.is_none() => {
            *builder = Some(ShapeBuilder::default());
        }
        b"cNvPr" => {
            if let Some(b) = builder.as_mut() {
                if b.id.is_none() && !b.in_tx_body {
                    b.id = attr_value(e, b"id").and_then(|v| v.parse().ok());
                    b.name = attr_value(e, b"name").unwrap_or_default();
                }
            }
        }
        b"off" => {
            if let Some(b) = builder.as_mut() {
                if !b.in_tx_body {
                    if let Some(x) = attr_i64(e, b"x") {
                        b.frame.left = x;
                    }
                    if let Some(y) = attr_i64(e, b"y") {
                        b.frame.top = y;
                    }
                }
            }
        }
        b"ext" => {
            if let Some(b) = builder.as_mut() {
                if !b.in_tx_body {
                    if let Some(cx) = attr_i64(e, b"cx") {
                        b.frame.width = cx;
                    }
                    if let Some(cy) = attr_i64(e, b"cy") {
                        b.frame.height = cy;
                    }
                }
            }
        }
        b"txBody" => {
            if let Some(b) = builder.as_mut() {
                b.in_tx_body = true;
                b.text_frame = Some(TextFrame::default());
            }
        }
        b"bodyPr" => {
            if let Some(b) = builder.as_mut() {
                if b.in_tx_body {
                    if let Some(tf) = b.text_frame.as_mut() {
                        tf.word_wrap = match attr_value(e, b"wrap").as_deref() {
                            Some("none") => Some(false),
                            Some("square") => Some(true),
                            _ => None,
                        };
                    }
                }
            }
        }
        b"noAutofit" | b"normAutofit" | b"spAutoFit" => {
            if let Some(b) = builder.as_mut() {
                if b.in_tx_body && b.paragraph.is_none() {
                    if let Some(tf) = b.text_frame.as_mut() {
                        tf.auto_size = Some(match name {
                            b"normAutofit" => AutoSize::ShrinkText,
                            b"spAutoFit" => AutoSize::FitShape,
                            _ => AutoSize::None,
                        });
                    }
                }
            }
        }
        b"p" => {
            if let Some(b) = builder.as_mut() {
                if b.in_tx_body {
                    b.paragraph = Some(Paragraph::default());
                    b.bullet_kind = None;
                    b.bullet_style = BulletStyle::default();
                }
            }
        }
        b"pPr" => {
            if let Some(b) = builder.as_mut() {
                if let Some(para) = b.paragraph.as_mut() {
                    b.in_p_pr = true;
                    para.props.alignment = attr_value(e, b"algn").as_deref().and_then(alignment);
                    para.props.level = attr_value(e, b"lvl").and_then(|v| v.parse().ok());
                    para.props.margin_left = attr_i64(e, b"marL");
                    para.props.indent = attr_i64(e, b"indent");
                }
            }
        }
        b"spcBef" => set_in_ppr(builder, |b| b.spacing_target = Some(SpacingTarget::Before)),
        b"spcAft" => set_in_ppr(builder, |b| b.spacing_target = Some(SpacingTarget::After)),
        b"spcPts" => {
            let value = attr_value(e, b"val").and_then(|v| v.parse::<f32>().ok());
            if let Some(val) = value {
                apply_spacing(builder, Spacing::Points(val / 100.0));
            }
        }
        b"spcPct" => {
            let value = attr_value(e, b"val").and_then(|v| v.parse::<f32>().ok());
            if let Some(val) = value {
                apply_spacing(builder, Spacing::Percent(val / 1000.0));
            }
        }
        b"buNone" => set_in_ppr(builder, |b| b.bullet_kind = Some(BulletKind::Suppressed)),
        b"buChar" => {
            let ch = attr_value(e, b"char").unwrap_or_else(|| "\u{2022}".to_string());
            set_in_ppr(builder, move |b| b.bullet_kind = Some(BulletKind::Char(ch)));
        }
        b"buAutoNum" => {
            let scheme =
                attr_value(e, b"type").unwrap_or_else(|| BulletScheme::DEFAULT.to_string());
            let start_at = attr_value(e, b"startAt")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            set_in_ppr(builder, move |b| {
                b.bullet_kind = Some(BulletKind::AutoNum { scheme, start_at })
            });
        }
        b"buBlip" => set_in_ppr(builder, |b| b.bullet_kind = Some(BulletKind::Picture)),
        b"buFont" => {
            let typeface = attr_value(e, b"typeface");
            set_in_ppr(builder, move |b| b.bullet_style.font = typeface);
        }
        b"buSzPct" => {
            let percent = attr_value(e, b"val")
                .and_then(|v| v.parse::<f32>().ok())
                .map(|v| v / 1000.0);
            set_in_ppr(builder, move |b| b.bullet_style.size_percent = percent);
        }
        b"buClr" => set_in_ppr(builder, |b| b.in_bu_clr = true),
        b"r" => {
            if let Some(b) = builder.as_mut() {
                if b.paragraph.is_some() {
                    b.run = Some(Run::default());
                }
            }
        }
        b"rPr" => {
            if let Some(b) = builder.as_mut() {
                if let Some(run) = b.run.as_mut() {
                    b.in_r_pr = true;
                    run.props.size_pt = attr_value(e, b"sz")
                        .and_then(|v| v.parse::<f32>().ok())
                        .map(|v| v / 100.0);
                    run.props.bold = attr_value(e, b"b").as_deref().map(flag);
                    run.props.italic = attr_value(e, b"i").as_deref().map(flag);
                    run.props.underline = attr_value(e, b"u").as_deref().map(|v| v != "none");
                }
            }
        }
        b"latin" => {
            if let Some(b) = builder.as_mut() {
                if b.in_r_pr {
                    if let Some(run) = b.run.as_mut() {
                        run.props.font = attr_value(e, b"typeface");
                    }
                }
            }
        }
        b"solidFill" => {
            if let Some(b) = builder.as_mut() {
                if b.in_r_pr {
                    b.in_solid_fill = true;
                }
            }
        }
        b"srgbClr" | b"schemeClr" => {
            if let Some(b) = builder.as_mut() {
                let color = attr_value(e, b"val").map(|val| {
                    if name == b"srgbClr" {
                        Color::Rgb(val.to_uppercase())
                    } else {
                        Color::Theme(val)
                    }
                });
                if b.in_bu_clr {
                    b.bullet_style.color = color;
                } else if b.in_solid_fill {
                    if let Some(run) = b.run.as_mut() {
                        run.props.color = color;
                    }
                }
            }
        }
        b"t" => {
            if let Some(b) = builder.as_mut() {
                if b.run.is_some() {
                    b.in_text = true;
                }
            }
        }
        _ => {}
    }
}

fn handle_close(builder: &mut Option<ShapeBuilder>, slide: &mut Slide, name: &[u8]) {
    match name {
        b"sp" => {
            if let Some(b) = builder.take() {
                if let Some(id) = b.id {
                    slide.shapes.push(Shape {
                        id,
                        name: b.name,
                        frame: b.frame,
                        text_frame: b.text_frame,
                    });
                } else {
                    log::warn!("Skipping shape without a cNvPr id");
                }
            }
        }
        b"txBody" => {
            if let Some(b) = builder.as_mut() {
                b.in_tx_body = false;
            }
        }
        b"p" => {
            if let Some(b) = builder.as_mut() {
                if let Some(mut para) = b.paragraph.take() {
                    para.props.bullet = match b.bullet_kind.take() {
                        None => BulletSpec::Inherited,
                        Some(BulletKind::Suppressed) => BulletSpec::None,
                        Some(BulletKind::Char(ch)) => BulletSpec::Char {
                            ch,
                            style: std::mem::take(&mut b.bullet_style),
                        },
                        Some(BulletKind::AutoNum { scheme, start_at }) => BulletSpec::AutoNum {
                            scheme,
                            start_at,
                            style: std::mem::take(&mut b.bullet_style),
                        },
                        Some(BulletKind::Picture) => BulletSpec::Picture,
                    };
                    if let Some(tf) = b.text_frame.as_mut() {
                        tf.paragraphs.push(para);
                    }
                }
            }
        }
        b"pPr" => {
            if let Some(b) = builder.as_mut() {
                b.in_p_pr = false;
            }
        }
        b"spcBef" | b"spcAft" => {
            if let Some(b) = builder.as_mut() {
                b.spacing_target = None;
            }
        }
        b"buClr" => {
            if let Some(b) = builder.as_mut() {
                b.in_bu_clr = false;
            }
        }
        b"r" => {
            if let Some(b) = builder.as_mut() {
                if let Some(run) = b.run.take() {
                    if let Some(para) = b.paragraph.as_mut() {
                        para.runs.push(run);
                    }
                }
            }
        }
        b"rPr" => {
            if let Some(b) = builder.as_mut() {
                b.in_r_pr = false;
                b.in_solid_fill = false;
            }
        }
        b"solidFill" => {
            if let Some(b) = builder.as_mut() {
                b.in_solid_fill = false;
            }
        }
        b"t" => {
            if let Some(b) = builder.as_mut() {
                b.in_text = false;
            }
        }
        _ => {}
    }
}

/// Run a mutation on the builder only while inside `a:pPr`.
fn set_in_ppr(builder: &mut Option<ShapeBuilder>, f: impl FnOnce(&mut ShapeBuilder)) {
    if let Some(b) = builder.as_mut() {
        if b.in_p_pr {
            f(b);
        }
    }
}

fn apply_spacing(builder: &mut Option<ShapeBuilder>, spacing: Spacing) {
    if let Some(b) = builder.as_mut() {
        let target = b.spacing_target;
        if let (Some(target), Some(para)) = (target, b.paragraph.as_mut()) {
            match target {
                SpacingTarget::Before => para.props.space_before = Some(spacing),
                SpacingTarget::After => para.props.space_after = Some(spacing),
            }
        }
    }
}

fn alignment(value: &str) -> Option<Alignment> {
    match value {
        "l" => Some(Alignment::Left),
        "ctr" => Some(Alignment::Center),
        "r" => Some(Alignment::Right),
        "just" => Some(Alignment::Justify),
        _ => None,
    }
}

fn flag(value: &str) -> bool {
    value == "1" || value == "true"
}

pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    attr_value(e, key).and_then(|v| v.parse().ok())
}
