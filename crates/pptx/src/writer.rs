//! PPTX writer: rebuilds the archive around the mutated model.
//!
//! The source archive is copied entry by entry. Slide parts are
//! replayed event by event; for shapes present in the model the writer
//! rewrites geometry, body properties, and the full paragraph list,
//! and every other event passes through byte-faithful.

use crate::local_name;
use crate::parser::{attr_value, slide_paths_in_order};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use slideglot_core::{
    Alignment, AutoSize, BulletSpec, BulletStyle, Color, Document, Error, Paragraph,
    ParagraphProps, Result, Run, RunProps, Shape, Slide, Spacing, TextFrame,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Save `document` as a .pptx at `output_path`.
///
/// Requires the document's source archive on disk: every part the
/// model does not cover (media, masters, themes, notes) is copied
/// from it unchanged.
pub fn save_document(document: &Document, output_path: &Path) -> Result<()> {
    let source_path = document.source_path.as_deref().ok_or_else(|| {
        Error::CorruptedFile("document has no source archive to rebuild from".to_string())
    })?;
    let source = File::open(source_path)?;
    let mut archive = ZipArchive::new(source)
        .map_err(|e| Error::ZipError(format!("Failed to open source archive: {}", e)))?;

    let output = BufWriter::new(File::create(output_path)?);
    write_archive(&mut archive, document, output)?;

    log::info!("Saved presentation to {}", output_path.display());
    Ok(())
}

/// Copy `archive` into `output`, rewriting slide parts from `document`.
pub(crate) fn write_archive<R: Read + Seek, W: Write + Seek>(
    archive: &mut ZipArchive<R>,
    document: &Document,
    output: W,
) -> Result<()> {
    let slide_indices: HashMap<String, usize> = slide_paths_in_order(archive)?
        .into_iter()
        .enumerate()
        .map(|(index, path)| (path, index))
        .collect();

    let mut writer = ZipWriter::new(output);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::ZipError(format!("Failed to read archive entry: {}", e)))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::ZipError(format!("Failed to start entry '{}': {}", name, e)))?;

        match slide_indices
            .get(&name)
            .and_then(|&index| document.slides.get(index))
        {
            Some(slide) => {
                let mut xml = String::new();
                entry
                    .read_to_string(&mut xml)
                    .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
                let rewritten = rewrite_slide_xml(&xml, slide)?;
                writer.write_all(rewritten.as_bytes())?;
            }
            None => {
                io::copy(&mut entry, &mut writer)?;
            }
        }
    }

    writer
        .finish()
        .map_err(|e| Error::ZipError(format!("Failed to finalize archive: {}", e)))?;
    Ok(())
}

/// Replay one slide part, rewriting the shapes present in the model.
pub(crate) fn rewrite_slide_xml(xml: &str, slide: &Slide) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());

    let mut in_sp = false;
    let mut in_tx_body = false;
    let mut in_body_pr = false;
    let mut paragraphs_emitted = false;
    let mut autofit_emitted = false;
    let mut shape: Option<&Shape> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error replaying slide: {}", e)))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                match name.as_slice() {
                    b"sp" => {
                        in_sp = true;
                        emit(&mut writer, Event::Start(e))?;
                    }
                    b"cNvPr" if in_sp && shape.is_none() && !in_tx_body => {
                        shape = attr_value(&e, b"id")
                            .and_then(|v| v.parse().ok())
                            .and_then(|id| slide.shape_by_id(id));
                        emit(&mut writer, Event::Start(e))?;
                    }
                    b"off" | b"ext" if shape.is_some() && !in_tx_body => {
                        let rebuilt = rewrite_geometry(&e, &name, shape_frame(shape));
                        emit(&mut writer, Event::Start(rebuilt))?;
                    }
                    b"txBody" if in_sp => {
                        in_tx_body = true;
                        paragraphs_emitted = false;
                        emit(&mut writer, Event::Start(e))?;
                    }
                    b"bodyPr" if in_tx_body => match model_text_frame(shape) {
                        Some(tf) => {
                            in_body_pr = true;
                            autofit_emitted = false;
                            emit(&mut writer, Event::Start(rewrite_body_pr(&e, tf)))?;
                        }
                        None => emit(&mut writer, Event::Start(e))?,
                    },
                    b"noAutofit" | b"normAutofit" | b"spAutoFit"
                        if in_body_pr && autofit_of(shape).is_some() =>
                    {
                        if !autofit_emitted {
                            if let Some(auto) = autofit_of(shape) {
                                write_autofit(&mut writer, auto)?;
                            }
                            autofit_emitted = true;
                        }
                        let end = e.to_end().into_owned();
                        reader.read_to_end(end.name()).map_err(|err| {
                            Error::XmlError(format!("Error skipping autofit: {}", err))
                        })?;
                    }
                    b"p" if in_tx_body && model_text_frame(shape).is_some() => {
                        if !paragraphs_emitted {
                            if let Some(tf) = model_text_frame(shape) {
                                write_paragraphs(&mut writer, &tf.paragraphs)?;
                            }
                            paragraphs_emitted = true;
                        }
                        let end = e.to_end().into_owned();
                        reader.read_to_end(end.name()).map_err(|err| {
                            Error::XmlError(format!("Error skipping paragraph: {}", err))
                        })?;
                    }
                    _ => emit(&mut writer, Event::Start(e))?,
                }
            }
            Event::Empty(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                match name.as_slice() {
                    b"cNvPr" if in_sp && shape.is_none() && !in_tx_body => {
                        shape = attr_value(&e, b"id")
                            .and_then(|v| v.parse().ok())
                            .and_then(|id| slide.shape_by_id(id));
                        emit(&mut writer, Event::Empty(e))?;
                    }
                    b"off" | b"ext" if shape.is_some() && !in_tx_body => {
                        let rebuilt = rewrite_geometry(&e, &name, shape_frame(shape));
                        emit(&mut writer, Event::Empty(rebuilt))?;
                    }
                    b"bodyPr" if in_tx_body => match model_text_frame(shape) {
                        Some(tf) => {
                            let rebuilt = rewrite_body_pr(&e, tf);
                            match tf.auto_size {
                                Some(auto) => {
                                    // The empty element gains an autofit
                                    // child, so it must open and close.
                                    emit(&mut writer, Event::Start(rebuilt))?;
                                    write_autofit(&mut writer, auto)?;
                                    let end_name =
                                        String::from_utf8_lossy(e.name().as_ref()).into_owned();
                                    emit(&mut writer, Event::End(BytesEnd::new(end_name)))?;
                                }
                                None => emit(&mut writer, Event::Empty(rebuilt))?,
                            }
                        }
                        None => emit(&mut writer, Event::Empty(e))?,
                    },
                    b"noAutofit" | b"normAutofit" | b"spAutoFit"
                        if in_body_pr && autofit_of(shape).is_some() =>
                    {
                        if !autofit_emitted {
                            if let Some(auto) = autofit_of(shape) {
                                write_autofit(&mut writer, auto)?;
                            }
                            autofit_emitted = true;
                        }
                    }
                    b"p" if in_tx_body && model_text_frame(shape).is_some() => {
                        if !paragraphs_emitted {
                            if let Some(tf) = model_text_frame(shape) {
                                write_paragraphs(&mut writer, &tf.paragraphs)?;
                            }
                            paragraphs_emitted = true;
                        }
                    }
                    _ => emit(&mut writer, Event::Empty(e))?,
                }
            }
            Event::End(e) => {
                let name = local_name(e.name().as_ref()).to_vec();
                match name.as_slice() {
                    b"sp" => {
                        in_sp = false;
                        shape = None;
                        emit(&mut writer, Event::End(e))?;
                    }
                    b"bodyPr" if in_body_pr => {
                        if !autofit_emitted {
                            if let Some(auto) = autofit_of(shape) {
                                write_autofit(&mut writer, auto)?;
                            }
                        }
                        in_body_pr = false;
                        emit(&mut writer, Event::End(e))?;
                    }
                    b"txBody" => {
                        if in_tx_body && !paragraphs_emitted {
                            if let Some(tf) = model_text_frame(shape) {
                                write_paragraphs(&mut writer, &tf.paragraphs)?;
                            }
                        }
                        in_tx_body = false;
                        emit(&mut writer, Event::End(e))?;
                    }
                    _ => emit(&mut writer, Event::End(e))?,
                }
            }
            other => emit(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("Rewritten slide is not UTF-8: {}", e)))
}

fn emit<W: io::Write>(writer: &mut Writer<W>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write XML event: {}", e)))
}

fn shape_frame(shape: Option<&Shape>) -> slideglot_core::Rect {
    shape.map(|s| s.frame).unwrap_or_default()
}

fn model_text_frame(shape: Option<&Shape>) -> Option<&TextFrame> {
    shape.and_then(|s| s.text_frame.as_ref())
}

fn autofit_of(shape: Option<&Shape>) -> Option<AutoSize> {
    model_text_frame(shape).and_then(|tf| tf.auto_size)
}

/// Rebuild `a:off` or `a:ext` with coordinates from the model frame.
fn rewrite_geometry(
    e: &BytesStart,
    name: &[u8],
    frame: slideglot_core::Rect,
) -> BytesStart<'static> {
    if name == b"off" {
        rebuild_with_attrs(
            e,
            &[("x", frame.left.to_string()), ("y", frame.top.to_string())],
        )
    } else {
        rebuild_with_attrs(
            e,
            &[
                ("cx", frame.width.to_string()),
                ("cy", frame.height.to_string()),
            ],
        )
    }
}

/// Rebuild `a:bodyPr`, replacing the wrap attribute when the model
/// carries an explicit setting.
fn rewrite_body_pr(e: &BytesStart, tf: &TextFrame) -> BytesStart<'static> {
    match tf.word_wrap {
        Some(true) => rebuild_with_attrs(e, &[("wrap", "square".to_string())]),
        Some(false) => rebuild_with_attrs(e, &[("wrap", "none".to_string())]),
        None => rebuild_with_attrs(e, &[]),
    }
}

/// Copy an element, dropping attributes named in `replace` and
/// appending the replacement values.
fn rebuild_with_attrs(e: &BytesStart, replace: &[(&str, String)]) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if replace.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        out.push_attribute((key.as_str(), value.as_str()));
    }
    for (key, value) in replace {
        out.push_attribute((*key, value.as_str()));
    }
    out
}

fn write_autofit<W: io::Write>(writer: &mut Writer<W>, auto: AutoSize) -> Result<()> {
    let name = match auto {
        AutoSize::None => "a:noAutofit",
        AutoSize::ShrinkText => "a:normAutofit",
        AutoSize::FitShape => "a:spAutoFit",
    };
    emit(writer, Event::Empty(BytesStart::new(name)))
}

fn write_paragraphs<W: io::Write>(writer: &mut Writer<W>, paragraphs: &[Paragraph]) -> Result<()> {
    for para in paragraphs {
        write_paragraph(writer, para)?;
    }
    Ok(())
}

fn write_paragraph<W: io::Write>(writer: &mut Writer<W>, para: &Paragraph) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("a:p")))?;
    write_paragraph_props(writer, &para.props)?;
    for run in &para.runs {
        write_run(writer, run)?;
    }
    emit(writer, Event::End(BytesEnd::new("a:p")))
}

fn write_paragraph_props<W: io::Write>(
    writer: &mut Writer<W>,
    props: &ParagraphProps,
) -> Result<()> {
    if *props == ParagraphProps::default() {
        return Ok(());
    }

    let mut elem = BytesStart::new("a:pPr");
    if let Some(margin) = props.margin_left {
        elem.push_attribute(("marL", margin.to_string().as_str()));
    }
    if let Some(level) = props.level {
        elem.push_attribute(("lvl", level.to_string().as_str()));
    }
    if let Some(indent) = props.indent {
        elem.push_attribute(("indent", indent.to_string().as_str()));
    }
    if let Some(alignment) = props.alignment {
        elem.push_attribute(("algn", alignment_code(alignment)));
    }

    let has_children = props.space_before.is_some()
        || props.space_after.is_some()
        || props.bullet != BulletSpec::Inherited;
    if !has_children {
        return emit(writer, Event::Empty(elem));
    }

    emit(writer, Event::Start(elem))?;
    if let Some(spacing) = props.space_before {
        write_spacing(writer, "a:spcBef", spacing)?;
    }
    if let Some(spacing) = props.space_after {
        write_spacing(writer, "a:spcAft", spacing)?;
    }
    write_bullet(writer, &props.bullet)?;
    emit(writer, Event::End(BytesEnd::new("a:pPr")))
}

fn write_spacing<W: io::Write>(writer: &mut Writer<W>, name: &str, spacing: Spacing) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    let inner = match spacing {
        Spacing::Points(points) => {
            let mut e = BytesStart::new("a:spcPts");
            e.push_attribute(("val", ((points * 100.0).round() as i64).to_string().as_str()));
            e
        }
        Spacing::Percent(percent) => {
            let mut e = BytesStart::new("a:spcPct");
            e.push_attribute(("val", ((percent * 1000.0).round() as i64).to_string().as_str()));
            e
        }
    };
    emit(writer, Event::Empty(inner))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Emit bullet markup. `Inherited` writes nothing at all so the
/// layout/master bullet keeps resolving.
fn write_bullet<W: io::Write>(writer: &mut Writer<W>, bullet: &BulletSpec) -> Result<()> {
    match bullet {
        BulletSpec::Inherited => Ok(()),
        BulletSpec::None => emit(writer, Event::Empty(BytesStart::new("a:buNone"))),
        BulletSpec::Char { ch, style } => {
            write_bullet_style(writer, style)?;
            let mut e = BytesStart::new("a:buChar");
            e.push_attribute(("char", ch.as_str()));
            emit(writer, Event::Empty(e))
        }
        BulletSpec::AutoNum {
            scheme,
            start_at,
            style,
        } => {
            write_bullet_style(writer, style)?;
            let mut e = BytesStart::new("a:buAutoNum");
            e.push_attribute(("type", scheme.as_str()));
            e.push_attribute(("startAt", start_at.to_string().as_str()));
            emit(writer, Event::Empty(e))
        }
        // Presence only; the image relationship stays in the part's
        // untouched markup elsewhere.
        BulletSpec::Picture => emit(writer, Event::Empty(BytesStart::new("a:buBlip"))),
    }
}

fn write_bullet_style<W: io::Write>(writer: &mut Writer<W>, style: &BulletStyle) -> Result<()> {
    if let Some(color) = &style.color {
        emit(writer, Event::Start(BytesStart::new("a:buClr")))?;
        write_color(writer, color)?;
        emit(writer, Event::End(BytesEnd::new("a:buClr")))?;
    }
    if let Some(percent) = style.size_percent {
        let mut e = BytesStart::new("a:buSzPct");
        e.push_attribute(("val", ((percent * 1000.0).round() as i64).to_string().as_str()));
        emit(writer, Event::Empty(e))?;
    }
    if let Some(font) = &style.font {
        let mut e = BytesStart::new("a:buFont");
        e.push_attribute(("typeface", font.as_str()));
        emit(writer, Event::Empty(e))?;
    }
    Ok(())
}

fn write_color<W: io::Write>(writer: &mut Writer<W>, color: &Color) -> Result<()> {
    let elem = match color {
        Color::Rgb(value) => {
            let mut e = BytesStart::new("a:srgbClr");
            e.push_attribute(("val", value.as_str()));
            e
        }
        Color::Theme(value) => {
            let mut e = BytesStart::new("a:schemeClr");
            e.push_attribute(("val", value.as_str()));
            e
        }
    };
    emit(writer, Event::Empty(elem))
}

fn write_run<W: io::Write>(writer: &mut Writer<W>, run: &Run) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("a:r")))?;
    write_run_props(writer, &run.props)?;
    emit(writer, Event::Start(BytesStart::new("a:t")))?;
    emit(writer, Event::Text(BytesText::new(&run.text)))?;
    emit(writer, Event::End(BytesEnd::new("a:t")))?;
    emit(writer, Event::End(BytesEnd::new("a:r")))
}

fn write_run_props<W: io::Write>(writer: &mut Writer<W>, props: &RunProps) -> Result<()> {
    if *props == RunProps::default() {
        return Ok(());
    }

    let mut elem = BytesStart::new("a:rPr");
    if let Some(size) = props.size_pt {
        elem.push_attribute(("sz", ((size * 100.0).round() as i64).to_string().as_str()));
    }
    if let Some(bold) = props.bold {
        elem.push_attribute(("b", if bold { "1" } else { "0" }));
    }
    if let Some(italic) = props.italic {
        elem.push_attribute(("i", if italic { "1" } else { "0" }));
    }
    if let Some(underline) = props.underline {
        elem.push_attribute(("u", if underline { "sng" } else { "none" }));
    }

    let has_children = props.color.is_some() || props.font.is_some();
    if !has_children {
        return emit(writer, Event::Empty(elem));
    }

    emit(writer, Event::Start(elem))?;
    if let Some(color) = &props.color {
        emit(writer, Event::Start(BytesStart::new("a:solidFill")))?;
        write_color(writer, color)?;
        emit(writer, Event::End(BytesEnd::new("a:solidFill")))?;
    }
    if let Some(font) = &props.font {
        let mut e = BytesStart::new("a:latin");
        e.push_attribute(("typeface", font.as_str()));
        emit(writer, Event::Empty(e))?;
    }
    emit(writer, Event::End(BytesEnd::new("a:rPr")))
}

fn alignment_code(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
        Alignment::Justify => "just",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_slide_xml;
    use slideglot_core::Rect;
    use std::io::Cursor;

    const SLIDE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
    <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:grpSpPr>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="4" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr>
      <p:txBody>
        <a:bodyPr wrap="none"><a:spAutoFit/></a:bodyPr>
        <a:lstStyle/>
        <a:p><a:r><a:rPr sz="2400" b="1"/><a:t>Old title</a:t></a:r></a:p>
        <a:p><a:r><a:t>Old body</a:t></a:r></a:p>
      </p:txBody>
    </p:sp>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="7" name="Untouched 2"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="300" cy="400"/></a:xfrm></p:spPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:t>Keep me</a:t></a:r></a:p></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    fn modeled_shape() -> Shape {
        let mut shape = Shape::new(
            4,
            "Title 1",
            Rect {
                left: 457_200,
                top: 274_638,
                width: 9_000_000,
                height: 1_143_000,
            },
        );
        shape.set_text("Nouveau titre\nNouveau corps");
        let tf = shape.text_frame.as_mut().unwrap();
        tf.paragraphs[0].runs[0].props.size_pt = Some(22.0);
        tf.paragraphs[0].runs[0].props.bold = Some(true);
        tf.word_wrap = Some(true);
        tf.auto_size = Some(AutoSize::None);
        shape
    }

    #[test]
    fn test_rewrite_replaces_modeled_shape() {
        let mut slide = Slide::default();
        slide.shapes.push(modeled_shape());

        let output = rewrite_slide_xml(SLIDE_XML, &slide).unwrap();
        let reparsed = parse_slide_xml(&output).unwrap();

        let shape = reparsed.shape_by_id(4).unwrap();
        assert_eq!(shape.text(), "Nouveau titre\nNouveau corps");
        assert_eq!(shape.frame.width, 9_000_000);

        let tf = shape.text_frame.as_ref().unwrap();
        assert_eq!(tf.word_wrap, Some(true));
        assert_eq!(tf.auto_size, Some(AutoSize::None));
        assert_eq!(tf.paragraphs[0].runs[0].props.size_pt, Some(22.0));
        assert_eq!(tf.paragraphs[0].runs[0].props.bold, Some(true));
    }

    #[test]
    fn test_rewrite_leaves_unmodeled_shapes_alone() {
        let mut slide = Slide::default();
        slide.shapes.push(modeled_shape());

        let output = rewrite_slide_xml(SLIDE_XML, &slide).unwrap();
        let reparsed = parse_slide_xml(&output).unwrap();

        let untouched = reparsed.shape_by_id(7).unwrap();
        assert_eq!(untouched.text(), "Keep me");
        assert_eq!(
            untouched.frame,
            Rect {
                left: 100,
                top: 200,
                width: 300,
                height: 400,
            }
        );
    }

    #[test]
    fn test_rewrite_replaces_autofit_in_place() {
        let mut slide = Slide::default();
        slide.shapes.push(modeled_shape());

        let output = rewrite_slide_xml(SLIDE_XML, &slide).unwrap();
        assert!(output.contains("<a:noAutofit/>"));
        assert!(!output.contains("spAutoFit"));
        assert!(output.contains(r#"wrap="square""#));
    }

    #[test]
    fn test_rewrite_adds_autofit_to_empty_body_pr() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="Box"/></p:nvSpPr>
            <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr>
            <p:txBody><a:bodyPr/><a:p><a:r><a:t>x</a:t></a:r></a:p></p:txBody>
            </p:sp></p:spTree></p:cSld></p:sld>"#;

        let mut slide = Slide::default();
        let mut shape = Shape::new(2, "Box", Rect::default());
        shape.set_text("y");
        shape.text_frame.as_mut().unwrap().auto_size = Some(AutoSize::ShrinkText);
        slide.shapes.push(shape);

        let output = rewrite_slide_xml(xml, &slide).unwrap();
        assert!(output.contains("<a:bodyPr><a:normAutofit/></a:bodyPr>"));
    }

    #[test]
    fn test_rewrite_escapes_text_content() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="3" name="T"/></p:nvSpPr>
            <p:txBody><a:bodyPr/><a:p><a:r><a:t>old</a:t></a:r></a:p></p:txBody>
            </p:sp></p:spTree></p:cSld></p:sld>"#;

        let mut slide = Slide::default();
        let mut shape = Shape::new(3, "T", Rect::default());
        shape.set_text("R&D <goals>");
        slide.shapes.push(shape);

        let output = rewrite_slide_xml(xml, &slide).unwrap();
        assert!(output.contains("R&amp;D &lt;goals&gt;"));
        assert_eq!(
            parse_slide_xml(&output).unwrap().shapes[0].text(),
            "R&D <goals>"
        );
    }

    #[test]
    fn test_bullet_markup_round_trip() {
        let mut writer = Writer::new(Vec::new());
        write_bullet(
            &mut writer,
            &BulletSpec::AutoNum {
                scheme: "arabicPeriod".to_string(),
                start_at: 3,
                style: BulletStyle {
                    font: Some("Wingdings".to_string()),
                    size_percent: Some(80.0),
                    color: Some(Color::Rgb("FF0000".to_string())),
                },
            },
        )
        .unwrap();

        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<a:buClr><a:srgbClr val="FF0000"/></a:buClr>"#,
                r#"<a:buSzPct val="80000"/>"#,
                r#"<a:buFont typeface="Wingdings"/>"#,
                r#"<a:buAutoNum type="arabicPeriod" startAt="3"/>"#
            )
        );
    }

    #[test]
    fn test_inherited_bullet_writes_nothing() {
        let mut writer = Writer::new(Vec::new());
        write_bullet(&mut writer, &BulletSpec::Inherited).unwrap();
        assert!(writer.into_inner().is_empty());
    }

    fn build_test_archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(br#"<p:presentation xmlns:p="p"><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#)
            .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        zip.write_all(br#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#)
            .unwrap();

        zip.start_file("ppt/slides/slide1.xml", options).unwrap();
        zip.write_all(SLIDE_XML.as_bytes()).unwrap();

        zip.start_file("ppt/media/image1.png", options).unwrap();
        zip.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let cursor = zip.finish().unwrap();
        ZipArchive::new(cursor).unwrap()
    }

    #[test]
    fn test_write_archive_rewrites_slides_and_copies_the_rest() {
        let mut archive = build_test_archive();

        let mut document = Document::new(9_144_000, 6_858_000);
        let mut slide = Slide::default();
        slide.shapes.push(modeled_shape());
        document.slides.push(slide);

        let mut output = Cursor::new(Vec::new());
        write_archive(&mut archive, &document, &mut output).unwrap();

        let mut result = ZipArchive::new(Cursor::new(output.into_inner())).unwrap();

        let mut slide_xml = String::new();
        result
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut slide_xml)
            .unwrap();
        assert!(slide_xml.contains("Nouveau titre"));
        assert!(!slide_xml.contains("Old title"));

        let mut media = Vec::new();
        result
            .by_name("ppt/media/image1.png")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, vec![0x89, 0x50, 0x4e, 0x47]);
    }
}
