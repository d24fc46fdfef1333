//! Style capture and restore around the hard text swap.
//!
//! Replacing a shape's text resets its paragraphs to default-formatted
//! single runs, so every attribute that should survive must be
//! recorded beforehand and replayed from the record, never from
//! post-replacement shape state.

use slideglot_core::{ParagraphProps, RunProps, Shape};

/// Everything captured from one shape before its text is replaced.
///
/// Owned by the reconstruction step for the duration of one shape's
/// mutation and discarded after reapplication.
#[derive(Debug, Clone)]
pub struct StyleRecord {
    pub paragraphs: Vec<ParagraphRecord>,
}

/// Captured state of a single paragraph. A paragraph with zero runs
/// still records its paragraph-level properties, bullet state
/// included.
#[derive(Debug, Clone)]
pub struct ParagraphRecord {
    pub props: ParagraphProps,
    pub runs: Vec<RunProps>,
}

/// Record every paragraph and run property of the shape.
pub fn capture(shape: &Shape) -> StyleRecord {
    let paragraphs = match &shape.text_frame {
        Some(tf) => tf
            .paragraphs
            .iter()
            .map(|para| ParagraphRecord {
                props: para.props.clone(),
                runs: para
                    .runs
                    .iter()
                    .filter(|run| !run.text.is_empty())
                    .map(|run| run.props.clone())
                    .collect(),
            })
            .collect(),
        None => Vec::new(),
    };

    StyleRecord { paragraphs }
}

/// Replay a captured record onto the shape's current paragraphs.
///
/// A count mismatch between the record and the post-replacement
/// paragraph list is resolved by truncating at the shorter side; the
/// mismatch is logged and the run continues. Within a paragraph, runs
/// are paired up the same way; when the replacement collapsed several
/// captured runs into one, the first captured run's formatting wins.
pub fn restore(shape: &mut Shape, record: &StyleRecord) {
    let Some(tf) = shape.text_frame.as_mut() else {
        return;
    };

    if tf.paragraphs.len() != record.paragraphs.len() {
        log::warn!(
            "Style restore mismatch on shape {}: {} paragraphs captured, {} present",
            shape.id,
            record.paragraphs.len(),
            tf.paragraphs.len()
        );
    }

    for (para, rec) in tf.paragraphs.iter_mut().zip(&record.paragraphs) {
        para.props = rec.props.clone();

        for (i, run) in para.runs.iter_mut().enumerate() {
            if let Some(props) = rec.runs.get(i).or_else(|| rec.runs.first()) {
                run.props = props.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slideglot_core::{Alignment, BulletSpec, BulletStyle, Color, Rect, Spacing};

    fn styled_shape() -> Shape {
        let mut shape = Shape::new(7, "Content 1", Rect::default());
        shape.set_text("First point\nSecond point");
        let tf = shape.text_frame.as_mut().unwrap();

        tf.paragraphs[0].props.alignment = Some(Alignment::Center);
        tf.paragraphs[0].props.space_before = Some(Spacing::Points(6.0));
        tf.paragraphs[0].props.bullet = BulletSpec::Char {
            ch: "•".to_string(),
            style: BulletStyle::default(),
        };
        tf.paragraphs[0].runs[0].props = RunProps {
            font: Some("Calibri".to_string()),
            size_pt: Some(24.0),
            bold: Some(true),
            italic: Some(false),
            underline: Some(true),
            color: Some(Color::Rgb("336699".to_string())),
        };
        tf.paragraphs[1].props.level = Some(1);
        shape
    }

    #[test]
    fn test_round_trip_preserves_all_attributes() {
        let mut shape = styled_shape();
        let record = capture(&shape);

        shape.set_text("Erster Punkt\nZweiter Punkt");
        restore(&mut shape, &record);

        let tf = shape.text_frame.as_ref().unwrap();
        assert_eq!(tf.paragraphs[0].props.alignment, Some(Alignment::Center));
        assert_eq!(
            tf.paragraphs[0].props.space_before,
            Some(Spacing::Points(6.0))
        );
        assert!(matches!(
            tf.paragraphs[0].props.bullet,
            BulletSpec::Char { .. }
        ));
        let props = &tf.paragraphs[0].runs[0].props;
        assert_eq!(props.font.as_deref(), Some("Calibri"));
        assert_eq!(props.size_pt, Some(24.0));
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.underline, Some(true));
        assert_eq!(props.color, Some(Color::Rgb("336699".to_string())));
        assert_eq!(tf.paragraphs[1].props.level, Some(1));
    }

    #[test]
    fn test_inherited_bullet_stays_inherited() {
        let mut shape = Shape::new(1, "TextBox 1", Rect::default());
        shape.set_text("plain");
        let record = capture(&shape);

        shape.set_text("schlicht");
        restore(&mut shape, &record);

        let para = &shape.text_frame.as_ref().unwrap().paragraphs[0];
        assert_eq!(para.props.bullet, BulletSpec::Inherited);
    }

    #[test]
    fn test_mismatch_truncates_at_shorter_list() {
        let mut shape = styled_shape();
        let record = capture(&shape);

        // Translation with more lines than the source.
        shape.set_text("Eins\nZwei\nDrei");
        restore(&mut shape, &record);

        let tf = shape.text_frame.as_ref().unwrap();
        assert_eq!(tf.paragraphs.len(), 3);
        assert_eq!(tf.paragraphs[0].props.alignment, Some(Alignment::Center));
        // Beyond the captured list: untouched defaults.
        assert_eq!(tf.paragraphs[2].props, ParagraphProps::default());
    }

    #[test]
    fn test_zero_run_paragraph_keeps_paragraph_props() {
        let mut shape = Shape::new(2, "TextBox 2", Rect::default());
        shape.set_text("above\n\nbelow");
        shape.text_frame.as_mut().unwrap().paragraphs[1]
            .props
            .alignment = Some(Alignment::Right);

        let record = capture(&shape);
        assert!(record.paragraphs[1].runs.is_empty());

        shape.set_text("oben\n\nunten");
        restore(&mut shape, &record);

        let para = &shape.text_frame.as_ref().unwrap().paragraphs[1];
        assert_eq!(para.props.alignment, Some(Alignment::Right));
    }

    #[test]
    fn test_collapsed_runs_take_first_captured_style() {
        let mut shape = Shape::new(3, "TextBox 3", Rect::default());
        shape.set_text("one two");
        {
            let para = &mut shape.text_frame.as_mut().unwrap().paragraphs[0];
            para.runs[0].text = "one ".to_string();
            para.runs[0].props.bold = Some(true);
            let mut second = slideglot_core::Run::new("two");
            second.props.italic = Some(true);
            para.runs.push(second);
        }

        let record = capture(&shape);
        shape.set_text("eins zwei");
        restore(&mut shape, &record);

        let para = &shape.text_frame.as_ref().unwrap().paragraphs[0];
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.runs[0].props.bold, Some(true));
        assert_eq!(para.runs[0].props.italic, None);
    }
}
