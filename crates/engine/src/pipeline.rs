//! The three-stage pipeline: extract, schedule, reconstruct.

use crate::error::EngineError;
use crate::reconstruct::{reconstruct, EngineOptions, Summary};
use crate::scheduler::{translate_texts, SchedulerConfig};
use crate::translator::Translator;
use slideglot_core::{extract_text_units, Document};

/// Translate every text-bearing shape of `document` into
/// `target_language`, preserving layout.
///
/// Stages run strictly in order with a hard barrier between
/// translation and reconstruction: the translation map is fully
/// populated, with an entry for every distinct text, before any shape
/// is mutated.
pub async fn translate_document(
    document: &mut Document,
    translator: &dyn Translator,
    target_language: &str,
    scheduler_config: &SchedulerConfig,
    options: &EngineOptions,
) -> Result<Summary, EngineError> {
    let units = extract_text_units(document);
    log::info!(
        "Pipeline start: {} text units across {} slides, target language {}",
        units.len(),
        document.slides.len(),
        target_language
    );

    let texts: Vec<String> = units.into_iter().map(|u| u.text).collect();
    let translation_map =
        translate_texts(translator, &texts, target_language, scheduler_config).await?;

    reconstruct(document, &translation_map, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::TranslateError;
    use async_trait::async_trait;
    use slideglot_core::{Rect, Shape, Slide};

    struct SuffixTranslator;

    #[async_trait]
    impl Translator for SuffixTranslator {
        async fn translate(
            &self,
            text: &str,
            target_language: &str,
        ) -> Result<String, TranslateError> {
            Ok(format!("{text} [{target_language}]"))
        }
    }

    #[tokio::test]
    async fn test_end_to_end_replaces_every_unit() {
        let mut doc = Document::new(9_144_000, 6_858_000);
        let mut slide = Slide::default();
        for (i, text) in ["Title", "Body text", "Title"].iter().enumerate() {
            let mut shape = Shape::new(
                i as u32 + 1,
                format!("TextBox {}", i + 1),
                Rect {
                    left: 914_400 * (i as i64 * 3),
                    top: 914_400,
                    width: 914_400 * 2,
                    height: 914_400,
                },
            );
            shape.set_text(text);
            slide.shapes.push(shape);
        }
        doc.slides.push(slide);

        let summary = translate_document(
            &mut doc,
            &SuffixTranslator,
            "French",
            &SchedulerConfig::default(),
            &EngineOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.text_units_replaced, 3);
        assert_eq!(doc.slides[0].shapes[0].text(), "Title [French]");
        // Dedup: identical source text receives the identical result.
        assert_eq!(
            doc.slides[0].shapes[0].text(),
            doc.slides[0].shapes[2].text()
        );
    }
}
